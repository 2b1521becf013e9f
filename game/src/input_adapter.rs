use engine::app::InputFrame;
use winit::event::VirtualKeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    Jump,
    Restart,
    Quit,
}

pub fn map_key_to_action(key: VirtualKeyCode) -> Option<PlayerAction> {
    match key {
        VirtualKeyCode::Space | VirtualKeyCode::Up => Some(PlayerAction::Jump),
        VirtualKeyCode::Return | VirtualKeyCode::NumpadEnter => Some(PlayerAction::Restart),
        VirtualKeyCode::Escape => Some(PlayerAction::Quit),
        _ => None,
    }
}

/// Actions for keys that went down this frame, deduplicated, in a fixed order.
///
/// Only fresh presses count; holding Space does not re-trigger a jump.
pub fn collect_actions(input: &InputFrame) -> Vec<PlayerAction> {
    let mut actions = Vec::new();
    for action in [PlayerAction::Quit, PlayerAction::Restart, PlayerAction::Jump] {
        let pressed = input
            .keys_pressed
            .iter()
            .any(|&key| map_key_to_action(key) == Some(action));
        if pressed {
            actions.push(action);
        }
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::event::ElementState;

    #[test]
    fn space_and_up_both_jump() {
        assert_eq!(map_key_to_action(VirtualKeyCode::Space), Some(PlayerAction::Jump));
        assert_eq!(map_key_to_action(VirtualKeyCode::Up), Some(PlayerAction::Jump));
        assert_eq!(map_key_to_action(VirtualKeyCode::Down), None);
    }

    #[test]
    fn held_key_yields_one_action() {
        let mut input = InputFrame::default();
        input.on_key(VirtualKeyCode::Space, ElementState::Pressed);
        input.on_key(VirtualKeyCode::Up, ElementState::Pressed);
        assert_eq!(collect_actions(&input), vec![PlayerAction::Jump]);

        input.end_frame();
        input.on_key(VirtualKeyCode::Space, ElementState::Pressed);
        assert!(collect_actions(&input).is_empty());
    }
}
