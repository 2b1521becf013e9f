//! Draws a [`RunnerSnapshot`] through the engine's 2D renderer.
//!
//! The playfield keeps its aspect ratio and is letterboxed into whatever surface it is given.
//! The landmark overlay panel sits in the top-right corner and is sized from the surface,
//! not the field, so it stays readable in small windows.

use engine::graphics::{Color, Rect, Renderer2d};
use engine::surface::SurfaceSize;

use crate::gesture::{HAND_SKELETON, HandLandmarks};
use crate::runner_core::RunState;
use crate::state::RunnerSnapshot;

const LETTERBOX: Color = [12, 12, 20, 255];
const SKY: Color = [92, 148, 252, 255];
const CLOUD: Color = [255, 255, 255, 255];
const GROUND: Color = [200, 120, 60, 255];
const GRASS: Color = [60, 190, 80, 255];
const PIPE: Color = [30, 200, 90, 255];
const PIPE_LIP: Color = [55, 255, 119, 255];
const PLAYER: Color = [255, 59, 59, 255];
const EYE: Color = [255, 255, 255, 255];
const PUPIL: Color = [17, 17, 17, 255];
const NOSE: Color = [255, 208, 122, 255];
const TEXT: Color = [255, 255, 255, 255];
const PANEL: Color = [10, 10, 18, 255];
const BONE: Color = [0, 212, 255, 255];
const JOINT: Color = [124, 92, 255, 255];

// Dots per bone; the renderer has no line primitive.
const BONE_STEPS: u32 = 12;

pub const READY_PROMPT: &str = "Press Space / Up or open hand to start";
pub const GAME_OVER_PROMPT: &str = "Game over - Press Enter to restart";

/// Maps field coordinates onto the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin_x: f32,
    pub origin_y: f32,
    pub scale: f32,
    pub bounds: Rect,
}

impl Viewport {
    pub fn letterbox(surface: SurfaceSize, field_w: f32, field_h: f32) -> Option<Self> {
        if surface.is_empty() || field_w <= 0.0 || field_h <= 0.0 {
            return None;
        }
        let sw = surface.width as f32;
        let sh = surface.height as f32;
        let scale = (sw / field_w).min(sh / field_h);
        let w = field_w * scale;
        let h = field_h * scale;
        let origin_x = ((sw - w) / 2.0).floor();
        let origin_y = ((sh - h) / 2.0).floor();
        let bounds = Rect::from_f32(origin_x, origin_y, w, h)?;
        Some(Self {
            origin_x,
            origin_y,
            scale,
            bounds,
        })
    }

    /// A field-space rectangle in pixels, clipped to the field.
    pub fn rect(&self, x: f32, y: f32, w: f32, h: f32) -> Option<Rect> {
        let r = Rect::from_f32(
            self.origin_x + x * self.scale,
            self.origin_y + y * self.scale,
            w * self.scale,
            h * self.scale,
        )?;
        intersect(r, self.bounds)
    }

    pub fn point(&self, x: f32, y: f32) -> (u32, u32) {
        (
            (self.origin_x + x * self.scale).max(0.0) as u32,
            (self.origin_y + y * self.scale).max(0.0) as u32,
        )
    }

    pub fn text_scale(&self) -> u32 {
        ((2.0 * self.scale).round() as u32).max(1)
    }
}

fn intersect(a: Rect, b: Rect) -> Option<Rect> {
    let x0 = a.x.max(b.x);
    let y0 = a.y.max(b.y);
    let x1 = a.right().min(b.right());
    let y1 = a.bottom().min(b.bottom());
    (x1 > x0 && y1 > y0).then(|| Rect::new(x0, y0, x1 - x0, y1 - y0))
}

/// Square panel in the top-right corner, a quarter of the short side.
pub fn overlay_panel(surface: SurfaceSize) -> Option<Rect> {
    let side = surface.width.min(surface.height) / 4;
    if side < 32 {
        return None;
    }
    let margin = 8;
    let x = surface.width.checked_sub(side + margin)?;
    Some(Rect::new(x, margin, side, side))
}

pub fn draw_runner(renderer: &mut dyn Renderer2d, snapshot: &RunnerSnapshot) {
    let size = renderer.size();
    renderer.clear(LETTERBOX);

    let session = &snapshot.session;
    let Some(view) = Viewport::letterbox(size, session.field_width, session.field_height) else {
        return;
    };

    fill(renderer, view.rect(0.0, 0.0, session.field_width, session.ground_y), SKY);
    draw_clouds(renderer, &view, snapshot.clock, session.field_width);

    let ground_h = session.field_height - session.ground_y;
    fill(renderer, view.rect(0.0, session.ground_y, session.field_width, ground_h), GROUND);
    fill(renderer, view.rect(0.0, session.ground_y, session.field_width, 6.0), GRASS);

    for o in &session.obstacles {
        fill(renderer, view.rect(o.x, o.y, o.w, o.h), PIPE);
        fill(renderer, view.rect(o.x - 6.0, o.y, o.w + 12.0, 10.0), PIPE_LIP);
    }

    let p = session.player;
    fill(renderer, view.rect(p.x, p.y, p.w, p.h), PLAYER);
    fill(renderer, view.rect(p.x + 10.0, p.y + 14.0, 8.0, 8.0), EYE);
    fill(renderer, view.rect(p.x + 24.0, p.y + 14.0, 8.0, 8.0), EYE);
    fill(renderer, view.rect(p.x + 12.0, p.y + 16.0, 4.0, 4.0), PUPIL);
    fill(renderer, view.rect(p.x + 26.0, p.y + 16.0, 4.0, 4.0), PUPIL);
    fill(renderer, view.rect(p.x + 16.0, p.y + 28.0, 10.0, 8.0), NOSE);

    draw_hud(renderer, &view, snapshot);

    if let Some(panel) = overlay_panel(size) {
        draw_landmark_panel(renderer, panel, snapshot.landmarks.as_ref());
    }
}

fn fill(renderer: &mut dyn Renderer2d, rect: Option<Rect>, color: Color) {
    if let Some(rect) = rect {
        renderer.fill_rect(rect, color);
    }
}

fn draw_clouds(renderer: &mut dyn Renderer2d, view: &Viewport, clock: f32, field_w: f32) {
    let span = field_w + 160.0;
    for i in 0..3 {
        let speed = 12.0 + 8.0 * i as f32;
        let start = 120.0 + 330.0 * i as f32;
        let x = (start - clock * speed).rem_euclid(span) - 120.0;
        let y = 50.0 + 40.0 * (i % 2) as f32;
        blend(renderer, view.rect(x, y + 10.0, 110.0, 22.0));
        blend(renderer, view.rect(x + 20.0, y, 56.0, 18.0));
    }
}

fn blend(renderer: &mut dyn Renderer2d, rect: Option<Rect>) {
    if let Some(rect) = rect {
        renderer.blend_rect(rect, CLOUD, 200);
    }
}

fn draw_hud(renderer: &mut dyn Renderer2d, view: &Viewport, snapshot: &RunnerSnapshot) {
    let session = &snapshot.session;
    let scale = view.text_scale();

    let (x, y) = view.point(18.0, 12.0);
    let score = format!("SCORE {}  BEST {}", session.score, session.best);
    renderer.draw_text_scaled(x, y, &score, TEXT, scale);

    let prompt = match session.state {
        RunState::Ready => Some(READY_PROMPT),
        RunState::GameOver => Some(GAME_OVER_PROMPT),
        RunState::Running => None,
    };
    if let Some(prompt) = prompt {
        let (x, y) = view.point(18.0, 32.0);
        renderer.draw_text_scaled(x, y, prompt, TEXT, scale);
    }

    let (x, y) = view.point(18.0, session.ground_y + 18.0);
    renderer.draw_text_scaled(x, y, &snapshot.hand_line, TEXT, scale);
    if !snapshot.message.is_empty() {
        let (x, y) = view.point(18.0, session.ground_y + 38.0);
        renderer.draw_text_scaled(x, y, &snapshot.message, TEXT, scale);
    }
}

fn draw_landmark_panel(renderer: &mut dyn Renderer2d, panel: Rect, hand: Option<&HandLandmarks>) {
    renderer.blend_rect(panel, PANEL, 170);
    renderer.rect_outline(panel, BONE);

    let Some(hand) = hand else {
        return;
    };
    let to_panel = |x: f32, y: f32| {
        let px = panel.x as f32 + x.clamp(0.0, 1.0) * (panel.w - 1) as f32;
        let py = panel.y as f32 + y.clamp(0.0, 1.0) * (panel.h - 1) as f32;
        (px.round() as u32, py.round() as u32)
    };

    let points = hand.points();
    for &(a, b) in HAND_SKELETON.iter() {
        let (ax, ay) = (points[a].x, points[a].y);
        let (bx, by) = (points[b].x, points[b].y);
        for s in 0..=BONE_STEPS {
            let t = s as f32 / BONE_STEPS as f32;
            let (px, py) = to_panel(ax + (bx - ax) * t, ay + (by - ay) * t);
            renderer.fill_rect(Rect::new(px, py, 1, 1), BONE);
        }
    }
    for p in points {
        let (px, py) = to_panel(p.x, p.y);
        renderer.fill_rect(Rect::new(px.saturating_sub(1), py.saturating_sub(1), 3, 3), JOINT);
    }
}
