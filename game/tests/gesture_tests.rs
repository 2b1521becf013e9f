use std::time::{Duration, Instant};

use gesture_runner::gesture::{
    FINGER_PAIRS, GestureClassifier, HandLandmarks, LANDMARK_COUNT, Landmark,
};
use gesture_runner::intent::{IntentDebouncer, IntentSource};

/// Synthetic hand where finger `i` has its tip `gaps[i]` above its PIP joint.
fn hand_with_gaps(gaps: [f32; 4]) -> HandLandmarks {
    let mut points = [Landmark::new(0.5, 0.8); LANDMARK_COUNT];
    for (&(tip, pip), gap) in FINGER_PAIRS.iter().zip(gaps) {
        points[pip] = Landmark::new(0.5, 0.6);
        points[tip] = Landmark::new(0.5, 0.6 - gap);
    }
    HandLandmarks::new(points)
}

#[test]
fn four_raised_fingers_is_an_open_hand() {
    let classifier = GestureClassifier::default();
    let hand = hand_with_gaps([0.1, 0.12, 0.09, 0.06]);
    assert_eq!(classifier.extended_fingers(&hand), 4);
    assert!(classifier.is_open_hand(&hand));
}

#[test]
fn fist_is_not_an_open_hand() {
    let classifier = GestureClassifier::default();
    let hand = hand_with_gaps([-0.05, 0.0, 0.02, 0.03]);
    assert_eq!(classifier.extended_fingers(&hand), 0);
    assert!(!classifier.is_open_hand(&hand));
}

#[test]
fn two_of_four_is_not_enough() {
    let classifier = GestureClassifier::default();
    let hand = hand_with_gaps([0.1, 0.1, 0.0, 0.0]);
    assert_eq!(classifier.extended_fingers(&hand), 2);
    assert!(!classifier.is_open_hand(&hand));

    let three = hand_with_gaps([0.1, 0.1, 0.1, 0.0]);
    assert!(classifier.is_open_hand(&three));
}

#[test]
fn thumb_and_wrist_do_not_vote() {
    let classifier = GestureClassifier::default();
    let mut points = *hand_with_gaps([0.1, 0.1, 0.0, 0.0]).points();
    points[0] = Landmark::new(0.5, 0.0);
    points[4] = Landmark::new(0.5, 0.0);
    assert!(!classifier.is_open_hand(&HandLandmarks::new(points)));
}

#[test]
fn open_hand_held_is_rate_limited() {
    let cooldown = Duration::from_millis(350);

    for spacing_ms in [1u64, 5, 16, 33, 100, 349, 350, 700] {
        for frames in [1usize, 2, 10, 61, 200] {
            let mut debouncer = IntentDebouncer::new(cooldown);
            let t0 = Instant::now();
            let spacing = Duration::from_millis(spacing_ms);

            let intents = (0..frames)
                .filter_map(|i| debouncer.gesture(true, t0 + spacing * i as u32))
                .inspect(|intent| assert_eq!(intent.source, IntentSource::Gesture))
                .count();

            let span_ms = spacing_ms * (frames as u64 - 1);
            let bound = span_ms.div_ceil(350) as usize + 1;
            assert!(
                intents <= bound,
                "{intents} intents over {span_ms} ms (bound {bound})"
            );
            assert!(intents >= 1);
        }
    }
}

#[test]
fn closed_frames_between_opens_do_not_reset_the_cooldown() {
    let mut debouncer = IntentDebouncer::new(Duration::from_millis(350));
    let t0 = Instant::now();
    assert!(debouncer.gesture(true, t0).is_some());
    assert!(debouncer.gesture(false, t0 + Duration::from_millis(100)).is_none());
    assert!(debouncer.gesture(true, t0 + Duration::from_millis(200)).is_none());
    assert!(debouncer.gesture(true, t0 + Duration::from_millis(360)).is_some());
}
