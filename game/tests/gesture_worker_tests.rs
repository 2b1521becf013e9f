use std::thread;
use std::time::{Duration, Instant};

use gesture_runner::detector::{AlwaysReady, ScriptStep, ScriptedDetector};
use gesture_runner::gesture::{
    FINGER_PAIRS, GestureClassifier, HandLandmarks, LANDMARK_COUNT, Landmark,
};
use gesture_runner::gesture_worker::{GestureReport, GestureWorker, Observation};
use gesture_runner::landmark_feed::{FeedDetector, LandmarkFeed};

fn open_hand() -> HandLandmarks {
    let mut points = [Landmark::new(0.5, 0.8); LANDMARK_COUNT];
    for &(tip, pip) in FINGER_PAIRS.iter() {
        points[pip] = Landmark::new(0.5, 0.6);
        points[tip] = Landmark::new(0.5, 0.45);
    }
    HandLandmarks::new(points)
}

/// Polls the worker until `count` reports arrived or two seconds passed.
fn collect(worker: &mut GestureWorker, count: usize) -> Vec<GestureReport> {
    let deadline = Instant::now() + Duration::from_secs(2);
    let mut reports = Vec::new();
    while reports.len() < count && Instant::now() < deadline {
        reports.extend(worker.drain());
        thread::sleep(Duration::from_millis(2));
    }
    reports
}

#[test]
fn worker_classifies_and_skips_failures() {
    let hand = open_hand();
    let detector = ScriptedDetector::new(vec![
        ScriptStep::Hand(hand),
        ScriptStep::Fail("model not ready".into()),
        ScriptStep::NoHand,
    ]);
    let mut worker = GestureWorker::spawn(
        AlwaysReady,
        detector,
        GestureClassifier::default(),
        Duration::from_millis(1),
    )
    .expect("spawn worker");

    let reports = collect(&mut worker, 2);
    worker.join();

    assert!(reports.len() >= 2);
    assert_eq!(
        reports[0].observation,
        Observation::Hand {
            landmarks: hand,
            open: true
        }
    );
    assert!(reports[0].is_open_hand());
    assert_eq!(reports[1].observation, Observation::Absent);
    assert!(reports.windows(2).all(|w| w[0].at <= w[1].at));
}

#[test]
fn stopped_worker_goes_quiet() {
    let mut worker = GestureWorker::spawn(
        AlwaysReady,
        ScriptedDetector::new(Vec::new()),
        GestureClassifier::default(),
        Duration::from_millis(1),
    )
    .expect("spawn worker");
    assert!(worker.is_running());
    assert!(!collect(&mut worker, 1).is_empty());

    worker.stop();
    assert!(!worker.is_running());
    // Let an in-flight iteration finish, then nothing new may arrive.
    thread::sleep(Duration::from_millis(30));
    worker.drain();
    thread::sleep(Duration::from_millis(30));
    assert!(worker.drain().is_empty());
}

#[test]
fn feed_worker_reports_each_post_once() {
    let (tx, feed) = LandmarkFeed::channel();
    let mut worker = GestureWorker::spawn(
        feed,
        FeedDetector,
        GestureClassifier::default(),
        Duration::from_millis(1),
    )
    .expect("spawn worker");

    thread::sleep(Duration::from_millis(30));
    assert!(worker.drain().is_empty(), "nothing posted yet");

    tx.send_replace(Some(open_hand()));
    let reports = collect(&mut worker, 1);
    assert_eq!(reports.len(), 1);
    assert!(reports[0].is_open_hand());

    thread::sleep(Duration::from_millis(30));
    assert!(worker.drain().is_empty(), "a post is consumed once");

    tx.send_replace(None);
    let reports = collect(&mut worker, 1);
    assert_eq!(reports[0].observation, Observation::Absent);

    worker.join();
}
