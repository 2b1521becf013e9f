use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::detector::{FrameSource, HandDetector};
use crate::gesture::{GestureClassifier, HandLandmarks};

#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Hand { landmarks: HandLandmarks, open: bool },
    Absent,
}

/// One classified frame, stamped with the time detection finished.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureReport {
    pub at: Instant,
    pub observation: Observation,
}

impl GestureReport {
    pub fn is_open_hand(&self) -> bool {
        matches!(self.observation, Observation::Hand { open: true, .. })
    }
}

/// Runs one detection pass: grab a frame if the source is ready, detect, classify.
///
/// Returns `None` when there was nothing to look at or the detector failed; failures are
/// logged and otherwise ignored.
pub async fn poll_once<S, D>(
    source: &mut S,
    detector: &mut D,
    classifier: &GestureClassifier,
) -> Option<GestureReport>
where
    S: FrameSource,
    D: HandDetector<Frame = S::Frame>,
{
    if !source.is_ready() {
        return None;
    }
    let frame = source.grab()?;
    match detector.detect(frame).await {
        Ok(Some(landmarks)) => Some(GestureReport {
            at: Instant::now(),
            observation: Observation::Hand {
                open: classifier.is_open_hand(&landmarks),
                landmarks,
            },
        }),
        Ok(None) => Some(GestureReport {
            at: Instant::now(),
            observation: Observation::Absent,
        }),
        Err(err) => {
            log::debug!("hand detection skipped: {err}");
            None
        }
    }
}

/// Background classifier loop.
///
/// The worker owns the frame source and detector on a dedicated thread with a
/// current-thread Tokio runtime. Results come back as [`GestureReport`] messages; the game
/// thread drains them with [`GestureWorker::try_recv`] and stays the only writer of game
/// state.
pub struct GestureWorker {
    rx: mpsc::UnboundedReceiver<GestureReport>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl GestureWorker {
    pub fn spawn<S, D>(
        mut source: S,
        mut detector: D,
        classifier: GestureClassifier,
        poll_interval: Duration,
    ) -> std::io::Result<Self>
    where
        S: FrameSource + Send + 'static,
        D: HandDetector<Frame = S::Frame> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;

        let flag = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("gesture-worker".into())
            .spawn(move || {
                log::info!("gesture worker started");
                rt.block_on(async move {
                    while flag.load(Ordering::Acquire) {
                        if let Some(report) =
                            poll_once(&mut source, &mut detector, &classifier).await
                        {
                            if tx.send(report).is_err() {
                                break;
                            }
                        }
                        tokio::time::sleep(poll_interval).await;
                    }
                });
                log::info!("gesture worker stopped");
            })?;

        Ok(Self {
            rx,
            running,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn try_recv(&mut self) -> Option<GestureReport> {
        self.rx.try_recv().ok()
    }

    /// Everything that arrived since the last drain, oldest first.
    pub fn drain(&mut self) -> Vec<GestureReport> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stops scheduling new detections. A detection already in flight is left to finish.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
    }

    /// Stops and waits for the worker thread to exit.
    pub fn join(mut self) {
        self.stop();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("gesture worker panicked");
            }
        }
    }
}

impl Drop for GestureWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
