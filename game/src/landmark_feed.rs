//! Local HTTP feed for landmarks produced by an external hand tracker.
//!
//! The tracker posts one landmark set (or `null`) per processed camera frame. The game reads
//! them through [`LandmarkFeed`], a [`FrameSource`] whose frames are already-detected hands,
//! paired with the pass-through [`FeedDetector`].

use std::{
    io,
    net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener},
    sync::Arc,
    thread,
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tower_http::cors::{Any, CorsLayer};

use crate::detector::{DetectorError, FrameSource, HandDetector};
use crate::gesture::{HandLandmarks, Landmark};
use crate::runner_core::SessionSnapshot;

/// Requests the server forwards to the game thread.
#[derive(Debug)]
pub enum FeedCmd {
    GetState {
        respond: oneshot::Sender<SessionSnapshot>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarksPayload {
    pub landmarks: Option<Vec<Landmark>>,
}

#[derive(Clone)]
struct FeedState {
    cmds: mpsc::UnboundedSender<FeedCmd>,
    landmarks: Arc<watch::Sender<Option<HandLandmarks>>>,
}

async fn health() -> &'static str {
    "ok"
}

async fn post_landmarks(
    State(state): State<FeedState>,
    Json(payload): Json<LandmarksPayload>,
) -> Result<StatusCode, (StatusCode, String)> {
    let hand = match payload.landmarks {
        Some(points) => Some(
            HandLandmarks::from_slice(&points)
                .map_err(|err| (StatusCode::BAD_REQUEST, err.to_string()))?,
        ),
        None => None,
    };
    state.landmarks.send_replace(hand);
    Ok(StatusCode::ACCEPTED)
}

async fn send_cmd<T>(
    tx: &mpsc::UnboundedSender<FeedCmd>,
    cmd: FeedCmd,
    rx: oneshot::Receiver<T>,
) -> Result<T, (StatusCode, String)> {
    tx.send(cmd).map_err(|_| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "game command channel closed".to_string(),
        )
    })?;

    match tokio::time::timeout(Duration::from_secs(2), rx).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(_)) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            "game did not respond".to_string(),
        )),
        Err(_) => Err((StatusCode::GATEWAY_TIMEOUT, "game timed out".to_string())),
    }
}

async fn game_state(
    State(state): State<FeedState>,
) -> Result<Json<SessionSnapshot>, (StatusCode, String)> {
    let (tx, rx) = oneshot::channel();
    let snapshot = send_cmd(&state.cmds, FeedCmd::GetState { respond: tx }, rx).await?;
    Ok(Json(snapshot))
}

pub fn router(
    cmds: mpsc::UnboundedSender<FeedCmd>,
    landmarks: watch::Sender<Option<HandLandmarks>>,
) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/landmarks", post(post_landmarks))
        .route("/api/state", get(game_state))
        .with_state(FeedState {
            cmds,
            landmarks: Arc::new(landmarks),
        })
        .layer(cors)
}

/// Latest posted hand, handed out once per post.
#[derive(Debug, Clone)]
pub struct LandmarkFeed {
    rx: watch::Receiver<Option<HandLandmarks>>,
}

impl LandmarkFeed {
    pub fn new(rx: watch::Receiver<Option<HandLandmarks>>) -> Self {
        Self { rx }
    }

    /// A sender/feed pair not backed by a server.
    pub fn channel() -> (watch::Sender<Option<HandLandmarks>>, Self) {
        let (tx, rx) = watch::channel(None);
        (tx, Self::new(rx))
    }
}

impl FrameSource for LandmarkFeed {
    type Frame = Option<HandLandmarks>;

    /// False until the tracker has posted at least once, and again after each post is taken.
    fn is_ready(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    fn grab(&mut self) -> Option<Self::Frame> {
        if !self.is_ready() {
            return None;
        }
        Some(*self.rx.borrow_and_update())
    }
}

/// The tracker already did the detection; this only forwards its result.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedDetector;

impl HandDetector for FeedDetector {
    type Frame = Option<HandLandmarks>;

    async fn detect(
        &mut self,
        frame: Option<HandLandmarks>,
    ) -> Result<Option<HandLandmarks>, DetectorError> {
        Ok(frame)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedServerInfo {
    pub addr: SocketAddr,
}

pub struct LandmarkFeedServer {
    pub rx: mpsc::UnboundedReceiver<FeedCmd>,
    shutdown: Option<oneshot::Sender<()>>,
    pub info: FeedServerInfo,
}

impl LandmarkFeedServer {
    /// Binds `127.0.0.1:port` (0 picks a free port) and serves on a background thread.
    pub fn start(port: u16) -> io::Result<(Self, LandmarkFeed)> {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<FeedCmd>();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let (landmark_tx, feed) = LandmarkFeed::channel();

        let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port);

        // Bind synchronously so a busy port is reported to the caller.
        let std_listener = TcpListener::bind(addr)?;
        std_listener.set_nonblocking(true)?;
        let info = FeedServerInfo {
            addr: std_listener.local_addr()?,
        };

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        thread::Builder::new()
            .name("landmark-feed".into())
            .spawn(move || {
                rt.block_on(async move {
                    let listener = match tokio::net::TcpListener::from_std(std_listener) {
                        Ok(listener) => listener,
                        Err(err) => {
                            log::error!("landmark feed listener: {err}");
                            return;
                        }
                    };
                    let app = router(cmd_tx, landmark_tx);

                    let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                        let _ = shutdown_rx.await;
                    });

                    if let Err(err) = serve.await {
                        log::error!("landmark feed server error: {err}");
                    }
                });
            })?;

        log::info!("landmark feed listening on http://{}", info.addr);
        Ok((
            Self {
                rx: cmd_rx,
                shutdown: Some(shutdown_tx),
                info,
            },
            feed,
        ))
    }

    pub fn try_recv(&mut self) -> Option<FeedCmd> {
        self.rx.try_recv().ok()
    }

    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for LandmarkFeedServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::LANDMARK_COUNT;

    #[test]
    fn feed_is_not_ready_before_the_first_post() {
        let (_tx, feed) = LandmarkFeed::channel();
        assert!(!feed.is_ready());
    }

    #[test]
    fn each_post_is_taken_once() {
        let (tx, mut feed) = LandmarkFeed::channel();
        let hand = HandLandmarks::new([Landmark::new(0.3, 0.6); LANDMARK_COUNT]);

        tx.send_replace(Some(hand));
        assert!(feed.is_ready());
        assert_eq!(feed.grab(), Some(Some(hand)));
        assert!(!feed.is_ready());
        assert_eq!(feed.grab(), None);

        tx.send_replace(None);
        assert_eq!(feed.grab(), Some(None));
    }
}
