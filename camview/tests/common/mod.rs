//! In-memory media session, token backend and decoder for viewer tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use camview::*;
use camview_media::MediaResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub const SERVER: &str = "https://media.test:4443";
pub const SESSION: &str = "bench";

/// Everything the fake session saw, in call order
#[derive(Debug, Default)]
pub struct SessionLog {
    pub calls: Vec<String>,
    pub signals: Vec<OutboundSignal>,
    pub feeds: HashMap<String, mpsc::UnboundedSender<Bytes>>,
    pub fail_subscribe: bool,
    pub undeliverable: bool,
    pub disconnected: bool,
}

pub type SharedLog = Arc<Mutex<SessionLog>>;

pub use camview_signaling::OutboundSignal;

// ----------------------------------------------------------------------
// Tokens
// ----------------------------------------------------------------------

pub struct FakeTokens {
    pub down: bool,
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn create_session(&self, server: &str, session_name: &str) -> CamViewResult<String> {
        if self.down {
            return Err(CamViewError::TransportUnavailable {
                server: server.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Err(CamViewError::SessionAlreadyExists {
            session: session_name.to_string(),
        })
    }

    async fn create_token(&self, _server: &str, session_id: &str) -> CamViewResult<String> {
        Ok(format!("tok_{}", session_id))
    }
}

// ----------------------------------------------------------------------
// Session
// ----------------------------------------------------------------------

pub struct FakeConnector {
    pub log: SharedLog,
    pub tokens_seen: Mutex<Vec<String>>,
}

#[async_trait]
impl SessionConnector for FakeConnector {
    async fn connect(
        &self,
        token: &str,
        _events: SessionEventSender,
    ) -> CamViewResult<Box<dyn MediaSession>> {
        self.tokens_seen.lock().push(token.to_string());
        Ok(Box::new(FakeSession {
            log: self.log.clone(),
        }))
    }
}

pub struct FakeSession {
    log: SharedLog,
}

#[async_trait]
impl MediaSession for FakeSession {
    async fn subscribe(&self, stream: &StreamDescriptor) -> CamViewResult<Box<dyn Subscriber>> {
        let mut log = self.log.lock();
        log.calls.push(format!("subscribe:{}", stream.stream_id));
        if log.fail_subscribe {
            return Err(CamViewError::SubscriptionFailure {
                stream_id: stream.stream_id.to_string(),
                reason: "rejected".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        log.feeds.insert(stream.stream_id.to_string(), tx);

        Ok(Box::new(FakeSubscriber {
            stream_id: stream.stream_id.clone(),
            log: self.log.clone(),
            frames: Arc::new(SolidFrames([10, 20, 30, 255])),
            recording: Arc::new(FakeRecording {
                deliverable: !log.undeliverable,
                feed: Mutex::new(Some(rx)),
            }),
        }))
    }

    async fn unsubscribe(&self, subscriber: Box<dyn Subscriber>) -> CamViewResult<()> {
        self.log
            .lock()
            .calls
            .push(format!("unsubscribe:{}", subscriber.stream_id()));
        Ok(())
    }

    async fn signal(&self, signal: OutboundSignal) -> CamViewResult<()> {
        self.log.lock().signals.push(signal);
        Ok(())
    }

    async fn disconnect(&self) {
        let mut log = self.log.lock();
        log.calls.push("disconnect".to_string());
        log.disconnected = true;
    }
}

pub struct FakeSubscriber {
    stream_id: StreamId,
    log: SharedLog,
    frames: Arc<SolidFrames>,
    recording: Arc<FakeRecording>,
}

impl Subscriber for FakeSubscriber {
    fn stream_id(&self) -> &StreamId {
        &self.stream_id
    }

    fn attach(&self, target: SurfaceTarget) {
        self.log
            .lock()
            .calls
            .push(format!("attach:{}:{:?}", self.stream_id, target));
    }

    fn frame_source(&self) -> Arc<dyn FrameSource> {
        self.frames.clone()
    }

    fn recording_source(&self) -> Arc<dyn RecordingSource> {
        self.recording.clone()
    }
}

pub struct SolidFrames(pub [u8; 4]);

impl FrameSource for SolidFrames {
    fn current_frame(&self) -> Option<VideoFrame> {
        Some(VideoFrame::solid(4, 4, self.0))
    }
}

pub struct FakeRecording {
    deliverable: bool,
    feed: Mutex<Option<mpsc::UnboundedReceiver<Bytes>>>,
}

impl RecordingSource for FakeRecording {
    fn is_deliverable(&self) -> bool {
        self.deliverable
    }

    fn open_segments(&self) -> Option<mpsc::UnboundedReceiver<Bytes>> {
        self.feed.lock().take()
    }
}

// ----------------------------------------------------------------------
// Playback
// ----------------------------------------------------------------------

/// Each recorded byte plays for 10ms
pub const MS_PER_BYTE: u64 = 10;

#[derive(Default)]
pub struct FakeDecoder {
    pub opens: AtomicUsize,
    pub fail: AtomicBool,
}

impl BlobDecoder for FakeDecoder {
    fn open(&self, blob: Blob) -> MediaResult<Arc<dyn PlaybackSource>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(camview_media::MediaError::DecodingFailed {
                reason: "unreadable container".to_string(),
            });
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(FakePlayback {
            duration: Duration::from_millis(blob.len() as u64 * MS_PER_BYTE),
            position: Mutex::new(Duration::ZERO),
        }))
    }
}

pub struct FakePlayback {
    duration: Duration,
    position: Mutex<Duration>,
}

impl FrameSource for FakePlayback {
    fn current_frame(&self) -> Option<VideoFrame> {
        Some(VideoFrame::solid(4, 4, [200, 200, 200, 255]))
    }
}

impl PlaybackSource for FakePlayback {
    fn duration(&self) -> Duration {
        self.duration
    }

    fn position(&self) -> Duration {
        *self.position.lock()
    }

    fn seek(&self, position: Duration) {
        *self.position.lock() = position.min(self.duration);
    }
}

// ----------------------------------------------------------------------
// Harness
// ----------------------------------------------------------------------

pub struct Harness {
    pub viewer: Viewer,
    pub log: SharedLog,
    pub decoder: Arc<FakeDecoder>,
    pub connector: Arc<FakeConnector>,
}

pub fn harness_with(config: ViewerConfig, tokens_down: bool) -> Harness {
    let log = SharedLog::default();
    let decoder = Arc::new(FakeDecoder::default());
    let connector = Arc::new(FakeConnector {
        log: log.clone(),
        tokens_seen: Mutex::new(Vec::new()),
    });

    let viewer = Viewer::builder()
        .config(config)
        .server_address(SERVER)
        .session_name(SESSION)
        .token_provider(Arc::new(FakeTokens { down: tokens_down }))
        .connector(connector.clone())
        .decoder(decoder.clone())
        .build()
        .expect("viewer builds");

    Harness {
        viewer,
        log,
        decoder,
        connector,
    }
}

pub async fn connected() -> Harness {
    let mut harness = harness_with(ViewerConfig::default(), false);
    harness.viewer.connect().await.expect("connects");
    harness
}

pub fn device_metadata(name: &str, inputs: &[&str]) -> String {
    let devices: Vec<_> = inputs
        .iter()
        .map(|id| serde_json::json!({ "deviceId": id, "label": format!("cam {}", id) }))
        .collect();
    serde_json::json!({
        "deviceInfo": { "name": name, "model": "M1", "manufacturer": "Acme", "serial": "0001" },
        "videoDevices": devices,
    })
    .to_string()
}

pub fn stream(stream_id: &str, connection_id: &str) -> StreamDescriptor {
    StreamDescriptor::new(
        stream_id,
        connection_id,
        device_metadata(connection_id, &["front", "back"]),
    )
}

impl Harness {
    /// Announce a stream and apply it
    pub async fn announce(&mut self, stream_id: &str, connection_id: &str) -> StreamDescriptor {
        let stream = stream(stream_id, connection_id);
        self.viewer
            .event_sender()
            .send(SessionEvent::StreamCreated(stream.clone()));
        self.viewer.process_events().await;
        stream
    }

    /// Announce and subscribe
    pub async fn live(&mut self, stream_id: &str, connection_id: &str) -> StreamDescriptor {
        let stream = self.announce(stream_id, connection_id).await;
        self.viewer
            .select_user(&stream.stream_id)
            .await
            .expect("subscribes");
        stream
    }

    /// Deliver an encoded segment to the recorder of `stream_id`
    pub async fn record(&self, stream_id: &str, len: usize) {
        let tx = self.log.lock().feeds.get(stream_id).cloned();
        if let Some(tx) = tx {
            let _ = tx.send(Bytes::from(vec![0x1A; len]));
        }
        settle().await;
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.log.lock().calls.clear();
    }

    pub fn signals(&self) -> Vec<OutboundSignal> {
        self.log.lock().signals.clone()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.viewer.compositor().lock().stats().frames_drawn
    }
}

pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
