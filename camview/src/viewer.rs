//! Viewer session controller
//!
//! The [`Viewer`] owns the capture mode, the user directory, the canvas
//! settings and the render loop. Every transition takes `&mut self`, so
//! transitions that await the session or the recorder are strictly sequenced;
//! use [`crate::ViewerHandle`] to share a viewer between tasks.

use crate::builder::ViewerBuilder;
use crate::config::{ViewerConfig, SERVER_UNAVAILABLE_NOTICE};
use crate::event::{Event, EventEmitter, EventStream};
use crate::mode::{ModeEvent, ModeKind};
use crate::session::{MediaSession, SessionConnector, Subscriber, SurfaceTarget};
use crate::settings::{CommandTarget, DeviceRequest, SettingsCommand, ViewTransform};
use camview_core::{CamViewError, CamViewResult, StreamDescriptor, StreamId, TokenProvider};
use camview_diagnostics::{ThroughputMeter, ThroughputSample};
use camview_media::playback::clamp_position;
use camview_media::{
    scrub_position, ActiveSource, Blob, BlobDecoder, CanvasSettings, Compositor, LocalRecorder,
    PlaybackSource, RenderLoop, SharedCompositor,
};
use camview_signaling::{
    handle_signal, register_stream, CameraControl, DeviceCommand, InboundQueue, OutboundSignal,
    SessionEvent, SessionEventSender, User, UserDirectory,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tracing::{debug, error, info, warn};

/// Subscription shown live
struct LiveSession {
    stream: StreamDescriptor,
    subscriber: Box<dyn Subscriber>,
    recorder: Option<LocalRecorder>,
}

/// Subscription paused on a recorded snapshot; the live part keeps running
struct FrozenSession {
    live: LiveSession,
    blob: Blob,
    playback: Arc<dyn PlaybackSource>,
}

enum CaptureMode {
    Idle,
    Live(LiveSession),
    Frozen(FrozenSession),
}

impl CaptureMode {
    fn kind(&self) -> ModeKind {
        match self {
            CaptureMode::Idle => ModeKind::Idle,
            CaptureMode::Live(_) => ModeKind::Live,
            CaptureMode::Frozen(_) => ModeKind::Frozen,
        }
    }

    fn live(&self) -> Option<&LiveSession> {
        match self {
            CaptureMode::Idle => None,
            CaptureMode::Live(live) => Some(live),
            CaptureMode::Frozen(frozen) => Some(&frozen.live),
        }
    }
}

/// A recording ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingExport {
    /// Suggested file name, `recording-<unix-millis>.webm`
    pub file_name: String,
    /// Recorded bytes
    pub blob: Blob,
}

/// Remote camera viewer
pub struct Viewer {
    config: ViewerConfig,
    tokens: Arc<dyn TokenProvider>,
    connector: Arc<dyn SessionConnector>,
    decoder: Arc<dyn BlobDecoder>,
    session: Option<Box<dyn MediaSession>>,
    inbound: InboundQueue,
    directory: UserDirectory,
    mode: CaptureMode,
    compositor: SharedCompositor,
    render_loop: RenderLoop,
    settings: watch::Sender<CanvasSettings>,
    transform: ViewTransform,
    meter: ThroughputMeter,
    events: EventEmitter,
}

impl Viewer {
    /// Start configuring a viewer
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    pub(crate) fn new(
        config: ViewerConfig,
        tokens: Arc<dyn TokenProvider>,
        connector: Arc<dyn SessionConnector>,
        decoder: Arc<dyn BlobDecoder>,
    ) -> Self {
        let (settings, _) = watch::channel(CanvasSettings::default());
        Self {
            render_loop: RenderLoop::new(config.target_fps),
            meter: ThroughputMeter::new(config.throughput_interval),
            config,
            tokens,
            connector,
            decoder,
            session: None,
            inbound: InboundQueue::new(),
            directory: UserDirectory::new(),
            mode: CaptureMode::Idle,
            compositor: Compositor::shared(),
            settings,
            transform: ViewTransform::default(),
            events: EventEmitter::default(),
        }
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Negotiate a token and join the configured session.
    ///
    /// On failure a "Server is not available" notice is emitted and
    /// [`CamViewError::TransportUnavailable`] is returned; nothing is retried.
    pub async fn connect(&mut self) -> CamViewResult<()> {
        if self.session.is_some() {
            debug!("Already connected");
            return Ok(());
        }

        let server = self.config.require_server_address()?.to_string();
        let session_name = self.config.require_session_name()?.to_string();
        info!("Connecting to {} (session {})", server, session_name);

        match self.open_session(&server, &session_name).await {
            Ok(session) => {
                self.session = Some(session);
                info!("Connected to session {}", session_name);
                Ok(())
            }
            Err(e) => {
                error!("Can't start the session: {}", e);
                self.notice(SERVER_UNAVAILABLE_NOTICE);
                Err(e)
            }
        }
    }

    async fn open_session(
        &self,
        server: &str,
        session_name: &str,
    ) -> CamViewResult<Box<dyn MediaSession>> {
        let token = self
            .tokens
            .get_token(server, session_name)
            .await
            .map_err(|e| transport_unavailable(server, e))?;

        self.connector
            .connect(&token, self.inbound.sender())
            .await
            .map_err(|e| transport_unavailable(server, e))
    }

    /// Leave the session from any mode. Idempotent.
    pub async fn disconnect(&mut self) {
        self.leave_subscription(ModeEvent::Disconnect).await;

        if let Some(session) = self.session.take() {
            session.disconnect().await;
            self.directory.clear();
            info!("Disconnected");
        }
    }

    /// Whether a session is open
    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Handle the media session uses to report stream and signal events
    pub fn event_sender(&self) -> SessionEventSender {
        self.inbound.sender()
    }

    pub(crate) fn pending_events(&self) -> Arc<Notify> {
        self.inbound.pending()
    }

    /// Apply every queued session event. Returns the number of events handled.
    pub async fn process_events(&mut self) -> usize {
        let events = self.inbound.drain();
        let count = events.len();

        for event in events {
            match event {
                SessionEvent::StreamCreated(stream) => self.on_stream_created(stream).await,
                SessionEvent::StreamDestroyed(stream) => self.on_stream_destroyed(stream).await,
                SessionEvent::Signal(signal) => {
                    if let Some(connection_id) = handle_signal(&mut self.directory, &signal) {
                        self.events.emit(Event::StatusUpdated { connection_id });
                    }
                }
            }
        }

        count
    }

    async fn on_stream_created(&mut self, stream: StreamDescriptor) {
        let connection_id = stream.connection_id.clone();
        let stream_id = stream.stream_id.clone();

        match register_stream(&mut self.directory, stream) {
            Ok(Some(fetch)) => {
                self.send_signal(fetch).await;
                self.events.emit(Event::UserJoined {
                    connection_id,
                    stream_id,
                });
            }
            Ok(None) => debug!("Stream {} announced twice", stream_id),
            Err(e) => warn!("Could not register stream {}: {}", stream_id, e),
        }
    }

    async fn on_stream_destroyed(&mut self, stream: StreamDescriptor) {
        if self.directory.remove_stream(&stream.stream_id).is_none() {
            debug!("Unknown stream {} destroyed", stream.stream_id);
            return;
        }

        let subscribed = self
            .mode
            .live()
            .is_some_and(|live| live.stream.stream_id == stream.stream_id);
        if subscribed {
            info!("Subscribed stream {} ended", stream.stream_id);
            self.leave_subscription(ModeEvent::StreamEnded).await;
        }

        self.events.emit(Event::UserLeft {
            connection_id: stream.connection_id,
            stream_id: stream.stream_id,
        });
    }

    async fn send_signal(&self, signal: OutboundSignal) {
        let Some(session) = &self.session else {
            debug!("Not connected, dropping '{}' signal", signal.kind);
            return;
        };

        let kind = signal.kind;
        let recipient = signal.to.clone();
        if let Err(e) = session.signal(signal).await {
            let failure = CamViewError::SignalDeliveryFailure {
                recipient: recipient.to_string(),
                reason: e.to_string(),
            };
            debug!("Dropping '{}' signal: {}", kind, failure);
        }
    }

    async fn send_command(&self, command: DeviceCommand) -> CamViewResult<()> {
        let Some(live) = self.mode.live() else {
            debug!("No subscribed device for {:?}", command);
            return Ok(());
        };

        let signal = command.to_signal(live.stream.connection_id.clone())?;
        self.send_signal(signal).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Capture mode
    // ------------------------------------------------------------------

    /// Subscribe to the user publishing `stream_id`.
    ///
    /// Any current subscription is fully unwound first. Selecting the user
    /// already subscribed to is a no-op.
    pub async fn select_user(&mut self, stream_id: &StreamId) -> CamViewResult<()> {
        let already_subscribed = self
            .mode
            .live()
            .is_some_and(|live| &live.stream.stream_id == stream_id);
        if already_subscribed {
            debug!("Already subscribed to {}", stream_id);
            return Ok(());
        }

        let stream = self
            .directory
            .get_by_stream(stream_id)
            .map(|user| user.stream().clone())
            .ok_or_else(|| CamViewError::InvalidOperation {
                operation: format!("select unknown stream {}", stream_id),
            })?;

        if self.session.is_none() {
            return Err(CamViewError::InvalidState {
                expected: "connected".to_string(),
                actual: "disconnected".to_string(),
            });
        }

        self.leave_subscription(ModeEvent::Deselect).await;
        self.subscribe(stream).await
    }

    async fn subscribe(&mut self, stream: StreamDescriptor) -> CamViewResult<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };

        let subscriber = match session.subscribe(&stream).await {
            Ok(subscriber) => subscriber,
            Err(e) => {
                warn!("Subscribing to {} failed: {}", stream.stream_id, e);
                return Err(match e {
                    e @ CamViewError::SubscriptionFailure { .. } => e,
                    other => CamViewError::SubscriptionFailure {
                        stream_id: stream.stream_id.to_string(),
                        reason: other.to_string(),
                    },
                });
            }
        };

        subscriber.attach(SurfaceTarget::Display);
        self.compositor
            .lock()
            .set_source(ActiveSource::Live(subscriber.frame_source()));
        let recorder = start_recorder(subscriber.as_ref());

        self.transform.reset_scale();
        self.meter.reset();
        self.render_loop
            .start(self.compositor.clone(), self.settings.subscribe());

        info!("Subscribed to {}", stream.stream_id);
        let from = self.mode.kind();
        self.transition(
            from,
            ModeEvent::Select {
                already_subscribed: false,
            },
            CaptureMode::Live(LiveSession {
                stream,
                subscriber,
                recorder,
            }),
        );
        Ok(())
    }

    /// Drop the current subscription, if any
    pub async fn deselect(&mut self) {
        self.leave_subscription(ModeEvent::Deselect).await;
    }

    async fn leave_subscription(&mut self, event: ModeEvent) {
        let from = self.mode.kind();
        let live = match std::mem::replace(&mut self.mode, CaptureMode::Idle) {
            CaptureMode::Idle => return,
            CaptureMode::Live(live) => live,
            CaptureMode::Frozen(frozen) => frozen.live,
        };

        self.render_loop.stop();
        self.compositor.lock().clear_source();

        let LiveSession {
            stream,
            subscriber,
            recorder,
        } = live;

        if let Some(mut recorder) = recorder {
            recorder.stop().await;
            if let Err(e) = recorder.clear() {
                debug!("Recorder not cleared: {}", e);
            }
        }

        if let Some(session) = &self.session {
            if let Err(e) = session.unsubscribe(subscriber).await {
                warn!("Unsubscribing from {} failed: {}", stream.stream_id, e);
            }
        }

        self.meter.reset();
        info!("Unsubscribed from {}", stream.stream_id);
        self.transition(from, event, CaptureMode::Idle);
    }

    /// Freeze on the recording so far, or resume the live view.
    ///
    /// Freezing needs an active recorder; without one, and while idle, this
    /// is a no-op.
    pub fn toggle_freeze(&mut self) -> CamViewResult<()> {
        match self.mode.kind() {
            ModeKind::Idle => {
                debug!("Toggle freeze ignored while idle");
                Ok(())
            }
            ModeKind::Live => self.freeze(),
            ModeKind::Frozen => {
                self.resume();
                Ok(())
            }
        }
    }

    fn freeze(&mut self) -> CamViewResult<()> {
        let from = self.mode.kind();
        let Some(blob) = self
            .mode
            .live()
            .and_then(|live| live.recorder.as_ref())
            .map(|recorder| recorder.snapshot_blob())
        else {
            debug!("Cannot freeze: {}", CamViewError::RecorderNotReady);
            return Ok(());
        };

        let playback = self.decoder.open(blob.clone())?;
        playback.seek(playback.duration());

        let live = match std::mem::replace(&mut self.mode, CaptureMode::Idle) {
            CaptureMode::Live(live) => live,
            other => {
                self.mode = other;
                return Ok(());
            }
        };

        self.render_loop.stop();
        live.subscriber.attach(SurfaceTarget::Inert);
        self.compositor
            .lock()
            .set_source(ActiveSource::Playback(playback.clone()));

        info!("Frozen on {} recorded bytes", blob.len());
        self.transition(
            from,
            ModeEvent::ToggleFreeze,
            CaptureMode::Frozen(FrozenSession {
                live,
                blob,
                playback,
            }),
        );
        self.redraw();
        Ok(())
    }

    fn resume(&mut self) {
        let from = self.mode.kind();
        let live = match std::mem::replace(&mut self.mode, CaptureMode::Idle) {
            CaptureMode::Frozen(frozen) => frozen.live,
            other => {
                self.mode = other;
                return;
            }
        };

        live.subscriber.attach(SurfaceTarget::Display);
        self.compositor
            .lock()
            .set_source(ActiveSource::Live(live.subscriber.frame_source()));
        self.render_loop
            .start(self.compositor.clone(), self.settings.subscribe());

        info!("Resumed live view");
        self.transition(from, ModeEvent::ToggleFreeze, CaptureMode::Live(live));
    }

    /// Record button: freeze if recording, otherwise start a new recorder
    pub fn record_or_freeze(&mut self) -> CamViewResult<()> {
        let mode = self.mode.kind();
        let CaptureMode::Live(live) = &mut self.mode else {
            debug!("Record ignored in {} mode", mode);
            return Ok(());
        };

        if live.recorder.is_some() {
            return self.freeze();
        }

        live.recorder = start_recorder(live.subscriber.as_ref());
        if live.recorder.is_some() {
            self.meter.reset();
        }
        Ok(())
    }

    /// Step playback by `delta_frames` while frozen and redraw.
    ///
    /// Returns the new position, or `None` outside frozen mode.
    pub fn scrub(&mut self, delta_frames: i32) -> Option<Duration> {
        let playback = self.frozen_playback()?;
        let position = scrub_position(
            playback.position(),
            delta_frames,
            self.config.scrub_frame_rate,
            playback.duration(),
        );
        self.show_position(playback.as_ref(), position);
        Some(position)
    }

    /// Jump to `seconds` while frozen and redraw
    pub fn seek(&mut self, seconds: f64) -> Option<Duration> {
        let playback = self.frozen_playback()?;
        let position = clamp_position(seconds, playback.duration());
        self.show_position(playback.as_ref(), position);
        Some(position)
    }

    fn frozen_playback(&self) -> Option<Arc<dyn PlaybackSource>> {
        match &self.mode {
            CaptureMode::Frozen(frozen) => Some(frozen.playback.clone()),
            _ => {
                debug!("Playback control ignored in {} mode", self.mode.kind());
                None
            }
        }
    }

    fn show_position(&self, playback: &dyn PlaybackSource, position: Duration) {
        playback.seek(position);
        debug!("Playback at {:?}", position);
        self.redraw();
    }

    /// Materialise the recording for saving. Only available while frozen.
    pub fn export(&self) -> Option<RecordingExport> {
        let CaptureMode::Frozen(frozen) = &self.mode else {
            debug!("Export ignored in {} mode", self.mode.kind());
            return None;
        };

        let blob = frozen
            .live
            .recorder
            .as_ref()
            .map(|recorder| recorder.snapshot_blob())
            .unwrap_or_else(|| frozen.blob.clone());
        let file_name = format!("recording-{}.webm", chrono::Utc::now().timestamp_millis());

        info!("Exporting {} ({} bytes)", file_name, blob.len());
        Some(RecordingExport { file_name, blob })
    }

    fn transition(&mut self, from: ModeKind, event: ModeEvent, mode: CaptureMode) {
        let to = mode.kind();
        debug_assert_eq!(from.next(event), to, "unexpected transition on {:?}", event);

        self.mode = mode;
        if from != to {
            info!("Capture mode {} -> {}", from, to);
            self.events.emit(Event::ModeChanged { from, to });
        }
    }

    fn redraw(&self) -> bool {
        let settings = *self.settings.borrow();
        self.compositor.lock().draw(&settings)
    }

    // ------------------------------------------------------------------
    // Settings and device control
    // ------------------------------------------------------------------

    /// Apply a settings page change
    pub async fn apply_settings_command(&mut self, command: SettingsCommand) -> CamViewResult<()> {
        let current = self.canvas_settings();
        match command.apply(current, &mut self.transform) {
            CommandTarget::Canvas(settings) => {
                self.settings.send_replace(settings);
                if self.mode.kind() == ModeKind::Frozen {
                    self.redraw();
                }
            }
            CommandTarget::Device(request) => self.send_device_request(request).await?,
            CommandTarget::View => debug!("View transform now {:?}", self.transform),
        }
        Ok(())
    }

    async fn send_device_request(&self, request: DeviceRequest) -> CamViewResult<()> {
        let control = match request {
            DeviceRequest::Control(control) => control,
            DeviceRequest::Index(index) => {
                let device_id = self
                    .subscribed_user()
                    .and_then(|user| user.device_id_at(index));
                match device_id {
                    Some(device_id) => CameraControl::device(device_id),
                    None => {
                        debug!("No video input at index {}", index);
                        return Ok(());
                    }
                }
            }
        };

        self.send_command(DeviceCommand::UpdateCamera(control)).await
    }

    /// Ask the subscribed device to toggle its audio mute
    pub async fn flip_sound(&self) -> CamViewResult<()> {
        self.send_command(DeviceCommand::FlipSound).await
    }

    /// Ask the subscribed device to leave the session
    pub async fn disconnect_device(&self) -> CamViewResult<()> {
        self.send_command(DeviceCommand::Disconnect).await
    }

    // ------------------------------------------------------------------
    // Throughput
    // ------------------------------------------------------------------

    /// Take one throughput sample.
    ///
    /// While frozen the playback source is also refreshed from the growing
    /// recording and kept at its position.
    pub fn sample_throughput(&mut self) -> ThroughputSample {
        let size = self
            .mode
            .live()
            .and_then(|live| live.recorder.as_ref())
            .filter(|recorder| recorder.is_recording())
            .map(|recorder| recorder.len());

        let sample = self.meter.sample(size);
        self.refresh_frozen_playback();
        self.events.emit(Event::ThroughputUpdated {
            bytes_per_second: sample.bytes_per_second,
            total_bytes: sample.total_bytes,
        });
        sample
    }

    fn refresh_frozen_playback(&mut self) {
        let CaptureMode::Frozen(frozen) = &mut self.mode else {
            return;
        };
        let Some(blob) = frozen.live.recorder.as_ref().map(|r| r.snapshot_blob()) else {
            return;
        };

        match self.decoder.open(blob.clone()) {
            Ok(playback) => {
                let position = frozen.playback.position();
                playback.seek(position.min(playback.duration()));
                frozen.blob = blob;
                frozen.playback = playback.clone();
                self.compositor
                    .lock()
                    .set_source(ActiveSource::Playback(playback));
            }
            Err(e) => {
                warn!("Refreshing frozen playback failed: {}", e);
                return;
            }
        }

        self.redraw();
    }

    // ------------------------------------------------------------------
    // Presentation
    // ------------------------------------------------------------------

    /// Subscribe to viewer events
    pub fn events(&mut self) -> EventStream {
        self.events.subscribe()
    }

    fn notice(&mut self, message: &str) {
        self.events.emit(Event::Notice {
            message: message.to_string(),
            duration: self.config.notice_duration,
        });
    }

    /// Current capture mode
    pub fn mode(&self) -> ModeKind {
        self.mode.kind()
    }

    /// Known users in arrival order
    pub fn users(&self) -> &[User] {
        self.directory.users()
    }

    /// List position of the subscribed user
    pub fn selected_index(&self) -> Option<usize> {
        let live = self.mode.live()?;
        self.directory.index_of_stream(&live.stream.stream_id)
    }

    /// The subscribed user
    pub fn subscribed_user(&self) -> Option<&User> {
        let live = self.mode.live()?;
        self.directory.get_by_stream(&live.stream.stream_id)
    }

    /// Current canvas settings
    pub fn canvas_settings(&self) -> CanvasSettings {
        *self.settings.borrow()
    }

    /// Current view orientation
    pub fn view_transform(&self) -> ViewTransform {
        self.transform
    }

    /// Whether the subscribed stream is being recorded
    pub fn is_recording(&self) -> bool {
        self.mode
            .live()
            .and_then(|live| live.recorder.as_ref())
            .is_some_and(|recorder| recorder.is_recording())
    }

    /// Bytes recorded for the current subscription
    pub fn recorded_bytes(&self) -> Option<usize> {
        self.mode
            .live()
            .and_then(|live| live.recorder.as_ref())
            .map(|recorder| recorder.len())
    }

    /// Latest throughput sample
    pub fn throughput(&self) -> ThroughputSample {
        self.meter.last()
    }

    /// Playback position while frozen
    pub fn playback_position(&self) -> Option<Duration> {
        match &self.mode {
            CaptureMode::Frozen(frozen) => Some(frozen.playback.position()),
            _ => None,
        }
    }

    /// Length of the frozen recording
    pub fn playback_duration(&self) -> Option<Duration> {
        match &self.mode {
            CaptureMode::Frozen(frozen) => Some(frozen.playback.duration()),
            _ => None,
        }
    }

    /// Whether a render tick is scheduled
    pub fn is_rendering(&self) -> bool {
        self.render_loop.is_running()
    }

    /// Compositor holding the display surface
    pub fn compositor(&self) -> SharedCompositor {
        self.compositor.clone()
    }

    /// Active configuration
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("mode", &self.mode.kind())
            .field("connected", &self.session.is_some())
            .field("users", &self.directory.len())
            .field("settings", &self.canvas_settings())
            .finish_non_exhaustive()
    }
}

fn start_recorder(subscriber: &dyn Subscriber) -> Option<LocalRecorder> {
    let mut recorder = LocalRecorder::new();
    recorder
        .start(subscriber.recording_source().as_ref())
        .then_some(recorder)
}

fn transport_unavailable(server: &str, error: CamViewError) -> CamViewError {
    match error {
        e @ CamViewError::TransportUnavailable { .. } => e,
        other => CamViewError::TransportUnavailable {
            server: server.to_string(),
            reason: other.to_string(),
        },
    }
}
