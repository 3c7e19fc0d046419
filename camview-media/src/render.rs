//! Frame render loop
//!
//! The [`Compositor`] owns the display surface and the active frame source and
//! draws one frame per call. The [`RenderLoop`] drives the compositor once per
//! display tick on a background task; it reads the canvas settings from a
//! `watch` channel whose sender belongs to the capture state machine.

use crate::filter::{sharpen, CanvasSettings, Kernel};
use crate::frame::FrameSource;
use crate::playback::PlaybackSource;
use crate::surface::DisplaySurface;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, trace};

/// Default display refresh rate
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Where the compositor pulls frames from
#[derive(Clone)]
pub enum ActiveSource {
    /// Live subscription feed
    Live(Arc<dyn FrameSource>),
    /// Random-access playback of a recorded blob
    Playback(Arc<dyn PlaybackSource>),
}

impl ActiveSource {
    fn current_frame(&self) -> Option<crate::frame::VideoFrame> {
        match self {
            ActiveSource::Live(source) => source.current_frame(),
            ActiveSource::Playback(source) => source.current_frame(),
        }
    }

    /// Whether the source is the live feed
    pub fn is_live(&self) -> bool {
        matches!(self, ActiveSource::Live(_))
    }
}

impl fmt::Debug for ActiveSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveSource::Live(_) => f.write_str("ActiveSource::Live"),
            ActiveSource::Playback(_) => f.write_str("ActiveSource::Playback"),
        }
    }
}

/// Render statistics
#[derive(Debug, Default, Clone)]
pub struct RenderStats {
    /// Frames painted onto the surface
    pub frames_drawn: u64,
    /// Draw calls that found no frame to paint
    pub frames_skipped: u64,
    /// Duration of the last successful draw
    pub last_draw_time: Option<Duration>,
}

/// Paints the active source onto the display surface
#[derive(Debug, Default)]
pub struct Compositor {
    surface: DisplaySurface,
    source: Option<ActiveSource>,
    kernel: Kernel,
    stats: RenderStats,
}

/// Compositor shared between the render task and the state machine
pub type SharedCompositor = Arc<Mutex<Compositor>>;

impl Compositor {
    /// Create a compositor with an empty surface and no source
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in the shared handle used by [`RenderLoop`]
    pub fn shared() -> SharedCompositor {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Replace the active source
    pub fn set_source(&mut self, source: ActiveSource) {
        debug!("Compositor source set to {:?}", source);
        self.source = Some(source);
    }

    /// Drop the active source; subsequent draws are skipped
    pub fn clear_source(&mut self) {
        self.source = None;
    }

    /// Active source, if any
    pub fn source(&self) -> Option<&ActiveSource> {
        self.source.as_ref()
    }

    /// Current display surface
    pub fn surface(&self) -> &DisplaySurface {
        &self.surface
    }

    /// Render statistics
    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    /// Draw one frame: color stage while compositing, then the sharpen pass.
    ///
    /// While the live feed is active the surface follows the feed's frame
    /// size; during playback it keeps its size. Returns `false` when there was
    /// nothing to draw.
    pub fn draw(&mut self, settings: &CanvasSettings) -> bool {
        let Some(frame) = self.source.as_ref().and_then(|s| s.current_frame()) else {
            self.stats.frames_skipped += 1;
            return false;
        };

        let started = Instant::now();

        let live = self.source.as_ref().is_some_and(|s| s.is_live());
        if live && (frame.width != self.surface.width() || frame.height != self.surface.height())
        {
            debug!("Resizing surface to {}x{}", frame.width, frame.height);
            self.surface.resize(frame.width, frame.height);
        }

        self.surface
            .composite(&frame, &settings.color_adjustment());
        if settings.sharpness != 0 {
            sharpen(self.surface.frame_mut(), &self.kernel, settings.sharpness);
        }

        self.stats.frames_drawn += 1;
        self.stats.last_draw_time = Some(started.elapsed());
        true
    }
}

/// Drives a [`Compositor`] once per display tick
#[derive(Debug)]
pub struct RenderLoop {
    frame_interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl RenderLoop {
    /// Create a stopped render loop ticking at `target_fps`
    pub fn new(target_fps: u32) -> Self {
        let frame_interval = if target_fps > 0 {
            Duration::from_nanos(1_000_000_000 / target_fps as u64)
        } else {
            Duration::from_millis(1)
        };

        Self {
            frame_interval,
            task: None,
        }
    }

    /// Interval between ticks
    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Start ticking. A running loop is cancelled and restarted.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, compositor: SharedCompositor, settings: watch::Receiver<CanvasSettings>) {
        self.stop();

        let frame_interval = self.frame_interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let current = *settings.borrow();
                let drawn = compositor.lock().draw(&current);
                trace!("Render tick (drawn: {})", drawn);
            }
        });

        self.task = Some(task);
        info!("Render loop started ({:?} per frame)", frame_interval);
    }

    /// Stop ticking. No further ticks run after this returns; stopping a
    /// stopped loop is a no-op.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Render loop stopped");
        }
    }

    /// Whether a tick is scheduled
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
