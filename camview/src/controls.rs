//! Keyboard transport controls
//!
//! Space toggles freeze. Left and right step one frame, up and down five.
//! Holding an arrow key repeats its step on a fixed interval.

use crate::handle::ViewerHandle;
use crate::viewer::Viewer;
use camview_core::CamViewResult;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

/// Keys bound to transport actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKey {
    /// Space bar
    Space,
    /// Left arrow
    ArrowLeft,
    /// Right arrow
    ArrowRight,
    /// Up arrow
    ArrowUp,
    /// Down arrow
    ArrowDown,
}

impl TransportKey {
    /// Map a key code such as `"ArrowLeft"`
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "Space" => Some(TransportKey::Space),
            "ArrowLeft" => Some(TransportKey::ArrowLeft),
            "ArrowRight" => Some(TransportKey::ArrowRight),
            "ArrowUp" => Some(TransportKey::ArrowUp),
            "ArrowDown" => Some(TransportKey::ArrowDown),
            _ => None,
        }
    }

    /// Action bound to the key
    pub fn action(self) -> TransportAction {
        match self {
            TransportKey::Space => TransportAction::ToggleFreeze,
            TransportKey::ArrowLeft => TransportAction::Scrub(-1),
            TransportKey::ArrowRight => TransportAction::Scrub(1),
            TransportKey::ArrowUp => TransportAction::Scrub(-5),
            TransportKey::ArrowDown => TransportAction::Scrub(5),
        }
    }

    /// Whether holding the key repeats its action
    pub fn repeats(self) -> bool {
        self != TransportKey::Space
    }
}

/// What a transport key does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportAction {
    /// Freeze or resume
    ToggleFreeze,
    /// Step playback by this many frames
    Scrub(i32),
}

impl TransportAction {
    /// Run the action on `viewer`
    pub fn perform(self, viewer: &mut Viewer) -> CamViewResult<()> {
        match self {
            TransportAction::ToggleFreeze => viewer.toggle_freeze(),
            TransportAction::Scrub(frames) => {
                viewer.scrub(frames);
                Ok(())
            }
        }
    }
}

/// Turns key presses into transport actions, including auto-repeat
#[derive(Debug)]
pub struct KeyboardControls {
    viewer: ViewerHandle,
    repeat_interval: Duration,
    repeating: Option<(TransportKey, JoinHandle<()>)>,
}

impl KeyboardControls {
    /// Controls for `viewer`, repeating held arrows every `repeat_interval`
    /// (at least 1ms)
    pub fn new(viewer: ViewerHandle, repeat_interval: Duration) -> Self {
        Self {
            viewer,
            repeat_interval: repeat_interval.max(Duration::from_millis(1)),
            repeating: None,
        }
    }

    /// Handle a key press. `repeat` is set for auto-repeated presses of a
    /// held key.
    pub async fn key_down(&mut self, code: &str, repeat: bool) -> CamViewResult<()> {
        let key = TransportKey::from_code(code);

        if !repeat {
            if let Some(key) = key {
                let mut viewer = self.viewer.lock().await;
                key.action().perform(&mut viewer)?;
            }
            return Ok(());
        }

        if matches!(&self.repeating, Some((active, _)) if Some(*active) == key) {
            return Ok(());
        }
        self.stop_repeat();

        let Some(key) = key.filter(|key| key.repeats()) else {
            return Ok(());
        };

        let viewer = self.viewer.clone();
        let period = self.repeat_interval;
        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let mut viewer = viewer.lock().await;
                if let Err(e) = key.action().perform(&mut viewer) {
                    debug!("Repeated {:?} failed: {}", key, e);
                }
            }
        });

        debug!("Repeating {:?} every {:?}", key, period);
        self.repeating = Some((key, task));
        Ok(())
    }

    /// Handle a key release
    pub fn key_up(&mut self) {
        self.stop_repeat();
    }

    /// Key currently auto-repeating
    pub fn repeating_key(&self) -> Option<TransportKey> {
        self.repeating.as_ref().map(|(key, _)| *key)
    }

    fn stop_repeat(&mut self) {
        if let Some((_, task)) = self.repeating.take() {
            task.abort();
        }
    }
}

impl Drop for KeyboardControls {
    fn drop(&mut self) {
        self.stop_repeat();
    }
}
