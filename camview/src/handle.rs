//! Shared viewer handle and background tasks

use crate::controls::KeyboardControls;
use crate::viewer::Viewer;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::trace;

/// Cloneable handle to a [`Viewer`] shared between tasks.
///
/// Every operation goes through one async lock, so transitions never
/// interleave.
#[derive(Debug, Clone)]
pub struct ViewerHandle {
    inner: Arc<Mutex<Viewer>>,
    pending: Arc<Notify>,
    throughput_interval: Duration,
    key_repeat_interval: Duration,
}

impl ViewerHandle {
    /// Wrap a viewer
    pub fn new(viewer: Viewer) -> Self {
        Self {
            pending: viewer.pending_events(),
            throughput_interval: viewer.config().throughput_interval,
            key_repeat_interval: viewer.config().key_repeat_interval,
            inner: Arc::new(Mutex::new(viewer)),
        }
    }

    /// Lock the viewer
    pub async fn lock(&self) -> MutexGuard<'_, Viewer> {
        self.inner.lock().await
    }

    /// Keyboard transport controls repeating at the configured key interval
    pub fn keyboard_controls(&self) -> KeyboardControls {
        KeyboardControls::new(self.clone(), self.key_repeat_interval)
    }

    /// Apply session events as they arrive
    pub fn spawn_event_pump(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let pending = self.pending.clone();

        tokio::spawn(async move {
            loop {
                pending.notified().await;
                let handled = inner.lock().await.process_events().await;
                trace!("Event pump handled {} events", handled);
            }
        })
    }

    /// Sample recording throughput every configured interval
    pub fn spawn_throughput_sampler(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let period = self.throughput_interval;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                inner.lock().await.sample_throughput();
            }
        })
    }
}
