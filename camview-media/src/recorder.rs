//! Local recording of the subscribed stream
//!
//! The recorder accumulates the encoded segments a [`RecordingSource`] emits
//! into an append-only buffer. Snapshots of the buffer can be taken at any time
//! without interrupting accumulation; each snapshot is an independent,
//! immutable [`Blob`].

use crate::error::{MediaError, MediaResult};
use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Producer of encoded media segments for one stream
pub trait RecordingSource: Send + Sync {
    /// Whether the stream can deliver media yet
    fn is_deliverable(&self) -> bool;

    /// Open the segment feed. Returns `None` if the feed is unavailable or
    /// was already handed out.
    fn open_segments(&self) -> Option<mpsc::UnboundedReceiver<Bytes>>;
}

/// Immutable snapshot of recorded bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob {
    bytes: Bytes,
}

impl Blob {
    /// Wrap recorded bytes
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Recorded bytes
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Take the recorded bytes
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Self::new(Bytes::from(data))
    }
}

/// Recorder lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    /// Created or cleared, not accumulating
    Ready,
    /// Accumulating segments
    Recording,
    /// Stopped, or the source closed its feed; buffered data is still available
    Finished,
}

/// Buffers the subscribed stream into a retrievable blob
#[derive(Debug)]
pub struct LocalRecorder {
    buffer: Arc<Mutex<BytesMut>>,
    state: RecorderState,
    feed_closed: Arc<AtomicBool>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl LocalRecorder {
    /// Create an idle recorder
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(BytesMut::new())),
            state: RecorderState::Ready,
            feed_closed: Arc::new(AtomicBool::new(false)),
            stop_tx: None,
            task: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> RecorderState {
        match self.state {
            RecorderState::Recording if self.feed_closed.load(Ordering::Acquire) => {
                RecorderState::Finished
            }
            state => state,
        }
    }

    /// Whether segments are being accumulated
    pub fn is_recording(&self) -> bool {
        self.state() == RecorderState::Recording
    }

    /// Bytes buffered so far
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Whether nothing has been buffered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Begin accumulating segments from `source`.
    ///
    /// Returns `false` and stays idle if the source cannot deliver yet.
    /// Starting a recorder that is already recording is a no-op.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, source: &dyn RecordingSource) -> bool {
        if self.is_recording() {
            return true;
        }

        if !source.is_deliverable() {
            warn!("Recording source not deliverable, recorder stays idle");
            return false;
        }

        let Some(mut segments) = source.open_segments() else {
            warn!("Recording source has no segment feed, recorder stays idle");
            return false;
        };

        let (stop_tx, mut stop_rx) = oneshot::channel();
        let buffer = self.buffer.clone();
        let feed_closed = Arc::new(AtomicBool::new(false));
        self.feed_closed = feed_closed.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    segment = segments.recv() => match segment {
                        Some(segment) => buffer.lock().extend_from_slice(&segment),
                        None => {
                            debug!("Recording source closed");
                            feed_closed.store(true, Ordering::Release);
                            return;
                        }
                    }
                }
            }

            // Segments delivered before the stop request still belong to the recording
            while let Ok(segment) = segments.try_recv() {
                buffer.lock().extend_from_slice(&segment);
            }
        });

        self.stop_tx = Some(stop_tx);
        self.task = Some(task);
        self.state = RecorderState::Recording;
        info!("Local recorder started");
        true
    }

    /// Snapshot everything buffered so far without interrupting accumulation.
    ///
    /// Yields an empty blob if nothing was buffered yet.
    pub fn snapshot_blob(&self) -> Blob {
        let buffer = self.buffer.lock();
        Blob::new(Bytes::copy_from_slice(&buffer[..]))
    }

    /// Finish accumulation, waiting for in-flight segments to land.
    ///
    /// Snapshots stay valid afterwards. Stopping an idle recorder is a no-op.
    pub async fn stop(&mut self) {
        if self.state != RecorderState::Recording {
            return;
        }

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Recorder task ended abnormally: {}", e);
            }
        }

        self.state = RecorderState::Finished;
        info!("Local recorder stopped ({} bytes)", self.len());
    }

    /// Release all buffered data. Only valid once the recorder is stopped.
    pub fn clear(&mut self) -> MediaResult<()> {
        if self.is_recording() {
            return Err(MediaError::InvalidState {
                message: "cannot clear a recorder that is still recording".to_string(),
            });
        }

        self.stop_tx = None;
        self.task = None;
        *self.buffer.lock() = BytesMut::new();
        self.state = RecorderState::Ready;
        debug!("Local recorder cleared");
        Ok(())
    }
}

impl Default for LocalRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_recorder_is_ready_and_empty() {
        let recorder = LocalRecorder::new();
        assert_eq!(recorder.state(), RecorderState::Ready);
        assert!(recorder.snapshot_blob().is_empty());
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_blob_from_vec() {
        let blob = Blob::from(vec![1, 2, 3]);
        assert_eq!(blob.len(), 3);
        assert_eq!(blob.bytes().as_ref(), &[1, 2, 3]);
    }
}
