//! Frame buffers and frame sources

use crate::error::{MediaError, MediaResult};

/// Bytes per RGBA pixel
pub const CHANNELS: usize = 4;

/// Decoded RGBA video frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel data, row-major RGBA
    pub data: Vec<u8>,
    /// Timestamp in milliseconds
    pub timestamp: u64,
}

impl VideoFrame {
    /// Create a frame, checking that `data` holds exactly `width * height` pixels
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> MediaResult<Self> {
        let expected = Self::byte_len(width, height);
        if data.len() != expected {
            return Err(MediaError::InvalidFrameData {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
            timestamp: 0,
        })
    }

    /// Transparent black frame
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; Self::byte_len(width, height)],
            timestamp: 0,
        }
    }

    /// Frame filled with a single RGBA color
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba
            .iter()
            .copied()
            .cycle()
            .take(Self::byte_len(width, height))
            .collect();
        Self {
            width,
            height,
            data,
            timestamp: 0,
        }
    }

    /// Set the frame timestamp
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Number of bytes a `width x height` RGBA frame occupies
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * CHANNELS
    }

    /// Whether the frame has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Byte offset of pixel `(x, y)`
    pub fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    /// RGBA value of pixel `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let off = self.offset(x, y);
        [
            self.data[off],
            self.data[off + 1],
            self.data[off + 2],
            self.data[off + 3],
        ]
    }

    /// Overwrite pixel `(x, y)`
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let off = self.offset(x, y);
        self.data[off..off + CHANNELS].copy_from_slice(&rgba);
    }
}

/// Anything that can hand the render loop its current frame.
///
/// Implemented by the live subscription feed and by blob playback.
pub trait FrameSource: Send + Sync {
    /// Latest decodable frame, or `None` if nothing is available yet
    fn current_frame(&self) -> Option<VideoFrame>;
}
