//! Display surface the render loop paints into

use crate::filter::ColorAdjustment;
use crate::frame::{VideoFrame, CHANNELS};

/// RGBA canvas shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySurface {
    canvas: VideoFrame,
}

impl DisplaySurface {
    /// Create a transparent surface
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: VideoFrame::blank(width, height),
        }
    }

    /// Surface width in pixels
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Surface height in pixels
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Current canvas contents
    pub fn frame(&self) -> &VideoFrame {
        &self.canvas
    }

    /// Mutable canvas contents, used by in-place passes such as sharpening
    pub fn frame_mut(&mut self) -> &mut VideoFrame {
        &mut self.canvas
    }

    /// Resize the surface, clearing its contents
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.canvas.width != width || self.canvas.height != height {
            self.canvas = VideoFrame::blank(width, height);
        }
    }

    /// Draw `source` at the origin with the color stage applied.
    ///
    /// Pixels of the source that fall outside the surface are clipped.
    pub fn composite(&mut self, source: &VideoFrame, adjustment: &ColorAdjustment) {
        let mut layer = source.clone();
        adjustment.apply(&mut layer);

        let cols = self.canvas.width.min(layer.width) as usize;
        let rows = self.canvas.height.min(layer.height) as usize;
        let row_bytes = cols * CHANNELS;

        for y in 0..rows {
            let src = layer.offset(0, y as u32);
            let dst = self.canvas.offset(0, y as u32);
            self.canvas.data[dst..dst + row_bytes]
                .copy_from_slice(&layer.data[src..src + row_bytes]);
        }
        self.canvas.timestamp = layer.timestamp;
    }
}

impl Default for DisplaySurface {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
