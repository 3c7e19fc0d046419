//! Convolution and color filters for the display canvas
//!
//! Two independent stages run on every rendered frame:
//! - color adjustment (brightness, contrast, grayscale) applied while the source
//!   is composited, expressed in percent with 100/100/0 as the neutral point;
//! - an optional sharpen pass that convolves the composited surface with a
//!   weighted kernel and blends the result with the original pixels.

use crate::error::{MediaError, MediaResult};
use crate::frame::{VideoFrame, CHANNELS};
use serde::{Deserialize, Serialize};

/// Largest accepted sharpness value
pub const MAX_SHARPNESS: u16 = 200;
/// Largest accepted brightness percentage
pub const MAX_BRIGHTNESS: u16 = 200;
/// Largest accepted contrast percentage
pub const MAX_CONTRAST: u16 = 200;
/// Largest accepted grayscale percentage
pub const MAX_GRAYSCALE: u16 = 100;

/// Largest mix factor the sharpen pass accepts (`MAX_SHARPNESS / 100`)
pub const MAX_MIX: f32 = MAX_SHARPNESS as f32 / 100.0;

const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Postprocessing settings of the display canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSettings {
    /// Brightness in percent, 100 = unchanged
    pub brightness: u16,
    /// Contrast in percent, 100 = unchanged
    pub contrast: u16,
    /// Grayscale in percent, 0 = unchanged, 100 = fully desaturated
    pub grayscale: u16,
    /// Sharpness 0..=200, 0 disables the sharpen pass
    pub sharpness: u16,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            grayscale: 0,
            sharpness: 0,
        }
    }
}

impl CanvasSettings {
    /// Color stage derived from these settings
    pub fn color_adjustment(&self) -> ColorAdjustment {
        ColorAdjustment {
            brightness: self.brightness,
            contrast: self.contrast,
            grayscale: self.grayscale,
        }
    }

    /// Mix factor of the sharpen pass, `None` when sharpening is disabled
    pub fn sharpen_mix(&self) -> Option<f32> {
        if self.sharpness == 0 {
            None
        } else {
            Some(self.sharpness.min(MAX_SHARPNESS) as f32 / 100.0)
        }
    }
}

/// Square convolution kernel
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    side: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Build a kernel from row-major weights; the count must be an odd square
    pub fn new(weights: Vec<f32>) -> MediaResult<Self> {
        let side = (weights.len() as f64).sqrt().round() as usize;
        if side == 0 || side * side != weights.len() || side % 2 == 0 {
            return Err(MediaError::InvalidConfiguration {
                message: format!("kernel needs an odd square weight count, got {}", weights.len()),
            });
        }
        Ok(Self { side, weights })
    }

    /// The 3x3 unsharp-mask kernel
    pub fn sharpen() -> Self {
        Self {
            side: 3,
            weights: vec![0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0],
        }
    }

    /// Kernel side length
    pub fn side(&self) -> usize {
        self.side
    }

    /// Half window, `floor(side / 2)`
    pub fn half(&self) -> usize {
        self.side / 2
    }

    /// Weight at kernel row `cy`, column `cx`
    pub fn weight(&self, cx: usize, cy: usize) -> f32 {
        self.weights[cy * self.side + cx]
    }
}

impl Default for Kernel {
    fn default() -> Self {
        Self::sharpen()
    }
}

/// Convolve `src` with `kernel` and blend with the source by `mix`.
///
/// For every pixel and color channel the output is
/// `mix * convolved + (1 - mix) * src`; alpha is copied from the source.
/// Kernel taps that fall outside the image contribute nothing.
pub fn convolve(src: &VideoFrame, kernel: &Kernel, mix: f32) -> VideoFrame {
    debug_assert!(
        (0.0..=MAX_MIX).contains(&mix),
        "sharpen mix {} out of range",
        mix
    );
    debug_assert_eq!(src.data.len(), VideoFrame::byte_len(src.width, src.height));

    let mut out = src.clone();
    if src.is_empty() {
        return out;
    }

    let w = src.width as isize;
    let h = src.height as isize;
    let half = kernel.half() as isize;
    let side = kernel.side();
    let keep = 1.0 - mix;

    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];

            for cy in 0..side {
                let sy = y + cy as isize - half;
                if sy < 0 || sy >= h {
                    continue;
                }
                for cx in 0..side {
                    let sx = x + cx as isize - half;
                    if sx < 0 || sx >= w {
                        continue;
                    }
                    let wt = kernel.weight(cx, cy);
                    let off = ((sy * w + sx) as usize) * CHANNELS;
                    acc[0] += src.data[off] as f32 * wt;
                    acc[1] += src.data[off + 1] as f32 * wt;
                    acc[2] += src.data[off + 2] as f32 * wt;
                }
            }

            let off = ((y * w + x) as usize) * CHANNELS;
            for c in 0..3 {
                out.data[off + c] = to_channel(acc[c] * mix + src.data[off + c] as f32 * keep);
            }
        }
    }

    out
}

/// Run the sharpen pass over `frame` in place.
///
/// `sharpness == 0` skips the convolution entirely.
pub fn sharpen(frame: &mut VideoFrame, kernel: &Kernel, sharpness: u16) {
    let settings = CanvasSettings {
        sharpness,
        ..CanvasSettings::default()
    };
    if let Some(mix) = settings.sharpen_mix() {
        *frame = convolve(frame, kernel, mix);
    }
}

/// Brightness / contrast / grayscale compositing filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorAdjustment {
    /// Brightness in percent
    pub brightness: u16,
    /// Contrast in percent
    pub contrast: u16,
    /// Grayscale in percent
    pub grayscale: u16,
}

impl Default for ColorAdjustment {
    fn default() -> Self {
        CanvasSettings::default().color_adjustment()
    }
}

impl ColorAdjustment {
    /// Whether applying this adjustment leaves every pixel unchanged
    pub fn is_identity(&self) -> bool {
        self.brightness == 100 && self.contrast == 100 && self.grayscale == 0
    }

    /// Apply brightness, then contrast, then grayscale to every pixel.
    ///
    /// Each stage clamps its result to the displayable range before the
    /// next one runs. Alpha is untouched.
    pub fn apply(&self, frame: &mut VideoFrame) {
        if self.is_identity() || frame.is_empty() {
            return;
        }

        let brightness = self.brightness as f32 / 100.0;
        let contrast = self.contrast as f32 / 100.0;
        let grayscale = self.grayscale.min(MAX_GRAYSCALE) as f32 / 100.0;

        for px in frame.data.chunks_exact_mut(CHANNELS) {
            let mut rgb = [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            ];

            for c in rgb.iter_mut() {
                *c = (*c * brightness).clamp(0.0, 1.0);
                *c = ((*c - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
            }

            if grayscale > 0.0 {
                let luma = LUMA_R * rgb[0] + LUMA_G * rgb[1] + LUMA_B * rgb[2];
                for c in rgb.iter_mut() {
                    *c = (*c + (luma - *c) * grayscale).clamp(0.0, 1.0);
                }
            }

            for (dst, c) in px.iter_mut().zip(rgb) {
                *dst = to_channel(c * 255.0);
            }
        }
    }
}

fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_validation() {
        assert!(Kernel::new(vec![1.0; 9]).is_ok());
        assert!(Kernel::new(vec![1.0; 25]).is_ok());
        assert!(Kernel::new(vec![1.0; 4]).is_err());
        assert!(Kernel::new(vec![1.0; 8]).is_err());
        assert!(Kernel::new(vec![]).is_err());

        let kernel = Kernel::sharpen();
        assert_eq!(kernel.side(), 3);
        assert_eq!(kernel.half(), 1);
        assert_eq!(kernel.weight(1, 1), 5.0);
    }

    #[test]
    fn test_sharpen_mix_from_settings() {
        let mut settings = CanvasSettings::default();
        assert_eq!(settings.sharpen_mix(), None);
        settings.sharpness = 50;
        assert_eq!(settings.sharpen_mix(), Some(0.5));
        settings.sharpness = 200;
        assert_eq!(settings.sharpen_mix(), Some(2.0));
    }

    #[test]
    fn test_uniform_interior_is_stable() {
        // Interior taps of the sharpen kernel sum to 1, so a flat image keeps
        // its value away from the border.
        let src = VideoFrame::solid(5, 5, [80, 80, 80, 255]);
        let out = convolve(&src, &Kernel::sharpen(), 1.0);
        assert_eq!(out.pixel(2, 2), [80, 80, 80, 255]);
    }

    #[test]
    fn test_color_identity() {
        let mut frame = VideoFrame::solid(2, 2, [12, 140, 250, 90]);
        let before = frame.clone();
        ColorAdjustment::default().apply(&mut frame);
        assert_eq!(frame, before);
    }
}
