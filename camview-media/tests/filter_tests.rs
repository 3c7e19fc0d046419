//! Tests for the convolution and color filters
//!
//! Covers the sharpen identity at zero mix, alpha passthrough, border handling,
//! clamping, and the brightness / contrast / grayscale stage.

use camview_media::*;

fn gradient(width: u32, height: u32) -> VideoFrame {
    let mut data = Vec::with_capacity(VideoFrame::byte_len(width, height));
    for y in 0..height {
        for x in 0..width {
            let base = (x * 37 + y * 91) as u8;
            data.extend_from_slice(&[base, base.wrapping_mul(3), 255 - base, (x * 40 + y) as u8]);
        }
    }
    VideoFrame::new(width, height, data).unwrap()
}

fn cross(center: u8, neighbours: u8) -> VideoFrame {
    let mut frame = VideoFrame::solid(3, 3, [neighbours, neighbours, neighbours, 255]);
    frame.set_pixel(1, 1, [center, center, center, 255]);
    frame
}

// ============================================================================
// SHARPEN TESTS
// ============================================================================

#[test]
fn test_zero_mix_is_identity() {
    let src = gradient(7, 5);
    let out = convolve(&src, &Kernel::sharpen(), 0.0);
    assert_eq!(out, src);
}

#[test]
fn test_zero_sharpness_shortcut_agrees_with_identity() {
    let src = gradient(6, 4);

    let mut shortcut = src.clone();
    sharpen(&mut shortcut, &Kernel::sharpen(), 0);

    assert_eq!(shortcut, src);
    assert_eq!(shortcut, convolve(&src, &Kernel::sharpen(), 0.0));
}

#[test]
fn test_alpha_passes_through_for_any_mix() {
    let src = gradient(5, 5);
    for mix in [0.0, 0.25, 0.5, 1.0, 2.0] {
        let out = convolve(&src, &Kernel::sharpen(), mix);
        for y in 0..src.height {
            for x in 0..src.width {
                assert_eq!(
                    out.pixel(x, y)[3],
                    src.pixel(x, y)[3],
                    "alpha changed at ({}, {}) with mix {}",
                    x,
                    y,
                    mix
                );
            }
        }
    }
}

#[test]
fn test_border_pixels_sum_fewer_taps() {
    let src = VideoFrame::solid(3, 3, [40, 40, 40, 255]);
    let out = convolve(&src, &Kernel::sharpen(), 1.0);

    // corner: 5*40 - 2*40
    assert_eq!(out.pixel(0, 0), [120, 120, 120, 255]);
    // edge: 5*40 - 3*40
    assert_eq!(out.pixel(1, 0), [80, 80, 80, 255]);
    // interior: 5*40 - 4*40
    assert_eq!(out.pixel(1, 1), [40, 40, 40, 255]);
}

#[test]
fn test_full_mix_clamps_to_channel_range() {
    let src = VideoFrame::solid(3, 3, [200, 200, 200, 255]);
    let out = convolve(&src, &Kernel::sharpen(), 1.0);
    assert_eq!(out.pixel(0, 0), [255, 255, 255, 255]);

    let dark = cross(0, 100);
    let out = convolve(&dark, &Kernel::sharpen(), 1.0);
    assert_eq!(out.pixel(1, 1), [0, 0, 0, 255]);
}

#[test]
fn test_partial_mix_blends_with_source() {
    // center: convolved 5*100 - 4*50 = 300, blended 0.5*300 + 0.5*100 = 200
    let src = cross(100, 50);
    let out = convolve(&src, &Kernel::sharpen(), 0.5);
    assert_eq!(out.pixel(1, 1), [200, 200, 200, 255]);
}

#[test]
fn test_sharpen_in_place_uses_sharpness_percent() {
    let src = cross(100, 50);
    let mut frame = src.clone();
    sharpen(&mut frame, &Kernel::sharpen(), 50);
    assert_eq!(frame, convolve(&src, &Kernel::sharpen(), 0.5));
}

#[test]
fn test_empty_frame_is_noop() {
    let src = VideoFrame::blank(0, 4);
    let out = convolve(&src, &Kernel::sharpen(), 1.0);
    assert_eq!(out, src);

    let mut frame = VideoFrame::blank(3, 0);
    sharpen(&mut frame, &Kernel::sharpen(), 100);
    assert!(frame.data.is_empty());
}

// ============================================================================
// COLOR ADJUSTMENT TESTS
// ============================================================================

#[test]
fn test_neutral_settings_leave_pixels() {
    let mut frame = gradient(4, 4);
    let before = frame.clone();
    CanvasSettings::default().color_adjustment().apply(&mut frame);
    assert_eq!(frame, before);
}

#[test]
fn test_brightness_scales_and_clamps() {
    let adjust = ColorAdjustment {
        brightness: 200,
        ..ColorAdjustment::default()
    };
    let mut frame = VideoFrame::solid(1, 1, [100, 200, 0, 77]);
    adjust.apply(&mut frame);
    assert_eq!(frame.pixel(0, 0), [200, 255, 0, 77]);
}

#[test]
fn test_zero_contrast_is_mid_gray() {
    let adjust = ColorAdjustment {
        contrast: 0,
        ..ColorAdjustment::default()
    };
    let mut frame = VideoFrame::solid(2, 1, [0, 90, 255, 255]);
    adjust.apply(&mut frame);
    assert_eq!(frame.pixel(1, 0), [128, 128, 128, 255]);
}

#[test]
fn test_full_grayscale_uses_luma() {
    let adjust = ColorAdjustment {
        grayscale: 100,
        ..ColorAdjustment::default()
    };
    let mut frame = VideoFrame::solid(1, 1, [255, 0, 0, 255]);
    adjust.apply(&mut frame);
    assert_eq!(frame.pixel(0, 0), [54, 54, 54, 255]);
}

#[test]
fn test_half_grayscale_interpolates() {
    let adjust = ColorAdjustment {
        grayscale: 50,
        ..ColorAdjustment::default()
    };
    let mut frame = VideoFrame::solid(1, 1, [255, 0, 0, 10]);
    adjust.apply(&mut frame);
    assert_eq!(frame.pixel(0, 0), [155, 27, 27, 10]);
}
