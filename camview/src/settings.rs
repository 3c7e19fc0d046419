//! Settings commands and view orientation
//!
//! Every change made from the settings page is expressed as a
//! [`SettingsCommand`]. Canvas commands change the local postprocessing, device
//! commands are forwarded to the subscribed device, and view commands change
//! how the canvas is presented.

use camview_media::filter::{MAX_BRIGHTNESS, MAX_CONTRAST, MAX_GRAYSCALE, MAX_SHARPNESS};
use camview_media::CanvasSettings;
use camview_signaling::CameraControl;
use serde::{Deserialize, Serialize};

/// Smallest wheel zoom factor
pub const MIN_SCALE: f64 = 0.75;
/// Largest wheel zoom factor
pub const MAX_SCALE: f64 = 3.0;
/// Scale change per wheel delta unit
pub const WHEEL_SCALE_STEP: f64 = -0.005;

/// A change requested from the settings page
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsCommand {
    /// Canvas brightness in percent
    SetBrightness(u16),
    /// Canvas contrast in percent
    SetContrast(u16),
    /// Canvas grayscale in percent
    SetGrayscale(u16),
    /// Canvas sharpness, 0 disables sharpening
    SetSharpness(u16),
    /// Switch the device to its n-th advertised video input
    SetDeviceIndex(usize),
    /// Device focus distance
    SetFocus(f64),
    /// Device zoom
    SetZoom(f64),
    /// Toggle horizontal mirroring
    ToggleMirror,
    /// Rotate a quarter turn clockwise
    RotateRight,
    /// Mouse wheel movement over the canvas
    WheelZoom {
        /// Vertical wheel delta
        delta_y: f64,
    },
}

/// Where a command takes effect
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CommandTarget {
    Canvas(CanvasSettings),
    Device(DeviceRequest),
    View,
}

/// Device-side change before the device index is resolved
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DeviceRequest {
    Index(usize),
    Control(CameraControl),
}

impl SettingsCommand {
    /// Whether the command changes the local canvas
    pub fn is_canvas_command(&self) -> bool {
        matches!(
            self,
            SettingsCommand::SetBrightness(_)
                | SettingsCommand::SetContrast(_)
                | SettingsCommand::SetGrayscale(_)
                | SettingsCommand::SetSharpness(_)
        )
    }

    /// Whether the command is forwarded to the device
    pub fn is_device_command(&self) -> bool {
        matches!(
            self,
            SettingsCommand::SetDeviceIndex(_)
                | SettingsCommand::SetFocus(_)
                | SettingsCommand::SetZoom(_)
        )
    }

    /// Resolve the command against the current canvas settings and view.
    /// Canvas values are clamped to their accepted ranges.
    pub(crate) fn apply(
        &self,
        canvas: CanvasSettings,
        view: &mut ViewTransform,
    ) -> CommandTarget {
        match *self {
            SettingsCommand::SetBrightness(value) => CommandTarget::Canvas(CanvasSettings {
                brightness: value.min(MAX_BRIGHTNESS),
                ..canvas
            }),
            SettingsCommand::SetContrast(value) => CommandTarget::Canvas(CanvasSettings {
                contrast: value.min(MAX_CONTRAST),
                ..canvas
            }),
            SettingsCommand::SetGrayscale(value) => CommandTarget::Canvas(CanvasSettings {
                grayscale: value.min(MAX_GRAYSCALE),
                ..canvas
            }),
            SettingsCommand::SetSharpness(value) => CommandTarget::Canvas(CanvasSettings {
                sharpness: value.min(MAX_SHARPNESS),
                ..canvas
            }),
            SettingsCommand::SetDeviceIndex(index) => {
                CommandTarget::Device(DeviceRequest::Index(index))
            }
            SettingsCommand::SetFocus(value) => {
                CommandTarget::Device(DeviceRequest::Control(CameraControl::focus(value)))
            }
            SettingsCommand::SetZoom(value) => {
                CommandTarget::Device(DeviceRequest::Control(CameraControl::zoom(value)))
            }
            SettingsCommand::ToggleMirror => {
                view.toggle_mirror();
                CommandTarget::View
            }
            SettingsCommand::RotateRight => {
                view.rotate_right();
                CommandTarget::View
            }
            SettingsCommand::WheelZoom { delta_y } => {
                view.wheel(delta_y);
                CommandTarget::View
            }
        }
    }
}

/// Presentation orientation of the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Mirrored around the vertical axis
    pub mirrored: bool,
    /// Quarter turns clockwise, 0..=3
    pub rotation: u8,
    /// Zoom factor within `[MIN_SCALE, MAX_SCALE]`
    pub scale: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            mirrored: false,
            rotation: 0,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    /// Flip mirroring
    pub fn toggle_mirror(&mut self) {
        self.mirrored = !self.mirrored;
    }

    /// Rotate a quarter turn clockwise
    pub fn rotate_right(&mut self) {
        self.rotation = (self.rotation + 1) % 4;
    }

    /// Apply a wheel movement; scrolling up zooms in
    pub fn wheel(&mut self, delta_y: f64) {
        if delta_y.is_finite() {
            self.scale = (self.scale + delta_y * WHEEL_SCALE_STEP).clamp(MIN_SCALE, MAX_SCALE);
        }
    }

    /// Back to unit scale
    pub fn reset_scale(&mut self) {
        self.scale = 1.0;
    }

    /// Counter-clockwise rotation in degrees, as applied to the canvas
    pub fn rotation_degrees(&self) -> i32 {
        self.rotation as i32 * -90
    }

    /// Whether width and height are swapped on screen
    pub fn is_transposed(&self) -> bool {
        self.rotation % 2 == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_commands_clamp() {
        let mut view = ViewTransform::default();
        let base = CanvasSettings::default();

        let target = SettingsCommand::SetSharpness(900).apply(base, &mut view);
        assert_eq!(
            target,
            CommandTarget::Canvas(CanvasSettings {
                sharpness: 200,
                ..base
            })
        );

        let target = SettingsCommand::SetGrayscale(150).apply(base, &mut view);
        assert_eq!(
            target,
            CommandTarget::Canvas(CanvasSettings {
                grayscale: 100,
                ..base
            })
        );
    }

    #[test]
    fn test_device_commands() {
        let mut view = ViewTransform::default();
        let base = CanvasSettings::default();
        assert!(SettingsCommand::SetZoom(2.0).is_device_command());
        assert_eq!(
            SettingsCommand::SetFocus(0.5).apply(base, &mut view),
            CommandTarget::Device(DeviceRequest::Control(CameraControl::focus(0.5)))
        );
        assert_eq!(
            SettingsCommand::SetDeviceIndex(1).apply(base, &mut view),
            CommandTarget::Device(DeviceRequest::Index(1))
        );
    }

    #[test]
    fn test_rotation_wraps() {
        let mut view = ViewTransform::default();
        for expected in [1, 2, 3, 0, 1] {
            view.rotate_right();
            assert_eq!(view.rotation, expected);
        }
        assert!(view.is_transposed());
        assert_eq!(view.rotation_degrees(), -90);
    }

    #[test]
    fn test_wheel_scale_clamps() {
        let mut view = ViewTransform::default();
        view.wheel(-100.0);
        assert!((view.scale - 1.5).abs() < 1e-9);

        view.wheel(-10_000.0);
        assert_eq!(view.scale, MAX_SCALE);

        view.wheel(10_000.0);
        assert_eq!(view.scale, MIN_SCALE);

        view.reset_scale();
        assert_eq!(view.scale, 1.0);
    }

    #[test]
    fn test_view_commands_mutate_transform() {
        let mut view = ViewTransform::default();
        let target = SettingsCommand::ToggleMirror.apply(CanvasSettings::default(), &mut view);
        assert_eq!(target, CommandTarget::View);
        assert!(view.mirrored);
        assert!(!SettingsCommand::RotateRight.is_canvas_command());
    }
}
