use std::path::PathBuf;
use std::time::Duration;

use super::state::{CameraPosition, FlashMode, OutputType, TorchMode};

/// Appearance of the focus ring shown on tap-to-focus.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusRingStyle {
    /// RGBA ring color.
    pub color: [u8; 4],

    /// Ring diameter in surface points.
    pub diameter: f32,

    /// Optional custom ring image (encoded bytes); the surface falls back to
    /// a drawn circle when absent.
    pub image: Option<Vec<u8>>,
}

impl Default for FocusRingStyle {
    fn default() -> Self {
        Self {
            color: [255, 214, 10, 255],
            diameter: 80.0,
            image: None,
        }
    }
}

/// Configuration for a capture controller.
///
/// All values are copied into the initial published state at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfiguration {
    /// Initial output type (photo or video).
    pub output_type: OutputType,

    /// Initial camera position.
    pub camera_position: CameraPosition,

    /// Initial zoom factor (clamped against device capability at setup).
    pub zoom_factor: f32,

    /// Initial flash mode.
    pub flash_mode: FlashMode,

    /// Initial torch mode.
    pub torch_mode: TorchMode,

    /// Whether recording connections are horizontally mirrored.
    pub mirror_output: bool,

    /// Whether the grid overlay starts visible.
    pub grid_visible: bool,

    /// Focus ring appearance.
    pub focus_ring: FocusRingStyle,

    /// Directory where the recording file is written.
    pub output_directory: PathBuf,

    /// Accelerometer sampling interval (default: 1 s).
    pub motion_interval: Duration,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if !self.zoom_factor.is_finite() || self.zoom_factor < 1.0 {
            return Err(format!("invalid zoom factor: {}", self.zoom_factor));
        }
        if self.focus_ring.diameter <= 0.0 {
            return Err(format!(
                "invalid focus ring diameter: {}",
                self.focus_ring.diameter
            ));
        }
        if self.motion_interval.is_zero() {
            return Err("motion interval must be positive".into());
        }
        Ok(())
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            output_type: OutputType::Photo,
            camera_position: CameraPosition::Back,
            zoom_factor: 1.0,
            flash_mode: FlashMode::Off,
            torch_mode: TorchMode::Off,
            mirror_output: false,
            grid_visible: false,
            focus_ring: FocusRingStyle::default(),
            output_directory: PathBuf::from("."),
            motion_interval: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configuration_is_valid() {
        assert!(CaptureConfiguration::default().validate().is_ok());
    }

    #[test]
    fn rejects_sub_unity_zoom() {
        let config = CaptureConfiguration {
            zoom_factor: 0.5,
            ..CaptureConfiguration::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_motion_interval() {
        let config = CaptureConfiguration {
            motion_interval: Duration::ZERO,
            ..CaptureConfiguration::default()
        };
        assert!(config.validate().is_err());
    }
}
