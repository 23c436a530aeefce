use serde::{Deserialize, Serialize};

use super::config::CaptureConfiguration;
use crate::motion::orientation::DeviceOrientation;

/// What the attached output sink produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputType {
    Photo,
    Video,
}

/// Physical camera position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPosition {
    Front,
    Back,
}

impl CameraPosition {
    pub fn opposite(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

/// Flash behavior for the next photo capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    Off,
    On,
    Auto,
}

/// Continuous torch light state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TorchMode {
    Off,
    On,
}

/// Tags the reason for an in-flight reconfiguration.
///
/// At most one non-`None` value is held at a time. Only the two change
/// variants act as re-entrancy blockers; `MediaCapture` is cosmetic and does
/// not reject other intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionToken {
    #[default]
    None,
    CameraPositionChange,
    OutputTypeChange,
    MediaCapture,
}

impl TransitionToken {
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    /// Whether new camera-position, output-type, zoom, flash, torch, and
    /// grid-visibility intents are rejected while this token is held.
    pub fn blocks_reconfiguration(self) -> bool {
        matches!(self, Self::CameraPositionChange | Self::OutputTypeChange)
    }
}

/// Published snapshot of the controller's live state.
///
/// Mutated only by the controller on its owning context; the UI reads it (or
/// receives copies through `CaptureDelegate::on_state_changed`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureState {
    pub output_type: OutputType,
    pub camera_position: CameraPosition,
    pub zoom_factor: f32,
    pub flash_mode: FlashMode,
    pub torch_mode: TorchMode,
    pub mirror_output: bool,
    pub grid_visible: bool,
    pub is_recording: bool,
    /// Elapsed recording seconds; zero means "not running".
    pub recording_seconds: u64,
    pub orientation: DeviceOrientation,
}

impl CaptureState {
    /// Initial published state, copied field-for-field from the construction
    /// configuration.
    pub fn from_configuration(config: &CaptureConfiguration) -> Self {
        Self {
            output_type: config.output_type,
            camera_position: config.camera_position,
            zoom_factor: config.zoom_factor,
            flash_mode: config.flash_mode,
            torch_mode: config.torch_mode,
            mirror_output: config.mirror_output,
            grid_visible: config.grid_visible,
            is_recording: false,
            recording_seconds: 0,
            orientation: DeviceOrientation::Portrait,
        }
    }
}
