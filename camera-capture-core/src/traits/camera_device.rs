use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::models::frame::{Point, VideoFrame};
use crate::models::state::{CameraPosition, TorchMode};

/// Callback invoked when a decoded frame is available from a streaming
/// camera device.
///
/// Fires on the device's streaming thread — keep processing minimal and
/// marshal anything stateful through the controller's event channel.
pub type FrameCallback = Arc<dyn Fn(VideoFrame) + Send + Sync + 'static>;

/// Interface for a physical camera device.
///
/// Capability queries let the live-parameter controller validate intents
/// against fakes in tests instead of real hardware. Mutating setters must
/// only be called inside a `lock_for_configuration` /
/// `unlock_for_configuration` scope; the lock guarantees no two
/// configuration changes race on the same device.
pub trait CameraDevice: Send + Sync {
    fn id(&self) -> String;

    fn name(&self) -> String;

    fn position(&self) -> CameraPosition;

    /// Whether this device is currently usable.
    fn is_available(&self) -> bool;

    // Capability queries.

    fn has_flash(&self) -> bool;

    fn has_torch(&self) -> bool;

    fn min_zoom(&self) -> f32;

    fn max_zoom(&self) -> f32;

    fn supports_focus_point_of_interest(&self) -> bool;

    fn supports_exposure_point_of_interest(&self) -> bool;

    // Configuration scope.

    fn lock_for_configuration(&self) -> Result<(), CaptureError>;

    fn unlock_for_configuration(&self);

    // Setters, valid only inside a configuration scope.

    fn set_zoom_factor(&self, factor: f32);

    fn set_torch_mode(&self, mode: TorchMode);

    /// Steer focus to a normalized device-space point and re-engage
    /// auto-focus. Only called when `supports_focus_point_of_interest`.
    fn set_focus_point_of_interest(&self, point: Point);

    /// Steer exposure to a normalized device-space point and re-engage
    /// auto-exposure. Only called when `supports_exposure_point_of_interest`.
    fn set_exposure_point_of_interest(&self, point: Point);

    // Streaming.

    /// Start delivering frames via `callback` until `stop_stream`.
    fn start_stream(&self, callback: FrameCallback) -> Result<(), CaptureError>;

    fn stop_stream(&self);
}

/// Interface for a microphone device attached as the session's audio input.
pub trait MicrophoneDevice: Send + Sync {
    fn id(&self) -> String;

    fn name(&self) -> String;

    fn is_available(&self) -> bool;
}

/// Run `f` inside the device's configuration lock scope, guaranteeing the
/// unlock even when `f` short-circuits.
pub fn configure_device<R>(
    device: &dyn CameraDevice,
    f: impl FnOnce(&dyn CameraDevice) -> R,
) -> Result<R, CaptureError> {
    device.lock_for_configuration()?;
    let out = f(device);
    device.unlock_for_configuration();
    Ok(out)
}
