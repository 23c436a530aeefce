use std::sync::Arc;

use super::camera_device::{CameraDevice, MicrophoneDevice};
use super::sinks::{PhotoSink, VideoSink};
use crate::models::state::CameraPosition;

/// Callback fired when the platform interrupts the capture session.
pub type InterruptionCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Platform seam: device discovery, sink construction, and interruption
/// observation.
///
/// Implemented by platform backends (desktop webcam via nokhwa) and by the
/// synthetic backend in [`crate::testing`].
pub trait CaptureBackend: Send + Sync {
    /// Look up the camera at `position`, if the platform has one.
    fn camera(&self, position: CameraPosition) -> Option<Arc<dyn CameraDevice>>;

    /// The microphone used as the session's audio input.
    fn microphone(&self) -> Option<Arc<dyn MicrophoneDevice>>;

    /// Construct the photo sink. Called once during setup; the sink is
    /// attached to the session only while the output type is photo.
    fn make_photo_sink(&self) -> Arc<dyn PhotoSink>;

    /// Construct the video sink. Called once during setup; the sink is
    /// attached to the session only while the output type is video.
    fn make_video_sink(&self) -> Arc<dyn VideoSink>;

    /// Register the session-interruption observer. At most one observer is
    /// registered per controller.
    fn observe_interruptions(&self, callback: InterruptionCallback);
}

// A shared backend handle is itself a backend; lets callers keep a handle
// after handing the backend to the controller.
impl<T: CaptureBackend + ?Sized> CaptureBackend for Arc<T> {
    fn camera(&self, position: CameraPosition) -> Option<Arc<dyn CameraDevice>> {
        (**self).camera(position)
    }

    fn microphone(&self) -> Option<Arc<dyn MicrophoneDevice>> {
        (**self).microphone()
    }

    fn make_photo_sink(&self) -> Arc<dyn PhotoSink> {
        (**self).make_photo_sink()
    }

    fn make_video_sink(&self) -> Arc<dyn VideoSink> {
        (**self).make_video_sink()
    }

    fn observe_interruptions(&self, callback: InterruptionCallback) {
        (**self).observe_interruptions(callback)
    }
}
