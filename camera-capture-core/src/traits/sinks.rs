use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::models::frame::VideoFrame;
use crate::models::state::FlashMode;
use crate::motion::orientation::DeviceOrientation;

/// Settings built from published state for a single photo capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoCaptureSettings {
    pub flash_mode: FlashMode,
}

/// Per-recording connection configuration, attached when a recording starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Horizontal mirroring of the recorded output.
    pub mirrored: bool,

    /// Orientation tag for the recorded output.
    pub orientation: DeviceOrientation,
}

/// Completion for a photo capture. `None` means the platform reported
/// completion but no retrievable image data exists.
///
/// Fires on a sink-owned thread; implementations forward into the
/// controller's event channel.
pub type PhotoCallback = Arc<dyn Fn(Option<Vec<u8>>) + Send + Sync + 'static>;

/// Completion for a recording stop-cycle: the finished file location, or the
/// platform-level recording failure.
pub type RecordingCallback =
    Arc<dyn Fn(Result<PathBuf, CaptureError>) + Send + Sync + 'static>;

/// Capture output producing encoded photo bytes.
pub trait PhotoSink: Send + Sync {
    /// Capture a photo from the routed frame, delivering bytes (or `None`)
    /// through `completion` exactly once.
    fn capture_photo(
        &self,
        settings: PhotoCaptureSettings,
        frame: Option<VideoFrame>,
        completion: PhotoCallback,
    );
}

/// Capture output producing a recording file.
pub trait VideoSink: Send + Sync {
    /// Begin recording to `path`. `completion` fires once, after
    /// `stop_recording`, with the finished file or the recording failure.
    fn start_recording(
        &self,
        path: &Path,
        connection: ConnectionSettings,
        completion: RecordingCallback,
    ) -> Result<(), CaptureError>;

    /// Frame routed from the session tap while recording.
    fn append_frame(&self, frame: &VideoFrame);

    /// Finish the recording; the completion registered at start fires when
    /// the file is finalized.
    fn stop_recording(&self);
}
