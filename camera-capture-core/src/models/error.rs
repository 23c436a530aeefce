use thiserror::Error;

/// Errors that can occur during camera capture operations.
///
/// Flat and non-recoverable at this layer: setup-time errors abort the
/// `setup` call synchronously, capture-time errors are delivered through the
/// completion channel. No automatic retry anywhere; every failure is terminal
/// for that operation and must be re-initiated by the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("camera permissions not granted")]
    CameraPermissionsNotGranted,

    #[error("microphone permissions not granted")]
    MicrophonePermissionsNotGranted,

    #[error("cannot set up input: {0}")]
    CannotSetupInput(String),

    #[error("cannot set up output: {0}")]
    CannotSetupOutput(String),

    #[error("captured photo cannot be fetched")]
    CapturedPhotoCannotBeFetched,

    #[error("recording failed: {0}")]
    RecordingFailed(String),

    #[error("device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
