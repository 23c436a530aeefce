//! # camera-capture-core
//!
//! Platform-agnostic camera capture core library.
//!
//! Provides the capture-session lifecycle state machine: device/input/output
//! wiring, serialized reconfiguration transitions, photo/video capture
//! coordination, live parameters (zoom, focus, flash, torch, mirror, grid),
//! and orientation tracking. Platform backends (desktop webcams via
//! `camera-capture-desktop`) implement the device and sink traits and plug
//! into the generic `CaptureController`.
//!
//! ## Architecture
//!
//! ```text
//! camera-capture-core (this crate)
//! ├── traits/       ← CaptureBackend, CameraDevice, PhotoSink/VideoSink, PreviewSurface, services
//! ├── models/       ← CaptureError, CaptureState, CaptureConfiguration, CapturedMedia, frames
//! ├── motion/       ← accelerometer samples → coarse device orientation
//! ├── session/      ← CaptureSession graph, TransitionGuard, CaptureController
//! └── testing/      ← synthetic devices and services for offline tests
//! ```

pub mod models;
pub mod motion;
pub mod session;
pub mod testing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{CaptureConfiguration, FocusRingStyle};
pub use models::error::CaptureError;
pub use models::frame::{
    FlipDirection, FreezeFrame, PixelFormat, Point, Rect, SnapshotFraming, VideoFrame,
};
pub use models::media::{CapturedMedia, MediaMetadata};
pub use models::state::{
    CameraPosition, CaptureState, FlashMode, OutputType, TorchMode, TransitionToken,
};
pub use motion::orientation::{DeviceOrientation, MotionSample, OrientationTracker};
pub use session::controller::{CaptureController, MAX_ZOOM_FACTOR, VIDEO_OUTPUT_FILE};
pub use session::graph::CaptureSession;
pub use traits::backend::CaptureBackend;
pub use traits::camera_device::{CameraDevice, FrameCallback, MicrophoneDevice};
pub use traits::capture_delegate::CaptureDelegate;
pub use traits::clock::RecordingClock;
pub use traits::motion::MotionService;
pub use traits::permissions::{AuthorizationStatus, MediaKind, PermissionService};
pub use traits::sinks::{
    ConnectionSettings, PhotoCaptureSettings, PhotoSink, RecordingCallback, VideoSink,
};
pub use traits::surface::PreviewSurface;
