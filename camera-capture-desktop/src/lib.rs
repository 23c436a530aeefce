//! # camera-capture-desktop
//!
//! Desktop webcam backend for camera-capture-kit.
//!
//! Provides:
//! - `DesktopBackend` — `CaptureBackend` over nokhwa webcams + cpal microphone
//! - `NokhwaCamera` — webcam frame streaming on a dedicated thread
//! - `PngPhotoSink` — photo capture via PNG encoding of the tap frame
//! - `FfmpegVideoSink` — H.264 recording through an `ffmpeg` child process
//! - `DesktopPermissions` — OS-privacy-layer permission probe
//!
//! ## Platform Requirements
//! - A V4L2/AVFoundation/MediaFoundation webcam reachable by nokhwa
//! - `ffmpeg` on `PATH` for video recording
//!
//! ## Usage
//! ```ignore
//! use camera_capture_core::{CaptureConfiguration, CaptureController};
//! use camera_capture_desktop::{DesktopBackend, DesktopPermissions};
//!
//! let mut controller = CaptureController::new(
//!     CaptureConfiguration::default(),
//!     DesktopBackend::new(),
//!     surface,
//!     motion,
//!     clock,
//!     std::sync::Arc::new(DesktopPermissions::new()),
//! )?;
//! controller.setup()?;
//! ```

pub mod backend;
pub mod device_enumerator;
pub mod permissions;
pub mod photo;
pub mod services;
pub mod video;
pub mod webcam;

pub use backend::{DesktopBackend, DesktopMicrophone};
pub use device_enumerator::{CameraDescriptor, MicrophoneDescriptor};
pub use permissions::DesktopPermissions;
pub use photo::PngPhotoSink;
pub use services::{IntervalClock, StationaryMotion};
pub use video::FfmpegVideoSink;
pub use webcam::NokhwaCamera;
