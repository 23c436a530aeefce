//! Desktop `CaptureBackend`: wires webcam discovery, the default
//! microphone, and the PNG/ffmpeg sinks into the core controller.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use camera_capture_core::models::state::CameraPosition;
use camera_capture_core::traits::backend::{CaptureBackend, InterruptionCallback};
use camera_capture_core::traits::camera_device::{CameraDevice, MicrophoneDevice};
use camera_capture_core::traits::sinks::{PhotoSink, VideoSink};

use crate::device_enumerator;
use crate::photo::PngPhotoSink;
use crate::video::FfmpegVideoSink;
use crate::webcam::NokhwaCamera;

/// The system default input device as the session's audio input.
pub struct DesktopMicrophone {
    id: String,
    name: String,
}

impl MicrophoneDevice for DesktopMicrophone {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_available(&self) -> bool {
        device_enumerator::default_microphone().is_some()
    }
}

/// Desktop webcam backend.
///
/// Device lookups are cached so the controller sees one device instance per
/// position across its lifetime. A webcam stream failure fires the
/// registered interruption observer, standing in for the platform's
/// session-interruption notification.
pub struct DesktopBackend {
    cameras: Mutex<HashMap<CameraPosition, Arc<NokhwaCamera>>>,
    interruption: Arc<Mutex<Option<InterruptionCallback>>>,
}

impl DesktopBackend {
    pub fn new() -> Self {
        Self {
            cameras: Mutex::new(HashMap::new()),
            interruption: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for DesktopBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for DesktopBackend {
    fn camera(&self, position: CameraPosition) -> Option<Arc<dyn CameraDevice>> {
        let mut cameras = self.cameras.lock();
        if let Some(camera) = cameras.get(&position) {
            return Some(Arc::clone(camera) as Arc<dyn CameraDevice>);
        }
        let descriptor = device_enumerator::camera_for_position(position)?;
        log::info!(
            "using {} as the {:?} camera",
            descriptor.name,
            position
        );
        let camera = Arc::new(NokhwaCamera::new(
            descriptor,
            position,
            Arc::clone(&self.interruption),
        ));
        cameras.insert(position, Arc::clone(&camera));
        Some(camera as Arc<dyn CameraDevice>)
    }

    fn microphone(&self) -> Option<Arc<dyn MicrophoneDevice>> {
        let descriptor = device_enumerator::default_microphone()?;
        Some(Arc::new(DesktopMicrophone {
            id: descriptor.id,
            name: descriptor.name,
        }) as Arc<dyn MicrophoneDevice>)
    }

    fn make_photo_sink(&self) -> Arc<dyn PhotoSink> {
        Arc::new(PngPhotoSink::new())
    }

    fn make_video_sink(&self) -> Arc<dyn VideoSink> {
        Arc::new(FfmpegVideoSink::new())
    }

    fn observe_interruptions(&self, callback: InterruptionCallback) {
        *self.interruption.lock() = Some(callback);
    }
}
