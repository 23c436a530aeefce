use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::frame::VideoFrame;
use crate::models::state::{CameraPosition, OutputType};
use crate::traits::camera_device::{CameraDevice, FrameCallback, MicrophoneDevice};
use crate::traits::sinks::{PhotoSink, VideoSink};

/// Raw-frame tap shared between the active camera's streaming thread and
/// the controller.
///
/// A capacity-1 drop-oldest slot: only the latest frame is retained, for
/// freeze-frame snapshots and for routing to the photo sink. While a
/// recording is active the tap also forwards each frame to the video sink.
#[derive(Default)]
struct FrameTap {
    latest: Option<Arc<VideoFrame>>,
    route: Option<Arc<dyn VideoSink>>,
}

/// The active device graph: camera/audio input slots, the attached output
/// sink, and the frame tap.
///
/// Invariants: exactly one camera input is attached at a time (the unused
/// position is detached), and exactly one sink is attached, matching the
/// published output type. Attachment rejections surface as
/// `CannotSetupInput` / `CannotSetupOutput`.
pub struct CaptureSession {
    cameras: HashMap<CameraPosition, Arc<dyn CameraDevice>>,
    microphone: Option<Arc<dyn MicrophoneDevice>>,
    photo_sink: Option<Arc<dyn PhotoSink>>,
    video_sink: Option<Arc<dyn VideoSink>>,
    attached_camera: Option<CameraPosition>,
    audio_attached: bool,
    attached_output: Option<OutputType>,
    tap: Arc<Mutex<FrameTap>>,
    tap_installed: bool,
    running: bool,
}

impl CaptureSession {
    pub fn new() -> Self {
        Self {
            cameras: HashMap::new(),
            microphone: None,
            photo_sink: None,
            video_sink: None,
            attached_camera: None,
            audio_attached: false,
            attached_output: None,
            tap: Arc::new(Mutex::new(FrameTap::default())),
            tap_installed: false,
            running: false,
        }
    }

    // --- Discovery registration (setup step 4) ---

    pub fn register_camera(&mut self, device: Arc<dyn CameraDevice>) {
        self.cameras.insert(device.position(), device);
    }

    pub fn register_microphone(&mut self, device: Arc<dyn MicrophoneDevice>) {
        self.microphone = Some(device);
    }

    pub fn register_sinks(&mut self, photo: Arc<dyn PhotoSink>, video: Arc<dyn VideoSink>) {
        self.photo_sink = Some(photo);
        self.video_sink = Some(video);
    }

    pub fn camera(&self, position: CameraPosition) -> Option<Arc<dyn CameraDevice>> {
        self.cameras.get(&position).cloned()
    }

    pub fn active_camera(&self) -> Option<Arc<dyn CameraDevice>> {
        self.attached_camera.and_then(|p| self.camera(p))
    }

    pub fn attached_camera_position(&self) -> Option<CameraPosition> {
        self.attached_camera
    }

    pub fn photo_sink(&self) -> Option<Arc<dyn PhotoSink>> {
        self.photo_sink.clone()
    }

    pub fn video_sink(&self) -> Option<Arc<dyn VideoSink>> {
        self.video_sink.clone()
    }

    pub fn attached_output(&self) -> Option<OutputType> {
        self.attached_output
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    // --- Input/output wiring ---

    /// Attach the camera input for `position`, detaching the other position
    /// first. If the session is running, the old stream stops and the new
    /// device starts streaming into the tap.
    pub fn attach_camera_input(&mut self, position: CameraPosition) -> Result<(), CaptureError> {
        let device = self.cameras.get(&position).cloned().ok_or_else(|| {
            CaptureError::CannotSetupInput(format!("no camera input for position {:?}", position))
        })?;
        if !device.is_available() {
            return Err(CaptureError::CannotSetupInput(format!(
                "camera {} rejected by session",
                device.id()
            )));
        }

        if let Some(old) = self.active_camera() {
            if self.running {
                old.stop_stream();
            }
        }
        self.attached_camera = Some(position);

        if self.running {
            device.start_stream(self.tap_callback())?;
        }
        Ok(())
    }

    pub fn attach_audio_input(&mut self) -> Result<(), CaptureError> {
        let mic = self
            .microphone
            .as_ref()
            .ok_or_else(|| CaptureError::CannotSetupInput("no audio input".into()))?;
        if !mic.is_available() {
            return Err(CaptureError::CannotSetupInput(format!(
                "microphone {} rejected by session",
                mic.id()
            )));
        }
        self.audio_attached = true;
        Ok(())
    }

    /// Attach the sink matching `output`, detaching the previously attached
    /// one.
    pub fn attach_output(&mut self, output: OutputType) -> Result<(), CaptureError> {
        let present = match output {
            OutputType::Photo => self.photo_sink.is_some(),
            OutputType::Video => self.video_sink.is_some(),
        };
        if !present {
            return Err(CaptureError::CannotSetupOutput(format!(
                "no sink constructed for {:?} output",
                output
            )));
        }
        self.attached_output = Some(output);
        Ok(())
    }

    /// Install the raw-frame tap used for freeze-frame snapshots.
    pub fn install_frame_tap(&mut self) {
        self.tap_installed = true;
    }

    // --- Running state ---

    /// Start the active camera streaming into the tap. Runs until
    /// `stop_running`; called from the dedicated session-start thread.
    pub fn start_running(&mut self) -> Result<(), CaptureError> {
        if self.running {
            return Ok(());
        }
        let device = self
            .active_camera()
            .ok_or_else(|| CaptureError::CannotSetupInput("no camera input attached".into()))?;
        device.start_stream(self.tap_callback())?;
        self.running = true;
        Ok(())
    }

    pub fn stop_running(&mut self) {
        if !self.running {
            return;
        }
        if let Some(device) = self.active_camera() {
            device.stop_stream();
        }
        self.running = false;
        let mut tap = self.tap.lock();
        tap.latest = None;
        tap.route = None;
    }

    // --- Frame tap ---

    /// Latest frame seen by the tap, if any.
    pub fn snapshot(&self) -> Option<Arc<VideoFrame>> {
        if !self.tap_installed {
            return None;
        }
        self.tap.lock().latest.clone()
    }

    /// Route tap frames to `sink` while a recording is active; `None` stops
    /// the routing.
    pub fn set_recording_route(&mut self, sink: Option<Arc<dyn VideoSink>>) {
        self.tap.lock().route = sink;
    }

    fn tap_callback(&self) -> FrameCallback {
        let tap = Arc::clone(&self.tap);
        Arc::new(move |frame: VideoFrame| {
            let route = {
                let mut guard = tap.lock();
                guard.latest = Some(Arc::new(frame.clone()));
                guard.route.clone()
            };
            if let Some(sink) = route {
                sink.append_frame(&frame);
            }
        })
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::frame::PixelFormat;
    use crate::testing::{FakeCameraDevice, FakeMicrophone, FakePhotoSink, FakeVideoSink};

    fn frame() -> VideoFrame {
        VideoFrame {
            width: 2,
            height: 2,
            format: PixelFormat::Rgb8,
            data: vec![0; 12],
        }
    }

    fn session_with_devices() -> (CaptureSession, Arc<FakeCameraDevice>, Arc<FakeCameraDevice>) {
        let mut session = CaptureSession::new();
        let back = Arc::new(FakeCameraDevice::back());
        let front = Arc::new(FakeCameraDevice::front());
        session.register_camera(back.clone());
        session.register_camera(front.clone());
        session.register_microphone(Arc::new(FakeMicrophone::new()));
        session.register_sinks(Arc::new(FakePhotoSink::new()), Arc::new(FakeVideoSink::new()));
        (session, back, front)
    }

    #[test]
    fn attach_unknown_position_is_setup_input_error() {
        let mut session = CaptureSession::new();
        let back = Arc::new(FakeCameraDevice::back());
        session.register_camera(back);
        assert!(matches!(
            session.attach_camera_input(CameraPosition::Front),
            Err(CaptureError::CannotSetupInput(_))
        ));
    }

    #[test]
    fn attach_unavailable_camera_is_rejected() {
        let (mut session, back, _) = session_with_devices();
        back.set_available(false);
        assert!(matches!(
            session.attach_camera_input(CameraPosition::Back),
            Err(CaptureError::CannotSetupInput(_))
        ));
    }

    #[test]
    fn exactly_one_camera_input_attached() {
        let (mut session, back, front) = session_with_devices();
        session.attach_camera_input(CameraPosition::Back).unwrap();
        session.install_frame_tap();
        session.start_running().unwrap();
        assert!(back.is_streaming());

        session.attach_camera_input(CameraPosition::Front).unwrap();
        assert!(!back.is_streaming());
        assert!(front.is_streaming());
        assert_eq!(
            session.attached_camera_position(),
            Some(CameraPosition::Front)
        );
    }

    #[test]
    fn snapshot_requires_installed_tap() {
        let (mut session, back, _) = session_with_devices();
        session.attach_camera_input(CameraPosition::Back).unwrap();
        session.start_running().unwrap();
        back.push_frame(frame());
        assert!(session.snapshot().is_none());

        session.install_frame_tap();
        back.push_frame(frame());
        assert!(session.snapshot().is_some());
    }

    #[test]
    fn recording_route_forwards_frames() {
        let (mut session, back, _) = session_with_devices();
        session.attach_camera_input(CameraPosition::Back).unwrap();
        session.install_frame_tap();
        session.start_running().unwrap();

        let sink = Arc::new(FakeVideoSink::new());
        session.set_recording_route(Some(sink.clone()));
        back.push_frame(frame());
        back.push_frame(frame());
        assert_eq!(sink.appended_frames(), 2);

        session.set_recording_route(None);
        back.push_frame(frame());
        assert_eq!(sink.appended_frames(), 2);
    }

    #[test]
    fn stop_running_clears_tap() {
        let (mut session, back, _) = session_with_devices();
        session.attach_camera_input(CameraPosition::Back).unwrap();
        session.install_frame_tap();
        session.start_running().unwrap();
        back.push_frame(frame());
        assert!(session.snapshot().is_some());

        session.stop_running();
        assert!(!back.is_streaming());
        assert!(session.snapshot().is_none());
    }
}
