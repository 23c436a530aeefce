//! Synthetic devices, sinks, and services for offline testing.
//!
//! Everything here is deterministic and hardware-free: a fake backend wires
//! fake cameras and sinks into the controller so the full intent → event →
//! delivery loop can be exercised from unit tests (and from dependent
//! crates' tests) without a real camera.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::config::FocusRingStyle;
use crate::models::error::CaptureError;
use crate::models::frame::{
    FlipDirection, FreezeFrame, PixelFormat, Point, Rect, VideoFrame,
};
use crate::models::media::CapturedMedia;
use crate::models::state::{CameraPosition, CaptureState, TorchMode};
use crate::motion::orientation::MotionSample;
use crate::traits::backend::{CaptureBackend, InterruptionCallback};
use crate::traits::camera_device::{CameraDevice, FrameCallback, MicrophoneDevice};
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::clock::{RecordingClock, TickCallback};
use crate::traits::motion::{MotionCallback, MotionService};
use crate::traits::permissions::{AuthorizationStatus, MediaKind, PermissionService};
use crate::traits::sinks::{
    ConnectionSettings, PhotoCallback, PhotoCaptureSettings, PhotoSink, RecordingCallback,
    VideoSink,
};
use crate::traits::surface::PreviewSurface;

/// A small synthetic RGB frame.
pub fn test_frame(width: u32, height: u32) -> VideoFrame {
    VideoFrame {
        width,
        height,
        format: PixelFormat::Rgb8,
        data: vec![0x7f; width as usize * height as usize * 3],
    }
}

/// Camera fake with configurable capabilities; records every setter call.
pub struct FakeCameraDevice {
    position: CameraPosition,
    available: AtomicBool,
    has_flash: bool,
    has_torch: bool,
    min_zoom: f32,
    max_zoom: f32,
    supports_focus: bool,
    supports_exposure: bool,

    zoom: Mutex<f32>,
    torch: Mutex<TorchMode>,
    focus_point: Mutex<Option<Point>>,
    exposure_point: Mutex<Option<Point>>,
    locked: AtomicBool,
    unguarded_mutations: AtomicUsize,
    stream_callback: Mutex<Option<FrameCallback>>,
}

impl FakeCameraDevice {
    /// Back camera: full capability surface (flash, torch, 1–10x zoom,
    /// focus + exposure points).
    pub fn back() -> Self {
        Self::with_capabilities(CameraPosition::Back, true, true, 1.0, 10.0, true, true)
    }

    /// Front camera: no flash, no torch, 1–5x zoom, focus point only.
    pub fn front() -> Self {
        Self::with_capabilities(CameraPosition::Front, false, false, 1.0, 5.0, true, false)
    }

    pub fn with_capabilities(
        position: CameraPosition,
        has_flash: bool,
        has_torch: bool,
        min_zoom: f32,
        max_zoom: f32,
        supports_focus: bool,
        supports_exposure: bool,
    ) -> Self {
        Self {
            position,
            available: AtomicBool::new(true),
            has_flash,
            has_torch,
            min_zoom,
            max_zoom,
            supports_focus,
            supports_exposure,
            zoom: Mutex::new(1.0),
            torch: Mutex::new(TorchMode::Off),
            focus_point: Mutex::new(None),
            exposure_point: Mutex::new(None),
            locked: AtomicBool::new(false),
            unguarded_mutations: AtomicUsize::new(0),
            stream_callback: Mutex::new(None),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Deliver a frame through the registered stream callback, as the
    /// device's streaming thread would.
    pub fn push_frame(&self, frame: VideoFrame) {
        let callback = self.stream_callback.lock().clone();
        if let Some(callback) = callback {
            callback(frame);
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.stream_callback.lock().is_some()
    }

    pub fn zoom(&self) -> f32 {
        *self.zoom.lock()
    }

    pub fn torch(&self) -> TorchMode {
        *self.torch.lock()
    }

    pub fn focus_point(&self) -> Option<Point> {
        *self.focus_point.lock()
    }

    pub fn exposure_point(&self) -> Option<Point> {
        *self.exposure_point.lock()
    }

    /// Number of setter calls made outside a configuration lock scope.
    pub fn unguarded_mutations(&self) -> usize {
        self.unguarded_mutations.load(Ordering::SeqCst)
    }

    fn note_mutation(&self) {
        if !self.locked.load(Ordering::SeqCst) {
            self.unguarded_mutations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl CameraDevice for FakeCameraDevice {
    fn id(&self) -> String {
        format!("fake-camera-{:?}", self.position).to_lowercase()
    }

    fn name(&self) -> String {
        format!("Fake {:?} Camera", self.position)
    }

    fn position(&self) -> CameraPosition {
        self.position
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    fn has_flash(&self) -> bool {
        self.has_flash
    }

    fn has_torch(&self) -> bool {
        self.has_torch
    }

    fn min_zoom(&self) -> f32 {
        self.min_zoom
    }

    fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    fn supports_focus_point_of_interest(&self) -> bool {
        self.supports_focus
    }

    fn supports_exposure_point_of_interest(&self) -> bool {
        self.supports_exposure
    }

    fn lock_for_configuration(&self) -> Result<(), CaptureError> {
        self.locked.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn unlock_for_configuration(&self) {
        self.locked.store(false, Ordering::SeqCst);
    }

    fn set_zoom_factor(&self, factor: f32) {
        self.note_mutation();
        *self.zoom.lock() = factor;
    }

    fn set_torch_mode(&self, mode: TorchMode) {
        self.note_mutation();
        *self.torch.lock() = mode;
    }

    fn set_focus_point_of_interest(&self, point: Point) {
        self.note_mutation();
        *self.focus_point.lock() = Some(point);
    }

    fn set_exposure_point_of_interest(&self, point: Point) {
        self.note_mutation();
        *self.exposure_point.lock() = Some(point);
    }

    fn start_stream(&self, callback: FrameCallback) -> Result<(), CaptureError> {
        *self.stream_callback.lock() = Some(callback);
        Ok(())
    }

    fn stop_stream(&self) {
        *self.stream_callback.lock() = None;
    }
}

pub struct FakeMicrophone {
    available: AtomicBool,
}

impl FakeMicrophone {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

impl Default for FakeMicrophone {
    fn default() -> Self {
        Self::new()
    }
}

impl MicrophoneDevice for FakeMicrophone {
    fn id(&self) -> String {
        "fake-microphone".into()
    }

    fn name(&self) -> String {
        "Fake Microphone".into()
    }

    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

/// Photo sink completing synchronously with a configurable payload.
pub struct FakePhotoSink {
    response: Mutex<Option<Vec<u8>>>,
    captures: AtomicUsize,
    last_settings: Mutex<Option<PhotoCaptureSettings>>,
}

impl FakePhotoSink {
    pub fn new() -> Self {
        Self {
            response: Mutex::new(Some(vec![0xca, 0xfe])),
            captures: AtomicUsize::new(0),
            last_settings: Mutex::new(None),
        }
    }

    /// `None` simulates a completion with no retrievable image data.
    pub fn set_response(&self, response: Option<Vec<u8>>) {
        *self.response.lock() = response;
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn last_settings(&self) -> Option<PhotoCaptureSettings> {
        *self.last_settings.lock()
    }
}

impl Default for FakePhotoSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoSink for FakePhotoSink {
    fn capture_photo(
        &self,
        settings: PhotoCaptureSettings,
        _frame: Option<VideoFrame>,
        completion: PhotoCallback,
    ) {
        self.captures.fetch_add(1, Ordering::SeqCst);
        *self.last_settings.lock() = Some(settings);
        completion(self.response.lock().clone());
    }
}

/// Video sink completing on `stop_recording` with the recorded path or a
/// configured failure.
pub struct FakeVideoSink {
    active: Mutex<Option<(PathBuf, RecordingCallback)>>,
    last_connection: Mutex<Option<ConnectionSettings>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
    frames: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl FakeVideoSink {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
            last_connection: Mutex::new(None),
            starts: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
            frames: AtomicUsize::new(0),
            failure: Mutex::new(None),
        }
    }

    /// Make the next stop-cycle complete with `RecordingFailed(message)`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.into());
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn appended_frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }

    pub fn last_connection(&self) -> Option<ConnectionSettings> {
        *self.last_connection.lock()
    }
}

impl Default for FakeVideoSink {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSink for FakeVideoSink {
    fn start_recording(
        &self,
        path: &Path,
        connection: ConnectionSettings,
        completion: RecordingCallback,
    ) -> Result<(), CaptureError> {
        let mut active = self.active.lock();
        if active.is_some() {
            return Err(CaptureError::RecordingFailed("already recording".into()));
        }
        *active = Some((path.to_path_buf(), completion));
        *self.last_connection.lock() = Some(connection);
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn append_frame(&self, _frame: &VideoFrame) {
        self.frames.fetch_add(1, Ordering::SeqCst);
    }

    fn stop_recording(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
        let finished = self.active.lock().take();
        if let Some((path, completion)) = finished {
            match self.failure.lock().take() {
                Some(message) => completion(Err(CaptureError::RecordingFailed(message))),
                None => completion(Ok(path)),
            }
        }
    }
}

/// Backend wiring the fakes above together, with a poke-able interruption
/// observer.
pub struct FakeBackend {
    cameras: Mutex<HashMap<CameraPosition, Arc<FakeCameraDevice>>>,
    microphone: Mutex<Option<Arc<FakeMicrophone>>>,
    photo_sink: Arc<FakePhotoSink>,
    video_sink: Arc<FakeVideoSink>,
    interruption: Mutex<Option<InterruptionCallback>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        let mut cameras = HashMap::new();
        cameras.insert(
            CameraPosition::Back,
            Arc::new(FakeCameraDevice::back()),
        );
        cameras.insert(
            CameraPosition::Front,
            Arc::new(FakeCameraDevice::front()),
        );
        Self {
            cameras: Mutex::new(cameras),
            microphone: Mutex::new(Some(Arc::new(FakeMicrophone::new()))),
            photo_sink: Arc::new(FakePhotoSink::new()),
            video_sink: Arc::new(FakeVideoSink::new()),
            interruption: Mutex::new(None),
        }
    }

    pub fn fake_camera(&self, position: CameraPosition) -> Option<Arc<FakeCameraDevice>> {
        self.cameras.lock().get(&position).cloned()
    }

    pub fn remove_camera(&self, position: CameraPosition) {
        self.cameras.lock().remove(&position);
    }

    pub fn remove_microphone(&self) {
        *self.microphone.lock() = None;
    }

    pub fn photo_sink(&self) -> Arc<FakePhotoSink> {
        Arc::clone(&self.photo_sink)
    }

    pub fn video_sink(&self) -> Arc<FakeVideoSink> {
        Arc::clone(&self.video_sink)
    }

    /// Fire the registered interruption observer, as the platform would
    /// when another app takes the camera.
    pub fn trigger_interruption(&self) {
        let callback = self.interruption.lock().clone();
        if let Some(callback) = callback {
            callback();
        }
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureBackend for FakeBackend {
    fn camera(&self, position: CameraPosition) -> Option<Arc<dyn CameraDevice>> {
        self.fake_camera(position)
            .map(|c| c as Arc<dyn CameraDevice>)
    }

    fn microphone(&self) -> Option<Arc<dyn MicrophoneDevice>> {
        self.microphone
            .lock()
            .clone()
            .map(|m| m as Arc<dyn MicrophoneDevice>)
    }

    fn make_photo_sink(&self) -> Arc<dyn PhotoSink> {
        Arc::clone(&self.photo_sink) as Arc<dyn PhotoSink>
    }

    fn make_video_sink(&self) -> Arc<dyn VideoSink> {
        Arc::clone(&self.video_sink) as Arc<dyn VideoSink>
    }

    fn observe_interruptions(&self, callback: InterruptionCallback) {
        *self.interruption.lock() = Some(callback);
    }
}

/// Surface fake recording every presentation call.
pub struct FakeSurface {
    frame: Rect,
    preview_attached: AtomicBool,
    freeze_visible: AtomicBool,
    freezes_shown: AtomicUsize,
    grid_opacity: Mutex<f32>,
    flips: Mutex<Vec<FlipDirection>>,
    flashes: AtomicUsize,
    focus_points: Mutex<Vec<Point>>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self {
            frame: Rect::new(0.0, 0.0, 100.0, 200.0),
            preview_attached: AtomicBool::new(false),
            freeze_visible: AtomicBool::new(false),
            freezes_shown: AtomicUsize::new(0),
            grid_opacity: Mutex::new(0.0),
            flips: Mutex::new(Vec::new()),
            flashes: AtomicUsize::new(0),
            focus_points: Mutex::new(Vec::new()),
        }
    }

    pub fn preview_attached(&self) -> bool {
        self.preview_attached.load(Ordering::SeqCst)
    }

    pub fn freeze_visible(&self) -> bool {
        self.freeze_visible.load(Ordering::SeqCst)
    }

    pub fn freezes_shown(&self) -> usize {
        self.freezes_shown.load(Ordering::SeqCst)
    }

    pub fn grid_opacity(&self) -> f32 {
        *self.grid_opacity.lock()
    }

    pub fn flips(&self) -> Vec<FlipDirection> {
        self.flips.lock().clone()
    }

    pub fn flashes(&self) -> usize {
        self.flashes.load(Ordering::SeqCst)
    }

    pub fn focus_points(&self) -> Vec<Point> {
        self.focus_points.lock().clone()
    }
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewSurface for FakeSurface {
    fn frame(&self) -> Rect {
        self.frame
    }

    fn attach_preview_layer(&self) {
        self.preview_attached.store(true, Ordering::SeqCst);
    }

    fn install_grid_overlay(&self, visible: bool) {
        *self.grid_opacity.lock() = if visible { 1.0 } else { 0.0 };
    }

    fn set_grid_opacity(&self, opacity: f32, _fade: Duration) {
        *self.grid_opacity.lock() = opacity;
    }

    fn show_freeze_frame(&self, _freeze: FreezeFrame) {
        self.freeze_visible.store(true, Ordering::SeqCst);
        self.freezes_shown.fetch_add(1, Ordering::SeqCst);
    }

    fn fade_out_freeze_frame(&self, _fade: Duration) {
        self.freeze_visible.store(false, Ordering::SeqCst);
    }

    fn remove_freeze_frame(&self) {
        self.freeze_visible.store(false, Ordering::SeqCst);
    }

    fn play_flip_transition(&self, direction: FlipDirection) {
        self.flips.lock().push(direction);
    }

    fn flash_screen(&self, _duration: Duration) {
        self.flashes.fetch_add(1, Ordering::SeqCst);
    }

    fn show_focus_ring(&self, at: Point, _style: &FocusRingStyle) {
        self.focus_points.lock().push(at);
    }

    fn layer_point_to_device_point(&self, point: Point) -> Point {
        Point::new(point.x / self.frame.width, point.y / self.frame.height)
    }
}

/// Motion service driven by the test, not a timer.
pub struct ManualMotion {
    callback: Mutex<Option<MotionCallback>>,
}

impl ManualMotion {
    pub fn new() -> Self {
        Self {
            callback: Mutex::new(None),
        }
    }

    pub fn is_started(&self) -> bool {
        self.callback.lock().is_some()
    }

    /// Push a sample (or `None` for an errored one) through the registered
    /// callback.
    pub fn push(&self, sample: Option<MotionSample>) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(sample);
        }
    }
}

impl Default for ManualMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionService for ManualMotion {
    fn start_updates(&self, _interval: Duration, callback: MotionCallback) {
        *self.callback.lock() = Some(callback);
    }

    fn stop_updates(&self) {
        *self.callback.lock() = None;
    }
}

/// Recording clock driven by the test.
pub struct ManualClock {
    callback: Mutex<Option<TickCallback>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            callback: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.callback.lock().is_some()
    }

    pub fn tick(&self, seconds: u64) {
        let callback = self.callback.lock().clone();
        if let Some(callback) = callback {
            callback(seconds);
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingClock for ManualClock {
    fn start(&self, on_tick: TickCallback) {
        *self.callback.lock() = Some(on_tick);
    }

    fn reset(&self) {
        *self.callback.lock() = None;
    }
}

/// Fixed authorization answers.
pub struct StaticPermissions {
    video: AuthorizationStatus,
    audio: AuthorizationStatus,
}

impl StaticPermissions {
    pub fn granted() -> Self {
        Self {
            video: AuthorizationStatus::Granted,
            audio: AuthorizationStatus::Granted,
        }
    }

    pub fn new(video: AuthorizationStatus, audio: AuthorizationStatus) -> Self {
        Self { video, audio }
    }
}

impl PermissionService for StaticPermissions {
    fn authorization_status(&self, kind: MediaKind) -> AuthorizationStatus {
        match kind {
            MediaKind::Video => self.video,
            MediaKind::Audio => self.audio,
        }
    }
}

/// Delegate collecting every notification for later assertions.
#[derive(Default)]
pub struct CollectingDelegate {
    states: Mutex<Vec<CaptureState>>,
    media: Mutex<Vec<Result<CapturedMedia, CaptureError>>>,
    setup_complete: AtomicBool,
    interruptions: AtomicUsize,
}

impl CollectingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_state(&self) -> Option<CaptureState> {
        self.states.lock().last().copied()
    }

    pub fn media(&self) -> Vec<Result<CapturedMedia, CaptureError>> {
        self.media.lock().clone()
    }

    pub fn setup_completed(&self) -> bool {
        self.setup_complete.load(Ordering::SeqCst)
    }

    pub fn interruptions(&self) -> usize {
        self.interruptions.load(Ordering::SeqCst)
    }
}

impl CaptureDelegate for CollectingDelegate {
    fn on_state_changed(&self, state: &CaptureState) {
        self.states.lock().push(*state);
    }

    fn on_media_captured(&self, result: Result<CapturedMedia, CaptureError>) {
        self.media.lock().push(result);
    }

    fn on_setup_complete(&self) {
        self.setup_complete.store(true, Ordering::SeqCst);
    }

    fn on_interruption(&self) {
        self.interruptions.fetch_add(1, Ordering::SeqCst);
    }
}
