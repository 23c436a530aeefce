use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::events::{schedule, SessionEvent};
use super::graph::CaptureSession;
use super::transition::{
    snapshot_framing, PendingTransition, TransitionGuard, FREEZE_FADE, FREEZE_FADE_DELAY,
    FREEZE_SWAP_DELAY, GRID_FADE, SHUTTER_FLASH,
};
use crate::models::config::CaptureConfiguration;
use crate::models::error::CaptureError;
use crate::models::frame::{FlipDirection, FreezeFrame, Point};
use crate::models::media::{self, CapturedMedia, MediaMetadata};
use crate::models::state::{
    CameraPosition, CaptureState, FlashMode, OutputType, TorchMode, TransitionToken,
};
use crate::motion::orientation::OrientationTracker;
use crate::traits::backend::CaptureBackend;
use crate::traits::camera_device::{configure_device, CameraDevice};
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::clock::RecordingClock;
use crate::traits::motion::MotionService;
use crate::traits::permissions::{AuthorizationStatus, MediaKind, PermissionService};
use crate::traits::sinks::{ConnectionSettings, PhotoCaptureSettings, RecordingCallback};
use crate::traits::surface::PreviewSurface;

/// Hard ceiling on the zoom factor, below whatever the device reports.
pub const MAX_ZOOM_FACTOR: f32 = 3.0;

/// Fixed recording filename inside the configured output directory. A stale
/// file of this name is removed before each new recording.
pub const VIDEO_OUTPUT_FILE: &str = "capture_video.mp4";

/// Clamp a requested zoom factor to `[device.min_zoom, min(device.max_zoom,
/// MAX_ZOOM_FACTOR)]`, tolerating devices whose capped maximum falls below
/// their minimum (fixed-zoom webcams).
fn clamp_zoom(device: &dyn CameraDevice, requested: f32) -> f32 {
    let lo = device.min_zoom();
    let hi = device.max_zoom().min(MAX_ZOOM_FACTOR).max(lo);
    requested.clamp(lo, hi)
}

/// Single-shot slot for an in-flight recording stop-cycle.
struct PendingRecording {
    request: u64,
    seconds: u64,
}

/// Camera-capture controller: a state-managing facade over the platform
/// capture stack.
///
/// Owns the session graph, the transition guard, the published state, and
/// the event channel that re-marshals platform callbacks onto the hosting
/// UI's context. The UI issues intents (`change_camera`, `set_zoom`,
/// `capture_output`, …) and drains completions by calling [`pump`] on its
/// own context.
///
/// [`pump`]: CaptureController::pump
pub struct CaptureController<B: CaptureBackend> {
    backend: B,
    surface: Arc<dyn PreviewSurface>,
    motion: Arc<dyn MotionService>,
    clock: Arc<dyn RecordingClock>,
    permissions: Arc<dyn PermissionService>,
    delegate: Option<Arc<dyn CaptureDelegate>>,

    config: CaptureConfiguration,
    state: CaptureState,
    session: Arc<Mutex<CaptureSession>>,
    guard: TransitionGuard,
    orientation: OrientationTracker,

    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,

    pending_photo: Option<u64>,
    pending_recording: Option<PendingRecording>,
    request_counter: u64,
    is_setup: bool,
}

impl<B: CaptureBackend> CaptureController<B> {
    pub fn new(
        config: CaptureConfiguration,
        backend: B,
        surface: Arc<dyn PreviewSurface>,
        motion: Arc<dyn MotionService>,
        clock: Arc<dyn RecordingClock>,
        permissions: Arc<dyn PermissionService>,
    ) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;
        let (events_tx, events_rx) = channel();
        let state = CaptureState::from_configuration(&config);

        Ok(Self {
            backend,
            surface,
            motion,
            clock,
            permissions,
            delegate: None,
            config,
            state,
            session: Arc::new(Mutex::new(CaptureSession::new())),
            guard: TransitionGuard::new(),
            orientation: OrientationTracker::new(),
            events_tx,
            events_rx,
            pending_photo: None,
            pending_recording: None,
            request_counter: 0,
            is_setup: false,
        })
    }

    /// Register the completion/observation delegate. Registered once;
    /// subsequent registrations are ignored.
    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        if self.delegate.is_some() {
            log::warn!("capture delegate already registered, ignoring");
            return;
        }
        self.delegate = Some(delegate);
    }

    /// Current published state snapshot.
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn transition_token(&self) -> TransitionToken {
        self.guard.token()
    }

    pub fn is_setup(&self) -> bool {
        self.is_setup
    }

    /// Surface an explicit permission denial before touching any hardware.
    /// `Undetermined` passes: prompting is the hosting app's concern.
    pub fn check_permissions(&self) -> Result<(), CaptureError> {
        if self.permissions.authorization_status(MediaKind::Video) == AuthorizationStatus::Denied {
            return Err(CaptureError::CameraPermissionsNotGranted);
        }
        if self.permissions.authorization_status(MediaKind::Audio) == AuthorizationStatus::Denied {
            return Err(CaptureError::MicrophonePermissionsNotGranted);
        }
        Ok(())
    }

    /// One-time session wiring, in strict order: permission preflight →
    /// empty session → preview layer → grid overlay → device discovery →
    /// sink construction → motion updates → interruption observer → input
    /// and output attachment → frame tap → initial zoom/torch → session
    /// start on a dedicated background thread.
    ///
    /// Any attachment rejection aborts the sequence; no further steps
    /// execute.
    pub fn setup(&mut self) -> Result<(), CaptureError> {
        if self.is_setup {
            return Ok(());
        }
        self.check_permissions()?;

        *self.session.lock() = CaptureSession::new();
        self.surface.attach_preview_layer();
        self.surface.install_grid_overlay(self.state.grid_visible);

        {
            let mut session = self.session.lock();

            for position in [CameraPosition::Front, CameraPosition::Back] {
                match self.backend.camera(position) {
                    Some(device) => session.register_camera(device),
                    None => log::warn!("no {:?} camera discovered", position),
                }
            }
            if session.camera(self.state.camera_position).is_none() {
                return Err(CaptureError::DeviceNotAvailable(format!(
                    "{:?} camera",
                    self.state.camera_position
                )));
            }
            let microphone = self
                .backend
                .microphone()
                .ok_or_else(|| CaptureError::DeviceNotAvailable("microphone".into()))?;
            session.register_microphone(microphone);
            session.register_sinks(self.backend.make_photo_sink(), self.backend.make_video_sink());

            let tx = self.events_tx.clone();
            self.motion.start_updates(
                self.config.motion_interval,
                Arc::new(move |sample| {
                    let _ = tx.send(SessionEvent::MotionSample(sample));
                }),
            );

            let tx = self.events_tx.clone();
            self.backend.observe_interruptions(Arc::new(move || {
                let _ = tx.send(SessionEvent::Interrupted);
            }));

            session.attach_camera_input(self.state.camera_position)?;
            session.attach_audio_input()?;
            session.attach_output(self.state.output_type)?;
            session.install_frame_tap();

            if let Some(device) = session.active_camera() {
                let zoom = clamp_zoom(device.as_ref(), self.config.zoom_factor);
                let torch = self.state.torch_mode;
                configure_device(device.as_ref(), |d| {
                    d.set_zoom_factor(zoom);
                    if torch == TorchMode::On && d.has_torch() {
                        d.set_torch_mode(TorchMode::On);
                    }
                })?;
                self.state.zoom_factor = zoom;
            }
        }

        let session = Arc::clone(&self.session);
        let tx = self.events_tx.clone();
        thread::Builder::new()
            .name("capture-session-start".into())
            .spawn(move || {
                match session.lock().start_running() {
                    Ok(()) => {
                        let _ = tx.send(SessionEvent::SetupComplete);
                    }
                    Err(e) => {
                        log::error!("capture session failed to start: {}", e);
                        let _ = tx.send(SessionEvent::Interrupted);
                    }
                };
            })
            .expect("failed to spawn session start thread");

        self.is_setup = true;
        Ok(())
    }

    /// Stop everything and detach. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if !self.is_setup {
            return;
        }
        if self.state.is_recording {
            self.stop_recording();
        }
        self.clock.reset();
        self.motion.stop_updates();
        self.session.lock().stop_running();
        self.guard.clear();
        self.is_setup = false;
        log::info!("capture controller torn down");
    }

    /// Drain pending platform/timer events on the caller's context. The
    /// hosting UI calls this from its own scheduling loop; every delegate
    /// notification fires from here.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    // --- Transitions ---

    /// Switch to the camera at `position`, masked by a freeze-frame overlay
    /// and optionally a cosmetic flip. Dropped (not queued) if `position` is
    /// current or another transition is in flight.
    pub fn change_camera(&mut self, position: CameraPosition, flip: Option<FlipDirection>) {
        if !self.is_setup {
            return;
        }
        if position == self.state.camera_position {
            log::debug!("camera already at {:?}", position);
            return;
        }
        if !self.guard.begin_camera_change(position, flip) {
            log::debug!("camera change dropped, transition in flight");
            return;
        }
        self.show_freeze();
        schedule(
            &self.events_tx,
            FREEZE_SWAP_DELAY,
            SessionEvent::TransitionSwap,
            "swap",
        );
    }

    /// Switch the attached sink to `output`. Dropped if `output` is current,
    /// a recording is active, or another transition is in flight.
    pub fn change_output_type(&mut self, output: OutputType) {
        if !self.is_setup {
            return;
        }
        if output == self.state.output_type {
            log::debug!("output already {:?}", output);
            return;
        }
        if self.state.is_recording {
            log::debug!("output change dropped, recording in progress");
            return;
        }
        if !self.guard.begin_output_change(output) {
            log::debug!("output change dropped, transition in flight");
            return;
        }
        self.show_freeze();
        schedule(
            &self.events_tx,
            FREEZE_SWAP_DELAY,
            SessionEvent::TransitionSwap,
            "swap",
        );
    }

    fn show_freeze(&self) {
        match self.session.lock().snapshot() {
            Some(frame) => self.surface.show_freeze_frame(FreezeFrame {
                frame,
                framing: snapshot_framing(self.state.camera_position),
            }),
            None => log::debug!("no frame available for freeze overlay"),
        }
    }

    // --- Capture coordinator ---

    /// Photo mode: capture a photo. Video mode: toggle recording. No-op
    /// while a blocking transition is in flight.
    pub fn capture_output(&mut self) {
        if !self.is_setup {
            return;
        }
        if self.guard.blocks() {
            log::debug!("capture dropped, transition in flight");
            return;
        }
        match self.state.output_type {
            OutputType::Photo => self.capture_photo(),
            OutputType::Video => {
                if self.state.is_recording {
                    self.stop_recording();
                } else {
                    self.start_recording();
                }
            }
        }
    }

    fn capture_photo(&mut self) {
        if self.pending_photo.is_some() {
            log::warn!("photo capture dropped, previous capture still pending");
            return;
        }
        let Some(sink) = self.session.lock().photo_sink() else {
            return;
        };
        let settings = PhotoCaptureSettings {
            flash_mode: self.state.flash_mode,
        };
        let frame = self.session.lock().snapshot().map(|f| (*f).clone());

        let request = self.next_request();
        self.pending_photo = Some(request);
        self.guard.begin_media_capture();

        let tx = self.events_tx.clone();
        sink.capture_photo(
            settings,
            frame,
            Arc::new(move |data| {
                let _ = tx.send(SessionEvent::PhotoCaptured { request, data });
            }),
        );
        self.surface.flash_screen(SHUTTER_FLASH);
    }

    fn start_recording(&mut self) {
        if self.pending_recording.is_some() {
            log::warn!("recording dropped, previous stop-cycle still pending");
            return;
        }
        let Some(sink) = self.session.lock().video_sink() else {
            return;
        };

        let path = self.config.output_directory.join(VIDEO_OUTPUT_FILE);
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("failed to remove stale recording file: {}", e);
            }
        }

        let connection = ConnectionSettings {
            mirrored: self.state.mirror_output,
            orientation: self.state.orientation,
        };

        let request = self.next_request();
        let tx = self.events_tx.clone();
        let completion: RecordingCallback = Arc::new(move |outcome| {
            let _ = tx.send(SessionEvent::RecordingFinished { request, outcome });
        });

        if let Err(e) = sink.start_recording(&path, connection, completion) {
            log::error!("failed to start recording: {}", e);
            return;
        }

        self.pending_recording = Some(PendingRecording {
            request,
            seconds: 0,
        });
        self.session.lock().set_recording_route(Some(sink));
        self.state.is_recording = true;
        self.publish();

        let tx = self.events_tx.clone();
        self.clock.start(Arc::new(move |seconds| {
            let _ = tx.send(SessionEvent::RecordingTick(seconds));
        }));
    }

    fn stop_recording(&mut self) {
        let Some(sink) = self.session.lock().video_sink() else {
            return;
        };
        sink.stop_recording();
        self.session.lock().set_recording_route(None);
        self.clock.reset();
        self.state.is_recording = false;
        self.state.recording_seconds = 0;
        self.publish();
    }

    // --- Live parameters ---

    /// Clamp and apply a zoom factor. No-op (not clamp-and-apply) while a
    /// blocking transition is in flight.
    pub fn set_zoom(&mut self, factor: f32) {
        if !self.is_setup || self.guard.blocks() {
            return;
        }
        let Some(device) = self.session.lock().active_camera() else {
            return;
        };
        let zoom = clamp_zoom(device.as_ref(), factor);
        match configure_device(device.as_ref(), |d| d.set_zoom_factor(zoom)) {
            Ok(()) => {
                self.state.zoom_factor = zoom;
                self.publish();
            }
            Err(e) => log::error!("failed to set zoom: {}", e),
        }
    }

    /// Steer focus and exposure to a surface touch point, where the device
    /// supports each independently, and present the focus ring.
    pub fn focus_and_expose(&mut self, point: Point) {
        if !self.is_setup {
            return;
        }
        let Some(device) = self.session.lock().active_camera() else {
            return;
        };
        let device_point = self.surface.layer_point_to_device_point(point);
        let focus = device.supports_focus_point_of_interest();
        let exposure = device.supports_exposure_point_of_interest();
        if focus || exposure {
            let result = configure_device(device.as_ref(), |d| {
                if focus {
                    d.set_focus_point_of_interest(device_point);
                }
                if exposure {
                    d.set_exposure_point_of_interest(device_point);
                }
            });
            if let Err(e) = result {
                log::error!("failed to set point of interest: {}", e);
            }
        }
        self.surface.show_focus_ring(point, &self.config.focus_ring);
    }

    /// Settable only when the active device has flash capability and no
    /// blocking transition is in flight.
    pub fn set_flash_mode(&mut self, mode: FlashMode) {
        if !self.is_setup || self.guard.blocks() {
            return;
        }
        let Some(device) = self.session.lock().active_camera() else {
            return;
        };
        if !device.has_flash() {
            log::debug!("flash unsupported by {}", device.id());
            return;
        }
        self.state.flash_mode = mode;
        self.publish();
    }

    /// Settable only when the active device has torch capability and no
    /// blocking transition is in flight.
    pub fn set_torch_mode(&mut self, mode: TorchMode) {
        if !self.is_setup || self.guard.blocks() {
            return;
        }
        let Some(device) = self.session.lock().active_camera() else {
            return;
        };
        if !device.has_torch() {
            log::debug!("torch unsupported by {}", device.id());
            return;
        }
        match configure_device(device.as_ref(), |d| d.set_torch_mode(mode)) {
            Ok(()) => {
                self.state.torch_mode = mode;
                self.publish();
            }
            Err(e) => log::error!("failed to set torch: {}", e),
        }
    }

    /// Mirror the next recording connection. State-only; blocked during
    /// transitions.
    pub fn set_mirror_output(&mut self, mirrored: bool) {
        if !self.is_setup || self.guard.blocks() {
            return;
        }
        self.state.mirror_output = mirrored;
        self.publish();
    }

    /// Fade the grid overlay in or out. Blocked during transitions.
    pub fn set_grid_visible(&mut self, visible: bool) {
        if !self.is_setup || self.guard.blocks() {
            return;
        }
        self.state.grid_visible = visible;
        self.surface
            .set_grid_opacity(if visible { 1.0 } else { 0.0 }, GRID_FADE);
        self.publish();
    }

    // --- Event handling ---

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SetupComplete => {
                log::info!("capture session running");
                if let Some(delegate) = &self.delegate {
                    delegate.on_setup_complete();
                }
            }
            SessionEvent::MotionSample(sample) => {
                if self.orientation.ingest(sample) {
                    self.state.orientation = self.orientation.current();
                    self.publish();
                }
            }
            SessionEvent::PhotoCaptured { request, data } => self.finish_photo(request, data),
            SessionEvent::RecordingFinished { request, outcome } => {
                self.finish_recording(request, outcome)
            }
            SessionEvent::RecordingTick(seconds) => {
                if self.state.is_recording {
                    self.state.recording_seconds = seconds;
                    if let Some(pending) = &mut self.pending_recording {
                        pending.seconds = seconds;
                    }
                    self.publish();
                }
            }
            SessionEvent::TransitionSwap => self.apply_pending_transition(),
            SessionEvent::FreezeFadeOut => {
                self.surface.fade_out_freeze_frame(FREEZE_FADE);
                schedule(
                    &self.events_tx,
                    FREEZE_FADE,
                    SessionEvent::TransitionFinished,
                    "finish",
                );
            }
            SessionEvent::TransitionFinished => self.guard.finish(),
            SessionEvent::Interrupted => self.handle_interruption(),
        }
    }

    fn apply_pending_transition(&mut self) {
        let Some(pending) = self.guard.take_pending() else {
            return;
        };
        let applied = match pending {
            PendingTransition::Camera { target, flip } => self.apply_camera_swap(target, flip),
            PendingTransition::Output { target } => self.apply_output_swap(target),
        };
        if !applied {
            // Swap failed: drop the freeze immediately rather than leaving
            // the preview masked.
            self.surface.remove_freeze_frame();
            self.guard.clear();
            return;
        }
        self.force_torch_off();
        self.publish();
        schedule(
            &self.events_tx,
            FREEZE_FADE_DELAY,
            SessionEvent::FreezeFadeOut,
            "fade",
        );
    }

    fn apply_camera_swap(&mut self, target: CameraPosition, flip: Option<FlipDirection>) -> bool {
        // Torch is per-device; the outgoing device goes dark before detach.
        if let Some(old) = self.session.lock().active_camera() {
            if old.has_torch() {
                if let Err(e) = configure_device(old.as_ref(), |d| d.set_torch_mode(TorchMode::Off))
                {
                    log::error!("failed to reset torch on outgoing camera: {}", e);
                }
            }
        }

        if let Err(e) = self.session.lock().attach_camera_input(target) {
            log::error!("camera change failed: {}", e);
            return false;
        }
        self.state.camera_position = target;

        // The zoom range is per-device; re-clamp and re-apply for the new one.
        if let Some(device) = self.session.lock().active_camera() {
            let zoom = clamp_zoom(device.as_ref(), self.state.zoom_factor);
            if configure_device(device.as_ref(), |d| d.set_zoom_factor(zoom)).is_ok() {
                self.state.zoom_factor = zoom;
            }
        }

        if let Some(direction) = flip {
            self.surface.play_flip_transition(direction);
        }
        true
    }

    fn apply_output_swap(&mut self, target: OutputType) -> bool {
        if let Err(e) = self.session.lock().attach_output(target) {
            log::error!("output change failed: {}", e);
            return false;
        }
        self.state.output_type = target;
        true
    }

    fn force_torch_off(&mut self) {
        self.state.torch_mode = TorchMode::Off;
        let Some(device) = self.session.lock().active_camera() else {
            return;
        };
        if !device.has_torch() {
            return;
        }
        if let Err(e) = configure_device(device.as_ref(), |d| d.set_torch_mode(TorchMode::Off)) {
            log::error!("failed to reset torch: {}", e);
        }
    }

    fn finish_photo(&mut self, request: u64, data: Option<Vec<u8>>) {
        if self.pending_photo != Some(request) {
            log::debug!("stale photo completion for request {}", request);
            return;
        }
        self.pending_photo = None;
        self.guard.end_media_capture();

        let result = match data {
            Some(data) => Ok(CapturedMedia::Photo {
                data,
                metadata: MediaMetadata::for_photo(
                    self.state.camera_position,
                    self.state.orientation,
                ),
            }),
            None => Err(CaptureError::CapturedPhotoCannotBeFetched),
        };
        self.deliver(result);
    }

    fn finish_recording(&mut self, request: u64, outcome: Result<PathBuf, CaptureError>) {
        let Some(pending) = self.pending_recording.take() else {
            log::debug!("stale recording completion for request {}", request);
            return;
        };
        if pending.request != request {
            self.pending_recording = Some(pending);
            log::debug!("stale recording completion for request {}", request);
            return;
        }

        let result = outcome.map(|path| {
            let metadata = MediaMetadata::for_video(
                self.state.camera_position,
                self.state.orientation,
                pending.seconds,
            );
            if let Err(e) = media::write_metadata(&metadata, &path) {
                log::warn!("failed to write metadata sidecar: {}", e);
            }
            CapturedMedia::Video { path, metadata }
        });
        self.deliver(result);
    }

    fn handle_interruption(&mut self) {
        log::warn!("capture session interrupted");
        if self.state.is_recording {
            self.stop_recording();
        }
        self.force_torch_off();
        self.guard.clear();
        self.surface.remove_freeze_frame();
        self.publish();
        if let Some(delegate) = &self.delegate {
            delegate.on_interruption();
        }
    }

    // --- Helpers ---

    fn deliver(&self, result: Result<CapturedMedia, CaptureError>) {
        match &self.delegate {
            Some(delegate) => delegate.on_media_captured(result),
            None => log::warn!("captured media dropped, no delegate registered"),
        }
    }

    fn publish(&self) {
        if let Some(delegate) = &self.delegate {
            delegate.on_state_changed(&self.state);
        }
    }

    fn next_request(&mut self) -> u64 {
        self.request_counter += 1;
        self.request_counter
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::{Duration, Instant};

    use approx::assert_relative_eq;

    use super::*;
    use crate::motion::orientation::{DeviceOrientation, MotionSample};
    use crate::testing::{
        test_frame, CollectingDelegate, FakeBackend, FakeCameraDevice, FakeSurface, ManualClock,
        ManualMotion, StaticPermissions,
    };

    struct Harness {
        controller: CaptureController<Arc<FakeBackend>>,
        backend: Arc<FakeBackend>,
        surface: Arc<FakeSurface>,
        motion: Arc<ManualMotion>,
        clock: Arc<ManualClock>,
        delegate: Arc<CollectingDelegate>,
        output_dir: PathBuf,
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.output_dir);
        }
    }

    fn harness_full(mut config: CaptureConfiguration, permissions: StaticPermissions) -> Harness {
        let output_dir =
            std::env::temp_dir().join(format!("capture-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&output_dir).unwrap();
        config.output_directory = output_dir.clone();

        let backend = Arc::new(FakeBackend::new());
        let surface = Arc::new(FakeSurface::new());
        let motion = Arc::new(ManualMotion::new());
        let clock = Arc::new(ManualClock::new());
        let delegate = Arc::new(CollectingDelegate::new());

        let mut controller = CaptureController::new(
            config,
            Arc::clone(&backend),
            surface.clone() as Arc<dyn PreviewSurface>,
            motion.clone() as Arc<dyn MotionService>,
            clock.clone() as Arc<dyn RecordingClock>,
            Arc::new(permissions) as Arc<dyn PermissionService>,
        )
        .unwrap();
        controller.set_delegate(delegate.clone() as Arc<dyn CaptureDelegate>);

        Harness {
            controller,
            backend,
            surface,
            motion,
            clock,
            delegate,
            output_dir,
        }
    }

    fn harness_with(config: CaptureConfiguration) -> Harness {
        harness_full(config, StaticPermissions::granted())
    }

    fn harness() -> Harness {
        harness_with(CaptureConfiguration::default())
    }

    fn video_harness() -> Harness {
        harness_with(CaptureConfiguration {
            output_type: OutputType::Video,
            ..CaptureConfiguration::default()
        })
    }

    fn pump_for(h: &mut Harness, ms: u64) {
        let deadline = Instant::now() + Duration::from_millis(ms);
        while Instant::now() < deadline {
            h.controller.pump();
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Covers the full freeze window: 150 ms swap + 100 ms fade delay +
    /// 250 ms fade, plus margin.
    fn pump_transition(h: &mut Harness) {
        pump_for(h, 700);
    }

    fn setup(h: &mut Harness) {
        h.controller.setup().unwrap();
        pump_for(h, 100);
    }

    fn back(h: &Harness) -> Arc<FakeCameraDevice> {
        h.backend.fake_camera(CameraPosition::Back).unwrap()
    }

    fn front(h: &Harness) -> Arc<FakeCameraDevice> {
        h.backend.fake_camera(CameraPosition::Front).unwrap()
    }

    // --- Setup ---

    #[test]
    fn setup_starts_session_and_signals_completion() {
        let mut h = harness();
        setup(&mut h);

        assert!(h.controller.is_setup());
        assert!(h.delegate.setup_completed());
        assert!(h.surface.preview_attached());
        assert!(h.motion.is_started());
        assert!(back(&h).is_streaming());
        assert!(!front(&h).is_streaming());
    }

    #[test]
    fn setup_with_rejecting_camera_input_aborts() {
        let mut h = harness();
        back(&h).set_available(false);

        let result = h.controller.setup();
        assert!(matches!(result, Err(CaptureError::CannotSetupInput(_))));
        assert!(!h.controller.is_setup());
        assert!(!back(&h).is_streaming());

        pump_for(&mut h, 50);
        assert!(!h.delegate.setup_completed());
    }

    #[test]
    fn setup_without_configured_camera_is_device_not_available() {
        let mut h = harness();
        h.backend.remove_camera(CameraPosition::Back);
        assert!(matches!(
            h.controller.setup(),
            Err(CaptureError::DeviceNotAvailable(_))
        ));
    }

    #[test]
    fn setup_surfaces_explicit_permission_denials() {
        let mut h = harness_full(
            CaptureConfiguration::default(),
            StaticPermissions::new(AuthorizationStatus::Denied, AuthorizationStatus::Granted),
        );
        assert_eq!(
            h.controller.setup(),
            Err(CaptureError::CameraPermissionsNotGranted)
        );

        let mut h = harness_full(
            CaptureConfiguration::default(),
            StaticPermissions::new(AuthorizationStatus::Granted, AuthorizationStatus::Denied),
        );
        assert_eq!(
            h.controller.setup(),
            Err(CaptureError::MicrophonePermissionsNotGranted)
        );

        // Undetermined is not a failure at this layer.
        let mut h = harness_full(
            CaptureConfiguration::default(),
            StaticPermissions::new(
                AuthorizationStatus::Undetermined,
                AuthorizationStatus::Undetermined,
            ),
        );
        assert!(h.controller.setup().is_ok());
    }

    // --- Zoom ---

    #[test]
    fn zoom_clamps_to_device_range_with_ceiling() {
        let mut h = harness();
        setup(&mut h);

        // Back camera reports 1–10x, the controller caps at 3x.
        h.controller.set_zoom(5.0);
        assert_relative_eq!(h.controller.state().zoom_factor, 3.0);
        assert_relative_eq!(back(&h).zoom(), 3.0);

        h.controller.set_zoom(0.2);
        assert_relative_eq!(h.controller.state().zoom_factor, 1.0);

        // Idempotent re-application.
        h.controller.set_zoom(2.0);
        let first = h.controller.state().zoom_factor;
        h.controller.set_zoom(2.0);
        assert_relative_eq!(h.controller.state().zoom_factor, first);

        assert_eq!(back(&h).unguarded_mutations(), 0);
    }

    #[test]
    fn zoom_is_noop_during_transition() {
        let mut h = harness();
        setup(&mut h);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.change_camera(CameraPosition::Front, None);
        h.controller.set_zoom(2.5);
        assert_relative_eq!(h.controller.state().zoom_factor, 1.0);

        pump_transition(&mut h);
        h.controller.set_zoom(2.5);
        assert_relative_eq!(h.controller.state().zoom_factor, 2.5);
    }

    // --- Transitions ---

    #[test]
    fn camera_change_swaps_input_and_releases_token() {
        let mut h = harness();
        setup(&mut h);
        back(&h).push_frame(test_frame(2, 2));

        h.controller
            .change_camera(CameraPosition::Front, Some(FlipDirection::FromLeft));
        assert_eq!(
            h.controller.transition_token(),
            TransitionToken::CameraPositionChange
        );
        assert!(h.surface.freeze_visible());
        // Swap happens after the freeze delay, not synchronously.
        assert_eq!(h.controller.state().camera_position, CameraPosition::Back);

        pump_transition(&mut h);
        assert_eq!(h.controller.state().camera_position, CameraPosition::Front);
        assert_eq!(h.controller.transition_token(), TransitionToken::None);
        assert!(!h.surface.freeze_visible());
        assert_eq!(h.surface.flips(), vec![FlipDirection::FromLeft]);
        assert!(front(&h).is_streaming());
        assert!(!back(&h).is_streaming());
    }

    #[test]
    fn second_change_during_freeze_is_dropped() {
        let mut h = harness();
        setup(&mut h);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.change_camera(CameraPosition::Front, None);
        // Let the swap land but keep pumping inside the freeze window.
        pump_for(&mut h, 250);
        assert_eq!(h.controller.state().camera_position, CameraPosition::Front);
        assert_eq!(
            h.controller.transition_token(),
            TransitionToken::CameraPositionChange
        );

        h.controller.change_camera(CameraPosition::Back, None);
        h.controller.change_output_type(OutputType::Video);
        pump_transition(&mut h);

        assert_eq!(h.controller.state().camera_position, CameraPosition::Front);
        assert_eq!(h.controller.state().output_type, OutputType::Photo);
        assert_eq!(h.surface.freezes_shown(), 1);
    }

    #[test]
    fn live_parameters_are_dropped_during_freeze() {
        let mut h = harness();
        setup(&mut h);
        h.controller.set_torch_mode(TorchMode::On);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.change_output_type(OutputType::Video);
        h.controller.set_flash_mode(FlashMode::On);
        h.controller.set_grid_visible(true);
        h.controller.set_mirror_output(true);

        let state = h.controller.state();
        assert_eq!(state.flash_mode, FlashMode::Off);
        assert!(!state.grid_visible);
        assert!(!state.mirror_output);

        pump_transition(&mut h);
        assert_eq!(h.controller.state().output_type, OutputType::Video);
    }

    #[test]
    fn changing_camera_forces_torch_off() {
        let mut h = harness();
        setup(&mut h);
        h.controller.set_torch_mode(TorchMode::On);
        assert_eq!(back(&h).torch(), TorchMode::On);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.change_camera(CameraPosition::Front, None);
        pump_transition(&mut h);

        assert_eq!(h.controller.state().torch_mode, TorchMode::Off);
        assert_eq!(back(&h).torch(), TorchMode::Off);
    }

    #[test]
    fn changing_output_type_forces_torch_off() {
        let mut h = harness();
        setup(&mut h);
        h.controller.set_torch_mode(TorchMode::On);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.change_output_type(OutputType::Video);
        pump_transition(&mut h);

        assert_eq!(h.controller.state().output_type, OutputType::Video);
        assert_eq!(h.controller.state().torch_mode, TorchMode::Off);
        assert_eq!(back(&h).torch(), TorchMode::Off);
    }

    // --- Live parameters ---

    #[test]
    fn grid_double_toggle_lands_on_second_call() {
        let mut h = harness();
        setup(&mut h);

        h.controller.set_grid_visible(true);
        h.controller.set_grid_visible(false);
        assert!(!h.controller.state().grid_visible);
        assert_relative_eq!(h.surface.grid_opacity(), 0.0);

        h.controller.set_grid_visible(true);
        assert!(h.controller.state().grid_visible);
        assert_relative_eq!(h.surface.grid_opacity(), 1.0);
    }

    #[test]
    fn flash_requires_device_capability() {
        // Front camera has no flash.
        let mut h = harness_with(CaptureConfiguration {
            camera_position: CameraPosition::Front,
            ..CaptureConfiguration::default()
        });
        setup(&mut h);

        h.controller.set_flash_mode(FlashMode::On);
        assert_eq!(h.controller.state().flash_mode, FlashMode::Off);

        h.controller.set_torch_mode(TorchMode::On);
        assert_eq!(h.controller.state().torch_mode, TorchMode::Off);
    }

    #[test]
    fn focus_steers_only_supported_points() {
        let mut h = harness();
        setup(&mut h);

        // Surface is 100x200; the fake maps by normalization.
        h.controller.focus_and_expose(Point::new(50.0, 100.0));
        let poi = back(&h).focus_point().unwrap();
        assert_relative_eq!(poi.x, 0.5);
        assert_relative_eq!(poi.y, 0.5);
        assert!(back(&h).exposure_point().is_some());
        assert_eq!(h.surface.focus_points().len(), 1);
        assert_eq!(back(&h).unguarded_mutations(), 0);

        // Front camera supports focus but not exposure.
        back(&h).push_frame(test_frame(2, 2));
        h.controller.change_camera(CameraPosition::Front, None);
        pump_transition(&mut h);
        h.controller.focus_and_expose(Point::new(25.0, 50.0));
        assert!(front(&h).focus_point().is_some());
        assert!(front(&h).exposure_point().is_none());
    }

    // --- Photo capture ---

    #[test]
    fn photo_capture_delivers_media_once() {
        let mut h = harness();
        setup(&mut h);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.capture_output();
        assert_eq!(h.surface.flashes(), 1);
        pump_for(&mut h, 50);

        let media = h.delegate.media();
        assert_eq!(media.len(), 1);
        match &media[0] {
            Ok(CapturedMedia::Photo { data, metadata }) => {
                assert_eq!(data, &vec![0xca, 0xfe]);
                assert_eq!(metadata.camera_position, CameraPosition::Back);
                assert!(metadata.duration_secs.is_none());
            }
            other => panic!("unexpected media result: {:?}", other),
        }
        assert_eq!(h.controller.transition_token(), TransitionToken::None);
    }

    #[test]
    fn unfetchable_photo_is_reported_exactly_once() {
        let mut h = harness();
        setup(&mut h);
        h.backend.photo_sink().set_response(None);

        h.controller.capture_output();
        pump_for(&mut h, 50);

        let media = h.delegate.media();
        assert_eq!(media.len(), 1);
        assert_eq!(
            media[0],
            Err(CaptureError::CapturedPhotoCannotBeFetched)
        );
    }

    #[test]
    fn photo_settings_carry_current_flash_mode() {
        let mut h = harness();
        setup(&mut h);
        h.controller.set_flash_mode(FlashMode::Auto);

        h.controller.capture_output();
        assert_eq!(
            h.backend.photo_sink().last_settings(),
            Some(PhotoCaptureSettings {
                flash_mode: FlashMode::Auto
            })
        );
    }

    #[test]
    fn capture_is_noop_during_freeze() {
        let mut h = harness();
        setup(&mut h);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.change_camera(CameraPosition::Front, None);
        h.controller.capture_output();
        assert_eq!(h.backend.photo_sink().captures(), 0);

        pump_transition(&mut h);
        h.controller.capture_output();
        assert_eq!(h.backend.photo_sink().captures(), 1);
    }

    // --- Video recording ---

    #[test]
    fn video_capture_toggles_recording() {
        let mut h = video_harness();
        setup(&mut h);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.capture_output();
        assert!(h.controller.state().is_recording);
        assert!(h.clock.is_running());
        assert_eq!(h.backend.video_sink().starts(), 1);

        // Frames route to the sink while recording.
        back(&h).push_frame(test_frame(2, 2));
        assert_eq!(h.backend.video_sink().appended_frames(), 1);

        h.clock.tick(1);
        pump_for(&mut h, 20);
        assert_eq!(h.controller.state().recording_seconds, 1);

        h.controller.capture_output();
        assert!(!h.controller.state().is_recording);
        assert_eq!(h.controller.state().recording_seconds, 0);
        assert!(!h.clock.is_running());
        assert_eq!(h.backend.video_sink().stops(), 1);
        assert_eq!(h.backend.video_sink().starts(), 1);

        pump_for(&mut h, 50);
        let media = h.delegate.media();
        assert_eq!(media.len(), 1);
        match &media[0] {
            Ok(CapturedMedia::Video { path, metadata }) => {
                assert!(path.ends_with(VIDEO_OUTPUT_FILE));
                assert_eq!(metadata.duration_secs, Some(1));
                // Metadata sidecar lands next to the recording.
                assert!(path.with_extension("metadata.json").exists());
            }
            other => panic!("unexpected media result: {:?}", other),
        }

        // Frames no longer route once stopped.
        back(&h).push_frame(test_frame(2, 2));
        assert_eq!(h.backend.video_sink().appended_frames(), 1);
    }

    #[test]
    fn recording_connection_carries_mirror_and_orientation() {
        let mut h = video_harness();
        setup(&mut h);

        h.controller.set_mirror_output(true);
        h.motion.push(Some(MotionSample::new(0.9, 0.0, 0.0)));
        pump_for(&mut h, 20);
        assert_eq!(
            h.controller.state().orientation,
            DeviceOrientation::LandscapeLeft
        );

        h.controller.capture_output();
        let connection = h.backend.video_sink().last_connection().unwrap();
        assert!(connection.mirrored);
        assert_eq!(connection.orientation, DeviceOrientation::LandscapeLeft);
    }

    #[test]
    fn recording_failure_propagates_through_completion() {
        let mut h = video_harness();
        setup(&mut h);

        h.controller.capture_output();
        h.backend.video_sink().fail_with("disk full");
        h.controller.capture_output();
        pump_for(&mut h, 50);

        let media = h.delegate.media();
        assert_eq!(media.len(), 1);
        assert_eq!(
            media[0],
            Err(CaptureError::RecordingFailed("disk full".into()))
        );
    }

    // --- Interruption ---

    #[test]
    fn interruption_stops_recording_and_resets_torch() {
        let mut h = video_harness();
        setup(&mut h);
        h.controller.set_torch_mode(TorchMode::On);
        h.controller.capture_output();
        assert!(h.controller.state().is_recording);

        h.backend.trigger_interruption();
        pump_for(&mut h, 50);

        let state = h.controller.state();
        assert!(!state.is_recording);
        assert_eq!(state.torch_mode, TorchMode::Off);
        assert_eq!(back(&h).torch(), TorchMode::Off);
        assert_eq!(h.delegate.interruptions(), 1);
    }

    #[test]
    fn interruption_clears_in_flight_transition() {
        let mut h = harness();
        setup(&mut h);
        back(&h).push_frame(test_frame(2, 2));

        h.controller.change_camera(CameraPosition::Front, None);
        assert!(h.surface.freeze_visible());

        h.backend.trigger_interruption();
        pump_for(&mut h, 20);

        assert_eq!(h.controller.transition_token(), TransitionToken::None);
        assert!(!h.surface.freeze_visible());

        // New transitions are accepted immediately after recovery.
        h.controller.change_camera(CameraPosition::Front, None);
        assert_eq!(
            h.controller.transition_token(),
            TransitionToken::CameraPositionChange
        );
        pump_transition(&mut h);
        assert_eq!(h.controller.state().camera_position, CameraPosition::Front);
    }

    // --- Delegate ---

    #[test]
    fn delegate_registration_is_once() {
        let mut h = harness();
        setup(&mut h);

        let second = Arc::new(CollectingDelegate::new());
        h.controller
            .set_delegate(second.clone() as Arc<dyn CaptureDelegate>);

        h.controller.capture_output();
        pump_for(&mut h, 50);
        assert_eq!(h.delegate.media().len(), 1);
        assert!(second.media().is_empty());
    }

    #[test]
    fn teardown_stops_everything() {
        let mut h = video_harness();
        setup(&mut h);
        h.controller.capture_output();

        h.controller.teardown();
        assert!(!h.controller.is_setup());
        assert!(!h.motion.is_started());
        assert!(!h.clock.is_running());
        assert!(!back(&h).is_streaming());
        assert!(!h.controller.state().is_recording);
    }
}
