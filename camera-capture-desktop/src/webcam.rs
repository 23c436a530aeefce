//! Webcam capture device over nokhwa.
//!
//! The nokhwa `Camera` handle is not `Send`, so it is constructed and driven
//! entirely inside the stream thread: open, negotiate format, then pull and
//! decode frames until the stop flag drops. A run of consecutive capture
//! failures is treated as a lost device and fires the session-interruption
//! observer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use parking_lot::Mutex;

use camera_capture_core::models::error::CaptureError;
use camera_capture_core::models::frame::{PixelFormat, Point, VideoFrame};
use camera_capture_core::models::state::{CameraPosition, TorchMode};
use camera_capture_core::traits::backend::InterruptionCallback;
use camera_capture_core::traits::camera_device::{CameraDevice, FrameCallback};

use crate::device_enumerator::CameraDescriptor;

/// Consecutive capture failures tolerated before the stream is declared
/// lost.
const MAX_CAPTURE_FAILURES: u32 = 5;

/// A desktop webcam exposed through the core `CameraDevice` seam.
///
/// Desktop capability surface: no flash, no torch, fixed 1.0 zoom, no
/// focus/exposure points of interest. The controller's capability gates turn
/// the corresponding setters into no-ops, so the stubs below are only
/// reachable through direct misuse.
pub struct NokhwaCamera {
    descriptor: CameraDescriptor,
    position: CameraPosition,
    running: Arc<AtomicBool>,
    stream_thread: Mutex<Option<JoinHandle<()>>>,
    on_stream_lost: Arc<Mutex<Option<InterruptionCallback>>>,
}

impl NokhwaCamera {
    pub fn new(
        descriptor: CameraDescriptor,
        position: CameraPosition,
        on_stream_lost: Arc<Mutex<Option<InterruptionCallback>>>,
    ) -> Self {
        Self {
            descriptor,
            position,
            running: Arc::new(AtomicBool::new(false)),
            stream_thread: Mutex::new(None),
            on_stream_lost,
        }
    }

    pub fn descriptor(&self) -> &CameraDescriptor {
        &self.descriptor
    }
}

fn fire_stream_lost(hook: &Mutex<Option<InterruptionCallback>>) {
    let callback = hook.lock().clone();
    if let Some(callback) = callback {
        callback();
    }
}

impl CameraDevice for NokhwaCamera {
    fn id(&self) -> String {
        format!("webcam-{}", self.descriptor.index)
    }

    fn name(&self) -> String {
        self.descriptor.name.clone()
    }

    fn position(&self) -> CameraPosition {
        self.position
    }

    fn is_available(&self) -> bool {
        true
    }

    fn has_flash(&self) -> bool {
        false
    }

    fn has_torch(&self) -> bool {
        false
    }

    fn min_zoom(&self) -> f32 {
        1.0
    }

    fn max_zoom(&self) -> f32 {
        1.0
    }

    fn supports_focus_point_of_interest(&self) -> bool {
        false
    }

    fn supports_exposure_point_of_interest(&self) -> bool {
        false
    }

    fn lock_for_configuration(&self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn unlock_for_configuration(&self) {}

    fn set_zoom_factor(&self, factor: f32) {
        log::debug!("zoom {} ignored, unsupported on desktop webcam", factor);
    }

    fn set_torch_mode(&self, _mode: TorchMode) {
        log::debug!("torch ignored, unsupported on desktop webcam");
    }

    fn set_focus_point_of_interest(&self, _point: Point) {
        log::debug!("focus point ignored, unsupported on desktop webcam");
    }

    fn set_exposure_point_of_interest(&self, _point: Point) {
        log::debug!("exposure point ignored, unsupported on desktop webcam");
    }

    fn start_stream(&self, callback: FrameCallback) -> Result<(), CaptureError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let running = Arc::clone(&self.running);
        let on_stream_lost = Arc::clone(&self.on_stream_lost);
        let index = self.descriptor.index;
        let name = self.descriptor.name.clone();

        let handle = thread::Builder::new()
            .name(format!("webcam-{}", index))
            .spawn(move || {
                let requested = RequestedFormat::new::<RgbFormat>(
                    RequestedFormatType::AbsoluteHighestFrameRate,
                );
                let mut camera = match Camera::new(CameraIndex::Index(index), requested) {
                    Ok(camera) => camera,
                    Err(e) => {
                        log::error!("failed to open camera {}: {}", name, e);
                        running.store(false, Ordering::SeqCst);
                        fire_stream_lost(&on_stream_lost);
                        return;
                    }
                };
                if let Err(e) = camera.open_stream() {
                    log::error!("failed to open stream on {}: {}", name, e);
                    running.store(false, Ordering::SeqCst);
                    fire_stream_lost(&on_stream_lost);
                    return;
                }
                log::info!("webcam {} streaming at {:?}", name, camera.camera_format());

                let mut failures = 0u32;
                while running.load(Ordering::SeqCst) {
                    match camera.frame() {
                        Ok(buffer) => match buffer.decode_image::<RgbFormat>() {
                            Ok(decoded) => {
                                failures = 0;
                                callback(VideoFrame {
                                    width: decoded.width(),
                                    height: decoded.height(),
                                    format: PixelFormat::Rgb8,
                                    data: decoded.into_raw(),
                                });
                            }
                            Err(e) => log::warn!("frame decode failed on {}: {}", name, e),
                        },
                        Err(e) => {
                            failures += 1;
                            log::warn!("frame capture failed on {}: {}", name, e);
                            if failures >= MAX_CAPTURE_FAILURES {
                                log::error!("stream lost on {}", name);
                                fire_stream_lost(&on_stream_lost);
                                break;
                            }
                        }
                    }
                }

                let _ = camera.stop_stream();
                running.store(false, Ordering::SeqCst);
            })
            .expect("failed to spawn webcam stream thread");

        *self.stream_thread.lock() = Some(handle);
        Ok(())
    }

    fn stop_stream(&self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.stream_thread.lock().take() {
            let _ = handle.join();
        }
    }
}
