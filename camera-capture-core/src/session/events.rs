use std::path::PathBuf;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crate::models::error::CaptureError;
use crate::motion::orientation::MotionSample;

/// Cross-context messages feeding the controller's pump.
///
/// Platform callbacks (photo finished, recording finished, motion sample,
/// interruption, clock tick) and the internal transition timers never touch
/// controller state directly: they post one of these and the hosting UI
/// drains them via [`CaptureController::pump`](super::controller::CaptureController::pump).
#[derive(Debug)]
pub(crate) enum SessionEvent {
    /// The session started on its background context.
    SetupComplete,

    /// Accelerometer sample; `None` is an errored sample.
    MotionSample(Option<MotionSample>),

    /// Photo sink completion for capture request `request`.
    PhotoCaptured {
        request: u64,
        data: Option<Vec<u8>>,
    },

    /// Video sink completion for recording request `request`.
    RecordingFinished {
        request: u64,
        outcome: Result<PathBuf, CaptureError>,
    },

    /// Recording clock tick with elapsed whole seconds.
    RecordingTick(u64),

    /// The freeze frame has rendered; perform the device/sink swap.
    TransitionSwap,

    /// The post-swap settle delay elapsed; begin fading the freeze overlay.
    FreezeFadeOut,

    /// The freeze fade finished; release the transition token.
    TransitionFinished,

    /// Platform-issued session interruption.
    Interrupted,
}

/// Post `event` after a fixed cooperative delay on a named timer thread.
///
/// Send failures mean the controller is gone; the timer just exits.
pub(crate) fn schedule(tx: &Sender<SessionEvent>, delay: Duration, event: SessionEvent, label: &str) {
    let tx = tx.clone();
    thread::Builder::new()
        .name(format!("capture-timer-{}", label))
        .spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(event);
        })
        .expect("failed to spawn capture timer thread");
}
