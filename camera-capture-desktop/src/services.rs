//! Desktop implementations of the controller's service seams.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use camera_capture_core::traits::clock::{RecordingClock, TickCallback};
use camera_capture_core::traits::motion::{MotionCallback, MotionService};

/// Thread-backed 1 Hz recording clock.
///
/// Each `start` gets its own stop flag, so a straggling tick from a
/// previous run can never interleave with a restarted clock.
pub struct IntervalClock {
    active: Mutex<Option<Arc<AtomicBool>>>,
}

impl IntervalClock {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(None),
        }
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingClock for IntervalClock {
    fn start(&self, on_tick: TickCallback) {
        self.reset();

        let flag = Arc::new(AtomicBool::new(true));
        let thread_flag = Arc::clone(&flag);
        thread::Builder::new()
            .name("recording-clock".into())
            .spawn(move || {
                let mut seconds = 0u64;
                while thread_flag.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_secs(1));
                    if !thread_flag.load(Ordering::SeqCst) {
                        break;
                    }
                    seconds += 1;
                    on_tick(seconds);
                }
            })
            .expect("failed to spawn recording clock thread");

        *self.active.lock() = Some(flag);
    }

    fn reset(&self) {
        if let Some(flag) = self.active.lock().take() {
            flag.store(false, Ordering::SeqCst);
        }
    }
}

/// Motion service for hardware without an accelerometer.
///
/// Never delivers a sample, so the derived orientation stays at its initial
/// portrait value — the right answer for a stationary desktop machine.
pub struct StationaryMotion;

impl StationaryMotion {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StationaryMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionService for StationaryMotion {
    fn start_updates(&self, _interval: Duration, _callback: MotionCallback) {
        log::debug!("no accelerometer on this platform, orientation stays portrait");
    }

    fn stop_updates(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn clock_ticks_and_resets() {
        let clock = IntervalClock::new();
        let ticks = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&ticks);

        clock.start(Arc::new(move |seconds| {
            seen.store(seconds, Ordering::SeqCst);
        }));
        thread::sleep(Duration::from_millis(1200));
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        clock.reset();
        thread::sleep(Duration::from_millis(1200));
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}
