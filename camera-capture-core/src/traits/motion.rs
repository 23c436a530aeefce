use std::sync::Arc;
use std::time::Duration;

use crate::motion::orientation::MotionSample;

/// Callback for periodic accelerometer samples. `None` marks an errored
/// sample, which the orientation tracker ignores.
///
/// Fires on the motion service's own thread; implementations forward into
/// the controller's event channel.
pub type MotionCallback = Arc<dyn Fn(Option<MotionSample>) + Send + Sync + 'static>;

/// Capability to subscribe to periodic accelerometer samples.
pub trait MotionService: Send + Sync {
    /// Begin delivering samples every `interval` until `stop_updates`.
    fn start_updates(&self, interval: Duration, callback: MotionCallback);

    fn stop_updates(&self);
}
