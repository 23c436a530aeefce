use std::sync::Arc;

/// Callback fired once per second with the elapsed whole seconds since
/// `start`.
pub type TickCallback = Arc<dyn Fn(u64) + Send + Sync + 'static>;

/// Capability to receive a 1-tick-per-second elapsed-time callback for the
/// recording clock. A zero value represents "not running".
pub trait RecordingClock: Send + Sync {
    /// Start ticking from zero.
    fn start(&self, on_tick: TickCallback);

    /// Stop ticking and reset the elapsed count to zero.
    fn reset(&self);
}
