use crate::models::error::CaptureError;
use crate::models::media::CapturedMedia;
use crate::models::state::CaptureState;

/// Event delegate for capture controller notifications.
///
/// Registered once. All methods are invoked from the controller's `pump`,
/// i.e. on whatever context the hosting UI drains the event channel from —
/// never directly from platform callback threads.
pub trait CaptureDelegate: Send + Sync {
    /// Called after every published-state mutation.
    fn on_state_changed(&self, state: &CaptureState);

    /// Called exactly once per photo capture and once per recording
    /// stop-cycle, with the finished media or a typed failure.
    fn on_media_captured(&self, result: Result<CapturedMedia, CaptureError>);

    /// Called once the session has started on its background context.
    fn on_setup_complete(&self) {}

    /// Called when the platform interrupts the session (e.g. another app
    /// takes the camera).
    fn on_interruption(&self) {}
}
