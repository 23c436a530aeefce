use std::time::Duration;

use crate::models::frame::{FlipDirection, SnapshotFraming};
use crate::models::state::{CameraPosition, OutputType, TransitionToken};

/// Delay between showing the freeze frame and performing the device/sink
/// swap, giving the overlay time to render before the glitch frame.
pub const FREEZE_SWAP_DELAY: Duration = Duration::from_millis(150);

/// Post-swap settle delay before the freeze overlay begins fading.
pub const FREEZE_FADE_DELAY: Duration = Duration::from_millis(100);

/// Freeze overlay fade-out length.
pub const FREEZE_FADE: Duration = Duration::from_millis(250);

/// Full-view shutter flash on photo capture.
pub const SHUTTER_FLASH: Duration = Duration::from_millis(100);

/// Grid overlay opacity fade.
pub const GRID_FADE: Duration = Duration::from_millis(320);

/// Focus ring timeline: scale-in spring length, then opacity 1 → 0.2 at
/// `FOCUS_RING_DIM_AT`, then 0.2 → 0 at `FOCUS_RING_CLEAR_AT`.
pub const FOCUS_RING_SCALE_IN: Duration = Duration::from_millis(500);
pub const FOCUS_RING_DIM_AT: Duration = Duration::from_millis(1500);
pub const FOCUS_RING_CLEAR_AT: Duration = Duration::from_millis(3500);

/// The reconfiguration a held token is waiting to apply at swap time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PendingTransition {
    Camera {
        target: CameraPosition,
        flip: Option<FlipDirection>,
    },
    Output {
        target: OutputType,
    },
}

/// Serializes mutually exclusive reconfigurations behind an owned token.
///
/// Busy detection is this token, never the freeze overlay's animation
/// progress: the token is taken when the freeze is shown and released only
/// when the fade completes, so the whole freeze window rejects new intents.
#[derive(Debug, Default)]
pub(crate) struct TransitionGuard {
    token: TransitionToken,
    pending: Option<PendingTransition>,
}

impl TransitionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> TransitionToken {
        self.token
    }

    /// Whether reconfiguration intents are currently rejected.
    pub fn blocks(&self) -> bool {
        self.token.blocks_reconfiguration()
    }

    /// Take the token for a camera-position change. Returns false (and
    /// changes nothing) when a blocking transition is already in flight.
    pub fn begin_camera_change(
        &mut self,
        target: CameraPosition,
        flip: Option<FlipDirection>,
    ) -> bool {
        if self.blocks() {
            return false;
        }
        self.token = TransitionToken::CameraPositionChange;
        self.pending = Some(PendingTransition::Camera { target, flip });
        true
    }

    /// Take the token for an output-type change.
    pub fn begin_output_change(&mut self, target: OutputType) -> bool {
        if self.blocks() {
            return false;
        }
        self.token = TransitionToken::OutputTypeChange;
        self.pending = Some(PendingTransition::Output { target });
        true
    }

    /// Tag an in-flight photo capture. Cosmetic only: never blocks, and a
    /// change token takes precedence over it.
    pub fn begin_media_capture(&mut self) {
        if self.token.is_none() {
            self.token = TransitionToken::MediaCapture;
        }
    }

    pub fn end_media_capture(&mut self) {
        if self.token == TransitionToken::MediaCapture {
            self.token = TransitionToken::None;
        }
    }

    /// The swap timer fired: hand the pending reconfiguration to the caller.
    pub fn take_pending(&mut self) -> Option<PendingTransition> {
        self.pending.take()
    }

    /// The freeze fade completed: release a change token.
    pub fn finish(&mut self) {
        if self.token.blocks_reconfiguration() {
            self.token = TransitionToken::None;
        }
    }

    /// Interruption recovery: drop the token and any pending swap.
    pub fn clear(&mut self) {
        self.token = TransitionToken::None;
        self.pending = None;
    }
}

/// Freeze snapshots are framed to match the preview transform of the camera
/// they were taken from.
pub(crate) fn snapshot_framing(position: CameraPosition) -> SnapshotFraming {
    match position {
        CameraPosition::Back => SnapshotFraming::RotatedRight,
        CameraPosition::Front => SnapshotFraming::MirroredLeft,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_change_is_rejected_until_finished() {
        let mut guard = TransitionGuard::new();
        assert!(guard.begin_camera_change(CameraPosition::Front, None));
        assert!(!guard.begin_camera_change(CameraPosition::Back, None));
        assert!(!guard.begin_output_change(OutputType::Video));

        guard.take_pending();
        guard.finish();
        assert!(guard.begin_output_change(OutputType::Video));
    }

    #[test]
    fn media_capture_does_not_block() {
        let mut guard = TransitionGuard::new();
        guard.begin_media_capture();
        assert_eq!(guard.token(), TransitionToken::MediaCapture);
        assert!(!guard.blocks());

        // A change takes the token over; photo completion must not stomp it.
        assert!(guard.begin_camera_change(CameraPosition::Front, None));
        guard.end_media_capture();
        assert_eq!(guard.token(), TransitionToken::CameraPositionChange);
    }

    #[test]
    fn clear_drops_pending_swap() {
        let mut guard = TransitionGuard::new();
        guard.begin_output_change(OutputType::Video);
        guard.clear();
        assert!(guard.take_pending().is_none());
        assert_eq!(guard.token(), TransitionToken::None);
    }

    #[test]
    fn framing_follows_camera_position() {
        assert_eq!(
            snapshot_framing(CameraPosition::Back),
            SnapshotFraming::RotatedRight
        );
        assert_eq!(
            snapshot_framing(CameraPosition::Front),
            SnapshotFraming::MirroredLeft
        );
    }
}
