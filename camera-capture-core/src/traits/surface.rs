use std::time::Duration;

use crate::models::config::FocusRingStyle;
use crate::models::frame::{FlipDirection, FreezeFrame, Point, Rect};

/// Host-view seam: the mounting surface the preview layer, grid overlay,
/// focus ring, shutter flash, and freeze overlay attach to.
///
/// The controller drives *what* happens and *when*; how each effect is
/// rendered (and on which UI thread) is the surface implementation's
/// concern. Methods may be called from the controller's owning context only.
pub trait PreviewSurface: Send + Sync {
    /// Current bounds of the mounting surface.
    fn frame(&self) -> Rect;

    /// Attach the live preview layer. First step of setup.
    fn attach_preview_layer(&self);

    /// Create the grid overlay, hidden or shown per configuration.
    fn install_grid_overlay(&self, visible: bool);

    /// Animate the grid overlay opacity toward `opacity` over `fade`.
    fn set_grid_opacity(&self, opacity: f32, fade: Duration);

    /// Overlay a freeze-frame snapshot at full opacity.
    fn show_freeze_frame(&self, freeze: FreezeFrame);

    /// Fade the freeze overlay back out over `fade`.
    fn fade_out_freeze_frame(&self, fade: Duration);

    /// Drop the freeze overlay immediately (interruption recovery).
    fn remove_freeze_frame(&self);

    /// Play the cosmetic left/right flip synchronized with freeze removal.
    fn play_flip_transition(&self, direction: FlipDirection);

    /// Brief full-view shutter flash on photo capture.
    fn flash_screen(&self, duration: Duration);

    /// Present the focus ring at `at` (surface coordinates) and run its
    /// staged scale-in / dim / clear timeline (see the `FOCUS_RING_*`
    /// constants in [`crate::session::transition`]).
    fn show_focus_ring(&self, at: Point, style: &FocusRingStyle);

    /// Map a surface touch point to a normalized device point of interest
    /// via the preview layer's mapping.
    fn layer_point_to_device_point(&self, point: Point) -> Point;
}
