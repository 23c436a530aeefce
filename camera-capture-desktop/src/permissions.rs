//! Desktop capture permission probe.
//!
//! Desktop platforms gate camera and microphone access at the OS privacy
//! layer (macOS TCC, Windows privacy settings); unpackaged desktop apps get
//! no queryable per-app consent state. The probe therefore reports
//! `Granted` when a device is enumerable and `Undetermined` when none is —
//! an explicit `Denied` is never synthesized, and real access failures
//! surface later through device attachment.

use nokhwa::utils::ApiBackend;

use camera_capture_core::traits::permissions::{
    AuthorizationStatus, MediaKind, PermissionService,
};

use crate::device_enumerator;

pub struct DesktopPermissions;

impl DesktopPermissions {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DesktopPermissions {
    fn default() -> Self {
        Self::new()
    }
}

impl PermissionService for DesktopPermissions {
    fn authorization_status(&self, kind: MediaKind) -> AuthorizationStatus {
        match kind {
            MediaKind::Video => match nokhwa::query(ApiBackend::Auto) {
                Ok(cameras) if !cameras.is_empty() => AuthorizationStatus::Granted,
                Ok(_) => AuthorizationStatus::Undetermined,
                Err(e) => {
                    log::warn!("camera permission probe failed: {}", e);
                    AuthorizationStatus::Undetermined
                }
            },
            MediaKind::Audio => match device_enumerator::default_microphone() {
                Some(_) => AuthorizationStatus::Granted,
                None => AuthorizationStatus::Undetermined,
            },
        }
    }
}
