/// Media kinds a capture session needs authorization for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Platform authorization state for a media kind.
///
/// Only an explicit `Denied` is surfaced as a failure; `Undetermined` means
/// the platform has not asked the user yet and passes the preflight (the
/// prompt itself is the hosting app's concern, not this layer's).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationStatus {
    Granted,
    Denied,
    Undetermined,
}

/// Capability to query current audio/video authorization state.
pub trait PermissionService: Send + Sync {
    fn authorization_status(&self, kind: MediaKind) -> AuthorizationStatus;
}
