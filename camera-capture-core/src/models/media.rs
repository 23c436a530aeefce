use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::CaptureError;
use super::state::CameraPosition;
use crate::motion::orientation::DeviceOrientation;

/// Metadata attached to every captured media value.
///
/// Serializable for JSON export to UI/IPC layers and for the recording
/// sidecar file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    pub id: String,
    pub created_at: String,
    pub camera_position: CameraPosition,
    pub orientation: DeviceOrientation,
    /// Recording length in seconds; absent for photos.
    pub duration_secs: Option<u64>,
}

impl MediaMetadata {
    pub fn for_photo(camera_position: CameraPosition, orientation: DeviceOrientation) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            camera_position,
            orientation,
            duration_secs: None,
        }
    }

    pub fn for_video(
        camera_position: CameraPosition,
        orientation: DeviceOrientation,
        duration_secs: u64,
    ) -> Self {
        Self {
            duration_secs: Some(duration_secs),
            ..Self::for_photo(camera_position, orientation)
        }
    }
}

/// Finished media produced by a capture or record cycle.
///
/// Produced exactly once per cycle and delivered through the completion
/// channel; ownership transfers to the caller on delivery.
#[derive(Debug, Clone, PartialEq)]
pub enum CapturedMedia {
    /// Encoded photo bytes.
    Photo {
        data: Vec<u8>,
        metadata: MediaMetadata,
    },
    /// Location of the finished recording file.
    Video {
        path: PathBuf,
        metadata: MediaMetadata,
    },
}

impl CapturedMedia {
    pub fn metadata(&self) -> &MediaMetadata {
        match self {
            Self::Photo { metadata, .. } | Self::Video { metadata, .. } => metadata,
        }
    }
}

/// Write media metadata as a JSON sidecar file.
///
/// Creates `{media_path}.metadata.json` alongside the media file.
pub fn write_metadata(metadata: &MediaMetadata, media_path: &Path) -> Result<(), CaptureError> {
    let sidecar_path = media_path.with_extension("metadata.json");
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&sidecar_path, json)
        .map_err(|e| CaptureError::StorageError(format!("failed to write metadata: {}", e)))?;
    Ok(())
}

/// Read media metadata from a JSON sidecar file.
pub fn read_metadata(media_path: &Path) -> Result<MediaMetadata, CaptureError> {
    let sidecar_path = media_path.with_extension("metadata.json");
    let json = fs::read_to_string(&sidecar_path)
        .map_err(|e| CaptureError::StorageError(format!("failed to read metadata: {}", e)))?;
    let metadata: MediaMetadata = serde_json::from_str(&json)
        .map_err(|e| CaptureError::StorageError(format!("failed to parse metadata: {}", e)))?;
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_metadata_has_no_duration() {
        let meta = MediaMetadata::for_photo(CameraPosition::Back, DeviceOrientation::Portrait);
        assert!(meta.duration_secs.is_none());
        assert!(!meta.id.is_empty());
    }

    #[test]
    fn sidecar_round_trip() {
        let dir = std::env::temp_dir().join(format!("ccm-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let media_path = dir.join("capture_video.mp4");

        let meta = MediaMetadata::for_video(
            CameraPosition::Front,
            DeviceOrientation::LandscapeLeft,
            12,
        );
        write_metadata(&meta, &media_path).unwrap();

        let read = read_metadata(&media_path).unwrap();
        assert_eq!(read, meta);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn read_missing_sidecar_is_storage_error() {
        let missing = Path::new("/nonexistent/capture_video.mp4");
        assert!(matches!(
            read_metadata(missing),
            Err(CaptureError::StorageError(_))
        ));
    }
}
