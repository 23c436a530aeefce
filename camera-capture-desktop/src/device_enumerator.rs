//! Desktop camera and microphone enumeration.
//!
//! Wraps nokhwa's backend-neutral query to list webcams with friendly
//! names, and cpal for the default input (microphone) device. Desktop
//! webcams carry no front/back position metadata, so positions are assigned
//! by enumeration order: the first camera is treated as front-facing (it
//! faces the user), the second as back. Single-webcam machines expose the
//! same device at both positions so camera flips stay functional.

use cpal::traits::{DeviceTrait, HostTrait};
use nokhwa::utils::{ApiBackend, CameraIndex};

use camera_capture_core::models::error::CaptureError;
use camera_capture_core::models::state::CameraPosition;

/// A discovered webcam, prior to opening it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDescriptor {
    pub index: u32,
    pub name: String,
    pub description: String,
}

/// A discovered microphone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MicrophoneDescriptor {
    pub id: String,
    pub name: String,
}

/// List available webcams in enumeration order.
pub fn list_cameras() -> Result<Vec<CameraDescriptor>, CaptureError> {
    let cameras = nokhwa::query(ApiBackend::Auto)
        .map_err(|e| CaptureError::DeviceNotAvailable(format!("camera query failed: {}", e)))?;

    Ok(cameras
        .into_iter()
        .filter_map(|info| {
            let index = match info.index() {
                CameraIndex::Index(i) => i.to_owned(),
                CameraIndex::String(s) => {
                    // String-indexed backends (IP cameras) are out of scope
                    // for position-based lookup.
                    log::debug!("skipping string-indexed camera {}", s);
                    return None;
                }
            };
            Some(CameraDescriptor {
                index,
                name: info.human_name().to_string(),
                description: info.description().to_string(),
            })
        })
        .collect())
}

/// Map a camera position onto an enumeration slot for `count` cameras.
pub(crate) fn position_slot(count: usize, position: CameraPosition) -> Option<usize> {
    match (position, count) {
        (_, 0) => None,
        (CameraPosition::Front, _) => Some(0),
        (CameraPosition::Back, 1) => Some(0),
        (CameraPosition::Back, _) => Some(1),
    }
}

/// The webcam standing in for `position`, if any camera is present.
pub fn camera_for_position(position: CameraPosition) -> Option<CameraDescriptor> {
    let cameras = match list_cameras() {
        Ok(cameras) => cameras,
        Err(e) => {
            log::warn!("camera enumeration failed: {}", e);
            return None;
        }
    };
    position_slot(cameras.len(), position).map(|slot| cameras[slot].clone())
}

/// The system default input device, if one exists.
pub fn default_microphone() -> Option<MicrophoneDescriptor> {
    let device = cpal::default_host().default_input_device()?;
    let name = device
        .name()
        .unwrap_or_else(|_| "Default Input".to_string());
    Some(MicrophoneDescriptor {
        id: "default-input".into(),
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_maps_to_first_camera() {
        assert_eq!(position_slot(1, CameraPosition::Front), Some(0));
        assert_eq!(position_slot(3, CameraPosition::Front), Some(0));
    }

    #[test]
    fn back_falls_back_to_single_camera() {
        assert_eq!(position_slot(1, CameraPosition::Back), Some(0));
        assert_eq!(position_slot(2, CameraPosition::Back), Some(1));
    }

    #[test]
    fn no_cameras_means_no_slot() {
        assert_eq!(position_slot(0, CameraPosition::Front), None);
        assert_eq!(position_slot(0, CameraPosition::Back), None);
    }
}
