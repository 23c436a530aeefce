use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Pixel layout of a raw video frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb8 => 3,
            Self::Rgba8 => 4,
        }
    }
}

/// A raw decoded video frame, the currency of the session's frame tap.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl VideoFrame {
    /// Expected byte length for the frame's dimensions and format.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// How a freeze-frame snapshot is framed to match the live preview.
///
/// Back-camera snapshots are rotated right, front-camera snapshots are
/// mirrored left, matching the preview layer's own transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFraming {
    RotatedRight,
    MirroredLeft,
}

/// Cosmetic flip direction for a camera-position change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipDirection {
    FromLeft,
    FromRight,
}

/// A still snapshot of the live preview, shown over it to mask the glitch
/// frame a hardware reconfiguration produces.
#[derive(Debug, Clone)]
pub struct FreezeFrame {
    pub frame: Arc<VideoFrame>,
    pub framing: SnapshotFraming,
}

/// A point in surface (layer) or device coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_len_accounts_for_format() {
        let frame = VideoFrame {
            width: 4,
            height: 2,
            format: PixelFormat::Rgb8,
            data: vec![0; 24],
        };
        assert_eq!(frame.expected_len(), 24);

        let rgba = VideoFrame {
            format: PixelFormat::Rgba8,
            ..frame
        };
        assert_eq!(rgba.expected_len(), 32);
    }
}
