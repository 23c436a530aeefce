//! PNG photo sink.
//!
//! Desktop webcams have no hardware photo pipeline; the sink encodes the
//! routed tap frame to PNG on a worker thread and completes with the bytes.
//! A capture with no routed frame completes with `None`, which the
//! controller surfaces as `CapturedPhotoCannotBeFetched`.

use std::thread;

use camera_capture_core::models::frame::{PixelFormat, VideoFrame};
use camera_capture_core::traits::sinks::{PhotoCallback, PhotoCaptureSettings, PhotoSink};

pub struct PngPhotoSink;

impl PngPhotoSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PngPhotoSink {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoSink for PngPhotoSink {
    fn capture_photo(
        &self,
        settings: PhotoCaptureSettings,
        frame: Option<VideoFrame>,
        completion: PhotoCallback,
    ) {
        // No hardware flash on desktop; the requested mode is informational.
        log::debug!("capturing photo with flash mode {:?}", settings.flash_mode);

        thread::Builder::new()
            .name("photo-encode".into())
            .spawn(move || {
                let data = frame.and_then(|frame| match encode_png(&frame) {
                    Ok(data) => Some(data),
                    Err(e) => {
                        log::error!("photo encode failed: {}", e);
                        None
                    }
                });
                completion(data);
            })
            .expect("failed to spawn photo encode thread");
    }
}

/// Encode a raw frame as an 8-bit PNG.
fn encode_png(frame: &VideoFrame) -> Result<Vec<u8>, String> {
    if frame.data.len() != frame.expected_len() {
        return Err(format!(
            "frame data length {} does not match {}x{} {:?}",
            frame.data.len(),
            frame.width,
            frame.height,
            frame.format
        ));
    }

    let color = match frame.format {
        PixelFormat::Rgb8 => png::ColorType::Rgb,
        PixelFormat::Rgba8 => png::ColorType::Rgba,
    };

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, frame.width, frame.height);
        encoder.set_color(color);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder
            .write_header()
            .map_err(|e| format!("png header: {}", e))?;
        writer
            .write_image_data(&frame.data)
            .map_err(|e| format!("png data: {}", e))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_capture_core::testing::test_frame;

    #[test]
    fn encodes_valid_png() {
        let data = encode_png(&test_frame(4, 4)).unwrap();
        assert_eq!(&data[..4], b"\x89PNG");
    }

    #[test]
    fn rejects_mismatched_frame_length() {
        let mut frame = test_frame(4, 4);
        frame.data.pop();
        assert!(encode_png(&frame).is_err());
    }
}
