//! FFmpeg video sink.
//!
//! Records by piping raw RGB frames into an `ffmpeg` child process over
//! stdin; ffmpeg handles pixel conversion and H.264 encoding. The encoder is
//! spawned lazily on the first routed frame, once the real frame dimensions
//! are known. Mirroring and orientation from the connection settings become
//! `hflip`/`transpose` filters.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

use parking_lot::Mutex;

use camera_capture_core::models::error::CaptureError;
use camera_capture_core::models::frame::{PixelFormat, VideoFrame};
use camera_capture_core::motion::orientation::DeviceOrientation;
use camera_capture_core::traits::sinks::{ConnectionSettings, RecordingCallback, VideoSink};

const OUTPUT_FPS: u32 = 30;

enum RecorderState {
    Idle,
    /// Recording requested; encoder spawns on the first frame.
    Pending {
        path: PathBuf,
        connection: ConnectionSettings,
        completion: RecordingCallback,
    },
    Active {
        child: Child,
        path: PathBuf,
        completion: RecordingCallback,
    },
}

pub struct FfmpegVideoSink {
    state: Mutex<RecorderState>,
}

impl FfmpegVideoSink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RecorderState::Idle),
        }
    }
}

impl Default for FfmpegVideoSink {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoSink for FfmpegVideoSink {
    fn start_recording(
        &self,
        path: &Path,
        connection: ConnectionSettings,
        completion: RecordingCallback,
    ) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        if !matches!(*state, RecorderState::Idle) {
            return Err(CaptureError::RecordingFailed("already recording".into()));
        }

        if Command::new("ffmpeg").arg("-version").output().is_err() {
            return Err(CaptureError::RecordingFailed(
                "ffmpeg not found on PATH".into(),
            ));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CaptureError::RecordingFailed(format!("failed to create output directory: {}", e))
            })?;
        }

        *state = RecorderState::Pending {
            path: path.to_path_buf(),
            connection,
            completion,
        };
        Ok(())
    }

    fn append_frame(&self, frame: &VideoFrame) {
        let mut state = self.state.lock();

        if let RecorderState::Pending { .. } = *state {
            let RecorderState::Pending {
                path,
                connection,
                completion,
            } = std::mem::replace(&mut *state, RecorderState::Idle)
            else {
                return;
            };
            match spawn_encoder(&path, frame, connection) {
                Ok(child) => {
                    log::info!(
                        "recording {}x{} to {}",
                        frame.width,
                        frame.height,
                        path.display()
                    );
                    *state = RecorderState::Active {
                        child,
                        path,
                        completion,
                    };
                }
                Err(e) => {
                    log::error!("failed to start ffmpeg: {}", e);
                    completion(Err(CaptureError::RecordingFailed(e)));
                    return;
                }
            }
        }

        if let RecorderState::Active { child, .. } = &mut *state {
            if let Some(stdin) = child.stdin.as_mut() {
                if let Err(e) = stdin.write_all(&frame.data) {
                    log::warn!("frame write to ffmpeg failed: {}", e);
                }
            }
        }
    }

    fn stop_recording(&self) {
        let finished = std::mem::replace(&mut *self.state.lock(), RecorderState::Idle);
        match finished {
            RecorderState::Idle => {}
            RecorderState::Pending { completion, .. } => {
                completion(Err(CaptureError::RecordingFailed(
                    "no frames received".into(),
                )));
            }
            RecorderState::Active {
                mut child,
                path,
                completion,
            } => {
                // EOF on stdin tells ffmpeg to finalize the file; waiting
                // happens off the caller's context.
                drop(child.stdin.take());
                thread::Builder::new()
                    .name("ffmpeg-finish".into())
                    .spawn(move || match child.wait_with_output() {
                        Ok(output) if output.status.success() => completion(Ok(path)),
                        Ok(output) => {
                            let stderr = String::from_utf8_lossy(&output.stderr);
                            log::warn!("ffmpeg exited with {}: {}", output.status, stderr);
                            completion(Err(CaptureError::RecordingFailed(format!(
                                "ffmpeg exited with {}",
                                output.status
                            ))));
                        }
                        Err(e) => {
                            completion(Err(CaptureError::RecordingFailed(format!(
                                "failed to wait for ffmpeg: {}",
                                e
                            ))));
                        }
                    })
                    .expect("failed to spawn ffmpeg finish thread");
            }
        }
    }
}

fn pixel_format_arg(format: PixelFormat) -> &'static str {
    match format {
        PixelFormat::Rgb8 => "rgb24",
        PixelFormat::Rgba8 => "rgba",
    }
}

/// Filter chain for the connection settings, or `None` when the frames pass
/// through untouched.
fn video_filter(connection: ConnectionSettings) -> Option<String> {
    let mut filters = Vec::new();
    if connection.mirrored {
        filters.push("hflip".to_string());
    }
    match connection.orientation {
        DeviceOrientation::Portrait => {}
        DeviceOrientation::PortraitUpsideDown => {
            filters.push("transpose=1,transpose=1".to_string())
        }
        DeviceOrientation::LandscapeLeft => filters.push("transpose=2".to_string()),
        DeviceOrientation::LandscapeRight => filters.push("transpose=1".to_string()),
    }
    if filters.is_empty() {
        None
    } else {
        Some(filters.join(","))
    }
}

fn encoder_args(path: &Path, frame: &VideoFrame, connection: ConnectionSettings) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-pixel_format".to_string(),
        pixel_format_arg(frame.format).to_string(),
        "-video_size".to_string(),
        format!("{}x{}", frame.width, frame.height),
        "-framerate".to_string(),
        OUTPUT_FPS.to_string(),
        "-i".to_string(),
        "-".to_string(),
        "-an".to_string(),
    ];
    if let Some(filter) = video_filter(connection) {
        args.push("-vf".to_string());
        args.push(filter);
    }
    args.extend([
        "-c:v".to_string(),
        "libx264".to_string(),
        "-preset".to_string(),
        "veryfast".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
        path.to_string_lossy().to_string(),
    ]);
    args
}

fn spawn_encoder(
    path: &Path,
    frame: &VideoFrame,
    connection: ConnectionSettings,
) -> Result<Child, String> {
    Command::new("ffmpeg")
        .args(encoder_args(path, frame, connection))
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("spawn failed: {}", e))
}
