//! Final render for Reelsmith
//! Concatenates composed clips into one encoded video via ffmpeg

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::types::Clip;

/// Check that the ffmpeg toolchain is available
pub fn check_dependencies() -> Result<()> {
    let ffmpeg = Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output();
    let ffprobe = Command::new("ffprobe")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .output();

    let mut missing = Vec::new();

    if ffmpeg.is_err() {
        missing.push("ffmpeg");
    }

    if ffprobe.is_err() {
        missing.push("ffprobe");
    }

    if !missing.is_empty() {
        let os = std::env::consts::OS;
        let mut msg = format!(
            "Missing required dependencies: {}.\nPlease install them first.",
            missing.join(", ")
        );

        if os == "linux" {
            msg.push_str("\n\nOn Linux (Ubuntu/Debian), try:\n  sudo apt update && sudo apt install ffmpeg");
        } else if os == "macos" {
            msg.push_str("\n\nOn macOS, try:\n  brew install ffmpeg");
        } else if os == "windows" {
            msg.push_str("\n\nOn Windows, ensure ffmpeg is in your PATH.");
        }

        return Err(anyhow!(msg));
    }

    Ok(())
}

/// Concat demuxer list: one `file '...'` line per clip, in sequence order
fn concat_list(clips: &[Clip]) -> String {
    let mut list = String::new();
    for clip in clips {
        let escaped = clip.path.display().to_string().replace('\'', "'\\''");
        list.push_str(&format!("file '{}'\n", escaped));
    }
    list
}

/// Encode the clip sequence into one video file.
///
/// Clip order in the output matches the slice order exactly. Any ffmpeg
/// failure is fatal to the run; no partial output is kept.
pub async fn render(clips: &[Clip], config: &AppConfig, out_dir: &Path) -> Result<PathBuf> {
    if clips.is_empty() {
        return Err(anyhow!("No clips to render"));
    }

    let list_path = out_dir.join(format!("concat_{}.txt", Uuid::new_v4()));
    std::fs::write(&list_path, concat_list(clips)).context("Failed to write concat list")?;

    let output_path = out_dir.join(format!("reel_{}.mp4", Uuid::new_v4()));
    let frame_rate = config.encoding.frame_rate.to_string();
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .to_string();

    debug!("Rendering {} clips to {}", clips.len(), output_path.display());

    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
        .arg(&list_path)
        .args(["-r", frame_rate.as_str()])
        .args([
            "-c:v",
            config.encoding.video_codec.as_str(),
            "-preset",
            config.encoding.preset.as_str(),
            "-c:a",
            config.encoding.audio_codec.as_str(),
        ])
        .args(["-pix_fmt", "yuv420p", "-threads", threads.as_str()])
        .arg("-y")
        .arg(&output_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .context("Failed to execute ffmpeg for final render")?;

    let _ = std::fs::remove_file(&list_path);

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let _ = std::fs::remove_file(&output_path);
        return Err(anyhow!("ffmpeg concat failed: {}", stderr.trim()));
    }

    info!("Rendered video at {}", output_path.display());
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(index: usize, path: &str) -> Clip {
        Clip {
            index,
            path: PathBuf::from(path),
            duration_secs: 1.0,
        }
    }

    #[test]
    fn test_concat_list_preserves_order() {
        let clips = vec![clip(0, "a.mp4"), clip(2, "c.mp4")];
        let list = concat_list(&clips);
        assert_eq!(list, "file 'a.mp4'\nfile 'c.mp4'\n");
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let clips = vec![clip(0, "it's.mp4")];
        let list = concat_list(&clips);
        assert_eq!(list, "file 'it'\\''s.mp4'\n");
    }
}
