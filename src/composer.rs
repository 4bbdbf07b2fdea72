//! Clip composition for Reelsmith
//! Builds one timed image+caption+narration clip with a single ffmpeg pass

use anyhow::{anyhow, Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::types::{Clip, GeneratedAsset, TextUnit};

/// Candidate caption fonts, checked in order. If none exists, ffmpeg's
/// default font is used.
const FONT_CANDIDATES: &[&str] = &[
    "/System/Library/Fonts/SFNS.ttf",
    "/System/Library/Fonts/SFNSDisplay.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
    "/Library/Fonts/Arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
];

/// Find a usable caption font on this system
fn find_font() -> Option<&'static str> {
    FONT_CANDIDATES
        .iter()
        .copied()
        .find(|p| Path::new(p).exists())
}

/// Get audio duration in seconds using ffprobe
pub fn audio_duration(path: &Path) -> Result<f64> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .context("Failed to run ffprobe")?;

    if !output.status.success() {
        return Err(anyhow!("ffprobe failed for {}", path.display()));
    }

    let duration_str = String::from_utf8_lossy(&output.stdout);
    let duration: f64 = duration_str
        .trim()
        .parse()
        .context("Failed to parse audio duration")?;

    if duration <= 0.0 {
        return Err(anyhow!(
            "Audio file {} reports non-positive duration",
            path.display()
        ));
    }

    Ok(duration)
}

/// Wrap caption text into lines of at most `max_chars` characters, breaking
/// on whitespace. A single word longer than the budget stays on its own line.
fn wrap_caption(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if line_len > 0 && line_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut line));
            line_len = 0;
        }
        if line_len > 0 {
            line.push(' ');
            line_len += 1;
        }
        line.push_str(word);
        line_len += word_len;
    }

    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}

/// Characters per caption line that fit the canvas width at the configured
/// font size. 0.55em is a workable average glyph width for sans fonts.
fn caption_line_chars(config: &AppConfig) -> usize {
    let usable = config.canvas.width as f32 * 0.9;
    let glyph = config.canvas.font_size as f32 * 0.55;
    (usable / glyph).max(8.0) as usize
}

/// Build the filter graph: scale+pad the image to the canvas, draw the
/// semi-opaque caption band over the bottom, center the caption text in it.
fn build_filter(config: &AppConfig, font: Option<&str>, caption_file: &Path) -> String {
    let canvas = &config.canvas;
    let band_y = canvas.height - canvas.caption_height;
    let fontfile = font
        .map(|f| format!(":fontfile='{}'", f))
        .unwrap_or_default();

    format!(
        "[0:v]scale={w}:{h}:force_original_aspect_ratio=decrease,\
         pad={w}:{h}:(ow-iw)/2:(oh-ih)/2,setsar=1,format=yuv420p[img];\
         [img]drawbox=x=0:y={y}:w={w}:h={bh}:color=black@{alpha}:t=fill[band];\
         [band]drawtext=textfile='{file}'{fontfile}:fontsize={fs}:fontcolor=white:\
         x=(w-tw)/2:y={y}+({bh}-th)/2[out]",
        w = canvas.width,
        h = canvas.height,
        y = band_y,
        bh = canvas.caption_height,
        alpha = canvas.caption_opacity,
        fs = canvas.font_size,
        file = caption_file.display(),
        fontfile = fontfile,
    )
}

/// Compose exactly one clip from a text unit and its generated assets.
///
/// The visual duration is taken from the narration audio, never estimated
/// from the text. Any failure propagates; no partial clip is ever returned.
pub fn compose_clip(
    unit: &TextUnit,
    asset: &GeneratedAsset,
    config: &AppConfig,
    out_dir: &Path,
) -> Result<Clip> {
    // drawtext reads the caption from a file, which sidesteps filter-graph
    // escaping of quotes, colons and newlines in user text
    let caption_file = out_dir.join(format!("caption_{}.txt", Uuid::new_v4()));
    let wrapped = wrap_caption(&unit.text, caption_line_chars(config));
    std::fs::write(&caption_file, wrapped).context("Failed to write caption file")?;

    let result = encode_clip(unit, asset, config, out_dir, &caption_file);
    // The caption file is spent once ffmpeg has run (or failed to), so it is
    // removed on every path rather than waiting for housekeeping
    let _ = std::fs::remove_file(&caption_file);
    result
}

fn encode_clip(
    unit: &TextUnit,
    asset: &GeneratedAsset,
    config: &AppConfig,
    out_dir: &Path,
    caption_file: &Path,
) -> Result<Clip> {
    let duration = audio_duration(&asset.audio_path)?;

    let clip_path = out_dir.join(format!("clip_{}.mp4", Uuid::new_v4()));
    let filter = build_filter(config, find_font(), caption_file);
    let duration_arg = format!("{:.3}", duration);
    let frame_rate = config.encoding.frame_rate.to_string();

    debug!("Composing clip for unit {}: {}", unit.index, filter);

    let output = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-loop", "1", "-i"])
        .arg(&asset.image_path)
        .arg("-i")
        .arg(&asset.audio_path)
        .args(["-filter_complex", filter.as_str(), "-map", "[out]", "-map", "1:a"])
        .args(["-t", duration_arg.as_str(), "-r", frame_rate.as_str()])
        .args([
            "-c:v",
            config.encoding.video_codec.as_str(),
            "-preset",
            config.encoding.preset.as_str(),
            "-c:a",
            config.encoding.audio_codec.as_str(),
        ])
        .arg("-y")
        .arg(&clip_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .context("Failed to execute ffmpeg for clip composition")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let _ = std::fs::remove_file(&clip_path);
        return Err(anyhow!("ffmpeg clip composition failed: {}", stderr.trim()));
    }

    Ok(Clip {
        index: unit.index,
        path: clip_path,
        duration_secs: duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::types::{GeneratedAsset, TextUnit};

    #[test]
    fn test_wrap_caption_respects_line_budget() {
        let wrapped = wrap_caption("one two three four five six seven", 10);
        for line in wrapped.lines() {
            assert!(line.chars().count() <= 10);
        }
        assert_eq!(wrapped.replace('\n', " "), "one two three four five six seven");
    }

    #[test]
    fn test_wrap_caption_single_long_word() {
        let word = "w".repeat(40);
        assert_eq!(wrap_caption(&word, 10), word);
    }

    #[test]
    fn test_caption_line_chars_default_canvas() {
        let config = AppConfig::default();
        // 1080px canvas at 40pt should fit roughly 40-50 characters
        let chars = caption_line_chars(&config);
        assert!((30..=60).contains(&chars), "got {}", chars);
    }

    #[test]
    fn test_filter_places_band_at_bottom() {
        let config = AppConfig::default();
        let filter = build_filter(&config, None, Path::new("cap.txt"));
        // band starts at canvas height minus band height
        assert!(filter.contains("drawbox=x=0:y=1620:w=1080:h=300"));
        assert!(filter.contains("black@0.7"));
        assert!(filter.contains("scale=1080:1920"));
        assert!(filter.contains("textfile='cap.txt'"));
        // no font on disk in this test, so no fontfile clause
        assert!(!filter.contains("fontfile"));
    }

    #[test]
    fn test_filter_uses_discovered_font() {
        let config = AppConfig::default();
        let filter = build_filter(&config, Some("/tmp/font.ttf"), Path::new("cap.txt"));
        assert!(filter.contains("fontfile='/tmp/font.ttf'"));
    }

    #[test]
    fn test_caption_file_is_removed_when_composition_fails() {
        let dir = tempfile::tempdir().unwrap();
        let unit = TextUnit {
            index: 0,
            text: "hello world".to_string(),
        };
        let asset = GeneratedAsset {
            image_path: dir.path().join("img.png"),
            audio_path: dir.path().join("missing.mp3"),
        };
        let config = AppConfig::default();

        // the audio file does not exist, so composition fails before encoding
        assert!(compose_clip(&unit, &asset, &config, dir.path()).is_err());

        let stranded = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("caption_"));
        assert!(!stranded);
    }
}
