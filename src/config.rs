//! Configuration management for Reelsmith
//! Settings live in settings.json; API credentials come from the environment

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::segmenter::SegmentStrategy;

/// Image generation backend selection
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackend {
    /// Stability AI remote API
    #[default]
    Stability,
    /// Local diffusion model invoked as a subprocess
    Diffusion,
}

/// Speech synthesis backend selection
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// Google Translate TTS (no credential required)
    #[default]
    Gtts,
    /// ElevenLabs remote API
    Elevenlabs,
}

/// Canvas geometry and caption styling for the output video
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CanvasConfig {
    /// Output width in pixels (default 1080)
    #[serde(default = "default_canvas_width")]
    pub width: u32,
    /// Output height in pixels (default 1920)
    #[serde(default = "default_canvas_height")]
    pub height: u32,
    /// Height of the caption band anchored to the bottom (default 300)
    #[serde(default = "default_caption_height")]
    pub caption_height: u32,
    /// Opacity of the caption band (0.0 - 1.0, default 0.7)
    #[serde(default = "default_caption_opacity")]
    pub caption_opacity: f32,
    /// Caption font size (default 40)
    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

fn default_canvas_width() -> u32 {
    1080
}

fn default_canvas_height() -> u32 {
    1920
}

fn default_caption_height() -> u32 {
    300
}

fn default_caption_opacity() -> f32 {
    0.7
}

fn default_font_size() -> u32 {
    40
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
            caption_height: 300,
            caption_opacity: 0.7,
            font_size: 40,
        }
    }
}

/// Encoding parameters handed to the final render
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EncodingConfig {
    /// Frames per second (default 30)
    #[serde(default = "default_frame_rate")]
    pub frame_rate: u32,
    /// Video codec (default "libx264")
    #[serde(default = "default_video_codec")]
    pub video_codec: String,
    /// Audio codec (default "aac")
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    /// Encoder preset (default "ultrafast")
    #[serde(default = "default_preset")]
    pub preset: String,
}

fn default_frame_rate() -> u32 {
    30
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_preset() -> String {
    "ultrafast".to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "ultrafast".to_string(),
        }
    }
}

/// Google Translate TTS accent parameters
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GttsConfig {
    /// Language code (default "en")
    #[serde(default = "default_gtts_lang")]
    pub lang: String,
    /// Top-level domain steering the accent (default "co.in")
    #[serde(default = "default_gtts_tld")]
    pub tld: String,
}

fn default_gtts_lang() -> String {
    "en".to_string()
}

fn default_gtts_tld() -> String {
    "co.in".to_string()
}

impl Default for GttsConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            tld: "co.in".to_string(),
        }
    }
}

/// ElevenLabs voice parameters
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ElevenLabsConfig {
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_voice_stability")]
    pub stability: f32,
    #[serde(default = "default_voice_similarity")]
    pub similarity_boost: f32,
}

fn default_voice_id() -> String {
    "Zlb1dXrM653N07WRdFW3".to_string()
}

fn default_voice_stability() -> f32 {
    0.5
}

fn default_voice_similarity() -> f32 {
    0.5
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            voice_id: default_voice_id(),
            stability: 0.5,
            similarity_boost: 0.5,
        }
    }
}

/// Local diffusion model invocation parameters
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DiffusionConfig {
    /// Command to run (must accept --prompt/--width/--height/--steps/--output)
    #[serde(default = "default_diffusion_command")]
    pub command: String,
    /// Inference step count (default 30)
    #[serde(default = "default_diffusion_steps")]
    pub steps: u32,
}

fn default_diffusion_command() -> String {
    "sdcli".to_string()
}

fn default_diffusion_steps() -> u32 {
    30
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            command: "sdcli".to_string(),
            steps: 30,
        }
    }
}

/// Application configuration stored in settings.json.
///
/// The two API credentials are never stored in the file; they are read from
/// `STABILITY_KEY` and `ELEVENLABS_KEY` at load time. A missing credential is
/// reported per provider call, not at startup.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AppConfig {
    /// Output directory for generated files (`~` is expanded)
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub segmentation: SegmentStrategy,
    #[serde(default)]
    pub image_backend: ImageBackend,
    #[serde(default)]
    pub speech_backend: SpeechBackend,
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
    #[serde(default)]
    pub gtts: GttsConfig,
    #[serde(default)]
    pub elevenlabs: ElevenLabsConfig,
    #[serde(default)]
    pub diffusion: DiffusionConfig,
    /// Per-unit budget for each asset generation call, in seconds
    #[serde(default = "default_asset_timeout")]
    pub asset_timeout_secs: u64,
    /// How many units are processed at once (1 = sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(skip)]
    pub stability_key: Option<String>,
    #[serde(skip)]
    pub elevenlabs_key: Option<String>,
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_asset_timeout() -> u64 {
    120
}

fn default_concurrency() -> usize {
    1
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            segmentation: SegmentStrategy::default(),
            image_backend: ImageBackend::default(),
            speech_backend: SpeechBackend::default(),
            canvas: CanvasConfig::default(),
            encoding: EncodingConfig::default(),
            gtts: GttsConfig::default(),
            elevenlabs: ElevenLabsConfig::default(),
            diffusion: DiffusionConfig::default(),
            asset_timeout_secs: default_asset_timeout(),
            concurrency: default_concurrency(),
            stability_key: None,
            elevenlabs_key: None,
        }
    }
}

impl AppConfig {
    /// Configuration file name
    const CONFIG_PATH: &'static str = "settings.json";

    /// Load configuration, creating a default settings.json on first run.
    /// Credentials are pulled from the environment and the whole structure is
    /// validated once here.
    pub fn load() -> Result<Self> {
        let mut config: AppConfig = if Path::new(Self::CONFIG_PATH).exists() {
            let content = fs::read_to_string(Self::CONFIG_PATH)?;
            serde_json::from_str(&content)
                .map_err(|e| anyhow!("Failed to parse settings.json: {}", e))?
        } else {
            let default = AppConfig::default();
            default.save()?;
            log::info!("Created default {}", Self::CONFIG_PATH);
            default
        };

        config.stability_key = env_credential("STABILITY_KEY");
        config.elevenlabs_key = env_credential("ELEVENLABS_KEY");

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file (credentials are skipped)
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(Self::CONFIG_PATH, json)?;
        Ok(())
    }

    /// Output directory with `~` expanded
    pub fn output_path(&self) -> PathBuf {
        if self.output_dir == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
        if let Some(rest) = self.output_dir.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(&self.output_dir)
    }

    /// Ensure the output directory exists
    pub fn ensure_output_dir(&self) -> Result<()> {
        let path = self.output_path();
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            bail!("Canvas dimensions must be non-zero");
        }
        if self.canvas.caption_height >= self.canvas.height {
            bail!("Caption band must be shorter than the canvas");
        }
        if !(0.0..=1.0).contains(&self.canvas.caption_opacity) {
            bail!("Caption opacity must be between 0.0 and 1.0");
        }
        if self.encoding.frame_rate == 0 {
            bail!("Frame rate must be non-zero");
        }
        if self.asset_timeout_secs == 0 {
            bail!("Asset timeout must be non-zero");
        }
        if self.concurrency == 0 {
            bail!("Concurrency must be at least 1");
        }
        Ok(())
    }
}

fn env_credential(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
