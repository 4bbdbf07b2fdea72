//! Asset provider strategies for Reelsmith
//! One image backend and one speech backend are selected by configuration

pub mod diffusion;
pub mod elevenlabs;
pub mod gtts;
pub mod stability;

use std::path::{Path, PathBuf};

use crate::config::{AppConfig, ImageBackend, SpeechBackend};
use crate::error::ProviderError;

pub use diffusion::DiffusionClient;
pub use elevenlabs::ElevenLabsClient;
pub use gtts::GttsClient;
pub use stability::StabilityClient;

/// Longest prompt fragment sent to an image backend
const MAX_PROMPT_CHARS: usize = 200;

/// Derive the image prompt for a text unit, bounded so remote APIs accept it
pub fn image_prompt(text: &str) -> String {
    let truncated: String = text.chars().take(MAX_PROMPT_CHARS).collect();
    format!("Create a vertical format illustration of: {}...", truncated)
}

/// Wrapper enum for image generation backends
pub enum ImageProvider {
    Stability(StabilityClient),
    Diffusion(DiffusionClient),
}

impl ImageProvider {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.image_backend {
            ImageBackend::Stability => {
                ImageProvider::Stability(StabilityClient::new(config.stability_key.clone()))
            }
            ImageBackend::Diffusion => ImageProvider::Diffusion(DiffusionClient::new(
                config.diffusion.clone(),
                config.canvas.width,
                config.canvas.height,
            )),
        }
    }

    /// Generate one image for the prompt and save it under `out_dir`
    pub async fn generate(&self, prompt: &str, out_dir: &Path) -> Result<PathBuf, ProviderError> {
        match self {
            ImageProvider::Stability(client) => client.generate(prompt, out_dir).await,
            ImageProvider::Diffusion(client) => client.generate(prompt, out_dir).await,
        }
    }
}

/// Wrapper enum for speech synthesis backends
pub enum SpeechProvider {
    Gtts(GttsClient),
    ElevenLabs(ElevenLabsClient),
}

impl SpeechProvider {
    pub fn from_config(config: &AppConfig) -> Self {
        match config.speech_backend {
            SpeechBackend::Gtts => SpeechProvider::Gtts(GttsClient::new(config.gtts.clone())),
            SpeechBackend::Elevenlabs => SpeechProvider::ElevenLabs(ElevenLabsClient::new(
                config.elevenlabs_key.clone(),
                config.elevenlabs.clone(),
            )),
        }
    }

    /// Synthesize narration for the text and save it under `out_dir`
    pub async fn synthesize(&self, text: &str, out_dir: &Path) -> Result<PathBuf, ProviderError> {
        match self {
            SpeechProvider::Gtts(client) => client.synthesize(text, out_dir).await,
            SpeechProvider::ElevenLabs(client) => client.synthesize(text, out_dir).await,
        }
    }
}
