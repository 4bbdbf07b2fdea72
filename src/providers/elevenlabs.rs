//! ElevenLabs voice synthesis client
//! Posts unit text to the text-to-speech endpoint and saves the mp3 narration

use anyhow::{anyhow, Context};
use log::debug;
use reqwest::Client;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::ElevenLabsConfig;
use crate::error::ProviderError;

pub struct ElevenLabsClient {
    client: Client,
    api_key: Option<String>,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(api_key: Option<String>, config: ElevenLabsConfig) -> Self {
        Self {
            client: Client::new(),
            api_key,
            config,
        }
    }

    /// Synthesize narration for the text and save it under `out_dir`
    pub async fn synthesize(&self, text: &str, out_dir: &Path) -> Result<PathBuf, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("ELEVENLABS_KEY"))?;

        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}",
            self.config.voice_id
        );

        let body = serde_json::json!({
            "text": text,
            "model_id": "eleven_monolingual_v1",
            "voice_settings": {
                "stability": self.config.stability,
                "similarity_boost": self.config.similarity_boost,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .header("Accept", "audio/mpeg")
            .json(&body)
            .send()
            .await
            .context("ElevenLabs API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("ElevenLabs API returned {}: {}", status, detail.trim()).into());
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read ElevenLabs response body")?;

        let path = out_dir.join(format!("audio_{}.mp3", Uuid::new_v4()));
        std::fs::write(&path, &bytes)
            .with_context(|| format!("Failed to save narration to {}", path.display()))?;

        debug!("ElevenLabs narration saved to {}", path.display());
        Ok(path)
    }
}
