//! Stability AI image generation client
//! Posts a prompt to the stable-image endpoint and saves the returned PNG

use anyhow::{anyhow, Context};
use log::debug;
use reqwest::Client;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::ProviderError;

const API_URL: &str = "https://api.stability.ai/v2beta/stable-image/generate/core";

pub struct StabilityClient {
    client: Client,
    api_key: Option<String>,
}

impl StabilityClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }

    /// Generate one PNG and save it under a unique name in `out_dir`
    pub async fn generate(&self, prompt: &str, out_dir: &Path) -> Result<PathBuf, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("STABILITY_KEY"))?;

        let form = reqwest::multipart::Form::new()
            .text("prompt", prompt.to_string())
            .text("output_format", "png");

        let response = self
            .client
            .post(API_URL)
            .bearer_auth(api_key)
            .header("accept", "image/*")
            .multipart(form)
            .send()
            .await
            .context("Stability API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Stability API returned {}: {}", status, body.trim()).into());
        }

        let bytes = response
            .bytes()
            .await
            .context("Failed to read Stability API response body")?;

        let path = out_dir.join(format!("{}.png", Uuid::new_v4()));
        std::fs::write(&path, &bytes)
            .with_context(|| format!("Failed to save generated image to {}", path.display()))?;

        debug!("Stability image saved to {}", path.display());
        Ok(path)
    }
}
