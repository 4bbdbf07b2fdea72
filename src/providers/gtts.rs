//! Google Translate text-to-speech client
//! The same endpoint the gTTS library wraps; no credential required

use anyhow::{anyhow, Context};
use log::debug;
use reqwest::Client;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::GttsConfig;
use crate::error::ProviderError;

/// The endpoint rejects queries longer than this
const MAX_CHUNK_CHARS: usize = 200;

pub struct GttsClient {
    client: Client,
    config: GttsConfig,
}

impl GttsClient {
    pub fn new(config: GttsConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Synthesize narration for the text and save it under `out_dir`.
    /// Long text is sent in chunks; MPEG frame streams concatenate cleanly.
    pub async fn synthesize(&self, text: &str, out_dir: &Path) -> Result<PathBuf, ProviderError> {
        let url = format!("https://translate.google.{}/translate_tts", self.config.tld);
        let mut audio: Vec<u8> = Vec::new();

        for chunk in chunk_text(text, MAX_CHUNK_CHARS) {
            let response = self
                .client
                .get(&url)
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.config.lang.as_str()),
                    ("q", chunk.as_str()),
                ])
                .send()
                .await
                .context("Translate TTS request failed")?;

            let status = response.status();
            if !status.is_success() {
                return Err(anyhow!("Translate TTS returned {}", status).into());
            }

            let bytes = response
                .bytes()
                .await
                .context("Failed to read Translate TTS response body")?;
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(anyhow!("Translate TTS produced no audio").into());
        }

        let path = out_dir.join(format!("audio_{}.mp3", Uuid::new_v4()));
        std::fs::write(&path, &audio)
            .with_context(|| format!("Failed to save narration to {}", path.display()))?;

        debug!("Translate TTS narration saved to {}", path.display());
        Ok(path)
    }
}

/// Split text on whitespace into chunks of at most `max_chars` characters.
/// A single word longer than the budget becomes its own chunk.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_short_input_is_one_chunk() {
        let chunks = chunk_text("hello world", 200);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_chunk_text_respects_budget() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = chunk_text(text, 12);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 12);
        }
        assert_eq!(chunks.join(" "), text);
    }

    #[test]
    fn test_chunk_text_oversized_word_is_kept_whole() {
        let word = "a".repeat(50);
        let chunks = chunk_text(&word, 10);
        assert_eq!(chunks, vec![word]);
    }

    #[test]
    fn test_chunk_text_empty_input() {
        assert!(chunk_text("", 200).is_empty());
        assert!(chunk_text("   ", 200).is_empty());
    }
}
