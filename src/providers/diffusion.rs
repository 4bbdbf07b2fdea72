//! Local diffusion model invocation
//! Shells out to a user-configured image generation command

use anyhow::{anyhow, Context};
use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use uuid::Uuid;

use crate::config::DiffusionConfig;
use crate::error::ProviderError;

pub struct DiffusionClient {
    config: DiffusionConfig,
    width: u32,
    height: u32,
}

impl DiffusionClient {
    pub fn new(config: DiffusionConfig, width: u32, height: u32) -> Self {
        Self {
            config,
            width,
            height,
        }
    }

    /// Run the diffusion command and return the path of the produced image
    pub async fn generate(&self, prompt: &str, out_dir: &Path) -> Result<PathBuf, ProviderError> {
        let path = out_dir.join(format!("{}.png", Uuid::new_v4()));
        let width = self.width.to_string();
        let height = self.height.to_string();
        let steps = self.config.steps.to_string();

        let output = Command::new(&self.config.command)
            .args(["--prompt", prompt])
            .args(["--width", width.as_str(), "--height", height.as_str()])
            .args(["--steps", steps.as_str()])
            .arg("--output")
            .arg(&path)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("Failed to run diffusion command '{}'", self.config.command))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "Diffusion command '{}' failed: {}",
                self.config.command,
                stderr.trim()
            )
            .into());
        }

        if !path.exists() {
            return Err(anyhow!("Diffusion command reported success but produced no image").into());
        }

        debug!("Diffusion image saved to {}", path.display());
        Ok(path)
    }
}
