//! Pipeline orchestration for Reelsmith
//! Drives segmentation, asset generation, composition, render, and cleanup

use anyhow::anyhow;
use futures_util::stream::{self, StreamExt};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::timeout;

use crate::composer;
use crate::config::AppConfig;
use crate::error::{PipelineError, ProviderError};
use crate::housekeeping::TempFiles;
use crate::providers::{self, ImageProvider, SpeechProvider};
use crate::renderer;
use crate::segmenter;
use crate::types::{Clip, GeneratedAsset, NoVideoReason, RunOutcome, TextUnit};

/// Result of processing one text unit, with the intermediate files it created.
/// Temp files are reported even when the unit failed partway.
struct UnitResult {
    index: usize,
    outcome: Result<Clip, PipelineError>,
    temp: Vec<PathBuf>,
}

pub struct Pipeline {
    config: AppConfig,
    images: ImageProvider,
    speech: SpeechProvider,
}

impl Pipeline {
    /// Build providers once from validated configuration
    pub fn new(config: AppConfig) -> Self {
        let images = ImageProvider::from_config(&config);
        let speech = SpeechProvider::from_config(&config);
        Self {
            config,
            images,
            speech,
        }
    }

    /// Run the full text-to-video pipeline.
    ///
    /// Per-unit failures are logged with the unit index and skipped; the run
    /// never aborts for a single unit. Only a render failure is fatal. The
    /// three caller-visible outcomes stay distinguishable: a rendered path,
    /// a `NothingProduced` reason, or `Err(Render)`.
    pub async fn run(&self, text: &str) -> Result<RunOutcome, PipelineError> {
        let units = segmenter::segment(text, self.config.segmentation);
        if units.is_empty() {
            info!("Input produced no text units; nothing to render");
            return Ok(RunOutcome::NothingProduced(NoVideoReason::EmptyInput));
        }

        let out_dir = self.config.output_path();
        info!("Processing {} text units", units.len());

        let results: Vec<UnitResult> = stream::iter(units)
            .map(|unit| self.process_unit(unit, out_dir.as_path()))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        let (clips, mut temp) = collect_clips(results);

        if clips.is_empty() {
            info!("Every unit failed; no video produced");
            temp.cleanup();
            return Ok(RunOutcome::NothingProduced(NoVideoReason::AllUnitsFailed));
        }

        match renderer::render(&clips, &self.config, &out_dir).await {
            Ok(path) => {
                // All unit work finished before render, so the sweep is safe
                let removed = temp.cleanup();
                info!(
                    "Removed {} intermediate files; video at {}",
                    removed,
                    path.display()
                );
                Ok(RunOutcome::Rendered(path))
            }
            // Intermediates are kept on a failed render to allow inspection
            Err(reason) => Err(PipelineError::Render { reason }),
        }
    }

    async fn process_unit(&self, unit: TextUnit, out_dir: &Path) -> UnitResult {
        let index = unit.index;
        let mut temp = Vec::new();
        let outcome = self.build_clip(&unit, out_dir, &mut temp).await;
        UnitResult {
            index,
            outcome,
            temp,
        }
    }

    /// Generate both assets for a unit (each under the configured timeout)
    /// and compose them into a clip
    async fn build_clip(
        &self,
        unit: &TextUnit,
        out_dir: &Path,
        temp: &mut Vec<PathBuf>,
    ) -> Result<Clip, PipelineError> {
        let budget = Duration::from_secs(self.config.asset_timeout_secs);
        let prompt = providers::image_prompt(&unit.text);

        let image_path = timeout(budget, self.images.generate(&prompt, out_dir))
            .await
            .map_err(|_| timed_out("image generation", unit.index, budget))?
            .map_err(|e| classify(e, unit.index))?;
        temp.push(image_path.clone());

        let audio_path = timeout(budget, self.speech.synthesize(&unit.text, out_dir))
            .await
            .map_err(|_| timed_out("speech synthesis", unit.index, budget))?
            .map_err(|e| classify(e, unit.index))?;
        temp.push(audio_path.clone());

        let asset = GeneratedAsset {
            image_path,
            audio_path,
        };
        let clip = composer::compose_clip(unit, &asset, &self.config, out_dir).map_err(|reason| {
            PipelineError::Composition {
                index: unit.index,
                reason,
            }
        })?;
        temp.push(clip.path.clone());
        Ok(clip)
    }
}

/// Sort unit results back into source order and split clips from failures.
/// Failed units are logged and simply absent; relative order of the
/// survivors matches their source order.
fn collect_clips(mut results: Vec<UnitResult>) -> (Vec<Clip>, TempFiles) {
    results.sort_by_key(|r| r.index);

    let mut temp = TempFiles::new();
    let mut clips = Vec::new();

    for UnitResult {
        index,
        outcome,
        temp: unit_temp,
    } in results
    {
        for path in unit_temp {
            temp.track(path);
        }
        match outcome {
            Ok(clip) => clips.push(clip),
            Err(e) => warn!("Skipping unit {}: {}", index, e),
        }
    }

    (clips, temp)
}

/// Map a provider failure onto the pipeline taxonomy
fn classify(err: ProviderError, index: usize) -> PipelineError {
    match err {
        ProviderError::MissingCredential(provider) => PipelineError::MissingCredential { provider },
        ProviderError::Other(reason) => PipelineError::AssetGeneration { index, reason },
    }
}

fn timed_out(what: &str, index: usize, budget: Duration) -> PipelineError {
    PipelineError::AssetGeneration {
        index,
        reason: anyhow!("{} timed out after {}s", what, budget.as_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_result(index: usize) -> UnitResult {
        UnitResult {
            index,
            outcome: Ok(Clip {
                index,
                path: PathBuf::from(format!("clip_{}.mp4", index)),
                duration_secs: 2.0,
            }),
            temp: vec![
                PathBuf::from(format!("{}.png", index)),
                PathBuf::from(format!("audio_{}.mp3", index)),
                PathBuf::from(format!("clip_{}.mp4", index)),
            ],
        }
    }

    fn failed_result(index: usize) -> UnitResult {
        UnitResult {
            index,
            outcome: Err(PipelineError::AssetGeneration {
                index,
                reason: anyhow!("remote service error"),
            }),
            temp: vec![PathBuf::from(format!("{}.png", index))],
        }
    }

    #[test]
    fn test_collect_clips_restores_source_order() {
        // completion order under concurrency is arbitrary
        let results = vec![ok_result(2), ok_result(0), ok_result(1)];
        let (clips, _) = collect_clips(results);
        let indices: Vec<usize> = clips.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_failed_unit_is_absent_without_reordering() {
        let results = vec![ok_result(2), failed_result(1), ok_result(0)];
        let (clips, _) = collect_clips(results);
        let indices: Vec<usize> = clips.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_temp_files_are_tracked_for_failed_units_too() {
        let results = vec![ok_result(0), failed_result(1)];
        let (_, temp) = collect_clips(results);
        // 3 files for the success (image, audio, clip) + 1 for the failure
        assert_eq!(temp.len(), 4);
    }

    #[tokio::test]
    async fn test_run_with_empty_input_renders_nothing() {
        let pipeline = Pipeline::new(AppConfig::default());
        // touches no provider and spawns no subprocess
        let outcome = pipeline.run("").await.unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::NothingProduced(NoVideoReason::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_run_with_whitespace_only_input_renders_nothing() {
        let pipeline = Pipeline::new(AppConfig::default());
        let outcome = pipeline.run("   \n\n  ").await.unwrap();
        assert!(matches!(
            outcome,
            RunOutcome::NothingProduced(NoVideoReason::EmptyInput)
        ));
    }

    #[test]
    fn test_classify_missing_credential() {
        let err = classify(ProviderError::MissingCredential("STABILITY_KEY"), 5);
        assert!(matches!(
            err,
            PipelineError::MissingCredential {
                provider: "STABILITY_KEY"
            }
        ));
    }

    #[test]
    fn test_classify_provider_failure_keeps_index() {
        let err = classify(ProviderError::Other(anyhow!("503")), 5);
        match err {
            PipelineError::AssetGeneration { index, .. } => assert_eq!(index, 5),
            other => panic!("unexpected error kind: {}", other),
        }
    }
}
