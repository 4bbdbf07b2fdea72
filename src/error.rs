//! Error taxonomy for the generation pipeline
//! Callers match on kinds instead of parsing log output

use thiserror::Error;

/// Failure reported by a single asset provider call
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The required API credential is not present in the environment.
    /// Reported per call, never a startup abort.
    #[error("{0} is not set")]
    MissingCredential(&'static str),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Pipeline-level failures, tagged with the unit index where one applies.
///
/// `MissingCredential`, `AssetGeneration` and `Composition` are caught per
/// unit and cause that unit to be skipped. `Render` is fatal to the run.
/// `Cleanup` is logged and never retracts a successful render.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing credential: {provider} is not set")]
    MissingCredential { provider: &'static str },
    #[error("asset generation failed for unit {index}: {reason}")]
    AssetGeneration { index: usize, reason: anyhow::Error },
    #[error("clip composition failed for unit {index}: {reason}")]
    Composition { index: usize, reason: anyhow::Error },
    #[error("final render failed: {reason}")]
    Render { reason: anyhow::Error },
    #[error("cleanup failed: {reason}")]
    Cleanup { reason: anyhow::Error },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_unit_errors_carry_index() {
        let err = PipelineError::AssetGeneration {
            index: 3,
            reason: anyhow!("remote service returned 500"),
        };
        assert!(err.to_string().contains("unit 3"));

        let err = PipelineError::Composition {
            index: 7,
            reason: anyhow!("ffmpeg exited with an error"),
        };
        assert!(err.to_string().contains("unit 7"));
    }

    #[test]
    fn test_missing_credential_names_provider() {
        let err = ProviderError::MissingCredential("STABILITY_KEY");
        assert_eq!(err.to_string(), "STABILITY_KEY is not set");
    }
}
