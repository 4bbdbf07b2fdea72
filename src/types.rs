//! Shared data types for Reelsmith

use std::path::PathBuf;

/// One segment of input text, rendered as exactly one clip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextUnit {
    /// Position in the source text (0-indexed, stable across the run)
    pub index: usize,
    pub text: String,
}

/// Image and narration generated for a single text unit
#[derive(Debug, Clone)]
pub struct GeneratedAsset {
    pub image_path: PathBuf,
    pub audio_path: PathBuf,
}

/// A composited, timed audiovisual segment (image + caption + narration)
#[derive(Debug, Clone)]
pub struct Clip {
    /// Index of the text unit this clip was built from
    pub index: usize,
    pub path: PathBuf,
    /// Duration in seconds, fixed to the narration's length
    pub duration_secs: f64,
}

/// Why a run finished without producing a video
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoVideoReason {
    /// Input text was empty or whitespace-only
    EmptyInput,
    /// Every text unit failed asset generation or composition
    AllUnitsFailed,
}

/// Outcome of a pipeline run that did not fail fatally
#[derive(Debug)]
pub enum RunOutcome {
    /// A video was rendered at the given path
    Rendered(PathBuf),
    /// No video was produced; the reason distinguishes empty input from
    /// all-units-failed
    NothingProduced(NoVideoReason),
}
