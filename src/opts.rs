use std::path::PathBuf;

use crate::discovery::VideoExt;
use crate::model::{DEFAULT_MODEL_DIR, ModelName};

/// Options for one batch run.
///
/// This struct represents *library-level configuration*, not CLI flags directly.
/// The CLI is responsible for mapping user input into this type so that:
/// - the library remains reusable outside of a CLI context
/// - tests and other frontends can construct options programmatically
#[derive(Debug, Clone)]
pub struct BatchOpts {
    /// Base directory scanned recursively for videos.
    pub input_dir: PathBuf,

    /// Flat directory receiving `<derived id>.txt` transcripts. Created if missing.
    pub output_dir: PathBuf,

    /// Only files with this extension (any case) are processed.
    pub ext: VideoExt,

    /// Whisper model size to load.
    pub model: ModelName,

    /// Directory holding the `ggml-*.bin` model files.
    pub model_dir: PathBuf,

    /// Which audio extraction backend to use.
    pub extractor: ExtractorKind,

    /// `ffmpeg` executable used by [`ExtractorKind::Ffmpeg`].
    pub ffmpeg_program: PathBuf,

    /// What to do when a single item fails to extract or transcribe.
    pub failure_policy: FailurePolicy,

    pub transcribe: TranscribeOpts,
}

impl BatchOpts {
    /// Options for `input_dir` with every other setting at its default.
    ///
    /// The output directory defaults to `<input_dir>/output`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        let output_dir = input_dir.join("output");
        Self {
            input_dir,
            output_dir,
            ext: VideoExt::default(),
            model: ModelName::default(),
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
            extractor: ExtractorKind::default(),
            ffmpeg_program: PathBuf::from("ffmpeg"),
            failure_policy: FailurePolicy::default(),
            transcribe: TranscribeOpts::default(),
        }
    }
}

/// Options that control how Whisper transcribes each recording.
#[derive(Debug, Clone, Default)]
pub struct TranscribeOpts {
    /// Optional language hint (e.g. `"en"`, `"es"`).
    ///
    /// When `None`, we allow Whisper to auto-detect the spoken language.
    pub language: Option<String>,
}

/// How the runner reacts to an item that fails extraction or transcription.
///
/// Discovery and persistence failures abort the run regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure, record it in the summary, and move on to the next item.
    #[default]
    Continue,

    /// Stop the whole batch at the first failed item.
    FailFast,
}

/// Audio extraction backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExtractorKind {
    /// Run the external `ffmpeg` executable and write MP3.
    #[default]
    Ffmpeg,

    /// Decode in-process with Symphonia and write WAV.
    Native,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_defaults_inside_input() {
        let opts = BatchOpts::new("/videos");
        assert_eq!(opts.output_dir, PathBuf::from("/videos/output"));
        assert_eq!(opts.ext, VideoExt::Mp4);
        assert_eq!(opts.model, ModelName::Turbo);
        assert_eq!(opts.failure_policy, FailurePolicy::Continue);
        assert_eq!(opts.extractor, ExtractorKind::Ffmpeg);
    }
}
