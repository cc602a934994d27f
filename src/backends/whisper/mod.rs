use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};
use whisper_rs::WhisperContext;

use crate::audio_pipeline::WHISPER_SAMPLE_RATE;
use crate::decoder::decode_file;
use crate::error::Error;
use crate::model::ModelName;
use crate::opts::TranscribeOpts;
use crate::transcriber::Transcriber;

mod ctx;
mod logging;
mod segments;

/// Built-in transcriber powered by `whisper-rs` / `whisper.cpp`.
///
/// This is the batch's model handle: the model is loaded once in [`WhisperTranscriber::load`]
/// and every call to [`Transcriber::transcribe`] creates its own short-lived whisper state, so
/// the loaded context is never mutated.
pub struct WhisperTranscriber {
    ctx: WhisperContext,
    opts: TranscribeOpts,
}

impl WhisperTranscriber {
    /// Load the GGML model at `model_path`.
    pub fn load(model_path: &Path, opts: TranscribeOpts) -> crate::Result<Self> {
        info!(model = %model_path.display(), "loading whisper model");

        let ctx = ctx::load_context(model_path).map_err(|err| Error::Model {
            path: model_path.to_path_buf(),
            reason: format!("{err:#}"),
        })?;

        Ok(Self { ctx, opts })
    }

    /// Resolve `model` inside `model_dir` and load it.
    pub fn load_named(model: ModelName, model_dir: &Path, opts: TranscribeOpts) -> crate::Result<Self> {
        let path = model.resolve(model_dir)?;
        Self::load(&path, opts)
    }

    /// Transcribe mono samples already at [`WHISPER_SAMPLE_RATE`].
    pub fn transcribe_samples(&self, samples: &[f32]) -> Result<String> {
        if samples.is_empty() {
            return Ok(String::new());
        }
        segments::full_text(&self.ctx, &self.opts, samples)
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let samples = decode_file(audio_path)?;
        debug!(
            audio = %audio_path.display(),
            seconds = samples.len() as f32 / WHISPER_SAMPLE_RATE as f32,
            "decoded audio for whisper"
        );
        self.transcribe_samples(&samples)
    }
}
