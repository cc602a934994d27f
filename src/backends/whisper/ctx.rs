use std::path::Path;

use anyhow::{Context, Result, anyhow};
use whisper_rs::{WhisperContext, WhisperContextParameters};

use super::logging::init_whisper_logging;

/// Load a whisper.cpp GGML model and return an initialized `WhisperContext`.
pub fn load_context(model_path: &Path) -> Result<WhisperContext> {
    init_whisper_logging();

    let model_path_str = model_path
        .to_str()
        .ok_or_else(|| anyhow!("model path is not valid UTF-8: {}", model_path.display()))?;

    let ctx_params = WhisperContextParameters::default();
    let ctx = WhisperContext::new_with_params(model_path_str, ctx_params)
        .with_context(|| format!("failed to load model from path: {model_path_str}"))?;

    Ok(ctx)
}
