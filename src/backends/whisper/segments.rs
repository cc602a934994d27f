use anyhow::{Context, Result};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext};

use crate::opts::TranscribeOpts;

const BEAM_SIZE: i32 = 5;

/// Run one full Whisper pass over `samples` and return the recognized text.
pub(super) fn full_text(
    ctx: &WhisperContext,
    opts: &TranscribeOpts,
    samples: &[f32],
) -> Result<String> {
    let mut state = ctx
        .create_state()
        .context("failed to create whisper state")?;

    state
        .full(params_for(opts), samples)
        .context("whisper inference failed")?;

    let pieces = state
        .as_iter()
        .enumerate()
        .map(|(idx, segment)| {
            segment
                .to_str()
                .map(str::to_owned)
                .with_context(|| format!("segment {idx} is not valid UTF-8"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(join_segments(&pieces))
}

/// whisper.cpp already prefixes segments with a space where one belongs.
fn join_segments<S: AsRef<str>>(pieces: &[S]) -> String {
    pieces
        .iter()
        .map(AsRef::as_ref)
        .collect::<String>()
        .trim()
        .to_owned()
}

fn params_for(opts: &TranscribeOpts) -> FullParams<'_, '_> {
    let mut params = FullParams::new(SamplingStrategy::BeamSearch {
        beam_size: BEAM_SIZE,
        patience: 1.0,
    });

    params.set_n_threads(num_cpus::get() as i32);
    params.set_translate(false);
    params.set_language(opts.language.as_deref());

    // Nothing goes to stdout; whisper.cpp's own log lines are routed through tracing.
    params.set_print_progress(false);
    params.set_print_special(false);
    params.set_print_realtime(false);
    params.set_print_timestamps(false);

    params
}
