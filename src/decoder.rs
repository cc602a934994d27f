//! Decode the audio track of a media file (audio or video container) into mono `f32` samples
//! at Whisper's sample rate.
//!
//! Sources are seekable, so containers that keep their index at the end (many MP4/MOV files)
//! decode fine.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::io::MediaSource;
use tracing::debug;

use crate::audio_pipeline::AudioPipeline;
use crate::media::AudioTrack;

/// Decode the audio track of the file at `path`.
///
/// The file extension is passed to the prober as a hint.
pub fn decode_file(path: &Path) -> Result<Vec<f32>> {
    let file = File::open(path).with_context(|| format!("failed to open '{}'", path.display()))?;
    let hint = path.extension().and_then(|ext| ext.to_str());

    decode_source(Box::new(file), hint)
        .with_context(|| format!("failed to decode audio from '{}'", path.display()))
}

/// Decode the audio track of an arbitrary Symphonia media source.
pub fn decode_source(source: Box<dyn MediaSource>, hint_extension: Option<&str>) -> Result<Vec<f32>> {
    let mut track = AudioTrack::open(source, hint_extension)?;
    let mut pipeline = AudioPipeline::new();

    track.for_each_buffer(|buf| pipeline.push_decoded(&buf))?;

    if track.corrupt_packets() > 0 {
        debug!(
            skipped = track.corrupt_packets(),
            sample_rate = ?track.sample_rate(),
            "skipped undecodable audio packets"
        );
    }

    pipeline.finish()
}
