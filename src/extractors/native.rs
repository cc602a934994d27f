use std::path::Path;

use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::audio_pipeline::WHISPER_SAMPLE_RATE;
use crate::decoder::decode_file;
use crate::extractor::AudioExtractor;

/// Extracts audio in-process: Symphonia decodes the source's audio track and hound writes it
/// out as 16-bit mono WAV at Whisper's sample rate.
///
/// No external tools are needed, but only containers and codecs Symphonia understands are
/// supported (MP4/MOV with AAC, Ogg with Vorbis, ...).
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeExtractor;

impl NativeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl AudioExtractor for NativeExtractor {
    fn audio_extension(&self) -> &str {
        "wav"
    }

    fn extract(&self, source: &Path, dest: &Path) -> Result<()> {
        let samples = decode_file(source)?;
        if samples.is_empty() {
            bail!("audio track of '{}' contains no samples", source.display());
        }

        write_wav(dest, &samples)
            .with_context(|| format!("failed to write '{}'", dest.display()))
    }
}

fn write_wav(dest: &Path, samples: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: WHISPER_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(dest, spec)?;
    for &sample in samples {
        let pcm = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(pcm)?;
    }
    writer.finalize()?;
    Ok(())
}
