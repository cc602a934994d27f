//! PCM normalization for Whisper.
//!
//! Responsibilities:
//! - Convert Symphonia-decoded PCM into interleaved `f32`
//! - Downmix to mono
//! - Resample the whole recording to Whisper's sample rate once decoding is done
//!
//! We transcribe complete recordings, so samples are collected first and resampled in a single
//! pass rather than streamed.

use anyhow::{Context, Result, anyhow, bail};
use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};

/// Mono sample rate whisper.cpp expects (Hz).
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

// Source frames fed to rubato per `process()` call.
const RESAMPLE_CHUNK_FRAMES: usize = 2048;

/// Collects decoded buffers as mono `f32` at the source rate.
#[derive(Default)]
pub struct AudioPipeline {
    // Scratch buffer reused across packets; rebuilt when a packet outgrows it.
    sample_buf: Option<SampleBuffer<f32>>,
    sample_buf_frames: usize,

    source_rate: Option<u32>,
    mono: Vec<f32>,
}

impl AudioPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one decoded buffer.
    ///
    /// Fails if the sample rate changes mid-recording.
    pub fn push_decoded(&mut self, decoded: &AudioBufferRef<'_>) -> Result<()> {
        let spec = *decoded.spec();
        let channels = spec.channels.count();
        if channels == 0 {
            bail!("decoded audio had zero channels");
        }

        match self.source_rate {
            None => self.source_rate = Some(spec.rate),
            Some(rate) if rate != spec.rate => {
                bail!("sample rate changed mid-stream ({rate} Hz -> {} Hz)", spec.rate)
            }
            Some(_) => {}
        }

        let frames = decoded.capacity();
        if self.sample_buf.is_none() || frames > self.sample_buf_frames {
            self.sample_buf = Some(SampleBuffer::<f32>::new(frames as u64, spec));
            self.sample_buf_frames = frames;
        }

        let buf = self
            .sample_buf
            .as_mut()
            .ok_or_else(|| anyhow!("sample buffer not initialized"))?;
        buf.copy_interleaved_ref(decoded.clone());

        downmix_into(buf.samples(), channels, &mut self.mono);
        Ok(())
    }

    /// Finish the recording and return mono samples at [`WHISPER_SAMPLE_RATE`].
    pub fn finish(self) -> Result<Vec<f32>> {
        match self.source_rate {
            None => Ok(Vec::new()),
            Some(WHISPER_SAMPLE_RATE) => Ok(self.mono),
            Some(rate) => resample(&self.mono, rate, WHISPER_SAMPLE_RATE),
        }
    }
}

/// Average interleaved frames into mono and append them to `out`.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels == 1 {
        out.extend_from_slice(interleaved);
        return;
    }

    out.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}

/// Resample a complete mono recording from `from_rate` to `to_rate`.
///
/// The output is aligned to the input (resampler delay removed) and has
/// `ceil(len * to_rate / from_rate)` frames.
fn resample(mono: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if mono.is_empty() {
        return Ok(Vec::new());
    }
    if from_rate == 0 {
        bail!("source sample rate is zero");
    }

    let ratio = to_rate as f64 / from_rate as f64;
    let mut rs = SincFixedIn::<f32>::new(
        ratio,
        1.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        },
        RESAMPLE_CHUNK_FRAMES,
        1,
    )
    .map_err(|e| anyhow!(e))
    .context("failed to init resampler")?;

    let delay = rs.output_delay();
    let expected = (mono.len() as f64 * ratio).ceil() as usize;
    let mut out = Vec::with_capacity(expected + delay + RESAMPLE_CHUNK_FRAMES);

    // Keep feeding (zero-padded past the end) until the delayed tail has been flushed.
    let mut pos = 0;
    while out.len() < delay + expected {
        let mut block = vec![0.0f32; RESAMPLE_CHUNK_FRAMES];
        if pos < mono.len() {
            let end = (pos + RESAMPLE_CHUNK_FRAMES).min(mono.len());
            block[..end - pos].copy_from_slice(&mono[pos..end]);
        }
        pos += RESAMPLE_CHUNK_FRAMES;

        let input = [block];
        let mut resampled = rs
            .process(&input, None)
            .map_err(|e| anyhow!(e))
            .context("resampler process failed")?;
        let channel = resampled
            .pop()
            .ok_or_else(|| anyhow!("expected mono output from resampler"))?;
        out.extend_from_slice(&channel);
    }

    out.drain(..delay);
    out.truncate(expected);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pipeline_finishes_empty() -> anyhow::Result<()> {
        assert!(AudioPipeline::new().finish()?.is_empty());
        Ok(())
    }

    #[test]
    fn downmix_single_channel_is_identity() {
        let mut out = Vec::new();
        downmix_into(&[0.0, 1.0, -1.0], 1, &mut out);
        assert_eq!(out, vec![0.0, 1.0, -1.0]);
    }

    #[test]
    fn downmix_averages_channels_and_appends() {
        // Two frames of stereo: (L=1, R=3), (L=-1, R=1) => mono: 2, 0
        let mut out = vec![9.0];
        downmix_into(&[1.0, 3.0, -1.0, 1.0], 2, &mut out);
        assert_eq!(out, vec![9.0, 2.0, 0.0]);
    }

    #[test]
    fn resample_produces_expected_length() -> anyhow::Result<()> {
        // One second at 44.1 kHz, plus an odd remainder.
        let mono = vec![0.25f32; 44_100 + 7];
        let out = resample(&mono, 44_100, WHISPER_SAMPLE_RATE)?;
        let expected = ((44_100 + 7) as f64 * 16_000.0 / 44_100.0).ceil() as usize;
        assert_eq!(out.len(), expected);
        Ok(())
    }

    #[test]
    fn resample_preserves_a_constant_signal() -> anyhow::Result<()> {
        let mono = vec![0.5f32; 48_000];
        let out = resample(&mono, 48_000, WHISPER_SAMPLE_RATE)?;
        // Ignore the edges where the sinc window overlaps the zero padding.
        let middle = &out[1_000..out.len() - 1_000];
        assert!(middle.iter().all(|s| (s - 0.5).abs() < 0.05));
        Ok(())
    }

    #[test]
    fn resample_rejects_zero_rate() {
        assert!(resample(&[0.0; 4], 0, WHISPER_SAMPLE_RATE).is_err());
    }
}
