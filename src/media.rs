//! Reading the audio track out of a media container with Symphonia.

use anyhow::{Context, Result, anyhow};
use symphonia::core::audio::AudioBufferRef;
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Track};
use symphonia::core::io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

// Power of two above 32 KiB, as Symphonia's prober requires.
const PROBE_BUFFER_LEN: usize = 256 * 1024;

/// The audio track of an opened container, paired with a decoder for it.
///
/// Packets from other tracks (video, subtitles) are dropped while reading.
pub struct AudioTrack {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: Option<u32>,
    corrupt_packets: usize,
}

impl AudioTrack {
    /// Probe `source` and select its audio track.
    ///
    /// The selected track is the first one with a known codec that reports a sample rate. Video
    /// tracks never report one. Fails with "no audio track found" when nothing qualifies.
    pub fn open(source: Box<dyn MediaSource>, hint_extension: Option<&str>) -> Result<Self> {
        let stream = MediaSourceStream::new(
            source,
            MediaSourceStreamOptions {
                buffer_len: PROBE_BUFFER_LEN,
            },
        );

        let mut hint = Hint::new();
        if let Some(ext) = hint_extension {
            hint.with_extension(ext);
        }

        let format = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| anyhow!(e))
            .context("failed to probe media container")?
            .format;

        let track = select_audio_track(format.tracks())
            .cloned()
            .ok_or_else(|| anyhow!("no audio track found"))?;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("unsupported audio codec {:?}", track.codec_params.codec))?;

        Ok(Self {
            format,
            decoder,
            track_id: track.id,
            sample_rate: track.codec_params.sample_rate,
            corrupt_packets: 0,
        })
    }

    pub fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    /// Packets skipped so far because the decoder rejected them as corrupt.
    pub fn corrupt_packets(&self) -> usize {
        self.corrupt_packets
    }

    /// Decode the rest of the track, handing every decoded buffer to `on_buffer`.
    ///
    /// Corrupt frames are skipped and counted. A mid-stream format change is fatal.
    pub fn for_each_buffer(
        &mut self,
        mut on_buffer: impl FnMut(AudioBufferRef<'_>) -> Result<()>,
    ) -> Result<()> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(());
                }
                Err(SymphoniaError::ResetRequired) => {
                    return Err(anyhow!("stream parameters changed mid-file"));
                }
                Err(e) => return Err(anyhow!(e)).context("failed reading packet"),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(buf) => on_buffer(buf)?,
                Err(SymphoniaError::DecodeError(_)) => self.corrupt_packets += 1,
                Err(e) => return Err(anyhow!(e)).context("decoder failure"),
            }
        }
    }
}

fn select_audio_track(tracks: &[Track]) -> Option<&Track> {
    tracks
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
}
