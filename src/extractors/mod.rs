/// Extraction through an external `ffmpeg` executable (MP3 output).
pub mod ffmpeg;

/// In-process extraction with Symphonia (WAV output).
pub mod native;

pub use ffmpeg::FfmpegExtractor;
pub use native::NativeExtractor;
