/// Built-in speech-to-text backend.
pub mod whisper;

pub use whisper::WhisperTranscriber;
