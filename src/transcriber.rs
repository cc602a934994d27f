use std::path::Path;

use anyhow::Result;

/// Speech-to-text capability used by the pipeline.
///
/// An implementor is the loaded model handle: it is constructed once per batch (model loading
/// is expensive) and then shared read-only by every work item, which is why `transcribe` takes
/// `&self`.
pub trait Transcriber {
    /// Recognize the speech in the audio file at `audio_path`.
    ///
    /// Returns the full text of the recording as one string (not segmented). Silence may
    /// legitimately yield an empty string.
    fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

impl<T: Transcriber + ?Sized> Transcriber for &T {
    fn transcribe(&self, audio_path: &Path) -> Result<String> {
        (**self).transcribe(audio_path)
    }
}
