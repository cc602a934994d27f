use std::path::Path;

use anyhow::Result;

/// Audio extraction capability used by the pipeline.
///
/// Given a media file, an extractor writes a standalone audio file that a [`crate::Transcriber`]
/// can read. Implementations live in [`crate::extractors`].
pub trait AudioExtractor {
    /// Extension (no leading dot) of the files this extractor writes.
    ///
    /// The pipeline names the temporary audio `<derived id>.<extension>`.
    fn audio_extension(&self) -> &str {
        "mp3"
    }

    /// Extract the audio track of `source` into `dest`, overwriting `dest` if present.
    ///
    /// Fails when the source is unreadable, corrupt, or has no audio track. On failure `dest`
    /// may or may not exist; the caller owns its removal.
    fn extract(&self, source: &Path, dest: &Path) -> Result<()>;
}

impl<T: AudioExtractor + ?Sized> AudioExtractor for &T {
    fn audio_extension(&self) -> &str {
        (**self).audio_extension()
    }

    fn extract(&self, source: &Path, dest: &Path) -> Result<()> {
        (**self).extract(source, dest)
    }
}

impl<T: AudioExtractor + ?Sized> AudioExtractor for Box<T> {
    fn audio_extension(&self) -> &str {
        (**self).audio_extension()
    }

    fn extract(&self, source: &Path, dest: &Path) -> Result<()> {
        (**self).extract(source, dest)
    }
}
