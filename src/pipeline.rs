//! Per-item transcription pipeline: extract → transcribe → persist → clean up.
//!
//! Each step depends on the previous one succeeding. The temporary audio file is owned by a
//! drop guard from the moment extraction starts, so it is removed on every exit path,
//! including early returns on failure.

use std::ffi::OsString;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::extractor::AudioExtractor;
use crate::gate::transcript_path;
use crate::naming::WorkItem;
use crate::transcriber::Transcriber;

/// The pipeline step an item was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extracting,
    Transcribing,
    Persisting,
}

impl Stage {
    /// Map a pipeline error to the step that produced it.
    pub fn of(err: &Error) -> Option<Self> {
        match err {
            Error::Extraction { .. } => Some(Self::Extracting),
            Error::Transcription { .. } => Some(Self::Transcribing),
            Error::Persistence { .. } => Some(Self::Persisting),
            _ => None,
        }
    }
}

/// Run the full pipeline for one item and return the path of the saved transcript.
///
/// Extraction and transcription failures come back as [`Error::Extraction`] and
/// [`Error::Transcription`] naming the source video. A failed write is [`Error::Persistence`].
/// Nothing is retried.
pub fn process<E, T>(
    item: &WorkItem,
    output_dir: &Path,
    extractor: &E,
    transcriber: &T,
) -> Result<PathBuf>
where
    E: AudioExtractor + ?Sized,
    T: Transcriber + ?Sized,
{
    let mut audio = TempAudio::claim(item.temp_audio_path(extractor.audio_extension()));

    info!("Converting video file: {}", item.source_path.display());
    extractor
        .extract(&item.source_path, audio.path())
        .map_err(|err| Error::Extraction {
            path: item.source_path.clone(),
            reason: format!("{err:#}"),
        })?;
    audio.mark_extracted();

    info!("Transcribing audio file: {}", audio.path().display());
    let text = transcriber
        .transcribe(audio.path())
        .map_err(|err| Error::Transcription {
            path: item.source_path.clone(),
            reason: format!("{err:#}"),
        })?;

    let transcript = transcript_path(output_dir, &item.derived_id);
    persist_transcript(&transcript, &text)?;
    info!("Saved transcription to: {}", transcript.display());

    drop(audio);
    Ok(transcript)
}

/// Write `text` as UTF-8 to `path` so that `path` only ever holds a complete transcript.
///
/// The text goes to a hidden sibling first and is renamed over `path` once flushed to disk.
pub fn persist_transcript(path: &Path, text: &str) -> Result<()> {
    let to_err = |source: std::io::Error| Error::Persistence {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut prefix = OsString::from(".");
    prefix.push(path.file_name().unwrap_or_default());
    prefix.push(".");

    let mut builder = tempfile::Builder::new();
    builder.prefix(&prefix).suffix(".partial");
    // Created like any other new file, so the process umask applies.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }

    let mut tmp = builder.tempfile_in(dir).map_err(to_err)?;

    tmp.write_all(text.as_bytes()).map_err(to_err)?;
    tmp.as_file().sync_all().map_err(to_err)?;
    tmp.persist(path).map_err(|err| to_err(err.error))?;

    Ok(())
}

/// Owns the temporary audio file for one item and deletes it when dropped.
///
/// A file already sitting at the path before extraction is not ours: it is only removed once
/// the extractor has successfully overwritten it. Anything the extractor leaves behind at a
/// previously free path is removed on every exit.
///
/// A failed removal is only logged: by then the transcript is either saved or the item has
/// already failed for a more relevant reason.
struct TempAudio {
    path: PathBuf,
    owned: bool,
    extracted: bool,
}

impl TempAudio {
    fn claim(path: PathBuf) -> Self {
        let preexisting = fs::symlink_metadata(&path).is_ok();
        if preexisting {
            warn!(path = %path.display(), "temporary audio path already exists");
        }
        Self {
            path,
            owned: !preexisting,
            extracted: false,
        }
    }

    fn mark_extracted(&mut self) {
        self.owned = true;
        self.extracted = true;
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempAudio {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "removed temporary audio"),
            // Extraction failed before writing anything; nothing to clean up.
            Err(err) if err.kind() == ErrorKind::NotFound && !self.extracted => {}
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "failed to remove temporary audio"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Writes a placeholder audio file, optionally failing after doing so.
    struct StubExtractor {
        write_partial: bool,
        fail: bool,
    }

    impl AudioExtractor for StubExtractor {
        fn extract(&self, _source: &Path, dest: &Path) -> anyhow::Result<()> {
            if self.write_partial || !self.fail {
                fs::write(dest, b"ID3")?;
            }
            if self.fail {
                anyhow::bail!("no audio track found");
            }
            Ok(())
        }
    }

    const OK_EXTRACT: StubExtractor = StubExtractor {
        write_partial: false,
        fail: false,
    };

    struct StubTranscriber {
        result: std::result::Result<&'static str, &'static str>,
        seen: RefCell<Vec<PathBuf>>,
    }

    impl StubTranscriber {
        fn ok(text: &'static str) -> Self {
            Self {
                result: Ok(text),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing(reason: &'static str) -> Self {
            Self {
                result: Err(reason),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transcriber for StubTranscriber {
        fn transcribe(&self, audio_path: &Path) -> anyhow::Result<String> {
            assert!(audio_path.is_file(), "audio must exist while transcribing");
            self.seen.borrow_mut().push(audio_path.to_path_buf());
            self.result.map(str::to_owned).map_err(anyhow::Error::msg)
        }
    }

    struct Fixture {
        _dir: TempDir,
        output: PathBuf,
        item: WorkItem,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("in");
        let output = dir.path().join("out");
        fs::create_dir_all(base.join("talks")).unwrap();
        fs::create_dir_all(&output).unwrap();

        let source = base.join("talks/a.mp4");
        fs::write(&source, b"video").unwrap();

        let item = WorkItem::new(&base, source).unwrap();
        Fixture {
            _dir: dir,
            output,
            item,
        }
    }

    #[test]
    fn success_saves_transcript_and_removes_audio() -> anyhow::Result<()> {
        let fx = fixture();
        let transcriber = StubTranscriber::ok("héllo wörld");

        let saved = process(&fx.item, &fx.output, &OK_EXTRACT, &transcriber)?;

        assert_eq!(saved, fx.output.join("talks_a.txt"));
        assert_eq!(fs::read_to_string(&saved)?, "héllo wörld");

        let temp = fx.item.temp_audio_path("mp3");
        assert_eq!(transcriber.seen.borrow().as_slice(), [temp.clone()]);
        assert!(!temp.exists());
        Ok(())
    }

    #[test]
    fn transcription_failure_removes_audio_and_writes_nothing() {
        let fx = fixture();
        let transcriber = StubTranscriber::failing("model exploded");

        let err = process(&fx.item, &fx.output, &OK_EXTRACT, &transcriber).unwrap_err();

        assert!(matches!(&err, Error::Transcription { path, .. } if *path == fx.item.source_path));
        assert!(err.to_string().contains("model exploded"));
        assert_eq!(Stage::of(&err), Some(Stage::Transcribing));
        assert!(!fx.item.temp_audio_path("mp3").exists());
        assert!(!fx.output.join("talks_a.txt").exists());
    }

    #[test]
    fn extraction_failure_skips_transcription_and_removes_partial_audio() {
        let fx = fixture();
        let extractor = StubExtractor {
            write_partial: true,
            fail: true,
        };
        let transcriber = StubTranscriber::ok("unused");

        let err = process(&fx.item, &fx.output, &extractor, &transcriber).unwrap_err();

        assert_eq!(Stage::of(&err), Some(Stage::Extracting));
        assert!(transcriber.seen.borrow().is_empty());
        assert!(!fx.item.temp_audio_path("mp3").exists());
    }

    #[test]
    fn persist_failure_is_not_item_local_and_still_cleans_up() {
        let fx = fixture();
        let missing_output = fx.output.join("gone");
        let transcriber = StubTranscriber::ok("text");

        let err = process(&fx.item, &missing_output, &OK_EXTRACT, &transcriber).unwrap_err();

        assert_eq!(Stage::of(&err), Some(Stage::Persisting));
        assert!(!err.is_item_local());
        assert!(!fx.item.temp_audio_path("mp3").exists());
    }

    #[test]
    fn temp_audio_uses_extractor_extension() -> anyhow::Result<()> {
        struct WavStub;
        impl AudioExtractor for WavStub {
            fn audio_extension(&self) -> &str {
                "wav"
            }
            fn extract(&self, _source: &Path, dest: &Path) -> anyhow::Result<()> {
                assert_eq!(dest.extension().and_then(|e| e.to_str()), Some("wav"));
                fs::write(dest, b"RIFF")?;
                Ok(())
            }
        }

        let fx = fixture();
        let transcriber = StubTranscriber::ok("");
        process(&fx.item, &fx.output, &WavStub, &transcriber)?;

        assert_eq!(transcriber.seen.borrow()[0], fx.item.temp_audio_path("wav"));
        assert_eq!(fs::read(fx.output.join("talks_a.txt"))?, b"");
        Ok(())
    }

    #[test]
    fn persist_overwrites_and_leaves_no_partial_files() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("x.txt");

        persist_transcript(&path, "first")?;
        persist_transcript(&path, "second")?;

        assert_eq!(fs::read_to_string(&path)?, "second");
        let entries: Vec<_> = fs::read_dir(dir.path())?.collect::<std::io::Result<_>>()?;
        assert_eq!(entries.len(), 1);
        Ok(())
    }

    #[test]
    fn failed_extraction_leaves_existing_audio_alone() -> anyhow::Result<()> {
        let fx = fixture();
        let existing = fx.item.temp_audio_path("mp3");
        fs::write(&existing, b"my own recording")?;
        let extractor = StubExtractor {
            write_partial: false,
            fail: true,
        };

        let err = process(&fx.item, &fx.output, &extractor, &StubTranscriber::ok("x")).unwrap_err();

        assert_eq!(Stage::of(&err), Some(Stage::Extracting));
        assert_eq!(fs::read(&existing)?, b"my own recording");
        Ok(())
    }

    #[test]
    fn successful_extraction_over_existing_audio_cleans_it_up() -> anyhow::Result<()> {
        let fx = fixture();
        let existing = fx.item.temp_audio_path("mp3");
        fs::write(&existing, b"stale")?;

        process(&fx.item, &fx.output, &OK_EXTRACT, &StubTranscriber::ok("x"))?;

        assert!(!existing.exists());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn transcript_mode_follows_umask() -> anyhow::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new()?;
        let reference = dir.path().join("reference");
        fs::File::create(&reference)?;
        let path = dir.path().join("x.txt");

        persist_transcript(&path, "text")?;

        let mode = |p: &Path| fs::metadata(p).map(|m| m.permissions().mode() & 0o777);
        assert_eq!(mode(&path)?, mode(&reference)?);
        Ok(())
    }
}
