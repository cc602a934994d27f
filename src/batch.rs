//! Batch orchestration: discovery → idempotence gate → pipeline, across a whole tree.
//!
//! Items are processed strictly one after another. The only state shared between items is the
//! model handle (read-only) and the output directory.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::backends::WhisperTranscriber;
use crate::discovery::{VideoExt, discover};
use crate::error::{Error, Result};
use crate::extractor::AudioExtractor;
use crate::extractors::{FfmpegExtractor, NativeExtractor};
use crate::gate::{is_done, transcript_path};
use crate::naming::{DerivedId, WorkItem};
use crate::opts::{BatchOpts, ExtractorKind, FailurePolicy};
use crate::pipeline::{Stage, process};
use crate::transcriber::Transcriber;

/// Outcome of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: Vec<FailedItem>,
}

impl BatchSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One item that could not be transcribed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedItem {
    pub source_path: PathBuf,
    pub stage: Stage,
    pub reason: String,
}

/// Drives the pipeline over every discovered item.
///
/// The extractor and transcriber are borrowed for the whole run; the transcriber is the loaded
/// model handle and is never reloaded.
pub struct BatchRunner<E, T> {
    extractor: E,
    transcriber: T,
    policy: FailurePolicy,
}

impl<E: AudioExtractor, T: Transcriber> BatchRunner<E, T> {
    pub fn new(extractor: E, transcriber: T) -> Self {
        Self {
            extractor,
            transcriber,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Transcribe every `ext` video under `base_dir` into `output_dir`.
    pub fn run(&self, base_dir: &Path, output_dir: &Path, ext: VideoExt) -> Result<BatchSummary> {
        fs::create_dir_all(output_dir).map_err(|source| Error::Persistence {
            path: output_dir.to_path_buf(),
            source,
        })?;

        self.run_items(base_dir, output_dir, discover(base_dir, ext))
    }

    /// Process an explicit sequence of candidate paths (all under `base_dir`).
    ///
    /// `run` feeds this from a directory walk; tests can hand it an in-memory listing. An `Err`
    /// element aborts the run.
    pub fn run_items<I>(&self, base_dir: &Path, output_dir: &Path, items: I) -> Result<BatchSummary>
    where
        I: IntoIterator<Item = Result<PathBuf>>,
    {
        let started = Instant::now();
        let mut summary = BatchSummary::default();
        let mut seen: HashMap<DerivedId, PathBuf> = HashMap::new();

        for candidate in items {
            let item = WorkItem::new(base_dir, candidate?)?;

            if let Some(first) = seen.get(&item.derived_id) {
                warn!(
                    id = %item.derived_id,
                    first = %first.display(),
                    second = %item.source_path.display(),
                    "two videos map to the same transcript name"
                );
            } else {
                seen.insert(item.derived_id.clone(), item.source_path.clone());
            }

            if is_done(output_dir, &item.derived_id) {
                info!(
                    "Text file: {} already exists, skipping...",
                    transcript_path(output_dir, &item.derived_id).display()
                );
                summary.skipped += 1;
                continue;
            }

            match process(&item, output_dir, &self.extractor, &self.transcriber) {
                Ok(_) => summary.succeeded += 1,
                Err(err) if err.is_item_local() && self.policy == FailurePolicy::Continue => {
                    error!(source = %item.source_path.display(), "{err}");
                    summary.failed.push(FailedItem {
                        source_path: item.source_path,
                        stage: Stage::of(&err).unwrap_or(Stage::Extracting),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            failed = summary.failed_count(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "batch finished"
        );

        Ok(summary)
    }
}

/// Run a complete batch as described by `opts`.
///
/// Builds the configured extractor, loads the Whisper model once, and processes every
/// discovered video (creating the output directory first).
pub fn run_batch(opts: &BatchOpts) -> Result<BatchSummary> {
    info!(
        input = %opts.input_dir.display(),
        output = %opts.output_dir.display(),
        ext = %opts.ext,
        model = %opts.model,
        relative_speed = opts.model.relative_speed(),
        "starting batch"
    );

    let extractor: Box<dyn AudioExtractor> = match opts.extractor {
        ExtractorKind::Ffmpeg => {
            let ffmpeg = FfmpegExtractor::new(opts.ffmpeg_program.as_os_str());
            ffmpeg.probe()?;
            Box::new(ffmpeg)
        }
        ExtractorKind::Native => Box::new(NativeExtractor::new()),
    };

    let transcriber =
        WhisperTranscriber::load_named(opts.model, &opts.model_dir, opts.transcribe.clone())?;

    BatchRunner::new(extractor, transcriber)
        .with_policy(opts.failure_policy)
        .run(&opts.input_dir, &opts.output_dir, opts.ext)
}
