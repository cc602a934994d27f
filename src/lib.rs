//! `vidscribe`: batch-transcribe the spoken audio of every video under a directory tree.
//!
//! For each matching video we:
//! - derive a flat, stable name from its path relative to the base directory
//! - skip it if `<output>/<name>.txt` already exists
//! - extract its audio next to the source, transcribe it with Whisper, save the text
//!   atomically, and remove the temporary audio
//!
//! Audio extraction and speech-to-text sit behind the [`AudioExtractor`] and [`Transcriber`]
//! traits so the batch logic can run against stub implementations.

mod error;

pub use error::{Error, Result};

// High-level API (most consumers should start here).
pub mod batch;
pub mod opts;

// Work discovery, naming, and the completion check.
pub mod discovery;
pub mod gate;
pub mod naming;

// Per-item extract → transcribe → persist → cleanup.
pub mod pipeline;

// Capability seams and their built-in implementations.
pub mod extractor;
pub mod extractors;
pub mod transcriber;

pub mod backends;
pub mod model;

// Media decoding.
pub mod audio_pipeline;
pub mod decoder;
pub mod media;

// Logging configuration for binaries.
#[cfg(feature = "logging")]
pub mod logging;

pub use batch::{BatchRunner, BatchSummary, FailedItem, run_batch};
pub use discovery::{VideoExt, discover};
pub use extractor::AudioExtractor;
pub use model::ModelName;
pub use naming::{DerivedId, WorkItem, derive_identity};
pub use opts::{BatchOpts, ExtractorKind, FailurePolicy, TranscribeOpts};
pub use pipeline::{Stage, process};
pub use transcriber::Transcriber;
