//! Whisper model selection.
//!
//! Users pick a model by size tag; we map that to a whisper.cpp GGML file inside a model
//! directory. Fetching the files is left to the user (see whisper.cpp's
//! `download-ggml-model.sh`).

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory searched for GGML models when none is configured.
pub const DEFAULT_MODEL_DIR: &str = "./models";

/// Supported Whisper model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ModelName {
    /// ~10x relative speed
    Tiny,
    /// ~7x relative speed
    Base,
    /// ~4x relative speed
    Small,
    /// ~2x relative speed
    Medium,
    /// ~1x relative speed
    Large,
    /// ~8x relative speed
    #[default]
    Turbo,
}

impl ModelName {
    pub const ALL: [ModelName; 6] = [
        Self::Tiny,
        Self::Base,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Turbo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Base => "base",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Turbo => "turbo",
        }
    }

    /// GGML file name whisper.cpp publishes for this size.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Tiny => "ggml-tiny.bin",
            Self::Base => "ggml-base.bin",
            Self::Small => "ggml-small.bin",
            Self::Medium => "ggml-medium.bin",
            Self::Large => "ggml-large-v3.bin",
            Self::Turbo => "ggml-large-v3-turbo.bin",
        }
    }

    /// Approximate speed relative to `large`.
    pub fn relative_speed(self) -> u8 {
        match self {
            Self::Tiny => 10,
            Self::Base => 7,
            Self::Small => 4,
            Self::Medium => 2,
            Self::Large => 1,
            Self::Turbo => 8,
        }
    }

    /// Locate this model's file inside `model_dir`.
    ///
    /// Fails with [`Error::Model`] when the file is missing so the run stops before any work
    /// starts.
    pub fn resolve(self, model_dir: &Path) -> Result<PathBuf> {
        let path = model_dir.join(self.file_name());
        if !path.is_file() {
            return Err(Error::Model {
                path,
                reason: format!(
                    "model file not found; download '{}' into '{}'",
                    self.file_name(),
                    model_dir.display()
                ),
            });
        }
        Ok(path)
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
