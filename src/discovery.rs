//! Recursive discovery of candidate videos under a base directory.

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// The video extensions a batch can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum VideoExt {
    #[default]
    #[cfg_attr(feature = "cli", value(name = ".mp4", alias = "mp4"))]
    Mp4,

    #[cfg_attr(feature = "cli", value(name = ".avi", alias = "avi"))]
    Avi,

    #[cfg_attr(feature = "cli", value(name = ".mov", alias = "mov"))]
    Mov,

    #[cfg_attr(feature = "cli", value(name = ".mpeg", alias = "mpeg"))]
    Mpeg,

    #[cfg_attr(feature = "cli", value(name = ".ogv", alias = "ogv"))]
    Ogv,
}

impl VideoExt {
    /// Extension without the leading dot, lowercase.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Avi => "avi",
            Self::Mov => "mov",
            Self::Mpeg => "mpeg",
            Self::Ogv => "ogv",
        }
    }

    /// Whether `path`'s final extension matches, ignoring ASCII case.
    pub fn matches(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.as_str()))
    }
}

impl fmt::Display for VideoExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.as_str())
    }
}

/// Lazily walk `base_dir` and yield every regular file matching `ext`.
///
/// Each call starts a fresh walk. Entries are visited in file-name order so batches are
/// reproducible. A directory that can't be read surfaces as an [`Error::Discovery`] item; the
/// walk does not skip it silently.
pub fn discover(base_dir: &Path, ext: VideoExt) -> Discovery {
    Discovery {
        walk: WalkDir::new(base_dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter(),
        ext,
    }
}

/// Iterator returned by [`discover`].
pub struct Discovery {
    walk: walkdir::IntoIter,
    ext: VideoExt,
}

impl Iterator for Discovery {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
                    return Some(Err(Error::Discovery { path, source: err }));
                }
            };

            if entry.file_type().is_file() && self.ext.matches(entry.path()) {
                return Some(Ok(entry.into_path()));
            }
        }
    }
}
