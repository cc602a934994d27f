//! Completion check for work items.
//!
//! A transcript's presence is the only durable record that an item is done. We never look at
//! its content, so an empty or truncated transcript still counts as complete.

use std::path::{Path, PathBuf};

use crate::naming::DerivedId;

/// Extension used for transcripts in the output directory.
pub const TRANSCRIPT_EXTENSION: &str = "txt";

/// Final location of the transcript for `id`.
pub fn transcript_path(output_dir: &Path, id: &DerivedId) -> PathBuf {
    output_dir.join(id.file_name(TRANSCRIPT_EXTENSION))
}

/// True iff a regular file already exists at [`transcript_path`].
pub fn is_done(output_dir: &Path, id: &DerivedId) -> bool {
    transcript_path(output_dir, id).is_file()
}
