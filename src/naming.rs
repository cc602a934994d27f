//! Derived identities for discovered videos.
//!
//! A video's identity is its path relative to the base directory, with the final extension
//! stripped and every path component joined by [`JOINER`]. The same string names both the
//! temporary audio file and the transcript, which is what lets the output directory stay flat
//! no matter how deeply the sources are nested.
//!
//! The scheme is not collision-free: a directory name that already contains the joiner can
//! produce the same identity as a different path (`a_b/c.mp4` and `a/b_c.mp4` both become
//! `a_b_c`). We keep that behavior so existing output directories stay valid.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Placed between path components in a derived identity.
pub const JOINER: &str = "_";

/// Flattened, extension-stripped identity of one video under a base directory.
///
/// Kept as an `OsString` so names that aren't valid UTF-8 survive byte for byte. Only
/// [`Display`](fmt::Display) is lossy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DerivedId(OsString);

impl DerivedId {
    pub fn as_os_str(&self) -> &OsStr {
        &self.0
    }

    /// File name for this identity with the given extension (no leading dot).
    pub fn file_name(&self, extension: &str) -> OsString {
        let mut name = self.0.clone();
        name.push(".");
        name.push(extension);
        name
    }
}

impl fmt::Display for DerivedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl AsRef<OsStr> for DerivedId {
    fn as_ref(&self) -> &OsStr {
        &self.0
    }
}

/// One discovered video paired with its derived identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub source_path: PathBuf,
    pub derived_id: DerivedId,
}

impl WorkItem {
    /// Derive the identity for `source_path` relative to `base_dir`.
    pub fn new(base_dir: &Path, source_path: PathBuf) -> Result<Self> {
        let derived_id = derive_identity(base_dir, &source_path)?;
        Ok(Self {
            source_path,
            derived_id,
        })
    }

    /// Where the temporary audio for this item lives: beside the source video.
    pub fn temp_audio_path(&self, extension: &str) -> PathBuf {
        let dir = self.source_path.parent().unwrap_or_else(|| Path::new(""));
        dir.join(self.derived_id.file_name(extension))
    }
}

/// Compute the derived identity of `file_path` relative to `base_dir`.
///
/// No case, unicode, or whitespace normalization is applied, and components are copied as raw
/// OS strings.
pub fn derive_identity(base_dir: &Path, file_path: &Path) -> Result<DerivedId> {
    let relative = file_path
        .strip_prefix(base_dir)
        .map_err(|_| Error::OutsideBase {
            path: file_path.to_path_buf(),
            base: base_dir.to_path_buf(),
        })?;

    let stem = relative.with_extension("");

    let mut id = OsString::new();
    for component in stem.components() {
        let Component::Normal(part) = component else {
            continue;
        };
        if !id.is_empty() {
            id.push(JOINER);
        }
        id.push(part);
    }

    if id.is_empty() {
        return Err(Error::msg(format!(
            "'{}' has no file name relative to '{}'",
            file_path.display(),
            base_dir.display()
        )));
    }

    Ok(DerivedId(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(base: &str, path: &str) -> String {
        derive_identity(Path::new(base), Path::new(path))
            .expect("path is under base")
            .to_string()
    }

    #[test]
    fn top_level_file_is_its_stem() {
        assert_eq!(id("/videos", "/videos/intro.mp4"), "intro");
    }

    #[test]
    fn nested_components_are_joined() {
        assert_eq!(id("/videos", "/videos/talks/2024/keynote.mp4"), "talks_2024_keynote");
    }

    #[test]
    fn only_final_extension_is_stripped() {
        assert_eq!(id("/v", "/v/season.1/ep.01.mov"), "season.1_ep.01");
    }

    #[test]
    fn case_and_whitespace_are_preserved() {
        assert_eq!(id("/v", "/v/My Talks/Clip A.MP4"), "My Talks_Clip A");
    }

    #[test]
    fn same_stem_in_sibling_dirs_stays_distinct() {
        assert_eq!(id("/b", "/b/sub1/a.mp4"), "sub1_a");
        assert_eq!(id("/b", "/b/sub2/a.mp4"), "sub2_a");
    }

    #[test]
    fn derivation_is_deterministic_and_separator_free() {
        let base = Path::new("/base");
        let path = Path::new("/base/x/y/z/clip.mp4");
        let first = derive_identity(base, path).unwrap();
        let second = derive_identity(base, path).unwrap();

        assert_eq!(first, second);
        let text = first.to_string();
        assert!(!text.contains(std::path::MAIN_SEPARATOR));
        assert!(!text.contains('/'));
    }

    #[test]
    fn joiner_in_directory_names_collides() {
        // Known limitation of the flattening scheme; both map to the same transcript.
        assert_eq!(id("/b", "/b/a_b/c.mp4"), "a_b_c");
        assert_eq!(id("/b", "/b/a/b_c.mp4"), "a_b_c");
    }

    #[test]
    fn path_outside_base_is_rejected() {
        let err = derive_identity(Path::new("/base"), Path::new("/elsewhere/a.mp4")).unwrap_err();
        assert!(matches!(err, Error::OutsideBase { .. }));
    }

    #[test]
    fn temp_audio_sits_beside_the_source() {
        let item = WorkItem::new(Path::new("/b"), PathBuf::from("/b/talks/sub/b.mp4")).unwrap();
        assert_eq!(item.derived_id.as_os_str(), "talks_sub_b");
        assert_eq!(
            item.temp_audio_path("mp3"),
            PathBuf::from("/b/talks/sub/talks_sub_b.mp3")
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_keep_their_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let base = Path::new("/b");
        let a = derive_identity(base, &base.join(OsStr::from_bytes(b"clip\xff.mp4"))).unwrap();
        let b = derive_identity(base, &base.join(OsStr::from_bytes(b"clip\xfe.mp4"))).unwrap();

        assert_ne!(a, b);
        assert_eq!(a.as_os_str().as_bytes(), b"clip\xff");
        assert_eq!(a.file_name("txt").as_bytes(), b"clip\xff.txt");
    }
}
