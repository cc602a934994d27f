use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::extractor::AudioExtractor;

/// Extracts the first audio stream of a video into an MP3 file by running `ffmpeg`.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    program: OsString,
}

impl Default for FfmpegExtractor {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegExtractor {
    /// Use the given `ffmpeg` executable (a bare name is looked up on `PATH`).
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        Path::new(&self.program)
    }

    /// Check that the executable can be started at all.
    ///
    /// A missing `ffmpeg` would otherwise fail every item individually.
    pub fn probe(&self) -> Result<()> {
        let output = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to run '{}'", self.program().display()))?;

        if !output.status.success() {
            bail!(
                "'{} -version' exited with {}",
                self.program().display(),
                output.status
            );
        }
        Ok(())
    }

    fn command(&self, source: &Path, dest: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"])
            .arg(source)
            .args(["-vn", "-map", "0:a:0", "-codec:a", "libmp3lame", "-q:a", "4"])
            .arg(dest)
            .stdin(Stdio::null());
        cmd
    }
}

impl AudioExtractor for FfmpegExtractor {
    fn extract(&self, source: &Path, dest: &Path) -> Result<()> {
        let mut cmd = self.command(source, dest);
        debug!(?cmd, "running ffmpeg");

        let output = cmd
            .output()
            .with_context(|| format!("failed to run '{}'", self.program().display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            );
        }

        Ok(())
    }
}
