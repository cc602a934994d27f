use std::path::{self, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use vidscribe::logging::{self, LogFormat};
use vidscribe::model::DEFAULT_MODEL_DIR;
use vidscribe::{
    BatchOpts, BatchSummary, ExtractorKind, FailurePolicy, ModelName, TranscribeOpts, VideoExt,
    run_batch,
};

/// Exit status when the batch completed but some videos failed.
const EXIT_PARTIAL_FAILURE: u8 = 2;

fn main() -> Result<ExitCode> {
    let params = Params::parse();
    logging::init(params.log_format);

    let opts = params.to_opts()?;
    let summary = run_batch(&opts)?;
    report(&summary, params.summary_json)?;

    if summary.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL_FAILURE))
    }
}

#[derive(Parser, Debug)]
#[command(name = "vidscribe")]
#[command(about = "Transcribe audio from videos in a folder using Whisper")]
struct Params {
    /// Base directory containing videos.
    #[arg(short = 'i', long = "input", default_value = ".")]
    input: PathBuf,

    /// Output directory for transcriptions [default: <INPUT>/output].
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Video file extension to process.
    #[arg(short = 'e', long = "ext", value_enum, default_value_t = VideoExt::Mp4)]
    ext: VideoExt,

    /// Whisper model to use (relative speeds shown per model).
    #[arg(short = 'm', long = "model", value_enum, default_value_t = ModelName::Turbo)]
    model: ModelName,

    /// Directory containing the whisper.cpp `ggml-*.bin` model files.
    #[arg(long = "model-dir", default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,

    /// Spoken language hint (e.g. `en`); auto-detected when omitted.
    #[arg(long = "language")]
    language: Option<String>,

    /// How audio is pulled out of each video.
    #[arg(long = "extractor", value_enum, default_value_t = ExtractorKind::Ffmpeg)]
    extractor: ExtractorKind,

    /// `ffmpeg` executable used by the ffmpeg extractor.
    #[arg(long = "ffmpeg", default_value = "ffmpeg")]
    ffmpeg: PathBuf,

    /// Stop at the first video that fails instead of continuing with the rest.
    #[arg(long = "fail-fast", default_value_t = false)]
    fail_fast: bool,

    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Print the run summary as JSON on stdout when done.
    #[arg(long = "summary-json", default_value_t = false)]
    summary_json: bool,
}

impl Params {
    fn to_opts(&self) -> Result<BatchOpts> {
        let input_dir = path::absolute(&self.input)
            .with_context(|| format!("invalid input directory '{}'", self.input.display()))?;
        let output_dir = match &self.output {
            Some(output) => path::absolute(output)
                .with_context(|| format!("invalid output directory '{}'", output.display()))?,
            None => input_dir.join("output"),
        };

        Ok(BatchOpts {
            input_dir,
            output_dir,
            ext: self.ext,
            model: self.model,
            model_dir: self.model_dir.clone(),
            extractor: self.extractor,
            ffmpeg_program: self.ffmpeg.clone(),
            failure_policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Continue
            },
            transcribe: TranscribeOpts {
                language: self.language.clone(),
            },
        })
    }
}

fn report(summary: &BatchSummary, as_json: bool) -> Result<()> {
    info!(
        "Done: {} videos, {} transcribed, {} skipped, {} failed",
        summary.total(),
        summary.succeeded,
        summary.skipped,
        summary.failed_count()
    );
    for failed in &summary.failed {
        warn!("Failed: {} ({})", failed.source_path.display(), failed.reason);
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    }
    Ok(())
}
