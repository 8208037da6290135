use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use gapfill::upload::ObjectStoreTarget;
use gapfill::{process_file, AlignmentPolicy, ProcessOptions};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlignmentArg {
    Reject,
    Drop,
    Snap,
}

impl From<AlignmentArg> for AlignmentPolicy {
    fn from(v: AlignmentArg) -> Self {
        match v {
            AlignmentArg::Reject => AlignmentPolicy::Reject,
            AlignmentArg::Drop => AlignmentPolicy::Drop,
            AlignmentArg::Snap => AlignmentPolicy::Snap,
        }
    }
}

/// Fill gaps in time-series CSV files and append column statistics.
#[derive(Debug, Parser)]
#[command(name = "gapfill", version)]
struct Cli {
    /// CSV files to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Appended to output file names as `_<suffix>`
    #[arg(long, short)]
    suffix: Option<String>,

    /// Write outputs here instead of next to each input
    #[arg(long = "output-dir", short)]
    output_dir: Option<PathBuf>,

    /// How to treat rows that fall between grid timestamps
    #[arg(long, value_enum)]
    alignment: Option<AlignmentArg>,

    /// chrono format of the timestamp column, e.g. "%Y-%m-%d %H:%M", or "rfc3339"
    #[arg(long = "timestamp-format")]
    timestamp_format: Option<String>,

    /// Also write `<output>.stats.json`
    #[arg(long = "stats-json")]
    stats_json: bool,

    /// Copy finished files into this directory
    #[arg(long = "upload-dir")]
    upload_dir: Option<PathBuf>,

    /// Stage uploads under object keys for this bucket (needs --upload-dir)
    #[arg(long, requires = "region")]
    bucket: Option<String>,

    /// Region of --bucket
    #[arg(long, requires = "bucket")]
    region: Option<String>,

    /// Key prefix inside --bucket
    #[arg(long = "key-prefix", requires = "bucket")]
    key_prefix: Option<String>,

    /// JSON options file; command-line flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> gapfill::Result<ProcessOptions> {
        let mut options = match &self.config {
            Some(path) => ProcessOptions::from_json_file(path)?,
            None => ProcessOptions::default(),
        };
        if let Some(suffix) = &self.suffix {
            options.suffix = suffix.clone();
        }
        if let Some(dir) = &self.output_dir {
            options.output_dir = Some(dir.clone());
        }
        if let Some(alignment) = self.alignment {
            options.alignment = alignment.into();
        }
        if let Some(fmt) = &self.timestamp_format {
            options.timestamp_format = Some(fmt.clone());
        }
        if self.stats_json {
            options.stats_json = true;
        }
        if let Some(dir) = &self.upload_dir {
            options.upload_dir = Some(dir.clone());
        }
        if let (Some(bucket), Some(region)) = (&self.bucket, &self.region) {
            let prefix = self.key_prefix.clone().unwrap_or_default();
            options.object_store = Some(ObjectStoreTarget::new(bucket.clone(), region.clone(), prefix));
        }
        Ok(options)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = match cli.options() {
        Ok(options) => options,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!("Options: {options:?}");

    let mut failures = 0usize;
    for input in &cli.inputs {
        match process_file(input, &options) {
            Ok(output) => println!("{}", output.display()),
            Err(e) => {
                tracing::error!("Failed to process {:?}: {e}", input);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
