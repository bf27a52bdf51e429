//! filejob: submit image and PDF jobs to a processing service and track them
//!
//! Run with: cargo run -p filejob-cli -- compress-pdf report.pdf --level high

mod commands;

use clap::{Parser, Subcommand};
use filejob_core::{CompressionLevel, TargetFormat};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "filejob")]
#[command(about = "Compress, convert, resize, extract and merge files on a remote processing service")]
#[command(version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "FILEJOB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the processing service
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory for downloaded results
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Wait for completion but do not download the result
    #[arg(long, global = true)]
    pub no_download: bool,

    /// Print the final job state as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reduce the size of an image
    CompressImage {
        file: PathBuf,
        /// Encoder quality (1-100)
        #[arg(long, default_value_t = 75)]
        quality: u8,
        /// Let the service pick the output format
        #[arg(long)]
        no_preserve_format: bool,
        /// Desired output size in KB
        #[arg(long)]
        target_kb: Option<u32>,
    },
    /// Convert an image to another format
    ConvertImage {
        file: PathBuf,
        /// Target format (jpg, png, webp, bmp, tiff, gif, ico, pdf)
        #[arg(long)]
        to: TargetFormat,
    },
    /// Resize an image
    ResizeImage {
        file: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Named size, see `filejob presets`
        #[arg(long)]
        preset: Option<String>,
        /// Do not keep the source aspect ratio
        #[arg(long)]
        no_lock: bool,
    },
    /// Reduce the size of a PDF
    CompressPdf {
        file: PathBuf,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        level: CompressionLevel,
    },
    /// Extract a page range from a PDF
    ExtractPdf {
        file: PathBuf,
        /// First page (1-based)
        #[arg(long)]
        start: u32,
        /// Last page, inclusive (defaults to --start)
        #[arg(long)]
        end: Option<u32>,
    },
    /// Merge PDFs in the order given
    MergePdf {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
    },
    /// List the built-in resize presets
    Presets,
    /// List conversion targets for an image
    Formats { file: PathBuf },
    /// Check that the processing service is reachable
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filejob=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    commands::dispatch(cli).await
}
