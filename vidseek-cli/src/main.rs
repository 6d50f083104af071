//! Vidseek CLI - locate a video clip inside a fingerprinted haystack library.

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;
mod exit_codes;
mod utils;
mod viewer;

use commands::ingest::ScanDirs;
use commands::search::OutputFormat;
use config::Settings;
use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "\
Exit codes:
  0   Success
  1   General error
  64  Usage error
  65  Data error (corrupt record, no candidate, incompatible strides, bad manifest)
  66  Input not found (clip, manifest, video or haystack id)
  74  I/O error";

#[derive(Parser)]
#[command(name = "vidseek")]
#[command(author, version, about = "Locate video clips inside a fingerprinted haystack library", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Resize factor in (0, 1] applied to frames before hashing [env: VIDSEEK_DOWNSCALE]
    #[arg(long, value_name = "FACTOR", global = true)]
    downscale: Option<f32>,

    /// Frame rate used to convert offsets to playback time [env: VIDSEEK_FPS]
    #[arg(long, global = true)]
    fps: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fingerprint every haystack video named in the manifest
    Ingest {
        /// Manifest file [env: VIDSEEK_MANIFEST]
        #[arg(short, long, value_name = "MANIFEST")]
        manifest: Option<PathBuf>,

        /// Build the manifest from a directory of videos named <name><id>
        #[arg(long, value_name = "DIR", requires = "out")]
        scan: Option<PathBuf>,

        /// Directory receiving fingerprint records when scanning
        #[arg(long, value_name = "DIR", requires = "scan")]
        out: Option<PathBuf>,

        /// Haystack sampling stride for scanned videos [env: VIDSEEK_INGEST_STRIDE]
        #[arg(long)]
        stride: Option<u32>,

        /// Re-fingerprint haystacks whose record already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Find the haystack and offset that best match a query clip
    Search {
        /// Query clip (video file or directory of frames)
        #[arg(value_name = "CLIP")]
        clip: PathBuf,

        /// Manifest file [env: VIDSEEK_MANIFEST]
        #[arg(short, long, value_name = "MANIFEST")]
        manifest: Option<PathBuf>,

        /// Needle sampling stride [env: VIDSEEK_QUERY_STRIDE]
        #[arg(long)]
        stride: Option<u32>,

        /// Number of ranked haystacks to report
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
        top: u16,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Open the best match in the viewer [env: VIDSEEK_VIEWER]
        #[arg(long)]
        play: bool,
    },

    /// Show the stored fingerprint record of one haystack
    Inspect {
        /// Haystack identifier
        #[arg(value_name = "ID")]
        id: u32,

        /// Manifest file [env: VIDSEEK_MANIFEST]
        #[arg(short, long, value_name = "MANIFEST")]
        manifest: Option<PathBuf>,

        /// Number of leading fingerprints to print
        #[arg(long, default_value_t = 8)]
        head: usize,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::from_env();
    if let Some(downscale) = cli.downscale {
        settings.downscale = downscale;
    }
    if let Some(fps) = cli.fps {
        settings.fps = fps;
    }

    match cli.command {
        Commands::Ingest {
            manifest,
            scan,
            out,
            stride,
            overwrite,
        } => {
            settings.manifest = manifest.unwrap_or(settings.manifest);
            settings.ingest_stride = stride.unwrap_or(settings.ingest_stride);
            let scan = scan.zip(out).map(|(videos, out)| ScanDirs { videos, out });
            commands::ingest::execute(&settings, scan, overwrite)
        }
        Commands::Search {
            clip,
            manifest,
            stride,
            top,
            format,
            play,
        } => {
            settings.manifest = manifest.unwrap_or(settings.manifest);
            settings.query_stride = stride.unwrap_or(settings.query_stride);
            commands::search::execute(&settings, clip, usize::from(top), format, play)
        }
        Commands::Inspect { id, manifest, head } => {
            settings.manifest = manifest.unwrap_or(settings.manifest);
            commands::inspect::execute(&settings, id, head)
        }
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(exit_codes::USAGE_ERROR);
        }
        Err(err) => err.exit(),
    };
    init_tracing(cli.verbose);

    let exit = match run(cli) {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };
    if let Some(message) = &exit.message {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }
    std::process::exit(exit.code);
}
