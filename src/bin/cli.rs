//! resfork CLI: list and export resources from classic Mac resource forks.
//!
//! Usage:
//!   rf-cli list path/to/file
//!   rf-cli export path/to/file out/ [--type snd] [--hirf] [--ysnd]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rf_fork::ByteSource;
use rf_master::{inspect_wav, Archive, DecodeOptions, ExportOptions, ResType};
use tracing_subscriber::EnvFilter;

/// Classic Mac OS resource fork reader
#[derive(Parser, Debug)]
#[command(name = "rf-cli", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Read the file's data fork instead of its resource fork
    #[arg(long, global = true)]
    data_fork: bool,

    /// Apply Beatnik (HIRF) archive rules to sounds
    #[arg(long, global = true)]
    hirf: bool,

    /// Treat sampled data as Ysnd-compressed
    #[arg(long, global = true)]
    ysnd: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every resource in the fork
    List { file: PathBuf },
    /// Convert snd, Ysnd and Tune resources into a directory
    Export {
        file: PathBuf,
        out_dir: PathBuf,
        /// Only export this resource type (repeatable)
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?cli, "parsed arguments");

    let decode = DecodeOptions {
        metadata_only: false,
        hirf_semantics: cli.hirf,
        decompress_ysnd: cli.ysnd,
    };

    match &cli.command {
        Command::List { file } => list(&open(file, cli.data_fork)?, &decode),
        Command::Export { file, out_dir, types } => {
            let types = if types.is_empty() {
                None
            } else {
                Some(types.iter().map(|t| parse_type(t)).collect::<Result<Vec<_>>>()?)
            };
            export(&open(file, cli.data_fork)?, out_dir, &ExportOptions { decode, types })
        }
    }
}

fn open(file: &Path, data_fork: bool) -> Result<Archive<rf_fork::FileSource>> {
    Archive::open_path(file, data_fork).with_context(|| format!("failed to open {}", file.display()))
}

/// Accept type codes shorter than four characters by padding with spaces.
fn parse_type(code: &str) -> Result<ResType> {
    ResType::parse(&format!("{code:<4}")).with_context(|| format!("invalid resource type {code:?}"))
}

fn list<S: ByteSource>(archive: &Archive<S>, decode: &DecodeOptions) -> Result<()> {
    let metadata = DecodeOptions { metadata_only: true, ..*decode };
    for row in archive.summaries()? {
        print!("{}  {:>6}  {:>8}  {}", row.res_type, row.id, row.size, row.name.as_deref().unwrap_or(""));
        if matches!(row.res_type, ResType::SND | ResType::YSND) {
            match archive.decode_sound(row.res_type, row.id, &metadata) {
                Ok(s) if s.is_mp3 => print!("  [mp3 {} Hz]", s.sample_rate),
                Ok(s) => print!("  [{} Hz, {} ch, {}-bit]", s.sample_rate, s.num_channels, s.bits_per_sample),
                Err(e) => print!("  [{e}]"),
            }
        }
        println!();
    }
    Ok(())
}

fn export<S: ByteSource>(archive: &Archive<S>, out_dir: &Path, opts: &ExportOptions) -> Result<()> {
    let report = archive
        .export_all(out_dir, opts)
        .with_context(|| format!("export to {} failed", out_dir.display()))?;

    for path in &report.written {
        let is_wav = path.extension().is_some_and(|e| e == "wav");
        match std::fs::read(path).ok().filter(|_| is_wav).map(|b| inspect_wav(&b)) {
            Some(Ok(info)) => println!(
                "{}  ({} Hz, {} ch, {}-bit, {} bytes)",
                path.display(),
                info.sample_rate,
                info.num_channels,
                info.bits_per_sample,
                info.data_size
            ),
            _ => println!("{}", path.display()),
        }
    }
    for failure in &report.failed {
        eprintln!("{} #{}: {}", failure.res_type, failure.id, failure.error);
    }
    println!("{} written, {} failed", report.written.len(), report.failed.len());
    Ok(())
}
