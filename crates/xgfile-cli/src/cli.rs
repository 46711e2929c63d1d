//! Command-line arguments and the extraction run.
//!
//! Arguments can be provided via:
//! - CLI flags (`--temp-dir`, `--output-dir`, `--block-size`)
//! - Environment variables (`XGFILE_TEMP_DIR`, `XGFILE_OUTPUT_DIR`, `XGFILE_BLOCK_SIZE`)
//! - Default values

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use xgfile::config::DEFAULT_BLOCK_SIZE;
use xgfile::{ExtractConfig, Segment, SegmentExtractor, SegmentKind};

/// Split a game data file into its segments.
///
/// Prints `<kind>\t<path>` for every segment. Header and thumbnail
/// temporaries are removed on exit; archive entries stay in temporary
/// storage unless `--output-dir` is given, in which case every segment is
/// copied there and all temporaries are removed.
#[derive(Debug, Clone, Parser)]
#[command(name = "xgfile", version)]
pub struct Args {
    /// Game data file to split
    pub input: PathBuf,

    /// Directory for temporary segment files
    #[arg(long, env = "XGFILE_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Copy every segment into this directory as `<input-stem><suffix>`
    #[arg(long, env = "XGFILE_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Copy buffer size in bytes
    #[arg(long, env = "XGFILE_BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Print a JSON array instead of tab-separated lines
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Library settings derived from the arguments
    pub fn extract_config(&self) -> ExtractConfig {
        let config = ExtractConfig::default().with_block_size(self.block_size);
        match &self.temp_dir {
            Some(dir) => config.with_temp_dir(dir),
            None => config,
        }
    }
}

/// One printed segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    /// Segment classification
    pub kind: SegmentKind,
    /// Where the bytes can be found after the run
    pub path: PathBuf,
    /// Byte length
    pub size: u64,
}

/// File name for a segment written to the output directory
///
/// Unknown entries have no suffix of their own, so they are numbered.
pub fn output_name(stem: &str, kind: SegmentKind, index: usize) -> String {
    match kind {
        SegmentKind::Unknown => format!("{stem}_{index}.bin"),
        _ => format!("{stem}{}", kind.extension()),
    }
}

/// Extract the input, print the listing to `out` and return it
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<Vec<Listing>> {
    let config = args.extract_config();
    config.validate().context("invalid configuration")?;

    let segments = SegmentExtractor::new(config)
        .extract(&args.input)
        .with_context(|| format!("failed to extract {}", args.input.display()))?;

    let listings = match &args.output_dir {
        Some(dir) => write_out(&args.input, dir, segments)?,
        None => keep_in_place(segments)?,
    };

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &listings)?;
        writeln!(out)?;
    } else {
        for listing in &listings {
            writeln!(out, "{}\t{}", listing.kind, listing.path.display())?;
        }
    }
    Ok(listings)
}

fn keep_in_place(segments: Vec<Segment>) -> Result<Vec<Listing>> {
    let mut listings = Vec::with_capacity(segments.len());
    for segment in segments {
        let listing = Listing {
            kind: segment.kind(),
            path: segment.path().to_path_buf(),
            size: segment.len()?,
        };
        segment.release()?;
        listings.push(listing);
    }
    Ok(listings)
}

fn write_out(input: &Path, dir: &Path, segments: Vec<Segment>) -> Result<Vec<Listing>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let stem = input
        .file_stem()
        .map_or_else(|| "segment".into(), |s| s.to_string_lossy());

    let mut listings = Vec::with_capacity(segments.len());
    let mut failure = None;
    for (index, mut segment) in segments.into_iter().enumerate() {
        if failure.is_none() {
            let dest = dir.join(output_name(&stem, segment.kind(), index));
            match segment.copy_to(&dest) {
                Ok(size) => {
                    tracing::debug!("Wrote {} ({size} bytes)", dest.display());
                    listings.push(Listing {
                        kind: segment.kind(),
                        path: dest,
                        size,
                    });
                }
                Err(e) => {
                    failure = Some(
                        anyhow::Error::new(e)
                            .context(format!("failed to write {}", dest.display())),
                    );
                }
            }
        }
        if let Err(e) = segment.discard() {
            tracing::warn!("Failed to remove temporary segment: {e}");
        }
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(listings),
    }
}
