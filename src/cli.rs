use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "spritevec")]
#[command(about = "Precompute image embeddings for a local sprite folder", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Sprite root (recursively scanned).
    #[arg(long, alias = "sprites_dir")]
    pub(crate) sprites_dir: PathBuf,

    /// Vision encoder ONNX model (float32).
    #[arg(long)]
    pub(crate) onnx: PathBuf,

    /// Output JSON file (overwritten).
    #[arg(long, alias = "out_json")]
    pub(crate) out_json: PathBuf,

    /// Optional metadata cache to copy name/src from.
    #[arg(long, alias = "drive_cache")]
    pub(crate) drive_cache: Option<PathBuf>,

    /// Only embed the first N files (0 = all).
    #[arg(long, default_value_t = 0)]
    pub(crate) limit: usize,

    /// Preprocessing profile: clip | siglip | imagenet
    #[arg(long)]
    pub(crate) profile: Option<String>,

    /// ONNX Runtime intra-op threads
    #[arg(long)]
    pub(crate) intra_threads: Option<usize>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    pub(crate) verbose: bool,
}
