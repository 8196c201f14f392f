mod cli;

use clap::Parser;

use spritevec::logging::init_logging;
use spritevec::{
    EmbedConfig, MetadataCache, OrtVisionSession, Preprocessor, VisionEncoder, discover_images,
    run_batch, write_artifact,
};

use crate::cli::Cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.sprites_dir.exists() {
        eprintln!("Sprites dir not found: {}", cli.sprites_dir.display());
        std::process::exit(2);
    }
    if !cli.onnx.exists() {
        eprintln!("ONNX model not found: {}", cli.onnx.display());
        std::process::exit(2);
    }

    let config = EmbedConfig::default().with_overrides(cli.profile, cli.intra_threads);
    let profile = config.preprocess_profile();
    tracing::info!(
        profile = profile.name,
        input_size = profile.input_size,
        intra_threads = config.intra_threads,
        "embedding configuration"
    );

    let cache = match &cli.drive_cache {
        Some(path) => MetadataCache::load(path),
        None => MetadataCache::new(),
    };

    let session = OrtVisionSession::load(&cli.onnx, config.intra_threads)?;
    let mut encoder = VisionEncoder::new(session, Preprocessor::new(profile))?;

    let files = discover_images(&cli.sprites_dir, cli.limit);
    tracing::info!(root = %cli.sprites_dir.display(), files = files.len(), "embedding sprites");

    let report = run_batch(&files, &cache, &mut encoder);

    let summary = write_artifact(&cli.out_json, &report.records)?;
    println!(
        "Wrote {} embeddings (dim {}) -> {}",
        summary.record_count,
        summary.dimension,
        summary.path.display()
    );
    tracing::info!(
        bytes = summary.byte_len,
        blake3 = %summary.checksum_hex(),
        "artifact written"
    );

    if report.failure_count() > 0 {
        tracing::warn!(failures = report.failure_count(), "some files were skipped");
        println!("Skipped {} files due to errors.", report.failure_count());
    }

    Ok(())
}
