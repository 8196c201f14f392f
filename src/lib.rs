//! Precompute unit-norm visual embeddings for a folder of sprite images.
//!
//! The pipeline per file is: derive a key from the filename, resolve display
//! metadata from an optional cache, decode and preprocess the image, run the vision
//! encoder, L2-normalize. [`batch::run_batch`] drives it over a sorted file list and
//! isolates per-file failures.

pub mod artifact;
pub mod batch;
pub mod config;
pub mod discover;
pub mod encoder;
mod error;
pub mod logging;
pub mod metadata;
pub mod normalize;
pub mod preprocess;
pub mod session;

pub use artifact::{ArtifactSummary, OutputRecord, read_artifact, write_artifact};
pub use batch::{BatchReport, ItemFailure, ItemOutcome, run_batch};
pub use config::{EmbedConfig, PreprocessProfile};
pub use discover::discover_images;
pub use encoder::VisionEncoder;
pub use error::{Result, SpriteError};
pub use metadata::{CacheEntry, MetadataCache, ResolvedMetadata, resolve};
pub use normalize::l2_normalize;
pub use preprocess::Preprocessor;
pub use session::{OrtVisionSession, VisionSession};
