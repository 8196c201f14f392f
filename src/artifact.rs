use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, SpriteError};

/// One embedded sprite, as consumed by the similarity-search frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub key: String,
    pub name: String,
    /// May be empty; the consumer can still display the sprite via its own manifest.
    pub src: String,
    pub vec: Vec<f32>,
}

/// Summary of a written artifact.
#[derive(Debug, Clone)]
pub struct ArtifactSummary {
    pub path: PathBuf,
    pub record_count: usize,
    /// Embedding length of the first record (0 when empty)
    pub dimension: usize,
    pub byte_len: usize,
    /// Blake3 checksum of the written bytes
    pub checksum: [u8; 32],
}

impl ArtifactSummary {
    #[must_use]
    pub fn checksum_hex(&self) -> String {
        blake3::Hash::from(self.checksum).to_hex().to_string()
    }
}

/// Serialize records as a compact JSON array.
pub fn encode_records(records: &[OutputRecord]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(records)?)
}

/// Write the artifact, replacing any existing file.
///
/// Parent directories are created. The bytes go to a sibling temporary file that is
/// renamed over `path`, so readers never observe a partial array.
pub fn write_artifact(path: &Path, records: &[OutputRecord]) -> Result<ArtifactSummary> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SpriteError::io_at(e, parent))?;
    }

    let bytes = encode_records(records)?;
    let tmp = tmp_path(path);
    if let Err(err) = std::fs::write(&tmp, &bytes) {
        let _ = std::fs::remove_file(&tmp);
        return Err(SpriteError::io_at(err, &tmp));
    }
    if let Err(err) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(SpriteError::io_at(err, path));
    }

    Ok(ArtifactSummary {
        path: path.to_path_buf(),
        record_count: records.len(),
        dimension: records.first().map_or(0, |r| r.vec.len()),
        byte_len: bytes.len(),
        checksum: *blake3::hash(&bytes).as_bytes(),
    })
}

/// Read an artifact back.
pub fn read_artifact(path: &Path) -> Result<Vec<OutputRecord>> {
    let data = std::fs::read(path).map_err(|e| SpriteError::io_at(e, path))?;
    Ok(serde_json::from_slice(&data)?)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
