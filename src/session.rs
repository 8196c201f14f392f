//! Model boundary: a loaded vision encoder that can be queried for its declared
//! tensor names and run synchronously on one input tensor.

use std::path::Path;

use ndarray::{Array4, ArrayD};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use crate::{Result, SpriteError};

/// Synchronous inference session for a single-input vision encoder.
///
/// The session is loaded once and reused for every image in a run.
pub trait VisionSession {
    /// Declared input names, in declaration order.
    fn input_names(&self) -> Vec<String>;

    /// Declared output names, in declaration order.
    fn output_names(&self) -> Vec<String>;

    /// Feed `input` under `input_name` and return the requested outputs in the order
    /// of `output_names`.
    fn run(
        &mut self,
        output_names: &[&str],
        input_name: &str,
        input: Array4<f32>,
    ) -> Result<Vec<ArrayD<f32>>>;
}

/// ONNX Runtime backed [`VisionSession`].
pub struct OrtVisionSession {
    session: Session,
}

impl OrtVisionSession {
    /// Load an ONNX model from disk.
    pub fn load(model_path: &Path, intra_threads: usize) -> Result<Self> {
        if !model_path.is_file() {
            return Err(SpriteError::ModelNotFound {
                path: model_path.to_path_buf(),
            });
        }

        tracing::debug!(path = %model_path.display(), "Loading vision model");

        let session = Session::builder()
            .map_err(|e| SpriteError::Inference {
                cause: format!("Failed to create session builder: {}", e),
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| SpriteError::Inference {
                cause: format!("Failed to set optimization level: {}", e),
            })?
            .with_intra_threads(intra_threads)
            .map_err(|e| SpriteError::Inference {
                cause: format!("Failed to set intra threads: {}", e),
            })?
            .commit_from_file(model_path)
            .map_err(|e| SpriteError::Inference {
                cause: format!("Failed to load vision model: {}", e),
            })?;

        let loaded = Self { session };
        tracing::info!(
            path = %model_path.display(),
            inputs = ?loaded.input_names(),
            outputs = ?loaded.output_names(),
            "Vision model loaded"
        );

        Ok(loaded)
    }
}

impl VisionSession for OrtVisionSession {
    fn input_names(&self) -> Vec<String> {
        self.session.inputs.iter().map(|i| i.name.clone()).collect()
    }

    fn output_names(&self) -> Vec<String> {
        self.session.outputs.iter().map(|o| o.name.clone()).collect()
    }

    fn run(
        &mut self,
        output_names: &[&str],
        input_name: &str,
        input: Array4<f32>,
    ) -> Result<Vec<ArrayD<f32>>> {
        let input_tensor = Tensor::from_array(input).map_err(|e| SpriteError::Inference {
            cause: format!("Failed to create input tensor: {}", e),
        })?;

        let outputs = self
            .session
            .run(ort::inputs![input_name => input_tensor])
            .map_err(|e| SpriteError::Inference {
                cause: format!("Vision inference failed: {}", e),
            })?;

        output_names
            .iter()
            .map(|name| {
                let output = outputs.get(*name).ok_or_else(|| SpriteError::Inference {
                    cause: format!("No output '{}' from vision model", name),
                })?;
                let array = output
                    .try_extract_array::<f32>()
                    .map_err(|e| SpriteError::Inference {
                        cause: format!("Failed to extract output '{}': {}", name, e),
                    })?;
                Ok(array.to_owned())
            })
            .collect()
    }
}
