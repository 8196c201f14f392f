//! Inference adapter: binds a [`VisionSession`]'s tensor names and reduces whatever
//! the encoder emits to one embedding per image.

use image::DynamicImage;
use ndarray::{Array4, ArrayD, Axis};

use crate::normalize::l2_normalize;
use crate::preprocess::Preprocessor;
use crate::session::VisionSession;
use crate::{Result, SpriteError};

/// Output names tried in order before falling back to the first declared output.
pub const PREFERRED_OUTPUTS: &[&str] = &["pooled_output", "output", "last_hidden_state"];

/// Pick the output to read: first preferred name that is declared, else the first
/// declared output.
#[must_use]
pub fn select_output_name(declared: &[String]) -> Option<&str> {
    PREFERRED_OUTPUTS
        .iter()
        .find_map(|pref| declared.iter().find(|name| name == pref))
        .or_else(|| declared.first())
        .map(String::as_str)
}

/// Reduce a model output to a single vector.
///
/// - `[1, D]`: row 0
/// - `[1, T, D]`: token 0 of row 0 (the pooled/CLS position)
pub fn extract_embedding(output: &ArrayD<f32>) -> Result<Vec<f32>> {
    let shape = output.shape();
    let leading_empty = shape.iter().take(shape.len().saturating_sub(1)).any(|&d| d == 0);

    let row = match output.ndim() {
        2 | 3 if !leading_empty => output.index_axis(Axis(0), 0),
        _ => {
            return Err(SpriteError::UnexpectedOutputShape {
                shape: shape.to_vec(),
            });
        }
    };
    let vector = if row.ndim() == 2 {
        row.index_axis(Axis(0), 0).iter().copied().collect()
    } else {
        row.iter().copied().collect()
    };

    Ok(vector)
}

/// A vision encoder bound to its input and output tensors.
pub struct VisionEncoder<S> {
    session: S,
    preprocessor: Preprocessor,
    input_name: String,
    output_name: String,
}

impl<S: VisionSession> VisionEncoder<S> {
    /// Bind to a loaded session, discovering the input and output names.
    pub fn new(session: S, preprocessor: Preprocessor) -> Result<Self> {
        let input_name = session
            .input_names()
            .into_iter()
            .next()
            .ok_or_else(|| SpriteError::ModelBinding {
                reason: "model declares no inputs".into(),
            })?;

        let outputs = session.output_names();
        let output_name = select_output_name(&outputs)
            .map(str::to_owned)
            .ok_or_else(|| SpriteError::ModelBinding {
                reason: "model declares no outputs".into(),
            })?;

        tracing::debug!(input = %input_name, output = %output_name, "bound vision encoder");

        Ok(Self {
            session,
            preprocessor,
            input_name,
            output_name,
        })
    }

    #[must_use]
    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    #[must_use]
    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    #[must_use]
    pub fn session(&self) -> &S {
        &self.session
    }

    #[must_use]
    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Run the encoder on a prepared tensor and return the raw (un-normalized) vector.
    pub fn embed(&mut self, tensor: Array4<f32>) -> Result<Vec<f32>> {
        let output_names = [self.output_name.as_str()];
        let outputs = self.session.run(&output_names, &self.input_name, tensor)?;

        let output = outputs.first().ok_or_else(|| SpriteError::Inference {
            cause: format!("No output '{}' from vision model", self.output_name),
        })?;

        let embedding = extract_embedding(output)?;
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(SpriteError::Inference {
                cause: "Vision embedding contains non-finite values".to_string(),
            });
        }
        Ok(embedding)
    }

    /// Preprocess, embed and normalize one image.
    pub fn embed_image(&mut self, image: &DynamicImage) -> Result<Vec<f32>> {
        let tensor = self.preprocessor.prepare(image)?;
        let raw = self.embed(tensor)?;
        let normalized = l2_normalize(&raw);

        tracing::trace!(dims = normalized.len(), "generated image embedding");

        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    struct FixedSession {
        inputs: Vec<String>,
        outputs: Vec<String>,
        reply: ArrayD<f32>,
        requested: Vec<String>,
    }

    impl FixedSession {
        fn new(outputs: &[&str], reply: ArrayD<f32>) -> Self {
            Self {
                inputs: vec!["pixel_values".to_string()],
                outputs: outputs.iter().map(|s| s.to_string()).collect(),
                reply,
                requested: Vec::new(),
            }
        }
    }

    impl VisionSession for FixedSession {
        fn input_names(&self) -> Vec<String> {
            self.inputs.clone()
        }

        fn output_names(&self) -> Vec<String> {
            self.outputs.clone()
        }

        fn run(
            &mut self,
            output_names: &[&str],
            _input_name: &str,
            _input: Array4<f32>,
        ) -> Result<Vec<ArrayD<f32>>> {
            self.requested = output_names.iter().map(|s| s.to_string()).collect();
            Ok(vec![self.reply.clone()])
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn ramp(shape: &[usize]) -> ArrayD<f32> {
        let len = shape.iter().product();
        ArrayD::from_shape_vec(IxDyn(shape), (0..len).map(|i| i as f32).collect()).unwrap()
    }

    #[test]
    fn output_preference_order() {
        let declared = names(&["last_hidden_state", "output", "pooled_output"]);
        assert_eq!(select_output_name(&declared), Some("pooled_output"));

        let declared = names(&["last_hidden_state", "output"]);
        assert_eq!(select_output_name(&declared), Some("output"));

        let declared = names(&["image_embeds", "last_hidden_state"]);
        assert_eq!(select_output_name(&declared), Some("last_hidden_state"));

        // no preferred name: positional fallback
        let declared = names(&["image_embeds", "logits"]);
        assert_eq!(select_output_name(&declared), Some("image_embeds"));

        assert_eq!(select_output_name(&[]), None);
    }

    #[test]
    fn binding_requires_inputs_and_outputs() {
        let mut session = FixedSession::new(&["out"], ramp(&[1, 4]));
        session.inputs.clear();
        let err = VisionEncoder::new(session, Preprocessor::default()).err().unwrap();
        assert!(matches!(err, SpriteError::ModelBinding { .. }));

        let session = FixedSession::new(&[], ramp(&[1, 4]));
        let err = VisionEncoder::new(session, Preprocessor::default()).err().unwrap();
        assert!(matches!(err, SpriteError::ModelBinding { .. }));
    }

    #[test]
    fn rank_two_takes_row_zero() {
        let output = ramp(&[1, 512]);
        let v = extract_embedding(&output).unwrap();
        assert_eq!(v.len(), 512);
        assert_eq!(v[0], 0.0);
        assert_eq!(v[511], 511.0);
    }

    #[test]
    fn rank_three_takes_first_token() {
        let output = ramp(&[1, 577, 512]);
        let v = extract_embedding(&output).unwrap();
        assert_eq!(v.len(), 512);
        let expected: Vec<f32> = (0..512).map(|i| i as f32).collect();
        assert_eq!(v, expected);
    }

    #[test]
    fn other_ranks_are_rejected() {
        for shape in [vec![512], vec![1, 1, 1, 512], vec![], vec![0, 512], vec![1, 0, 512]] {
            let output = ramp(&shape);
            let err = extract_embedding(&output).unwrap_err();
            match err {
                SpriteError::UnexpectedOutputShape { shape: got } => assert_eq!(got, shape),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn embed_reads_the_bound_output() {
        let session = FixedSession::new(&["last_hidden_state", "pooled_output"], ramp(&[1, 8]));
        let mut encoder = VisionEncoder::new(session, Preprocessor::default()).unwrap();
        assert_eq!(encoder.input_name(), "pixel_values");
        assert_eq!(encoder.output_name(), "pooled_output");

        let tensor = Array4::<f32>::zeros((1, 3, 224, 224));
        let raw = encoder.embed(tensor).unwrap();
        assert_eq!(raw, (0..8).map(|i| i as f32).collect::<Vec<_>>());
        assert_eq!(encoder.session.requested, vec!["pooled_output".to_string()]);
    }

    #[test]
    fn non_finite_output_is_an_error() {
        let mut reply = ramp(&[1, 4]);
        reply[[0, 2]] = f32::NAN;
        let session = FixedSession::new(&["output"], reply);
        let mut encoder = VisionEncoder::new(session, Preprocessor::default()).unwrap();
        let err = encoder.embed(Array4::zeros((1, 3, 224, 224))).unwrap_err();
        assert!(matches!(err, SpriteError::Inference { .. }));
    }

    #[test]
    fn embed_image_is_unit_norm() {
        let session = FixedSession::new(&["output"], ramp(&[1, 16]));
        let mut encoder = VisionEncoder::new(session, Preprocessor::default()).unwrap();
        let image = DynamicImage::new_rgb8(40, 20);
        let v = encoder.embed_image(&image).unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }
}
