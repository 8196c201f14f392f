#![allow(dead_code)]

use std::path::Path;

use image::{Rgb, RgbImage};
use ndarray::{Array4, ArrayD, IxDyn};
use spritevec::{Result, VisionSession};

pub type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Layout the scripted session reports for its single output.
#[derive(Debug, Clone, Copy)]
pub enum OutputLayout {
    /// `[1, D]`
    Pooled,
    /// `[1, T, D]` with the signal at token 0
    Tokens(usize),
    /// `[D]`
    Flat,
    /// `[1, 1, 1, D]`
    Rank4,
}

/// In-memory encoder whose embedding is a deterministic function of the tensor.
pub struct ScriptedSession {
    pub dims: usize,
    pub layout: OutputLayout,
    pub outputs: Vec<String>,
    pub calls: usize,
}

impl ScriptedSession {
    pub fn new(dims: usize, layout: OutputLayout) -> Self {
        Self {
            dims,
            layout,
            outputs: vec!["last_hidden_state".to_string(), "pooled_output".to_string()],
            calls: 0,
        }
    }

    fn signal(&self, input: &Array4<f32>) -> Vec<f32> {
        let means: Vec<f32> = (0..3)
            .map(|c| input.index_axis(ndarray::Axis(1), c).mean().unwrap_or(0.0))
            .collect();
        (0..self.dims)
            .map(|i| means[i % 3] * (i as f32 + 1.0) + 0.5)
            .collect()
    }
}

impl VisionSession for ScriptedSession {
    fn input_names(&self) -> Vec<String> {
        vec!["pixel_values".to_string()]
    }

    fn output_names(&self) -> Vec<String> {
        self.outputs.clone()
    }

    fn run(
        &mut self,
        output_names: &[&str],
        _input_name: &str,
        input: Array4<f32>,
    ) -> Result<Vec<ArrayD<f32>>> {
        self.calls += 1;
        let signal = self.signal(&input);
        let d = self.dims;

        let output = match self.layout {
            OutputLayout::Pooled => ArrayD::from_shape_vec(IxDyn(&[1, d]), signal),
            OutputLayout::Tokens(t) => {
                let mut data = signal;
                data.resize(t * d, -3.0);
                ArrayD::from_shape_vec(IxDyn(&[1, t, d]), data)
            }
            OutputLayout::Flat => ArrayD::from_shape_vec(IxDyn(&[d]), signal),
            OutputLayout::Rank4 => ArrayD::from_shape_vec(IxDyn(&[1, 1, 1, d]), signal),
        }
        .expect("shape matches data");

        Ok(output_names.iter().map(|_| output.clone()).collect())
    }
}

/// Write a small gradient PNG whose colors depend on `seed`.
pub fn write_sprite(path: &Path, width: u32, height: u32, seed: u8) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create sprite dir");
    }
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            seed.wrapping_mul(17).wrapping_add(x as u8),
            seed.wrapping_mul(31).wrapping_add(y as u8),
            seed.wrapping_mul(7),
        ])
    });
    image.save(path).expect("write sprite");
}

pub fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}
