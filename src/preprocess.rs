//! Deterministic image → tensor transform for the vision encoder.
//!
//! - Convert to RGB (grayscale replicated, alpha dropped)
//! - Resize so the shortest side is S, preserving aspect, then center-crop S×S
//! - Scale to [0, 1], normalize per channel with the profile's mean/std
//! - Emit NCHW layout `[1, 3, S, S]`

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;

use crate::config::{PreprocessProfile, default_profile};
use crate::{Result, SpriteError};

/// Image preprocessor bound to one normalization profile.
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    profile: &'static PreprocessProfile,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(default_profile())
    }
}

impl Preprocessor {
    #[must_use]
    pub fn new(profile: &'static PreprocessProfile) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn profile(&self) -> &'static PreprocessProfile {
        self.profile
    }

    /// Side length of the produced tensor.
    #[must_use]
    pub fn input_size(&self) -> u32 {
        self.profile.input_size
    }

    /// Turn an image into a normalized `[1, 3, S, S]` tensor.
    pub fn prepare(&self, image: &DynamicImage) -> Result<Array4<f32>> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SpriteError::InvalidImage { width, height });
        }

        let size = self.profile.input_size;
        let cropped = resize_center_crop(&image.to_rgb8(), size);

        let side = size as usize;
        let mut array = Array4::<f32>::zeros((1, 3, side, side));
        let PreprocessProfile { mean, std, .. } = self.profile;

        for (x, y, pixel) in cropped.enumerate_pixels() {
            let (x, y) = (x as usize, y as usize);
            for c in 0..3 {
                let value = f32::from(pixel[c]) / 255.0;
                array[[0, c, y, x]] = (value - mean[c]) / std[c];
            }
        }

        Ok(array)
    }
}

/// Target dimensions after scaling so both sides cover `size`.
///
/// `round` is half-to-even so boundary cases land on the same pixel counts as the
/// Python imaging stack the artifacts are compared against.
pub(crate) fn scaled_dimensions(width: u32, height: u32, size: u32) -> (u32, u32) {
    let target = f64::from(size);
    let scale = (target / f64::from(width)).max(target / f64::from(height));
    let new_w = (f64::from(width) * scale).round_ties_even() as u32;
    let new_h = (f64::from(height) * scale).round_ties_even() as u32;
    (new_w.max(size), new_h.max(size))
}

fn resize_center_crop(rgb: &RgbImage, size: u32) -> RgbImage {
    let (w, h) = rgb.dimensions();
    let (new_w, new_h) = scaled_dimensions(w, h, size);
    let resized = imageops::resize(rgb, new_w, new_h, FilterType::CatmullRom);

    let left = (new_w - size) / 2;
    let top = (new_h - size) / 2;
    imageops::crop_imm(&resized, left, top, size, size).to_image()
}
