/// Added to the norm so an all-zero vector divides cleanly.
pub const NORM_EPSILON: f32 = 1e-12;

/// L2 normalize a vector (unit length).
///
/// The zero vector maps to zeros instead of NaN. Squares are summed in `f64` so large
/// finite components do not overflow the norm.
#[must_use]
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm = v
        .iter()
        .map(|&x| f64::from(x) * f64::from(x))
        .sum::<f64>()
        .sqrt()
        + f64::from(NORM_EPSILON);
    v.iter().map(|&x| (f64::from(x) / norm) as f32).collect()
}
