//! Desaturation and grayscale conversion.
//!
//! Each colour channel moves toward a weighted average of R, G and B by a
//! percentage: `out = round(in + (avg - in) * percentage / 100)`. At 100%
//! every channel equals the average (grayscale); at 0% the image is copied
//! unchanged. Alpha is preserved.

use ndarray::{Array3, ArrayView3, Axis};
use rayon::prelude::*;

/// RGB weights for the channel average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    /// `[1/3, 1/3, 1/3]`
    #[default]
    Uniform,
    /// `[0.3, 0.4, 0.3]`, closer to perceived brightness.
    Human,
}

impl Weighting {
    pub fn from_human(human: bool) -> Self {
        if human {
            Weighting::Human
        } else {
            Weighting::Uniform
        }
    }

    pub fn weights(self) -> [f64; 3] {
        match self {
            Weighting::Uniform => [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0],
            Weighting::Human => [0.3, 0.4, 0.3],
        }
    }
}

/// Desaturation amount, clamped to `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Percentage(u8);

impl Percentage {
    pub const FULL: Percentage = Percentage(100);

    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, 100) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Desaturate an RGBA u8 image.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `percentage` - 0 = unchanged, 100 = grayscale
/// * `weighting` - Average weights
///
/// # Returns
/// Desaturated image, alpha preserved
pub fn desaturate_rgba_u8(
    input: ArrayView3<u8>,
    percentage: Percentage,
    weighting: Weighting,
) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    debug_assert_eq!(channels, 4);
    let mut output = Array3::<u8>::zeros((height, width, 4));

    let weights = weighting.weights();
    let amount = percentage.get() as f64;
    let full = percentage == Percentage::FULL;

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let avg: f64 = (0..3).map(|c| input[[y, x, c]] as f64 * weights[c]).sum();
                if full {
                    // one rounding for all three slots keeps R = G = B
                    let gray = avg.round().clamp(0.0, 255.0) as u8;
                    for c in 0..3 {
                        row[[x, c]] = gray;
                    }
                } else {
                    for c in 0..3 {
                        let v = input[[y, x, c]] as f64;
                        let out = v + (avg - v) / 100.0 * amount;
                        row[[x, c]] = out.round().clamp(0.0, 255.0) as u8;
                    }
                }
                row[[x, 3]] = input[[y, x, 3]];
            }
        });

    output
}

/// Full desaturation: `desaturate_rgba_u8(input, 100%, weighting)`.
pub fn grayscale_rgba_u8(input: ArrayView3<u8>, weighting: Weighting) -> Array3<u8> {
    desaturate_rgba_u8(input, Percentage::FULL, weighting)
}
