//! Box blur over an RGBA raster.
//!
//! The kernel is a square of side `radius + 1` centred on the pixel, every
//! tap weighted `1 / (radius + 1)²`. Taps are addressed by flat pixel
//! offset, so a tap that runs off the left or right edge of a row reads the
//! neighbouring row. A tap whose offset falls outside the raster entirely
//! reads white (255) for each colour channel instead of being skipped or
//! clamped. Pixels within `radius / 2` rows of the top or bottom therefore
//! pick up a bright fringe. Output alpha is always 255.

use ndarray::{Array3, ArrayView3, Axis};
use rayon::prelude::*;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ManipError, Result};

/// Value read for taps outside the raster.
pub const OUT_OF_RANGE_TAP: u8 = 255;

/// Validated blur radius: positive and even, so the kernel reaches
/// `radius / 2` samples on each side of the centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlurRadius(u32);

impl BlurRadius {
    /// # Errors
    /// `InvalidArgument` for zero or odd radii.
    pub fn new(radius: u32) -> Result<Self> {
        if radius == 0 {
            return Err(ManipError::invalid("Blur radius is required and must be positive"));
        }
        if radius % 2 != 0 {
            return Err(ManipError::invalid(format!(
                "Blur radius needs to be even, got {radius}"
            )));
        }
        Ok(Self(radius))
    }

    /// Validate, then emit [`Diagnostic::LargeBlurRadius`] if `radius > large_radius`.
    pub fn checked(radius: u32, large_radius: u32, diagnostics: &mut Diagnostics) -> Result<Self> {
        let radius = Self::new(radius)?;
        if radius.0 > large_radius {
            diagnostics.emit(Diagnostic::LargeBlurRadius { radius: radius.0 });
        }
        Ok(radius)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    fn half(self) -> i64 {
        (self.0 / 2) as i64
    }

    fn taps(self) -> u32 {
        (self.0 + 1) * (self.0 + 1)
    }
}

/// Blur an RGBA u8 image.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `radius` - Validated even radius
///
/// # Returns
/// Blurred image of the same shape, alpha forced to 255
pub fn blur_rgba_u8(input: ArrayView3<u8>, radius: BlurRadius) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    debug_assert_eq!(channels, 4);
    let mut output = Array3::<u8>::zeros((height, width, 4));

    let len = (height * width) as i64;
    let w = width as i64;
    let half = radius.half();
    let weight = 1.0 / radius.taps() as f64;

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let id = (y * width + x) as i64;
                let mut acc = [0.0f64; 3];

                for ky in -half..=half {
                    for kx in -half..=half {
                        let tap = id - (w * ky + kx);
                        for (c, sum) in acc.iter_mut().enumerate() {
                            let value = if (0..len).contains(&tap) {
                                input[[(tap / w) as usize, (tap % w) as usize, c]]
                            } else {
                                OUT_OF_RANGE_TAP
                            };
                            *sum += value as f64;
                        }
                    }
                }

                for (c, sum) in acc.iter().enumerate() {
                    row[[x, c]] = (sum * weight).round().clamp(0.0, 255.0) as u8;
                }
                row[[x, 3]] = 255;
            }
        });

    output
}
