//! Single-channel view.
//!
//! The selected channel keeps its value in its own slot; the other colour
//! slots take the source alpha, and output alpha is 255. Selecting R on a
//! pixel `(r, g, b, a)` gives `(r, a, a, 255)`; selecting A gives
//! `(a, a, a, 255)`. Translucent pixels thus show a tinted monochrome
//! rather than a pure single-channel mask.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array3, ArrayView3, Axis};
use rayon::prelude::*;

use crate::error::{ManipError, Result};

/// Which channel to isolate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelSelector {
    R,
    G,
    B,
    A,
}

impl ChannelSelector {
    pub fn index(self) -> usize {
        match self {
            ChannelSelector::R => 0,
            ChannelSelector::G => 1,
            ChannelSelector::B => 2,
            ChannelSelector::A => 3,
        }
    }
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelSelector::R => "r",
            ChannelSelector::G => "g",
            ChannelSelector::B => "b",
            ChannelSelector::A => "a",
        };
        f.write_str(name)
    }
}

impl FromStr for ChannelSelector {
    type Err = ManipError;

    /// Accepts `r`, `g`, `b`, `a` (either case) or the indices `0`..`3`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "r" | "R" | "0" => Ok(ChannelSelector::R),
            "g" | "G" | "1" => Ok(ChannelSelector::G),
            "b" | "B" | "2" => Ok(ChannelSelector::B),
            "a" | "A" | "3" => Ok(ChannelSelector::A),
            other => Err(ManipError::invalid(format!(
                "Channel has to be either r, g, b or a, got '{other}'"
            ))),
        }
    }
}

impl TryFrom<char> for ChannelSelector {
    type Error = ManipError;

    fn try_from(c: char) -> Result<Self> {
        c.to_string().parse()
    }
}

/// Isolate one channel of an RGBA u8 image.
///
/// # Arguments
/// * `input` - RGBA image (height, width, 4)
/// * `selector` - Channel to keep
///
/// # Returns
/// Image where the selected slot keeps its value, other colour slots hold
/// the source alpha and alpha is 255
pub fn channel_rgba_u8(input: ArrayView3<u8>, selector: ChannelSelector) -> Array3<u8> {
    let (height, width, channels) = input.dim();
    debug_assert_eq!(channels, 4);
    let mut output = Array3::<u8>::zeros((height, width, 4));
    let keep = selector.index();

    output
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(y, mut row)| {
            for x in 0..width {
                let alpha = input[[y, x, 3]];
                for c in 0..3 {
                    row[[x, c]] = if c == keep { input[[y, x, c]] } else { alpha };
                }
                row[[x, 3]] = 255;
            }
        });

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel() -> Array3<u8> {
        Array3::from_shape_vec((1, 1, 4), vec![10, 20, 30, 40]).unwrap()
    }

    fn rgba(img: &Array3<u8>) -> [u8; 4] {
        [img[[0, 0, 0]], img[[0, 0, 1]], img[[0, 0, 2]], img[[0, 0, 3]]]
    }

    #[test]
    fn test_each_selector() {
        let img = pixel();
        assert_eq!(rgba(&channel_rgba_u8(img.view(), ChannelSelector::R)), [10, 40, 40, 255]);
        assert_eq!(rgba(&channel_rgba_u8(img.view(), ChannelSelector::G)), [40, 20, 40, 255]);
        assert_eq!(rgba(&channel_rgba_u8(img.view(), ChannelSelector::B)), [40, 40, 30, 255]);
        assert_eq!(rgba(&channel_rgba_u8(img.view(), ChannelSelector::A)), [40, 40, 40, 255]);
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!("r".parse::<ChannelSelector>().unwrap(), ChannelSelector::R);
        assert_eq!("B".parse::<ChannelSelector>().unwrap(), ChannelSelector::B);
        assert_eq!("3".parse::<ChannelSelector>().unwrap(), ChannelSelector::A);
        assert_eq!(ChannelSelector::try_from('g').unwrap(), ChannelSelector::G);
    }

    #[test]
    fn test_unknown_selector_rejected() {
        let err = "x".parse::<ChannelSelector>().unwrap_err();
        assert!(matches!(err, ManipError::InvalidArgument(_)));
        assert!("4".parse::<ChannelSelector>().is_err());
        assert!("".parse::<ChannelSelector>().is_err());
    }
}
