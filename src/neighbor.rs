//! Directional neighbour addressing on a flat raster.
//!
//! A [`CompassAngle`] picks one of the eight neighbours of a pixel. Angles
//! run clockwise in screen space starting at "right": 0 = right, 90 = down,
//! 180 = left, 270 = up.
//!
//! A neighbour is found by adding a per-angle delta to the flat pixel id.
//! Adding deltas alone is wrong at the raster edges: stepping right from
//! the last column lands on the first pixel of the next row. The row of the
//! candidate is therefore checked against the row the step should land on,
//! and any mismatch (or an index outside the raster) yields no neighbour.

use std::fmt;

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{ManipError, Result};

/// One of the eight 45° directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompassAngle {
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    Up,
    UpRight,
}

impl CompassAngle {
    pub const ALL: [CompassAngle; 8] = [
        CompassAngle::Right,
        CompassAngle::DownRight,
        CompassAngle::Down,
        CompassAngle::DownLeft,
        CompassAngle::Left,
        CompassAngle::UpLeft,
        CompassAngle::Up,
        CompassAngle::UpRight,
    ];

    pub fn degrees(self) -> u16 {
        match self {
            CompassAngle::Right => 0,
            CompassAngle::DownRight => 45,
            CompassAngle::Down => 90,
            CompassAngle::DownLeft => 135,
            CompassAngle::Left => 180,
            CompassAngle::UpLeft => 225,
            CompassAngle::Up => 270,
            CompassAngle::UpRight => 315,
        }
    }

    /// Column and row step `(dx, dy)`.
    pub fn step(self) -> (i64, i64) {
        match self {
            CompassAngle::Right => (1, 0),
            CompassAngle::DownRight => (1, 1),
            CompassAngle::Down => (0, 1),
            CompassAngle::DownLeft => (-1, 1),
            CompassAngle::Left => (-1, 0),
            CompassAngle::UpLeft => (-1, -1),
            CompassAngle::Up => (0, -1),
            CompassAngle::UpRight => (1, -1),
        }
    }

    /// Flat-index delta for a raster of the given width.
    ///
    /// `{0: +1, 45: w+1, 90: w, 135: w-1, 180: -1, 225: -(w+1), 270: -w, 315: -(w-1)}`
    pub fn delta(self, width: u32) -> i64 {
        let (dx, dy) = self.step();
        dy * width as i64 + dx
    }

    /// Snap an arbitrary angle to the nearest 45° axis.
    ///
    /// Returns the axis and whether the input was already canonical.
    /// Negative and ≥360 inputs wrap first (`-90` is `270`, `405` is `45`).
    pub fn snap(angle: i32) -> (CompassAngle, bool) {
        let wrapped = angle.rem_euclid(360);
        // round half up, like nearest-axis rounding on positive values
        let sector = ((wrapped * 2 + 45) / 90) % 8;
        (CompassAngle::ALL[sector as usize], wrapped % 45 == 0)
    }

    /// Snap `angle`, emitting [`Diagnostic::NonCanonicalAngle`] when it had to move.
    pub fn normalize(angle: i32, diagnostics: &mut Diagnostics) -> CompassAngle {
        let (axis, canonical) = Self::snap(angle);
        if !canonical {
            diagnostics.emit(Diagnostic::NonCanonicalAngle {
                requested: angle,
                snapped: axis.degrees(),
            });
        }
        axis
    }
}

impl fmt::Display for CompassAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl TryFrom<u16> for CompassAngle {
    type Error = ManipError;

    /// Exact conversion; only multiples of 45 below 360 are accepted.
    fn try_from(degrees: u16) -> Result<Self> {
        if degrees % 45 != 0 || degrees >= 360 {
            return Err(ManipError::invalid(format!(
                "angle {degrees} is not one of 0, 45, ..., 315"
            )));
        }
        Ok(CompassAngle::ALL[(degrees / 45) as usize])
    }
}

/// Neighbour of pixel `id` in direction `angle`, or `None` at the raster edge.
pub fn neighbor(id: usize, angle: CompassAngle, width: u32, height: u32) -> Option<usize> {
    if width == 0 {
        return None;
    }
    let w = width as i64;
    let len = w * height as i64;
    let origin = id as i64;
    if origin >= len {
        return None;
    }

    let candidate = origin + angle.delta(width);
    if candidate < 0 || candidate >= len {
        return None;
    }

    // A step must land exactly one row up, one row down, or on the same row.
    let (_, dy) = angle.step();
    if candidate / w - origin / w != dy {
        return None;
    }
    Some(candidate as usize)
}

/// [`neighbor`] for an arbitrary angle, snapped to the nearest axis.
pub fn neighbor_at(
    id: usize,
    angle: i32,
    width: u32,
    height: u32,
    diagnostics: &mut Diagnostics,
) -> Option<usize> {
    let axis = CompassAngle::normalize(angle, diagnostics);
    neighbor(id, axis, width, height)
}
