//! Directional brightness maps.
//!
//! Detects sudden brightness changes along a compass direction. The input
//! is expected to be grayscale (R = G = B), so the R channel is the
//! luminance. Each pixel is compared with its neighbour in the scanned
//! direction: `difference = neighbour.R - pixel.R`.
//!
//! A sudden step is attributed to the pixel it lands on, the neighbour,
//! where the brightness jumps. Pixels at the raster edge in the scanned
//! direction are classified [`Classification::NoNeighbor`] and are never
//! marked. On a 4×1 ramp `0, 100, 200, 255` scanned at 0° with threshold 50
//! the steps land on ids 1, 2 and 3; id 3 is the right edge, so the map is
//! `{1: {0°: 100}, 2: {0°: 100}}`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::buffer::RasterBuffer;
use crate::error::{ManipError, Result};
use crate::neighbor::{neighbor, CompassAngle};

/// Per-pixel outcome of a directional scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Neighbour exists and `|difference| >= threshold`.
    Sudden { neighbor: usize, difference: i16 },
    /// Neighbour exists and `|difference| < threshold`.
    Stable { neighbor: usize, difference: i16 },
    /// Pixel sits on the raster edge in the scanned direction.
    NoNeighbor,
}

/// Validated brightness threshold in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold(u8);

impl Threshold {
    /// # Errors
    /// `InvalidArgument` outside `0..=255`.
    pub fn new(value: i32) -> Result<Self> {
        u8::try_from(value)
            .map(Threshold)
            .map_err(|_| ManipError::invalid(format!("threshold must be in 0..=255, got {value}")))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Check a scan angle is in `0..=359`.
pub fn validate_angle(angle: i32) -> Result<i32> {
    if (0..360).contains(&angle) {
        Ok(angle)
    } else {
        Err(ManipError::invalid(format!("angle must be in 0..=359, got {angle}")))
    }
}

/// Sparse map: pixel id -> (direction -> signed brightness difference).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GradientMap {
    cells: BTreeMap<usize, BTreeMap<CompassAngle, i16>>,
}

impl GradientMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: usize, angle: CompassAngle, difference: i16) {
        self.cells.entry(id).or_default().insert(angle, difference);
    }

    pub fn get(&self, id: usize) -> Option<&BTreeMap<CompassAngle, i16>> {
        self.cells.get(&id)
    }

    pub fn difference(&self, id: usize, angle: CompassAngle) -> Option<i16> {
        self.cells.get(&id)?.get(&angle).copied()
    }

    pub fn contains(&self, id: usize) -> bool {
        self.cells.contains_key(&id)
    }

    /// Number of marked pixels.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &BTreeMap<CompassAngle, i16>)> {
        self.cells.iter().map(|(&id, dirs)| (id, dirs))
    }

    /// Fold another map in; entries for the same pixel and angle are overwritten.
    pub fn merge(&mut self, other: GradientMap) {
        for (id, dirs) in other.cells {
            self.cells.entry(id).or_default().extend(dirs);
        }
    }

    /// Plain nested representation, keyed by angle in degrees.
    pub fn to_degrees(&self) -> BTreeMap<usize, BTreeMap<u16, i16>> {
        self.cells
            .iter()
            .map(|(&id, dirs)| (id, dirs.iter().map(|(a, &d)| (a.degrees(), d)).collect()))
            .collect()
    }
}

/// Classify every pixel of a grayscale buffer in raster order.
///
/// `on_pixel` is called once per pixel id with its classification.
pub fn scan<F>(luma: &RasterBuffer, threshold: Threshold, angle: CompassAngle, mut on_pixel: F)
where
    F: FnMut(usize, Classification),
{
    let (width, height) = (luma.width(), luma.height());
    let data = luma.as_array();
    let w = width as usize;
    let level = |id: usize| data[[id / w, id % w, 0]] as i16;

    for id in 0..luma.pixel_count() {
        let class = match neighbor(id, angle, width, height) {
            None => Classification::NoNeighbor,
            Some(n) => {
                let difference = level(n) - level(id);
                if difference.unsigned_abs() >= threshold.get() as u16 {
                    Classification::Sudden { neighbor: n, difference }
                } else {
                    Classification::Stable { neighbor: n, difference }
                }
            }
        };
        on_pixel(id, class);
    }
}

/// Map of sudden brightness steps in one direction.
pub fn build_map(luma: &RasterBuffer, threshold: Threshold, angle: CompassAngle) -> GradientMap {
    let (width, height) = (luma.width(), luma.height());
    let mut map = GradientMap::new();

    scan(luma, threshold, angle, |_, class| {
        if let Classification::Sudden { neighbor: landing, difference } = class {
            if neighbor(landing, angle, width, height).is_some() {
                map.insert(landing, angle, difference);
            }
        }
    });

    debug!(
        angle = angle.degrees(),
        threshold = threshold.get(),
        marked = map.len(),
        "gradient map built"
    );
    map
}

/// Sweeps several fixed directions and merges the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrightnessScaleMapper {
    angles: Vec<CompassAngle>,
}

impl Default for BrightnessScaleMapper {
    /// Right, down-right, down and left.
    fn default() -> Self {
        Self {
            angles: vec![
                CompassAngle::Right,
                CompassAngle::DownRight,
                CompassAngle::Down,
                CompassAngle::Left,
            ],
        }
    }
}

impl BrightnessScaleMapper {
    pub fn with_angles(angles: Vec<CompassAngle>) -> Self {
        Self { angles }
    }

    pub fn angles(&self) -> &[CompassAngle] {
        &self.angles
    }

    pub fn sweep(&self, luma: &RasterBuffer, threshold: Threshold) -> GradientMap {
        let mut merged = GradientMap::new();
        for &angle in &self.angles {
            merged.merge(build_map(luma, threshold, angle));
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> RasterBuffer {
        RasterBuffer::from_pixels(
            4,
            1,
            &[
                (0, 0, 0, 255),
                (100, 100, 100, 255),
                (200, 200, 200, 255),
                (255, 255, 255, 255),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_threshold_range() {
        assert!(Threshold::new(-1).is_err());
        assert!(Threshold::new(256).is_err());
        assert_eq!(Threshold::new(255).unwrap().get(), 255);
    }

    #[test]
    fn test_angle_range() {
        assert!(validate_angle(-1).is_err());
        assert!(validate_angle(360).is_err());
        assert_eq!(validate_angle(359).unwrap(), 359);
    }

    #[test]
    fn test_scan_classifies_ramp() {
        let mut seen = Vec::new();
        scan(&ramp(), Threshold::new(50).unwrap(), CompassAngle::Right, |id, c| seen.push((id, c)));

        assert_eq!(
            seen,
            vec![
                (0, Classification::Sudden { neighbor: 1, difference: 100 }),
                (1, Classification::Sudden { neighbor: 2, difference: 100 }),
                (2, Classification::Sudden { neighbor: 3, difference: 55 }),
                (3, Classification::NoNeighbor),
            ]
        );
    }

    #[test]
    fn test_scan_stable_below_threshold() {
        let mut stable = 0;
        scan(&ramp(), Threshold::new(101).unwrap(), CompassAngle::Right, |_, c| {
            if matches!(c, Classification::Stable { .. }) {
                stable += 1;
            }
        });
        assert_eq!(stable, 3);
    }

    #[test]
    fn test_build_map_excludes_edge_landing() {
        let map = build_map(&ramp(), Threshold::new(50).unwrap(), CompassAngle::Right);
        let expected = BTreeMap::from([
            (1usize, BTreeMap::from([(0u16, 100i16)])),
            (2, BTreeMap::from([(0, 100)])),
        ]);
        assert_eq!(map.to_degrees(), expected);
        assert!(!map.contains(3));
    }

    #[test]
    fn test_negative_difference_leftward() {
        let map = build_map(&ramp(), Threshold::new(50).unwrap(), CompassAngle::Left);
        // steps 3->2 (-55), 2->1 (-100), 1->0 (-100); id 0 is the left edge
        assert_eq!(map.difference(2, CompassAngle::Left), Some(-55));
        assert_eq!(map.difference(1, CompassAngle::Left), Some(-100));
        assert!(!map.contains(0));
    }

    #[test]
    fn test_sweep_merges_directions() {
        let map = BrightnessScaleMapper::default().sweep(&ramp(), Threshold::new(50).unwrap());
        assert_eq!(map.difference(1, CompassAngle::Right), Some(100));
        assert_eq!(map.difference(1, CompassAngle::Left), Some(-100));
        assert_eq!(map.get(2).map(|d| d.len()), Some(2));
        // single row: no vertical or diagonal neighbours
        assert!(map.iter().all(|(_, d)| !d.contains_key(&CompassAngle::Down)));
    }

    #[test]
    fn test_merge_overwrites_same_angle() {
        let mut a = GradientMap::new();
        a.insert(5, CompassAngle::Down, 10);
        let mut b = GradientMap::new();
        b.insert(5, CompassAngle::Down, -20);
        b.insert(5, CompassAngle::Up, 30);
        a.merge(b);
        assert_eq!(a.difference(5, CompassAngle::Down), Some(-20));
        assert_eq!(a.get(5).unwrap().len(), 2);
    }
}
