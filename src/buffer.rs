//! RGBA raster storage.
//!
//! Samples are held as an `(height, width, 4)` u8 array in R, G, B, A order,
//! the same layout the filters take as `ArrayView3<u8>`. Pixels are also
//! addressable by a flat id in raster order: `id = y * width + x`, whose
//! first sample sits at `id * 4` in the flat sample sequence.

use ndarray::{Array3, ArrayView3};

use crate::error::{ManipError, Result};

/// Samples per pixel.
pub const CHANNELS: usize = 4;

/// One pixel as `(r, g, b, a)`.
pub type Rgba = (u8, u8, u8, u8);

/// A width × height grid of RGBA samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    data: Array3<u8>,
}

impl RasterBuffer {
    /// Build a buffer from a flat RGBA sample sequence.
    ///
    /// # Errors
    /// `ShapeMismatch` if `samples.len() != width * height * 4`.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * CHANNELS;
        if samples.len() != expected {
            return Err(ManipError::ShapeMismatch {
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        let data = Array3::from_shape_vec((height as usize, width as usize, CHANNELS), samples)
            .map_err(|e| ManipError::invalid(format!("cannot shape raster: {e}")))?;
        Ok(Self { data })
    }

    /// Buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, pixel: Rgba) -> Self {
        let (r, g, b, a) = pixel;
        let data = Array3::from_shape_fn((height as usize, width as usize, CHANNELS), |(_, _, c)| {
            [r, g, b, a][c]
        });
        Self { data }
    }

    /// Build a buffer from a list of pixels in raster order.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Rgba]) -> Result<Self> {
        let samples = pixels
            .iter()
            .flat_map(|&(r, g, b, a)| [r, g, b, a])
            .collect();
        Self::new(width, height, samples)
    }

    /// Wrap an existing `(height, width, 4)` array.
    pub fn from_array(data: Array3<u8>) -> Result<Self> {
        let (height, width, channels) = data.dim();
        if channels != CHANNELS {
            return Err(ManipError::invalid(format!(
                "expected {CHANNELS} channels, got {channels}"
            )));
        }
        let width = u32::try_from(width).map_err(|_| ManipError::invalid("width exceeds u32"))?;
        let height = u32::try_from(height).map_err(|_| ManipError::invalid("height exceeds u32"))?;
        // Re-pack so the storage is standard (row-major, contiguous) layout.
        Self::new(width, height, data.iter().copied().collect())
    }

    pub fn width(&self) -> u32 {
        self.data.dim().1 as u32
    }

    pub fn height(&self) -> u32 {
        self.data.dim().0 as u32
    }

    pub fn pixel_count(&self) -> usize {
        let (h, w, _) = self.data.dim();
        h * w
    }

    pub fn view(&self) -> ArrayView3<'_, u8> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array3<u8> {
        &self.data
    }

    /// Flat RGBA samples in raster order.
    pub fn samples(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }

    pub fn into_samples(self) -> Vec<u8> {
        let (samples, _) = self.data.into_raw_vec_and_offset();
        samples
    }

    fn coords(&self, id: usize) -> Result<(usize, usize)> {
        let len = self.pixel_count();
        if id >= len {
            return Err(ManipError::IndexOutOfRange { id, len });
        }
        let width = self.data.dim().1;
        Ok((id / width, id % width))
    }

    /// Read pixel `id`.
    pub fn get(&self, id: usize) -> Result<Rgba> {
        let (y, x) = self.coords(id)?;
        Ok((
            self.data[[y, x, 0]],
            self.data[[y, x, 1]],
            self.data[[y, x, 2]],
            self.data[[y, x, 3]],
        ))
    }

    /// Write pixel `id`.
    pub fn set(&mut self, id: usize, pixel: Rgba) -> Result<()> {
        let (y, x) = self.coords(id)?;
        let (r, g, b, a) = pixel;
        self.data[[y, x, 0]] = r;
        self.data[[y, x, 1]] = g;
        self.data[[y, x, 2]] = b;
        self.data[[y, x, 3]] = a;
        Ok(())
    }

    /// Replace the contents with a same-shaped filter result.
    pub(crate) fn replace(&mut self, data: Array3<u8>) {
        debug_assert_eq!(data.dim(), self.data.dim());
        self.data = data;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = RasterBuffer::new(2, 2, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            ManipError::ShapeMismatch {
                width: 2,
                height: 2,
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn test_get_set_roundtrip_in_raster_order() {
        let mut buf = RasterBuffer::filled(3, 2, (0, 0, 0, 255));
        buf.set(4, (10, 20, 30, 40)).unwrap();

        assert_eq!(buf.get(4).unwrap(), (10, 20, 30, 40));
        // id 4 = row 1, column 1 -> flat offset 16
        assert_eq!(&buf.samples()[16..20], &[10, 20, 30, 40]);
        assert_eq!(buf.as_array()[[1, 1, 2]], 30);
    }

    #[test]
    fn test_out_of_range_id() {
        let mut buf = RasterBuffer::filled(2, 2, (1, 2, 3, 4));
        assert_eq!(
            buf.get(4).unwrap_err(),
            ManipError::IndexOutOfRange { id: 4, len: 4 }
        );
        assert!(buf.set(100, (0, 0, 0, 0)).is_err());
        // failed set leaves samples untouched
        assert!(buf.samples().chunks(4).all(|p| p == [1, 2, 3, 4]));
    }

    #[test]
    fn test_from_pixels_dimensions() {
        let buf = RasterBuffer::from_pixels(4, 1, &[(0, 0, 0, 255); 4]).unwrap();
        assert_eq!(buf.width(), 4);
        assert_eq!(buf.height(), 1);
        assert_eq!(buf.pixel_count(), 4);
        assert_eq!(buf.into_samples().len(), 16);
    }

    #[test]
    fn test_from_array_requires_four_channels() {
        let rgb = Array3::<u8>::zeros((2, 2, 3));
        assert!(RasterBuffer::from_array(rgb).is_err());

        let rgba = Array3::<u8>::zeros((2, 3, 4));
        let buf = RasterBuffer::from_array(rgba).unwrap();
        assert_eq!((buf.width(), buf.height()), (3, 2));
    }
}
