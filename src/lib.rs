//! Raster manipulation
//!
//! Pixel-buffer transforms over an RGBA raster, with optional Python
//! bindings via PyO3 and WASM bindings for JavaScript.
//!
//! ## Image Format
//! A [`RasterBuffer`] is `width × height` pixels of 4 u8 samples in R, G, B,
//! A order, stored as a `(height, width, 4)` array. Pixels are addressed by
//! a flat id in raster order.
//!
//! ## Operations
//! - **Blur** - box blur, radius must be even
//! - **Desaturate / GrayScale** - move RGB toward a (weighted) average
//! - **Channel** - single-channel view
//! - **Gradient map** - pixels with a sudden brightness step along a
//!   compass direction
//!
//! Everything runs through a [`ManipulationSession`], which keeps a
//! committed source buffer and a working buffer. [`DeferredSession`]
//! queues operations until the pixel data is available.

pub mod buffer;
pub mod config;
pub mod deferred;
pub mod diagnostics;
pub mod error;
pub mod filters;
pub mod gradient;
pub mod neighbor;
pub mod operation;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use buffer::{RasterBuffer, Rgba};
pub use config::SessionConfig;
pub use deferred::DeferredSession;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use error::{ManipError, ReplayError, Result};
pub use filters::{BlurRadius, ChannelSelector, Percentage, Weighting};
pub use gradient::{BrightnessScaleMapper, Classification, GradientMap, Threshold};
pub use neighbor::{neighbor, neighbor_at, CompassAngle};
pub use operation::{Operation, Outcome};
pub use session::ManipulationSession;

// Python bindings (only when python feature is enabled)
#[cfg(feature = "python")]
mod python {
    use std::collections::BTreeMap;

    use numpy::{IntoPyArray, PyArray3, PyReadonlyArray3};
    use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyValueError};
    use pyo3::prelude::*;

    use crate::buffer::RasterBuffer;
    use crate::error::ManipError;
    use crate::filters::{
        blur_rgba_u8, channel_rgba_u8, desaturate_rgba_u8, grayscale_rgba_u8, BlurRadius,
        ChannelSelector, Percentage, Weighting,
    };
    use crate::session::ManipulationSession;

    fn to_py_err(err: ManipError) -> PyErr {
        match err {
            ManipError::IndexOutOfRange { .. } => PyIndexError::new_err(err.to_string()),
            ManipError::NotReady(_) | ManipError::AlreadyReady => {
                PyRuntimeError::new_err(err.to_string())
            }
            _ => PyValueError::new_err(err.to_string()),
        }
    }

    fn check_rgba(shape: &[usize]) -> PyResult<()> {
        if shape.len() != 3 || shape[2] != 4 {
            return Err(PyValueError::new_err(format!(
                "expected RGBA array of shape (H, W, 4), got {shape:?}"
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Filters
    // ========================================================================

    /// Box blur an RGBA u8 image. `radius` must be positive and even.
    #[pyfunction]
    pub fn blur_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        radius: u32,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = image.as_array();
        check_rgba(input.shape())?;
        let radius = BlurRadius::new(radius).map_err(to_py_err)?;
        Ok(blur_rgba_u8(input, radius).into_pyarray(py))
    }

    /// Desaturate an RGBA u8 image by `percentage` (clamped to 0-100).
    #[pyfunction]
    #[pyo3(signature = (image, percentage, for_humans=false))]
    pub fn desaturate_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        percentage: i64,
        for_humans: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = image.as_array();
        check_rgba(input.shape())?;
        let result = desaturate_rgba_u8(
            input,
            Percentage::clamped(percentage),
            Weighting::from_human(for_humans),
        );
        Ok(result.into_pyarray(py))
    }

    /// Convert an RGBA u8 image to grayscale.
    #[pyfunction]
    #[pyo3(signature = (image, for_humans=false))]
    pub fn grayscale_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        for_humans: bool,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = image.as_array();
        check_rgba(input.shape())?;
        Ok(grayscale_rgba_u8(input, Weighting::from_human(for_humans)).into_pyarray(py))
    }

    /// Single-channel view. `channel` is one of "r", "g", "b", "a".
    #[pyfunction]
    pub fn channel_rgba<'py>(
        py: Python<'py>,
        image: PyReadonlyArray3<'py, u8>,
        channel: &str,
    ) -> PyResult<Bound<'py, PyArray3<u8>>> {
        let input = image.as_array();
        check_rgba(input.shape())?;
        let selector: ChannelSelector = channel.parse().map_err(to_py_err)?;
        Ok(channel_rgba_u8(input, selector).into_pyarray(py))
    }

    // ========================================================================
    // Gradient map
    // ========================================================================

    /// Sudden brightness steps as `{pixel_id: {angle: difference}}`.
    #[pyfunction]
    pub fn brightness_map(
        image: PyReadonlyArray3<'_, u8>,
        threshold: i32,
        angle: i32,
    ) -> PyResult<BTreeMap<usize, BTreeMap<u16, i16>>> {
        let input = image.as_array();
        check_rgba(input.shape())?;
        let buffer = RasterBuffer::from_array(input.to_owned()).map_err(to_py_err)?;
        let mut session = ManipulationSession::new(buffer);
        let map = session.build_gradient_map(threshold, angle).map_err(to_py_err)?;
        Ok(map.to_degrees())
    }

    #[pymodule]
    pub fn raster_manip(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(blur_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(desaturate_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(grayscale_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(channel_rgba, m)?)?;
        m.add_function(wrap_pyfunction!(brightness_map, m)?)?;
        Ok(())
    }
}

#[cfg(feature = "python")]
pub use python::raster_manip;
