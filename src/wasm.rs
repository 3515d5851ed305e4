//! WebAssembly exports.
//!
//! These functions are exposed to JavaScript via wasm-bindgen and take the
//! flat RGBA bytes of an `ImageData` (length = width * height * 4).

use wasm_bindgen::prelude::*;

use crate::buffer::RasterBuffer;
use crate::error::ManipError;
use crate::filters::{
    blur_rgba_u8, channel_rgba_u8, desaturate_rgba_u8, grayscale_rgba_u8, BlurRadius,
    ChannelSelector, Percentage, Weighting,
};

fn to_js(err: ManipError) -> JsError {
    JsError::new(&err.to_string())
}

fn load(data: &[u8], width: u32, height: u32) -> Result<RasterBuffer, JsError> {
    RasterBuffer::new(width, height, data.to_vec()).map_err(to_js)
}

/// Box blur. `radius` must be positive and even.
#[wasm_bindgen]
pub fn blur_rgba_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    radius: u32,
) -> Result<Vec<u8>, JsError> {
    let input = load(data, width, height)?;
    let radius = BlurRadius::new(radius).map_err(to_js)?;
    let result = blur_rgba_u8(input.view(), radius);
    Ok(result.into_raw_vec_and_offset().0)
}

/// Desaturate by `percentage` (clamped to 0-100).
#[wasm_bindgen]
pub fn desaturate_rgba_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    percentage: i32,
    for_humans: bool,
) -> Result<Vec<u8>, JsError> {
    let input = load(data, width, height)?;
    let result = desaturate_rgba_u8(
        input.view(),
        Percentage::clamped(percentage as i64),
        Weighting::from_human(for_humans),
    );
    Ok(result.into_raw_vec_and_offset().0)
}

/// Grayscale conversion.
#[wasm_bindgen]
pub fn grayscale_rgba_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    for_humans: bool,
) -> Result<Vec<u8>, JsError> {
    let input = load(data, width, height)?;
    let result = grayscale_rgba_u8(input.view(), Weighting::from_human(for_humans));
    Ok(result.into_raw_vec_and_offset().0)
}

/// Single-channel view; `channel` is "r", "g", "b" or "a".
#[wasm_bindgen]
pub fn channel_rgba_wasm(
    data: &[u8],
    width: u32,
    height: u32,
    channel: &str,
) -> Result<Vec<u8>, JsError> {
    let input = load(data, width, height)?;
    let selector: ChannelSelector = channel.parse().map_err(to_js)?;
    let result = channel_rgba_u8(input.view(), selector);
    Ok(result.into_raw_vec_and_offset().0)
}
