//! Tile image preprocessing.

use crate::error::{Error, Result};
use image::imageops::FilterType;
use ndarray::Array4;
use std::path::Path;

/// Decode a tile image into a normalized NCHW float tensor.
///
/// The tile is converted to RGB, resized to `size`x`size`, and scaled to
/// `[0, 1]`, matching the preprocessing the model was trained with.
pub(crate) fn tile_to_tensor(path: &Path, size: u32) -> Result<Array4<f32>> {
    let img = image::open(path).map_err(|e| Error::TileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let rgb = img.resize_exact(size, size, FilterType::Triangle).to_rgb8();

    let side = size as usize;
    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
    for (x, y, pixel) in rgb.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, channel, y as usize, x as usize]] = f32::from(pixel[channel]) / 255.0;
        }
    }

    Ok(tensor)
}
