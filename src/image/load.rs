//! Raster loading utilities.

use std::path::Path;

use image::{DynamicImage, GenericImageView};
use ndarray::Array2;

use crate::error::{Error, Result};

use super::Raster;

/// Load an image from disk as a single-channel raster.
///
/// The image is:
/// 1. Loaded from the specified path
/// 2. Converted to grayscale luminance if it has colour channels
/// 3. Normalized to [0, 1] range
/// 4. Returned as a (height, width) array
///
/// # Errors
///
/// Returns an error if the image cannot be loaded.
pub fn load_raster<P: AsRef<Path>>(path: P) -> Result<Raster> {
    let path = path.as_ref();

    let img = image::open(path).map_err(|source| Error::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Loaded {} ({:?})", path.display(), img.color());

    Ok(image_to_raster(&img))
}

/// Convert a `DynamicImage` to a normalized (height, width) raster.
#[must_use]
pub fn image_to_raster(img: &DynamicImage) -> Raster {
    let (width, height) = img.dimensions();
    let luma = img.to_luma32f();

    let mut raster = Array2::<f32>::zeros((height as usize, width as usize));
    for (x, y, pixel) in luma.enumerate_pixels() {
        raster[[y as usize, x as usize]] = pixel[0];
    }

    raster
}
