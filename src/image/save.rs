//! Tile saving utilities.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma};
use ndarray::ArrayView2;

use crate::error::{Error, Result};
use crate::tiling::ImageType;

/// Save a tile block to disk in the requested format.
///
/// * `Jpeg` - 8-bit grayscale, encoded with `quality` (1-100)
/// * `Png` - 16-bit grayscale
/// * `Raw` - little-endian `f32` samples, row-major, no header
///
/// Values are clamped to [0, 1] for the image formats; raw output keeps them as-is.
/// Missing parent directories are created.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn save_tile<P: AsRef<Path>>(
    block: &ArrayView2<'_, f32>,
    path: P,
    image_type: ImageType,
    quality: u8,
) -> Result<()> {
    let path = path.as_ref();

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    match image_type {
        ImageType::Jpeg => {
            let img = DynamicImage::ImageLuma8(block_to_luma8(block));
            let mut output = BufWriter::new(fs::File::create(path)?);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, quality);
            img.write_with_encoder(encoder)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
            output.flush()?;
        }
        ImageType::Png => {
            block_to_luma16(block)
                .save_with_format(path, image::ImageFormat::Png)
                .map_err(|source| Error::ImageSave {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        ImageType::Raw => {
            let mut output = BufWriter::new(fs::File::create(path)?);
            for value in block {
                output.write_all(&value.to_le_bytes())?;
            }
            output.flush()?;
        }
    }

    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn block_to_luma8(block: &ArrayView2<'_, f32>) -> ImageBuffer<Luma<u8>, Vec<u8>> {
    let (height, width) = block.dim();
    // Safe: tile dimensions originate from u32 values
    ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        Luma([quantize(block[[y as usize, x as usize]], u8::MAX.into()) as u8])
    })
}

#[allow(clippy::cast_possible_truncation)]
fn block_to_luma16(block: &ArrayView2<'_, f32>) -> ImageBuffer<Luma<u16>, Vec<u16>> {
    let (height, width) = block.dim();
    ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
        Luma([quantize(block[[y as usize, x as usize]], u16::MAX.into()) as u16])
    })
}

/// Scale a [0, 1] value to [0, max] with clamping. NaN maps to 0.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(value: f32, max: f32) -> u32 {
    if value.is_nan() {
        return 0;
    }
    (value.clamp(0.0, 1.0) * max).round() as u32
}
