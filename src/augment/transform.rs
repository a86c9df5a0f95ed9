//! Shape-preserving pixel transforms applied to tile blocks.

use ndarray::{s, Array2, ArrayView2};

use crate::image::PAD_VALUE;

use super::params::AugmentationParams;

/// A transform over a single tile block.
///
/// Implementations must return an array with the same shape as the input.
pub trait TileTransform {
    fn apply(&self, block: &ArrayView2<'_, f32>) -> Array2<f32>;
}

impl TileTransform for AugmentationParams {
    fn apply(&self, block: &ArrayView2<'_, f32>) -> Array2<f32> {
        let mut out = block.to_owned();

        if let Some(degrees) = self.rotate {
            out = rotate(&out.view(), degrees);
        }
        if let Some(factor) = self.zoom {
            out = zoom(&out.view(), factor);
        }
        if let Some((dx, dy)) = self.translate {
            out = translate(&out.view(), dx, dy);
        }
        if self.v_flip {
            out = out.slice(s![..;-1, ..]).to_owned();
        }
        if self.h_flip {
            out = out.slice(s![.., ..;-1]).to_owned();
        }
        if let Some(factor) = self.brighten {
            out.mapv_inplace(|v| v * factor);
        }
        if let Some((kx, ky)) = self.blur {
            out = box_blur(&out.view(), kx as usize, ky as usize);
        }

        out
    }
}

/// Resample with nearest-neighbour lookup; `source` maps an output (y, x)
/// to input coordinates. Samples outside the block are [`PAD_VALUE`].
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn resample(block: &ArrayView2<'_, f32>, source: impl Fn(f64, f64) -> (f64, f64)) -> Array2<f32> {
    let (height, width) = block.dim();
    Array2::from_shape_fn((height, width), |(y, x)| {
        let (sy, sx) = source(y as f64, x as f64);
        let (sy, sx) = (sy.round(), sx.round());
        if sy < 0.0 || sx < 0.0 || sy >= height as f64 || sx >= width as f64 {
            PAD_VALUE
        } else {
            // Safe: bounds checked above
            block[[sy as usize, sx as usize]]
        }
    })
}

#[allow(clippy::cast_precision_loss)]
fn centre(block: &ArrayView2<'_, f32>) -> (f64, f64) {
    let (height, width) = block.dim();
    ((height as f64 - 1.0) / 2.0, (width as f64 - 1.0) / 2.0)
}

fn rotate(block: &ArrayView2<'_, f32>, degrees: f32) -> Array2<f32> {
    let (cy, cx) = centre(block);
    let (sin, cos) = f64::from(degrees).to_radians().sin_cos();
    resample(block, |y, x| {
        let (dy, dx) = (y - cy, x - cx);
        (cy + sin * dx + cos * dy, cx + cos * dx - sin * dy)
    })
}

fn zoom(block: &ArrayView2<'_, f32>, factor: f32) -> Array2<f32> {
    let (cy, cx) = centre(block);
    let factor = f64::from(factor);
    resample(block, |y, x| (cy + (y - cy) / factor, cx + (x - cx) / factor))
}

fn translate(block: &ArrayView2<'_, f32>, dx: i32, dy: i32) -> Array2<f32> {
    let (dx, dy) = (f64::from(dx), f64::from(dy));
    resample(block, |y, x| (y - dy, x - dx))
}

/// Mean over a `kx x ky` window anchored at the kernel centre, averaging only
/// samples inside the block.
#[allow(clippy::cast_precision_loss)]
fn box_blur(block: &ArrayView2<'_, f32>, kx: usize, ky: usize) -> Array2<f32> {
    let (height, width) = block.dim();
    let (ax, ay) = (kx / 2, ky / 2);

    Array2::from_shape_fn((height, width), |(y, x)| {
        let y0 = y.saturating_sub(ay);
        let y1 = (y + ky - ay).min(height);
        let x0 = x.saturating_sub(ax);
        let x1 = (x + kx - ax).min(width);
        let window = block.slice(s![y0..y1, x0..x1]);
        window.sum() / window.len() as f32
    })
}
