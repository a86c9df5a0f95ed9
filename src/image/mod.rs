//! Raster loading and tile saving utilities.

mod load;
mod save;

pub use load::{image_to_raster, load_raster};
pub use save::save_tile;

use ndarray::Array2;

/// Single-channel raster in (height, width) layout.
/// Values are normalized to [0, 1] on load.
pub type Raster = Array2<f32>;

/// Fill value for synthetic padding pixels.
pub const PAD_VALUE: f32 = 0.0;
