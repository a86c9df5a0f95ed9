//! Augmentation parameters and tile transforms.

mod params;
mod transform;

pub use params::{
    AugmentationParams, Instrument, BRIGHTEN_RANGE, DEFAULT_BLUR, ROTATE_RANGE, TRANSLATE_RANGE,
    ZOOM_RANGE,
};
pub use transform::TileTransform;
