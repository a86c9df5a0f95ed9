//! Tiling pipeline driving load, partition, augmentation and output.

mod config;
mod manifest;
mod tiler;

pub use config::{Augmentation, Config};
pub use manifest::Manifest;
pub use tiler::{batch_parent_ids, Pipeline, ProcessedParent};
