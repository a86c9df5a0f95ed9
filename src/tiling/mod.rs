//! Padding, partitioning and tile metadata.

mod padding;
mod partition;
mod pixels;
mod record;

pub use padding::{calc_padding, CanvasPadding};
pub use partition::{partition, partition_many, tile_name, Partition, TileLayout};
pub use pixels::{cut_tile, evaluate_validity, write_tiles};
pub use record::{ImageType, ParentImageRecord, TilePadding, TileRecord};
