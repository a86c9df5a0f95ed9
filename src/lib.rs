//! # solartile
//!
//! Prepares large solar instrument frames (EUV, magnetogram) for tiled
//! downstream processing. A parent frame is padded symmetrically until it divides
//! evenly into fixed-size tiles, then split into a row-major grid of tiles. Every
//! tile carries the metadata needed to trace it back to its parent: source,
//! validity, observation time and the padding it contains.
//!
//! ## Example
//!
//! ```
//! use solartile::tiling::{partition, ParentImageRecord, TileLayout};
//!
//! # fn main() -> solartile::Result<()> {
//! let parent = ParentImageRecord::from_path("aia_171.png".as_ref(), 42, 40, "2014-01-01T00:00:11Z");
//! let partition = partition(parent, &TileLayout::new(5, 7))?;
//!
//! assert_eq!(partition.padded_width(), 45);
//! assert_eq!(partition.tiles().len(), 9 * 6);
//! # Ok(())
//! # }
//! ```

pub mod augment;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod tiling;

pub use error::{Error, Result};
pub use pipeline::{Config, Pipeline};
