//! Pipeline configuration.

use std::path::PathBuf;

use crate::augment::{AugmentationParams, Instrument};
use crate::error::{Error, Result};
use crate::tiling::{ImageType, TileLayout};

/// How tiles are augmented before they are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Augmentation {
    /// Tiles are written as cut.
    #[default]
    None,
    /// The same parameters are applied to every tile.
    Fixed(AugmentationParams),
    /// A fresh parameter set is drawn per parent for the given instrument.
    Random(Instrument),
}

/// Configuration for the tiling pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tile width in pixels.
    pub tile_width: u32,

    /// Tile height in pixels.
    pub tile_height: u32,

    /// Output pixel format of the tiles.
    pub image_type: ImageType,

    /// Directory tiles and manifests are written to.
    pub output_dir: PathBuf,

    /// Output JPEG quality (1-100).
    pub output_quality: u8,

    /// Write tile pixels. When false only metadata manifests are produced.
    pub write_pixels: bool,

    /// Augmentation applied to written tiles.
    pub augmentation: Augmentation,

    /// Observation time copied onto every tile. Defaults to the file modification time.
    pub time_stamp: Option<String>,

    /// Random seed for reproducibility. None for random.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tile_width: 256,
            tile_height: 256,
            image_type: ImageType::Jpeg,
            output_dir: PathBuf::from("tiles"),
            output_quality: 95,
            write_pixels: true,
            augmentation: Augmentation::None,
            time_stamp: None,
            seed: None,
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// Tile dimensions are only checked for being non-zero here; whether they fit
    /// a given parent is decided when it is partitioned.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(Error::InvalidParameter {
                name: "tile size".to_string(),
                reason: "tile width and height must be greater than 0".to_string(),
            });
        }

        if !(1..=100).contains(&self.output_quality) {
            return Err(Error::InvalidParameter {
                name: "output_quality".to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }

        if let Augmentation::Fixed(params) = &self.augmentation {
            params.validate()?;
        }

        Ok(())
    }

    /// Tile layout used to partition every parent.
    #[must_use]
    pub fn layout(&self) -> TileLayout {
        TileLayout {
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            image_type: self.image_type,
            output_dir: self.output_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_zero_tile_rejected() {
        let config = Config {
            tile_height: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_quality_range() {
        let config = Config {
            output_quality: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_fixed_augmentation_is_validated() {
        let config = Config {
            augmentation: Augmentation::Fixed(AugmentationParams {
                brighten: Some(3.0),
                ..AugmentationParams::default()
            }),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_layout_mirrors_config() {
        let config = Config {
            tile_width: 64,
            tile_height: 32,
            image_type: ImageType::Png,
            ..Config::default()
        };
        let layout = config.layout();
        assert_eq!((layout.tile_width, layout.tile_height), (64, 32));
        assert_eq!(layout.image_type, ImageType::Png);
        assert_eq!(layout.output_dir, PathBuf::from("tiles"));
    }
}
