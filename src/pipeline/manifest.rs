//! JSON manifest describing every tile cut from one parent.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::augment::AugmentationParams;
use crate::error::{Error, Result};
use crate::tiling::{CanvasPadding, ParentImageRecord, Partition, TileRecord};

/// Persisted result of tiling one parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub parent: ParentImageRecord,
    pub padding: CanvasPadding,
    pub rows: u32,
    pub cols: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub augmentation: Option<AugmentationParams>,
    pub tiles: Vec<TileRecord>,
}

impl Manifest {
    /// Build a manifest from a partition and the records produced for it.
    #[must_use]
    pub fn new(
        partition: &Partition,
        tiles: Vec<TileRecord>,
        augmentation: Option<AugmentationParams>,
    ) -> Self {
        Self {
            parent: partition.parent().clone(),
            padding: partition.padding(),
            rows: partition.rows(),
            cols: partition.cols(),
            augmentation,
            tiles,
        }
    }

    /// Conventional manifest location for a parent inside `output_dir`.
    #[must_use]
    pub fn path_for(output_dir: &Path, parent_id: &str) -> PathBuf {
        output_dir.join(format!("{parent_id}_tiles.json"))
    }

    /// Write the manifest as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| Error::Manifest {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a manifest back from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|source| Error::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Number of tiles marked invalid.
    #[must_use]
    pub fn invalid_count(&self) -> usize {
        self.tiles.iter().filter(|t| !t.is_valid()).count()
    }
}
