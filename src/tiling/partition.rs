//! Grid enumeration of tiles over a padded parent canvas.

use std::path::PathBuf;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{Error, Result};

use super::padding::CanvasPadding;
use super::record::{ImageType, ParentImageRecord, TilePadding, TileRecord};

/// Tile size and output naming for a partitioning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayout {
    pub tile_width: u32,
    pub tile_height: u32,
    pub image_type: ImageType,
    /// Directory tile output paths are placed in.
    pub output_dir: PathBuf,
}

impl TileLayout {
    #[must_use]
    pub fn new(tile_width: u32, tile_height: u32) -> Self {
        Self {
            tile_width,
            tile_height,
            image_type: ImageType::default(),
            output_dir: PathBuf::from("tiles"),
        }
    }
}

/// All tiles of one parent image, in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    parent: Arc<ParentImageRecord>,
    padding: CanvasPadding,
    padded_width: u32,
    padded_height: u32,
    rows: u32,
    cols: u32,
    tiles: Vec<TileRecord>,
}

impl Partition {
    #[must_use]
    pub fn parent(&self) -> &ParentImageRecord {
        &self.parent
    }

    /// Padding applied to the whole parent canvas.
    #[must_use]
    pub const fn padding(&self) -> CanvasPadding {
        self.padding
    }

    #[must_use]
    pub const fn padded_width(&self) -> u32 {
        self.padded_width
    }

    #[must_use]
    pub const fn padded_height(&self) -> u32 {
        self.padded_height
    }

    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    #[must_use]
    pub fn tiles(&self) -> &[TileRecord] {
        &self.tiles
    }

    /// Tile at a grid position, if it exists.
    #[must_use]
    pub fn tile(&self, row: u32, col: u32) -> Option<&TileRecord> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.tiles.get(row as usize * self.cols as usize + col as usize)
    }

    #[must_use]
    pub fn into_tiles(self) -> Vec<TileRecord> {
        self.tiles
    }
}

/// Split one parent image into the full set of tiles covering its padded canvas.
///
/// Tiles are produced row-major, top to bottom then left to right. Only tiles on
/// the outer rows and columns carry padding.
///
/// # Errors
///
/// Returns [`Error::Dimension`] if a tile dimension is zero or not strictly
/// smaller than the parent, and [`Error::InconsistentGrid`] if the grid fails its
/// own consistency check or the padded canvas or tile count exceeds `u32`.
pub fn partition(parent: ParentImageRecord, layout: &TileLayout) -> Result<Partition> {
    let padding = CanvasPadding::for_dimensions(
        parent.width,
        parent.height,
        layout.tile_width,
        layout.tile_height,
    )?;

    let (Some(padded_width), Some(padded_height)) = (
        padding.padded_width(parent.width),
        padding.padded_height(parent.height),
    ) else {
        return Err(Error::InconsistentGrid {
            reason: format!(
                "padded canvas for {}x{} with padding {padding:?} exceeds u32",
                parent.width, parent.height
            ),
        });
    };
    if padded_width % layout.tile_width != 0 || padded_height % layout.tile_height != 0 {
        return Err(Error::InconsistentGrid {
            reason: format!(
                "padded canvas {padded_width}x{padded_height} is not divisible by tile {}x{}",
                layout.tile_width, layout.tile_height
            ),
        });
    }

    let cols = padded_width / layout.tile_width;
    let rows = padded_height / layout.tile_height;
    let count = rows.checked_mul(cols).ok_or_else(|| Error::InconsistentGrid {
        reason: format!("{rows}x{cols} tiles exceed u32"),
    })? as usize;

    tracing::debug!(
        "Partitioning {} ({}x{}) into {rows}x{cols} tiles, padding {padding:?}",
        parent.id,
        parent.width,
        parent.height
    );

    let parent = Arc::new(parent);
    let mut tiles = Vec::new();
    tiles
        .try_reserve_exact(count)
        .map_err(|err| Error::InconsistentGrid {
            reason: format!("cannot hold {count} tile records: {err}"),
        })?;

    for row in 0..rows {
        for col in 0..cols {
            let tile_padding = TilePadding {
                left: if col == 0 { padding.left } else { 0 },
                right: if col == cols - 1 { padding.right } else { 0 },
                top: if row == 0 { padding.top } else { 0 },
                bottom: if row == rows - 1 { padding.bottom } else { 0 },
            };

            let name = tile_name(&parent.id, row, col);
            let output_path = layout
                .output_dir
                .join(format!("{name}.{}", layout.image_type.extension()));

            tiles.push(TileRecord::new(
                name,
                layout.image_type,
                output_path,
                (row, col),
                (col * layout.tile_width, row * layout.tile_height),
                (layout.tile_width, layout.tile_height),
                tile_padding,
                Arc::clone(&parent),
            ));
        }
    }

    if tiles.len() != count {
        return Err(Error::InconsistentGrid {
            reason: format!("expected {count} tiles, produced {}", tiles.len()),
        });
    }

    Ok(Partition {
        parent,
        padding,
        padded_width,
        padded_height,
        rows,
        cols,
        tiles,
    })
}

/// Partition several independent parents in parallel.
///
/// Results are returned in input order, one per parent.
#[must_use]
pub fn partition_many(parents: Vec<ParentImageRecord>, layout: &TileLayout) -> Vec<Result<Partition>> {
    parents
        .into_par_iter()
        .map(|parent| partition(parent, layout))
        .collect()
}

/// Deterministic tile name from the parent id and grid position.
#[must_use]
pub fn tile_name(parent_id: &str, row: u32, col: u32) -> String {
    format!("{parent_id}_r{row:03}_c{col:03}")
}
