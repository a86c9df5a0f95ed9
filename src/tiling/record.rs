//! Tile and parent image metadata records.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Output pixel format of a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    #[default]
    Jpeg,
    Png,
    /// Little-endian `f32` samples, row-major, no header.
    Raw,
}

impl ImageType {
    /// File extension used for tiles of this type.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Raw => "raw",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Raw => "raw",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "raw" => Ok(Self::Raw),
            other => Err(Error::InvalidParameter {
                name: "image_type".to_string(),
                reason: format!("unknown image type '{other}' (expected jpeg, png or raw)"),
            }),
        }
    }
}

/// Metadata about the source frame tiles are cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentImageRecord {
    /// Identifier used to derive tile names.
    pub id: String,
    /// Where the frame came from.
    pub source: String,
    /// Source format tag, e.g. `fits`, `png`.
    pub file_type: String,
    /// Validity of the source file, independent of any tile.
    pub is_valid: bool,
    /// Observation time of the frame.
    pub time_stamp: String,
    /// Original, unpadded width in pixels.
    pub width: u32,
    /// Original, unpadded height in pixels.
    pub height: u32,
}

impl ParentImageRecord {
    /// Describe a frame loaded from `path`.
    ///
    /// The id is the file stem and the file type is the lowercased extension.
    #[must_use]
    pub fn from_path(path: &Path, width: u32, height: u32, time_stamp: impl Into<String>) -> Self {
        let id = Self::id_for(path);
        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        Self {
            id,
            source: path.display().to_string(),
            file_type,
            is_valid: true,
            time_stamp: time_stamp.into(),
            width,
            height,
        }
    }

    /// Id a parent read from `path` gets: its file stem, or `parent` if it has none.
    #[must_use]
    pub fn id_for(path: &Path) -> String {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("parent")
            .to_string()
    }
}

/// Synthetic pixels a single tile contributes on each side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TilePadding {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl TilePadding {
    #[must_use]
    pub const fn any(&self) -> bool {
        self.left != 0 || self.right != 0 || self.top != 0 || self.bottom != 0
    }
}

/// One tile cut from one parent image.
///
/// Metadata is fixed at creation. The parent is shared, read-only, so a record
/// stays self-describing after the partition that produced it is dropped.
///
/// `parent().id` is the stable key identifying the parent. It is persisted as
/// `parent_id`, and records loaded back from JSON each hold their own copy of the
/// parent, so group or compare tiles by that id rather than by shared pointer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "FlatTileRecord", try_from = "FlatTileRecord")]
pub struct TileRecord {
    name: String,
    image_type: ImageType,
    is_valid: bool,
    output_path: PathBuf,
    row: u32,
    col: u32,
    x: u32,
    y: u32,
    tile_width: u32,
    tile_height: u32,
    padding: TilePadding,
    parent: Arc<ParentImageRecord>,
}

impl TileRecord {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: String,
        image_type: ImageType,
        output_path: PathBuf,
        (row, col): (u32, u32),
        (x, y): (u32, u32),
        (tile_width, tile_height): (u32, u32),
        padding: TilePadding,
        parent: Arc<ParentImageRecord>,
    ) -> Self {
        Self {
            name,
            image_type,
            is_valid: true,
            output_path,
            row,
            col,
            x,
            y,
            tile_width,
            tile_height,
            padding,
            parent,
        }
    }

    /// Re-create this record with a content-derived validity.
    #[must_use]
    pub fn with_validity(&self, is_valid: bool) -> Self {
        Self {
            is_valid,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn image_type(&self) -> ImageType {
        self.image_type
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.is_valid
    }

    #[must_use]
    pub fn time_stamp(&self) -> &str {
        &self.parent.time_stamp
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Grid row, counted from the top.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Grid column, counted from the left.
    #[must_use]
    pub const fn col(&self) -> u32 {
        self.col
    }

    /// Top-left corner of the footprint on the padded canvas, as `(x, y)`.
    #[must_use]
    pub const fn origin(&self) -> (u32, u32) {
        (self.x, self.y)
    }

    #[must_use]
    pub const fn tile_width(&self) -> u32 {
        self.tile_width
    }

    #[must_use]
    pub const fn tile_height(&self) -> u32 {
        self.tile_height
    }

    #[must_use]
    pub fn parent_width(&self) -> u32 {
        self.parent.width
    }

    #[must_use]
    pub fn parent_height(&self) -> u32 {
        self.parent.height
    }

    #[must_use]
    pub const fn padding(&self) -> TilePadding {
        self.padding
    }

    #[must_use]
    pub const fn is_padded(&self) -> bool {
        self.padding.any()
    }

    #[must_use]
    pub const fn left_padding(&self) -> u32 {
        self.padding.left
    }

    #[must_use]
    pub const fn right_padding(&self) -> u32 {
        self.padding.right
    }

    #[must_use]
    pub const fn top_padding(&self) -> u32 {
        self.padding.top
    }

    #[must_use]
    pub const fn bottom_padding(&self) -> u32 {
        self.padding.bottom
    }

    #[must_use]
    pub fn parent(&self) -> &ParentImageRecord {
        &self.parent
    }

    #[must_use]
    pub fn parent_is_valid(&self) -> bool {
        self.parent.is_valid
    }

    #[must_use]
    pub fn parent_file_type(&self) -> &str {
        &self.parent.file_type
    }

    #[must_use]
    pub fn parent_source(&self) -> &str {
        &self.parent.source
    }
}

/// Persisted form of a [`TileRecord`], keyed by the metadata field names.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FlatTileRecord {
    name: String,
    image_type: ImageType,
    is_valid: bool,
    time_stamp: String,
    output_path: PathBuf,
    tile_width: u32,
    tile_height: u32,
    parent_width: u32,
    parent_height: u32,
    is_padded: bool,
    left_padding: u32,
    right_padding: u32,
    top_padding: u32,
    bottom_padding: u32,
    parent_is_valid: bool,
    parent_file_type: String,
    parent_source: String,
    parent_id: String,
    row: u32,
    col: u32,
    x: u32,
    y: u32,
}

impl From<TileRecord> for FlatTileRecord {
    fn from(record: TileRecord) -> Self {
        let is_padded = record.is_padded();
        let parent = Arc::unwrap_or_clone(record.parent);
        Self {
            name: record.name,
            image_type: record.image_type,
            is_valid: record.is_valid,
            time_stamp: parent.time_stamp,
            output_path: record.output_path,
            tile_width: record.tile_width,
            tile_height: record.tile_height,
            parent_width: parent.width,
            parent_height: parent.height,
            is_padded,
            left_padding: record.padding.left,
            right_padding: record.padding.right,
            top_padding: record.padding.top,
            bottom_padding: record.padding.bottom,
            parent_is_valid: parent.is_valid,
            parent_file_type: parent.file_type,
            parent_source: parent.source,
            parent_id: parent.id,
            row: record.row,
            col: record.col,
            x: record.x,
            y: record.y,
        }
    }
}

impl TryFrom<FlatTileRecord> for TileRecord {
    type Error = Error;

    fn try_from(flat: FlatTileRecord) -> Result<Self> {
        if flat.tile_width == 0 || flat.tile_width >= flat.parent_width {
            return Err(Error::Dimension {
                axis: crate::error::Axis::Width,
                tile: flat.tile_width,
                parent: flat.parent_width,
            });
        }
        if flat.tile_height == 0 || flat.tile_height >= flat.parent_height {
            return Err(Error::Dimension {
                axis: crate::error::Axis::Height,
                tile: flat.tile_height,
                parent: flat.parent_height,
            });
        }

        let padding = TilePadding {
            left: flat.left_padding,
            right: flat.right_padding,
            top: flat.top_padding,
            bottom: flat.bottom_padding,
        };
        if padding.any() != flat.is_padded {
            return Err(Error::InvalidParameter {
                name: "is_padded".to_string(),
                reason: format!(
                    "tile {} has is_padded={} but padding {padding:?}",
                    flat.name, flat.is_padded
                ),
            });
        }

        let parent = ParentImageRecord {
            id: flat.parent_id,
            source: flat.parent_source,
            file_type: flat.parent_file_type,
            is_valid: flat.parent_is_valid,
            time_stamp: flat.time_stamp,
            width: flat.parent_width,
            height: flat.parent_height,
        };

        Ok(Self {
            name: flat.name,
            image_type: flat.image_type,
            is_valid: flat.is_valid,
            output_path: flat.output_path,
            row: flat.row,
            col: flat.col,
            x: flat.x,
            y: flat.y,
            tile_width: flat.tile_width,
            tile_height: flat.tile_height,
            padding,
            parent: Arc::new(parent),
        })
    }
}
