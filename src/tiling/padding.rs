//! Symmetric padding that makes a parent dimension divisible by a tile dimension.

use serde::{Deserialize, Serialize};

use crate::error::{Axis, Error, Result};

/// Compute the null rows/columns to add on each side of one axis.
///
/// Returns `(pad_before, pad_after)` such that
/// `(parent_len + pad_before + pad_after) % tile_len == 0`. Padding is split so
/// the original content stays centred; when the amount needed is odd the extra
/// pixel goes on the after side (right for width, bottom for height).
///
/// Both values are always smaller than `tile_len`.
///
/// # Errors
///
/// Returns [`Error::Dimension`] unless `0 < tile_len < parent_len`.
pub fn calc_padding(axis: Axis, parent_len: u32, tile_len: u32) -> Result<(u32, u32)> {
    if tile_len == 0 || tile_len >= parent_len {
        return Err(Error::Dimension {
            axis,
            tile: tile_len,
            parent: parent_len,
        });
    }

    let remainder = parent_len % tile_len;
    if remainder == 0 {
        return Ok((0, 0));
    }

    let needed = tile_len - remainder;
    let before = needed / 2;
    Ok((before, needed - before))
}

/// Padding applied to the whole parent canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasPadding {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl CanvasPadding {
    /// Compute padding for both axes of a parent image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Dimension`] if either tile dimension is invalid for the parent.
    pub fn for_dimensions(
        parent_width: u32,
        parent_height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self> {
        let (left, right) = calc_padding(Axis::Width, parent_width, tile_width)?;
        let (top, bottom) = calc_padding(Axis::Height, parent_height, tile_height)?;
        Ok(Self {
            left,
            right,
            top,
            bottom,
        })
    }

    /// Width of the canvas once this padding is applied, or `None` if it
    /// does not fit in a `u32`.
    #[must_use]
    pub const fn padded_width(&self, parent_width: u32) -> Option<u32> {
        match self.left.checked_add(self.right) {
            Some(pad) => parent_width.checked_add(pad),
            None => None,
        }
    }

    /// Height of the canvas once this padding is applied, or `None` if it
    /// does not fit in a `u32`.
    #[must_use]
    pub const fn padded_height(&self, parent_height: u32) -> Option<u32> {
        match self.top.checked_add(self.bottom) {
            Some(pad) => parent_height.checked_add(pad),
            None => None,
        }
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.left == 0 && self.right == 0 && self.top == 0 && self.bottom == 0
    }
}
