//! Cutting and writing the pixel block behind each tile record.

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::{s, Array2, ArrayView2};
use rayon::prelude::*;

use crate::augment::TileTransform;
use crate::error::{Error, Result};
use crate::image::{save_tile, PAD_VALUE};

use super::padding::CanvasPadding;
use super::partition::Partition;
use super::record::TileRecord;

/// Cut the `tile_height x tile_width` block for `tile` out of the parent raster.
///
/// `padding` is the canvas padding of the partition the tile belongs to. Pixels
/// that fall in padding are set to [`PAD_VALUE`].
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the raster does not match the parent dimensions.
pub fn cut_tile(
    raster: &ArrayView2<'_, f32>,
    padding: CanvasPadding,
    tile: &TileRecord,
) -> Result<Array2<f32>> {
    check_raster_shape(raster, tile)?;

    let tile_w = tile.tile_width() as usize;
    let tile_h = tile.tile_height() as usize;
    let mut block = Array2::<f32>::from_elem((tile_h, tile_w), PAD_VALUE);

    let (x, y) = tile.origin();
    let (x, y) = (x as usize, y as usize);
    let (left, top) = (padding.left as usize, padding.top as usize);
    let (parent_w, parent_h) = (tile.parent_width() as usize, tile.parent_height() as usize);

    // Overlap of the footprint with the content, in canvas coordinates
    let x0 = x.max(left);
    let x1 = (x + tile_w).min(left + parent_w);
    let y0 = y.max(top);
    let y1 = (y + tile_h).min(top + parent_h);

    if x0 < x1 && y0 < y1 {
        block
            .slice_mut(s![y0 - y..y1 - y, x0 - x..x1 - x])
            .assign(&raster.slice(s![y0 - top..y1 - top, x0 - left..x1 - left]));
    }

    Ok(block)
}

/// Decide whether a cut block is usable downstream.
///
/// A tile is invalid when its parent is invalid or when the block holds
/// non-finite samples.
#[must_use]
pub fn evaluate_validity(block: &ArrayView2<'_, f32>, tile: &TileRecord) -> bool {
    tile.parent_is_valid() && block.iter().all(|v| v.is_finite())
}

/// Cut, optionally transform, and write every tile of a partition.
///
/// Tiles are written in parallel, each to its own output path. Returns the
/// records re-created with their evaluated validity, in the partition's order.
///
/// # Errors
///
/// Returns the first error encountered while cutting or saving.
pub fn write_tiles(
    raster: &ArrayView2<'_, f32>,
    partition: &Partition,
    transform: Option<&(dyn TileTransform + Sync)>,
    quality: u8,
) -> Result<Vec<TileRecord>> {
    let padding = partition.padding();

    let pb = ProgressBar::new(partition.tiles().len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} Tiling [{bar:40.cyan/blue}] {pos}/{len}")
            .expect("valid template")
            .progress_chars("#>-"),
    );

    let records = partition
        .tiles()
        .par_iter()
        .map(|tile| {
            let block = cut_tile(raster, padding, tile)?;
            let is_valid = evaluate_validity(&block.view(), tile);
            if !is_valid {
                tracing::warn!("Tile {} marked invalid", tile.name());
            }

            let block = match transform {
                Some(t) => t.apply(&block.view()),
                None => block,
            };
            save_tile(&block.view(), tile.output_path(), tile.image_type(), quality)?;

            pb.inc(1);
            Ok(tile.with_validity(is_valid))
        })
        .collect::<Result<Vec<_>>>();

    pb.finish_with_message("Tiling complete");
    records
}

fn check_raster_shape(raster: &ArrayView2<'_, f32>, tile: &TileRecord) -> Result<()> {
    let expected = (tile.parent_height() as usize, tile.parent_width() as usize);
    if raster.dim() != expected {
        return Err(Error::ShapeMismatch {
            expected: format!("{}x{} (height x width)", expected.0, expected.1),
            actual: format!("{}x{}", raster.nrows(), raster.ncols()),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::{partition, ImageType, ParentImageRecord, TileLayout};

    fn parent(width: u32, height: u32, is_valid: bool) -> ParentImageRecord {
        ParentImageRecord {
            id: "mag".to_string(),
            source: "mag.png".to_string(),
            file_type: "png".to_string(),
            is_valid,
            time_stamp: "t".to_string(),
            width,
            height,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn ramp(width: usize, height: usize) -> Array2<f32> {
        Array2::from_shape_fn((height, width), |(y, x)| (y * width + x + 1) as f32)
    }

    #[test]
    fn test_corner_tile_has_zero_padding_pixels() {
        // width 5, tile 4 -> padding (1, 2); height 3, tile 2 -> padding (0, 1)
        let raster = ramp(5, 3);
        let partition = partition(parent(5, 3, true), &TileLayout::new(4, 2)).unwrap();
        let tile = partition.tile(0, 0).unwrap();

        let block = cut_tile(&raster.view(), partition.padding(), tile).unwrap();
        assert_eq!(block.dim(), (2, 4));
        assert_eq!(block.column(0).to_vec(), vec![0.0, 0.0]);
        assert_eq!(block.row(0).to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_bottom_right_tile_padding() {
        let raster = ramp(5, 3);
        let partition = partition(parent(5, 3, true), &TileLayout::new(4, 2)).unwrap();
        let tile = partition.tile(1, 1).unwrap();

        let block = cut_tile(&raster.view(), partition.padding(), tile).unwrap();
        // canvas x 4..8 covers parent x 3..5 then two padding columns; canvas y 2..4 is parent row 2 then padding
        assert_eq!(block.row(0).to_vec(), vec![14.0, 15.0, 0.0, 0.0]);
        assert_eq!(block.row(1).to_vec(), vec![0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_blocks_rebuild_padded_canvas() {
        let raster = ramp(13, 11);
        let partition = partition(parent(13, 11, true), &TileLayout::new(4, 3)).unwrap();
        let padding = partition.padding();

        let mut canvas = Array2::<f32>::from_elem(
            (partition.padded_height() as usize, partition.padded_width() as usize),
            -1.0,
        );
        for tile in partition.tiles() {
            let block = cut_tile(&raster.view(), padding, tile).unwrap();
            let (x, y) = tile.origin();
            let (x, y) = (x as usize, y as usize);
            let mut region = canvas.slice_mut(s![y..y + block.nrows(), x..x + block.ncols()]);
            assert!(region.iter().all(|v| (*v + 1.0).abs() < f32::EPSILON), "overlap at {}", tile.name());
            region.assign(&block);
        }

        let (left, top) = (padding.left as usize, padding.top as usize);
        assert_eq!(canvas.slice(s![top..top + 11, left..left + 13]), raster);
        assert!(canvas.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let raster = ramp(6, 6);
        let partition = partition(parent(5, 3, true), &TileLayout::new(4, 2)).unwrap();
        let err = cut_tile(&raster.view(), partition.padding(), &partition.tiles()[0]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_validity_checks_parent_and_samples() {
        let partition = partition(parent(5, 3, true), &TileLayout::new(4, 2)).unwrap();
        let tile = &partition.tiles()[0];
        let mut block = Array2::<f32>::zeros((2, 4));
        assert!(evaluate_validity(&block.view(), tile));

        block[[1, 1]] = f32::NAN;
        assert!(!evaluate_validity(&block.view(), tile));

        let invalid_parent = partition_of(parent(5, 3, false));
        assert!(!evaluate_validity(&Array2::<f32>::zeros((2, 4)).view(), &invalid_parent.tiles()[0]));
    }

    fn partition_of(parent: ParentImageRecord) -> Partition {
        partition(parent, &TileLayout::new(4, 2)).unwrap()
    }

    #[test]
    fn test_write_tiles_writes_every_path() {
        let dir = tempfile::tempdir().unwrap();
        let layout = TileLayout {
            image_type: ImageType::Raw,
            output_dir: dir.path().to_path_buf(),
            ..TileLayout::new(4, 2)
        };
        let mut raster = ramp(5, 3);
        raster[[0, 0]] = f32::INFINITY;
        let partition = partition(parent(5, 3, true), &layout).unwrap();

        let records = write_tiles(&raster.view(), &partition, None, 95).unwrap();

        assert_eq!(records.len(), partition.tiles().len());
        for record in &records {
            let bytes = std::fs::read(record.output_path()).unwrap();
            assert_eq!(bytes.len(), 4 * 2 * 4);
        }
        assert!(!records[0].is_valid());
        assert!(records[1..].iter().all(TileRecord::is_valid));
    }
}
