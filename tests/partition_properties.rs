use std::collections::HashSet;
use std::path::Path;

use ndarray::{s, Array2};
use solartile::tiling::{calc_padding, cut_tile, partition, ParentImageRecord, TileLayout, TileRecord};
use solartile::error::{Axis, Error};

fn parent(width: u32, height: u32) -> ParentImageRecord {
    ParentImageRecord::from_path(Path::new("/archive/hmi_m_720s.png"), width, height, "2016-07-01T12:00:00Z")
}

#[test]
fn test_every_tile_is_smaller_than_parent() {
    for (w, h, tw, th) in [(40, 42, 7, 5), (27, 4, 3, 2), (4096, 4096, 512, 500), (9, 9, 8, 1)] {
        let partition = partition(parent(w, h), &TileLayout::new(tw, th)).unwrap();
        for tile in partition.tiles() {
            assert!(tile.tile_width() < tile.parent_width());
            assert!(tile.tile_height() < tile.parent_height());
        }
    }
}

#[test]
fn test_padded_canvas_divides_evenly() {
    for w in 2..40u32 {
        for tw in 1..w {
            let h = w + 3;
            let th = (tw % (h - 1)) + 1;
            let partition = partition(parent(w, h), &TileLayout::new(tw, th)).unwrap();
            let padding = partition.padding();
            assert_eq!((w + padding.left + padding.right) % tw, 0);
            assert_eq!((h + padding.top + padding.bottom) % th, 0);
        }
    }
}

#[test]
fn test_grid_covers_canvas_exactly_once() {
    for (w, h, tw, th) in [(40, 42, 7, 5), (13, 11, 4, 3), (64, 48, 16, 16), (31, 17, 30, 16)] {
        let partition = partition(parent(w, h), &TileLayout::new(tw, th)).unwrap();
        let mut hits = Array2::<u32>::zeros((
            partition.padded_height() as usize,
            partition.padded_width() as usize,
        ));

        for tile in partition.tiles() {
            let (x, y) = tile.origin();
            let (x, y) = (x as usize, y as usize);
            hits.slice_mut(s![y..y + th as usize, x..x + tw as usize])
                .mapv_inplace(|n| n + 1);
        }

        assert!(hits.iter().all(|&n| n == 1), "{w}x{h} by {tw}x{th}");

        let row_heights: u32 = (0..partition.rows())
            .map(|r| partition.tile(r, 0).unwrap().tile_height())
            .sum();
        let col_widths: u32 = (0..partition.cols())
            .map(|c| partition.tile(0, c).unwrap().tile_width())
            .sum();
        assert_eq!(row_heights, partition.padded_height());
        assert_eq!(col_widths, partition.padded_width());
    }
}

#[test]
fn test_only_border_tiles_are_padded() {
    let partition = partition(parent(100, 77), &TileLayout::new(9, 8)).unwrap();
    let (last_row, last_col) = (partition.rows() - 1, partition.cols() - 1);

    for tile in partition.tiles() {
        let on_border = tile.row() == 0 || tile.col() == 0 || tile.row() == last_row || tile.col() == last_col;
        if !on_border {
            assert_eq!(
                (tile.left_padding(), tile.right_padding(), tile.top_padding(), tile.bottom_padding()),
                (0, 0, 0, 0)
            );
        }
        assert_eq!(
            tile.is_padded(),
            tile.left_padding() + tile.right_padding() + tile.top_padding() + tile.bottom_padding() > 0
        );
        if tile.left_padding() > 0 {
            assert_eq!(tile.col(), 0);
        }
        if tile.right_padding() > 0 {
            assert_eq!(tile.col(), last_col);
        }
        if tile.top_padding() > 0 {
            assert_eq!(tile.row(), 0);
        }
        if tile.bottom_padding() > 0 {
            assert_eq!(tile.row(), last_row);
        }
    }
}

#[test]
fn test_names_are_unique_and_stable() {
    let layout = TileLayout::new(7, 5);
    let first = partition(parent(40, 42), &layout).unwrap();
    let second = partition(parent(40, 42), &layout).unwrap();

    let names: HashSet<&str> = first.tiles().iter().map(TileRecord::name).collect();
    assert_eq!(names.len(), first.tiles().len());
    assert_eq!(first.tiles(), second.tiles());
    assert_eq!(first.tiles()[0].name(), "hmi_m_720s_r000_c000");
}

#[test]
fn test_parent_metadata_copied_to_every_tile() {
    let mut record = parent(30, 30);
    record.is_valid = false;
    record.file_type = "fits".to_string();
    let partition = partition(record, &TileLayout::new(10, 7)).unwrap();

    for tile in partition.tiles() {
        assert!(!tile.parent_is_valid());
        assert!(tile.is_valid());
        assert_eq!(tile.parent_file_type(), "fits");
        assert_eq!(tile.parent_source(), "/archive/hmi_m_720s.png");
        assert_eq!(tile.time_stamp(), "2016-07-01T12:00:00Z");
        assert_eq!((tile.parent_width(), tile.parent_height()), (30, 30));
    }
}

#[test]
fn test_tile_equal_to_parent_is_dimension_error() {
    assert!(matches!(
        partition(parent(64, 100), &TileLayout::new(64, 10)),
        Err(Error::Dimension { axis: Axis::Width, tile: 64, parent: 64 })
    ));
    assert!(matches!(
        partition(parent(100, 64), &TileLayout::new(10, 64)),
        Err(Error::Dimension { axis: Axis::Height, tile: 64, parent: 64 })
    ));
}

#[test]
fn test_height_42_tile_5_needs_padding() {
    // Older fixtures expected no padding here; 42 is not a multiple of 5.
    assert_eq!(calc_padding(Axis::Height, 42, 5).unwrap(), (1, 2));
    assert_eq!(calc_padding(Axis::Width, 40, 7).unwrap(), (1, 1));
}

#[test]
fn test_blocks_are_tile_sized_and_padding_is_zero() {
    let (w, h) = (23usize, 19usize);
    let raster = Array2::<f32>::from_elem((h, w), 0.5);
    let partition = partition(parent(23, 19), &TileLayout::new(6, 4)).unwrap();

    for tile in partition.tiles() {
        let block = cut_tile(&raster.view(), partition.padding(), tile).unwrap();
        assert_eq!(block.dim(), (4, 6));

        let zeros = block.iter().filter(|v| **v == 0.0).count();
        let expected_zeros = if tile.is_padded() {
            let content_w = 6 - tile.left_padding() - tile.right_padding();
            let content_h = 4 - tile.top_padding() - tile.bottom_padding();
            24 - (content_w * content_h) as usize
        } else {
            0
        };
        assert_eq!(zeros, expected_zeros, "{}", tile.name());
    }
}
