//! Atlas tile layout
//!
//! Shadow maps are packed into a square grid of equally sized tiles. The grid
//! is 1x1, 2x2 or 4x4 depending on how many tiles the frame needs, so an
//! atlas never holds more than 16 tiles.

use serde::{Serialize, Deserialize};

/// Tiles per side for a given tile count (1, 2 or 4)
pub fn compute_split(tile_count: usize) -> u32 {
    if tile_count <= 1 {
        1
    } else if tile_count <= 4 {
        2
    } else {
        4
    }
}

/// Pixel rectangle of one tile plus its grid cell
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileViewport {
    /// Grid cell in tile units (column, row)
    pub offset: [f32; 2],

    /// Left edge in pixels
    pub x: f32,

    /// Top edge in pixels
    pub y: f32,

    /// Width and height in pixels
    pub size: f32,
}

impl TileViewport {
    /// Viewport for `index` in a `split` x `split` grid of `tile_size` pixel tiles
    pub fn new(index: u32, split: u32, tile_size: f32) -> Self {
        let split = split.max(1);
        let offset = [(index % split) as f32, (index / split) as f32];
        Self {
            offset,
            x: offset[0] * tile_size,
            y: offset[1] * tile_size,
            size: tile_size,
        }
    }

    /// Check whether two viewports share any pixels
    pub fn overlaps(&self, other: &TileViewport) -> bool {
        self.x < other.x + other.size
            && other.x < self.x + self.size
            && self.y < other.y + other.size
            && other.y < self.y + self.size
    }
}

/// Split and tile size of one atlas for the current frame
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileLayout {
    /// Tiles per side
    pub split: u32,

    /// Tile width and height in pixels
    pub tile_size: u32,
}

impl TileLayout {
    /// Lay out `tile_count` tiles in an atlas of `atlas_resolution` pixels
    pub fn new(atlas_resolution: u32, tile_count: usize) -> Self {
        let split = compute_split(tile_count);
        Self {
            split,
            tile_size: atlas_resolution / split,
        }
    }

    /// Fraction of the atlas covered by one tile side
    pub fn tile_scale(&self) -> f32 {
        1.0 / self.split as f32
    }

    /// Number of cells in the grid
    pub fn capacity(&self) -> u32 {
        self.split * self.split
    }

    /// Viewport of the tile at `index`
    pub fn viewport(&self, index: u32) -> TileViewport {
        TileViewport::new(index, self.split, self.tile_size as f32)
    }
}
