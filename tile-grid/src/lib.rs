//! A library for slippy map tile grid calculations
//!
//! ## Tiles covering a bounding box
//!
//! ```rust
//! use tile_grid::{tiles_for_bbox, BoundingBox, TileGrid};
//!
//! let bbox = BoundingBox::new(21.49147, 65.31016, 21.5, 65.31688);
//! let grid = tiles_for_bbox(&bbox, 14).unwrap();
//! assert_eq!(grid, TileGrid::new(14, 9170, 9170, 4229, 4230));
//! ```
//!
//! ## Tile bounds
//!
//! ```rust
//! use tile_grid::tile_bounds;
//!
//! let bbox = tile_bounds(0, 0, 0);
//! assert_eq!(bbox.lon_min, -180.0);
//! assert_eq!(bbox.lon_max, 180.0);
//! assert!((bbox.lat_max - 85.0511).abs() < 0.0001);
//! ```
//!
//! ## Grid iterators
//!
//! ```rust
//! use tile_grid::TileGrid;
//!
//! let grid = TileGrid::new(2, 0, 1, 2, 3);
//! for tile in grid.iter() {
//!     println!("Tile {}/{}/{}", grid.zoom, tile.x, tile.y);
//! }
//! ```

mod grid;
mod grid_iterator;
mod matrix;

pub use grid::{
    bbox_to_merc, lonlat_to_merc, merc_to_lonlat, project, tile_bounds, tile_extent_merc,
    tiles_for_bbox, BoundingBox, Extent, GridError, TileGrid, TileIndex, EARTH_RADIUS, MAX_LAT,
    MAX_ZOOM,
};
pub use grid_iterator::GridIterator;
pub use matrix::TileMatrix;
