//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Slippy map tile grid

use crate::grid_iterator::GridIterator;
use std::f64::consts;
use thiserror::Error;

/// Highest supported zoom level
pub const MAX_ZOOM: u8 = 24;

/// Latitude limit of the Web Mercator tile pyramid
pub const MAX_LAT: f64 = 85.0511287798066;

/// Earth radius of the spherical Mercator (EPSG:3857)
pub const EARTH_RADIUS: f64 = 6378137.0;

// Snapping tolerance for tile edges, in tile units
const EPSILON: f64 = 0.0000001;

/// Domain errors of the tile math
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("latitude {0} outside of the projectable range (-90, 90)")]
    InvalidLatitude(f64),
    #[error("longitude {0} is not a finite number")]
    InvalidLongitude(f64),
    #[error("zoom level {0} exceeds maximum {}", MAX_ZOOM)]
    InvalidZoom(u8),
}

/// Geographic bounding box in WGS84 degrees
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn new(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> BoundingBox {
        BoundingBox {
            lon_min,
            lat_min,
            lon_max,
            lat_max,
        }
    }
    /// Degenerated box of a single point
    pub fn point(lon: f64, lat: f64) -> BoundingBox {
        BoundingBox::new(lon, lat, lon, lat)
    }
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.lon_min <= other.lon_max
            && other.lon_min <= self.lon_max
            && self.lat_min <= other.lat_max
            && other.lat_min <= self.lat_max
    }
}

/// Projected extent (EPSG:3857 metres)
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Extent {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

/// Tile index in XYZ addressing scheme (origin top left)
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct TileIndex {
    pub x: u32,
    pub y: u32,
}

impl TileIndex {
    pub fn new(x: u32, y: u32) -> TileIndex {
        TileIndex { x, y }
    }
}

/// Inclusive range of tiles at one zoom level
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct TileGrid {
    pub zoom: u8,
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl TileGrid {
    pub fn new(zoom: u8, x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> TileGrid {
        TileGrid {
            zoom,
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
    /// Number of columns, 0 for an inverted grid
    pub fn width(&self) -> u32 {
        self.x_max
            .checked_sub(self.x_min)
            .map_or(0, |d| d.saturating_add(1))
    }
    /// Number of rows, 0 for an inverted grid
    pub fn height(&self) -> u32 {
        self.y_max
            .checked_sub(self.y_min)
            .map_or(0, |d| d.saturating_add(1))
    }
    /// Number of tiles in grid
    pub fn len(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
    pub fn contains(&self, tile: &TileIndex) -> bool {
        (self.x_min..=self.x_max).contains(&tile.x) && (self.y_min..=self.y_max).contains(&tile.y)
    }
    /// Intersection with another grid of the same zoom level
    pub fn intersection(&self, other: &TileGrid) -> Option<TileGrid> {
        let x_min = self.x_min.max(other.x_min);
        let x_max = self.x_max.min(other.x_max);
        let y_min = self.y_min.max(other.y_min);
        let y_max = self.y_max.min(other.y_max);
        if x_min > x_max || y_min > y_max {
            None
        } else {
            Some(TileGrid::new(self.zoom, x_min, x_max, y_min, y_max))
        }
    }
    /// Row by row iterator over all tiles
    pub fn iter(&self) -> GridIterator {
        GridIterator::new(*self)
    }
    /// Geographic bounds of the whole grid
    pub fn bounds(&self) -> BoundingBox {
        let nw = tile_bounds(self.x_min, self.y_min, self.zoom);
        let se = tile_bounds(self.x_max, self.y_max, self.zoom);
        BoundingBox::new(nw.lon_min, se.lat_min, se.lon_max, nw.lat_max)
    }
}

impl IntoIterator for &TileGrid {
    type Item = TileIndex;
    type IntoIter = GridIterator;

    fn into_iter(self) -> GridIterator {
        self.iter()
    }
}

fn check_zoom(z: u8) -> Result<(), GridError> {
    if z > MAX_ZOOM {
        Err(GridError::InvalidZoom(z))
    } else {
        Ok(())
    }
}

fn tile_count(z: u8) -> f64 {
    (z as f64).exp2()
}

/// Fractional tile coordinates of a geographic point
pub fn project(lat: f64, lon: f64, z: u8) -> Result<(f64, f64), GridError> {
    check_zoom(z)?;
    if !lat.is_finite() || lat.abs() >= 90.0 {
        return Err(GridError::InvalidLatitude(lat));
    }
    if !lon.is_finite() {
        return Err(GridError::InvalidLongitude(lon));
    }
    let n = tile_count(z);
    let lat_rad = lat.to_radians();
    let x = n * (lon + 180.0) / 360.0;
    let y = n * (1.0 - lat_rad.tan().asinh() / consts::PI) / 2.0;
    if !y.is_finite() {
        return Err(GridError::InvalidLatitude(lat));
    }
    Ok((x, y))
}

/// Tile grid covering a bounding box
pub fn tiles_for_bbox(bbox: &BoundingBox, z: u8) -> Result<TileGrid, GridError> {
    // (lat_max, lon_max) is the north east corner, which has the lowest y
    let (x_a, y_a) = project(bbox.lat_min, bbox.lon_min, z)?;
    let (x_b, y_b) = project(bbox.lat_max, bbox.lon_max, z)?;
    let (x_min, x_max) = index_range(x_a, x_b, z);
    let (y_min, y_max) = index_range(y_a, y_b, z);
    Ok(TileGrid::new(z, x_min, x_max, y_min, y_max))
}

// Sorted cell range between two fractional coordinates.
// An upper edge on a cell boundary belongs to the preceding cell.
fn index_range(a: f64, b: f64, z: u8) -> (u32, u32) {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let last = tile_count(z) - 1.0;
    let min = (lo + EPSILON).floor().max(0.0).min(last);
    let max = ((hi - EPSILON).ceil() - 1.0).max(min).min(last);
    (min as u32, max as u32)
}

/// Inverse Mercator of a fractional tile row
fn row_to_lat(relative_y: f64) -> f64 {
    (consts::PI * (1.0 - 2.0 * relative_y)).sinh().atan().to_degrees()
}

/// Geographic bounds of a tile
pub fn tile_bounds(x: u32, y: u32, z: u8) -> BoundingBox {
    let n = tile_count(z);
    let unit = 360.0 / n;
    let lon1 = -180.0 + x as f64 * unit;
    let lat1 = row_to_lat(y as f64 / n);
    let lat2 = row_to_lat((y as f64 + 1.0) / n);
    BoundingBox::new(lon1, lat2, lon1 + unit, lat1)
}

/// Tile bounds in Spherical Mercator metres
pub fn tile_extent_merc(x: u32, y: u32, z: u8) -> Extent {
    let size = 2.0 * consts::PI * EARTH_RADIUS / tile_count(z);
    let origin = consts::PI * EARTH_RADIUS;
    Extent {
        minx: -origin + x as f64 * size,
        miny: origin - (y as f64 + 1.0) * size,
        maxx: -origin + (x as f64 + 1.0) * size,
        maxy: origin - y as f64 * size,
    }
}

/// Returns the Spherical Mercator (x, y) in meters
pub fn lonlat_to_merc(lon: f64, lat: f64) -> (f64, f64) {
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * ((consts::PI * 0.25) + (0.5 * lat.to_radians())).tan().ln();
    (x, y)
}

/// Returns (lon, lat) of a Spherical Mercator position
pub fn merc_to_lonlat(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / EARTH_RADIUS).to_degrees();
    let lat = (y / EARTH_RADIUS).sinh().atan().to_degrees();
    (lon, lat)
}

/// Projected bounding box
pub fn bbox_to_merc(bbox: &BoundingBox) -> Extent {
    let (minx, miny) = lonlat_to_merc(bbox.lon_min, bbox.lat_min);
    let (maxx, maxy) = lonlat_to_merc(bbox.lon_max, bbox.lat_max);
    Extent {
        minx,
        miny,
        maxx,
        maxy,
    }
}
