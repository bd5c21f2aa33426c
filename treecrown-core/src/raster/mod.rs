//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Georeferenced rasters stitched from tiles

mod geotransform;
mod mosaic;

#[cfg(test)]
mod raster_test;

pub use self::geotransform::{prj_path, world_file_path, GeoTransform, EPSG_3857_WKT};
pub use self::mosaic::{read_rgb, Mosaic, MAX_PIXELS};

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("error accessing {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("invalid world file {path}: {reason}")]
    WorldFile { path: String, reason: String },
    #[error("no tile of {0} could be decoded")]
    NoTiles(String),
    #[error("mosaic of {width}x{height} pixels exceeds the limit of {} pixels", MAX_PIXELS)]
    TooLarge { width: u64, height: u64 },
}
