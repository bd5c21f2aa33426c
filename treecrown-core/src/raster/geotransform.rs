//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::raster::RasterError;
use std::fs;
use std::path::{Path, PathBuf};
use tile_grid::{tile_extent_merc, TileGrid};

pub const EPSG_3857_WKT: &str = r#"PROJCS["WGS 84 / Pseudo-Mercator",GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563,AUTHORITY["EPSG","7030"]],AUTHORITY["EPSG","6326"]],PRIMEM["Greenwich",0,AUTHORITY["EPSG","8901"]],UNIT["degree",0.0174532925199433,AUTHORITY["EPSG","9122"]],AUTHORITY["EPSG","4326"]],PROJECTION["Mercator_1SP"],PARAMETER["central_meridian",0],PARAMETER["scale_factor",1],PARAMETER["false_easting",0],PARAMETER["false_northing",0],UNIT["metre",1,AUTHORITY["EPSG","9001"]],AXIS["Easting",EAST],AXIS["Northing",NORTH],EXTENSION["PROJ4","+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +wktext +no_defs"],AUTHORITY["EPSG","3857"]]"#;

/// Affine pixel to world transform in GDAL order
/// `[x0, pixel width, row rotation, y0, column rotation, pixel height]`.
/// The origin is the outer corner of the top left pixel.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct GeoTransform(pub [f64; 6]);

impl GeoTransform {
    pub fn new(x0: f64, pixel_width: f64, y0: f64, pixel_height: f64) -> GeoTransform {
        GeoTransform([x0, pixel_width, 0.0, y0, 0.0, pixel_height])
    }

    /// EPSG:3857 transform of a raster mosaicked from all tiles of `grid`
    pub fn for_tile_grid(grid: &TileGrid, tile_width: u32, tile_height: u32) -> GeoTransform {
        let tile = tile_extent_merc(grid.x_min, grid.y_min, grid.zoom);
        GeoTransform::new(
            tile.minx,
            (tile.maxx - tile.minx) / tile_width as f64,
            tile.maxy,
            -(tile.maxy - tile.miny) / tile_height as f64,
        )
    }

    /// World coordinates of a (fractional) pixel position
    pub fn apply(&self, px: f64, py: f64) -> (f64, f64) {
        let gt = &self.0;
        (
            gt[0] + px * gt[1] + py * gt[2],
            gt[3] + px * gt[4] + py * gt[5],
        )
    }

    pub fn pixel_size(&self) -> (f64, f64) {
        (self.0[1], self.0[5])
    }

    /// Parse the six lines `A D B E C F` of a world file.
    /// C and F refer to the centre of the top left pixel.
    pub fn from_world_file<P: AsRef<Path>>(path: P) -> Result<GeoTransform, RasterError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| RasterError::Io {
            path: display.clone(),
            source,
        })?;
        let values = content
            .split_whitespace()
            .map(|v| {
                v.parse::<f64>().map_err(|_| RasterError::WorldFile {
                    path: display.clone(),
                    reason: format!("invalid number '{}'", v),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        match values.as_slice() {
            [a, d, b, e, c, f] => Ok(GeoTransform([
                c - a / 2.0 - b / 2.0,
                *a,
                *b,
                f - d / 2.0 - e / 2.0,
                *d,
                *e,
            ])),
            _ => Err(RasterError::WorldFile {
                path: display,
                reason: format!("expected 6 values, got {}", values.len()),
            }),
        }
    }

    pub fn world_file_content(&self) -> String {
        let gt = &self.0;
        let (c, f) = self.apply(0.5, 0.5);
        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n",
            gt[1], gt[4], gt[2], gt[5], c, f
        )
    }

    pub fn write_world_file<P: AsRef<Path>>(&self, path: P) -> Result<(), RasterError> {
        let path = path.as_ref();
        fs::write(path, self.world_file_content()).map_err(|source| RasterError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

/// World file accompanying a raster (`merged.png` -> `merged.pgw`)
pub fn world_file_path<P: AsRef<Path>>(raster: P) -> PathBuf {
    let raster = raster.as_ref();
    let ext = raster
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let wld = match ext.as_str() {
        "png" => "pgw",
        "jpg" | "jpeg" => "jgw",
        "tif" | "tiff" => "tfw",
        _ => "wld",
    };
    raster.with_extension(wld)
}

pub fn prj_path<P: AsRef<Path>>(raster: P) -> PathBuf {
    raster.as_ref().with_extension("prj")
}
