//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::raster::geotransform::{prj_path, world_file_path, GeoTransform, EPSG_3857_WKT};
use crate::raster::RasterError;
use crate::store::{tile_path, TileStore};
use image::{imageops, RgbImage};
use std::fs;
use std::path::Path;
use tile_grid::TileGrid;

/// Largest mosaic in pixels
pub const MAX_PIXELS: u64 = 1 << 30;

/// RGB raster assembled from the tiles of a grid, in EPSG:3857
pub struct Mosaic {
    pub image: RgbImage,
    pub transform: GeoTransform,
    pub grid: TileGrid,
    /// Number of tiles which were missing or could not be decoded
    pub missing: u64,
}

impl Mosaic {
    /// Stitch the tiles of `grid` stored as `{x}/{y}.{extension}`.
    /// Missing tiles are left black.
    pub fn from_store<S: TileStore>(
        store: &S,
        grid: &TileGrid,
        extension: &str,
    ) -> Result<Mosaic, RasterError> {
        let mut canvas: Option<RgbImage> = None;
        let mut tile_size = (0, 0);
        let mut missing = 0;
        for tile in grid {
            let path = tile_path(&tile, extension);
            let mut data = Vec::new();
            let found = store.read(&path, |reader| {
                if let Err(e) = reader.read_to_end(&mut data) {
                    warn!("Error reading tile {}: {}", path, e);
                }
            });
            if !found || data.is_empty() {
                warn!("Tile {} missing", path);
                missing += 1;
                continue;
            }
            let img = match image::load_from_memory(&data) {
                Ok(img) => img.to_rgb8(),
                Err(e) => {
                    warn!("Error decoding tile {}: {}", path, e);
                    missing += 1;
                    continue;
                }
            };
            if canvas.is_none() {
                tile_size = img.dimensions();
                let width = grid.width() as u64 * tile_size.0 as u64;
                let height = grid.height() as u64 * tile_size.1 as u64;
                if width * height > MAX_PIXELS {
                    return Err(RasterError::TooLarge { width, height });
                }
                debug!("Mosaic size {}x{} pixels", width, height);
                canvas = Some(RgbImage::new(width as u32, height as u32));
            }
            if img.dimensions() != tile_size {
                warn!(
                    "Tile {} has size {:?}, expected {:?}",
                    path,
                    img.dimensions(),
                    tile_size
                );
            }
            if let Some(ref mut canvas) = canvas {
                let x = (tile.x - grid.x_min) as i64 * tile_size.0 as i64;
                let y = (tile.y - grid.y_min) as i64 * tile_size.1 as i64;
                imageops::replace(canvas, &img, x, y);
            }
        }
        let image = canvas.ok_or_else(|| RasterError::NoTiles(store.info()))?;
        Ok(Mosaic {
            image,
            transform: GeoTransform::for_tile_grid(grid, tile_size.0, tile_size.1),
            grid: *grid,
            missing,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Write the image (format by extension) with world file and projection
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), RasterError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| RasterError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        self.image.save(path)?;
        self.write_georeference(path)
    }

    /// World file and `.prj` next to an already written raster
    pub fn write_georeference<P: AsRef<Path>>(&self, path: P) -> Result<(), RasterError> {
        let path = path.as_ref();
        self.transform.write_world_file(world_file_path(path))?;
        let prj = prj_path(path);
        fs::write(&prj, EPSG_3857_WKT).map_err(|source| RasterError::Io {
            path: prj.display().to_string(),
            source,
        })?;
        info!(
            "Raster {} written ({}x{} pixels)",
            path.display(),
            self.width(),
            self.height()
        );
        Ok(())
    }
}

/// Decode a raster image file as RGB
pub fn read_rgb<P: AsRef<Path>>(path: P) -> Result<RgbImage, RasterError> {
    let image = image::open(path.as_ref())?.to_rgb8();
    debug!(
        "{}: {}x{} pixels",
        path.as_ref().display(),
        image.width(),
        image.height()
    );
    Ok(image)
}
