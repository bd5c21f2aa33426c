//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tiles of a bounding box stitched to one georeferenced raster

use crate::error::ServiceError;
use crate::fetch::{fetch_tiles, FetchOptions};
use crate::params::ConvertParams;
use std::path::PathBuf;
use std::sync::Arc;
use tile_grid::tiles_for_bbox;
use treecrown_core::raster::Mosaic;
use treecrown_core::source::{TileSource, XyzSource};
use treecrown_core::store::{Filestore, TileStore};

/// Build the raster and return its path
pub fn convert(params: &ConvertParams) -> Result<PathBuf, ServiceError> {
    let grid = tiles_for_bbox(&params.bbox, params.zoom)?;
    info!(
        "Zoom level {}: x {}-{}, y {}-{} ({} tiles)",
        grid.zoom,
        grid.x_min,
        grid.x_max,
        grid.y_min,
        grid.y_max,
        grid.len()
    );
    let source = XyzSource::new(&params.source);
    let extension = source.extension();
    let store = Filestore::new(params.tile_dir());
    let opts = FetchOptions {
        limit: None,
        sleep: None,
        threads: params.threads,
        progress: params.progress,
    };
    let summary = fetch_tiles(Arc::new(source), &store, &grid, &opts)?;
    summary.log();

    let mosaic = Mosaic::from_store(&store, &grid, &extension)?;
    if mosaic.missing > 0 {
        warn!("{} of {} tiles missing in raster", mosaic.missing, grid.len());
    }
    let path = params.raster_path();
    write_raster(&mosaic, &path)?;

    if !params.keep_tiles {
        store.remove_all().map_err(|source| ServiceError::Io {
            path: store.basepath.clone(),
            source,
        })?;
    }
    Ok(path)
}

#[cfg(feature = "with-gdal")]
fn write_raster(mosaic: &Mosaic, path: &PathBuf) -> Result<(), ServiceError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("tif") | Some("tiff") => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|source| ServiceError::Io {
                    path: parent.display().to_string(),
                    source,
                })?;
            }
            treecrown_gdal::write_geotiff(mosaic, path)?;
            Ok(())
        }
        _ => Ok(mosaic.write(path)?),
    }
}

#[cfg(not(feature = "with-gdal"))]
fn write_raster(mosaic: &Mosaic, path: &PathBuf) -> Result<(), ServiceError> {
    Ok(mosaic.write(path)?)
}
