//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::io;
use thiserror::Error;
use tile_grid::GridError;
use treecrown_core::detect::DetectError;
use treecrown_core::merge::MergeError;
use treecrown_core::raster::RasterError;
use treecrown_core::source::SourceError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("no tiles to process")]
    EmptyGrid,
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Merge(#[from] MergeError),
    #[error("error accessing {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("couldn't initialize tokio runtime: {0}")]
    Runtime(io::Error),
    #[cfg(feature = "with-gdal")]
    #[error("GDAL error: {0}")]
    Gdal(#[from] treecrown_gdal::GdalError),
}
