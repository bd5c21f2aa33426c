//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::io;
use thiserror::Error;
use tile_grid::TileIndex;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request to {url} failed with HTTP status {code}")]
    Http { url: String, code: u32 },
    #[error("request failed: {0}")]
    Curl(#[from] curl::Error),
    #[error("error reading {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("invalid capabilities document: {0}")]
    Capabilities(String),
}

/// Provider of tile images addressed by x, y and zoom
pub trait TileSource: Send + Sync {
    /// Encoded tile image
    fn fetch(&self, tile: &TileIndex, zoom: u8) -> Result<Vec<u8>, SourceError>;
    /// File extension of the delivered images
    fn extension(&self) -> String;
    fn describe(&self) -> String;
}
