//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use std::io;
use std::io::Read;
use tile_grid::TileIndex;

pub trait TileStore {
    fn info(&self) -> String;
    fn read<F>(&self, path: &str, read: F) -> bool
    where
        F: FnMut(&mut dyn Read);
    fn write(&self, path: &str, obj: &[u8]) -> Result<(), io::Error>;
    fn exists(&self, path: &str) -> bool;
    /// Remove all stored tiles
    fn remove_all(&self) -> Result<(), io::Error>;
}

/// Relative path of a tile within a zoom level directory
pub fn tile_path(tile: &TileIndex, extension: &str) -> String {
    format!("{}/{}.{}", tile.x, tile.y, extension)
}
