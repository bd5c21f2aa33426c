//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! WMTS tile matrices

use crate::grid::{Extent, TileGrid};

// Standardized rendering pixel size according to OGC Symbology Encoding standard
const PIXEL_SCREEN_WIDTH: f64 = 0.00028;

/// One zoom level of a WMTS tile matrix set
#[derive(PartialEq, Clone, Debug)]
pub struct TileMatrix {
    pub identifier: String,
    pub scale_denominator: f64,
    /// (x, y) of the top left corner in the matrix CRS
    pub top_left_corner: (f64, f64),
    pub tile_width: u32,
    pub tile_height: u32,
    pub matrix_width: u32,
    pub matrix_height: u32,
}

impl TileMatrix {
    /// Ground units per pixel
    pub fn resolution(&self) -> f64 {
        self.scale_denominator * PIXEL_SCREEN_WIDTH
    }
    /// Zoom level encoded as last part of the identifier (e.g. `EPSG:3857:15`)
    pub fn zoom(&self) -> Option<u8> {
        self.identifier
            .rsplit(':')
            .next()
            .and_then(|z| z.trim().parse::<u8>().ok())
    }
    /// The full matrix as tile grid
    pub fn full_range(&self) -> TileGrid {
        TileGrid::new(
            self.zoom().unwrap_or(0),
            0,
            self.matrix_width.saturating_sub(1),
            0,
            self.matrix_height.saturating_sub(1),
        )
    }
    /// Columns and rows covering an extent in the matrix CRS
    pub fn tile_range(&self, extent: &Extent) -> TileGrid {
        let res = self.resolution();
        let unitwidth = res * self.tile_width as f64;
        let unitheight = res * self.tile_height as f64;
        let (tlx, tly) = self.top_left_corner;

        let col = |x: f64| ((x - tlx) / unitwidth).floor();
        let row = |y: f64| ((tly - y) / unitheight).floor();
        let (col_a, col_b) = (col(extent.minx), col(extent.maxx));
        let (row_a, row_b) = (row(extent.miny), row(extent.maxy));

        let clamp_col = |c: f64| c.max(0.0).min(self.matrix_width.saturating_sub(1) as f64) as u32;
        let clamp_row = |r: f64| r.max(0.0).min(self.matrix_height.saturating_sub(1) as f64) as u32;
        TileGrid::new(
            self.zoom().unwrap_or(0),
            clamp_col(col_a.min(col_b)),
            clamp_col(col_a.max(col_b)),
            clamp_row(row_a.min(row_b)),
            clamp_row(row_a.max(row_b)),
        )
    }
}

#[cfg(test)]
pub(crate) fn google_matrix(zoom: u8) -> TileMatrix {
    let n = 1u32 << zoom;
    TileMatrix {
        identifier: format!("EPSG:3857:{}", zoom),
        scale_denominator: 559082264.0287178 / n as f64,
        top_left_corner: (-20037508.3427892, 20037508.3427892),
        tile_width: 256,
        tile_height: 256,
        matrix_width: n,
        matrix_height: n,
    }
}

#[test]
fn test_matrix_zoom() {
    let matrix = google_matrix(15);
    assert_eq!(matrix.zoom(), Some(15));
    let matrix = TileMatrix {
        identifier: "top".to_string(),
        ..google_matrix(0)
    };
    assert_eq!(matrix.zoom(), None);
}

#[test]
fn test_matrix_resolution() {
    let matrix = google_matrix(0);
    assert!((matrix.resolution() - 156543.0339).abs() < 0.001);
    assert_eq!(matrix.full_range(), TileGrid::new(0, 0, 0, 0, 0));
}
