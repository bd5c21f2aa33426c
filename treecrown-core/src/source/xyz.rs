//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Slippy map tile sources addressed by URL or path templates

use crate::source::http::HttpClient;
use crate::source::source::{SourceError, TileSource};
use std::fs;
use tile_grid::TileIndex;

/// Tile source with `{x}`, `{y}` and `{z}` placeholders
#[derive(Clone, Debug)]
pub struct XyzSource {
    pub template: String,
    client: Option<HttpClient>,
}

impl XyzSource {
    /// Remote source for `http(s)://` templates, local directory otherwise
    pub fn new(template: &str) -> XyzSource {
        if template.starts_with("http://") || template.starts_with("https://") {
            XyzSource {
                template: template.to_string(),
                client: Some(HttpClient::with_auth(None, None)),
            }
        } else {
            XyzSource {
                template: template.trim_start_matches("file://").to_string(),
                client: None,
            }
        }
    }
    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }
    pub fn url(&self, tile: &TileIndex, zoom: u8) -> String {
        self.template
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
            .replace("{z}", &zoom.to_string())
    }
}

impl TileSource for XyzSource {
    fn fetch(&self, tile: &TileIndex, zoom: u8) -> Result<Vec<u8>, SourceError> {
        let url = self.url(tile, zoom);
        match self.client {
            Some(ref client) => client.get(&url),
            None => fs::read(&url).map_err(|e| SourceError::Io {
                path: url,
                source: e,
            }),
        }
    }
    fn extension(&self) -> String {
        let name = self.template.rsplit('/').next().unwrap_or("");
        let name = name.split('?').next().unwrap_or("");
        match name.rsplit_once('.') {
            Some((_, ext)) if !ext.is_empty() && !ext.contains('}') => ext.to_lowercase(),
            _ => "png".to_string(),
        }
    }
    fn describe(&self) -> String {
        if self.is_remote() {
            format!("Tile server {}", self.template)
        } else {
            format!("Tile directory {}", self.template)
        }
    }
}
