//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! OGC WMTS capabilities and KVP tile requests

use crate::source::http::HttpClient;
use crate::source::source::{SourceError, TileSource};
use elementtree::Element;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use std::io::Read;
use std::str::FromStr;
use tile_grid::{BoundingBox, TileGrid, TileIndex, TileMatrix};

/// Service metadata and contents of a WMTS capabilities document
#[derive(Clone, Debug, Default)]
pub struct Capabilities {
    pub title: Option<String>,
    pub access_constraints: Option<String>,
    pub layers: Vec<WmtsLayer>,
    pub tile_matrix_sets: Vec<TileMatrixSet>,
}

#[derive(Clone, Debug, Default)]
pub struct WmtsLayer {
    pub identifier: String,
    pub title: Option<String>,
    pub abstract_: Option<String>,
    pub wgs84_bbox: Option<BoundingBox>,
    pub formats: Vec<String>,
    pub styles: Vec<String>,
    pub default_style: Option<String>,
    pub tile_matrix_set_links: Vec<TileMatrixSetLink>,
}

#[derive(Clone, Debug, Default)]
pub struct TileMatrixSetLink {
    pub tile_matrix_set: String,
    pub limits: Vec<TileMatrixLimits>,
}

/// Inclusive row and column limits of a tile matrix
#[derive(Clone, Debug, PartialEq)]
pub struct TileMatrixLimits {
    pub tile_matrix: String,
    pub min_row: u32,
    pub max_row: u32,
    pub min_col: u32,
    pub max_col: u32,
}

#[derive(Clone, Debug, Default)]
pub struct TileMatrixSet {
    pub identifier: String,
    pub crs: Option<String>,
    pub matrices: Vec<TileMatrix>,
}

// Namespace agnostic element lookup
fn child<'a>(elem: &'a Element, name: &str) -> Option<&'a Element> {
    elem.children().find(|c| c.tag().name() == name)
}

fn children<'a>(elem: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
    elem.children().filter(move |c| c.tag().name() == name)
}

fn child_text(elem: &Element, name: &str) -> Option<String> {
    child(elem, name)
        .map(|c| c.text().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn required<T: FromStr>(elem: &Element, name: &str) -> Result<T, SourceError> {
    let text = child_text(elem, name).ok_or_else(|| {
        SourceError::Capabilities(format!("missing element {} in {}", name, elem.tag().name()))
    })?;
    text.parse::<T>()
        .map_err(|_| SourceError::Capabilities(format!("invalid value '{}' in {}", text, name)))
}

fn parse_pair(text: &str) -> Option<(f64, f64)> {
    let mut values = text.split_whitespace().map(|v| v.parse::<f64>());
    match (values.next(), values.next()) {
        (Some(Ok(a)), Some(Ok(b))) => Some((a, b)),
        _ => None,
    }
}

impl Capabilities {
    pub fn parse<R: Read>(reader: R) -> Result<Capabilities, SourceError> {
        let root = Element::from_reader(reader)
            .map_err(|e| SourceError::Capabilities(e.to_string()))?;
        if root.tag().name() != "Capabilities" {
            return Err(SourceError::Capabilities(format!(
                "unexpected root element {}",
                root.tag().name()
            )));
        }
        let mut caps = Capabilities::default();
        if let Some(ident) = child(&root, "ServiceIdentification") {
            caps.title = child_text(ident, "Title");
            caps.access_constraints = child_text(ident, "AccessConstraints");
        }
        let contents = child(&root, "Contents")
            .ok_or_else(|| SourceError::Capabilities("missing Contents".to_string()))?;
        for layer in children(contents, "Layer") {
            caps.layers.push(Self::parse_layer(layer)?);
        }
        for set in children(contents, "TileMatrixSet") {
            caps.tile_matrix_sets.push(Self::parse_matrix_set(set)?);
        }
        Ok(caps)
    }

    fn parse_layer(layer: &Element) -> Result<WmtsLayer, SourceError> {
        let wgs84_bbox = child(layer, "WGS84BoundingBox").and_then(|bbox| {
            let lower = child_text(bbox, "LowerCorner").and_then(|t| parse_pair(&t))?;
            let upper = child_text(bbox, "UpperCorner").and_then(|t| parse_pair(&t))?;
            Some(BoundingBox::new(lower.0, lower.1, upper.0, upper.1))
        });
        let mut styles = Vec::new();
        let mut default_style = None;
        for style in children(layer, "Style") {
            if let Some(id) = child_text(style, "Identifier") {
                if style.get_attr("isDefault") == Some("true") {
                    default_style = Some(id.clone());
                }
                styles.push(id);
            }
        }
        let mut links = Vec::new();
        for link in children(layer, "TileMatrixSetLink") {
            let mut limits = Vec::new();
            if let Some(set_limits) = child(link, "TileMatrixSetLimits") {
                for lim in children(set_limits, "TileMatrixLimits") {
                    limits.push(TileMatrixLimits {
                        tile_matrix: required(lim, "TileMatrix")?,
                        min_row: required(lim, "MinTileRow")?,
                        max_row: required(lim, "MaxTileRow")?,
                        min_col: required(lim, "MinTileCol")?,
                        max_col: required(lim, "MaxTileCol")?,
                    });
                }
            }
            links.push(TileMatrixSetLink {
                tile_matrix_set: required(link, "TileMatrixSet")?,
                limits,
            });
        }
        Ok(WmtsLayer {
            identifier: required(layer, "Identifier")?,
            title: child_text(layer, "Title"),
            abstract_: child_text(layer, "Abstract"),
            wgs84_bbox,
            formats: children(layer, "Format")
                .map(|f| f.text().trim().to_string())
                .collect(),
            styles,
            default_style,
            tile_matrix_set_links: links,
        })
    }

    fn parse_matrix_set(set: &Element) -> Result<TileMatrixSet, SourceError> {
        let mut matrices = Vec::new();
        for tm in children(set, "TileMatrix") {
            let corner = child_text(tm, "TopLeftCorner")
                .and_then(|t| parse_pair(&t))
                .ok_or_else(|| SourceError::Capabilities("invalid TopLeftCorner".to_string()))?;
            matrices.push(TileMatrix {
                identifier: required(tm, "Identifier")?,
                scale_denominator: required(tm, "ScaleDenominator")?,
                top_left_corner: corner,
                tile_width: required(tm, "TileWidth")?,
                tile_height: required(tm, "TileHeight")?,
                matrix_width: required(tm, "MatrixWidth")?,
                matrix_height: required(tm, "MatrixHeight")?,
            });
        }
        Ok(TileMatrixSet {
            identifier: required(set, "Identifier")?,
            crs: child_text(set, "SupportedCRS"),
            matrices,
        })
    }

    pub fn layer(&self, identifier: &str) -> Option<&WmtsLayer> {
        self.layers.iter().find(|l| l.identifier == identifier)
    }

    pub fn tile_matrix_set(&self, identifier: &str) -> Option<&TileMatrixSet> {
        self.tile_matrix_sets
            .iter()
            .find(|s| s.identifier == identifier)
    }

    /// Fetch and parse the capabilities document of a service
    pub fn request(url: &str, client: &HttpClient) -> Result<Capabilities, SourceError> {
        let data = client.get(&capabilities_url(url))?;
        Capabilities::parse(data.as_slice())
    }
}

impl WmtsLayer {
    pub fn link(&self, tile_matrix_set: &str) -> Option<&TileMatrixSetLink> {
        self.tile_matrix_set_links
            .iter()
            .find(|l| l.tile_matrix_set == tile_matrix_set)
    }
    pub fn style(&self) -> String {
        self.default_style
            .clone()
            .or_else(|| self.styles.first().cloned())
            .unwrap_or_else(|| "default".to_string())
    }
}

impl TileMatrixSetLink {
    pub fn limits_for(&self, tile_matrix: &str) -> Option<&TileMatrixLimits> {
        self.limits.iter().find(|l| l.tile_matrix == tile_matrix)
    }
}

impl TileMatrixLimits {
    pub fn to_grid(&self, zoom: u8) -> TileGrid {
        TileGrid::new(zoom, self.min_col, self.max_col, self.min_row, self.max_row)
    }
}

impl TileMatrixSet {
    pub fn matrix_for_zoom(&self, zoom: u8) -> Option<&TileMatrix> {
        self.matrices.iter().find(|m| m.zoom() == Some(zoom))
    }
}

/// GetCapabilities URL for a service endpoint
pub fn capabilities_url(url: &str) -> String {
    if url.to_lowercase().ends_with(".xml") || url.to_lowercase().contains("request=getcapabilities")
    {
        url.to_string()
    } else {
        format!(
            "{}{}SERVICE=WMTS&REQUEST=GetCapabilities&VERSION=1.0.0",
            url,
            query_separator(url)
        )
    }
}

fn query_separator(url: &str) -> &'static str {
    if !url.contains('?') {
        "?"
    } else if url.ends_with('?') || url.ends_with('&') {
        ""
    } else {
        "&"
    }
}

/// KVP GetTile requests of one tile matrix
#[derive(Clone, Debug)]
pub struct WmtsSource {
    pub url: String,
    pub layer: String,
    pub style: String,
    pub format: String,
    pub tile_matrix_set: String,
    pub tile_matrix: String,
    pub client: HttpClient,
}

impl WmtsSource {
    pub fn tile_url(&self, tile: &TileIndex) -> String {
        let enc = |v: &str| utf8_percent_encode(v, NON_ALPHANUMERIC).to_string();
        let base = self.url.split('?').next().unwrap_or(&self.url);
        format!(
            "{}?SERVICE=WMTS&REQUEST=GetTile&VERSION=1.0.0&LAYER={}&STYLE={}&FORMAT={}&TILEMATRIXSET={}&TILEMATRIX={}&TILEROW={}&TILECOL={}",
            base,
            enc(&self.layer),
            enc(&self.style),
            enc(&self.format),
            enc(&self.tile_matrix_set),
            enc(&self.tile_matrix),
            tile.y,
            tile.x
        )
    }
}

impl TileSource for WmtsSource {
    fn fetch(&self, tile: &TileIndex, _zoom: u8) -> Result<Vec<u8>, SourceError> {
        self.client.get(&self.tile_url(tile))
    }
    fn extension(&self) -> String {
        let ext = self.format.rsplit('/').next().unwrap_or("png");
        match ext {
            "jpeg" => "jpg".to_string(),
            ext => ext.to_string(),
        }
    }
    fn describe(&self) -> String {
        format!(
            "WMTS layer {} ({} {})",
            self.layer, self.tile_matrix_set, self.tile_matrix
        )
    }
}
