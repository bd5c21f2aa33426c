//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::source::http::HttpClient;
use crate::source::source::{SourceError, TileSource};
use crate::source::wmts::{capabilities_url, Capabilities, WmtsSource};
use tile_grid::{BoundingBox, TileGrid, TileIndex};

const CAPABILITIES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Capabilities xmlns="http://www.opengis.net/wmts/1.0" xmlns:ows="http://www.opengis.net/ows/1.1" version="1.0.0">
  <ows:ServiceIdentification>
    <ows:Title>Orthophotos</ows:Title>
    <ows:AccessConstraints>registered users only</ows:AccessConstraints>
  </ows:ServiceIdentification>
  <Contents>
    <Layer>
      <ows:Title>Digital orthophotos 20cm</ows:Title>
      <ows:Abstract>Aerial imagery</ows:Abstract>
      <ows:WGS84BoundingBox>
        <ows:LowerCorner>9.0 47.5</ows:LowerCorner>
        <ows:UpperCorner>9.5 47.9</ows:UpperCorner>
      </ows:WGS84BoundingBox>
      <ows:Identifier>DOP20</ows:Identifier>
      <Style isDefault="false"><ows:Identifier>grey</ows:Identifier></Style>
      <Style isDefault="true"><ows:Identifier>default</ows:Identifier></Style>
      <Format>image/png</Format>
      <Format>image/jpeg</Format>
      <TileMatrixSetLink>
        <TileMatrixSet>EPSG:3857</TileMatrixSet>
        <TileMatrixSetLimits>
          <TileMatrixLimits>
            <TileMatrix>EPSG:3857:14</TileMatrix>
            <MinTileRow>5700</MinTileRow>
            <MaxTileRow>5702</MaxTileRow>
            <MinTileCol>8600</MinTileCol>
            <MaxTileCol>8601</MaxTileCol>
          </TileMatrixLimits>
        </TileMatrixSetLimits>
      </TileMatrixSetLink>
    </Layer>
    <TileMatrixSet>
      <ows:Identifier>EPSG:3857</ows:Identifier>
      <ows:SupportedCRS>urn:ogc:def:crs:EPSG::3857</ows:SupportedCRS>
      <TileMatrix>
        <ows:Identifier>EPSG:3857:0</ows:Identifier>
        <ScaleDenominator>559082264.0287178</ScaleDenominator>
        <TopLeftCorner>-20037508.342789244 20037508.342789244</TopLeftCorner>
        <TileWidth>256</TileWidth>
        <TileHeight>256</TileHeight>
        <MatrixWidth>1</MatrixWidth>
        <MatrixHeight>1</MatrixHeight>
      </TileMatrix>
      <TileMatrix>
        <ows:Identifier>EPSG:3857:14</ows:Identifier>
        <ScaleDenominator>34123.67333513</ScaleDenominator>
        <TopLeftCorner>-20037508.342789244 20037508.342789244</TopLeftCorner>
        <TileWidth>256</TileWidth>
        <TileHeight>256</TileHeight>
        <MatrixWidth>16384</MatrixWidth>
        <MatrixHeight>16384</MatrixHeight>
      </TileMatrix>
    </TileMatrixSet>
  </Contents>
</Capabilities>
"#;

#[test]
fn test_parse_capabilities() {
    let caps = Capabilities::parse(CAPABILITIES.as_bytes()).unwrap();
    assert_eq!(caps.title, Some("Orthophotos".to_string()));
    assert_eq!(
        caps.access_constraints,
        Some("registered users only".to_string())
    );
    assert_eq!(caps.layers.len(), 1);

    let layer = caps.layer("DOP20").unwrap();
    assert_eq!(layer.title, Some("Digital orthophotos 20cm".to_string()));
    assert_eq!(layer.abstract_, Some("Aerial imagery".to_string()));
    assert_eq!(layer.wgs84_bbox, Some(BoundingBox::new(9.0, 47.5, 9.5, 47.9)));
    assert_eq!(layer.formats, vec!["image/png", "image/jpeg"]);
    assert_eq!(layer.styles, vec!["grey", "default"]);
    assert_eq!(layer.style(), "default");
    assert!(caps.layer("DOP40").is_none());

    let link = layer.link("EPSG:3857").unwrap();
    assert!(layer.link("EPSG:25832").is_none());
    let limits = link.limits_for("EPSG:3857:14").unwrap();
    assert_eq!(limits.to_grid(14), TileGrid::new(14, 8600, 8601, 5700, 5702));
    assert_eq!(limits.to_grid(14).len(), 6);
    assert!(link.limits_for("EPSG:3857:15").is_none());

    let set = caps.tile_matrix_set("EPSG:3857").unwrap();
    assert_eq!(set.crs, Some("urn:ogc:def:crs:EPSG::3857".to_string()));
    assert_eq!(set.matrices.len(), 2);
    let matrix = set.matrix_for_zoom(14).unwrap();
    assert_eq!(matrix.matrix_width, 16384);
    assert_eq!(matrix.top_left_corner.0, -20037508.342789244);
    assert_eq!(matrix.full_range(), TileGrid::new(14, 0, 16383, 0, 16383));
    assert!(set.matrix_for_zoom(15).is_none());
}

#[test]
fn test_invalid_capabilities() {
    let err = Capabilities::parse("<ServiceException/>".as_bytes()).err();
    match err {
        Some(SourceError::Capabilities(msg)) => {
            assert_eq!(msg, "unexpected root element ServiceException")
        }
        _ => panic!("capabilities error expected"),
    }
    assert!(Capabilities::parse("not xml".as_bytes()).is_err());

    let missing_width = CAPABILITIES.replace("<MatrixWidth>1</MatrixWidth>", "");
    assert!(Capabilities::parse(missing_width.as_bytes()).is_err());
}

#[test]
fn test_capabilities_url() {
    assert_eq!(
        capabilities_url("https://example.org/wmts"),
        "https://example.org/wmts?SERVICE=WMTS&REQUEST=GetCapabilities&VERSION=1.0.0"
    );
    assert_eq!(
        capabilities_url("https://example.org/service?map=ortho"),
        "https://example.org/service?map=ortho&SERVICE=WMTS&REQUEST=GetCapabilities&VERSION=1.0.0"
    );
    assert_eq!(
        capabilities_url("https://example.org/1.0.0/WMTSCapabilities.xml"),
        "https://example.org/1.0.0/WMTSCapabilities.xml"
    );
}

#[test]
fn test_get_tile_url() {
    let source = WmtsSource {
        url: "https://example.org/wmts?".to_string(),
        layer: "DOP20".to_string(),
        style: "default".to_string(),
        format: "image/jpeg".to_string(),
        tile_matrix_set: "EPSG:3857".to_string(),
        tile_matrix: "EPSG:3857:14".to_string(),
        client: HttpClient::new(),
    };
    assert_eq!(
        source.tile_url(&TileIndex::new(8600, 5701)),
        "https://example.org/wmts?SERVICE=WMTS&REQUEST=GetTile&VERSION=1.0.0&LAYER=DOP20&STYLE=default&FORMAT=image%2Fjpeg&TILEMATRIXSET=EPSG%3A3857&TILEMATRIX=EPSG%3A3857%3A14&TILEROW=5701&TILECOL=8600"
    );
    assert_eq!(source.extension(), "jpg");
    assert_eq!(source.describe(), "WMTS layer DOP20 (EPSG:3857 EPSG:3857:14)");
}
