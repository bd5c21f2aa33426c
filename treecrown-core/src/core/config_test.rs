//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{parse_config, parse_numlist, read_config, ApplicationCfg, BboxCfg};
use std::env;
use tile_grid::BoundingBox;

const EXAMPLE: &str = r#"
[wmts]
url = "https://geoservices.example.org/wmts"
username = "hackathon"
password = "{{env.TREECROWN_TEST_PASSWORD}}"
layer = "DOP20"

[download]
output = "output"
zoom = 15
limit = 100
sleep = 0.5

[convert]
source = "output/DOP20/EPSG-3857/{z}/{x}/{y}.png"
output = "raster"
zoom = 15
bbox = { lon_min = 9.12, lat_min = 47.65, lon_max = 9.2, lat_max = 47.7 }

[detect]
raster = "raster/merged.png"
predictions = "raster/predictions.csv"
output = "trees.csv"
soft_nms = true

[merge]
registry = "data/raw/registry.geojson"
detections = "trees.csv"
output = "trees.geojson"
drop_fields = ["OBJECTID"]
"#;

#[test]
fn test_parse_config() {
    env::set_var("TREECROWN_TEST_PASSWORD", "secret");
    let config: ApplicationCfg = parse_config(EXAMPLE.to_string(), "").unwrap();
    let wmts = config.wmts.unwrap();
    assert_eq!(wmts.password, Some("secret".to_string()));
    assert_eq!(wmts.layer, Some("DOP20".to_string()));
    assert_eq!(wmts.format, None);

    let download = config.download.unwrap();
    assert_eq!(download.zoom, Some(15));
    assert_eq!(download.limit, Some(100));
    assert_eq!(download.remove_old, false);
    assert!(download.bbox.is_none());

    let convert = config.convert.unwrap();
    let bbox = BoundingBox::from(convert.bbox.as_ref().unwrap());
    assert_eq!(bbox, BoundingBox::new(9.12, 47.65, 9.2, 47.7));
    assert!(!convert.keep_tiles);

    assert_eq!(config.detect.unwrap().soft_nms, Some(true));
    assert_eq!(
        config.merge.unwrap().drop_fields,
        Some(vec!["OBJECTID".to_string()])
    );
}

#[test]
fn test_empty_config() {
    let config: ApplicationCfg = parse_config("".to_string(), "").unwrap();
    assert!(config.wmts.is_none());
    assert!(config.merge.is_none());
}

#[test]
fn test_parse_error() {
    let config: Result<ApplicationCfg, _> = read_config("src/core/mod.rs");
    assert!(config
        .err()
        .unwrap()
        .starts_with("src/core/mod.rs - unexpected character found: `/`"));

    let config: Result<ApplicationCfg, _> = read_config("wrongfile");
    assert_eq!("Could not find config file!", config.err().unwrap());

    let config: Result<ApplicationCfg, _> =
        parse_config("[wmts]\nurl = \"${WMTS_URL}\"".to_string(), "");
    assert_eq!(
        "Replace environment variable syntax ${VARNAME} with `{{env.VARNAME}}`",
        config.err().unwrap()
    );

    let config: Result<BboxCfg, _> = parse_config("lon_min = 1.0".to_string(), "bbox");
    assert!(config.is_err());
}

#[test]
fn test_numlist() {
    assert_eq!(
        parse_numlist("21.49147,65.31016,21.5,65.31688"),
        Ok([21.49147, 65.31016, 21.5, 65.31688])
    );
    assert_eq!(parse_numlist("1 2  3 4"), Ok([1.0, 2.0, 3.0, 4.0]));
    assert_eq!(
        parse_numlist("1,2,3"),
        Err("Expected 4 values, got 3".to_string())
    );
    assert!(parse_numlist("1,2,x,4").is_err());
}
