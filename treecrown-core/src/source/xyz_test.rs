//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::source::{SourceError, TileSource, XyzSource};
use std::fs;
use tile_grid::TileIndex;

#[test]
fn test_url_template() {
    let source = XyzSource::new("https://tileserver-url.com/{z}/{x}/{y}.png");
    assert!(source.is_remote());
    assert_eq!(
        source.url(&TileIndex::new(73360, 33835), 17),
        "https://tileserver-url.com/17/73360/33835.png"
    );
    assert_eq!(source.extension(), "png");

    let source = XyzSource::new("https://tiles.example.com/{z}/{x}/{y}.jpeg?key=abc");
    assert_eq!(source.extension(), "jpeg");

    let source = XyzSource::new("https://tiles.example.com/{z}/{x}/{y}");
    assert_eq!(source.extension(), "png");
}

#[test]
fn test_local_source() {
    let dir = tempfile::tempdir().unwrap();
    let template = format!("file://{}/{{z}}/{{x}}/{{y}}.png", dir.path().display());
    let source = XyzSource::new(&template);
    assert!(!source.is_remote());
    assert!(source.describe().starts_with("Tile directory"));

    let tiledir = dir.path().join("3").join("4");
    fs::create_dir_all(&tiledir).unwrap();
    fs::write(tiledir.join("2.png"), b"PNG").unwrap();

    let data = source.fetch(&TileIndex::new(4, 2), 3).unwrap();
    assert_eq!(data, b"PNG".to_vec());

    match source.fetch(&TileIndex::new(4, 3), 3) {
        Err(SourceError::Io { path, .. }) => assert!(path.ends_with("3/4/3.png")),
        other => panic!("unexpected result {:?}", other.map(|d| d.len())),
    }
}
