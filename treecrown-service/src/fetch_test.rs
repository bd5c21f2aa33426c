//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::fetch::{fetch_tiles, FetchOptions, FetchSummary};
use std::fs;
use std::sync::Arc;
use tile_grid::TileGrid;
use treecrown_core::source::XyzSource;
use treecrown_core::store::{Filestore, TileStore};

fn options(limit: Option<u64>) -> FetchOptions {
    FetchOptions {
        limit,
        sleep: None,
        threads: 2,
        progress: false,
    }
}

#[test]
fn test_fetch_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    for (x, y) in &[(0, 0), (1, 0), (0, 1)] {
        let path = src.join(format!("3/{}/{}.png", x, y));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, format!("tile {} {}", x, y)).unwrap();
    }
    let template = format!("{}/{{z}}/{{x}}/{{y}}.png", src.display());
    let source = Arc::new(XyzSource::new(&template));
    let store = Filestore::new(dir.path().join("tiles/3"));
    let grid = TileGrid::new(3, 0, 1, 0, 1);

    let summary = fetch_tiles(source.clone(), &store, &grid, &options(Some(2))).unwrap();
    assert_eq!(
        summary,
        FetchSummary {
            fetched: 2,
            skipped: 0,
            failed: 0,
            total: 4
        }
    );
    assert_eq!(summary.remaining(), 2);
    assert!(store.exists("0/0.png"));
    assert!(store.exists("1/0.png"));
    assert!(!store.exists("0/1.png"));
    assert_eq!(
        fs::read_to_string(store.fullpath("1/0.png")).unwrap(),
        "tile 1 0"
    );

    // Second run continues where the limit stopped
    let summary = fetch_tiles(source, &store, &grid, &options(None)).unwrap();
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.fetched, 1);
    // Tile 1/1 is missing in the source
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.remaining(), 0);
    assert!(!store.exists("1/1.png"));
}
