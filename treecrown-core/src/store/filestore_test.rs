//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::store::{tile_path, Filestore, TileStore};
use std::path::Path;
use tile_grid::TileIndex;

#[test]
fn test_tilestore() {
    let dir = tempfile::tempdir().unwrap();
    let store = Filestore::new(dir.path().join("15"));
    let path = tile_path(&TileIndex::new(17231, 11520), "png");
    assert_eq!(path, "17231/11520.png");
    let fullpath = store.fullpath(&path);
    let obj = "0123456789";

    // Missing tile
    assert!(!store.exists(&path));
    assert_eq!(store.read(&path, |_| {}), false);

    // Write tile
    store.write(&path, obj.as_bytes()).unwrap();
    assert!(Path::new(&fullpath).exists());
    assert!(store.exists(&path));

    // Read tile
    let mut s = String::new();
    assert!(store.read(&path, |f| {
        let _ = f.read_to_string(&mut s);
    }));
    assert_eq!(&s, "0123456789");

    // Remove all
    store.remove_all().unwrap();
    assert!(!store.exists(&path));
    assert!(!Path::new(&store.basepath).exists());
    // Removing a missing directory is fine
    store.remove_all().unwrap();
}
