//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::raster::{prj_path, world_file_path, GeoTransform, Mosaic, RasterError};
use crate::store::{tile_path, Filestore, TileStore};
use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::io::Cursor;
use std::path::Path;
use tile_grid::{TileGrid, TileIndex};

const ORIGIN: f64 = 20037508.342789244;

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
}

fn png_tile(color: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(4, 4, Rgb(color));
    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .unwrap();
    data
}

#[test]
fn test_tile_grid_transform() {
    let gt = GeoTransform::for_tile_grid(&TileGrid::new(0, 0, 0, 0, 0), 256, 256);
    assert_close(gt.0[0], -ORIGIN);
    assert_close(gt.0[3], ORIGIN);
    assert_close(gt.0[1], 156543.03392804097);
    assert_close(gt.0[5], -156543.03392804097);
    assert_eq!(gt.0[2], 0.0);
    let (x, y) = gt.apply(256.0, 256.0);
    assert_close(x, ORIGIN);
    assert_close(y, -ORIGIN);

    // Origin is the top left tile
    let gt = GeoTransform::for_tile_grid(&TileGrid::new(1, 1, 1, 1, 1), 512, 512);
    assert_close(gt.0[0], 0.0);
    assert_close(gt.0[3], 0.0);
    assert_close(gt.pixel_size().0, ORIGIN / 512.0);
}

#[test]
fn test_world_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("merged.pgw");
    let gt = GeoTransform::new(1000.0, 0.5, 2000.0, -0.5);
    assert_eq!(gt.world_file_content(), "0.5\n0\n0\n-0.5\n1000.25\n1999.75\n");
    gt.write_world_file(&path).unwrap();
    assert_eq!(GeoTransform::from_world_file(&path).unwrap(), gt);

    fs::write(&path, "0.5\n0\n0\n-0.5\n1000.25\n").unwrap();
    match GeoTransform::from_world_file(&path) {
        Err(RasterError::WorldFile { reason, .. }) => {
            assert_eq!(reason, "expected 6 values, got 5")
        }
        _ => panic!("world file error expected"),
    }
    fs::write(&path, "0.5\n0\n0\n-0.5\n1000.25\nabc\n").unwrap();
    assert!(GeoTransform::from_world_file(&path).is_err());
    assert!(GeoTransform::from_world_file(dir.path().join("missing.pgw")).is_err());
}

#[test]
fn test_sidecar_paths() {
    assert_eq!(world_file_path("out/merged.png"), Path::new("out/merged.pgw"));
    assert_eq!(world_file_path("merged.JPG"), Path::new("merged.jgw"));
    assert_eq!(world_file_path("merged.tif"), Path::new("merged.tfw"));
    assert_eq!(world_file_path("merged.bmp"), Path::new("merged.wld"));
    assert_eq!(prj_path("out/merged.png"), Path::new("out/merged.prj"));
}

#[test]
fn test_mosaic() {
    let dir = tempfile::tempdir().unwrap();
    let store = Filestore::new(dir.path().join("tiles/1"));
    store
        .write(&tile_path(&TileIndex::new(0, 0), "png"), &png_tile([255, 0, 0]))
        .unwrap();
    store
        .write(&tile_path(&TileIndex::new(1, 1), "png"), &png_tile([0, 0, 255]))
        .unwrap();
    store
        .write(&tile_path(&TileIndex::new(0, 1), "png"), b"no image")
        .unwrap();

    let grid = TileGrid::new(1, 0, 1, 0, 1);
    let mosaic = Mosaic::from_store(&store, &grid, "png").unwrap();
    assert_eq!((mosaic.width(), mosaic.height()), (8, 8));
    assert_eq!(mosaic.missing, 2);
    assert_eq!(mosaic.image.get_pixel(1, 1), &Rgb([255, 0, 0]));
    assert_eq!(mosaic.image.get_pixel(5, 1), &Rgb([0, 0, 0]));
    assert_eq!(mosaic.image.get_pixel(1, 5), &Rgb([0, 0, 0]));
    assert_eq!(mosaic.image.get_pixel(7, 7), &Rgb([0, 0, 255]));
    assert_close(mosaic.transform.0[0], -ORIGIN);
    assert_close(mosaic.transform.0[1], ORIGIN / 4.0);

    let output = dir.path().join("raster/merged.png");
    mosaic.write(&output).unwrap();
    assert!(output.exists());
    assert!(dir.path().join("raster/merged.prj").exists());
    let gt = GeoTransform::from_world_file(dir.path().join("raster/merged.pgw")).unwrap();
    for i in 0..6 {
        assert_close(gt.0[i], mosaic.transform.0[i]);
    }
    let written = image::open(&output).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (8, 8));
}

#[test]
fn test_empty_mosaic() {
    let dir = tempfile::tempdir().unwrap();
    let store = Filestore::new(dir.path());
    let grid = TileGrid::new(3, 0, 1, 0, 1);
    match Mosaic::from_store(&store, &grid, "png") {
        Err(RasterError::NoTiles(_)) => {}
        _ => panic!("NoTiles expected"),
    }
}
