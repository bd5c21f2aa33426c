//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::convert::convert;
use crate::detect::detect;
use crate::error::ServiceError;
use crate::merge::merge;
use crate::params::{ConvertParams, DetectParams, MergeParams};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tile_grid::BoundingBox;
use treecrown_core::detect::{read_trees, PredictParams};
use treecrown_core::merge::{JoinParams, RegistryOptions};
use treecrown_core::raster::{prj_path, world_file_path, GeoTransform};

fn write_tile(dir: &Path, y: u32, color: [u8; 3]) {
    let path = dir.join(format!("14/9170/{}.png", y));
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    RgbImage::from_pixel(8, 8, Rgb(color)).save(&path).unwrap();
}

#[test]
fn test_convert() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tile(&src, 4229, [255, 0, 0]);
    write_tile(&src, 4230, [0, 0, 255]);
    let params = ConvertParams {
        source: format!("{}/{{z}}/{{x}}/{{y}}.png", src.display()),
        output: dir.path().join("raster").display().to_string(),
        zoom: 14,
        bbox: BoundingBox::new(21.49147, 65.31016, 21.5, 65.31688),
        format: "png".to_string(),
        keep_tiles: false,
        threads: 2,
        progress: false,
    };
    let path = convert(&params).unwrap();
    assert_eq!(path, params.raster_path());

    let raster = image::open(&path).unwrap().to_rgb8();
    assert_eq!(raster.dimensions(), (8, 16));
    assert_eq!(raster.get_pixel(0, 0), &Rgb([255, 0, 0]));
    assert_eq!(raster.get_pixel(7, 15), &Rgb([0, 0, 255]));
    assert!(prj_path(&path).exists());
    let transform = GeoTransform::from_world_file(world_file_path(&path)).unwrap();
    // 8 pixels per tile of 2445.98 m
    assert!((transform.0[1] - 305.748).abs() < 1e-3, "{:?}", transform);
    assert!(!params.tile_dir().exists());

    let params = ConvertParams {
        keep_tiles: true,
        ..params
    };
    convert(&params).unwrap();
    assert!(params.tile_dir().join("9170/4230.png").exists());
}

#[test]
fn test_convert_without_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let params = ConvertParams {
        source: format!("{}/{{z}}/{{x}}/{{y}}.png", dir.path().display()),
        output: dir.path().join("raster").display().to_string(),
        zoom: 14,
        bbox: BoundingBox::new(21.49147, 65.31016, 21.5, 65.31688),
        format: "png".to_string(),
        keep_tiles: false,
        threads: 2,
        progress: false,
    };
    match convert(&params) {
        Err(ServiceError::Raster(_)) => {}
        other => panic!("raster error expected, got {:?}", other),
    }
}

fn detect_params(dir: &Path) -> DetectParams {
    let raster = dir.join("merged.png");
    RgbImage::new(100, 100).save(&raster).unwrap();
    GeoTransform::new(9.0, 0.0001, 48.0, -0.0001)
        .write_world_file(world_file_path(&raster))
        .unwrap();
    let predictions = dir.join("predictions.csv");
    fs::write(
        &predictions,
        "xmin,ymin,xmax,ymax,label,score\n40,40,60,60,Tree,0.8\n0,0,10,10,Tree,0.05\n",
    )
    .unwrap();
    DetectParams {
        raster: raster.display().to_string(),
        predictions: Some(predictions.display().to_string()),
        model_cmd: None,
        model_args: None,
        output: dir.join("trees.csv").display().to_string(),
        srid: 4326,
        predict: PredictParams::default(),
        max_form_factor: None,
    }
}

#[test]
fn test_detect_and_merge() {
    let dir = tempfile::tempdir().unwrap();
    let params = detect_params(dir.path());
    let trees = detect(&params).unwrap();
    assert_eq!(trees.len(), 1);
    assert!((trees[0].xmin_coord - 9.004).abs() < 1e-9);
    assert!((trees[0].ymax_coord - 47.996).abs() < 1e-9);
    assert!((trees[0].xcenter_coord - 9.005).abs() < 1e-9);
    assert_eq!(read_trees(&params.output).unwrap().len(), 1);

    let registry = dir.path().join("registry.geojson");
    fs::write(
        &registry,
        r#"{"type": "FeatureCollection", "features": [
          {"type": "Feature", "geometry": {"type": "Point", "coordinates": [9.005, 47.995]},
           "properties": {"baumId": 7, "kronendurchmesserM": 12}},
          {"type": "Feature", "geometry": {"type": "Point", "coordinates": [9.1, 47.9]},
           "properties": {"baumId": 8, "kronendurchmesserM": 6}}]}"#,
    )
    .unwrap();
    let params = MergeParams {
        registry: registry.display().to_string(),
        detections: params.output.clone(),
        output: dir.path().join("trees.geojson").display().to_string(),
        registry_opts: RegistryOptions::default(),
        join: JoinParams {
            max_diameter: 5000.0,
            ..JoinParams::default()
        },
    };
    let result = merge(&params).unwrap();
    assert_eq!(result.matched, 1);
    assert_eq!(result.unmatched, 1);
    assert_eq!(result.detected_only, 0);
    assert!(Path::new(&params.output).exists());
}

#[test]
fn test_detect_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut params = detect_params(dir.path());
    params.predictions = None;
    match detect(&params) {
        Err(ServiceError::Config(_)) => {}
        other => panic!("configuration error expected, got {:?}", other.map(|t| t.len())),
    }

    let mut params = detect_params(dir.path());
    params.srid = 25832;
    assert!(detect(&params).is_err());
}

#[cfg(not(feature = "with-gdal"))]
#[test]
fn test_detect_without_world_file() {
    let dir = tempfile::tempdir().unwrap();
    let params = detect_params(dir.path());
    fs::remove_file(world_file_path(&params.raster)).unwrap();
    match detect(&params) {
        Err(ServiceError::NotFound(_)) => {}
        other => panic!("missing world file expected, got {:?}", other.map(|t| t.len())),
    }
}
