//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tree crown detection on the stitched raster

use crate::error::ServiceError;
use crate::params::DetectParams;
use std::path::Path;
use treecrown_core::core::stats::Statistics;
use treecrown_core::detect::{
    filter_predictions, georeference, predict_raster, read_predictions, write_trees,
    DetectedTree, ExternalDetector, Prediction,
};
use treecrown_core::raster::{read_rgb, world_file_path, GeoTransform};

/// Geotransform and SRID of the raster
fn raster_georeference(raster: &Path, srid: i32) -> Result<(GeoTransform, i32), ServiceError> {
    let world_file = world_file_path(raster);
    if world_file.exists() {
        return Ok((GeoTransform::from_world_file(&world_file)?, srid));
    }
    embedded_georeference(raster, srid)
}

#[cfg(feature = "with-gdal")]
fn embedded_georeference(raster: &Path, srid: i32) -> Result<(GeoTransform, i32), ServiceError> {
    let (transform, raster_srid) = treecrown_gdal::read_georeference(raster)?;
    Ok((transform, raster_srid.unwrap_or(srid)))
}

#[cfg(not(feature = "with-gdal"))]
fn embedded_georeference(raster: &Path, _srid: i32) -> Result<(GeoTransform, i32), ServiceError> {
    Err(ServiceError::NotFound(format!(
        "World file {}",
        world_file_path(raster).display()
    )))
}

fn predictions(params: &DetectParams) -> Result<Vec<Prediction>, ServiceError> {
    if let Some(ref path) = params.predictions {
        let preds = read_predictions(path)?;
        info!("{} predictions read from {}", preds.len(), path);
        Ok(preds)
    } else if let Some(ref command) = params.model_cmd {
        let detector = match params.model_args {
            Some(ref args) => ExternalDetector::new(command, args)?,
            None => ExternalDetector::from_command(command)?,
        };
        let image = read_rgb(&params.raster)?;
        let preds = predict_raster(&image, &detector, &params.predict)?;
        info!("{} predictions from `{}`", preds.len(), command);
        Ok(preds)
    } else {
        Err(ServiceError::Config(
            "Either predictions or model_cmd is required".to_string(),
        ))
    }
}

/// Detect trees and write them as CSV
pub fn detect(params: &DetectParams) -> Result<Vec<DetectedTree>, ServiceError> {
    let raster = Path::new(&params.raster);
    let (transform, srid) = raster_georeference(raster, params.srid)?;
    debug!("{}: {:?} SRID {}", raster.display(), transform, srid);
    let preds = predictions(params)?;
    let count = preds.len();
    let preds = filter_predictions(
        preds,
        params.predict.score_threshold,
        params.max_form_factor,
    );
    if preds.len() < count {
        info!("{} predictions filtered", count - preds.len());
    }
    let trees = georeference(&preds, &transform, srid)?;
    write_trees(&trees, &params.output)?;

    let mut stats = Statistics::new();
    for tree in &trees {
        stats.add("diameter", tree.diameter);
        stats.add("score", tree.score);
    }
    info!("Crown diameter: {:?}", stats.results("diameter"));
    info!("Score: {:?}", stats.results("score"));
    Ok(trees)
}
