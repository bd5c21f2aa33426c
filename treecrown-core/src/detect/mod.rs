//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tree crown detection on georeferenced rasters

mod detector;
mod nms;
mod prediction;
mod tree;
mod window;


pub use self::detector::{predict_raster, Detector, ExternalDetector, PredictParams};
pub use self::nms::{nms, soft_nms};
pub use self::prediction::{filter_predictions, predictions_from_reader, read_predictions, Prediction};
pub use self::tree::{
    georeference, read_trees, trees_from_reader, trees_to_writer, write_trees, DetectedTree,
};
pub use self::window::{windows, Window};

use crate::raster::RasterError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("error accessing {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("model command `{command}` failed: {reason}")]
    Command { command: String, reason: String },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("unsupported raster SRID {0} (expected 3857 or 4326)")]
    UnsupportedSrid(i32),
}
