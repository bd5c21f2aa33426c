//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::detect::DetectError;
use std::io::Read;
use std::path::Path;

fn default_label() -> String {
    "Tree".to_string()
}

/// Bounding box of a detected crown in raster pixels
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Prediction {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    #[serde(default = "default_label")]
    pub label: String,
    pub score: f64,
}

impl Prediction {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64, score: f64) -> Prediction {
        Prediction {
            xmin,
            ymin,
            xmax,
            ymax,
            label: default_label(),
            score,
        }
    }
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }
    /// Intersection over union
    pub fn iou(&self, other: &Prediction) -> f64 {
        let w = self.xmax.min(other.xmax) - self.xmin.max(other.xmin);
        let h = self.ymax.min(other.ymax) - self.ymin.max(other.ymin);
        if w <= 0.0 || h <= 0.0 {
            return 0.0;
        }
        let inter = w * h;
        inter / (self.area() + other.area() - inter)
    }
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.xmin += dx;
        self.xmax += dx;
        self.ymin += dy;
        self.ymax += dy;
    }
    /// Deviation of the aspect ratio from a square
    pub fn form_factor(&self) -> Option<f64> {
        if self.height() > 0.0 {
            Some((self.width() / self.height() - 1.0).abs())
        } else {
            None
        }
    }
}

/// Predictions CSV with named columns `xmin,ymin,xmax,ymax,score` and optional `label`
pub fn predictions_from_reader<R: Read>(reader: R) -> Result<Vec<Prediction>, DetectError> {
    csv::Reader::from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<Prediction>, csv::Error>>()
        .map_err(DetectError::from)
}

pub fn read_predictions<P: AsRef<Path>>(path: P) -> Result<Vec<Prediction>, DetectError> {
    let file = std::fs::File::open(path.as_ref()).map_err(|source| DetectError::Io {
        path: path.as_ref().display().to_string(),
        source,
    })?;
    predictions_from_reader(file)
}

/// Keep predictions with `score >= min_score` and, if given, `form_factor < max_form_factor`
pub fn filter_predictions(
    predictions: Vec<Prediction>,
    min_score: f64,
    max_form_factor: Option<f64>,
) -> Vec<Prediction> {
    let count = predictions.len();
    let filtered: Vec<Prediction> = predictions
        .into_iter()
        .filter(|p| p.score >= min_score)
        .filter(|p| match max_form_factor {
            Some(max) => p.form_factor().map(|ff| ff < max).unwrap_or(false),
            None => true,
        })
        .collect();
    debug!("{} of {} predictions pass filters", filtered.len(), count);
    filtered
}
