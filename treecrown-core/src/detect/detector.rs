//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::detect::nms::{nms, soft_nms};
use crate::detect::prediction::{predictions_from_reader, Prediction};
use crate::detect::window::windows;
use crate::detect::DetectError;
use image::{imageops, RgbImage};
use std::process::Command;

/// Tree crown model applied to one image patch
pub trait Detector {
    /// Predictions in patch pixel coordinates
    fn detect(&self, patch: &RgbImage) -> Result<Vec<Prediction>, DetectError>;
}

#[derive(Clone, Debug)]
pub struct PredictParams {
    pub patch_size: u32,
    pub patch_overlap: f64,
    pub soft_nms: bool,
    pub sigma: f64,
    pub iou_threshold: f64,
    pub score_threshold: f64,
}

impl Default for PredictParams {
    fn default() -> Self {
        PredictParams {
            patch_size: 500,
            patch_overlap: 0.3,
            soft_nms: true,
            sigma: 0.01,
            iou_threshold: 0.15,
            score_threshold: 0.1,
        }
    }
}

impl PredictParams {
    /// Remove duplicate detections from overlapping windows
    pub fn suppress(&self, predictions: Vec<Prediction>) -> Vec<Prediction> {
        if self.soft_nms {
            soft_nms(predictions, self.sigma, self.score_threshold)
        } else {
            nms(predictions, self.iou_threshold)
        }
    }
}

/// Run `detector` on sliding windows and merge the results in raster pixels
pub fn predict_raster<D: Detector + ?Sized>(
    image: &RgbImage,
    detector: &D,
    params: &PredictParams,
) -> Result<Vec<Prediction>, DetectError> {
    let (width, height) = image.dimensions();
    let windows = windows(width, height, params.patch_size, params.patch_overlap)?;
    info!(
        "Predicting {}x{} raster in {} windows",
        width,
        height,
        windows.len()
    );
    let mut predictions = Vec::new();
    for window in windows {
        let patch =
            imageops::crop_imm(image, window.x, window.y, window.width, window.height).to_image();
        let mut found = detector.detect(&patch)?;
        debug!("{:?}: {} predictions", window, found.len());
        for pred in found.iter_mut() {
            pred.translate(window.x as f64, window.y as f64);
        }
        predictions.append(&mut found);
    }
    let count = predictions.len();
    let predictions = params.suppress(predictions);
    info!(
        "{} predictions, {} after suppression of overlaps",
        count,
        predictions.len()
    );
    Ok(predictions)
}

/// Model invoked as external process.
/// The patch is passed as PNG file path (last argument); predictions CSV
/// (`xmin,ymin,xmax,ymax,label,score`) is expected on stdout.
#[derive(Clone, Debug)]
pub struct ExternalDetector {
    pub program: String,
    pub args: Vec<String>,
}

impl ExternalDetector {
    /// Program with arguments passed unchanged.
    pub fn new(program: &str, args: &[String]) -> Result<ExternalDetector, DetectError> {
        if program.trim().is_empty() {
            return Err(DetectError::InvalidParameter(
                "empty model command".to_string(),
            ));
        }
        Ok(ExternalDetector {
            program: program.to_string(),
            args: args.to_vec(),
        })
    }

    /// Command line split on whitespace. Quotes are not interpreted, use
    /// `new` for arguments containing spaces.
    pub fn from_command(command: &str) -> Result<ExternalDetector, DetectError> {
        let mut parts = command.split_whitespace().map(|s| s.to_string());
        let program = parts
            .next()
            .ok_or_else(|| DetectError::InvalidParameter("empty model command".to_string()))?;
        Ok(ExternalDetector {
            program,
            args: parts.collect(),
        })
    }

    fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

impl Detector for ExternalDetector {
    fn detect(&self, patch: &RgbImage) -> Result<Vec<Prediction>, DetectError> {
        let file = tempfile::Builder::new()
            .prefix("treecrown-patch")
            .suffix(".png")
            .tempfile()
            .map_err(|source| DetectError::Io {
                path: "temporary patch file".to_string(),
                source,
            })?;
        patch.save(file.path())?;
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(file.path())
            .output()
            .map_err(|e| DetectError::Command {
                command: self.command_line(),
                reason: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(DetectError::Command {
                command: self.command_line(),
                reason: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        predictions_from_reader(output.stdout.as_slice())
    }
}
