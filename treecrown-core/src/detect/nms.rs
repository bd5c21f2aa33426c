//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Suppression of overlapping predictions

use crate::detect::prediction::Prediction;
use std::cmp::Ordering;

fn by_score_desc(a: &Prediction, b: &Prediction) -> Ordering {
    b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal)
}

/// Greedy non-maximum suppression.
/// A prediction is dropped when its IoU with a better one exceeds `iou_threshold`.
pub fn nms(mut predictions: Vec<Prediction>, iou_threshold: f64) -> Vec<Prediction> {
    predictions.sort_by(by_score_desc);
    let mut keep: Vec<Prediction> = Vec::with_capacity(predictions.len());
    for pred in predictions {
        if keep.iter().all(|k| k.iou(&pred) <= iou_threshold) {
            keep.push(pred);
        }
    }
    keep
}

/// Gaussian soft-NMS: scores of overlapping predictions decay by
/// `exp(-iou² / sigma)`; predictions below `score_threshold` are dropped.
pub fn soft_nms(mut predictions: Vec<Prediction>, sigma: f64, score_threshold: f64) -> Vec<Prediction> {
    let mut keep = Vec::new();
    predictions.retain(|p| p.score >= score_threshold);
    while !predictions.is_empty() {
        let best_idx = predictions
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| by_score_desc(a, b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let best = predictions.swap_remove(best_idx);
        for pred in predictions.iter_mut() {
            let iou = best.iou(pred);
            if iou > 0.0 {
                pred.score *= (-(iou * iou) / sigma).exp();
            }
        }
        predictions.retain(|p| p.score >= score_threshold);
        keep.push(best);
    }
    keep
}
