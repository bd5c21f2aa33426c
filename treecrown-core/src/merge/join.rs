//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::stats::Statistics;
use crate::detect::DetectedTree;
use crate::merge::registry::RegistryTree;
use crate::merge::MergeError;
use geo::{coord, Rect};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct JoinParams {
    /// Degrees longitude per metre
    pub lon_deg_per_m: f64,
    /// Degrees latitude per metre
    pub lat_deg_per_m: f64,
    pub min_score: f64,
    /// Largest plausible crown diameter in metres
    pub max_diameter: f64,
}

impl Default for JoinParams {
    fn default() -> Self {
        JoinParams {
            lon_deg_per_m: 9.041375464338667e-06,
            lat_deg_per_m: 9.099335504202068e-06,
            min_score: 0.0,
            max_diameter: 50.0,
        }
    }
}

pub struct MergeResult {
    pub collection: FeatureCollection,
    /// Registry trees with a detection
    pub matched: usize,
    /// Registry trees without detection
    pub unmatched: usize,
    /// Detections without registry tree
    pub detected_only: usize,
    /// Detections removed by score and diameter filters
    pub filtered: usize,
    pub stats: Statistics,
}

impl MergeResult {
    pub fn log_summary(&self) {
        info!(
            "Registry trees detected: {}, not detected: {}, new detections: {} ({} detections filtered)",
            self.matched, self.unmatched, self.detected_only, self.filtered
        );
        info!("Detected diameter: {:?}", self.stats.results("diameter"));
        info!("Detection score: {:?}", self.stats.results("score"));
    }
}

/// Crown extent around the registry point
pub fn crown_box(tree: &RegistryTree, params: &JoinParams) -> Rect<f64> {
    let radius = tree.crown_diameter / 2.0;
    let dx = radius * params.lon_deg_per_m;
    let dy = radius * params.lat_deg_per_m;
    Rect::new(
        coord! { x: tree.point.x() - dx, y: tree.point.y() - dy },
        coord! { x: tree.point.x() + dx, y: tree.point.y() + dy },
    )
}

fn round8(v: f64) -> f64 {
    (v * 1e8).round() / 1e8
}

fn number(v: f64) -> JsonValue {
    serde_json::Number::from_f64(v)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

const DETECT_FIELDS: [&str; 13] = [
    "detect_id",
    "detect_x_min",
    "detect_y_min",
    "detect_x_max",
    "detect_y_max",
    "detect_x_min_coord",
    "detect_y_min_coord",
    "detect_x_max_coord",
    "detect_y_max_coord",
    "detect_x_center_coord",
    "detect_y_center_coord",
    "detect_diameter",
    "detect_score",
];

fn detect_properties(props: &mut JsonObject, tree: Option<&DetectedTree>) {
    let tree = match tree {
        Some(tree) => tree,
        None => {
            for field in &DETECT_FIELDS {
                props.insert(field.to_string(), JsonValue::Null);
            }
            return;
        }
    };
    let values = [
        JsonValue::from(tree.id),
        JsonValue::from(tree.xmin),
        JsonValue::from(tree.ymin),
        JsonValue::from(tree.xmax),
        JsonValue::from(tree.ymax),
        number(round8(tree.xmin_coord)),
        number(round8(tree.ymin_coord)),
        number(round8(tree.xmax_coord)),
        number(round8(tree.ymax_coord)),
        number(round8(tree.xcenter_coord)),
        number(round8(tree.ycenter_coord)),
        number(round8(tree.diameter)),
        number(round8(tree.score)),
    ];
    for (field, value) in DETECT_FIELDS.iter().zip(values.iter()) {
        props.insert(field.to_string(), value.clone());
    }
}

fn point_feature(x: f64, y: f64, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            round8(x),
            round8(y),
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn flags(props: &mut JsonObject, maintained: bool, detected: bool) {
    props.insert("maintained".to_string(), JsonValue::from(maintained as u8));
    props.insert("detected".to_string(), JsonValue::from(detected as u8));
}

/// Spatial join of registry crowns and detected crowns.
///
/// Features are ordered: detected registry trees, undetected registry trees,
/// detections without registry tree. A registry tree is matched with the
/// intersecting detection with the lowest id.
pub fn join(
    registry: &[RegistryTree],
    detections: &[DetectedTree],
    params: &JoinParams,
) -> MergeResult {
    let candidates: Vec<&DetectedTree> = detections
        .iter()
        .filter(|d| d.score >= params.min_score && d.diameter <= params.max_diameter)
        .collect();
    let filtered = detections.len() - candidates.len();
    let rtree = RTree::bulk_load(
        candidates
            .iter()
            .enumerate()
            .map(|(idx, d)| {
                GeomWithData::new(
                    Rectangle::from_corners(
                        [d.xmin_coord, d.ymin_coord],
                        [d.xmax_coord, d.ymax_coord],
                    ),
                    idx,
                )
            })
            .collect(),
    );

    let mut stats = Statistics::new();
    let mut matched_ids: HashSet<&str> = HashSet::new();
    let mut matched_detections: HashSet<usize> = HashSet::new();
    let mut detected_features = Vec::new();
    for tree in registry {
        let crown = crown_box(tree, params);
        let envelope = AABB::from_corners(
            [crown.min().x, crown.min().y],
            [crown.max().x, crown.max().y],
        );
        let best = rtree
            .locate_in_envelope_intersecting(&envelope)
            .map(|item| candidates[item.data])
            .min_by_key(|d| d.id);
        if let Some(detection) = best {
            if !matched_ids.insert(tree.id.as_str()) {
                debug!("Duplicate registry id {} ignored", tree.id);
                continue;
            }
            matched_detections.insert(detection.id);
            stats.add("diameter", detection.diameter);
            stats.add("score", detection.score);
            let mut props = tree.properties.clone();
            detect_properties(&mut props, Some(detection));
            flags(&mut props, true, true);
            detected_features.push(point_feature(tree.point.x(), tree.point.y(), props));
        }
    }

    let mut features = detected_features;
    let matched = features.len();
    for tree in registry
        .iter()
        .filter(|t| !matched_ids.contains(t.id.as_str()))
    {
        let mut props = tree.properties.clone();
        detect_properties(&mut props, None);
        flags(&mut props, true, false);
        features.push(point_feature(tree.point.x(), tree.point.y(), props));
    }
    let unmatched = features.len() - matched;

    let registry_fields: BTreeSet<&String> =
        registry.iter().flat_map(|t| t.properties.keys()).collect();
    for detection in candidates
        .iter()
        .filter(|d| !matched_detections.contains(&d.id))
    {
        let mut props = JsonObject::new();
        for field in &registry_fields {
            props.insert(field.to_string(), JsonValue::Null);
        }
        detect_properties(&mut props, Some(*detection));
        flags(&mut props, false, true);
        features.push(point_feature(
            detection.xcenter_coord,
            detection.ycenter_coord,
            props,
        ));
    }
    let detected_only = features.len() - matched - unmatched;

    MergeResult {
        collection: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
        matched,
        unmatched,
        detected_only,
        filtered,
        stats,
    }
}

pub fn write_geojson<P: AsRef<Path>>(collection: &FeatureCollection, path: P) -> Result<(), MergeError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| MergeError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let json = serde_json::to_string(collection)?;
    fs::write(path, json).map_err(|source| MergeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    info!(
        "{} features written to {}",
        collection.features.len(),
        path.display()
    );
    Ok(())
}
