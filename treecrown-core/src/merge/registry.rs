//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::merge::MergeError;
use geo::Point;
use geojson::{GeoJson, JsonObject, JsonValue};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct RegistryOptions {
    /// Property holding the tree id
    pub id_field: String,
    /// Property holding the crown diameter in metres
    pub crown_field: String,
    /// Properties removed from the output
    pub drop_fields: Vec<String>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            id_field: "baumId".to_string(),
            crown_field: "kronendurchmesserM".to_string(),
            drop_fields: vec!["OBJECTID".to_string()],
        }
    }
}

/// Tree of the municipal registry
#[derive(Clone, Debug, PartialEq)]
pub struct RegistryTree {
    /// Id property value as string
    pub id: String,
    pub point: Point<f64>,
    pub crown_diameter: f64,
    pub properties: JsonObject,
}

fn id_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn parse_feature(feature: geojson::Feature, opts: &RegistryOptions) -> Result<RegistryTree, String> {
    let point = match feature.geometry.map(|g| g.value) {
        Some(geojson::Value::Point(coords)) if coords.len() >= 2 => Point::new(coords[0], coords[1]),
        Some(_) => return Err("geometry is not a point".to_string()),
        None => return Err("no geometry".to_string()),
    };
    let mut properties = feature.properties.unwrap_or_default();
    let id = properties
        .get(&opts.id_field)
        .and_then(id_string)
        .ok_or_else(|| format!("no {}", opts.id_field))?;
    let crown_diameter = properties
        .get(&opts.crown_field)
        .and_then(|v| v.as_f64())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| format!("tree {}: invalid {}", id, opts.crown_field))?;
    for field in &opts.drop_fields {
        properties.remove(field);
    }
    Ok(RegistryTree {
        id,
        point,
        crown_diameter,
        properties,
    })
}

/// Registry trees of a FeatureCollection; invalid records are skipped
pub fn parse_registry(geojson: GeoJson, opts: &RegistryOptions) -> Result<Vec<RegistryTree>, MergeError> {
    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(MergeError::NotFeatureCollection),
    };
    let count = collection.features.len();
    let mut trees = Vec::with_capacity(count);
    for (idx, feature) in collection.features.into_iter().enumerate() {
        match parse_feature(feature, opts) {
            Ok(tree) => trees.push(tree),
            Err(reason) => warn!("Skipping registry feature #{}: {}", idx, reason),
        }
    }
    if trees.len() < count {
        warn!("{} of {} registry features skipped", count - trees.len(), count);
    }
    Ok(trees)
}

pub fn read_registry<P: AsRef<Path>>(path: P, opts: &RegistryOptions) -> Result<Vec<RegistryTree>, MergeError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| MergeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let trees = parse_registry(content.parse::<GeoJson>()?, opts)?;
    info!("{} registry trees read from {}", trees.len(), path.display());
    Ok(trees)
}
