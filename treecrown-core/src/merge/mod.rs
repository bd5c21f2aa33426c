//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Merge of detected crowns with a tree registry

mod join;
mod registry;


pub use self::join::{crown_box, join, write_geojson, JoinParams, MergeResult};
pub use self::registry::{parse_registry, read_registry, RegistryOptions, RegistryTree};

use crate::detect::DetectError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("error accessing {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("registry is not a GeoJSON FeatureCollection")]
    NotFeatureCollection,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Detect(#[from] DetectError),
}
