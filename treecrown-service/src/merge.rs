//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::error::ServiceError;
use crate::params::MergeParams;
use treecrown_core::detect::read_trees;
use treecrown_core::merge::{join, read_registry, write_geojson, MergeResult};

/// Join registry and detections and write the result as GeoJSON
pub fn merge(params: &MergeParams) -> Result<MergeResult, ServiceError> {
    let registry = read_registry(&params.registry, &params.registry_opts)?;
    info!("{} registry trees read from {}", registry.len(), params.registry);
    let detections = read_trees(&params.detections)?;
    info!(
        "{} detections read from {}",
        detections.len(),
        params.detections
    );
    let result = join(&registry, &detections, &params.join);
    result.log_summary();
    write_geojson(&result.collection, &params.output)?;
    Ok(result)
}
