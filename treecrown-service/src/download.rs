//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile download from a WMTS service

use crate::error::ServiceError;
use crate::fetch::{fetch_tiles, FetchOptions, FetchSummary};
use crate::params::DownloadParams;
use std::sync::Arc;
use tile_grid::TileGrid;
use treecrown_core::source::{Capabilities, HttpClient, WmtsSource};
use treecrown_core::store::{Filestore, TileStore};

/// Tile source and tile range of a download
#[derive(Debug)]
pub struct DownloadPlan {
    pub source: WmtsSource,
    pub grid: TileGrid,
}

/// Resolve layer, tile matrix and tile range from the service capabilities
pub fn plan_download(
    caps: &Capabilities,
    params: &DownloadParams,
) -> Result<DownloadPlan, ServiceError> {
    let layer = caps
        .layer(&params.layer)
        .ok_or_else(|| ServiceError::NotFound(format!("Layer '{}'", params.layer)))?;
    if let Some(ref title) = layer.title {
        info!("Layer {}: {}", layer.identifier, title);
    }
    if !layer.formats.is_empty() && !layer.formats.contains(&params.format) {
        warn!(
            "Format {} not announced for layer {} (available: {})",
            params.format,
            layer.identifier,
            layer.formats.join(", ")
        );
    }
    let link = layer.link(&params.tile_matrix_set).ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Tile matrix set '{}' of layer '{}'",
            params.tile_matrix_set, params.layer
        ))
    })?;
    let matrix_set = caps
        .tile_matrix_set(&params.tile_matrix_set)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Tile matrix set '{}'", params.tile_matrix_set))
        })?;
    let matrix = matrix_set.matrix_for_zoom(params.zoom).ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Zoom level {} in tile matrix set '{}'",
            params.zoom, params.tile_matrix_set
        ))
    })?;
    let mut grid = match link.limits_for(&matrix.identifier) {
        Some(limits) => limits.to_grid(params.zoom),
        None => matrix.full_range(),
    };
    debug!("Tile matrix {} limits: {:?}", matrix.identifier, grid);
    if let Some(ref extent) = params.bbox {
        grid = grid
            .intersection(&matrix.tile_range(extent))
            .ok_or(ServiceError::EmptyGrid)?;
    }
    let source = WmtsSource {
        url: params.url.clone(),
        layer: layer.identifier.clone(),
        style: params.style.clone().unwrap_or_else(|| layer.style()),
        format: params.format.clone(),
        tile_matrix_set: params.tile_matrix_set.clone(),
        tile_matrix: matrix.identifier.clone(),
        client: HttpClient::with_auth(params.username.clone(), params.password.clone()),
    };
    Ok(DownloadPlan { source, grid })
}

/// Download the tiles of the configured layer and zoom level
pub fn download(params: &DownloadParams) -> Result<FetchSummary, ServiceError> {
    let client = HttpClient::with_auth(params.username.clone(), params.password.clone());
    let caps = Capabilities::request(&params.url, &client)?;
    if let Some(ref title) = caps.title {
        info!("Service: {}", title);
    }
    if let Some(ref constraints) = caps.access_constraints {
        info!("Access constraints: {}", constraints);
    }
    let plan = plan_download(&caps, params)?;
    info!(
        "Zoom level {}: columns {}-{}, rows {}-{} ({} tiles)",
        plan.grid.zoom,
        plan.grid.x_min,
        plan.grid.x_max,
        plan.grid.y_min,
        plan.grid.y_max,
        plan.grid.len()
    );

    let store = Filestore::new(params.tile_dir());
    if params.remove_old {
        store.remove_all().map_err(|source| ServiceError::Io {
            path: store.basepath.clone(),
            source,
        })?;
    }
    let opts = FetchOptions {
        limit: params.limit,
        sleep: params.sleep,
        threads: params.threads,
        progress: params.progress,
    };
    let summary = fetch_tiles(Arc::new(plan.source), &store, &plan.grid, &opts)?;
    summary.log();
    Ok(summary)
}
