//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Parallel tile fetching into a tile store

use crate::error::ServiceError;
use pbr::ProgressBar;
use std::cell::Cell;
use std::io::Stdout;
use std::sync::Arc;
use std::time::Duration;
use tile_grid::TileGrid;
use tokio::task;
use treecrown_core::source::TileSource;
use treecrown_core::store::{tile_path, Filestore, TileStore};

#[derive(Clone, Debug)]
pub struct FetchOptions {
    /// Maximal number of tile requests
    pub limit: Option<u64>,
    /// Pause between requests
    pub sleep: Option<Duration>,
    pub threads: usize,
    pub progress: bool,
}

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct FetchSummary {
    pub fetched: u64,
    /// Tiles already in the store
    pub skipped: u64,
    pub failed: u64,
    pub total: u64,
}

impl FetchSummary {
    /// Tiles neither stored nor requested
    pub fn remaining(&self) -> u64 {
        self.total - self.fetched - self.skipped - self.failed
    }
    pub fn log(&self) {
        info!(
            "{} tiles fetched, {} existing, {} failed, {} remaining of {}",
            self.fetched,
            self.skipped,
            self.failed,
            self.remaining(),
            self.total
        );
    }
}

fn progress_bar(msg: &str, total: u64) -> ProgressBar<Stdout> {
    let mut pb = ProgressBar::new(total);
    pb.message(msg);
    pb.show_speed = false;
    pb.show_percent = false;
    pb.show_time_left = false;
    pb
}

async fn await_one_task<T>(tasks: Vec<task::JoinHandle<T>>) -> (Option<T>, Vec<task::JoinHandle<T>>) {
    let (result, _index, remaining) = futures_util::future::select_all(tasks).await;
    (result.ok(), remaining)
}

fn count(summary: &mut FetchSummary, result: Option<bool>) {
    match result {
        Some(true) => summary.fetched += 1,
        _ => summary.failed += 1,
    }
}

/// Fetch all tiles of `grid` not yet in `store`
pub fn fetch_tiles(
    source: Arc<dyn TileSource>,
    store: &Filestore,
    grid: &TileGrid,
    opts: &FetchOptions,
) -> Result<FetchSummary, ServiceError> {
    let rt = tokio::runtime::Runtime::new().map_err(ServiceError::Runtime)?;
    info!("{}", store.info());
    info!("Fetching {} tiles from {}", grid.len(), source.describe());
    Ok(rt.block_on(fetch_grid(source, store, grid, opts)))
}

async fn fetch_grid(
    source: Arc<dyn TileSource>,
    store: &Filestore,
    grid: &TileGrid,
    opts: &FetchOptions,
) -> FetchSummary {
    let task_queue_size = opts.threads.max(1);
    let mut tasks = Vec::with_capacity(task_queue_size);
    let mut summary = FetchSummary {
        total: grid.len(),
        ..Default::default()
    };
    let extension = source.extension();
    let skipped = Cell::new(0);
    let limit = opts.limit.map_or(usize::MAX, |l| l as usize);
    let pending = grid
        .iter()
        .map(|tile| (tile, tile_path(&tile, &extension)))
        .filter(|(_, path)| {
            let exists = store.exists(path);
            if exists {
                skipped.set(skipped.get() + 1);
            }
            !exists
        })
        .take(limit);
    let mut pb = progress_bar("Tile ", grid.len());
    let mut requests = 0;
    for (tile, path) in pending {
        requests += 1;
        if opts.progress {
            pb.set(skipped.get() + requests);
        }
        let source = source.clone();
        let store = store.clone();
        let zoom = grid.zoom;
        tasks.push(task::spawn_blocking(move || {
            match source.fetch(&tile, zoom) {
                Ok(data) => match store.write(&path, &data) {
                    Ok(_) => true,
                    Err(e) => {
                        error!("Error writing {}: {}", path, e);
                        false
                    }
                },
                Err(e) => {
                    warn!("Tile {}/{}/{}: {}", zoom, tile.x, tile.y, e);
                    false
                }
            }
        }));
        if tasks.len() >= task_queue_size {
            let (result, remaining) = await_one_task(tasks).await;
            count(&mut summary, result);
            tasks = remaining;
        }
        if let Some(pause) = opts.sleep {
            tokio::time::sleep(pause).await;
        }
    }
    if opts.limit.map_or(false, |l| requests >= l) {
        info!("Request limit of {} reached", requests);
    }
    // Finish remaining tasks
    for result in futures_util::future::join_all(tasks).await {
        count(&mut summary, result.ok());
    }
    summary.skipped = skipped.get();
    if opts.progress {
        pb.finish();
    }
    summary
}
