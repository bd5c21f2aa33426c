//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Grid iterators

use crate::grid::{TileGrid, TileIndex};

/// Row-by-row iterator over the tiles of a grid
#[derive(Clone, Debug)]
pub struct GridIterator {
    grid: TileGrid,
    x: u32,
    y: u32,
    finished: bool,
}

impl GridIterator {
    pub fn new(grid: TileGrid) -> GridIterator {
        GridIterator {
            grid,
            x: grid.x_min,
            y: grid.y_min,
            finished: grid.x_min > grid.x_max || grid.y_min > grid.y_max,
        }
    }
    /// Number of tiles not yet visited
    fn remaining(&self) -> u64 {
        if self.finished {
            return 0;
        }
        let rows_after = (self.grid.y_max - self.y) as u64;
        rows_after * self.grid.width() as u64 + (self.grid.x_max - self.x) as u64 + 1
    }
}

impl Iterator for GridIterator {
    /// Current cell index
    type Item = TileIndex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let current = TileIndex::new(self.x, self.y);
        if self.x < self.grid.x_max {
            self.x += 1;
        } else if self.y < self.grid.y_max {
            self.y += 1;
            self.x = self.grid.x_min;
        } else {
            self.finished = true;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining() as usize;
        (remaining, Some(remaining))
    }
}

#[test]
fn test_row_order() {
    let grid = TileGrid::new(2, 1, 2, 0, 1);
    let cells = grid
        .iter()
        .map(|t| (t.x, t.y))
        .collect::<Vec<_>>();
    assert_eq!(cells, vec![(1, 0), (2, 0), (1, 1), (2, 1)]);
}

#[test]
fn test_restartable() {
    let grid = TileGrid::new(3, 4, 6, 2, 2);
    let first = grid.iter().collect::<Vec<_>>();
    let second = grid.iter().collect::<Vec<_>>();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);

    let mut griditer = grid.iter();
    assert_eq!(griditer.size_hint(), (3, Some(3)));
    griditer.next();
    assert_eq!(griditer.size_hint(), (2, Some(2)));
    griditer.next();
    griditer.next();
    assert_eq!(griditer.size_hint(), (0, Some(0)));
    assert_eq!(griditer.next(), None);
}

#[test]
fn test_single_tile() {
    let grid = TileGrid::new(0, 0, 0, 0, 0);
    let cells = grid.iter().collect::<Vec<_>>();
    assert_eq!(cells, vec![TileIndex::new(0, 0)]);
}

#[test]
fn test_bad_params() {
    // inverted grid
    let grid = TileGrid {
        zoom: 1,
        x_min: 1,
        x_max: 0,
        y_min: 0,
        y_max: 1,
    };
    let cells = grid.iter().collect::<Vec<_>>();
    assert_eq!(cells, vec![]);
}

#[test]
fn test_filter_stage() {
    // skipping tiles composes with the enumeration
    let grid = TileGrid::new(4, 0, 3, 0, 3);
    let cells = grid
        .iter()
        .filter(|t| t.x != t.y)
        .take(5)
        .collect::<Vec<_>>();
    assert_eq!(
        cells,
        vec![
            TileIndex::new(1, 0),
            TileIndex::new(2, 0),
            TileIndex::new(3, 0),
            TileIndex::new(0, 1),
            TileIndex::new(2, 1)
        ]
    );
}
