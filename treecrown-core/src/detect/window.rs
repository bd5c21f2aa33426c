//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::detect::DetectError;

/// Pixel window of a raster
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct Window {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

fn offsets(len: u32, patch: u32, stride: u32) -> Vec<u32> {
    if len <= patch {
        return vec![0];
    }
    let mut offsets = Vec::new();
    let mut offset = 0;
    while offset + patch < len {
        offsets.push(offset);
        offset += stride;
    }
    // Last window aligned to the raster edge
    offsets.push(len - patch);
    offsets
}

/// Sliding windows of `patch_size` pixels, row by row.
/// Windows overlap by the fraction `overlap` in [0, 1).
pub fn windows(
    width: u32,
    height: u32,
    patch_size: u32,
    overlap: f64,
) -> Result<Vec<Window>, DetectError> {
    if patch_size == 0 {
        return Err(DetectError::InvalidParameter(
            "patch size must be positive".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&overlap) {
        return Err(DetectError::InvalidParameter(format!(
            "patch overlap {} not in [0, 1)",
            overlap
        )));
    }
    let stride = ((patch_size as f64 * (1.0 - overlap)).round() as u32).max(1);
    let xs = offsets(width, patch_size, stride);
    let ys = offsets(height, patch_size, stride);
    let mut windows = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            windows.push(Window {
                x,
                y,
                width: patch_size.min(width),
                height: patch_size.min(height),
            });
        }
    }
    Ok(windows)
}
