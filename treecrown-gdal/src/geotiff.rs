//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use gdal::errors::GdalError;
use gdal::raster::Buffer;
use gdal::{Dataset, Driver};
use std::path::Path;
use treecrown_core::raster::{GeoTransform, Mosaic, EPSG_3857_WKT};

pub fn gdal_version() -> String {
    gdal::version::version_info("RELEASE_NAME")
}

/// Write the mosaic as RGB GeoTIFF in EPSG:3857
pub fn write_geotiff<P: AsRef<Path>>(mosaic: &Mosaic, path: P) -> Result<(), GdalError> {
    let path = path.as_ref();
    let (width, height) = mosaic.image.dimensions();
    let driver = Driver::get("GTiff")?;
    let mut dataset =
        driver.create_with_band_type::<u8, _>(path, width as isize, height as isize, 3)?;
    dataset.set_geo_transform(&mosaic.transform.0)?;
    dataset.set_projection(EPSG_3857_WKT)?;
    let pixels = mosaic.image.as_raw();
    for channel in 0..3 {
        let data: Vec<u8> = pixels.iter().skip(channel).step_by(3).copied().collect();
        let buffer = Buffer::new((width as usize, height as usize), data);
        let mut band = dataset.rasterband(channel as isize + 1)?;
        band.write((0, 0), (width as usize, height as usize), &buffer)?;
    }
    info!(
        "GeoTIFF {} written ({}x{} pixels, GDAL {})",
        path.display(),
        width,
        height,
        gdal_version()
    );
    Ok(())
}

/// Geotransform and EPSG code of a raster dataset
pub fn read_georeference<P: AsRef<Path>>(path: P) -> Result<(GeoTransform, Option<i32>), GdalError> {
    let dataset = Dataset::open(path.as_ref())?;
    let transform = GeoTransform(dataset.geo_transform()?);
    let srid = dataset
        .spatial_ref()
        .and_then(|srs| srs.auth_code())
        .ok();
    debug!(
        "{}: transform {:?}, SRID {:?}",
        path.as_ref().display(),
        transform,
        srid
    );
    Ok((transform, srid))
}
