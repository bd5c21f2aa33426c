//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate log;

mod geotiff;

pub use crate::geotiff::{gdal_version, read_georeference, write_geotiff};
pub use gdal::errors::GdalError;
