//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate log;

#[cfg(feature = "with-gdal")]
extern crate treecrown_gdal;

pub mod convert;
pub mod detect;
pub mod download;
pub mod error;
pub mod fetch;
pub mod merge;
pub mod params;

#[cfg(test)]
mod fetch_test;
#[cfg(test)]
mod pipeline_test;

pub use crate::convert::convert;
pub use crate::detect::detect;
pub use crate::download::download;
pub use crate::error::ServiceError;
pub use crate::merge::merge;
pub use crate::params::{gen_config, ConvertParams, DetectParams, DownloadParams, MergeParams};
