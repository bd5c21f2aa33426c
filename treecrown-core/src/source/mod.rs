//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

pub mod http;
pub mod source;
pub mod wmts;
pub mod xyz;

#[cfg(test)]
mod wmts_test;
#[cfg(test)]
mod xyz_test;

pub use self::http::HttpClient;
pub use self::source::{SourceError, TileSource};
pub use self::wmts::{Capabilities, WmtsSource};
pub use self::xyz::XyzSource;
