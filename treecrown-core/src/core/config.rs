//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use tera::{Context, Tera};
use tile_grid::{BoundingBox, Extent};
use toml::Value;

pub trait Config<'a, C: Deserialize<'a>>
where
    Self: std::marker::Sized,
{
    /// Read configuration
    fn from_config(config: &C) -> Result<Self, String>;
    /// Generate configuration template
    fn gen_config() -> String;
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ApplicationCfg {
    pub wmts: Option<WmtsCfg>,
    pub download: Option<DownloadCfg>,
    pub convert: Option<ConvertCfg>,
    pub detect: Option<DetectCfg>,
    pub merge: Option<MergeCfg>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct WmtsCfg {
    /// Service URL or URL of the capabilities document
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub layer: Option<String>,
    pub style: Option<String>,
    /// Image format (Default: image/png)
    pub format: Option<String>,
    /// Tile matrix set (Default: EPSG:3857)
    pub tile_matrix_set: Option<String>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct DownloadCfg {
    pub output: Option<String>,
    pub zoom: Option<u8>,
    /// Maximal number of tile requests (0: unlimited)
    pub limit: Option<u64>,
    /// Pause between requests in seconds
    pub sleep: Option<f64>,
    #[serde(default)]
    pub remove_old: bool,
    pub threads: Option<usize>,
    /// Area of interest in the CRS of the tile matrix set
    pub bbox: Option<ExtentCfg>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ConvertCfg {
    /// URL or path template with {x}, {y} and {z} placeholders
    pub source: Option<String>,
    pub output: Option<String>,
    pub zoom: Option<u8>,
    pub bbox: Option<BboxCfg>,
    /// Output image format (png, jpg, tif)
    pub format: Option<String>,
    #[serde(default)]
    pub keep_tiles: bool,
    pub threads: Option<usize>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct DetectCfg {
    pub raster: Option<String>,
    /// Predictions CSV in raster pixel coordinates
    pub predictions: Option<String>,
    /// External model command invoked for each patch
    pub model_cmd: Option<String>,
    /// Arguments of `model_cmd`, passed without splitting
    pub model_args: Option<Vec<String>>,
    pub output: Option<String>,
    /// SRID of the raster (3857 or 4326)
    pub srid: Option<i32>,
    pub patch_size: Option<u32>,
    pub patch_overlap: Option<f64>,
    pub soft_nms: Option<bool>,
    pub sigma: Option<f64>,
    pub iou_threshold: Option<f64>,
    pub score_threshold: Option<f64>,
    pub max_form_factor: Option<f64>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct MergeCfg {
    pub registry: Option<String>,
    pub detections: Option<String>,
    pub output: Option<String>,
    pub id_field: Option<String>,
    pub crown_field: Option<String>,
    pub drop_fields: Option<Vec<String>>,
    pub lon_deg_per_m: Option<f64>,
    pub lat_deg_per_m: Option<f64>,
    pub min_score: Option<f64>,
    pub max_diameter: Option<f64>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ExtentCfg {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl From<&ExtentCfg> for Extent {
    fn from(cfg: &ExtentCfg) -> Extent {
        Extent {
            minx: cfg.minx,
            miny: cfg.miny,
            maxx: cfg.maxx,
            maxy: cfg.maxy,
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct BboxCfg {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl From<&BboxCfg> for BoundingBox {
    fn from(cfg: &BboxCfg) -> BoundingBox {
        BoundingBox::new(cfg.lon_min, cfg.lat_min, cfg.lon_max, cfg.lat_max)
    }
}

/// Parse a list of four comma or space separated numbers
pub fn parse_numlist(numlist: &str) -> Result<[f64; 4], String> {
    let arr = numlist
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<f64>()
                .map_err(|_| format!("Error parsing '{}' as float value", v))
        })
        .collect::<Result<Vec<f64>, String>>()?;
    match arr.as_slice() {
        [a, b, c, d] => Ok([*a, *b, *c, *d]),
        _ => Err(format!("Expected 4 values, got {}", arr.len())),
    }
}

/// Load and parse the config file into an config struct.
pub fn read_config<'a, T: Deserialize<'a>>(path: &str) -> Result<T, String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => {
            return Err("Could not find config file!".to_string());
        }
    };
    let mut config_toml = String::new();
    if let Err(err) = file.read_to_string(&mut config_toml) {
        return Err(format!("Error while reading config: [{}]", err));
    };

    parse_config(config_toml, path)
}

/// Parse the configuration into an config struct.
pub fn parse_config<'a, T: Deserialize<'a>>(config_toml: String, path: &str) -> Result<T, String> {
    // Check for shell style ${var} expressions
    let re = Regex::new(r"\$\{([[:alnum:]_]+)\}").map_err(|e| e.to_string())?;
    if re.is_match(&config_toml) {
        return Err(
            "Replace environment variable syntax ${VARNAME} with `{{env.VARNAME}}`".to_string(),
        );
    }

    // Parse template
    let mut tera = Tera::default();
    tera.add_raw_template(path, &config_toml)
        .map_err(|e| format!("Template error: {}", e))?;
    let mut context = Context::new();
    let env: HashMap<String, String> = env::vars().collect();
    context.insert("env", &env);
    let toml = tera.render(path, &context).map_err(|e| match e.source() {
        Some(source) => format!("Template error: {}", source),
        None => format!("Template error: {}", e),
    })?;

    toml.parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| format!("{} - {}", path, err))
}
