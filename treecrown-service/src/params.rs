//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Validated parameters of the pipeline steps

use std::cmp;
use std::path::PathBuf;
use std::time::Duration;
use tile_grid::{BoundingBox, Extent, MAX_ZOOM};
use treecrown_core::core::{ApplicationCfg, Config};
use treecrown_core::detect::PredictParams;
use treecrown_core::merge::{JoinParams, RegistryOptions};

/// Default size of the download task queue
pub fn default_threads() -> usize {
    cmp::min(num_cpus::get() * 2, 64)
}

fn missing(section: &str, key: &str) -> String {
    format!("Missing configuration entry [{}] {}", section, key)
}

fn check_zoom(zoom: u8) -> Result<u8, String> {
    if zoom > MAX_ZOOM {
        Err(format!("Zoom level {} exceeds maximum {}", zoom, MAX_ZOOM))
    } else {
        Ok(zoom)
    }
}

#[derive(Clone, Debug)]
pub struct DownloadParams {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub layer: String,
    pub style: Option<String>,
    pub format: String,
    pub tile_matrix_set: String,
    pub output: String,
    pub zoom: u8,
    pub limit: Option<u64>,
    pub sleep: Option<Duration>,
    pub remove_old: bool,
    pub threads: usize,
    /// Area of interest in the CRS of the tile matrix set
    pub bbox: Option<Extent>,
    pub progress: bool,
}

impl DownloadParams {
    /// Tile directory `{output}/{layer}/{tile matrix set}/{zoom}`
    pub fn tile_dir(&self) -> PathBuf {
        PathBuf::from(&self.output)
            .join(&self.layer)
            .join(self.tile_matrix_set.replace(':', "-"))
            .join(self.zoom.to_string())
    }
}

impl<'a> Config<'a, ApplicationCfg> for DownloadParams {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let wmts = config.wmts.as_ref().ok_or_else(|| missing("wmts", "url"))?;
        let layer = wmts.layer.clone().ok_or_else(|| missing("wmts", "layer"))?;
        let download = config.download.clone().unwrap_or_default();
        let sleep = match download.sleep {
            Some(secs) if secs < 0.0 || !secs.is_finite() => {
                return Err(format!("Invalid sleep time {}", secs))
            }
            Some(secs) if secs > 0.0 => Some(Duration::from_secs_f64(secs)),
            _ => None,
        };
        Ok(DownloadParams {
            url: wmts.url.clone(),
            username: wmts.username.clone(),
            password: wmts.password.clone(),
            layer,
            style: wmts.style.clone(),
            format: wmts.format.clone().unwrap_or_else(|| "image/png".to_string()),
            tile_matrix_set: wmts
                .tile_matrix_set
                .clone()
                .unwrap_or_else(|| "EPSG:3857".to_string()),
            output: download.output.unwrap_or_else(|| "output".to_string()),
            zoom: check_zoom(download.zoom.unwrap_or(15))?,
            limit: download.limit.filter(|l| *l > 0),
            sleep,
            remove_old: download.remove_old,
            threads: download.threads.unwrap_or_else(default_threads).max(1),
            bbox: download.bbox.as_ref().map(Extent::from),
            progress: false,
        })
    }
    fn gen_config() -> String {
        let toml = r#"
[wmts]
# Service URL or URL of the capabilities document
url = "https://example.com/wmts"
#username = "user"
#password = "secret"
layer = "orthophotos"
#style = "default"
format = "image/png"
tile_matrix_set = "EPSG:3857"

[download]
output = "output"
zoom = 15
# Maximal number of tile requests (0: unlimited)
limit = 0
# Pause between requests in seconds
sleep = 0.0
remove_old = false
#threads = 8
# Area of interest in tile matrix set coordinates
#bbox = { minx = 1014000.0, miny = 6050000.0, maxx = 1024000.0, maxy = 6060000.0 }
"#;
        toml.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct ConvertParams {
    /// Tile URL or path template with `{x}`, `{y}` and `{z}` placeholders
    pub source: String,
    pub output: String,
    pub zoom: u8,
    pub bbox: BoundingBox,
    /// Output raster format (png, jpg, tif)
    pub format: String,
    pub keep_tiles: bool,
    pub threads: usize,
    pub progress: bool,
}

impl ConvertParams {
    pub fn raster_path(&self) -> PathBuf {
        PathBuf::from(&self.output).join(format!("merged.{}", self.format))
    }
    pub fn tile_dir(&self) -> PathBuf {
        PathBuf::from(&self.output)
            .join("tiles")
            .join(self.zoom.to_string())
    }
}

impl<'a> Config<'a, ApplicationCfg> for ConvertParams {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let convert = config
            .convert
            .as_ref()
            .ok_or_else(|| missing("convert", "source"))?;
        let source = convert
            .source
            .clone()
            .ok_or_else(|| missing("convert", "source"))?;
        let bbox = convert
            .bbox
            .as_ref()
            .map(BoundingBox::from)
            .ok_or_else(|| missing("convert", "bbox"))?;
        let format = convert
            .format
            .clone()
            .unwrap_or_else(|| "png".to_string())
            .to_lowercase();
        if !["png", "jpg", "jpeg", "tif", "tiff"].contains(&format.as_str()) {
            return Err(format!("Unsupported raster format '{}'", format));
        }
        Ok(ConvertParams {
            source,
            output: convert.output.clone().unwrap_or_else(|| "raster".to_string()),
            zoom: check_zoom(convert.zoom.unwrap_or(14))?,
            bbox,
            format,
            keep_tiles: convert.keep_tiles,
            threads: convert.threads.unwrap_or_else(default_threads).max(1),
            progress: false,
        })
    }
    fn gen_config() -> String {
        let toml = r#"
[convert]
# Tile source URL or local directory with {z}/{x}/{y} placeholders
source = "output/orthophotos/EPSG-3857/{z}/{x}/{y}.png"
output = "raster"
zoom = 15
# Area of interest in WGS84 degrees
bbox = { lon_min = 9.12, lat_min = 47.65, lon_max = 9.2, lat_max = 47.7 }
# Raster format: png, jpg or tif
format = "png"
keep_tiles = false
"#;
        toml.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct DetectParams {
    pub raster: String,
    /// Predictions CSV in raster pixel coordinates
    pub predictions: Option<String>,
    /// External model command invoked for each patch
    pub model_cmd: Option<String>,
    /// Model program arguments, `model_cmd` is the program when set
    pub model_args: Option<Vec<String>>,
    pub output: String,
    /// SRID of the raster, when not known from the raster itself
    pub srid: i32,
    pub predict: PredictParams,
    pub max_form_factor: Option<f64>,
}

impl<'a> Config<'a, ApplicationCfg> for DetectParams {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let detect = config
            .detect
            .as_ref()
            .ok_or_else(|| missing("detect", "raster"))?;
        let raster = detect
            .raster
            .clone()
            .ok_or_else(|| missing("detect", "raster"))?;
        if detect.predictions.is_none() && detect.model_cmd.is_none() {
            return Err("Either [detect] predictions or model_cmd is required".to_string());
        }
        let srid = detect.srid.unwrap_or(3857);
        if srid != 3857 && srid != 4326 {
            return Err(format!("Unsupported SRID {} (expected 3857 or 4326)", srid));
        }
        let defaults = PredictParams::default();
        let predict = PredictParams {
            patch_size: detect.patch_size.unwrap_or(defaults.patch_size),
            patch_overlap: detect.patch_overlap.unwrap_or(defaults.patch_overlap),
            soft_nms: detect.soft_nms.unwrap_or(defaults.soft_nms),
            sigma: detect.sigma.unwrap_or(defaults.sigma),
            iou_threshold: detect.iou_threshold.unwrap_or(defaults.iou_threshold),
            score_threshold: detect.score_threshold.unwrap_or(defaults.score_threshold),
        };
        if predict.patch_size == 0 || !(0.0..1.0).contains(&predict.patch_overlap) {
            return Err(format!(
                "Invalid patch size {} or overlap {}",
                predict.patch_size, predict.patch_overlap
            ));
        }
        if !(predict.sigma.is_finite() && predict.sigma > 0.0) {
            return Err(format!("Invalid soft-NMS sigma {}", predict.sigma));
        }
        for (key, value) in &[
            ("iou_threshold", predict.iou_threshold),
            ("score_threshold", predict.score_threshold),
        ] {
            if !(0.0..=1.0).contains(value) {
                return Err(format!("Invalid {} {} (expected 0..1)", key, value));
            }
        }
        Ok(DetectParams {
            raster,
            predictions: detect.predictions.clone(),
            model_cmd: detect.model_cmd.clone(),
            model_args: detect.model_args.clone(),
            output: detect.output.clone().unwrap_or_else(|| "trees.csv".to_string()),
            srid,
            predict,
            max_form_factor: detect.max_form_factor,
        })
    }
    fn gen_config() -> String {
        let toml = r#"
[detect]
raster = "raster/merged.png"
# Predictions CSV (xmin,ymin,xmax,ymax,label,score) in raster pixels
predictions = "raster/predictions.csv"
# Alternatively an external model command, called with a patch PNG as last argument
#model_cmd = "python3 predict_patch.py"
# Program arguments containing spaces: model_cmd is then the program only
#model_args = ["predict_patch.py", "--weights", "models/crown weights.pt"]
output = "trees.csv"
# Raster SRID (3857 or 4326)
srid = 3857
patch_size = 500
patch_overlap = 0.3
soft_nms = true
sigma = 0.01
iou_threshold = 0.15
score_threshold = 0.1
#max_form_factor = 0.3
"#;
        toml.to_string()
    }
}

#[derive(Clone, Debug)]
pub struct MergeParams {
    pub registry: String,
    pub detections: String,
    pub output: String,
    pub registry_opts: RegistryOptions,
    pub join: JoinParams,
}

impl<'a> Config<'a, ApplicationCfg> for MergeParams {
    fn from_config(config: &ApplicationCfg) -> Result<Self, String> {
        let merge = config
            .merge
            .as_ref()
            .ok_or_else(|| missing("merge", "registry"))?;
        let registry = merge
            .registry
            .clone()
            .ok_or_else(|| missing("merge", "registry"))?;
        let detections = merge
            .detections
            .clone()
            .ok_or_else(|| missing("merge", "detections"))?;
        let opts = RegistryOptions::default();
        let join = JoinParams::default();
        Ok(MergeParams {
            registry,
            detections,
            output: merge
                .output
                .clone()
                .unwrap_or_else(|| "trees.geojson".to_string()),
            registry_opts: RegistryOptions {
                id_field: merge.id_field.clone().unwrap_or(opts.id_field),
                crown_field: merge.crown_field.clone().unwrap_or(opts.crown_field),
                drop_fields: merge.drop_fields.clone().unwrap_or(opts.drop_fields),
            },
            join: JoinParams {
                lon_deg_per_m: merge.lon_deg_per_m.unwrap_or(join.lon_deg_per_m),
                lat_deg_per_m: merge.lat_deg_per_m.unwrap_or(join.lat_deg_per_m),
                min_score: merge.min_score.unwrap_or(join.min_score),
                max_diameter: merge.max_diameter.unwrap_or(join.max_diameter),
            },
        })
    }
    fn gen_config() -> String {
        let toml = r#"
[merge]
# GeoJSON point features of the tree registry
registry = "data/raw/registry.geojson"
detections = "trees.csv"
output = "trees.geojson"
id_field = "baumId"
# Crown diameter in metres
crown_field = "kronendurchmesserM"
drop_fields = ["OBJECTID"]
# Degrees per metre at the latitude of the area
lon_deg_per_m = 9.041375464338667e-06
lat_deg_per_m = 9.099335504202068e-06
min_score = 0.0
max_diameter = 50.0
"#;
        toml.to_string()
    }
}

const TOML_HEADER: &str = r#"# treecrown configuration
"#;

/// Configuration template with all sections
pub fn gen_config() -> String {
    let mut config = String::new();
    config.push_str(TOML_HEADER);
    config.push_str(&DownloadParams::gen_config());
    config.push_str(&ConvertParams::gen_config());
    config.push_str(&DetectParams::gen_config());
    config.push_str(&MergeParams::gen_config());
    config
}
