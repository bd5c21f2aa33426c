//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::detect::prediction::Prediction;
use crate::detect::DetectError;
use crate::raster::GeoTransform;
use geo::{GeodesicDistance, Point};
use std::io::{Read, Write};
use std::path::Path;
use tile_grid::merc_to_lonlat;

const HEADER: [&str; 13] = [
    "",
    "xmin",
    "ymin",
    "xmax",
    "ymax",
    "xmin_coord",
    "ymin_coord",
    "xmax_coord",
    "ymax_coord",
    "xcenter_coord",
    "ycenter_coord",
    "diameter",
    "score",
];

/// Georeferenced tree crown.
/// Coordinates are WGS84 degrees (x: longitude, y: latitude), diameter in metres.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct DetectedTree {
    #[serde(rename = "")]
    pub id: usize,
    pub xmin: i64,
    pub ymin: i64,
    pub xmax: i64,
    pub ymax: i64,
    pub xmin_coord: f64,
    pub ymin_coord: f64,
    pub xmax_coord: f64,
    pub ymax_coord: f64,
    pub xcenter_coord: f64,
    pub ycenter_coord: f64,
    pub diameter: f64,
    pub score: f64,
}

impl DetectedTree {
    pub fn center(&self) -> Point<f64> {
        Point::new(self.xcenter_coord, self.ycenter_coord)
    }
}

/// Crown diameter as mean of the geodesic box width (south edge) and height (west edge)
fn crown_diameter(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> f64 {
    let south_west = Point::new(xmin, ymin);
    let width = south_west.geodesic_distance(&Point::new(xmax, ymin));
    let height = south_west.geodesic_distance(&Point::new(xmin, ymax));
    (width + height) / 2.0
}

/// Convert pixel predictions into geographic tree crowns.
/// `srid` is the CRS of the raster transform (3857 or 4326).
pub fn georeference(
    predictions: &[Prediction],
    transform: &GeoTransform,
    srid: i32,
) -> Result<Vec<DetectedTree>, DetectError> {
    let to_lonlat: fn(f64, f64) -> (f64, f64) = match srid {
        3857 => merc_to_lonlat,
        4326 => |x, y| (x, y),
        _ => return Err(DetectError::UnsupportedSrid(srid)),
    };
    let trees = predictions
        .iter()
        .enumerate()
        .map(|(id, pred)| {
            let (x1, y1) = transform.apply(pred.xmin, pred.ymin);
            let (x2, y2) = transform.apply(pred.xmax, pred.ymax);
            let (cx, cy) = transform.apply(
                (pred.xmin + pred.xmax) / 2.0,
                (pred.ymin + pred.ymax) / 2.0,
            );
            let (lon1, lat1) = to_lonlat(x1, y1);
            let (lon2, lat2) = to_lonlat(x2, y2);
            let (xcenter, ycenter) = to_lonlat(cx, cy);
            let (xmin, xmax) = (lon1.min(lon2), lon1.max(lon2));
            let (ymin, ymax) = (lat1.min(lat2), lat1.max(lat2));
            DetectedTree {
                id,
                xmin: pred.xmin as i64,
                ymin: pred.ymin as i64,
                xmax: pred.xmax as i64,
                ymax: pred.ymax as i64,
                xmin_coord: xmin,
                ymin_coord: ymin,
                xmax_coord: xmax,
                ymax_coord: ymax,
                xcenter_coord: xcenter,
                ycenter_coord: ycenter,
                diameter: crown_diameter(xmin, ymin, xmax, ymax),
                score: pred.score,
            }
        })
        .collect();
    Ok(trees)
}

pub fn trees_to_writer<W: Write>(trees: &[DetectedTree], writer: W) -> Result<(), DetectError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&HEADER)?;
    for tree in trees {
        let float = |v: f64| format!("{:.8}", v);
        wtr.write_record(&[
            tree.id.to_string(),
            tree.xmin.to_string(),
            tree.ymin.to_string(),
            tree.xmax.to_string(),
            tree.ymax.to_string(),
            float(tree.xmin_coord),
            float(tree.ymin_coord),
            float(tree.xmax_coord),
            float(tree.ymax_coord),
            float(tree.xcenter_coord),
            float(tree.ycenter_coord),
            float(tree.diameter),
            float(tree.score),
        ])?;
    }
    wtr.flush().map_err(|source| DetectError::Io {
        path: "CSV output".to_string(),
        source,
    })
}

pub fn write_trees<P: AsRef<Path>>(trees: &[DetectedTree], path: P) -> Result<(), DetectError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| DetectError::Io {
            path: parent.display().to_string(),
            source,
        })?;
    }
    let file = std::fs::File::create(path).map_err(|source| DetectError::Io {
        path: path.display().to_string(),
        source,
    })?;
    trees_to_writer(trees, file)?;
    info!("{} trees written to {}", trees.len(), path.display());
    Ok(())
}

pub fn trees_from_reader<R: Read>(reader: R) -> Result<Vec<DetectedTree>, DetectError> {
    csv::Reader::from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<DetectedTree>, csv::Error>>()
        .map_err(DetectError::from)
}

pub fn read_trees<P: AsRef<Path>>(path: P) -> Result<Vec<DetectedTree>, DetectError> {
    let file = std::fs::File::open(path.as_ref()).map_err(|source| DetectError::Io {
        path: path.as_ref().display().to_string(),
        source,
    })?;
    trees_from_reader(file)
}
