//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, AppSettings, ArgMatches, SubCommand};
use dotenv::dotenv;
use env_logger::Builder;
use log::Record;
use std::env;
use std::fmt::Display;
use std::io::Write;
use std::process;
use std::str::FromStr;
use time;
use treecrown_core::core::config::{parse_numlist, BboxCfg, ExtentCfg};
use treecrown_core::core::{read_config, ApplicationCfg, Config};
use treecrown_service::{ConvertParams, DetectParams, DownloadParams, MergeParams};

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        writeln!(
            buf,
            "{}.{:03} {} {}",
            time::strftime("%Y-%m-%d %H:%M:%S", &t).unwrap_or_default(),
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let rust_log_env = env::var("RUST_LOG");
    let rust_log = match (args.value_of("loglevel"), rust_log_env.as_ref()) {
        (None, Ok(env_level)) => env_level.as_str(),
        (loglevel, _) => match loglevel.unwrap_or("info") {
            "debug" => "debug,tokio=info",
            loglevel => loglevel,
        },
    };
    builder.parse_filters(rust_log);

    builder.init();
}

fn exit_on_error<T, E: Display>(result: Result<T, E>) -> T {
    result.unwrap_or_else(|err| {
        eprintln!("Error: {}", err);
        process::exit(1)
    })
}

fn parse_arg<T: FromStr>(args: &ArgMatches<'_>, name: &str) -> Option<T> {
    args.value_of(name).map(|s| {
        exit_on_error(
            s.parse::<T>()
                .map_err(|_| format!("Error parsing '{}' value '{}'", name, s)),
        )
    })
}

fn string_arg(args: &ArgMatches<'_>, name: &str) -> Option<String> {
    args.value_of(name).map(|s| s.to_string())
}

fn config_from_args(args: &ArgMatches<'_>) -> ApplicationCfg {
    match args.value_of("config") {
        Some(cfgpath) => {
            info!("Reading configuration from '{}'", cfgpath);
            exit_on_error(
                read_config(cfgpath).map_err(|err| format!("Error reading configuration - {}", err)),
            )
        }
        None => ApplicationCfg::default(),
    }
}

fn download(args: &ArgMatches<'_>) {
    let mut config = config_from_args(args);
    {
        let wmts = config.wmts.get_or_insert_with(Default::default);
        if let Some(url) = string_arg(args, "url") {
            wmts.url = url;
        }
        for (name, value) in &mut [
            ("layer", &mut wmts.layer),
            ("username", &mut wmts.username),
            ("password", &mut wmts.password),
            ("style", &mut wmts.style),
            ("format", &mut wmts.format),
            ("tile-matrix-set", &mut wmts.tile_matrix_set),
        ] {
            if let Some(arg) = string_arg(args, name) {
                **value = Some(arg);
            }
        }
    }
    {
        let download = config.download.get_or_insert_with(Default::default);
        if let Some(output) = string_arg(args, "output") {
            download.output = Some(output);
        }
        if let Some(zoom) = parse_arg(args, "zoom") {
            download.zoom = Some(zoom);
        }
        if let Some(limit) = parse_arg(args, "limit") {
            download.limit = Some(limit);
        }
        if let Some(sleep) = parse_arg(args, "sleep") {
            download.sleep = Some(sleep);
        }
        if let Some(threads) = parse_arg(args, "threads") {
            download.threads = Some(threads);
        }
        if let Some(remove_old) = parse_arg(args, "remove-old") {
            download.remove_old = remove_old;
        }
        if let Some(numlist) = args.value_of("bbox") {
            let [minx, miny, maxx, maxy] = exit_on_error(parse_numlist(numlist));
            download.bbox = Some(ExtentCfg {
                minx,
                miny,
                maxx,
                maxy,
            });
        }
    }
    if config.wmts.as_ref().map_or(true, |wmts| wmts.url.is_empty()) {
        exit_on_error::<(), _>(Err("Missing WMTS URL (--url or [wmts] url)"));
    }
    let mut params = exit_on_error(DownloadParams::from_config(&config));
    params.progress = parse_arg(args, "progress").unwrap_or(true);
    exit_on_error(treecrown_service::download(&params));
}

fn convert(args: &ArgMatches<'_>) {
    let mut config = config_from_args(args);
    {
        let convert = config.convert.get_or_insert_with(Default::default);
        if let Some(source) = string_arg(args, "source") {
            convert.source = Some(source);
        }
        if let Some(output) = string_arg(args, "output") {
            convert.output = Some(output);
        }
        if let Some(format) = string_arg(args, "format") {
            convert.format = Some(format);
        }
        if let Some(zoom) = parse_arg(args, "zoom") {
            convert.zoom = Some(zoom);
        }
        if let Some(threads) = parse_arg(args, "threads") {
            convert.threads = Some(threads);
        }
        if let Some(keep_tiles) = parse_arg(args, "keep-tiles") {
            convert.keep_tiles = keep_tiles;
        }
        if let Some(numlist) = args.value_of("bbox") {
            let [lon_min, lat_min, lon_max, lat_max] = exit_on_error(parse_numlist(numlist));
            convert.bbox = Some(BboxCfg {
                lon_min,
                lat_min,
                lon_max,
                lat_max,
            });
        }
    }
    let mut params = exit_on_error(ConvertParams::from_config(&config));
    params.progress = parse_arg(args, "progress").unwrap_or(true);
    let path = exit_on_error(treecrown_service::convert(&params));
    println!("{}", path.display());
}

fn detect(args: &ArgMatches<'_>) {
    let mut config = config_from_args(args);
    {
        let detect = config.detect.get_or_insert_with(Default::default);
        for (name, value) in &mut [
            ("raster", &mut detect.raster),
            ("predictions", &mut detect.predictions),
            ("model-cmd", &mut detect.model_cmd),
            ("output", &mut detect.output),
        ] {
            if let Some(arg) = string_arg(args, name) {
                **value = Some(arg);
            }
        }
        if let Some(srid) = parse_arg(args, "srid") {
            detect.srid = Some(srid);
        }
        if let Some(score) = parse_arg(args, "score-threshold") {
            detect.score_threshold = Some(score);
        }
    }
    let params = exit_on_error(DetectParams::from_config(&config));
    let trees = exit_on_error(treecrown_service::detect(&params));
    info!("{} trees written to {}", trees.len(), params.output);
}

fn merge(args: &ArgMatches<'_>) {
    let mut config = config_from_args(args);
    {
        let merge = config.merge.get_or_insert_with(Default::default);
        for (name, value) in &mut [
            ("registry", &mut merge.registry),
            ("detections", &mut merge.detections),
            ("output", &mut merge.output),
            ("id-field", &mut merge.id_field),
            ("crown-field", &mut merge.crown_field),
        ] {
            if let Some(arg) = string_arg(args, name) {
                **value = Some(arg);
            }
        }
        if let Some(min_score) = parse_arg(args, "min-score") {
            merge.min_score = Some(min_score);
        }
    }
    let params = exit_on_error(MergeParams::from_config(&config));
    exit_on_error(treecrown_service::merge(&params));
}

#[cfg(feature = "with-gdal")]
extern crate treecrown_gdal;

fn version_info() -> String {
    #[cfg(feature = "with-gdal")]
    let version = format!(
        "{} (GDAL version {})",
        crate_version!(),
        treecrown_gdal::gdal_version()
    );
    #[cfg(not(feature = "with-gdal"))]
    let version = crate_version!().to_string();
    version
}

fn main() {
    dotenv().ok();
    let version_info = version_info();
    let mut app = App::new("treecrown")
        .version(&version_info as &str)
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("urban tree inventory from aerial imagery")
        .subcommand(SubCommand::with_name("download")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --url=[URL] 'WMTS service or capabilities URL'
                                              --username=[USER] 'Basic authentication user'
                                              --password=[PASSWORD] 'Basic authentication password'
                                              --layer=[NAME] 'WMTS layer'
                                              --style=[NAME] 'WMTS style'
                                              --format=[MIMETYPE] 'Image format (Default: image/png)'
                                              --tile-matrix-set=[NAME] 'Tile matrix set (Default: EPSG:3857)'
                                              --zoom=[LEVEL] 'Zoom level'
                                              --bbox=[minx,miny,maxx,maxy] 'Extent in tile matrix set CRS'
                                              --output=[DIR] 'Output directory'
                                              --limit=[NUM] 'Maximal number of tile requests'
                                              --sleep=[SECONDS] 'Pause between requests'
                                              --threads=[NUM] 'Number of parallel requests'
                                              --remove-old=[false|true] 'Remove previously downloaded tiles'
                                              --progress=[true|false] 'Show progress bar'")
                        .about("Download tiles from a WMTS service"))
        .subcommand(SubCommand::with_name("convert")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --source=[URL_OR_DIR] 'Tile source with {z}/{x}/{y} placeholders'
                                              --zoom=[LEVEL] 'Zoom level'
                                              --bbox=[lon_min,lat_min,lon_max,lat_max] 'Area of interest in WGS84'
                                              --output=[DIR] 'Output directory'
                                              --format=[png|jpg|tif] 'Raster format'
                                              --threads=[NUM] 'Number of parallel requests'
                                              --keep-tiles=[false|true] 'Keep downloaded tiles'
                                              --progress=[true|false] 'Show progress bar'")
                        .about("Stitch the tiles of an area to a georeferenced raster"))
        .subcommand(SubCommand::with_name("detect")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --raster=[FILE] 'Georeferenced raster'
                                              --predictions=[FILE] 'Predictions CSV in raster pixels'
                                              --model-cmd=[COMMAND] 'External model command'
                                              --srid=[3857|4326] 'Raster SRID'
                                              --score-threshold=[SCORE] 'Minimal prediction score'
                                              --output=[FILE] 'Detected trees CSV'")
                        .about("Detect tree crowns on a raster"))
        .subcommand(SubCommand::with_name("merge")
                        .args_from_usage("-c, --config=[FILE] 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --registry=[FILE] 'Tree registry GeoJSON'
                                              --detections=[FILE] 'Detected trees CSV'
                                              --id-field=[NAME] 'Registry tree id property'
                                              --crown-field=[NAME] 'Registry crown diameter property'
                                              --min-score=[SCORE] 'Minimal detection score'
                                              --output=[FILE] 'Output GeoJSON'")
                        .about("Join detected trees with the tree registry"))
        .subcommand(SubCommand::with_name("genconfig")
                        .args_from_usage("--loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Generate configuration template"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        // Usage errors exit with status 1, --help and --version with 0
        Result::Err(e) => e.exit(),
        Result::Ok(matches) => match matches.subcommand() {
            ("download", Some(sub_m)) => {
                init_logger(sub_m);
                download(sub_m);
            }
            ("convert", Some(sub_m)) => {
                init_logger(sub_m);
                convert(sub_m);
            }
            ("detect", Some(sub_m)) => {
                init_logger(sub_m);
                detect(sub_m);
            }
            ("merge", Some(sub_m)) => {
                init_logger(sub_m);
                merge(sub_m);
            }
            ("genconfig", Some(sub_m)) => {
                init_logger(sub_m);
                println!("{}", treecrown_service::gen_config());
            }
            _ => {
                let _ = app.print_help();
                println!("");
            }
        },
    }
}
