/*
This file is part of the Water Bathymetry Tagger
Copyright (C) 2022 Novel-T

The Water Bathymetry Tagger is free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation, either version 3 of the License, or
(at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program.  If not, see <http://www.gnu.org/licenses/>.
*/
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::available_parallelism;
use anyhow::Result;
use bathy_util::coordinator::{run, ClassificationParams, PartitionStrategy};
use bathy_util::io::write_id_list;
use bathy_util::raster::{GdalRaster, GdalRasterOpener, RasterSource};
use bathy_util::vector::{BoundingBox, IdPolicy, OgrVectorSource};
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use structopt::StructOpt;

/// Writes the osm_id of every water polygon whose pixels in the TID raster are
/// mostly measured soundings (non zero), one id per line.
#[derive(StructOpt)]
struct Cli {

    #[structopt(parse(from_os_str), long, help="Water polygons (GPKG, FlatGeobuf, ...), first layer is used")]
    water: PathBuf,

    #[structopt(parse(from_os_str), long, help="TID raster, band 1")]
    tid: PathBuf,

    #[structopt(parse(from_os_str), long, default_value = "water_with_bathymetry.txt")]
    output: PathBuf,

    #[structopt(long, default_value = "0.2", help="Minimum share of non zero pixels")]
    threshold: f64,

    #[structopt(long, default_value = "0.00005", help="Smaller polygons are skipped, in layer units")]
    min_area: f64,

    #[structopt(long, help="Defaults to the number of cores")]
    workers: Option<usize>,

    #[structopt(long, number_of_values = 4, allow_hyphen_values = true, help="minx miny maxx maxy")]
    bbox: Option<Vec<f64>>,

    #[structopt(long, default_value = "10000")]
    chunk_size: usize,

    #[structopt(long, default_value = "index-range", help="index-range or even-split")]
    partition: PartitionStrategy,

    #[structopt(long, help="Use the feature position when the id column is empty")]
    index_fallback: bool,

    #[structopt(long, default_value = "osm_id")]
    id_field: String,

    #[structopt(long, default_value = "Info")]
    log_level: LevelFilter,
}

fn tag_water(args: &Cli) -> Result<()> {

    let mut missing = false;
    for path in [&args.water, &args.tid] {
        if !path.exists() {
            error!("Input file {:?} does not exist", path);
            missing = true;
        }
    }
    if missing {
        return Ok(());
    }

    let params = ClassificationParams {
        threshold: args.threshold,
        min_area: args.min_area,
        bbox: args.bbox.as_deref().map(BoundingBox::from_slice).transpose()?,
        chunk_size: args.chunk_size,
        id_policy: if args.index_fallback { IdPolicy::IndexFallback } else { IdPolicy::Require },
        partition: args.partition,
    };
    params.validate()?;

    let workers = match args.workers {
        Some(w) => w,
        None => available_parallelism().map(|n| n.get()).unwrap_or(1),
    };

    //fail early on an unreadable raster, workers open their own handles
    let raster = GdalRaster::open(&args.tid)?;
    info!("TID raster {:?}\n{}", args.tid, raster.stats());
    drop(raster);

    if let Some(bbox) = params.bbox.as_ref() {
        info!("Only features intersecting {}", bbox);
    }

    let summary = run(
        Arc::new(OgrVectorSource::new(&args.water, &args.id_field)),
        Arc::new(GdalRasterOpener::new(&args.tid)),
        &params,
        workers,
    )?;

    write_id_list(&args.output, &summary.ids)?;

    info!("Wrote {} IDs to {:?}", summary.ids.len(), args.output);

    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::from_args();

    SimpleLogger::new().with_level(args.log_level).init()?;

    tag_water(&args)
}
