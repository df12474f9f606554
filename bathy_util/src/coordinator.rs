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
//! Splits the water polygons into chunks, classifies the chunks on a pool of
//! workers and merges the qualifying ids.

use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use anyhow::{anyhow, bail, ensure, Result};
use crossbeam::channel;
use log::{debug, error, info, warn};
use rayon::ThreadPoolBuilder;
use crate::classify::{classify, Decision};
use crate::raster::RasterOpener;
use crate::util::{even_split, format_duration, remaining_time_msg, ChunkPairIterator};
use crate::vector::{filter_by_bbox, BoundingBox, IdPolicy, PolygonRecord, VectorSource};

const PROGRESS_EVERY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionStrategy {
    /// Count first, then every worker reads only its own row range
    IndexRange,
    /// Read everything once, filter, then cut into one piece per worker
    EvenSplit,
}

impl FromStr for PartitionStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "index-range" => Ok(PartitionStrategy::IndexRange),
            "even-split" => Ok(PartitionStrategy::EvenSplit),
            _ => bail!("Unknown partition strategy {:?}, use index-range or even-split", s),
        }
    }
}

/// Run wide settings, copied to every worker
#[derive(Debug, Clone)]
pub struct ClassificationParams {
    /// Minimum share of non zero pixels
    pub threshold: f64,
    /// Minimum planar area, in source units
    pub min_area: f64,
    pub bbox: Option<BoundingBox>,
    /// Features per chunk, index range partitioning only
    pub chunk_size: usize,
    pub id_policy: IdPolicy,
    pub partition: PartitionStrategy,
}

impl Default for ClassificationParams {
    fn default() -> Self {
        ClassificationParams {
            threshold: 0.2,
            min_area: 0.00005,
            bbox: None,
            chunk_size: 10000,
            id_policy: IdPolicy::Require,
            partition: PartitionStrategy::IndexRange,
        }
    }
}

impl ClassificationParams {
    pub fn validate(&self) -> Result<()> {
        ensure!((0.0..=1.0).contains(&self.threshold), "Threshold must be in [0, 1], got {}", self.threshold);
        ensure!(self.min_area >= 0.0, "Min area must not be negative, got {}", self.min_area);
        ensure!(self.chunk_size >= 1, "Chunk size must be at least 1");
        if let Some(b) = self.bbox.as_ref() {
            BoundingBox::new(b.min_x, b.min_y, b.max_x, b.max_y)?;
        }
        Ok(())
    }
}

/// Contiguous features [start, start + len)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: usize,
    pub len: usize,
}

pub fn plan_index_chunks(total: usize, chunk_size: usize) -> Vec<ChunkRange> {
    if total == 0 {
        return Vec::new();
    }

    ChunkPairIterator::new(0, total - 1, chunk_size.max(1))
        .map(|(first, last)| ChunkRange { start: first, len: last - first + 1 })
        .collect()
}

pub fn plan_even_chunks(total: usize, workers: usize) -> Vec<ChunkRange> {
    even_split(total, workers.max(1))
        .into_iter()
        .map(|(start, len)| ChunkRange { start, len })
        .collect()
}

/// What one worker gets: either a range to read itself, or records already read
struct ChunkTask {
    range: ChunkRange,
    records: Option<Vec<PolygonRecord>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkResult {
    pub ids: Vec<i64>,
    /// Records looked at, after the bbox filter
    pub num_records: usize,
    /// Records that passed the area and repair checks
    pub num_processed: usize,
    pub num_qualifying: usize,
    pub num_skipped: usize,
    /// Records whose classification raised an error, they are left out
    pub num_failed: usize,
    /// Qualifying records without a usable id
    pub num_unidentified: usize,
}

/// Classifies a chunk with its own raster handle, opened here and closed on return.
/// A failure on one record is logged and only drops that record.
pub fn process_chunk(
    records: &[PolygonRecord],
    range: ChunkRange,
    raster_opener: &dyn RasterOpener,
    params: &ClassificationParams,
) -> Result<ChunkResult> {

    let raster = raster_opener.open()?;

    let mut result = ChunkResult::default();

    for record in records {
        result.num_records += 1;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            classify(record.geometry.as_ref(), raster.as_ref(), params.threshold, params.min_area)
        }));

        let decision = match outcome {
            Ok(Ok(d)) => d,
            Ok(Err(e)) => {
                warn!("Feature {} failed, leaving it out: {:#}", record.index, e);
                result.num_failed += 1;
                continue;
            }
            Err(_) => {
                warn!("Feature {} panicked during classification, leaving it out", record.index);
                result.num_failed += 1;
                continue;
            }
        };

        if decision.passed_shape_checks() {
            result.num_processed += 1;

            if result.num_processed % PROGRESS_EVERY == 0 {
                info!("Worker processing feature {} (offset {})", result.num_processed, range.start);
            }
        }

        match decision {
            Decision::Qualifies { .. } => {
                result.num_qualifying += 1;
                match record.id {
                    Some(id) => result.ids.push(id.value()),
                    None => {
                        debug!("Feature {} qualifies but has no usable id", record.index);
                        result.num_unidentified += 1;
                    }
                }
            }
            Decision::NotQualifying { .. } => {}
            Decision::Skipped(reason) => {
                debug!("Feature {} skipped: {:?}", record.index, reason);
                result.num_skipped += 1;
            }
        }
    }

    info!("Worker finished: {} IDs with bathymetry from {} features (offset {})",
        result.ids.len(), result.num_processed, range.start);

    Ok(result)
}

fn run_chunk(
    task: ChunkTask,
    vector: &dyn VectorSource,
    raster_opener: &dyn RasterOpener,
    params: &ClassificationParams,
) -> Result<ChunkResult> {
    let records = match task.records {
        Some(records) => records,
        None => {
            let records = vector.read_range(task.range.start, task.range.len, params.id_policy)?;
            filter_by_bbox(records, params.bbox.as_ref())
        }
    };

    process_chunk(&records, task.range, raster_opener, params)
}

fn build_tasks(vector: &dyn VectorSource, params: &ClassificationParams, workers: usize) -> Result<Vec<ChunkTask>> {
    match params.partition {
        PartitionStrategy::IndexRange => {
            let total = vector.feature_count()?;
            info!("Total features: {}, chunk size: {}", total, params.chunk_size);

            Ok(plan_index_chunks(total, params.chunk_size).into_iter()
                .map(|range| ChunkTask { range, records: None })
                .collect())
        }
        PartitionStrategy::EvenSplit => {
            let all = vector.read_all(params.id_policy)?;
            let num_read = all.len();
            let mut all = filter_by_bbox(all, params.bbox.as_ref());
            info!("Read {} features, {} after the bbox filter", num_read, all.len());

            let ranges = plan_even_chunks(all.len(), workers);
            let mut tasks = Vec::with_capacity(ranges.len());

            //cut from the back so each piece is moved out without copying
            for range in ranges.into_iter().rev() {
                let records = all.split_off(range.start);
                tasks.push(ChunkTask { range, records: Some(records) });
            }
            tasks.reverse();

            Ok(tasks)
        }
    }
}

/// Union of the id lists, sorted, without duplicates
pub fn merge_ids<I>(partials: I) -> Vec<i64>
where I: IntoIterator,
      I::Item: IntoIterator<Item = i64>
{
    partials.into_iter()
        .flatten()
        .collect::<BTreeSet<i64>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Sorted, unique
    pub ids: Vec<i64>,
    pub num_chunks: usize,
    /// Chunks that errored, they contributed nothing
    pub num_failed_chunks: usize,
    pub num_records: usize,
    pub num_qualifying: usize,
    pub num_failed_records: usize,
    pub num_unidentified: usize,
}

/// Classifies every feature of the vector source on `workers` threads.
///
/// Chunks are merged in the order they finish; the result does not depend on it.
/// A chunk that fails (unreadable range, raster that will not open, ...) is logged
/// and counted, the others still contribute.
pub fn run(
    vector: Arc<dyn VectorSource>,
    raster_opener: Arc<dyn RasterOpener>,
    params: &ClassificationParams,
    workers: usize,
) -> Result<RunSummary> {

    params.validate()?;
    ensure!(workers >= 1, "Need at least 1 worker");

    let now = Instant::now();

    let tasks = build_tasks(vector.as_ref(), params, workers)?;
    let num_chunks = tasks.len();

    info!("Created {} chunks for {} workers", num_chunks, workers);

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("bathy-worker-{}", i))
        .build()?;

    let (sender, receiver) = channel::unbounded::<(ChunkRange, Result<ChunkResult>)>();

    let mut summary = RunSummary {
        num_chunks,
        ..Default::default()
    };
    let mut partials: Vec<Vec<i64>> = Vec::with_capacity(num_chunks);

    pool.in_place_scope(|scope| {
        for task in tasks {
            let sender = sender.clone();
            let vector = Arc::clone(&vector);
            let raster_opener = Arc::clone(&raster_opener);
            let params = params.clone();

            scope.spawn(move |_| {
                let range = task.range;
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_chunk(task, vector.as_ref(), raster_opener.as_ref(), &params)
                })).unwrap_or_else(|_| Err(anyhow!("Worker panicked")));

                //the receiver only goes away once every chunk is in
                let _ = sender.send((range, result));
            });
        }

        drop(sender);

        let mut num_done = 0;
        let mut num_ids_so_far = 0;

        for (range, result) in receiver.iter() {
            num_done += 1;

            match result {
                Ok(chunk) => {
                    num_ids_so_far += chunk.ids.len();

                    summary.num_records += chunk.num_records;
                    summary.num_qualifying += chunk.num_qualifying;
                    summary.num_failed_records += chunk.num_failed;
                    summary.num_unidentified += chunk.num_unidentified;

                    if chunk.ids.is_empty() {
                        debug!("Chunk at {} ({} features) had no ids", range.start, range.len);
                    }

                    partials.push(chunk.ids);
                }
                Err(e) => {
                    error!("Chunk at {} ({} features) failed, its ids are missing: {:#}", range.start, range.len, e);
                    summary.num_failed_chunks += 1;
                }
            }

            info!("Completed chunk {}/{}, total IDs so far: {}", num_done, num_chunks, num_ids_so_far);
            info!("{}", remaining_time_msg(&now, num_done as u32, num_chunks as u32));
        }
    });

    summary.ids = merge_ids(partials);

    info!("Classified {} features in {}: {} qualifying, {} unique ids, {} failed features, {} failed chunks",
        summary.num_records, format_duration(now.elapsed()),
        summary.num_qualifying, summary.ids.len(),
        summary.num_failed_records, summary.num_failed_chunks);

    Ok(summary)
}
