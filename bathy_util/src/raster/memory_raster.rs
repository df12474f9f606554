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
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use anyhow::{ensure, Result};
use ndarray::{s, Array2};
use crate::raster::{PixelWindow, RasterOpener, RasterSource, RasterStats};

/// Raster already held in memory, data is (num_rows, num_cols)
#[derive(Debug, Clone)]
pub struct MemoryRaster {
    stats: RasterStats,
    data: Array2<i32>,
}

impl MemoryRaster {
    pub fn new(stats: RasterStats, data: Array2<i32>) -> Result<Self> {
        ensure!(data.dim() == (stats.num_rows as usize, stats.num_cols as usize),
            "Data shape {:?} does not match {} rows and {} cols", data.dim(), stats.num_rows, stats.num_cols);

        Ok(MemoryRaster { stats, data })
    }

    pub fn data(&self) -> &Array2<i32> {
        &self.data
    }
}

impl RasterSource for MemoryRaster {
    fn stats(&self) -> &RasterStats {
        &self.stats
    }

    fn read_window(&self, window: &PixelWindow) -> Result<Array2<i32>> {
        ensure!(window.col_off + window.width <= self.stats.num_cols as usize &&
            window.row_off + window.height <= self.stats.num_rows as usize,
            "Window {} is outside the raster", window);

        Ok(self.data.slice(s![
            window.row_off..window.row_off + window.height,
            window.col_off..window.col_off + window.width
        ]).to_owned())
    }
}

/// Shares one memory raster between workers, counting how many handles were opened
pub struct MemoryRasterOpener {
    raster: Arc<MemoryRaster>,
    opened: AtomicUsize,
}

impl MemoryRasterOpener {
    pub fn new(raster: MemoryRaster) -> Self {
        MemoryRasterOpener {
            raster: Arc::new(raster),
            opened: AtomicUsize::new(0),
        }
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl RasterOpener for MemoryRasterOpener {
    fn open(&self) -> Result<Box<dyn RasterSource>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(Arc::clone(&self.raster)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_read_window() {
        let stats = RasterStats::from_geo_transform(&[0., 1., 0., 3., 0., -1.], 4, 3, "".to_string()).unwrap();
        let raster = MemoryRaster::new(stats, arr2(&[
            [1, 2, 3, 4],
            [5, 6, 7, 8],
            [9, 10, 11, 12],
        ])).unwrap();

        let w = raster.read_window(&PixelWindow { col_off: 1, row_off: 1, width: 3, height: 2 }).unwrap();
        assert_eq!(w, arr2(&[[6, 7, 8], [10, 11, 12]]));

        assert!(raster.read_window(&PixelWindow { col_off: 2, row_off: 0, width: 3, height: 1 }).is_err());

        let opener = MemoryRasterOpener::new(raster);
        let handle = opener.open().unwrap();
        assert_eq!(handle.stats().num_cols, 4);
        assert_eq!(opener.open_count(), 1);
    }

    #[test]
    fn test_shape_mismatch() {
        let stats = RasterStats::from_geo_transform(&[0., 1., 0., 3., 0., -1.], 4, 3, "".to_string()).unwrap();
        assert!(MemoryRaster::new(stats, Array2::zeros((4, 3))).is_err());
    }
}
