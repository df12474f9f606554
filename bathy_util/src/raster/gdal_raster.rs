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
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use gdal::Dataset;
use log::debug;
use ndarray::Array2;
use crate::raster::{PixelWindow, RasterOpener, RasterSource, RasterStats};

/// Read only raster file, closed on drop
pub struct GdalRaster {
    pub path: PathBuf,
    stats: RasterStats,
    dataset: Dataset,
}

impl GdalRaster {
    pub fn open(path: &Path) -> Result<Self> {
        let dataset = Dataset::open(path)
            .with_context(|| format!("Unable to open raster {:?}", path))?;

        let geo_transform = dataset.geo_transform()?;
        let (num_cols, num_rows) = dataset.raster_size();

        let stats = RasterStats::from_geo_transform(
            &geo_transform, num_cols as u32, num_rows as u32, dataset.projection())?;

        debug!("Opened raster {:?} with {} x {} pixels", path, num_cols, num_rows);

        Ok(GdalRaster {
            path: path.to_path_buf(),
            stats,
            dataset,
        })
    }
}

impl RasterSource for GdalRaster {
    fn stats(&self) -> &RasterStats {
        &self.stats
    }

    fn read_window(&self, window: &PixelWindow) -> Result<Array2<i32>> {
        let band = self.dataset.rasterband(1)?;

        let window_size = (window.width, window.height);
        let buffer = band.read_as::<i32>(
            (window.col_off as isize, window.row_off as isize),
            window_size,
            window_size,
            None,
        ).with_context(|| format!("Unable to read {} from {:?}", window, self.path))?;

        Ok(Array2::from_shape_vec((window.height, window.width), buffer.data)?)
    }
}

pub struct GdalRasterOpener {
    pub path: PathBuf,
}

impl GdalRasterOpener {
    pub fn new(path: &Path) -> Self {
        GdalRasterOpener { path: path.to_path_buf() }
    }
}

impl RasterOpener for GdalRasterOpener {
    fn open(&self) -> Result<Box<dyn RasterSource>> {
        Ok(Box::new(GdalRaster::open(&self.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::create_test_raster;
    use ndarray::arr2;

    #[test]
    fn test_read_window() {
        let stats = RasterStats::from_geo_transform(&[10., 0.5, 0., 20., 0., -0.5], 3, 2, "".to_string()).unwrap();
        let path = create_test_raster("tid.tif", &stats, &[
            0, 1, 2,
            3, 0, 40,
        ]).unwrap();

        let raster = GdalRasterOpener::new(&path).open().unwrap();

        assert_eq!(raster.stats().num_cols, 3);
        assert_eq!(raster.stats().origin_x, 10.);
        assert_eq!(raster.stats().pixel_height, -0.5);

        let w = raster.read_window(&PixelWindow { col_off: 1, row_off: 0, width: 2, height: 2 }).unwrap();
        assert_eq!(w, arr2(&[[1, 2], [0, 40]]));
    }
}
