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
use std::fs::create_dir_all;
use std::path::PathBuf;
use anyhow::{ensure, Result};
use gdal::DriverManager;
use gdal::raster::Buffer;
use crate::raster::RasterStats;
use crate::vector::get_temp_filename;

/// Single band Int32 GeoTIFF, data in row major order
pub fn create_test_raster(file_name: &str, stats: &RasterStats, data: &[i32]) -> Result<PathBuf> {
    let num_cols = stats.num_cols as usize;
    let num_rows = stats.num_rows as usize;

    ensure!(data.len() == num_cols * num_rows, "Expected {} values, got {}", num_cols * num_rows, data.len());

    let path = get_temp_filename(file_name);
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let mut dataset = driver.create_with_band_type::<i32, _>(&path, num_cols as _, num_rows as _, 1)?;
    dataset.set_geo_transform(&stats.geo_transform())?;

    let mut band = dataset.rasterband(1)?;
    band.write((0, 0), (num_cols, num_rows), &Buffer::new((num_cols, num_rows), data.to_vec()))?;

    Ok(path)
}
