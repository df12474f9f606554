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
use anyhow::Result;
use ndarray::Array2;

mod raster_stats;
mod window;
mod burn_polygon;
mod memory_raster;
#[cfg(feature = "gdal")]
mod gdal_raster;
#[cfg(feature = "gdal")]
mod test_util;

pub use raster_stats::*;
pub use window::*;
pub use burn_polygon::*;
pub use memory_raster::*;
#[cfg(feature = "gdal")]
pub use gdal_raster::*;
#[cfg(feature = "gdal")]
pub use test_util::*;

/// A single band categorical raster
pub trait RasterSource {
    fn stats(&self) -> &RasterStats;

    /// Band 1 restricted to the window, shape is (height, width)
    fn read_window(&self, window: &PixelWindow) -> Result<Array2<i32>>;
}

impl<T: RasterSource + ?Sized> RasterSource for Arc<T> {
    fn stats(&self) -> &RasterStats {
        (**self).stats()
    }

    fn read_window(&self, window: &PixelWindow) -> Result<Array2<i32>> {
        (**self).read_window(window)
    }
}

/// Hands out independent read handles, one per unit of work.
/// The handle is closed when the returned box is dropped.
pub trait RasterOpener: Send + Sync {
    fn open(&self) -> Result<Box<dyn RasterSource>>;
}
