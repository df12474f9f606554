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
use core::fmt;
use anyhow::{ensure, Result};
use crate::raster::{FloatWindow, PixelWindow};
use crate::vector::BoundingBox;

/// Helper struct to hold the grid of a north up raster
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterStats {
    pub origin_y: f64,
    pub origin_x: f64,
    pub pixel_height: f64,
    pub pixel_width: f64,
    pub num_rows: u32,
    pub num_cols: u32,

    //WKT projection string
    pub projection: String
}

impl fmt::Display for RasterStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {

        write!(f, "Origin X,Y: {}, {}\nRight/Bottom: {},{}\nPixel Width/Height: {},{}\nRows: {} Cols: {}\nProjection: {}",
               self.origin_x,
               self.origin_y,
               self.right_x_coord(),
               self.bottom_y_coord(),
               self.pixel_width,
               self.pixel_height,
               self.num_rows,
               self.num_cols,
               &self.projection
        )
    }
}

impl RasterStats {

    /// From a GDAL style geo transform, rotated grids are refused
    pub fn from_geo_transform(geo_transform: &[f64; 6], num_cols: u32, num_rows: u32, projection: String) -> Result<Self> {
        ensure!(geo_transform[2] == 0.0 && geo_transform[4] == 0.0,
            "Rotated rasters are not supported, geo transform {:?}", geo_transform);
        ensure!(geo_transform[1] != 0.0 && geo_transform[5] != 0.0,
            "Pixel size must not be 0, geo transform {:?}", geo_transform);

        Ok(RasterStats {
            origin_x: geo_transform[0],
            pixel_width: geo_transform[1],
            origin_y: geo_transform[3],
            pixel_height: geo_transform[5],
            num_cols,
            num_rows,
            projection,
        })
    }

    pub fn geo_transform(&self) -> [f64; 6] {
        [self.origin_x, self.pixel_width, 0.0, self.origin_y, 0.0, self.pixel_height]
    }

    pub fn calc_center(&self, raster_xy: (usize, usize)) -> [f64; 2] {
        [self.origin_x + self.pixel_width * (raster_xy.0 as f64 + 0.5),
         self.origin_y + self.pixel_height * (raster_xy.1 as f64 + 0.5)]
    }

    /// Calculates projected x coordinate of the left side of raster_x
    pub fn calc_x_coord(&self, raster_x: f64) -> f64 {
        self.origin_x + self.pixel_width * raster_x
    }
    pub fn right_x_coord(&self) -> f64 {
        self.calc_x_coord(self.num_cols as f64)
    }
    /// Calculates the top side
    /// Note pixel height is usually negative
    pub fn calc_y_coord(&self, raster_y: f64) -> f64 {
        self.origin_y + self.pixel_height * raster_y
    }
    pub fn bottom_y_coord(&self) -> f64 {
        self.calc_y_coord(self.num_rows as f64)
    }

    /// Projected coordinate to fractional raster_x, not floored
    pub fn calc_x_frac(&self, x_coord: f64) -> f64 {
        (x_coord - self.origin_x) / self.pixel_width
    }
    pub fn calc_y_frac(&self, y_coord: f64) -> f64 {
        (y_coord - self.origin_y) / self.pixel_height
    }

    pub fn bounds(&self) -> BoundingBox {
        let (left, right) = (self.origin_x, self.right_x_coord());
        let (top, bottom) = (self.origin_y, self.bottom_y_coord());

        BoundingBox {
            min_x: left.min(right),
            min_y: top.min(bottom),
            max_x: left.max(right),
            max_y: top.max(bottom),
        }
    }

    /// Fractional window covering the box, may extend past the raster
    pub fn window_from_bounds(&self, bbox: &BoundingBox) -> FloatWindow {
        let cols = [self.calc_x_frac(bbox.min_x), self.calc_x_frac(bbox.max_x)];
        let rows = [self.calc_y_frac(bbox.min_y), self.calc_y_frac(bbox.max_y)];

        let col_start = cols[0].min(cols[1]);
        let row_start = rows[0].min(rows[1]);

        FloatWindow {
            col_off: col_start,
            row_off: row_start,
            width: (cols[0].max(cols[1]) - col_start).max(0.0),
            height: (rows[0].max(rows[1]) - row_start).max(0.0),
        }
    }

    /// Whole pixel window: offsets truncated and floored at 0, sizes rounded half to even
    /// and cut at the raster edge.  None if nothing is left.
    pub fn clamp_window(&self, window: &FloatWindow) -> Option<PixelWindow> {
        let col_off = (window.col_off.trunc() as i64).max(0);
        let row_off = (window.row_off.trunc() as i64).max(0);

        let width = (window.width.round_ties_even() as i64).min(self.num_cols as i64 - col_off);
        let height = (window.height.round_ties_even() as i64).min(self.num_rows as i64 - row_off);

        if width <= 0 || height <= 0 {
            return None;
        }

        Some(PixelWindow {
            col_off: col_off as usize,
            row_off: row_off as usize,
            width: width as usize,
            height: height as usize,
        })
    }

    /// The grid of a window, with its own origin
    pub fn window_stats(&self, window: &PixelWindow) -> RasterStats {
        RasterStats {
            origin_x: self.calc_x_coord(window.col_off as f64),
            origin_y: self.calc_y_coord(window.row_off as f64),
            pixel_width: self.pixel_width,
            pixel_height: self.pixel_height,
            num_cols: window.width as u32,
            num_rows: window.height as u32,
            projection: self.projection.clone(),
        }
    }
}
