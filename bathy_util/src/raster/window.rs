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

/// Pixel space window with fractional edges, as computed from coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatWindow {
    pub col_off: f64,
    pub row_off: f64,
    pub width: f64,
    pub height: f64,
}

/// Window of whole pixels, always inside the raster it was computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for PixelWindow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cols {}..{} rows {}..{}",
               self.col_off, self.col_off + self.width,
               self.row_off, self.row_off + self.height)
    }
}
