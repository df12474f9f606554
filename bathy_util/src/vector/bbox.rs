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
use geo::{BoundingRect, MultiPolygon};

/// Axis aligned box in source coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}) - ({}, {})", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        ensure!(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite(),
            "Bounding box values must be finite");
        ensure!(min_x <= max_x && min_y <= max_y,
            "Bounding box min must not be greater than max: {} {} {} {}", min_x, min_y, max_x, max_y);

        Ok(BoundingBox { min_x, min_y, max_x, max_y })
    }

    /// minx, miny, maxx, maxy as given on the command line
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        ensure!(values.len() == 4, "Bounding box needs 4 values (minx miny maxx maxy), got {}", values.len());
        BoundingBox::new(values[0], values[1], values[2], values[3])
    }

    pub fn of(geom: &MultiPolygon<f64>) -> Option<Self> {
        geom.bounding_rect().map(|r| BoundingBox {
            min_x: r.min().x,
            min_y: r.min().y,
            max_x: r.max().x,
            max_y: r.max().y,
        })
    }

    /// Touching edges count as overlap
    pub fn overlaps(&self, rhs: &BoundingBox) -> bool {
        !(self.min_x > rhs.max_x || self.max_x < rhs.min_x ||
            self.min_y > rhs.max_y || self.max_y < rhs.min_y)
    }

    /// Only meaningful when the boxes overlap
    pub fn clamp_to(&self, rhs: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.max(rhs.min_x),
            min_y: self.min_y.max(rhs.min_y),
            max_x: self.max_x.min(rhs.max_x),
            max_y: self.max_y.min(rhs.max_y),
        }
    }
}
