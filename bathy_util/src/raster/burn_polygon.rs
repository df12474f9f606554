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
use geo::{LineString, MultiPolygon};
use ndarray::Array2;
use crate::raster::RasterStats;

/// Burns the geometry into a (num_rows, num_cols) mask of the grid.
///
/// A pixel is true when its center is inside the geometry, the same as
/// gdal_rasterize without -at.  Works in pixel space: every ring edge is
/// transformed with the grid's inverse transform and each row is filled with
/// even-odd scanline crossings at the row center.  A center exactly on a left
/// edge is inside, on a right edge outside.
///
/// The geometry must be valid, overlapping polygons would cancel each other.
pub fn burn_polygon_mask(geom: &MultiPolygon<f64>, stats: &RasterStats) -> Array2<bool> {
    let num_rows = stats.num_rows as usize;
    let num_cols = stats.num_cols as usize;

    let mut mask = Array2::from_elem((num_rows, num_cols), false);

    if num_rows == 0 || num_cols == 0 {
        return mask;
    }

    let mut edges: Vec<[f64; 4]> = Vec::new();
    for polygon in geom.0.iter() {
        add_ring_edges(polygon.exterior(), stats, &mut edges);
        for interior in polygon.interiors() {
            add_ring_edges(interior, stats, &mut edges);
        }
    }

    let mut crossings: Vec<f64> = Vec::new();

    for row in 0..num_rows {
        let center_y = row as f64 + 0.5;

        crossings.clear();
        for &[x0, y0, x1, y1] in edges.iter() {
            //half open so a vertex on the scanline is counted once and flat edges never
            if (y0 <= center_y) != (y1 <= center_y) {
                crossings.push(x0 + (center_y - y0) * (x1 - x0) / (y1 - y0));
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));

        for pair in crossings.chunks_exact(2) {
            //columns whose center col + 0.5 lies in [pair[0], pair[1])
            let start = (pair[0] - 0.5).ceil().max(0.0);
            let stop = (pair[1] - 0.5).ceil().min(num_cols as f64);

            if start >= stop {
                continue;
            }

            for col in start as usize..stop as usize {
                mask[[row, col]] = true;
            }
        }
    }

    mask
}

fn add_ring_edges(ring: &LineString<f64>, stats: &RasterStats, edges: &mut Vec<[f64; 4]>) {
    for line in ring.lines() {
        edges.push([
            stats.calc_x_frac(line.start.x),
            stats.calc_y_frac(line.start.y),
            stats.calc_x_frac(line.end.x),
            stats.calc_y_frac(line.end.y),
        ]);
    }
}
