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
use geo::{Area, Geometry, MultiPolygon};

/// Planar area in source units (degrees² for lat/lon data)
pub fn planar_area(polygon: &MultiPolygon<f64>) -> f64 {
    polygon.unsigned_area()
}

/// Keeps the polygonal part of a geometry, anything else means there is no usable geometry
pub fn to_multi_polygon(geom: Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geom {
        Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
        Geometry::MultiPolygon(mp) => Some(mp),
        Geometry::Rect(r) => Some(MultiPolygon::new(vec![r.to_polygon()])),
        Geometry::GeometryCollection(gc) => {
            let polygons: Vec<_> = gc.0.into_iter()
                .filter_map(to_multi_polygon)
                .flat_map(|mp| mp.0.into_iter())
                .collect();

            if polygons.is_empty() {
                None
            } else {
                Some(MultiPolygon::new(polygons))
            }
        }
        _ => None,
    }
}
