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
use std::borrow::Cow;
use geo::{BooleanOps, HasDimensions, MultiPolygon, Validation};
use log::debug;

/// Returns the geometry unchanged when valid, otherwise the repaired multipolygon.
///
/// Each member polygon is repaired on its own with a union against an empty
/// multipolygon: the overlay splits edges at their self intersections and rebuilds
/// valid rings.  The repaired members are then unioned together, so parts that
/// overlap each other are merged instead of cancelling out.  Collapsed parts
/// (spikes, zero area rings) disappear, so the result may be empty.
pub fn fix_geometry(geom: &MultiPolygon<f64>) -> Cow<MultiPolygon<f64>> {

    if geom.is_valid() {
        return Cow::Borrowed(geom);
    }

    let empty = MultiPolygon::<f64>::new(vec![]);

    let repaired = geom.0.iter()
        .map(|polygon| MultiPolygon::new(vec![polygon.clone()]).union(&empty))
        .fold(MultiPolygon::<f64>::new(vec![]), |acc, part| {
            if acc.is_empty() {
                part
            } else if part.is_empty() {
                acc
            } else {
                acc.union(&part)
            }
        });

    debug!("Repaired invalid geometry with {} polygons into {} polygons, empty: {}",
        geom.0.len(), repaired.0.len(), repaired.is_empty());

    Cow::Owned(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use geo::{polygon, Area, Contains, Point};

    #[test]
    fn test_valid_is_borrowed() {
        let mp = MultiPolygon::new(vec![polygon![
            (x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.), (x: 0., y: 2.), (x: 0., y: 0.),
        ]]);

        assert!(matches!(fix_geometry(&mp), Cow::Borrowed(_)));
    }

    #[test]
    fn test_bow_tie_is_repaired() {
        //edges (0,0)-(2,2) and (2,0)-(0,4) cross at (4/3, 4/3)
        let mp = MultiPolygon::new(vec![polygon![
            (x: 0., y: 0.), (x: 2., y: 2.), (x: 2., y: 0.), (x: 0., y: 4.), (x: 0., y: 0.),
        ]]);

        assert!(!mp.is_valid());
        //the lobes have opposite orientation and partly cancel
        assert!(approx_eq!(f64, mp.unsigned_area(), 2., epsilon = 1e-12));

        let fixed = fix_geometry(&mp);

        assert!(matches!(fixed, Cow::Owned(_)));
        //both lobes kept, none cancelled
        assert!(approx_eq!(f64, fixed.unsigned_area(), 8. / 3. + 2. / 3., epsilon = 1e-6));
    }

    #[test]
    fn test_overlapping_parts_are_merged() {
        //two 2 x 2 squares sharing the unit square (1,1) - (2,2)
        let mp = MultiPolygon::new(vec![
            polygon![(x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.), (x: 0., y: 2.), (x: 0., y: 0.)],
            polygon![(x: 1., y: 1.), (x: 3., y: 1.), (x: 3., y: 3.), (x: 1., y: 3.), (x: 1., y: 1.)],
        ]);

        assert!(!mp.is_valid());

        let fixed = fix_geometry(&mp);

        assert!(approx_eq!(f64, fixed.unsigned_area(), 7., epsilon = 1e-9));
        assert!(fixed.contains(&Point::new(1.5, 1.5)));
        assert!(fixed.contains(&Point::new(0.5, 0.5)));
        assert!(fixed.contains(&Point::new(2.5, 2.5)));
    }

    #[test]
    fn test_overlapping_bow_tie_parts() {
        let bow_tie = polygon![
            (x: 0., y: 0.), (x: 2., y: 2.), (x: 2., y: 0.), (x: 0., y: 4.), (x: 0., y: 0.),
        ];
        //covers the whole bow tie and more
        let cover = polygon![
            (x: -1., y: -1.), (x: 3., y: -1.), (x: 3., y: 5.), (x: -1., y: 5.), (x: -1., y: -1.),
        ];

        let input = MultiPolygon::new(vec![bow_tie, cover]);
        let fixed = fix_geometry(&input);

        assert!(approx_eq!(f64, fixed.unsigned_area(), 24., epsilon = 1e-9));
    }
}
