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
//! Decides, for one water polygon, whether the TID pixels under it are mostly
//! measured soundings (non zero) rather than interpolated cells (zero).

use core::fmt;
use anyhow::{ensure, Result};
use geo::{HasDimensions, MultiPolygon};
use log::debug;
use ndarray::Zip;
use crate::raster::{burn_polygon_mask, RasterSource};
use crate::vector::{fix_geometry, planar_area, BoundingBox};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    NoGeometry,
    Empty,
    BelowMinArea,
    EmptyAfterRepair,
    OutsideRaster,
    /// Clamped bounding box rounded to no pixels
    EmptyWindow,
    /// No pixel center falls in the geometry
    NoPixels,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Qualifies { ratio: f64, num_pixels: usize },
    NotQualifying { ratio: f64, num_pixels: usize },
    Skipped(SkipReason),
}

impl Decision {
    pub fn qualifies(&self) -> bool {
        matches!(self, Decision::Qualifies { .. })
    }

    /// False when the geometry was dropped by the area or repair checks,
    /// before the raster was looked at
    pub fn passed_shape_checks(&self) -> bool {
        !matches!(self, Decision::Skipped(
            SkipReason::NoGeometry | SkipReason::Empty | SkipReason::BelowMinArea | SkipReason::EmptyAfterRepair))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Decision::Qualifies { ratio, num_pixels } =>
                write!(f, "qualifies with {:.4} of {} pixels", ratio, num_pixels),
            Decision::NotQualifying { ratio, num_pixels } =>
                write!(f, "does not qualify with {:.4} of {} pixels", ratio, num_pixels),
            Decision::Skipped(reason) => write!(f, "skipped ({:?})", reason),
        }
    }
}

/// Classifies one geometry against the raster.
///
/// Geometries that are empty, smaller than `min_area`, outside the raster or
/// covering no pixel center are skipped.  Invalid geometries are repaired before
/// being burnt.  Qualifies when the share of non zero pixels under the geometry
/// is at least `threshold`.
pub fn classify(
    geometry: Option<&MultiPolygon<f64>>,
    raster: &dyn RasterSource,
    threshold: f64,
    min_area: f64,
) -> Result<Decision> {

    let geom = match geometry {
        Some(g) => g,
        None => return Ok(Decision::Skipped(SkipReason::NoGeometry)),
    };

    if geom.is_empty() {
        return Ok(Decision::Skipped(SkipReason::Empty));
    }

    if planar_area(geom) < min_area {
        return Ok(Decision::Skipped(SkipReason::BelowMinArea));
    }

    let geom = fix_geometry(geom);

    let geom_bounds = match BoundingBox::of(&geom) {
        Some(b) if !geom.is_empty() => b,
        _ => return Ok(Decision::Skipped(SkipReason::EmptyAfterRepair)),
    };

    let stats = raster.stats();
    let raster_bounds = stats.bounds();

    if !geom_bounds.overlaps(&raster_bounds) {
        return Ok(Decision::Skipped(SkipReason::OutsideRaster));
    }

    let clamped = geom_bounds.clamp_to(&raster_bounds);

    let window = match stats.clamp_window(&stats.window_from_bounds(&clamped)) {
        Some(w) => w,
        None => return Ok(Decision::Skipped(SkipReason::EmptyWindow)),
    };

    let mask = burn_polygon_mask(&geom, &stats.window_stats(&window));
    let data = raster.read_window(&window)?;

    ensure!(mask.dim() == data.dim(),
        "Raster returned {:?} pixels for window {}, expected {:?}", data.dim(), window, mask.dim());

    let (num_pixels, num_non_zero) = Zip::from(&mask).and(&data).fold(
        (0usize, 0usize),
        |(total, non_zero), &inside, &value| {
            if inside {
                (total + 1, non_zero + (value != 0) as usize)
            } else {
                (total, non_zero)
            }
        });

    if num_pixels == 0 {
        return Ok(Decision::Skipped(SkipReason::NoPixels));
    }

    let ratio = num_non_zero as f64 / num_pixels as f64;

    debug!("Window {}: {} of {} pixels non zero", window, num_non_zero, num_pixels);

    if ratio >= threshold {
        Ok(Decision::Qualifies { ratio, num_pixels })
    } else {
        Ok(Decision::NotQualifying { ratio, num_pixels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use float_cmp::approx_eq;
    use geo::{polygon, Polygon};
    use ndarray::Array2;
    use crate::raster::{MemoryRaster, PixelWindow, RasterStats};

    const MIN_AREA: f64 = 0.00005;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1), (x: x0, y: y0),
        ]])
    }

    /// 10 x 10 grid of 1 unit pixels covering (0,0) - (10,10)
    fn raster_with(non_zero: &[(usize, usize)]) -> MemoryRaster {
        let stats = RasterStats::from_geo_transform(&[0., 1., 0., 10., 0., -1.], 10, 10, "".to_string()).unwrap();
        let mut data = Array2::zeros((10, 10));
        for &(row, col) in non_zero {
            data[[row, col]] = 3;
        }
        MemoryRaster::new(stats, data).unwrap()
    }

    #[test]
    fn test_three_of_hundred() {
        let raster = raster_with(&[(0, 0), (4, 7), (9, 9)]);
        let square = rect(0., 0., 10., 10.);

        let d = classify(Some(&square), &raster, 0.2, MIN_AREA).unwrap();
        match d {
            Decision::NotQualifying { ratio, num_pixels } => {
                assert!(approx_eq!(f64, ratio, 0.03, epsilon = 1e-12));
                assert_eq!(num_pixels, 100);
            }
            _ => panic!("Expected not qualifying, got {}", d),
        }

        let d = classify(Some(&square), &raster, 0.02, MIN_AREA).unwrap();
        assert!(d.qualifies());
    }

    #[test]
    fn test_threshold_bounds() {
        let one = raster_with(&[(5, 5)]);
        let square = rect(0., 0., 10., 10.);

        assert!(classify(Some(&square), &one, 0.0, MIN_AREA).unwrap().qualifies());
        assert!(!classify(Some(&square), &one, 1.0, MIN_AREA).unwrap().qualifies());

        let all: Vec<_> = (0..10).flat_map(|r| (0..10).map(move |c| (r, c))).collect();
        let full = raster_with(&all);
        assert!(classify(Some(&square), &full, 1.0, MIN_AREA).unwrap().qualifies());

        //one zero pixel is enough to fail at 1
        let almost: Vec<_> = all.iter().cloned().filter(|rc| *rc != (2, 2)).collect();
        let almost = raster_with(&almost);
        assert!(!classify(Some(&square), &almost, 1.0, MIN_AREA).unwrap().qualifies());
    }

    #[test]
    fn test_only_pixels_under_the_polygon_count() {
        //non zero pixels are in the top left corner, the polygon sits bottom right
        let raster = raster_with(&[(0, 0), (0, 1), (1, 0), (1, 1)]);

        let d = classify(Some(&rect(5., 0., 10., 5.)), &raster, 0.0001, MIN_AREA).unwrap();
        assert!(matches!(d, Decision::NotQualifying { num_pixels: 25, .. }), "{}", d);

        //a triangle over the corner: only centers inside the triangle are read
        let triangle = MultiPolygon::new(vec![polygon![
            (x: 0., y: 10.), (x: 2.2, y: 10.), (x: 0., y: 7.8), (x: 0., y: 10.),
        ]]);
        let d = classify(Some(&triangle), &raster, 1.0, MIN_AREA).unwrap();
        assert!(matches!(d, Decision::Qualifies { num_pixels: 3, .. }), "{}", d);
    }

    #[test]
    fn test_outside_raster() {
        let all: Vec<_> = (0..10).flat_map(|r| (0..10).map(move |c| (r, c))).collect();
        let raster = raster_with(&all);

        for square in [rect(20., 20., 30., 30.), rect(-5., 2., -1., 3.), rect(2., -3., 3., -0.5), rect(2., 10.5, 3., 11.)] {
            assert_eq!(classify(Some(&square), &raster, 0.0, MIN_AREA).unwrap(),
                       Decision::Skipped(SkipReason::OutsideRaster));
        }
    }

    #[test]
    fn test_min_area() {
        let all: Vec<_> = (0..10).flat_map(|r| (0..10).map(move |c| (r, c))).collect();
        let raster = raster_with(&all);

        let small = rect(2., 2., 2.005, 2.005);
        let d = classify(Some(&small), &raster, 0.0, MIN_AREA).unwrap();
        assert_eq!(d, Decision::Skipped(SkipReason::BelowMinArea));
        assert!(!d.passed_shape_checks());

        //outside the raster, but only after the shape checks
        assert!(Decision::Skipped(SkipReason::OutsideRaster).passed_shape_checks());
        assert!(Decision::NotQualifying { ratio: 0.1, num_pixels: 10 }.passed_shape_checks());

        assert_eq!(classify(Some(&rect(2., 2., 4., 4.)), &raster, 0.0, 4.5).unwrap(),
                   Decision::Skipped(SkipReason::BelowMinArea));
    }

    #[test]
    fn test_degenerate_inputs() {
        let raster = raster_with(&[]);

        assert_eq!(classify(None, &raster, 0.2, MIN_AREA).unwrap(),
                   Decision::Skipped(SkipReason::NoGeometry));
        assert_eq!(classify(Some(&MultiPolygon::new(vec![])), &raster, 0.2, MIN_AREA).unwrap(),
                   Decision::Skipped(SkipReason::Empty));

        //a thin sliver on the raster edge rounds to a window of no pixels
        assert_eq!(classify(Some(&rect(9.8, 2., 10.5, 6.)), &raster, 0.2, 0.0).unwrap(),
                   Decision::Skipped(SkipReason::EmptyWindow));

        //window of one pixel, but the pixel center is not covered
        assert_eq!(classify(Some(&rect(3.6, 3.0, 4.2, 4.0)), &raster, 0.2, 0.0).unwrap(),
                   Decision::Skipped(SkipReason::NoPixels));
    }

    #[test]
    fn test_partly_outside_is_clamped() {
        let raster = raster_with(&[(9, 0), (9, 1)]);

        //bottom left corner, only 2 x 2 pixels are inside the raster
        let d = classify(Some(&rect(-3., -3., 2., 2.)), &raster, 0.5, MIN_AREA).unwrap();
        assert_eq!(d, Decision::Qualifies { ratio: 0.5, num_pixels: 4 });
    }

    #[test]
    fn test_invalid_geometry_is_repaired() {
        //grid of 0.5 pixels over (0,0) - (4,4), all measured
        let stats = RasterStats::from_geo_transform(&[0., 0.5, 0., 4., 0., -0.5], 8, 8, "".to_string()).unwrap();
        let raster = MemoryRaster::new(stats, Array2::from_elem((8, 8), 1)).unwrap();

        let bow_tie: Polygon<f64> = polygon![
            (x: 0., y: 0.), (x: 2., y: 2.), (x: 2., y: 0.), (x: 0., y: 4.), (x: 0., y: 0.),
        ];
        let bow_tie = MultiPolygon::new(vec![bow_tie]);

        let d = classify(Some(&bow_tie), &raster, 0.5, MIN_AREA).unwrap();
        assert!(d.qualifies(), "{}", d);
    }

    #[test]
    fn test_overlapping_parts_count_once() {
        //only the pixel under both squares is measured, its center is (1.5, 1.5)
        let raster = raster_with(&[(8, 1)]);

        let parts = MultiPolygon::new(vec![
            polygon![(x: 0., y: 0.), (x: 2., y: 0.), (x: 2., y: 2.), (x: 0., y: 2.), (x: 0., y: 0.)],
            polygon![(x: 1., y: 1.), (x: 3., y: 1.), (x: 3., y: 3.), (x: 1., y: 3.), (x: 1., y: 1.)],
        ]);

        let d = classify(Some(&parts), &raster, 0.1, MIN_AREA).unwrap();
        match d {
            Decision::Qualifies { ratio, num_pixels } => {
                assert_eq!(num_pixels, 7);
                assert!(approx_eq!(f64, ratio, 1. / 7., epsilon = 1e-12));
            }
            _ => panic!("Expected qualifies, got {}", d),
        }
    }

    struct FailingRaster(MemoryRaster);

    impl RasterSource for FailingRaster {
        fn stats(&self) -> &RasterStats {
            self.0.stats()
        }

        fn read_window(&self, window: &PixelWindow) -> Result<Array2<i32>> {
            bail!("Read error for {}", window)
        }
    }

    #[test]
    fn test_read_errors_are_returned() {
        let raster = FailingRaster(raster_with(&[]));

        assert!(classify(Some(&rect(1., 1., 3., 3.)), &raster, 0.2, MIN_AREA).is_err());
        //skipped before any read
        assert!(classify(Some(&rect(20., 20., 30., 30.)), &raster, 0.2, MIN_AREA).is_ok());
    }
}
