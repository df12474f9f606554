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
use anyhow::{ensure, Result};
use geo::Geometry;
use crate::vector::{BoundingBox, IdPolicy, PolygonRecord, RawId};

/// Read access to a layer of water polygons.
///
/// Implementations open their own handle on every call, so a worker can read its
/// row range without sharing anything with the other workers.
pub trait VectorSource: Send + Sync {

    /// Number of features, without reading the geometries
    fn feature_count(&self) -> Result<usize>;

    /// Features [start, start + len), indexes are positions in the whole layer
    fn read_range(&self, start: usize, len: usize, id_policy: IdPolicy) -> Result<Vec<PolygonRecord>>;

    fn read_all(&self, id_policy: IdPolicy) -> Result<Vec<PolygonRecord>> {
        let count = self.feature_count()?;
        self.read_range(0, count, id_policy)
    }
}

/// Keeps records whose bounding box overlaps the box, touching counts.  The geometry
/// itself may miss the box.  No box keeps everything.
pub fn filter_by_bbox(records: Vec<PolygonRecord>, bbox: Option<&BoundingBox>) -> Vec<PolygonRecord> {
    let bbox = match bbox {
        Some(b) => b,
        None => return records,
    };

    records.into_iter().filter(|r| {
        r.geometry.as_ref()
            .and_then(BoundingBox::of)
            .map_or(false, |gb| gb.overlaps(bbox))
    }).collect()
}

#[derive(Debug, Clone)]
pub struct MemoryFeature {
    pub geometry: Option<Geometry<f64>>,
    pub osm_id: RawId,
}

impl MemoryFeature {
    pub fn new<G: Into<Geometry<f64>>>(geometry: G, osm_id: RawId) -> Self {
        MemoryFeature {
            geometry: Some(geometry.into()),
            osm_id,
        }
    }
}

/// Features already in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryVectorSource {
    pub features: Vec<MemoryFeature>,
}

impl MemoryVectorSource {
    pub fn new(features: Vec<MemoryFeature>) -> Self {
        MemoryVectorSource { features }
    }
}

impl VectorSource for MemoryVectorSource {
    fn feature_count(&self) -> Result<usize> {
        Ok(self.features.len())
    }

    fn read_range(&self, start: usize, len: usize, id_policy: IdPolicy) -> Result<Vec<PolygonRecord>> {
        ensure!(start <= self.features.len(), "Start {} past the {} features", start, self.features.len());

        let stop = (start + len).min(self.features.len());

        Ok(self.features[start..stop].iter().enumerate().map(|(offset, f)| {
            PolygonRecord::new((start + offset) as u64, &f.osm_id, f.geometry.clone(), id_policy)
        }).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon, Polygon};
    use itertools::Itertools;

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y), (x: x + size, y: y), (x: x + size, y: y + size), (x: x, y: y + size), (x: x, y: y),
        ]
    }

    fn source() -> MemoryVectorSource {
        MemoryVectorSource::new((0..10).map(|i| {
            MemoryFeature::new(square(i as f64 * 10., 0., 1.), RawId::Integer(100 + i))
        }).collect())
    }

    #[test]
    fn test_read_range() {
        let src = source();

        assert_eq!(src.feature_count().unwrap(), 10);

        let r = src.read_range(3, 4, IdPolicy::Require).unwrap();
        assert_eq!(r.iter().map(|r| r.index).collect_vec(), vec![3, 4, 5, 6]);
        assert_eq!(r[0].id.unwrap().value(), 103);

        //past the end is cut
        let r = src.read_range(8, 5, IdPolicy::Require).unwrap();
        assert_eq!(r.len(), 2);

        assert!(src.read_range(11, 5, IdPolicy::Require).is_err());
        assert_eq!(src.read_all(IdPolicy::Require).unwrap().len(), 10);
    }

    #[test]
    fn test_filter_by_bbox() {
        let mut src = source();
        src.features.push(MemoryFeature { geometry: None, osm_id: RawId::Integer(1) });
        src.features.push(MemoryFeature::new(point!(x: 25., y: 0.5), RawId::Integer(2)));

        let all = src.read_all(IdPolicy::Require).unwrap();
        assert_eq!(filter_by_bbox(all.clone(), None).len(), 12);

        //squares at x=20 and x=30 are partly inside, x=40 is outside
        let bbox = BoundingBox::new(20.5, -5., 30.5, 0.5).unwrap();
        let kept = filter_by_bbox(all, Some(&bbox));

        assert_eq!(kept.iter().map(|r| r.index).collect_vec(), vec![2, 3]);
    }

    #[test]
    fn test_filter_uses_bounding_boxes() {
        //L shape, its bounding box is (0,0) - (10,10) but the top right is empty
        let l_shape = polygon![
            (x: 0., y: 0.), (x: 10., y: 0.), (x: 10., y: 2.), (x: 2., y: 2.), (x: 2., y: 10.), (x: 0., y: 10.), (x: 0., y: 0.),
        ];
        let src = MemoryVectorSource::new(vec![
            MemoryFeature::new(l_shape, RawId::Integer(7)),
            MemoryFeature::new(square(11., 11., 1.), RawId::Integer(8)),
        ]);

        let all = src.read_all(IdPolicy::Require).unwrap();
        let bbox = BoundingBox::new(8., 8., 9., 9.).unwrap();

        let kept = filter_by_bbox(all, Some(&bbox));
        assert_eq!(kept.iter().map(|r| r.index).collect_vec(), vec![0]);
    }
}
