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
use geo::{Geometry, MultiPolygon};
use crate::vector::to_multi_polygon;

/// Identifier column as read from the vector source, before any coercion
#[derive(Debug, Clone, PartialEq)]
pub enum RawId {
    Missing,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl RawId {
    /// Integer coercion; reals are truncated, text must hold an integer
    pub fn to_i64(&self) -> Option<i64> {
        match self {
            RawId::Missing => None,
            RawId::Integer(i) => Some(*i),
            RawId::Real(r) => {
                if !r.is_finite() || r.trunc() < i64::MIN as f64 || r.trunc() >= i64::MAX as f64 {
                    None
                } else {
                    Some(r.trunc() as i64)
                }
            }
            RawId::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }
}

/// How a polygon will be named in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordId {
    /// Validated osm_id
    External(i64),
    /// Position of the feature in the source layer
    Index(u64),
}

impl RecordId {
    pub fn value(&self) -> i64 {
        match self {
            RecordId::External(id) => *id,
            RecordId::Index(idx) => *idx as i64,
        }
    }
}

/// What to do with features that have no osm_id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Features without a usable osm_id are never written
    #[default]
    Require,
    /// A missing osm_id is replaced by the feature position; an unparseable one is still dropped
    IndexFallback,
}

impl IdPolicy {
    pub fn resolve(&self, raw: &RawId, index: u64) -> Option<RecordId> {
        match (raw, self) {
            (RawId::Missing, IdPolicy::IndexFallback) => Some(RecordId::Index(index)),
            (RawId::Missing, IdPolicy::Require) => None,
            (raw, _) => raw.to_i64().map(RecordId::External),
        }
    }
}

/// One water polygon, immutable once read
#[derive(Debug, Clone)]
pub struct PolygonRecord {
    /// Position in the source layer
    pub index: u64,
    /// None when the feature can never be written out
    pub id: Option<RecordId>,
    pub geometry: Option<MultiPolygon<f64>>,
}

impl PolygonRecord {
    pub fn new(index: u64, raw_id: &RawId, geometry: Option<Geometry<f64>>, id_policy: IdPolicy) -> Self {
        PolygonRecord {
            index,
            id: id_policy.resolve(raw_id, index),
            geometry: geometry.and_then(to_multi_polygon),
        }
    }
}
