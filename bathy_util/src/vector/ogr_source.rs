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
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use gdal::Dataset;
use gdal::vector::{FieldValue, LayerAccess};
use log::{debug, warn};
use crate::vector::{IdPolicy, PolygonRecord, RawId, VectorSource};

/// First layer of an OGR dataset (GPKG, FlatGeobuf, shapefile, ...)
pub struct OgrVectorSource {
    pub path: PathBuf,
    pub id_field: String,
}

impl OgrVectorSource {
    pub fn new(path: &Path, id_field: &str) -> Self {
        OgrVectorSource {
            path: path.to_path_buf(),
            id_field: id_field.to_string(),
        }
    }

    fn open(&self) -> Result<Dataset> {
        Dataset::open(&self.path).with_context(|| format!("Unable to open vector dataset {:?}", self.path))
    }
}

fn field_to_raw_id(value: Option<FieldValue>) -> RawId {
    match value {
        None => RawId::Missing,
        Some(FieldValue::IntegerValue(i)) => RawId::Integer(i as i64),
        Some(FieldValue::Integer64Value(i)) => RawId::Integer(i),
        Some(FieldValue::RealValue(r)) => RawId::Real(r),
        Some(FieldValue::StringValue(s)) => RawId::Text(s),
        //lists and dates are never an id
        Some(_) => RawId::Text(String::new()),
    }
}

impl VectorSource for OgrVectorSource {

    fn feature_count(&self) -> Result<usize> {
        let dataset = self.open()?;
        let layer = dataset.layer(0)?;

        Ok(layer.feature_count() as usize)
    }

    fn read_range(&self, start: usize, len: usize, id_policy: IdPolicy) -> Result<Vec<PolygonRecord>> {
        let dataset = self.open()?;
        let mut layer = dataset.layer(0)?;

        let has_id_field = layer.defn().fields().any(|f| f.name() == self.id_field);
        if !has_id_field {
            debug!("Layer {} has no {} column", layer.name(), self.id_field);
        }

        let mut records = Vec::with_capacity(len);

        for (offset, feature) in layer.features().skip(start).take(len).enumerate() {
            let index = (start + offset) as u64;

            let raw_id = if has_id_field {
                field_to_raw_id(feature.field(&self.id_field)?)
            } else {
                RawId::Missing
            };

            let geometry = match feature.geometry() {
                Some(g) => match g.to_geo() {
                    Ok(g) => Some(g),
                    Err(e) => {
                        warn!("Feature {} in {:?} has an unreadable geometry: {}", index, self.path, e);
                        None
                    }
                },
                None => None,
            };

            records.push(PolygonRecord::new(index, &raw_id, geometry, id_policy));
        }

        debug!("Read {} features starting at {} from {:?}", records.len(), start, self.path);

        Ok(records)
    }
}
