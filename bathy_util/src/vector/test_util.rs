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
use std::fs::create_dir_all;
use std::path::PathBuf;
use anyhow::Result;
use gdal::DriverManager;
use gdal::vector::{FieldValue, Geometry, LayerAccess, LayerOptions, OGRFieldType, OGRwkbGeometryType};
use uuid::Uuid;

pub fn get_temp_filename(file_name: &str) -> PathBuf {
    std::env::temp_dir()
        .join("bathy_util")
        .join(Uuid::new_v4().to_string())
        .join(file_name)
}

/// GeoPackage with one polygon layer and a text osm_id column (None is a null field)
pub fn create_test_layer(file_name: &str, features: &[(&str, Option<&str>)]) -> Result<PathBuf> {
    let path = get_temp_filename(file_name);

    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let driver = DriverManager::get_driver_by_name("GPKG")?;
    let mut dataset = driver.create_vector_only(&path)?;

    let mut layer = dataset.create_layer(LayerOptions {
        name: "water",
        ty: OGRwkbGeometryType::wkbPolygon,
        ..Default::default()
    })?;

    layer.create_defn_fields(&[("osm_id", OGRFieldType::OFTString)])?;

    for (wkt, osm_id) in features.iter() {
        let geom = Geometry::from_wkt(wkt)?;
        match osm_id {
            Some(id) => layer.create_feature_fields(geom, &["osm_id"], &[FieldValue::StringValue(id.to_string())])?,
            None => layer.create_feature(geom)?,
        }
    }

    Ok(path)
}
