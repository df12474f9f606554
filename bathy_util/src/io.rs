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
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use anyhow::{Context, Result};
use log::debug;

/// Writes one id per line, in the order given
pub fn write_id_list(path: &Path, ids: &[i64]) -> Result<()> {

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            create_dir_all(parent)
                .with_context(|| format!("Unable to create output directory {:?}", parent))?;
        }
    }

    let f = File::create(path).with_context(|| format!("Unable to create {:?}", path))?;
    let mut f = BufWriter::new(f);

    for id in ids.iter() {
        writeln!(f, "{}", id)?;
    }

    f.flush()?;

    debug!("Wrote {} ids to {:?}", ids.len(), path);

    Ok(())
}
