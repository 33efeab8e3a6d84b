// Copyright (C) 2017 Hove and/or its affiliates.
//
// This program is free software: you can redistribute it and/or modify it
// under the terms of the GNU Affero General Public License as published by the
// Free Software Foundation, version 3.

// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more
// details.

// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>
//! Read CSV tables through a [FileHandler](crate::file_handler::FileHandler)

use crate::{file_handler::FileHandler, Result};
use anyhow::{bail, Context};
use std::io::Read;
use tracing::{debug, info};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read a vector of objects from a file of a file_handler.
///
/// Many feeds are exported with a UTF-8 byte order mark, it is skipped so
/// the first column keeps its name.
pub fn read_objects<H, O>(
    file_handler: &mut H,
    file_name: &str,
    required_file: bool,
) -> Result<Vec<O>>
where
    for<'a> &'a mut H: FileHandler,
    O: for<'de> serde::Deserialize<'de>,
{
    let (reader, path) = file_handler.get_file_if_exists(file_name)?;
    let file_name = path.file_name();
    let basename = file_name.map_or(path.to_string_lossy(), |b| b.to_string_lossy());

    match (reader, required_file) {
        (None, false) => {
            info!("Skipping {}", basename);
            Ok(vec![])
        }
        (None, true) => {
            bail!("file {:?} not found", path)
        }
        (Some(mut reader), _) => {
            info!("Reading {}", basename);
            let mut content = Vec::new();
            reader
                .read_to_end(&mut content)
                .with_context(|| format!("Error reading {:?}", path))?;
            let content = match content.strip_prefix(UTF8_BOM) {
                Some(content) => {
                    debug!("Skipping the byte order mark of {}", basename);
                    content
                }
                None => &content[..],
            };
            let mut rdr = csv::ReaderBuilder::new()
                .flexible(true)
                .trim(csv::Trim::All)
                .from_reader(content);
            Ok(rdr
                .deserialize()
                .collect::<Result<_, _>>()
                .with_context(|| format!("Error reading {:?}", path))?)
        }
    }
}
