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

//! Read the routes, trips and stop times of a GTFS into the stop patterns of
//! the trips, resolved against the stops mapped in OSM.

mod read;

pub use read::UnresolvedStopError;

use crate::{
    file_handler::{PathFileHandler, ZipHandler},
    objects::{Route, Trip},
    report::Report,
    stops::StopIndex,
    Result,
};
use anyhow::{bail, Context};
use std::{fs::File, path::Path};
use tracing::info;
use typed_index_collection::CollectionWithId;

/// Routes and trips of a GTFS whose stops are all mapped
#[derive(Debug, Default)]
pub struct Schedule {
    /// Routes with a supported route type
    pub routes: CollectionWithId<Route>,
    /// Trips of known routes, with their resolved stops
    pub trips: CollectionWithId<Trip>,
}

/// Read a GTFS from a directory or a zip archive.
///
/// Trips that can't be resolved (unknown route, unknown stop, no stop times)
/// are skipped and recorded in `report`.
pub fn read<P: AsRef<Path>>(path: P, stops: &StopIndex, report: &mut Report) -> Result<Schedule> {
    let path = path.as_ref();
    let schedule = if path.is_file() {
        info!("Reading GTFS archive {:?}", path);
        let reader = File::open(path).with_context(|| format!("Error reading {:?}", path))?;
        let mut file_handler = ZipHandler::new(reader, path)?;
        read::read_schedule(&mut file_handler, stops, report)?
    } else if path.is_dir() {
        info!("Reading GTFS directory {:?}", path);
        let mut file_handler = PathFileHandler::new(path.to_path_buf());
        read::read_schedule(&mut file_handler, stops, report)?
    } else {
        bail!(
            "Invalid GTFS {:?}: must be an existing directory or a ZIP archive",
            path
        );
    };
    info!(
        "{} routes and {} trips read",
        schedule.routes.len(),
        schedule.trips.len()
    );
    Ok(schedule)
}
