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

//! The `osm_transit` crate generates [OpenStreetMap](https://www.openstreetmap.org)
//! route relations from a [GTFS](http://gtfs.org/) and an OSM extract of the
//! stops already mapped.
//!
//! Stops of the GTFS are matched with the OSM nodes carrying their id in a
//! `gtfs_id` tag. Trips of a route sharing the same direction and the same
//! stops are written as a single relation, ready to be reviewed and imported
//! in an OSM editor.

#![warn(missing_docs)]

pub mod configuration;
pub mod file_handler;
mod generator;
pub mod gtfs;
pub mod naming;
pub mod objects;
pub mod osm;
pub(crate) mod parser;
pub mod report;
pub mod stops;
#[doc(hidden)]
pub mod test_utils;
pub mod variants;
mod xml_builder;
mod xml_utils;

pub use configuration::{read_config, Configuration};
pub use generator::{generate_relations, RELATIONS_DIRECTORY, REPORT_FILE};
pub use naming::{CapitalizedTripNamePolicy, DefaultTripNamePolicy, TripNamePolicy};

/// The error type used by the crate.
pub type Error = anyhow::Error;

/// The corresponding result type used by the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
