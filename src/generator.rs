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

//! Run the whole generation: read the OSM extract, read the GTFS against its
//! stops, group the trips and write a relation per variant.

use crate::{
    configuration::Configuration,
    gtfs,
    naming::TripNamePolicy,
    objects::Route,
    osm::{self, Extract, OsmWay, RelationWriter},
    report::{Report, ReportType},
    stops::StopIndex,
    variants::{group_trips, Variant},
    Result,
};
use anyhow::Context;
use std::{fs, path::Path};
use tracing::{info, warn};

/// Sub-directory of the output directory receiving the relations
pub const RELATIONS_DIRECTORY: &str = "relations";

/// Name of the report written in the output directory
pub const REPORT_FILE: &str = "report.json";

/// Way members of the first mapped relation with the same `ref` and the same
/// stops as the variant. Ways missing from the extract are skipped.
fn way_members<'a>(
    extract: &'a Extract,
    route: &Route,
    variant: &Variant,
    report: &mut Report,
) -> Vec<&'a OsmWay> {
    let relation = match extract.find_relation(&route.short_name, &variant.stops) {
        Some(relation) => relation,
        None => {
            info!(
                "no mapped relation matches variant {}, it is written without ways",
                variant.id
            );
            return Vec::new();
        }
    };
    let mut ways = Vec::with_capacity(relation.ways.len());
    for member in &relation.ways {
        match member.way_idx.map(|idx| &extract.ways[idx]) {
            Some(way) => {
                if !way.is_complete() {
                    report.add_warning(
                        format!(
                            "way {} of relation {} misses some of its nodes",
                            way.id, relation.id
                        ),
                        ReportType::IncompleteWay,
                    );
                }
                ways.push(way);
            }
            None => report.add_warning(
                format!(
                    "way {} of relation {} is not in the extract, it is skipped",
                    member.way_ref, relation.id
                ),
                ReportType::IncompleteWay,
            ),
        }
    }
    ways
}

/// Duplicate codes and ignored stop positions of the stops extract
fn report_stops(stops: &StopIndex, report: &mut Report) {
    for duplicate in stops.duplicates() {
        report.add_warning(
            format!(
                "ref {} is used by nodes {} and {}, {:.0}m apart",
                duplicate.code, duplicate.stop_id, duplicate.other_stop_id, duplicate.distance
            ),
            ReportType::DuplicateStopRef,
        );
    }
    for stop in stops.unclassified_stop_positions() {
        report.add_warning(
            format!("stop position {} has no transport mode, it is ignored", stop.id),
            ReportType::UnclassifiedStopPosition,
        );
    }
}

fn write_report(output_dir: &Path, report: &Report) -> Result<()> {
    let report_path = output_dir.join(REPORT_FILE);
    let serialized_report = serde_json::to_string_pretty(report)?;
    fs::write(&report_path, serialized_report)
        .with_context(|| format!("Error writing {:?}", report_path))?;
    Ok(())
}

/// Generate the relations of the GTFS at `gtfs_path` (a directory or a zip
/// archive) with the stops of the OSM extract at `osm_path`.
///
/// The way members come from the relations of `osm_network_path` when
/// given, otherwise from the relations of `osm_path`. Nodes of the network
/// extract are never classified as stops.
///
/// Each variant gives a `.osm` relation and a `.txt` stop listing in the
/// `relations` sub-directory of `output_dir`, and the report of the skipped
/// objects is written in `output_dir/report.json` then returned.
///
/// Malformed inputs and tagged nodes that are not stops abort the generation.
pub fn generate_relations<G, O, D>(
    gtfs_path: G,
    osm_path: O,
    osm_network_path: Option<&Path>,
    output_dir: D,
    configuration: &Configuration,
    trip_name_policy: &dyn TripNamePolicy,
) -> Result<Report>
where
    G: AsRef<Path>,
    O: AsRef<Path>,
    D: AsRef<Path>,
{
    let output_dir = output_dir.as_ref();
    let mut report = Report::default();
    let extract = osm::read(osm_path, osm_network_path, &mut report)?;
    report_stops(&extract.stops, &mut report);
    let schedule = gtfs::read(gtfs_path, &extract.stops, &mut report)?;
    let variants = group_trips(&schedule, extract.stops.stops());
    info!("{} variants found", variants.len());

    let relations_dir = output_dir.join(RELATIONS_DIRECTORY);
    fs::create_dir_all(&relations_dir)
        .with_context(|| format!("Error creating {:?}", relations_dir))?;
    match extract.stops.bounding_box() {
        Some(bounding_box) => {
            let writer = RelationWriter::new(
                extract.stops.stops(),
                &schedule.routes,
                &schedule.trips,
                configuration,
                trip_name_policy,
                bounding_box,
            );
            for variant in &variants {
                let ways = if configuration.with_ways {
                    let route = &schedule.routes[variant.route_idx];
                    way_members(&extract, route, variant, &mut report)
                } else {
                    Vec::new()
                };
                writer.write(&relations_dir, variant, &ways)?;
            }
            info!("{} relations written in {:?}", variants.len(), relations_dir);
        }
        None => warn!("no stop of the OSM extract has a gtfs_id, no relation is written"),
    }

    report.log_summary();
    write_report(output_dir, &report)?;
    Ok(report)
}
