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

use super::Schedule;
use crate::{
    file_handler::FileHandler,
    objects::{Route, RouteType, Stop, Trip},
    parser::read_objects,
    report::{Report, ReportType},
    stops::StopIndex,
    Result,
};
use anyhow::anyhow;
use serde::Deserialize;
use skip_error::skip_error_and_debug;
use std::collections::HashMap;
use thiserror::Error;
use typed_index_collection::{CollectionWithId, Idx};

/// A stop time references a `stop_id` which is the `gtfs_id` of no stop
#[derive(Debug, Error, PartialEq)]
#[error("trip {trip_id} stops at {stop_id} which is not the gtfs_id of any mapped stop")]
pub struct UnresolvedStopError {
    /// Trip of the stop time
    pub trip_id: String,
    /// Unknown GTFS stop id
    pub stop_id: String,
}

#[derive(Deserialize, Debug)]
struct GtfsRoute {
    #[serde(rename = "route_id")]
    id: String,
    #[serde(rename = "route_short_name", default)]
    short_name: String,
    #[serde(rename = "route_long_name", default)]
    long_name: String,
    #[serde(rename = "route_type", default)]
    route_type: Option<u16>,
}

#[derive(Deserialize, Debug)]
struct GtfsTrip {
    route_id: String,
    #[serde(rename = "trip_id")]
    id: String,
    #[serde(rename = "trip_headsign", default)]
    headsign: String,
}

#[derive(Deserialize, Debug)]
struct GtfsStopTime {
    trip_id: String,
    stop_sequence: u32,
    stop_id: String,
}

fn read_routes<H>(file_handler: &mut H, report: &mut Report) -> Result<CollectionWithId<Route>>
where
    for<'a> &'a mut H: FileHandler,
{
    let gtfs_routes: Vec<GtfsRoute> = read_objects(file_handler, "routes.txt", true)?;
    let mut routes = Vec::with_capacity(gtfs_routes.len());
    for gtfs_route in gtfs_routes {
        let route_type = match gtfs_route.route_type {
            Some(code) => skip_error_and_debug!(RouteType::from_gtfs_code(code).map_err(|e| {
                report.add_error(
                    format!("route {}: {}", gtfs_route.id, e),
                    ReportType::UnknownRouteType,
                );
                e
            })),
            None => RouteType::default(),
        };
        routes.push(Route {
            id: gtfs_route.id,
            short_name: gtfs_route.short_name,
            long_name: gtfs_route.long_name,
            route_type,
        });
    }
    CollectionWithId::new(routes).map_err(|e| anyhow!("{}", e))
}

fn resolve_stops(
    trip_id: &str,
    stop_times: &mut [GtfsStopTime],
    stops: &StopIndex,
) -> Result<Vec<Idx<Stop>>, UnresolvedStopError> {
    stop_times.sort_unstable_by_key(|stop_time| stop_time.stop_sequence);
    stop_times
        .iter()
        .map(|stop_time| {
            stops
                .get_by_gtfs_id(&stop_time.stop_id)
                .ok_or_else(|| UnresolvedStopError {
                    trip_id: trip_id.to_string(),
                    stop_id: stop_time.stop_id.clone(),
                })
        })
        .collect()
}

pub(super) fn read_schedule<H>(
    file_handler: &mut H,
    stops: &StopIndex,
    report: &mut Report,
) -> Result<Schedule>
where
    for<'a> &'a mut H: FileHandler,
{
    let routes = read_routes(file_handler, report)?;
    let gtfs_trips: Vec<GtfsTrip> = read_objects(file_handler, "trips.txt", true)?;
    let gtfs_stop_times: Vec<GtfsStopTime> = read_objects(file_handler, "stop_times.txt", true)?;

    let mut stop_times_by_trip: HashMap<&str, Vec<GtfsStopTime>> = gtfs_trips
        .iter()
        .map(|trip| (trip.id.as_str(), Vec::new()))
        .collect();
    for stop_time in gtfs_stop_times {
        match stop_times_by_trip.get_mut(stop_time.trip_id.as_str()) {
            Some(stop_times) => stop_times.push(stop_time),
            None => report.add_warning(
                format!("stop times reference the unknown trip {}", stop_time.trip_id),
                ReportType::UnknownTrip,
            ),
        }
    }

    let mut trips = Vec::with_capacity(gtfs_trips.len());
    for gtfs_trip in &gtfs_trips {
        if !routes.contains_id(&gtfs_trip.route_id) {
            report.add_error(
                format!(
                    "trip {} references the unknown route {}",
                    gtfs_trip.id, gtfs_trip.route_id
                ),
                ReportType::UnknownRoute,
            );
            continue;
        }
        let stop_times = stop_times_by_trip
            .get_mut(gtfs_trip.id.as_str())
            .filter(|stop_times| !stop_times.is_empty());
        let stop_times = match stop_times {
            Some(stop_times) => stop_times,
            None => {
                report.add_error(
                    format!("trip {} has no stop times", gtfs_trip.id),
                    ReportType::TripWithoutStopTimes,
                );
                continue;
            }
        };
        let trip_stops = skip_error_and_debug!(resolve_stops(&gtfs_trip.id, stop_times, stops)
            .map_err(|e| {
                report.add_error(e.to_string(), ReportType::UnresolvedStop);
                e
            }));
        trips.push(Trip {
            id: gtfs_trip.id.clone(),
            route_id: gtfs_trip.route_id.clone(),
            name: gtfs_trip.headsign.clone(),
            stops: trip_stops,
        });
    }
    Ok(Schedule {
        routes,
        trips: CollectionWithId::new(trips).map_err(|e| anyhow!("{}", e))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        file_handler::PathFileHandler,
        objects::{Accessibility, Coord, TransitMode},
        test_utils::*,
    };
    use pretty_assertions::assert_eq;

    fn stops() -> StopIndex {
        let stop = |id: &str, gtfs_id: &str| Stop {
            id: id.to_string(),
            gtfs_id: Some(gtfs_id.to_string()),
            code: None,
            name: None,
            operator: None,
            coord: Coord::default(),
            mode: TransitMode::Bus,
            is_stop_position: false,
            accessibility: Accessibility::Unknown,
        };
        StopIndex::new(vec![stop("101", "S1"), stop("102", "S2"), stop("103", "S3")]).unwrap()
    }

    fn read_gtfs(routes: &str, trips: &str, stop_times: &str) -> (Result<Schedule>, Report) {
        let mut report = Report::default();
        let mut schedule = Err(anyhow!("not read"));
        test_in_tmp_dir(|path| {
            create_file_with_content(path, "routes.txt", routes);
            create_file_with_content(path, "trips.txt", trips);
            create_file_with_content(path, "stop_times.txt", stop_times);
            let mut handler = PathFileHandler::new(path.to_path_buf());
            schedule = read_schedule(&mut handler, &stops(), &mut report);
        });
        (schedule, report)
    }

    const ROUTES: &str = "route_id,route_short_name,route_long_name,route_type\n\
                          R4,4,Castello - Susa,3\n\
                          R15,15,Sassi - Mirafiori,0\n";

    #[test]
    fn stop_times_sorted_by_sequence() {
        let (schedule, report) = read_gtfs(
            ROUTES,
            "route_id,trip_id,trip_headsign\nR4,T1,Porta Susa\n",
            "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
             T1,08:10:00,08:10:00,S3,12\n\
             T1,08:00:00,08:00:00,S1,2\n\
             T1,08:05:00,08:05:00,S2,7\n",
        );
        let schedule = schedule.unwrap();
        assert!(!report.has_errors());
        let trip = schedule.trips.get("T1").unwrap();
        assert_eq!("Porta Susa", trip.name);
        let stops = stops();
        let stop_ids: Vec<_> = trip
            .stops
            .iter()
            .map(|idx| stops.stops()[*idx].id.as_str())
            .collect();
        assert_eq!(vec!["101", "102", "103"], stop_ids);
        let tram = schedule.routes.get("R15").unwrap();
        assert_eq!(RouteType::Tram, tram.route_type);
    }

    #[test]
    fn unresolved_stop_skips_the_trip() {
        let (schedule, report) = read_gtfs(
            ROUTES,
            "route_id,trip_id,trip_headsign\nR4,T1,Susa\nR4,T2,Susa\n",
            "trip_id,stop_id,stop_sequence\n\
             T1,S1,1\nT1,X9,2\n\
             T2,S1,1\nT2,S2,2\n",
        );
        let schedule = schedule.unwrap();
        assert!(!schedule.trips.contains_id("T1"));
        assert!(schedule.trips.contains_id("T2"));
        assert_eq!(
            vec!["trip T1 stops at X9 which is not the gtfs_id of any mapped stop"],
            report
                .error_messages(&ReportType::UnresolvedStop)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn unknown_route_and_missing_stop_times() {
        let (schedule, report) = read_gtfs(
            ROUTES,
            "route_id,trip_id,trip_headsign\nR99,T1,Susa\nR4,T2,Susa\nR4,T3,Susa\n",
            "trip_id,stop_id,stop_sequence\nT1,S1,1\nT3,S1,1\nT4,S1,1\n",
        );
        let schedule = schedule.unwrap();
        let trip_ids: Vec<_> = schedule.trips.values().map(|t| t.id.as_str()).collect();
        assert_eq!(vec!["T3"], trip_ids);
        assert_eq!(
            vec!["trip T1 references the unknown route R99"],
            report
                .error_messages(&ReportType::UnknownRoute)
                .collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["trip T2 has no stop times"],
            report
                .error_messages(&ReportType::TripWithoutStopTimes)
                .collect::<Vec<_>>()
        );
        assert_eq!(1, report.warnings().len());
        assert_eq!(
            "stop times reference the unknown trip T4",
            report.warnings()[0].message()
        );
    }

    #[test]
    fn unsupported_route_type() {
        let (schedule, report) = read_gtfs(
            "route_id,route_short_name,route_long_name,route_type\n\
             R4,4,Castello - Susa,3\n\
             R8,8,Space,1700\n\
             R9,9,Default,\n",
            "route_id,trip_id,trip_headsign\nR8,T1,Mars\n",
            "trip_id,stop_id,stop_sequence\nT1,S1,1\n",
        );
        let schedule = schedule.unwrap();
        assert!(!schedule.routes.contains_id("R8"));
        assert_eq!(RouteType::Bus, schedule.routes.get("R9").unwrap().route_type);
        assert_eq!(
            vec!["route R8: unsupported route type '1700'"],
            report
                .error_messages(&ReportType::UnknownRouteType)
                .collect::<Vec<_>>()
        );
        assert_eq!(1, report.error_messages(&ReportType::UnknownRoute).count());
    }

    #[test]
    fn skipped_items_are_reported_not_warned() {
        testing_logger::setup();
        let (schedule, report) = read_gtfs(
            "route_id,route_short_name,route_long_name,route_type\n\
             R4,4,Castello - Susa,3\n\
             R8,8,Space,1700\n",
            "route_id,trip_id,trip_headsign\nR4,T1,Susa\nR4,T2,Susa\n",
            "trip_id,stop_id,stop_sequence\nT1,S1,1\nT1,X9,2\nT2,S1,1\n",
        );
        let schedule = schedule.unwrap();
        assert!(!schedule.routes.contains_id("R8"));
        assert!(!schedule.trips.contains_id("T1"));
        assert!(schedule.trips.contains_id("T2"));
        assert_eq!(1, report.error_messages(&ReportType::UnknownRouteType).count());
        assert_eq!(1, report.error_messages(&ReportType::UnresolvedStop).count());
        testing_logger::validate(|captured_logs| {
            assert!(captured_logs
                .iter()
                .all(|log| log.level != tracing::log::Level::Warn));
            let debug_logs: Vec<&str> = captured_logs
                .iter()
                .filter(|log| log.level == tracing::log::Level::Debug)
                .map(|log| log.body.as_str())
                .collect();
            assert!(debug_logs
                .iter()
                .any(|body| body.contains("unsupported route type '1700'")));
            assert!(debug_logs
                .iter()
                .any(|body| body.contains("trip T1 stops at X9")));
        });
    }

    #[test]
    fn missing_stop_times_file() {
        let mut report = Report::default();
        test_in_tmp_dir(|path| {
            create_file_with_content(path, "routes.txt", ROUTES);
            create_file_with_content(path, "trips.txt", "route_id,trip_id\n");
            let mut handler = PathFileHandler::new(path.to_path_buf());
            let error = read_schedule(&mut handler, &stops(), &mut report).unwrap_err();
            assert!(error.to_string().contains("stop_times.txt"));
        });
    }
}
