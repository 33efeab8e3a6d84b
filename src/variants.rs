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

//! Group the trips of a schedule into variants: trips of the same route, with
//! the same direction and the same stops are the same variant.

use crate::{
    gtfs::Schedule,
    objects::{Route, Stop, Trip},
};
use std::collections::BTreeMap;
use tracing::debug;
use typed_index_collection::{CollectionWithId, Idx};

/// Identifier of the first variant, the next ones are numbered from there
pub const FIRST_RELATION_ID: u64 = 10_000;

/// Trips are grouped by route and direction
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
    /// GTFS route id
    pub route_id: String,
    /// Headsign of the trips
    pub direction: String,
}

/// A distinct stop pattern of a route in one direction
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    /// Output identifier, from [FIRST_RELATION_ID]
    pub id: u64,
    /// Route of the trips
    pub route_idx: Idx<Route>,
    /// First trip with this pattern
    pub trip_idx: Idx<Trip>,
    /// Stops, in order
    pub stops: Vec<Idx<Stop>>,
    /// Number of trips with this pattern
    pub frequency: usize,
}

struct Pattern {
    trip_idx: Idx<Trip>,
    stops: Vec<Idx<Stop>>,
    frequency: usize,
}

/// Deduplicate the trips of `schedule` into variants.
///
/// Groups are ordered by route id then direction, variants of a group by the
/// OSM ids of their stops, so identifiers are stable from one run to the
/// other.
pub fn group_trips(schedule: &Schedule, stops: &CollectionWithId<Stop>) -> Vec<Variant> {
    let mut groups: BTreeMap<GroupKey, BTreeMap<Vec<&str>, Pattern>> = BTreeMap::new();
    for (trip_idx, trip) in schedule.trips.iter() {
        let key = GroupKey {
            route_id: trip.route_id.clone(),
            direction: trip.name.clone(),
        };
        let stop_ids: Vec<&str> = trip.stops.iter().map(|idx| stops[*idx].id.as_str()).collect();
        groups
            .entry(key)
            .or_insert_with(BTreeMap::new)
            .entry(stop_ids)
            .and_modify(|pattern| pattern.frequency += 1)
            .or_insert_with(|| Pattern {
                trip_idx,
                stops: trip.stops.clone(),
                frequency: 1,
            });
    }

    let mut variants = Vec::new();
    let mut next_id = FIRST_RELATION_ID;
    for (key, patterns) in groups {
        let route_idx = match schedule.routes.get_idx(&key.route_id) {
            Some(route_idx) => route_idx,
            None => continue,
        };
        for pattern in patterns.into_values() {
            debug!(
                "variant {} of route {} towards '{}': {} trips",
                next_id, key.route_id, key.direction, pattern.frequency
            );
            variants.push(Variant {
                id: next_id,
                route_idx,
                trip_idx: pattern.trip_idx,
                stops: pattern.stops,
                frequency: pattern.frequency,
            });
            next_id += 1;
        }
    }
    variants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Accessibility, Coord, TransitMode};
    use pretty_assertions::assert_eq;

    fn stops() -> CollectionWithId<Stop> {
        let stop = |id: &str| Stop {
            id: id.to_string(),
            gtfs_id: None,
            code: None,
            name: None,
            operator: None,
            coord: Coord::default(),
            mode: TransitMode::Bus,
            is_stop_position: false,
            accessibility: Accessibility::Unknown,
        };
        CollectionWithId::new(vec![stop("101"), stop("102"), stop("103")]).unwrap()
    }

    fn schedule(trips: &[(&str, &str, &str, &[&str])]) -> Schedule {
        let stops = stops();
        let routes = CollectionWithId::new(vec![
            Route {
                id: "R4".to_string(),
                ..Default::default()
            },
            Route {
                id: "R15".to_string(),
                ..Default::default()
            },
        ])
        .unwrap();
        let trips = trips
            .iter()
            .map(|(id, route_id, name, stop_ids)| Trip {
                id: id.to_string(),
                route_id: route_id.to_string(),
                name: name.to_string(),
                stops: stop_ids
                    .iter()
                    .map(|stop_id| stops.get_idx(stop_id).unwrap())
                    .collect(),
            })
            .collect();
        Schedule {
            routes,
            trips: CollectionWithId::new(trips).unwrap(),
        }
    }

    fn summary(schedule: &Schedule, variants: &[Variant]) -> Vec<(u64, String, usize)> {
        variants
            .iter()
            .map(|variant| {
                (
                    variant.id,
                    schedule.trips[variant.trip_idx].id.clone(),
                    variant.frequency,
                )
            })
            .collect()
    }

    #[test]
    fn same_pattern_is_counted() {
        let schedule = schedule(&[
            ("T1", "R4", "Susa", &["101", "102"]),
            ("T2", "R4", "Susa", &["101", "102"]),
            ("T3", "R4", "Susa", &["101", "102"]),
        ]);
        let variants = group_trips(&schedule, &stops());
        assert_eq!(vec![(10000, "T1".to_string(), 3)], summary(&schedule, &variants));
    }

    #[test]
    fn different_patterns_and_directions() {
        let schedule = schedule(&[
            ("T1", "R4", "Susa", &["101", "102", "103"]),
            ("T2", "R4", "Castello", &["103", "102", "101"]),
            ("T3", "R4", "Susa", &["101", "103"]),
            ("T4", "R15", "Sassi", &["102", "103"]),
            ("T5", "R4", "Susa", &["101", "102", "103"]),
        ]);
        let variants = group_trips(&schedule, &stops());
        assert_eq!(
            vec![
                (10000, "T4".to_string(), 1),
                (10001, "T2".to_string(), 1),
                (10002, "T1".to_string(), 2),
                (10003, "T3".to_string(), 1),
            ],
            summary(&schedule, &variants)
        );
    }

    #[test]
    fn same_stops_on_other_route() {
        let schedule = schedule(&[
            ("T1", "R4", "Susa", &["101", "102"]),
            ("T2", "R15", "Susa", &["101", "102"]),
        ]);
        let variants = group_trips(&schedule, &stops());
        assert_eq!(2, variants.len());
        assert!(variants.iter().all(|variant| variant.frequency == 1));
    }

    #[test]
    fn identifiers_are_stable() {
        let trips: &[(&str, &str, &str, &[&str])] = &[
            ("T1", "R4", "Susa", &["101", "102"]),
            ("T2", "R15", "Sassi", &["103", "101"]),
            ("T3", "R4", "Castello", &["102", "101"]),
        ];
        let mut reversed = trips.to_vec();
        reversed.reverse();
        let first = schedule(trips);
        let second = schedule(&reversed);
        let keys = |schedule: &Schedule| {
            group_trips(schedule, &stops())
                .into_iter()
                .map(|variant| (variant.id, variant.stops))
                .collect::<Vec<_>>()
        };
        assert_eq!(keys(&first), keys(&second));
    }
}
