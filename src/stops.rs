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

//! Index of the stops mapped in OSM, by OSM node id and by GTFS id, with the
//! detection of stop codes (`ref`) used twice in the same area.

use crate::objects::{BoundingBox, Stop, TransitMode};
use crate::Result;
use anyhow::anyhow;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};
use typed_index_collection::{CollectionWithId, Idx};

/// Two stops of the same mode sharing a code and closer than this distance
/// (in meters) are reported, the code is probably wrong on one of them.
pub const DUPLICATE_REF_DISTANCE: f64 = 500.0;

/// Two stops of the same mode sharing a code closer than
/// [DUPLICATE_REF_DISTANCE]
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateRef {
    /// The shared code
    pub code: String,
    /// OSM id of the stop inserted last
    pub stop_id: String,
    /// OSM id of the stop already in the index
    pub other_stop_id: String,
    /// Distance between the 2 stops, in meters
    pub distance: f64,
}

/// Stops of an OSM extract, indexed for the GTFS correlation
#[derive(Debug, Default)]
pub struct StopIndex {
    stops: CollectionWithId<Stop>,
    by_gtfs_id: BTreeMap<String, Idx<Stop>>,
    bus_refs: HashMap<String, Vec<Idx<Stop>>>,
    rail_refs: HashMap<String, Vec<Idx<Stop>>>,
    unclassified_stop_positions: Vec<Stop>,
    duplicates: Vec<DuplicateRef>,
}

impl StopIndex {
    /// Index all the stops, in order
    pub fn new(stops: Vec<Stop>) -> Result<Self> {
        let mut index = StopIndex::default();
        for stop in stops {
            index.insert(stop)?;
        }
        Ok(index)
    }

    /// Add a stop to the index.
    ///
    /// Stop positions of unknown mode are kept aside and get no index, `None`
    /// is returned for them.
    pub fn insert(&mut self, stop: Stop) -> Result<Option<Idx<Stop>>> {
        let pool = match stop.mode {
            TransitMode::Bus => &mut self.bus_refs,
            TransitMode::TramOrRail => &mut self.rail_refs,
            TransitMode::UnclassifiedStopPosition => {
                self.unclassified_stop_positions.push(stop);
                return Ok(None);
            }
        };
        let code = stop.code.clone();
        let gtfs_id = stop.gtfs_id.clone();
        let coord = stop.coord;
        let is_stop_position = stop.is_stop_position;
        let idx = self.stops.push(stop).map_err(|e| anyhow!("{}", e))?;

        if let Some(code) = code.filter(|_| !is_stop_position) {
            let same_code = pool.entry(code.clone()).or_insert_with(Vec::new);
            for other_idx in same_code.iter() {
                let other = &self.stops[*other_idx];
                let distance = coord.distance_to(&other.coord);
                if distance < DUPLICATE_REF_DISTANCE {
                    let stop_id = self.stops[idx].id.clone();
                    warn!(
                        "The ref {} is used in more than one node within {}m this may lead to bad import. (node IDs: {}, {})",
                        code, DUPLICATE_REF_DISTANCE, stop_id, other.id
                    );
                    self.duplicates.push(DuplicateRef {
                        code: code.clone(),
                        stop_id,
                        other_stop_id: other.id.clone(),
                        distance,
                    });
                }
            }
            same_code.push(idx);
        }

        if let Some(gtfs_id) = gtfs_id.filter(|id| !id.is_empty()) {
            if let Some(other_idx) = self.by_gtfs_id.get(&gtfs_id) {
                let kept_id = &self.stops[*other_idx].id;
                warn!(
                    "gtfs_id {} is used by nodes {} and {}, only node {} is used",
                    gtfs_id, kept_id, self.stops[idx].id, kept_id
                );
            } else {
                debug!("stop {} matches GTFS stop {}", self.stops[idx].id, gtfs_id);
                self.by_gtfs_id.insert(gtfs_id, idx);
            }
        }
        Ok(Some(idx))
    }

    /// All the indexed stops
    pub fn stops(&self) -> &CollectionWithId<Stop> {
        &self.stops
    }

    /// Stop whose `gtfs_id` tag is `gtfs_id`
    pub fn get_by_gtfs_id(&self, gtfs_id: &str) -> Option<Idx<Stop>> {
        self.by_gtfs_id.get(gtfs_id).copied()
    }

    /// Stop of the OSM node `osm_id`
    pub fn get_by_osm_id(&self, osm_id: &str) -> Option<Idx<Stop>> {
        self.stops.get_idx(osm_id)
    }

    /// Stops referenced by a GTFS id, in GTFS id order
    pub fn correlated_stops(&self) -> impl Iterator<Item = &Stop> {
        self.by_gtfs_id.values().map(move |idx| &self.stops[*idx])
    }

    /// Bounding box of the stops referenced by a GTFS id
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_coords(self.correlated_stops().map(|stop| stop.coord))
    }

    /// Stops positions without mode, excluded from the index
    pub fn unclassified_stop_positions(&self) -> &[Stop] {
        &self.unclassified_stop_positions
    }

    /// Codes used twice within [DUPLICATE_REF_DISTANCE], one record per pair
    pub fn duplicates(&self) -> &[DuplicateRef] {
        &self.duplicates
    }
}
