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

//! Classification of the tagged nodes of an extract into stops.

use super::OsmNode;
use crate::objects::{Accessibility, Stop, TransitMode};
use thiserror::Error;
use tracing::{debug, warn};
use typed_index_collection::CollectionWithId;

/// A tagged node matches none of the stop conventions
#[derive(Debug, Error, PartialEq)]
#[error("Unknown node type for node {node_id}")]
pub struct ClassificationError {
    /// OSM id of the node
    pub node_id: String,
}

/// Build the stop of a node from its tags, read in document order.
///
/// `public_transport=stop_position` only counts if no mode has been found
/// yet: such a node tagged later with `bus=yes` is a bus stop position, while
/// a node with no mode at all is a stop position of unknown mode.
pub fn classify(node: &OsmNode) -> Result<Stop, ClassificationError> {
    let mut mode = None;
    let mut is_stop_position = false;
    let mut accessibility = Accessibility::Unknown;
    let (mut code, mut name, mut operator, mut gtfs_id) = (None, None, None, None);
    for (key, value) in &node.tags {
        match (key.as_str(), value.as_str()) {
            ("highway", "bus_stop") => {
                if mode != Some(TransitMode::TramOrRail) {
                    mode = Some(TransitMode::Bus);
                }
            }
            ("railway", "tram_stop") | ("railway", "station") | ("train", "yes")
            | ("tram", "yes") => mode = Some(TransitMode::TramOrRail),
            ("bus", "yes") => mode = Some(TransitMode::Bus),
            ("public_transport", "stop_position") => {
                if mode.is_none() {
                    is_stop_position = true;
                }
            }
            ("wheelchair", "no") => accessibility = Accessibility::NotAccessible,
            ("wheelchair", "limited") => accessibility = Accessibility::Limited,
            ("wheelchair", "yes") => {}
            ("wheelchair", other) => warn!(
                "Unsupported wheelchair value '{}' for node {}",
                other, node.id
            ),
            ("ref", value) => code = Some(value.to_string()),
            ("name", value) => name = Some(value.to_string()),
            ("operator", value) => operator = Some(value.to_string()),
            ("gtfs_id", value) => gtfs_id = Some(value.to_string()),
            _ => {}
        }
    }
    let mode = match (mode, is_stop_position) {
        (Some(mode), _) => mode,
        (None, true) => TransitMode::UnclassifiedStopPosition,
        (None, false) => {
            return Err(ClassificationError {
                node_id: node.id.clone(),
            })
        }
    };
    Ok(Stop {
        id: node.id.clone(),
        gtfs_id,
        code,
        name,
        operator,
        coord: node.coord,
        mode,
        is_stop_position,
        accessibility,
    })
}

/// Classify every tagged node, in order. Untagged nodes are only geometry and
/// are not considered.
pub fn classify_nodes(
    nodes: &CollectionWithId<OsmNode>,
) -> Result<Vec<Stop>, ClassificationError> {
    let mut stops = Vec::new();
    for node in nodes.values().filter(|node| !node.tags.is_empty()) {
        let stop = classify(node)?;
        if stop.mode == TransitMode::UnclassifiedStopPosition {
            debug!(
                "Stop position {} has no transport mode, it will be ignored",
                stop.id
            );
        }
        stops.push(stop);
    }
    Ok(stops)
}
