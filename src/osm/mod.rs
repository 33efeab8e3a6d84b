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

//! Model of an OSM XML extract: nodes, ways and relations linked together,
//! and the stops found among the nodes.

mod classify;
mod read;
mod write;

pub use classify::{classify, classify_nodes, ClassificationError};
pub use read::{read, read_from_bytes};
pub use write::RelationWriter;

use crate::objects::{Coord, KeysValues, RouteType, Stop};
use crate::stops::StopIndex;
use typed_index_collection::{CollectionWithId, Id, Idx};

/// A node of the extract with its tags, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsmNode {
    /// OSM id
    pub id: String,
    /// Position
    pub coord: Coord,
    /// Tags in document order
    pub tags: KeysValues,
}

impl Id<OsmNode> for OsmNode {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Direction of travel allowed on a way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oneway {
    /// Forward only (`oneway=yes` or a roundabout)
    Yes,
    /// Both directions (`oneway=no`)
    No,
    /// Not tagged
    Unknown,
}

impl Default for Oneway {
    fn default() -> Self {
        Oneway::Unknown
    }
}

/// A way of the extract.
///
/// A node reference missing from the extract (the way crosses the border of
/// the extract) is kept as a hole.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsmWay {
    /// OSM id
    pub id: String,
    /// Nodes of the way, in order
    pub nodes: Vec<Option<Idx<OsmNode>>>,
    /// Direction of travel
    pub oneway: Oneway,
}

impl Id<OsmWay> for OsmWay {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl OsmWay {
    /// All the nodes of the way are in the extract
    pub fn is_complete(&self) -> bool {
        self.nodes.iter().all(Option::is_some)
    }
}

/// A node member with a `stop` or `platform` role
#[derive(Debug, Clone, PartialEq)]
pub struct RelationStop {
    /// Position among the stop members, from 0
    pub sequence: usize,
    /// `stop` or `platform`
    pub role: String,
    /// Stop of the member
    pub stop_idx: Idx<Stop>,
}

/// A way member
#[derive(Debug, Clone, PartialEq)]
pub struct RelationWay {
    /// OSM id of the way
    pub way_ref: String,
    /// `None` if the way is not in the extract
    pub way_idx: Option<Idx<OsmWay>>,
}

/// A relation whose stop members are all known stops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OsmRelation {
    /// OSM id
    pub id: String,
    /// `version` attribute, absent on relations created in an editor
    pub version: Option<u32>,
    /// `name` tag
    pub name: Option<String>,
    /// `ref` tag
    pub reference: Option<String>,
    /// `from` tag
    pub from: Option<String>,
    /// `to` tag
    pub to: Option<String>,
    /// `route` tag
    pub route_type: Option<RouteType>,
    /// Stop members, in order
    pub stops: Vec<RelationStop>,
    /// Way members, in order
    pub ways: Vec<RelationWay>,
}

/// The linked content of an OSM extract
#[derive(Debug, Default)]
pub struct Extract {
    /// All nodes
    pub nodes: CollectionWithId<OsmNode>,
    /// All ways
    pub ways: CollectionWithId<OsmWay>,
    /// Relations successfully linked, in document order
    pub relations: Vec<OsmRelation>,
    /// Stops classified among the tagged nodes
    pub stops: StopIndex,
}

impl Extract {
    /// First relation with the `ref` tag `reference` and exactly the stop
    /// members `stops`, in this order
    pub fn find_relation(&self, reference: &str, stops: &[Idx<Stop>]) -> Option<&OsmRelation> {
        self.relations.iter().find(|relation| {
            relation.reference.as_deref() == Some(reference)
                && relation.stops.len() == stops.len()
                && relation
                    .stops
                    .iter()
                    .zip(stops)
                    .all(|(member, stop_idx)| member.stop_idx == *stop_idx)
        })
    }
}
