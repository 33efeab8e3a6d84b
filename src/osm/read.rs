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

//! Read OSM XML extracts in 3 passes over the document: nodes, then ways
//! referencing nodes, then relations referencing nodes and ways. Each pass
//! completes before the next one so elements may reference elements defined
//! later in the document.
//!
//! Stops are classified from a stops extract. Ways and relations may come
//! from a separate network extract whose nodes are never classified, so
//! road nodes with tags of their own (signals, crossings) are accepted.

use super::{
    classify_nodes, Extract, Oneway, OsmNode, OsmRelation, OsmWay, RelationStop, RelationWay,
};
use crate::{
    objects::Coord,
    report::{Report, ReportType},
    stops::StopIndex,
    xml_utils::{for_each_event, TryAttribute, XmlEvent},
    Result,
};
use anyhow::{anyhow, Context};
use quick_xml::events::BytesStart;
use std::{fs, path::Path};
use tracing::{debug, info, warn};
use typed_index_collection::CollectionWithId;

/// Read the stops extract at `stops_path` and link the ways and relations of
/// `network_path`, or of the stops extract itself when there is no network
/// extract
pub fn read<P: AsRef<Path>>(
    stops_path: P,
    network_path: Option<&Path>,
    report: &mut Report,
) -> Result<Extract> {
    let stops_path = stops_path.as_ref();
    info!("Reading OSM stops extract {:?}", stops_path);
    let stops_context = || format!("Error reading {:?}", stops_path);
    let stops_content = fs::read(stops_path).with_context(stops_context)?;
    let stop_nodes = read_nodes(&stops_content).with_context(stops_context)?;
    let stops = index_stops(&stop_nodes).with_context(stops_context)?;
    match network_path {
        Some(network_path) => {
            info!("Reading OSM network extract {:?}", network_path);
            let network_content = fs::read(network_path)
                .with_context(|| format!("Error reading {:?}", network_path))?;
            read_nodes(&network_content)
                .and_then(|nodes| link(&network_content, nodes, stops, report))
                .with_context(|| format!("Error reading {:?}", network_path))
        }
        None => link(&stops_content, stop_nodes, stops, report).with_context(stops_context),
    }
}

/// Read extracts already in memory, see [read]
pub fn read_from_bytes(
    stops_content: &[u8],
    network_content: Option<&[u8]>,
    report: &mut Report,
) -> Result<Extract> {
    let stop_nodes = read_nodes(stops_content)?;
    let stops = index_stops(&stop_nodes)?;
    match network_content {
        Some(network_content) => {
            let nodes = read_nodes(network_content)?;
            link(network_content, nodes, stops, report)
        }
        None => link(stops_content, stop_nodes, stops, report),
    }
}

fn index_stops(nodes: &CollectionWithId<OsmNode>) -> Result<StopIndex> {
    let stops = StopIndex::new(classify_nodes(nodes)?)?;
    info!(
        "{} nodes read, {} stops found",
        nodes.len(),
        stops.stops().len()
    );
    Ok(stops)
}

fn link(
    content: &[u8],
    nodes: CollectionWithId<OsmNode>,
    stops: StopIndex,
    report: &mut Report,
) -> Result<Extract> {
    let ways = read_ways(content, &nodes)?;
    let relations = read_relations(content, &ways, &stops, report)?;
    info!("{} ways and {} relations read", ways.len(), relations.len());
    Ok(Extract {
        nodes,
        ways,
        relations,
        stops,
    })
}

fn read_tag(element: &BytesStart<'_>) -> Result<(String, String)> {
    Ok((element.try_attribute("k")?, element.try_attribute("v")?))
}

fn read_nodes(content: &[u8]) -> Result<CollectionWithId<OsmNode>> {
    let mut nodes = Vec::new();
    let mut current: Option<OsmNode> = None;
    for_each_event(content, |event| {
        match event {
            XmlEvent::Open(element) => match element.name().as_ref() {
                b"node" => {
                    current = Some(OsmNode {
                        id: element.try_attribute("id")?,
                        coord: Coord {
                            lon: element.try_attribute("lon")?,
                            lat: element.try_attribute("lat")?,
                        },
                        tags: Vec::new(),
                    })
                }
                b"tag" => {
                    if let Some(node) = current.as_mut() {
                        node.tags.push(read_tag(element)?);
                    }
                }
                _ => {}
            },
            XmlEvent::Close(b"node") => nodes.extend(current.take()),
            XmlEvent::Close(_) => {}
        }
        Ok(())
    })?;
    CollectionWithId::new(nodes).map_err(|e| anyhow!("{}", e))
}

fn read_oneway(way: &mut OsmWay, key: &str, value: &str) {
    match (key, value) {
        ("oneway", "yes") | ("oneway", "true") => way.oneway = Oneway::Yes,
        ("oneway", "no") | ("oneway", "false") => way.oneway = Oneway::No,
        ("oneway", other) => warn!("Unsupported oneway value '{}' for way {}", other, way.id),
        ("junction", "roundabout") => way.oneway = Oneway::Yes,
        _ => {}
    }
}

fn read_ways(
    content: &[u8],
    nodes: &CollectionWithId<OsmNode>,
) -> Result<CollectionWithId<OsmWay>> {
    let mut ways = Vec::new();
    let mut current: Option<OsmWay> = None;
    for_each_event(content, |event| {
        match event {
            XmlEvent::Open(element) => match element.name().as_ref() {
                b"way" => {
                    current = Some(OsmWay {
                        id: element.try_attribute("id")?,
                        ..Default::default()
                    })
                }
                b"nd" => {
                    if let Some(way) = current.as_mut() {
                        let node_ref: String = element.try_attribute("ref")?;
                        way.nodes.push(nodes.get_idx(&node_ref));
                    }
                }
                b"tag" => {
                    if let Some(way) = current.as_mut() {
                        let (key, value) = read_tag(element)?;
                        read_oneway(way, &key, &value);
                    }
                }
                _ => {}
            },
            XmlEvent::Close(b"way") => {
                if let Some(way) = current.take() {
                    if !way.is_complete() {
                        debug!("way {} is cut by the border of the extract", way.id);
                    }
                    ways.push(way);
                }
            }
            XmlEvent::Close(_) => {}
        }
        Ok(())
    })?;
    CollectionWithId::new(ways).map_err(|e| anyhow!("{}", e))
}

#[derive(Default)]
struct RelationBuilder {
    relation: OsmRelation,
    missing_nodes: Vec<String>,
    failed: bool,
}

impl RelationBuilder {
    fn add_member(
        &mut self,
        element: &BytesStart<'_>,
        ways: &CollectionWithId<OsmWay>,
        stops: &StopIndex,
        report: &mut Report,
    ) -> Result<()> {
        let member_type: String = element.try_attribute("type")?;
        let member_ref: String = element.try_attribute("ref")?;
        let role: String = element.attribute("role").unwrap_or_default();
        let relation_id = &self.relation.id;
        match member_type.as_str() {
            "node" if role == "stop" || role == "platform" => {
                match stops.get_by_osm_id(&member_ref) {
                    Some(stop_idx) => {
                        let sequence = self.relation.stops.len();
                        self.relation.stops.push(RelationStop {
                            sequence,
                            role,
                            stop_idx,
                        });
                    }
                    None => {
                        debug!(
                            "Node {} referenced by relation {} is not a known stop",
                            member_ref, relation_id
                        );
                        report.add_error(
                            format!(
                                "node {} referenced by relation {} is not a known stop",
                                member_ref, relation_id
                            ),
                            ReportType::MissingStopNode,
                        );
                        self.missing_nodes.push(member_ref);
                        self.failed = true;
                    }
                }
            }
            "node" => warn!(
                "Unsupported role '{}' for node {} in relation {}",
                role, member_ref, relation_id
            ),
            "way" => {
                let way_idx = ways.get_idx(&member_ref);
                match way_idx.map(|idx| &ways[idx]) {
                    None => debug!(
                        "Way {} referenced by relation {} is not in the extract",
                        member_ref, relation_id
                    ),
                    Some(way) if !way.is_complete() => debug!(
                        "Way {} referenced by relation {} misses some of its nodes",
                        member_ref, relation_id
                    ),
                    Some(_) => {}
                }
                self.relation.ways.push(RelationWay {
                    way_ref: member_ref,
                    way_idx,
                });
            }
            other => warn!(
                "Unsupported member type '{}' for {} in relation {}",
                other, member_ref, relation_id
            ),
        }
        Ok(())
    }

    fn add_tag(&mut self, key: String, value: String, report: &mut Report) {
        match key.as_str() {
            "name" => self.relation.name = Some(value),
            "ref" => self.relation.reference = Some(value),
            "from" => self.relation.from = Some(value),
            "to" => self.relation.to = Some(value),
            "route" => match value.parse() {
                Ok(route_type) => self.relation.route_type = Some(route_type),
                Err(e) => {
                    debug!("relation {}: {}", self.relation.id, e);
                    report.add_error(
                        format!("relation {}: {}", self.relation.id, e),
                        ReportType::UnknownRouteType,
                    );
                    self.failed = true;
                }
            },
            _ => {}
        }
    }
}

fn read_relations(
    content: &[u8],
    ways: &CollectionWithId<OsmWay>,
    stops: &StopIndex,
    report: &mut Report,
) -> Result<Vec<OsmRelation>> {
    let mut relations = Vec::new();
    let mut current: Option<RelationBuilder> = None;
    for_each_event(content, |event| {
        match event {
            XmlEvent::Open(element) => match element.name().as_ref() {
                b"relation" => {
                    current = Some(RelationBuilder {
                        relation: OsmRelation {
                            id: element.try_attribute("id")?,
                            version: element.attribute("version"),
                            ..Default::default()
                        },
                        ..Default::default()
                    })
                }
                b"member" => {
                    if let Some(builder) = current.as_mut() {
                        builder.add_member(element, ways, stops, report)?;
                    }
                }
                b"tag" => {
                    if let Some(builder) = current.as_mut() {
                        let (key, value) = read_tag(element)?;
                        builder.add_tag(key, value, report);
                    }
                }
                _ => {}
            },
            XmlEvent::Close(b"relation") => {
                if let Some(builder) = current.take() {
                    if builder.failed {
                        let message = if builder.missing_nodes.is_empty() {
                            format!("relation {} skipped", builder.relation.id)
                        } else {
                            format!(
                                "relation {} skipped, missing stop nodes: {}",
                                builder.relation.id,
                                builder.missing_nodes.join(", ")
                            )
                        };
                        debug!("{}", message);
                        report.add_error(message, ReportType::FailedRelation);
                    } else {
                        relations.push(builder.relation);
                    }
                }
            }
            XmlEvent::Close(_) => {}
        }
        Ok(())
    })?;
    Ok(relations)
}
