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

//! Write the variants as OSM relations to import, with a text listing of
//! their stops for review.

use super::OsmWay;
use crate::{
    configuration::Configuration,
    naming::TripNamePolicy,
    objects::{BoundingBox, Route, Stop, Trip},
    variants::Variant,
    xml_builder::{write_document, Element},
    Result,
};
use anyhow::Context;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use typed_index_collection::CollectionWithId;

const GENERATOR: &str = "osm_transit";

/// Writes a relation document and a stop listing for each variant
pub struct RelationWriter<'a> {
    stops: &'a CollectionWithId<Stop>,
    routes: &'a CollectionWithId<Route>,
    trips: &'a CollectionWithId<Trip>,
    configuration: &'a Configuration,
    trip_name_policy: &'a dyn TripNamePolicy,
    bounding_box: BoundingBox,
}

impl<'a> RelationWriter<'a> {
    /// Every document gets the same `bounding_box`
    pub fn new(
        stops: &'a CollectionWithId<Stop>,
        routes: &'a CollectionWithId<Route>,
        trips: &'a CollectionWithId<Trip>,
        configuration: &'a Configuration,
        trip_name_policy: &'a dyn TripNamePolicy,
        bounding_box: BoundingBox,
    ) -> Self {
        RelationWriter {
            stops,
            routes,
            trips,
            configuration,
            trip_name_policy,
            bounding_box,
        }
    }

    fn tag(key: &str, value: &str) -> Element {
        Element::builder("tag").attr("k", key).attr("v", value).build()
    }

    fn member(member_type: &str, member_ref: &str, role: &str) -> Element {
        Element::builder("member")
            .attr("type", member_type)
            .attr("ref", member_ref)
            .attr("role", role)
            .build()
    }

    /// The `direction` tag: the trip name cleaned by the naming policy
    pub fn direction(&self, variant: &Variant) -> String {
        let trip = &self.trips[variant.trip_idx];
        self.trip_name_policy.fix_trip_name(&trip.name)
    }

    /// The `osm` document of a variant. Its relation is new, with a negative
    /// id, and lists the stops then the `ways`.
    pub fn relation(&self, variant: &Variant, ways: &[&OsmWay]) -> Element {
        let route = &self.routes[variant.route_idx];
        let stop_members = variant
            .stops
            .iter()
            .map(|idx| Self::member("node", &self.stops[*idx].id, "stop"));
        let way_members = ways.iter().map(|way| Self::member("way", &way.id, ""));
        let tags = vec![
            Self::tag("direction", &self.direction(variant)),
            Self::tag("name", &route.label()),
            Self::tag("network", &self.configuration.network),
            Self::tag("operator", &self.configuration.operator),
            Self::tag("ref", &route.short_name),
            Self::tag("route", route.route_type.as_osm_value()),
            Self::tag("type", "route"),
        ];
        let relation = Element::builder("relation")
            .attr("id", format!("-{}", variant.id))
            .append_all(stop_members)
            .append_all(way_members)
            .append_all(tags)
            .build();
        let bounds = Element::builder("bounds")
            .attr("minlat", self.bounding_box.min_lat)
            .attr("minlon", self.bounding_box.min_lon)
            .attr("maxlat", self.bounding_box.max_lat)
            .attr("maxlon", self.bounding_box.max_lon)
            .build();
        Element::builder("osm")
            .attr("version", "0.6")
            .attr("generator", GENERATOR)
            .append(bounds)
            .append(relation)
            .build()
    }

    /// The stops of a variant, one per line, under a header naming the route,
    /// the direction and the number of trips
    pub fn stop_list(&self, variant: &Variant) -> String {
        let route = &self.routes[variant.route_idx];
        let mut list = format!(
            "{}\ndirection: {}\ntrips: {}\n\n",
            route.label(),
            self.direction(variant),
            variant.frequency
        );
        for (position, idx) in variant.stops.iter().enumerate() {
            let stop = &self.stops[*idx];
            list.push_str(&format!(
                "{}\t{}\t{}\tnode/{}\n",
                position + 1,
                stop.code.as_deref().unwrap_or_default(),
                stop.name.as_deref().unwrap_or_default(),
                stop.id
            ));
        }
        list
    }

    /// Name of the files of a variant, without extension
    pub fn file_stem(&self, variant: &Variant) -> String {
        let route = &self.routes[variant.route_idx];
        let trip = &self.trips[variant.trip_idx];
        format!(
            "r{} {} {}_{}",
            variant.id,
            route.short_name.replace('/', "B"),
            trip.name.replace('/', "_"),
            variant.frequency
        )
    }

    /// Write the `.osm` and `.txt` files of a variant in `directory`
    pub fn write(&self, directory: &Path, variant: &Variant, ways: &[&OsmWay]) -> Result<()> {
        let file_stem = self.file_stem(variant);

        let osm_path = directory.join(format!("{}.osm", file_stem));
        let file =
            File::create(&osm_path).with_context(|| format!("Error writing {:?}", osm_path))?;
        let mut writer = BufWriter::new(file);
        write_document(&mut writer, &self.relation(variant, ways))
            .with_context(|| format!("Error writing {:?}", osm_path))?;
        writer
            .flush()
            .with_context(|| format!("Error writing {:?}", osm_path))?;

        let txt_path = directory.join(format!("{}.txt", file_stem));
        fs::write(&txt_path, self.stop_list(variant))
            .with_context(|| format!("Error writing {:?}", txt_path))?;
        Ok(())
    }
}
