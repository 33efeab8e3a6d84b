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

//! The different objects handled by the generator: the stops found in the
//! OSM extract, and the routes and trips read from the GTFS.

use geo::{BoundingRect, HaversineDistance, MultiPoint, Point, VincentyDistance};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use typed_index_collection::{Id, Idx};

/// Key/value pairs, in document order
pub type KeysValues = Vec<(String, String)>;

/// A WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coord {
    /// Longitude, in degrees
    pub lon: f64,
    /// Latitude, in degrees
    pub lat: f64,
}

impl From<Coord> for Point<f64> {
    fn from(coord: Coord) -> Self {
        Point::new(coord.lon, coord.lat)
    }
}

impl Coord {
    /// Distance in meters on the WGS84 ellipsoid (Vincenty's formula).
    ///
    /// Vincenty does not converge for nearly antipodal points, the
    /// haversine distance is used for those.
    pub fn distance_to(&self, other: &Coord) -> f64 {
        let from = Point::from(*self);
        let to = Point::from(*other);
        from.vincenty_distance(&to).unwrap_or_else(|_| from.haversine_distance(&to))
    }
}

/// Transport mode of a stop mapped in OSM
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransitMode {
    /// `highway=bus_stop`, `bus=yes`
    Bus,
    /// `railway=tram_stop`, `railway=station`, `tram=yes`, `train=yes`
    TramOrRail,
    /// `public_transport=stop_position` without any other mode tag
    UnclassifiedStopPosition,
}

/// Wheelchair accessibility of a stop (`wheelchair=*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Accessibility {
    /// No (or an unsupported) `wheelchair` tag
    Unknown,
    /// `wheelchair=no`
    NotAccessible,
    /// `wheelchair=limited`
    Limited,
}

impl Default for Accessibility {
    fn default() -> Self {
        Accessibility::Unknown
    }
}

/// A stop mapped in OSM, identified by its node id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    /// OSM node id
    pub id: String,
    /// GTFS `stop_id`, from the `gtfs_id` tag
    pub gtfs_id: Option<String>,
    /// Stop code, from the `ref` tag
    pub code: Option<String>,
    /// `name` tag
    pub name: Option<String>,
    /// `operator` tag
    pub operator: Option<String>,
    /// Location of the node
    pub coord: Coord,
    /// Transport mode deduced from the tags
    pub mode: TransitMode,
    /// The node is tagged `public_transport=stop_position`
    pub is_stop_position: bool,
    /// `wheelchair` tag
    pub accessibility: Accessibility,
}

impl Id<Stop> for Stop {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Error returned when a `route` value (OSM) or a `route_type` (GTFS) is
/// not a supported transport mode.
#[derive(Debug, Error, PartialEq)]
#[error("unsupported route type '{0}'")]
pub struct UnknownRouteType(pub String);

/// Type of a route, using the OSM `route=*` vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RouteType {
    /// `route=bus`
    Bus,
    /// `route=trolleybus`
    Trolleybus,
    /// `route=tram`
    Tram,
    /// `route=train`
    Train,
    /// `route=light_rail`
    LightRail,
    /// `route=subway`
    Subway,
    /// `route=monorail`
    Monorail,
    /// `route=ferry`
    Ferry,
    /// `route=funicular`
    Funicular,
    /// `route=aerialway`
    Aerialway,
}

impl RouteType {
    /// Value of the `route` tag for this type
    pub fn as_osm_value(self) -> &'static str {
        match self {
            RouteType::Bus => "bus",
            RouteType::Trolleybus => "trolleybus",
            RouteType::Tram => "tram",
            RouteType::Train => "train",
            RouteType::LightRail => "light_rail",
            RouteType::Subway => "subway",
            RouteType::Monorail => "monorail",
            RouteType::Ferry => "ferry",
            RouteType::Funicular => "funicular",
            RouteType::Aerialway => "aerialway",
        }
    }

    /// Converts a GTFS `route_type`, basic or extended
    /// (https://developers.google.com/transit/gtfs/reference/extended-route-types)
    pub fn from_gtfs_code(code: u16) -> Result<Self, UnknownRouteType> {
        let route_type = match code {
            0 | 5 | 900..=999 => RouteType::Tram,
            1 | 400..=404 => RouteType::Subway,
            2 | 100..=199 => RouteType::Train,
            3 | 200..=299 | 700..=799 => RouteType::Bus,
            4 | 1000..=1099 | 1200 => RouteType::Ferry,
            6 | 1300..=1399 => RouteType::Aerialway,
            7 | 1400..=1499 => RouteType::Funicular,
            11 | 800 => RouteType::Trolleybus,
            12 | 405 => RouteType::Monorail,
            _ => return Err(UnknownRouteType(code.to_string())),
        };
        Ok(route_type)
    }
}

impl Default for RouteType {
    fn default() -> Self {
        RouteType::Bus
    }
}

impl FromStr for RouteType {
    type Err = UnknownRouteType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let route_type = match value {
            "bus" => RouteType::Bus,
            "trolleybus" => RouteType::Trolleybus,
            "tram" => RouteType::Tram,
            "train" => RouteType::Train,
            "light_rail" => RouteType::LightRail,
            "subway" => RouteType::Subway,
            "monorail" => RouteType::Monorail,
            "ferry" => RouteType::Ferry,
            "funicular" => RouteType::Funicular,
            "aerialway" => RouteType::Aerialway,
            _ => return Err(UnknownRouteType(value.to_string())),
        };
        Ok(route_type)
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_osm_value())
    }
}

/// A GTFS route
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Route {
    /// `route_id`
    pub id: String,
    /// `route_short_name`, used as the `ref` of the relations
    pub short_name: String,
    /// `route_long_name`
    pub long_name: String,
    /// Transport mode of the route
    pub route_type: RouteType,
}

impl Id<Route> for Route {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl Route {
    /// Label used as the `name` tag: `short name: long name`
    pub fn label(&self) -> String {
        format!("{}: {}", self.short_name, self.long_name)
    }
}

/// A GTFS trip with its stops resolved against the OSM stops
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    /// `trip_id`
    pub id: String,
    /// `route_id`
    pub route_id: String,
    /// `trip_headsign`, the raw direction of the trip
    pub name: String,
    /// The stops in `stop_sequence` order
    pub stops: Vec<Idx<Stop>>,
}

impl Id<Trip> for Trip {
    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Smallest latitude/longitude rectangle containing a set of stops
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Southern bound
    pub min_lat: f64,
    /// Western bound
    pub min_lon: f64,
    /// Northern bound
    pub max_lat: f64,
    /// Eastern bound
    pub max_lon: f64,
}

impl BoundingBox {
    /// Bounding box of the coordinates, `None` if there is none
    pub fn from_coords<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coord>,
    {
        let points: MultiPoint<f64> = coords.into_iter().map(Point::from).collect();
        points.bounding_rect().map(|rect| BoundingBox {
            min_lat: rect.min().y,
            min_lon: rect.min().x,
            max_lat: rect.max().y,
            max_lon: rect.max().x,
        })
    }
}
