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

use osm_transit::{
    generate_relations, report::ReportType, test_utils::*, Configuration, DefaultTripNamePolicy,
};
use pretty_assertions::assert_eq;
use std::fs;

const EXTRACT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6">
  <node id="101" lat="45.0703" lon="7.6869">
    <tag k="highway" v="bus_stop"/><tag k="ref" v="A1"/><tag k="gtfs_id" v="S1"/>
  </node>
  <node id="111" lat="45.0720" lon="7.6869">
    <tag k="highway" v="bus_stop"/><tag k="ref" v="A1"/><tag k="gtfs_id" v="S11"/>
  </node>
  <node id="102" lat="45.0718" lon="7.6655">
    <tag k="highway" v="bus_stop"/><tag k="ref" v="B2"/><tag k="gtfs_id" v="S2"/>
  </node>
  <node id="112" lat="45.0900" lon="7.6655">
    <tag k="highway" v="bus_stop"/><tag k="ref" v="B2"/><tag k="gtfs_id" v="S12"/>
  </node>
</osm>"#;

#[test]
fn test_duplicate_codes_and_variants() {
    test_in_tmp_dir(|path| {
        let gtfs = path.join("gtfs");
        fs::create_dir(&gtfs).unwrap();
        create_file_with_content(
            &gtfs,
            "routes.txt",
            "route_id,route_short_name,route_long_name,route_type\nR1,1,Centro - Stazione,3\n",
        );
        create_file_with_content(
            &gtfs,
            "trips.txt",
            "route_id,trip_id,trip_headsign\nR1,T1,Stazione\nR1,T2,Centro\n",
        );
        create_file_with_content(
            &gtfs,
            "stop_times.txt",
            "trip_id,stop_id,stop_sequence\nT1,S1,1\nT1,S2,2\nT2,S2,1\nT2,S1,2\n",
        );
        create_file_with_content(path, "extract.osm", EXTRACT);

        testing_logger::setup();
        let report = generate_relations(
            &gtfs,
            path.join("extract.osm"),
            None,
            path.join("output"),
            &Configuration::default(),
            &DefaultTripNamePolicy,
        )
        .unwrap();
        testing_logger::validate(|captured_logs| {
            let advisories: Vec<&str> = captured_logs
                .iter()
                .filter(|log| log.level == log::Level::Warn)
                .map(|log| log.body.as_str())
                .filter(|body| body.contains("is used in more than one node"))
                .collect();
            assert_eq!(1, advisories.len());
            assert!(advisories[0].contains("The ref A1"));
        });
        assert!(!report.has_errors());
        let duplicates: Vec<_> = report
            .warnings()
            .iter()
            .filter(|row| *row.category() == ReportType::DuplicateStopRef)
            .map(|row| row.message())
            .collect();
        assert_eq!(1, duplicates.len());
        assert!(duplicates[0].starts_with("ref A1 is used by nodes 111 and 101"));

        let mut files: Vec<String> = fs::read_dir(path.join("output").join("relations"))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|file_name| file_name.ends_with(".osm"))
            .collect();
        files.sort();
        assert_eq!(vec!["r10000 1 Centro_1.osm", "r10001 1 Stazione_1.osm"], files);
    });
}
