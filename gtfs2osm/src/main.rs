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

use clap::Parser;
use osm_transit::{read_config, DefaultTripNamePolicy, Result};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    layer::SubscriberExt as _,
    util::SubscriberInitExt as _,
};

#[derive(Debug, Parser)]
#[clap(
    name = "gtfs2osm",
    about = "Generate OpenStreetMap route relations from a GTFS.",
    version
)]
struct Opt {
    /// GTFS directory or zip archive.
    #[clap(short, long)]
    gtfs: PathBuf,

    /// OSM XML extract containing the stops tagged with `gtfs_id`.
    #[clap(long)]
    osm: PathBuf,

    /// OSM XML extract of the road and rail network, its relations give the
    /// way members with `--with-ways`. Defaults to the `--osm` extract.
    #[clap(long)]
    osm_network: Option<PathBuf>,

    /// Output directory, the relations are written in its `relations`
    /// sub-directory.
    #[clap(short, long)]
    output: PathBuf,

    /// JSON file containing the configuration (network, operator, with_ways).
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Value of the `network` tag, overrides the configuration.
    #[clap(long)]
    network: Option<String>,

    /// Value of the `operator` tag, overrides the configuration.
    #[clap(long)]
    operator: Option<String>,

    /// Copy the ways of the already mapped relations with the same stops.
    #[clap(long)]
    with_ways: bool,
}

fn run(opt: Opt) -> Result<()> {
    info!("Launching gtfs2osm...");

    let mut configuration = read_config(opt.config)?;
    if let Some(network) = opt.network {
        configuration.network = network;
    }
    if let Some(operator) = opt.operator {
        configuration.operator = operator;
    }
    configuration.with_ways |= opt.with_ways;

    let report = osm_transit::generate_relations(
        opt.gtfs,
        opt.osm,
        opt.osm_network.as_deref(),
        opt.output,
        &configuration,
        &DefaultTripNamePolicy,
    )?;
    if report.has_errors() {
        info!("Some objects have been skipped, see report.json for details");
    }
    Ok(())
}

fn init_logger() {
    let default_level = LevelFilter::INFO;
    let rust_log =
        std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_else(|_| default_level.to_string());
    let env_filter_subscriber = EnvFilter::try_new(rust_log).unwrap_or_else(|e| {
        eprintln!(
            "invalid {}, falling back to level '{}' - {}",
            EnvFilter::DEFAULT_ENV,
            default_level,
            e,
        );
        EnvFilter::new(default_level.to_string())
    });
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter_subscriber)
        .init();
}

fn main() {
    init_logger();
    if let Err(err) = run(Opt::parse()) {
        for cause in err.chain() {
            eprintln!("{}", cause);
        }
        std::process::exit(1);
    }
}
