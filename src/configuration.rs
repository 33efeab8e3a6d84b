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
//! Configuration of the generation.

use crate::Result;
use anyhow::Context;
use serde::Deserialize;
use std::fs::File;
use std::path;
use tracing::info;

/// Values written in every generated relation, and generation options
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Configuration {
    /// Value of the `network` tag
    pub network: String,
    /// Value of the `operator` tag
    pub operator: String,
    /// Copy the way members of an already mapped relation with the same
    /// `ref` and the same stops
    pub with_ways: bool,
}

/// Read a JSON configuration file, missing fields get their default value.
/// Without a file, the default configuration is returned.
///
/// Below is an example of this file
/// ```text
/// {
///     "network": "GTT",
///     "operator": "Gruppo Torinese Trasporti",
///     "with_ways": false
/// }
/// ```
pub fn read_config<P: AsRef<path::Path>>(config_path: Option<P>) -> Result<Configuration> {
    match config_path {
        Some(config_path) => {
            let config_path = config_path.as_ref();
            info!("Reading configuration from {:?}", config_path);
            let json_config_file = File::open(config_path)
                .with_context(|| format!("Error reading {:?}", config_path))?;
            let configuration = serde_json::from_reader(json_config_file)
                .with_context(|| format!("Error reading {:?}", config_path))?;
            Ok(configuration)
        }
        None => Ok(Configuration::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_file_with_content, test_in_tmp_dir};
    use pretty_assertions::assert_eq;

    #[test]
    fn read_full_config() {
        test_in_tmp_dir(|path| {
            create_file_with_content(
                path,
                "config.json",
                r#"{"network": "GTT", "operator": "GTT S.p.A.", "with_ways": true}"#,
            );
            let configuration = read_config(Some(path.join("config.json"))).unwrap();
            assert_eq!(
                Configuration {
                    network: "GTT".to_string(),
                    operator: "GTT S.p.A.".to_string(),
                    with_ways: true,
                },
                configuration
            );
        });
    }

    #[test]
    fn read_partial_config() {
        test_in_tmp_dir(|path| {
            create_file_with_content(path, "config.json", r#"{"network": "GTT"}"#);
            let configuration = read_config(Some(path.join("config.json"))).unwrap();
            assert_eq!("GTT", configuration.network);
            assert_eq!("", configuration.operator);
            assert!(!configuration.with_ways);
        });
    }

    #[test]
    fn no_config() {
        let configuration = read_config(None::<&str>).unwrap();
        assert_eq!(Configuration::default(), configuration);
    }

    #[test]
    fn missing_config_file() {
        test_in_tmp_dir(|path| {
            let error = read_config(Some(path.join("config.json"))).unwrap_err();
            assert!(error.to_string().contains("config.json"));
        });
    }
}
