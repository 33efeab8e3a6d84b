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

//! Cleaning of the trip names before they are used as the `direction` of a
//! relation. Each network writes its headsigns its own way, so the policy is
//! given to the generator rather than hard-coded.

/// Turns a raw GTFS `trip_headsign` into the value of the `direction` tag
pub trait TripNamePolicy {
    /// Cleaned version of `name`
    fn fix_trip_name(&self, name: &str) -> String;
}

impl<F> TripNamePolicy for F
where
    F: Fn(&str) -> String,
{
    fn fix_trip_name(&self, name: &str) -> String {
        self(name)
    }
}

/// Trims the name and collapses inner runs of whitespaces
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultTripNamePolicy;

impl TripNamePolicy for DefaultTripNamePolicy {
    fn fix_trip_name(&self, name: &str) -> String {
        name.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Capitalizes each word of a name written in upper case (`PIAZZA CASTELLO`
/// becomes `Piazza Castello`), a name with lower case letters is only
/// cleaned like [DefaultTripNamePolicy] does.
#[derive(Debug, Default, Clone, Copy)]
pub struct CapitalizedTripNamePolicy;

impl TripNamePolicy for CapitalizedTripNamePolicy {
    fn fix_trip_name(&self, name: &str) -> String {
        let name = DefaultTripNamePolicy.fix_trip_name(name);
        if name.chars().any(char::is_lowercase) {
            return name;
        }
        name.split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}
