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

use crate::Result;
use anyhow::anyhow;
use quick_xml::events::BytesStart;
use std::str::FromStr;

/// Try to get an attribute of a [BytesStart](quick_xml::events::BytesStart)
/// and returns a [Result](crate::Result) instead of an [Option](Option)
pub trait TryAttribute {
    /// Try to get an attribute from its name and return a [Result](crate::Result)
    fn try_attribute<F>(&self, attr_name: &str) -> Result<F>
    where
        F: FromStr;

    /// Get an attribute from its name if present and return a [Option](std::option::Option)
    fn attribute<F>(&self, attr_name: &str) -> Option<F>
    where
        F: FromStr,
    {
        self.try_attribute(attr_name).ok()
    }
}

impl TryAttribute for BytesStart<'_> {
    fn try_attribute<F>(&self, attr_name: &str) -> Result<F>
    where
        F: FromStr,
    {
        let attribute = self.try_get_attribute(attr_name)?.ok_or_else(|| {
            anyhow!(
                "Failed to find attribute '{}' in element '{}'",
                attr_name,
                String::from_utf8_lossy(self.name().as_ref())
            )
        })?;
        let value = attribute.unescape_value()?;
        value
            .parse()
            .map_err(|_| anyhow!("Failed to parse and convert '{}'", value))
    }
}
