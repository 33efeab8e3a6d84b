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
use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

/// An element opening or closing, self-closing elements (`<nd ref="1"/>`)
/// are seen as an `Open` immediately followed by a `Close`.
pub enum XmlEvent<'a> {
    /// Start of an element with its attributes
    Open(&'a BytesStart<'a>),
    /// End of an element, with its name
    Close(&'a [u8]),
}

/// Stream over the elements of an XML document, calling `handler` on each
/// opening and closing. Text, comments and processing instructions are
/// ignored. Stops at the first error, either from the document (malformed
/// XML) or from the handler.
pub fn for_each_event<F>(content: &[u8], mut handler: F) -> Result<()>
where
    F: FnMut(XmlEvent<'_>) -> Result<()>,
{
    let mut reader = Reader::from_reader(content);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            anyhow!(
                "malformed XML at position {}: {}",
                reader.buffer_position(),
                e
            )
        })?;
        match event {
            Event::Start(element) => handler(XmlEvent::Open(&element))?,
            Event::Empty(element) => {
                handler(XmlEvent::Open(&element))?;
                handler(XmlEvent::Close(element.name().as_ref()))?;
            }
            Event::End(element) => handler(XmlEvent::Close(element.name().as_ref()))?,
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn trace(xml: &str) -> Result<Vec<String>> {
        let mut trace = Vec::new();
        for_each_event(xml.as_bytes(), |event| {
            match event {
                XmlEvent::Open(element) => trace.push(format!(
                    "+{}",
                    String::from_utf8_lossy(element.name().as_ref())
                )),
                XmlEvent::Close(name) => {
                    trace.push(format!("-{}", String::from_utf8_lossy(name)))
                }
            }
            Ok(())
        })?;
        Ok(trace)
    }

    #[test]
    fn empty_elements_are_closed() {
        let trace = trace(r#"<osm><node id="1"><tag k="a" v="b"/></node><way id="2"/></osm>"#)
            .unwrap();
        assert_eq!(
            vec!["+osm", "+node", "+tag", "-tag", "-node", "+way", "-way", "-osm"],
            trace
        );
    }

    #[test]
    fn mismatched_end_tag() {
        let error = trace(r#"<osm><node id="1"></way></osm>"#).unwrap_err();
        assert!(error.to_string().starts_with("malformed XML at position"));
    }

    #[test]
    fn handler_error_stops_the_walk() {
        let mut count = 0;
        let result = for_each_event(b"<osm><node/><node/></osm>", |event| {
            if let XmlEvent::Open(_) = event {
                count += 1;
                if count == 2 {
                    return Err(anyhow!("stop"));
                }
            }
            Ok(())
        });
        assert!(result.is_err());
        assert_eq!(2, count);
    }
}
