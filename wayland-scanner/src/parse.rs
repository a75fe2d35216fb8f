use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::NsReader;

use crate::builder::{Attributes, Builder, Element};
use crate::error::{ModelError, ScanError};
use crate::protocol::Protocol;

pub const WAYLAND_NS: &[u8] = b"http://wayland.freedesktop.org/protocol";
pub const WAYLAND_CLIENT_NS: &[u8] = b"http://wayland.freedesktop.org/protocol/client";

/// line of a byte position. positions only ever move forward, so each byte is counted once.
struct LineCursor {
    pos: usize,
    line: usize,
}

impl LineCursor {
    fn new() -> Self {
        Self { pos: 0, line: 1 }
    }

    fn advance(&mut self, input: &[u8], pos: usize) -> usize {
        let pos = pos.min(input.len());
        if pos > self.pos {
            self.line += input[self.pos..pos].iter().filter(|&&b| b == b'\n').count();
            self.pos = pos;
        }
        self.line
    }
}

// documents without a default namespace are accepted as well.
fn is_protocol_ns(ns: &ResolveResult) -> bool {
    match ns {
        ResolveResult::Bound(Namespace(ns)) => *ns == WAYLAND_NS,
        ResolveResult::Unbound => true,
        ResolveResult::Unknown(_) => false,
    }
}

fn is_client_ns(ns: &ResolveResult) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(ns)) if *ns == WAYLAND_CLIENT_NS)
}

enum AttributeError {
    Attr(quick_xml::events::attributes::AttrError),
    Xml(quick_xml::Error),
}

fn read_attributes(
    reader: &NsReader<&[u8]>,
    start: &BytesStart,
) -> Result<Attributes, AttributeError> {
    let mut attrs = Attributes::default();
    for attr in start.attributes() {
        let attr = attr.map_err(AttributeError::Attr)?;
        let value = attr.unescape_value().map_err(AttributeError::Xml)?;
        let (ns, local_name) = reader.resolve_attribute(attr.key);
        let yes = value == "yes";

        if is_client_ns(&ns) {
            match local_name.as_ref() {
                b"custom" => attrs.client_custom = yes,
                b"global" => attrs.client_global = yes,
                _ => {}
            }
            continue;
        }

        match local_name.as_ref() {
            b"name" => attrs.name = Some(value.into_owned()),
            b"version" => attrs.version = Some(value.into_owned()),
            b"type" => attrs.r#type = Some(value.into_owned()),
            b"value" => attrs.value = Some(value.into_owned()),
            b"interface" => attrs.interface = Some(value.into_owned()),
            b"writable" => attrs.writable = yes,
            b"change-notify" => attrs.change_notify = yes,
            _ => {}
        }
    }
    Ok(attrs)
}

/// reads a complete protocol document and builds the model, property messages included.
///
/// `filename` is only used in error messages.
pub fn parse_protocol(input: &[u8], filename: &str) -> Result<Protocol, ScanError> {
    let mut reader = NsReader::from_reader(input);
    reader.config_mut().expand_empty_elements = true;

    let mut builder = Builder::new();
    let mut cursor = LineCursor::new();

    loop {
        let line = cursor.advance(input, reader.buffer_position() as usize);
        let model_err = |error: ModelError| ScanError::Model {
            filename: filename.to_string(),
            line,
            error,
        };

        let (ns, event) = reader
            .read_resolved_event()
            .map_err(|source| ScanError::Xml {
                filename: filename.to_string(),
                line,
                source,
            })?;
        let known = is_protocol_ns(&ns);

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                let element = match known {
                    true => Element::from_local_name(start.local_name().as_ref()),
                    false => Element::Unknown,
                };
                let attrs = read_attributes(&reader, &start).map_err(|err| match err {
                    AttributeError::Attr(source) => ScanError::Attribute {
                        filename: filename.to_string(),
                        line,
                        source,
                    },
                    AttributeError::Xml(source) => ScanError::Xml {
                        filename: filename.to_string(),
                        line,
                        source,
                    },
                })?;
                builder.start_element(element, attrs).map_err(model_err)?;
            }
            Event::End(end) => {
                let element = match known {
                    true => Element::from_local_name(end.local_name().as_ref()),
                    false => Element::Unknown,
                };
                builder.end_element(element).map_err(model_err)?;
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|source| ScanError::Xml {
                    filename: filename.to_string(),
                    line,
                    source,
                })?;
                builder.character_data(&text);
            }
            Event::CData(cdata) => builder.character_data(&String::from_utf8_lossy(&cdata)),
            _ => {}
        }
    }

    let line = cursor.advance(input, input.len());
    let protocol = builder.finish().map_err(|error| ScanError::Model {
        filename: filename.to_string(),
        line,
        error,
    })?;

    log::debug!(
        "[parse] {filename}: protocol {} with {} interfaces",
        protocol.name,
        protocol.interfaces.len()
    );

    Ok(protocol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::*;

    const SURFACE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<protocol name="surface"
          xmlns="http://wayland.freedesktop.org/protocol"
          xmlns:client="http://wayland.freedesktop.org/protocol/client">
  <copyright>
    Copyright &#169; 2011 Someone &amp; Co
  </copyright>

  <interface name="wl_display" version="1" client:custom="yes">
    <request name="sync">
      <arg name="callback" type="new_id" interface="wl_callback"/>
    </request>
  </interface>

  <interface name="wl_surface" version="2" client:global="yes">
    <request name="destroy" type="destructor"/>
    <request name="attach">
      <arg name="buffer" type="object" interface="wl_buffer"/>
      <arg name="x" type="int"/>
      <arg name="y" type="int"/>
    </request>
    <event name="enter">
      <arg name="output" type="object" interface="wl_output"/>
    </event>
    <enum name="error">
      <entry name="invalid_scale" value="0"/>
      <entry name="invalid_transform" value="0x1"/>
    </enum>
    <property name="title" type="string" writable="yes" change-notify="yes"/>
  </interface>
</protocol>
"#;

    #[test]
    fn parse_namespaced_document() {
        let protocol = parse_protocol(SURFACE.as_bytes(), "surface.xml").unwrap();
        assert_eq!(protocol.name, "surface");
        assert_eq!(
            protocol.copyright.as_deref().map(str::trim),
            Some("Copyright \u{a9} 2011 Someone & Co")
        );

        let display = &protocol.interfaces[0];
        assert!(display.client_custom);
        assert!(!display.client_global);
        assert_eq!(
            display.requests[0].args[0].r#type,
            ArgType::NewId("wl_callback".to_string())
        );

        let surface = &protocol.interfaces[1];
        assert_eq!(surface.version, 2);
        assert!(surface.client_global);
        assert!(!surface.client_custom);
        let names: Vec<_> = surface.requests.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["destroy", "attach", "set_title"]);
        let names: Vec<_> = surface.events.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["enter", "title_notify"]);
        assert_eq!(surface.enums[0].entries[1].value, "0x1");
        assert_eq!(surface.properties[0].r#type, PropertyType::Arg(ArgType::String));
    }

    #[test]
    fn plain_document() {
        const PLAIN: &str = r#"<protocol name="plain">
  <interface name="wl_callback" version="1">
    <event name="done"/>
  </interface>
</protocol>"#;
        let protocol = parse_protocol(PLAIN.as_bytes(), "plain.xml").unwrap();
        assert_eq!(protocol.interfaces[0].events[0].name, "done");
        assert!(protocol.copyright.is_none());
    }

    #[test]
    fn foreign_namespace_is_ignored() {
        const FOREIGN: &str = r#"<protocol name="foreign" xmlns:x="urn:other">
  <x:interface name="ignored"/>
  <interface name="wl_callback" version="1"/>
</protocol>"#;
        let protocol = parse_protocol(FOREIGN.as_bytes(), "foreign.xml").unwrap();
        assert_eq!(protocol.interfaces.len(), 1);
        assert_eq!(protocol.interfaces[0].name, "wl_callback");
    }

    #[test]
    fn errors_carry_the_line() {
        const BROKEN: &str = r#"<protocol name="broken">
  <interface name="wl_surface" version="1">
    <request name="destroy"/>
  </interface>
</protocol>"#;
        let err = parse_protocol(BROKEN.as_bytes(), "<stdin>").unwrap_err();
        match err {
            ScanError::Model { line, error, .. } => {
                assert_eq!(line, 3);
                assert_eq!(error, ModelError::DestroyNotDestructor);
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn missing_version() {
        const NO_VERSION: &str = r#"<protocol name="x">
<interface name="wl_surface"/>
</protocol>"#;
        let err = parse_protocol(NO_VERSION.as_bytes(), "x.xml").unwrap_err();
        assert_eq!(err.to_string(), "x.xml:2: no interface version given");
    }

    #[test]
    fn line_cursor() {
        let input = b"a\nb\n\nc";
        let mut cursor = LineCursor::new();
        assert_eq!(cursor.advance(input, 0), 1);
        assert_eq!(cursor.advance(input, 2), 2);
        assert_eq!(cursor.advance(input, 2), 2);
        assert_eq!(cursor.advance(input, 100), 4);
    }

    #[test]
    fn large_document_reports_late_line() {
        let mut doc = String::from("<protocol name=\"big\">\n");
        for i in 0..5000 {
            doc.push_str(&format!(
                "<interface name=\"wl_i{i}\" version=\"1\">\n<event name=\"done\"/>\n</interface>\n"
            ));
        }
        let ok = format!("{doc}</protocol>\n");
        let protocol = parse_protocol(ok.as_bytes(), "big.xml").unwrap();
        assert_eq!(protocol.interfaces.len(), 5000);

        // 1 + 5000 * 3 lines precede the broken interface
        doc.push_str("<interface name=\"wl_late\"/>\n</protocol>\n");
        let err = parse_protocol(doc.as_bytes(), "big.xml").unwrap_err();
        assert_eq!(err.to_string(), "big.xml:15002: no interface version given");
    }

    #[test]
    fn malformed_xml() {
        let err = parse_protocol(b"<protocol name=\"x\"><unknown></protocol>", "x.xml")
            .unwrap_err();
        assert!(matches!(err, ScanError::Xml { .. }));
    }

    #[test]
    fn no_protocol_element() {
        let err = parse_protocol(b"<nothing/>", "x.xml").unwrap_err();
        assert!(matches!(
            err,
            ScanError::Model {
                error: ModelError::NoProtocol,
                ..
            }
        ));
    }
}
