#![allow(clippy::write_with_newline)] // this lint is dumb

mod client;
mod code;
mod header;

use std::io;

use crate::plan::Plan;
use crate::protocol::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Mode {
    ClientHeader,
    ServerHeader,
    /// opcode tables, type table and interface descriptors shared by client and server.
    #[value(alias = "shared-code")]
    Code,
    /// proxy structs, constructors, destructors and property accessors.
    ClientCode,
}

/// continuation-line indentation: tabs for every 8 columns, spaces for the rest.
fn indent(n: usize) -> String {
    let mut s = "\t".repeat(n / 8);
    s.push_str(&" ".repeat(n % 8));
    s
}

fn emit_copyright<W: io::Write>(w: &mut W, copyright: &str) -> io::Result<()> {
    // drop the indentation in front of the closing tag and the last newline
    let body = copyright.trim_end_matches([' ', '\t']);
    let body = body.strip_suffix('\n').unwrap_or(body);

    for (i, line) in body.split('\n').enumerate() {
        let prefix = if i == 0 { "/*" } else { " *" };
        let line = line.trim_start_matches([' ', '\t']);
        if line.is_empty() {
            write!(w, "{prefix}\n")?;
        } else {
            write!(w, "{prefix} {line}\n")?;
        }
    }
    write!(w, " */\n\n")
}

// emit_simple_type
fn emit_simple_type<W: io::Write>(w: &mut W, r#type: &ArgType, is_const: bool) -> io::Result<()> {
    match r#type {
        ArgType::Int | ArgType::Fd => write!(w, "int32_t "),
        ArgType::Uint | ArgType::NewId(_) => write!(w, "uint32_t "),
        ArgType::String if is_const => write!(w, "const char *"),
        ArgType::String => write!(w, "char *"),
        ArgType::Double => write!(w, "double "),
        ArgType::Array => write!(w, "struct wl_array *"),
        ArgType::Object(interface) => write!(w, "struct {interface} *"),
    }
}

fn emit_property_type<W: io::Write>(
    w: &mut W,
    r#type: &PropertyType,
    is_const: bool,
) -> io::Result<()> {
    match r#type {
        PropertyType::Flags => emit_simple_type(w, &ArgType::Uint, is_const),
        PropertyType::Arg(r#type) => emit_simple_type(w, r#type, is_const),
    }
}

fn is_string(property: &Property) -> bool {
    property.r#type == PropertyType::Arg(ArgType::String)
}

fn emit_opcodes<W: io::Write>(
    w: &mut W,
    plan: &Plan,
    index: usize,
    interface: &Interface,
    kind: MessageKind,
) -> io::Result<()> {
    let messages = interface.messages(kind);
    if messages.is_empty() {
        return Ok(());
    }

    let upper = interface.uppercase_name();
    for (msg, msg_plan) in messages.iter().zip(plan.interfaces[index].messages(kind)) {
        write!(
            w,
            "#define {upper}_{}\t{}\n",
            msg.name.to_ascii_uppercase(),
            msg_plan.opcode
        )?;
    }

    write!(w, "\n")
}

/// renders one of the four outputs. the protocol must have been planned with [`Plan::new`].
pub fn generate_protocol<W: io::Write>(
    w: &mut W,
    protocol: &Protocol,
    plan: &Plan,
    mode: Mode,
) -> io::Result<()> {
    log::debug!("[generate] {} as {mode:?}", protocol.name);

    if let Some(copyright) = protocol.copyright.as_deref() {
        emit_copyright(w, copyright)?;
    }

    match mode {
        Mode::ClientHeader => header::emit_header(w, protocol, plan, false),
        Mode::ServerHeader => header::emit_header(w, protocol, plan, true),
        Mode::Code => code::emit_code(w, protocol, plan),
        Mode::ClientCode => client::emit_client_code(w, protocol),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn render(protocol: &Protocol, mode: Mode) -> String {
        let plan = Plan::new(protocol);
        let mut out = Vec::new();
        generate_protocol(&mut out, protocol, &plan, mode).unwrap();
        String::from_utf8(out).unwrap()
    }

    pub(crate) fn msg(name: &str, args: Vec<Arg>) -> Message {
        Message {
            name: name.to_string(),
            args,
            ..Default::default()
        }
    }

    /// a compositor-ish protocol with every feature the emitters care about.
    pub(crate) fn protocol() -> Protocol {
        Protocol {
            name: "shell".to_string(),
            copyright: None,
            interfaces: vec![
                Interface {
                    name: "wl_display".to_string(),
                    version: 1,
                    client_custom: true,
                    requests: vec![msg("sync", vec![Arg::new(
                        "callback",
                        ArgType::NewId("wl_callback".to_string()),
                    )])],
                    events: vec![msg("error", vec![
                        Arg::new("code", ArgType::Uint),
                        Arg::new("message", ArgType::String),
                    ])],
                    enums: vec![Enum {
                        name: "error".to_string(),
                        entries: vec![Entry {
                            name: "invalid_object".to_string(),
                            value: "0".to_string(),
                        }],
                    }],
                    ..Default::default()
                },
                Interface {
                    name: "wl_compositor".to_string(),
                    version: 1,
                    client_global: true,
                    requests: vec![msg("create_surface", vec![Arg::new(
                        "id",
                        ArgType::NewId("wl_surface".to_string()),
                    )])],
                    ..Default::default()
                },
                Interface {
                    name: "wl_surface".to_string(),
                    version: 1,
                    requests: vec![
                        Message {
                            destructor: true,
                            ..msg("destroy", vec![])
                        },
                        msg("attach", vec![
                            Arg::new("buffer", ArgType::Object("wl_buffer".to_string())),
                            Arg::new("x", ArgType::Int),
                            Arg::new("y", ArgType::Int),
                        ]),
                        Message {
                            name: "set_title".to_string(),
                            args: vec![Arg::new("value", ArgType::String)],
                            property: Some(0),
                            ..Default::default()
                        },
                        Message {
                            name: "set_state".to_string(),
                            args: vec![
                                Arg::new("value", ArgType::Uint),
                                Arg::new("change_mask", ArgType::Uint),
                            ],
                            property: Some(1),
                            ..Default::default()
                        },
                    ],
                    events: vec![
                        msg("enter", vec![Arg::new(
                            "output",
                            ArgType::Object("wl_output".to_string()),
                        )]),
                        Message {
                            name: "title_notify".to_string(),
                            args: vec![Arg::new("value", ArgType::String)],
                            property: Some(0),
                            ..Default::default()
                        },
                        Message {
                            name: "state_notify".to_string(),
                            args: vec![
                                Arg::new("value", ArgType::Uint),
                                Arg::new("change_mask", ArgType::Uint),
                            ],
                            property: Some(1),
                            ..Default::default()
                        },
                    ],
                    enums: vec![Enum {
                        name: "error".to_string(),
                        entries: vec![
                            Entry {
                                name: "invalid_scale".to_string(),
                                value: "0".to_string(),
                            },
                            Entry {
                                name: "invalid_transform".to_string(),
                                value: "0x1".to_string(),
                            },
                        ],
                    }],
                    properties: vec![
                        Property {
                            name: "title".to_string(),
                            r#type: PropertyType::Arg(ArgType::String),
                            writable: true,
                            change_notify: true,
                        },
                        Property {
                            name: "state".to_string(),
                            r#type: PropertyType::Flags,
                            writable: true,
                            change_notify: true,
                        },
                        Property {
                            name: "scale".to_string(),
                            r#type: PropertyType::Arg(ArgType::Int),
                            writable: false,
                            change_notify: false,
                        },
                    ],
                    ..Default::default()
                },
                Interface {
                    name: "wl_callback".to_string(),
                    version: 1,
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(5), "     ");
        assert_eq!(indent(17), "\t\t ");
    }

    #[test]
    fn copyright_block() {
        let mut out = Vec::new();
        emit_copyright(&mut out, "\n    Copyright 2011 Someone\n\n    All rights.\n  ").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "/*\n * Copyright 2011 Someone\n *\n * All rights.\n */\n\n"
        );
    }

    #[test]
    fn copyright_comes_first() {
        let protocol = Protocol {
            copyright: Some("Copyright 2011".to_string()),
            ..protocol()
        };
        for mode in [Mode::ClientHeader, Mode::ServerHeader, Mode::Code, Mode::ClientCode] {
            assert!(render(&protocol, mode).starts_with("/* Copyright 2011\n */\n\n"));
        }
    }

    #[test]
    fn output_is_deterministic() {
        let protocol = protocol();
        for mode in [Mode::ClientHeader, Mode::ServerHeader, Mode::Code, Mode::ClientCode] {
            assert_eq!(render(&protocol, mode), render(&protocol, mode));
        }
    }

    #[test]
    fn simple_types() {
        let mut out = Vec::new();
        emit_simple_type(&mut out, &ArgType::String, true).unwrap();
        emit_simple_type(&mut out, &ArgType::String, false).unwrap();
        emit_simple_type(&mut out, &ArgType::Object("wl_output".to_string()), true).unwrap();
        emit_property_type(&mut out, &PropertyType::Flags, true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "const char *char *struct wl_output *uint32_t "
        );
    }
}
