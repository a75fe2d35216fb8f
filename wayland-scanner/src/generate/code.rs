use std::io;

use crate::plan::{Plan, TypeSlot};
use crate::protocol::*;

fn emit_types<W: io::Write>(w: &mut W, plan: &Plan) -> io::Result<()> {
    write!(w, "static const struct wl_interface *types[] = {{\n")?;
    if plan.types.is_empty() {
        write!(w, "\tNULL,\n")?;
    }
    for slot in plan.types.iter() {
        match slot {
            TypeSlot::Null => write!(w, "\tNULL,\n")?,
            TypeSlot::Interface(interface) => write!(w, "\t&{interface}_interface,\n")?,
        }
    }
    write!(w, "}};\n\n")
}

fn emit_messages<W: io::Write>(
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

    write!(
        w,
        "static const struct wl_message {}_{}s[] = {{\n",
        interface.name,
        kind.as_str()
    )?;
    for (msg, msg_plan) in messages.iter().zip(plan.interfaces[index].messages(kind)) {
        write!(
            w,
            "\t{{ \"{}\", \"{}\", types + {} }},\n",
            msg.name, msg_plan.signature, msg_plan.type_offset
        )?;
    }
    write!(w, "}};\n\n")
}

fn emit_message_count<W: io::Write>(
    w: &mut W,
    interface: &Interface,
    kind: MessageKind,
) -> io::Result<()> {
    if interface.messages(kind).is_empty() {
        write!(w, "\t0, NULL,\n")
    } else {
        let table = format!("{}_{}s", interface.name, kind.as_str());
        write!(w, "\tARRAY_LENGTH({table}), {table},\n")
    }
}

pub(super) fn emit_code<W: io::Write>(w: &mut W, protocol: &Protocol, plan: &Plan) -> io::Result<()> {
    write!(w, "#include <stdlib.h>\n")?;
    write!(w, "#include <stdint.h>\n")?;
    write!(w, "#include \"wayland-util.h\"\n\n")?;

    for interface in plan.forward_declarations.iter() {
        write!(w, "extern const struct wl_interface {interface}_interface;\n")?;
    }
    write!(w, "\n")?;

    emit_types(w, plan)?;

    for (index, interface) in protocol.interfaces.iter().enumerate() {
        emit_messages(w, plan, index, interface, MessageKind::Request)?;
        emit_messages(w, plan, index, interface, MessageKind::Event)?;

        write!(w, "WL_EXPORT const struct wl_interface {}_interface = {{\n", interface.name)?;
        write!(w, "\t\"{}\", {},\n", interface.name, interface.version)?;
        emit_message_count(w, interface, MessageKind::Request)?;
        emit_message_count(w, interface, MessageKind::Event)?;
        write!(w, "}};\n\n")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::Mode;
    use super::super::tests::{protocol, render};
    use crate::protocol::Protocol;

    #[test]
    fn includes_and_forward_declarations() {
        let out = render(&protocol(), Mode::Code);
        assert!(out.starts_with(
            "#include <stdlib.h>\n\
             #include <stdint.h>\n\
             #include \"wayland-util.h\"\n\n\
             extern const struct wl_interface wl_callback_interface;\n\
             extern const struct wl_interface wl_surface_interface;\n\
             extern const struct wl_interface wl_buffer_interface;\n\
             extern const struct wl_interface wl_output_interface;\n\n"
        ));
    }

    #[test]
    fn type_table() {
        let out = render(&protocol(), Mode::Code);
        // null run of two (set_state, state_notify), then sync, create_surface, attach, enter
        assert!(out.contains(
            "static const struct wl_interface *types[] = {\n\
             \tNULL,\n\
             \tNULL,\n\
             \t&wl_callback_interface,\n\
             \t&wl_surface_interface,\n\
             \t&wl_buffer_interface,\n\
             \tNULL,\n\
             \tNULL,\n\
             \t&wl_output_interface,\n\
             };\n\n"
        ));
    }

    #[test]
    fn empty_type_table() {
        let protocol = Protocol {
            name: "empty".to_string(),
            ..Default::default()
        };
        let out = render(&protocol, Mode::Code);
        assert!(out.contains("static const struct wl_interface *types[] = {\n\tNULL,\n};\n\n"));
    }

    #[test]
    fn message_tables() {
        let out = render(&protocol(), Mode::Code);
        assert!(out.contains(
            "static const struct wl_message wl_surface_requests[] = {\n\
             \t{ \"destroy\", \"\", types + 0 },\n\
             \t{ \"attach\", \"oii\", types + 4 },\n\
             \t{ \"set_title\", \"s\", types + 0 },\n\
             \t{ \"set_state\", \"uu\", types + 0 },\n\
             };\n\n"
        ));
        assert!(out.contains(
            "static const struct wl_message wl_surface_events[] = {\n\
             \t{ \"enter\", \"o\", types + 7 },\n\
             \t{ \"title_notify\", \"s\", types + 0 },\n\
             \t{ \"state_notify\", \"uu\", types + 0 },\n\
             };\n\n"
        ));
        assert!(out.contains("\t{ \"sync\", \"n\", types + 2 },\n"));
    }

    #[test]
    fn interface_descriptors() {
        let out = render(&protocol(), Mode::Code);
        assert!(out.contains(
            "WL_EXPORT const struct wl_interface wl_surface_interface = {\n\
             \t\"wl_surface\", 1,\n\
             \tARRAY_LENGTH(wl_surface_requests), wl_surface_requests,\n\
             \tARRAY_LENGTH(wl_surface_events), wl_surface_events,\n\
             };\n\n"
        ));
        assert!(out.contains(
            "WL_EXPORT const struct wl_interface wl_callback_interface = {\n\
             \t\"wl_callback\", 1,\n\
             \t0, NULL,\n\
             \t0, NULL,\n\
             };\n\n"
        ));
        assert!(!out.contains("wl_callback_requests"));
        // custom only matters to the client
        assert!(out.contains("wl_display_interface = {\n"));
    }
}
