use std::io;

use super::{emit_opcodes, emit_property_type, emit_simple_type, indent};
use crate::plan::Plan;
use crate::protocol::*;

// emit_type
fn emit_type<W: io::Write>(w: &mut W, arg: &Arg) -> io::Result<()> {
    emit_simple_type(w, &arg.r#type, true)
}

fn emit_enums<W: io::Write>(w: &mut W, interface: &Interface) -> io::Result<()> {
    let upper = interface.uppercase_name();
    for e in interface.enums.iter() {
        let guard = format!("{upper}_{}_ENUM", e.name.to_ascii_uppercase());
        write!(w, "#ifndef {guard}\n")?;
        write!(w, "#define {guard}\n")?;
        write!(w, "enum {}_{} {{\n", interface.name, e.name)?;
        for entry in e.entries.iter() {
            write!(
                w,
                "\t{upper}_{}_{} = {},\n",
                e.name.to_ascii_uppercase(),
                entry.name.to_ascii_uppercase(),
                entry.value
            )?;
        }
        write!(w, "}};\n")?;
        write!(w, "#endif /* {guard} */\n\n")?;
    }
    Ok(())
}

// server: the table of request handlers a resource implements.
// client: the table of event handlers a proxy listens with.
fn emit_structs<W: io::Write>(
    w: &mut W,
    interface: &Interface,
    kind: MessageKind,
) -> io::Result<()> {
    let messages = interface.messages(kind);
    if messages.is_empty() {
        return Ok(());
    }

    let server = kind == MessageKind::Request;
    let suffix = if server { "interface" } else { "listener" };
    write!(w, "struct {}_{suffix} {{\n", interface.name)?;

    for msg in messages.iter() {
        let n = msg.name.len() + 17;
        write!(w, "\tvoid (*{})(", msg.name)?;
        if server {
            write!(w, "struct wl_client *client,\n")?;
            write!(w, "{}struct wl_resource *resource", indent(n))?;
        } else {
            write!(w, "void *data,\n")?;
            write!(w, "{}struct {} *{}", indent(n), interface.name, interface.name)?;
        }

        for arg in msg.args.iter() {
            write!(w, ",\n{}", indent(n))?;
            match arg.r#type {
                ArgType::Object(_) if server => write!(w, "struct wl_resource *")?,
                _ => emit_type(w, arg)?,
            }
            write!(w, "{}", arg.name)?;
        }

        write!(w, ");\n")?;
    }

    write!(w, "}};\n\n")?;

    if !server {
        let name = &interface.name;
        write!(w, "static inline int\n")?;
        write!(w, "{name}_add_listener(struct {name} *{name},\n")?;
        write!(
            w,
            "{}const struct {name}_listener *listener, void *data)\n",
            indent(17 + name.len())
        )?;
        write!(w, "{{\n")?;
        write!(w, "\treturn wl_proxy_add_listener((struct wl_proxy *) {name},\n")?;
        write!(w, "{}(void (**)(void)) listener, data);\n", indent(37))?;
        write!(w, "}}\n\n")?;
    }

    Ok(())
}

fn emit_property_prototypes<W: io::Write>(w: &mut W, interface: &Interface) -> io::Result<()> {
    let name = &interface.name;
    for property in interface.properties.iter() {
        emit_property_type(w, &property.r#type, true)?;
        write!(w, "{name}_get_{}(struct {name} *{name});\n", property.name)?;

        if property.writable {
            write!(w, "void {name}_set_{}(struct {name} *{name}, ", property.name)?;
            emit_property_type(w, &property.r#type, true)?;
            write!(w, "value);\n")?;
        }
        write!(w, "\n")?;
    }
    Ok(())
}

fn emit_stubs<W: io::Write>(w: &mut W, interface: &Interface) -> io::Result<()> {
    let name = &interface.name;
    let upper = interface.uppercase_name();

    write!(w, "static inline void\n")?;
    write!(w, "{name}_set_user_data(struct {name} *{name}, void *user_data)\n")?;
    write!(w, "{{\n")?;
    write!(w, "\twl_proxy_set_user_data((struct wl_proxy *) {name}, user_data);\n")?;
    write!(w, "}}\n\n")?;

    write!(w, "static inline void *\n")?;
    write!(w, "{name}_get_user_data(struct {name} *{name})\n")?;
    write!(w, "{{\n")?;
    write!(w, "\treturn wl_proxy_get_user_data((struct wl_proxy *) {name});\n")?;
    write!(w, "}}\n\n")?;

    if interface.has_destructor() {
        write!(w, "void _{name}_proxy_destroy(struct {name} *{name});\n\n")?;
    } else {
        write!(w, "void {name}_destroy(struct {name} *{name});\n\n")?;
    }

    for msg in interface.requests.iter() {
        // hand written, or a property setter emitted as an accessor instead
        if msg.client_custom || msg.property.is_some() {
            continue;
        }

        let ret = msg.new_id().and_then(|arg| {
            let interface = arg.r#type.interface()?;
            Some((arg.name.as_str(), interface))
        });

        write!(w, "static inline ")?;
        match ret {
            Some((_, ret_interface)) => write!(w, "struct {ret_interface} *\n")?,
            None => write!(w, "void\n")?,
        }

        write!(w, "{name}_{}(struct {name} *{name}", msg.name)?;
        for arg in msg.args.iter() {
            if let ArgType::NewId(_) = arg.r#type {
                continue;
            }
            write!(w, ", ")?;
            emit_type(w, arg)?;
            write!(w, "{}", arg.name)?;
        }
        write!(w, ")\n")?;
        write!(w, "{{\n")?;

        if let Some((ret_name, ret_interface)) = ret {
            write!(w, "\tstruct {ret_interface} *{ret_name};\n\n")?;
            write!(
                w,
                "\t{ret_name} = _{ret_interface}_proxy_create(wl_proxy_get_display((struct wl_proxy *) {name}));\n"
            )?;
            write!(w, "\tif (!{ret_name})\n")?;
            write!(w, "\t\treturn NULL;\n\n")?;
        }

        write!(w, "\twl_proxy_marshal((struct wl_proxy *) {name},\n")?;
        write!(w, "\t\t\t {upper}_{}", msg.name.to_ascii_uppercase())?;
        for arg in msg.args.iter() {
            write!(w, ", {}", arg.name)?;
        }
        write!(w, ");\n")?;

        if msg.destructor {
            write!(w, "\n\t_{name}_proxy_destroy({name});\n")?;
        }

        if let Some((ret_name, ret_interface)) = ret {
            write!(w, "\n\treturn (struct {ret_interface} *) {ret_name};\n")?;
        }

        write!(w, "}}\n\n")?;
    }

    Ok(())
}

fn emit_constructor_prototypes<W: io::Write>(w: &mut W, protocol: &Protocol) -> io::Result<()> {
    for interface in protocol.interfaces.iter() {
        let name = &interface.name;
        if interface.client_global {
            let n = 2 * name.len() + "struct  *_bind(".len();
            write!(w, "struct {name} *{name}_bind(struct wl_display *display,\n")?;
            write!(w, "{}uint32_t name);\n", indent(n))?;
        } else {
            write!(w, "struct {name} *_{name}_proxy_create(struct wl_display *display);\n")?;
        }
    }
    write!(w, "\n")
}

pub(super) fn emit_header<W: io::Write>(
    w: &mut W,
    protocol: &Protocol,
    plan: &Plan,
    server: bool,
) -> io::Result<()> {
    let guard = format!(
        "{}_{}_PROTOCOL_H",
        protocol.uppercase_name(),
        if server { "SERVER" } else { "CLIENT" }
    );

    write!(w, "#ifndef {guard}\n")?;
    write!(w, "#define {guard}\n\n")?;
    write!(w, "#ifdef  __cplusplus\n")?;
    write!(w, "extern \"C\" {{\n")?;
    write!(w, "#endif\n\n")?;
    write!(w, "#include <stdint.h>\n")?;
    write!(w, "#include <stddef.h>\n")?;
    write!(w, "#include \"wayland-util.h\"\n\n")?;
    write!(w, "struct wl_client;\n")?;
    write!(w, "struct wl_resource;\n\n")?;

    for interface in protocol.interfaces.iter() {
        write!(w, "struct {};\n", interface.name)?;
    }
    write!(w, "\n")?;

    for interface in protocol.interfaces.iter() {
        write!(w, "extern const struct wl_interface {}_interface;\n", interface.name)?;
    }
    write!(w, "\n")?;

    if !server {
        emit_constructor_prototypes(w, protocol)?;
    }

    for (index, interface) in protocol.interfaces.iter().enumerate() {
        if server {
            emit_enums(w, interface)?;
            emit_structs(w, interface, MessageKind::Request)?;
            emit_opcodes(w, plan, index, interface, MessageKind::Event)?;
        } else {
            emit_enums(w, interface)?;
            emit_structs(w, interface, MessageKind::Event)?;
            emit_property_prototypes(w, interface)?;
            emit_opcodes(w, plan, index, interface, MessageKind::Request)?;
            // hand written ones still need the listener and opcodes above
            if !interface.client_custom {
                emit_stubs(w, interface)?;
            }
        }
    }

    write!(w, "#ifdef  __cplusplus\n")?;
    write!(w, "}}\n")?;
    write!(w, "#endif\n\n")?;
    write!(w, "#endif\n")
}
