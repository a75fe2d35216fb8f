use std::io;

use super::{emit_property_type, is_string};
use crate::protocol::*;

fn emit_object_struct<W: io::Write>(w: &mut W, interface: &Interface) -> io::Result<()> {
    write!(w, "struct {} {{\n", interface.name)?;
    write!(w, "\tstruct wl_proxy parent;\n")?;
    for property in interface.properties.iter() {
        write!(w, "\t")?;
        emit_property_type(w, &property.r#type, false)?;
        write!(w, "{};\n", property.name)?;
    }
    write!(w, "}};\n\n")
}

fn has_property_listener(interface: &Interface) -> bool {
    !interface.properties.is_empty() && !interface.events.is_empty()
}

fn emit_property_listener<W: io::Write>(w: &mut W, interface: &Interface) -> io::Result<()> {
    if !has_property_listener(interface) {
        return Ok(());
    }

    let name = &interface.name;
    for property in interface.properties.iter().filter(|p| p.change_notify) {
        let field = &property.name;
        write!(w, "static void\n")?;
        write!(
            w,
            "{name}_handle_{field}_notify(void *data, struct {name} *{name}, "
        )?;
        match property.r#type {
            PropertyType::Flags => {
                write!(w, "uint32_t value, uint32_t change_mask)\n")?;
                write!(w, "{{\n")?;
                write!(
                    w,
                    "\t{name}->{field} = ({name}->{field} & ~change_mask) | (value & change_mask);\n"
                )?;
            }
            _ if is_string(property) => {
                write!(w, "const char *value)\n")?;
                write!(w, "{{\n")?;
                write!(w, "\tfree({name}->{field});\n")?;
                write!(w, "\t{name}->{field} = strdup(value);\n")?;
            }
            _ => {
                emit_property_type(w, &property.r#type, true)?;
                write!(w, "value)\n")?;
                write!(w, "{{\n")?;
                write!(w, "\t{name}->{field} = value;\n")?;
            }
        }
        write!(w, "}}\n\n")?;
    }

    write!(w, "static const struct {name}_listener {name}_property_listener = {{\n")?;
    for msg in interface.events.iter() {
        match msg.property {
            Some(_) => write!(w, "\t{name}_handle_{},\n", msg.name)?,
            None => write!(w, "\tNULL,\n")?,
        }
    }
    write!(w, "}};\n\n")
}

fn emit_constructor<W: io::Write>(w: &mut W, interface: &Interface) -> io::Result<()> {
    let name = &interface.name;

    write!(w, "WL_EXPORT struct {name} *\n")?;
    if interface.client_global {
        write!(w, "{name}_bind(struct wl_display *display, uint32_t name)\n")?;
        write!(w, "{{\n")?;
        write!(w, "\tstruct {name} *proxy;\n\n")?;
        write!(
            w,
            "\tproxy = (struct {name} *) wl_display_bind(display, name, &{name}_interface, sizeof(struct {name}));\n"
        )?;
    } else {
        write!(w, "_{name}_proxy_create(struct wl_display *display)\n")?;
        write!(w, "{{\n")?;
        write!(w, "\tstruct {name} *proxy;\n\n")?;
        write!(
            w,
            "\tproxy = (struct {name} *) wl_proxy_create(display, &{name}_interface, sizeof(struct {name}));\n"
        )?;
    }
    write!(w, "\tif (!proxy)\n")?;
    write!(w, "\t\treturn NULL;\n\n")?;

    for property in interface.properties.iter() {
        let zero = match property.r#type {
            PropertyType::Arg(ArgType::String | ArgType::Object(_) | ArgType::Array) => "NULL",
            _ => "0",
        };
        write!(w, "\tproxy->{} = {zero};\n", property.name)?;
    }
    if !interface.properties.is_empty() {
        write!(w, "\n")?;
    }

    if has_property_listener(interface) {
        write!(w, "\t{name}_add_listener(proxy, &{name}_property_listener, NULL);\n\n")?;
    }

    write!(w, "\treturn proxy;\n")?;
    write!(w, "}}\n\n")
}

fn emit_destructor<W: io::Write>(w: &mut W, interface: &Interface) -> io::Result<()> {
    let name = &interface.name;

    write!(w, "WL_EXPORT void\n")?;
    if interface.has_destructor() {
        write!(w, "_{name}_proxy_destroy(struct {name} *{name})\n")?;
    } else {
        write!(w, "{name}_destroy(struct {name} *{name})\n")?;
    }
    write!(w, "{{\n")?;

    for property in interface.properties.iter().filter(|p| is_string(p)) {
        write!(w, "\tfree({name}->{});\n", property.name)?;
        write!(w, "\t{name}->{} = NULL;\n\n", property.name)?;
    }

    write!(w, "\twl_proxy_destroy((struct wl_proxy *) {name});\n")?;
    write!(w, "}}\n\n")
}

fn emit_accessors<W: io::Write>(w: &mut W, interface: &Interface) -> io::Result<()> {
    let name = &interface.name;
    let upper = interface.uppercase_name();

    for property in interface.properties.iter() {
        let field = &property.name;

        write!(w, "WL_EXPORT ")?;
        emit_property_type(w, &property.r#type, true)?;
        write!(w, "\n")?;
        write!(w, "{name}_get_{field}(struct {name} *{name})\n")?;
        write!(w, "{{\n")?;
        write!(w, "\treturn {name}->{field};\n")?;
        write!(w, "}}\n\n")?;

        if !property.writable {
            continue;
        }

        write!(w, "WL_EXPORT void\n")?;
        write!(w, "{name}_set_{field}(struct {name} *{name}, ")?;
        emit_property_type(w, &property.r#type, true)?;
        write!(w, "value)\n")?;
        write!(w, "{{\n")?;
        write!(w, "\twl_proxy_marshal((struct wl_proxy *) {name},\n")?;
        write!(w, "\t\t\t {upper}_SET_{}, ", field.to_ascii_uppercase())?;
        match property.r#type {
            // the server only needs the bits that actually flip
            PropertyType::Flags => write!(w, "value, value ^ {name}->{field});\n\n")?,
            _ => write!(w, "value);\n\n")?,
        }

        if is_string(property) {
            write!(w, "\tfree({name}->{field});\n")?;
            write!(w, "\t{name}->{field} = strdup(value);\n")?;
        } else {
            write!(w, "\t{name}->{field} = value;\n")?;
        }
        write!(w, "}}\n\n")?;
    }

    Ok(())
}

pub(super) fn emit_client_code<W: io::Write>(w: &mut W, protocol: &Protocol) -> io::Result<()> {
    write!(w, "#include <stdlib.h>\n")?;
    write!(w, "#include <string.h>\n")?;
    write!(w, "#include <wayland-client-private.h>\n")?;
    write!(w, "#include \"{}-client-protocol.h\"\n\n", protocol.name)?;

    let interfaces = || protocol.interfaces.iter().filter(|i| !i.client_custom);

    for interface in interfaces() {
        emit_object_struct(w, interface)?;
    }

    for interface in interfaces() {
        emit_property_listener(w, interface)?;
        emit_constructor(w, interface)?;
        emit_destructor(w, interface)?;
        emit_accessors(w, interface)?;
    }

    Ok(())
}
