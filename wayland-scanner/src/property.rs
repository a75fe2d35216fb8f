// the wire protocol has no notion of properties, they are turned into an ordinary setter
// request and a change notification event.

use crate::protocol::*;

fn value_args(property: &Property) -> Vec<Arg> {
    match &property.r#type {
        // order matters, the signature is positional.
        PropertyType::Flags => vec![
            Arg::new("value", ArgType::Uint),
            Arg::new("change_mask", ArgType::Uint),
        ],
        PropertyType::Arg(r#type) => vec![Arg::new("value", r#type.clone())],
    }
}

fn synthesized(property: &Property, index: usize, name: String) -> Message {
    Message {
        name,
        args: value_args(property),
        destructor: false,
        client_custom: false,
        property: Some(index),
    }
}

/// appends `set_<name>` to the requests if the property is writable and `<name>_notify` to the
/// events if it is change-notified.
pub(crate) fn synthesize(interface: &mut Interface, index: usize) {
    let property = &interface.properties[index];

    let request = property
        .writable
        .then(|| synthesized(property, index, format!("set_{}", property.name)));
    let event = property
        .change_notify
        .then(|| synthesized(property, index, format!("{}_notify", property.name)));

    log::trace!(
        "[property] {}.{}: setter {}, notify {}",
        interface.name,
        property.name,
        request.is_some(),
        event.is_some(),
    );

    interface.requests.extend(request);
    interface.events.extend(event);
}
