use crate::protocol::*;

/// the universal object interface. args referring to it are untyped on the wire.
pub const WL_OBJECT: &str = "wl_object";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSlot {
    Null,
    Interface(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePlan {
    pub opcode: u32,
    pub signature: String,
    /// index into [`Plan::types`] of the first slot of this message.
    pub type_offset: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfacePlan {
    pub requests: Vec<MessagePlan>,
    pub events: Vec<MessagePlan>,
}

impl InterfacePlan {
    pub fn messages(&self, kind: MessageKind) -> &[MessagePlan] {
        match kind {
            MessageKind::Request => &self.requests,
            MessageKind::Event => &self.events,
        }
    }
}

/// wire signatures and the shared type table of a finished protocol.
///
/// the table starts with a run of `null_run_length` nulls that every message without
/// object/new_id args points at (offset 0). every other message gets its own slice after it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub null_run_length: usize,
    pub types: Vec<TypeSlot>,
    /// parallel to [`Protocol::interfaces`].
    pub interfaces: Vec<InterfacePlan>,
    /// interfaces whose descriptors the type table points at, in order of first use.
    pub forward_declarations: Vec<String>,
}

/// walks the protocol in emission order (interface, then requests, then events) and threads the
/// type table cursor through it.
struct Planner {
    null_run_length: usize,
    types: Vec<TypeSlot>,
    forward_declarations: Vec<String>,
}

impl Planner {
    fn new(protocol: &Protocol) -> Self {
        let null_run_length = all_messages(protocol)
            .filter(|msg| msg.is_all_null())
            .map(|msg| msg.args.len())
            .max()
            .unwrap_or(0);
        Self {
            null_run_length,
            types: vec![TypeSlot::Null; null_run_length],
            forward_declarations: Vec::new(),
        }
    }

    fn plan_message(&mut self, opcode: usize, msg: &Message) -> MessagePlan {
        let signature = msg.args.iter().map(|arg| arg.r#type.signature()).collect();

        let type_offset = if msg.is_all_null() {
            0
        } else {
            let offset = self.types.len();
            for arg in msg.args.iter() {
                let slot = match arg.r#type.interface() {
                    Some(interface) if interface != WL_OBJECT => {
                        if !self.forward_declarations.iter().any(|it| it == interface) {
                            self.forward_declarations.push(interface.to_string());
                        }
                        TypeSlot::Interface(interface.to_string())
                    }
                    _ => TypeSlot::Null,
                };
                self.types.push(slot);
            }
            offset
        };

        MessagePlan {
            opcode: opcode as u32,
            signature,
            type_offset,
        }
    }

    fn plan_messages(&mut self, messages: &[Message]) -> Vec<MessagePlan> {
        messages
            .iter()
            .enumerate()
            .map(|(opcode, msg)| self.plan_message(opcode, msg))
            .collect()
    }
}

fn all_messages(protocol: &Protocol) -> impl Iterator<Item = &Message> {
    protocol
        .interfaces
        .iter()
        .flat_map(|interface| interface.requests.iter().chain(interface.events.iter()))
}

impl Plan {
    /// must only be called once the protocol is complete, synthesized property messages
    /// included.
    pub fn new(protocol: &Protocol) -> Self {
        let mut planner = Planner::new(protocol);
        let interfaces = protocol
            .interfaces
            .iter()
            .map(|interface| InterfacePlan {
                requests: planner.plan_messages(&interface.requests),
                events: planner.plan_messages(&interface.events),
            })
            .collect();

        log::debug!(
            "[plan] {}: null run {}, {} type slots",
            protocol.name,
            planner.null_run_length,
            planner.types.len(),
        );

        Self {
            null_run_length: planner.null_run_length,
            types: planner.types,
            interfaces,
            forward_declarations: planner.forward_declarations,
        }
    }

    #[cfg(test)]
    pub fn message(&self, interface: usize, kind: MessageKind, index: usize) -> &MessagePlan {
        &self.interfaces[interface].messages(kind)[index]
    }
}
