// element and attribute names follow the wayland protocol dtd, plus the client extension
// namespace (custom, global) and properties.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    Int,
    Uint,
    String,
    /// reference to an existing object of the named interface.
    Object(String),
    /// id of an object created by the message.
    NewId(String),
    Array,
    Fd,
    Double,
}

impl ArgType {
    /// interface named by object and new_id args.
    pub fn interface(&self) -> Option<&str> {
        match self {
            Self::Object(interface) | Self::NewId(interface) => Some(interface),
            _ => None,
        }
    }

    /// character used in the wire signature string.
    pub fn signature(&self) -> char {
        match self {
            Self::Int => 'i',
            Self::Uint => 'u',
            Self::String => 's',
            Self::Object(_) => 'o',
            Self::NewId(_) => 'n',
            Self::Array => 'a',
            Self::Fd => 'h',
            Self::Double => 'd',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    pub r#type: ArgType,
}

impl Arg {
    pub fn new(name: impl Into<String>, r#type: ArgType) -> Self {
        Self {
            name: name.into(),
            r#type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Event,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Event => "event",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub name: String,
    pub args: Vec<Arg>,
    pub destructor: bool,
    /// hand-written on the client side, no stub is generated.
    pub client_custom: bool,
    /// index into [`Interface::properties`] of the property this message was synthesized from.
    pub property: Option<usize>,
}

impl Message {
    pub fn new_id(&self) -> Option<&Arg> {
        self.args
            .iter()
            .find(|arg| matches!(arg.r#type, ArgType::NewId(_)))
    }

    /// true if no argument needs an interface to be resolved by the wire runtime.
    pub fn is_all_null(&self) -> bool {
        self.args.iter().all(|arg| arg.r#type.interface().is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    /// kept as written (`0x10` stays `0x10`).
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enum {
    pub name: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    /// bitmask; travels as a value and a change mask.
    Flags,
    Arg(ArgType),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub r#type: PropertyType,
    pub writable: bool,
    pub change_notify: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub version: u32,
    /// completely implemented by hand on the client side.
    pub client_custom: bool,
    /// client obtains it by binding a global rather than through a request.
    pub client_global: bool,
    pub requests: Vec<Message>,
    pub events: Vec<Message>,
    pub enums: Vec<Enum>,
    pub properties: Vec<Property>,
}

impl Interface {
    pub fn messages(&self, kind: MessageKind) -> &[Message] {
        match kind {
            MessageKind::Request => &self.requests,
            MessageKind::Event => &self.events,
        }
    }

    pub fn messages_mut(&mut self, kind: MessageKind) -> &mut Vec<Message> {
        match kind {
            MessageKind::Request => &mut self.requests,
            MessageKind::Event => &mut self.events,
        }
    }

    pub fn has_destructor(&self) -> bool {
        self.requests.iter().any(|msg| msg.destructor)
    }

    pub fn uppercase_name(&self) -> String {
        self.name.to_ascii_uppercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Protocol {
    pub name: String,
    pub copyright: Option<String>,
    pub interfaces: Vec<Interface>,
}

impl Protocol {
    pub fn uppercase_name(&self) -> String {
        self.name.to_ascii_uppercase()
    }
}
