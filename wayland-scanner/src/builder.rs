use crate::error::ModelError;
use crate::property;
use crate::protocol::*;

/// elements of the protocol schema. anything else is `Unknown` and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Protocol,
    Copyright,
    Interface,
    Request,
    Event,
    Arg,
    Enum,
    Entry,
    Property,
    Unknown,
}

impl Element {
    pub fn from_local_name(name: &[u8]) -> Self {
        match name {
            b"protocol" => Self::Protocol,
            b"copyright" => Self::Copyright,
            b"interface" => Self::Interface,
            b"request" => Self::Request,
            b"event" => Self::Event,
            b"arg" => Self::Arg,
            b"enum" => Self::Enum,
            b"entry" => Self::Entry,
            b"property" => Self::Property,
            _ => Self::Unknown,
        }
    }
}

/// attributes the builder cares about, already decoded.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attributes {
    pub name: Option<String>,
    pub version: Option<String>,
    pub r#type: Option<String>,
    pub value: Option<String>,
    pub interface: Option<String>,
    pub writable: bool,
    pub change_notify: bool,
    pub client_custom: bool,
    pub client_global: bool,
}

pub(crate) fn parse_arg_type(
    r#type: &str,
    interface: Option<&str>,
    owner: &str,
) -> Result<ArgType, ModelError> {
    let interface = || {
        interface
            .map(str::to_string)
            .ok_or_else(|| ModelError::MissingArgInterface(owner.to_string()))
    };
    match r#type {
        "int" => Ok(ArgType::Int),
        "uint" => Ok(ArgType::Uint),
        "string" => Ok(ArgType::String),
        "array" => Ok(ArgType::Array),
        "fd" => Ok(ArgType::Fd),
        "double" => Ok(ArgType::Double),
        "object" => Ok(ArgType::Object(interface()?)),
        "new_id" => Ok(ArgType::NewId(interface()?)),
        _ => Err(ModelError::UnknownType(r#type.to_string())),
    }
}

/// builds a [`Protocol`] from start/end/character-data events delivered in document order.
///
/// the current interface, message and enum are always the last ones appended to their parent,
/// so the parse state only remembers whether each of them is still open.
#[derive(Debug, Default)]
pub struct Builder {
    protocol: Option<Protocol>,
    interface_open: bool,
    message_open: Option<MessageKind>,
    enum_open: bool,
    text: String,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    fn protocol_mut(&mut self, element: &'static str) -> Result<&mut Protocol, ModelError> {
        self.protocol.as_mut().ok_or(ModelError::Orphan {
            element,
            parent: "protocol",
        })
    }

    fn interface_mut(&mut self, element: &'static str) -> Result<&mut Interface, ModelError> {
        let orphan = ModelError::Orphan {
            element,
            parent: "interface",
        };
        if !self.interface_open {
            return Err(orphan);
        }
        self.protocol_mut(element)?
            .interfaces
            .last_mut()
            .ok_or(orphan)
    }

    fn message_mut(&mut self) -> Result<&mut Message, ModelError> {
        let orphan = ModelError::Orphan {
            element: "arg",
            parent: "request or event",
        };
        let kind = self.message_open.ok_or(orphan.clone())?;
        self.interface_mut("arg")?
            .messages_mut(kind)
            .last_mut()
            .ok_or(orphan)
    }

    fn enum_mut(&mut self) -> Result<&mut Enum, ModelError> {
        let orphan = ModelError::Orphan {
            element: "entry",
            parent: "enum",
        };
        if !self.enum_open {
            return Err(orphan);
        }
        self.interface_mut("entry")?.enums.last_mut().ok_or(orphan)
    }

    pub fn start_element(&mut self, element: Element, attrs: Attributes) -> Result<(), ModelError> {
        self.text.clear();

        match element {
            Element::Protocol => self.start_protocol(attrs),
            Element::Interface => self.start_interface(attrs),
            Element::Request => self.start_message(MessageKind::Request, attrs),
            Element::Event => self.start_message(MessageKind::Event, attrs),
            Element::Arg => self.start_arg(attrs),
            Element::Enum => self.start_enum(attrs),
            Element::Entry => self.start_entry(attrs),
            Element::Property => self.start_property(attrs),
            Element::Copyright | Element::Unknown => Ok(()),
        }
    }

    pub fn end_element(&mut self, element: Element) -> Result<(), ModelError> {
        match element {
            Element::Copyright => {
                let text = std::mem::take(&mut self.text);
                self.protocol_mut("copyright")?.copyright = Some(text);
            }
            Element::Interface => self.interface_open = false,
            Element::Request | Element::Event => self.message_open = None,
            Element::Enum => self.enum_open = false,
            _ => {}
        }
        Ok(())
    }

    pub fn character_data(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn finish(self) -> Result<Protocol, ModelError> {
        self.protocol.ok_or(ModelError::NoProtocol)
    }

    fn start_protocol(&mut self, attrs: Attributes) -> Result<(), ModelError> {
        if self.protocol.is_some() {
            return Err(ModelError::DuplicateProtocol);
        }
        let name = attrs.name.ok_or(ModelError::MissingProtocolName)?;
        log::debug!("[parse] protocol {name}");
        self.protocol = Some(Protocol {
            name,
            ..Default::default()
        });
        Ok(())
    }

    fn start_interface(&mut self, attrs: Attributes) -> Result<(), ModelError> {
        let name = attrs.name.ok_or(ModelError::MissingInterfaceName)?;
        let version = match attrs.version {
            None => 0,
            Some(version) => version
                .trim()
                .parse::<u32>()
                .map_err(|_| ModelError::InvalidInterfaceVersion(version.clone()))?,
        };
        if version == 0 {
            return Err(ModelError::MissingInterfaceVersion);
        }

        log::trace!("[parse] interface {name} v{version}");
        self.protocol_mut("interface")?.interfaces.push(Interface {
            name,
            version,
            client_custom: attrs.client_custom,
            client_global: attrs.client_global,
            ..Default::default()
        });
        self.interface_open = true;
        Ok(())
    }

    fn start_message(&mut self, kind: MessageKind, attrs: Attributes) -> Result<(), ModelError> {
        let name = attrs.name.ok_or(ModelError::MissingMessageName(kind))?;
        let destructor = attrs.r#type.as_deref() == Some("destructor");
        if name == "destroy" && !destructor {
            return Err(ModelError::DestroyNotDestructor);
        }

        let element = kind.as_str();
        self.interface_mut(element)?.messages_mut(kind).push(Message {
            name,
            destructor,
            client_custom: attrs.client_custom,
            ..Default::default()
        });
        self.message_open = Some(kind);
        Ok(())
    }

    fn start_arg(&mut self, attrs: Attributes) -> Result<(), ModelError> {
        let name = attrs.name.ok_or(ModelError::MissingArgName)?;
        let r#type = attrs
            .r#type
            .ok_or_else(|| ModelError::MissingType(name.clone()))?;
        let r#type = parse_arg_type(&r#type, attrs.interface.as_deref(), &name)?;

        let message = self.message_mut()?;
        if matches!(r#type, ArgType::NewId(_)) && message.new_id().is_some() {
            return Err(ModelError::MultipleNewId(message.name.clone()));
        }
        message.args.push(Arg { name, r#type });
        Ok(())
    }

    fn start_enum(&mut self, attrs: Attributes) -> Result<(), ModelError> {
        let name = attrs.name.ok_or(ModelError::MissingEnumName)?;
        self.interface_mut("enum")?.enums.push(Enum {
            name,
            entries: Vec::new(),
        });
        self.enum_open = true;
        Ok(())
    }

    fn start_entry(&mut self, attrs: Attributes) -> Result<(), ModelError> {
        let name = attrs.name.ok_or(ModelError::MissingEntryName)?;
        let value = attrs
            .value
            .ok_or_else(|| ModelError::MissingEntryValue(name.clone()))?;
        self.enum_mut()?.entries.push(Entry { name, value });
        Ok(())
    }

    fn start_property(&mut self, attrs: Attributes) -> Result<(), ModelError> {
        // the synthesized setter would become the open request
        if let Some(kind) = self.message_open {
            return Err(ModelError::Nested {
                element: "property",
                parent: kind.as_str(),
            });
        }
        let name = attrs.name.ok_or(ModelError::MissingPropertyName)?;
        let r#type = match attrs.r#type.as_deref() {
            None => return Err(ModelError::MissingType(name)),
            Some("flags") => PropertyType::Flags,
            Some(r#type) => PropertyType::Arg(parse_arg_type(
                r#type,
                attrs.interface.as_deref(),
                &name,
            )?),
        };

        let interface = self.interface_mut("property")?;
        let index = interface.properties.len();
        interface.properties.push(Property {
            name,
            r#type,
            writable: attrs.writable,
            change_notify: attrs.change_notify,
        });
        property::synthesize(interface, index);
        Ok(())
    }
}
