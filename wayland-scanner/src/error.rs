use std::io;

use thiserror::Error;

use crate::protocol::MessageKind;

/// structural problems in a protocol document. every one of them is fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("no protocol name given")]
    MissingProtocolName,
    #[error("more than one protocol element")]
    DuplicateProtocol,
    #[error("document has no protocol element")]
    NoProtocol,
    #[error("no interface name given")]
    MissingInterfaceName,
    #[error("no interface version given")]
    MissingInterfaceVersion,
    #[error("invalid interface version {0:?}")]
    InvalidInterfaceVersion(String),
    #[error("no {} name given", .0.as_str())]
    MissingMessageName(MessageKind),
    #[error("destroy request should be destructor type")]
    DestroyNotDestructor,
    #[error("no arg name given")]
    MissingArgName,
    #[error("no type given for {0}")]
    MissingType(String),
    #[error("unknown type {0:?}")]
    UnknownType(String),
    #[error("no interface name given for {0}")]
    MissingArgInterface(String),
    #[error("{0} has more than one new_id argument")]
    MultipleNewId(String),
    #[error("no enum name given")]
    MissingEnumName,
    #[error("no entry name given")]
    MissingEntryName,
    #[error("no value given for entry {0}")]
    MissingEntryValue(String),
    #[error("no property name given")]
    MissingPropertyName,
    #[error("{element} outside of {parent}")]
    Orphan {
        element: &'static str,
        parent: &'static str,
    },
    #[error("{element} inside of {parent}")]
    Nested {
        element: &'static str,
        parent: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("{filename}:{line}: {error}")]
    Model {
        filename: String,
        line: usize,
        error: ModelError,
    },
    #[error("{filename}:{line}: malformed document")]
    Xml {
        filename: String,
        line: usize,
        #[source]
        source: quick_xml::Error,
    },
    #[error("{filename}:{line}: malformed attribute")]
    Attribute {
        filename: String,
        line: usize,
        #[source]
        source: quick_xml::events::attributes::AttrError,
    },
    #[error("could not read {filename}")]
    Read {
        filename: String,
        #[source]
        source: io::Error,
    },
    #[error("could not write generated code")]
    Write(#[source] io::Error),
}

#[test]
fn test_model_error_messages() {
    assert_eq!(
        ModelError::MissingMessageName(MessageKind::Event).to_string(),
        "no event name given"
    );
    let err = ScanError::Model {
        filename: "<stdin>".to_string(),
        line: 12,
        error: ModelError::DestroyNotDestructor,
    };
    assert_eq!(
        err.to_string(),
        "<stdin>:12: destroy request should be destructor type"
    );
}
