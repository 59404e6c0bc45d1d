use std::fmt;

/// Result alias used throughout the crate.
pub type HL7Result<T> = Result<T, HL7Error>;

/// Required MSH fields tracked by the header builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    SendingApplication,
    SendingFacility,
    ReceivingApplication,
    ReceivingFacility,
    MessageType,
    ControlId,
}

impl HeaderField {
    /// Human readable field name, as used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            HeaderField::SendingApplication => "sending application",
            HeaderField::SendingFacility => "sending facility",
            HeaderField::ReceivingApplication => "receiving application",
            HeaderField::ReceivingFacility => "receiving facility",
            HeaderField::MessageType => "message type",
            HeaderField::ControlId => "control id",
        }
    }

    /// Builder call that supplies this field.
    pub fn setter(self) -> &'static str {
        match self {
            HeaderField::SendingApplication | HeaderField::SendingFacility => "sender()",
            HeaderField::ReceivingApplication | HeaderField::ReceivingFacility => "receiver()",
            HeaderField::MessageType => "message_type()",
            HeaderField::ControlId => "control_id() or auto_control_id()",
        }
    }
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (call {})", self.label(), self.setter())
    }
}

/// Errors raised by accessors, the header builder, the serialization
/// pipeline and the reference message store.
#[derive(Debug, thiserror::Error)]
pub enum HL7Error {
    /// The path does not resolve to an element. Raised by `set`, never by reads.
    #[error("no element at path '{path}'")]
    NotFound { path: String },

    /// Structural validation of the message or its serialized text failed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Header commit attempted with incomplete accumulator state.
    #[error("missing required header field(s): {}", join_fields(.missing))]
    MissingRequiredField { missing: Vec<HeaderField> },

    /// A setter argument was rejected at call time.
    #[error("invalid argument '{name}': {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The path expression is malformed or addresses an unsupported level.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Output text contains a character the target encoding cannot represent.
    #[error("character {ch:?} cannot be encoded as {encoding}")]
    Encoding { encoding: &'static str, ch: char },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl HL7Error {
    pub fn not_found(path: impl Into<String>) -> Self {
        HL7Error::NotFound { path: path.into() }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        HL7Error::Validation(msg.into())
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        HL7Error::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(name: &'static str, reason: impl Into<String>) -> Self {
        HL7Error::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }

    /// True for the absence condition, as opposed to malformed input or I/O.
    pub fn is_not_found(&self) -> bool {
        matches!(self, HL7Error::NotFound { .. })
    }
}

fn join_fields(fields: &[HeaderField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_names_field_and_setter() {
        let err = HL7Error::MissingRequiredField {
            missing: vec![HeaderField::MessageType, HeaderField::ControlId],
        };
        let msg = err.to_string();
        assert!(msg.contains("message type (call message_type())"), "{msg}");
        assert!(msg.contains("control_id() or auto_control_id()"), "{msg}");
    }
}
