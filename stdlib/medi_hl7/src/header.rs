//! MSH header construction.
//!
//! ```
//! use medi_hl7::Message;
//!
//! # fn main() -> Result<(), medi_hl7::HL7Error> {
//! let mut msg = Message::new();
//! msg.header()
//!     .sender("LAB", "NORTH")?
//!     .receiver("EHR", "CENTRAL")?
//!     .message_type("ORU^R01")?
//!     .auto_control_id()
//!     .commit()?;
//! assert_eq!(msg.path("MSH.9.2").value(), "R01");
//! assert_eq!(msg.path("MSH.12").value(), "2.5");
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use log::debug;
use rand::Rng;

use crate::error::{HL7Error, HL7Result, HeaderField};
use crate::message::Message;
use crate::store::{Header, MessageStore};

pub const PROCESSING_PRODUCTION: &str = "P";
pub const PROCESSING_DEBUGGING: &str = "D";
pub const PROCESSING_TRAINING: &str = "T";
pub const DEFAULT_VERSION: &str = "2.5";

/// Number of distinct suffixes appended to the timestamp of generated ids.
const SUFFIX_SPAN: u64 = 1_000_000;

static SEQUENCE: OnceLock<AtomicU64> = OnceLock::new();

/// Values a header builder starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeaderDefaults {
    pub processing_id: String,
    pub version: String,
    pub security: Option<String>,
}

impl Default for HeaderDefaults {
    fn default() -> Self {
        Self {
            processing_id: PROCESSING_PRODUCTION.to_string(),
            version: DEFAULT_VERSION.to_string(),
            security: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ControlId {
    Unset,
    Explicit(String),
    Auto,
}

/// Generate a control id: `YYYYMMDDHHMMSS` followed by a 6 digit suffix.
///
/// Suffixes come from a process-wide counter with a random starting point,
/// so ids do not repeat within a process unless more than a million are
/// generated in the same second. Ids from different processes can collide;
/// pass an explicit id when global uniqueness matters.
pub fn generate_control_id() -> String {
    let seq = SEQUENCE
        .get_or_init(|| AtomicU64::new(rand::thread_rng().gen_range(0..SUFFIX_SPAN)));
    let suffix = seq.fetch_add(1, Ordering::Relaxed) % SUFFIX_SPAN;
    format!(
        "{}{:06}",
        chrono::Local::now().format("%Y%m%d%H%M%S"),
        suffix
    )
}

/// Accumulates MSH values and commits them to the message exactly once.
pub struct HeaderBuilder<'a, S: MessageStore> {
    message: &'a mut Message<S>,
    sending_application: Option<String>,
    sending_facility: Option<String>,
    receiving_application: Option<String>,
    receiving_facility: Option<String>,
    message_type: Option<String>,
    control_id: ControlId,
    security: Option<String>,
    processing_id: String,
    version: String,
}

impl<'a, S: MessageStore> HeaderBuilder<'a, S> {
    pub(crate) fn new(message: &'a mut Message<S>) -> Self {
        let defaults = message.header_defaults().clone();
        Self {
            message,
            sending_application: None,
            sending_facility: None,
            receiving_application: None,
            receiving_facility: None,
            message_type: None,
            control_id: ControlId::Unset,
            security: defaults.security,
            processing_id: defaults.processing_id,
            version: defaults.version,
        }
    }

    pub fn sender(mut self, application: &str, facility: &str) -> HL7Result<Self> {
        self.sending_application = Some(self.required("sending_application", application)?);
        self.sending_facility = Some(self.required("sending_facility", facility)?);
        Ok(self)
    }

    pub fn receiver(mut self, application: &str, facility: &str) -> HL7Result<Self> {
        self.receiving_application = Some(self.required("receiving_application", application)?);
        self.receiving_facility = Some(self.required("receiving_facility", facility)?);
        Ok(self)
    }

    /// Message type with its trigger event, e.g. `ADT^A01`.
    pub fn message_type(mut self, message_type: &str) -> HL7Result<Self> {
        self.message_type = Some(self.required("message_type", message_type)?);
        Ok(self)
    }

    /// MSH-8. An empty value clears it.
    pub fn security(mut self, security: &str) -> HL7Result<Self> {
        self.check_single_field("security", security)?;
        self.security = (!security.is_empty()).then(|| security.to_string());
        Ok(self)
    }

    /// Use `id` as MSH-10, replacing an earlier `auto_control_id()`.
    pub fn control_id(mut self, id: &str) -> HL7Result<Self> {
        self.control_id = ControlId::Explicit(self.required("control_id", id)?);
        Ok(self)
    }

    /// Generate MSH-10 on commit, replacing an earlier `control_id()`.
    pub fn auto_control_id(mut self) -> Self {
        self.control_id = ControlId::Auto;
        self
    }

    pub fn version(mut self, version: &str) -> HL7Result<Self> {
        self.version = self.required("version", version)?;
        Ok(self)
    }

    pub fn processing_id(mut self, processing_id: &str) -> HL7Result<Self> {
        self.processing_id = self.required("processing_id", processing_id)?;
        Ok(self)
    }

    pub fn production(mut self) -> Self {
        self.processing_id = PROCESSING_PRODUCTION.to_string();
        self
    }

    pub fn debugging(mut self) -> Self {
        self.processing_id = PROCESSING_DEBUGGING.to_string();
        self
    }

    pub fn training(mut self) -> Self {
        self.processing_id = PROCESSING_TRAINING.to_string();
        self
    }

    /// Validate the accumulated values and install the MSH segment.
    pub fn commit(self) -> HL7Result<&'a mut Message<S>> {
        let header = self.build()?;
        debug!(
            "committing header {} from {}/{}",
            header.message_type, header.sending_application, header.sending_facility
        );
        self.message.store_mut().insert_header(&header)?;
        Ok(self.message)
    }

    fn build(&self) -> HL7Result<Header> {
        fn take(value: Option<&str>, field: HeaderField, missing: &mut Vec<HeaderField>) -> String {
            match value {
                Some(v) if !v.trim().is_empty() => v.to_string(),
                _ => {
                    missing.push(field);
                    String::new()
                }
            }
        }

        let mut missing = Vec::new();
        let sending_application = take(
            self.sending_application.as_deref(),
            HeaderField::SendingApplication,
            &mut missing,
        );
        let sending_facility = take(
            self.sending_facility.as_deref(),
            HeaderField::SendingFacility,
            &mut missing,
        );
        let receiving_application = take(
            self.receiving_application.as_deref(),
            HeaderField::ReceivingApplication,
            &mut missing,
        );
        let receiving_facility = take(
            self.receiving_facility.as_deref(),
            HeaderField::ReceivingFacility,
            &mut missing,
        );
        let message_type = take(
            self.message_type.as_deref(),
            HeaderField::MessageType,
            &mut missing,
        );
        let control_id = match &self.control_id {
            ControlId::Explicit(id) => id.clone(),
            ControlId::Auto => String::new(),
            ControlId::Unset => {
                missing.push(HeaderField::ControlId);
                String::new()
            }
        };
        if !missing.is_empty() {
            return Err(HL7Error::MissingRequiredField { missing });
        }

        let control_id = if self.control_id == ControlId::Auto {
            generate_control_id()
        } else {
            control_id
        };
        Ok(Header {
            sending_application,
            sending_facility,
            receiving_application,
            receiving_facility,
            security: self.security.clone(),
            message_type,
            control_id,
            processing_id: self.processing_id.clone(),
            version: self.version.clone(),
        })
    }

    fn required(&self, name: &'static str, value: &str) -> HL7Result<String> {
        if value.trim().is_empty() {
            return Err(HL7Error::invalid_argument(name, "must not be empty"));
        }
        self.check_single_field(name, value)?;
        Ok(value.to_string())
    }

    fn check_single_field(&self, name: &'static str, value: &str) -> HL7Result<()> {
        let field_sep = self.message.encoding().field_sep;
        if let Some(c) = value
            .chars()
            .find(|c| *c == field_sep || *c == '\r' || *c == '\n')
        {
            return Err(HL7Error::invalid_argument(
                name,
                format!("contains {c:?}, which would split the header segment"),
            ));
        }
        Ok(())
    }
}
