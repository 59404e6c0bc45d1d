//! Path-addressed access to HL7 v2 messages.
//!
//! A [`Message`] owns a [`MessageStore`] and hands out three short-lived
//! helpers over it:
//! - [`PathValue`] reads and writes one element by path (`PID.5.1`,
//!   `OBX(2).5`, `PID.3(2).1`), keeping absent, empty and null
//!   (`""`) values apart
//! - [`HeaderBuilder`] collects MSH values and commits them in one step
//! - [`SerializeOptions`] trims, validates and writes the message to text,
//!   bytes, a writer or a file
//!
//! Building a message from scratch:
//! ```
//! use medi_hl7::{Message, TrimScope};
//!
//! # fn main() -> Result<(), medi_hl7::HL7Error> {
//! let mut msg = Message::new();
//! msg.header()
//!     .sender("ADMIT", "WARD1")?
//!     .receiver("EHR", "HOSP")?
//!     .message_type("ADT^A01")?
//!     .control_id("MSG0001")?
//!     .commit()?
//!     .path("PID.5.1")
//!     .put("Doe")?
//!     .path("PID.5.2")
//!     .put("Jane")?;
//!
//! let text = msg.serialize().with_validation().to_text()?;
//! assert!(text.contains("PID|||||Doe^Jane\r"));
//! # Ok(())
//! # }
//! ```
//!
//! Absent, empty and null are distinct:
//! ```
//! use medi_hl7::Message;
//!
//! let text = "MSH|^~\\&|A|B|C|D|20250101||ADT^A01|1|P|2.5\rPID|1||\"\"\r";
//! let mut msg = Message::parse(text).unwrap();
//! assert!(msg.path("PID.2").exists() && !msg.path("PID.2").has_value());
//! assert!(msg.path("PID.3").is_null());
//! assert!(!msg.path("PID.9").exists() && !msg.path("PID.9").is_null());
//! ```

pub mod accessor;
pub mod encoding;
pub mod error;
pub mod header;
pub mod hl7;
pub mod message;
pub mod path;
pub mod serialize;
pub mod store;

pub use accessor::{PathValue, Resolved};
pub use encoding::{Encoding, TextEncoding};
pub use error::{HL7Error, HL7Result, HeaderField};
pub use header::{generate_control_id, HeaderBuilder, HeaderDefaults};
pub use hl7::{HL7Message, HL7Segment};
pub use message::{Message, MessageConfig};
pub use path::Path;
pub use serialize::{CapturedOutput, SerializeOptions};
pub use store::{Header, MessageStore, TrimScope};
