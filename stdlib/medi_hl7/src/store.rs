//! The message store contract the accessors, header builder and
//! serialization pipeline are written against.

use std::fmt;
use std::str::FromStr;

use crate::encoding::Encoding;
use crate::error::{HL7Error, HL7Result};

/// Which trailing empty elements `remove_trailing_delimiters` strips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrimScope {
    #[default]
    All,
    Fields,
    Repetitions,
    Components,
    Subcomponents,
}

impl TrimScope {
    pub fn includes(self, level: TrimScope) -> bool {
        self == TrimScope::All || self == level
    }
}

impl fmt::Display for TrimScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrimScope::All => "all",
            TrimScope::Fields => "fields",
            TrimScope::Repetitions => "repetitions",
            TrimScope::Components => "components",
            TrimScope::Subcomponents => "subcomponents",
        };
        f.write_str(s)
    }
}

impl FromStr for TrimScope {
    type Err = HL7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TrimScope::All),
            "field" | "fields" => Ok(TrimScope::Fields),
            "repetition" | "repetitions" => Ok(TrimScope::Repetitions),
            "component" | "components" => Ok(TrimScope::Components),
            "subcomponent" | "subcomponents" => Ok(TrimScope::Subcomponents),
            other => Err(HL7Error::invalid_argument(
                "scope",
                format!("unknown trim scope '{other}'"),
            )),
        }
    }
}

/// Routing and control values for one MSH segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub sending_application: String,
    pub sending_facility: String,
    pub receiving_application: String,
    pub receiving_facility: String,
    pub security: Option<String>,
    pub message_type: String,
    pub control_id: String,
    pub processing_id: String,
    pub version: String,
}

/// Mutable hierarchical message storage addressed by path strings.
///
/// Read methods report absence as [`HL7Error::NotFound`]; `put` creates any
/// missing structure and only fails for malformed paths.
pub trait MessageStore {
    fn encoding(&self) -> &Encoding;

    fn get(&self, path: &str) -> HL7Result<String>;

    fn value_exists(&self, path: &str) -> HL7Result<bool>;

    /// Overwrite an existing element. Fails with `NotFound` when absent.
    fn set(&mut self, path: &str, value: &str) -> HL7Result<()>;

    /// Overwrite or create the element and any missing ancestors.
    fn put(&mut self, path: &str, value: &str) -> HL7Result<()>;

    fn remove_trailing_delimiters(&mut self, scope: TrimScope);

    fn serialize(&self, validate: bool) -> HL7Result<String>;

    /// Re-parse serialized text, reporting structural problems as `Validation`.
    fn validate_text(&self, text: &str) -> HL7Result<()>;

    /// Install `header` as the leading MSH segment in a single step.
    fn insert_header(&mut self, header: &Header) -> HL7Result<()>;
}
