//! Path-bound value access.
//!
//! Reads are total: every failure to resolve a path becomes a default
//! (`""` or `false`). Writes propagate errors to the caller.
//!
//! ```
//! use medi_hl7::Message;
//!
//! let mut msg = Message::new();
//! msg.path("PID.5.1").put("Smith").unwrap();
//! assert_eq!(msg.path("PID.5.1").value(), "Smith");
//! assert!(!msg.path("PID.7").exists());
//! ```

use log::trace;

use crate::error::HL7Result;
use crate::message::Message;
use crate::store::MessageStore;

/// Outcome of resolving a path against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Absent,
    /// Present and equal to the null sentinel.
    Null,
    Present(String),
}

/// A path expression bound to a message. Holds no state of its own.
pub struct PathValue<'a, S: MessageStore> {
    message: &'a mut Message<S>,
    path: String,
}

impl<'a, S: MessageStore> PathValue<'a, S> {
    pub(crate) fn new(message: &'a mut Message<S>, path: String) -> Self {
        Self { message, path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn resolve(&self) -> Resolved {
        let store = self.message.store();
        match store.get(&self.path) {
            Ok(v) if store.encoding().is_null(&v) => Resolved::Null,
            Ok(v) => Resolved::Present(v),
            Err(e) => {
                trace!("path {} unresolved: {e}", self.path);
                Resolved::Absent
            }
        }
    }

    /// The element's value, the null sentinel itself when null, or `""` when
    /// the path does not resolve.
    pub fn value(&self) -> String {
        match self.resolve() {
            Resolved::Absent => String::new(),
            Resolved::Null => self.message.encoding().null_value.clone(),
            Resolved::Present(v) => v,
        }
    }

    pub fn exists(&self) -> bool {
        match self.message.store().value_exists(&self.path) {
            Ok(found) => found,
            Err(e) => {
                trace!("path {} unresolved: {e}", self.path);
                false
            }
        }
    }

    pub fn has_value(&self) -> bool {
        matches!(self.resolve(), Resolved::Present(v) if !v.is_empty())
    }

    pub fn is_null(&self) -> bool {
        self.exists() && self.resolve() == Resolved::Null
    }

    /// Overwrite an existing element; fails with `NotFound` otherwise.
    pub fn set(self, value: &str) -> HL7Result<&'a mut Message<S>> {
        self.message.store_mut().set(&self.path, value)?;
        Ok(self.message)
    }

    /// Overwrite or create the element along with any missing ancestors.
    pub fn put(self, value: &str) -> HL7Result<&'a mut Message<S>> {
        self.message.store_mut().put(&self.path, value)?;
        Ok(self.message)
    }

    pub fn set_if(self, value: &str, cond: bool) -> HL7Result<&'a mut Message<S>> {
        if cond {
            self.set(value)
        } else {
            Ok(self.message)
        }
    }

    pub fn put_if(self, value: &str, cond: bool) -> HL7Result<&'a mut Message<S>> {
        if cond {
            self.put(value)
        } else {
            Ok(self.message)
        }
    }

    pub fn set_null(self) -> HL7Result<&'a mut Message<S>> {
        let null = self.message.encoding().null_value.clone();
        self.set(&null)
    }

    pub fn put_null(self) -> HL7Result<&'a mut Message<S>> {
        let null = self.message.encoding().null_value.clone();
        self.put(&null)
    }
}
