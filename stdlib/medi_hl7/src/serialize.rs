//! Output options and sinks for a finished message.
//!
//! Every terminal call re-runs preparation (trimming) and serialization with
//! the options accumulated so far, so one pipeline can feed several sinks.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{debug, warn};

use crate::encoding::TextEncoding;
use crate::error::HL7Result;
use crate::message::Message;
use crate::store::{MessageStore, TrimScope};

/// Result pair returned by [`SerializeOptions::try_serialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedOutput {
    pub text: Option<String>,
    pub error: Option<String>,
}

impl CapturedOutput {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct SerializeOptions<'a, S: MessageStore> {
    message: &'a mut Message<S>,
    validate: bool,
    trim: Option<TrimScope>,
    encoding: TextEncoding,
}

#[allow(clippy::wrong_self_convention)]
impl<'a, S: MessageStore> SerializeOptions<'a, S> {
    pub(crate) fn new(message: &'a mut Message<S>) -> Self {
        Self {
            message,
            validate: false,
            trim: None,
            encoding: TextEncoding::default(),
        }
    }

    pub fn with_validation(mut self) -> Self {
        self.validate = true;
        self
    }

    /// Strip trailing empty elements at every level before output.
    pub fn without_trailing_delimiters(self) -> Self {
        self.without_trailing_delimiters_in(TrimScope::All)
    }

    pub fn without_trailing_delimiters_in(mut self, scope: TrimScope) -> Self {
        self.trim = Some(scope);
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn prepare(&mut self) {
        if let Some(scope) = self.trim {
            self.message.store_mut().remove_trailing_delimiters(scope);
        }
    }

    pub fn to_text(&mut self) -> HL7Result<String> {
        self.prepare();
        let text = self.message.store().serialize(self.validate)?;
        debug!(
            "serialized message: {} bytes, validate={}",
            text.len(),
            self.validate
        );
        Ok(text)
    }

    pub fn to_bytes(&mut self) -> HL7Result<Vec<u8>> {
        let text = self.to_text()?;
        self.encoding.encode(&text)
    }

    /// Write the encoded message to `sink` and flush it.
    pub fn to_writer<W: Write>(&mut self, mut sink: W) -> HL7Result<()> {
        let bytes = self.to_bytes()?;
        sink.write_all(&bytes)?;
        sink.flush()?;
        Ok(())
    }

    /// Create or truncate `path` and write the encoded message to it. The
    /// file is only touched once serialization has succeeded.
    pub fn to_file(&mut self, path: impl AsRef<Path>) -> HL7Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(&bytes)?;
        out.flush()?;
        debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Serialize without raising. With validation enabled the output is also
    /// re-parsed to confirm it round trips.
    pub fn try_serialize(&mut self) -> CapturedOutput {
        let result = self.to_text().and_then(|text| {
            if self.validate {
                self.message.store().validate_text(&text)?;
            }
            Ok(text)
        });
        match result {
            Ok(text) => CapturedOutput {
                text: Some(text),
                error: None,
            },
            Err(e) => {
                warn!("serialization failed: {e}");
                CapturedOutput {
                    text: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
