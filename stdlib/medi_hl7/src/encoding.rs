//! Delimiter set and output text encodings.

use std::fmt;
use std::str::FromStr;

use crate::error::{HL7Error, HL7Result};

/// Delimiters of a message plus the present-but-null sentinel.
///
/// The sentinel marks an element that is structurally present and explicitly
/// null. It is distinct from the empty string and from absence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Encoding {
    pub field_sep: char,
    pub component_sep: char,
    pub repetition_sep: char,
    pub escape_char: char,
    pub subcomponent_sep: char,
    pub null_value: String,
}

impl Default for Encoding {
    fn default() -> Self {
        Self {
            field_sep: '|',
            component_sep: '^',
            repetition_sep: '~',
            escape_char: '\\',
            subcomponent_sep: '&',
            null_value: "\"\"".to_string(),
        }
    }
}

impl Encoding {
    /// The MSH-2 encoding characters, e.g. `^~\&`.
    pub fn encoding_characters(&self) -> String {
        [
            self.component_sep,
            self.repetition_sep,
            self.escape_char,
            self.subcomponent_sep,
        ]
        .iter()
        .collect()
    }

    /// Read delimiters from MSH-1 and MSH-2, keeping the default sentinel.
    pub fn from_msh(field_sep: char, encoding_chars: &str) -> HL7Result<Self> {
        let chars: Vec<char> = encoding_chars.chars().collect();
        if chars.len() != 4 {
            return Err(HL7Error::validation(format!(
                "MSH encoding characters must be 4 chars, got '{encoding_chars}'"
            )));
        }
        let enc = Self {
            field_sep,
            component_sep: chars[0],
            repetition_sep: chars[1],
            escape_char: chars[2],
            subcomponent_sep: chars[3],
            ..Self::default()
        };
        if !enc.delimiters_distinct() {
            return Err(HL7Error::validation("message delimiters must be distinct"));
        }
        Ok(enc)
    }

    pub fn is_null(&self, value: &str) -> bool {
        value == self.null_value
    }

    fn delimiters_distinct(&self) -> bool {
        let all = [
            self.field_sep,
            self.component_sep,
            self.repetition_sep,
            self.escape_char,
            self.subcomponent_sep,
        ];
        all.iter()
            .enumerate()
            .all(|(i, c)| !all[i + 1..].contains(c))
    }
}

/// Character encoding applied when the serialized text is turned into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per code point up to U+00FF.
    Latin1,
    Ascii,
}

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "UTF-8",
            TextEncoding::Latin1 => "ISO-8859-1",
            TextEncoding::Ascii => "US-ASCII",
        }
    }

    pub fn encode(self, text: &str) -> HL7Result<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Latin1 => self.encode_narrow(text, 0xFF),
            TextEncoding::Ascii => self.encode_narrow(text, 0x7F),
        }
    }

    fn encode_narrow(self, text: &str, max: u32) -> HL7Result<Vec<u8>> {
        text.chars()
            .map(|ch| {
                let cp = ch as u32;
                if cp <= max {
                    Ok(cp as u8)
                } else {
                    Err(HL7Error::Encoding {
                        encoding: self.name(),
                        ch,
                    })
                }
            })
            .collect()
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = HL7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "iso-8859-1" | "latin1" | "latin-1" => Ok(TextEncoding::Latin1),
            "us-ascii" | "ascii" => Ok(TextEncoding::Ascii),
            other => Err(HL7Error::invalid_argument(
                "encoding",
                format!("unsupported text encoding '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_encoding_characters() {
        let enc = Encoding::default();
        assert_eq!(enc.encoding_characters(), "^~\\&");
        assert_eq!(enc.null_value, "\"\"");
    }

    #[test]
    fn from_msh_rejects_short_or_duplicate_delimiters() {
        assert!(Encoding::from_msh('|', "^~\\").is_err());
        assert!(Encoding::from_msh('|', "^^\\&").is_err());
        let enc = Encoding::from_msh('#', "$%!*").unwrap();
        assert_eq!(enc.component_sep, '$');
        assert_eq!(enc.subcomponent_sep, '*');
    }

    #[test]
    fn latin1_encodes_single_bytes_and_rejects_wide_chars() {
        assert_eq!(TextEncoding::Latin1.encode("Müller").unwrap().len(), 6);
        assert_eq!(TextEncoding::Utf8.encode("Müller").unwrap().len(), 7);
        assert!(matches!(
            TextEncoding::Latin1.encode("名"),
            Err(HL7Error::Encoding { ch: '名', .. })
        ));
        assert!(TextEncoding::Ascii.encode("é").is_err());
    }

    #[test]
    fn parses_encoding_names() {
        assert_eq!("UTF-8".parse::<TextEncoding>().unwrap(), TextEncoding::Utf8);
        assert_eq!("latin1".parse::<TextEncoding>().unwrap(), TextEncoding::Latin1);
        assert!("ebcdic".parse::<TextEncoding>().is_err());
    }
}
