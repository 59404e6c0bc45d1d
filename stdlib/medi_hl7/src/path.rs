//! Path expressions addressing one element of a message.
//!
//! Grammar: `SEG[(n)][.field[(r)][.component[.subcomponent]]]`, all indices
//! 1-based. `SEG(n)` picks the n-th occurrence of a repeating segment and
//! `field(r)` picks a field repetition. Examples: `PID.5.1`, `OBX(2).5`,
//! `PID.3(2).1`.

use std::fmt;
use std::str::FromStr;

use crate::error::{HL7Error, HL7Result};

/// Largest index accepted at any level. Writes pad up to the index, so an
/// unbounded value would allocate without limit.
pub const MAX_INDEX: usize = 9_999;

/// Depth of the element a path addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Segment,
    Field,
    Component,
    Subcomponent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub segment: String,
    pub segment_index: usize,
    pub field: Option<usize>,
    /// Explicit field repetition. `None` means the whole field.
    pub repetition: Option<usize>,
    pub component: Option<usize>,
    pub subcomponent: Option<usize>,
}

impl Path {
    pub fn parse(input: &str) -> HL7Result<Self> {
        let err = |reason: &str| HL7Error::invalid_path(input, reason);
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(err("empty path"));
        }

        let mut parts = trimmed.split('.');
        let head = parts.next().unwrap_or_default();
        let (segment, segment_index) = split_index(head).map_err(|r| err(r.as_str()))?;
        if !is_segment_name(segment) {
            return Err(err("segment name must be three upper-case letters or digits"));
        }

        let mut path = Path {
            segment: segment.to_string(),
            segment_index: segment_index.unwrap_or(1),
            field: None,
            repetition: None,
            component: None,
            subcomponent: None,
        };

        if let Some(part) = parts.next() {
            let (field, rep) = split_index(part).map_err(|r| err(r.as_str()))?;
            path.field = Some(parse_index(field).map_err(|r| err(r.as_str()))?);
            path.repetition = rep;
        }
        if let Some(part) = parts.next() {
            path.component = Some(parse_index(part).map_err(|r| err(r.as_str()))?);
        }
        if let Some(part) = parts.next() {
            path.subcomponent = Some(parse_index(part).map_err(|r| err(r.as_str()))?);
        }
        if parts.next().is_some() {
            return Err(err("too many levels; subcomponent is the deepest"));
        }
        Ok(path)
    }

    pub fn level(&self) -> Level {
        if self.subcomponent.is_some() {
            Level::Subcomponent
        } else if self.component.is_some() {
            Level::Component
        } else if self.field.is_some() {
            Level::Field
        } else {
            Level::Segment
        }
    }

    /// Field repetition to descend into, defaulting to the first.
    pub fn repetition_or_first(&self) -> usize {
        self.repetition.unwrap_or(1)
    }
}

impl FromStr for Path {
    type Err = HL7Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segment)?;
        if self.segment_index != 1 {
            write!(f, "({})", self.segment_index)?;
        }
        if let Some(field) = self.field {
            write!(f, ".{field}")?;
            if let Some(rep) = self.repetition {
                write!(f, "({rep})")?;
            }
        }
        if let Some(c) = self.component {
            write!(f, ".{c}")?;
        }
        if let Some(s) = self.subcomponent {
            write!(f, ".{s}")?;
        }
        Ok(())
    }
}

pub(crate) fn is_segment_name(name: &str) -> bool {
    name.len() == 3
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Split `NAME(n)` into `("NAME", Some(n))`.
fn split_index(part: &str) -> Result<(&str, Option<usize>), String> {
    match part.find('(') {
        None => Ok((part, None)),
        Some(open) => {
            let inner = part[open + 1..]
                .strip_suffix(')')
                .ok_or_else(|| format!("unclosed index in '{part}'"))?;
            Ok((&part[..open], Some(parse_index(inner)?)))
        }
    }
}

fn parse_index(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("indices are 1-based".to_string()),
        Ok(n) if n > MAX_INDEX => Err(format!("index {n} exceeds {MAX_INDEX}")),
        Ok(n) => Ok(n),
        Err(_) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            Err(format!("index {s} exceeds {MAX_INDEX}"))
        }
        Err(_) => Err(format!("'{s}' is not a positive index")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_component_path() {
        let p = Path::parse("PID.5.1").unwrap();
        assert_eq!(p.segment, "PID");
        assert_eq!(p.segment_index, 1);
        assert_eq!(p.field, Some(5));
        assert_eq!(p.repetition, None);
        assert_eq!(p.component, Some(1));
        assert_eq!(p.level(), Level::Component);
    }

    #[test]
    fn parses_segment_and_field_repetitions() {
        let p = Path::parse("OBX(2).3(4).1.2").unwrap();
        assert_eq!(p.segment_index, 2);
        assert_eq!(p.field, Some(3));
        assert_eq!(p.repetition, Some(4));
        assert_eq!(p.subcomponent, Some(2));
        assert_eq!(p.level(), Level::Subcomponent);
        assert_eq!(p.to_string(), "OBX(2).3(4).1.2");
    }

    #[test]
    fn segment_only_path() {
        let p = Path::parse("MSH").unwrap();
        assert_eq!(p.level(), Level::Segment);
        assert_eq!(p.repetition_or_first(), 1);
    }

    #[test]
    fn rejects_indices_above_the_limit() {
        assert_eq!(Path::parse("PID.9999").unwrap().field, Some(MAX_INDEX));
        for bad in ["PID.10000", "OBX(3000000).1", "PID.3(10000)", "PID.18446744073709551616"] {
            let err = Path::parse(bad).unwrap_err();
            assert!(err.to_string().contains("exceeds"), "{bad}: {err}");
        }
    }

    #[test]
    fn rejects_malformed_paths() {
        for bad in ["", "pid.5", "PID.0", "PID.x", "PID.5.1.1.1", "PID(2", "PIDX.1", "PID.3()"] {
            let err = Path::parse(bad).unwrap_err();
            assert!(
                matches!(err, HL7Error::InvalidPath { .. }),
                "expected invalid path for {bad:?}, got {err:?}"
            );
        }
    }
}
