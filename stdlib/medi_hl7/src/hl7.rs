//! In-memory HL7 v2 message store.
//!
//! Segments keep their fields as `[repetition][component][subcomponent]`
//! vectors. Field 1 is stored at index 0, so for MSH index 0 holds the field
//! separator (MSH-1) and index 1 the encoding characters (MSH-2); both are kept
//! verbatim and never split.

use log::{debug, trace};

use crate::encoding::Encoding;
use crate::error::{HL7Error, HL7Result};
use crate::path::{is_segment_name, Level, Path};
use crate::store::{Header, MessageStore, TrimScope};

/// One field: `[repetition][component][subcomponent]`.
pub type Field = Vec<Vec<Vec<String>>>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HL7Message {
    pub segments: Vec<HL7Segment>,
    pub encoding: Encoding,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HL7Segment {
    pub name: String,
    pub fields: Vec<Field>,
}

impl HL7Segment {
    fn new(name: &str, enc: &Encoding) -> Self {
        let fields = if name == "MSH" {
            vec![
                raw_field(enc.field_sep.to_string()),
                raw_field(enc.encoding_characters()),
            ]
        } else {
            Vec::new()
        };
        Self {
            name: name.to_string(),
            fields,
        }
    }

    fn is_msh(&self) -> bool {
        self.name == "MSH"
    }

    /// Number of leading fields that hold delimiters and must not be edited.
    fn fixed_fields(&self) -> usize {
        if self.is_msh() {
            2
        } else {
            0
        }
    }

    pub fn to_text(&self, enc: &Encoding) -> String {
        let mut out = self.name.clone();
        let mut fields = self.fields.iter();
        if self.is_msh() {
            // MSH-1 is the separator itself, so MSH-2 follows without another one.
            if let Some(sep) = fields.next() {
                out.push_str(&field_text(sep, enc));
            }
            if let Some(chars) = fields.next() {
                out.push_str(&field_text(chars, enc));
            }
        }
        for field in fields {
            out.push(enc.field_sep);
            out.push_str(&field_text(field, enc));
        }
        out
    }
}

impl HL7Message {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encoding(encoding: Encoding) -> Self {
        Self {
            segments: Vec::new(),
            encoding,
        }
    }

    /// Parse `\r`-separated segments. `\n` and `\r\n` are accepted as well.
    pub fn parse(input: &str) -> HL7Result<Self> {
        Self::parse_with(input, Encoding::default())
    }

    /// Parse with `fallback` delimiters for messages that have no MSH segment.
    pub fn parse_with(input: &str, fallback: Encoding) -> HL7Result<Self> {
        let lines: Vec<&str> = input
            .split(['\r', '\n'])
            .filter(|l| !l.trim().is_empty())
            .collect();
        let Some(first) = lines.first() else {
            return Ok(Self::with_encoding(fallback));
        };

        let encoding = if first.starts_with("MSH") {
            extract_separators(first, &fallback)?
        } else {
            fallback
        };

        let segments = lines
            .iter()
            .map(|line| parse_segment(line, &encoding))
            .collect::<HL7Result<Vec<_>>>()?;
        debug!("parsed HL7 message with {} segments", segments.len());
        Ok(Self { segments, encoding })
    }

    pub fn segment(&self, name: &str) -> Option<&HL7Segment> {
        self.segments.iter().find(|s| s.name == name)
    }

    pub fn segment_count(&self, name: &str) -> usize {
        self.segments.iter().filter(|s| s.name == name).count()
    }

    /// Check the structure needed for a well-formed message.
    pub fn validate(&self) -> HL7Result<()> {
        let first = self
            .segments
            .first()
            .ok_or_else(|| HL7Error::validation("message has no segments"))?;
        if !first.is_msh() {
            return Err(HL7Error::validation(format!(
                "message must start with MSH, found {}",
                first.name
            )));
        }
        for seg in &self.segments {
            if !is_segment_name(&seg.name) {
                return Err(HL7Error::validation(format!(
                    "invalid segment name: {}",
                    seg.name
                )));
            }
            if seg.is_msh() {
                let sep = seg.fields.first().map(|f| field_text(f, &self.encoding));
                let chars = seg.fields.get(1).map(|f| field_text(f, &self.encoding));
                if sep.as_deref() != Some(self.encoding.field_sep.to_string().as_str())
                    || chars.as_deref() != Some(self.encoding.encoding_characters().as_str())
                {
                    return Err(HL7Error::validation(
                        "MSH-1/MSH-2 do not match the message delimiters",
                    ));
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> Option<String> {
        let enc = &self.encoding;
        let seg = self
            .segments
            .iter()
            .filter(|s| s.name == path.segment)
            .nth(path.segment_index - 1)?;
        let Some(field_no) = path.field else {
            return Some(seg.to_text(enc));
        };
        let field = seg.fields.get(field_no - 1)?;
        if path.level() == Level::Field && path.repetition.is_none() {
            return Some(field_text(field, enc));
        }
        let rep = field.get(path.repetition_or_first() - 1)?;
        let Some(comp_no) = path.component else {
            return Some(repetition_text(rep, enc));
        };
        let comp = rep.get(comp_no - 1)?;
        match path.subcomponent {
            None => Some(join(comp, enc.subcomponent_sep)),
            Some(sub_no) => comp.get(sub_no - 1).cloned(),
        }
    }

    fn write(&mut self, raw: &str, value: &str, create: bool) -> HL7Result<()> {
        let path = Path::parse(raw)?;
        let Some(field_no) = path.field else {
            return Err(HL7Error::invalid_path(raw, "cannot assign a whole segment"));
        };
        let seg_pos = self.segment_position(&path, raw, create)?;
        let enc = self.encoding.clone();
        let seg = &mut self.segments[seg_pos];
        if field_no <= seg.fixed_fields() {
            return Err(HL7Error::invalid_path(
                raw,
                "MSH-1 and MSH-2 hold the message delimiters",
            ));
        }

        ensure_len(&mut seg.fields, field_no, empty_field, create, raw)?;
        let field = &mut seg.fields[field_no - 1];
        if path.level() == Level::Field && path.repetition.is_none() {
            *field = parse_field_components(value, &enc);
            return Ok(());
        }

        let rep_no = path.repetition_or_first();
        ensure_len(field, rep_no, empty_repetition, create, raw)?;
        let rep = &mut field[rep_no - 1];
        let Some(comp_no) = path.component else {
            *rep = parse_repetition(value, &enc);
            return Ok(());
        };

        ensure_len(rep, comp_no, empty_component, create, raw)?;
        let comp = &mut rep[comp_no - 1];
        match path.subcomponent {
            None => *comp = split(value, enc.subcomponent_sep),
            Some(sub_no) => {
                ensure_len(comp, sub_no, String::new, create, raw)?;
                comp[sub_no - 1] = value.to_string();
            }
        }
        Ok(())
    }

    /// Index of the addressed segment, appending occurrences when `create`.
    fn segment_position(&mut self, path: &Path, raw: &str, create: bool) -> HL7Result<usize> {
        let positions: Vec<usize> = self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name == path.segment)
            .map(|(i, _)| i)
            .collect();
        if let Some(&pos) = positions.get(path.segment_index - 1) {
            return Ok(pos);
        }
        if !create {
            return Err(HL7Error::not_found(raw));
        }
        for _ in positions.len()..path.segment_index {
            let seg = HL7Segment::new(&path.segment, &self.encoding);
            if seg.is_msh() && self.segment("MSH").is_none() {
                self.segments.insert(0, seg);
            } else {
                self.segments.push(seg);
            }
            trace!("created segment {}", path.segment);
        }
        Ok(self
            .segments
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name == path.segment)
            .map(|(i, _)| i)
            .nth(path.segment_index - 1)
            .unwrap_or(self.segments.len() - 1))
    }

    fn trim_segment(seg: &mut HL7Segment, scope: TrimScope) {
        let fixed = seg.fixed_fields();
        for field in seg.fields.iter_mut().skip(fixed) {
            for rep in field.iter_mut() {
                if scope.includes(TrimScope::Subcomponents) {
                    for comp in rep.iter_mut() {
                        pop_trailing(comp, |s| s.is_empty());
                    }
                }
                if scope.includes(TrimScope::Components) {
                    pop_trailing(rep, |c| c.iter().all(String::is_empty));
                }
            }
            if scope.includes(TrimScope::Repetitions) {
                pop_trailing(field, is_blank_repetition);
            }
        }
        if scope.includes(TrimScope::Fields) {
            while seg.fields.len() > fixed
                && seg.fields.last().is_some_and(|f| f.iter().all(is_blank_repetition))
            {
                seg.fields.pop();
            }
        }
    }
}

impl MessageStore for HL7Message {
    fn encoding(&self) -> &Encoding {
        &self.encoding
    }

    fn get(&self, path: &str) -> HL7Result<String> {
        let parsed = Path::parse(path)?;
        self.resolve(&parsed)
            .ok_or_else(|| HL7Error::not_found(path))
    }

    fn value_exists(&self, path: &str) -> HL7Result<bool> {
        let parsed = Path::parse(path)?;
        Ok(self.resolve(&parsed).is_some())
    }

    fn set(&mut self, path: &str, value: &str) -> HL7Result<()> {
        self.write(path, value, false)
    }

    fn put(&mut self, path: &str, value: &str) -> HL7Result<()> {
        self.write(path, value, true)
    }

    fn remove_trailing_delimiters(&mut self, scope: TrimScope) {
        debug!("removing trailing delimiters, scope {scope}");
        for seg in &mut self.segments {
            Self::trim_segment(seg, scope);
        }
    }

    fn serialize(&self, validate: bool) -> HL7Result<String> {
        if validate {
            self.validate()?;
        }
        let mut out = String::new();
        for seg in &self.segments {
            out.push_str(&seg.to_text(&self.encoding));
            out.push('\r');
        }
        Ok(out)
    }

    fn validate_text(&self, text: &str) -> HL7Result<()> {
        let reparsed = HL7Message::parse_with(text, self.encoding.clone())
            .map_err(|e| HL7Error::validation(format!("serialized text does not re-parse: {e}")))?;
        reparsed.validate()
    }

    fn insert_header(&mut self, header: &Header) -> HL7Result<()> {
        let enc = &self.encoding;
        let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
        let values = [
            header.sending_application.as_str(),
            header.sending_facility.as_str(),
            header.receiving_application.as_str(),
            header.receiving_facility.as_str(),
            timestamp.as_str(),
            header.security.as_deref().unwrap_or(""),
            header.message_type.as_str(),
            header.control_id.as_str(),
            header.processing_id.as_str(),
            header.version.as_str(),
        ];
        let mut msh = HL7Segment::new("MSH", enc);
        msh.fields
            .extend(values.iter().map(|v| parse_field_components(v, enc)));

        self.segments.retain(|s| !s.is_msh());
        self.segments.insert(0, msh);
        debug!(
            "inserted MSH header {} control id {}",
            header.message_type, header.control_id
        );
        Ok(())
    }
}

fn extract_separators(msh_line: &str, fallback: &Encoding) -> HL7Result<Encoding> {
    let mut chars = msh_line.chars().skip(3);
    let field_sep = chars
        .next()
        .ok_or_else(|| HL7Error::validation("MSH segment too short to extract separators"))?;
    let encoding_chars: String = chars.take_while(|c| *c != field_sep).collect();
    let mut enc = Encoding::from_msh(field_sep, &encoding_chars)?;
    enc.null_value = fallback.null_value.clone();
    Ok(enc)
}

fn parse_segment(line: &str, enc: &Encoding) -> HL7Result<HL7Segment> {
    let name = line
        .get(..3)
        .filter(|n| is_segment_name(n))
        .ok_or_else(|| HL7Error::validation(format!("invalid segment name: {line}")))?;
    let rest = &line[3..];
    let mut chars = rest.chars();
    match chars.next() {
        None => {
            return Ok(HL7Segment {
                name: name.to_string(),
                fields: Vec::new(),
            })
        }
        Some(c) if c == enc.field_sep => {}
        Some(c) => {
            return Err(HL7Error::validation(format!(
                "expected field separator after {name}, found {c:?}"
            )))
        }
    }

    let body = chars.as_str();
    let mut fields = Vec::new();
    if name == "MSH" {
        fields.push(raw_field(enc.field_sep.to_string()));
        let mut parts = body.split(enc.field_sep);
        fields.push(raw_field(parts.next().unwrap_or_default().to_string()));
        fields.extend(parts.map(|p| parse_field_components(p, enc)));
    } else {
        fields.extend(body.split(enc.field_sep).map(|p| parse_field_components(p, enc)));
    }
    Ok(HL7Segment {
        name: name.to_string(),
        fields,
    })
}

/// Parse one field into repetitions/components/subcomponents.
/// Returns a 3-level nested vector: [repetition][component][subcomponent]
pub fn parse_field_components(field: &str, enc: &Encoding) -> Field {
    field
        .split(enc.repetition_sep)
        .map(|rep| parse_repetition(rep, enc))
        .collect()
}

fn parse_repetition(rep: &str, enc: &Encoding) -> Vec<Vec<String>> {
    rep.split(enc.component_sep)
        .map(|comp| split(comp, enc.subcomponent_sep))
        .collect()
}

fn split(s: &str, sep: char) -> Vec<String> {
    s.split(sep).map(str::to_string).collect()
}

fn join(parts: &[String], sep: char) -> String {
    parts.join(sep.to_string().as_str())
}

fn repetition_text(rep: &[Vec<String>], enc: &Encoding) -> String {
    rep.iter()
        .map(|comp| join(comp, enc.subcomponent_sep))
        .collect::<Vec<_>>()
        .join(enc.component_sep.to_string().as_str())
}

fn field_text(field: &Field, enc: &Encoding) -> String {
    field
        .iter()
        .map(|rep| repetition_text(rep, enc))
        .collect::<Vec<_>>()
        .join(enc.repetition_sep.to_string().as_str())
}

fn raw_field(value: String) -> Field {
    vec![vec![vec![value]]]
}

fn empty_field() -> Field {
    raw_field(String::new())
}

fn empty_repetition() -> Vec<Vec<String>> {
    vec![empty_component()]
}

fn empty_component() -> Vec<String> {
    vec![String::new()]
}

fn is_blank_repetition(rep: &Vec<Vec<String>>) -> bool {
    rep.iter().all(|c| c.iter().all(String::is_empty))
}

/// Drop trailing blank entries, keeping at least one.
fn pop_trailing<T>(items: &mut Vec<T>, blank: impl Fn(&T) -> bool) {
    while items.len() > 1 && items.last().is_some_and(&blank) {
        items.pop();
    }
}

/// Grow `items` to `len` with `fill`, or report `NotFound` when not creating.
fn ensure_len<T>(
    items: &mut Vec<T>,
    len: usize,
    fill: impl Fn() -> T,
    create: bool,
    path: &str,
) -> HL7Result<()> {
    if items.len() >= len {
        return Ok(());
    }
    if !create {
        return Err(HL7Error::not_found(path));
    }
    items.resize_with(len, fill);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn field_text_joins_all_levels() {
        let enc = Encoding::default();
        let field = parse_field_components("A^B&C~D", &enc);
        assert_eq!(field.len(), 2);
        assert_eq!(field[0][1], vec!["B".to_string(), "C".to_string()]);
        assert_eq!(field_text(&field, &enc), "A^B&C~D");
    }

    #[test]
    fn pop_trailing_keeps_one_entry() {
        let mut items = vec![String::new(), String::new()];
        pop_trailing(&mut items, |s| s.is_empty());
        assert_eq!(items, vec![String::new()]);
    }
}
