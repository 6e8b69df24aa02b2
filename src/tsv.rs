//! Tab-separated record writing with the two quoting styles the outputs use.

use std::io::{self, Write};

use crate::constants::tsv::{FIELD_DELIMITER, LINE_TERMINATOR, QUOTE};

/// When a field is wrapped in quotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quoting {
    /// Quote every field, header included.
    All,
    /// Quote only fields containing a delimiter, quote, or line break.
    Minimal,
}

impl Quoting {
    fn needs_quotes(self, field: &str) -> bool {
        match self {
            Quoting::All => true,
            Quoting::Minimal => field
                .chars()
                .any(|ch| ch == FIELD_DELIMITER || ch == QUOTE || ch == '\n' || ch == '\r'),
        }
    }
}

/// Render one field, doubling embedded quotes when it is quoted.
pub fn encode_field(field: &str, quoting: Quoting) -> String {
    if !quoting.needs_quotes(field) {
        return field.to_string();
    }
    let mut encoded = String::with_capacity(field.len() + 2);
    encoded.push(QUOTE);
    for ch in field.chars() {
        if ch == QUOTE {
            encoded.push(QUOTE);
        }
        encoded.push(ch);
    }
    encoded.push(QUOTE);
    encoded
}

/// Write one record followed by the line terminator.
pub fn write_record<W, I, S>(writer: &mut W, fields: I, quoting: Quoting) -> io::Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for (idx, field) in fields.into_iter().enumerate() {
        if idx > 0 {
            line.push(FIELD_DELIMITER);
        }
        line.push_str(&encode_field(field.as_ref(), quoting));
    }
    line.push_str(LINE_TERMINATOR);
    writer.write_all(line.as_bytes())
}
