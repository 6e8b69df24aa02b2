//! Value serialization and defensive JSON lookup helpers shared by every consumer.

use std::io;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::Formatter;

use crate::constants::scores::{REPORT_DECIMALS, SCORE_MAX, SCORE_MIN};
use crate::types::CellValue;

/// Render any JSON value as a single table cell.
///
/// - `null` becomes an empty string.
/// - Booleans become `TRUE` / `FALSE`.
/// - Numbers keep their decimal form.
/// - Lists and objects become compact JSON with `", "` and `": "` separators.
/// - Strings are kept as-is.
///
/// Line feeds and carriage returns are always replaced with single spaces, so
/// the result never breaks a line-oriented output format.
pub fn serialize_value(value: &Value) -> CellValue {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => flatten_line_breaks(text),
        Value::Array(_) | Value::Object(_) => flatten_line_breaks(&compact_json(value)),
    }
}

/// Replace every `\n` and `\r` with a single space.
pub fn flatten_line_breaks<T: AsRef<str>>(text: T) -> String {
    text.as_ref()
        .chars()
        .map(|ch| if ch == '\n' || ch == '\r' { ' ' } else { ch })
        .collect()
}

/// JSON text with a space after each item and key separator (`[1, 2]`, `{"a": 1}`).
fn compact_json(value: &Value) -> String {
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, SpacedFormatter);
    if value.serialize(&mut serializer).is_err() {
        return value.to_string();
    }
    String::from_utf8(buffer).unwrap_or_else(|_| value.to_string())
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Walk a dotted path (`a.b.c`) through nested objects.
///
/// Returns `None` as soon as a segment is absent or the current value is not an
/// object; never panics.
pub fn lookup_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_object()?.get(segment))
}

/// First non-null value among synonym paths.
pub fn lookup_first<'a>(value: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| lookup_path(value, path))
        .find(|found| !found.is_null())
}

/// True for an absent value, `null`, or the empty string.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

/// Numeric view of a JSON value; booleans and strings are not numbers.
pub fn as_number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|number| number.is_finite())
}

/// True if `score` lies in the accepted closed score range.
pub fn score_in_range(score: f64) -> bool {
    (SCORE_MIN..=SCORE_MAX).contains(&score)
}

/// Round to the number of decimals used in reported statistics.
///
/// Exact halves go to the even neighbour (`5.125` -> `5.12`).
pub fn round_report(value: f64) -> f64 {
    let factor = 10f64.powi(REPORT_DECIMALS);
    (value * factor).round_ties_even() / factor
}
