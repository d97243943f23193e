//! JSON output helpers shared by the page types

use serde::ser::Error as _;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Serialize to JSON, minified unless an indent width is given
///
/// Indented output is for debugging only; wiki pages have a size limit and
/// must be written minified.
pub(crate) fn to_string_indented<T: Serialize + ?Sized>(
    value: &T,
    indent: Option<usize>,
) -> serde_json::Result<String> {
    let width = match indent {
        None | Some(0) => return serde_json::to_string(value),
        Some(width) => width,
    };

    let indent = " ".repeat(width);
    let mut out = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(serde_json::Error::custom)
}
