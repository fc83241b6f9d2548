//! Small helpers over `roxmltree` shared by the tracker decoders.

use roxmltree::Node;

use super::error::{DecodeError, RecordError};

/// Fail unless the document element is `<expected>`.
pub(crate) fn expect_root(root: Node<'_, '_>, expected: &'static str) -> Result<(), DecodeError> {
    if root.has_tag_name(expected) {
        Ok(())
    } else {
        Err(DecodeError::UnexpectedRoot {
            expected,
            found: root.tag_name().name().to_string(),
        })
    }
}

/// Trimmed text of the first child element named `name`.
///
/// Absent elements, self-closing elements and whitespace-only text all
/// read as `None`.
pub(crate) fn child_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub(crate) fn required<'a>(node: Node<'a, '_>, name: &'static str) -> Result<&'a str, RecordError> {
    child_text(node, name).ok_or(RecordError::Missing(name))
}

/// Parse a `0`/`1` (or `true`/`false`) flag. Absent means false.
pub(crate) fn flag(node: Node<'_, '_>, name: &str) -> bool {
    matches!(
        child_text(node, name).map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true")
    )
}

/// Parse an optional numeric field, ignoring values that do not parse.
pub(crate) fn optional_number<T: std::str::FromStr>(node: Node<'_, '_>, name: &str) -> Option<T> {
    child_text(node, name).and_then(|t| t.parse().ok())
}
