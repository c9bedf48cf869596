//! Artwork manifest mining
//!
//! The manifest is an untyped tree (typically `{"years": {"2020": [...]}}`)
//! whose arrays hold serialized anchor tags, one per artwork. Mining collects
//! every array reachable through objects and pulls the protocol-relative
//! `href` target out of each element.

use crate::page::{PageError, PageResult};
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Matches `<a href="//TARGET"` and captures `TARGET`
fn anchor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"<a\s+href="//([^"]+)""#).expect("valid regex"))
}

/// Collects every array reachable from `value` through objects
///
/// Objects are descended only through truthy values (non-empty containers and
/// strings, non-zero numbers, `true`). Arrays are collected whole and not
/// descended into; scalars are ignored.
pub fn collect_arrays(value: &Value) -> Vec<&[Value]> {
    let mut arrays = Vec::new();
    collect_into(value, &mut arrays);
    arrays
}

fn collect_into<'a>(value: &'a Value, arrays: &mut Vec<&'a [Value]>) {
    match value {
        Value::Object(map) => {
            for child in map.values().filter(|v| is_truthy(v)) {
                collect_into(child, arrays);
            }
        }
        Value::Array(items) => arrays.push(items.as_slice()),
        _ => {}
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Extracts the target of a `<a href="//...">` fragment, without the leading `//`
///
/// # Example
///
/// ```
/// use artsweep::page::extract_anchor_target;
///
/// let fragment = r#"<a href="//site/art/view/1" class="item">"#;
/// assert_eq!(extract_anchor_target(fragment), Some("site/art/view/1"));
/// ```
pub fn extract_anchor_target(fragment: &str) -> Option<&str> {
    anchor_pattern()
        .captures(fragment)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Mines candidate artwork links from a manifest
///
/// Every element of every collected array must be a string holding an anchor
/// fragment. Anything else means the page format changed, and is reported as
/// [`PageError::ContractViolation`] instead of being skipped.
pub fn mine_link_lists(manifest: &Value) -> PageResult<Vec<String>> {
    let mut links = Vec::new();

    for array in collect_arrays(manifest) {
        for element in array {
            let Value::String(fragment) = element else {
                return Err(PageError::ContractViolation(format!(
                    "expected an anchor fragment string, got {}",
                    element
                )));
            };

            let target = extract_anchor_target(fragment).ok_or_else(|| {
                PageError::ContractViolation(truncate_for_error(fragment).to_string())
            })?;
            links.push(target.to_string());
        }
    }

    Ok(links)
}

fn truncate_for_error(fragment: &str) -> &str {
    match fragment.char_indices().nth(120) {
        Some((idx, _)) => &fragment[..idx],
        None => fragment,
    }
}
