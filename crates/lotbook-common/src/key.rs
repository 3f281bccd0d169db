//! Attribute-key derivation and validation
//!
//! An attribute definition's `key` is derived from its human label: trimmed,
//! lowercased, whitespace runs collapsed to a single underscore, and any
//! character outside `[a-z0-9_]` dropped. The same normalization runs on
//! create and on rename so item documents always see canonical keys.

use std::sync::LazyLock;

/// A normalized attribute key: lowercase alphanumerics and underscores
static KEY_PATTERN: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new("^[a-z0-9_]+$").expect("invalid key pattern"));

/// Check whether a string already is a canonical attribute key
pub fn is_valid_key(key: &str) -> bool {
    KEY_PATTERN.is_match(key)
}

/// Derive the canonical attribute key from a human label
///
/// Returns an empty string when nothing survives normalization; callers
/// treat that as invalid input.
///
/// # Examples
///
/// ```
/// use lotbook_common::normalize_key;
///
/// assert_eq!(normalize_key("Viscosity (cSt)"), "viscosity_cst");
/// assert_eq!(normalize_key("  Flash Point  "), "flash_point");
/// assert_eq!(normalize_key("pH"), "ph");
/// ```
pub fn normalize_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.trim().to_lowercase().chars() {
        if c.is_whitespace() {
            pending_separator = !key.is_empty();
        } else if c.is_ascii_alphanumeric() || c == '_' {
            if pending_separator {
                key.push('_');
                pending_separator = false;
            }
            key.push(c);
        }
    }

    key
}
