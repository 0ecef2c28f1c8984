//! Name derivations: packages, simple names, and naming-convention nesting.

use crate::classfile::descriptor::{element_type, is_primitive};
use crate::classfile::RawUnit;

/// `com.acme` for `com.acme.Foo$Bar`; empty for the default package.
/// Arrays live in their element type's package; primitives in the root.
pub fn package_of(name: &str) -> &str {
    let element = element_type(name);
    if is_primitive(element) {
        return "";
    }
    element.rfind('.').map(|i| &element[..i]).unwrap_or("")
}

/// The part of a name after its package.
fn binary_simple_name(name: &str) -> &str {
    name.rfind('.').map(|i| &name[i + 1..]).unwrap_or(name)
}

/// Enclosing unit implied by a `$` in the binary name, if any.
///
/// A `$` at the very start or end of the simple part is part of the name
/// rather than a separator.
pub fn enclosing_by_name(name: &str) -> Option<String> {
    if name.ends_with("[]") || is_primitive(name) {
        return None;
    }
    let simple = binary_simple_name(name);
    let split = simple.rfind('$')?;
    if split == 0 || split == simple.len() - 1 {
        return None;
    }
    let package_len = name.len() - simple.len();
    Some(name[..package_len + split].to_string())
}

/// Source-level simple name.
///
/// Prefers the unit's own `InnerClasses` entry (absent name means
/// anonymous), then the naming convention: an all-digit suffix is
/// anonymous, a digit-prefixed suffix is a local unit.
pub fn simple_name(name: &str, raw: Option<&RawUnit>) -> String {
    if let Some(component) = name.strip_suffix("[]") {
        return format!("{}[]", simple_name(component, None));
    }
    if let Some(own) = raw.and_then(RawUnit::own_nesting) {
        return own.simple_name.clone().unwrap_or_default();
    }
    let simple = binary_simple_name(name);
    if enclosing_by_name(name).is_none() {
        return simple.to_string();
    }
    let suffix = simple.rsplit('$').next().unwrap_or(simple);
    suffix.trim_start_matches(|c: char| c.is_ascii_digit()).to_string()
}
