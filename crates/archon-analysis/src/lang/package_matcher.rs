//! Package identifiers: dotted package names with wildcards.
//!
//! - `..` matches any number of segments, including none
//! - `*` matches within a single segment
//! - `(*)` captures one segment, `(**)` captures any dotted run
//!
//! `com.acme..`, `..service..`, `com.(*)..` are typical identifiers.

use regex::Regex;

#[derive(Debug, Clone)]
pub struct PackageMatcher {
    identifier: String,
    pattern: Option<Regex>,
}

impl PackageMatcher {
    /// Identifiers that do not convert to a valid pattern match their
    /// literal text only.
    pub fn new(identifier: impl Into<String>) -> Self {
        let identifier = identifier.into();
        let pattern = to_regex(&identifier).and_then(|r| Regex::new(&r).ok());
        if pattern.is_none() {
            tracing::debug!(identifier = %identifier, "package identifier matches literally");
        }
        Self { identifier, pattern }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn matches(&self, package: &str) -> bool {
        match self.pattern {
            Some(ref pattern) => pattern.is_match(package),
            None => package == self.identifier,
        }
    }

    /// Captured groups when `package` matches, in order.
    pub fn capture(&self, package: &str) -> Option<Vec<String>> {
        match self.pattern {
            Some(ref pattern) => pattern.captures(package).map(|c| {
                c.iter()
                    .skip(1)
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            }),
            None => (package == self.identifier).then(Vec::new),
        }
    }
}

const SEGMENT: &str = "[^.]+";

fn to_regex(identifier: &str) -> Option<String> {
    if identifier.contains("...") || identifier.is_empty() {
        return None;
    }
    if identifier == ".." {
        return Some("^.*$".to_string());
    }
    let mut out = String::from("^");
    let mut rest = identifier;
    let mut at_start = true;
    while !rest.is_empty() {
        if let Some(tail) = rest.strip_prefix("(**)") {
            out.push_str("(.*)");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("(*)") {
            out.push_str("([^.]*)");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix("..") {
            if at_start {
                out.push_str(&format!("(?:{SEGMENT}\\.)*"));
            } else if tail.is_empty() {
                out.push_str(&format!("(?:\\.{SEGMENT})*"));
            } else {
                out.push_str(&format!("(?:\\.{SEGMENT})*\\."));
            }
            rest = tail;
        } else {
            let mut chars = rest.chars();
            let c = chars.next()?;
            match c {
                '.' => out.push_str("\\."),
                '*' => out.push_str("[^.]*"),
                '(' | ')' => return None,
                other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
            rest = chars.as_str();
        }
        at_start = false;
    }
    out.push('$');
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_dots_match_any_depth() {
        let m = PackageMatcher::new("com.acme..");
        assert!(m.matches("com.acme"));
        assert!(m.matches("com.acme.web.api"));
        assert!(!m.matches("com.acmex"));
        assert!(!m.matches("org.acme"));

        let m = PackageMatcher::new("..service..");
        assert!(m.matches("service"));
        assert!(m.matches("com.acme.service.impl"));
        assert!(!m.matches("com.acme.services"));

        let m = PackageMatcher::new("com..impl");
        assert!(m.matches("com.impl"));
        assert!(m.matches("com.a.b.impl"));
        assert!(!m.matches("com.a.b.impl.x"));

        assert!(PackageMatcher::new("..").matches(""));
    }

    #[test]
    fn single_star_stays_within_a_segment() {
        let m = PackageMatcher::new("com.*.api");
        assert!(m.matches("com.acme.api"));
        assert!(!m.matches("com.acme.web.api"));
    }

    #[test]
    fn captures_slices() {
        let m = PackageMatcher::new("com.acme.(*)..");
        assert_eq!(m.capture("com.acme.billing.internal"), Some(vec!["billing".to_string()]));
        assert_eq!(m.capture("org.other"), None);

        let m = PackageMatcher::new("com.(**).api");
        assert_eq!(m.capture("com.a.b.api"), Some(vec!["a.b".to_string()]));
    }

    #[test]
    fn malformed_identifiers_match_literally() {
        let m = PackageMatcher::new("com...acme");
        assert!(m.matches("com...acme"));
        assert!(!m.matches("com.acme"));
    }
}
