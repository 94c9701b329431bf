//! Opaque file identifiers.
//!
//! spec.md's URI is "opaque, printable identifier; plus an optional
//! require-path." We keep it as a thin `Arc<str>` wrapper rather than parsing
//! it as an RFC 3986 URL: the host (workspace file discoverer, out of scope
//! here) is free to hand us whatever canonical string it likes — a
//! `file://` URL, a gem-relative path, anything printable — and all the core
//! needs is string equality and a cheap clone for the many places an Entry's
//! origin is carried around (`files_to_entries`, `CompactLocation`-style
//! back-references).

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Eq, Hash)]
pub struct Uri(Arc<str>);

impl Uri {
    pub fn new(canonical: impl Into<Arc<str>>) -> Self {
        Self(canonical.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Uri::new(value)
    }
}

impl From<String> for Uri {
    fn from(value: String) -> Self {
        Uri::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_is_by_canonical_string() {
        let a = Uri::new("file:///a.rb");
        let b = Uri::from("file:///a.rb".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_are_distinct_uris() {
        assert_ne!(Uri::new("file:///a.rb"), Uri::new("file:///b.rb"));
    }
}
