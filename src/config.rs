//! Host-negotiated configuration (spec.md §6).
//!
//! Follows the `RubyFastLspConfig` shape (flat `serde` struct,
//! `#[serde(default)]`, a hand-written `Default` impl) but adds
//! `deny_unknown_fields` so an unrecognized key surfaces as a
//! `ConfigValidationError` at load time rather than being silently ignored,
//! per spec.md §6 ("Unknown keys or wrong types surface as a validation
//! error on load").

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigValidationError;
use crate::location::Encoding;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(with = "encoding_serde")]
    pub encoding: Encoding,

    pub included_patterns: Vec<String>,

    pub excluded_patterns: Vec<String>,

    pub included_gems: Vec<String>,

    pub excluded_gems: Vec<String>,

    pub excluded_magic_comments: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf16,
            included_patterns: vec!["**/*.rb".to_string()],
            excluded_patterns: Vec::new(),
            included_gems: Vec::new(),
            excluded_gems: Vec::new(),
            excluded_magic_comments: vec!["frozen_string_literal:".to_string()],
        }
    }
}

impl Config {
    /// Parses and validates configuration JSON found at a workspace root
    /// (spec.md §6: `{excluded_gems, included_gems, excluded_patterns,
    /// included_patterns, excluded_magic_comments}`).
    pub fn load(json: &str) -> Result<Self, ConfigValidationError> {
        serde_json::from_str(json).map_err(|e| ConfigValidationError {
            message: e.to_string(),
        })
    }

    pub fn included_glob(&self) -> Result<GlobSet, ConfigValidationError> {
        GlobSet::compile(&self.included_patterns)
    }

    pub fn excluded_glob(&self) -> Result<GlobSet, ConfigValidationError> {
        GlobSet::compile(&self.excluded_patterns)
    }

    /// Builds the per-file comment-skip regex: a comment is ignored during
    /// the Declaration Listener's comment-collection pass (spec.md §4.3) if
    /// its body starts with one of these prefixes.
    pub fn magic_comment_regex(&self) -> Option<Regex> {
        if self.excluded_magic_comments.is_empty() {
            return None;
        }
        let alternatives: Vec<String> = self
            .excluded_magic_comments
            .iter()
            .map(|prefix| regex::escape(prefix))
            .collect();
        Regex::new(&format!("^({})", alternatives.join("|"))).ok()
    }
}

mod encoding_serde {
    use super::Encoding;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(encoding: &Encoding, s: S) -> Result<S::Ok, S::Error> {
        let name = match encoding {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16 => "utf-16",
            Encoding::Utf32 => "utf-32",
        };
        name.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Encoding, D::Error> {
        let name = String::deserialize(d)?;
        match name.as_str() {
            "utf-8" => Ok(Encoding::Utf8),
            "utf-16" => Ok(Encoding::Utf16),
            "utf-32" => Ok(Encoding::Utf32),
            other => Err(serde::de::Error::custom(format!(
                "unknown encoding {other:?}, expected utf-8, utf-16, or utf-32"
            ))),
        }
    }
}

/// A compiled set of glob patterns (`**`, `{,}` alternation honored),
/// built on `regex` rather than a dedicated glob crate — `regex` is already
/// in the dependency table for the magic-comment matcher, so reusing it here
/// keeps the dependency stack narrow rather than adding a new crate
/// for one concern.
#[derive(Debug, Clone)]
pub struct GlobSet {
    patterns: Vec<Regex>,
}

impl GlobSet {
    pub fn compile(patterns: &[String]) -> Result<Self, ConfigValidationError> {
        let compiled = patterns
            .iter()
            .map(|p| glob_to_regex(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns: compiled })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Translates one glob pattern into an anchored regex.
///
/// - `**` matches any number of path segments (including zero).
/// - `*` matches anything but a `/`.
/// - `{a,b}` alternation expands to a regex group.
fn glob_to_regex(pattern: &str) -> Result<Regex, ConfigValidationError> {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // Consume an optional following slash so `**/` can match zero segments.
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("(?:.*/)?");
                    } else {
                        out.push_str(".*");
                    }
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '{' => {
                out.push('(');
                for c2 in chars.by_ref() {
                    if c2 == '}' {
                        break;
                    } else if c2 == ',' {
                        out.push('|');
                    } else {
                        out.push_str(&regex::escape(&c2.to_string()));
                    }
                }
                out.push(')');
            }
            '.' | '+' | '(' | ')' | '|' | '^' | '$' | '[' | ']' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('$');
    Regex::new(&out).map_err(|e| ConfigValidationError {
        message: format!("invalid glob pattern {pattern:?}: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_includes_all_ruby_files() {
        let config = Config::default();
        let glob = config.included_glob().unwrap();
        assert!(glob.is_match("lib/foo.rb"));
        assert!(glob.is_match("foo.rb"));
        assert!(!glob.is_match("foo.txt"));
    }

    #[test]
    fn double_star_matches_nested_paths() {
        let glob = GlobSet::compile(&["lib/**/*.rb".to_string()]).unwrap();
        assert!(glob.is_match("lib/a/b/c.rb"));
        assert!(glob.is_match("lib/c.rb"));
        assert!(!glob.is_match("spec/c.rb"));
    }

    #[test]
    fn brace_alternation_expands() {
        let glob = GlobSet::compile(&["*.{rb,rbs}".to_string()]).unwrap();
        assert!(glob.is_match("foo.rb"));
        assert!(glob.is_match("foo.rbs"));
        assert!(!glob.is_match("foo.txt"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = Config::load(r#"{"notAField": true}"#).unwrap_err();
        assert!(err.message.contains("notAField") || err.message.contains("unknown field"));
    }

    #[test]
    fn documented_schema_loads() {
        let config = Config::load(
            r#"{"excluded_gems": ["foo"], "included_gems": ["bar"], "excluded_patterns": ["spec/**"], "included_patterns": ["lib/**/*.rb"], "excluded_magic_comments": ["typed:"]}"#,
        )
        .unwrap();
        assert_eq!(config.excluded_gems, vec!["foo".to_string()]);
        assert_eq!(config.included_gems, vec!["bar".to_string()]);
        assert_eq!(config.excluded_patterns, vec!["spec/**".to_string()]);
        assert_eq!(config.included_patterns, vec!["lib/**/*.rb".to_string()]);
        assert_eq!(config.excluded_magic_comments, vec!["typed:".to_string()]);
    }

    #[test]
    fn magic_comment_regex_matches_prefix() {
        let config = Config::default();
        let re = config.magic_comment_regex().unwrap();
        assert!(re.is_match("frozen_string_literal: true"));
        assert!(!re.is_match("a normal comment"));
    }
}
