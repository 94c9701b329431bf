//! Method parameters and signatures (spec.md §3).
//!
//! `Parameter` is a sealed tagged union the same way `EntryKind` is
//! (spec.md §9: "polymorphism over the Entry taxonomy is modelled as a
//! sealed tagged union"). Shaped after `MethodParamInfo` /
//! `ParamKind` (`src/indexer/entry/entry_kind.rs`), widened to the eight
//! kinds spec.md names — that `ParamKind` only has six, missing the
//! distinction between required/optional keywords and block-forwarding
//! (`...`), both of which this spec calls out explicitly.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parameter {
    Required { name: String },
    Optional { name: String },
    Keyword { name: String },
    OptionalKeyword { name: String },
    Rest { name: String },
    KeywordRest { name: String },
    Block { name: String },
    Forwarding,
}

impl Parameter {
    pub fn rest(name: Option<String>) -> Self {
        Parameter::Rest {
            name: name.unwrap_or_else(|| "*".to_string()),
        }
    }

    pub fn keyword_rest(name: Option<String>) -> Self {
        Parameter::KeywordRest {
            name: name.unwrap_or_else(|| "**".to_string()),
        }
    }

    pub fn block(name: Option<String>) -> Self {
        Parameter::Block {
            name: name.unwrap_or_else(|| "&".to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Parameter::Required { name }
            | Parameter::Optional { name }
            | Parameter::Keyword { name }
            | Parameter::OptionalKeyword { name }
            | Parameter::Rest { name }
            | Parameter::KeywordRest { name }
            | Parameter::Block { name } => name,
            Parameter::Forwarding => "...",
        }
    }

    /// Whether an argument must be supplied for this parameter at the call site.
    pub fn is_required(&self) -> bool {
        matches!(self, Parameter::Required { .. } | Parameter::Keyword { .. })
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Required { name } => write!(f, "{name}"),
            Parameter::Optional { name } => write!(f, "{name} = ..."),
            Parameter::Keyword { name } => write!(f, "{name}:"),
            Parameter::OptionalKeyword { name } => write!(f, "{name}: ..."),
            Parameter::Rest { name } => write!(f, "*{name}"),
            Parameter::KeywordRest { name } => write!(f, "**{name}"),
            Parameter::Block { name } => write!(f, "&{name}"),
            Parameter::Forwarding => write!(f, "..."),
        }
    }
}

/// An ordered parameter list for one method overload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub parameters: Vec<Parameter>,
}

impl Signature {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    pub fn empty() -> Self {
        Self { parameters: Vec::new() }
    }

    /// Renders a human-readable parameter list, e.g. `(a, b = ..., *rest)`.
    pub fn format(&self) -> String {
        let rendered = self
            .parameters
            .iter()
            .map(Parameter::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("({rendered})")
    }

    /// Whether `positional_count` positional arguments (ignoring keywords and
    /// blocks, which this core does not track call-site values for) could
    /// satisfy this signature: at least every required positional parameter
    /// is covered, and no more are supplied than the signature accepts
    /// unless it has a rest parameter.
    pub fn matches(&self, positional_count: usize) -> bool {
        let required = self
            .parameters
            .iter()
            .filter(|p| matches!(p, Parameter::Required { .. }))
            .count();
        let has_rest = self
            .parameters
            .iter()
            .any(|p| matches!(p, Parameter::Rest { .. } | Parameter::Forwarding));
        let max = self
            .parameters
            .iter()
            .filter(|p| matches!(p, Parameter::Required { .. } | Parameter::Optional { .. }))
            .count();
        positional_count >= required && (has_rest || positional_count <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_renders_each_kind() {
        let sig = Signature::new(vec![
            Parameter::Required { name: "a".into() },
            Parameter::Optional { name: "b".into() },
            Parameter::rest(Some("rest".into())),
            Parameter::Keyword { name: "k".into() },
            Parameter::keyword_rest(None),
            Parameter::block(None),
        ]);
        assert_eq!(sig.format(), "(a, b = ..., *rest, k:, **, &)");
    }

    #[test]
    fn matches_respects_required_and_rest() {
        let sig = Signature::new(vec![
            Parameter::Required { name: "a".into() },
            Parameter::Optional { name: "b".into() },
        ]);
        assert!(!sig.matches(0));
        assert!(sig.matches(1));
        assert!(sig.matches(2));
        assert!(!sig.matches(3));

        let variadic = Signature::new(vec![Parameter::rest(None)]);
        assert!(variadic.matches(0));
        assert!(variadic.matches(50));
    }
}
