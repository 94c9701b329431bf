//! `MixinOp` (spec.md §3): an include/prepend/extend edge from a namespace
//! to a module, captured as written (not yet resolved) — the same
//! capture-now-resolve-later shape as `MixinRef`
//! (`src/indexer/entry/mod.rs`), simplified to carry the written name as a
//! single string (leading `"::"` signals an absolute path) rather than a
//! pre-split `Vec<RubyConstant>`, since constant resolution here always
//! starts from the full written text anyway (spec.md §4.4.1).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixinKind {
    Include,
    Prepend,
    Extend,
}

impl fmt::Display for MixinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MixinKind::Include => "include",
            MixinKind::Prepend => "prepend",
            MixinKind::Extend => "extend",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MixinOp {
    pub kind: MixinKind,
    pub module_name: String,
}

impl MixinOp {
    pub fn new(kind: MixinKind, module_name: impl Into<String>) -> Self {
        Self {
            kind,
            module_name: module_name.into(),
        }
    }
}
