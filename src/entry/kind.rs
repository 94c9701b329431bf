//! `EntryKind`: the tagged-union payload behind every `Entry` (spec.md §3).
//!
//! Shaped like `EntryKind` (`src/indexer/entry/entry_kind.rs`):
//! a plain enum with boxed per-variant data so the enum's stack size doesn't
//! grow with the largest variant, constructors named `new_*`, and mutators
//! (`add_includes`/`add_extends`/`add_prepends`/`set_superclass`) that
//! `panic!` when called on the wrong variant — a program error (calling an
//! include-adder on a Constant entry), not a data-dependent one, so it is
//! exempt from the "never panic for data-dependent reasons" policy
//! (spec.md §7 only covers data-dependent failures).

use std::fmt;

use super::mixin::MixinOp;
use super::parameter::Signature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceKind {
    Module,
    Class { has_explicit_superclass: bool },
    SingletonClass,
}

/// Shared data for the three Namespace variants (spec.md §3: "Namespace
/// (abstract): nesting, mixin_operations").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceData {
    pub nesting: Vec<String>,
    pub mixin_operations: Vec<MixinOp>,
    pub kind: NamespaceKind,
    /// Written superclass name, `Class` only. `None` means "no explicit
    /// superclass written"; defaulting to `::Object` (or the two root-class
    /// exceptions) happens in linearization (spec.md §4.3), not here, so
    /// this field stays a faithful record of the source text.
    pub parent_class: Option<String>,
    /// Set only for `SingletonClass`: the namespace name it is attached to.
    pub attached: Option<String>,
}

impl NamespaceData {
    pub fn module(nesting: Vec<String>) -> Self {
        Self {
            nesting,
            mixin_operations: Vec::new(),
            kind: NamespaceKind::Module,
            parent_class: None,
            attached: None,
        }
    }

    pub fn class(nesting: Vec<String>, parent_class: Option<String>) -> Self {
        Self {
            nesting,
            mixin_operations: Vec::new(),
            kind: NamespaceKind::Class {
                has_explicit_superclass: parent_class.is_some(),
            },
            parent_class,
            attached: None,
        }
    }

    pub fn singleton_class(nesting: Vec<String>, attached: String) -> Self {
        Self {
            nesting,
            mixin_operations: Vec::new(),
            kind: NamespaceKind::SingletonClass,
            parent_class: None,
            attached: Some(attached),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodVisibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodData {
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorData {
    pub signature: Signature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Method(MethodData),
    Accessor(AccessorData),
    /// Resolved alias: a copy of the target Member entry, taken at
    /// resolution time (spec.md §3: "holds a reference to the target Member
    /// by value/copy").
    MethodAlias(Box<super::Entry>),
    UnresolvedMethodAlias { new_name: String, old_name: String },
}

/// A Member entry's owner link plus its kind (spec.md §3: "Member
/// (abstract): owner link to a Namespace by name").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberData {
    pub owner: String,
    pub kind: MemberKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Namespace(NamespaceData),
    Constant,
    UnresolvedConstantAlias { target: String, nesting: Vec<String> },
    ConstantAlias { target: String },
    Member(MemberData),
    InstanceVariable { owner: Option<String> },
    ClassVariable { owner: Option<String> },
    GlobalVariable,
    Parameter { owner: String, parameter: super::parameter::Parameter },
}

impl EntryKind {
    pub fn as_namespace(&self) -> Option<&NamespaceData> {
        match self {
            EntryKind::Namespace(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_namespace_mut(&mut self) -> Option<&mut NamespaceData> {
        match self {
            EntryKind::Namespace(data) => Some(data),
            _ => None,
        }
    }

    pub fn add_mixin(&mut self, op: MixinOp) {
        match self {
            EntryKind::Namespace(data) => data.mixin_operations.push(op),
            other => panic!("cannot add a mixin operation to a {other}"),
        }
    }

    pub fn set_superclass(&mut self, name: String) {
        match self {
            EntryKind::Namespace(NamespaceData {
                kind: NamespaceKind::Class { has_explicit_superclass },
                parent_class,
                ..
            }) => {
                *has_explicit_superclass = true;
                *parent_class = Some(name);
            }
            other => panic!("cannot set a superclass on a {other}"),
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Namespace(data) => match data.kind {
                NamespaceKind::Module => write!(f, "Module"),
                NamespaceKind::Class { .. } => write!(f, "Class"),
                NamespaceKind::SingletonClass => write!(f, "SingletonClass"),
            },
            EntryKind::Constant => write!(f, "Constant"),
            EntryKind::UnresolvedConstantAlias { target, .. } => {
                write!(f, "UnresolvedConstantAlias(-> {target})")
            }
            EntryKind::ConstantAlias { target } => write!(f, "ConstantAlias(-> {target})"),
            EntryKind::Member(data) => match &data.kind {
                MemberKind::Method(_) => write!(f, "Method"),
                MemberKind::Accessor(_) => write!(f, "Accessor"),
                MemberKind::MethodAlias(_) => write!(f, "MethodAlias"),
                MemberKind::UnresolvedMethodAlias { old_name, .. } => {
                    write!(f, "UnresolvedMethodAlias(-> {old_name})")
                }
            },
            EntryKind::InstanceVariable { .. } => write!(f, "InstanceVariable"),
            EntryKind::ClassVariable { .. } => write!(f, "ClassVariable"),
            EntryKind::GlobalVariable => write!(f, "GlobalVariable"),
            EntryKind::Parameter { .. } => write!(f, "Parameter"),
        }
    }
}
