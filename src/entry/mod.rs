//! The Entry taxonomy (spec.md §3): a sealed, tagged union over every
//! declarable Ruby thing, with shared header fields (`name`, `uri`,
//! `location`, `name_location`, `comments`, `visibility`) and a per-variant
//! payload in `EntryKind`. Shaped after a flat
//! `Entry { fqn_id, location, kind }` header and a boxed `EntryKind`
//! (`src/indexer/entry/mod.rs`, `entry_kind.rs`) — widened here to carry the
//! header fields spec.md actually names (comments, name_location,
//! visibility) instead of the interned-FQN/type-inference fields that
//! belong to the Non-goal'd type-inference layer.

pub mod builder;
pub mod kind;
pub mod mixin;
pub mod parameter;

pub use builder::EntryBuilder;
pub use kind::{
    AccessorData, EntryKind, MemberData, MemberKind, MethodData, MethodVisibility, NamespaceData,
    NamespaceKind,
};
pub use mixin::{MixinKind, MixinOp};
pub use parameter::{Parameter, Signature};

use crate::location::Location;
use crate::uri::Uri;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub uri: Uri,
    pub location: Location,
    pub name_location: Location,
    pub comments: Option<String>,
    pub visibility: Visibility,
    pub kind: EntryKind,
}

impl Entry {
    /// spec.md §3: `name = nesting.join("::")` for namespaces, and the
    /// `"X::<Class:X>"` spelling for singleton classes (invariant I6).
    pub fn namespace_name(nesting: &[String]) -> String {
        nesting.join("::")
    }

    pub fn singleton_class_name(attached_fqn: &str) -> String {
        let leaf = attached_fqn.rsplit("::").next().unwrap_or(attached_fqn);
        format!("{attached_fqn}::<Class:{leaf}>")
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self.kind, EntryKind::Namespace(_))
    }

    pub fn is_singleton(&self) -> bool {
        matches!(
            self.kind,
            EntryKind::Namespace(NamespaceData {
                kind: NamespaceKind::SingletonClass,
                ..
            })
        )
    }

    pub fn as_namespace(&self) -> Option<&NamespaceData> {
        self.kind.as_namespace()
    }

    pub fn as_namespace_mut(&mut self) -> Option<&mut NamespaceData> {
        self.kind.as_namespace_mut()
    }

    pub fn add_mixin(&mut self, op: MixinOp) {
        self.kind.add_mixin(op);
    }

    pub fn set_superclass(&mut self, name: String) {
        self.kind.set_superclass(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singleton_class_name_uses_angle_bracket_token() {
        assert_eq!(Entry::singleton_class_name("Foo::Bar"), "Foo::Bar::<Class:Bar>");
        assert_eq!(Entry::singleton_class_name("A"), "A::<Class:A>");
    }
}
