//! Method resolution (spec.md §4.4.4). Shaped like
//! `RubyIndex::resolve_method_invocation`/ancestor-walk
//! (`src/indexer/index.rs`), which already walks a linearized ancestor list
//! looking for the first owner with a matching definition; generalized here
//! to lazily resolve `UnresolvedMethodAlias` entries on the fly with a
//! `seen` cycle guard, as spec.md requires.

use std::collections::HashSet;

use crate::entry::{Entry, EntryKind, MemberKind};
use crate::index::Index;

impl Index {
    /// spec.md §4.4.4.
    pub fn resolve_method(&mut self, name: &str, receiver: &str, inherited_only: bool) -> Option<Vec<Entry>> {
        let mut seen = HashSet::new();
        self.resolve_method_seen(name, receiver, inherited_only, &mut seen)
    }

    fn resolve_method_seen(
        &mut self,
        name: &str,
        receiver: &str,
        inherited_only: bool,
        seen: &mut HashSet<String>,
    ) -> Option<Vec<Entry>> {
        if !self.entries.contains_key(name) {
            return None;
        }

        let ancestors = self.linearized_ancestors_of(receiver)?;

        for (index, ancestor) in ancestors.iter().enumerate() {
            if inherited_only && index == 0 {
                continue;
            }

            let bucket = self.entries.get(name)?;
            let owned: Vec<Entry> = bucket
                .iter()
                .filter(|e| matches!(&e.kind, EntryKind::Member(m) if &m.owner == ancestor))
                .cloned()
                .collect();

            if owned.is_empty() {
                continue;
            }

            let mut resolved = Vec::with_capacity(owned.len());
            for entry in owned {
                match &entry.kind {
                    EntryKind::Member(member) => match &member.kind {
                        MemberKind::UnresolvedMethodAlias { old_name, new_name } => {
                            if !seen.insert(new_name.clone()) {
                                resolved.push(entry);
                                continue;
                            }
                            match self.resolve_method_seen(old_name, receiver, inherited_only, seen) {
                                Some(mut target) if !target.is_empty() => resolved.append(&mut target),
                                _ => resolved.push(entry),
                            }
                        }
                        _ => resolved.push(entry),
                    },
                    _ => resolved.push(entry),
                }
            }

            return Some(resolved);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryBuilder, MemberData, MethodData, NamespaceData, Signature};
    use crate::location::{Encoding, Location};
    use crate::uri::Uri;

    fn class_entry(name: &str) -> Entry {
        EntryBuilder::new()
            .name(name)
            .uri(Uri::new("file:///a.rb"))
            .location(Location::default())
            .kind(EntryKind::Namespace(NamespaceData::class(
                vec![name.to_string()],
                None,
            )))
            .build()
            .unwrap()
    }

    fn method_entry(name: &str, owner: &str) -> Entry {
        EntryBuilder::new()
            .name(name)
            .uri(Uri::new("file:///a.rb"))
            .location(Location::default())
            .kind(EntryKind::Member(MemberData {
                owner: owner.to_string(),
                kind: MemberKind::Method(MethodData { signatures: vec![Signature::empty()] }),
            }))
            .build()
            .unwrap()
    }

    #[test]
    fn resolves_a_method_owned_directly_by_the_receiver() {
        let mut index = Index::new(Encoding::Utf16);
        index.add(class_entry("Foo"), false);
        index.add(method_entry("bar", "Foo"), false);

        let resolved = index.resolve_method("bar", "Foo", false).unwrap();
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn missing_method_name_returns_none() {
        let mut index = Index::new(Encoding::Utf16);
        index.add(class_entry("Foo"), false);
        assert!(index.resolve_method("missing", "Foo", false).is_none());
    }

    #[test]
    fn inherited_only_skips_the_receiver_itself() {
        let mut index = Index::new(Encoding::Utf16);
        index.add(class_entry("Foo"), false);
        index.add(method_entry("bar", "Foo"), false);
        assert!(index.resolve_method("bar", "Foo", true).is_none());
    }
}
