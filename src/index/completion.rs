//! Completion candidate gathering (spec.md §4.4.5). Grounded in the
//! teacher's completion capability walking lexical scope + ancestor chains
//! (`src/capabilities/completion.rs`), reshaped into pure `Index` queries
//! with the dedup/ordering rules spec.md spells out explicitly.

use std::collections::HashSet;

use crate::entry::{Entry, EntryKind, MemberKind};
use crate::index::Index;

impl Index {
    /// spec.md §4.4.5 "Constants".
    pub fn constant_completion_candidates(&mut self, name: &str, nesting: &[String]) -> Vec<Entry> {
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut out = Vec::new();
        let mut push_all = |seen: &mut HashSet<(String, String)>, out: &mut Vec<Entry>, buckets: Vec<&Vec<Entry>>| {
            for bucket in buckets {
                for entry in bucket {
                    let key = (entry.name.clone(), format!("{:?}", entry.location));
                    if seen.insert(key) {
                        out.push(entry.clone());
                    }
                }
            }
        };

        if let Some(stripped) = name.strip_prefix("::") {
            push_all(&mut seen, &mut out, self.entries_tree.search(stripped));
            return out;
        }

        // (a) nesting::name
        let qualified = if nesting.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", nesting.join("::"), name)
        };
        push_all(&mut seen, &mut out, self.entries_tree.search(&qualified));

        // (b) each ancestor of nesting's deepest resolvable chain
        if let Some(deepest) = self.deepest_resolvable_namespace(nesting) {
            if let Some(ancestors) = self.linearized_ancestors_of(&deepest) {
                for ancestor in ancestors {
                    let prefix = format!("{ancestor}::{name}");
                    push_all(&mut seen, &mut out, self.entries_tree.search(&prefix));
                }
            }
        }

        // (c) name at top-level
        push_all(&mut seen, &mut out, self.entries_tree.search(name));

        out
    }

    fn deepest_resolvable_namespace(&self, nesting: &[String]) -> Option<String> {
        for depth in (1..=nesting.len()).rev() {
            let candidate = nesting[..depth].join("::");
            if self.entries.contains_key(&candidate) {
                return Some(candidate);
            }
        }
        None
    }

    /// spec.md §4.4.5 "Methods".
    pub fn method_completion_candidates(&mut self, name: Option<&str>, receiver: &str) -> Vec<Entry> {
        let ancestors = match self.linearized_ancestors_of(receiver) {
            Some(a) => a,
            None => return Vec::new(),
        };

        let candidate_names: Vec<String> = match name {
            Some(n) => self
                .prefix_search(n, None)
                .into_iter()
                .filter(|e| matches!(e.kind, EntryKind::Member(_)))
                .map(|e| e.name.clone())
                .collect::<HashSet<_>>()
                .into_iter()
                .collect(),
            None => self
                .entries
                .iter()
                .filter(|(_, bucket)| bucket.iter().any(|e| matches!(e.kind, EntryKind::Member(_))))
                .map(|(name, _)| name.clone())
                .collect(),
        };

        let mut best: std::collections::HashMap<String, (usize, Entry)> = std::collections::HashMap::new();

        for method_name in candidate_names {
            let bucket = match self.entries.get(&method_name) {
                Some(b) => b.clone(),
                None => continue,
            };
            for entry in bucket {
                let owner = match &entry.kind {
                    EntryKind::Member(m) => m.owner.clone(),
                    _ => continue,
                };
                let Some(position) = ancestors.iter().position(|a| a == &owner) else { continue };

                let resolved = self.resolve_method_alias_eagerly(&entry, receiver);

                match best.get(&method_name) {
                    Some((existing_pos, _)) if *existing_pos <= position => {}
                    _ => {
                        best.insert(method_name.clone(), (position, resolved));
                    }
                }
            }
        }

        best.into_values().map(|(_, entry)| entry).collect()
    }

    fn resolve_method_alias_eagerly(&mut self, entry: &Entry, receiver: &str) -> Entry {
        if let EntryKind::Member(member) = &entry.kind {
            if let MemberKind::UnresolvedMethodAlias { old_name, .. } = &member.kind {
                if let Some(resolved) = self.resolve_method(old_name, receiver, false) {
                    if let Some(first) = resolved.into_iter().next() {
                        return first;
                    }
                }
            }
        }
        entry.clone()
    }

    /// spec.md §4.4: `resolve_instance_variable(var, owner)`.
    pub fn resolve_instance_variable(&self, var: &str, owner: &str) -> Option<Vec<Entry>> {
        let bucket = self.entries.get(var)?;
        let matches: Vec<Entry> = bucket
            .iter()
            .filter(|e| matches!(&e.kind, EntryKind::InstanceVariable { owner: Some(o) } if o == owner))
            .cloned()
            .collect();
        if matches.is_empty() {
            None
        } else {
            Some(matches)
        }
    }

    /// spec.md §4.4: `instance_variable_completion_candidates(var, owner)`.
    pub fn instance_variable_completion_candidates(&self, var: &str, owner: &str) -> Vec<Entry> {
        self.entries
            .iter()
            .filter(|(name, _)| name.starts_with(var))
            .flat_map(|(_, bucket)| bucket.iter())
            .filter(|e| matches!(&e.kind, EntryKind::InstanceVariable { owner: Some(o) } if o == owner))
            .cloned()
            .collect()
    }
}
