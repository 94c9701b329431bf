//! Constant resolution (spec.md §4.4.1, §4.4.2). Shaped like
//! `RubyIndex::resolve_constant`/`follow_aliased_namespace`
//! (`src/indexer/index.rs`) for the overall shape (direct lookup, then
//! alias-chase, then ancestor-chain fallback), generalized here to the
//! spec's exact six-step algorithm and non-redundant-qualification rule.

use std::collections::HashSet;

use crate::entry::{Entry, EntryKind};
use crate::error::UnresolvableAlias;
use crate::index::Index;

impl Index {
    /// spec.md §4.4.1.
    pub fn resolve_constant(&mut self, name: &str, nesting: &[String]) -> Option<Vec<Entry>> {
        let mut seen = HashSet::new();
        self.resolve_constant_seen(name, nesting, &mut seen)
    }

    fn resolve_constant_seen(
        &mut self,
        name: &str,
        nesting: &[String],
        seen: &mut HashSet<String>,
    ) -> Option<Vec<Entry>> {
        // Step 1: absolute reference — only the stripped absolute name is tried.
        if let Some(stripped) = name.strip_prefix("::") {
            return self.direct_or_aliased_lookup(stripped, seen);
        }

        // Step 2: fully qualified by the current nesting.
        let full_name = if nesting.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", nesting.join("::"), name)
        };
        if let Some(found) = self.direct_or_aliased_lookup(&full_name, seen) {
            return Some(found);
        }

        // Step 3: each enclosing lexical scope, deepest first (depth len-1 down to 1;
        // depth == nesting.len() was already tried at step 2, depth 0 is step 5).
        for depth in (1..nesting.len()).rev() {
            let candidate = format!("{}::{}", nesting[..depth].join("::"), name);
            if let Some(found) = self.direct_or_aliased_lookup(&candidate, seen) {
                return Some(found);
            }
        }

        // Step 4: ancestor chain of the non-redundant qualification's namespace part.
        let qualification = non_redundant_qualification(name, nesting);
        if qualification.len() > 1 {
            let leaf = qualification.last().unwrap().clone();
            let namespace_name = qualification[..qualification.len() - 1].join("::");
            if let Some(ancestors) = self.linearized_ancestors_of(&namespace_name) {
                for ancestor in ancestors {
                    let candidate = format!("{ancestor}::{leaf}");
                    if let Some(found) = self.direct_or_aliased_lookup(&candidate, seen) {
                        return Some(found);
                    }
                }
            }
        }

        // Step 5: bare top-level name.
        if let Some(found) = self.direct_or_aliased_lookup(name, seen) {
            return Some(found);
        }

        // Step 6.
        None
    }

    /// "Try the given key, else try `follow_aliased_namespace(key)`, then
    /// resolve any `UnresolvedConstantAlias` entries found there in place."
    fn direct_or_aliased_lookup(&mut self, key: &str, seen: &mut HashSet<String>) -> Option<Vec<Entry>> {
        let resolved_key = if self.entries.contains_key(key) {
            key.to_string()
        } else {
            match self.follow_aliased_namespace(key, seen) {
                Ok(alt) if alt != key && self.entries.contains_key(&alt) => alt,
                _ => return None,
            }
        };

        if !seen.insert(resolved_key.clone()) {
            // Cyclic alias chase: return the bucket unchanged.
            return self.entries.get(&resolved_key).cloned();
        }

        self.resolve_aliases_in_bucket(&resolved_key, seen);
        self.entries.get(&resolved_key).cloned()
    }

    fn resolve_aliases_in_bucket(&mut self, key: &str, seen: &mut HashSet<String>) {
        let len = self.entries.get(key).map(Vec::len).unwrap_or(0);
        for i in 0..len {
            let entry = match self.entries.get(key).and_then(|b| b.get(i)) {
                Some(e) => e.clone(),
                None => continue,
            };
            let (target, alias_nesting) = match &entry.kind {
                EntryKind::UnresolvedConstantAlias { target, nesting } => {
                    (target.clone(), nesting.clone())
                }
                _ => continue,
            };

            if let Some(resolved_target) = self.resolve_constant_seen(&target, &alias_nesting, seen) {
                if let Some(target_entry) = resolved_target.first() {
                    // A target that is itself still an UnresolvedConstantAlias means
                    // we bottomed out on a cycle (§8 boundary: `X = Y; Y = X` must
                    // leave both sides unresolved, never chase a name into itself).
                    if !matches!(target_entry.kind, EntryKind::UnresolvedConstantAlias { .. }) {
                        let mut resolved_entry = entry.clone();
                        resolved_entry.kind = EntryKind::ConstantAlias {
                            target: target_entry.name.clone(),
                        };
                        if let Some(bucket) = self.entries.get_mut(key) {
                            bucket[i] = resolved_entry;
                        }
                        self.sync_prefix_tree(key);
                    }
                }
            }
            // If the ultimate target does not exist, the unresolved form is left as-is.
        }
    }

    /// spec.md §4.4.2. A prefix segment that is still an
    /// `UnresolvedConstantAlias` (rather than an already-resolved
    /// `ConstantAlias`) is resolved on the spot — recursing into
    /// `resolve_constant_seen` for its stored `target`/`nesting` and mutating
    /// the bucket in place — since a multi-segment lookup like `B::Real` may
    /// be the very first thing to ever touch `B`'s alias.
    pub(crate) fn follow_aliased_namespace(
        &mut self,
        name: &str,
        seen: &mut HashSet<String>,
    ) -> Result<String, UnresolvableAlias> {
        let parts: Vec<&str> = name.split("::").collect();
        if parts.len() < 2 {
            return Ok(name.to_string());
        }

        for i in (1..parts.len()).rev() {
            let prefix = parts[..i].join("::");
            let suffix = parts[i..].join("::");
            let Some(first) = self.entries.get(&prefix).and_then(|b| b.first()).cloned() else {
                continue;
            };

            match &first.kind {
                EntryKind::ConstantAlias { target } => {
                    let substituted = format!("{target}::{suffix}");
                    return self.follow_aliased_namespace(&substituted, seen);
                }
                EntryKind::UnresolvedConstantAlias { target, nesting } => {
                    if !seen.insert(prefix.clone()) {
                        return Err(UnresolvableAlias { alias_name: prefix });
                    }
                    let (target, nesting) = (target.clone(), nesting.clone());
                    let resolved_name = self
                        .resolve_constant_seen(&target, &nesting, seen)
                        .and_then(|entries| entries.first().cloned())
                        .filter(|e| !matches!(e.kind, EntryKind::UnresolvedConstantAlias { .. }))
                        .map(|e| e.name);

                    match resolved_name {
                        Some(resolved_name) => {
                            if let Some(e) = self.entries.get_mut(&prefix).and_then(|b| b.first_mut()) {
                                e.kind = EntryKind::ConstantAlias { target: resolved_name.clone() };
                            }
                            self.sync_prefix_tree(&prefix);
                            let substituted = format!("{resolved_name}::{suffix}");
                            return self.follow_aliased_namespace(&substituted, seen);
                        }
                        None => return Err(UnresolvableAlias { alias_name: prefix }),
                    }
                }
                _ => continue,
            }
        }

        Ok(name.to_string())
    }

    pub(crate) fn sync_prefix_tree(&mut self, key: &str) {
        if let Some(bucket) = self.entries.get(key) {
            let bucket = bucket.clone();
            self.entries_tree.insert(key, bucket);
        }
    }
}

/// spec.md §4.4.1: "find the first index in `name.split('::')` not
/// contained in `nesting`; concatenate appropriately. Unqualified names just
/// get nesting prepended." Returns `[nesting_parts…, leaf]`.
fn non_redundant_qualification(name: &str, nesting: &[String]) -> Vec<String> {
    let name_parts: Vec<&str> = name.split("::").collect();

    if name_parts.len() == 1 {
        let mut result: Vec<String> = nesting.to_vec();
        result.push(name_parts[0].to_string());
        return result;
    }

    let start = name_parts
        .iter()
        .position(|part| !nesting.iter().any(|n| n == part))
        .unwrap_or(0);

    let mut result: Vec<String> = nesting.to_vec();
    result.extend(name_parts[start..].iter().map(|s| s.to_string()));
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_redundant_qualification_strips_nesting_overlap() {
        let nesting = vec!["A".to_string(), "B".to_string()];
        assert_eq!(
            non_redundant_qualification("A::B::Foo", &nesting),
            vec!["A", "B", "Foo"]
        );
        assert_eq!(
            non_redundant_qualification("B::Foo", &nesting),
            vec!["A", "B", "Foo"]
        );
        assert_eq!(
            non_redundant_qualification("C::Foo", &nesting),
            vec!["A", "B", "C", "Foo"]
        );
        assert_eq!(non_redundant_qualification("Foo", &nesting), vec!["A", "B", "Foo"]);
    }

    #[test]
    fn non_redundant_qualification_with_empty_nesting_is_identity() {
        assert_eq!(non_redundant_qualification("Foo", &[]), vec!["Foo"]);
        assert_eq!(
            non_redundant_qualification("A::Foo", &[]),
            vec!["A", "Foo"]
        );
    }
}
