//! Ancestor linearization (spec.md §4.4.3). Shaped like
//! `RubyIndex::linearized_ancestors_of` / `ancestor_chain.rs`
//! (`src/indexer/index.rs`, `src/indexer/entry/ancestor_chain.rs`), which
//! builds a prepend/include/superclass chain the same way; expanded here to
//! the full duplicate-prepend arithmetic and the eager-cache cycle guard
//! spec.md spells out explicitly.

use crate::entry::{EntryKind, MixinKind, NamespaceKind};
use crate::index::Index;

const ROOT_SUPERCLASS: &str = "Object";
const BASIC_OBJECT: &str = "BasicObject";

impl Index {
    /// spec.md §4.4.3.
    pub fn linearized_ancestors_of(&mut self, full_name: &str) -> Option<Vec<String>> {
        if let Some(cached) = self.ancestors.get(full_name) {
            return Some(cached.clone());
        }

        let (attached_class_name, singleton_levels) = parse_singleton_tokens(full_name);

        if !self.entries.contains_key(full_name) {
            if singleton_levels > 0 && self.entries.contains_key(&attached_class_name) {
                let mut current = attached_class_name.clone();
                for _ in 0..singleton_levels {
                    current = self.existing_or_new_singleton_class(&current)?;
                }
                if current != full_name {
                    return None;
                }
            } else {
                return None; // NonExistingNamespace
            }
        }

        let namespace_name = match self.entries.get(full_name).and_then(|b| b.first()) {
            Some(entry) => match &entry.kind {
                EntryKind::ConstantAlias { target } => target.clone(),
                _ => full_name.to_string(),
            },
            None => return None,
        };
        let first_entry = self.entries.get(&namespace_name)?.first()?.clone();
        let namespace = first_entry.as_namespace()?.clone();

        // Seed the cache eagerly so recursive re-entry (cycles) returns this
        // stub rather than recursing forever.
        self.ancestors.insert(full_name.to_string(), vec![full_name.to_string()]);

        let leaf = attached_class_name
            .rsplit("::")
            .next()
            .unwrap_or(&attached_class_name)
            .to_string();
        let mut resolution_nesting = namespace.nesting.clone();
        for _ in 0..singleton_levels {
            resolution_nesting.push(format!("<Class:{leaf}>"));
        }

        let mut working_mixins = namespace.mixin_operations.clone();
        if singleton_levels > 0 {
            if let Some(hooks) = self.included_hooks.get(&attached_class_name) {
                for hook in hooks {
                    hook(&attached_class_name, &mut working_mixins);
                }
            }
        }

        let mut prepend_zone: Vec<String> = Vec::new();
        let mut include_zone: Vec<String> = Vec::new();

        for op in &working_mixins {
            let resolved = self.resolve_constant(&op.module_name, &resolution_nesting);
            let module_fqn = match resolved.and_then(|entries| entries.first().cloned()) {
                Some(entry) if entry.is_namespace() => entry.name,
                _ => continue,
            };
            let linearized = match self.linearized_ancestors_of(&module_fqn) {
                Some(l) => l,
                None => continue,
            };

            match op.kind {
                MixinKind::Prepend => {
                    let uniq: Vec<String> = linearized
                        .iter()
                        .filter(|n| !prepend_zone.contains(n))
                        .cloned()
                        .collect();
                    prepend_zone = uniq.into_iter().chain(prepend_zone).collect();
                }
                MixinKind::Include | MixinKind::Extend => {
                    let new_items: Vec<String> = linearized
                        .iter()
                        .filter(|n| {
                            n.as_str() != full_name && !prepend_zone.contains(n) && !include_zone.contains(n)
                        })
                        .cloned()
                        .collect();
                    include_zone = new_items.into_iter().chain(include_zone).collect();
                }
            }
        }

        let mut ancestors = prepend_zone;
        ancestors.push(full_name.to_string());
        ancestors.extend(include_zone);

        self.append_superclass(full_name, &namespace, singleton_levels, &attached_class_name, &mut ancestors);

        self.ancestors.insert(full_name.to_string(), ancestors.clone());
        Some(ancestors)
    }

    fn append_superclass(
        &mut self,
        full_name: &str,
        namespace: &crate::entry::NamespaceData,
        singleton_levels: usize,
        attached_class_name: &str,
        ancestors: &mut Vec<String>,
    ) {
        match namespace.kind {
            NamespaceKind::Module if singleton_levels == 0 => {
                // Modules have no superclass.
            }
            NamespaceKind::Class { .. } if singleton_levels == 0 => {
                let parent = namespace
                    .parent_class
                    .clone()
                    .unwrap_or_else(|| format!("::{ROOT_SUPERCLASS}"));
                let parent_stripped = parent.strip_prefix("::").unwrap_or(&parent).to_string();

                if parent_stripped == full_name {
                    return; // self-inheritance guard
                }

                if let Some(parent_ancestors) = self.linearized_ancestors_of(&parent_stripped) {
                    for a in parent_ancestors {
                        if !ancestors.contains(&a) {
                            ancestors.push(a);
                        }
                    }
                }
            }
            NamespaceKind::SingletonClass | NamespaceKind::Module | NamespaceKind::Class { .. } => {
                // singleton_levels > 0 here.
                let attached_is_class = self
                    .entries
                    .get(attached_class_name)
                    .and_then(|b| b.first())
                    .and_then(|e| e.as_namespace())
                    .map(|ns| matches!(ns.kind, NamespaceKind::Class { .. }))
                    .unwrap_or(false);

                let target_root = if attached_is_class { "Class" } else { "Module" };
                let mut target = target_root.to_string();
                for _ in 0..singleton_levels {
                    let leaf = target.rsplit("::").next().unwrap_or(&target).to_string();
                    target = format!("{target}::<Class:{leaf}>");
                }

                if target != full_name {
                    if let Some(target_ancestors) = self.linearized_ancestors_of(&target) {
                        for a in target_ancestors {
                            if !ancestors.contains(&a) {
                                ancestors.push(a);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Parses trailing `::<Class:…>` tokens off `full_name`, returning
/// `(attached_class_name, singleton_levels)`.
fn parse_singleton_tokens(full_name: &str) -> (String, usize) {
    let mut remaining = full_name.to_string();
    let mut levels = 0;

    loop {
        if remaining.ends_with('>') {
            if let Some(idx) = remaining.rfind("::<Class:") {
                remaining.truncate(idx);
                levels += 1;
                continue;
            }
        }
        break;
    }

    (remaining, levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_singleton_token() {
        let (attached, levels) = parse_singleton_tokens("Foo::Bar::<Class:Bar>");
        assert_eq!(attached, "Foo::Bar");
        assert_eq!(levels, 1);
    }

    #[test]
    fn non_singleton_name_has_zero_levels() {
        let (attached, levels) = parse_singleton_tokens("Foo::Bar");
        assert_eq!(attached, "Foo::Bar");
        assert_eq!(levels, 0);
    }
}
