//! The central store (spec.md §4.4): name→entries, file→entries, a
//! require-path trie, an ancestor cache, and the enhancement/included-hook
//! registries. Shaped like `RubyIndex`/`Index<Unlocked>`
//! (`src/indexer/index.rs`, `src/indexer/index_ref.rs`) minus its
//! `parking_lot`-based two-phase locking wrapper: spec.md §5 mandates a
//! single-threaded cooperative model with "no internal locking; all calls
//! into it must be serialized by the caller," so there is no `Locked`/
//! `Unlocked` phantom-type split here, just a plain `&mut Index`.

pub mod completion;
pub mod constant;
pub mod fuzzy;
pub mod linearize;
pub mod method;
pub mod mutate;

use std::collections::HashMap;

use crate::entry::{Entry, EntryKind, MixinOp, NamespaceData};
use crate::error::IndexingError;
use crate::location::Encoding;
use crate::prefix_tree::PrefixTree;
use crate::uri::Uri;

/// A framework-specific indexing extension (spec.md §2 "Enhancements",
/// §4.3 "for every call node, each registered Enhancement receives
/// on_call_node_enter/leave"). See `crate::enhancement` for the trait.
pub use crate::enhancement::{CallInfo, Enhancement};

/// A hook registered against a class name, run just before a singleton
/// class's mixins are linearized (spec.md §4.4.3 step 6: "execute
/// registered included hooks attached to the attached class"). Modeled as
/// a plain closure over `(attached_namespace_entries, &mut Vec<MixinOp>)`
/// rather than over the whole `Index`, so a hook cannot recursively trigger
/// linearization while the ancestor cache is mid-population.
pub type IncludedHook = Box<dyn Fn(&str, &mut Vec<MixinOp>)>;

pub struct Index {
    pub(crate) entries: HashMap<String, Vec<Entry>>,
    pub(crate) entries_tree: PrefixTree<Vec<Entry>>,
    pub(crate) files_to_entries: HashMap<Uri, Vec<Entry>>,
    pub(crate) require_paths: PrefixTree<Uri>,
    pub(crate) uri_require_paths: HashMap<Uri, String>,
    pub(crate) ancestors: HashMap<String, Vec<String>>,
    pub(crate) enhancements: Vec<Box<dyn Enhancement>>,
    pub(crate) included_hooks: HashMap<String, Vec<IncludedHook>>,
    pub indexing_errors: Vec<IndexingError>,
    pub encoding: Encoding,
    /// Whether the Declaration Listener attempts comment collection at all
    /// (spec.md §4.3: "Collection is skipped when `collect_comments = false`").
    pub collect_comments: bool,
    /// Built from `Config::magic_comment_regex`; a comment line matching this
    /// is skipped during collection (spec.md §4.3, §6).
    pub magic_comment_re: Option<regex::Regex>,
}

impl Index {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            entries: HashMap::new(),
            entries_tree: PrefixTree::new(),
            files_to_entries: HashMap::new(),
            require_paths: PrefixTree::new(),
            uri_require_paths: HashMap::new(),
            ancestors: HashMap::new(),
            enhancements: Vec::new(),
            included_hooks: HashMap::new(),
            indexing_errors: Vec::new(),
            encoding,
            collect_comments: true,
            magic_comment_re: None,
        }
    }

    /// Wires a host's `Config` into the comment-collection knobs the
    /// Declaration Listener reads (spec.md §4.3, §6).
    pub fn configure_comments(&mut self, collect_comments: bool, magic_comment_re: Option<regex::Regex>) {
        self.collect_comments = collect_comments;
        self.magic_comment_re = magic_comment_re;
    }

    pub fn register_enhancement(&mut self, enhancement: Box<dyn Enhancement>) {
        self.enhancements.push(enhancement);
    }

    pub fn register_included_hook(&mut self, attached_class: impl Into<String>, hook: IncludedHook) {
        self.included_hooks
            .entry(attached_class.into())
            .or_default()
            .push(hook);
    }

    pub fn register_require_path(&mut self, require_path: &str, uri: Uri) {
        self.require_paths.insert(require_path, uri.clone());
        self.uri_require_paths.insert(uri, require_path.to_string());
    }

    pub fn search_require_paths(&self, query: &str) -> Vec<&Uri> {
        self.require_paths.search(query)
    }

    /// `get(full_name)`: strips a single leading `"::"` and returns the bucket.
    pub fn get(&self, full_name: &str) -> Option<&Vec<Entry>> {
        let stripped = full_name.strip_prefix("::").unwrap_or(full_name);
        self.entries.get(stripped)
    }

    pub fn get_mut(&mut self, full_name: &str) -> Option<&mut Vec<Entry>> {
        let stripped = full_name.strip_prefix("::").unwrap_or(full_name);
        self.entries.get_mut(stripped)
    }

    /// `first_unqualified_const(name)`: the first bucket whose key
    /// `endsWith(name)`.
    pub fn first_unqualified_const(&self, name: &str) -> Option<&Vec<Entry>> {
        self.entries
            .iter()
            .find(|(key, _)| key.ends_with(name))
            .map(|(_, v)| v)
    }

    /// Trie lookups; when a nesting is provided, the prefix is tried at each
    /// enclosing scope from deepest to top-level and results are
    /// concatenated and uniq'd (spec.md §4.4).
    pub fn prefix_search(&self, query: &str, nesting: Option<&[String]>) -> Vec<&Entry> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();

        let mut push_all = |bucket: Vec<&Vec<Entry>>| {
            for entries in bucket {
                for entry in entries {
                    let key = (entry.name.clone(), format!("{:?}", entry.location));
                    if seen.insert(key) {
                        out.push(entry);
                    }
                }
            }
        };

        if let Some(nesting) = nesting {
            for depth in (0..=nesting.len()).rev() {
                let scope = nesting[..depth].join("::");
                let prefix = if scope.is_empty() {
                    query.to_string()
                } else {
                    format!("{scope}::{query}")
                };
                push_all(self.entries_tree.search(&prefix));
            }
        } else {
            push_all(self.entries_tree.search(query));
        }

        out
    }

    /// Lazily materializes (or returns) the singleton class for `attached_name`
    /// (spec.md §4.4 `existing_or_new_singleton_class`, invariant I5).
    pub fn existing_or_new_singleton_class(&mut self, attached_name: &str) -> Option<String> {
        let singleton_name = Entry::singleton_class_name(attached_name);
        if self.entries.contains_key(&singleton_name) {
            return Some(singleton_name);
        }

        let attached_entries = self.entries.get(attached_name)?;
        let first = attached_entries.first()?;
        let nesting = first.as_namespace()?.nesting.clone();
        let new_entry = Entry {
            name: singleton_name.clone(),
            uri: first.uri.clone(),
            location: first.location,
            name_location: first.name_location,
            comments: None,
            visibility: crate::entry::Visibility::Public,
            kind: EntryKind::Namespace(NamespaceData::singleton_class(
                nesting,
                attached_name.to_string(),
            )),
        };
        self.add(new_entry, false);
        Some(singleton_name)
    }

    pub fn run_enhancements_on_call_enter(&mut self, call: &CallInfo) {
        mutate::run_enhancements(self, call, true);
    }

    pub fn run_enhancements_on_call_leave(&mut self, call: &CallInfo) {
        mutate::run_enhancements(self, call, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryBuilder, EntryKind, NamespaceData};
    use crate::location::Location;

    fn class_entry(name: &str) -> Entry {
        EntryBuilder::new()
            .name(name)
            .uri(Uri::new("file:///a.rb"))
            .location(Location::default())
            .kind(EntryKind::Namespace(NamespaceData::class(
                name.split("::").map(str::to_string).collect(),
                None,
            )))
            .build()
            .unwrap()
    }

    #[test]
    fn get_strips_a_single_leading_absolute_marker() {
        let mut index = Index::new(Encoding::Utf16);
        index.add(class_entry("Foo"), false);
        assert!(index.get("::Foo").is_some());
        assert!(index.get("Foo").is_some());
    }

    #[test]
    fn first_unqualified_const_matches_by_suffix() {
        let mut index = Index::new(Encoding::Utf16);
        index.add(class_entry("A::B::Foo"), false);
        assert!(index.first_unqualified_const("Foo").is_some());
        assert!(index.first_unqualified_const("Bar").is_none());
    }
}
