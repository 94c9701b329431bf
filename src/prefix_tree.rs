//! Generic trie for prefix search (spec.md §4.2).
//!
//! Shaped like `indexer::prefix_tree::PrefixTree` (per-node
//! `HashMap` of children, DFS collection via an explicit stack rather than
//! recursion) but generalized to an arbitrary value type `V` — that earlier
//! version is hardcoded to a single `Entry`, whereas the index here needs
//! tries over both `Vec<Entry>` (`entries_tree`, mirroring the exact vector
//! stored in `entries[name]` per invariant I2) and `Uri` (`require_paths`).
//! Unlike that version's `delete`, which leaves a `TODO` for pruning empty
//! branches, this one prunes eagerly: spec.md §4.2 requires it
//! ("prunes up to the first ancestor that still has children or is
//! terminal").

use std::collections::HashMap;

#[derive(Debug)]
struct Node<V> {
    value: Option<V>,
    terminal: bool,
    children: HashMap<char, Node<V>>,
}

impl<V> Node<V> {
    fn new() -> Self {
        Self {
            value: None,
            terminal: false,
            children: HashMap::new(),
        }
    }

    /// DFS-collects every terminal descendant's value, this node included.
    fn collect<'a>(&'a self, out: &mut Vec<&'a V>) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.terminal {
                if let Some(v) = &node.value {
                    out.push(v);
                }
            }
            stack.extend(node.children.values());
        }
    }
}

#[derive(Debug)]
pub struct PrefixTree<V> {
    root: Node<V>,
}

impl<V> PrefixTree<V> {
    pub fn new() -> Self {
        Self { root: Node::new() }
    }

    /// Overwrites any prior value at `key` and marks the node terminal.
    pub fn insert(&mut self, key: &str, value: V) {
        let mut node = &mut self.root;
        for ch in key.chars() {
            node = node.children.entry(ch).or_insert_with(Node::new);
        }
        node.value = Some(value);
        node.terminal = true;
    }

    /// Removes the terminal marker at `key` and prunes every now-empty,
    /// non-terminal ancestor back up to (and not including) the first
    /// ancestor that still has children or is itself terminal.
    pub fn delete(&mut self, key: &str) {
        Self::delete_rec(&mut self.root, &mut key.chars());
    }

    fn delete_rec(node: &mut Node<V>, chars: &mut std::str::Chars) -> bool {
        match chars.next() {
            Some(ch) => {
                let prune_child = match node.children.get_mut(&ch) {
                    Some(child) => Self::delete_rec(child, chars),
                    None => return false,
                };
                if prune_child {
                    node.children.remove(&ch);
                }
            }
            None => {
                node.value = None;
                node.terminal = false;
            }
        }
        node.children.is_empty() && !node.terminal
    }

    /// DFS from the node reached by `prefix`. Empty prefix yields all values.
    pub fn search(&self, prefix: &str) -> Vec<&V> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            match node.children.get(&ch) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }
        let mut out = Vec::new();
        node.collect(&mut out);
        out
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty() && !self.root.terminal
    }
}

impl<V> Default for PrefixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_search_by_prefix() {
        let mut tree = PrefixTree::new();
        tree.insert("Foo", 1);
        tree.insert("FooBar", 2);

        assert_eq!(tree.search("").len(), 2);
        assert_eq!(tree.search("F").len(), 2);
        assert_eq!(tree.search("Foo").len(), 2);
        assert_eq!(tree.search("FooB").len(), 1);
        assert_eq!(tree.search("Baz").len(), 0);
    }

    #[test]
    fn insert_overwrites_prior_value_at_same_key() {
        let mut tree = PrefixTree::new();
        tree.insert("Foo", 1);
        tree.insert("Foo", 2);
        assert_eq!(tree.search("Foo"), vec![&2]);
    }

    #[test]
    fn delete_prunes_empty_branches() {
        let mut tree = PrefixTree::new();
        tree.insert("Foo", 1);
        tree.delete("Foo");
        assert!(tree.is_empty());
    }

    #[test]
    fn delete_does_not_prune_shared_ancestors() {
        let mut tree = PrefixTree::new();
        tree.insert("Foo", 1);
        tree.insert("FooBar", 2);
        tree.delete("FooBar");
        assert_eq!(tree.search("Foo"), vec![&1]);
        assert!(!tree.is_empty());

        tree.delete("Foo");
        assert!(tree.is_empty());
    }

    #[test]
    fn delete_of_missing_key_is_a_no_op() {
        let mut tree: PrefixTree<i32> = PrefixTree::new();
        tree.delete("Missing");
        assert!(tree.is_empty());
    }
}
