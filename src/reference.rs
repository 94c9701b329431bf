//! The Reference Finder (spec.md §4.5): a second-pass walker that collects
//! references to one target (a constant, a method, or an instance variable)
//! across a single file. Shaped like `ReferenceVisitor`
//! (`src/analyzer_prism/visitors/reference_visitor/mod.rs`), which already
//! keeps its own namespace stack independent from the indexing pass and
//! walks constant/def/call nodes the same way; generalized here to call
//! `Index::resolve_constant` directly (that older visitor instead probed
//! `index.definitions` for an exact fully-qualified match one ancestor at a
//! time, duplicating what `resolve_constant` already does) and to cover the
//! constant-target and constant-path-target forms that visitor does not
//! visit.

use ruby_prism::Visit;

use crate::entry::EntryKind;
use crate::index::Index;
use crate::location::{Location, OffsetCache};
use crate::uri::Uri;

/// What the Reference Finder is looking for. The name is always a fully
/// qualified target name (for constants and methods) or a bare variable
/// name scoped to `owner` (for instance variables).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    Constant { fqn: String },
    Method { name: String },
    InstanceVariable { name: String, owner: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub location: Location,
    /// True iff the written name's location coincides with an entry's
    /// `name_location` for this URI (spec.md §4.5).
    pub is_declarative: bool,
}

pub struct ReferenceFinder<'a> {
    index: &'a mut Index,
    uri: Uri,
    source: String,
    cache: OffsetCache,
    target: ReferenceTarget,
    /// Independent namespace-name stack so the nesting this walker computes
    /// agrees with how the index resolves names (spec.md §4.5: "It maintains
    /// its own independent stack of enclosing namespace names").
    stack: Vec<String>,
    pub references: Vec<Reference>,
}

impl<'a> ReferenceFinder<'a> {
    pub fn new(index: &'a mut Index, uri: Uri, source: String, cache: OffsetCache, target: ReferenceTarget) -> Self {
        Self {
            index,
            uri,
            source,
            cache,
            target,
            stack: Vec::new(),
            references: Vec::new(),
        }
    }

    fn node_location(&self, loc: ruby_prism::Location) -> Location {
        self.cache.location(&self.source, loc.start_offset(), loc.end_offset())
    }

    fn is_name_location_in_this_file(&self, name: &str, location: Location) -> bool {
        let Some(bucket) = self.index.get(name) else { return false };
        bucket
            .iter()
            .any(|e| e.uri == self.uri && e.name_location == location)
    }

    fn record_constant_reference(&mut self, written: &str, location: Location) {
        let ReferenceTarget::Constant { fqn } = &self.target else { return };
        let fqn = fqn.clone();
        let Some(resolved) = self.index.resolve_constant(written, &self.stack) else { return };
        if resolved.iter().any(|e| e.name == fqn) {
            let is_declarative = self.is_name_location_in_this_file(&fqn, location);
            self.references.push(Reference { location, is_declarative });
        }
    }

    fn record_method_reference(&mut self, name: &str, location: Location, is_declarative: bool) {
        let ReferenceTarget::Method { name: target_name } = &self.target else { return };
        if name == target_name {
            self.references.push(Reference { location, is_declarative });
        }
    }

    fn record_ivar_reference(&mut self, raw_name: &[u8], location: Location, is_declarative: bool) {
        let ReferenceTarget::InstanceVariable { name: target_name, owner: target_owner } = &self.target else {
            return;
        };
        let name = String::from_utf8_lossy(raw_name).into_owned();
        if &name != target_name {
            return;
        }
        let owns_it = self
            .index
            .get(&name)
            .map(|bucket| {
                bucket.iter().any(|e| {
                    matches!(&e.kind, EntryKind::InstanceVariable { owner: Some(o) } if o == target_owner)
                })
            })
            .unwrap_or(false);
        if owns_it {
            self.references.push(Reference { location, is_declarative });
        }
    }
}

fn flatten(node: &ruby_prism::Node) -> Option<String> {
    if let Some(read) = node.as_constant_read_node() {
        return Some(String::from_utf8_lossy(read.name().as_slice()).into_owned());
    }
    if let Some(path) = node.as_constant_path_node() {
        return flatten_path(&path);
    }
    None
}

fn flatten_path(path: &ruby_prism::ConstantPathNode) -> Option<String> {
    let absolute = path.parent().is_none();
    let mut parts = Vec::new();
    if let Some(parent) = path.parent() {
        parts.push(flatten(&parent)?);
    }
    parts.push(String::from_utf8_lossy(path.name()?.as_slice()).into_owned());
    let joined = parts.join("::");
    Some(if absolute { format!("::{joined}") } else { joined })
}

impl<'a> Visit<'_> for ReferenceFinder<'a> {
    fn visit_class_node(&mut self, node: &ruby_prism::ClassNode) {
        let written = flatten(&node.constant_path());
        if let Some(written) = &written {
            self.record_constant_reference(written, self.node_location(node.constant_path().location()));
        }
        self.stack.push(written.unwrap_or_default());
        ruby_prism::visit_class_node(self, node);
        self.stack.pop();
    }

    fn visit_module_node(&mut self, node: &ruby_prism::ModuleNode) {
        let written = flatten(&node.constant_path());
        if let Some(written) = &written {
            self.record_constant_reference(written, self.node_location(node.constant_path().location()));
        }
        self.stack.push(written.unwrap_or_default());
        ruby_prism::visit_module_node(self, node);
        self.stack.pop();
    }

    fn visit_constant_read_node(&mut self, node: &ruby_prism::ConstantReadNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        self.record_constant_reference(&name, self.node_location(node.location()));
        ruby_prism::visit_constant_read_node(self, node);
    }

    fn visit_constant_path_node(&mut self, node: &ruby_prism::ConstantPathNode) {
        if let Some(written) = flatten_path(node) {
            self.record_constant_reference(&written, self.node_location(node.location()));
        }
        ruby_prism::visit_constant_path_node(self, node);
    }

    fn visit_constant_write_node(&mut self, node: &ruby_prism::ConstantWriteNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        self.record_constant_reference(&name, self.node_location(node.name_loc()));
        ruby_prism::visit_constant_write_node(self, node);
    }

    fn visit_constant_target_node(&mut self, node: &ruby_prism::ConstantTargetNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        self.record_constant_reference(&name, self.node_location(node.location()));
        ruby_prism::visit_constant_target_node(self, node);
    }

    fn visit_constant_path_write_node(&mut self, node: &ruby_prism::ConstantPathWriteNode) {
        let target = node.target();
        if let Some(written) = flatten_path(&target) {
            self.record_constant_reference(&written, self.node_location(target.location()));
        }
        ruby_prism::visit_constant_path_write_node(self, node);
    }

    fn visit_constant_path_target_node(&mut self, node: &ruby_prism::ConstantPathTargetNode) {
        // Multi-write targets (`Foo::BAR, _ = pair`) reuse the plain path
        // flattening since they share `parent`/`name` shape with ConstantPathNode.
        if let Some(parent) = node.parent() {
            if let Some(prefix) = flatten(&parent) {
                if let Some(name) = node.name() {
                    let written = format!("{prefix}::{}", String::from_utf8_lossy(name.as_slice()));
                    self.record_constant_reference(&written, self.node_location(node.location()));
                }
            }
        } else if let Some(name) = node.name() {
            self.record_constant_reference(
                &String::from_utf8_lossy(name.as_slice()),
                self.node_location(node.location()),
            );
        }
        ruby_prism::visit_constant_path_target_node(self, node);
    }

    fn visit_def_node(&mut self, node: &ruby_prism::DefNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        self.record_method_reference(&name, self.node_location(node.name_loc()), true);
        ruby_prism::visit_def_node(self, node);
    }

    fn visit_call_node(&mut self, node: &ruby_prism::CallNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        self.record_method_reference(&name, self.node_location(node.message_loc().unwrap_or(node.location())), false);
        ruby_prism::visit_call_node(self, node);
    }

    fn visit_instance_variable_read_node(&mut self, node: &ruby_prism::InstanceVariableReadNode) {
        self.record_ivar_reference(node.name().as_slice(), self.node_location(node.location()), false);
        ruby_prism::visit_instance_variable_read_node(self, node);
    }

    fn visit_instance_variable_write_node(&mut self, node: &ruby_prism::InstanceVariableWriteNode) {
        self.record_ivar_reference(node.name().as_slice(), self.node_location(node.name_loc()), true);
        ruby_prism::visit_instance_variable_write_node(self, node);
    }

    fn visit_instance_variable_target_node(&mut self, node: &ruby_prism::InstanceVariableTargetNode) {
        self.record_ivar_reference(node.name().as_slice(), self.node_location(node.location()), true);
        ruby_prism::visit_instance_variable_target_node(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Encoding;

    fn index_file(index: &mut Index, uri: &Uri, source: &str) {
        index.index_single(uri.clone(), Some(source.to_string()), None);
    }

    fn find(index: &mut Index, uri: &Uri, source: &str, target: ReferenceTarget) -> Vec<Reference> {
        let cache = OffsetCache::new(source, Encoding::Utf16);
        let parsed = ruby_prism::parse(source.as_bytes());
        let mut finder = ReferenceFinder::new(index, uri.clone(), source.to_string(), cache, target);
        finder.visit(&parsed.node());
        finder.references
    }

    #[test]
    fn finds_a_constant_reference_and_marks_the_declaration() {
        let mut index = Index::new(Encoding::Utf16);
        let uri = Uri::new("file:///a.rb");
        let source = "class Foo\nend\nFoo\n";
        index_file(&mut index, &uri, source);

        let refs = find(&mut index, &uri, source, ReferenceTarget::Constant { fqn: "Foo".to_string() });
        assert_eq!(refs.len(), 2);
        assert!(refs[0].is_declarative);
        assert!(!refs[1].is_declarative);
    }

    #[test]
    fn unrelated_constant_produces_no_references() {
        let mut index = Index::new(Encoding::Utf16);
        let uri = Uri::new("file:///a.rb");
        let source = "class Foo\nend\nBar\n";
        index_file(&mut index, &uri, source);

        let refs = find(&mut index, &uri, source, ReferenceTarget::Constant { fqn: "Foo".to_string() });
        assert_eq!(refs.len(), 1);
        assert!(refs[0].is_declarative);
    }

    #[test]
    fn finds_method_definition_and_call_references() {
        let mut index = Index::new(Encoding::Utf16);
        let uri = Uri::new("file:///a.rb");
        let source = "class Foo\n  def bar; end\n  bar\nend\n";
        index_file(&mut index, &uri, source);

        let refs = find(&mut index, &uri, source, ReferenceTarget::Method { name: "bar".to_string() });
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().any(|r| r.is_declarative));
        assert!(refs.iter().any(|r| !r.is_declarative));
    }
}
