//! Framework enhancement plugins (spec.md §2, §4.3): a registry of trait
//! objects invoked on every call node the Declaration Listener visits, so
//! framework-specific indexing (e.g. "an `attr_accessor` call defines
//! accessor methods") can be layered on without the core listener knowing
//! about any particular framework. Shaped after the visitor
//! dispatch in `src/analyzer_prism/visitors/index_visitor/call_node/mod.rs`,
//! which special-cases a fixed list of method names (`attr_accessor`,
//! `include`, `extend`, ...) directly in the listener; here that dispatch is
//! pulled out into a trait so the listener stays name-agnostic and new
//! enhancements can be registered without touching it.
//!
//! `CallInfo` deliberately does not expose the raw `ruby_prism` call node: it
//! is a small abstract summary (method name, receiver kind, argument texts,
//! location), so an enhancement can be unit tested without constructing a
//! real parse tree, and so the listener is free to change its internal
//! dependency on `ruby_prism`'s node types without breaking enhancements.
//! This decoupling has no direct teacher precedent; see DESIGN.md.

use crate::index::Index;
use crate::location::Location;
use crate::uri::Uri;

/// What a call node's receiver looks like, as seen by an enhancement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverKind {
    /// No explicit receiver (e.g. `attr_accessor :x`).
    Implicit,
    /// `self.foo`.
    SelfReceiver,
    /// Any other explicit receiver, by its written text.
    Named(String),
}

/// A single positional or keyword argument, captured as written source text
/// (e.g. `:name`, `"literal"`, `Foo::Bar`) — enhancements pattern-match on
/// the text rather than receiving a typed AST fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    pub text: String,
    pub keyword: Option<String>,
}

/// A framework-agnostic summary of one call node, handed to every
/// registered `Enhancement` (spec.md §4.3: "for every call node, each
/// registered Enhancement receives `on_call_node_enter`/`leave`").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallInfo {
    pub method_name: String,
    pub receiver: ReceiverKind,
    pub arguments: Vec<CallArgument>,
    pub location: Location,
    /// Fully-qualified name of the namespace enclosing this call, if any.
    pub enclosing_namespace: Option<String>,
    /// URI of the file this call node was found in, so a panicking
    /// enhancement's failure can be recorded against the right file
    /// (spec.md §7).
    pub uri: Uri,
}

impl CallInfo {
    pub fn argument_texts(&self) -> impl Iterator<Item = &str> {
        self.arguments.iter().map(|a| a.text.as_str())
    }
}

/// A plugin reacting to call nodes during indexing. Implementors get a
/// `&mut Index` so they can `add`/`get_mut` entries directly (e.g. to
/// synthesize accessor methods for `attr_accessor`). Panics raised from
/// either method are caught by the dispatch loop in `index::mutate` and
/// recorded into `Index::indexing_errors` rather than aborting indexing.
pub trait Enhancement {
    fn on_call_node_enter(&mut self, index: &mut Index, call: &CallInfo);

    /// Default no-op: most enhancements only need the enter hook.
    fn on_call_node_leave(&mut self, _index: &mut Index, _call: &CallInfo) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Encoding;

    struct CountingEnhancement {
        pub calls: usize,
    }

    impl Enhancement for CountingEnhancement {
        fn on_call_node_enter(&mut self, _index: &mut Index, _call: &CallInfo) {
            self.calls += 1;
        }
    }

    #[test]
    fn registered_enhancement_runs_on_call_enter() {
        let mut index = Index::new(Encoding::Utf16);
        index.register_enhancement(Box::new(CountingEnhancement { calls: 0 }));

        let call = CallInfo {
            method_name: "attr_accessor".to_string(),
            receiver: ReceiverKind::Implicit,
            arguments: vec![CallArgument { text: ":name".to_string(), keyword: None }],
            location: Location::default(),
            enclosing_namespace: Some("Foo".to_string()),
            uri: Uri::new("file:///a.rb"),
        };
        index.run_enhancements_on_call_enter(&call);
        assert!(index.indexing_errors.is_empty());
    }

    struct PanickingEnhancement;

    impl Enhancement for PanickingEnhancement {
        fn on_call_node_enter(&mut self, _index: &mut Index, _call: &CallInfo) {
            panic!("boom");
        }
    }

    #[test]
    fn a_panicking_enhancement_is_recorded_not_propagated() {
        let mut index = Index::new(Encoding::Utf16);
        index.register_enhancement(Box::new(PanickingEnhancement));

        let call = CallInfo {
            method_name: "whatever".to_string(),
            receiver: ReceiverKind::Implicit,
            arguments: vec![],
            location: Location::default(),
            enclosing_namespace: None,
            uri: Uri::new("file:///a.rb"),
        };
        index.run_enhancements_on_call_enter(&call);
        assert_eq!(index.indexing_errors.len(), 1);
        assert_eq!(index.indexing_errors[0].uri, "file:///a.rb");
    }
}
