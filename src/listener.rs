//! The Declaration Listener (spec.md §4.3): a single-pass `ruby_prism::Visit`
//! implementation that walks one file's parse tree and emits `Entry` values
//! into the `Index`. Shaped like the
//! `src/analyzer_prism/visitors/index_visitor/*` module, which follows the
//! same entry/free-recurse/exit shape for every node kind
//! (`process_x_node_entry` / `visit_x_node(self, node)` / `process_x_node_exit`).
//!
//! Two places deliberately depart from that older code rather than
//! copying it, recorded in DESIGN.md:
//! - Classes here never eagerly gain a paired singleton entry. The older
//!   `class_node.rs` builds an "Instance" and a "Singleton" `EntryKind` for
//!   every class; this core materializes singleton classes lazily through
//!   `Index::existing_or_new_singleton_class`, so only the base namespace is
//!   emitted here.
//! - `singleton_class_node.rs` in that module is a bare scope-flag toggle
//!   with no entry-creation logic at all, so the singleton-class handling
//!   below is built from the prose in spec.md §4.3 directly.

use ruby_prism::Visit;

use crate::entry::{
    AccessorData, Entry, EntryKind, MemberData, MemberKind, MethodData, MixinKind, MixinOp,
    NamespaceData, Parameter, Signature, Visibility,
};
use crate::enhancement::{CallArgument, CallInfo, ReceiverKind};
use crate::index::Index;
use crate::location::{Location, OffsetCache};
use crate::uri::Uri;

/// Tracks what `public`/`private`/`protected`/`module_function`/
/// `private_class_method` (bare, no-argument forms) currently mean for
/// subsequently declared methods in the open namespace (spec.md §3
/// "VisibilityScope", §4.3 "Call nodes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisibilityScope {
    Public,
    Protected,
    Private,
    ModuleFunction,
    PrivateClassMethod,
}

impl VisibilityScope {
    fn base_visibility(self) -> Visibility {
        match self {
            VisibilityScope::Public => Visibility::Public,
            VisibilityScope::Protected => Visibility::Protected,
            VisibilityScope::Private
            | VisibilityScope::ModuleFunction
            | VisibilityScope::PrivateClassMethod => Visibility::Private,
        }
    }
}

pub struct DeclarationListener<'a> {
    index: &'a mut Index,
    uri: Uri,
    source: String,
    lines: Vec<String>,
    cache: OffsetCache,
    /// Textual names as written at each enclosing namespace node
    /// (spec.md §4.3 "stack").
    stack: Vec<String>,
    /// The resolved, atomic-segment form of `stack`, kept in lockstep with
    /// it so non-namespace nodes don't need to re-derive nesting.
    current_nesting: Vec<String>,
    /// Namespace entries corresponding to each open scope (spec.md §4.3
    /// "owner_stack"); also pushed for `def self.foo` bodies.
    owner_stack: Vec<String>,
    visibility_stack: Vec<VisibilityScope>,
    /// Number of enclosing `def` nodes; used to decide whether a bare
    /// instance-variable write belongs to the current owner or its
    /// singleton class (spec.md §4.3 "Instance/class/global variable writes").
    def_depth: u32,
}

impl<'a> DeclarationListener<'a> {
    pub fn new(index: &'a mut Index, uri: Uri, source: String, cache: OffsetCache) -> Self {
        let lines = source.lines().map(str::to_string).collect();
        Self {
            index,
            uri,
            source,
            lines,
            cache,
            stack: Vec::new(),
            current_nesting: Vec::new(),
            owner_stack: Vec::new(),
            visibility_stack: vec![VisibilityScope::Public],
            def_depth: 0,
        }
    }

    fn current_owner(&self) -> String {
        self.owner_stack.last().cloned().unwrap_or_else(|| "Object".to_string())
    }

    fn current_scope(&self) -> VisibilityScope {
        self.visibility_stack.last().copied().unwrap_or(VisibilityScope::Public)
    }

    fn set_current_scope(&mut self, scope: VisibilityScope) {
        if let Some(top) = self.visibility_stack.last_mut() {
            *top = scope;
        } else {
            self.visibility_stack.push(scope);
        }
    }

    fn node_location(&self, loc: ruby_prism::Location) -> Location {
        self.cache.location(&self.source, loc.start_offset(), loc.end_offset())
    }

    fn node_text(&self, loc: ruby_prism::Location) -> String {
        self.source
            .get(loc.start_offset()..loc.end_offset())
            .unwrap_or("")
            .to_string()
    }

    /// Builds the actual lexical nesting for a namespace node from
    /// `stack + [name]` (spec.md §4.3 "Class / Module"): scan right-to-left,
    /// stop at the first segment starting with `"::"`, strip `"::"` prefixes,
    /// then split every segment on `"::"`.
    fn derive_nesting(&self, name: &str) -> Vec<String> {
        let mut segments: Vec<&str> = self.stack.iter().map(String::as_str).collect();
        segments.push(name);

        let mut start = 0;
        for (i, seg) in segments.iter().enumerate().rev() {
            if seg.starts_with("::") {
                start = i;
                break;
            }
        }

        let mut parts = Vec::new();
        for seg in &segments[start..] {
            let stripped = seg.strip_prefix("::").unwrap_or(seg);
            for part in stripped.split("::") {
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
            }
        }
        parts
    }

    /// spec.md §4.3 "Fully qualifying a written name".
    fn fully_qualify(&self, name: &str) -> String {
        if let Some(stripped) = name.strip_prefix("::") {
            stripped.to_string()
        } else if self.current_nesting.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", self.current_nesting.join("::"), name)
        }
    }

    fn is_singleton_name(name: &str) -> bool {
        name.contains("::<Class:") || name.starts_with("<Class:")
    }

    /// Owner for instance variables (spec.md §4.3): the current owner,
    /// except a write sitting directly in a class body (not inside any
    /// `def`) belongs to the owner's singleton class.
    fn instance_variable_owner(&mut self) -> Option<String> {
        let owner = self.current_owner();
        if self.def_depth == 0 {
            self.index.existing_or_new_singleton_class(&owner)
        } else {
            Some(owner)
        }
    }

    /// Owner for class variables (spec.md §4.3): reattaches to the first
    /// enclosing non-singleton owner.
    fn class_variable_owner(&self) -> String {
        for owner in self.owner_stack.iter().rev() {
            if !Self::is_singleton_name(owner) {
                return owner.clone();
            }
        }
        "Object".to_string()
    }

    /// spec.md §4.3 "Comments".
    fn collect_comments_above(&self, declaration_start_line: u32) -> Option<String> {
        if !self.index.collect_comments || declaration_start_line == 0 {
            return None;
        }

        let mut idx: i64 = declaration_start_line as i64 - 1;
        if self.comment_body_at(idx).is_none() {
            idx -= 1;
            if self.comment_body_at(idx).is_none() {
                return None;
            }
        }

        let mut collected_rev: Vec<String> = Vec::new();
        while idx >= 0 {
            let Some(body) = self.comment_body_at(idx) else { break };
            let stripped = strip_comment_sigil(body);
            let skip_magic = self
                .index
                .magic_comment_re
                .as_ref()
                .is_some_and(|re| re.is_match(&stripped));
            let skip_invalid = !is_valid_comment_encoding(body);
            if !skip_magic && !skip_invalid {
                collected_rev.push(stripped);
            }
            idx -= 1;
        }

        if collected_rev.is_empty() {
            None
        } else {
            collected_rev.reverse();
            Some(collected_rev.join("\n"))
        }
    }

    fn comment_body_at(&self, idx: i64) -> Option<&str> {
        if idx < 0 {
            return None;
        }
        let line = self.lines.get(idx as usize)?;
        let trimmed = line.trim_start();
        trimmed.starts_with('#').then_some(trimmed)
    }

    fn emit_entry(
        &mut self,
        name: String,
        name_location: Location,
        location: Location,
        kind: EntryKind,
        visibility: Visibility,
    ) {
        let comments = self.collect_comments_above(location.start_line);
        let entry = Entry {
            name,
            uri: self.uri.clone(),
            location,
            name_location,
            comments,
            visibility,
            kind,
        };
        self.index.add(entry, false);
    }

    // ---- Class / Module / SingletonClass ----------------------------------

    fn process_class_node_entry(&mut self, node: &ruby_prism::ClassNode) {
        let constant_path = node.constant_path();
        let Some(written) = flatten_name_node(&constant_path) else {
            self.stack.push(String::new());
            self.current_nesting = self.current_nesting.clone();
            self.owner_stack.push(self.current_owner());
            self.visibility_stack.push(VisibilityScope::Public);
            return;
        };

        let nesting = self.derive_nesting(&written);
        let name = Entry::namespace_name(&nesting);
        let name_location = self.node_location(constant_path.location());
        let location = self.node_location(node.location());

        let written_superclass = node.superclass().and_then(|s| flatten_name_node(&s));
        let parent_class = match written_superclass {
            Some(p) => Some(p),
            None => match nesting.as_slice() {
                [only] if only == "Object" => Some("::BasicObject".to_string()),
                [only] if only == "BasicObject" => None,
                _ => Some("::Object".to_string()),
            },
        };

        self.emit_entry(
            name.clone(),
            name_location,
            location,
            EntryKind::Namespace(NamespaceData::class(nesting.clone(), parent_class)),
            Visibility::Public,
        );

        self.stack.push(written);
        self.current_nesting = nesting;
        self.owner_stack.push(name);
        self.visibility_stack.push(VisibilityScope::Public);
    }

    fn process_class_node_exit(&mut self, _node: &ruby_prism::ClassNode) {
        self.pop_namespace_scope();
    }

    fn process_module_node_entry(&mut self, node: &ruby_prism::ModuleNode) {
        let constant_path = node.constant_path();
        let Some(written) = flatten_name_node(&constant_path) else {
            self.stack.push(String::new());
            self.owner_stack.push(self.current_owner());
            self.visibility_stack.push(VisibilityScope::Public);
            return;
        };

        let nesting = self.derive_nesting(&written);
        let name = Entry::namespace_name(&nesting);
        let name_location = self.node_location(constant_path.location());
        let location = self.node_location(node.location());

        self.emit_entry(
            name.clone(),
            name_location,
            location,
            EntryKind::Namespace(NamespaceData::module(nesting.clone())),
            Visibility::Public,
        );

        self.stack.push(written);
        self.current_nesting = nesting;
        self.owner_stack.push(name);
        self.visibility_stack.push(VisibilityScope::Public);
    }

    fn process_module_node_exit(&mut self, _node: &ruby_prism::ModuleNode) {
        self.pop_namespace_scope();
    }

    fn pop_namespace_scope(&mut self) {
        self.stack.pop();
        self.current_nesting = self.derive_nesting_from_stack();
        self.owner_stack.pop();
        self.visibility_stack.pop();
    }

    /// Recomputes `current_nesting` from `stack` alone, used after popping a
    /// namespace frame (the stack no longer includes the popped name).
    fn derive_nesting_from_stack(&self) -> Vec<String> {
        let mut start = 0;
        for (i, seg) in self.stack.iter().enumerate().rev() {
            if seg.starts_with("::") {
                start = i;
                break;
            }
        }
        let mut parts = Vec::new();
        for seg in &self.stack[start..] {
            let stripped = seg.strip_prefix("::").unwrap_or(seg);
            for part in stripped.split("::") {
                if !part.is_empty() {
                    parts.push(part.to_string());
                }
            }
        }
        parts
    }

    fn process_singleton_class_node_entry(&mut self, node: &ruby_prism::SingletonClassNode) {
        let expression = node.expression();
        let leaf = self
            .current_nesting
            .last()
            .cloned()
            .unwrap_or_else(|| "Object".to_string());

        let (written_name, attached) = if expression.as_self_node().is_some() {
            (format!("<Class:{leaf}>"), self.current_owner())
        } else {
            let attached = flatten_name_node(&expression)
                .map(|n| self.fully_qualify(&n))
                .unwrap_or_else(|| self.current_owner());
            let attached_leaf = attached.rsplit("::").next().unwrap_or(&attached).to_string();
            (format!("<Class:{attached_leaf}>"), attached)
        };

        let nesting = self.derive_nesting(&written_name);
        let name = Entry::namespace_name(&nesting);
        let name_location = self.node_location(expression.location());
        let location = self.node_location(node.location());

        self.emit_entry(
            name.clone(),
            name_location,
            location,
            EntryKind::Namespace(NamespaceData::singleton_class(nesting.clone(), attached)),
            Visibility::Public,
        );

        self.stack.push(written_name);
        self.current_nesting = nesting;
        self.owner_stack.push(name);
        self.visibility_stack.push(VisibilityScope::Public);
    }

    fn process_singleton_class_node_exit(&mut self, _node: &ruby_prism::SingletonClassNode) {
        self.pop_namespace_scope();
    }

    // ---- def ---------------------------------------------------------------

    fn process_def_node_entry(&mut self, node: &ruby_prism::DefNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        let name_location = self.node_location(node.name_loc());
        let location = self.node_location(node.location());
        let receiver = node.receiver();
        let current_owner = self.current_owner();

        let is_self_receiver = receiver.as_ref().is_some_and(|r| r.as_self_node().is_some());
        let is_other_receiver = receiver.is_some() && !is_self_receiver;

        if is_other_receiver {
            // `def obj.foo` for a non-`self` receiver isn't expressible as
            // an owner in this taxonomy; the body still gets visited so
            // nested declarations inside it are indexed, but with no def
            // frame pushed (spec.md §4.3 only names `nil` and `self`).
            self.def_depth += 1;
            return;
        }

        let owner = if is_self_receiver {
            match self.index.existing_or_new_singleton_class(&current_owner) {
                Some(singleton) => singleton,
                None => current_owner.clone(),
            }
        } else {
            current_owner.clone()
        };

        let scope = self.current_scope();
        let signature = self.build_signature(node.parameters(), &owner, &name);

        if is_self_receiver {
            let visibility = match scope {
                VisibilityScope::PrivateClassMethod => Visibility::Private,
                _ => Visibility::Public,
            };
            self.emit_entry(
                name.clone(),
                name_location,
                location,
                EntryKind::Member(MemberData {
                    owner: owner.clone(),
                    kind: MemberKind::Method(MethodData { signatures: vec![signature] }),
                }),
                visibility,
            );
            self.owner_stack.push(owner);
        } else {
            let visibility = scope.base_visibility();
            self.emit_entry(
                name.clone(),
                name_location,
                location,
                EntryKind::Member(MemberData {
                    owner: owner.clone(),
                    kind: MemberKind::Method(MethodData { signatures: vec![signature.clone()] }),
                }),
                visibility,
            );

            if scope == VisibilityScope::ModuleFunction {
                if let Some(singleton) = self.index.existing_or_new_singleton_class(&owner) {
                    self.emit_entry(
                        name,
                        name_location,
                        location,
                        EntryKind::Member(MemberData {
                            owner: singleton,
                            kind: MemberKind::Method(MethodData { signatures: vec![signature] }),
                        }),
                        Visibility::Public,
                    );
                }
            }
        }

        self.def_depth += 1;
        self.visibility_stack.push(VisibilityScope::Public);
    }

    fn process_def_node_exit(&mut self, node: &ruby_prism::DefNode) {
        self.def_depth -= 1;
        self.visibility_stack.pop();

        let receiver = node.receiver();
        let is_self_receiver = receiver.as_ref().is_some_and(|r| r.as_self_node().is_some());
        if is_self_receiver {
            self.owner_stack.pop();
        }
    }

    fn build_signature(
        &mut self,
        params: Option<ruby_prism::ParametersNode>,
        owner: &str,
        method_name: &str,
    ) -> Signature {
        let Some(params) = params else {
            return Signature::empty();
        };

        let parameter_owner = format!("{owner}#{method_name}");
        let mut parameters = Vec::new();

        for required in params.requireds().iter() {
            if let Some(p) = required.as_required_parameter_node() {
                let display = String::from_utf8_lossy(p.name().as_slice()).into_owned();
                parameters.push(self.emit_parameter(
                    &parameter_owner,
                    p.location(),
                    Parameter::Required { name: display },
                ));
            }
        }

        for optional in params.optionals().iter() {
            if let Some(p) = optional.as_optional_parameter_node() {
                let display = String::from_utf8_lossy(p.name().as_slice()).into_owned();
                parameters.push(self.emit_parameter(
                    &parameter_owner,
                    p.location(),
                    Parameter::Optional { name: display },
                ));
            }
        }

        if let Some(rest) = params.rest() {
            if let Some(forwarding) = rest.as_forwarding_parameter_node() {
                parameters.push(self.emit_parameter(
                    &parameter_owner,
                    forwarding.location(),
                    Parameter::Forwarding,
                ));
            } else if let Some(p) = rest.as_rest_parameter_node() {
                let display = p.name().map(|n| String::from_utf8_lossy(n.as_slice()).into_owned());
                parameters.push(self.emit_parameter(
                    &parameter_owner,
                    p.location(),
                    Parameter::rest(display),
                ));
            }
        }

        for post in params.posts().iter() {
            if let Some(p) = post.as_required_parameter_node() {
                let display = String::from_utf8_lossy(p.name().as_slice()).into_owned();
                parameters.push(self.emit_parameter(
                    &parameter_owner,
                    p.location(),
                    Parameter::Required { name: display },
                ));
            }
        }

        for keyword in params.keywords().iter() {
            if let Some(p) = keyword.as_required_keyword_parameter_node() {
                let display = String::from_utf8_lossy(p.name().as_slice()).into_owned();
                parameters.push(self.emit_parameter(
                    &parameter_owner,
                    p.location(),
                    Parameter::Keyword { name: display },
                ));
            } else if let Some(p) = keyword.as_optional_keyword_parameter_node() {
                let display = String::from_utf8_lossy(p.name().as_slice()).into_owned();
                parameters.push(self.emit_parameter(
                    &parameter_owner,
                    p.location(),
                    Parameter::OptionalKeyword { name: display },
                ));
            }
        }

        if let Some(p) = params.keyword_rest().and_then(|n| n.as_keyword_rest_parameter_node()) {
            let display = p.name().map(|n| String::from_utf8_lossy(n.as_slice()).into_owned());
            parameters.push(self.emit_parameter(
                &parameter_owner,
                p.location(),
                Parameter::keyword_rest(display),
            ));
        }

        if let Some(p) = params.block() {
            let display = p.name().map(|n| String::from_utf8_lossy(n.as_slice()).into_owned());
            parameters.push(self.emit_parameter(&parameter_owner, p.location(), Parameter::block(display)));
        }

        Signature::new(parameters)
    }

    fn emit_parameter(
        &mut self,
        owner: &str,
        loc: ruby_prism::Location,
        parameter: Parameter,
    ) -> Parameter {
        let location = self.node_location(loc);
        self.emit_entry(
            parameter.display_name().to_string(),
            location,
            location,
            EntryKind::Parameter {
                owner: owner.to_string(),
                parameter: parameter.clone(),
            },
            Visibility::Public,
        );
        parameter
    }

    // ---- Call nodes ---------------------------------------------------------

    fn build_call_info(&self, node: &ruby_prism::CallNode) -> CallInfo {
        let method_name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        let receiver = node.receiver();
        let receiver_kind = match &receiver {
            None => ReceiverKind::Implicit,
            Some(n) if n.as_self_node().is_some() => ReceiverKind::SelfReceiver,
            Some(n) => ReceiverKind::Named(self.node_text(n.location())),
        };

        let arguments = node
            .arguments()
            .map(|args| {
                args.arguments()
                    .iter()
                    .map(|arg| CallArgument { text: self.node_text(arg.location()), keyword: None })
                    .collect()
            })
            .unwrap_or_default();

        CallInfo {
            method_name,
            receiver: receiver_kind,
            arguments,
            location: self.node_location(node.location()),
            enclosing_namespace: (!self.current_nesting.is_empty())
                .then(|| self.current_nesting.join("::")),
            uri: self.uri.clone(),
        }
    }

    fn process_call_node_entry(&mut self, node: &ruby_prism::CallNode) {
        let call_info = self.build_call_info(node);
        self.index.run_enhancements_on_call_enter(&call_info);

        let receiver = node.receiver();
        let receiver_is_self_or_absent =
            receiver.as_ref().map_or(true, |r| r.as_self_node().is_some());
        if !receiver_is_self_or_absent {
            return;
        }

        let args: Vec<ruby_prism::Node> = node
            .arguments()
            .map(|a| a.arguments().iter().collect())
            .unwrap_or_default();
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();

        match name.as_str() {
            "private_constant" => self.handle_private_constant(&args),
            "attr_reader" => self.handle_attr(&args, true, false),
            "attr_writer" => self.handle_attr(&args, false, true),
            "attr_accessor" => self.handle_attr(&args, true, true),
            "include" => self.handle_mixin(MixinKind::Include, &args),
            "prepend" => self.handle_mixin(MixinKind::Prepend, &args),
            "extend" => self.handle_extend(&args),
            "public" if args.is_empty() => self.set_current_scope(VisibilityScope::Public),
            "protected" if args.is_empty() => self.set_current_scope(VisibilityScope::Protected),
            "private" if args.is_empty() => self.set_current_scope(VisibilityScope::Private),
            "public" => self.handle_visibility_args(&args, Visibility::Public),
            "protected" => self.handle_visibility_args(&args, Visibility::Protected),
            "private" => self.handle_visibility_args(&args, Visibility::Private),
            "module_function" if args.is_empty() => self.set_current_scope(VisibilityScope::ModuleFunction),
            "module_function" => self.handle_module_function_args(&args),
            "private_class_method" if args.is_empty() => {
                self.set_current_scope(VisibilityScope::PrivateClassMethod)
            }
            "private_class_method" => self.handle_private_class_method_args(&args),
            "alias_method" => self.handle_alias_method(&args),
            _ => {}
        }
    }

    fn process_call_node_exit(&mut self, node: &ruby_prism::CallNode) {
        let call_info = self.build_call_info(node);
        self.index.run_enhancements_on_call_leave(&call_info);
    }

    fn handle_private_constant(&mut self, args: &[ruby_prism::Node]) {
        for arg in args {
            let Some(name) = symbol_or_string_text(arg) else { continue };
            let fqn = self.fully_qualify(&name);
            if let Some(bucket) = self.index.get_mut(&fqn) {
                for entry in bucket.iter_mut() {
                    entry.visibility = Visibility::Private;
                }
            }
        }
    }

    fn handle_attr(&mut self, args: &[ruby_prism::Node], reader: bool, writer: bool) {
        let owner = self.current_owner();
        let scope_visibility = self.current_scope().base_visibility();

        for arg in args {
            let Some(name) = symbol_or_string_text(arg) else { continue };
            let location = self.node_location(arg.location());

            if reader {
                self.emit_entry(
                    name.clone(),
                    location,
                    location,
                    EntryKind::Member(MemberData {
                        owner: owner.clone(),
                        kind: MemberKind::Accessor(AccessorData { signature: Signature::empty() }),
                    }),
                    scope_visibility,
                );
            }
            if writer {
                self.emit_entry(
                    format!("{name}="),
                    location,
                    location,
                    EntryKind::Member(MemberData {
                        owner: owner.clone(),
                        kind: MemberKind::Accessor(AccessorData {
                            signature: Signature::new(vec![Parameter::Required { name }]),
                        }),
                    }),
                    scope_visibility,
                );
            }
        }
    }

    fn handle_mixin(&mut self, kind: MixinKind, args: &[ruby_prism::Node]) {
        let owner = self.current_owner();
        for arg in args {
            let Some(module_name) = flatten_name_node(arg) else { continue };
            if let Some(bucket) = self.index.get_mut(&owner) {
                if let Some(entry) = bucket.first_mut() {
                    entry.add_mixin(MixinOp::new(kind, module_name));
                }
            }
        }
    }

    /// `extend` on `self` or a constant is modelled as Include on the
    /// singleton class (spec.md §4.3).
    fn handle_extend(&mut self, args: &[ruby_prism::Node]) {
        let owner = self.current_owner();
        let Some(singleton) = self.index.existing_or_new_singleton_class(&owner) else { return };
        for arg in args {
            let Some(module_name) = flatten_name_node(arg) else { continue };
            if let Some(bucket) = self.index.get_mut(&singleton) {
                if let Some(entry) = bucket.first_mut() {
                    entry.add_mixin(MixinOp::new(MixinKind::Extend, module_name));
                }
            }
        }
    }

    fn handle_visibility_args(&mut self, args: &[ruby_prism::Node], visibility: Visibility) {
        let owner = self.current_owner();
        for arg in args {
            let Some(name) = symbol_or_string_text(arg) else { continue };
            self.set_method_visibility(&owner, &name, visibility);
        }
    }

    fn handle_module_function_args(&mut self, args: &[ruby_prism::Node]) {
        let owner = self.current_owner();
        for arg in args {
            let Some(name) = symbol_or_string_text(arg) else { continue };
            self.set_method_visibility(&owner, &name, Visibility::Private);
            if let Some(singleton) = self.index.existing_or_new_singleton_class(&owner) {
                let source_entry = self
                    .index
                    .get(&owner)
                    .and_then(|b| b.iter().find(|e| e.name == name))
                    .cloned();
                if let Some(mut copy) = source_entry {
                    if let EntryKind::Member(member) = &mut copy.kind {
                        member.owner = singleton;
                    }
                    copy.visibility = Visibility::Public;
                    self.index.add(copy, false);
                }
            }
        }
    }

    fn handle_private_class_method_args(&mut self, args: &[ruby_prism::Node]) {
        let owner = self.current_owner();
        let Some(singleton) = self.index.existing_or_new_singleton_class(&owner) else { return };
        for arg in args {
            let Some(name) = symbol_or_string_text(arg) else { continue };
            self.set_method_visibility(&singleton, &name, Visibility::Private);
        }
    }

    fn set_method_visibility(&mut self, owner: &str, method_name: &str, visibility: Visibility) {
        if let Some(bucket) = self.index.get_mut(method_name) {
            for entry in bucket.iter_mut() {
                if matches!(&entry.kind, EntryKind::Member(m) if m.owner == owner) {
                    entry.visibility = visibility;
                }
            }
        }
    }

    fn handle_alias_method(&mut self, args: &[ruby_prism::Node]) {
        let owner = self.current_owner();
        if args.len() < 2 {
            return;
        }
        let Some(new_name) = symbol_or_string_text(&args[0]) else { return };
        let Some(old_name) = symbol_or_string_text(&args[1]) else { return };
        let location = self.node_location(args[0].location());
        self.emit_entry(
            new_name.clone(),
            location,
            location,
            EntryKind::Member(MemberData {
                owner,
                kind: MemberKind::UnresolvedMethodAlias { new_name, old_name },
            }),
            self.current_scope().base_visibility(),
        );
    }

    fn process_alias_method_node_entry(&mut self, node: &ruby_prism::AliasMethodNode) {
        let owner = self.current_owner();
        let Some(new_name) = symbol_or_string_text(&node.new_name()) else { return };
        let Some(old_name) = symbol_or_string_text(&node.old_name()) else { return };
        let location = self.node_location(node.location());
        self.emit_entry(
            new_name.clone(),
            location,
            location,
            EntryKind::Member(MemberData {
                owner,
                kind: MemberKind::UnresolvedMethodAlias { new_name, old_name },
            }),
            self.current_scope().base_visibility(),
        );
    }

    // ---- Constant writes ----------------------------------------------------

    fn process_constant_write(&mut self, name: String, name_location: Location, location: Location, value: Option<ruby_prism::Node>) {
        let kind = self.classify_constant_write(value);
        self.emit_entry(self.fully_qualify(&name), name_location, location, kind, self.current_scope().base_visibility());
    }

    fn process_constant_path_write(&mut self, target: ruby_prism::ConstantPathNode, location: Location, value: Option<ruby_prism::Node>) {
        let Some(written) = flatten_constant_path_node(&target) else { return };
        let name_location = self.node_location(target.location());
        let kind = self.classify_constant_write(value);
        self.emit_entry(self.fully_qualify(&written), name_location, location, kind, self.current_scope().base_visibility());
    }

    // ---- Multi-write (`a, b = 1, 2`, `a, *b, c = ...`) -----------------------

    /// spec.md §4.3 "multi-write", §8 boundary property: "only targets up to
    /// and including the splat get literal values; subsequent targets are
    /// emitted without value-derived aliases." The per-position RHS value is
    /// only recoverable when the RHS is written as a literal list (an
    /// `ArrayNode`); any other RHS shape has no per-target breakdown to offer.
    fn process_multi_write_node(&mut self, node: &ruby_prism::MultiWriteNode) {
        let lefts: Vec<ruby_prism::Node> = node.lefts().iter().collect();
        let rest = node.rest();
        let rights: Vec<ruby_prism::Node> = node.rights().iter().collect();
        let value = node.value();

        let rhs_elements: Option<Vec<ruby_prism::Node>> =
            value.as_array_node().map(|arr| arr.elements().iter().collect());

        for (i, target) in lefts.iter().enumerate() {
            let rhs_value = rhs_elements.as_ref().and_then(|els| els.get(i)).cloned();
            self.emit_multi_write_target(target, rhs_value);
        }

        if let Some(splat) = rest.as_ref().and_then(|r| r.as_splat_node()) {
            if let Some(expr) = splat.expression() {
                let rhs_value = rhs_elements.as_ref().and_then(|els| els.get(lefts.len())).cloned();
                self.emit_multi_write_target(&expr, rhs_value);
            }
        }

        for target in &rights {
            self.emit_multi_write_target(target, None);
        }
    }

    /// Dispatches one multi-write target to the same Entry-emission path its
    /// standalone `*TargetNode` visitor would use; local-variable targets,
    /// bare unnamed splats, and nested destructuring targets carry no Entry
    /// shape this taxonomy models and are left untouched.
    fn emit_multi_write_target(&mut self, target: &ruby_prism::Node, value: Option<ruby_prism::Node>) {
        if let Some(t) = target.as_constant_target_node() {
            let name = String::from_utf8_lossy(t.name().as_slice()).into_owned();
            let location = self.node_location(t.location());
            self.process_constant_write(name, location, location, value);
        } else if let Some(t) = target.as_constant_path_target_node() {
            let location = self.node_location(t.location());
            if let Some(written) = flatten_constant_path_target(&t) {
                let kind = self.classify_constant_write(value);
                self.emit_entry(
                    self.fully_qualify(&written),
                    location,
                    location,
                    kind,
                    self.current_scope().base_visibility(),
                );
            }
        } else if let Some(t) = target.as_instance_variable_target_node() {
            self.handle_ivar(t.name().as_slice(), t.location(), t.location());
        } else if let Some(t) = target.as_class_variable_target_node() {
            self.handle_cvar(t.name().as_slice(), t.location(), t.location());
        } else if let Some(t) = target.as_global_variable_target_node() {
            self.handle_gvar(t.name().as_slice(), t.location(), t.location());
        }
    }

    /// spec.md §4.3: "The right-hand side drives the choice."
    fn classify_constant_write(&self, value: Option<ruby_prism::Node>) -> EntryKind {
        let Some(value) = value else {
            return EntryKind::Constant;
        };

        if value.as_constant_read_node().is_some() || value.as_constant_path_node().is_some() {
            if let Some(target) = flatten_name_node(&value) {
                return EntryKind::UnresolvedConstantAlias {
                    target,
                    nesting: self.current_nesting.clone(),
                };
            }
            return EntryKind::Constant;
        }

        if let Some(target) = constant_assignment_target_name(&value) {
            return EntryKind::UnresolvedConstantAlias {
                target,
                nesting: self.current_nesting.clone(),
            };
        }

        EntryKind::Constant
    }
}

fn strip_comment_sigil(body: &str) -> String {
    let rest = body.strip_prefix('#').unwrap_or(body);
    rest.strip_prefix(' ').unwrap_or(rest).to_string()
}

fn is_valid_comment_encoding(body: &str) -> bool {
    !body.contains('\u{FFFD}')
}

fn symbol_or_string_text(node: &ruby_prism::Node) -> Option<String> {
    if let Some(sym) = node.as_symbol_node() {
        return Some(String::from_utf8_lossy(sym.unescaped()).into_owned());
    }
    if let Some(s) = node.as_string_node() {
        return Some(String::from_utf8_lossy(s.unescaped()).into_owned());
    }
    None
}

/// Flattens a bare constant read or constant path into its written text
/// (absolute paths keep a leading `"::"`). Returns `None` for anything whose
/// base isn't ultimately a constant (spec.md §4.3: "References like
/// `var::FOO` or `self.class::FOO` ... are ignored").
fn flatten_name_node(node: &ruby_prism::Node) -> Option<String> {
    if let Some(read) = node.as_constant_read_node() {
        return Some(String::from_utf8_lossy(read.name().as_slice()).into_owned());
    }
    if let Some(path) = node.as_constant_path_node() {
        return flatten_constant_path_node(&path);
    }
    None
}

/// Flattens a `ConstantPathNode` (the type `.target()` returns on every
/// `ConstantPath*WriteNode`) into its written text directly, without going
/// through the generic `Node` narrowing `flatten_name_node` needs for
/// expression contexts.
fn flatten_constant_path_node(path: &ruby_prism::ConstantPathNode) -> Option<String> {
    let absolute = path.parent().is_none();
    let mut parts = Vec::new();
    if !collect_namespaces(path, &mut parts) {
        return None;
    }
    let joined = parts.join("::");
    Some(if absolute { format!("::{joined}") } else { joined })
}

/// Same flattening for a `ConstantPathTargetNode` (the multiple-assignment
/// target form, e.g. `Foo::BAR, _ = *pair`), which carries the same
/// `parent`/`name` shape as `ConstantPathNode` but is a distinct node type.
fn flatten_constant_path_target(node: &ruby_prism::ConstantPathTargetNode) -> Option<String> {
    let absolute = node.parent().is_none();
    let mut parts = Vec::new();
    if let Some(parent) = node.parent() {
        if let Some(parent_path) = parent.as_constant_path_node() {
            if !collect_namespaces(&parent_path, &mut parts) {
                return None;
            }
        } else if let Some(parent_read) = parent.as_constant_read_node() {
            parts.push(String::from_utf8_lossy(parent_read.name().as_slice()).into_owned());
        } else {
            return None;
        }
    }
    let name = node.name()?;
    parts.push(String::from_utf8_lossy(name.as_slice()).into_owned());
    let joined = parts.join("::");
    Some(if absolute { format!("::{joined}") } else { joined })
}

/// Recursively flattens a `ConstantPathNode` chain into ordered segment
/// names, parent-first. Returns `false` if the path's base isn't expressible
/// as a constant (a local variable, `self`, a call, ...).
fn collect_namespaces(node: &ruby_prism::ConstantPathNode, acc: &mut Vec<String>) -> bool {
    if let Some(parent) = node.parent() {
        if let Some(parent_path) = parent.as_constant_path_node() {
            if !collect_namespaces(&parent_path, acc) {
                return false;
            }
        } else if let Some(parent_read) = parent.as_constant_read_node() {
            acc.push(String::from_utf8_lossy(parent_read.name().as_slice()).into_owned());
        } else {
            return false;
        }
    }

    match node.name() {
        Some(name) => {
            acc.push(String::from_utf8_lossy(name.as_slice()).into_owned());
            true
        }
        None => false,
    }
}

/// For a chained constant assignment (`FOO = BAR = Something`), extracts the
/// name being assigned on the right (spec.md §4.3: "an assignment node →
/// likewise (the RHS name)").
fn constant_assignment_target_name(node: &ruby_prism::Node) -> Option<String> {
    if let Some(n) = node.as_constant_write_node() {
        return Some(String::from_utf8_lossy(n.name().as_slice()).into_owned());
    }
    if let Some(n) = node.as_constant_or_write_node() {
        return Some(String::from_utf8_lossy(n.name().as_slice()).into_owned());
    }
    if let Some(n) = node.as_constant_and_write_node() {
        return Some(String::from_utf8_lossy(n.name().as_slice()).into_owned());
    }
    if let Some(n) = node.as_constant_operator_write_node() {
        return Some(String::from_utf8_lossy(n.name().as_slice()).into_owned());
    }
    if let Some(n) = node.as_constant_path_write_node() {
        return flatten_constant_path_node(&n.target());
    }
    if let Some(n) = node.as_constant_path_or_write_node() {
        return flatten_constant_path_node(&n.target());
    }
    if let Some(n) = node.as_constant_path_and_write_node() {
        return flatten_constant_path_node(&n.target());
    }
    if let Some(n) = node.as_constant_path_operator_write_node() {
        return flatten_constant_path_node(&n.target());
    }
    None
}

impl<'a> Visit<'_> for DeclarationListener<'a> {
    fn visit_class_node(&mut self, node: &ruby_prism::ClassNode) {
        self.process_class_node_entry(node);
        ruby_prism::visit_class_node(self, node);
        self.process_class_node_exit(node);
    }

    fn visit_module_node(&mut self, node: &ruby_prism::ModuleNode) {
        self.process_module_node_entry(node);
        ruby_prism::visit_module_node(self, node);
        self.process_module_node_exit(node);
    }

    fn visit_singleton_class_node(&mut self, node: &ruby_prism::SingletonClassNode) {
        self.process_singleton_class_node_entry(node);
        ruby_prism::visit_singleton_class_node(self, node);
        self.process_singleton_class_node_exit(node);
    }

    fn visit_def_node(&mut self, node: &ruby_prism::DefNode) {
        self.process_def_node_entry(node);
        ruby_prism::visit_def_node(self, node);
        self.process_def_node_exit(node);
    }

    fn visit_call_node(&mut self, node: &ruby_prism::CallNode) {
        self.process_call_node_entry(node);
        ruby_prism::visit_call_node(self, node);
        self.process_call_node_exit(node);
    }

    fn visit_alias_method_node(&mut self, node: &ruby_prism::AliasMethodNode) {
        self.process_alias_method_node_entry(node);
        ruby_prism::visit_alias_method_node(self, node);
    }

    fn visit_constant_write_node(&mut self, node: &ruby_prism::ConstantWriteNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        let name_location = self.node_location(node.name_loc());
        let location = self.node_location(node.location());
        self.process_constant_write(name, name_location, location, Some(node.value()));
        ruby_prism::visit_constant_write_node(self, node);
    }

    fn visit_constant_or_write_node(&mut self, node: &ruby_prism::ConstantOrWriteNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        let name_location = self.node_location(node.name_loc());
        let location = self.node_location(node.location());
        self.process_constant_write(name, name_location, location, Some(node.value()));
        ruby_prism::visit_constant_or_write_node(self, node);
    }

    fn visit_constant_and_write_node(&mut self, node: &ruby_prism::ConstantAndWriteNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        let name_location = self.node_location(node.name_loc());
        let location = self.node_location(node.location());
        self.process_constant_write(name, name_location, location, Some(node.value()));
        ruby_prism::visit_constant_and_write_node(self, node);
    }

    fn visit_constant_operator_write_node(&mut self, node: &ruby_prism::ConstantOperatorWriteNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        let name_location = self.node_location(node.name_loc());
        let location = self.node_location(node.location());
        self.process_constant_write(name, name_location, location, Some(node.value()));
        ruby_prism::visit_constant_operator_write_node(self, node);
    }

    fn visit_multi_write_node(&mut self, node: &ruby_prism::MultiWriteNode) {
        // Emits targets directly rather than delegating to the default
        // recursion: the generic walk would re-visit each `*TargetNode`
        // child and re-emit it with no RHS value, duplicating the entry
        // `process_multi_write_node` already produced with the correct
        // per-position value (or deliberate `None` past a splat).
        self.process_multi_write_node(node);
    }

    fn visit_constant_target_node(&mut self, node: &ruby_prism::ConstantTargetNode) {
        let name = String::from_utf8_lossy(node.name().as_slice()).into_owned();
        let location = self.node_location(node.location());
        self.process_constant_write(name, location, location, None);
        ruby_prism::visit_constant_target_node(self, node);
    }

    fn visit_constant_path_write_node(&mut self, node: &ruby_prism::ConstantPathWriteNode) {
        let location = self.node_location(node.location());
        self.process_constant_path_write(node.target(), location, Some(node.value()));
        ruby_prism::visit_constant_path_write_node(self, node);
    }

    fn visit_constant_path_or_write_node(&mut self, node: &ruby_prism::ConstantPathOrWriteNode) {
        let location = self.node_location(node.location());
        self.process_constant_path_write(node.target(), location, Some(node.value()));
        ruby_prism::visit_constant_path_or_write_node(self, node);
    }

    fn visit_constant_path_and_write_node(&mut self, node: &ruby_prism::ConstantPathAndWriteNode) {
        let location = self.node_location(node.location());
        self.process_constant_path_write(node.target(), location, Some(node.value()));
        ruby_prism::visit_constant_path_and_write_node(self, node);
    }

    fn visit_constant_path_operator_write_node(&mut self, node: &ruby_prism::ConstantPathOperatorWriteNode) {
        let location = self.node_location(node.location());
        self.process_constant_path_write(node.target(), location, Some(node.value()));
        ruby_prism::visit_constant_path_operator_write_node(self, node);
    }

    fn visit_constant_path_target_node(&mut self, node: &ruby_prism::ConstantPathTargetNode) {
        let location = self.node_location(node.location());
        if let Some(written) = flatten_constant_path_target(node) {
            let name_location = location;
            self.emit_entry(
                self.fully_qualify(&written),
                name_location,
                location,
                EntryKind::Constant,
                self.current_scope().base_visibility(),
            );
        }
        ruby_prism::visit_constant_path_target_node(self, node);
    }

    fn visit_instance_variable_write_node(&mut self, node: &ruby_prism::InstanceVariableWriteNode) {
        self.handle_ivar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_instance_variable_write_node(self, node);
    }

    fn visit_instance_variable_target_node(&mut self, node: &ruby_prism::InstanceVariableTargetNode) {
        self.handle_ivar(node.name().as_slice(), node.location(), node.location());
        ruby_prism::visit_instance_variable_target_node(self, node);
    }

    fn visit_instance_variable_or_write_node(&mut self, node: &ruby_prism::InstanceVariableOrWriteNode) {
        self.handle_ivar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_instance_variable_or_write_node(self, node);
    }

    fn visit_instance_variable_and_write_node(&mut self, node: &ruby_prism::InstanceVariableAndWriteNode) {
        self.handle_ivar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_instance_variable_and_write_node(self, node);
    }

    fn visit_instance_variable_operator_write_node(&mut self, node: &ruby_prism::InstanceVariableOperatorWriteNode) {
        self.handle_ivar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_instance_variable_operator_write_node(self, node);
    }

    fn visit_class_variable_write_node(&mut self, node: &ruby_prism::ClassVariableWriteNode) {
        self.handle_cvar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_class_variable_write_node(self, node);
    }

    fn visit_class_variable_target_node(&mut self, node: &ruby_prism::ClassVariableTargetNode) {
        self.handle_cvar(node.name().as_slice(), node.location(), node.location());
        ruby_prism::visit_class_variable_target_node(self, node);
    }

    fn visit_class_variable_or_write_node(&mut self, node: &ruby_prism::ClassVariableOrWriteNode) {
        self.handle_cvar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_class_variable_or_write_node(self, node);
    }

    fn visit_class_variable_and_write_node(&mut self, node: &ruby_prism::ClassVariableAndWriteNode) {
        self.handle_cvar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_class_variable_and_write_node(self, node);
    }

    fn visit_class_variable_operator_write_node(&mut self, node: &ruby_prism::ClassVariableOperatorWriteNode) {
        self.handle_cvar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_class_variable_operator_write_node(self, node);
    }

    fn visit_global_variable_write_node(&mut self, node: &ruby_prism::GlobalVariableWriteNode) {
        self.handle_gvar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_global_variable_write_node(self, node);
    }

    fn visit_global_variable_target_node(&mut self, node: &ruby_prism::GlobalVariableTargetNode) {
        self.handle_gvar(node.name().as_slice(), node.location(), node.location());
        ruby_prism::visit_global_variable_target_node(self, node);
    }

    fn visit_global_variable_or_write_node(&mut self, node: &ruby_prism::GlobalVariableOrWriteNode) {
        self.handle_gvar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_global_variable_or_write_node(self, node);
    }

    fn visit_global_variable_and_write_node(&mut self, node: &ruby_prism::GlobalVariableAndWriteNode) {
        self.handle_gvar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_global_variable_and_write_node(self, node);
    }

    fn visit_global_variable_operator_write_node(&mut self, node: &ruby_prism::GlobalVariableOperatorWriteNode) {
        self.handle_gvar(node.name().as_slice(), node.name_loc(), node.location());
        ruby_prism::visit_global_variable_operator_write_node(self, node);
    }
}

impl<'a> DeclarationListener<'a> {
    fn handle_ivar(&mut self, raw_name: &[u8], name_loc: ruby_prism::Location, loc: ruby_prism::Location) {
        let name = String::from_utf8_lossy(raw_name).into_owned();
        if name == "@" {
            return;
        }
        let name_location = self.node_location(name_loc);
        let location = self.node_location(loc);
        let owner = self.instance_variable_owner();
        let visibility = self.current_scope().base_visibility();
        self.emit_entry(name, name_location, location, EntryKind::InstanceVariable { owner }, visibility);
    }

    fn handle_cvar(&mut self, raw_name: &[u8], name_loc: ruby_prism::Location, loc: ruby_prism::Location) {
        let name = String::from_utf8_lossy(raw_name).into_owned();
        if name == "@@" {
            return;
        }
        let name_location = self.node_location(name_loc);
        let location = self.node_location(loc);
        let owner = Some(self.class_variable_owner());
        let visibility = self.current_scope().base_visibility();
        self.emit_entry(name, name_location, location, EntryKind::ClassVariable { owner }, visibility);
    }

    fn handle_gvar(&mut self, raw_name: &[u8], name_loc: ruby_prism::Location, loc: ruby_prism::Location) {
        let name = String::from_utf8_lossy(raw_name).into_owned();
        if name.is_empty() || name == "$" {
            return;
        }
        let name_location = self.node_location(name_loc);
        let location = self.node_location(loc);
        let visibility = self.current_scope().base_visibility();
        self.emit_entry(name, name_location, location, EntryKind::GlobalVariable, visibility);
    }
}
