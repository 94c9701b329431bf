//! The RBS adjunct (spec.md §2 "RBS adjunct": "Adapter that feeds
//! type-signature declarations into the index"). Out of scope per §1 is the
//! RBS parser itself ("specified only via the interfaces it calls") — that
//! lives in the sibling `rbs-parser` crate, carried over unchanged from the
//! teacher's workspace member of the same name. This module is the thin
//! seam between its `Declaration` tree and `Index::add`, grounded in how the
//! Declaration Listener (`src/listener.rs`) builds the same `Entry`
//! variants from a Ruby parse tree — an RBS file's class/module/method
//! declarations become exactly the same `Namespace`/`Member` entries a
//! Ruby source file would produce, just sourced from a `.rbs` file's URI
//! instead, so every existing resolution/linearization query works over
//! them unmodified.
//!
//! spec.md §3 "Signature: ... multiple, to model overload overlays from
//! sidecar type info" is realized here directly: indexing a `.rb` file's
//! `def` first, then an `.rbs` file's matching `MethodDecl`, leaves the
//! `Method` entry's `owner` bucket holding two `Entry` values for the same
//! name — method resolution (`index/method.rs`) already collects every
//! entry owned by the winning ancestor, so both signatures surface.

use rbs_parser::{AttrKind, Declaration, Member, MethodKind as RbsMethodKind, MethodParam, ParamKind};

use crate::entry::{
    AccessorData, Entry, EntryBuilder, EntryKind, MemberData, MemberKind, MethodData, MixinKind,
    MixinOp, NamespaceData, Parameter, Signature, Visibility,
};
use crate::index::Index;
use crate::location::Location;
use crate::uri::Uri;

impl Index {
    /// Feeds one RBS file's parsed declarations into the index. Mirrors
    /// `index_single`'s shape (spec.md §4.4) but skips parsing — the caller
    /// already has a `Vec<Declaration>` from `rbs_parser::parse`.
    pub fn index_rbs_declarations(&mut self, uri: Uri, declarations: &[Declaration]) {
        for decl in declarations {
            self.index_rbs_declaration(&uri, decl, &[]);
        }
    }

    fn index_rbs_declaration(&mut self, uri: &Uri, decl: &Declaration, nesting: &[String]) {
        match decl {
            Declaration::Class(class) => {
                let mut full_nesting = nesting.to_vec();
                full_nesting.extend(class.name.split("::").map(str::to_string));
                let name = full_nesting.join("::");
                let parent_class = class.superclass.as_ref().map(rbs_type_class_name);

                self.add(
                    rbs_entry(
                        name.clone(),
                        uri,
                        class.location.map(rbs_location),
                        EntryKind::Namespace(NamespaceData::class(full_nesting.clone(), parent_class)),
                    ),
                    false,
                );

                self.apply_members(uri, &name, &class.members);
                for method in &class.methods {
                    self.add_rbs_method(uri, &name, method);
                }
            }
            Declaration::Module(module) => {
                let mut full_nesting = nesting.to_vec();
                full_nesting.extend(module.name.split("::").map(str::to_string));
                let name = full_nesting.join("::");

                self.add(
                    rbs_entry(
                        name.clone(),
                        uri,
                        module.location.map(rbs_location),
                        EntryKind::Namespace(NamespaceData::module(full_nesting.clone())),
                    ),
                    false,
                );

                self.apply_members(uri, &name, &module.members);
                for method in &module.methods {
                    self.add_rbs_method(uri, &name, method);
                }
            }
            Declaration::Constant(constant) => {
                let mut full_nesting = nesting.to_vec();
                full_nesting.extend(constant.name.split("::").map(str::to_string));
                self.add(
                    rbs_entry(
                        full_nesting.join("::"),
                        uri,
                        constant.location.map(rbs_location),
                        EntryKind::Constant,
                    ),
                    false,
                );
            }
            Declaration::Global(global) => {
                self.add(
                    rbs_entry(global.name.clone(), uri, global.location.map(rbs_location), EntryKind::GlobalVariable),
                    false,
                );
            }
            // Interfaces and type aliases don't correspond to any spec.md
            // Entry variant: they describe structural types, not namespaces
            // with runtime dispatch, so there is nothing to index them as.
            Declaration::Interface(_) | Declaration::TypeAlias(_) => {}
        }
    }

    fn apply_members(&mut self, uri: &Uri, owner: &str, members: &[Member]) {
        for member in members {
            match member {
                Member::Include(t) => self.add_member_mixin(owner, MixinKind::Include, t),
                Member::Prepend(t) => self.add_member_mixin(owner, MixinKind::Prepend, t),
                Member::Extend(t) => self.add_member_mixin(owner, MixinKind::Extend, t),
                Member::Attr(attr) => self.add_rbs_attr(uri, owner, attr),
                Member::Alias(alias) => {
                    let actual_owner = if alias.is_singleton {
                        self.existing_or_new_singleton_class(owner).unwrap_or_else(|| owner.to_string())
                    } else {
                        owner.to_string()
                    };
                    self.add(
                        rbs_entry(
                            alias.new_name.clone(),
                            uri,
                            alias.location.map(rbs_location),
                            EntryKind::Member(MemberData {
                                owner: actual_owner,
                                kind: MemberKind::UnresolvedMethodAlias {
                                    new_name: alias.new_name.clone(),
                                    old_name: alias.old_name.clone(),
                                },
                            }),
                        ),
                        false,
                    );
                }
                Member::Public | Member::Private => {
                    // Bare visibility markers with no following member list in
                    // this AST shape; RBS signature files don't encode the
                    // "every subsequent member" scoping rule the way Ruby
                    // source's VisibilityScope stack does (spec.md §3), so
                    // there is nothing actionable to apply here.
                }
            }
        }
    }

    fn add_member_mixin(&mut self, owner: &str, kind: MixinKind, module_type: &rbs_parser::RbsType) {
        let module_name = rbs_type_class_name(module_type);
        if let Some(bucket) = self.get_mut(owner) {
            if let Some(entry) = bucket.first_mut() {
                entry.add_mixin(MixinOp::new(kind, module_name));
            }
        }
    }

    fn add_rbs_attr(&mut self, uri: &Uri, owner: &str, attr: &rbs_parser::AttrDecl) {
        let declared_owner = if attr.is_singleton {
            self.existing_or_new_singleton_class(owner).unwrap_or_else(|| owner.to_string())
        } else {
            owner.to_string()
        };
        let location = attr.location.map(rbs_location);

        if matches!(attr.kind, AttrKind::Reader | AttrKind::Accessor) {
            self.add(
                rbs_entry(
                    attr.name.clone(),
                    uri,
                    location,
                    EntryKind::Member(MemberData {
                        owner: declared_owner.clone(),
                        kind: MemberKind::Accessor(AccessorData { signature: Signature::empty() }),
                    }),
                ),
                false,
            );
        }
        if matches!(attr.kind, AttrKind::Writer | AttrKind::Accessor) {
            self.add(
                rbs_entry(
                    format!("{}=", attr.name),
                    uri,
                    location,
                    EntryKind::Member(MemberData {
                        owner: declared_owner,
                        kind: MemberKind::Accessor(AccessorData {
                            signature: Signature::new(vec![Parameter::Required { name: attr.name.clone() }]),
                        }),
                    }),
                ),
                false,
            );
        }
    }

    fn add_rbs_method(&mut self, uri: &Uri, owner: &str, method: &rbs_parser::MethodDecl) {
        let declared_owner = if method.kind == RbsMethodKind::Singleton {
            self.existing_or_new_singleton_class(owner).unwrap_or_else(|| owner.to_string())
        } else {
            owner.to_string()
        };

        let signatures = method
            .overloads
            .iter()
            .map(|overload| Signature::new(overload.params.iter().map(rbs_param_to_parameter).collect()))
            .collect::<Vec<_>>();
        let signatures = if signatures.is_empty() { vec![Signature::empty()] } else { signatures };

        let visibility = match method.visibility {
            rbs_parser::Visibility::Public => Visibility::Public,
            rbs_parser::Visibility::Private => Visibility::Private,
            rbs_parser::Visibility::Protected => Visibility::Protected,
        };

        let mut entry = rbs_entry(
            method.name.clone(),
            uri,
            method.location.map(rbs_location),
            EntryKind::Member(MemberData {
                owner: declared_owner,
                kind: MemberKind::Method(MethodData { signatures }),
            }),
        );
        entry.visibility = visibility;
        self.add(entry, false);
    }
}

fn rbs_param_to_parameter(param: &MethodParam) -> Parameter {
    let name = param.name.clone().unwrap_or_else(|| "_".to_string());
    match param.kind {
        ParamKind::Required => Parameter::Required { name },
        ParamKind::Optional => Parameter::Optional { name },
        ParamKind::Rest => Parameter::rest(param.name.clone()),
        ParamKind::Keyword => Parameter::Keyword { name },
        ParamKind::KeywordOpt => Parameter::OptionalKeyword { name },
        ParamKind::KeywordRest => Parameter::keyword_rest(param.name.clone()),
        ParamKind::Block => Parameter::block(param.name.clone()),
    }
}

/// RBS superclass/mixin types name the target class directly (`ClassInstance`
/// in `rbs_parser`'s `RbsType`); anything else (a union, a generic
/// parameter...) has no single class name and is skipped by the caller.
fn rbs_type_class_name(t: &rbs_parser::RbsType) -> String {
    rbs_parser::get_base_class_name(t).map(str::to_string).unwrap_or_default()
}

fn rbs_location(loc: rbs_parser::Location) -> Location {
    Location::new(loc.start_row as u32, loc.start_col as u32, loc.end_row as u32, loc.end_col as u32)
}

fn rbs_entry(name: String, uri: &Uri, location: Option<Location>, kind: EntryKind) -> Entry {
    let location = location.unwrap_or_default();
    EntryBuilder::new()
        .name(name)
        .uri(uri.clone())
        .location(location)
        .kind(kind)
        .build()
        .expect("rbs_entry always sets the required builder fields")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Encoding;

    #[test]
    fn indexes_a_class_with_a_method_signature() {
        let source = r#"
class Greeter
  def greet: (String name) -> String
end
"#;
        let declarations = rbs_parser::parse(source).expect("valid rbs");
        let mut index = Index::new(Encoding::Utf16);
        let uri = Uri::new("file:///greeter.rbs");
        index.index_rbs_declarations(uri, &declarations);

        let namespace = index.get("Greeter").expect("class indexed");
        assert_eq!(namespace.len(), 1);

        let methods = index.get("greet").expect("method indexed");
        assert_eq!(methods.len(), 1);
        match &methods[0].kind {
            EntryKind::Member(member) => {
                assert_eq!(member.owner, "Greeter");
                match &member.kind {
                    MemberKind::Method(data) => assert_eq!(data.signatures.len(), 1),
                    other => panic!("expected a Method, got {other:?}"),
                }
            }
            other => panic!("expected a Member, got {other:?}"),
        }
    }

    #[test]
    fn a_second_rbs_file_adds_an_overload_alongside_the_first() {
        let mut index = Index::new(Encoding::Utf16);
        let decl_a = rbs_parser::parse("class C\n  def m: () -> Integer\nend\n").unwrap();
        let decl_b = rbs_parser::parse("class C\n  def m: (String) -> Integer\nend\n").unwrap();

        index.index_rbs_declarations(Uri::new("file:///a.rbs"), &decl_a);
        index.index_rbs_declarations(Uri::new("file:///b.rbs"), &decl_b);

        assert_eq!(index.get("m").unwrap().len(), 2);
    }
}
