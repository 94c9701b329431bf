//! Integration tests for spec.md §8's concrete scenarios and boundary
//! behaviors, exercised against the public API the way a language server
//! host would drive it: `index_single` to feed a buffer, then the
//! resolution queries a completion/hover/definition request would make.

use pretty_assertions::assert_eq;

use ruby_symbol_index::entry::{EntryKind, MemberKind, NamespaceKind};
use ruby_symbol_index::{Encoding, Index, Uri};

fn indexed(source: &str) -> (Index, Uri) {
    let mut index = Index::new(Encoding::Utf16);
    let uri = Uri::new("file:///a.rb");
    index.index_single(uri.clone(), Some(source.to_string()), None);
    (index, uri)
}

const OBJECT: &str = "class Object; end\n";

#[test]
fn scenario_1_basic_class_and_method() {
    let (mut index, _uri) = indexed(&format!("{OBJECT}class A\n  def foo; end\nend\n"));

    let a = index.resolve_constant("A", &[]).expect("A resolves");
    assert_eq!(a.len(), 1);
    assert!(matches!(a[0].kind, EntryKind::Namespace(_)));
    assert_eq!(a[0].name, "A");

    let foo = index.resolve_method("foo", "A", false).expect("foo resolves");
    assert_eq!(foo.len(), 1);
    match &foo[0].kind {
        EntryKind::Member(member) => assert_eq!(member.owner, "A"),
        other => panic!("expected a Member, got {other:?}"),
    }

    assert_eq!(index.linearized_ancestors_of("A").unwrap(), vec!["A", "Object"]);
}

#[test]
fn scenario_2_include_linearization() {
    let (mut index, _uri) = indexed(&format!(
        "{OBJECT}module M; end\nmodule N; end\nclass C; include M; include N; end\n"
    ));

    assert_eq!(
        index.linearized_ancestors_of("C").unwrap(),
        vec!["C", "N", "M", "Object"]
    );
}

#[test]
fn scenario_3_prepend_and_include() {
    let (mut index, _uri) = indexed(&format!(
        "{OBJECT}module P; end\nmodule I; end\nclass C; include I; prepend P; end\n"
    ));

    assert_eq!(
        index.linearized_ancestors_of("C").unwrap(),
        vec!["P", "C", "I", "Object"]
    );
}

#[test]
fn scenario_4_constant_alias_chain() {
    let (mut index, _uri) = indexed("module X; class Real; end; end\nA = X\nB = A\n");

    let resolved = index.resolve_constant("B::Real", &[]).expect("B::Real resolves");
    assert_eq!(resolved[0].name, "X::Real");

    let a = index.get("A").unwrap();
    assert!(matches!(a[0].kind, EntryKind::ConstantAlias { ref target } if target == "X"));
    let b = index.get("B").unwrap();
    assert!(matches!(b[0].kind, EntryKind::ConstantAlias { ref target } if target == "X"));
}

#[test]
fn scenario_5_singleton_method_and_extend() {
    let (mut index, _uri) = indexed("module M; def m; end; end\nclass C; extend M; end\n");

    let singleton = "C::<Class:C>";
    let resolved = index.resolve_method("m", singleton, false).expect("m resolves");
    match &resolved[0].kind {
        EntryKind::Member(member) => assert_eq!(member.owner, "M"),
        other => panic!("expected a Member, got {other:?}"),
    }

    let ancestors = index.linearized_ancestors_of(singleton).unwrap();
    assert!(ancestors.contains(&"M".to_string()));
}

#[test]
fn scenario_6_reindexing_clears_stale_entries_and_ancestors_cache() {
    let (mut index, uri) = indexed(&format!(
        "{OBJECT}module M; end\nmodule N; end\nclass C; include M; include N; end\n"
    ));
    assert!(index.get("C").is_some());
    index.linearized_ancestors_of("C").unwrap();

    index.handle_change(uri, Some(String::new()), None);

    assert!(index.get("C").is_none());
    assert!(index.get("M").is_none());
    assert!(index.get("N").is_none());
    assert!(index.resolve_constant("C", &[]).is_none());
}

#[test]
fn boundary_empty_file_yields_no_entries_and_delete_is_a_no_op() {
    let (mut index, uri) = indexed("");
    assert!(index.get("Object").is_none());
    assert!(index.resolve_constant("Object", &[]).is_none());
    index.delete(&uri);
    assert!(index.resolve_constant("Object", &[]).is_none());
}

#[test]
fn boundary_self_inheriting_class_linearizes_to_itself_only() {
    let (mut index, _uri) = indexed("class A < A\nend\n");
    assert_eq!(index.linearized_ancestors_of("A").unwrap(), vec!["A"]);
}

#[test]
fn boundary_circular_alias_leaves_both_sides_unresolved() {
    let (mut index, _uri) = indexed("X = Y\nY = X\n");

    assert!(index.resolve_constant("X", &[]).is_some());
    assert!(index.resolve_constant("Y", &[]).is_some());

    let x = index.get("X").unwrap();
    assert!(matches!(x[0].kind, EntryKind::UnresolvedConstantAlias { .. }));
    let y = index.get("Y").unwrap();
    assert!(matches!(y[0].kind, EntryKind::UnresolvedConstantAlias { .. }));
}

#[test]
fn boundary_prepending_after_including_produces_two_entries() {
    let (mut index, _uri) = indexed(&format!("{OBJECT}module M; end\nclass C; include M; prepend M; end\n"));

    let ancestors = index.linearized_ancestors_of("C").unwrap();
    let count = ancestors.iter().filter(|a| *a == "M").count();
    assert_eq!(count, 2);

    let self_pos = ancestors.iter().position(|a| a == "C").unwrap();
    let m_positions: Vec<usize> = ancestors
        .iter()
        .enumerate()
        .filter(|(_, a)| *a == "M")
        .map(|(i, _)| i)
        .collect();
    assert!(m_positions.iter().any(|p| *p < self_pos));
    assert!(m_positions.iter().any(|p| *p > self_pos));
}

#[test]
fn boundary_multi_write_with_splat_only_aliases_up_to_and_including_it() {
    let (mut index, _uri) = indexed(
        "module Foo; end\nmodule Bar; end\nmodule Baz; end\nX, *Y, Z = Foo, Bar, Baz\n",
    );

    let x = index.get("X").unwrap();
    assert!(
        matches!(x[0].kind, EntryKind::UnresolvedConstantAlias { ref target, .. } if target == "Foo")
    );

    let y = index.get("Y").unwrap();
    assert!(
        matches!(y[0].kind, EntryKind::UnresolvedConstantAlias { ref target, .. } if target == "Bar")
    );

    let z = index.get("Z").unwrap();
    assert!(matches!(z[0].kind, EntryKind::Constant));
}

#[test]
fn universal_invariant_reindexing_unchanged_file_is_idempotent() {
    let source = format!("{OBJECT}class A\n  def foo; end\nend\n");
    let (mut index, uri) = indexed(&source);

    let before = index.resolve_constant("A", &[]).map(|e| e.len());
    let before_ancestors = index.linearized_ancestors_of("A").unwrap();

    index.handle_change(uri, Some(source), None);

    let after = index.resolve_constant("A", &[]).map(|e| e.len());
    let after_ancestors = index.linearized_ancestors_of("A").unwrap();

    assert_eq!(before, after);
    assert_eq!(before_ancestors, after_ancestors);
}

#[test]
fn namespace_kind_survives_constant_alias_resolution() {
    let (mut index, _uri) = indexed("module X; end\nA = X\n");
    let resolved = index.resolve_constant("A", &[]).expect("A resolves via alias");
    assert!(matches!(
        resolved[0].as_namespace().map(|n| &n.kind),
        Some(NamespaceKind::Module)
    ));
}
