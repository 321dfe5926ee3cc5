//! Parser unit tests.

use crate::parser::parse;
use sigil_ast::{Arena, NodeId, NodeKind};

fn find<'a>(arena: &'a Arena, pred: impl Fn(&NodeKind) -> bool + 'a) -> Vec<NodeId> {
    arena
        .nodes()
        .filter(|n| pred(&n.kind))
        .map(|n| n.id)
        .collect()
}

#[test]
fn test_empty_source() {
    let result = parse("");
    assert!(result.errors.is_empty());
    assert!(matches!(
        result.arena.node(result.root).kind,
        NodeKind::SourceUnit { .. }
    ));
}

#[test]
fn test_pragma_and_import() {
    let result = parse("pragma sigil 1;\nimport \"lib.sgl\";\n");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let pragmas = find(&result.arena, |k| {
        matches!(k, NodeKind::PragmaDirective { .. })
    });
    assert_eq!(pragmas.len(), 1);
    let imports = find(&result.arena, |k| {
        matches!(k, NodeKind::ImportDirective { .. })
    });
    assert_eq!(imports.len(), 1);
    if let NodeKind::ImportDirective { path } = &result.arena.node(imports[0]).kind {
        assert_eq!(path, "lib.sgl");
    }
}

#[test]
fn test_contract_with_state_variable() {
    let result = parse("contract C { uint x; }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let contracts = find(&result.arena, |k| {
        matches!(k, NodeKind::ContractDefinition { .. })
    });
    assert_eq!(contracts.len(), 1);
    let node = result.arena.node(contracts[0]);
    assert_eq!(node.name().unwrap().name, "C");

    let vars = find(&result.arena, |k| {
        matches!(k, NodeKind::VariableDeclaration { .. })
    });
    assert_eq!(vars.len(), 1);
    let var = result.arena.node(vars[0]);
    assert_eq!(var.name().unwrap().name, "x");
    // `x` sits at offset 18.
    assert_eq!(var.name_location().unwrap().start, 18);
}

#[test]
fn test_contract_inheritance_bases_are_paths() {
    let result = parse("contract A {}\ncontract B is A {}");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let paths = find(&result.arena, |k| {
        matches!(k, NodeKind::IdentifierPath { .. })
    });
    assert_eq!(paths.len(), 1);
}

#[test]
fn test_free_functions_and_call() {
    let result = parse("function f() {} function g() { f(); }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let fns = find(&result.arena, |k| {
        matches!(k, NodeKind::FunctionDefinition { .. })
    });
    assert_eq!(fns.len(), 2);
    let calls = find(&result.arena, |k| matches!(k, NodeKind::FunctionCall { .. }));
    assert_eq!(calls.len(), 1);
}

#[test]
fn test_function_params_and_returns() {
    let result = parse("function add(uint a, uint b) returns (uint) { return a + b; }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let params = find(&result.arena, |k| {
        matches!(k, NodeKind::ParameterDeclaration { .. })
    });
    assert_eq!(params.len(), 2);
    let returns = find(&result.arena, |k| {
        matches!(k, NodeKind::ReturnStatement { .. })
    });
    assert_eq!(returns.len(), 1);
}

#[test]
fn test_bodyless_function() {
    let result = parse("function f(uint a);");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let fns = find(&result.arena, |k| {
        matches!(k, NodeKind::FunctionDefinition { body: None, .. })
    });
    assert_eq!(fns.len(), 1);
}

#[test]
fn test_struct_members() {
    let result = parse("struct Point { uint x; uint y; }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let members = find(&result.arena, |k| matches!(k, NodeKind::StructMember { .. }));
    assert_eq!(members.len(), 2);
}

#[test]
fn test_enum_values() {
    let result = parse("enum Color { Red, Green, Blue }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let values = find(&result.arena, |k| matches!(k, NodeKind::EnumValue { .. }));
    assert_eq!(values.len(), 3);
}

#[test]
fn test_doc_comment_attaches_to_declaration() {
    let result = parse("/// Adds one.\nfunction bump(uint n) returns (uint) { return n + 1; }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let fns = find(&result.arena, |k| {
        matches!(k, NodeKind::FunctionDefinition { .. })
    });
    assert_eq!(result.arena.node(fns[0]).kind.doc(), Some("Adds one."));
}

#[test]
fn test_doc_comment_does_not_leak_to_next_item() {
    let result = parse("/// docs\ncontract A {}\ncontract B {}");
    let contracts = find(&result.arena, |k| {
        matches!(k, NodeKind::ContractDefinition { .. })
    });
    assert_eq!(result.arena.node(contracts[0]).kind.doc(), Some("docs"));
    assert_eq!(result.arena.node(contracts[1]).kind.doc(), None);
}

#[test]
fn test_local_declaration_vs_expression_statement() {
    let result = parse("function f() { uint x = 1; x = 2; Point p; p.y = 3; }");
    let vars = find(&result.arena, |k| {
        matches!(k, NodeKind::VariableDeclaration { .. })
    });
    assert_eq!(vars.len(), 2); // `uint x` and `Point p`
    let assigns = find(&result.arena, |k| matches!(k, NodeKind::Assignment { .. }));
    assert_eq!(assigns.len(), 2); // initializer is not an Assignment node
}

#[test]
fn test_if_else_while() {
    let result = parse(
        "function f(uint n) { if (n > 1) { n = 0; } else { n = 1; } while (n < 3) { n = n + 1; } }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(
        find(&result.arena, |k| matches!(k, NodeKind::IfStatement { .. })).len(),
        1
    );
    assert_eq!(
        find(&result.arena, |k| matches!(k, NodeKind::WhileStatement { .. })).len(),
        1
    );
}

#[test]
fn test_precedence() {
    let result = parse("uint x = 1 + 2 * 3;");
    assert!(result.errors.is_empty());
    // The `+` node must be the top binary operation covering the full span.
    let top = find(&result.arena, |k| {
        matches!(k, NodeKind::BinaryOperation { op: sigil_ast::BinaryOp::Add, .. })
    });
    assert_eq!(top.len(), 1);
    let add = result.arena.node(top[0]);
    if let NodeKind::BinaryOperation { rhs, .. } = add.kind {
        assert!(matches!(
            result.arena.node(rhs).kind,
            NodeKind::BinaryOperation { op: sigil_ast::BinaryOp::Mul, .. }
        ));
    }
}

#[test]
fn test_member_access_chain() {
    let result = parse("function f() { a.b.c = 1; }");
    let accesses = find(&result.arena, |k| matches!(k, NodeKind::MemberAccess { .. }));
    assert_eq!(accesses.len(), 2);
}

#[test]
fn test_index_access() {
    let result = parse("function f() { a[0] = 1; }");
    assert_eq!(
        find(&result.arena, |k| matches!(k, NodeKind::IndexAccess { .. })).len(),
        1
    );
}

#[test]
fn test_error_recovery_continues_parsing() {
    let result = parse("contract C { uint ; }\ncontract D { uint y; }");
    assert!(!result.errors.is_empty());
    let contracts = find(&result.arena, |k| {
        matches!(k, NodeKind::ContractDefinition { .. })
    });
    assert_eq!(contracts.len(), 2);
}

#[test]
fn test_children_cover_source_order() {
    let result = parse("contract C { uint x; function f() {} }");
    let root = result.arena.node(result.root);
    let items = root.kind.children();
    assert_eq!(items.len(), 1);
    let contract = result.arena.node(items[0]);
    let members = contract.kind.children();
    assert_eq!(members.len(), 2);
    // Members in source order: variable before function.
    assert!(
        result.arena.node(members[0]).span.start < result.arena.node(members[1]).span.start
    );
}

#[test]
fn test_node_spans_contain_children() {
    let result = parse("function f() { return 1 + 2; }");
    for node in result.arena.nodes() {
        for child in node.kind.children() {
            let c = result.arena.node(child);
            assert!(
                node.span.start <= c.span.start && c.span.end <= node.span.end,
                "child {} not contained in parent {}",
                c.kind.label(),
                node.kind.label()
            );
        }
    }
}
