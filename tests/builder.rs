//! Builder API tests: build ASTs programmatically, format, and verify.

mod common;

use common::vars;
use rift_rs::builder::{
    Template, binary, call, coalesce, field, float, ident, index, int, interpolate, literal,
    string, ternary, unary,
};
use rift_rs::formatter::{format_expression, format_template};
use rift_rs::{BinaryOp, Mode, NodeKind, Registry, Span, UnaryOp, Value, format, parse};

#[test]
fn builder_matches_parsed_tree() {
    let built = Template::new()
        .text("Total: ")
        .expr(binary(ident("price"), BinaryOp::Mul, int(2)))
        .build();
    let parsed = parse("Total: {price * 2}", Mode::Template).expect("parse");
    assert_eq!(built.to_string(), parsed.to_string());
}

#[test]
fn builder_nodes_have_empty_spans() {
    let node = call("max", vec![int(1), float(2.5)]);
    assert_eq!(node.span, Span::new(0, 0));
    assert!(node.children().iter().all(|child| child.span.is_empty()));
}

#[test]
fn builder_output_reparses() {
    let node = Template::new()
        .text("{braces} and \\ ")
        .expr(ternary(
            binary(ident("n"), BinaryOp::Gt, int(1)),
            string("many"),
            string("one"),
        ))
        .build();
    let text = format_template(&node);
    assert_eq!(text, r"\{braces\} and \\ {n > 1 ? 'many' : 'one'}");

    let reparsed = parse(&text, Mode::Template).expect("parse");
    assert_eq!(format_template(&reparsed), text);
}

#[test]
fn builder_script_renders() {
    let script = Template::new()
        .text("Hi ")
        .expr(field(ident("user"), "name"))
        .text(", you are ")
        .expr(index(ident("ranks"), int(0)))
        .expr(coalesce(ident("vip"), string(" (vip)")))
        .into_script();
    assert_eq!(script.mode(), Mode::Template);

    let user = vars(&[("name", Value::from("Ada"))]);
    let scope = vars(&[
        ("user", Value::Object(user)),
        ("ranks", Value::Array(vec![Value::from("first")])),
        ("vip", Value::from(false)),
    ]);
    let out = script.run(&scope, &Registry::new()).expect("run");
    assert_eq!(out, "Hi Ada, you are first");
}

#[test]
fn builder_unary_and_interpolation() {
    let node = unary(UnaryOp::Not, ident("done"));
    assert_eq!(format_expression(&node), "!done");

    let node = interpolate(ident("greeting"));
    assert!(matches!(
        node.kind,
        NodeKind::Unary {
            op: UnaryOp::Interpolate,
            ..
        }
    ));
    let scope = vars(&[
        ("who", Value::from("you")),
        ("greeting", Value::from("hey {who}")),
    ]);
    let out = Template::new()
        .expr(node)
        .into_script()
        .run(&scope, Registry::shared())
        .expect("run");
    assert_eq!(out, "hey you");
}

#[test]
fn builder_parenthesizes_by_structure() {
    let node = binary(
        binary(ident("a"), BinaryOp::Sub, ident("b")),
        BinaryOp::Sub,
        binary(ident("c"), BinaryOp::Sub, ident("d")),
    );
    assert_eq!(format_expression(&node), "a - b - (c - d)");

    let node = binary(
        binary(ident("a"), BinaryOp::Lt, ident("b")),
        BinaryOp::Eq,
        literal(true),
    );
    assert_eq!(format_expression(&node), "(a < b) == true");
}

#[test]
fn builder_template_round_trips_through_format() {
    let source = format_template(
        &Template::new()
            .text("sum: ")
            .expr(call("sum", vec![int(1), int(2)]))
            .build(),
    );
    assert_eq!(source, "sum: {sum(1, 2)}");
    assert_eq!(
        format(&source, &rift_rs::Object::new()),
        Ok("sum: 3.00".to_string())
    );
}
