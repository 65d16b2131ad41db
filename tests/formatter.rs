//! Formatter-specific tests.

mod common;

use common::{assert_stable, reformat, render, render_with, vars};
use rift_rs::builder::{Template, binary, call, ident, int, literal, string};
use rift_rs::formatter::{format_expression, format_template};
use rift_rs::{BinaryOp, Mode, Object, Value, evaluate, parse};

fn reformat_expr(input: &str) -> String {
    format_expression(&parse(input, Mode::Direct).expect("parse failed"))
}

#[test]
fn format_plain_text_unchanged() {
    assert_eq!(reformat("just text\nand\ta tab"), "just text\nand\ta tab");
}

#[test]
fn format_empty_template() {
    assert_eq!(reformat(""), "");
}

#[test]
fn format_decoded_escapes_are_written_back() {
    assert_eq!(reformat(r"bell\a quote\' done"), r"bell\a quote' done");
    assert_eq!(reformat("a } b"), r"a \} b");
}

#[test]
fn format_double_quotes_become_single() {
    assert_eq!(reformat(r#"{"say \"hi\""}"#), r#"{'say "hi"'}"#);
}

#[test]
fn format_operators_are_spaced() {
    assert_eq!(reformat_expr("a+b*c-d/e%f^g"), "a + b * c - d / e % f ^ g");
    assert_eq!(reformat_expr("a<=b"), "a <= b");
    assert_eq!(reformat_expr("a&&b"), "a && b");
}

#[test]
fn format_prefix_operators() {
    assert_eq!(reformat_expr("- x"), "-x");
    assert_eq!(reformat_expr("!(a && b)"), "!(a && b)");
    assert_eq!(reformat_expr("-(1 + 2)"), "-(1 + 2)");
    assert_eq!(reformat_expr("-2 ^ 2"), "-2 ^ 2");
}

#[test]
fn format_logical_operands_are_parenthesized() {
    assert_eq!(reformat_expr("(a && b) || c"), "(a && b) || c");
    assert_eq!(reformat_expr("a && (b == c)"), "a && b == c");
}

#[test]
fn format_nested_ternaries() {
    assert_eq!(reformat_expr("(a ? b : c) ? d : e"), "(a ? b : c) ? d : e");
    assert_eq!(reformat_expr("a ? b : (c ? d : e)"), "a ? b : c ? d : e");
    assert_eq!(reformat_expr("f(a ?? b)"), "f(a ?? b)");
}

#[test]
fn format_postfix_on_parenthesized() {
    assert_eq!(reformat_expr("(a + b).c"), "(a + b).c");
    assert_eq!(reformat_expr("(-a)[0]"), "(-a)[0]");
    assert_eq!(reformat_expr("$(a.b)"), "$a.b");
    assert_eq!(reformat_expr("($a).b"), "($a).b");
    assert_eq!(reformat_expr("(f)(x)"), "f(x)");
}

#[test]
fn format_built_negative_literals() {
    let node = binary(int(-3), BinaryOp::Sub, int(-4));
    assert_eq!(format_expression(&node), "-3 - -4");
    let node = binary(literal(-0.5), BinaryOp::Pow, int(2));
    assert_eq!(format_expression(&node), "(-0.5) ^ 2");
}

#[test]
fn format_minimum_integer() {
    let node = binary(literal(i64::MIN), BinaryOp::Mul, int(1));
    let text = format_expression(&node);
    assert_eq!(text, "(-9223372036854775807 - 1) * 1");
    assert_eq!(evaluate(&text, &Object::new()), Ok(Value::Integer(i64::MIN)));
}

#[test]
fn format_non_finite_floats_as_constants() {
    assert_eq!(format_expression(&literal(f64::INFINITY)), "inf");
    assert_eq!(format_expression(&literal(f64::NEG_INFINITY)), "-inf");
    assert_eq!(format_expression(&literal(f64::NAN)), "nan");
}

#[test]
fn format_large_float_keeps_fraction() {
    let text = format_expression(&literal(1e20));
    assert_eq!(text, "100000000000000000000.0");
    assert_eq!(evaluate(&text, &Object::new()), Ok(Value::Float(1e20)));
}

#[test]
fn format_nested_template_as_interpolation() {
    let inner = Template::new().text("n=").expr(ident("n")).build();
    let node = Template::new().text("[").expr(inner).text("]").build();
    let text = format_template(&node);
    assert_eq!(text, "[{$'n={n}'}]");

    let scope = vars(&[("n", Value::from(5))]);
    assert_eq!(render_with(&text, &scope), "[n=5]");
}

#[test]
fn format_composite_literal_as_string() {
    let node = call("len", vec![literal(Value::Array(vec![Value::from(1)]))]);
    assert_eq!(format_expression(&node), "len('[1]')");
}

#[test]
fn format_string_escapes() {
    let node = string("tab\there 'q' back\\slash");
    assert_eq!(format_expression(&node), r"'tab\there \'q\' back\\slash'");
}

// -----------------------------------------------------------
// Canonical output re-parses to the same canonical output and
// renders the same text.
// -----------------------------------------------------------

const SAMPLES: &[&str] = &[
    "Hello, {name}!",
    "{ a ? (b ?? c) : d }",
    "{((1 + 2) * 3) ^ (4 - 5)}",
    "{ -(-(x)) } { !!y }",
    r"\{literal\} {'\{still a string\}'}",
    "{$'inner {1 + 1} {$\"deeper {2}\"}'}",
    "{f(1, g(2, (3)), xs[0][0])}",
    "{(a < b) == (c > d)}",
    "{xs[1 + 1].name}",
    "{2 ^ 3 ^ 2} {(2 ^ 3) ^ 2}",
];

#[test]
fn format_samples_are_stable() {
    for sample in SAMPLES {
        assert_stable(sample);
    }
}

#[test]
fn format_preserves_output() {
    let inputs = [
        "2 + 2 * 2 = {2 + 2 * 2}!",
        "{(1 - 2) - 3} {1 - (2 - 3)}",
        "{'=' * 5.0}",
        "{true ?? 'cool'}{false ?? 'not cool'}",
        "{-2 ^ 2} {(-2) ^ 2}",
        r"a\nb{'\t'}c",
        "{$'string interpolation: {2 + 2}'}",
    ];
    for input in inputs {
        assert_eq!(render(&reformat(input)), render(input), "{input}");
    }
}
