//! End-to-end tests: whole templates through `format` and `evaluate`.

mod common;

use common::{render, render_with, vars};
use rift_rs::{
    Error, Mode, Object, ParseErrorKind, Registry, RuntimeErrorKind, Span, TokenKind, Value,
    compile, evaluate, format, format_with,
};

fn october() -> Object {
    vars(&[
        ("monthName", Value::from("October")),
        ("day", Value::from(10)),
        ("year", Value::from(2024)),
    ])
}

// -----------------------------------------------------------
// Plain text and escapes
// -----------------------------------------------------------

#[test]
fn text_without_expressions_is_unchanged() {
    for text in ["", "Hello, World!", "multi\nline\ttext", "unicode: héllo ✓"] {
        assert_eq!(render(text), text);
    }
}

#[test]
fn segment_escape_decodes_to_one_character() {
    assert_eq!(render(r"a\nb"), "a\nb");
    assert_eq!(render(r"a\nb").len(), 3);
}

#[test]
fn newline_in_text_and_string() {
    assert_eq!(render(r"Hello!\nNewline:{'\n'}123"), "Hello!\nNewline:\n123");
}

#[test]
fn escaped_braces_are_literal() {
    assert_eq!(render(r"\{not an expression\}"), "{not an expression}");
}

#[test]
fn quotes_inside_strings() {
    assert_eq!(
        render(r#"{'escaped \' quote'} {'single " quote'} {"double ' quote "}"#),
        "escaped ' quote single \" quote double ' quote "
    );
}

// -----------------------------------------------------------
// Variables
// -----------------------------------------------------------

#[test]
fn hello_world() {
    let scope = vars(&[("name", Value::from("World"))]);
    assert_eq!(render_with("Hello, {name}!", &scope), "Hello, World!");
}

#[test]
fn snake_case_variable() {
    let scope = vars(&[("snake_case_variable", Value::from("Hi!"))]);
    assert_eq!(render_with("{snake_case_variable}", &scope), "Hi!");
}

#[test]
fn unresolved_identifier_is_null() {
    assert_eq!(render("{nobody}"), "null");
    assert_eq!(evaluate("nobody", &Object::new()), Ok(Value::Null));
}

#[test]
fn constants_are_seeded() {
    assert_eq!(render("{PI}"), "3.14");
    assert_eq!(render("{E}"), "2.72");
    assert_eq!(render("{inf} {nan} {null}"), "inf nan null");
    assert_eq!(render("{true} {false}"), "true false");
}

// -----------------------------------------------------------
// Arithmetic and precedence
// -----------------------------------------------------------

#[test]
fn multiplication_binds_tighter() {
    assert_eq!(render("2 + 2 * 2 = {2 + 2 * 2}!"), "2 + 2 * 2 = 6!");
}

#[test]
fn precedence_with_variable() {
    let scope = vars(&[("number", Value::from(3))]);
    assert_eq!(
        render_with("2 + 2 * {number} = {2 + 2 * number}!", &scope),
        "2 + 2 * 3 = 8!"
    );
}

#[test]
fn division_by_zero_is_infinite() {
    assert_eq!(render("{0 / 0} {10 / false}"), "inf inf");
    assert_eq!(render("{-1 / 0}"), "-inf");
}

#[test]
fn modulo_by_zero_is_nan() {
    assert_eq!(render("{0.0 % 0.0} {0 % 0} {false % false}"), "nan nan nan");
}

#[test]
fn string_repetition_floors_float_count() {
    assert_eq!(render("{'=' * 5.0}"), "=====");
    assert_eq!(render("{'ab' * 2.9}"), "abab");
}

#[test]
fn floats_print_with_two_decimals() {
    assert_eq!(render("sqrt(4): {sqrt(4)}"), "sqrt(4): 2.00");
    assert_eq!(render("{1 / 3.0}"), "0.33");
}

#[test]
fn power_is_right_associative() {
    assert_eq!(evaluate("2 ^ 3 ^ 2", &Object::new()), Ok(Value::Integer(512)));
}

#[test]
fn string_concatenation_and_removal() {
    assert_eq!(render("{'a' + 1 + 2}"), "a12");
    assert_eq!(render("{'banana' - 'an'}"), "ba");
}

// -----------------------------------------------------------
// Comparison, logic, ternaries
// -----------------------------------------------------------

#[test]
fn equality() {
    assert_eq!(
        render("Is 2 + 2 equal to 4? {2 + 2 == 4}!"),
        "Is 2 + 2 equal to 4? true!"
    );
    assert_eq!(
        render("Is 2 + 2 equal to 4? {2 + 2 == 4 ? 'Yes' : 'No'}!"),
        "Is 2 + 2 equal to 4? Yes!"
    );
}

#[test]
fn nested_ternary() {
    let scope = vars(&[("number", Value::from(2)), ("name", Value::from("World"))]);
    let template = "Ternary test: {((number + 2 * number) == 6) != true ? 'Hello' : (false ? 'impossible!' : name)}!";
    assert_eq!(render_with(template, &scope), "Ternary test: World!");
}

#[test]
fn null_condition_is_falsy() {
    assert_eq!(render("{null ? 'true' : 'false'}"), "false");
}

#[test]
fn logic_with_null() {
    assert_eq!(render("{(true || null) == true}"), "true");
}

#[test]
fn coalesce_yields_empty_when_falsy() {
    assert_eq!(render("{true ?? 'cool'}{false ?? 'not cool'}"), "cool");
}

#[test]
fn empty_string_is_truthy() {
    assert_eq!(render("{'' ? 'yes' : 'no'}"), "yes");
}

#[test]
fn ordinal_by_ternary_chain() {
    let template = "{monthName} {day}{ day > 3 || day < 21 ? 'th' : day % 10 == 1 ? 'st' : day % 10 == 2 ? 'nd' : day % 10 == 3 ? 'rd' : 'th' }, {year}";
    assert_eq!(render_with(template, &october()), "October 10th, 2024");
}

#[test]
fn ordinal_by_builtin() {
    assert_eq!(
        render_with("{monthName} {day}{ordinal(day)}, {year}", &october()),
        "October 10th, 2024"
    );
}

// -----------------------------------------------------------
// Builtins
// -----------------------------------------------------------

#[test]
fn string_builtins() {
    assert_eq!(
        render("The length of 'Hello, World!' is {len('Hello, World!')}"),
        "The length of 'Hello, World!' is 13"
    );
    assert_eq!(
        render("The first character of 'Hello, World!' is {substr('Hello, World!', 0, 1)}"),
        "The first character of 'Hello, World!' is H"
    );
    assert_eq!(
        render("TO UPPER: {toUpper('hello, world!')}"),
        "TO UPPER: HELLO, WORLD!"
    );
    assert_eq!(
        render("to lower: {toLower('HELLO, WORLD!')}"),
        "to lower: hello, world!"
    );
    assert_eq!(
        render("Trim whitespace: {trim('  Hello, World!  ')}"),
        "Trim whitespace: Hello, World!"
    );
    assert_eq!(
        render("Replacing: {replace('Hello, World!', 'World', 'Universe')}"),
        "Replacing: Hello, Universe!"
    );
}

#[test]
fn custom_function_via_registry() {
    let mut registry = Registry::new();
    registry.register("twice", |args: &[Value]| match args {
        [value] => value.mul(&Value::from(2)).map_err(|e| e.to_string()),
        _ => Err("expected 1 argument".to_string()),
    });
    let out = format_with("{twice(21)} {twice('ab')}", &Object::new(), &registry)
        .expect("render failed");
    assert_eq!(out, "42 abab");
}

// -----------------------------------------------------------
// Access and interpolation
// -----------------------------------------------------------

#[test]
fn missing_index_and_field_are_null() {
    let scope = vars(&[
        ("items", Value::Array(vec![Value::from(1), Value::from(2)])),
        ("user", Value::Object(vars(&[("name", Value::from("Ada"))]))),
    ]);
    assert_eq!(
        render_with("{items[1]} {items[5]} {items[-1]}", &scope),
        "2 null null"
    );
    assert_eq!(render_with("{user.name} {user.age} {user['name']}", &scope), "Ada null Ada");
    assert_eq!(render_with("{nobody.name.first}", &scope), "null");
}

#[test]
fn string_indexing() {
    assert_eq!(render("{'abc'[1]} {'abc'[3]}"), "b null");
}

#[test]
fn recursive_interpolation() {
    assert_eq!(
        render("{$'string interpolation: {2 + 2}'}"),
        "string interpolation: 4"
    );
}

#[test]
fn interpolation_sees_variables() {
    let scope = vars(&[
        ("who", Value::from("you")),
        ("message", Value::from("thank {who}")),
    ]);
    assert_eq!(render_with("{$message}!", &scope), "thank you!");
}

// -----------------------------------------------------------
// Errors
// -----------------------------------------------------------

#[test]
fn missing_operand_points_after_plus() {
    let Err(Error::Compile(err)) = format("{ 2 + }", &Object::new()) else {
        panic!("expected a compile error");
    };
    assert_eq!(
        err.kind,
        ParseErrorKind::ExpectedExpression {
            found: TokenKind::RightBrace
        }
    );
    assert_eq!(err.span, Span::new(6, 7));
}

#[test]
fn runtime_error_is_paired_with_source() {
    let err = format("x{len()}", &Object::new()).unwrap_err();
    let Error::Runtime { error, input } = &err else {
        panic!("expected a runtime error, got {err:?}");
    };
    assert_eq!(input, "x{len()}");
    assert_eq!(error.span, Span::new(2, 7));
    assert!(matches!(error.kind, RuntimeErrorKind::Function { .. }));
}

// -----------------------------------------------------------
// Compiled scripts
// -----------------------------------------------------------

#[test]
fn compiled_script_runs_many_times() {
    let script = compile("{n} item{n == 1 ? '' : 's'}", Mode::Template).expect("compile failed");
    let registry = Registry::new();
    for (n, expected) in [(0, "0 items"), (1, "1 item"), (7, "7 items")] {
        let scope = vars(&[("n", Value::from(n))]);
        assert_eq!(script.run(&scope, &registry), Ok(expected.to_string()));
    }
}

#[test]
fn direct_mode_evaluates_to_a_value() {
    let scope = vars(&[("xs", Value::Array(vec![Value::from(1), Value::from(2)]))]);
    assert_eq!(
        evaluate("xs + 3", &scope),
        Ok(Value::Array(vec![
            Value::from(1),
            Value::from(2),
            Value::from(3)
        ]))
    );
}

#[test]
fn oversized_results_are_runtime_errors() {
    for source in [
        "{'ab' * 9223372036854775807}",
        "{xs * 9223372036854775807}",
        "{precision(1.5, 100000)}",
        "{lpad('x', 9223372036854775807)}",
    ] {
        let err = format(source, &vars(&[("xs", Value::Array(vec![Value::from(1)]))]))
            .expect_err(source);
        assert!(matches!(err, Error::Runtime { .. }), "{source}: {err}");
    }
}

#[test]
fn random_builtin_in_template() {
    let out = render("{random(1, 1)} {rand(2, 2)}");
    assert_eq!(out, "1 2");
    let value = evaluate("random(0.0, 1)", &Object::new()).expect("random");
    assert!(matches!(value, Value::Float(x) if (0.0..=1.0).contains(&x)));
}
