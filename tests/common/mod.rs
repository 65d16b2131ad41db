#![allow(dead_code)]

use rift_rs::{Mode, Object, Value, format, formatter, parse};

/// Build a variable scope from name/value pairs.
pub fn vars(pairs: &[(&str, Value)]) -> Object {
    pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), value.clone()))
        .collect()
}

/// Render `input` with no variables, panicking with the diagnostic on error.
pub fn render(input: &str) -> String {
    render_with(input, &Object::new())
}

pub fn render_with(input: &str, variables: &Object) -> String {
    format(input, variables)
        .unwrap_or_else(|e| panic!("failed to render {input:?}:\n{}", e.pretty_print()))
}

/// Parse a template and print it back in canonical form.
pub fn reformat(input: &str) -> String {
    let node = parse(input, Mode::Template)
        .unwrap_or_else(|e| panic!("failed to parse {input:?}:\n{}", e.pretty_print()));
    formatter::format_template(&node)
}

/// Helper: canonical form must survive another parse unchanged.
pub fn assert_stable(input: &str) {
    let once = reformat(input);
    let twice = reformat(&once);
    assert_eq!(
        once, twice,
        "formatting is not idempotent:\n--- input ---\n{input}\n--- first ---\n{once}"
    );
}
