//! Demonstrate compile-time and runtime diagnostics.

use rift_rs::{Error, Object, RuntimeErrorKind, Value, format};

fn main() {
    let mut vars = Object::new();
    vars.insert("config".to_string(), Value::Object(Object::new()));
    vars.insert("nested".to_string(), Value::from("inner {1 +}"));

    // Missing operand
    report(format("total: { 2 + }", &vars));

    println!();

    // Unknown function
    report(format("{missing(1)}", &vars));

    println!();

    // Operator type mismatch
    report(format("value: {config * 2}", &vars));

    println!();

    // Failure inside an interpolated string
    report(format("{$nested}", &vars));
}

fn report(result: Result<String, Error>) {
    match result {
        Ok(text) => println!("Rendered OK (unexpected): {text}"),
        Err(Error::Compile(e)) => {
            println!("Compile error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Location: {}", e.span);
            println!("{}", e.pretty_print());
        }
        Err(Error::Runtime { error, input }) => {
            println!("Runtime error: {error}");
            if let RuntimeErrorKind::Interpolation(inner) = &error.kind {
                println!("  Caused by: {inner}");
            }
            println!("{}", error.pretty_print(&input));
        }
    }
}
