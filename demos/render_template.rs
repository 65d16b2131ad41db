//! Render a template against JSON-sourced variables, once via the one-shot
//! entry point and repeatedly via a compiled script.

use rift_rs::{Mode, Object, Registry, Value, compile, format};

fn main() {
    let json = serde_json::json!({
        "name": "World",
        "date": { "month": "October", "day": 10, "year": 2024 },
        "scores": [12, 7.5, 30],
    });
    let Value::Object(vars) = Value::from(json) else {
        eprintln!("variables must be a JSON object");
        return;
    };

    let output = format(
        "Hello, {name}! Today is {date.month} {date.day}{ordinal(date.day)}, {date.year}.",
        &vars,
    );
    match output {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("{}", e.pretty_print()),
    }

    let source = "best {max(scores[0], scores[1], scores[2])} of {len(scores)}";
    let script = match compile(source, Mode::Template) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("{}", e.pretty_print());
            return;
        }
    };
    println!("AST: {}", script.to_debug_string());

    let mut scope = Object::new();
    for round in 1..=3 {
        scope.insert(
            "scores".to_string(),
            Value::Array((0..3).map(|i| Value::from(i * round)).collect()),
        );
        match script.run(&scope, Registry::shared()) {
            Ok(text) => println!("round {round}: {text}"),
            Err(e) => eprintln!("{}", e.pretty_print(source)),
        }
    }
}
