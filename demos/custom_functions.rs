//! Extend a registry with host constants and functions.

use rift_rs::{Object, Registry, Value, format_with};

fn main() {
    let mut registry = Registry::new();
    registry
        .set_constant("APP", "rift")
        .set_constant("MAX_LEVEL", 99)
        .register("greet", |args| match args {
            [Value::String(name)] => Ok(Value::String(format!("Hi, {name}"))),
            [_] => Err("expected a string".to_string()),
            _ => Err("expected 1 argument".to_string()),
        })
        .register("clamp", |args| match args {
            [value, low, high] => {
                let (value, low, high) = (value.to_float(), low.to_float(), high.to_float());
                Ok(Value::Float(value.max(low).min(high)))
            }
            _ => Err("expected 3 arguments".to_string()),
        });

    let mut vars = Object::new();
    vars.insert("player".to_string(), Value::from("Ada"));
    vars.insert("level".to_string(), Value::from(120));

    for template in [
        "{greet(player)} from {APP}",
        "level {clamp(level, 1, MAX_LEVEL)}",
        "{greet(level)}",
        "{shout(player)}",
    ] {
        match format_with(template, &vars, &registry) {
            Ok(text) => println!("{template} => {text}"),
            Err(e) => println!("{template} =>\n{}", e.pretty_print()),
        }
    }
}
