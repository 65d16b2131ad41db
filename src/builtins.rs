//! Builtin function library registered by `Registry::new`.

use std::cmp::Ordering;

use rand::Rng;

use crate::registry::Registry;
use crate::value::{MAX_REPEAT_LEN, Value};

/// Largest digit count accepted by `precision`.
const MAX_PRECISION: usize = 1000;

type Builtin = fn(&[Value]) -> Result<Value, String>;

const FUNCTIONS: &[(&str, Builtin)] = &[
    ("int", cast_int),
    ("float", cast_float),
    ("str", cast_str),
    ("len", len),
    ("toUpper", to_upper),
    ("toLower", to_lower),
    ("substr", substr),
    ("trim", trim),
    ("replace", replace),
    ("find", find),
    ("round", round),
    ("floor", floor),
    ("ceil", ceil),
    ("precision", precision),
    ("prec", precision),
    ("ordinal", ordinal),
    ("ord", ordinal),
    ("duration", duration),
    ("leftPad", left_pad),
    ("lpad", left_pad),
    ("rightPad", right_pad),
    ("rpad", right_pad),
    ("middlePad", middle_pad),
    ("mpad", middle_pad),
    ("min", min),
    ("max", max),
    ("sum", sum),
    ("avg", avg),
    ("random", random),
    ("rand", random),
    ("randomInt", random_int),
    ("randomFloat", random_float),
];

const UNARY_MATH: &[(&str, fn(f64) -> f64)] = &[
    ("sqrt", f64::sqrt),
    ("cbrt", f64::cbrt),
    ("abs", f64::abs),
    ("sin", f64::sin),
    ("cos", f64::cos),
    ("tan", f64::tan),
    ("asin", f64::asin),
    ("acos", f64::acos),
    ("atan", f64::atan),
    ("sinh", f64::sinh),
    ("cosh", f64::cosh),
    ("tanh", f64::tanh),
    ("asinh", f64::asinh),
    ("acosh", f64::acosh),
    ("atanh", f64::atanh),
    ("exp", f64::exp),
    ("log", f64::ln),
    ("log10", f64::log10),
];

const BINARY_MATH: &[(&str, fn(f64, f64) -> f64)] = &[
    ("pow", f64::powf),
    ("hypot", f64::hypot),
    ("atan2", f64::atan2),
];

pub(crate) fn register_all(registry: &mut Registry) {
    for &(name, function) in FUNCTIONS {
        registry.register(name, function);
    }
    for &(name, function) in UNARY_MATH {
        registry.register(name, move |args: &[Value]| {
            arity(args, 1, 1)?;
            Ok(Value::Float(function(float_arg(args, 0)?)))
        });
    }
    for &(name, function) in BINARY_MATH {
        registry.register(name, move |args: &[Value]| {
            arity(args, 2, 2)?;
            Ok(Value::Float(function(float_arg(args, 0)?, float_arg(args, 1)?)))
        });
    }
}

fn arity(args: &[Value], min: usize, max: usize) -> Result<(), String> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    Err(match (min, max) {
        (1, 1) => "expected 1 argument".to_string(),
        (min, usize::MAX) => format!("expected at least {min} argument{}", plural(min)),
        (min, max) if min == max => format!("expected {min} arguments"),
        (min, max) if max == min + 1 => format!("expected {min} or {max} arguments"),
        (min, max) => format!("expected {min} to {max} arguments"),
    })
}

const fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn mismatch() -> String {
    "argument type mismatch".to_string()
}

fn string_arg(args: &[Value], index: usize) -> Result<&str, String> {
    args[index].as_str().ok_or_else(mismatch)
}

fn integer_arg(args: &[Value], index: usize) -> Result<i64, String> {
    match &args[index] {
        value @ (Value::Integer(_) | Value::Float(_) | Value::Boolean(_)) => {
            Ok(value.to_integer())
        }
        _ => Err(mismatch()),
    }
}

fn float_arg(args: &[Value], index: usize) -> Result<f64, String> {
    match &args[index] {
        value @ (Value::Integer(_) | Value::Float(_) | Value::Boolean(_)) => Ok(value.to_float()),
        _ => Err(mismatch()),
    }
}

/// Clamp an `i64` into a `usize`, negatives to zero.
fn to_usize(n: i64) -> usize {
    usize::try_from(n.max(0)).unwrap_or(usize::MAX)
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

fn cast_int(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    match &args[0] {
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<i64>()
                .or_else(|_| trimmed.parse::<f64>().map(|f| Value::Float(f).to_integer()))
                .map(Value::Integer)
                .map_err(|_| format!("cannot convert '{s}' to an integer"))
        }
        value @ (Value::Integer(_) | Value::Float(_) | Value::Boolean(_)) => {
            Ok(Value::Integer(value.to_integer()))
        }
        _ => Err(mismatch()),
    }
}

fn cast_float(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    match &args[0] {
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| format!("cannot convert '{s}' to a float")),
        _ => float_arg(args, 0).map(Value::Float),
    }
}

fn cast_str(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::String(args[0].to_string()))
}

fn len(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let count = match &args[0] {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(fields) => fields.len(),
        _ => return Err(mismatch()),
    };
    Ok(Value::Integer(to_i64(count)))
}

fn to_upper(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::String(string_arg(args, 0)?.to_uppercase()))
}

fn to_lower(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::String(string_arg(args, 0)?.to_lowercase()))
}

/// `substr(s, start[, count])` over characters. A negative `start` counts
/// from the end; a negative `count` leaves that many characters off the end.
fn substr(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 3)?;
    let chars: Vec<char> = string_arg(args, 0)?.chars().collect();
    let start = integer_arg(args, 1)?;
    let count = if args.len() == 3 {
        integer_arg(args, 2)?
    } else {
        i64::MAX
    };

    let len = to_i64(chars.len());
    let start = if start < 0 { len.saturating_add(start) } else { start };
    let count = if count < 0 {
        len.saturating_add(count).saturating_sub(start)
    } else {
        count
    };

    let start = start.max(0);
    if start >= len {
        return Ok(Value::String(String::new()));
    }
    let count = count.clamp(0, len - start);

    let (start, count) = (to_usize(start), to_usize(count));
    Ok(Value::String(chars[start..start + count].iter().collect()))
}

fn trim(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::String(string_arg(args, 0)?.trim().to_string()))
}

fn replace(args: &[Value]) -> Result<Value, String> {
    arity(args, 3, 3)?;
    let (s, from, to) = (string_arg(args, 0)?, string_arg(args, 1)?, string_arg(args, 2)?);
    if from.is_empty() {
        return Ok(Value::String(s.to_string()));
    }
    Ok(Value::String(s.replace(from, to)))
}

/// Character index of the first occurrence, or -1.
fn find(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let (s, needle) = (string_arg(args, 0)?, string_arg(args, 1)?);
    let index = s
        .find(needle)
        .map_or(-1, |byte| to_i64(s[..byte].chars().count()));
    Ok(Value::Integer(index))
}

#[allow(clippy::cast_possible_truncation)]
fn rounding(args: &[Value], round: fn(f64) -> f64) -> Result<Value, String> {
    arity(args, 1, 1)?;
    Ok(Value::Integer(round(float_arg(args, 0)?) as i64))
}

fn round(args: &[Value]) -> Result<Value, String> {
    rounding(args, f64::round)
}

fn floor(args: &[Value]) -> Result<Value, String> {
    rounding(args, f64::floor)
}

fn ceil(args: &[Value]) -> Result<Value, String> {
    rounding(args, f64::ceil)
}

fn precision(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let value = float_arg(args, 0)?;
    let digits = to_usize(integer_arg(args, 1)?);
    if digits > MAX_PRECISION {
        return Err(format!("precision must be at most {MAX_PRECISION} digits"));
    }
    Ok(Value::String(format!("{value:.digits$}")))
}

/// English ordinal suffix only: `ordinal(10)` is `"th"`.
fn ordinal(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let n = integer_arg(args, 0)?;
    let suffix = if (4..=20).contains(&n) {
        "th"
    } else {
        match n % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    Ok(Value::String(suffix.to_string()))
}

/// Seconds as `h:mm:ss.mmm`, `m:ss.mmm`, or `s.mmm`.
#[allow(clippy::cast_possible_truncation)]
fn duration(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, 1)?;
    let time = float_arg(args, 0)?;
    let hours = (time / 3600.0) as i64;
    let minutes = (time / 60.0) as i64 % 60;
    let seconds = time as i64 % 60;
    let millis = (time * 1000.0) as i64 % 1000;

    let text = if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
    } else if minutes > 0 {
        format!("{minutes}:{seconds:02}.{millis:03}")
    } else {
        format!("{seconds}.{millis:03}")
    };
    Ok(Value::String(text))
}

/// Shared argument handling for the padding functions: the string form of
/// the first argument, the number of pad characters needed, and the pad.
fn padding(args: &[Value]) -> Result<(String, usize, char), String> {
    arity(args, 2, 3)?;
    let text = args[0].to_string();
    let width = to_usize(integer_arg(args, 1)?);
    if width > MAX_REPEAT_LEN {
        return Err(format!("padding width must be at most {MAX_REPEAT_LEN}"));
    }
    let pad = match args.get(2) {
        None => ' ',
        Some(value) => {
            let pad = value.to_string();
            let mut chars = pad.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err("expected a single character for padding".to_string()),
            }
        }
    };
    let missing = width.saturating_sub(text.chars().count());
    Ok((text, missing, pad))
}

fn repeat(pad: char, count: usize) -> String {
    std::iter::repeat_n(pad, count).collect()
}

fn left_pad(args: &[Value]) -> Result<Value, String> {
    let (text, missing, pad) = padding(args)?;
    Ok(Value::String(repeat(pad, missing) + &text))
}

fn right_pad(args: &[Value]) -> Result<Value, String> {
    let (text, missing, pad) = padding(args)?;
    Ok(Value::String(text + &repeat(pad, missing)))
}

fn middle_pad(args: &[Value]) -> Result<Value, String> {
    let (text, missing, pad) = padding(args)?;
    let left = missing / 2;
    Ok(Value::String(
        repeat(pad, left) + &text + &repeat(pad, missing - left),
    ))
}

fn extreme(args: &[Value], keep: Ordering) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    let mut best = &args[0];
    for candidate in &args[1..] {
        if candidate.compare(best) == Some(keep) {
            best = candidate;
        }
    }
    Ok(best.clone())
}

fn min(args: &[Value]) -> Result<Value, String> {
    extreme(args, Ordering::Less)
}

fn max(args: &[Value]) -> Result<Value, String> {
    extreme(args, Ordering::Greater)
}

fn sum(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    Ok(Value::Float(args.iter().map(Value::to_float).sum()))
}

#[allow(clippy::cast_precision_loss)]
fn avg(args: &[Value]) -> Result<Value, String> {
    arity(args, 1, usize::MAX)?;
    let total: f64 = args.iter().map(Value::to_float).sum();
    Ok(Value::Float(total / args.len() as f64))
}

/// `random(min, max)`: a float when either bound is a float, else an
/// integer. Both bounds are inclusive.
fn random(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    if matches!(args[0], Value::Float(_)) || matches!(args[1], Value::Float(_)) {
        random_float(args)
    } else {
        random_int(args)
    }
}

fn random_int(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let min = integer_arg(args, 0)?;
    let max = integer_arg(args, 1)?;
    if min > max {
        return Err(format!("empty range {min} to {max}"));
    }
    Ok(Value::Integer(rand::rng().random_range(min..=max)))
}

fn random_float(args: &[Value]) -> Result<Value, String> {
    arity(args, 2, 2)?;
    let min = float_arg(args, 0)?;
    let max = float_arg(args, 1)?;
    if min > max || !(max - min).is_finite() {
        return Err(format!("invalid range {min} to {max}"));
    }
    Ok(Value::Float(rand::rng().random_range(min..=max)))
}
