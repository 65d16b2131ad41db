//! Dynamic value model.
//!
//! Operators follow a fixed coercion order: `Null` absorbs arithmetic,
//! `Object` never does arithmetic, `Array` supports only concatenation,
//! repetition, and removal, any `String` operand switches to string
//! semantics, any `Float` operand promotes to float, and everything else is
//! 64-bit integer math with booleans counting as 0/1.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Ordered list of values.
pub type Array = Vec<Value>;

/// String-keyed map of values, iterated in key order.
pub type Object = BTreeMap<String, Value>;

/// Runtime value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Array(Array),
    Object(Object),
}

/// Failure of an arithmetic operator or negation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OperatorError {
    #[error("cannot apply '{op}' to {lhs} and {rhs}")]
    Unsupported {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("cannot negate {0}")]
    Negate(&'static str),
    #[error("repetition would produce more than {} elements", MAX_REPEAT_LEN)]
    TooLarge,
}

/// Upper bound on the length of a string (in bytes) or array produced by
/// `*` repetition.
pub const MAX_REPEAT_LEN: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl Arith {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "^",
        }
    }
}

impl Value {
    /// Lower-case name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Boolean(_) => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Truthiness: `null`, `false`, `0`, and `0.0` are falsy. Strings,
    /// arrays, and objects are truthy even when empty.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Boolean(b) => *b,
            Self::Integer(n) => *n != 0,
            Self::Float(x) => *x != 0.0,
            Self::String(_) | Self::Array(_) | Self::Object(_) => true,
        }
    }

    /// Numeric view. Strings parse leniently (unparsable → 0), composites
    /// are 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_float(&self) -> f64 {
        match self {
            Self::Float(x) => *x,
            Self::Integer(n) => *n as f64,
            Self::Boolean(b) => f64::from(u8::from(*b)),
            Self::String(s) => s.trim().parse().unwrap_or(0.0),
            Self::Null | Self::Array(_) | Self::Object(_) => 0.0,
        }
    }

    /// Integer view. Floats are floored (saturating at the `i64` range).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_integer(&self) -> i64 {
        match self {
            Self::Integer(n) => *n,
            Self::Float(x) => x.floor() as i64,
            Self::Boolean(b) => i64::from(*b),
            Self::String(s) => {
                let s = s.trim();
                s.parse()
                    .unwrap_or_else(|_| s.parse::<f64>().map_or(0, |x| x.floor() as i64))
            }
            Self::Null | Self::Array(_) | Self::Object(_) => 0,
        }
    }

    // -- Arithmetic --

    /// `+`: numeric addition, string concatenation, or array concatenation /
    /// append.
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` when an operand is an object.
    #[allow(clippy::should_implement_trait)]
    pub fn add(&self, rhs: &Self) -> Result<Self, OperatorError> {
        self.arithmetic(rhs, Arith::Add)
    }

    /// `-`: numeric subtraction, substring removal, or array element removal.
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` for objects or a non-array minus an array.
    #[allow(clippy::should_implement_trait)]
    pub fn sub(&self, rhs: &Self) -> Result<Self, OperatorError> {
        self.arithmetic(rhs, Arith::Sub)
    }

    /// `*`: numeric product, or string/array repetition by a count.
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` for objects, two strings, or two arrays.
    #[allow(clippy::should_implement_trait)]
    pub fn mul(&self, rhs: &Self) -> Result<Self, OperatorError> {
        self.arithmetic(rhs, Arith::Mul)
    }

    /// `/`: division. A zero divisor yields an infinity instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` for strings, arrays, or objects.
    #[allow(clippy::should_implement_trait)]
    pub fn div(&self, rhs: &Self) -> Result<Self, OperatorError> {
        self.arithmetic(rhs, Arith::Div)
    }

    /// `%`: remainder. A zero divisor yields NaN instead of failing.
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` for strings, arrays, or objects.
    #[allow(clippy::should_implement_trait)]
    pub fn rem(&self, rhs: &Self) -> Result<Self, OperatorError> {
        self.arithmetic(rhs, Arith::Rem)
    }

    /// `^`: exponentiation.
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` for strings, arrays, or objects.
    pub fn pow(&self, rhs: &Self) -> Result<Self, OperatorError> {
        self.arithmetic(rhs, Arith::Pow)
    }

    /// Unary `-`. `null` stays `null`; numeric strings are parsed.
    ///
    /// # Errors
    ///
    /// Returns `OperatorError` for arrays, objects, and non-numeric strings.
    pub fn negate(&self) -> Result<Self, OperatorError> {
        match self {
            Self::Null => Ok(Self::Null),
            Self::Integer(n) => Ok(Self::Integer(n.wrapping_neg())),
            Self::Float(x) => Ok(Self::Float(-x)),
            Self::Boolean(b) => Ok(Self::Integer(-i64::from(*b))),
            Self::String(s) => {
                let s = s.trim();
                if let Ok(n) = s.parse::<i64>() {
                    Ok(Self::Integer(n.wrapping_neg()))
                } else if let Ok(x) = s.parse::<f64>() {
                    Ok(Self::Float(-x))
                } else {
                    Err(OperatorError::Negate(self.type_name()))
                }
            }
            Self::Array(_) | Self::Object(_) => Err(OperatorError::Negate(self.type_name())),
        }
    }

    /// Unary `!`.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(&self) -> Self {
        Self::Boolean(!self.is_truthy())
    }

    fn unsupported(&self, rhs: &Self, op: Arith) -> OperatorError {
        OperatorError::Unsupported {
            op: op.symbol(),
            lhs: self.type_name(),
            rhs: rhs.type_name(),
        }
    }

    fn arithmetic(&self, rhs: &Self, op: Arith) -> Result<Self, OperatorError> {
        match (self, rhs) {
            (Self::Null, _) | (_, Self::Null) => Ok(Self::Null),
            (Self::Object(_), _) | (_, Self::Object(_)) => Err(self.unsupported(rhs, op)),
            (Self::Array(_), _) | (_, Self::Array(_)) => self.array_arithmetic(rhs, op),
            (Self::String(_), _) | (_, Self::String(_)) => self.string_arithmetic(rhs, op),
            (Self::Float(_), _) | (_, Self::Float(_)) => {
                Ok(float_arithmetic(self.to_float(), rhs.to_float(), op))
            }
            _ => Ok(integer_arithmetic(self.to_integer(), rhs.to_integer(), op)),
        }
    }

    fn array_arithmetic(&self, rhs: &Self, op: Arith) -> Result<Self, OperatorError> {
        match (op, self, rhs) {
            (Arith::Add, Self::Array(a), Self::Array(b)) => {
                Ok(Self::Array(a.iter().chain(b).cloned().collect()))
            }
            (Arith::Add, Self::Array(a), item) => {
                let mut items = a.clone();
                items.push(item.clone());
                Ok(Self::Array(items))
            }
            (Arith::Add, item, Self::Array(b)) => {
                let mut items = Vec::with_capacity(b.len() + 1);
                items.push(item.clone());
                items.extend(b.iter().cloned());
                Ok(Self::Array(items))
            }
            (Arith::Sub, Self::Array(a), Self::Array(b)) => Ok(Self::Array(
                a.iter()
                    .filter(|item| !b.iter().any(|removed| item.loose_eq(removed)))
                    .cloned()
                    .collect(),
            )),
            (Arith::Sub, Self::Array(a), item) => Ok(Self::Array(
                a.iter().filter(|x| !x.loose_eq(item)).cloned().collect(),
            )),
            (Arith::Mul, Self::Array(a), count) | (Arith::Mul, count, Self::Array(a)) => {
                let count = repeat_count(count).ok_or_else(|| self.unsupported(rhs, op))?;
                check_repeat_len(a.len(), count)?;
                Ok(Self::Array(
                    std::iter::repeat_n(a.iter(), count)
                        .flatten()
                        .cloned()
                        .collect(),
                ))
            }
            _ => Err(self.unsupported(rhs, op)),
        }
    }

    fn string_arithmetic(&self, rhs: &Self, op: Arith) -> Result<Self, OperatorError> {
        match (op, self, rhs) {
            (Arith::Add, ..) => Ok(Self::String(format!("{self}{rhs}"))),
            (Arith::Sub, ..) => Ok(Self::String(
                self.to_string().replace(&rhs.to_string(), ""),
            )),
            (Arith::Mul, Self::String(s), count) | (Arith::Mul, count, Self::String(s)) => {
                let count = repeat_count(count).ok_or_else(|| self.unsupported(rhs, op))?;
                check_repeat_len(s.len(), count)?;
                Ok(Self::String(s.repeat(count)))
            }
            _ => Err(self.unsupported(rhs, op)),
        }
    }

    // -- Comparison and logic (infallible) --

    /// Ordering used by `<`, `>`, `<=`, `>=`. `None` when the operands are
    /// not ordered (one `null`, composites, or NaN).
    #[must_use]
    pub fn compare(&self, rhs: &Self) -> Option<Ordering> {
        match (self, rhs) {
            (Self::Null, Self::Null) => Some(Ordering::Equal),
            (Self::Null, _)
            | (_, Self::Null)
            | (Self::Array(_) | Self::Object(_), _)
            | (_, Self::Array(_) | Self::Object(_)) => None,
            (Self::String(_), _) | (_, Self::String(_)) => {
                Some(self.to_string().cmp(&rhs.to_string()))
            }
            (Self::Float(_), _) | (_, Self::Float(_)) => self.to_float().partial_cmp(&rhs.to_float()),
            _ => Some(self.to_integer().cmp(&rhs.to_integer())),
        }
    }

    /// Equality used by `==`: numeric and string coercion for scalars,
    /// element-wise for arrays and objects, `null` equal only to `null`.
    #[must_use]
    pub fn loose_eq(&self, rhs: &Self) -> bool {
        match (self, rhs) {
            (Self::Array(a), Self::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.loose_eq(y))
            }
            (Self::Object(a), Self::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, x)| b.get(key).is_some_and(|y| x.loose_eq(y)))
            }
            (Self::Array(_) | Self::Object(_), _) | (_, Self::Array(_) | Self::Object(_)) => false,
            _ => self.compare(rhs) == Some(Ordering::Equal),
        }
    }

    #[must_use]
    pub fn equals(&self, rhs: &Self) -> Self {
        Self::Boolean(self.loose_eq(rhs))
    }

    #[must_use]
    pub fn not_equals(&self, rhs: &Self) -> Self {
        Self::Boolean(!self.loose_eq(rhs))
    }

    #[must_use]
    pub fn less(&self, rhs: &Self) -> Self {
        Self::Boolean(self.compare(rhs) == Some(Ordering::Less))
    }

    #[must_use]
    pub fn greater(&self, rhs: &Self) -> Self {
        Self::Boolean(self.compare(rhs) == Some(Ordering::Greater))
    }

    #[must_use]
    pub fn less_equal(&self, rhs: &Self) -> Self {
        Self::Boolean(matches!(
            self.compare(rhs),
            Some(Ordering::Less | Ordering::Equal)
        ))
    }

    #[must_use]
    pub fn greater_equal(&self, rhs: &Self) -> Self {
        Self::Boolean(matches!(
            self.compare(rhs),
            Some(Ordering::Greater | Ordering::Equal)
        ))
    }

    /// Logical `&&` on truthiness. Both sides are already evaluated.
    #[must_use]
    pub fn and(&self, rhs: &Self) -> Self {
        Self::Boolean(self.is_truthy() && rhs.is_truthy())
    }

    /// Logical `||` on truthiness. Both sides are already evaluated.
    #[must_use]
    pub fn or(&self, rhs: &Self) -> Self {
        Self::Boolean(self.is_truthy() || rhs.is_truthy())
    }

    // -- Indexing --

    /// Index with `[key]`: arrays by integer, objects by string key, strings
    /// by integer character position. Anything missing or out of range is
    /// `null`.
    #[must_use]
    pub fn at(&self, key: &Self) -> Self {
        match (self, key) {
            (Self::Array(items), Self::Integer(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .unwrap_or_default(),
            (Self::Object(map), Self::String(k)) => map.get(k).cloned().unwrap_or_default(),
            (Self::String(s), Self::Integer(i)) => usize::try_from(*i)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map_or(Self::Null, |ch| Self::String(ch.to_string())),
            _ => Self::Null,
        }
    }

    /// Field access with `.name`; `null` unless `self` is an object holding
    /// `name`.
    #[must_use]
    pub fn get(&self, field: &str) -> Self {
        match self {
            Self::Object(map) => map.get(field).cloned().unwrap_or_default(),
            _ => Self::Null,
        }
    }

    /// Mutable element access. A non-array is replaced by an empty array
    /// first, and the array grows with `null`s to reach `index`.
    pub fn index_mut(&mut self, index: usize) -> &mut Self {
        let items = match self {
            Self::Array(items) => items,
            other => {
                *other = Self::Array(Vec::new());
                match other {
                    Self::Array(items) => items,
                    _ => return other,
                }
            }
        };
        if items.len() <= index {
            items.resize(index + 1, Self::Null);
        }
        &mut items[index]
    }

    /// Mutable field access. A non-object is replaced by an empty object
    /// first, and a missing key is inserted as `null`.
    pub fn key_mut(&mut self, key: &str) -> &mut Self {
        let map = match self {
            Self::Object(map) => map,
            other => {
                *other = Self::Object(Object::new());
                match other {
                    Self::Object(map) => map,
                    _ => return other,
                }
            }
        };
        map.entry(key.to_owned()).or_default()
    }
}

/// Count for string/array repetition: numbers and booleans only, floats are
/// floored, negatives repeat zero times.
fn repeat_count(value: &Value) -> Option<usize> {
    match value {
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) => {
            Some(usize::try_from(value.to_integer()).unwrap_or(0))
        }
        _ => None,
    }
}

fn check_repeat_len(len: usize, count: usize) -> Result<(), OperatorError> {
    match len.checked_mul(count) {
        Some(total) if total <= MAX_REPEAT_LEN => Ok(()),
        _ => Err(OperatorError::TooLarge),
    }
}

fn float_arithmetic(a: f64, b: f64, op: Arith) -> Value {
    let result = match op {
        Arith::Add => a + b,
        Arith::Sub => a - b,
        Arith::Mul => a * b,
        Arith::Div if b == 0.0 => signed_infinity(a < 0.0),
        Arith::Div => a / b,
        Arith::Rem => a % b,
        Arith::Pow => a.powf(b),
    };
    Value::Float(result)
}

#[allow(clippy::cast_precision_loss)]
fn integer_arithmetic(a: i64, b: i64, op: Arith) -> Value {
    match op {
        Arith::Add => Value::Integer(a.wrapping_add(b)),
        Arith::Sub => Value::Integer(a.wrapping_sub(b)),
        Arith::Mul => Value::Integer(a.wrapping_mul(b)),
        Arith::Div if b == 0 => Value::Float(signed_infinity(a < 0)),
        Arith::Div => Value::Integer(a.wrapping_div(b)),
        Arith::Rem if b == 0 => Value::Float(f64::NAN),
        Arith::Rem => Value::Integer(a.wrapping_rem(b)),
        Arith::Pow => u32::try_from(b)
            .ok()
            .and_then(|exp| a.checked_pow(exp))
            .map_or_else(|| Value::Float((a as f64).powf(b as f64)), Value::Integer),
    }
}

const fn signed_infinity(negative: bool) -> f64 {
    if negative {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    }
}

/// String form used by template output: floats with two decimals, `nan` /
/// `inf` for non-finite floats, `null` for null, composites element-wise.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::String(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) if x.is_nan() => f.write_str("nan"),
            Self::Float(x) if x.is_infinite() => {
                f.write_str(if *x < 0.0 { "-inf" } else { "inf" })
            }
            Self::Float(x) => write!(f, "{x:.2}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(map) => {
                f.write_str("{")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {item}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Array> for Value {
    fn from(items: Array) -> Self {
        Self::Array(items)
    }
}

impl From<Object> for Value {
    fn from(map: Object) -> Self {
        Self::Object(map)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Integer),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, item)| (key, Self::from(item)))
                    .collect(),
            ),
        }
    }
}

/// Non-finite floats have no JSON form and become `null`.
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(s) => Self::String(s.clone()),
            Value::Integer(n) => Self::from(*n),
            Value::Float(x) => serde_json::Number::from_f64(*x).map_or(Self::Null, Self::Number),
            Value::Boolean(b) => Self::Bool(*b),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Object(
                map.iter()
                    .map(|(key, item)| (key.clone(), Self::from(item)))
                    .collect(),
            ),
        }
    }
}
