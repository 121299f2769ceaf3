use alloc::string::String;
use core::fmt;

/// A typed FITS header value.
///
/// A keyword with no assigned value is represented as `Option::<Value>::None`
/// by the owning [`Param`](crate::header::Param).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// FITS logical value (`T` or `F`).
    Logical(bool),
    /// FITS integer value.
    Integer(i64),
    /// FITS floating-point value.
    Float(f64),
    /// FITS character string, without its surrounding quotes.
    String(String),
    /// FITS complex integer `(real, imaginary)`.
    ComplexInt(i64, i64),
    /// FITS complex float `(real, imaginary)`.
    ComplexFloat(f64, f64),
}

impl Value {
    /// Returns the integer payload, if this is an [`Value::Integer`].
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Logical(b) => f.write_str(if *b { "T" } else { "F" }),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => write!(f, "'{s}'"),
            Value::ComplexInt(re, im) => write!(f, "({re}, {im})"),
            Value::ComplexFloat(re, im) => write!(f, "({re:?}, {im:?})"),
        }
    }
}

/// Conversion from a header [`Value`] into a requested Rust type.
///
/// Returns `None` when the value is not of the requested semantic type, which
/// mirrors a keyword lookup that finds nothing usable.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer()
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer().and_then(|n| i32::try_from(n).ok())
    }
}

impl FromValue for usize {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_integer().and_then(|n| usize::try_from(n).ok())
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

impl FromValue for (i64, i64) {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::ComplexInt(re, im) => Some((*re, *im)),
            _ => None,
        }
    }
}

impl FromValue for (f64, f64) {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::ComplexFloat(re, im) => Some((*re, *im)),
            _ => None,
        }
    }
}

/// Coerce a trimmed value token into a typed [`Value`].
///
/// The checks run in a fixed order and the first one that applies decides the
/// type: logical, quoted string, float (dot, no comma), complex integer
/// (comma, no dot), complex float (comma and dot), integer. An empty token, or
/// one whose chosen branch does not parse, yields `None`.
pub fn coerce_token(token: &str) -> Option<Value> {
    if token.is_empty() {
        return None;
    }
    if token == "T" || token == "F" {
        return Some(Value::Logical(token == "T"));
    }
    if token.contains('\'') {
        return Some(Value::String(unquote(token)));
    }

    let has_dot = token.contains('.');
    let has_comma = token.contains(',');
    match (has_dot, has_comma) {
        (true, false) => parse_float_str(token).map(Value::Float),
        (false, true) => {
            let (re, im) = split_complex(token)?;
            Some(Value::ComplexInt(re.parse().ok()?, im.parse().ok()?))
        }
        (true, true) => {
            let (re, im) = split_complex(token)?;
            Some(Value::ComplexFloat(
                parse_float_str(re)?,
                parse_float_str(im)?,
            ))
        }
        (false, false) => match token.parse::<i64>() {
            Ok(n) => Some(Value::Integer(n)),
            // Exponent forms such as `1E10` carry no dot but are still numbers.
            // Words like `INF` or `NAN` are not.
            Err(_) if token.bytes().any(|b| b.is_ascii_digit()) => {
                parse_float_str(token).map(Value::Float)
            }
            Err(_) => None,
        },
    }
}

/// Strip the surrounding quotes of a string token.
///
/// A doubled quote inside the string stands for a single literal quote, and
/// trailing blanks before the closing quote are not significant.
fn unquote(token: &str) -> String {
    let inner = token.strip_prefix('\'').unwrap_or(token);
    let inner = inner.strip_suffix('\'').unwrap_or(inner);
    inner.replace("''", "'").trim_end().into()
}

/// Split `(a, b)` into its two trimmed halves.
fn split_complex(token: &str) -> Option<(&str, &str)> {
    let inner = token.trim_start_matches('(').trim_end_matches(')');
    let (re, im) = inner.split_once(',')?;
    Some((re.trim(), im.trim()))
}

/// Parse a float string, handling FITS `D` exponent notation.
fn parse_float_str(s: &str) -> Option<f64> {
    if s.contains('D') || s.contains('d') {
        let normalized = s.replace('D', "E").replace('d', "e");
        return normalized.parse::<f64>().ok();
    }
    s.parse::<f64>().ok()
}
