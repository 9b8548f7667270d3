use serde_json::{Number, Value};

/// Integers beyond this magnitude are not exactly representable as `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Recursively replace numeric strings with JSON numbers.
///
/// Arrays keep their length and order, objects keep their key set, and
/// every non-string leaf is returned as is. Strings that are not numbers
/// (`"BTC"`, `"ok"`) are untouched; numeric identifiers are converted too.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::String(text) => match parse_number(&text) {
            Some(number) => Value::Number(number),
            None => Value::String(text),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        other => other,
    }
}

/// Parse a decimal literal such as `"400.00"`, `"-12"` or `"1.5e3"`.
///
/// Integral values come back as integer numbers (`"400.00"` becomes `400`),
/// everything else as a float. Hex, `Infinity`, blank and partially numeric
/// strings are rejected.
pub fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if !is_decimal_literal(text) {
        return None;
    }

    let is_integer_literal = !text.contains(['.', 'e', 'E']);
    if is_integer_literal {
        if let Ok(n) = text.parse::<i64>() {
            return Some(Number::from(n));
        }
        if let Ok(n) = text.parse::<u64>() {
            return Some(Number::from(n));
        }
    }

    let float = text.parse::<f64>().ok()?;
    if float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER {
        return Some(Number::from(float as i64));
    }
    Number::from_f64(float)
}

/// `[+-]? (digits [. digits?] | . digits) ([eE] [+-]? digits)?`
pub(crate) fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return false;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }

    i == bytes.len()
}
