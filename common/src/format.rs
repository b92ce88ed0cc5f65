use serde_json::{Number, Value};

/// Heading for a phase key or column name: the first underscore becomes a
/// space and every word starts upper-case (`phase_1` -> `Phase 1`).
pub fn title_case_key(key: &str) -> String {
    let spaced = key.replacen('_', " ", 1);
    let mut out = String::with_capacity(spaced.len());
    let mut prev_word = false;
    for ch in spaced.chars() {
        let word = ch.is_alphanumeric() || ch == '_';
        if word && !prev_word {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        prev_word = word;
    }
    out
}

/// Upper-cases the first character only.
pub fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// A JSON number as a browser would print it: whole floats lose their
/// `.0`. Values outside the exactly representable range keep serde_json's
/// own rendering.
pub fn number_text(number: &Number) -> String {
    match number.as_f64() {
        Some(value) if value.is_finite() && value.abs() < 1e15 => format_number(value),
        _ => number.to_string(),
    }
}

/// Share of `total` in percent, rounded to one decimal. A trailing `.0`
/// is dropped so an exact quarter reads `25`.
pub fn format_percentage(value: f64, total: f64) -> String {
    if total == 0.0 || !total.is_finite() {
        return "0".to_string();
    }
    let rounded = format!("{:.1}", value / total * 100.0);
    match rounded.strip_suffix(".0") {
        Some(whole) => whole.to_string(),
        None => rounded,
    }
}

/// Text shown in a table cell. `null` renders as a dash, strings without
/// quotes.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::Null) => "-".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number_text(number),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(other) => other.to_string(),
    }
}
