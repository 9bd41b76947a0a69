//! Rule variants, the `name[:value]` grammar, and per-rule checks.

use regex::Regex;
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::sync::OnceLock;

/// A compiled `regex:` parameter.
///
/// Accepts both delimited patterns (`/^\d+$/i`) and bare ones (`^\d+$`). A pattern that fails to
/// compile is kept around and fails every check, which is how a broken pattern behaved before it
/// was a type.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Option<Regex>,
}

impl Pattern {
    pub fn new(source: &str) -> Self {
        let compiled = translate_delimited(source).and_then(|p| Regex::new(&p).ok());
        Self {
            source: source.to_string(),
            compiled,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn is_valid(&self) -> bool {
        self.compiled.is_some()
    }

    fn is_match(&self, text: &str) -> bool {
        self.compiled.as_ref().is_some_and(|re| re.is_match(text))
    }
}

/// Turns `/body/flags` into `(?flags)body`. Bare patterns pass through unchanged.
fn translate_delimited(source: &str) -> Option<String> {
    let open = source.chars().next()?;
    if !matches!(open, '/' | '#' | '~' | '!' | '@' | '%' | ';' | ',') {
        return Some(source.to_string());
    }
    let rest = &source[open.len_utf8()..];
    let end = rest.rfind(open)?;
    let body = &rest[..end];
    let flags = &rest[end + open.len_utf8()..];

    let mut inline = String::new();
    for flag in flags.chars() {
        match flag {
            'i' | 'm' | 's' | 'x' => inline.push(flag),
            'u' => {}
            _ => return None,
        }
    }
    if inline.is_empty() {
        Some(body.to_string())
    } else {
        Some(format!("(?{}){}", inline, body))
    }
}

/// A single validation constraint.
#[derive(Debug, Clone)]
pub enum Rule {
    Required,
    NotEmpty,
    IsArray,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Float,
    Integer,
    MinValue(f64),
    MaxValue(f64),
    Boolean,
    Regex(Pattern),
    OneOf(Vec<String>),
    SubsetOf(Vec<String>),
}

impl Rule {
    /// Parses one `name` or `name:value` part. The value is everything after the first `:`.
    ///
    /// Unknown names, and known names with a missing or malformed parameter, yield `None`.
    pub fn parse(part: &str) -> Option<Rule> {
        let part = part.trim();
        let (name, value) = match part.split_once(':') {
            Some((name, value)) => (name, Some(value)),
            None => (part, None),
        };

        let rule = match name {
            "required" => Rule::Required,
            "notempty" => Rule::NotEmpty,
            "array" => Rule::IsArray,
            "min" => Rule::MinLength(value?.trim().parse().ok()?),
            "max" => Rule::MaxLength(value?.trim().parse().ok()?),
            "email" => Rule::Email,
            "float" => Rule::Float,
            "integer" => Rule::Integer,
            "minvalue" => Rule::MinValue(value?.trim().parse().ok()?),
            "maxvalue" => Rule::MaxValue(value?.trim().parse().ok()?),
            "boolean" => Rule::Boolean,
            "regex" => Rule::Regex(Pattern::new(value?)),
            "in" => Rule::OneOf(split_allowed(value?)),
            "subset" => Rule::SubsetOf(split_allowed(value?)),
            _ => return None,
        };
        Some(rule)
    }

    /// Evaluates the rule against `value`; returns the generated message on failure.
    pub fn check(&self, field: &str, value: &JsonValue) -> Option<String> {
        match self {
            Rule::Required => {
                let missing = value.is_null() || is_empty_string(value) || is_empty_sequence(value);
                missing.then(|| format!("The {} field is required.", field))
            }
            Rule::NotEmpty => (is_empty_string(value) || is_empty_sequence(value))
                .then(|| format!("The {} field must not be empty.", field)),
            _ if !is_present(value) => None,
            Rule::IsArray => (sequence(value).is_none())
                .then(|| format!("The {} must be an array.", field)),
            Rule::MinLength(min) => match sequence(value) {
                Some(items) if items.len() < *min => {
                    Some(format!("The {} must have at least {} items.", field, min))
                }
                Some(_) => None,
                None => (char_length(value) < *min)
                    .then(|| format!("The {} must be at least {} characters.", field, min)),
            },
            Rule::MaxLength(max) => match sequence(value) {
                Some(items) if items.len() > *max => {
                    Some(format!("The {} must not have more than {} items.", field, max))
                }
                Some(_) => None,
                None => (char_length(value) > *max)
                    .then(|| format!("The {} must not exceed {} characters.", field, max)),
            },
            Rule::Email => each_or_scalar(
                value,
                is_email,
                format!("All values in {} must be valid email addresses.", field),
                format!("The {} must be a valid email address.", field),
            ),
            Rule::Float => each_or_scalar(
                value,
                |v| numeric_value(v).is_some(),
                format!("All values in {} must be valid floats.", field),
                format!("The {} must be a valid float.", field),
            ),
            Rule::Integer => each_or_scalar(
                value,
                is_integer,
                format!("All values in {} must be integers.", field),
                format!("The {} must be an integer.", field),
            ),
            Rule::MinValue(min) => bound_check(field, value, |n| n >= *min, "minimum", |all| {
                if all {
                    format!("All values in {} must be at least {}.", field, min)
                } else {
                    format!("The {} must be at least {}.", field, min)
                }
            }),
            Rule::MaxValue(max) => bound_check(field, value, |n| n <= *max, "maximum", |all| {
                if all {
                    format!("All values in {} must not exceed {}.", field, max)
                } else {
                    format!("The {} must not exceed {}.", field, max)
                }
            }),
            Rule::Boolean => each_or_scalar(
                value,
                is_boolean_literal,
                format!("All values in {} must be boolean values.", field),
                format!("The {} must be a boolean value.", field),
            ),
            Rule::Regex(pattern) => each_or_scalar(
                value,
                |v| scalar_text(v).is_some_and(|text| pattern.is_match(&text)),
                format!("All values in {} must match the required format.", field),
                format!("The {} format is invalid.", field),
            ),
            Rule::OneOf(allowed) => each_or_scalar(
                value,
                |v| is_allowed(v, allowed),
                format!("All values in {} must be one of: {}.", field, allowed.join(", ")),
                format!("The {} must be one of: {}.", field, allowed.join(", ")),
            ),
            Rule::SubsetOf(allowed) => {
                let Some(items) = sequence(value) else {
                    return Some(format!(
                        "The {} must be an array for subset validation.",
                        field
                    ));
                };
                items.iter().any(|v| !is_allowed(v, allowed)).then(|| {
                    format!("All values in {} must be one of: {}.", field, allowed.join(", "))
                })
            }
        }
    }
}

/// Splits a rule string on `|` and parses every part, dropping the ones that are not rules.
pub fn parse_rules(rules: &str) -> Vec<Rule> {
    rules.split('|').filter_map(Rule::parse).collect()
}

fn split_allowed(csv: &str) -> Vec<String> {
    csv.split(',').map(|s| s.trim().to_string()).collect()
}

fn is_empty_string(value: &JsonValue) -> bool {
    matches!(value, JsonValue::String(s) if s.is_empty())
}

fn is_empty_sequence(value: &JsonValue) -> bool {
    sequence(value).is_some_and(|items| items.is_empty())
}

fn is_present(value: &JsonValue) -> bool {
    !value.is_null() && !is_empty_string(value)
}

/// JSON arrays, and objects viewed as their values, are sequences.
fn sequence(value: &JsonValue) -> Option<Vec<&JsonValue>> {
    match value {
        JsonValue::Array(items) => Some(items.iter().collect()),
        JsonValue::Object(map) => Some(map.values().collect()),
        _ => None,
    }
}

/// Text form of a scalar: strings as-is, numbers in decimal, `true` as "1" and `false` as "".
/// Integral floats drop the fraction, so `1.0` reads as "1".
fn scalar_text(value: &JsonValue) -> Option<Cow<'_, str>> {
    match value {
        JsonValue::String(s) => Some(Cow::Borrowed(s.as_str())),
        JsonValue::Number(n) => Some(Cow::Owned(number_text(n))),
        JsonValue::Bool(true) => Some(Cow::Borrowed("1")),
        JsonValue::Bool(false) => Some(Cow::Borrowed("")),
        _ => None,
    }
}

fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

fn char_length(value: &JsonValue) -> usize {
    scalar_text(value).map(|s| s.chars().count()).unwrap_or(0)
}

/// Runs `ok` on a scalar, or on every element of a sequence stopping at the first failure.
fn each_or_scalar(
    value: &JsonValue,
    ok: impl Fn(&JsonValue) -> bool,
    all_message: String,
    scalar_message: String,
) -> Option<String> {
    match sequence(value) {
        Some(items) => items.into_iter().any(|v| !ok(v)).then_some(all_message),
        None => (!ok(value)).then_some(scalar_message),
    }
}

fn bound_check(
    field: &str,
    value: &JsonValue,
    within: impl Fn(f64) -> bool,
    bound_name: &str,
    out_of_bound: impl Fn(bool) -> String,
) -> Option<String> {
    match sequence(value) {
        Some(items) => {
            for item in items {
                let Some(n) = numeric_value(item) else {
                    return Some(format!(
                        "All values in {} must be numeric to validate {} value.",
                        field, bound_name
                    ));
                };
                if !within(n) {
                    return Some(out_of_bound(true));
                }
            }
            None
        }
        None => {
            let Some(n) = numeric_value(value) else {
                return Some(format!(
                    "The {} must be numeric to validate {} value.",
                    field, bound_name
                ));
            };
            (!within(n)).then(|| out_of_bound(false))
        }
    }
}

fn numeric_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").expect("static pattern")
    })
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?(0|[1-9]\d*)$").expect("static pattern"))
}

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
        )
        .expect("static pattern")
    })
}

/// Numbers, and strings that read as decimal numbers (surrounding whitespace allowed).
fn numeric_value(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) if numeric_re().is_match(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer check. Zero is only accepted as the literal `0` or `"0"`; `"-0"`, `"00"` and `0.0`
/// are rejected along with booleans.
fn is_integer(value: &JsonValue) -> bool {
    match value {
        JsonValue::Number(n) if n.is_i64() || n.is_u64() => true,
        JsonValue::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.is_finite() && f.fract() == 0.0 && f != 0.0 && f.abs() < 9.2e18),
        JsonValue::String(s) if s == "0" => true,
        JsonValue::String(s) => {
            let trimmed = s.trim();
            integer_re().is_match(trimmed)
                && trimmed.parse::<i64>().is_ok_and(|parsed| parsed != 0)
        }
        _ => false,
    }
}

fn is_boolean_literal(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(_) => true,
        JsonValue::Number(n) => matches!(n.as_i64(), Some(0 | 1)) && !n.is_f64(),
        JsonValue::String(s) => matches!(
            s.as_str(),
            "0" | "1" | "true" | "false" | "True" | "False"
        ),
        _ => false,
    }
}

fn is_email(value: &JsonValue) -> bool {
    let JsonValue::String(s) = value else {
        return false;
    };
    let Some((local, _)) = s.rsplit_once('@') else {
        return false;
    };
    local.len() <= 64 && s.len() <= 320 && email_re().is_match(s)
}

/// Type-aware membership: only strings can equal the (string) allowed literals.
fn is_allowed(value: &JsonValue, allowed: &[String]) -> bool {
    match value {
        JsonValue::String(s) => allowed.iter().any(|a| a == s),
        _ => false,
    }
}
