// Built-in rules

use crate::data::{self, scalar_string};
use crate::{Input, Rule, RuleArgs, RuleError, RuleRegistry, SizeKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

// Common regex patterns
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$").unwrap()
});

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$").unwrap()
});

static ALPHA_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHA_NUM_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static ALPHA_DASH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

/// Register every built-in rule under its identifier
pub(crate) fn register_builtins(registry: &mut RuleRegistry) {
    registry.insert_builtin("required", |_| Ok(Box::new(Required)));
    registry.insert_builtin("email", |_| Ok(Box::new(Email)));
    registry.insert_builtin("numeric", |_| Ok(Box::new(Numeric)));
    registry.insert_builtin("integer", |_| Ok(Box::new(Integer)));
    registry.insert_builtin("string", |_| Ok(Box::new(StringType)));
    registry.insert_builtin("boolean", |_| Ok(Box::new(Boolean)));
    registry.insert_builtin("array", |_| Ok(Box::new(ArrayType)));
    registry.insert_builtin("url", |_| Ok(Box::new(Url)));
    registry.insert_builtin("uuid", |_| Ok(Box::new(Uuid)));
    registry.insert_builtin("alpha", |_| Ok(Box::new(Alpha)));
    registry.insert_builtin("alpha_num", |_| Ok(Box::new(AlphaNum)));
    registry.insert_builtin("alpha_dash", |_| Ok(Box::new(AlphaDash)));
    registry.insert_builtin("accepted", |_| Ok(Box::new(Accepted)));
    registry.insert_builtin("confirmed", |_| Ok(Box::new(Confirmed)));
    registry.insert_builtin("min", |args| Ok(Box::new(Min::from_args(args)?)));
    registry.insert_builtin("max", |args| Ok(Box::new(Max::from_args(args)?)));
    registry.insert_builtin("between", |args| Ok(Box::new(Between::from_args(args)?)));
    registry.insert_builtin("size", |args| Ok(Box::new(Size::from_args(args)?)));
    registry.insert_builtin("in", |args| Ok(Box::new(In::from_args(args)?)));
    registry.insert_builtin("not_in", |args| Ok(Box::new(NotIn::from_args(args)?)));
    registry.insert_builtin("same", |args| Ok(Box::new(Same::from_args(args)?)));
    registry.insert_builtin("different", |args| Ok(Box::new(Different::from_args(args)?)));
    registry.insert_builtin("regex", |args| Ok(Box::new(Pattern::from_args(args)?)));
}

fn expect_params(args: &RuleArgs<'_>, count: usize) -> Result<(), RuleError> {
    if args.params.len() == count {
        Ok(())
    } else {
        Err(RuleError::InvalidParameters {
            rule: args.rule.to_string(),
            reason: format!("expected {} parameter(s), got {}", count, args.params.len()),
        })
    }
}

fn expect_some_params(args: &RuleArgs<'_>) -> Result<(), RuleError> {
    if args.params.is_empty() || args.params.iter().all(String::is_empty) {
        Err(RuleError::InvalidParameters {
            rule: args.rule.to_string(),
            reason: "expected at least one parameter".to_string(),
        })
    } else {
        Ok(())
    }
}

/// Parse a numeric bound, keeping its source text for messages
fn bound(args: &RuleArgs<'_>, index: usize) -> Result<Bound, RuleError> {
    let raw = &args.params[index];
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .map(|value| Bound {
            value,
            display: raw.clone(),
        })
        .ok_or_else(|| RuleError::InvalidParameters {
            rule: args.rule.to_string(),
            reason: format!("`{}` is not a number", raw),
        })
}

#[derive(Debug, Clone)]
struct Bound {
    value: f64,
    display: String,
}

// Presence

/// Value must be present and non-empty. Whitespace-only strings count as
/// empty; `0` and `false` are present.
#[derive(Debug, Clone, Copy)]
pub struct Required;

impl Rule for Required {
    fn name(&self) -> &str {
        "required"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        match value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            Value::Bool(_) | Value::Number(_) => true,
        }
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute field is required.")
    }

    fn implicit(&self) -> bool {
        true
    }
}

/// Value must be `yes`, `on`, `1` or `true`
#[derive(Debug, Clone, Copy)]
pub struct Accepted;

impl Rule for Accepted {
    fn name(&self) -> &str {
        "accepted"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        scalar_string(value)
            .is_some_and(|s| matches!(s.to_ascii_lowercase().as_str(), "yes" | "on" | "1" | "true"))
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute must be accepted.")
    }

    fn implicit(&self) -> bool {
        true
    }
}

// Types

#[derive(Debug, Clone, Copy)]
pub struct Numeric;

impl Rule for Numeric {
    fn name(&self) -> &str {
        "numeric"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        match value {
            Value::Number(_) => true,
            Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
            _ => false,
        }
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute must be a number.")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Integer;

impl Rule for Integer {
    fn name(&self) -> &str {
        "integer"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        match value {
            Value::Number(n) => n.is_i64() || n.is_u64(),
            Value::String(s) => s.trim().parse::<i64>().is_ok(),
            _ => false,
        }
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute must be an integer.")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringType;

impl Rule for StringType {
    fn name(&self) -> &str {
        "string"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        value.is_string()
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute must be a string.")
    }
}

/// Accepts `true`, `false`, `0`, `1`, `"0"`, `"1"`, `"true"` and `"false"`
#[derive(Debug, Clone, Copy)]
pub struct Boolean;

impl Rule for Boolean {
    fn name(&self) -> &str {
        "boolean"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        match value {
            Value::Bool(_) => true,
            Value::Number(n) => n.as_u64().is_some_and(|n| n <= 1),
            Value::String(s) => matches!(s.as_str(), "0" | "1" | "true" | "false"),
            _ => false,
        }
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute field must be true or false.")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayType;

impl Rule for ArrayType {
    fn name(&self) -> &str {
        "array"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        value.is_array() || value.is_object()
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute must be an array.")
    }
}

// Formats

macro_rules! pattern_rule {
    ($(#[$meta:meta])* $ty:ident, $name:literal, $regex:ident, $message:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $ty;

        impl Rule for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
                value.as_str().is_some_and(|s| $regex.is_match(s))
            }

            fn message(&self) -> Cow<'_, str> {
                Cow::Borrowed($message)
            }
        }
    };
}

pattern_rule!(
    /// Syntactic `local@domain.tld` check
    Email,
    "email",
    EMAIL_REGEX,
    "The :attribute must be a valid email address."
);
pattern_rule!(Url, "url", URL_REGEX, "The :attribute must be a valid URL.");
pattern_rule!(Uuid, "uuid", UUID_REGEX, "The :attribute must be a valid UUID.");
pattern_rule!(Alpha, "alpha", ALPHA_REGEX, "The :attribute may only contain letters.");
pattern_rule!(
    AlphaNum,
    "alpha_num",
    ALPHA_NUM_REGEX,
    "The :attribute may only contain letters and numbers."
);
pattern_rule!(
    AlphaDash,
    "alpha_dash",
    ALPHA_DASH_REGEX,
    "The :attribute may only contain letters, numbers, dashes and underscores."
);

/// `regex:pattern`. Commas inside the pattern survive parameter splitting.
#[derive(Debug, Clone)]
pub struct Pattern(pub Regex);

impl Pattern {
    pub fn new(pattern: &str) -> Result<Self, RuleError> {
        Ok(Self(Regex::new(pattern)?))
    }

    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_some_params(args)?;
        Self::new(&args.params.join(","))
    }
}

impl Rule for Pattern {
    fn name(&self) -> &str {
        "regex"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        scalar_string(value).is_some_and(|s| self.0.is_match(&s))
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute format is invalid.")
    }
}

// Sizes

#[derive(Debug, Clone)]
pub struct Min {
    min: Bound,
    kind: SizeKind,
}

impl Min {
    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_params(args, 1)?;
        Ok(Self {
            min: bound(args, 0)?,
            kind: args.size_kind,
        })
    }
}

impl Rule for Min {
    fn name(&self) -> &str {
        "min"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        self.kind.size_of(value).is_some_and(|size| size >= self.min.value)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Owned(format!("The :attribute must be at least :min{}.", self.kind.unit()))
    }

    fn replacements(&self) -> Vec<(&'static str, String)> {
        vec![("min", self.min.display.clone())]
    }
}

#[derive(Debug, Clone)]
pub struct Max {
    max: Bound,
    kind: SizeKind,
}

impl Max {
    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_params(args, 1)?;
        Ok(Self {
            max: bound(args, 0)?,
            kind: args.size_kind,
        })
    }
}

impl Rule for Max {
    fn name(&self) -> &str {
        "max"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        self.kind.size_of(value).is_some_and(|size| size <= self.max.value)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Owned(format!("The :attribute may not be greater than :max{}.", self.kind.unit()))
    }

    fn replacements(&self) -> Vec<(&'static str, String)> {
        vec![("max", self.max.display.clone())]
    }
}

/// `between:min,max`, both bounds inclusive
#[derive(Debug, Clone)]
pub struct Between {
    min: Bound,
    max: Bound,
    kind: SizeKind,
}

impl Between {
    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_params(args, 2)?;
        let (min, max) = (bound(args, 0)?, bound(args, 1)?);
        if min.value > max.value {
            return Err(RuleError::InvalidParameters {
                rule: args.rule.to_string(),
                reason: format!("lower bound {} exceeds upper bound {}", min.display, max.display),
            });
        }
        Ok(Self {
            min,
            max,
            kind: args.size_kind,
        })
    }
}

impl Rule for Between {
    fn name(&self) -> &str {
        "between"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        self.kind
            .size_of(value)
            .is_some_and(|size| size >= self.min.value && size <= self.max.value)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Owned(format!(
            "The :attribute must be between :min and :max{}.",
            self.kind.unit()
        ))
    }

    fn replacements(&self) -> Vec<(&'static str, String)> {
        vec![
            ("min", self.min.display.clone()),
            ("max", self.max.display.clone()),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Size {
    size: Bound,
    kind: SizeKind,
}

impl Size {
    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_params(args, 1)?;
        Ok(Self {
            size: bound(args, 0)?,
            kind: args.size_kind,
        })
    }
}

impl Rule for Size {
    fn name(&self) -> &str {
        "size"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        self.kind.size_of(value) == Some(self.size.value)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Owned(format!("The :attribute must be :size{}.", self.kind.unit()))
    }

    fn replacements(&self) -> Vec<(&'static str, String)> {
        vec![("size", self.size.display.clone())]
    }
}

// Membership

fn contained(values: &[String], value: &Value) -> bool {
    match value {
        Value::Array(items) => items
            .iter()
            .all(|item| scalar_string(item).is_some_and(|s| values.contains(&s))),
        other => scalar_string(other).is_some_and(|s| values.contains(&s)),
    }
}

/// `in:a,b,c`. For arrays every element must be listed.
#[derive(Debug, Clone)]
pub struct In {
    values: Vec<String>,
}

impl In {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_some_params(args)?;
        Ok(Self::new(args.params.to_vec()))
    }
}

impl Rule for In {
    fn name(&self) -> &str {
        "in"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        contained(&self.values, value)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The selected :attribute is invalid.")
    }

    fn replacements(&self) -> Vec<(&'static str, String)> {
        vec![("values", self.values.join(", "))]
    }
}

#[derive(Debug, Clone)]
pub struct NotIn {
    values: Vec<String>,
}

impl NotIn {
    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_some_params(args)?;
        Ok(Self {
            values: args.params.to_vec(),
        })
    }
}

impl Rule for NotIn {
    fn name(&self) -> &str {
        "not_in"
    }

    fn passes(&self, _attribute: &str, value: &Value, _data: &Input) -> bool {
        match value {
            Value::Array(items) => !items
                .iter()
                .any(|item| scalar_string(item).is_some_and(|s| self.values.contains(&s))),
            other => !scalar_string(other).is_some_and(|s| self.values.contains(&s)),
        }
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The selected :attribute is invalid.")
    }

    fn replacements(&self) -> Vec<(&'static str, String)> {
        vec![("values", self.values.join(", "))]
    }
}

// Cross-field

/// Value must equal the sibling `{attribute}_confirmation`
#[derive(Debug, Clone, Copy)]
pub struct Confirmed;

impl Rule for Confirmed {
    fn name(&self) -> &str {
        "confirmed"
    }

    fn passes(&self, attribute: &str, value: &Value, data: &Input) -> bool {
        data::get(data, &format!("{}_confirmation", attribute)) == Some(value)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute confirmation does not match.")
    }
}

/// `same:other`
#[derive(Debug, Clone)]
pub struct Same {
    other: String,
}

impl Same {
    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_params(args, 1)?;
        Ok(Self {
            other: args.params[0].clone(),
        })
    }
}

impl Rule for Same {
    fn name(&self) -> &str {
        "same"
    }

    fn passes(&self, _attribute: &str, value: &Value, data: &Input) -> bool {
        data::get(data, &self.other) == Some(value)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute and :other must match.")
    }

    fn attribute_references(&self) -> Vec<(&'static str, &str)> {
        vec![("other", self.other.as_str())]
    }
}

/// `different:other`. An absent `other` counts as different.
#[derive(Debug, Clone)]
pub struct Different {
    other: String,
}

impl Different {
    fn from_args(args: &RuleArgs<'_>) -> Result<Self, RuleError> {
        expect_params(args, 1)?;
        Ok(Self {
            other: args.params[0].clone(),
        })
    }
}

impl Rule for Different {
    fn name(&self) -> &str {
        "different"
    }

    fn passes(&self, _attribute: &str, value: &Value, data: &Input) -> bool {
        data::get(data, &self.other) != Some(value)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed("The :attribute and :other must be different.")
    }

    fn attribute_references(&self) -> Vec<(&'static str, &str)> {
        vec![("other", self.other.as_str())]
    }
}
