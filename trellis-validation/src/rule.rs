// Rule contract

use crate::Input;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// A single named validation check.
///
/// The validator calls [`Rule::passes`] with the resolved value of the
/// attribute (`Value::Null` when the key is missing) and a read view of the
/// whole input, so rules comparing against sibling fields need no extra
/// wiring. Rules that are not [`implicit`](Rule::implicit) are skipped for
/// absent or null values.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Identifier used for `attribute.rule` message overrides
    fn name(&self) -> &str;

    /// Decide whether `value`, validated as `attribute`, satisfies the rule
    fn passes(&self, attribute: &str, value: &Value, data: &Input) -> bool;

    /// Default message template. `:attribute` is replaced by the display
    /// label, other placeholders by [`Rule::replacements`].
    fn message(&self) -> Cow<'_, str>;

    /// Placeholder values for parameterized messages, keyed without the colon
    fn replacements(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Placeholders that name another attribute, keyed without the colon.
    /// They are rendered through the same label lookup as `:attribute`.
    fn attribute_references(&self) -> Vec<(&'static str, &str)> {
        Vec::new()
    }

    /// Implicit rules are evaluated even when the value is absent
    fn implicit(&self) -> bool {
        false
    }
}

/// How size rules (`min`, `max`, `between`, `size`) measure strings.
///
/// Derived from the other rules on the same attribute: `numeric` or
/// `integer` compare numeric strings by value, `array` measures only arrays
/// and objects so a string is never counted in characters under an
/// "items" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeKind {
    #[default]
    String,
    Numeric,
    Array,
}

impl SizeKind {
    /// Infer the kind from the identifiers declared for one attribute
    pub fn infer<'a>(identifiers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut kind = SizeKind::String;
        for identifier in identifiers {
            match identifier {
                "numeric" | "integer" => return SizeKind::Numeric,
                "array" => kind = SizeKind::Array,
                _ => {}
            }
        }
        kind
    }

    /// Measure a value, `None` when it has no meaningful size
    pub fn size_of(&self, value: &Value) -> Option<f64> {
        if *self == SizeKind::Array && !(value.is_array() || value.is_object()) {
            return None;
        }
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                if *self == SizeKind::Numeric {
                    if let Ok(number) = s.trim().parse::<f64>() {
                        return Some(number);
                    }
                }
                Some(s.chars().count() as f64)
            }
            Value::Array(items) => Some(items.len() as f64),
            Value::Object(map) => Some(map.len() as f64),
            Value::Bool(_) | Value::Null => None,
        }
    }

    /// Unit appended to size messages
    pub fn unit(&self) -> &'static str {
        match self {
            SizeKind::String => " characters",
            SizeKind::Numeric => "",
            SizeKind::Array => " items",
        }
    }
}

/// Arguments handed to a rule factory
#[derive(Debug, Clone, Copy)]
pub struct RuleArgs<'a> {
    /// Identifier the rule was requested under
    pub rule: &'a str,
    /// Parameters in declaration order
    pub params: &'a [String],
    /// Size semantics for the attribute being validated
    pub size_kind: SizeKind,
}

impl<'a> RuleArgs<'a> {
    pub fn new(rule: &'a str, params: &'a [String]) -> Self {
        Self {
            rule,
            params,
            size_kind: SizeKind::default(),
        }
    }

    pub fn with_size_kind(mut self, size_kind: SizeKind) -> Self {
        self.size_kind = size_kind;
        self
    }
}

type CheckFn = dyn Fn(&str, &Value, &Input) -> bool + Send + Sync;

/// Rule backed by a closure
#[derive(Clone)]
pub struct ClosureRule {
    name: String,
    message: String,
    implicit: bool,
    check: Arc<CheckFn>,
}

impl ClosureRule {
    pub fn new<F>(name: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, &Value, &Input) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            message: message.into(),
            implicit: false,
            check: Arc::new(check),
        }
    }

    /// Evaluate the closure for absent values too
    pub fn implicit(mut self) -> Self {
        self.implicit = true;
        self
    }
}

impl fmt::Debug for ClosureRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClosureRule")
            .field("name", &self.name)
            .field("message", &self.message)
            .field("implicit", &self.implicit)
            .finish_non_exhaustive()
    }
}

impl Rule for ClosureRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn passes(&self, attribute: &str, value: &Value, data: &Input) -> bool {
        (self.check)(attribute, value, data)
    }

    fn message(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.message)
    }

    fn implicit(&self) -> bool {
        self.implicit
    }
}

/// Build a shareable closure rule for direct use in a [`RuleSpec`](crate::RuleSpec)
pub fn rule_fn<F>(name: impl Into<String>, message: impl Into<String>, check: F) -> Arc<dyn Rule>
where
    F: Fn(&str, &Value, &Input) -> bool + Send + Sync + 'static,
{
    Arc::new(ClosureRule::new(name, message, check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_size_kind_inference() {
        assert_eq!(SizeKind::infer(["required", "min"]), SizeKind::String);
        assert_eq!(SizeKind::infer(["array", "min"]), SizeKind::Array);
        assert_eq!(SizeKind::infer(["array", "integer"]), SizeKind::Numeric);
    }

    #[test]
    fn test_size_of() {
        assert_eq!(SizeKind::String.size_of(&json!("héllo")), Some(5.0));
        assert_eq!(SizeKind::String.size_of(&json!("42")), Some(2.0));
        assert_eq!(SizeKind::Numeric.size_of(&json!("42")), Some(42.0));
        assert_eq!(SizeKind::Numeric.size_of(&json!("abc")), Some(3.0));
        assert_eq!(SizeKind::String.size_of(&json!([1, 2])), Some(2.0));
        assert_eq!(SizeKind::String.size_of(&json!(7.5)), Some(7.5));
        assert_eq!(SizeKind::String.size_of(&json!(true)), None);
        assert_eq!(SizeKind::Array.size_of(&json!([1, 2, 3])), Some(3.0));
        assert_eq!(SizeKind::Array.size_of(&json!({"a": 1})), Some(1.0));
        assert_eq!(SizeKind::Array.size_of(&json!("abc")), None);
        assert_eq!(SizeKind::Array.size_of(&json!(4)), None);
    }

    #[test]
    fn test_closure_rule() {
        let rule = rule_fn("uppercase", "The :attribute must be uppercase.", |_, value, _| {
            value.as_str().is_some_and(|s| s == s.to_uppercase())
        });

        assert_eq!(rule.name(), "uppercase");
        assert!(rule.passes("code", &json!("ABC"), &Input::new()));
        assert!(!rule.passes("code", &json!("abc"), &Input::new()));
        assert!(!rule.implicit());
    }
}
