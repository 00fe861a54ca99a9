// Validation errors

use crate::Validator;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Failure messages per attribute, in rule-set declaration order.
///
/// An attribute is present only when at least one of its rules failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorBag {
    messages: IndexMap<String, Vec<String>>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message for an attribute
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of attributes with errors
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Total number of messages
    pub fn count(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    pub fn has(&self, attribute: &str) -> bool {
        self.messages.contains_key(attribute)
    }

    /// Messages for one attribute
    pub fn get(&self, attribute: &str) -> Option<&[String]> {
        self.messages.get(attribute).map(Vec::as_slice)
    }

    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.get(attribute)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Every message, attribute by attribute
    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.messages.values().flatten().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Vec<String>> {
        self.messages.iter()
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.messages).unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a ErrorBag {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

impl fmt::Display for ErrorBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (attribute, messages) in &self.messages {
            for message in messages {
                writeln!(f, "{}: {}", attribute, message)?;
            }
        }
        Ok(())
    }
}

/// Invalid rule configuration, raised when a validator is built
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Unknown validation rule `{rule}`")]
    UnknownRule { rule: String },

    #[error("Malformed rule `{token}`: {reason}")]
    Malformed { token: String, reason: String },

    #[error("Invalid parameters for rule `{rule}`: {reason}")]
    InvalidParameters { rule: String, reason: String },

    #[error("Invalid pattern for rule `regex`: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// A form request refused authorization
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[error("Unauthorized")]
pub struct AuthorizationError;

/// Validation failed. Carries the validator so callers can read its
/// [`ErrorBag`].
#[derive(Error, Debug)]
#[error("The given data was invalid.")]
pub struct ValidationError {
    validator: Box<Validator>,
}

impl ValidationError {
    pub fn new(validator: Validator) -> Self {
        Self {
            validator: Box::new(validator),
        }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn into_validator(self) -> Validator {
        *self.validator
    }

    pub fn errors(&self) -> &ErrorBag {
        self.validator.errors()
    }
}

/// Outcome of a rejected form request
#[derive(Error, Debug)]
pub enum FormRequestError {
    #[error(transparent)]
    Unauthorized(#[from] AuthorizationError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid validation rules: {0}")]
    Configuration(#[from] RuleError),
}

impl FormRequestError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FormRequestError::Unauthorized(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FormRequestError::Validation(_))
    }

    /// The error bag, for validation failures only
    pub fn errors(&self) -> Option<&ErrorBag> {
        match self {
            FormRequestError::Validation(e) => Some(e.errors()),
            _ => None,
        }
    }
}
