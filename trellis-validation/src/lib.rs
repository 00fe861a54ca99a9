//! Rule-based input validation for Trellis
//!
//! Validation rules are declared per attribute as compact rule strings
//! (`"required|min:3|email"`), resolved through a [`RuleRegistry`], and
//! evaluated by a [`Validator`] that collects every failure into an
//! [`ErrorBag`]. A [`FormRequest`] bundles authorization and rules for a
//! request type, and [`ValidationPipe`] turns rejections into responses.
//!
//! # Examples
//!
//! ## Validating a map
//!
//! ```
//! use trellis_validation::{RuleSet, Validator};
//! use serde_json::json;
//!
//! let input = json!({"email": "not-an-email", "age": "17"})
//!     .as_object()
//!     .cloned()
//!     .unwrap();
//!
//! let validator = Validator::builder(input)
//!     .rules(
//!         RuleSet::new()
//!             .rule("email", "required|email")
//!             .rule("age", "required|integer|min:18"),
//!     )
//!     .attribute("email", "email address")
//!     .build()
//!     .unwrap();
//!
//! assert!(validator.fails());
//! assert_eq!(
//!     validator.errors().first("email"),
//!     Some("The email address must be a valid email address.")
//! );
//! assert_eq!(
//!     validator.errors().first("age"),
//!     Some("The age must be at least 18.")
//! );
//! ```
//!
//! ## Custom rules
//!
//! ```
//! use trellis_validation::{RuleRegistry, RuleSet, Validator};
//! use serde_json::json;
//!
//! let mut registry = RuleRegistry::with_builtins();
//! registry.register_fn("uppercase", "The :attribute must be uppercase.", |_, value, _| {
//!     value.as_str().is_some_and(|s| s.chars().all(|c| !c.is_lowercase()))
//! });
//!
//! let input = json!({"code": "abc"}).as_object().cloned().unwrap();
//! let validator = Validator::builder(input)
//!     .registry(&registry)
//!     .rules(RuleSet::new().rule("code", "required|uppercase"))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     validator.errors().first("code"),
//!     Some("The code must be uppercase.")
//! );
//! ```

pub mod config;
pub mod data;
mod errors;
mod form_request;
pub mod messages;
pub mod parser;
mod pipe;
mod registry;
mod rule;
pub mod rules;
mod ruleset;
mod validator;

pub use config::{CONFIG_ENV_VAR, ConfigError, ValidationConfig};
pub use errors::*;
pub use form_request::*;
pub use pipe::*;
pub use registry::*;
pub use rule::*;
pub use ruleset::*;
pub use validator::*;

/// Submitted data: field name to JSON value
pub type Input = serde_json::Map<String, serde_json::Value>;
