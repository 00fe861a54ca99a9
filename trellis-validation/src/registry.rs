// Rule registry

use crate::parser::ParsedRule;
use crate::rule::ClosureRule;
use crate::{Input, Rule, RuleArgs, RuleError};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Factory producing a configured rule from its arguments
pub type RuleFactory =
    Arc<dyn Fn(&RuleArgs<'_>) -> Result<Box<dyn Rule>, RuleError> + Send + Sync>;

static GLOBAL: Lazy<RuleRegistry> = Lazy::new(RuleRegistry::with_builtins);

/// Maps rule identifiers to factories.
///
/// Built-in and custom rules share the same table, so a registered custom
/// rule is usable in rule strings exactly like `required` or `min:3`.
///
/// ```
/// use trellis_validation::{RuleRegistry, Validator, RuleSet};
/// use serde_json::json;
///
/// let mut registry = RuleRegistry::with_builtins();
/// registry.register_fn("slug", "The :attribute must be a slug.", |_, value, _| {
///     value.as_str().is_some_and(|s| s.chars().all(|c| c.is_ascii_lowercase() || c == '-'))
/// });
///
/// let input = json!({"slug": "Hello World"}).as_object().cloned().unwrap();
/// let validator = Validator::builder(input)
///     .rules(RuleSet::new().rule("slug", "required|slug"))
///     .registry(&registry)
///     .build()
///     .unwrap();
///
/// assert!(validator.fails());
/// ```
#[derive(Clone, Default)]
pub struct RuleRegistry {
    factories: HashMap<String, RuleFactory>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the built-in rules
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        crate::rules::register_builtins(&mut registry);
        registry
    }

    /// Shared registry holding only the built-in rules
    pub fn global() -> &'static RuleRegistry {
        &GLOBAL
    }

    pub(crate) fn insert_builtin<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn(&RuleArgs<'_>) -> Result<Box<dyn Rule>, RuleError> + Send + Sync + 'static,
    {
        self.factories.insert(name.to_string(), Arc::new(factory));
    }

    /// Register a factory, replacing any rule with the same identifier
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&RuleArgs<'_>) -> Result<Box<dyn Rule>, RuleError> + Send + Sync + 'static,
    {
        let name = name.into();
        tracing::debug!(rule = %name, "registering validation rule");
        self.factories.insert(name, Arc::new(factory));
        self
    }

    /// Register a parameterless closure rule
    pub fn register_fn<F>(
        &mut self,
        name: impl Into<String>,
        message: impl Into<String>,
        check: F,
    ) -> &mut Self
    where
        F: Fn(&str, &Value, &Input) -> bool + Send + Sync + 'static,
    {
        let rule = ClosureRule::new(name, message, check);
        let name = rule.name().to_string();
        self.register(name, move |_| Ok(Box::new(rule.clone())))
    }

    /// Check whether an identifier is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered identifiers, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Instantiate the rule named by `args.rule`
    pub fn build(&self, args: &RuleArgs<'_>) -> Result<Box<dyn Rule>, RuleError> {
        let factory = self
            .factories
            .get(args.rule)
            .ok_or_else(|| RuleError::UnknownRule {
                rule: args.rule.to_string(),
            })?;
        factory(args)
    }

    /// Instantiate a parsed rule
    pub fn resolve(
        &self,
        parsed: &ParsedRule,
        size_kind: crate::SizeKind,
    ) -> Result<Box<dyn Rule>, RuleError> {
        self.build(&RuleArgs::new(&parsed.name, &parsed.params).with_size_kind(size_kind))
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .finish()
    }
}
