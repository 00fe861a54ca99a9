// Validator

use crate::config::ValidationConfig;
use crate::messages;
use crate::{
    ErrorBag, Input, Rule, RuleEntry, RuleError, RuleRegistry, RuleSet, SizeKind,
    ValidationError, data,
};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// `"attribute.rule"` to a literal message
pub type MessageOverrides = HashMap<String, String>;

/// Raw attribute name to display label
pub type AttributeLabels = HashMap<String, String>;

#[derive(Debug)]
struct AttributeRules {
    attribute: String,
    rules: Vec<Arc<dyn Rule>>,
}

/// Evaluates a [`RuleSet`] against one input.
///
/// Rules are parsed and instantiated when the validator is built, so an
/// unknown identifier or bad parameter surfaces as a [`RuleError`] before
/// anything is evaluated. Evaluation runs once, on the first call to
/// [`passes`](Self::passes), [`fails`](Self::fails) or
/// [`errors`](Self::errors), and the resulting [`ErrorBag`] is reused.
///
/// ```
/// use trellis_validation::{RuleSet, Validator};
/// use serde_json::json;
///
/// let input = json!({"name": "ab"}).as_object().cloned().unwrap();
/// let validator = Validator::make(
///     input,
///     RuleSet::new().rule("name", "required|min:3"),
///     Default::default(),
///     Default::default(),
/// )
/// .unwrap();
///
/// assert!(validator.fails());
/// assert_eq!(
///     validator.errors().first("name"),
///     Some("The name must be at least 3 characters.")
/// );
/// ```
#[derive(Debug)]
pub struct Validator {
    input: Input,
    rules: Vec<AttributeRules>,
    messages: MessageOverrides,
    labels: AttributeLabels,
    config: Arc<ValidationConfig>,
    errors: OnceCell<ErrorBag>,
}

impl Validator {
    /// Build a validator with the built-in rules and default messages
    pub fn make(
        input: Input,
        rules: RuleSet,
        messages: MessageOverrides,
        attributes: AttributeLabels,
    ) -> Result<Self, RuleError> {
        Self::builder(input)
            .rules(rules)
            .messages(messages)
            .attributes(attributes)
            .build()
    }

    pub fn builder(input: Input) -> ValidatorBuilder<'static> {
        ValidatorBuilder::new(input)
    }

    /// Whether every rule passed
    pub fn passes(&self) -> bool {
        self.errors().is_empty()
    }

    /// Whether any rule failed
    pub fn fails(&self) -> bool {
        !self.passes()
    }

    /// Messages for every failed rule, empty when validation passes
    pub fn errors(&self) -> &ErrorBag {
        self.errors.get_or_init(|| self.evaluate())
    }

    /// Validate, returning the validated subset or the failed validator
    pub fn validate(self) -> Result<Input, ValidationError> {
        if self.fails() {
            Err(ValidationError::new(self))
        } else {
            Ok(self.validated())
        }
    }

    /// The input restricted to attributes named in the rule set.
    ///
    /// Dotted attributes are rebuilt with the shape they have in the input:
    /// objects stay objects, array indices stay array indices. Attributes
    /// missing from the input are omitted.
    pub fn validated(&self) -> Input {
        let mut out = Input::new();
        for entry in &self.rules {
            data::copy_path(&self.input, &mut out, &entry.attribute);
        }
        out
    }

    /// The input under validation
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Give back the input, dropping the rules
    pub fn into_input(self) -> Input {
        self.input
    }

    /// Attributes that carry rules, in declaration order
    pub fn attributes_under_validation(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|entry| entry.attribute.as_str())
    }

    fn evaluate(&self) -> ErrorBag {
        let mut bag = ErrorBag::new();

        for entry in &self.rules {
            let value = data::get(&self.input, &entry.attribute).unwrap_or(&Value::Null);

            for rule in &entry.rules {
                if data::is_absent(value) && !rule.implicit() {
                    continue;
                }
                if !rule.passes(&entry.attribute, value, &self.input) {
                    bag.add(
                        entry.attribute.clone(),
                        self.message_for(&entry.attribute, rule.as_ref()),
                    );
                }
            }
        }

        bag
    }

    fn message_for(&self, attribute: &str, rule: &dyn Rule) -> String {
        let key = format!("{}.{}", attribute, rule.name());
        if let Some(message) = self.messages.get(&key) {
            return message.clone();
        }

        let default = rule.message();
        let template = self
            .config
            .template(attribute, rule.name())
            .unwrap_or(default.as_ref());

        let mut replacements = rule.replacements();
        replacements.extend(
            rule.attribute_references()
                .into_iter()
                .map(|(key, other)| (key, self.label_for(other))),
        );

        messages::render(template, &self.label_for(attribute), &replacements)
    }

    fn label_for(&self, attribute: &str) -> String {
        self.labels
            .get(attribute)
            .map(String::as_str)
            .or_else(|| self.config.label(attribute))
            .map(str::to_string)
            .unwrap_or_else(|| messages::humanize(attribute))
    }
}

/// Builder for [`Validator`]
pub struct ValidatorBuilder<'r> {
    input: Input,
    rules: RuleSet,
    messages: MessageOverrides,
    labels: AttributeLabels,
    registry: &'r RuleRegistry,
    config: Option<Arc<ValidationConfig>>,
}

impl ValidatorBuilder<'static> {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            rules: RuleSet::new(),
            messages: MessageOverrides::new(),
            labels: AttributeLabels::new(),
            registry: RuleRegistry::global(),
            config: None,
        }
    }
}

impl<'r> ValidatorBuilder<'r> {
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn messages(mut self, messages: MessageOverrides) -> Self {
        self.messages = messages;
        self
    }

    /// Add one `attribute.rule` override
    pub fn message(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }

    pub fn attributes(mut self, labels: AttributeLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Add one display label
    pub fn attribute(mut self, attribute: impl Into<String>, label: impl Into<String>) -> Self {
        self.labels.insert(attribute.into(), label.into());
        self
    }

    /// Resolve rule identifiers through a custom registry
    pub fn registry<'n>(self, registry: &'n RuleRegistry) -> ValidatorBuilder<'n> {
        ValidatorBuilder {
            input: self.input,
            rules: self.rules,
            messages: self.messages,
            labels: self.labels,
            registry,
            config: self.config,
        }
    }

    pub fn config(mut self, config: Arc<ValidationConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Parse and instantiate every rule
    pub fn build(self) -> Result<Validator, RuleError> {
        let mut rules = Vec::with_capacity(self.rules.len());

        for (attribute, spec) in self.rules {
            let parsed = spec.parsed()?;
            let size_kind = SizeKind::infer(parsed.iter().map(|rule| rule.name.as_str()));

            let mut instances = Vec::with_capacity(spec.len());
            for (entry, parsed) in spec.entries().iter().zip(&parsed) {
                let rule = match entry {
                    RuleEntry::Instance(rule) => Arc::clone(rule),
                    RuleEntry::Token(_) => Arc::from(self.registry.resolve(parsed, size_kind)?),
                };
                instances.push(rule);
            }

            rules.push(AttributeRules {
                attribute,
                rules: instances,
            });
        }

        Ok(Validator {
            input: self.input,
            rules,
            messages: self.messages,
            labels: self.labels,
            config: self.config.unwrap_or_else(ValidationConfig::shared_default),
            errors: OnceCell::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RuleSpec, rule_fn};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn input(value: Value) -> Input {
        match value {
            Value::Object(map) => map,
            _ => Input::new(),
        }
    }

    fn validator(data: Value, rules: RuleSet) -> Validator {
        Validator::make(input(data), rules, MessageOverrides::new(), AttributeLabels::new())
            .unwrap()
    }

    #[test]
    fn test_passes_is_negation_of_fails() {
        let v = validator(json!({"name": "Ann"}), RuleSet::new().rule("name", "required"));
        assert!(v.passes());
        assert!(!v.fails());
        assert!(v.errors().is_empty());

        let v = validator(json!({}), RuleSet::new().rule("name", "required"));
        assert!(v.fails());
        assert!(!v.passes());
    }

    #[test]
    fn test_min_failure_only_when_present() {
        let v = validator(json!({"name": "ab"}), RuleSet::new().rule("name", "required|min:3"));
        assert_eq!(
            v.errors().get("name"),
            Some(&["The name must be at least 3 characters.".to_string()][..])
        );
    }

    #[test]
    fn test_all_rules_run_for_an_attribute() {
        let v = validator(
            json!({"code": "a1"}),
            RuleSet::new().rule("code", "alpha|min:3|in:abc,def"),
        );
        assert_eq!(v.errors().get("code").map(<[String]>::len), Some(3));
        assert_eq!(
            v.errors().first("code"),
            Some("The code may only contain letters.")
        );
    }

    #[test]
    fn test_absent_values_pass_non_implicit_rules() {
        let v = validator(
            json!({"age": null}),
            RuleSet::new()
                .rule("age", "numeric|min:18")
                .rule("email", "email"),
        );
        assert!(v.passes());
    }

    #[test]
    fn test_unruled_attributes_are_ignored() {
        let v = validator(
            json!({"name": "Ann", "junk": ""}),
            RuleSet::new().rule("name", "required"),
        );
        assert!(!v.errors().has("junk"));
        assert!(v.passes());
    }

    #[test]
    fn test_errors_follow_declaration_order() {
        let v = validator(
            json!({}),
            RuleSet::new()
                .rule("zeta", "required")
                .rule("alpha", "required")
                .rule("mid", "required"),
        );
        assert_eq!(v.errors().keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_override_is_used_verbatim() {
        let v = Validator::builder(Input::new())
            .rules(RuleSet::new().rule("name", "required"))
            .message("name.required", "Please provide your name")
            .build()
            .unwrap();
        assert_eq!(v.errors().first("name"), Some("Please provide your name"));
    }

    #[test]
    fn test_attribute_label_substitution() {
        let v = Validator::builder(Input::new())
            .rules(RuleSet::new().rule("first_name", "required").rule("last_name", "required"))
            .attribute("first_name", "First Name")
            .build()
            .unwrap();
        assert!(v.errors().first("first_name").unwrap().contains("First Name"));
        assert_eq!(
            v.errors().first("last_name"),
            Some("The last name field is required.")
        );
    }

    #[test]
    fn test_config_catalog_precedence() {
        let config = ValidationConfig::new()
            .with_message("required", "Fill in :attribute!")
            .with_custom("email.required", "We need :attribute to reply.")
            .with_attribute("email", "your email");

        let v = Validator::builder(Input::new())
            .rules(
                RuleSet::new()
                    .rule("name", "required")
                    .rule("email", "required")
                    .rule("phone", "required"),
            )
            .message("phone.required", "Phone please.")
            .config(Arc::new(config))
            .build()
            .unwrap();

        assert_eq!(v.errors().first("name"), Some("Fill in name!"));
        assert_eq!(v.errors().first("email"), Some("We need your email to reply."));
        assert_eq!(v.errors().first("phone"), Some("Phone please."));
    }

    #[test]
    fn test_parameter_placeholders() {
        let v = validator(
            json!({"age": 3, "tags": ["a"]}),
            RuleSet::new()
                .rule("age", "integer|between:18,99")
                .rule("tags", "array|min:2"),
        );
        assert_eq!(
            v.errors().first("age"),
            Some("The age must be between 18 and 99.")
        );
        assert_eq!(
            v.errors().first("tags"),
            Some("The tags must be at least 2 items.")
        );
    }

    #[test]
    fn test_numeric_strings_compare_by_value() {
        let v = validator(
            json!({"quantity": "5"}),
            RuleSet::new().rule("quantity", "numeric|max:10"),
        );
        assert!(v.passes());
    }

    #[test]
    fn test_nested_attributes() {
        let v = validator(
            json!({"address": {"city": "", "zip": "0150"}}),
            RuleSet::new()
                .rule("address.city", "required")
                .rule("address.zip", "required|size:4")
                .rule("address.country", "required"),
        );
        assert_eq!(v.errors().keys().collect::<Vec<_>>(), vec!["address.city", "address.country"]);
        assert_eq!(
            v.errors().first("address.city"),
            Some("The address.city field is required.")
        );
    }

    #[test]
    fn test_confirmed() {
        let v = validator(
            json!({"password": "secret1", "password_confirmation": "secret2"}),
            RuleSet::new().rule("password", "required|confirmed"),
        );
        assert_eq!(
            v.errors().first("password"),
            Some("The password confirmation does not match.")
        );
    }

    #[test]
    fn test_unknown_rule_fails_construction() {
        let result = Validator::make(
            Input::new(),
            RuleSet::new().rule("name", "required|shiny"),
            MessageOverrides::new(),
            AttributeLabels::new(),
        );
        assert!(matches!(result, Err(RuleError::UnknownRule { rule }) if rule == "shiny"));
    }

    #[test]
    fn test_malformed_rule_fails_construction() {
        let result = Validator::builder(Input::new())
            .rules(RuleSet::new().rule("name", "required||min:3"))
            .build();
        assert!(matches!(result, Err(RuleError::Malformed { .. })));
    }

    #[test]
    fn test_custom_instances_run_like_builtins() {
        let even = rule_fn("even", "The :attribute must be even.", |_, value, _| {
            value.as_i64().is_some_and(|n| n % 2 == 0)
        });
        let v = validator(
            json!({"count": 3}),
            RuleSet::new().rule("count", RuleSpec::from("integer").with(even)),
        );
        assert_eq!(v.errors().first("count"), Some("The count must be even."));
    }

    #[test]
    fn test_evaluation_happens_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let counting = rule_fn("counted", "x", move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        });

        let v = validator(json!({"a": 1}), RuleSet::new().rule("a", counting));
        assert!(v.fails());
        assert!(!v.passes());
        let _ = v.errors();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_validate_returns_validated_subset() {
        let v = validator(
            json!({"name": "A", "email": "a@b.com", "extra": "x"}),
            RuleSet::new().rule("name", "required").rule("email", "required|email"),
        );
        let validated = v.validate().unwrap();
        assert_eq!(Value::Object(validated), json!({"name": "A", "email": "a@b.com"}));
    }

    #[test]
    fn test_validate_returns_error_with_validator() {
        let v = validator(json!({"email": "nope"}), RuleSet::new().rule("email", "email"));
        let err = v.validate().unwrap_err();
        assert_eq!(
            err.errors().first("email"),
            Some("The email must be a valid email address.")
        );
        assert_eq!(err.validator().input().get("email"), Some(&json!("nope")));
    }

    #[test]
    fn test_validated_rebuilds_nested_and_skips_missing() {
        let v = validator(
            json!({"address": {"city": "Oslo", "street": "Main"}, "name": "Ann"}),
            RuleSet::new()
                .rule("address.city", "required")
                .rule("nickname", "string")
                .rule("name", ""),
        );
        assert_eq!(
            Value::Object(v.validated()),
            json!({"address": {"city": "Oslo"}, "name": "Ann"})
        );
    }

    #[test]
    fn test_validated_keeps_array_shape() {
        let v = validator(
            json!({"items": [{"sku": "A1", "qty": 2}], "extra": 1}),
            RuleSet::new().rule("items.0.sku", "required"),
        );
        assert_eq!(Value::Object(v.validated()), json!({"items": [{"sku": "A1"}]}));
    }

    #[test]
    fn test_validated_keeps_literal_dotted_keys() {
        let v = validator(
            json!({"meta.title": "Hello", "meta": {"title": "nested"}}),
            RuleSet::new().rule("meta.title", "required"),
        );
        assert_eq!(Value::Object(v.validated()), json!({"meta.title": "Hello"}));
    }

    #[test]
    fn test_other_attribute_uses_labels() {
        let v = Validator::builder(input(json!({"new_pw": "a", "old_pw": "b"})))
            .rules(RuleSet::new().rule("new_pw", "same:old_pw"))
            .attribute("new_pw", "New password")
            .attribute("old_pw", "Current password")
            .build()
            .unwrap();
        assert_eq!(
            v.errors().first("new_pw"),
            Some("The New password and Current password must match.")
        );

        let config = ValidationConfig::new().with_attribute("old_pw", "current password");
        let v = Validator::builder(input(json!({"new_pw": "b", "old_pw": "b"})))
            .rules(RuleSet::new().rule("new_pw", "different:old_pw"))
            .config(Arc::new(config))
            .build()
            .unwrap();
        assert_eq!(
            v.errors().first("new_pw"),
            Some("The new pw and current password must be different.")
        );
    }

    #[test]
    fn test_array_size_rules_ignore_strings() {
        let v = validator(json!({"tags": "abc"}), RuleSet::new().rule("tags", "array|min:2"));
        assert_eq!(
            v.errors().get("tags"),
            Some(
                &[
                    "The tags must be an array.".to_string(),
                    "The tags must be at least 2 items.".to_string(),
                ][..]
            )
        );
    }

    #[test]
    fn test_attributes_under_validation_in_order() {
        let v = validator(
            json!({"b": 1}),
            RuleSet::new().rule("b", "integer").rule("a", "string"),
        );
        assert_eq!(v.attributes_under_validation().collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn test_validation_error_gives_back_validator() {
        let err = validator(json!({}), RuleSet::new().rule("name", "required"))
            .validate()
            .unwrap_err();
        let v = err.into_validator();
        assert!(v.fails());
        assert_eq!(v.errors().keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
        assert_send_sync::<ValidationError>();
    }
}
