// Form request lifecycle

use crate::config::ValidationConfig;
use crate::{
    AttributeLabels, AuthorizationError, FormRequestError, Input, MessageOverrides, RuleRegistry,
    RuleSet, ValidationError, Validator, data,
};
use serde_json::Value;
use std::sync::Arc;

/// Source of submitted data
pub trait InputSource {
    /// Every submitted field
    fn all(&self) -> Input;
}

impl InputSource for Input {
    fn all(&self) -> Input {
        self.clone()
    }
}

/// A request type that authorizes and validates itself before a handler
/// runs.
///
/// ```
/// use trellis_validation::{FormRequest, Input, InputSource, RuleSet, ValidatedRequest};
/// use serde_json::json;
///
/// struct StorePost {
///     body: Input,
///     can_publish: bool,
/// }
///
/// impl InputSource for StorePost {
///     fn all(&self) -> Input {
///         self.body.clone()
///     }
/// }
///
/// impl FormRequest for StorePost {
///     fn authorize(&self) -> bool {
///         self.can_publish
///     }
///
///     fn rules(&self) -> RuleSet {
///         RuleSet::new()
///             .rule("title", "required|max:80")
///             .rule("status", "in:draft,publish")
///     }
/// }
///
/// let body = json!({"title": "Hello", "status": "draft", "sticky": true});
/// let request = StorePost { body: body.as_object().cloned().unwrap(), can_publish: true };
///
/// let validated = ValidatedRequest::new(request).unwrap();
/// assert_eq!(validated.validated().len(), 2);
/// ```
pub trait FormRequest: InputSource {
    /// Whether the current user may make this request
    fn authorize(&self) -> bool {
        true
    }

    /// Rules for the submitted data
    fn rules(&self) -> RuleSet;

    /// `attribute.rule` message overrides
    fn messages(&self) -> MessageOverrides {
        MessageOverrides::new()
    }

    /// Display labels for attributes
    fn attributes(&self) -> AttributeLabels {
        AttributeLabels::new()
    }

    /// Registry used to resolve rule identifiers
    fn registry(&self) -> &RuleRegistry {
        RuleRegistry::global()
    }

    /// Message catalog, the shared default when `None`
    fn config(&self) -> Option<Arc<ValidationConfig>> {
        None
    }
}

/// A form request that passed authorization and validation
#[derive(Debug)]
pub struct ValidatedRequest<F> {
    form: F,
    input: Input,
    validated: Input,
}

impl<F: FormRequest> ValidatedRequest<F> {
    /// Run the lifecycle: snapshot input, authorize, validate.
    ///
    /// Authorization is decided before any rule is built. A refused request
    /// never has its [`FormRequest::rules`] consulted.
    pub fn new(form: F) -> Result<Self, FormRequestError> {
        let input = form.all();

        if !form.authorize() {
            tracing::debug!("form request denied by authorize()");
            return Err(AuthorizationError.into());
        }

        let mut builder = Validator::builder(input)
            .rules(form.rules())
            .messages(form.messages())
            .attributes(form.attributes())
            .registry(form.registry());
        if let Some(config) = form.config() {
            builder = builder.config(config);
        }

        let validator = builder.build()?;
        if validator.fails() {
            tracing::debug!(
                attributes = validator.errors().len(),
                messages = validator.errors().count(),
                "form request failed validation"
            );
            return Err(ValidationError::new(validator).into());
        }

        let validated = validator.validated();
        let input = validator.into_input();
        tracing::trace!(fields = validated.len(), "form request validated");

        Ok(Self {
            form,
            input,
            validated,
        })
    }
}

impl<F> ValidatedRequest<F> {
    /// Input restricted to the attributes named in the rules
    pub fn validated(&self) -> &Input {
        &self.validated
    }

    /// One validated value by dot path
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        data::get(&self.validated, attribute)
    }

    /// The full input snapshot, including fields without rules
    pub fn all(&self) -> &Input {
        &self.input
    }

    /// One raw input value by dot path
    pub fn input(&self, attribute: &str) -> Option<&Value> {
        data::get(&self.input, attribute)
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn into_inner(self) -> F {
        self.form
    }

    pub fn into_validated(self) -> Input {
        self.validated
    }
}
