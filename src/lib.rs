// Trellis - request validation for REST endpoints
//
// This library bundles the request primitives with rule-based validation
// and self-authorizing form requests.

// Re-export core functionality
pub use trellis_core::*;

// Re-export optional crates
#[cfg(feature = "validation")]
pub use trellis_validation;

// Prelude for common imports
pub mod prelude {
    pub use crate::{Error, HttpRequest, HttpResponse, HttpStatus};

    #[cfg(feature = "validation")]
    pub use trellis_validation::{
        ErrorBag, FormRequest, FormRequestError, Input, InputSource, Rule, RuleRegistry, RuleSet,
        ValidatedRequest, ValidationPipe, Validator, rules,
    };
}
