// Validation pipe for REST handlers

use crate::{FormRequest, FormRequestError, Input, InputSource, ValidatedRequest};
use serde_json::json;
use trellis_core::{Error, HttpRequest, HttpResponse};

impl InputSource for HttpRequest {
    fn all(&self) -> Input {
        HttpRequest::all(self)
    }
}

/// Runs form requests for handlers and turns rejections into responses
pub struct ValidationPipe;

impl ValidationPipe {
    /// Run the form request lifecycle, answering rejections with a response
    pub fn handle<F: FormRequest>(form: F) -> Result<ValidatedRequest<F>, HttpResponse> {
        ValidatedRequest::new(form).map_err(|e| Self::error_response(&e))
    }

    /// Transform a rejected form request into an HTTP response.
    ///
    /// Validation failures become 422 with the error bag under `errors`,
    /// refused authorization becomes 403, broken rules become 500.
    pub fn error_response(error: &FormRequestError) -> HttpResponse {
        let (response, body) = match error {
            FormRequestError::Validation(e) => (
                HttpResponse::unprocessable_entity(),
                json!({
                    "message": e.to_string(),
                    "errors": e.errors(),
                }),
            ),
            FormRequestError::Unauthorized(e) => {
                (HttpResponse::forbidden(), json!({ "message": e.to_string() }))
            }
            FormRequestError::Configuration(e) => (
                HttpResponse::internal_server_error(),
                json!({ "message": e.to_string() }),
            ),
        };

        let status = response.status;
        response
            .with_json(&body)
            .unwrap_or_else(|_| HttpResponse::new(status))
    }
}

impl From<FormRequestError> for Error {
    fn from(error: FormRequestError) -> Self {
        match error {
            FormRequestError::Validation(e) => Error::UnprocessableEntity(
                e.errors()
                    .all()
                    .next()
                    .map(str::to_string)
                    .unwrap_or_else(|| e.to_string()),
            ),
            FormRequestError::Unauthorized(e) => Error::Forbidden(e.to_string()),
            FormRequestError::Configuration(e) => Error::Internal(e.to_string()),
        }
    }
}
