// HTTP request and response types

use crate::HttpStatus;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// HTTP request wrapper
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub path_params: HashMap<String, String>,
    pub query_params: HashMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a JSON body and the matching content type
    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, crate::Error> {
        self.body =
            serde_json::to_vec(value).map_err(|e| crate::Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    /// Get a header by name, ignoring ASCII case
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type").map(String::as_str)
    }

    /// Every submitted parameter merged into one map.
    ///
    /// Body fields override query parameters, which override path
    /// parameters. A body that is neither a JSON object nor a URL-encoded
    /// form contributes nothing.
    pub fn all(&self) -> Map<String, Value> {
        let mut params = Map::new();

        for (key, value) in &self.path_params {
            params.insert(key.clone(), Value::String(value.clone()));
        }
        for (key, value) in &self.query_params {
            params.insert(key.clone(), Value::String(value.clone()));
        }
        params.extend(self.body_params());

        params
    }

    fn body_params(&self) -> Map<String, Value> {
        if self.body.is_empty() {
            return Map::new();
        }

        let content_type = self.content_type().unwrap_or_default().to_ascii_lowercase();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            return serde_urlencoded::from_bytes::<Vec<(String, String)>>(&self.body)
                .map(|pairs| {
                    pairs
                        .into_iter()
                        .map(|(key, value)| (key, Value::String(value)))
                        .collect()
                })
                .unwrap_or_default();
        }

        let looks_like_json = content_type.contains("json")
            || self.body.iter().find(|b| !b.is_ascii_whitespace()) == Some(&b'{');

        if looks_like_json {
            if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&self.body) {
                return map;
            }
        }

        Map::new()
    }
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(HttpStatus::Ok.code())
    }

    pub fn forbidden() -> Self {
        Self::new(HttpStatus::Forbidden.code())
    }

    pub fn unprocessable_entity() -> Self {
        Self::new(HttpStatus::UnprocessableEntity.code())
    }

    pub fn internal_server_error() -> Self {
        Self::new(HttpStatus::InternalServerError.code())
    }

    /// 200 response with a JSON body
    pub fn json<T: Serialize>(value: &T) -> Result<Self, crate::Error> {
        Self::ok().with_json(value)
    }

    pub fn with_json<T: Serialize>(mut self, value: &T) -> Result<Self, crate::Error> {
        self.body =
            serde_json::to_vec(value).map_err(|e| crate::Error::Serialization(e.to_string()))?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        Ok(self)
    }

    /// Decode the body as JSON
    pub fn body_json(&self) -> Result<Value, crate::Error> {
        serde_json::from_slice(&self.body).map_err(|e| crate::Error::Deserialization(e.to_string()))
    }
}

impl From<crate::Error> for HttpResponse {
    fn from(error: crate::Error) -> Self {
        let body = serde_json::json!({ "message": error.to_string() });
        let response = HttpResponse::new(error.status_code());
        match response.with_json(&body) {
            Ok(response) => response,
            Err(_) => HttpResponse::new(error.status_code()),
        }
    }
}
