// HTTP Status Codes

/// Statuses a Trellis endpoint answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    Ok = 200,
    BadRequest = 400,
    Forbidden = 403,
    UnprocessableEntity = 422,
    InternalServerError = 500,
}

impl HttpStatus {
    pub fn code(&self) -> u16 {
        *self as u16
    }

    pub fn reason(&self) -> &'static str {
        match self {
            HttpStatus::Ok => "OK",
            HttpStatus::BadRequest => "Bad Request",
            HttpStatus::Forbidden => "Forbidden",
            HttpStatus::UnprocessableEntity => "Unprocessable Entity",
            HttpStatus::InternalServerError => "Internal Server Error",
        }
    }

    /// 4xx
    pub fn is_client_error(&self) -> bool {
        self.code() / 100 == 4
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        self.code() / 100 == 5
    }
}

impl std::fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert_eq!(HttpStatus::UnprocessableEntity.code(), 422);
        assert!(HttpStatus::Forbidden.is_client_error());
        assert!(!HttpStatus::Forbidden.is_server_error());
        assert!(HttpStatus::InternalServerError.is_server_error());
        assert!(!HttpStatus::Ok.is_client_error());
        assert_eq!(HttpStatus::UnprocessableEntity.to_string(), "422 Unprocessable Entity");
    }
}
