use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Malformed Authorization header")]
    MalformedHeader,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token carries no user id")]
    MissingSubject,

    #[error("Token verification is not configured")]
    NotConfigured,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::InvalidToken(err.to_string())
    }
}
