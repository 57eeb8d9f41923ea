use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Errors of the login flow and of role lookups.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("unknown registration: {0}")]
    UnknownRegistration(String),

    #[error("invalid or expired login state")]
    InvalidState,

    #[error("too many logins in progress")]
    TooManyLogins,

    #[error("missing query parameter: {0}")]
    MissingParameter(&'static str),

    #[error("identity provider answered {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("the identity has no email")]
    MissingEmail,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl AuthError {
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        AuthError::Provider { status, body }
    }
}
