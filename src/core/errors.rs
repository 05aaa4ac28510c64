use thiserror::Error;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("network: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("decode: {0}")]
    Decode(String),

    #[error("rejected: {0}")]
    Rejected(String),

    #[error("server: {0}")]
    Server(String),

    #[error("unknown post {0}")]
    UnknownPost(u64),

    #[error("missing page context: {0}")]
    MissingContext(String),

    #[error("invalid action: {0}")]
    InvalidAction(String),

    #[error("template: {0}")]
    Template(String),
}

impl ViewError {
    /// Text shown to the user when a failure is surfaced on the page.
    pub fn user_message(&self) -> String {
        match self {
            ViewError::Transport(_) => "Could not reach the server.".to_string(),
            ViewError::Status { status, .. } => format!("The server answered with status {}.", status),
            ViewError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ViewError::Rejected(msg) | ViewError::Server(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ViewError {
    fn from(err: reqwest::Error) -> Self {
        ViewError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::Decode(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for ViewError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        ViewError::MissingContext(format!("header value: {}", err))
    }
}
