use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("unexpected backend response: {0}")]
    Decode(String),
    #[error("not signed in")]
    NotSignedIn,
    #[error("session expired")]
    SessionExpired,
    #[error("invalid session token: {0}")]
    InvalidToken(String),
}

impl BackendError {
    pub fn status(&self) -> Option<u16> {
        match self {
            BackendError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
