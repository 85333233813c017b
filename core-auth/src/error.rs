use thiserror::Error;

/// Account operation failures
///
/// Each variant carries the message of the underlying provider or store
/// failure so it can be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Cannot log in: {0}")]
    CannotLogIn(String),

    #[error("Cannot sign up: {0}")]
    CannotSignUp(String),

    #[error("Cannot log out: {0}")]
    CannotLogOut(String),

    #[error("Cannot delete account: {0}")]
    CannotDelete(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, AuthError>;
