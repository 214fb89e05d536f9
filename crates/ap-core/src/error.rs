use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Unknown therapy mode name.
    #[error("Mode thérapeutique inconnu : {0}")]
    UnknownMode(String),
}
