use thiserror::Error;

/// Errors originating from the synthesis module.
#[derive(Error, Debug)]
pub enum SynthError {
    /// No audio output device found.
    #[error("Aucun périphérique audio de sortie trouvé")]
    NoOutputDevice,

    /// Output stream could not be opened or started.
    #[error("Périphérique de sortie indisponible : {0}")]
    Unavailable(String),
}
