use thiserror::Error;

/// Errors originating from the audio acquisition module.
///
/// None of these is fatal: acquisition settles into the not-recording state
/// and the rest of the system keeps running.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio input device found.
    #[error("Aucun périphérique audio d'entrée trouvé")]
    NoInputDevice,

    /// Device access denied or the input stream failed.
    #[error("Périphérique d'entrée indisponible : {0}")]
    Unavailable(String),
}
