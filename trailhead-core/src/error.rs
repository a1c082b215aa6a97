use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error as ThisError;

/// Violazione di un vincolo su un campo, rilevata prima di toccare il database.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ValidationError {
    #[error("username must be between 4 and 14 characters, inclusive!")]
    UsernameLength { len: usize },
}

/// Campo non ammesso o di tipo sbagliato in un corpo PATCH.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum FieldError {
    #[error("unknown field `{0}`")]
    Unknown(String),

    #[error("field `{0}` must be a string")]
    NotAString(String),
}

/// Corpo d'errore esposto sul wire.
///
/// Il messaggio è la chiave di una mappa con valore `null`:
/// `{"User not found!": null}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub message: String,
}

impl Error {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<&ValidationError> for Error {
    fn from(err: &ValidationError) -> Self {
        Self::new(err.to_string())
    }
}

impl Serialize for Error {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.message, &None::<()>)?;
        map.end()
    }
}
