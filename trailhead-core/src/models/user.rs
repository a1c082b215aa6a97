use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::protocol::http::UserPatch;

pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 14;

/// Username già validato: 4..=14 caratteri (code point, non byte).
///
/// L'unico modo di costruirlo è `Username::parse`, quindi un `User` in memoria
/// non può mai contenere uno username fuori range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct Username(String);

impl Username {
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        let len = raw.chars().count();
        if (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
            Ok(Self(raw))
        } else {
            Err(ValidationError::UsernameLength { len })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Username {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Riga della tabella `users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Username,
    /// Salvata così com'è.
    pub password: String,
    pub created_at: String, // RFC3339 UTC
    /// `None` finché l'utente non viene modificato.
    pub updated_at: Option<String>,
}

impl User {
    /// Assegna un nuovo username, validandolo prima di toccare lo stato.
    pub fn set_username(&mut self, raw: impl Into<String>) -> Result<(), ValidationError> {
        self.username = Username::parse(raw)?;
        Ok(())
    }

    /// Applica una PATCH. Tutti i campi vengono validati prima di assegnarne
    /// uno qualsiasi: in caso d'errore l'utente resta invariato.
    ///
    /// Ritorna `false` se la patch è vuota (nessun timestamp aggiornato).
    pub fn apply_patch(&mut self, patch: UserPatch, at: &str) -> Result<bool, ValidationError> {
        let username = patch.username.map(Username::parse).transpose()?;
        if username.is_none() && patch.password.is_none() {
            return Ok(false);
        }
        if let Some(username) = username {
            self.username = username;
        }
        if let Some(password) = patch.password {
            self.password = password;
        }
        self.updated_at = Some(at.to_string());
        Ok(true)
    }
}
