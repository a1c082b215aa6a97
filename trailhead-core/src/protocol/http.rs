use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::FieldError;
/*
    http dto for http requests
*/
// POST /users
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

// POST /national_parks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateParkRequest {
    pub name: String,
    pub state: String,
}

// POST /user_visited_parks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVisitRequest {
    #[serde(default)]
    pub date_of_visit: Option<String>,
    pub user_id: i64,
    pub park_id: i64,
}

/// PATCH /users/<id>: solo i campi modificabili di un utente.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserPatch {
    pub const FIELDS: [&'static str; 2] = ["username", "password"];
}

impl TryFrom<Map<String, Value>> for UserPatch {
    type Error = FieldError;

    /// Ogni chiave del corpo deve stare nella allow-list e avere valore stringa.
    fn try_from(body: Map<String, Value>) -> Result<Self, Self::Error> {
        let mut patch = UserPatch::default();
        for (key, value) in body {
            let Value::String(value) = value else {
                if Self::FIELDS.contains(&key.as_str()) {
                    return Err(FieldError::NotAString(key));
                }
                return Err(FieldError::Unknown(key));
            };
            match key.as_str() {
                "username" => patch.username = Some(value),
                "password" => patch.password = Some(value),
                _ => return Err(FieldError::Unknown(key)),
            }
        }
        Ok(patch)
    }
}
