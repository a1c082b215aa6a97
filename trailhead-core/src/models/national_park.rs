use serde::{Deserialize, Serialize};

/// Riga della tabella `national_parks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalPark {
    pub id: i64,
    pub name: String,
    pub state: String,
    pub created_at: String, // RFC3339 UTC
    pub updated_at: Option<String>,
}
