use serde::{Deserialize, Serialize};

/// Riga della tabella di join `user_visited_park`: un utente ha visitato un parco.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVisitedPark {
    pub id: i64,
    /// Testo libero, non validato.
    pub date_of_visit: Option<String>,
    pub user_id: Option<i64>,
    pub park_id: Option<i64>,
}
