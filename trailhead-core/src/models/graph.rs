//! Viste di serializzazione con le entità collegate.
//!
//! Ogni vista annida i record collegati un solo livello e non contiene il
//! riferimento inverso verso il proprietario:
//!
//! - `UserGraph`: utente + visite, ogni visita con il suo parco (senza `user`)
//! - `NationalParkGraph`: parco + visite, ogni visita con il suo utente (senza `national_park`)
//! - `VisitGraph`: visita + utente + parco, entrambi senza la lista `user_visited_park`
//!
//! La ricorsione termina quindi per costruzione dei tipi.

use serde::Serialize;
use serde_json::{Map, Value};

use super::{NationalPark, User, UserVisitedPark};

/// Se includere o meno la lista `user_visited_park` nella mappa di un utente.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relations {
    Include,
    Exclude,
}

/// Visita annidata sotto il suo utente.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitOfUser {
    #[serde(flatten)]
    pub visit: UserVisitedPark,
    pub national_park: Option<NationalPark>,
}

/// Visita annidata sotto il suo parco.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitOfPark {
    #[serde(flatten)]
    pub visit: UserVisitedPark,
    pub user: Option<User>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserGraph {
    #[serde(flatten)]
    pub user: User,
    pub user_visited_park: Vec<VisitOfUser>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NationalParkGraph {
    #[serde(flatten)]
    pub park: NationalPark,
    pub user_visited_park: Vec<VisitOfPark>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitGraph {
    #[serde(flatten)]
    pub visit: UserVisitedPark,
    pub user: Option<User>,
    pub national_park: Option<NationalPark>,
}

impl UserGraph {
    /// Collega all'utente le sue visite e, per ciascuna, il parco visitato.
    pub fn assemble(user: User, visits: &[UserVisitedPark], parks: &[NationalPark]) -> Self {
        let user_visited_park = visits
            .iter()
            .filter(|v| v.user_id == Some(user.id))
            .map(|v| VisitOfUser {
                visit: v.clone(),
                national_park: find_park(parks, v.park_id),
            })
            .collect();
        Self { user, user_visited_park }
    }

    pub fn to_mapping(&self, relations: Relations) -> serde_json::Result<Map<String, Value>> {
        match relations {
            Relations::Include => to_mapping(self),
            Relations::Exclude => to_mapping(&self.user),
        }
    }
}

impl NationalParkGraph {
    pub fn assemble(park: NationalPark, visits: &[UserVisitedPark], users: &[User]) -> Self {
        let user_visited_park = visits
            .iter()
            .filter(|v| v.park_id == Some(park.id))
            .map(|v| VisitOfPark {
                visit: v.clone(),
                user: find_user(users, v.user_id),
            })
            .collect();
        Self { park, user_visited_park }
    }
}

impl VisitGraph {
    pub fn assemble(visit: UserVisitedPark, users: &[User], parks: &[NationalPark]) -> Self {
        Self {
            user: find_user(users, visit.user_id),
            national_park: find_park(parks, visit.park_id),
            visit,
        }
    }
}

fn find_user(users: &[User], id: Option<i64>) -> Option<User> {
    let id = id?;
    users.iter().find(|u| u.id == id).cloned()
}

fn find_park(parks: &[NationalPark], id: Option<i64>) -> Option<NationalPark> {
    let id = id?;
    parks.iter().find(|p| p.id == id).cloned()
}

/// Serializza un'entità (o una vista) in una mappa campo -> valore,
/// nell'ordine di dichiarazione dei campi.
pub fn to_mapping<T: Serialize + ?Sized>(entity: &T) -> serde_json::Result<Map<String, Value>> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(serde::ser::Error::custom(format!(
            "expected an object, got {other}"
        ))),
    }
}
