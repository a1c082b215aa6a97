//! Contesto di persistenza per una singola richiesta.
//!
//! `Store` possiede una transazione SQLite. Gli handler che scrivono chiamano
//! `commit()` una volta alla fine; su qualunque altro percorso d'uscita (errore
//! di validazione, 404, errore del database) la transazione viene droppata e
//! sqlx esegue il rollback.
//!
//! Chi scrive apre lo store con `begin_write`: `BEGIN IMMEDIATE` prende il lock
//! di scrittura subito, aspettando il busy timeout. Con un `BEGIN` deferred due
//! scrittori che hanno già letto non possono promuovere il lock e SQLite
//! risponde SQLITE_BUSY senza attendere.

use sqlx::sqlite::{Sqlite, SqlitePool, SqliteRow};
use sqlx::{Row, Transaction};
use trailhead_core::{
    now_timestamp, NationalPark, NationalParkGraph, User, UserGraph, UserVisitedPark, Username,
    VisitGraph,
};

pub struct Store {
    tx: Transaction<'static, Sqlite>,
}

impl Store {
    /// Contesto di sola lettura.
    pub async fn begin(pool: &SqlitePool) -> sqlx::Result<Self> {
        Ok(Self { tx: pool.begin().await? })
    }

    /// Contesto per gli handler che modificano il database.
    pub async fn begin_write(pool: &SqlitePool) -> sqlx::Result<Self> {
        Ok(Self { tx: pool.begin_with("BEGIN IMMEDIATE").await? })
    }

    pub async fn commit(self) -> sqlx::Result<()> {
        self.tx.commit().await
    }

    // ==================
    // Users
    // ==================

    pub async fn create_user(&mut self, username: Username, password: &str) -> sqlx::Result<User> {
        let created_at = now_timestamp();
        let id = sqlx::query("INSERT INTO users (username, password, created_at) VALUES (?, ?, ?)")
            .bind(username.as_str())
            .bind(password)
            .bind(&created_at)
            .execute(&mut *self.tx)
            .await?
            .last_insert_rowid();
        Ok(User {
            id,
            username,
            password: password.to_string(),
            created_at,
            updated_at: None,
        })
    }

    pub async fn find_user(&mut self, id: i64) -> sqlx::Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id, username, password, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn all_users(&mut self) -> sqlx::Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT id, username, password, created_at, updated_at FROM users ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(user_from_row).collect()
    }

    /// Scrive tutte le colonne modificabili di un utente già validato.
    pub async fn save_user(&mut self, user: &User) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET username = ?, password = ?, updated_at = ? WHERE id = ?")
            .bind(user.username.as_str())
            .bind(&user.password)
            .bind(&user.updated_at)
            .bind(user.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    // ==================
    // National parks
    // ==================

    pub async fn create_park(&mut self, name: &str, state: &str) -> sqlx::Result<NationalPark> {
        let created_at = now_timestamp();
        let id = sqlx::query("INSERT INTO national_parks (name, state, created_at) VALUES (?, ?, ?)")
            .bind(name)
            .bind(state)
            .bind(&created_at)
            .execute(&mut *self.tx)
            .await?
            .last_insert_rowid();
        Ok(NationalPark {
            id,
            name: name.to_string(),
            state: state.to_string(),
            created_at,
            updated_at: None,
        })
    }

    pub async fn find_park(&mut self, id: i64) -> sqlx::Result<Option<NationalPark>> {
        let row = sqlx::query(
            "SELECT id, name, state, created_at, updated_at FROM national_parks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(park_from_row).transpose()
    }

    pub async fn all_parks(&mut self) -> sqlx::Result<Vec<NationalPark>> {
        let rows = sqlx::query(
            "SELECT id, name, state, created_at, updated_at FROM national_parks ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(park_from_row).collect()
    }

    /// Elimina il parco e, prima, tutte le visite che lo referenziano.
    /// Ritorna il numero di visite rimosse.
    pub async fn delete_park(&mut self, park: &NationalPark) -> sqlx::Result<u64> {
        let visits = sqlx::query("DELETE FROM user_visited_park WHERE park_id = ?")
            .bind(park.id)
            .execute(&mut *self.tx)
            .await?
            .rows_affected();
        sqlx::query("DELETE FROM national_parks WHERE id = ?")
            .bind(park.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(visits)
    }

    // ==================
    // Visits
    // ==================

    pub async fn create_visit(
        &mut self,
        date_of_visit: Option<&str>,
        user: &User,
        park: &NationalPark,
    ) -> sqlx::Result<UserVisitedPark> {
        let id = sqlx::query(
            "INSERT INTO user_visited_park (date_of_visit, user_id, park_id) VALUES (?, ?, ?)",
        )
        .bind(date_of_visit)
        .bind(user.id)
        .bind(park.id)
        .execute(&mut *self.tx)
        .await?
        .last_insert_rowid();
        Ok(UserVisitedPark {
            id,
            date_of_visit: date_of_visit.map(str::to_string),
            user_id: Some(user.id),
            park_id: Some(park.id),
        })
    }

    pub async fn all_visits(&mut self) -> sqlx::Result<Vec<UserVisitedPark>> {
        let rows = sqlx::query(
            "SELECT id, date_of_visit, user_id, park_id FROM user_visited_park ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(visit_from_row).collect()
    }

    pub async fn visits_for_user(&mut self, user_id: i64) -> sqlx::Result<Vec<UserVisitedPark>> {
        let rows = sqlx::query(
            "SELECT id, date_of_visit, user_id, park_id FROM user_visited_park WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(visit_from_row).collect()
    }

    pub async fn visits_for_park(&mut self, park_id: i64) -> sqlx::Result<Vec<UserVisitedPark>> {
        let rows = sqlx::query(
            "SELECT id, date_of_visit, user_id, park_id FROM user_visited_park WHERE park_id = ? ORDER BY id",
        )
        .bind(park_id)
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(visit_from_row).collect()
    }

    // ==================
    // Graphs (entità + relazioni)
    // ==================

    pub async fn user_graph(&mut self, user: User) -> sqlx::Result<UserGraph> {
        let visits = self.visits_for_user(user.id).await?;
        let parks = self.all_parks().await?;
        Ok(UserGraph::assemble(user, &visits, &parks))
    }

    pub async fn user_graphs(&mut self) -> sqlx::Result<Vec<UserGraph>> {
        let users = self.all_users().await?;
        let visits = self.all_visits().await?;
        let parks = self.all_parks().await?;
        Ok(users
            .into_iter()
            .map(|u| UserGraph::assemble(u, &visits, &parks))
            .collect())
    }

    pub async fn park_graph(&mut self, park: NationalPark) -> sqlx::Result<NationalParkGraph> {
        let visits = self.visits_for_park(park.id).await?;
        let users = self.all_users().await?;
        Ok(NationalParkGraph::assemble(park, &visits, &users))
    }

    pub async fn park_graphs(&mut self) -> sqlx::Result<Vec<NationalParkGraph>> {
        let parks = self.all_parks().await?;
        let visits = self.all_visits().await?;
        let users = self.all_users().await?;
        Ok(parks
            .into_iter()
            .map(|p| NationalParkGraph::assemble(p, &visits, &users))
            .collect())
    }

    pub async fn visit_graphs(&mut self) -> sqlx::Result<Vec<VisitGraph>> {
        let visits = self.all_visits().await?;
        let users = self.all_users().await?;
        let parks = self.all_parks().await?;
        Ok(visits
            .into_iter()
            .map(|v| VisitGraph::assemble(v, &users, &parks))
            .collect())
    }
}

fn user_from_row(row: &SqliteRow) -> sqlx::Result<User> {
    let raw: String = row.try_get("username")?;
    // una riga fuori range può arrivare solo da scritture esterne all'applicazione
    let username = Username::parse(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    Ok(User {
        id: row.try_get("id")?,
        username,
        password: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn park_from_row(row: &SqliteRow) -> sqlx::Result<NationalPark> {
    Ok(NationalPark {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        state: row.try_get("state")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn visit_from_row(row: &SqliteRow) -> sqlx::Result<UserVisitedPark> {
    Ok(UserVisitedPark {
        id: row.try_get("id")?,
        date_of_visit: row.try_get("date_of_visit")?,
        user_id: row.try_get("user_id")?,
        park_id: row.try_get("park_id")?,
    })
}
