//! trailhead-core: tipi condivisi dal server (entità, viste di serializzazione, DTO HTTP, errori).
//! Niente I/O: la persistenza vive in trailhead-server.

pub mod models;
pub mod protocol;
pub mod error;
pub mod utils;

// Re-export utili per ridurre i percorsi nel crate server
pub use error::{Error, FieldError, ValidationError};
pub use models::{
    graph::{to_mapping, NationalParkGraph, Relations, UserGraph, VisitGraph, VisitOfPark, VisitOfUser},
    national_park::NationalPark,
    user::{User, Username},
    visit::UserVisitedPark,
};
pub use protocol::http::{CreateParkRequest, CreateUserRequest, CreateVisitRequest, UserPatch};
pub use utils::now_timestamp;
