pub mod user;
pub mod national_park;
pub mod visit;
pub mod graph;

// Re-export per comodità
pub use user::{User, Username};
pub use national_park::NationalPark;
pub use visit::UserVisitedPark;
pub use graph::{to_mapping, NationalParkGraph, Relations, UserGraph, VisitGraph};
