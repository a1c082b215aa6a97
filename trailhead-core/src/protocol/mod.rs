pub mod http;

// Re-export comodi
pub use http::{CreateParkRequest, CreateUserRequest, CreateVisitRequest, UserPatch};
