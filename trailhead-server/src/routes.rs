use axum::{routing::{delete, get}, Router, Extension};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(controllers::home))
        .route("/users", get(controllers::list_users).post(controllers::create_user))
        .route("/users/:id", get(controllers::show_user).patch(controllers::update_user))
        .route("/national_parks", get(controllers::list_parks).post(controllers::create_park))
        .route("/national_parks/:id", delete(controllers::delete_park))
        .route("/user_visited_parks", get(controllers::list_visits).post(controllers::create_visit))
        .fallback(controllers::route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}
