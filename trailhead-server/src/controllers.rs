use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Extension, Path},
    http::StatusCode,
    Json,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use trailhead_core::{
    now_timestamp, to_mapping, CreateParkRequest, CreateUserRequest, CreateVisitRequest,
    Relations, UserPatch, Username, VisitGraph,
};

use crate::error::{ApiError, ApiResult};
use crate::store::Store;
use crate::{health_with_pool, AppState};

type Mapping = Map<String, Value>;

// Solo cifre decimali: `/users/abc`, `/users/-1` e `/users/+1` non corrispondono
// alla rotta e ricevono la stessa risposta di un path inesistente
fn path_id(path: Result<Path<String>, PathRejection>) -> ApiResult<i64> {
    let Ok(Path(raw)) = path else {
        return Err(ApiError::RouteNotFound);
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::RouteNotFound);
    }
    raw.parse().map_err(|_| ApiError::RouteNotFound)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(b)| b)
        .map_err(|rejection| ApiError::InvalidBody(rejection.body_text()))
}

/// Handler per GET /
pub async fn home(Extension(state): Extension<Arc<AppState>>) -> StatusCode {
    health_with_pool(&state.pool).await
}

/// Fallback per ogni rotta non registrata.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// Handler per GET /users
pub async fn list_users(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<Vec<Mapping>>> {
    let mut store = Store::begin(&state.pool).await?;
    let users = store
        .user_graphs()
        .await?
        .iter()
        .map(|g| g.to_mapping(Relations::Include))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(users))
}

/// Handler per POST /users
pub async fn create_user(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Mapping>)> {
    let req = json_body(body)?;
    // la validazione avviene prima di aprire la transazione
    let username = Username::parse(req.username).map_err(|e| {
        tracing::warn!("rejected new user: {}", e);
        e
    })?;

    let mut store = Store::begin_write(&state.pool).await?;
    let user = store.create_user(username, &req.password).await?;
    let graph = store.user_graph(user).await?;
    store.commit().await?;

    tracing::info!(user_id = graph.user.id, username = %graph.user.username, "user created");
    Ok((StatusCode::CREATED, Json(graph.to_mapping(Relations::Include)?)))
}

/// Handler per GET /users/<id>: l'utente senza la lista delle visite.
pub async fn show_user(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Mapping>> {
    let id = path_id(path)?;
    let mut store = Store::begin(&state.pool).await?;
    let user = store.find_user(id).await?.ok_or(ApiError::UserNotFound)?;
    Ok(Json(to_mapping(&user)?))
}

/// Handler per PATCH /users/<id>
pub async fn update_user(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Mapping>)> {
    let id = path_id(path)?;
    let patch = UserPatch::try_from(json_body(body)?)?;

    let mut store = Store::begin_write(&state.pool).await?;
    let mut user = store.find_user(id).await?.ok_or(ApiError::UserNotFound)?;
    // se la validazione fallisce lo store viene droppato: rollback, nulla scritto
    if user.apply_patch(patch, &now_timestamp())? {
        store.save_user(&user).await?;
        tracing::info!(user_id = user.id, "user updated");
    }
    let graph = store.user_graph(user).await?;
    store.commit().await?;

    Ok((StatusCode::CREATED, Json(graph.to_mapping(Relations::Include)?)))
}

/// Handler per GET /national_parks
pub async fn list_parks(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<Vec<Mapping>>> {
    let mut store = Store::begin(&state.pool).await?;
    let parks = store
        .park_graphs()
        .await?
        .iter()
        .map(to_mapping)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(parks))
}

/// Handler per POST /national_parks
pub async fn create_park(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<CreateParkRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Mapping>)> {
    let req = json_body(body)?;
    let mut store = Store::begin_write(&state.pool).await?;
    let park = store.create_park(&req.name, &req.state).await?;
    let graph = store.park_graph(park).await?;
    store.commit().await?;

    tracing::info!(park_id = graph.park.id, name = %graph.park.name, "national park created");
    Ok((StatusCode::CREATED, Json(to_mapping(&graph)?)))
}

/// Handler per DELETE /national_parks/<id>: elimina prima le visite, poi il parco.
pub async fn delete_park(
    Extension(state): Extension<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = path_id(path)?;
    let mut store = Store::begin_write(&state.pool).await?;
    let park = store.find_park(id).await?.ok_or(ApiError::ParkNotFound)?;
    let visits = store.delete_park(&park).await?;
    store.commit().await?;

    tracing::info!(park_id = id, visits, "national park deleted");
    Ok(StatusCode::ACCEPTED)
}

/// Handler per GET /user_visited_parks
pub async fn list_visits(Extension(state): Extension<Arc<AppState>>) -> ApiResult<Json<Vec<Mapping>>> {
    let mut store = Store::begin(&state.pool).await?;
    let visits = store
        .visit_graphs()
        .await?
        .iter()
        .map(to_mapping)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(visits))
}

/// Handler per POST /user_visited_parks: utente e parco devono esistere.
pub async fn create_visit(
    Extension(state): Extension<Arc<AppState>>,
    body: Result<Json<CreateVisitRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Mapping>)> {
    let req = json_body(body)?;
    let mut store = Store::begin_write(&state.pool).await?;
    let user = store.find_user(req.user_id).await?.ok_or(ApiError::UserNotFound)?;
    let park = store.find_park(req.park_id).await?.ok_or(ApiError::ParkNotFound)?;
    let visit = store
        .create_visit(req.date_of_visit.as_deref(), &user, &park)
        .await?;
    store.commit().await?;

    tracing::info!(visit_id = visit.id, user_id = user.id, park_id = park.id, "visit recorded");
    let graph = VisitGraph::assemble(visit, &[user], &[park]);
    Ok((StatusCode::CREATED, Json(to_mapping(&graph)?)))
}
