mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{send, send_raw, test_app};

const LENGTH_MESSAGE: &str = "username must be between 4 and 14 characters, inclusive!";

async fn create_user(app: &axum::Router, username: &str) -> Result<Value> {
    let reply = send(app, "POST", "/users", Some(json!({"username": username, "password": "x"}))).await?;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    Ok(reply.json())
}

async fn create_park(app: &axum::Router, name: &str, state: &str) -> Result<Value> {
    let reply = send(app, "POST", "/national_parks", Some(json!({"name": name, "state": state}))).await?;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    Ok(reply.json())
}

async fn create_visit(app: &axum::Router, user_id: &Value, park_id: &Value, date: &str) -> Result<Value> {
    let body = json!({"date_of_visit": date, "user_id": user_id, "park_id": park_id});
    let reply = send(app, "POST", "/user_visited_parks", Some(body)).await?;
    assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    Ok(reply.json())
}

#[tokio::test]
async fn home_returns_empty_200() -> Result<()> {
    let (_td, app) = test_app().await?;
    let reply = send(&app, "GET", "/", None).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.text, "");
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404_with_fixed_text() -> Result<()> {
    let (_td, app) = test_app().await?;
    let reply = send(&app, "GET", "/nonexistent", None).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.text, "That route does not exist!");

    // un id non intero non corrisponde alla rotta
    let reply = send(&app, "GET", "/users/abc", None).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.text, "That route does not exist!");
    Ok(())
}

#[tokio::test]
async fn signed_or_oversized_ids_do_not_match_routes() -> Result<()> {
    let (_td, app) = test_app().await?;
    create_park(&app, "Yellowstone", "WY").await?;

    for uri in ["/users/-1", "/users/+1", "/users/99999999999999999999"] {
        let reply = send(&app, "GET", uri, None).await?;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(reply.text, "That route does not exist!", "{uri}");
    }

    let reply = send(&app, "PATCH", "/users/-1", Some(json!({"password": "p"}))).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.text, "That route does not exist!");

    let reply = send(&app, "DELETE", "/national_parks/-1", None).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.text, "That route does not exist!");

    // il parco esistente non è stato toccato
    let parks = send(&app, "GET", "/national_parks", None).await?.json();
    assert_eq!(parks.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn post_user_validates_username_length() -> Result<()> {
    let (_td, app) = test_app().await?;

    let reply = send(&app, "POST", "/users", Some(json!({"username": "abc", "password": "x"}))).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.json(), json!({ LENGTH_MESSAGE: null }));

    let reply = send(&app, "POST", "/users", Some(json!({"username": "abcdefghijklmno", "password": "x"}))).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    // nessuna riga scritta
    let reply = send(&app, "GET", "/users", None).await?;
    assert_eq!(reply.json(), json!([]));

    let user = create_user(&app, "abcd").await?;
    assert_eq!(user["username"], "abcd");
    assert_eq!(user["password"], "x");
    assert!(user["id"].is_i64());
    assert!(user["created_at"].is_string());
    assert!(user["updated_at"].is_null());
    assert_eq!(user["user_visited_park"], json!([]));
    Ok(())
}

#[tokio::test]
async fn post_user_rejects_duplicates_and_bad_bodies() -> Result<()> {
    let (_td, app) = test_app().await?;
    create_user(&app, "alice").await?;

    let reply = send(&app, "POST", "/users", Some(json!({"username": "alice", "password": "y"}))).await?;
    assert_eq!(reply.status, StatusCode::CONFLICT);

    let reply = send(&app, "POST", "/users", Some(json!({"username": "carol"}))).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(&app, "POST", "/users", None).await?;
    assert!(reply.status.is_client_error());
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_400() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    let uri = format!("/users/{}", user["id"]);

    let reply = send_raw(&app, "POST", "/users", r#"{"username":"#).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let body = reply.json();
    let message = body.as_object().and_then(|m| m.keys().next()).expect("error key");
    assert!(message.starts_with("invalid request body"), "{message}");

    let reply = send_raw(&app, "PATCH", &uri, r#"{"username":"#).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    // un array non è un oggetto di campi
    let reply = send_raw(&app, "PATCH", &uri, "[1, 2]").await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let users = send(&app, "GET", "/users", None).await?.json();
    assert_eq!(users.as_array().map(Vec::len), Some(1));
    assert_eq!(users[0]["username"], "alice");
    assert!(users[0]["updated_at"].is_null());
    Ok(())
}

#[tokio::test]
async fn get_user_by_id_omits_visits() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    let park = create_park(&app, "Yellowstone", "WY").await?;
    create_visit(&app, &user["id"], &park["id"], "2024-06-01").await?;

    let reply = send(&app, "GET", &format!("/users/{}", user["id"]), None).await?;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.json();
    assert_eq!(body["username"], "alice");
    assert!(body.get("user_visited_park").is_none());

    let reply = send(&app, "GET", "/users/999", None).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json(), json!({"User not found!": null}));
    Ok(())
}

#[tokio::test]
async fn list_users_nests_visited_parks() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    let park = create_park(&app, "Zion", "UT").await?;
    create_visit(&app, &user["id"], &park["id"], "2024-06-01").await?;

    let reply = send(&app, "GET", "/users", None).await?;
    assert_eq!(reply.status, StatusCode::OK);
    let users = reply.json();
    let visits = users[0]["user_visited_park"].as_array().expect("visits");
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0]["national_park"]["name"], "Zion");
    assert!(visits[0].get("user").is_none());
    assert!(visits[0]["national_park"].get("user_visited_park").is_none());
    Ok(())
}

#[tokio::test]
async fn patch_user_updates_allow_listed_fields() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    let uri = format!("/users/{}", user["id"]);

    let reply = send(&app, "PATCH", &uri, Some(json!({"username": "alicia", "password": "new"}))).await?;
    assert_eq!(reply.status, StatusCode::CREATED);
    let body = reply.json();
    assert_eq!(body["username"], "alicia");
    assert_eq!(body["password"], "new");
    assert!(body["updated_at"].is_string());
    assert_eq!(body["created_at"], user["created_at"]);

    let reply = send(&app, "GET", &uri, None).await?;
    assert_eq!(reply.json()["username"], "alicia");
    Ok(())
}

#[tokio::test]
async fn patch_user_rejections_leave_record_unchanged() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    create_user(&app, "bobby").await?;
    let uri = format!("/users/{}", user["id"]);

    let reply = send(&app, "PATCH", &uri, Some(json!({"username": "al", "password": "changed"}))).await?;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    assert_eq!(reply.json(), json!({ LENGTH_MESSAGE: null }));

    let reply = send(&app, "PATCH", &uri, Some(json!({"id": 99}))).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let reply = send(&app, "PATCH", &uri, Some(json!({"username": "bobby"}))).await?;
    assert_eq!(reply.status, StatusCode::CONFLICT);

    let reply = send(&app, "PATCH", "/users/999", Some(json!({"username": "nobody"}))).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let current = send(&app, "GET", &uri, None).await?.json();
    assert_eq!(current["username"], "alice");
    assert_eq!(current["password"], "x");
    assert!(current["updated_at"].is_null());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_patches_all_commit() -> Result<()> {
    let (_td, app) = test_app().await?;
    let mut ids = Vec::new();
    for i in 0..20 {
        let user = create_user(&app, &format!("user{i:02}")).await?;
        ids.push(user["id"].clone());
    }

    let mut handles = Vec::new();
    for (i, id) in ids.iter().enumerate() {
        let app = app.clone();
        let uri = format!("/users/{id}");
        handles.push(tokio::spawn(async move {
            send(&app, "PATCH", &uri, Some(json!({"password": format!("p{i}")}))).await
        }));
    }
    for handle in handles {
        let reply = handle.await??;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text);
    }

    let users = send(&app, "GET", "/users", None).await?.json();
    for (i, user) in users.as_array().expect("users").iter().enumerate() {
        assert_eq!(user["password"], format!("p{i}"));
        assert!(user["updated_at"].is_string());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_visits_and_deletes_all_commit() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    let mut parks = Vec::new();
    for i in 0..10 {
        parks.push(create_park(&app, &format!("Park {i}"), "UT").await?["id"].clone());
    }

    let mut handles = Vec::new();
    for park_id in &parks {
        let app = app.clone();
        let body = json!({"user_id": user["id"], "park_id": park_id, "date_of_visit": "2024-06-01"});
        handles.push(tokio::spawn(async move {
            send(&app, "POST", "/user_visited_parks", Some(body)).await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await??.status, StatusCode::CREATED);
    }

    let mut handles = Vec::new();
    for park_id in &parks {
        let app = app.clone();
        let uri = format!("/national_parks/{park_id}");
        handles.push(tokio::spawn(async move { send(&app, "DELETE", &uri, None).await }));
    }
    for handle in handles {
        assert_eq!(handle.await??.status, StatusCode::ACCEPTED);
    }

    let visits = send(&app, "GET", "/user_visited_parks", None).await?.json();
    assert_eq!(visits, json!([]));
    Ok(())
}

#[tokio::test]
async fn delete_park_cascades_visits() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    let park = create_park(&app, "Yellowstone", "WY").await?;
    let other = create_park(&app, "Zion", "UT").await?;
    create_visit(&app, &user["id"], &park["id"], "2024-06-01").await?;
    create_visit(&app, &user["id"], &park["id"], "2024-08-15").await?;
    create_visit(&app, &user["id"], &other["id"], "2024-09-01").await?;

    let uri = format!("/national_parks/{}", park["id"]);
    let reply = send(&app, "DELETE", &uri, None).await?;
    assert_eq!(reply.status, StatusCode::ACCEPTED);
    assert_eq!(reply.text, "");

    let visits = send(&app, "GET", "/user_visited_parks", None).await?.json();
    let visits = visits.as_array().expect("visits");
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0]["park_id"], other["id"]);

    let parks = send(&app, "GET", "/national_parks", None).await?.json();
    assert_eq!(parks.as_array().map(Vec::len), Some(1));

    // il parco non esiste più
    let reply = send(&app, "DELETE", &uri, None).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json(), json!({"NationalPark is incorrect!": null}));
    Ok(())
}

#[tokio::test]
async fn list_parks_nests_visitors() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    let park = create_park(&app, "Yellowstone", "WY").await?;
    assert_eq!(park["user_visited_park"], json!([]));
    create_visit(&app, &user["id"], &park["id"], "2024-06-01").await?;

    let parks = send(&app, "GET", "/national_parks", None).await?.json();
    assert_eq!(parks[0]["name"], "Yellowstone");
    assert_eq!(parks[0]["state"], "WY");
    let visits = parks[0]["user_visited_park"].as_array().expect("visits");
    assert_eq!(visits[0]["user"]["username"], "alice");
    assert!(visits[0].get("national_park").is_none());
    Ok(())
}

#[tokio::test]
async fn visit_requires_existing_user_and_park() -> Result<()> {
    let (_td, app) = test_app().await?;
    let user = create_user(&app, "alice").await?;
    let park = create_park(&app, "Yellowstone", "WY").await?;

    let reply = send(&app, "POST", "/user_visited_parks", Some(json!({"user_id": 999, "park_id": park["id"]}))).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json(), json!({"User not found!": null}));

    let reply = send(&app, "POST", "/user_visited_parks", Some(json!({"user_id": user["id"], "park_id": 999}))).await?;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json(), json!({"NationalPark is incorrect!": null}));

    let visit = create_visit(&app, &user["id"], &park["id"], "July 4th").await?;
    assert_eq!(visit["date_of_visit"], "July 4th");
    assert_eq!(visit["user"]["username"], "alice");
    assert_eq!(visit["national_park"]["name"], "Yellowstone");
    Ok(())
}
