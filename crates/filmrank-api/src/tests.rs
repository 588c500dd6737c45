//! Router tests driven with `tower::ServiceExt::oneshot` over a `MemoryStore`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use filmrank_core::{RelationshipService, memory::MemoryStore};
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

fn router() -> Router {
  api_router(Arc::new(RelationshipService::new(Arc::new(MemoryStore::new()))))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

async fn create_user(app: &Router, login: &str) -> i64 {
  let (status, user) = call(
    app,
    "POST",
    "/users",
    Some(json!({ "email": format!("{login}@example.com"), "login": login, "birthday": "1990-01-01" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  user["id"].as_i64().unwrap()
}

async fn create_film(app: &Router, name: &str) -> i64 {
  let (status, film) = call(
    app,
    "POST",
    "/films",
    Some(json!({ "name": name, "release_date": "2000-01-01", "duration": 100, "mpa": "PG-13" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  film["id"].as_i64().unwrap()
}

// ── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn user_name_defaults_to_login() {
  let app = router();
  let id = create_user(&app, "neo").await;

  let (status, user) = call(&app, "GET", &format!("/users/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(user["name"], "neo");
  assert_eq!(user["friends"], json!([]));
}

#[tokio::test]
async fn invalid_user_is_bad_request() {
  let app = router();
  let (status, body) = call(
    &app,
    "POST",
    "/users",
    Some(json!({ "email": "nope", "login": "x", "birthday": "1990-01-01" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn missing_user_is_404() {
  let app = router();
  let (status, body) = call(&app, "GET", "/users/42", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());

  let (status, _) = call(&app, "DELETE", "/users/42", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Friendship ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn request_accept_and_remove() {
  let app = router();
  let a = create_user(&app, "a").await;
  let b = create_user(&app, "b").await;

  let (status, body) = call(&app, "PUT", &format!("/users/{a}/friends/{b}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "status": "pending" }));

  let (status, _) = call(&app, "PUT", &format!("/users/{a}/friends/{b}"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, user) = call(&app, "POST", &format!("/users/{b}/friends/{a}/accept"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(user["friends"], json!([a]));
  assert_eq!(user["incoming_requests"], json!([]));

  let (_, friends) = call(&app, "GET", &format!("/users/{a}/friends"), None).await;
  assert_eq!(friends.as_array().unwrap().len(), 1);
  assert_eq!(friends[0]["id"], b);

  let (status, _) = call(&app, "DELETE", &format!("/users/{a}/friends/{b}"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(&app, "DELETE", &format!("/users/{a}/friends/{b}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crossing_requests_report_mutual() {
  let app = router();
  let a = create_user(&app, "a").await;
  let b = create_user(&app, "b").await;

  call(&app, "PUT", &format!("/users/{a}/friends/{b}"), None).await;
  let (_, body) = call(&app, "PUT", &format!("/users/{b}/friends/{a}"), None).await;
  assert_eq!(body, json!({ "status": "mutual" }));

  let (status, _) = call(&app, "PUT", &format!("/users/{a}/friends/{a}"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn common_friends_route() {
  let app = router();
  let a = create_user(&app, "a").await;
  let b = create_user(&app, "b").await;
  let c = create_user(&app, "c").await;
  for x in [a, b] {
    call(&app, "PUT", &format!("/users/{x}/friends/{c}"), None).await;
    call(&app, "POST", &format!("/users/{c}/friends/{x}/accept"), None).await;
  }

  let (status, common) = call(&app, "GET", &format!("/users/{a}/friends/common/{b}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(common.as_array().unwrap().len(), 1);
  assert_eq!(common[0]["id"], c);
}

// ── Films and likes ─────────────────────────────────────────────────────────

#[tokio::test]
async fn likes_drive_popularity() {
  let app = router();
  let u1 = create_user(&app, "u1").await;
  let u2 = create_user(&app, "u2").await;
  let f1 = create_film(&app, "One").await;
  let f2 = create_film(&app, "Two").await;

  for (film, user) in [(f2, u1), (f2, u2), (f1, u1), (f2, u2)] {
    let (status, _) = call(&app, "PUT", &format!("/films/{film}/like/{user}"), None).await;
    assert_eq!(status, StatusCode::OK);
  }

  let (_, film) = call(&app, "GET", &format!("/films/{f2}"), None).await;
  assert_eq!(film["likes"], json!([u1, u2]));
  assert_eq!(film["mpa"], "PG-13");

  let (_, top) = call(&app, "GET", "/films/popular?count=1", None).await;
  assert_eq!(top.as_array().unwrap().len(), 1);
  assert_eq!(top[0]["id"], f2);

  let (_, all) = call(&app, "GET", "/films/popular", None).await;
  assert_eq!(all.as_array().unwrap().len(), 2);

  let (status, film) = call(&app, "DELETE", &format!("/films/{f1}/like/{u1}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(film["likes"], json!([]));
}

#[tokio::test]
async fn like_by_unknown_user_is_404() {
  let app = router();
  let f = create_film(&app, "Solo").await;
  let (status, _) = call(&app, "PUT", &format!("/films/{f}/like/99"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn film_before_cinema_is_rejected() {
  let app = router();
  let (status, _) = call(
    &app,
    "POST",
    "/films",
    Some(json!({ "name": "Prehistory", "release_date": "1895-12-27", "duration": 1 })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

