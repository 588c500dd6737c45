//! Handlers for `/users` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `GET`    | `/users`      | Every user with its relation sets |
//! | `POST`   | `/users`      | Body: `{"email","login","name"?,"birthday"}` |
//! | `GET`    | `/users/:id`  | 404 if not found |
//! | `PUT`    | `/users/:id`  | Replaces the profile fields |
//! | `DELETE` | `/users/:id`  | 204; edges are left in place |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use filmrank_core::{
  RelationshipService,
  store::{EdgeStore, EntityStore},
  user::{NewUser, User, UserId},
};

use crate::error::ApiError;

/// `GET /users`
pub async fn list<S>(
  State(service): State<Arc<RelationshipService<S>>>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  Ok(Json(service.users().await?))
}

/// `POST /users`
pub async fn create<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Json(body): Json<NewUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EntityStore + EdgeStore,
{
  let user = service.create_user(body).await?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/:id`
pub async fn get_one<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  Ok(Json(service.user(id).await?))
}

/// `PUT /users/:id`
pub async fn update<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path(id): Path<UserId>,
  Json(body): Json<NewUser>,
) -> Result<Json<User>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  Ok(Json(service.update_user(id, body).await?))
}

/// `DELETE /users/:id`
pub async fn delete<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path(id): Path<UserId>,
) -> Result<StatusCode, ApiError>
where
  S: EntityStore + EdgeStore,
{
  service.delete_user(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
