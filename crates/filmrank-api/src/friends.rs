//! Handlers for `/users/:id/friends` endpoints.
//!
//! `:id` is always the acting user. Requests and acceptances are directional;
//! removal severs both directions.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use filmrank_core::{
  RelationshipService,
  friendship::RequestOutcome,
  store::{EdgeStore, EntityStore},
  user::{User, UserId},
};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct RequestResponse {
  pub status: RequestOutcome,
}

/// `PUT /users/:id/friends/:other`: `:id` asks `:other` to be friends.
pub async fn request<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path((id, other)): Path<(UserId, UserId)>,
) -> Result<Json<RequestResponse>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  let mut sender = service.user(id).await?;
  let mut recipient = service.user(other).await?;
  let status = service.send_request(&mut sender, &mut recipient).await?;
  Ok(Json(RequestResponse { status }))
}

/// `POST /users/:id/friends/:other/accept`: `:id` accepts the request sent
/// by `:other`. Responds with the refreshed `:id`.
pub async fn accept<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path((id, other)): Path<(UserId, UserId)>,
) -> Result<Json<User>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  let mut accepter = service.user(id).await?;
  let mut requester = service.user(other).await?;
  service.accept_request(&mut accepter, &mut requester).await?;
  Ok(Json(accepter))
}

/// `DELETE /users/:id/friends/:other`
pub async fn remove<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path((id, other)): Path<(UserId, UserId)>,
) -> Result<StatusCode, ApiError>
where
  S: EntityStore + EdgeStore,
{
  let mut user = service.user(id).await?;
  let mut friend = service.user(other).await?;
  service.remove_friend(&mut user, &mut friend).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/:id/friends`
pub async fn list<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path(id): Path<UserId>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  Ok(Json(service.list_friends(id).await?))
}

/// `GET /users/:id/friends/common/:other`
pub async fn common<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path((id, other)): Path<(UserId, UserId)>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  Ok(Json(service.list_common_friends(id, other).await?))
}
