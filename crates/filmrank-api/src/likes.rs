//! Handlers for likes and the popularity ranking.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use filmrank_core::{
  RelationshipService,
  film::{Film, FilmId},
  store::{EdgeStore, EntityStore},
  user::UserId,
};
use serde::Deserialize;

use crate::error::ApiError;

/// Ranking length when `count` is not given.
pub const DEFAULT_POPULAR_COUNT: usize = 10;

/// `PUT /films/:id/like/:user`
pub async fn add<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path((id, user)): Path<(FilmId, UserId)>,
) -> Result<Json<Film>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  let mut film = service.film(id).await?;
  service.add_like(&mut film, user).await?;
  Ok(Json(film))
}

/// `DELETE /films/:id/like/:user`
pub async fn remove<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path((id, user)): Path<(FilmId, UserId)>,
) -> Result<Json<Film>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  let mut film = service.film(id).await?;
  service.remove_like(&mut film, user).await?;
  Ok(Json(film))
}

#[derive(Debug, Deserialize)]
pub struct PopularParams {
  pub count: Option<usize>,
}

/// `GET /films/popular[?count=N]`
pub async fn popular<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Query(params): Query<PopularParams>,
) -> Result<Json<Vec<Film>>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  let count = params.count.unwrap_or(DEFAULT_POPULAR_COUNT);
  Ok(Json(service.rank_by_popularity(count).await?))
}
