//! Handlers for `/films` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `GET`    | `/films`      | Every film with its like set |
//! | `POST`   | `/films`      | Body: `{"name","description"?,"release_date","duration","mpa"?,"genres"?}` |
//! | `GET`    | `/films/:id`  | 404 if not found |
//! | `PUT`    | `/films/:id`  | Replaces the film fields |
//! | `DELETE` | `/films/:id`  | 204; likes are left in place |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use filmrank_core::{
  RelationshipService,
  film::{Film, FilmId, NewFilm},
  store::{EdgeStore, EntityStore},
};

use crate::error::ApiError;

/// `GET /films`
pub async fn list<S>(
  State(service): State<Arc<RelationshipService<S>>>,
) -> Result<Json<Vec<Film>>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  Ok(Json(service.films().await?))
}

/// `POST /films`
pub async fn create<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Json(body): Json<NewFilm>,
) -> Result<impl IntoResponse, ApiError>
where
  S: EntityStore + EdgeStore,
{
  let film = service.create_film(body).await?;
  Ok((StatusCode::CREATED, Json(film)))
}

/// `GET /films/:id`
pub async fn get_one<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path(id): Path<FilmId>,
) -> Result<Json<Film>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  Ok(Json(service.film(id).await?))
}

/// `PUT /films/:id`
pub async fn update<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path(id): Path<FilmId>,
  Json(body): Json<NewFilm>,
) -> Result<Json<Film>, ApiError>
where
  S: EntityStore + EdgeStore,
{
  Ok(Json(service.update_film(id, body).await?))
}

/// `DELETE /films/:id`
pub async fn delete<S>(
  State(service): State<Arc<RelationshipService<S>>>,
  Path(id): Path<FilmId>,
) -> Result<StatusCode, ApiError>
where
  S: EntityStore + EdgeStore,
{
  service.delete_film(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
