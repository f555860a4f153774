//! Handlers for category and tag reference data.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/categories` | All categories |
//! | `POST` | `/categories` | Body: `{"name":"dogs"}`; 409 on duplicate |
//! | `GET`  | `/tags` | All tags ever attached |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use petstore_core::{
  pet::{Category, Tag},
  store::InventoryStore,
};

use crate::{error::{ApiError, store_error}, pets::NameRef};

/// `GET /categories`
pub async fn list_categories<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Category>>, ApiError>
where
  S: InventoryStore,
{
  let categories = store.list_categories().await.map_err(store_error)?;
  Ok(Json(categories))
}

/// `POST /categories` — body: `{"name":"dogs"}`
pub async fn create_category<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NameRef>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InventoryStore,
{
  let category = store.add_category(body.name).await.map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /tags`
pub async fn list_tags<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Tag>>, ApiError>
where
  S: InventoryStore,
{
  let tags = store.list_tags().await.map_err(store_error)?;
  Ok(Json(tags))
}
