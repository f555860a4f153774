//! Handlers for `/pet` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/pet` | Body: [`PetBody`]; returns 201 + stored pet |
//! | `PUT`  | `/pet` | Body: [`PetPatchBody`]; partial update, returns stored pet |
//! | `GET`  | `/pet/findByStatus` | `?status=available&status=sold` (repeatable, commas also split; required) |
//! | `GET`  | `/pet/{id}` | 404 if not found |
//! | `POST` | `/pet/{id}` | Form fields `name`, `status`; 204 |

use std::sync::Arc;

use axum::{
  Form, Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use petstore_core::{
  pet::{Id, NewPet, Pet, PetPatch},
  store::InventoryStore,
};
use serde::Deserialize;

use crate::{error::{ApiError, store_error}, positive_id};

/// `{"name": "..."}` — categories and tags are referenced by name.
#[derive(Debug, Deserialize)]
pub struct NameRef {
  pub name: String,
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /pet`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetBody {
  pub name:       String,
  pub category:   NameRef,
  #[serde(default)]
  pub photo_urls: Vec<String>,
  #[serde(default)]
  pub tags:       Vec<NameRef>,
  #[serde(default)]
  pub status:     String,
}

impl From<PetBody> for NewPet {
  fn from(b: PetBody) -> Self {
    NewPet {
      name:       b.name,
      category:   b.category.name,
      status:     b.status,
      photo_urls: b.photo_urls,
      tags:       b.tags.into_iter().map(|t| t.name).collect(),
    }
  }
}

/// `POST /pet` — returns 201 + the stored [`Pet`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<PetBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InventoryStore,
{
  let id = store.add_pet(NewPet::from(body)).await.map_err(store_error)?;
  let pet = store.get_pet(id).await.map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(pet)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /pet`. Every field except `id` is optional.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetPatchBody {
  pub id:         Id,
  pub name:       Option<String>,
  pub category:   Option<NameRef>,
  pub status:     Option<String>,
  pub photo_urls: Option<Vec<String>>,
  pub tags:       Option<Vec<NameRef>>,
}

impl From<PetPatchBody> for PetPatch {
  fn from(b: PetPatchBody) -> Self {
    PetPatch {
      id:         b.id,
      name:       b.name,
      category:   b.category.map(|c| c.name),
      status:     b.status,
      photo_urls: b.photo_urls,
      tags:       b.tags.map(|tags| tags.into_iter().map(|t| t.name).collect()),
    }
  }
}

/// `PUT /pet` — returns the pet as stored after the update.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<PetPatchBody>,
) -> Result<Json<Pet>, ApiError>
where
  S: InventoryStore,
{
  let id = positive_id(body.id)?;
  store.update_pet(PetPatch::from(body)).await.map_err(store_error)?;
  let pet = store.get_pet(id).await.map_err(store_error)?;
  Ok(Json(pet))
}

// ─── Find by status ───────────────────────────────────────────────────────────

/// Every `status` value in the query string. Repeated keys and
/// comma-separated lists may be mixed; blanks are dropped.
pub fn statuses(query: Vec<(String, String)>) -> Vec<String> {
  query
    .into_iter()
    .filter(|(key, _)| key == "status")
    .flat_map(|(_, value)| {
      value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect::<Vec<_>>()
    })
    .collect()
}

/// `GET /pet/findByStatus?status=<s1>&status=<s2>` (or `status=<s1>,<s2>`)
pub async fn find_by_status<S>(
  State(store): State<Arc<S>>,
  Query(query): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Pet>>, ApiError>
where
  S: InventoryStore,
{
  let statuses = statuses(query);
  if statuses.is_empty() {
    return Err(ApiError::BadRequest("status parameter is required".to_owned()));
  }

  let pets = store.find_pets_by_status(statuses).await.map_err(store_error)?;
  Ok(Json(pets))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /pet/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Pet>, ApiError>
where
  S: InventoryStore,
{
  let pet = store.get_pet(positive_id(id)?).await.map_err(store_error)?;
  Ok(Json(pet))
}

// ─── Form update ──────────────────────────────────────────────────────────────

/// Form fields accepted by `POST /pet/{id}`.
#[derive(Debug, Deserialize)]
pub struct FormBody {
  #[serde(default)]
  pub name:   String,
  #[serde(default)]
  pub status: String,
}

/// `POST /pet/{id}` — update name and/or status from form data.
pub async fn update_form<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
  Form(body): Form<FormBody>,
) -> Result<StatusCode, ApiError>
where
  S: InventoryStore,
{
  store
    .update_pet_form(positive_id(id)?, body.name, body.status)
    .await
    .map_err(store_error)?;
  Ok(StatusCode::NO_CONTENT)
}
