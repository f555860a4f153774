//! Handlers for `/user` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/user` | Body: [`UserBody`]; returns 201 + account; 409 on taken username/email/phone |
//! | `GET`  | `/user/findByEmail` | `?email=...` |
//! | `GET`  | `/user/{username}` | 404 if not found |
//! | `PUT`  | `/user/{username}` | Body: [`UserPatchBody`]; partial update, returns account |
//!
//! Passwords are hashed here and never echoed back.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use petstore_core::{
  store::InventoryStore,
  user::{NewUser, User, UserPatch},
};
use serde::Deserialize;

use crate::{
  error::{ApiError, store_error},
  password::hash_password,
};

fn hash(password: &str) -> Result<String, ApiError> {
  hash_password(password).map_err(|e| {
    ApiError::Store(petstore_core::Error::Internal(format!("argon2 error: {e}").into()))
  })
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /user`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
  pub username:    String,
  pub password:    String,
  #[serde(default)]
  pub first_name:  String,
  #[serde(default)]
  pub last_name:   String,
  pub email:       Option<String>,
  pub phone:       Option<String>,
  #[serde(default)]
  pub user_status: i64,
}

/// `POST /user`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<UserBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InventoryStore,
{
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password must not be empty".to_owned()));
  }

  let user = NewUser {
    username:      body.username,
    first_name:    body.first_name,
    last_name:     body.last_name,
    email:         body.email,
    phone:         body.phone,
    password_hash: hash(&body.password)?,
    user_status:   body.user_status,
  };
  let created = store.create_user(user).await.map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /user/{username}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(username): Path<String>,
) -> Result<Json<User>, ApiError>
where
  S: InventoryStore,
{
  let user = store.get_user(username).await.map_err(store_error)?;
  Ok(Json(user))
}

#[derive(Debug, Deserialize)]
pub struct EmailParams {
  pub email: String,
}

/// `GET /user/findByEmail?email=...`
pub async fn find_by_email<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<EmailParams>,
) -> Result<Json<User>, ApiError>
where
  S: InventoryStore,
{
  if params.email.is_empty() {
    return Err(ApiError::BadRequest("email parameter is required".to_owned()));
  }
  let user = store.get_user_by_email(params.email).await.map_err(store_error)?;
  Ok(Json(user))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /user/{username}`. Every field is optional; the
/// username comes from the path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatchBody {
  pub first_name:  Option<String>,
  pub last_name:   Option<String>,
  pub email:       Option<String>,
  pub phone:       Option<String>,
  pub password:    Option<String>,
  pub user_status: Option<i64>,
}

/// `PUT /user/{username}`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(username): Path<String>,
  Json(body): Json<UserPatchBody>,
) -> Result<Json<User>, ApiError>
where
  S: InventoryStore,
{
  let password_hash = match body.password.as_deref() {
    Some(p) if !p.is_empty() => Some(hash(p)?),
    _ => None,
  };

  let patch = UserPatch {
    first_name: body.first_name,
    last_name: body.last_name,
    email: body.email,
    phone: body.phone,
    password_hash,
    user_status: body.user_status,
  };
  let user = store.update_user(username, patch).await.map_err(store_error)?;
  Ok(Json(user))
}
