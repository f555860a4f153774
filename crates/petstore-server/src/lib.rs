//! HTTP server assembly for the pet store.
//!
//! Nests the [`petstore_api`] JSON router under `/api`, guards it with HTTP
//! Basic auth, and wraps everything in a request trace layer. Account sign-up
//! (`POST /api/user`) is the one route reachable without credentials.

pub mod auth;
pub mod error;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use petstore_core::store::InventoryStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AuthConfig, require_auth};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `PETSTORE_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state handed to the router and the auth middleware.
pub struct AppState<S: InventoryStore> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S: InventoryStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), auth: Arc::clone(&self.auth) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: InventoryStore + 'static,
{
  let guarded = petstore_api::api_router(Arc::clone(&state.store))
    .layer(middleware::from_fn_with_state(state.clone(), require_auth::<S>));
  let public = petstore_api::registration_router(state.store);

  Router::new()
    .nest("/api", guarded.merge(public))
    .layer(TraceLayer::new_for_http())
}
