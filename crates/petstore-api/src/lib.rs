//! JSON REST API for the pet store.
//!
//! Exposes an axum [`Router`] backed by any
//! [`petstore_core::store::InventoryStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", petstore_api::api_router(store.clone()))
//! ```

pub mod catalog;
pub mod error;
pub mod orders;
pub mod password;
pub mod pets;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use petstore_core::{pet::Id, store::InventoryStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: InventoryStore + 'static,
{
  Router::new()
    // Pets
    .route("/pet", post(pets::create::<S>).put(pets::update::<S>))
    .route("/pet/findByStatus", get(pets::find_by_status::<S>))
    .route("/pet/{id}", get(pets::get_one::<S>).post(pets::update_form::<S>))
    // Orders
    .route("/store/order", post(orders::create::<S>))
    .route("/store/order/{id}", get(orders::get_one::<S>).delete(orders::delete_one::<S>))
    // Reference data
    .route("/categories", get(catalog::list_categories::<S>).post(catalog::create_category::<S>))
    .route("/tags", get(catalog::list_tags::<S>))
    // Accounts
    .route("/user/findByEmail", get(users::find_by_email::<S>))
    .route("/user/{username}", get(users::get_one::<S>).put(users::update::<S>))
    .with_state(store)
}

/// Routes that must stay reachable without credentials: account sign-up.
pub fn registration_router<S>(store: Arc<S>) -> Router<()>
where
  S: InventoryStore + 'static,
{
  Router::new()
    .route("/user", post(users::create::<S>))
    .with_state(store)
}

/// Reject non-positive identifiers before they reach the store.
pub(crate) fn positive_id(id: Id) -> Result<Id, ApiError> {
  if id <= 0 {
    return Err(ApiError::BadRequest(format!("invalid id: {id}")));
  }
  Ok(id)
}
