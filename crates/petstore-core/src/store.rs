//! The `InventoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `petstore-store-sqlite`).
//! Higher layers (`petstore-api`, `petstore-server`) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::{
  order::{NewOrder, Order},
  pet::{Category, Id, NewPet, Pet, PetPatch, Tag},
  user::{NewUser, User, UserPatch},
};

/// Abstraction over an inventory store backend.
///
/// Every pet write (item row plus its tag associations) is a single unit of
/// work: it either lands completely or not at all.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait InventoryStore: Send + Sync {
  /// Backend error. Converts into the shared taxonomy so callers can classify
  /// failures without knowing the backend.
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  // ── Reference data ────────────────────────────────────────────────────

  /// Create a category. Names are unique.
  fn add_category(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn list_tags(&self) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  // ── Pets — writes ─────────────────────────────────────────────────────

  /// Insert a pet and associate its tags, creating any that do not exist.
  /// The category must already exist. Returns the new pet's id.
  fn add_pet(&self, pet: NewPet) -> impl Future<Output = Result<Id, Self::Error>> + Send + '_;

  /// Apply a partial update. Supplied tags replace the association set
  /// exactly; absent or empty tags leave it untouched.
  fn update_pet(
    &self,
    patch: PetPatch,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Update only `name` and/or `status`. Empty strings are "not supplied";
  /// if both are empty the call fails without touching the store.
  fn update_pet_form(
    &self,
    id: Id,
    name: String,
    status: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Pets — reads ──────────────────────────────────────────────────────

  /// Fetch one pet. A missing id is an error, not an empty result.
  fn get_pet(&self, id: Id) -> impl Future<Output = Result<Pet, Self::Error>> + Send + '_;

  /// All pets whose status is one of `statuses`, ordered by id. `statuses`
  /// must be non-empty; no matches is an empty list.
  fn find_pets_by_status(
    &self,
    statuses: Vec<String>,
  ) -> impl Future<Output = Result<Vec<Pet>, Self::Error>> + Send + '_;

  // ── Orders ────────────────────────────────────────────────────────────

  fn place_order(
    &self,
    order: NewOrder,
  ) -> impl Future<Output = Result<Order, Self::Error>> + Send + '_;

  fn get_order(&self, id: Id) -> impl Future<Output = Result<Order, Self::Error>> + Send + '_;

  /// Delete an order. Deleting a missing id is an error.
  fn delete_order(&self, id: Id) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Register an account. A taken username, email or phone is a conflict.
  fn create_user(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    username: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Apply a partial update and return the account as stored.
  fn update_user(
    &self,
    username: String,
    patch: UserPatch,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;
}
