//! Customer accounts.
//!
//! Accounts are keyed by `username`. Passwords never reach this crate in
//! plain text; callers hash them first and hand over the PHC string.

use serde::{Deserialize, Serialize};

use crate::pet::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id:            Id,
  pub username:      String,
  pub first_name:    String,
  pub last_name:     String,
  /// Unique when present.
  pub email:         Option<String>,
  /// Unique when present.
  pub phone:         Option<String>,
  /// argon2 PHC string. Never serialised.
  #[serde(skip)]
  pub password_hash: String,
  pub user_status:   i64,
}

/// Input to [`InventoryStore::create_user`](crate::store::InventoryStore::create_user).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewUser {
  pub username:      String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub password_hash: String,
  pub user_status:   i64,
}

impl NewUser {
  pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      password_hash: password_hash.into(),
      ..Self::default()
    }
  }

  pub fn with_email(mut self, email: impl Into<String>) -> Self {
    self.email = Some(email.into());
    self
  }
}

/// Partial account update. `None` or an empty string leaves the field as is;
/// the username itself cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
  pub first_name:    Option<String>,
  pub last_name:     Option<String>,
  pub email:         Option<String>,
  pub phone:         Option<String>,
  pub password_hash: Option<String>,
  pub user_status:   Option<i64>,
}
