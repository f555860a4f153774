//! Store orders placed against pets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::pet::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id:        Id,
  pub pet_id:    Id,
  pub quantity:  i64,
  pub ship_date: DateTime<Utc>,
  /// Open string; typically `placed | approved | delivered`.
  pub status:    String,
  pub complete:  bool,
}

/// Input to [`InventoryStore::place_order`](crate::store::InventoryStore::place_order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub pet_id:    Id,
  pub quantity:  i64,
  /// Defaults to the time the order is stored.
  pub ship_date: Option<DateTime<Utc>>,
  pub status:    String,
  pub complete:  bool,
}

impl NewOrder {
  pub fn new(pet_id: Id, quantity: i64) -> Self {
    Self {
      pet_id,
      quantity,
      ship_date: None,
      status: "placed".to_owned(),
      complete: false,
    }
  }
}
