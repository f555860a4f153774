//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Photo URLs are stored as one
//! delimiter-joined column.

use chrono::{DateTime, Utc};
use petstore_core::{order::Order, pet::Id, user::User};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Photo URLs ──────────────────────────────────────────────────────────────

/// Separator used when joining photo URLs into a single column. A URL that
/// itself contains this sequence cannot be told apart from two URLs.
pub const PHOTO_URL_DELIMITER: &str = ", ";

/// Join photo URLs into the stored column value.
pub fn encode_photo_urls(urls: &[String]) -> String { urls.join(PHOTO_URL_DELIMITER) }

/// Read the stored column back.
///
/// The joined text is kept as one opaque element rather than split on the
/// delimiter, so reads never invent URL boundaries the writer did not mean.
/// An empty column reads as no URLs.
pub fn decode_photo_urls(stored: &str) -> Vec<String> {
  if stored.is_empty() {
    Vec::new()
  } else {
    vec![stored.to_owned()]
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `orders` row.
pub struct RawOrder {
  pub id:        Id,
  pub pet_id:    Id,
  pub quantity:  i64,
  pub ship_date: String,
  pub status:    String,
  pub complete:  bool,
}

impl RawOrder {
  pub const COLUMNS: &'static str = "id, pet_id, quantity, ship_date, status, complete";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      pet_id:    row.get(1)?,
      quantity:  row.get(2)?,
      ship_date: row.get(3)?,
      status:    row.get(4)?,
      complete:  row.get(5)?,
    })
  }

  pub fn into_order(self) -> Result<Order> {
    Ok(Order {
      id:        self.id,
      pet_id:    self.pet_id,
      quantity:  self.quantity,
      ship_date: decode_dt(&self.ship_date)?,
      status:    self.status,
      complete:  self.complete,
    })
  }
}

/// Column list matching [`user_from_row`].
pub const USER_COLUMNS: &str =
  "id, username, first_name, last_name, email, phone, password_hash, user_status";

pub fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
  Ok(User {
    id:            row.get(0)?,
    username:      row.get(1)?,
    first_name:    row.get(2)?,
    last_name:     row.get(3)?,
    email:         row.get(4)?,
    phone:         row.get(5)?,
    password_hash: row.get(6)?,
    user_status:   row.get(7)?,
  })
}

/// Optional unique text is stored as NULL when empty.
pub fn non_empty(value: Option<String>) -> Option<String> { value.filter(|v| !v.is_empty()) }
