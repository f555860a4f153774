//! Pet aggregate: the catalog item with its category and tags.
//!
//! A [`Pet`] is never stored as a single row. It is written as an item row, a
//! foreign key to a pre-existing category, and a set of tag associations, and
//! reassembled on read from a flat join.

use serde::{Deserialize, Serialize};

/// Database identifier for pets, categories, tags and orders.
pub type Id = i64;

// ─── Reference data ──────────────────────────────────────────────────────────

/// Long-lived reference data. Names are unique; pets refer to categories by
/// name and a category must exist before a pet can use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub id:   Id,
  pub name: String,
}

/// A unique tag name. Tags are created on demand when a pet is written and
/// are never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub id:   Id,
  pub name: String,
}

// ─── Aggregate ───────────────────────────────────────────────────────────────

/// The hierarchical read model: item → one category, item → many tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
  pub id:         Id,
  pub name:       String,
  pub category:   Category,
  /// Stored as a single delimited column; see the store's photo-url codec.
  pub photo_urls: Vec<String>,
  /// In association order. Empty for pets without tags.
  pub tags:       Vec<Tag>,
  /// Open string; the API only ever supplies `available | pending | sold`.
  pub status:     String,
}

impl Pet {
  /// Tag names in association order.
  pub fn tag_names(&self) -> impl Iterator<Item = &str> {
    self.tags.iter().map(|t| t.name.as_str())
  }
}

// ─── Write inputs ────────────────────────────────────────────────────────────

/// Input to [`InventoryStore::add_pet`](crate::store::InventoryStore::add_pet).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPet {
  pub name:       String,
  /// Name of an existing category.
  pub category:   String,
  pub status:     String,
  pub photo_urls: Vec<String>,
  /// Tag names; missing tags are created.
  pub tags:       Vec<String>,
}

impl NewPet {
  pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      category: category.into(),
      ..Self::default()
    }
  }

  pub fn with_status(mut self, status: impl Into<String>) -> Self {
    self.status = status.into();
    self
  }

  pub fn with_tags<I, T>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.tags = tags.into_iter().map(Into::into).collect();
    self
  }

  pub fn with_photo_urls<I, T>(mut self, urls: I) -> Self
  where
    I: IntoIterator<Item = T>,
    T: Into<String>,
  {
    self.photo_urls = urls.into_iter().map(Into::into).collect();
    self
  }
}

/// A partial update. Only supplied fields overwrite stored values.
///
/// An empty string or empty list counts as "not supplied", so a patch cannot
/// clear a field to empty. An empty tag list leaves the associations alone;
/// clearing all tags is not expressible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetPatch {
  pub id:         Id,
  pub name:       Option<String>,
  /// Name of an existing category.
  pub category:   Option<String>,
  pub status:     Option<String>,
  pub photo_urls: Option<Vec<String>>,
  pub tags:       Option<Vec<String>>,
}

impl PetPatch {
  pub fn new(id: Id) -> Self { Self { id, ..Self::default() } }

  /// Tag names to replace the associations with, if any were supplied.
  pub fn replacement_tags(&self) -> Option<&[String]> {
    self.tags.as_deref().filter(|t| !t.is_empty())
  }

  /// Category name, if a non-empty one was supplied.
  pub fn category_name(&self) -> Option<&str> {
    self.category.as_deref().filter(|c| !c.is_empty())
  }
}
