//! Folding flat join rows back into [`Pet`] aggregates.
//!
//! The read query yields one row per (pet, tag) pair with the pet and
//! category columns repeated. Pets without tags still yield one row, with
//! the tag columns NULL, because both read paths left-join the tag tables.

use petstore_core::pet::{Category, Id, Pet, Tag};

use crate::encode::decode_photo_urls;

/// Shared `SELECT ... FROM` for every pet read. Callers append a `WHERE`
/// clause; [`PET_ORDER`] must follow it so rows arrive grouped by pet.
pub const PET_SELECT: &str = "
  SELECT p.id, p.name, p.photo_urls, p.status,
         c.id, c.name,
         t.id, t.name
  FROM pets p
  JOIN categories c     ON c.id = p.category_id
  LEFT JOIN pet_tags pt ON pt.pet_id = p.id
  LEFT JOIN tags t      ON t.id = pt.tag_id";

pub const PET_ORDER: &str = "ORDER BY p.id, pt.position";

/// One denormalised row of [`PET_SELECT`].
#[derive(Debug, Clone)]
pub struct PetRow {
  pub pet_id:        Id,
  pub pet_name:      String,
  pub photo_urls:    String,
  pub status:        String,
  pub category_id:   Id,
  pub category_name: String,
  pub tag_id:        Option<Id>,
  pub tag_name:      Option<String>,
}

impl PetRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pet_id:        row.get(0)?,
      pet_name:      row.get(1)?,
      photo_urls:    row.get(2)?,
      status:        row.get(3)?,
      category_id:   row.get(4)?,
      category_name: row.get(5)?,
      tag_id:        row.get(6)?,
      tag_name:      row.get(7)?,
    })
  }

  fn tag(&self) -> Option<Tag> {
    match (self.tag_id, &self.tag_name) {
      (Some(id), Some(name)) => Some(Tag { id, name: name.clone() }),
      _ => None,
    }
  }

  fn into_pet(self) -> Pet {
    let tags = self.tag().into_iter().collect();
    Pet {
      id: self.pet_id,
      name: self.pet_name,
      category: Category { id: self.category_id, name: self.category_name },
      photo_urls: decode_photo_urls(&self.photo_urls),
      tags,
      status: self.status,
    }
  }
}

/// Group consecutive rows by pet id, preserving row order.
///
/// Rows must be ordered by pet id; a pet id that reappears after a different
/// one starts a second, separate aggregate. Tags are appended per row, not
/// de-duplicated by name.
pub fn aggregate<I>(rows: I) -> Vec<Pet>
where
  I: IntoIterator<Item = PetRow>,
{
  let mut pets = Vec::new();
  let mut current: Option<Pet> = None;

  for row in rows {
    if let Some(pet) = current.as_mut().filter(|p| p.id == row.pet_id) {
      pet.tags.extend(row.tag());
      continue;
    }
    if let Some(done) = current.replace(row.into_pet()) {
      pets.push(done);
    }
  }

  pets.extend(current);
  pets
}

#[cfg(test)]
mod tests {
  use super::*;

  fn row(pet_id: Id, tag: Option<(Id, &str)>) -> PetRow {
    PetRow {
      pet_id,
      pet_name: format!("pet-{pet_id}"),
      photo_urls: "http://img/1.png, http://img/2.png".into(),
      status: "available".into(),
      category_id: 1,
      category_name: "dogs".into(),
      tag_id: tag.map(|(id, _)| id),
      tag_name: tag.map(|(_, name)| name.to_owned()),
    }
  }

  #[test]
  fn empty_input_yields_no_pets() {
    assert!(aggregate(Vec::new()).is_empty());
  }

  #[test]
  fn groups_consecutive_rows_by_pet() {
    let pets = aggregate(vec![
      row(1, Some((10, "friendly"))),
      row(1, Some((11, "small"))),
      row(2, Some((10, "friendly"))),
      row(3, Some((12, "loud"))),
      row(3, Some((10, "friendly"))),
    ]);

    assert_eq!(pets.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(pets[0].tag_names().collect::<Vec<_>>(), vec!["friendly", "small"]);
    assert_eq!(pets[1].tag_names().collect::<Vec<_>>(), vec!["friendly"]);
    assert_eq!(pets[2].tag_names().collect::<Vec<_>>(), vec!["loud", "friendly"]);
  }

  #[test]
  fn tagless_pet_is_kept_with_no_tags() {
    let pets = aggregate(vec![row(1, None), row(2, Some((10, "friendly")))]);
    assert_eq!(pets.len(), 2);
    assert!(pets[0].tags.is_empty());
    assert_eq!(pets[0].category, Category { id: 1, name: "dogs".into() });
  }

  #[test]
  fn photo_urls_stay_one_element_per_pet() {
    let pets = aggregate(vec![row(1, Some((10, "a"))), row(1, Some((11, "b")))]);
    assert_eq!(pets[0].photo_urls, vec!["http://img/1.png, http://img/2.png".to_owned()]);
  }

  #[test]
  fn duplicate_tag_rows_are_not_merged() {
    let pets = aggregate(vec![row(1, Some((10, "a"))), row(1, Some((10, "a")))]);
    assert_eq!(pets[0].tags.len(), 2);
  }
}
