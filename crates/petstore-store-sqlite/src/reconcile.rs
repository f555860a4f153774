//! Keeping a pet's tag associations equal to a desired list of names.
//!
//! Tags are shared reference rows. Concurrent writers may race to create the
//! same name, so creation is "insert, and on a uniqueness conflict look the
//! existing row up" rather than check-then-insert.

use std::collections::HashSet;

use petstore_core::pet::{Id, Tag};
use rusqlite::{Connection, OptionalExtension as _};
use tracing::debug;

use crate::{unit_of_work::UnitOfWork, Error, Result};

/// Return the id of the tag called `name`, creating it if absent.
///
/// Idempotent: repeated calls, or calls racing another writer, yield the same
/// id.
pub fn find_or_create_tag(conn: &Connection, name: &str) -> Result<Id> {
  let created: Option<Id> = conn
    .query_row(
      "INSERT INTO tags (name) VALUES (?1)
       ON CONFLICT (name) DO NOTHING
       RETURNING id",
      rusqlite::params![name],
      |r| r.get(0),
    )
    .optional()?;

  if let Some(id) = created {
    debug!(tag = name, id, "created tag");
    return Ok(id);
  }

  Ok(conn.query_row(
    "SELECT id FROM tags WHERE name = ?1",
    rusqlite::params![name],
    |r| r.get(0),
  )?)
}

/// Associate `names` with `pet_id`, creating missing tags. Repeated names are
/// associated once, at their first position.
pub fn attach_tags(uow: &UnitOfWork<'_>, pet_id: Id, names: &[String]) -> Result<Vec<Tag>> {
  let mut seen = HashSet::new();
  let mut attached = Vec::with_capacity(names.len());

  for name in names {
    if name.is_empty() {
      return Err(Error::Invalid("tag name must not be empty".to_owned()));
    }
    if !seen.insert(name.as_str()) {
      continue;
    }

    let tag_id = find_or_create_tag(uow.conn()?, name)?;
    uow.conn()?.execute(
      "INSERT INTO pet_tags (pet_id, tag_id, position) VALUES (?1, ?2, ?3)",
      rusqlite::params![pet_id, tag_id, attached.len() as i64],
    )?;
    attached.push(Tag { id: tag_id, name: name.clone() });
  }

  Ok(attached)
}

/// Replace every association of `pet_id` with exactly `names`.
///
/// Removed and added tags are not tracked separately; all associations are
/// dropped and the desired set re-attached. Tag rows left unreferenced are
/// kept.
pub fn replace_tags(uow: &UnitOfWork<'_>, pet_id: Id, names: &[String]) -> Result<Vec<Tag>> {
  let removed = uow
    .conn()?
    .execute("DELETE FROM pet_tags WHERE pet_id = ?1", rusqlite::params![pet_id])?;
  debug!(pet_id, removed, desired = names.len(), "replacing tag associations");
  attach_tags(uow, pet_id, names)
}
