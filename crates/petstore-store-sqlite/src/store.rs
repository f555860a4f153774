//! [`SqliteStore`] — the SQLite implementation of [`InventoryStore`].

use std::{
  path::Path,
  sync::{Arc, Mutex, PoisonError},
};

use chrono::Utc;
use petstore_core::{
  order::{NewOrder, Order},
  pet::{Category, Id, NewPet, Pet, PetPatch, Tag},
  store::InventoryStore,
  user::{NewUser, User, UserPatch},
};
use rusqlite::{Connection, InterruptHandle, OptionalExtension as _};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::{
  aggregate::{aggregate, PetRow, PET_ORDER, PET_SELECT},
  encode::{encode_dt, encode_photo_urls, non_empty, user_from_row, RawOrder, USER_COLUMNS},
  reconcile::{attach_tags, replace_tags},
  schema::SCHEMA,
  statement::{placeholders, UpdateBuilder},
  unit_of_work::{self, checkpoint},
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An inventory store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  cancel:          CancellationToken,
  interrupt:       Arc<InterruptHandle>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let interrupt = conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(conn.get_interrupt_handle())
      })
      .await?;
    Ok(Self {
      conn,
      cancel: CancellationToken::new(),
      interrupt: Arc::new(interrupt),
    })
  }

  /// A handle on the same database whose operations abort with
  /// [`Error::Cancelled`] once `token` fires. A statement that is running at
  /// that moment is interrupted and any open unit of work is rolled back.
  pub fn with_cancellation(&self, token: CancellationToken) -> Self {
    Self {
      conn:      self.conn.clone(),
      cancel:    token,
      interrupt: Arc::clone(&self.interrupt),
    }
  }

  /// Run `f` on the connection thread with this handle's cancellation token.
  ///
  /// The connection is shared by every handle, so a fired token only
  /// interrupts the connection while `f` itself is on it.
  pub(crate) async fn run<T, F>(&self, f: F) -> Result<T>
  where
    F: FnOnce(&mut Connection, &CancellationToken) -> Result<T> + Send + 'static,
    T: Send + 'static,
  {
    checkpoint(&self.cancel)?;
    let cancel = self.cancel.clone();
    let running = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&running);

    let call = self.conn.call(move |conn| {
      set_running(&flag, true);
      let result = f(conn, &cancel);
      set_running(&flag, false);
      Ok(result)
    });
    tokio::pin!(call);

    let result = tokio::select! {
      result = &mut call => result,
      () = self.cancel.cancelled() => {
        {
          let running = running.lock().unwrap_or_else(PoisonError::into_inner);
          if *running {
            debug!("interrupting running statement");
            self.interrupt.interrupt();
          }
        }
        call.await
      }
    };

    match result? {
      Err(err) if err.is_interrupt() => Err(Error::Cancelled),
      other => other,
    }
  }
}

fn set_running(flag: &Mutex<bool>, value: bool) {
  *flag.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

// ─── Helpers (run on the connection thread) ──────────────────────────────────

/// Resolve a category name to its id. Categories are never created here.
fn lookup_category(conn: &Connection, name: &str) -> Result<Id> {
  if name.is_empty() {
    return Err(Error::CategoryNotFound(String::new()));
  }
  conn
    .query_row(
      "SELECT id FROM categories WHERE name = ?1",
      rusqlite::params![name],
      |r| r.get(0),
    )
    .optional()?
    .ok_or_else(|| Error::CategoryNotFound(name.to_owned()))
}

fn ensure_pet_exists(conn: &Connection, id: Id) -> Result<()> {
  conn
    .query_row("SELECT 1 FROM pets WHERE id = ?1", rusqlite::params![id], |_| Ok(()))
    .optional()?
    .ok_or(Error::PetNotFound(id))
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<User>> {
  Ok(
    conn
      .query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
        rusqlite::params![value],
        user_from_row,
      )
      .optional()?,
  )
}

fn query_pets<P: rusqlite::Params>(conn: &Connection, predicate: &str, params: P) -> Result<Vec<Pet>> {
  let sql = format!("{PET_SELECT} WHERE {predicate} {PET_ORDER}");
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params, PetRow::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(aggregate(rows))
}

// ─── InventoryStore impl ─────────────────────────────────────────────────────

impl InventoryStore for SqliteStore {
  type Error = Error;

  // ── Reference data ────────────────────────────────────────────────────────

  async fn add_category(&self, name: String) -> Result<Category> {
    if name.is_empty() {
      return Err(Error::Invalid("category name must not be empty".to_owned()));
    }

    self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        let id = conn.query_row(
          "INSERT INTO categories (name) VALUES (?1) RETURNING id",
          rusqlite::params![name],
          |r| r.get(0),
        )?;
        Ok(Category { id, name })
      })
      .await
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    self
      .run(|conn, cancel| {
        checkpoint(cancel)?;
        let mut stmt = conn.prepare("SELECT id, name FROM categories ORDER BY id")?;
        let rows = stmt
          .query_map([], |r| Ok(Category { id: r.get(0)?, name: r.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  async fn list_tags(&self) -> Result<Vec<Tag>> {
    self
      .run(|conn, cancel| {
        checkpoint(cancel)?;
        let mut stmt = conn.prepare("SELECT id, name FROM tags ORDER BY id")?;
        let rows = stmt
          .query_map([], |r| Ok(Tag { id: r.get(0)?, name: r.get(1)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await
  }

  // ── Pets — writes ─────────────────────────────────────────────────────────

  async fn add_pet(&self, pet: NewPet) -> Result<Id> {
    let photo_urls = encode_photo_urls(&pet.photo_urls);

    self
      .run(move |conn, cancel| {
        unit_of_work::run(conn, cancel, |uow| {
          let category_id = lookup_category(uow.conn()?, &pet.category)?;

          let pet_id: Id = uow.conn()?.query_row(
            "INSERT INTO pets (category_id, name, photo_urls, status)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
            rusqlite::params![category_id, pet.name, photo_urls, pet.status],
            |r| r.get(0),
          )?;

          attach_tags(uow, pet_id, &pet.tags)?;
          Ok(pet_id)
        })
      })
      .await
  }

  async fn update_pet(&self, patch: PetPatch) -> Result<()> {
    let photo_urls = patch
      .photo_urls
      .as_deref()
      .filter(|urls| !urls.is_empty())
      .map(encode_photo_urls);

    self
      .run(move |conn, cancel| {
        unit_of_work::run(conn, cancel, |uow| {
          let category_id = patch
            .category_name()
            .map(|name| lookup_category(uow.conn()?, name))
            .transpose()?;

          let update = UpdateBuilder::new("pets")
            .set_text("name", patch.name.as_deref())
            .set_id("category_id", category_id)
            .set_text("status", patch.status.as_deref())
            .set_text("photo_urls", photo_urls.as_deref())
            .build("id", patch.id);

          match update {
            Some(stmt) => {
              let changed = uow
                .conn()?
                .execute(&stmt.sql, rusqlite::params_from_iter(stmt.args))?;
              if changed == 0 {
                return Err(Error::PetNotFound(patch.id));
              }
            }
            None => ensure_pet_exists(uow.conn()?, patch.id)?,
          }

          if let Some(tags) = patch.replacement_tags() {
            replace_tags(uow, patch.id, tags)?;
          }
          Ok(())
        })
      })
      .await
  }

  async fn update_pet_form(&self, id: Id, name: String, status: String) -> Result<()> {
    let update = UpdateBuilder::new("pets")
      .set_text("name", Some(name.as_str()))
      .set_text("status", Some(status.as_str()))
      .build("id", id)
      .ok_or(Error::NothingToUpdate)?;

    self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        let changed = conn.execute(&update.sql, rusqlite::params_from_iter(update.args))?;
        if changed == 0 {
          return Err(Error::PetNotFound(id));
        }
        Ok(())
      })
      .await
  }

  // ── Pets — reads ──────────────────────────────────────────────────────────

  async fn get_pet(&self, id: Id) -> Result<Pet> {
    self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        query_pets(conn, "p.id = ?1", rusqlite::params![id])?
          .into_iter()
          .next()
          .ok_or(Error::PetNotFound(id))
      })
      .await
  }

  async fn find_pets_by_status(&self, statuses: Vec<String>) -> Result<Vec<Pet>> {
    if statuses.is_empty() {
      return Err(Error::Invalid("at least one status is required".to_owned()));
    }

    self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        let predicate = format!("p.status IN ({})", placeholders(1, statuses.len()));
        query_pets(conn, &predicate, rusqlite::params_from_iter(statuses.iter()))
      })
      .await
  }

  // ── Orders ────────────────────────────────────────────────────────────────

  async fn place_order(&self, order: NewOrder) -> Result<Order> {
    if order.quantity <= 0 {
      return Err(Error::Invalid(format!(
        "order quantity must be positive, got {}",
        order.quantity
      )));
    }
    let ship_date = order.ship_date.unwrap_or_else(Utc::now);
    let ship_date_str = encode_dt(ship_date);

    self
      .run(move |conn, cancel| {
        unit_of_work::run(conn, cancel, |uow| {
          ensure_pet_exists(uow.conn()?, order.pet_id)?;

          let id: Id = uow.conn()?.query_row(
            "INSERT INTO orders (pet_id, quantity, ship_date, status, complete)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id",
            rusqlite::params![
              order.pet_id,
              order.quantity,
              ship_date_str,
              order.status,
              order.complete,
            ],
            |r| r.get(0),
          )?;

          Ok(Order {
            id,
            pet_id: order.pet_id,
            quantity: order.quantity,
            ship_date,
            status: order.status,
            complete: order.complete,
          })
        })
      })
      .await
  }

  async fn get_order(&self, id: Id) -> Result<Order> {
    let raw: RawOrder = self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        conn
          .query_row(
            &format!("SELECT {} FROM orders WHERE id = ?1", RawOrder::COLUMNS),
            rusqlite::params![id],
            RawOrder::from_row,
          )
          .optional()?
          .ok_or(Error::OrderNotFound(id))
      })
      .await?;

    raw.into_order()
  }

  async fn delete_order(&self, id: Id) -> Result<()> {
    self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        let deleted = conn.execute("DELETE FROM orders WHERE id = ?1", rusqlite::params![id])?;
        if deleted == 0 {
          return Err(Error::OrderNotFound(id));
        }
        Ok(())
      })
      .await
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, user: NewUser) -> Result<User> {
    if user.username.is_empty() {
      return Err(Error::Invalid("username must not be empty".to_owned()));
    }
    if user.password_hash.is_empty() {
      return Err(Error::Invalid("password must not be empty".to_owned()));
    }

    self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        let created = conn.query_row(
          &format!(
            "INSERT INTO users
               (username, first_name, last_name, email, phone, password_hash, user_status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {USER_COLUMNS}"
          ),
          rusqlite::params![
            user.username,
            user.first_name,
            user.last_name,
            non_empty(user.email),
            non_empty(user.phone),
            user.password_hash,
            user.user_status,
          ],
          user_from_row,
        )?;
        debug!(username = %created.username, id = created.id, "created user");
        Ok(created)
      })
      .await
  }

  async fn get_user(&self, username: String) -> Result<User> {
    self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        query_user(conn, "username", &username)?.ok_or(Error::UserNotFound(username))
      })
      .await
  }

  async fn get_user_by_email(&self, email: String) -> Result<User> {
    self
      .run(move |conn, cancel| {
        checkpoint(cancel)?;
        query_user(conn, "email", &email)?.ok_or(Error::UserNotFound(email))
      })
      .await
  }

  async fn update_user(&self, username: String, patch: UserPatch) -> Result<User> {
    let update = UpdateBuilder::new("users")
      .set_text("first_name", patch.first_name.as_deref())
      .set_text("last_name", patch.last_name.as_deref())
      .set_text("email", patch.email.as_deref())
      .set_text("phone", patch.phone.as_deref())
      .set_text("password_hash", patch.password_hash.as_deref())
      .set_int("user_status", patch.user_status)
      .build("username", username.clone());

    self
      .run(move |conn, cancel| {
        unit_of_work::run(conn, cancel, |uow| {
          if let Some(stmt) = &update {
            uow
              .conn()?
              .execute(&stmt.sql, rusqlite::params_from_iter(stmt.args.iter()))?;
          }
          query_user(uow.conn()?, "username", &username)?
            .ok_or_else(|| Error::UserNotFound(username.clone()))
        })
      })
      .await
  }
}
