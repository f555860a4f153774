//! Integration tests for `SqliteStore` against an in-memory database.

use std::{
  collections::BTreeSet,
  time::{Duration, Instant},
};

use petstore_core::{
  ErrorKind,
  order::NewOrder,
  pet::{NewPet, Pet, PetPatch},
  store::InventoryStore,
  user::{NewUser, UserPatch},
};
use tokio_util::sync::CancellationToken;

use crate::{Error, SqliteStore, unit_of_work};

async fn store() -> SqliteStore {
  let s = SqliteStore::open_in_memory()
    .await
    .expect("in-memory store");
  s.add_category("dogs".into()).await.unwrap();
  s.add_category("cats".into()).await.unwrap();
  s
}

fn rex() -> NewPet {
  NewPet::new("Rex", "dogs")
    .with_status("available")
    .with_photo_urls(["http://img/rex.png"])
    .with_tags(["A", "B"])
}

fn tag_set(pet: &Pet) -> BTreeSet<&str> { pet.tag_names().collect() }

fn kind(err: Error) -> ErrorKind { petstore_core::Error::from(err).kind() }

async fn count(s: &SqliteStore, table: &'static str) -> i64 {
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
    })
    .await
    .unwrap()
}

// ─── Categories ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_category_is_conflict() {
  let s = store().await;
  let err = s.add_category("dogs".into()).await.unwrap_err();
  assert_eq!(kind(err), ErrorKind::Conflict);
}

#[tokio::test]
async fn list_categories_in_id_order() {
  let s = store().await;
  let names: Vec<_> = s
    .list_categories()
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.name)
    .collect();
  assert_eq!(names, vec!["dogs", "cats"]);
}

// ─── Add / find ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_then_get_roundtrips_tags() {
  let s = store().await;
  let id = s.add_pet(rex()).await.unwrap();

  let pet = s.get_pet(id).await.unwrap();
  assert_eq!(pet.name, "Rex");
  assert_eq!(pet.category.name, "dogs");
  assert_eq!(pet.status, "available");
  assert_eq!(pet.photo_urls, vec!["http://img/rex.png"]);
  assert_eq!(tag_set(&pet), BTreeSet::from(["A", "B"]));
}

#[tokio::test]
async fn add_with_unknown_category_fails() {
  let s = store().await;
  let err = s.add_pet(NewPet::new("Nemo", "fish")).await.unwrap_err();
  assert!(matches!(err, Error::CategoryNotFound(ref c) if c == "fish"));
  assert_eq!(count(&s, "pets").await, 0);
}

#[tokio::test]
async fn add_with_empty_category_fails() {
  let s = store().await;
  let err = s.add_pet(NewPet::new("Nobody", "")).await.unwrap_err();
  assert_eq!(kind(err), ErrorKind::NotFound);
}

#[tokio::test]
async fn pet_without_tags_is_readable() {
  let s = store().await;
  let id = s
    .add_pet(NewPet::new("Tom", "cats").with_status("pending"))
    .await
    .unwrap();

  let pet = s.get_pet(id).await.unwrap();
  assert!(pet.tags.is_empty());
  assert!(pet.photo_urls.is_empty());

  let pending = s.find_pets_by_status(vec!["pending".into()]).await.unwrap();
  assert_eq!(pending.len(), 1);
  assert_eq!(pending[0].id, id);
}

#[tokio::test]
async fn shared_tag_is_created_once() {
  let s = store().await;
  let a = s
    .add_pet(NewPet::new("Rex", "dogs").with_tags(["friendly"]))
    .await
    .unwrap();
  let b = s
    .add_pet(NewPet::new("Tom", "cats").with_tags(["friendly"]))
    .await
    .unwrap();

  let tags = s.list_tags().await.unwrap();
  assert_eq!(tags.len(), 1);
  assert_eq!(tags[0].name, "friendly");

  let pa = s.get_pet(a).await.unwrap();
  let pb = s.get_pet(b).await.unwrap();
  assert_eq!(pa.tags, pb.tags);
}

#[tokio::test]
async fn missing_pet_is_not_found() {
  let s = store().await;
  let err = s.get_pet(999).await.unwrap_err();
  assert!(matches!(err, Error::PetNotFound(999)));
  assert_eq!(kind(err), ErrorKind::NotFound);
}

#[tokio::test]
async fn no_status_match_is_empty_not_error() {
  let s = store().await;
  s.add_pet(rex()).await.unwrap();
  let found = s
    .find_pets_by_status(vec!["discontinued".into()])
    .await
    .unwrap();
  assert!(found.is_empty());
}

#[tokio::test]
async fn find_by_several_statuses_groups_per_pet() {
  let s = store().await;
  let a = s.add_pet(rex()).await.unwrap();
  let b = s
    .add_pet(NewPet::new("Tom", "cats").with_status("sold").with_tags(["C", "D", "E"]))
    .await
    .unwrap();
  s.add_pet(NewPet::new("Kit", "cats").with_status("pending"))
    .await
    .unwrap();

  let found = s
    .find_pets_by_status(vec!["available".into(), "sold".into()])
    .await
    .unwrap();

  assert_eq!(found.iter().map(|p| p.id).collect::<Vec<_>>(), vec![a, b]);
  assert_eq!(found[1].tag_names().collect::<Vec<_>>(), vec!["C", "D", "E"]);
}

#[tokio::test]
async fn find_by_status_requires_a_status() {
  let s = store().await;
  let err = s.find_pets_by_status(vec![]).await.unwrap_err();
  assert_eq!(kind(err), ErrorKind::BadRequest);
}

// ─── Partial update ──────────────────────────────────────────────────────────

#[tokio::test]
async fn status_only_update_preserves_everything_else() {
  let s = store().await;
  let id = s.add_pet(rex()).await.unwrap();
  let before = s.get_pet(id).await.unwrap();

  let mut patch = PetPatch::new(id);
  patch.status = Some("sold".into());
  s.update_pet(patch).await.unwrap();

  let after = s.get_pet(id).await.unwrap();
  assert_eq!(after.status, "sold");
  assert_eq!(after.name, before.name);
  assert_eq!(after.category, before.category);
  assert_eq!(after.photo_urls, before.photo_urls);
  assert_eq!(after.tags, before.tags);
}

#[tokio::test]
async fn empty_strings_do_not_clear_fields() {
  let s = store().await;
  let id = s.add_pet(rex()).await.unwrap();

  let mut patch = PetPatch::new(id);
  patch.name = Some(String::new());
  patch.category = Some(String::new());
  patch.photo_urls = Some(vec![]);
  patch.tags = Some(vec![]);
  s.update_pet(patch).await.unwrap();

  let pet = s.get_pet(id).await.unwrap();
  assert_eq!(pet.name, "Rex");
  assert_eq!(pet.category.name, "dogs");
  assert_eq!(pet.photo_urls, vec!["http://img/rex.png"]);
  assert_eq!(tag_set(&pet), BTreeSet::from(["A", "B"]));
}

#[tokio::test]
async fn update_moves_category_by_name() {
  let s = store().await;
  let id = s.add_pet(rex()).await.unwrap();

  let mut patch = PetPatch::new(id);
  patch.category = Some("cats".into());
  s.update_pet(patch).await.unwrap();

  assert_eq!(s.get_pet(id).await.unwrap().category.name, "cats");
}

#[tokio::test]
async fn update_with_unknown_category_changes_nothing() {
  let s = store().await;
  let id = s.add_pet(rex()).await.unwrap();

  let mut patch = PetPatch::new(id);
  patch.name = Some("Renamed".into());
  patch.category = Some("fish".into());
  let err = s.update_pet(patch).await.unwrap_err();
  assert!(matches!(err, Error::CategoryNotFound(_)));

  assert_eq!(s.get_pet(id).await.unwrap().name, "Rex");
}

#[tokio::test]
async fn update_missing_pet_is_not_found() {
  let s = store().await;

  let mut patch = PetPatch::new(42);
  patch.status = Some("sold".into());
  assert!(matches!(s.update_pet(patch).await, Err(Error::PetNotFound(42))));

  let mut patch = PetPatch::new(42);
  patch.tags = Some(vec!["A".into()]);
  assert!(matches!(s.update_pet(patch).await, Err(Error::PetNotFound(42))));
}

// ─── Tag replacement ─────────────────────────────────────────────────────────

#[tokio::test]
async fn tag_replace_is_exact() {
  let s = store().await;
  let id = s.add_pet(rex()).await.unwrap();

  let mut patch = PetPatch::new(id);
  patch.tags = Some(vec!["B".into(), "C".into()]);
  s.update_pet(patch).await.unwrap();

  let pet = s.get_pet(id).await.unwrap();
  assert_eq!(pet.tag_names().collect::<Vec<_>>(), vec!["B", "C"]);
  assert_eq!(count(&s, "pet_tags").await, 2);
  // "A" is kept as reference data.
  assert_eq!(count(&s, "tags").await, 3);
}

#[tokio::test]
async fn repeated_tag_names_associate_once() {
  let s = store().await;
  let id = s
    .add_pet(NewPet::new("Rex", "dogs").with_tags(["A", "A", "B"]))
    .await
    .unwrap();
  let pet = s.get_pet(id).await.unwrap();
  assert_eq!(pet.tag_names().collect::<Vec<_>>(), vec!["A", "B"]);
}

// ─── Form update ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn form_update_requires_a_field() {
  let s = store().await;
  let err = s
    .update_pet_form(5, String::new(), String::new())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NothingToUpdate));
  assert_eq!(kind(err), ErrorKind::BadRequest);
}

#[tokio::test]
async fn form_update_touches_only_name_and_status() {
  let s = store().await;
  let id = s.add_pet(rex()).await.unwrap();

  s.update_pet_form(id, "Max".into(), String::new())
    .await
    .unwrap();
  let pet = s.get_pet(id).await.unwrap();
  assert_eq!(pet.name, "Max");
  assert_eq!(pet.status, "available");
  assert_eq!(tag_set(&pet), BTreeSet::from(["A", "B"]));

  s.update_pet_form(id, String::new(), "pending".into())
    .await
    .unwrap();
  let pet = s.get_pet(id).await.unwrap();
  assert_eq!(pet.name, "Max");
  assert_eq!(pet.status, "pending");
}

#[tokio::test]
async fn form_update_missing_pet_is_not_found() {
  let s = store().await;
  let err = s
    .update_pet_form(77, "Ghost".into(), String::new())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PetNotFound(77)));
}

// ─── Atomicity ───────────────────────────────────────────────────────────────

/// Make any association with the tag named `cursed` fail.
async fn poison_tag(s: &SqliteStore) {
  s.conn
    .call(|conn| {
      conn.execute_batch(
        "CREATE TRIGGER poison_cursed BEFORE INSERT ON pet_tags
         WHEN NEW.tag_id = (SELECT id FROM tags WHERE name = 'cursed')
         BEGIN SELECT RAISE(ABORT, 'association refused'); END;",
      )?;
      Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn failed_association_leaves_no_pet_behind() {
  let s = store().await;
  poison_tag(&s).await;

  let result = s
    .add_pet(NewPet::new("Rex", "dogs").with_status("available").with_tags(["friendly", "cursed"]))
    .await;
  assert!(result.is_err());

  // AUTOINCREMENT ids start at 1; the attempted pet would have been id 1.
  assert!(matches!(s.get_pet(1).await, Err(Error::PetNotFound(1))));
  assert!(s.find_pets_by_status(vec!["available".into()]).await.unwrap().is_empty());
  assert_eq!(count(&s, "pets").await, 0);
  assert_eq!(count(&s, "pet_tags").await, 0);
  assert_eq!(count(&s, "tags").await, 0);
}

#[tokio::test]
async fn failed_tag_replace_keeps_previous_state() {
  let s = store().await;
  let id = s.add_pet(rex()).await.unwrap();
  poison_tag(&s).await;

  let mut patch = PetPatch::new(id);
  patch.status = Some("sold".into());
  patch.tags = Some(vec!["C".into(), "cursed".into()]);
  assert!(s.update_pet(patch).await.is_err());

  let pet = s.get_pet(id).await.unwrap();
  assert_eq!(pet.status, "available");
  assert_eq!(tag_set(&pet), BTreeSet::from(["A", "B"]));
}

// ─── Cancellation ────────────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_handle_fails_without_writing() {
  let s = store().await;
  let token = CancellationToken::new();
  let handle = s.with_cancellation(token.clone());
  token.cancel();

  let err = handle.add_pet(rex()).await.unwrap_err();
  assert!(matches!(err, Error::Cancelled));
  assert_eq!(kind(err), ErrorKind::Cancelled);
  assert_eq!(count(&s, "pets").await, 0);

  // The original handle is unaffected.
  s.add_pet(rex()).await.unwrap();
}

/// Counts to a hundred million; takes several seconds to run to completion.
const SLOW_COUNT: &str = "
  WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 100000000)
  SELECT COUNT(*) FROM n";

#[tokio::test]
async fn cancelling_interrupts_a_running_statement() {
  let s = store().await;
  let token = CancellationToken::new();
  let handle = s.with_cancellation(token.clone());

  let canceller = tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(50)).await;
    token.cancel();
  });

  let started = Instant::now();
  let result = handle
    .run(|conn, cancel| {
      unit_of_work::run(conn, cancel, |uow| {
        uow.conn()?.execute("INSERT INTO categories (name) VALUES ('birds')", [])?;
        let n: i64 = uow.conn()?.query_row(SLOW_COUNT, [], |r| r.get(0))?;
        Ok(n)
      })
    })
    .await;
  canceller.await.unwrap();

  assert!(matches!(result, Err(Error::Cancelled)), "got {result:?}");
  assert!(started.elapsed() < Duration::from_secs(5));
  // The insert before the interrupted statement was rolled back.
  assert_eq!(count(&s, "categories").await, 2);

  // The shared connection is still usable afterwards.
  s.add_pet(rex()).await.unwrap();
}

#[tokio::test]
async fn cancelling_a_queued_handle_leaves_running_work_alone() {
  let s = store().await;

  // Occupies the connection thread for a while.
  let busy = s.clone();
  let running = tokio::spawn(async move {
    busy
      .run(|conn, _| {
        let sql = SLOW_COUNT.replace("100000000", "2000000");
        Ok(conn.query_row(&sql, [], |r| r.get::<_, i64>(0))?)
      })
      .await
  });
  tokio::time::sleep(Duration::from_millis(20)).await;

  let token = CancellationToken::new();
  let queued = s.with_cancellation(token.clone());
  let waiting = tokio::spawn(async move {
    queued
      .run(|conn, cancel| {
        unit_of_work::checkpoint(cancel)?;
        Ok(conn.query_row("SELECT 1", [], |r| r.get::<_, i64>(0))?)
      })
      .await
  });
  tokio::time::sleep(Duration::from_millis(50)).await;
  token.cancel();

  assert!(matches!(waiting.await.unwrap(), Err(Error::Cancelled)));
  assert_eq!(running.await.unwrap().unwrap(), 2_000_000);
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_user() {
  let s = store().await;
  let created = s
    .create_user(NewUser::new("ann", "$argon2id$hash").with_email("ann@example.com"))
    .await
    .unwrap();
  assert_eq!(created.username, "ann");
  assert_eq!(created.user_status, 0);

  let by_name = s.get_user("ann".into()).await.unwrap();
  assert_eq!(by_name, created);
  let by_email = s.get_user_by_email("ann@example.com".into()).await.unwrap();
  assert_eq!(by_email.id, created.id);
}

#[tokio::test]
async fn duplicate_username_or_email_is_conflict() {
  let s = store().await;
  s.create_user(NewUser::new("ann", "h").with_email("ann@example.com"))
    .await
    .unwrap();

  let err = s.create_user(NewUser::new("ann", "h")).await.unwrap_err();
  assert_eq!(kind(err), ErrorKind::Conflict);

  let err = s
    .create_user(NewUser::new("bob", "h").with_email("ann@example.com"))
    .await
    .unwrap_err();
  assert_eq!(kind(err), ErrorKind::Conflict);

  // Accounts without email or phone never collide with each other.
  s.create_user(NewUser::new("cid", "h")).await.unwrap();
  s.create_user(NewUser::new("dee", "h").with_email("")).await.unwrap();
  assert_eq!(count(&s, "users").await, 3);
}

#[tokio::test]
async fn missing_user_is_not_found() {
  let s = store().await;
  let err = s.get_user("ghost".into()).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(ref name) if name == "ghost"));
  assert_eq!(kind(err), ErrorKind::NotFound);

  let err = s
    .update_user("ghost".into(), UserPatch { first_name: Some("G".into()), ..Default::default() })
    .await
    .unwrap_err();
  assert_eq!(kind(err), ErrorKind::NotFound);
}

#[tokio::test]
async fn user_update_is_partial() {
  let s = store().await;
  let mut ann = NewUser::new("ann", "old-hash").with_email("ann@example.com");
  ann.first_name = "Ann".into();
  ann.user_status = 1;
  s.create_user(ann).await.unwrap();

  let updated = s
    .update_user(
      "ann".into(),
      UserPatch {
        last_name: Some("Lee".into()),
        email: Some(String::new()),
        password_hash: Some("new-hash".into()),
        user_status: Some(0),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(updated.first_name, "Ann");
  assert_eq!(updated.last_name, "Lee");
  assert_eq!(updated.email.as_deref(), Some("ann@example.com"));
  assert_eq!(updated.password_hash, "new-hash");
  assert_eq!(updated.user_status, 0);
}

#[tokio::test]
async fn user_update_into_taken_email_changes_nothing() {
  let s = store().await;
  s.create_user(NewUser::new("ann", "h").with_email("ann@example.com"))
    .await
    .unwrap();
  s.create_user(NewUser::new("bob", "h").with_email("bob@example.com"))
    .await
    .unwrap();

  let err = s
    .update_user(
      "bob".into(),
      UserPatch {
        first_name: Some("Bob".into()),
        email: Some("ann@example.com".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap_err();
  assert_eq!(kind(err), ErrorKind::Conflict);

  let bob = s.get_user("bob".into()).await.unwrap();
  assert_eq!(bob.first_name, "");
  assert_eq!(bob.email.as_deref(), Some("bob@example.com"));
}

// ─── Orders ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn place_get_delete_order() {
  let s = store().await;
  let pet_id = s.add_pet(rex()).await.unwrap();

  let placed = s.place_order(NewOrder::new(pet_id, 2)).await.unwrap();
  assert_eq!(placed.status, "placed");
  assert!(!placed.complete);

  let fetched = s.get_order(placed.id).await.unwrap();
  assert_eq!(fetched, placed);

  s.delete_order(placed.id).await.unwrap();
  assert!(matches!(s.get_order(placed.id).await, Err(Error::OrderNotFound(_))));
  assert!(matches!(s.delete_order(placed.id).await, Err(Error::OrderNotFound(_))));
}

#[tokio::test]
async fn order_for_missing_pet_is_not_found() {
  let s = store().await;
  let err = s.place_order(NewOrder::new(404, 1)).await.unwrap_err();
  assert!(matches!(err, Error::PetNotFound(404)));
}

#[tokio::test]
async fn order_quantity_must_be_positive() {
  let s = store().await;
  let pet_id = s.add_pet(rex()).await.unwrap();
  let err = s.place_order(NewOrder::new(pet_id, 0)).await.unwrap_err();
  assert_eq!(kind(err), ErrorKind::BadRequest);
}
