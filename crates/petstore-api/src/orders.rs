//! Handlers for `/store/order` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/store/order` | Body: [`OrderBody`]; returns 201 + stored order |
//! | `GET`    | `/store/order/{id}` | 404 if not found |
//! | `DELETE` | `/store/order/{id}` | 204, or 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use petstore_core::{
  order::{NewOrder, Order},
  pet::Id,
  store::InventoryStore,
};
use serde::Deserialize;

use crate::{error::{ApiError, store_error}, positive_id};

/// JSON body accepted by `POST /store/order`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
  pub pet_id:    Id,
  pub quantity:  i64,
  pub ship_date: Option<DateTime<Utc>>,
  pub status:    Option<String>,
  #[serde(default)]
  pub complete:  bool,
}

impl From<OrderBody> for NewOrder {
  fn from(b: OrderBody) -> Self {
    let mut order = NewOrder::new(b.pet_id, b.quantity);
    order.ship_date = b.ship_date;
    order.complete = b.complete;
    if let Some(status) = b.status {
      order.status = status;
    }
    order
  }
}

/// `POST /store/order`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<OrderBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: InventoryStore,
{
  let order = store
    .place_order(NewOrder::from(body))
    .await
    .map_err(store_error)?;
  Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /store/order/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<Json<Order>, ApiError>
where
  S: InventoryStore,
{
  let order = store.get_order(positive_id(id)?).await.map_err(store_error)?;
  Ok(Json(order))
}

/// `DELETE /store/order/{id}`
pub async fn delete_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Id>,
) -> Result<StatusCode, ApiError>
where
  S: InventoryStore,
{
  store.delete_order(positive_id(id)?).await.map_err(store_error)?;
  Ok(StatusCode::NO_CONTENT)
}
