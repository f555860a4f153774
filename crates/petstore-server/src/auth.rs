//! HTTP Basic authentication for the API.
//!
//! Two kinds of principal are accepted: the operator account from config and
//! any registered user, checked against the argon2 hash stored on the account.

use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use petstore_api::password::verify_password;
use petstore_core::{ErrorKind, store::InventoryStore};

use crate::{AppState, error::Error};

/// The operator account configured for this server instance.
#[derive(Clone)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Username and password carried by a `Basic` authorization header.
#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
  pub username: String,
  pub password: String,
}

impl Credentials {
  /// `None` for a missing header, another scheme, or an undecodable payload.
  pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
      return None;
    }

    let decoded = String::from_utf8(B64.decode(encoded.trim()).ok()?).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(Self { username: username.to_owned(), password: password.to_owned() })
  }
}

fn check(password: &str, phc: &str) -> Result<(), Error> {
  if verify_password(password, phc) {
    Ok(())
  } else {
    Err(Error::Unauthorized)
  }
}

/// Accept `creds` if they match the operator, else a stored account.
pub async fn authenticate<S>(
  store: &S,
  operator: &AuthConfig,
  creds: &Credentials,
) -> Result<(), Error>
where
  S: InventoryStore,
{
  if creds.username == operator.username {
    return check(&creds.password, &operator.password_hash);
  }

  match store.get_user(creds.username.clone()).await {
    Ok(user) => check(&creds.password, &user.password_hash),
    Err(err) => {
      let err: petstore_core::Error = err.into();
      if err.kind() != ErrorKind::NotFound {
        tracing::warn!(error = %err, "account lookup failed during auth");
      }
      Err(Error::Unauthorized)
    }
  }
}

/// Middleware: reject the request with 401 unless it carries valid Basic
/// credentials.
pub async fn require_auth<S>(
  State(state): State<AppState<S>>,
  req: Request,
  next: Next,
) -> Result<Response, Error>
where
  S: InventoryStore + 'static,
{
  let Some(creds) = Credentials::from_headers(req.headers()) else {
    tracing::debug!(path = %req.uri().path(), "request without basic credentials");
    return Err(Error::Unauthorized);
  };

  if let Err(e) = authenticate(&*state.store, &state.auth, &creds).await {
    tracing::debug!(path = %req.uri().path(), username = %creds.username, "rejected credentials");
    return Err(e);
  }
  Ok(next.run(req).await)
}
