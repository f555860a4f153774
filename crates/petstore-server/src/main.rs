//! petstore server binary.
//!
//! Loads settings from `config.toml` (or `--config`) layered under
//! `PETSTORE_*` environment variables, opens the SQLite store and serves the
//! JSON API until Ctrl-C. In-flight requests are allowed to finish.
//!
//! `--hash-password` prints an argon2 PHC string for `auth_password_hash`:
//!
//! ```
//! cargo run -p petstore-server -- --hash-password
//! ```

use std::{
  io::{self, BufRead, Write},
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use argon2::PasswordHash;
use clap::Parser;
use petstore_api::password::hash_password;
use petstore_server::{AppState, ServerConfig, auth::AuthConfig};
use petstore_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Pet store inventory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  if cli.hash_password {
    let password = prompt("Password: ")?;
    let phc = hash_password(&password).map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?;
    println!("{phc}");
    return Ok(());
  }

  let cfg = load_config(&cli.config)?;
  PasswordHash::new(&cfg.auth_password_hash)
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("auth_password_hash is not an argon2 PHC string")?;

  let store_path = expand_tilde(&cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(path = %store_path.display(), "opened store");

  let app = petstore_server::router(AppState {
    store: Arc::new(store),
    auth:  Arc::new(AuthConfig {
      username:      cfg.auth_username,
      password_hash: cfg.auth_password_hash,
    }),
  });

  let address = format!("{}:{}", cfg.host, cfg.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("listening on http://{address}");

  let shutdown = CancellationToken::new();
  tokio::spawn(cancel_on_ctrl_c(shutdown.clone()));

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown.cancelled_owned())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "petstore.db")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("PETSTORE"))
    .build()
    .with_context(|| format!("failed to read config from {path:?}"))?
    .try_deserialize()
    .context("invalid server configuration")
}

async fn cancel_on_ctrl_c(shutdown: CancellationToken) {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "cannot listen for ctrl-c; shutting down");
  } else {
    tracing::info!("ctrl-c received; draining connections");
  }
  shutdown.cancel();
}

fn prompt(label: &str) -> anyhow::Result<String> {
  print!("{label}");
  io::stdout().flush()?;
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_owned())
}

/// Expand a leading `~/` to `$HOME`.
fn expand_tilde(path: &Path) -> PathBuf {
  match (path.strip_prefix("~"), std::env::var_os("HOME")) {
    (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
    _ => path.to_path_buf(),
  }
}
