//! everkeep server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! two-tier local record store, wires the submission pipeline against the
//! configured remote collaborators, and serves the JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use everkeep_api::{AppState, ServerConfig, router};
use everkeep_pipeline::{
  SubmissionPipeline,
  blob::HttpBlobStore,
  document::HttpDocumentStore,
  notify::{Dispatcher, HttpTemplateTransport},
};
use everkeep_store::{MemoryTier, SqliteTier, TieredStore};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "everkeep memorial server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("EVERKEEP"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Open the local record store. A durable tier that cannot be opened is
  // a degraded mode, not a startup failure: the session tier still
  // accepts records.
  let store_path = expand_tilde(&server_cfg.store_path);
  let primary = match SqliteTier::open(&store_path).await {
    Ok(tier) => Some(tier),
    Err(e) => {
      tracing::warn!(
        error = %e,
        path = ?store_path,
        "durable tier unavailable; records will only last the session"
      );
      None
    }
  };
  let store = TieredStore::new(primary, MemoryTier::new());

  // Wire the submission pipeline.
  let client = reqwest::Client::new();
  let transport = server_cfg.notify.clone().map(|credentials| {
    HttpTemplateTransport::new(
      client.clone(),
      HttpTemplateTransport::DEFAULT_ENDPOINT,
      credentials,
    )
  });
  if transport.is_none() {
    tracing::info!(
      "templated transport not configured; notifications will compose \
       drafts for {}",
      server_cfg.operator_email
    );
  }
  let pipeline = SubmissionPipeline::new(
    HttpBlobStore::new(client.clone(), server_cfg.photo_bucket_url.clone()),
    HttpDocumentStore::new(client, server_cfg.submissions_url.clone()),
    Dispatcher::new(transport, server_cfg.operator_email.clone()),
  );

  // Build application state.
  let state = AppState {
    store:     Arc::new(store),
    submitter: Arc::new(pipeline),
    config:    Arc::new(server_cfg.clone()),
  };

  let app = router(state).layer(TraceLayer::new_for_http());
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
