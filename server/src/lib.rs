//! HTTP service owning the in-memory item collection.
//!
//! # Overview
//! Exposes create/list/delete over a small REST-shaped JSON contract plus a
//! health probe and a human-readable index page. All state lives in one
//! `ItemStore` that is reset to its seed records on every start.
//!
//! # Design
//! - The store is a single owned value behind `Arc<RwLock<_>>`, handed to
//!   handlers as axum state. Reads share the lock; create and delete hold the
//!   write lock for the whole mutation.
//! - Every failure is an `ApiError`, rendered as a JSON envelope. Unknown
//!   paths and known paths with the wrong method both fall through to the
//!   same "route not found" envelope.

pub mod config;
pub mod error;
pub mod store;

use std::{future::Future, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::Html,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

pub use config::Config;
pub use error::ApiError;
pub use store::{IdStrategy, Item, ItemStore, StoreError};

pub type Db = Arc<RwLock<ItemStore>>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub timestamp: String,
    pub total_items: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ItemList {
    pub success: bool,
    pub data: Vec<Item>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub success: bool,
    pub message: String,
    pub data: Item,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Confirmation {
    pub success: bool,
    pub message: String,
}

/// Create payload. Fields are optional here so that their absence is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreateItem {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Full application: routes, CORS for the configured front-end and request
/// tracing, over a freshly seeded store.
pub fn app(config: &Config) -> anyhow::Result<Router> {
    let db: Db = Arc::new(RwLock::new(ItemStore::seeded(config.id_strategy)));
    let cors = config.cors_layer()?;

    Ok(router(db).layer(cors).layer(TraceLayer::new_for_http()))
}

/// Bare routes over an existing store.
pub fn router(db: Db) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/data", get(list_items).post(create_item))
        .route("/api/data/{id}", delete(delete_item))
        .fallback(route_not_found)
        .method_not_allowed_fallback(route_not_found)
        .with_state(db)
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn run(listener: TcpListener, config: &Config) -> anyhow::Result<()> {
    serve(listener, app(config)?, shutdown_signal()).await
}

pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}

/// Parse an id the way a lenient integer parser would: optional leading
/// whitespace and `+`, then ASCII digits; anything after them is ignored.
/// `None` never matches a record.
pub fn parse_id(raw: &str) -> Option<u64> {
    let raw = raw.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let digits = raw
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(raw, |(end, _)| &raw[..end]);
    digits.parse().ok()
}

async fn health(State(db): State<Db>) -> Json<HealthResponse> {
    let total_items = db.read().await.len();
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Backend API is running".to_string(),
        timestamp: store::iso_timestamp(&Utc::now()),
        total_items,
    })
}

async fn list_items(State(db): State<Db>) -> Json<ItemList> {
    let store = db.read().await;
    Json(ItemList {
        success: true,
        data: store.list().to_vec(),
        count: store.len(),
    })
}

async fn create_item(
    State(db): State<Db>,
    payload: Result<Json<CreateItem>, JsonRejection>,
) -> Result<(StatusCode, Json<Created>), ApiError> {
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => {
            debug!(%rejection, "unreadable create payload");
            CreateItem::default()
        }
    };

    let item = db
        .write()
        .await
        .create(input.name, input.description)
        .inspect_err(|e| debug!("create rejected: {e}"))?;
    info!(id = item.id, "item created");

    Ok((
        StatusCode::CREATED,
        Json(Created {
            success: true,
            message: "Item added successfully".to_string(),
            data: item,
        }),
    ))
}

async fn delete_item(
    State(db): State<Db>,
    Path(raw_id): Path<String>,
) -> Result<Json<Confirmation>, ApiError> {
    let id = parse_id(&raw_id).ok_or_else(|| {
        debug!(%raw_id, "delete with non-numeric id");
        ApiError::NotFound
    })?;

    db.write()
        .await
        .delete(id)
        .inspect_err(|e| debug!("delete rejected: {e}"))?;
    info!(id, "item deleted");

    Ok(Json(Confirmation {
        success: true,
        message: "Item deleted successfully".to_string(),
    }))
}

async fn route_not_found(method: Method, uri: axum::http::Uri) -> ApiError {
    debug!(%method, %uri, "no route");
    ApiError::RouteNotFound
}

async fn index(headers: HeaderMap) -> Html<String> {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    Html(index_page(host))
}

fn index_page(host: &str) -> String {
    format!(
        r#"<html>
  <head>
    <title>Item Store API</title>
    <style>
      body {{ font-family: Arial, sans-serif; margin: 40px; }}
      .container {{ max-width: 800px; margin: 0 auto; }}
      .api-list {{ background: #f5f5f5; padding: 20px; border-radius: 5px; }}
      code {{ background: #e0e0e0; padding: 2px 5px; border-radius: 3px; }}
    </style>
  </head>
  <body>
    <div class="container">
      <h1>Item Store API</h1>
      <p>Backend API is running.</p>
      <div class="api-list">
        <h3>Available endpoints:</h3>
        <ul>
          <li><code>GET /api/health</code> - API status</li>
          <li><code>GET /api/data</code> - List all items</li>
          <li><code>POST /api/data</code> - Add an item</li>
          <li><code>DELETE /api/data/:id</code> - Delete an item</li>
        </ul>
        <h3>Example:</h3>
        <pre>curl -X GET http://{host}/api/data</pre>
      </div>
    </div>
  </body>
</html>
"#
    )
}
