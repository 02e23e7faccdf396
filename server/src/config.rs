//! Process configuration, read once at start from flags or the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::store::IdStrategy;

/// In-memory item store served over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "item-server", version, about)]
pub struct Config {
    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Interface to bind.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Origin allowed to make cross-origin requests, or `*` for any.
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    pub frontend_url: String,

    /// How ids are assigned to created items.
    #[arg(long, env = "ID_STRATEGY", value_enum, default_value_t = IdStrategy::Length)]
    pub id_strategy: IdStrategy,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// The CORS origin as a header value.
    pub fn allowed_origin(&self) -> anyhow::Result<HeaderValue> {
        HeaderValue::from_str(&self.frontend_url)
            .map_err(|e| anyhow::anyhow!("invalid FRONTEND_URL {:?}: {e}", self.frontend_url))
    }

    /// Filter used when `RUST_LOG` is unset or unparsable.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "item_server=debug,tower_http=debug,info"
        } else {
            "info"
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.frontend_url == "*"
    }

    /// CORS for the front-end. Credentials are only allowed with an exact
    /// origin; `*` allows every origin without them.
    pub fn cors_layer(&self) -> anyhow::Result<CorsLayer> {
        let layer = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]);
        if self.allows_any_origin() {
            return Ok(layer.allow_origin(AllowOrigin::any()));
        }
        Ok(layer
            .allow_origin(self.allowed_origin()?)
            .allow_credentials(true))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            frontend_url: "http://localhost:3000".to_string(),
            id_strategy: IdStrategy::Length,
            verbose: false,
        }
    }
}
