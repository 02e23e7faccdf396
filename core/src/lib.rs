//! Client side of the item store: API client core and presentation shell.
//!
//! # Overview
//! `ItemClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). A `Transport`
//! performs the round-trip; `UreqTransport` is the blocking default.
//!
//! `Shell` sits on top: it caches the collection locally, translates user
//! actions into client calls and keeps a health probe running on a fixed
//! schedule for as long as it lives.
//!
//! # Design
//! - `ItemClient` is stateless; it holds only `base_url`.
//! - DTOs are defined independently from the server crate; the integration
//!   test catches schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod poller;
pub mod shell;
pub mod transport;
pub mod types;

pub use client::ItemClient;
pub use error::{ApiError, ShellError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use poller::HealthPoller;
pub use shell::{DeleteOutcome, HealthView, Notice, Shell, ViewState, HEALTH_POLL_PERIOD};
pub use transport::{Transport, UreqTransport};
pub use types::{HealthStatus, Item, ItemList, NewItem};
