//! Presentation-side state for a consumer of the item API.
//!
//! # Design
//! `Shell` keeps a locally cached copy of the collection and the last health
//! probe, and turns user actions into client calls. The cache is never
//! authoritative: it is replaced wholesale on refresh and patched on
//! successful create/delete, with no invalidation protocol beyond that.
//!
//! State lives behind one mutex that is never held across a request, so the
//! background health poller and foreground actions can interleave freely.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::client::ItemClient;
use crate::error::ShellError;
use crate::poller::HealthPoller;
use crate::transport::Transport;
use crate::types::{HealthStatus, Item, NewItem};

pub const HEALTH_POLL_PERIOD: Duration = Duration::from_secs(30);

/// Shown inline while the service is unreachable.
pub const CONNECTIVITY_BANNER: &str =
    "Failed to fetch data from the server. Make sure the backend is running.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum HealthView {
    /// No probe has completed yet.
    #[default]
    Checking,
    Connected(HealthStatus),
    Disconnected { checked_at: DateTime<Utc> },
}

impl HealthView {
    pub fn is_connected(&self) -> bool {
        matches!(self, HealthView::Connected(status) if status.is_ok())
    }
}

/// One-shot feedback for a user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub items: Vec<Item>,
    pub health: HealthView,
    /// Persistent until the next successful fetch.
    pub banner: Option<String>,
    pub form: NewItem,
    pub notice: Option<Notice>,
    /// Successful round-trips so far.
    pub api_calls: u64,
    /// Set from construction until the first list fetch settles, and during
    /// every refresh after that.
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
}

struct Inner<T> {
    client: ItemClient,
    transport: T,
    view: Mutex<ViewState>,
}

impl<T: Transport> Inner<T> {
    fn refresh_items(&self) -> Result<(), ShellError> {
        self.view.lock().loading = true;

        let result = self
            .transport
            .execute(self.client.build_list_items())
            .map_err(ShellError::from)
            .and_then(|response| Ok(self.client.parse_list_items(response)?));

        let mut view = self.view.lock();
        view.loading = false;
        match result {
            Ok(list) => {
                view.items = list.data;
                view.banner = None;
                view.api_calls += 1;
                Ok(())
            }
            Err(e) => {
                warn!("failed to fetch items: {e}");
                view.banner = Some(CONNECTIVITY_BANNER.to_string());
                Err(e)
            }
        }
    }

    fn check_health(&self) -> Result<(), ShellError> {
        let result = self
            .transport
            .execute(self.client.build_health())
            .map_err(ShellError::from)
            .and_then(|response| Ok(self.client.parse_health(response)?));

        let mut view = self.view.lock();
        match result {
            Ok(status) => {
                view.health = HealthView::Connected(status);
                view.banner = None;
                view.api_calls += 1;
                Ok(())
            }
            Err(e) => {
                warn!("health check failed: {e}");
                view.health = HealthView::Disconnected {
                    checked_at: Utc::now(),
                };
                view.banner = Some(CONNECTIVITY_BANNER.to_string());
                Err(e)
            }
        }
    }
}

/// Local view of the item store plus the actions a user can take on it.
pub struct Shell<T: Transport> {
    inner: Arc<Inner<T>>,
    poller: Option<HealthPoller>,
    poll_period: Duration,
}

impl<T: Transport> Shell<T> {
    pub fn new(client: ItemClient, transport: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                transport,
                view: Mutex::new(ViewState {
                    loading: true,
                    ..ViewState::default()
                }),
            }),
            poller: None,
            poll_period: HEALTH_POLL_PERIOD,
        }
    }

    pub fn with_poll_period(mut self, period: Duration) -> Self {
        self.poll_period = period;
        self
    }

    /// Snapshot of the current view state.
    pub fn view(&self) -> ViewState {
        self.inner.view.lock().clone()
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(HealthPoller::is_running)
    }

    /// Fetch items and health once, then keep probing health on a fixed
    /// schedule. Failures land in the view state. Must be called from within
    /// a tokio runtime; calling it again does not start a second poller.
    pub fn activate(&mut self) {
        let _ = self.inner.refresh_items();
        let _ = self.inner.check_health();

        if self.poller.is_none() {
            let inner = Arc::clone(&self.inner);
            self.poller = Some(HealthPoller::spawn(self.poll_period, move || {
                let _ = inner.check_health();
            }));
        }
    }

    pub fn refresh_items(&self) -> Result<(), ShellError> {
        self.inner.refresh_items()
    }

    pub fn check_health(&self) -> Result<(), ShellError> {
        self.inner.check_health()
    }

    pub fn set_form(&self, form: NewItem) {
        self.inner.view.lock().form = form;
    }

    /// Submit the pending form. On success the returned record is appended
    /// locally and the form is cleared; on failure only the notice changes.
    pub fn submit_form(&self) -> Result<Item, ShellError> {
        let form = self.inner.view.lock().form.clone();
        let client = &self.inner.client;

        let result = client
            .build_create_item(&form)
            .map_err(ShellError::from)
            .and_then(|request| Ok(self.inner.transport.execute(request)?))
            .and_then(|response| Ok(client.parse_create_item(response)?));

        let mut view = self.inner.view.lock();
        match result {
            Ok(item) => {
                info!(id = item.id, "item added");
                view.items.push(item.clone());
                view.form = NewItem::default();
                view.notice = Some(Notice::Success("Item added successfully!".to_string()));
                view.api_calls += 1;
                Ok(item)
            }
            Err(e) => {
                warn!("failed to add item: {e}");
                view.notice = Some(Notice::Error("Failed to add item".to_string()));
                Err(e)
            }
        }
    }

    /// Delete after `confirm` approves. Declining sends nothing.
    pub fn delete_item<F>(&self, id: u64, confirm: F) -> Result<DeleteOutcome, ShellError>
    where
        F: FnOnce(u64) -> bool,
    {
        if !confirm(id) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let client = &self.inner.client;
        let result = self
            .inner
            .transport
            .execute(client.build_delete_item(id))
            .map_err(ShellError::from)
            .and_then(|response| Ok(client.parse_delete_item(response)?));

        let mut view = self.inner.view.lock();
        match result {
            Ok(_) => {
                info!(id, "item deleted");
                view.items.retain(|item| item.id != id);
                view.notice = Some(Notice::Success("Item deleted successfully!".to_string()));
                view.api_calls += 1;
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                warn!(id, "failed to delete item: {e}");
                view.notice = Some(Notice::Error("Failed to delete item".to_string()));
                Err(e)
            }
        }
    }

    pub fn dismiss_notice(&self) {
        self.inner.view.lock().notice = None;
    }

    /// Stop the health poller and wait for it to exit.
    pub async fn teardown(mut self) {
        if let Some(poller) = self.poller.take() {
            poller.stop().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use crate::error::{ApiError, TransportError};
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// In-memory stand-in for the item service.
    struct FakeService {
        items: Mutex<Vec<Item>>,
        online: AtomicBool,
        health_calls: AtomicUsize,
    }

    impl FakeService {
        fn seeded() -> Self {
            let items = (1..=3)
                .map(|n| Item {
                    id: n,
                    name: format!("Item {n}"),
                    description: format!("Description for item {n}"),
                    created_at: None,
                })
                .collect();
            Self {
                items: Mutex::new(items),
                online: AtomicBool::new(true),
                health_calls: AtomicUsize::new(0),
            }
        }
    }

    impl Transport for Arc<FakeService> {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            if !self.online.load(Ordering::SeqCst) {
                return Err(TransportError("connection refused".to_string()));
            }
            let path = request
                .path
                .strip_prefix("http://fake")
                .unwrap_or(&request.path)
                .to_string();
            let mut items = self.items.lock();

            let (status, body) = match (request.method, path.as_str()) {
                (HttpMethod::Get, "/api/health") => {
                    self.health_calls.fetch_add(1, Ordering::SeqCst);
                    (
                        200,
                        serde_json::json!({
                            "status": "OK",
                            "message": "Backend API is running",
                            "timestamp": Utc::now(),
                            "totalItems": items.len(),
                        }),
                    )
                }
                (HttpMethod::Get, "/api/data") => (
                    200,
                    serde_json::json!({"success": true, "data": items.clone(), "count": items.len()}),
                ),
                (HttpMethod::Post, "/api/data") => {
                    let form: NewItem =
                        serde_json::from_str(request.body.as_deref().unwrap_or("{}")).unwrap();
                    if form.name.is_empty() || form.description.is_empty() {
                        (
                            400,
                            serde_json::json!({"success": false, "message": "Name and description are required"}),
                        )
                    } else {
                        let item = Item {
                            id: items.len() as u64 + 1,
                            name: form.name,
                            description: form.description,
                            created_at: Some(Utc::now()),
                        };
                        items.push(item.clone());
                        (
                            201,
                            serde_json::json!({"success": true, "message": "Item added successfully", "data": item}),
                        )
                    }
                }
                (HttpMethod::Delete, p) if p.starts_with("/api/data/") => {
                    let id: u64 = p["/api/data/".len()..].parse().unwrap();
                    let before = items.len();
                    items.retain(|item| item.id != id);
                    if items.len() < before {
                        (200, serde_json::json!({"success": true, "message": "Item deleted successfully"}))
                    } else {
                        (404, serde_json::json!({"success": false, "message": "Item not found"}))
                    }
                }
                _ => (404, serde_json::json!({"success": false, "message": "Route not found"})),
            };
            Ok(HttpResponse::new(status, body.to_string()))
        }
    }

    fn shell() -> (Arc<FakeService>, Shell<Arc<FakeService>>) {
        let service = Arc::new(FakeService::seeded());
        let shell = Shell::new(ItemClient::new("http://fake"), Arc::clone(&service));
        (service, shell)
    }

    fn local_ids(shell: &Shell<Arc<FakeService>>) -> Vec<u64> {
        shell.view().items.iter().map(|item| item.id).collect()
    }

    #[tokio::test]
    async fn activate_loads_items_and_health_then_polls() {
        let (service, mut shell) = shell();
        shell.activate();

        let view = shell.view();
        assert_eq!(local_ids(&shell), vec![1, 2, 3]);
        assert!(view.health.is_connected());
        assert!(view.banner.is_none());
        assert_eq!(view.api_calls, 2);
        assert!(!view.loading);
        assert!(shell.is_polling());
        assert_eq!(service.health_calls.load(Ordering::SeqCst), 1);

        shell.teardown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn poller_rechecks_health_until_teardown() {
        let (service, shell) = shell();
        let mut shell = shell.with_poll_period(Duration::from_millis(20));
        shell.activate();

        tokio::time::sleep(Duration::from_millis(120)).await;
        shell.teardown().await;

        let calls = service.health_calls.load(Ordering::SeqCst);
        assert!(calls >= 3, "expected repeated health checks, got {calls}");

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(service.health_calls.load(Ordering::SeqCst), calls);
    }

    #[test]
    fn loading_until_first_list_fetch_completes() {
        let (service, shell) = shell();
        assert!(shell.view().loading);

        shell.check_health().unwrap();
        assert!(shell.view().loading);

        service.online.store(false, Ordering::SeqCst);
        shell.refresh_items().unwrap_err();
        assert!(!shell.view().loading);
    }

    #[test]
    fn submit_appends_and_clears_form() {
        let (_, shell) = shell();
        shell.refresh_items().unwrap();
        shell.set_form(NewItem::new("X", "Y"));

        let item = shell.submit_form().unwrap();
        assert_eq!(item.id, 4);

        let view = shell.view();
        assert_eq!(view.items.last(), Some(&item));
        assert_eq!(view.form, NewItem::default());
        assert!(matches!(view.notice, Some(Notice::Success(_))));
    }

    #[test]
    fn rejected_submit_leaves_state_alone() {
        let (_, shell) = shell();
        shell.refresh_items().unwrap();
        shell.set_form(NewItem::new("X", ""));

        let err = shell.submit_form().unwrap_err();
        assert!(matches!(err, ShellError::Api(ApiError::BadRequest { .. })));

        let view = shell.view();
        assert_eq!(view.items.len(), 3);
        assert_eq!(view.form, NewItem::new("X", ""));
        assert_eq!(view.notice, Some(Notice::Error("Failed to add item".to_string())));
    }

    #[test]
    fn delete_requires_confirmation() {
        let (service, shell) = shell();
        shell.refresh_items().unwrap();

        let outcome = shell.delete_item(2, |_| false).unwrap();
        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(service.items.lock().len(), 3);
        assert_eq!(local_ids(&shell), vec![1, 2, 3]);

        let mut asked = None;
        let outcome = shell
            .delete_item(2, |id| {
                asked = Some(id);
                true
            })
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Deleted);
        assert_eq!(asked, Some(2));
        assert_eq!(local_ids(&shell), vec![1, 3]);
    }

    #[test]
    fn failed_delete_keeps_local_copy() {
        let (_, shell) = shell();
        shell.refresh_items().unwrap();

        let err = shell.delete_item(99, |_| true).unwrap_err();
        assert!(matches!(err, ShellError::Api(ApiError::NotFound { .. })));
        assert_eq!(local_ids(&shell), vec![1, 2, 3]);
        assert_eq!(
            shell.view().notice,
            Some(Notice::Error("Failed to delete item".to_string()))
        );

        shell.dismiss_notice();
        assert!(shell.view().notice.is_none());
    }

    #[test]
    fn unreachable_service_sets_banner_until_next_success() {
        let (service, shell) = shell();
        shell.refresh_items().unwrap();
        service.online.store(false, Ordering::SeqCst);

        let err = shell.check_health().unwrap_err();
        assert!(err.is_connectivity());
        let err = shell.refresh_items().unwrap_err();
        assert!(err.is_connectivity());

        let view = shell.view();
        assert_eq!(view.banner.as_deref(), Some(CONNECTIVITY_BANNER));
        assert!(matches!(view.health, HealthView::Disconnected { .. }));
        // Cached items survive a failed refresh.
        assert_eq!(view.items.len(), 3);

        service.online.store(true, Ordering::SeqCst);
        shell.refresh_items().unwrap();
        assert!(shell.view().banner.is_none());
    }

    #[test]
    fn local_cache_drifts_until_refresh() {
        let (service, shell) = shell();
        shell.refresh_items().unwrap();
        service.items.lock().clear();

        assert_eq!(shell.view().items.len(), 3);
        shell.refresh_items().unwrap();
        assert!(shell.view().items.is_empty());
    }
}
