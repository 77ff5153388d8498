use crate::error::ConsoleError;
use crate::filter::{FilterPatch, FilterState};
use crate::query::serialize;
use requester::inventory::InventoryRequesterExt;
use requester::inventory::io::{PaginatedResponse, Property};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Identifies one listing fetch. Only the most recently issued token may
/// change the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingView {
    pub filters: FilterState,
    pub loading: bool,
    pub error: Option<String>,
    pub result: Option<PaginatedResponse<Property>>,
}

impl ListingView {
    /// The page the server says it returned, which may differ from the one
    /// requested.
    pub fn current_page(&self) -> u32 {
        self.result
            .as_ref()
            .map(|result| result.meta.current_page)
            .or(self.filters.page())
            .unwrap_or(1)
    }

    pub fn total_pages(&self) -> u32 {
        self.result
            .as_ref()
            .map(|result| result.meta.last_page)
            .unwrap_or(1)
    }

    pub fn total(&self) -> u64 {
        self.result.as_ref().map(|result| result.meta.total).unwrap_or(0)
    }

    /// Settled on a page without any property.
    pub fn is_empty(&self) -> bool {
        !self.loading && self.result.as_ref().is_some_and(|result| result.data.is_empty())
    }
}

/// Turns filter changes into listing fetches and keeps the view on the
/// outcome of the latest one. Earlier fetches still complete, their outcome
/// is dropped.
pub struct ResultReconciler<R> {
    requester: Arc<R>,
    latest: Arc<AtomicU64>,
    view: Arc<watch::Sender<ListingView>>,
}

impl<R> ResultReconciler<R>
where
    R: InventoryRequesterExt + Send + Sync + 'static,
{
    pub fn new(requester: Arc<R>) -> Self {
        let (view, _) = watch::channel(ListingView::default());
        Self {
            requester,
            latest: Arc::new(AtomicU64::new(0)),
            view: Arc::new(view),
        }
    }

    /// Applies `patch` to the filters of the latest submission and submits
    /// the result.
    pub fn change(&self, patch: FilterPatch) -> (FilterState, JoinHandle<()>) {
        let next = self.view.borrow().filters.apply(patch);
        let handle = self.submit(next.clone());
        (next, handle)
    }

    pub fn submit(&self, filters: FilterState) -> JoinHandle<()> {
        let token = RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1);
        let query = serialize(&filters);
        debug!(?token, query = %query, "submitting listing fetch");

        self.view.send_modify(|view| {
            view.filters = filters;
            view.loading = true;
            view.error = None;
        });

        tokio::spawn({
            let requester = Arc::clone(&self.requester);
            let latest = Arc::clone(&self.latest);
            let view = Arc::clone(&self.view);
            async move {
                let outcome = requester.fetch_properties(&query).await;
                view.send_if_modified(|view| {
                    if latest.load(Ordering::SeqCst) != token.0 {
                        debug!(?token, "discarding stale listing response");
                        return false;
                    }
                    view.loading = false;
                    match outcome {
                        Ok(result) => {
                            view.result = Some(result);
                            view.error = None;
                        }
                        Err(e) => {
                            let e = ConsoleError::ListFetch(e);
                            error!(?token, "{e}");
                            view.error = Some(e.user_message().to_string());
                        }
                    }
                    true
                });
            }
        })
    }

    pub fn snapshot(&self) -> ListingView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListingView> {
        self.view.subscribe()
    }
}
