//! Type-ahead controller for the city field.
//!
//! Every query change bumps a generation counter and restarts the debounce
//! timer. A lookup result is only applied while the generation that started
//! it is still current, so the suggestions always belong to the most recently
//! typed query no matter in which order lookups resolve. Lookups are never
//! physically cancelled.

use crate::catalog::{CityLookupExt, CityOption};
use crate::error::ConsoleError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, error};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MAX_SUGGESTIONS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Debouncing,
    Fetching,
    Settled { success: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AutocompleteView {
    pub query: String,
    pub phase: Phase,
    pub suggestions: Vec<CityOption>,
    pub error: Option<String>,
    pub open: bool,
}

impl AutocompleteView {
    fn new() -> Self {
        Self {
            query: String::new(),
            phase: Phase::Idle,
            suggestions: Vec::new(),
            error: None,
            open: false,
        }
    }

    pub fn loading(&self) -> bool {
        self.phase == Phase::Fetching
    }

    /// Suggestions truncated for display.
    pub fn visible(&self, max: usize) -> &[CityOption] {
        &self.suggestions[..self.suggestions.len().min(max)]
    }
}

pub struct DebouncedAutocomplete<L> {
    lookup: Arc<L>,
    delay: Duration,
    generation: Arc<AtomicU64>,
    view: Arc<watch::Sender<AutocompleteView>>,
    pending_timer: Mutex<Option<AbortHandle>>,
}

impl<L> DebouncedAutocomplete<L>
where
    L: CityLookupExt + Send + Sync + 'static,
{
    pub fn new(lookup: Arc<L>) -> Self {
        Self::with_delay(lookup, DEFAULT_DEBOUNCE)
    }

    pub fn with_delay(lookup: Arc<L>, delay: Duration) -> Self {
        let (view, _) = watch::channel(AutocompleteView::new());
        Self {
            lookup,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            view: Arc::new(view),
            pending_timer: Mutex::new(None),
        }
    }

    /// The operator typed into the field: schedule a lookup and open the list.
    pub fn set_query(&self, query: impl Into<String>) {
        self.schedule(query.into(), Some(true));
    }

    /// A suggestion was picked. The list closes right away; the query becomes
    /// the chosen name.
    pub fn select(&self, name: impl Into<String>) -> String {
        let name = name.into();
        self.schedule(name.clone(), Some(false));
        name
    }

    pub fn clear(&self) {
        self.schedule(String::new(), Some(false));
    }

    pub fn focus(&self) {
        self.view.send_if_modified(|view| !std::mem::replace(&mut view.open, true));
    }

    pub fn dismiss(&self) {
        self.view.send_if_modified(|view| std::mem::replace(&mut view.open, false));
    }

    pub fn snapshot(&self) -> AutocompleteView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutocompleteView> {
        self.view.subscribe()
    }

    fn schedule(&self, query: String, open: Option<bool>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(timer) = self.pending_timer().take() {
            timer.abort();
        }

        self.view.send_modify(|view| {
            view.query = query.clone();
            view.phase = Phase::Debouncing;
            if let Some(open) = open {
                view.open = open;
            }
        });

        let timer = tokio::spawn({
            let lookup = Arc::clone(&self.lookup);
            let current = Arc::clone(&self.generation);
            let view = Arc::clone(&self.view);
            let delay = self.delay;
            async move {
                tokio::time::sleep(delay).await;
                if current.load(Ordering::SeqCst) != generation {
                    return;
                }
                // Detached from the timer so that discarding the timer never
                // drops a lookup that is already running.
                tokio::spawn(Self::fetch(lookup, current, view, generation, query));
            }
        });
        *self.pending_timer() = Some(timer.abort_handle());
    }

    async fn fetch(
        lookup: Arc<L>,
        current: Arc<AtomicU64>,
        view: Arc<watch::Sender<AutocompleteView>>,
        generation: u64,
        query: String,
    ) {
        let is_current = || current.load(Ordering::SeqCst) == generation;
        if !view.send_if_modified(|view| {
            if !is_current() {
                return false;
            }
            view.phase = Phase::Fetching;
            view.error = None;
            true
        }) {
            return;
        }

        let search_term = Some(query.trim()).filter(|term| !term.is_empty());
        let result = lookup.lookup(search_term).await;

        view.send_if_modified(|view| {
            if !is_current() {
                debug!(query = %query, "discarding stale city suggestions");
                return false;
            }
            match result {
                Ok(suggestions) => {
                    view.phase = Phase::Settled { success: true };
                    view.suggestions = suggestions;
                    view.error = None;
                }
                Err(e) => {
                    let e = ConsoleError::LookupDisplay(e);
                    error!("city lookup failed: {e}");
                    view.phase = Phase::Settled { success: false };
                    view.suggestions.clear();
                    view.error = Some(e.user_message().to_string());
                }
            }
            true
        });
    }

    fn pending_timer(&self) -> MutexGuard<'_, Option<AbortHandle>> {
        self.pending_timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<L> Drop for DebouncedAutocomplete<L> {
    fn drop(&mut self) {
        let pending = self
            .pending_timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }
}
