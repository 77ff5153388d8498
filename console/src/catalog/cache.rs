use crate::catalog::{CityOption, parse_catalog};
use crate::error::CatalogFetchError;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use requester::catalog::CatalogRequesterExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

pub type Catalog = Arc<[CityOption]>;

type Population = Shared<BoxFuture<'static, Result<Catalog, CatalogFetchError>>>;

enum CatalogState {
    Empty,
    /// Every caller arriving during an attempt awaits the same shared future.
    Populating {
        attempt: u64,
        population: Population,
    },
    Populated(Catalog),
}

/// Lazily populated, single-flight cache of the remote city catalog.
///
/// A successful population is kept for the lifetime of the cache, a failed
/// one is handed to every caller that waited on it and then forgotten, so the
/// next call starts a fresh attempt. The application keeps one instance per
/// process and shares it behind an [`Arc`].
pub struct CityCatalogCache<S> {
    source: Arc<S>,
    state: Mutex<CatalogState>,
    attempts: AtomicU64,
}

impl<S> CityCatalogCache<S>
where
    S: CatalogRequesterExt + Send + Sync + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            state: Mutex::new(CatalogState::Empty),
            attempts: AtomicU64::new(0),
        }
    }

    #[instrument(skip_all)]
    pub async fn get_catalog(&self) -> Result<Catalog, CatalogFetchError> {
        let (attempt, population) = {
            let mut state = self.state.lock().await;
            match &*state {
                CatalogState::Populated(catalog) => {
                    debug!("city catalog cache hit");
                    return Ok(Arc::clone(catalog));
                }
                CatalogState::Populating {
                    attempt,
                    population,
                } => {
                    debug!(attempt, "joining in-flight city catalog population");
                    (*attempt, population.clone())
                }
                CatalogState::Empty => {
                    let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    info!(attempt, "populating city catalog");
                    let population = Self::populate(Arc::clone(&self.source))
                        .boxed()
                        .shared();
                    *state = CatalogState::Populating {
                        attempt,
                        population: population.clone(),
                    };
                    (attempt, population)
                }
            }
        };

        let result = population.await;

        let mut state = self.state.lock().await;
        // Only the attempt that is still current may move the cell forward.
        if matches!(&*state, CatalogState::Populating { attempt: current, .. } if *current == attempt)
        {
            *state = match &result {
                Ok(catalog) => CatalogState::Populated(Arc::clone(catalog)),
                Err(e) => {
                    error!(attempt, "city catalog population failed: {e}");
                    CatalogState::Empty
                }
            };
        }
        result
    }

    pub async fn is_populated(&self) -> bool {
        matches!(&*self.state.lock().await, CatalogState::Populated(_))
    }

    async fn populate(source: Arc<S>) -> Result<Catalog, CatalogFetchError> {
        let payload = source.fetch_cities().await?;
        let catalog: Catalog = parse_catalog(payload)?.into();
        info!(n_cities = catalog.len(), "city catalog populated");
        Ok(catalog)
    }
}
