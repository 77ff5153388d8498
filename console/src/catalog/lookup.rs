use crate::catalog::{CityCatalogCache, CityOption};
use crate::error::CatalogFetchError;
use async_trait::async_trait;
use requester::catalog::CatalogRequesterExt;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait CityLookupExt {
    /// Cities whose name contains `search_term`, ignoring case. An absent or
    /// blank term returns the whole catalog.
    async fn lookup(
        &self,
        search_term: Option<&str>,
    ) -> Result<Vec<CityOption>, CatalogFetchError>;
}

pub struct CityLookup<S> {
    cache: Arc<CityCatalogCache<S>>,
}

impl<S> CityLookup<S> {
    pub fn new(cache: Arc<CityCatalogCache<S>>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl<S> CityLookupExt for CityLookup<S>
where
    S: CatalogRequesterExt + Send + Sync + 'static,
{
    async fn lookup(
        &self,
        search_term: Option<&str>,
    ) -> Result<Vec<CityOption>, CatalogFetchError> {
        let catalog = self.cache.get_catalog().await?;
        let matches = filter_catalog(&catalog, search_term);
        debug!(
            search_term,
            n_matches = matches.len(),
            n_cities = catalog.len(),
            "city lookup"
        );
        Ok(matches)
    }
}

/// Case-insensitive substring match on the trimmed term, catalog order kept.
pub fn filter_catalog(catalog: &[CityOption], search_term: Option<&str>) -> Vec<CityOption> {
    let term = search_term.map(str::trim).unwrap_or_default().to_lowercase();
    if term.is_empty() {
        return catalog.to_vec();
    }

    catalog
        .iter()
        .filter(|city| city.name().to_lowercase().contains(&term))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, sample_catalog, sample_payload};

    fn lookup_with(source: Arc<FakeCatalog>) -> CityLookup<FakeCatalog> {
        CityLookup::new(Arc::new(CityCatalogCache::new(source)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_filters_case_insensitively() {
        let lookup = lookup_with(Arc::new(FakeCatalog::serving(sample_payload())));

        assert_eq!(
            lookup.lookup(Some("bar")).await.unwrap(),
            vec![CityOption::new("3", "Barranquilla")]
        );
        assert_eq!(
            lookup.lookup(Some("  MEDELLÍN ")).await.unwrap(),
            vec![CityOption::new("2", "Medellín")]
        );
        assert!(lookup.lookup(Some("xyz")).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_term_returns_full_catalog_in_order() {
        let source = Arc::new(FakeCatalog::serving(sample_payload()));
        let lookup = lookup_with(Arc::clone(&source));

        assert_eq!(lookup.lookup(None).await.unwrap(), sample_catalog());
        assert_eq!(lookup.lookup(Some("")).await.unwrap(), sample_catalog());
        assert_eq!(lookup.lookup(Some("   ")).await.unwrap(), sample_catalog());
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn test_matches_keep_catalog_order() {
        let catalog = vec![
            CityOption::new("9", "Santa Marta"),
            CityOption::new("7", "Bucaramanga"),
            CityOption::new("8", "Cartagena"),
        ];

        let names = filter_catalog(&catalog, Some("ar"))
            .into_iter()
            .map(|c| c.name().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Santa Marta", "Bucaramanga", "Cartagena"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_catalog_failure_propagates() {
        let lookup = lookup_with(Arc::new(FakeCatalog::new(
            vec![Err("down".to_string())],
            std::time::Duration::from_millis(1),
        )));

        assert!(lookup.lookup(Some("bar")).await.is_err());
    }
}
