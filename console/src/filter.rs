use requester::inventory::io::ConsignationType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const DEFAULT_PER_PAGE: u32 = 12;
pub const PRICE_MIN: f64 = 0.0;
pub const PRICE_MAX: f64 = 999_999_999_999.99;
pub const BEDROOM_OPTIONS: [u32; 5] = [1, 2, 3, 4, 5];

/// Search criteria for the property listing. Values are never edited in
/// place: every change goes through [`apply_change`] and yields a new state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    search: Option<String>,
    city: Option<String>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    bedrooms: Option<BTreeSet<u32>>,
    consignation_type: Option<ConsignationType>,
    per_page: Option<u32>,
    page: Option<u32>,
}

/// A partial update of a [`FilterState`]. Each field is `None` when the patch
/// does not touch it, `Some(None)` when it clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterPatch {
    search: Option<Option<String>>,
    city: Option<Option<String>>,
    min_price: Option<Option<f64>>,
    max_price: Option<Option<f64>>,
    bedrooms: Option<Option<BTreeSet<u32>>>,
    consignation_type: Option<Option<ConsignationType>>,
    per_page: Option<Option<u32>>,
    page: Option<u32>,
}

/// Merges `patch` into `current`. A patch touching anything besides `page`
/// sends the listing back to page 1, whatever page it carries. A page-only
/// patch keeps its page. An empty patch changes nothing.
pub fn apply_change(current: &FilterState, patch: FilterPatch) -> FilterState {
    if patch.is_empty() {
        return current.clone();
    }
    let page_only = patch.is_page_only();

    let mut next = current.clone();
    if let Some(search) = patch.search {
        next.search = search;
    }
    if let Some(city) = patch.city {
        next.city = city;
    }
    if let Some(min_price) = patch.min_price {
        next.min_price = min_price;
    }
    if let Some(max_price) = patch.max_price {
        next.max_price = max_price;
    }
    if let Some(bedrooms) = patch.bedrooms {
        next.bedrooms = bedrooms;
    }
    if let Some(consignation_type) = patch.consignation_type {
        next.consignation_type = consignation_type;
    }
    if let Some(per_page) = patch.per_page {
        next.per_page = per_page;
    }
    next.page = if page_only { patch.page } else { Some(1) };
    next
}

impl FilterState {
    /// First page with the given page size.
    pub fn initial(per_page: u32) -> Self {
        Self {
            per_page: Some(per_page),
            page: Some(1),
            ..Default::default()
        }
    }

    pub fn apply(&self, patch: FilterPatch) -> Self {
        apply_change(self, patch)
    }

    /// Adds `value` to the bedroom selection, or removes it when already
    /// selected. Counts as a filter change, so the page resets.
    pub fn toggle_bedroom(&self, value: u32) -> Self {
        let mut bedrooms = self.bedrooms.clone().unwrap_or_default();
        if !bedrooms.remove(&value) {
            bedrooms.insert(value);
        }
        self.apply(FilterPatch::new().bedrooms(bedrooms))
    }

    /// Drops every criterion but the page size.
    pub fn reset(&self) -> Self {
        Self::initial(self.per_page.unwrap_or(DEFAULT_PER_PAGE))
    }

    pub fn next_page(&self, last_page: u32) -> FilterPatch {
        let page = self.page.unwrap_or(1).saturating_add(1);
        FilterPatch::new().page(page.min(last_page.max(1)))
    }

    pub fn previous_page(&self) -> FilterPatch {
        let page = self.page.unwrap_or(1).saturating_sub(1);
        FilterPatch::new().page(page.max(1))
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn min_price(&self) -> Option<f64> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<f64> {
        self.max_price
    }

    pub fn bedrooms(&self) -> Option<&BTreeSet<u32>> {
        self.bedrooms.as_ref()
    }

    pub fn consignation_type(&self) -> Option<ConsignationType> {
        self.consignation_type
    }

    pub fn per_page(&self) -> Option<u32> {
        self.per_page
    }

    pub fn page(&self) -> Option<u32> {
        self.page
    }
}

impl FilterPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// A blank term clears the search.
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(non_blank(search.into()));
        self
    }

    pub fn clear_search(mut self) -> Self {
        self.search = Some(None);
        self
    }

    /// A blank city clears the city criterion.
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(non_blank(city.into()));
        self
    }

    pub fn clear_city(mut self) -> Self {
        self.city = Some(None);
        self
    }

    pub fn min_price(mut self, min_price: Option<f64>) -> Self {
        self.min_price = Some(min_price.and_then(clamp_price));
        self
    }

    /// Raw text from the price field: blank or non-numeric input clears it.
    pub fn min_price_input(self, raw: &str) -> Self {
        self.min_price(parse_price_input(raw))
    }

    pub fn max_price(mut self, max_price: Option<f64>) -> Self {
        self.max_price = Some(max_price.and_then(clamp_price));
        self
    }

    pub fn max_price_input(self, raw: &str) -> Self {
        self.max_price(parse_price_input(raw))
    }

    /// An empty selection clears the criterion.
    pub fn bedrooms(mut self, bedrooms: impl IntoIterator<Item = u32>) -> Self {
        let bedrooms = bedrooms.into_iter().collect::<BTreeSet<_>>();
        self.bedrooms = Some((!bedrooms.is_empty()).then_some(bedrooms));
        self
    }

    pub fn consignation_type(mut self, consignation_type: Option<ConsignationType>) -> Self {
        self.consignation_type = Some(consignation_type);
        self
    }

    pub fn per_page(mut self, per_page: Option<u32>) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn is_page_only(&self) -> bool {
        self.page.is_some()
            && Self {
                page: None,
                ..self.clone()
            }
            .is_empty()
    }
}

/// Keeps a price inside the accepted range. `NaN` is not a price and a
/// negative zero is a plain zero.
pub fn clamp_price(value: f64) -> Option<f64> {
    if value.is_nan() {
        return None;
    }
    Some(value.clamp(PRICE_MIN, PRICE_MAX) + 0.0)
}

pub fn parse_price_input(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    raw.parse::<f64>().ok().and_then(clamp_price)
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}
