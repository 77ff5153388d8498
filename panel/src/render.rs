use console::autocomplete::{AutocompleteView, Phase};
use console::form::PropertyDraft;
use console::reconciler::ListingView;
use requester::inventory::io::Property;
use std::fmt::Write;
use std::sync::Arc;
use tokio::sync::{Notify, watch};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// `label` names the field the suggestions belong to.
pub fn suggestions(label: &str, view: &AutocompleteView, max: usize) -> String {
    let mut out = format!("{label} `{}`", view.query);
    match view.phase {
        Phase::Debouncing => out.push_str(" (typing)"),
        Phase::Fetching => out.push_str(" (loading cities)"),
        _ => {}
    }
    if let Some(error) = &view.error {
        let _ = write!(out, "\n  {error}");
        return out;
    }
    if !view.open {
        return out;
    }
    for (i, city) in view.visible(max).iter().enumerate() {
        let _ = write!(out, "\n  {}. {}", i + 1, city.name());
    }
    if view.phase == (Phase::Settled { success: true }) && view.suggestions.is_empty() {
        out.push_str("\n  no matching cities");
    }
    out
}

pub fn listing(view: &ListingView) -> String {
    let mut out = String::new();
    if view.loading {
        out.push_str("loading properties...\n");
    }
    if let Some(error) = &view.error {
        let _ = writeln!(out, "error: {error}");
    }
    if let Some(result) = &view.result {
        for property in &result.data {
            let _ = writeln!(out, "{}", property_line(property));
        }
        if view.is_empty() {
            out.push_str("no properties match these filters\n");
        }
    }
    let _ = write!(
        out,
        "page {} of {} ({} properties)",
        view.current_page(),
        view.total_pages(),
        view.total()
    );
    out
}

pub fn property_line(property: &Property) -> String {
    let price = property
        .rent_price
        .or(property.sale_price)
        .map(|price| format!("${price:.0}"))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "#{} {} | {} | {} bd {} ba {}m2 | {} {}",
        property.id,
        property.title,
        property.city,
        property.bedrooms,
        property.bathrooms,
        property.area,
        property.consignation_type,
        price
    )
}

pub fn draft(draft: &PropertyDraft) -> String {
    let heading = match draft.id {
        Some(id) => format!("editing property #{id}"),
        None => "new property".to_string(),
    };
    let price = |price: Option<f64>| {
        price
            .map(|price| price.to_string())
            .unwrap_or_else(|| "-".to_string())
    };

    let mut out = format!(
        "{heading}\n  title: {}\n  description: {}\n  city: {}\n  address: {}\n  \
         bedrooms: {} bathrooms: {} area: {}\n  type: {} rent: {} sale: {}",
        draft.title,
        draft.description,
        draft.city,
        draft.address,
        draft.bedrooms,
        draft.bathrooms,
        draft.area,
        draft.consignation_type,
        price(draft.rent_price),
        price(draft.sale_price),
    );
    for (i, url) in draft.images.iter().enumerate() {
        let _ = write!(out, "\n  image {}: {url}", i + 1);
    }
    out
}

/// Prints every view change until cancelled. The returned notify fires once
/// the printer stopped.
pub fn run(
    mut listing_rx: watch::Receiver<ListingView>,
    mut suggestions_rx: watch::Receiver<AutocompleteView>,
    mut form_city_rx: watch::Receiver<AutocompleteView>,
    max_suggestions: usize,
    cancellation_token: CancellationToken,
) -> Arc<Notify> {
    let done = Arc::new(Notify::new());
    tokio::spawn({
        let done = Arc::clone(&done);
        async move {
            loop {
                tokio::select! {
                    changed = listing_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        println!("{}", listing(&listing_rx.borrow_and_update()));
                    }
                    changed = suggestions_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let view = suggestions_rx.borrow_and_update();
                        println!("{}", suggestions("city", &view, max_suggestions));
                    }
                    changed = form_city_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let view = form_city_rx.borrow_and_update();
                        println!("{}", suggestions("form city", &view, max_suggestions));
                    }
                    _ = cancellation_token.cancelled() => break,
                }
            }
            info!("printer closed");
            done.notify_one();
        }
    });
    done
}

#[cfg(test)]
mod tests {
    use super::*;
    use console::catalog::CityOption;
    use console::filter::FilterState;
    use requester::inventory::io::{ConsignationType, PageMeta, PaginatedResponse};

    fn settled(query: &str, names: &[&str]) -> AutocompleteView {
        AutocompleteView {
            query: query.to_string(),
            phase: Phase::Settled { success: true },
            suggestions: names
                .iter()
                .enumerate()
                .map(|(i, name)| CityOption::new(i.to_string(), *name))
                .collect(),
            error: None,
            open: true,
        }
    }

    #[test]
    fn test_suggestions_are_capped() {
        let names = ["a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8"];
        let out = suggestions("city", &settled("a", &names), 6);
        assert!(out.contains("6. a6"));
        assert!(!out.contains("a7"));
    }

    #[test]
    fn test_closed_list_shows_only_the_query() {
        let mut view = settled("Cali", &["Cali"]);
        view.open = false;
        assert_eq!(suggestions("form city", &view, 6), "form city `Cali`");
    }

    #[test]
    fn test_empty_and_failed_suggestions() {
        assert!(suggestions("city", &settled("zz", &[]), 6).ends_with("no matching cities"));

        let view = AutocompleteView {
            phase: Phase::Settled { success: false },
            error: Some("cities unavailable".to_string()),
            ..settled("bo", &[])
        };
        assert!(suggestions("city", &view, 6).ends_with("cities unavailable"));
    }

    #[test]
    fn test_listing_keeps_rows_next_to_error() {
        let view = ListingView {
            filters: FilterState::initial(12),
            loading: false,
            error: Some("could not load properties".to_string()),
            result: Some(PaginatedResponse {
                data: vec![Property {
                    id: 4,
                    title: "Casa".to_string(),
                    description: String::new(),
                    city: "Cali".to_string(),
                    address: String::new(),
                    bedrooms: 3,
                    bathrooms: 2,
                    area: 120.0,
                    rent_price: None,
                    sale_price: Some(350000000.0),
                    consignation_type: ConsignationType::Sale,
                    images: vec![],
                    created_at: None,
                    updated_at: None,
                }],
                meta: PageMeta {
                    current_page: 1,
                    per_page: 12,
                    total: 1,
                    last_page: 1,
                },
            }),
        };

        let out = listing(&view);
        assert!(out.starts_with("error: could not load properties\n"));
        assert!(out.contains("#4 Casa | Cali | 3 bd 2 ba 120m2 | sale $350000000"));
        assert!(out.ends_with("page 1 of 1 (1 properties)"));
    }

    #[test]
    fn test_draft_lists_every_image_slot() {
        let mut form = PropertyDraft {
            id: Some(9),
            title: "Casa".to_string(),
            rent_price: Some(1500000.0),
            ..Default::default()
        };
        form.images = vec!["https://img.example/1.jpg".to_string(), String::new()];

        let out = draft(&form);
        assert!(out.starts_with("editing property #9\n  title: Casa"));
        assert!(out.contains("type: rent rent: 1500000 sale: -"));
        assert!(out.ends_with("image 1: https://img.example/1.jpg\n  image 2: "));
    }
}
