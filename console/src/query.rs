use crate::filter::FilterState;
use url::form_urlencoded;

/// Canonical, form-urlencoded query string for `state`, without the leading
/// `?`. Absent fields are left out; parameter order is fixed.
pub fn serialize(state: &FilterState) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    if let Some(city) = state.city().filter(|city| !city.is_empty()) {
        query.append_pair("city", city);
    }
    if let Some(min_price) = state.min_price() {
        query.append_pair("min_price", &min_price.to_string());
    }
    if let Some(max_price) = state.max_price() {
        query.append_pair("max_price", &max_price.to_string());
    }
    if let Some(bedrooms) = state.bedrooms().filter(|bedrooms| !bedrooms.is_empty()) {
        let csv = bedrooms
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",");
        query.append_pair("bedrooms", &csv);
    }
    if let Some(consignation_type) = state.consignation_type() {
        query.append_pair("consignation_type", consignation_type.as_str());
    }
    if let Some(per_page) = state.per_page().filter(|per_page| *per_page > 0) {
        query.append_pair("per_page", &per_page.to_string());
    }
    if let Some(page) = state.page().filter(|page| *page > 0) {
        query.append_pair("page", &page.to_string());
    }
    if let Some(search) = state.search().filter(|search| !search.is_empty()) {
        query.append_pair("search", search);
    }

    query.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterPatch;
    use requester::inventory::io::ConsignationType;

    #[test]
    fn test_empty_state_serializes_to_nothing() {
        assert_eq!(serialize(&FilterState::default()), "");
    }

    #[test]
    fn test_city_and_sorted_bedrooms() {
        let state = FilterState::default().apply(FilterPatch::new().city("Cali").bedrooms([2, 1]));
        // Any mutation lands on page 1, which is a parameter of its own.
        assert_eq!(serialize(&state), "city=Cali&bedrooms=1%2C2&page=1");

        let without_page = serde_json::from_value::<FilterState>(serde_json::json!({
            "city": "Cali",
            "bedrooms": [2, 1]
        }))
        .unwrap();
        assert_eq!(serialize(&without_page), "city=Cali&bedrooms=1%2C2");
    }

    #[test]
    fn test_full_state_uses_fixed_order() {
        let state = FilterState::initial(12).apply(
            FilterPatch::new()
                .search("casa campestre")
                .city("Santa Marta")
                .min_price(Some(0.0))
                .max_price(Some(2500000.5))
                .bedrooms([3])
                .consignation_type(Some(ConsignationType::Rent)),
        );

        assert_eq!(
            serialize(&state),
            "city=Santa+Marta&min_price=0&max_price=2500000.5&bedrooms=3\
             &consignation_type=rent&per_page=12&page=1&search=casa+campestre"
        );
    }

    #[test]
    fn test_non_ascii_city_is_encoded() {
        let state = serde_json::from_value::<FilterState>(serde_json::json!({ "city": "Bogotá" }))
            .unwrap();
        assert_eq!(serialize(&state), "city=Bogot%C3%A1");
    }

    #[test]
    fn test_zero_paging_values_are_omitted() {
        let state = serde_json::from_value::<FilterState>(serde_json::json!({
            "per_page": 0,
            "page": 0,
            "search": ""
        }))
        .unwrap();
        assert_eq!(serialize(&state), "");
    }

    #[test]
    fn test_negative_zero_price_has_no_sign() {
        let state = FilterState::default().apply(FilterPatch::new().min_price_input("-0"));
        assert_eq!(serialize(&state), "min_price=0&page=1");
    }
}
