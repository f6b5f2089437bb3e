use crate::state::{FilterState, PaginationState};

pub type QueryParams = Vec<(&'static str, String)>;

/// Listing query for one catalog page.
///
/// Each filter goes out under its current name and the older alias the API
/// still honours (`q`, `min_price`, `max_price`, `sort`). Unset filters are
/// omitted; `page` and `page_size` are always present.
pub fn catalog_params(filters: &FilterState, pagination: &PaginationState) -> QueryParams {
    let mut params = QueryParams::new();

    if let Some(term) = filters.search_term() {
        params.push(("search", term.to_string()));
        params.push(("q", term.to_string()));
    }
    if let Some(category) = filters.category_id() {
        params.push(("category", category.to_string()));
    }
    if let Some(min) = filters.min_price.filter(|p| p.is_finite()) {
        params.push(("price_min", min.to_string()));
        params.push(("min_price", min.to_string()));
    }
    if let Some(max) = filters.max_price.filter(|p| p.is_finite()) {
        params.push(("price_max", max.to_string()));
        params.push(("max_price", max.to_string()));
    }
    if let Some(ordering) = filters.sort.ordering() {
        params.push(("ordering", ordering.to_string()));
        params.push(("sort", ordering.to_string()));
    }

    let (page, page_size) = pagination.request();
    params.push(("page", page.to_string()));
    params.push(("page_size", page_size.to_string()));
    params
}

pub fn featured_params(limit: u32) -> QueryParams {
    vec![
        ("is_featured", "true".to_string()),
        ("page_size", limit.max(1).to_string()),
    ]
}
