use std::fmt::Write as _;

use client_core::{state::DEFAULT_VISIBLE_PAGES, CatalogResponse, FilterState, PageLink, ViewUpdate};
use shared::protocol::{Category, ProductDetail, ProductSummary};

pub fn product_line(product: &ProductSummary) -> String {
    let mut line = format!(
        "#{:<6} {:<32} ${:>9}  [{}]",
        product.id.as_str(),
        product.display_name(),
        product.display_price(),
        product.category_label()
    );
    if product.stock_quantity == Some(0) {
        line.push_str("  (out of stock)");
    }
    line
}

pub fn category_line(category: &Category) -> String {
    match category.description.as_deref().map(str::trim) {
        Some(description) if !description.is_empty() => {
            format!(
                "#{:<6} {} - {}",
                category.id.as_str(),
                category.display_name(),
                description
            )
        }
        _ => format!("#{:<6} {}", category.id.as_str(), category.display_name()),
    }
}

/// Compact pager, e.g. `1 ... 4 [5] 6 ... 10`.
pub fn pager_line(page: &CatalogResponse) -> String {
    page.pagination
        .page_window(DEFAULT_VISIBLE_PAGES)
        .into_iter()
        .map(|link| match link {
            PageLink::Page { number, current: true } => format!("[{number}]"),
            PageLink::Page { number, .. } => number.to_string(),
            PageLink::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn catalog_page(
    page: &CatalogResponse,
    filters: &FilterState,
    category_name: Option<&str>,
) -> String {
    let mut out = String::new();
    for line in filters.describe(category_name) {
        let _ = writeln!(out, "{line}");
    }

    if page.items.is_empty() {
        let _ = writeln!(out, "No products found.");
        return out;
    }

    for product in &page.items {
        let _ = writeln!(out, "{}", product_line(product));
    }

    let pagination = &page.pagination;
    if let Some((first, last)) = pagination.item_range() {
        let _ = writeln!(
            out,
            "Showing {first}-{last} of {} products",
            pagination.total_count
        );
    }
    if pagination.should_show_controls() {
        let _ = writeln!(
            out,
            "Page {} of {}: {}",
            pagination.current_page,
            pagination.total_pages,
            pager_line(page)
        );
    }
    out
}

pub fn product_detail(product: &ProductDetail) -> String {
    let summary = &product.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{}", summary.display_name());
    let _ = writeln!(out, "Price: ${}", summary.display_price());
    let _ = writeln!(out, "Category: {}", summary.category_label());
    if let Some(stock) = summary.stock_quantity {
        let _ = writeln!(out, "In stock: {stock}");
    }
    if let Some(rating) = product.average_rating {
        let _ = writeln!(out, "Rating: {rating:.1}");
    }
    if let Some(description) = product.description.as_deref() {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", description.trim());
    }
    out
}

pub fn view_update(update: &ViewUpdate) -> String {
    match update {
        ViewUpdate::Featured(products) => {
            let mut out = String::from("Featured products\n");
            if products.is_empty() {
                out.push_str("No featured products yet.\n");
            }
            for product in products {
                let _ = writeln!(out, "{}", product_line(product));
            }
            out
        }
        ViewUpdate::Categories(categories) => {
            let mut out = String::from("Categories\n");
            for category in categories {
                let _ = writeln!(out, "{}", category_line(category));
            }
            out
        }
        ViewUpdate::CategoryFilterOptions(categories) => format!(
            "Filter by category: {}\n",
            categories
                .iter()
                .map(Category::display_name)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        ViewUpdate::CatalogPage(page) => catalog_page(page, &FilterState::default(), None),
        ViewUpdate::Product(product) => product_detail(product),
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
