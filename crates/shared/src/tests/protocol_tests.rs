use serde_json::json;

use crate::{
    domain::{CategoryId, ProductId, SortKey},
    error::summarize_error_body,
    protocol::{
        Category, CategoryRef, ListingBody, ProductDetail, ProductSummary, CATEGORY_RESULT_KEYS,
        PRODUCT_RESULT_KEYS,
    },
};

#[test]
fn product_ids_accept_numbers_and_strings() {
    let numeric: ProductSummary = serde_json::from_value(json!({ "id": 42 })).expect("numeric");
    let textual: ProductSummary =
        serde_json::from_value(json!({ "id": "sku-9" })).expect("textual");
    assert_eq!(numeric.id, ProductId::new("42"));
    assert_eq!(textual.id.as_str(), "sku-9");
}

#[test]
fn product_price_keeps_decimal_text() {
    let from_text: ProductSummary =
        serde_json::from_value(json!({ "id": 1, "price": "19.90" })).expect("text price");
    let from_number: ProductSummary =
        serde_json::from_value(json!({ "id": 1, "price": 5 })).expect("number price");
    let missing: ProductSummary = serde_json::from_value(json!({ "id": 1 })).expect("no price");
    assert_eq!(from_text.display_price(), "19.90");
    assert_eq!(from_number.display_price(), "5");
    assert_eq!(missing.display_price(), "0.00");
}

#[test]
fn category_label_prefers_nested_name_then_flat_name() {
    let nested: ProductSummary = serde_json::from_value(json!({
        "id": 1,
        "category": { "id": 3, "name": "Shoes" }
    }))
    .expect("nested");
    let flat: ProductSummary = serde_json::from_value(json!({
        "id": 2,
        "category": 3,
        "category_name": "Hats"
    }))
    .expect("flat");
    let bare: ProductSummary = serde_json::from_value(json!({ "id": 3 })).expect("bare");

    assert_eq!(nested.category_label(), "Shoes");
    assert_eq!(flat.category, Some(CategoryRef::Id(CategoryId::new("3"))));
    assert_eq!(flat.category_label(), "Hats");
    assert_eq!(bare.category_label(), "Uncategorized");
}

#[test]
fn product_detail_flattens_summary_fields() {
    let detail: ProductDetail = serde_json::from_value(json!({
        "id": 8,
        "name": "Runner",
        "price": "80.00",
        "description": "Light shoe",
        "stock_quantity": 4,
        "created_at": "2024-03-01T10:00:00Z"
    }))
    .expect("detail");
    assert_eq!(detail.summary.display_name(), "Runner");
    assert_eq!(detail.summary.stock_quantity, Some(4));
    assert_eq!(detail.description.as_deref(), Some("Light shoe"));
    assert!(detail.created_at.is_some());
}

#[test]
fn decodes_bare_list_in_server_order() {
    let body = ListingBody::<ProductSummary>::decode(
        json!([{ "id": 3 }, { "id": 1 }, { "id": 2 }]),
        PRODUCT_RESULT_KEYS,
    );
    let ListingBody::BareList(items) = body else {
        panic!("expected bare list, got {body:?}");
    };
    let ids: Vec<_> = items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["3", "1", "2"]);
}

#[test]
fn decodes_envelope_metadata_aliases() {
    let body = ListingBody::<ProductSummary>::decode(
        json!({
            "results": [{ "id": 1 }],
            "count": 37,
            "page": "2",
            "next": "http://api/products/?page=3",
            "previous": null
        }),
        PRODUCT_RESULT_KEYS,
    );
    let ListingBody::Envelope(envelope) = body else {
        panic!("expected envelope, got {body:?}");
    };
    assert_eq!(envelope.results.len(), 1);
    assert_eq!(envelope.meta.total_count, Some(37));
    assert_eq!(envelope.meta.current_page, Some(2));
    assert_eq!(envelope.meta.total_pages, None);
    assert_eq!(envelope.meta.has_next, Some(true));
    assert_eq!(envelope.meta.has_previous, Some(false));
}

#[test]
fn explicit_flags_win_over_links() {
    let body = ListingBody::<ProductSummary>::decode(
        json!({
            "results": [],
            "total_count": 0,
            "total_pages": 1,
            "has_next": false,
            "next": "http://api/products/?page=2"
        }),
        PRODUCT_RESULT_KEYS,
    );
    let ListingBody::Envelope(envelope) = body else {
        panic!("expected envelope, got {body:?}");
    };
    assert_eq!(envelope.meta.has_next, Some(false));
    assert_eq!(envelope.meta.total_count, Some(0));
}

#[test]
fn null_results_decode_as_empty_envelope() {
    let body =
        ListingBody::<ProductSummary>::decode(json!({ "results": null }), PRODUCT_RESULT_KEYS);
    assert!(matches!(body, ListingBody::Envelope(ref e) if e.results.is_empty()));
}

#[test]
fn unexpected_shapes_are_unrecognized() {
    let cases = [
        json!({ "detail": "ok" }),
        json!({ "results": "nope" }),
        json!("text"),
        json!(17),
        json!([{ "name": "missing id" }]),
    ];
    for case in cases {
        let body = ListingBody::<ProductSummary>::decode(case.clone(), PRODUCT_RESULT_KEYS);
        assert!(
            matches!(body, ListingBody::Unrecognized(_)),
            "{case} decoded as {body:?}"
        );
    }
}

#[test]
fn non_json_body_is_unrecognized() {
    let body = ListingBody::<ProductSummary>::from_slice(b"<html>", PRODUCT_RESULT_KEYS);
    assert!(matches!(body, ListingBody::Unrecognized(reason) if reason.contains("not JSON")));
}

#[test]
fn categories_accept_categories_key() {
    let body = ListingBody::<Category>::decode(
        json!({ "categories": [{ "id": 1, "name": "Shoes", "description": "Footwear" }] }),
        CATEGORY_RESULT_KEYS,
    );
    let items = body.into_items();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].display_name(), "Shoes");
}

#[test]
fn sort_key_maps_to_ordering_parameter() {
    assert_eq!(SortKey::PriceAsc.ordering(), Some("price"));
    assert_eq!(SortKey::PriceDesc.ordering(), Some("-price"));
    assert_eq!(SortKey::NameAsc.ordering(), Some("name"));
    assert_eq!(SortKey::NameDesc.ordering(), Some("-name"));
    assert_eq!(SortKey::None.ordering(), None);
    assert_eq!("price_desc".parse::<SortKey>(), Ok(SortKey::PriceDesc));
    assert_eq!("".parse::<SortKey>(), Ok(SortKey::None));
    assert!("cheapest".parse::<SortKey>().is_err());
}

#[test]
fn error_body_summary_prefers_detail_fields() {
    assert_eq!(
        summarize_error_body(r#"{"detail":"Not found."}"#),
        "Not found."
    );
    assert_eq!(
        summarize_error_body(r#"{"error":"Product out of stock"}"#),
        "Product out of stock"
    );
    assert_eq!(
        summarize_error_body(r#"{"page_size":["Ensure this value is positive."]}"#),
        "page_size: Ensure this value is positive."
    );
    assert_eq!(summarize_error_body("  Internal Server Error \n"), "Internal Server Error");
}
