use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::domain::{CategoryId, ProductId};

/// Result-list keys tried, in order, on an envelope object.
pub const PRODUCT_RESULT_KEYS: &[&str] = &["results"];
pub const CATEGORY_RESULT_KEYS: &[&str] = &["results", "categories"];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Text(String),
    Number(serde_json::Number),
}

/// Prices arrive as decimal strings or bare numbers; keep the text form.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(
        Option::<RawText>::deserialize(deserializer)?.map(|raw| match raw {
            RawText::Text(text) => text,
            RawText::Number(n) => n.to_string(),
        }),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Category")
    }
}

/// A product's category is either embedded or referenced by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Nested(Category),
    Id(CategoryId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i64>,
    #[serde(default)]
    pub is_featured: bool,
}

impl ProductSummary {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed Product")
    }

    pub fn display_price(&self) -> &str {
        self.price.as_deref().unwrap_or("0.00")
    }

    pub fn category_label(&self) -> &str {
        match &self.category {
            Some(CategoryRef::Nested(category)) if category.name.is_some() => {
                category.display_name()
            }
            _ => self.category_name.as_deref().unwrap_or("Uncategorized"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Pagination metadata as reported by an envelope; every field optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvelopeMeta {
    pub current_page: Option<u64>,
    pub page_size: Option<u64>,
    pub total_pages: Option<u64>,
    pub total_count: Option<u64>,
    pub has_next: Option<bool>,
    pub has_previous: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<T> {
    pub results: Vec<T>,
    pub meta: EnvelopeMeta,
}

/// A listing body decoded once at the API boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingBody<T> {
    BareList(Vec<T>),
    Envelope(Envelope<T>),
    Unrecognized(String),
}

impl<T: DeserializeOwned> ListingBody<T> {
    pub fn from_slice(bytes: &[u8], result_keys: &[&str]) -> Self {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(value) => Self::decode(value, result_keys),
            Err(e) => Self::Unrecognized(format!("body is not JSON: {e}")),
        }
    }

    pub fn decode(value: Value, result_keys: &[&str]) -> Self {
        match value {
            Value::Array(items) => match decode_items(items) {
                Ok(items) => Self::BareList(items),
                Err(reason) => Self::Unrecognized(reason),
            },
            Value::Object(mut object) => {
                let Some(key) = result_keys
                    .iter()
                    .copied()
                    .find(|key| object.contains_key(*key))
                else {
                    return Self::Unrecognized(format!(
                        "object without any of {result_keys:?}"
                    ));
                };
                let results = match object.remove(key) {
                    Some(Value::Array(items)) => items,
                    Some(Value::Null) | None => Vec::new(),
                    Some(other) => {
                        return Self::Unrecognized(format!(
                            "'{key}' is {} rather than a list",
                            json_kind(&other)
                        ))
                    }
                };
                match decode_items(results) {
                    Ok(results) => Self::Envelope(Envelope {
                        results,
                        meta: EnvelopeMeta::from_object(&object),
                    }),
                    Err(reason) => Self::Unrecognized(reason),
                }
            }
            other => Self::Unrecognized(format!("unexpected {} body", json_kind(&other))),
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            ListingBody::BareList(items) => items,
            ListingBody::Envelope(envelope) => envelope.results,
            ListingBody::Unrecognized(_) => Vec::new(),
        }
    }
}

fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>, String> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| format!("item {index} rejected: {e}"))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

impl EnvelopeMeta {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            current_page: first_count(object, &["current_page", "page"]),
            page_size: first_count(object, &["page_size", "per_page"]),
            total_pages: first_count(object, &["total_pages", "num_pages"]),
            total_count: first_count(object, &["total_count", "count"]),
            has_next: first_flag(object, "has_next", "next"),
            has_previous: first_flag(object, "has_previous", "previous"),
        }
    }
}

fn first_count(object: &Map<String, Value>, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|key| object.get(*key).and_then(as_count))
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// `flag_key` is a boolean; `link_key` is a URL that is null when absent.
fn first_flag(object: &Map<String, Value>, flag_key: &str, link_key: &str) -> Option<bool> {
    if let Some(flag) = object.get(flag_key).and_then(Value::as_bool) {
        return Some(flag);
    }
    object.get(link_key).map(|link| match link {
        Value::Null => false,
        Value::String(url) => !url.is_empty(),
        _ => true,
    })
}
