use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};

use crate::{catalog::CatalogEngine, endpoints::ApiEndpoints};

#[derive(Clone)]
pub(crate) struct MockReply {
    status: StatusCode,
    body: String,
    delay: Duration,
}

impl MockReply {
    pub(crate) fn json(value: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: value.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn raw(status: StatusCode, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Default)]
struct MockApiState {
    product_list: Option<MockReply>,
    product_pages: HashMap<String, MockReply>,
    featured: Option<MockReply>,
    categories: Option<MockReply>,
    products: HashMap<String, MockReply>,
    list_queries: Vec<HashMap<String, String>>,
    detail_requests: Vec<String>,
}

/// In-process stand-in for the storefront API.
#[derive(Clone, Default)]
pub(crate) struct MockApi {
    inner: Arc<Mutex<MockApiState>>,
}

impl MockApi {
    pub(crate) async fn set_product_list(&self, reply: MockReply) {
        self.inner.lock().await.product_list = Some(reply);
    }

    /// Reply used when the listing is requested with `page=<page>`.
    pub(crate) async fn set_product_page(&self, page: u32, reply: MockReply) {
        self.inner
            .lock()
            .await
            .product_pages
            .insert(page.to_string(), reply);
    }

    pub(crate) async fn set_featured(&self, reply: MockReply) {
        self.inner.lock().await.featured = Some(reply);
    }

    pub(crate) async fn set_categories(&self, reply: MockReply) {
        self.inner.lock().await.categories = Some(reply);
    }

    pub(crate) async fn set_product(&self, id: &str, reply: MockReply) {
        self.inner
            .lock()
            .await
            .products
            .insert(id.to_string(), reply);
    }

    pub(crate) async fn list_queries(&self) -> Vec<HashMap<String, String>> {
        self.inner.lock().await.list_queries.clone()
    }

    pub(crate) async fn detail_requests(&self) -> Vec<String> {
        self.inner.lock().await.detail_requests.clone()
    }
}

async fn respond(reply: Option<MockReply>) -> impl IntoResponse {
    let reply = reply.unwrap_or_else(|| MockReply::json(Value::Array(Vec::new())));
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }
    (
        reply.status,
        [(header::CONTENT_TYPE, "application/json")],
        reply.body,
    )
}

async fn handle_product_list(
    State(api): State<MockApi>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let reply = {
        let mut guard = api.inner.lock().await;
        guard.list_queries.push(query.clone());
        if query.contains_key("is_featured") {
            guard.featured.clone()
        } else {
            query
                .get("page")
                .and_then(|page| guard.product_pages.get(page).cloned())
                .or_else(|| guard.product_list.clone())
        }
    };
    respond(reply).await
}

async fn handle_product_detail(
    State(api): State<MockApi>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let reply = {
        let mut guard = api.inner.lock().await;
        guard.detail_requests.push(id.clone());
        guard.products.get(&id).cloned().unwrap_or_else(|| {
            MockReply::raw(StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#)
        })
    };
    respond(Some(reply)).await
}

async fn handle_categories(State(api): State<MockApi>) -> impl IntoResponse {
    let reply = api.inner.lock().await.categories.clone();
    respond(reply).await
}

pub(crate) async fn spawn_mock_api() -> (String, MockApi) {
    let api = MockApi::default();
    let app = Router::new()
        .route("/api/products/", get(handle_product_list))
        .route("/api/products/:id/", get(handle_product_detail))
        .route("/api/categories/", get(handle_categories))
        .with_state(api.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}"), api)
}

pub(crate) async fn engine_for_mock() -> (Arc<CatalogEngine>, MockApi) {
    let (base_url, api) = spawn_mock_api().await;
    let endpoints = ApiEndpoints::new(&base_url).expect("endpoints");
    (CatalogEngine::new(endpoints), api)
}

pub(crate) fn products(ids: &[u32]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "name": format!("Product {id}"),
                    "price": format!("{id}.00"),
                })
            })
            .collect(),
    )
}
