use std::sync::Arc;

use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::protocol::{
    Category, ListingBody, ProductDetail, ProductSummary, CATEGORY_RESULT_KEYS,
    PRODUCT_RESULT_KEYS,
};
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::{
    endpoints::ApiEndpoints,
    error::CatalogError,
    query::{catalog_params, featured_params},
    state::{CatalogState, FilterState, PaginationState, DEFAULT_PAGE_SIZE},
};

pub const DEFAULT_FEATURED_LIMIT: u32 = 4;

type Result<T> = std::result::Result<T, CatalogError>;

/// One normalized catalog page: items in server order plus pagination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogResponse {
    pub items: Vec<ProductSummary>,
    pub pagination: PaginationState,
}

impl CatalogResponse {
    pub fn empty(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            pagination: PaginationState {
                page_size,
                ..PaginationState::default()
            },
        }
    }

    /// Reconciles the listing shapes into one page. `page` and `page_size`
    /// are the values that were requested and fill in whatever the server
    /// leaves out.
    pub fn from_listing(
        body: ListingBody<ProductSummary>,
        page: u32,
        page_size: u32,
    ) -> Result<Self> {
        match body {
            ListingBody::BareList(items) => {
                let total_count = items.len() as u64;
                Ok(Self {
                    items,
                    pagination: PaginationState {
                        current_page: 1,
                        page_size,
                        total_pages: 1,
                        total_count,
                        has_next: false,
                        has_previous: false,
                    },
                })
            }
            ListingBody::Envelope(envelope) => {
                let meta = envelope.meta;
                let page_size = meta
                    .page_size
                    .filter(|size| *size > 0)
                    .map(saturate)
                    .unwrap_or(page_size);
                let total_count = meta
                    .total_count
                    .unwrap_or(envelope.results.len() as u64);
                let total_pages = meta
                    .total_pages
                    .filter(|pages| *pages > 0)
                    .map(saturate)
                    .unwrap_or_else(|| saturate(total_count.div_ceil(u64::from(page_size))))
                    .max(1);
                let current_page = meta
                    .current_page
                    .map(saturate)
                    .unwrap_or(page)
                    .clamp(1, total_pages);
                Ok(Self {
                    items: envelope.results,
                    pagination: PaginationState {
                        current_page,
                        page_size,
                        total_pages,
                        total_count,
                        has_next: meta.has_next.unwrap_or(current_page < total_pages),
                        has_previous: meta.has_previous.unwrap_or(current_page > 1),
                    },
                })
            }
            ListingBody::Unrecognized(reason) => Err(CatalogError::MalformedResponse(reason)),
        }
    }
}

fn saturate(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Catalog query engine: owns the filter/pagination state and the HTTP
/// client used for every product and category read.
pub struct CatalogEngine {
    http: Client,
    endpoints: ApiEndpoints,
    featured_limit: u32,
    inner: Mutex<CatalogState>,
}

/// Construction-time knobs for [`CatalogEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    pub page_size: u32,
    pub featured_limit: u32,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            featured_limit: DEFAULT_FEATURED_LIMIT,
        }
    }
}

impl CatalogEngine {
    pub fn new(endpoints: ApiEndpoints) -> Arc<Self> {
        Self::new_with_options(Client::new(), endpoints, CatalogOptions::default())
    }

    pub fn new_with_options(
        http: Client,
        endpoints: ApiEndpoints,
        options: CatalogOptions,
    ) -> Arc<Self> {
        let pagination = PaginationState {
            page_size: options.page_size.max(1),
            ..PaginationState::default()
        };
        Arc::new(Self {
            http,
            endpoints,
            featured_limit: options.featured_limit.max(1),
            inner: Mutex::new(CatalogState {
                pagination,
                ..CatalogState::default()
            }),
        })
    }

    pub fn endpoints(&self) -> &ApiEndpoints {
        &self.endpoints
    }

    pub async fn filters(&self) -> FilterState {
        self.inner.lock().await.filters.clone()
    }

    pub async fn pagination(&self) -> PaginationState {
        self.inner.lock().await.pagination
    }

    /// Fetches the page described by the engine's current state.
    pub async fn load(&self) -> Result<CatalogResponse> {
        let (filters, pagination) = {
            let guard = self.inner.lock().await;
            (guard.filters.clone(), guard.pagination)
        };
        self.fetch_catalog_page(&filters, &pagination).await
    }

    /// Issues one listing read and, if no newer read was issued meanwhile,
    /// stores `filters` together with the resulting pagination. A failed
    /// read leaves the stored state as it was.
    pub async fn fetch_catalog_page(
        &self,
        filters: &FilterState,
        pagination: &PaginationState,
    ) -> Result<CatalogResponse> {
        let ticket = self.inner.lock().await.issue_ticket();
        let (page, page_size) = pagination.request();
        let params = catalog_params(filters, pagination);
        info!(ticket, page, page_size, "catalog: requesting page");

        let body = match self.get(self.endpoints.product_list(), &params).await {
            Ok(body) => body,
            Err(err) => {
                self.ensure_latest(ticket).await?;
                return Err(err);
            }
        };

        let listing = ListingBody::from_slice(&body, PRODUCT_RESULT_KEYS);
        let response = CatalogResponse::from_listing(listing, page, page_size)
            .unwrap_or_else(|err| {
                warn!(
                    ticket,
                    error = %err,
                    "catalog: unexpected listing shape, showing no products"
                );
                CatalogResponse::empty(page_size)
            });

        let mut guard = self.inner.lock().await;
        let latest = guard.latest_ticket();
        if ticket != latest {
            info!(ticket, latest, "catalog: discarding superseded response");
            return Err(CatalogError::Superseded { ticket, latest });
        }
        guard.filters = filters.clone();
        guard.pagination = response.pagination;
        info!(
            ticket,
            items = response.items.len(),
            current_page = response.pagination.current_page,
            total_pages = response.pagination.total_pages,
            total_count = response.pagination.total_count,
            "catalog: page loaded"
        );
        Ok(response)
    }

    /// Moves to `page` and refetches. Out-of-range pages are ignored.
    pub async fn change_page(&self, page: i64) -> Result<Option<CatalogResponse>> {
        let (filters, pagination) = {
            let guard = self.inner.lock().await;
            if !guard.pagination.contains_page(page) {
                info!(
                    page,
                    total_pages = guard.pagination.total_pages,
                    "catalog: page out of range"
                );
                return Ok(None);
            }
            let pagination = PaginationState {
                current_page: saturate(page as u64),
                ..guard.pagination
            };
            (guard.filters.clone(), pagination)
        };
        self.fetch_catalog_page(&filters, &pagination).await.map(Some)
    }

    pub async fn change_page_input(&self, raw: &str) -> Result<Option<CatalogResponse>> {
        match raw.trim().parse::<i64>() {
            Ok(page) => self.change_page(page).await,
            Err(_) => {
                info!(input = raw, "catalog: ignoring non-numeric page");
                Ok(None)
            }
        }
    }

    /// Switches page size, returns to the first page and refetches.
    pub async fn change_page_size(&self, page_size: i64) -> Result<Option<CatalogResponse>> {
        let Some(page_size) = u32::try_from(page_size).ok().filter(|size| *size > 0) else {
            info!(page_size, "catalog: ignoring invalid page size");
            return Ok(None);
        };
        let (filters, pagination) = {
            let guard = self.inner.lock().await;
            let pagination = PaginationState {
                current_page: 1,
                page_size,
                ..guard.pagination
            };
            (guard.filters.clone(), pagination)
        };
        self.fetch_catalog_page(&filters, &pagination).await.map(Some)
    }

    pub async fn change_page_size_input(&self, raw: &str) -> Result<Option<CatalogResponse>> {
        match raw.trim().parse::<i64>() {
            Ok(page_size) => self.change_page_size(page_size).await,
            Err(_) => {
                info!(input = raw, "catalog: ignoring non-numeric page size");
                Ok(None)
            }
        }
    }

    /// Replaces every filter and fetches the first page of the new result.
    pub async fn apply_filters(&self, filters: FilterState) -> Result<CatalogResponse> {
        info!(filters = ?filters, "catalog: applying filters");
        let pagination = PaginationState {
            current_page: 1,
            ..self.inner.lock().await.pagination
        };
        self.fetch_catalog_page(&filters, &pagination).await
    }

    pub async fn clear_filters(&self) -> Result<CatalogResponse> {
        self.apply_filters(FilterState::default()).await
    }

    pub async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let body = self.get(self.endpoints.category_list(), &[]).await?;
        Ok(listing_items(
            ListingBody::from_slice(&body, CATEGORY_RESULT_KEYS),
            "categories",
        ))
    }

    /// Featured products for the home view. Leaves catalog state untouched.
    pub async fn fetch_featured(&self) -> Result<Vec<ProductSummary>> {
        let body = self
            .get(
                self.endpoints.product_list(),
                &featured_params(self.featured_limit),
            )
            .await?;
        Ok(listing_items(
            ListingBody::from_slice(&body, PRODUCT_RESULT_KEYS),
            "featured products",
        ))
    }

    pub async fn fetch_product(&self, product_id: &str) -> Result<ProductDetail> {
        let body = self
            .get(self.endpoints.product_detail(product_id), &[])
            .await?;
        decode_json(&body)
    }

    async fn ensure_latest(&self, ticket: u64) -> Result<()> {
        let latest = self.inner.lock().await.latest_ticket();
        if ticket == latest {
            Ok(())
        } else {
            Err(CatalogError::Superseded { ticket, latest })
        }
    }

    async fn get(&self, url: Url, query: &[(&'static str, String)]) -> Result<Vec<u8>> {
        let response = self.http.get(url.clone()).query(query).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = status.as_u16(), "catalog: request failed");
            return Err(CatalogError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

fn listing_items<T: DeserializeOwned>(listing: ListingBody<T>, what: &str) -> Vec<T> {
    if let ListingBody::Unrecognized(reason) = &listing {
        warn!(resource = what, reason = %reason, "catalog: unexpected listing shape");
    }
    listing.into_items()
}

fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| CatalogError::MalformedResponse(e.to_string()))
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
