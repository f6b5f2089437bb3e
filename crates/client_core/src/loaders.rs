//! Router loaders backed by the catalog engine.
//!
//! Each loader fetches what its view needs and publishes the result as a
//! [`ViewUpdate`] for whichever view controller is listening.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::protocol::{Category, ProductDetail, ProductSummary};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::{
    catalog::{CatalogEngine, CatalogResponse},
    error::CatalogError,
    router::{Router, View, ViewLoader},
};

#[derive(Debug, Clone)]
pub enum ViewUpdate {
    Featured(Vec<ProductSummary>),
    Categories(Vec<Category>),
    CategoryFilterOptions(Vec<Category>),
    CatalogPage(CatalogResponse),
    Product(ProductDetail),
}

fn publish(updates: &broadcast::Sender<ViewUpdate>, update: ViewUpdate) {
    // Nobody rendering is not an error.
    let _ = updates.send(update);
}

pub struct FeaturedProductsLoader {
    engine: Arc<CatalogEngine>,
    updates: broadcast::Sender<ViewUpdate>,
}

#[async_trait]
impl ViewLoader for FeaturedProductsLoader {
    async fn load(&self, _param: Option<&str>) -> Result<()> {
        let products = self.engine.fetch_featured().await?;
        info!(count = products.len(), "loader: featured products ready");
        publish(&self.updates, ViewUpdate::Featured(products));
        Ok(())
    }
}

/// Products view: refreshes the category filter options, then the current
/// catalog page.
pub struct CatalogPageLoader {
    engine: Arc<CatalogEngine>,
    updates: broadcast::Sender<ViewUpdate>,
}

#[async_trait]
impl ViewLoader for CatalogPageLoader {
    async fn load(&self, _param: Option<&str>) -> Result<()> {
        match self.engine.fetch_categories().await {
            Ok(categories) => publish(&self.updates, ViewUpdate::CategoryFilterOptions(categories)),
            Err(err) => warn!(error = %err, "loader: category filter options unavailable"),
        }

        match self.engine.load().await {
            Ok(page) => {
                publish(&self.updates, ViewUpdate::CatalogPage(page));
                Ok(())
            }
            Err(CatalogError::Superseded { ticket, latest }) => {
                info!(ticket, latest, "loader: newer catalog request in flight");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub struct CategoriesLoader {
    engine: Arc<CatalogEngine>,
    updates: broadcast::Sender<ViewUpdate>,
}

#[async_trait]
impl ViewLoader for CategoriesLoader {
    async fn load(&self, _param: Option<&str>) -> Result<()> {
        let categories = self.engine.fetch_categories().await?;
        publish(&self.updates, ViewUpdate::Categories(categories));
        Ok(())
    }
}

pub struct ProductDetailLoader {
    engine: Arc<CatalogEngine>,
    updates: broadcast::Sender<ViewUpdate>,
}

#[async_trait]
impl ViewLoader for ProductDetailLoader {
    async fn load(&self, param: Option<&str>) -> Result<()> {
        let product_id = param.ok_or_else(|| anyhow!("product detail opened without an id"))?;
        let product = self.engine.fetch_product(product_id).await?;
        publish(&self.updates, ViewUpdate::Product(product));
        Ok(())
    }
}

/// Wires the catalog-backed loaders into `router` and returns the sender
/// their results are published on.
pub async fn register_catalog_loaders(
    router: &Router,
    engine: Arc<CatalogEngine>,
) -> broadcast::Sender<ViewUpdate> {
    let (updates, _) = broadcast::channel(64);
    router
        .register_loader(
            View::Home,
            Arc::new(FeaturedProductsLoader {
                engine: engine.clone(),
                updates: updates.clone(),
            }),
        )
        .await;
    router
        .register_loader(
            View::Products,
            Arc::new(CatalogPageLoader {
                engine: engine.clone(),
                updates: updates.clone(),
            }),
        )
        .await;
    router
        .register_loader(
            View::Categories,
            Arc::new(CategoriesLoader {
                engine: engine.clone(),
                updates: updates.clone(),
            }),
        )
        .await;
    router
        .register_loader(
            View::ProductDetail,
            Arc::new(ProductDetailLoader {
                engine,
                updates: updates.clone(),
            }),
        )
        .await;
    updates
}

#[cfg(test)]
#[path = "tests/loaders_tests.rs"]
mod tests;
