use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    register_catalog_loaders, ApiEndpoints, CatalogEngine, CatalogOptions, FilterState,
    MemoryCredentials, MemoryHistory, Router, ViewUpdate,
};
use shared::domain::SortKey;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod render;

#[derive(Parser, Debug)]
#[command(about = "Browse a storefront catalog from the terminal")]
struct Cli {
    /// Overrides the configured API base URL.
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    /// Settings file; `storefront.toml` is read when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List one page of the product catalog.
    Browse {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long, default_value = "none")]
        sort: SortKey,
        #[arg(long, default_value_t = 1)]
        page: i64,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    Categories,
    Featured,
    Product {
        id: String,
    },
    /// Route a path the way the browser app would and print what its view loads.
    ///
    /// Only catalog views (home, products, categories, product detail) load
    /// data; account and order views print the resolved route only.
    Open {
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = config::load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.api_base_url {
        settings.api_base_url = url;
    }
    let endpoints = ApiEndpoints::new(&settings.api_base_url)
        .with_context(|| format!("invalid API base URL '{}'", settings.api_base_url))?;
    info!(api = %endpoints.base_url(), "storefront: using API");

    let page_size_override = match &cli.command {
        Command::Browse { page_size, .. } => *page_size,
        _ => None,
    };
    let engine = CatalogEngine::new_with_options(
        reqwest::Client::new(),
        endpoints,
        CatalogOptions {
            page_size: page_size_override.unwrap_or(settings.page_size),
            featured_limit: settings.featured_limit,
        },
    );

    match cli.command {
        Command::Browse {
            search,
            category,
            min_price,
            max_price,
            sort,
            page,
            json,
            ..
        } => {
            let mut filters = FilterState::default()
                .with_price_range(min_price, max_price)
                .with_sort(sort);
            if let Some(search) = search {
                filters = filters.with_search(search);
            }
            if let Some(category) = category {
                filters = filters.with_category(category);
            }

            let mut response = engine.apply_filters(filters.clone()).await?;
            if page != 1 {
                match engine.change_page(page).await? {
                    Some(moved) => response = moved,
                    None => warn!(page, "storefront: page out of range, showing page 1"),
                }
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                let category_name = category_name(&engine, &filters).await;
                print!(
                    "{}",
                    render::catalog_page(&response, &filters, category_name.as_deref())
                );
            }
        }
        Command::Categories => {
            let categories = engine.fetch_categories().await?;
            print!("{}", render::view_update(&ViewUpdate::Categories(categories)));
        }
        Command::Featured => {
            let products = engine.fetch_featured().await?;
            print!("{}", render::view_update(&ViewUpdate::Featured(products)));
        }
        Command::Product { id } => {
            let product = engine.fetch_product(&id).await?;
            print!("{}", render::product_detail(&product));
        }
        Command::Open { path } => {
            open_path(engine, &path, settings.access_token).await;
        }
    }

    Ok(())
}

async fn category_name(engine: &CatalogEngine, filters: &FilterState) -> Option<String> {
    let id = filters.category_id()?;
    match engine.fetch_categories().await {
        Ok(categories) => categories
            .into_iter()
            .find(|category| category.id.as_str() == id)
            .and_then(|category| category.name),
        Err(err) => {
            warn!(error = %err, "storefront: category lookup failed");
            None
        }
    }
}

async fn open_path(engine: Arc<CatalogEngine>, path: &str, access_token: Option<String>) {
    let router = Router::new(Arc::new(MemoryHistory::new(path)));
    let updates = register_catalog_loaders(&router, engine).await;
    let mut rx = updates.subscribe();

    let route = router.start(&MemoryCredentials::new(access_token)).await;
    println!(
        "{} -> {:?}{}",
        router.current_path().await,
        route.view,
        route
            .param
            .as_deref()
            .map(|param| format!(" ({param})"))
            .unwrap_or_default()
    );

    // Loaders run inside `start`, so everything they published is already queued.
    loop {
        match rx.try_recv() {
            Ok(update) => print!("{}", render::view_update(&update)),
            Err(TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "storefront: dropped view updates");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}
