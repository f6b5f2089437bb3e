use std::{fs, path::Path};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "storefront.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontSettings {
    pub api_base_url: String,
    pub page_size: u32,
    pub featured_limit: u32,
    pub access_token: Option<String>,
}

impl Default for StorefrontSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".into(),
            page_size: client_core::state::DEFAULT_PAGE_SIZE,
            featured_limit: client_core::catalog::DEFAULT_FEATURED_LIMIT,
            access_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    page_size: Option<u32>,
    featured_limit: Option<u32>,
    access_token: Option<String>,
}

/// Defaults, then `storefront.toml` (or `config_path`), then environment.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<StorefrontSettings> {
    let mut settings = StorefrontSettings::default();

    let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(e) if config_path.is_some() => {
            return Err(e).with_context(|| format!("failed to read '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut StorefrontSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file_cfg.page_size.filter(|v| *v > 0) {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.featured_limit.filter(|v| *v > 0) {
        settings.featured_limit = v;
    }
    if let Some(v) = file_cfg.access_token {
        settings.access_token = Some(v);
    }
    Ok(())
}

fn apply_env(settings: &mut StorefrontSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("STOREFRONT_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        match v.trim().parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.page_size = parsed,
            _ => warn!(value = %v, "config: ignoring invalid APP__PAGE_SIZE"),
        }
    }
    if let Some(v) = var("APP__FEATURED_LIMIT") {
        match v.trim().parse::<u32>() {
            Ok(parsed) if parsed > 0 => settings.featured_limit = parsed,
            _ => warn!(value = %v, "config: ignoring invalid APP__FEATURED_LIMIT"),
        }
    }

    if let Some(v) = var("APP__ACCESS_TOKEN") {
        settings.access_token = Some(v).filter(|token| !token.trim().is_empty());
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
