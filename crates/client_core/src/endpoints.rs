use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("invalid API base URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("unsupported API base URL scheme '{0}'")]
    UnsupportedScheme(String),
}

/// Resource URLs derived from the API base (`<base>/api/<resource>/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    base_url: Url,
    products: Url,
    categories: Url,
}

impl ApiEndpoints {
    pub fn new(base_url: &str) -> Result<Self, EndpointError> {
        let base_url = Url::parse(base_url.trim())?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(EndpointError::UnsupportedScheme(
                base_url.scheme().to_string(),
            ));
        }
        Ok(Self {
            products: resource_url(&base_url, &["api", "products"]),
            categories: resource_url(&base_url, &["api", "categories"]),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn product_list(&self) -> Url {
        self.products.clone()
    }

    pub fn product_detail(&self, product_id: &str) -> Url {
        let mut url = self.products.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(product_id).push("");
        }
        url
    }

    pub fn category_list(&self) -> Url {
        self.categories.clone()
    }
}

fn resource_url(base_url: &Url, path: &[&str]) -> Url {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().extend(path).push("");
    }
    url
}
