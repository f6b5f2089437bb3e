/// Persisted credentials provided by the hosting application.
pub trait CredentialStore: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn is_authenticated(&self) -> bool {
        self.access_token().is_some_and(|token| !token.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCredentials {
    access_token: Option<String>,
}

impl MemoryCredentials {
    pub fn new(access_token: Option<String>) -> Self {
        Self { access_token }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentials {
    fn access_token(&self) -> Option<String> {
        self.access_token.clone()
    }
}
