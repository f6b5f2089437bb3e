//! Path based view router.
//!
//! Exactly one [`View`] is visible at a time. Activating a path hides the
//! previous view, shows the matched one, publishes a [`RouterEvent`] and runs
//! the loader registered for that view, if any.

use std::{collections::HashMap, sync::Arc};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::session::CredentialStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Login,
    Register,
    Profile,
    Products,
    Categories,
    Cart,
    Checkout,
    Orders,
    ProductDetail,
    OrderDetail,
}

impl View {
    pub const ALL: [View; 11] = [
        View::Home,
        View::Login,
        View::Register,
        View::Profile,
        View::Products,
        View::Categories,
        View::Cart,
        View::Checkout,
        View::Orders,
        View::ProductDetail,
        View::OrderDetail,
    ];

    pub fn requires_auth(self) -> bool {
        matches!(
            self,
            View::Profile | View::Cart | View::Orders | View::Checkout
        )
    }

    pub fn guest_only(self) -> bool {
        matches!(self, View::Login | View::Register)
    }
}

const STATIC_ROUTES: &[(&str, View)] = &[
    ("/", View::Home),
    ("/login", View::Login),
    ("/register", View::Register),
    ("/profile", View::Profile),
    ("/products", View::Products),
    ("/categories", View::Categories),
    ("/cart", View::Cart),
    ("/checkout", View::Checkout),
    ("/orders", View::Orders),
];

/// `/<resource>/<id>` routes, keyed by resource segment.
const TEMPLATED_ROUTES: &[(&str, View)] = &[
    ("product", View::ProductDetail),
    ("order", View::OrderDetail),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub view: View,
    pub param: Option<String>,
}

impl RouteMatch {
    fn home() -> Self {
        Self {
            view: View::Home,
            param: None,
        }
    }
}

fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ if path.is_empty() => "/",
        _ => path,
    }
}

/// Maps a path to its view. Exact routes win over templated ones and
/// anything unmatched resolves to the home view.
pub fn resolve(path: &str) -> RouteMatch {
    let path = normalize_path(path);

    if let Some((_, view)) = STATIC_ROUTES.iter().find(|(route, _)| *route == path) {
        return RouteMatch {
            view: *view,
            param: None,
        };
    }

    let Some(rest) = path.strip_prefix('/') else {
        return RouteMatch::home();
    };
    let mut segments = rest.split('/');
    let (Some(resource), Some(id), None) = (segments.next(), segments.next(), segments.next())
    else {
        return RouteMatch::home();
    };
    if id.is_empty() {
        return RouteMatch::home();
    }

    TEMPLATED_ROUTES
        .iter()
        .find(|(name, _)| *name == resource)
        .map(|(_, view)| RouteMatch {
            view: *view,
            param: Some(id.to_string()),
        })
        .unwrap_or_else(RouteMatch::home)
}

/// Where a freshly opened path should redirect, given the session.
pub fn guard_redirect(view: View, authenticated: bool) -> Option<&'static str> {
    if authenticated && view.guest_only() {
        Some("/")
    } else if !authenticated && view.requires_auth() {
        Some("/login")
    } else {
        None
    }
}

/// Data loading for a view. Failures stay with the loader; the router only
/// logs them.
#[async_trait]
pub trait ViewLoader: Send + Sync {
    async fn load(&self, param: Option<&str>) -> Result<()>;
}

#[async_trait]
pub trait History: Send + Sync {
    async fn push(&self, path: &str);
    async fn current(&self) -> String;
    /// Steps back one entry; `false` when already at the oldest entry.
    async fn back(&self) -> bool;
    async fn forward(&self) -> bool;
}

struct HistoryStack {
    entries: Vec<String>,
    cursor: usize,
}

/// In-process session history with browser semantics: pushing discards any
/// forward entries.
pub struct MemoryHistory {
    inner: Mutex<HistoryStack>,
}

impl MemoryHistory {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new(HistoryStack {
                entries: vec![initial_path.into()],
                cursor: 0,
            }),
        }
    }

    pub async fn entries(&self) -> Vec<String> {
        self.inner.lock().await.entries.clone()
    }
}

#[async_trait]
impl History for MemoryHistory {
    async fn push(&self, path: &str) {
        let mut guard = self.inner.lock().await;
        let keep = guard.cursor + 1;
        guard.entries.truncate(keep);
        guard.entries.push(path.to_string());
        guard.cursor = guard.entries.len() - 1;
    }

    async fn current(&self) -> String {
        let guard = self.inner.lock().await;
        guard.entries.get(guard.cursor).cloned().unwrap_or_else(|| "/".to_string())
    }

    async fn back(&self) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.cursor == 0 {
            return false;
        }
        guard.cursor -= 1;
        true
    }

    async fn forward(&self) -> bool {
        let mut guard = self.inner.lock().await;
        if guard.cursor + 1 >= guard.entries.len() {
            return false;
        }
        guard.cursor += 1;
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterEvent {
    ViewActivated {
        view: View,
        param: Option<String>,
        previous: Option<View>,
    },
}

pub struct Router {
    history: Arc<dyn History>,
    loaders: RwLock<HashMap<View, Arc<dyn ViewLoader>>>,
    visible: RwLock<Option<View>>,
    events: broadcast::Sender<RouterEvent>,
}

impl Router {
    pub fn new(history: Arc<dyn History>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            history,
            loaders: RwLock::new(HashMap::new()),
            visible: RwLock::new(None),
            events,
        })
    }

    pub async fn register_loader(&self, view: View, loader: Arc<dyn ViewLoader>) {
        self.loaders.write().await.insert(view, loader);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    pub async fn visible_view(&self) -> Option<View> {
        *self.visible.read().await
    }

    pub async fn is_visible(&self, view: View) -> bool {
        self.visible_view().await == Some(view)
    }

    pub async fn current_path(&self) -> String {
        self.history.current().await
    }

    /// Records `path` in history, then activates it.
    pub async fn navigate(&self, path: &str) -> RouteMatch {
        self.history.push(path).await;
        self.activate(path).await
    }

    /// Shows the view for `path` and runs its loader. Never fails: a missing
    /// loader skips data loading and a failing one is logged.
    pub async fn activate(&self, path: &str) -> RouteMatch {
        let route = resolve(path);
        let previous = self.visible.write().await.replace(route.view);
        info!(path, view = ?route.view, param = ?route.param, "router: view activated");

        // No subscribers is fine.
        let _ = self.events.send(RouterEvent::ViewActivated {
            view: route.view,
            param: route.param.clone(),
            previous,
        });

        let loader = self.loaders.read().await.get(&route.view).cloned();
        match loader {
            Some(loader) => {
                if let Err(err) = loader.load(route.param.as_deref()).await {
                    warn!(view = ?route.view, error = %err, "router: view loader failed");
                }
            }
            None => debug!(view = ?route.view, "router: no loader registered"),
        }
        route
    }

    /// Back/forward navigation: re-activates the current history entry
    /// without pushing a new one.
    pub async fn handle_pop_state(&self) -> RouteMatch {
        let path = self.history.current().await;
        self.activate(&path).await
    }

    pub async fn back(&self) -> Option<RouteMatch> {
        if self.history.back().await {
            Some(self.handle_pop_state().await)
        } else {
            None
        }
    }

    pub async fn forward(&self) -> Option<RouteMatch> {
        if self.history.forward().await {
            Some(self.handle_pop_state().await)
        } else {
            None
        }
    }

    /// First activation after start-up. Signed-in users are sent away from
    /// the login/register views and anonymous users away from account views.
    pub async fn start(&self, credentials: &dyn CredentialStore) -> RouteMatch {
        let path = self.history.current().await;
        let route = resolve(&path);
        match guard_redirect(route.view, credentials.is_authenticated()) {
            Some(target) => {
                info!(from = %path, to = target, "router: redirecting on start");
                self.navigate(target).await
            }
            None => self.activate(&path).await,
        }
    }
}

#[cfg(test)]
#[path = "tests/router_tests.rs"]
mod tests;
