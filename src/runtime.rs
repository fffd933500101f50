//! Rust model of the runtime contract the generated wrappers follow.
//!
//! The generated JavaScript keeps one `{lang, namespaces, pathname}` record per
//! process (server) or window (client). Here that record is an explicitly
//! injected [`SharedCache`], so the reconciliation rules can be exercised
//! without a JS engine. Rendering is single-threaded on both sides, hence
//! `Rc<RefCell<_>>`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

use crate::error::TransformError;

/// Global property name the cache record is stored under.
pub const CACHE_KEY: &str = "__NEXT_TRANSLATE__";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceCache {
    pub lang: String,
    pub namespaces: Map<String, Value>,
    pub pathname: String,
}

pub type SharedCache = Rc<RefCell<Option<NamespaceCache>>>;

pub fn new_shared_cache() -> SharedCache {
    Rc::new(RefCell::new(None))
}

/// Query `lang`, then route `lang`, then the configured default.
pub fn resolve_locale(search_lang: Option<&str>, route_lang: Option<&str>, default_locale: &str) -> String {
    search_lang
        .or(route_lang)
        .unwrap_or(default_locale)
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderConfig {
    pub locale: String,
    pub loader_name: String,
    pub pathname: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadedNamespaces {
    pub lang: String,
    pub namespaces: Map<String, Value>,
}

pub trait NamespaceLoader {
    fn load(&self, config: &LoaderConfig) -> Result<LoadedNamespaces, TransformError>;
}

/// Attributes of the hidden `__NEXT_TRANSLATE_DATA__` element.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMarker {
    pub lang: String,
    pub namespaces_json: String,
    pub pathname: String,
}

/// Server page render: load, publish to the process cache, emit the marker.
#[derive(Debug, Clone)]
pub struct ServerPageRuntime {
    pub pathname: String,
    pub dynamic: String,
    pub default_locale: String,
}

impl ServerPageRuntime {
    pub fn render(
        &self,
        cache: &SharedCache,
        loader: &dyn NamespaceLoader,
        search_lang: Option<&str>,
        route_lang: Option<&str>,
    ) -> Result<DataMarker, TransformError> {
        let config = LoaderConfig {
            locale: resolve_locale(search_lang, route_lang, &self.default_locale),
            loader_name: format!("{} (server page)", self.dynamic),
            pathname: self.pathname.clone(),
        };
        let loaded = loader.load(&config)?;
        let namespaces_json = Value::Object(loaded.namespaces.clone()).to_string();

        *cache.borrow_mut() = Some(NamespaceCache {
            lang: loaded.lang.clone(),
            namespaces: loaded.namespaces,
            pathname: self.pathname.clone(),
        });

        Ok(DataMarker {
            lang: loaded.lang,
            namespaces_json,
            pathname: self.pathname.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderOutcome {
    /// Nothing is rendered (server pass, or before the first client load).
    Nothing,
    /// The original page renders with its props.
    Page,
}

/// A load started by the client effect; completes independently of others.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLoad {
    pub config: LoaderConfig,
}

/// Client page reconciliation for one component instance.
#[derive(Debug)]
pub struct ClientPageReconciler {
    pathname: String,
    cache: SharedCache,
    renders: u32,
}

impl ClientPageReconciler {
    pub fn new(pathname: impl Into<String>, cache: SharedCache) -> Self {
        ClientPageReconciler {
            pathname: pathname.into(),
            cache,
            renders: 0,
        }
    }

    pub fn config_for(&self, lang: &str) -> LoaderConfig {
        LoaderConfig {
            locale: lang.to_string(),
            loader_name: "useEffect (client page)".to_string(),
            pathname: self.pathname.clone(),
        }
    }

    /// Effect body for a `lang` change. Returns `None` when the cache already
    /// holds this language and pathname.
    pub fn on_lang_change(&self, lang: &str) -> Option<PendingLoad> {
        let fresh = self
            .cache
            .borrow()
            .as_ref()
            .is_some_and(|c| c.lang == lang && c.pathname == self.pathname);
        if fresh {
            debug!(lang, pathname = %self.pathname, "namespaces already loaded");
            return None;
        }
        Some(PendingLoad {
            config: self.config_for(lang),
        })
    }

    /// Resolves a pending load. Whatever finishes last overwrites the cache,
    /// regardless of the order loads were started in.
    pub fn complete(
        &mut self,
        pending: PendingLoad,
        loader: &dyn NamespaceLoader,
    ) -> Result<(), TransformError> {
        let loaded = loader.load(&pending.config)?;
        *self.cache.borrow_mut() = Some(NamespaceCache {
            lang: loaded.lang,
            namespaces: loaded.namespaces,
            pathname: self.pathname.clone(),
        });
        self.renders += 1;
        Ok(())
    }

    /// Runs the effect to completion for `lang`.
    pub fn sync(&mut self, lang: &str, loader: &dyn NamespaceLoader) -> Result<(), TransformError> {
        match self.on_lang_change(lang) {
            Some(pending) => self.complete(pending, loader),
            None => Ok(()),
        }
    }

    pub fn render(&self, is_server: bool, lang: &str) -> RenderOutcome {
        if is_server {
            info!(
                page = %self.pathname,
                lang,
                namespaces = "calculated in client-side",
                "client page rendered on server"
            );
            return RenderOutcome::Nothing;
        }
        if self.cache.borrow().is_none() {
            return RenderOutcome::Nothing;
        }
        RenderOutcome::Page
    }

    /// Forced re-renders triggered by completed loads.
    pub fn forced_renders(&self) -> u32 {
        self.renders
    }
}
