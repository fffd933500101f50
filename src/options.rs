//! Options passed per transformed file, mirroring what the JS plugin sends
//! across the bridge.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

lazy_static! {
    /// Characters a hash may use and still leave the generated names valid
    /// JS identifiers.
    static ref HASH_RE: Regex = Regex::new(r"^[0-9A-Za-z_$]+$").unwrap();
}

/// Module specifiers and binding names baked into generated code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeModules {
    /// Import path of the user's i18n configuration.
    pub config_module: String,
    /// Local binding the configuration is imported under.
    pub config_binding: String,
    /// Module exporting the namespace loader (default export) and `log`.
    pub loader_module: String,
    /// Module exporting the client-component translation HOC.
    pub hoc_module: String,
    /// Module exporting `useSearchParams` and `useParams`.
    pub navigation_module: String,
    /// Root the fallback `loadLocaleFrom` imports JSON namespaces from.
    pub locales_root: String,
}

impl Default for RuntimeModules {
    fn default() -> Self {
        RuntimeModules {
            config_module: "@next-translate-root/i18n".to_string(),
            config_binding: "__i18nConfig".to_string(),
            loader_module: "next-translate/loadNamespaces".to_string(),
            hoc_module: "next-translate/withTranslationClientComponent".to_string(),
            navigation_module: "next/navigation".to_string(),
            locales_root: "@next-translate-root/locales".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateOptions {
    /// Route path with the extension stripped, e.g. `/blog/page`.
    pub page_no_ext: String,
    pub normalized_resource_path: String,
    pub app_folder: String,
    /// Set by the caller when the file carries a client directive.
    pub is_client_component: bool,
    /// Identifier suffix; derived from the resource path when absent. Must
    /// match `[0-9A-Za-z_$]+`.
    pub hash: Option<String>,
    pub runtime: RuntimeModules,
}

impl TemplateOptions {
    /// A page is a `page` file living inside the app-router tree.
    pub fn is_page(&self) -> bool {
        self.page_no_ext.ends_with("/page")
            && self.normalized_resource_path.contains(&self.app_folder)
    }

    /// The caller's hash, if it can be embedded in an identifier.
    pub fn identifier_hash(&self) -> Option<&str> {
        self.hash.as_deref().filter(|h| HASH_RE.is_match(h))
    }

    pub fn validate(&self) -> Result<(), TransformError> {
        match &self.hash {
            Some(hash) if !HASH_RE.is_match(hash) => Err(TransformError::InvalidOptions(format!(
                "hash '{}' must match [0-9A-Za-z_$]+",
                hash
            ))),
            _ => Ok(()),
        }
    }

    /// Route pathname the page serves: `/blog/page` -> `/blog/`.
    pub fn pathname(&self) -> String {
        match self.page_no_ext.strip_suffix("page") {
            Some(prefix) if prefix.ends_with('/') => prefix.to_string(),
            _ => "/".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(page: &str, resource: &str, app: &str) -> TemplateOptions {
        TemplateOptions {
            page_no_ext: page.to_string(),
            normalized_resource_path: resource.to_string(),
            app_folder: app.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_is_page_requires_suffix_and_app_folder() {
        assert!(options("/blog/page", "/proj/app/blog/page.tsx", "/app").is_page());
        assert!(!options("/blog/layout", "/proj/app/blog/layout.tsx", "/app").is_page());
        assert!(!options("/blog/page", "/proj/pages/blog/page.tsx", "/app").is_page());
        assert!(!options("/blog/mypage", "/proj/app/blog/mypage.tsx", "/app").is_page());
    }

    #[test]
    fn test_pathname_strips_only_trailing_segment() {
        assert_eq!(options("/blog/page", "", "").pathname(), "/blog/");
        assert_eq!(options("/page", "", "").pathname(), "/");
        assert_eq!(options("/pages/page", "", "").pathname(), "/pages/");
    }

    #[test]
    fn test_hash_must_fit_in_identifier() {
        let mut opts = options("/page", "/app/page.tsx", "/app");
        opts.hash = Some("a-b".to_string());
        assert!(matches!(opts.validate(), Err(TransformError::InvalidOptions(_))));
        assert_eq!(opts.identifier_hash(), None);

        opts.hash = Some("".to_string());
        assert!(opts.validate().is_err());

        opts.hash = Some("1f_$A".to_string());
        assert!(opts.validate().is_ok());
        assert_eq!(opts.identifier_hash(), Some("1f_$A"));

        opts.hash = None;
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_deserialize_camel_case_with_defaults() {
        let json = r#"{"pageNoExt":"/page","isClientComponent":true}"#;
        let opts: TemplateOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.page_no_ext, "/page");
        assert!(opts.is_client_component);
        assert_eq!(opts.runtime.config_binding, "__i18nConfig");
        assert!(opts.hash.is_none());
    }
}
