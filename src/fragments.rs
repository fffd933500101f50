//! Typed pieces shared by the three page/component templates. Templates
//! hold these as parameters and render them in their single formatting pass.

use crate::options::RuntimeModules;
use crate::runtime::CACHE_KEY;

pub const CLIENT_DIRECTIVE: &str = "'use client'";
pub const DEFAULT_DYNAMIC_EXPORT: &str = "export const dynamic = 'force-dynamic';";
pub const DATA_MARKER_ID: &str = "__NEXT_TRANSLATE_DATA__";
pub const HOC_BINDING: &str = "__withTranslationClientComponent";

/// Identifier factory for one invocation; every name embeds the same hash.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedNames {
    hash: String,
}

impl GeneratedNames {
    pub fn new(hash: impl Into<String>) -> Self {
        GeneratedNames { hash: hash.into() }
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Private binding for the page's original default export.
    pub fn page(&self) -> String {
        format!("__Next_Translate__Page__{}__", self.hash)
    }

    /// The generated default export.
    pub fn wrapper(&self) -> String {
        format!("__Next_Translate_new__{}__", self.hash)
    }

    /// Private binding for an intercepted named export.
    pub fn hidden(&self, export_name: &str) -> String {
        format!("__Next_Translate__{}__{}__", export_name, self.hash)
    }

    /// Wrapped replacement re-exported under `export_name`.
    pub fn wrapped(&self, export_name: &str) -> String {
        format!("__Next_Translate_new__{}__{}__", export_name, self.hash)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Import<'a> {
    Default { binding: &'a str, module: &'a str },
    Namespace { binding: &'a str, module: &'a str },
    DefaultAndNamed {
        binding: &'a str,
        named: &'a [(&'a str, &'a str)],
        module: &'a str,
    },
    Named {
        named: &'a [(&'a str, &'a str)],
        module: &'a str,
    },
}

fn render_specifiers(named: &[(&str, &str)]) -> String {
    named
        .iter()
        .map(|(imported, local)| format!("{} as {}", imported, local))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Import<'_> {
    pub fn render(&self) -> String {
        match self {
            Import::Default { binding, module } => format!("import {} from '{}'", binding, module),
            Import::Namespace { binding, module } => {
                format!("import * as {} from '{}'", binding, module)
            }
            Import::DefaultAndNamed {
                binding,
                named,
                module,
            } => format!(
                "import {}, {{ {} }} from '{}'",
                binding,
                render_specifiers(named),
                module
            ),
            Import::Named { named, module } => {
                format!("import {{ {} }} from '{}'", render_specifiers(named), module)
            }
        }
    }
}

pub fn render_imports(imports: &[Import]) -> String {
    imports
        .iter()
        .map(Import::render)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Where the `{lang, namespaces, pathname}` record lives at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheScope {
    /// Process-wide, written by server pages.
    Process,
    /// Per browser window, written by client pages.
    Window,
}

impl CacheScope {
    pub fn host(&self) -> &'static str {
        match self {
            CacheScope::Process => "globalThis",
            CacheScope::Window => "window",
        }
    }

    /// Expression addressing the cache record.
    pub fn path(&self) -> String {
        format!("{}.{}", self.host(), CACHE_KEY)
    }

    /// Optional-chained read of one field, `undefined` before the first load.
    pub fn read(&self, field: &str) -> String {
        format!("{}?.{}", self.path(), field)
    }

    pub fn assign(&self, lang: &str, namespaces: &str, pathname: &str) -> String {
        format!(
            "{} = {{ lang: {}, namespaces: {}, pathname: '{}' }}",
            self.path(),
            lang,
            namespaces,
            escape_single_quoted(pathname)
        )
    }
}

/// The loader configuration object literal built inside each wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigRecord<'a> {
    pub config_binding: &'a str,
    pub locale: String,
    pub loader_name: String,
    pub pathname: String,
    pub locales_root: &'a str,
}

impl ConfigRecord<'_> {
    /// Renders the literal with `indent` prefixed to each property line.
    pub fn render(&self, indent: &str) -> String {
        let cfg = self.config_binding;
        [
            "{".to_string(),
            format!("{indent}  ...{cfg},"),
            format!("{indent}  locale: {},", self.locale),
            format!("{indent}  loaderName: {},", self.loader_name),
            format!("{indent}  pathname: {},", self.pathname),
            format!("{indent}  {}", load_locale_from(cfg, self.locales_root)),
            format!("{indent}}}"),
        ]
        .join("\n")
    }
}

/// Keeps a user-supplied `loadLocaleFrom`; otherwise imports JSON namespaces
/// from the locales root.
pub fn load_locale_from(config_binding: &str, locales_root: &str) -> String {
    format!(
        "loadLocaleFrom: {cfg} && {cfg}.loadLocaleFrom || ((l, n) => import(`{root}/${{l}}/${{n}}`).then(m => m && m.default || m)),",
        cfg = config_binding,
        root = locales_root.trim_end_matches('/'),
    )
}

pub fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Import list shared by every generated module: the user's configuration.
pub fn config_import(runtime: &RuntimeModules) -> Import<'_> {
    Import::Default {
        binding: &runtime.config_binding,
        module: &runtime.config_module,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_names_embed_hash() {
        let names = GeneratedNames::new("1f");
        assert_eq!(names.page(), "__Next_Translate__Page__1f__");
        assert_eq!(names.wrapper(), "__Next_Translate_new__1f__");
        assert_eq!(names.hidden("Icon"), "__Next_Translate__Icon__1f__");
        assert_eq!(names.wrapped("Icon"), "__Next_Translate_new__Icon__1f__");
    }

    #[test]
    fn test_import_rendering() {
        let named = [("useParams", "__useParams")];
        assert_eq!(
            Import::Named {
                named: &named,
                module: "next/navigation"
            }
            .render(),
            "import { useParams as __useParams } from 'next/navigation'"
        );
        assert_eq!(
            Import::Namespace {
                binding: "__react",
                module: "react"
            }
            .render(),
            "import * as __react from 'react'"
        );
    }

    #[test]
    fn test_cache_scope_paths() {
        assert_eq!(CacheScope::Process.path(), "globalThis.__NEXT_TRANSLATE__");
        assert_eq!(CacheScope::Window.read("lang"), "window.__NEXT_TRANSLATE__?.lang");
        assert_eq!(
            CacheScope::Window.assign("a", "b", "/it's/"),
            "window.__NEXT_TRANSLATE__ = { lang: a, namespaces: b, pathname: '/it\\'s/' }"
        );
    }

    #[test]
    fn test_config_record_keeps_spread_first() {
        let record = ConfigRecord {
            config_binding: "__i18nConfig",
            locale: "lang".to_string(),
            loader_name: "'x'".to_string(),
            pathname: "'/'".to_string(),
            locales_root: "@root/locales/",
        };
        let rendered = record.render("");
        assert!(rendered.starts_with("{\n  ...__i18nConfig,\n  locale: lang,"));
        assert!(rendered.contains("import(`@root/locales/${l}/${n}`)"));
        assert!(rendered.ends_with("\n}"));
    }
}
