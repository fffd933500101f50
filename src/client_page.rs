//! Client page template. The wrapper renders nothing on the server pass and,
//! in the browser, defers the page until the window cache holds namespaces for
//! the current language and pathname.

use crate::fragments::{
    config_import, escape_single_quoted, render_imports, CacheScope, ConfigRecord,
    GeneratedNames, Import, CLIENT_DIRECTIVE,
};
use crate::options::RuntimeModules;

#[derive(Debug, Clone)]
pub struct ClientPageTemplate<'a> {
    pub names: &'a GeneratedNames,
    pub runtime: &'a RuntimeModules,
    /// Module source after interception, client directives already stripped.
    pub code: &'a str,
    pub page_binding: &'a str,
    pub pathname: &'a str,
}

impl ClientPageTemplate<'_> {
    pub fn render(&self) -> String {
        let cfg = self.runtime.config_binding.as_str();
        let cache = CacheScope::Window;
        let imports = render_imports(&[
            config_import(self.runtime),
            Import::DefaultAndNamed {
                binding: "__loadNamespaces",
                named: &[("log", "__log")],
                module: &self.runtime.loader_module,
            },
            Import::Named {
                named: &[
                    ("useSearchParams", "__useSearchParams"),
                    ("useParams", "__useParams"),
                ],
                module: &self.runtime.navigation_module,
            },
            Import::Namespace {
                binding: "__react",
                module: "react",
            },
        ]);
        let config = ConfigRecord {
            config_binding: cfg,
            locale: "lang".to_string(),
            loader_name: "'useEffect (client page)'".to_string(),
            pathname: "pathname".to_string(),
            locales_root: &self.runtime.locales_root,
        };

        format!(
            r#"{directive}
{imports}

{code}

export default function {wrapper}(props) {{
  const forceUpdate = __react.useReducer(() => [])[1]
  const pathname = '{pathname}'
  const isServer = typeof window === 'undefined'
  const searchParams = __useSearchParams()
  const params = __useParams()
  const lang = searchParams?.get('lang') ?? params?.lang ?? {cfg}.defaultLocale

  const config = {config}

  __react.useEffect(() => {{
    const shouldLoad = lang !== {cached_lang} || pathname !== {cached_pathname}

    if (!shouldLoad) return

    __loadNamespaces(config).then(({{ __lang, __namespaces }}) => {{
      {cache_write}
      window.i18nConfig = {cfg}
      forceUpdate()
    }})
  }}, [lang])

  if (isServer) {{
    __log(config, {{ page: pathname, lang, namespaces: ['calculated in client-side'] }})
    return null
  }}

  if (!{cache_path}) return null

  return <{page} {{...props}} />
}}
"#,
            directive = CLIENT_DIRECTIVE,
            imports = imports,
            code = self.code,
            wrapper = self.names.wrapper(),
            pathname = escape_single_quoted(self.pathname),
            cfg = cfg,
            config = config.render("  "),
            cached_lang = cache.read("lang"),
            cached_pathname = cache.read("pathname"),
            cache_write = cache.assign("__lang", "__namespaces || {}", self.pathname),
            cache_path = cache.path(),
            page = self.page_binding,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::inspect_module;

    fn render() -> String {
        let names = GeneratedNames::new("abc");
        let runtime = RuntimeModules::default();
        let page = names.page();
        ClientPageTemplate {
            names: &names,
            runtime: &runtime,
            code: "function Blog() { return <h1>Blog</h1> }\nconst __Next_Translate__Page__abc__ = Blog;",
            page_binding: &page,
            pathname: "/blog/",
        }
        .render()
    }

    #[test]
    fn test_client_page_starts_with_directive() {
        let out = render();
        assert!(out.starts_with("'use client'\n"));
        let shape = inspect_module(&out).unwrap();
        assert_eq!(shape.client_directives, 1);
        assert_eq!(shape.default_exports, 1);
        assert!(!shape.exports_dynamic);
    }

    #[test]
    fn test_effect_checks_cache_before_loading() {
        let out = render();
        assert!(out.contains(
            "const shouldLoad = lang !== window.__NEXT_TRANSLATE__?.lang || pathname !== window.__NEXT_TRANSLATE__?.pathname"
        ));
        assert!(out.contains("}, [lang])"));
        assert!(out.contains(
            "window.__NEXT_TRANSLATE__ = { lang: __lang, namespaces: __namespaces || {}, pathname: '/blog/' }"
        ));
    }

    #[test]
    fn test_render_is_gated_on_cache() {
        let out = render();
        let gate = out.find("if (!window.__NEXT_TRANSLATE__) return null").unwrap();
        let page = out.find("return <__Next_Translate__Page__abc__ {...props} />").unwrap();
        assert!(gate < page);
        assert!(out.contains("__log(config, { page: pathname, lang, namespaces: ['calculated in client-side'] })"));
        assert!(!out.contains("__NEXT_TRANSLATE_DATA__"));
    }
}
