//! Server page template: an async wrapper that loads namespaces on every
//! request, publishes them to the process cache and hands them to the client
//! through a hidden marker element.

use crate::fragments::{
    config_import, escape_single_quoted, render_imports, CacheScope, ConfigRecord,
    GeneratedNames, Import, DATA_MARKER_ID, DEFAULT_DYNAMIC_EXPORT,
};
use crate::options::RuntimeModules;
use crate::package::NamedExport;

/// How the module's `dynamic` rendering mode is available to the wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicExport {
    /// The page declares none; `force-dynamic` is injected.
    Injected,
    /// The page exports it from this local binding.
    Local(String),
    /// The page re-exports it from another module.
    External,
}

impl DynamicExport {
    pub fn from_named_export(found: Option<NamedExport>) -> Self {
        match found {
            None => DynamicExport::Injected,
            Some(NamedExport {
                local_name: Some(local),
                ..
            }) => DynamicExport::Local(local),
            Some(_) => DynamicExport::External,
        }
    }

    fn loader_name(&self) -> String {
        match self {
            DynamicExport::Injected => "`${dynamic} (server page)`".to_string(),
            DynamicExport::Local(local) => format!("`${{{}}} (server page)`", local),
            DynamicExport::External => "'dynamic (server page)'".to_string(),
        }
    }

    fn declaration(&self) -> &'static str {
        match self {
            DynamicExport::Injected => DEFAULT_DYNAMIC_EXPORT,
            _ => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerPageTemplate<'a> {
    pub names: &'a GeneratedNames,
    pub runtime: &'a RuntimeModules,
    /// Module source after the default export was intercepted.
    pub code: &'a str,
    /// Local holding the original default export.
    pub page_binding: &'a str,
    pub pathname: &'a str,
    pub dynamic: DynamicExport,
}

impl ServerPageTemplate<'_> {
    pub fn render(&self) -> String {
        let cfg = self.runtime.config_binding.as_str();
        let pathname = format!("'{}'", escape_single_quoted(self.pathname));
        let imports = render_imports(&[
            config_import(self.runtime),
            Import::Default {
                binding: "__loadNamespaces",
                module: &self.runtime.loader_module,
            },
        ]);
        let config = ConfigRecord {
            config_binding: cfg,
            locale: format!(
                "props.searchParams?.lang ?? props.params?.lang ?? {}.defaultLocale",
                cfg
            ),
            loader_name: self.dynamic.loader_name(),
            pathname: pathname.clone(),
            locales_root: &self.runtime.locales_root,
        };

        format!(
            r#"{imports}
{code}

globalThis.i18nConfig = {cfg}

{dynamic_export}

export default async function {wrapper}(props) {{
  const config = {config}

  const {{ __lang, __namespaces }} = await __loadNamespaces(config)
  {cache_write}

  return (
    <>
      <div
        id="{marker}"
        data-lang={{__lang}}
        data-ns={{JSON.stringify(__namespaces)}}
        data-pathname={{{pathname}}}
      />
      <{page} {{...props}} />
    </>
  )
}}
"#,
            imports = imports,
            code = self.code,
            cfg = cfg,
            dynamic_export = self.dynamic.declaration(),
            wrapper = self.names.wrapper(),
            config = config.render("  "),
            cache_write = CacheScope::Process.assign("__lang", "__namespaces", self.pathname),
            marker = DATA_MARKER_ID,
            pathname = pathname,
            page = self.page_binding,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::inspect_module;

    fn render(dynamic: DynamicExport) -> String {
        let names = GeneratedNames::new("abc");
        let runtime = RuntimeModules::default();
        let page = names.page();
        ServerPageTemplate {
            names: &names,
            runtime: &runtime,
            code: "function Blog() { return <h1>Blog</h1> }\nconst __Next_Translate__Page__abc__ = Blog;",
            page_binding: &page,
            pathname: "/blog/",
            dynamic,
        }
        .render()
    }

    #[test]
    fn test_injected_dynamic_is_declared_once() {
        let out = render(DynamicExport::Injected);
        assert_eq!(out.matches("'force-dynamic'").count(), 1);
        assert!(out.contains("loaderName: `${dynamic} (server page)`"));

        let shape = inspect_module(&out).unwrap();
        assert_eq!(shape.default_exports, 1);
        assert!(shape.exports_dynamic);
    }

    #[test]
    fn test_local_dynamic_is_referenced_not_redeclared() {
        let out = render(DynamicExport::Local("mode".to_string()));
        assert!(!out.contains("force-dynamic"));
        assert!(out.contains("loaderName: `${mode} (server page)`"));
    }

    #[test]
    fn test_marker_and_cache_contract() {
        let out = render(DynamicExport::Injected);
        assert!(out.contains("export default async function __Next_Translate_new__abc__(props)"));
        assert!(out.contains(r#"id="__NEXT_TRANSLATE_DATA__""#));
        assert!(out.contains("data-ns={JSON.stringify(__namespaces)}"));
        assert!(out.contains("data-pathname={'/blog/'}"));
        assert!(out.contains(
            "globalThis.__NEXT_TRANSLATE__ = { lang: __lang, namespaces: __namespaces, pathname: '/blog/' }"
        ));
        assert!(out.contains("<__Next_Translate__Page__abc__ {...props} />"));
        assert!(out.contains(
            "locale: props.searchParams?.lang ?? props.params?.lang ?? __i18nConfig.defaultLocale"
        ));
    }

    #[test]
    fn test_dynamic_export_from_named_export() {
        assert_eq!(DynamicExport::from_named_export(None), DynamicExport::Injected);
        assert_eq!(
            DynamicExport::from_named_export(Some(NamedExport::default())),
            DynamicExport::External
        );
    }
}
