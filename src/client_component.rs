//! Client component template: wraps the default export and every named
//! component export with the translation HOC, keeping the public export names.

use crate::fragments::{
    config_import, render_imports, Import, CLIENT_DIRECTIVE, HOC_BINDING,
};
use crate::options::RuntimeModules;
use crate::scanner::NamedComponentExport;

#[derive(Debug, Clone)]
pub struct ClientComponentTemplate<'a> {
    pub runtime: &'a RuntimeModules,
    /// Module source after interception, client directives already stripped.
    pub code: &'a str,
    /// Local holding the original default export, if there was one.
    pub default_binding: Option<&'a str>,
    pub named_exports: &'a [NamedComponentExport],
}

impl ClientComponentTemplate<'_> {
    fn wrap(&self, binding: &str) -> String {
        format!(
            "{}({}, {})",
            HOC_BINDING, binding, self.runtime.config_binding
        )
    }

    pub fn render(&self) -> String {
        let imports = render_imports(&[
            config_import(self.runtime),
            Import::Namespace {
                binding: "__react",
                module: "react",
            },
            Import::Default {
                binding: HOC_BINDING,
                module: &self.runtime.hoc_module,
            },
        ]);

        let default_export = self
            .default_binding
            .map(|binding| format!("\nexport default {}\n", self.wrap(binding)))
            .unwrap_or_default();

        let named_exports = self
            .named_exports
            .iter()
            .map(|named| {
                format!(
                    "\nconst {wrapped} = {hoc}\nexport {{ {wrapped} as {public} }}\n",
                    wrapped = named.default_local_name,
                    hoc = self.wrap(&named.original_local),
                    public = named.export_name,
                )
            })
            .collect::<String>();

        format!(
            "{directive}\n{imports}\n\n{code}\n{default_export}{named_exports}",
            directive = CLIENT_DIRECTIVE,
            imports = imports,
            code = self.code,
            default_export = default_export,
            named_exports = named_exports,
        )
    }
}
