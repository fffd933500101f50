//! Template selection: decides per file which wrapper to generate and drives
//! the interception the chosen template depends on.

#[cfg(feature = "napi")]
use napi_derive::napi;
use tracing::{debug, warn};

use crate::client_component::ClientComponentTemplate;
use crate::client_page::ClientPageTemplate;
use crate::error::TransformError;
use crate::fragments::GeneratedNames;
use crate::hash::invocation_hash;
use crate::options::TemplateOptions;
use crate::package::{OxcFilePkg, ParsedFilePkg};
use crate::scanner::intercept_named_component_exports;
use crate::server_page::{DynamicExport, ServerPageTemplate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateKind {
    ServerPage,
    ClientPage,
    ClientComponent,
    /// Not a page and not a client component; left as is.
    Untouched,
}

pub fn classify(options: &TemplateOptions) -> TemplateKind {
    match (options.is_page(), options.is_client_component) {
        (false, false) => TemplateKind::Untouched,
        (false, true) => TemplateKind::ClientComponent,
        (true, false) => TemplateKind::ServerPage,
        (true, true) => TemplateKind::ClientPage,
    }
}

/// Rewrites `pkg` into its translated wrapper, or returns its code unchanged
/// when the file is not a target or is a page without a default export.
pub fn template_app_dir<P: ParsedFilePkg + ?Sized>(pkg: &mut P, options: &TemplateOptions) -> String {
    let original = pkg.get_code();
    let kind = classify(options);
    if kind == TemplateKind::Untouched {
        debug!(path = %options.normalized_resource_path, "not a page or client component");
        return original;
    }

    let hash = match (options.identifier_hash(), &options.hash) {
        (Some(hash), _) => hash.to_string(),
        (None, Some(rejected)) => {
            warn!(hash = %rejected, "hash is not identifier-safe, deriving one");
            invocation_hash(&options.normalized_resource_path)
        }
        (None, None) => invocation_hash(&options.normalized_resource_path),
    };
    let names = GeneratedNames::new(hash);
    let pathname = options.pathname();

    let page_binding = pkg.intercept_export("default", &names.page());
    let dynamic = DynamicExport::from_named_export(pkg.get_named_export("dynamic"));

    debug!(
        path = %options.normalized_resource_path,
        ?kind,
        hash = names.hash(),
        has_default = page_binding.is_some(),
        "selected app dir template"
    );

    let page_binding = match (kind, page_binding) {
        (TemplateKind::ClientComponent, binding) => {
            return render_client_component(pkg, options, &names, binding.as_deref());
        }
        (_, Some(binding)) => binding,
        (_, None) => {
            debug!(
                path = %options.normalized_resource_path,
                "page has no default export, leaving it untransformed"
            );
            return original;
        }
    };

    if kind == TemplateKind::ClientPage {
        pkg.strip_client_directives();
        let code = pkg.get_code();
        return ClientPageTemplate {
            names: &names,
            runtime: &options.runtime,
            code: &code,
            page_binding: &page_binding,
            pathname: &pathname,
        }
        .render();
    }

    let code = pkg.get_code();
    ServerPageTemplate {
        names: &names,
        runtime: &options.runtime,
        code: &code,
        page_binding: &page_binding,
        pathname: &pathname,
        dynamic,
    }
    .render()
}

fn render_client_component<P: ParsedFilePkg + ?Sized>(
    pkg: &mut P,
    options: &TemplateOptions,
    names: &GeneratedNames,
    default_binding: Option<&str>,
) -> String {
    let named_exports = intercept_named_component_exports(pkg, names);
    pkg.strip_client_directives();
    let code = pkg.get_code();
    ClientComponentTemplate {
        runtime: &options.runtime,
        code: &code,
        default_binding,
        named_exports: &named_exports,
    }
    .render()
}

/// Parses `code` and applies [`template_app_dir`]. Files that are not targets
/// are returned without being parsed.
pub fn transform_app_dir(code: &str, options: &TemplateOptions) -> Result<String, TransformError> {
    options.validate()?;
    if classify(options) == TemplateKind::Untouched {
        return Ok(code.to_string());
    }
    let mut pkg = OxcFilePkg::parse(&options.normalized_resource_path, code)?;
    Ok(template_app_dir(&mut pkg, options))
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_app_dir_native(code: String, options_json: serde_json::Value) -> napi::Result<String> {
    let options: TemplateOptions = serde_json::from_value(options_json)
        .map_err(|e| napi::Error::from_reason(TransformError::from(e).to_string()))?;

    transform_app_dir(&code, &options).map_err(|e| napi::Error::from_reason(e.to_string()))
}
