//! # App Directory Translation Transformer
//!
//! Rewrites app-router page and client component modules so translation
//! namespaces are loaded before the original component renders.
//!
//! ## Output Invariants
//!
//! 1. **Passthrough**: files that are neither pages nor client components, and
//!    pages without a default export, come back byte-for-byte unchanged.
//!
//! 2. **Unique Names**: every generated binding embeds one per-invocation hash:
//!    `__Next_Translate__Page__<hash>__` holds the original default export and
//!    `__Next_Translate_new__<hash>__` is the new default export.
//!
//! 3. **Rendering Mode**: server pages without their own `dynamic` export get
//!    exactly one `export const dynamic = 'force-dynamic';`.
//!
//! 4. **Client Directive**: client outputs carry exactly one `'use client'`,
//!    on the first line.
//!
//! 5. **Export Surface**: client components keep every public export name;
//!    components are re-exported through the translation HOC.
//!
//! 6. **Cache Record**: generated code shares `{ lang, namespaces, pathname }`
//!    under `__NEXT_TRANSLATE__` on `globalThis` (server) or `window` (client).

#[cfg(feature = "napi")]
use napi_derive::napi;

mod client_component;
mod client_page;
mod error;
mod fragments;
mod hash;
mod intercept;
mod options;
mod package;
pub mod runtime;
mod scanner;
mod select;
mod server_page;
mod shape;


pub use error::TransformError;
pub use fragments::GeneratedNames;
pub use hash::{compute_hash, invocation_hash};
pub use options::{RuntimeModules, TemplateOptions};
pub use package::{NamedExport, OxcFilePkg, ParsedFilePkg};
pub use scanner::{intercept_named_component_exports, NamedComponentExport};
pub use select::{classify, template_app_dir, transform_app_dir, TemplateKind};
pub use shape::{inspect_module, inspect_module_at, ModuleShape};

#[cfg(feature = "napi")]
pub use select::transform_app_dir_native;

#[cfg(feature = "napi")]
#[napi]
pub fn translate_bridge() -> String {
    "Translate Native Bridge Connected".to_string()
}
