//! Parsed file package: the contract generators consume, plus the oxc-backed
//! implementation used by the bridge.

use oxc_allocator::Allocator;
use oxc_ast::ast::ModuleExportName;
use oxc_parser::Parser;
use oxc_span::{SourceType, Span};
use tracing::trace;

use crate::error::TransformError;
use crate::{intercept, scanner};

/// What a named export currently points at, read without removing it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedExport {
    /// Module-local binding holding the value. `None` for re-exports from
    /// another module or anonymous default exports.
    pub local_name: Option<String>,
    /// Source text of the initializer when the export is a variable.
    pub initializer: Option<String>,
}

pub trait ParsedFilePkg {
    /// Removes the public export `export_name` and binds its value to the
    /// private local `new_local_name`. Returns `None` when no such export exists.
    /// Call at most once per export name.
    fn intercept_export(&mut self, export_name: &str, new_local_name: &str) -> Option<String>;

    fn get_named_export(&self, name: &str) -> Option<NamedExport>;

    fn get_code(&self) -> String;

    /// Named (non-default) value exports that look like React components, in
    /// source order.
    fn component_exports(&self) -> Vec<String>;

    /// Removes every `use client` directive, leaving the rest of each line.
    fn strip_client_directives(&mut self);
}

/// A TS/JSX module held as text and re-parsed with oxc on every query, so
/// each operation always sees the result of the previous mutation.
#[derive(Debug, Clone)]
pub struct OxcFilePkg {
    path: String,
    code: String,
    source_type: SourceType,
}

impl OxcFilePkg {
    /// Parses `code` in the dialect `path`'s extension selects.
    pub fn parse(path: &str, code: &str) -> Result<Self, TransformError> {
        let source_type = source_type_for(path);
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, code, source_type).parse();
        if let Some(error) = ret.errors.first() {
            return Err(TransformError::parse(path, error.to_string()));
        }
        Ok(OxcFilePkg {
            path: path.to_string(),
            code: code.to_string(),
            source_type,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }
}

impl ParsedFilePkg for OxcFilePkg {
    fn intercept_export(&mut self, export_name: &str, new_local_name: &str) -> Option<String> {
        let rewritten = intercept::intercept_export(&self.code, self.source_type, export_name, new_local_name)?;
        trace!(
            path = %self.path,
            export = export_name,
            local = new_local_name,
            "intercepted export"
        );
        self.code = rewritten;
        Some(new_local_name.to_string())
    }

    fn get_named_export(&self, name: &str) -> Option<NamedExport> {
        intercept::find_named_export(&self.code, self.source_type, name)
    }

    fn get_code(&self) -> String {
        self.code.clone()
    }

    fn component_exports(&self) -> Vec<String> {
        scanner::component_export_names(&self.code, self.source_type)
    }

    fn strip_client_directives(&mut self) {
        self.code = intercept::strip_client_directives(&self.code, self.source_type);
    }
}

/// TSX module, the dialect for generated output and unknown extensions.
pub(crate) fn source_type() -> SourceType {
    SourceType::default()
        .with_typescript(true)
        .with_module(true)
        .with_jsx(true)
}

/// Dialect for `path`. `.ts` files are parsed without JSX since `<any>x` is a
/// type assertion there; `.js` files keep JSX, which Next.js allows in them.
pub(crate) fn source_type_for(path: &str) -> SourceType {
    match SourceType::from_path(path) {
        Ok(st) if st.is_javascript() => st.with_module(true).with_jsx(true),
        Ok(st) => st.with_module(true),
        Err(_) => source_type(),
    }
}

pub(crate) fn slice(code: &str, span: Span) -> &str {
    &code[span.start as usize..span.end as usize]
}

pub(crate) fn export_name_of(name: &ModuleExportName) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(s) => s.value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_invalid_source() {
        let err = OxcFilePkg::parse("/app/page.tsx", "export default function (").unwrap_err();
        assert!(matches!(err, TransformError::Parse { ref path, .. } if path == "/app/page.tsx"));
    }

    #[test]
    fn test_intercept_updates_code_once() {
        let mut pkg =
            OxcFilePkg::parse("/app/page.tsx", "export default function Page() { return <p /> }")
                .unwrap();
        assert_eq!(
            pkg.intercept_export("default", "__page"),
            Some("__page".to_string())
        );
        let code = pkg.get_code();
        assert!(!code.contains("export default"));
        assert!(code.contains("const __page = Page;"));
        assert_eq!(pkg.intercept_export("default", "__again"), None);
    }

    #[test]
    fn test_source_type_follows_extension() {
        assert!(!source_type_for("/app/lib/util.ts").is_jsx());
        assert!(source_type_for("/app/lib/util.ts").is_typescript());
        assert!(source_type_for("/app/page.tsx").is_jsx());
        assert!(source_type_for("/app/page.js").is_javascript());
        assert!(source_type_for("/app/page.js").is_jsx());
        assert!(source_type_for("/app/page.mts").is_module());
        assert!(source_type_for("/app/page").is_jsx());
    }

    #[test]
    fn test_ts_file_with_angle_bracket_assertion_parses() {
        let code = "const w = <any>window;\nconst id = <T>(x: T) => x;\nexport default id";
        let pkg = OxcFilePkg::parse("/app/lib/util.ts", code).unwrap();
        assert!(!pkg.source_type().is_jsx());
        assert!(OxcFilePkg::parse("/app/lib/util.tsx", code).is_err());
    }

    #[test]
    fn test_strip_client_directives_updates_code() {
        let mut pkg = OxcFilePkg::parse(
            "/app/btn.tsx",
            "'use client' // browser only\nexport default function Btn() { return <b /> }",
        )
        .unwrap();
        pkg.strip_client_directives();
        assert!(!pkg.get_code().contains("'use client'"));
        assert!(pkg.get_code().contains("export default function Btn()"));
    }

    #[test]
    fn test_get_named_export_does_not_mutate() {
        let source = "export const dynamic = 'force-static'\nexport default function P() {}";
        let pkg = OxcFilePkg::parse("/app/page.tsx", source).unwrap();
        let dynamic = pkg.get_named_export("dynamic").unwrap();
        assert_eq!(dynamic.local_name.as_deref(), Some("dynamic"));
        assert_eq!(dynamic.initializer.as_deref(), Some("'force-static'"));
        assert_eq!(pkg.get_code(), source);
    }
}
