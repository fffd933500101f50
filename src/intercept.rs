//! Export interception over oxc spans.
//!
//! Edits are collected as `(start, end, replacement)` triples and applied back
//! to front; statements that must run after every declaration are appended at
//! the end of the module.

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, Declaration, ExportDefaultDeclaration, ExportDefaultDeclarationKind,
    ExportNamedDeclaration, Expression, Statement,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};

use crate::package::{export_name_of, slice, NamedExport};

const USE_CLIENT: &str = "use client";

#[derive(Debug, Default)]
struct Edits {
    replacements: Vec<(u32, u32, String)>,
    appended: Vec<String>,
}

impl Edits {
    fn replace(&mut self, start: u32, end: u32, text: impl Into<String>) {
        self.replacements.push((start, end, text.into()));
    }

    fn remove(&mut self, start: u32, end: u32) {
        self.replace(start, end, String::new());
    }

    fn insert(&mut self, at: u32, text: impl Into<String>) {
        self.replace(at, at, text);
    }

    fn append(&mut self, line: String) {
        self.appended.push(line);
    }

    fn apply(mut self, code: &str) -> String {
        self.replacements.sort_by(|a, b| b.0.cmp(&a.0));

        let mut result = code.to_string();
        for (start, end, replacement) in self.replacements {
            result.replace_range((start as usize)..(end as usize), &replacement);
        }
        for line in self.appended {
            if !result.ends_with('\n') {
                result.push('\n');
            }
            result.push_str(&line);
            result.push('\n');
        }
        result
    }
}

/// Returns the rewritten module, or `None` when `export_name` is not a value
/// export of `code`.
pub(crate) fn intercept_export(
    code: &str,
    source_type: SourceType,
    export_name: &str,
    new_local: &str,
) -> Option<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }

    let mut edits = Edits::default();
    let found = ret.program.body.iter().any(|stmt| match stmt {
        Statement::ExportDefaultDeclaration(decl) if export_name == "default" => {
            intercept_default(decl, new_local, &mut edits)
        }
        Statement::ExportNamedDeclaration(decl) => {
            intercept_named(decl, code, export_name, new_local, &mut edits)
        }
        Statement::ExportAllDeclaration(decl) => match &decl.exported {
            // export * as Name from 'mod'
            Some(exported)
                if !decl.export_kind.is_type() && export_name_of(exported) == export_name =>
            {
                edits.remove(decl.span.start, decl.span.end);
                edits.append(format!(
                    "import * as {} from {};",
                    new_local,
                    slice(code, decl.source.span)
                ));
                true
            }
            _ => false,
        },
        _ => false,
    });

    if found {
        Some(edits.apply(code))
    } else {
        None
    }
}

fn intercept_default(decl: &ExportDefaultDeclaration, new_local: &str, edits: &mut Edits) -> bool {
    let inner = decl.declaration.span();
    match &decl.declaration {
        ExportDefaultDeclarationKind::FunctionDeclaration(func) => rebind_declaration(
            decl.span.start,
            inner.start,
            inner.end,
            func.id.as_ref().map(|id| id.name.as_str()),
            new_local,
            edits,
        ),
        ExportDefaultDeclarationKind::ClassDeclaration(class) => rebind_declaration(
            decl.span.start,
            inner.start,
            inner.end,
            class.id.as_ref().map(|id| id.name.as_str()),
            new_local,
            edits,
        ),
        ExportDefaultDeclarationKind::TSInterfaceDeclaration(_) => false,
        _ => {
            edits.replace(decl.span.start, inner.start, format!("const {} = ", new_local));
            if decl.span.end == inner.end {
                edits.insert(inner.end, ";");
            }
            true
        }
    }
}

/// `export default function Name` keeps its hoisted declaration and gains an
/// alias; anonymous declarations become the alias initializer.
fn rebind_declaration(
    stmt_start: u32,
    decl_start: u32,
    decl_end: u32,
    name: Option<&str>,
    new_local: &str,
    edits: &mut Edits,
) -> bool {
    match name {
        Some(name) => {
            edits.remove(stmt_start, decl_start);
            edits.append(format!("const {} = {};", new_local, name));
        }
        None => {
            edits.replace(stmt_start, decl_start, format!("const {} = ", new_local));
            edits.insert(decl_end, ";");
        }
    }
    true
}

fn intercept_named(
    decl: &ExportNamedDeclaration,
    code: &str,
    export_name: &str,
    new_local: &str,
    edits: &mut Edits,
) -> bool {
    if decl.export_kind.is_type() {
        return false;
    }

    if let Some(declaration) = &decl.declaration {
        return intercept_declaration(decl.span.start, declaration, export_name, new_local, edits);
    }

    let Some(index) = decl
        .specifiers
        .iter()
        .position(|s| !s.export_kind.is_type() && export_name_of(&s.exported) == export_name)
    else {
        return false;
    };

    let local = slice(code, decl.specifiers[index].local.span());
    let remaining: Vec<&str> = decl
        .specifiers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, s)| slice(code, s.span))
        .collect();
    let source = decl.source.as_ref().map(|s| slice(code, s.span));

    let rewritten = match (remaining.is_empty(), source) {
        (true, _) => String::new(),
        (false, Some(source)) => format!("export {{ {} }} from {};", remaining.join(", "), source),
        (false, None) => format!("export {{ {} }};", remaining.join(", ")),
    };
    edits.replace(decl.span.start, decl.span.end, rewritten);

    match source {
        Some(source) => edits.append(format!(
            "import {{ {} as {} }} from {};",
            local, new_local, source
        )),
        None => edits.append(format!("const {} = {};", new_local, local)),
    }
    true
}

fn intercept_declaration(
    stmt_start: u32,
    declaration: &Declaration,
    export_name: &str,
    new_local: &str,
    edits: &mut Edits,
) -> bool {
    match declaration {
        Declaration::FunctionDeclaration(func) if !func.declare => match &func.id {
            Some(id) if id.name.as_str() == export_name => {
                rebind_declaration(stmt_start, func.span.start, func.span.end, Some(export_name), new_local, edits)
            }
            _ => false,
        },
        Declaration::ClassDeclaration(class) if !class.declare => match &class.id {
            Some(id) if id.name.as_str() == export_name => {
                rebind_declaration(stmt_start, class.span.start, class.span.end, Some(export_name), new_local, edits)
            }
            _ => false,
        },
        Declaration::VariableDeclaration(var) if !var.declare => {
            let mut names = Vec::new();
            for d in &var.declarations {
                collect_binding_names(&d.id, &mut names);
            }
            if !names.iter().any(|n| n == export_name) {
                return false;
            }

            edits.remove(stmt_start, var.span.start);
            let siblings: Vec<String> = names.into_iter().filter(|n| n != export_name).collect();
            if !siblings.is_empty() {
                edits.append(format!("export {{ {} }};", siblings.join(", ")));
            }
            edits.append(format!("const {} = {};", new_local, export_name));
            true
        }
        _ => false,
    }
}

/// Removes `use client` prologue directives and stray top-level
/// `'use client'` statements by span. Whatever else shares the line stays;
/// a line left empty is removed with its newline.
pub(crate) fn strip_client_directives(code: &str, source_type: SourceType) -> String {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type).parse();
    if !ret.errors.is_empty() {
        return code.to_string();
    }

    let directives = ret
        .program
        .directives
        .iter()
        .filter(|d| d.directive.as_str() == USE_CLIENT)
        .map(|d| d.span);
    let strays = ret.program.body.iter().filter_map(|stmt| match stmt {
        Statement::ExpressionStatement(expr) => match &expr.expression {
            Expression::StringLiteral(lit) if lit.value.as_str() == USE_CLIENT => Some(expr.span),
            _ => None,
        },
        _ => None,
    });

    let mut edits = Edits::default();
    for span in directives.chain(strays) {
        let (start, end) = directive_removal_range(code, span.start as usize, span.end as usize);
        edits.remove(start as u32, end as u32);
    }
    edits.apply(code)
}

fn directive_removal_range(code: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = code.as_bytes();
    let skip_blanks = |mut i: usize| {
        while i < bytes.len() && matches!(bytes[i], b' ' | b'\t') {
            i += 1;
        }
        i
    };

    let mut end = skip_blanks(end);
    if bytes.get(end) == Some(&b';') {
        end = skip_blanks(end + 1);
    }
    let line_break = if code[end..].starts_with("\r\n") {
        Some(2)
    } else if code[end..].starts_with('\n') {
        Some(1)
    } else {
        None
    };
    let Some(line_break) = line_break else {
        return (start, end);
    };

    let mut line_start = start;
    while line_start > 0 && matches!(bytes[line_start - 1], b' ' | b'\t') {
        line_start -= 1;
    }
    if line_start == 0 || bytes[line_start - 1] == b'\n' {
        (line_start, end + line_break)
    } else {
        (start, end)
    }
}

pub(crate) fn collect_binding_names(pattern: &BindingPattern, names: &mut Vec<String>) {
    match pattern {
        BindingPattern::BindingIdentifier(id) => {
            names.push(id.name.to_string());
        }
        BindingPattern::ObjectPattern(obj) => {
            for prop in &obj.properties {
                collect_binding_names(&prop.value, names);
            }
            if let Some(rest) = &obj.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::ArrayPattern(arr) => {
            for pattern in arr.elements.iter().flatten() {
                collect_binding_names(pattern, names);
            }
            if let Some(rest) = &arr.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPattern::AssignmentPattern(assign) => {
            collect_binding_names(&assign.left, names);
        }
    }
}

/// Looks up `name` among the module's exports without touching the source.
pub(crate) fn find_named_export(code: &str, source_type: SourceType, name: &str) -> Option<NamedExport> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type).parse();
    if !ret.errors.is_empty() {
        return None;
    }

    for stmt in &ret.program.body {
        match stmt {
            Statement::ExportDefaultDeclaration(decl) if name == "default" => {
                let local_name = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(f) => {
                        f.id.as_ref().map(|id| id.name.to_string())
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(c) => {
                        c.id.as_ref().map(|id| id.name.to_string())
                    }
                    _ => None,
                };
                let initializer = decl
                    .declaration
                    .as_expression()
                    .map(|expr| slice(code, expr.span()).to_string());
                return Some(NamedExport {
                    local_name,
                    initializer,
                });
            }
            Statement::ExportNamedDeclaration(decl) if !decl.export_kind.is_type() => {
                if let Some(found) = named_declaration_export(decl, code, name) {
                    return Some(found);
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                if decl.exported.as_ref().map(export_name_of).as_deref() == Some(name) {
                    return Some(NamedExport::default());
                }
            }
            _ => {}
        }
    }
    None
}

fn named_declaration_export(
    decl: &ExportNamedDeclaration,
    code: &str,
    name: &str,
) -> Option<NamedExport> {
    if let Some(declaration) = &decl.declaration {
        return match declaration {
            Declaration::FunctionDeclaration(f)
                if f.id.as_ref().is_some_and(|id| id.name.as_str() == name) =>
            {
                Some(NamedExport {
                    local_name: Some(name.to_string()),
                    initializer: None,
                })
            }
            Declaration::ClassDeclaration(c)
                if c.id.as_ref().is_some_and(|id| id.name.as_str() == name) =>
            {
                Some(NamedExport {
                    local_name: Some(name.to_string()),
                    initializer: None,
                })
            }
            Declaration::VariableDeclaration(var) => var.declarations.iter().find_map(|d| {
                let mut names = Vec::new();
                collect_binding_names(&d.id, &mut names);
                names.iter().any(|n| n == name).then(|| NamedExport {
                    local_name: Some(name.to_string()),
                    initializer: match &d.id {
                        BindingPattern::BindingIdentifier(_) => {
                            d.init.as_ref().map(|init| slice(code, init.span()).to_string())
                        }
                        _ => None,
                    },
                })
            }),
            _ => None,
        };
    }

    decl.specifiers
        .iter()
        .find(|s| !s.export_kind.is_type() && export_name_of(&s.exported) == name)
        .map(|s| NamedExport {
            local_name: decl
                .source
                .is_none()
                .then(|| slice(code, s.local.span()).to_string()),
            initializer: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::source_type;

    fn intercept(code: &str, name: &str) -> String {
        intercept_export(code, source_type(), name, "__new").expect("export should be intercepted")
    }

    fn strip(code: &str) -> String {
        strip_client_directives(code, source_type())
    }

    #[test]
    fn test_named_default_function_keeps_declaration() {
        let out = intercept("export default function Blog() { return <h1>hi</h1> }", "default");
        assert!(out.starts_with("function Blog()"));
        assert!(out.contains("const __new = Blog;"));
        assert!(!out.contains("export"));
    }

    #[test]
    fn test_anonymous_default_function_becomes_initializer() {
        let out = intercept("export default async function () { return null }", "default");
        assert!(out.starts_with("const __new = async function () { return null };"));
    }

    #[test]
    fn test_default_expression() {
        let out = intercept("const Page = () => null\nexport default Page", "default");
        assert!(out.contains("const __new = Page;"));
        assert!(!out.contains("export default"));
    }

    #[test]
    fn test_default_expression_with_semicolon() {
        let out = intercept("export default memo(Page);", "default");
        assert_eq!(out.trim(), "const __new = memo(Page);");
    }

    #[test]
    fn test_default_specifier_keeps_other_specifiers() {
        let out = intercept("function A() {}\nfunction B() {}\nexport { A as default, B }", "default");
        assert!(out.contains("export { B };"));
        assert!(out.contains("const __new = A;"));
        assert!(!out.contains("default"));
    }

    #[test]
    fn test_reexported_default_becomes_import() {
        let out = intercept("export { default } from './Page'", "default");
        assert!(out.contains("import { default as __new } from './Page';"));
        assert!(!out.contains("export"));
    }

    #[test]
    fn test_named_function_export() {
        let out = intercept("export function Icon() { return <svg /> }", "Icon");
        assert!(out.starts_with("function Icon()"));
        assert!(out.contains("const __new = Icon;"));
    }

    #[test]
    fn test_multi_declarator_keeps_siblings_exported() {
        let out = intercept("export const A = () => null, b = 1;", "A");
        assert!(out.starts_with("const A = () => null, b = 1;"));
        assert!(out.contains("export { b };"));
        assert!(out.contains("const __new = A;"));
    }

    #[test]
    fn test_namespace_reexport() {
        let out = intercept("export * as Icons from './icons'", "Icons");
        assert!(out.contains("import * as __new from './icons';"));
        assert!(!out.contains("export"));
    }

    #[test]
    fn test_missing_and_type_exports_are_not_intercepted() {
        assert!(intercept_export("export const a = 1", source_type(), "default", "__new").is_none());
        assert!(intercept_export("export type Props = {}", source_type(), "Props", "__new").is_none());
        assert!(intercept_export("export interface Props {}", source_type(), "Props", "__new").is_none());
        assert!(intercept_export("type P = {}\nexport type { P }", source_type(), "P", "__new").is_none());
    }

    #[test]
    fn test_find_named_export_via_specifier() {
        let found = find_named_export("const mode = 'auto'\nexport { mode as dynamic }", source_type(), "dynamic")
            .unwrap();
        assert_eq!(found.local_name.as_deref(), Some("mode"));
        assert!(find_named_export("export const revalidate = 0", source_type(), "dynamic").is_none());
    }

    #[test]
    fn test_find_named_export_from_other_module_has_no_local() {
        let found = find_named_export("export { dynamic } from './config'", source_type(), "dynamic").unwrap();
        assert_eq!(found, NamedExport::default());
    }

    #[test]
    fn test_strip_directive_lines_in_both_quote_styles() {
        let code = "'use client'\n\"use client\";\nconst a = 'use client'\nexport default a\n";
        assert_eq!(strip(code), "const a = 'use client'\nexport default a\n");
    }

    #[test]
    fn test_strip_keeps_trailing_comment() {
        let code = "'use client' // browser only\nexport default function A() {}\n";
        assert_eq!(strip(code), "// browser only\nexport default function A() {}\n");
    }

    #[test]
    fn test_strip_keeps_code_sharing_the_line() {
        let code = "'use client'; import React from 'react'\nexport default React\n";
        assert_eq!(strip(code), "import React from 'react'\nexport default React\n");
    }

    #[test]
    fn test_strip_leaves_template_literal_content() {
        let code = "'use client'\nconst note = `\n'use client'\n`\nexport default note\n";
        assert_eq!(strip(code), "const note = `\n'use client'\n`\nexport default note\n");
    }

    #[test]
    fn test_strip_removes_stray_statement_and_keeps_other_directives() {
        let code = "'use strict'\nimport a from 'a'\n  'use client';\nexport default a\n";
        assert_eq!(strip(code), "'use strict'\nimport a from 'a'\nexport default a\n");
    }

    #[test]
    fn test_strip_without_directive_is_identity() {
        let code = "export function A() {}\n";
        assert_eq!(strip(code), code);
    }
}
