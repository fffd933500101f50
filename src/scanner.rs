//! Named-export component scanner.
//!
//! A named export is treated as a React component when its value is
//! function-like, a class, a call (`memo`, `forwardRef`) or a reference, and
//! its public name follows the PascalCase component convention. A function
//! that renders JSX also qualifies through its local PascalCase name.

use lazy_static::lazy_static;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    BindingPattern, Declaration, Expression, ExportNamedDeclaration, JSXElement, JSXFragment,
    Statement,
};
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use std::collections::{HashMap, HashSet};

use crate::fragments::GeneratedNames;
use crate::package::{export_name_of, slice, ParsedFilePkg};

lazy_static! {
    /// Route segment config exports the framework reads by name.
    static ref SEGMENT_EXPORTS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("dynamic");
        s.insert("dynamicParams");
        s.insert("revalidate");
        s.insert("fetchCache");
        s.insert("runtime");
        s.insert("preferredRegion");
        s.insert("maxDuration");
        s.insert("metadata");
        s.insert("generateMetadata");
        s.insert("viewport");
        s.insert("generateViewport");
        s.insert("generateStaticParams");
        s
    };
}

/// A named component export after interception.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedComponentExport {
    /// Public name, preserved on output.
    pub export_name: String,
    /// Hidden local the original value was rebound to.
    pub original_local: String,
    /// Fresh identifier reserved for the wrapped replacement.
    pub default_local_name: String,
}

/// Intercepts every named component export of `pkg`, returning the pairing
/// the client component template re-exports from.
pub fn intercept_named_component_exports<P: ParsedFilePkg + ?Sized>(
    pkg: &mut P,
    names: &GeneratedNames,
) -> Vec<NamedComponentExport> {
    pkg.component_exports()
        .into_iter()
        .filter_map(|export_name| {
            let original_local = pkg.intercept_export(&export_name, &names.hidden(&export_name))?;
            Some(NamedComponentExport {
                default_local_name: names.wrapped(&export_name),
                original_local,
                export_name,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ValueKind {
    Function { renders_jsx: bool },
    Class,
    Call,
    Reference,
    Other,
}

#[derive(Default)]
struct JsxDetector {
    found: bool,
}

impl<'a> Visit<'a> for JsxDetector {
    fn visit_jsx_element(&mut self, _element: &JSXElement<'a>) {
        self.found = true;
    }

    fn visit_jsx_fragment(&mut self, _fragment: &JSXFragment<'a>) {
        self.found = true;
    }
}

fn classify_expression(expr: &Expression) -> ValueKind {
    match expr {
        Expression::ArrowFunctionExpression(func) => {
            let mut detector = JsxDetector::default();
            detector.visit_function_body(&func.body);
            ValueKind::Function {
                renders_jsx: detector.found,
            }
        }
        Expression::FunctionExpression(func) => {
            let mut detector = JsxDetector::default();
            if let Some(body) = &func.body {
                detector.visit_function_body(body);
            }
            ValueKind::Function {
                renders_jsx: detector.found,
            }
        }
        Expression::ClassExpression(_) => ValueKind::Class,
        Expression::CallExpression(_) => ValueKind::Call,
        Expression::Identifier(_) | Expression::StaticMemberExpression(_) => ValueKind::Reference,
        Expression::ParenthesizedExpression(paren) => classify_expression(&paren.expression),
        Expression::TSAsExpression(cast) => classify_expression(&cast.expression),
        Expression::TSSatisfiesExpression(cast) => classify_expression(&cast.expression),
        _ => ValueKind::Other,
    }
}

fn classify_declaration(declaration: &Declaration, locals: &mut HashMap<String, ValueKind>) {
    match declaration {
        Declaration::FunctionDeclaration(func) => {
            if let Some(id) = &func.id {
                let mut detector = JsxDetector::default();
                if let Some(body) = &func.body {
                    detector.visit_function_body(body);
                }
                locals.insert(
                    id.name.to_string(),
                    ValueKind::Function {
                        renders_jsx: detector.found,
                    },
                );
            }
        }
        Declaration::ClassDeclaration(class) => {
            if let Some(id) = &class.id {
                locals.insert(id.name.to_string(), ValueKind::Class);
            }
        }
        Declaration::VariableDeclaration(var) => {
            for d in &var.declarations {
                if let BindingPattern::BindingIdentifier(id) = &d.id {
                    let kind = d.init.as_ref().map_or(ValueKind::Other, classify_expression);
                    locals.insert(id.name.to_string(), kind);
                }
            }
        }
        Declaration::TSTypeAliasDeclaration(alias) => {
            locals.insert(alias.id.name.to_string(), ValueKind::Other);
        }
        Declaration::TSInterfaceDeclaration(interface) => {
            locals.insert(interface.id.name.to_string(), ValueKind::Other);
        }
        _ => {}
    }
}

fn is_pascal_case(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_uppercase() => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn is_component(export_name: &str, local_name: &str, kind: ValueKind) -> bool {
    if SEGMENT_EXPORTS.contains(export_name) || !is_identifier(export_name) {
        return false;
    }
    match kind {
        ValueKind::Other => false,
        ValueKind::Function { renders_jsx } => {
            is_pascal_case(export_name) || (renders_jsx && is_pascal_case(local_name))
        }
        _ => is_pascal_case(export_name),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Named component exports of `code`, in source order.
pub(crate) fn component_export_names(code: &str, source_type: SourceType) -> Vec<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type).parse();
    if !ret.errors.is_empty() {
        return Vec::new();
    }

    let mut locals = HashMap::new();
    for stmt in &ret.program.body {
        match stmt {
            Statement::ExportNamedDeclaration(decl) => {
                if let Some(declaration) = &decl.declaration {
                    classify_declaration(declaration, &mut locals);
                }
            }
            _ => {
                if let Some(declaration) = stmt.as_declaration() {
                    classify_declaration(declaration, &mut locals);
                }
            }
        }
    }

    let mut names: Vec<String> = Vec::new();
    for stmt in &ret.program.body {
        let found = match stmt {
            Statement::ExportNamedDeclaration(decl) if !decl.export_kind.is_type() => {
                exported_components(decl, code, &locals)
            }
            Statement::ExportAllDeclaration(decl) if !decl.export_kind.is_type() => decl
                .exported
                .as_ref()
                .map(export_name_of)
                .filter(|name| is_component(name, name, ValueKind::Reference))
                .into_iter()
                .collect(),
            _ => Vec::new(),
        };
        for name in found {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

fn exported_components(
    decl: &ExportNamedDeclaration,
    code: &str,
    locals: &HashMap<String, ValueKind>,
) -> Vec<String> {
    let mut exported: Vec<(String, String)> = Vec::new();
    if let Some(declaration) = &decl.declaration {
        let mut names = Vec::new();
        match declaration {
            Declaration::FunctionDeclaration(func) => {
                names.extend(func.id.as_ref().map(|id| id.name.to_string()))
            }
            Declaration::ClassDeclaration(class) => {
                names.extend(class.id.as_ref().map(|id| id.name.to_string()))
            }
            Declaration::VariableDeclaration(var) => {
                for d in &var.declarations {
                    if let BindingPattern::BindingIdentifier(id) = &d.id {
                        names.push(id.name.to_string());
                    }
                }
            }
            _ => {}
        }
        exported.extend(names.into_iter().map(|n| (n.clone(), n)));
    } else {
        for spec in &decl.specifiers {
            if spec.export_kind.is_type() {
                continue;
            }
            exported.push((
                export_name_of(&spec.exported),
                slice(code, spec.local.span()).to_string(),
            ));
        }
    }

    exported
        .into_iter()
        .filter(|(export_name, local_name)| {
            // Bindings imported from elsewhere are only known by name.
            let kind = match decl.source {
                Some(_) => ValueKind::Reference,
                None => locals
                    .get(local_name)
                    .copied()
                    .unwrap_or(ValueKind::Reference),
            };
            export_name != "default" && is_component(export_name, local_name, kind)
        })
        .map(|(export_name, _)| export_name)
        .collect()
}
