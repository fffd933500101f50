//! Structural summary of a module, for checking generated output without
//! matching it line by line.

use oxc_allocator::Allocator;
use oxc_ast::ast::{Declaration, Expression, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::error::TransformError;
use crate::intercept::collect_binding_names;
use crate::package::{export_name_of, source_type, source_type_for};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleShape {
    pub default_exports: usize,
    /// Public names of named value exports, in source order.
    pub named_exports: Vec<String>,
    pub exports_dynamic: bool,
    /// Prologue directives, e.g. `use client`.
    pub directives: Vec<String>,
    /// `use client` occurrences, in the prologue or as stray statements.
    pub client_directives: usize,
    /// The module's very first token is a `use client` directive.
    pub leads_with_client_directive: bool,
}

/// Inspects `code` as TSX, the dialect every generated wrapper is written in.
pub fn inspect_module(code: &str) -> Result<ModuleShape, TransformError> {
    inspect_source("<generated>", code, source_type())
}

/// Inspects `code` in the dialect `path`'s extension selects.
pub fn inspect_module_at(path: &str, code: &str) -> Result<ModuleShape, TransformError> {
    inspect_source(path, code, source_type_for(path))
}

fn inspect_source(path: &str, code: &str, source_type: SourceType) -> Result<ModuleShape, TransformError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, source_type).parse();
    if let Some(error) = ret.errors.first() {
        return Err(TransformError::parse(path, error.to_string()));
    }
    let program = ret.program;

    let mut shape = ModuleShape::default();
    for directive in &program.directives {
        shape.directives.push(directive.directive.to_string());
    }
    shape.client_directives = shape
        .directives
        .iter()
        .filter(|d| d.as_str() == "use client")
        .count();
    shape.leads_with_client_directive = program
        .directives
        .first()
        .is_some_and(|d| d.span.start == 0 && d.directive.as_str() == "use client");

    for stmt in &program.body {
        match stmt {
            Statement::ExportDefaultDeclaration(_) => shape.default_exports += 1,
            Statement::ExportNamedDeclaration(decl) if !decl.export_kind.is_type() => {
                if let Some(declaration) = &decl.declaration {
                    match declaration {
                        Declaration::FunctionDeclaration(f) => {
                            shape.named_exports.extend(f.id.as_ref().map(|id| id.name.to_string()))
                        }
                        Declaration::ClassDeclaration(c) => {
                            shape.named_exports.extend(c.id.as_ref().map(|id| id.name.to_string()))
                        }
                        Declaration::VariableDeclaration(var) => {
                            for d in &var.declarations {
                                collect_binding_names(&d.id, &mut shape.named_exports);
                            }
                        }
                        _ => {}
                    }
                }
                for spec in &decl.specifiers {
                    if spec.export_kind.is_type() {
                        continue;
                    }
                    let name = export_name_of(&spec.exported);
                    if name == "default" {
                        shape.default_exports += 1;
                    } else {
                        shape.named_exports.push(name);
                    }
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                shape.named_exports.extend(decl.exported.as_ref().map(export_name_of));
            }
            Statement::ExpressionStatement(expr) => {
                if let Expression::StringLiteral(lit) = &expr.expression {
                    if lit.value.as_str() == "use client" {
                        shape.client_directives += 1;
                    }
                }
            }
            _ => {}
        }
    }
    shape.exports_dynamic = shape.named_exports.iter().any(|n| n == "dynamic");
    Ok(shape)
}
