use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_span::SourceType;
use std::path::Path;

use crate::constants::DECLARATION_SUFFIXES;

/// Import specifiers found in one file, in depth-first discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedImports {
    pub static_specifiers: Vec<String>,
    /// Full text of `import(...)` calls whose argument is not a literal
    pub dynamic_imports: Vec<String>,
    /// Full text of `require(...)` / `require.resolve(...)` calls whose argument is not a literal
    pub dynamic_requires: Vec<String>,
}

/// A file whose syntax could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub file: String,
    pub message: String,
}

pub fn is_declaration_file(file_name: &str) -> bool {
    DECLARATION_SUFFIXES.iter().any(|suffix| file_name.ends_with(suffix))
}

/// Extracts every import-like construct from `source`.
///
/// Declaration files are parsed leniently: syntax errors are ignored and
/// whatever the parser recovered is still walked. Any other file with a syntax
/// error yields a [`ParseFailure`] carrying the joined diagnostics.
pub fn extract_imports(source: &str, file_name: &str) -> Result<ParsedImports, ParseFailure> {
    trace!("Parsing file for imports: {}", file_name);
    let st = source_type_for(file_name);
    let allocator = Allocator::default();
    let ParserReturn { program, errors, panicked, .. } =
        OxcParser::new(&allocator, source, st).parse();

    if !is_declaration_file(file_name) && (panicked || !errors.is_empty()) {
        let message = if errors.is_empty() {
            "parser aborted".to_string()
        } else {
            errors.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; ")
        };
        debug!("Parse failure in {}: {}", file_name, message);
        return Err(ParseFailure { file: file_name.to_string(), message });
    }

    let mut collector = ImportCollector { source, imports: ParsedImports::default() };
    collector.visit_program(&program);

    let imports = collector.imports;
    debug!(
        "Found {} import specifiers in {} ({} dynamic imports, {} dynamic requires)",
        imports.static_specifiers.len(),
        file_name,
        imports.dynamic_imports.len(),
        imports.dynamic_requires.len()
    );
    Ok(imports)
}

struct ImportCollector<'s> {
    source: &'s str,
    imports: ParsedImports,
}

impl ImportCollector<'_> {
    fn push_static(&mut self, request: &str) {
        trace!("Found static specifier: '{}'", request);
        self.imports.static_specifiers.push(request.to_string());
    }
}

impl<'a> Visit<'a> for ImportCollector<'_> {
    fn visit_import_declaration(&mut self, it: &ImportDeclaration<'a>) {
        self.push_static(it.source.value.as_str());
        walk::walk_import_declaration(self, it);
    }

    fn visit_export_named_declaration(&mut self, it: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &it.source {
            self.push_static(source.value.as_str());
        }
        walk::walk_export_named_declaration(self, it);
    }

    fn visit_export_all_declaration(&mut self, it: &ExportAllDeclaration<'a>) {
        self.push_static(it.source.value.as_str());
        walk::walk_export_all_declaration(self, it);
    }

    fn visit_ts_import_type(&mut self, it: &TSImportType<'a>) {
        // import("pkg").Foo in type position
        if let TSType::TSLiteralType(lit) = &it.argument
            && let Some(request) = type_literal_value(&lit.literal)
        {
            self.push_static(&request);
        }
        walk::walk_ts_import_type(self, it);
    }

    fn visit_import_expression(&mut self, it: &ImportExpression<'a>) {
        match literal_value(&it.source) {
            Some(request) => self.push_static(&request),
            None => {
                let text = it.span.source_text(self.source);
                trace!("Found dynamic import(): '{}'", text);
                self.imports.dynamic_imports.push(text.to_string());
            }
        }
        walk::walk_import_expression(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        if is_require_callee(&it.callee) {
            let literal =
                it.arguments.first().and_then(|arg| arg.as_expression()).and_then(literal_value);
            match literal {
                Some(request) => self.push_static(&request),
                None => {
                    let text = it.span.source_text(self.source);
                    trace!("Found dynamic require(): '{}'", text);
                    self.imports.dynamic_requires.push(text.to_string());
                }
            }
        }
        walk::walk_call_expression(self, it);
    }
}

/// `require` or `require.resolve`
fn is_require_callee(callee: &Expression) -> bool {
    match callee {
        Expression::Identifier(ident) => ident.name.as_str() == "require",
        Expression::StaticMemberExpression(member) => {
            matches!(&member.object, Expression::Identifier(obj) if obj.name.as_str() == "require")
                && member.property.name.as_str() == "resolve"
        }
        _ => false,
    }
}

/// String literal or a template literal without substitutions.
fn literal_value(expr: &Expression) -> Option<String> {
    match expr {
        Expression::StringLiteral(sl) => Some(sl.value.to_string()),
        Expression::TemplateLiteral(tl) if tl.expressions.is_empty() => {
            tl.quasis.first().and_then(|q| q.value.cooked.as_ref()).map(|c| c.to_string())
        }
        _ => None,
    }
}

fn type_literal_value(literal: &TSLiteral) -> Option<String> {
    match literal {
        TSLiteral::StringLiteral(sl) => Some(sl.value.to_string()),
        TSLiteral::TemplateLiteral(tl) if tl.expressions.is_empty() => {
            tl.quasis.first().and_then(|q| q.value.cooked.as_ref()).map(|c| c.to_string())
        }
        _ => None,
    }
}

fn source_type_for(file_name: &str) -> SourceType {
    if is_declaration_file(file_name) {
        return SourceType::default()
            .with_typescript(true)
            .with_typescript_definition(true)
            .with_module(true);
    }

    let ext = Path::new(file_name).extension().and_then(|e| e.to_str());
    let typescript = matches!(ext, Some("ts") | Some("tsx") | Some("mts") | Some("cts"));
    let st = SourceType::default()
        .with_typescript(typescript)
        .with_jsx(!typescript || ext == Some("tsx"));

    match ext {
        Some("mjs") | Some("mts") => st.with_module(true),
        Some("cjs") | Some("cts") => st.with_script(true),
        _ => st.with_unambiguous(true),
    }
}
