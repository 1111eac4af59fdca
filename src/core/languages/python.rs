//! Python scanner.
//!
//! Shallower than the JavaScript scanner: imports, top-level functions,
//! classes with their base list and methods. No call-site, component or
//! type-reference extraction.

use regex::Regex;

use super::super::scanner::{
    Definition, DefinitionKind, FileStructure, Import, ImportKind, Language, MethodDef,
};
use super::super::text::{matching_paren, span_at, split_args};
use super::LanguageScanner;
use crate::error::Result;

pub struct PythonScanner {
    plain_import: Regex,
    from_import: Regex,
    top_function: Regex,
    class_decl: Regex,
    method_decl: Regex,
}

impl PythonScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            plain_import: Regex::new(r"(?m)^[ \t]*import\s+([\w.]+)(?:\s+as\s+(\w+))?")?,
            from_import: Regex::new(r"(?m)^[ \t]*from\s+([\w.]+)\s+import\s+([^\n#]+)")?,
            top_function: Regex::new(r"(?m)^(?:async\s+)?def\s+(\w+)\s*\(")?,
            class_decl: Regex::new(r"(?m)^class\s+(\w+)\s*(?:\(([^)]*)\))?\s*:")?,
            method_decl: Regex::new(r"(?m)^[ \t]+(?:async\s+)?def\s+(\w+)\s*\(")?,
        })
    }
}

impl LanguageScanner for PythonScanner {
    fn scan(&self, content: &str, out: &mut FileStructure) -> Result<()> {
        for m in self.plain_import.captures_iter(content) {
            let whole = m.get(0).unwrap();
            out.imports.push(Import {
                module: m.get(1).unwrap().as_str().to_string(),
                default: m.get(2).map(|a| a.as_str().to_string()),
                namespace: None,
                items: Vec::new(),
                kind: ImportKind::Python,
                span: span_at(content, whole.start()),
            });
        }

        for m in self.from_import.captures_iter(content) {
            let whole = m.get(0).unwrap();
            let items = m
                .get(2)
                .unwrap()
                .as_str()
                .trim_start_matches('(')
                .split(',')
                .map(|item| {
                    let item = item.trim().trim_end_matches(')');
                    item.rsplit(" as ").next().unwrap_or(item).trim().to_string()
                })
                .filter(|s| !s.is_empty() && *s != "*")
                .collect();
            out.imports.push(Import {
                module: m.get(1).unwrap().as_str().to_string(),
                default: None,
                namespace: None,
                items,
                kind: ImportKind::Python,
                span: span_at(content, whole.start()),
            });
        }

        for m in self.top_function.captures_iter(content) {
            let whole = m.get(0).unwrap();
            let name = m.get(1).unwrap().as_str().to_string();
            let mut def = Definition::new(name.clone(), DefinitionKind::Function, span_at(content, whole.start()));
            def.is_async = whole.as_str().contains("async");
            def.exported = !name.starts_with('_');
            if let Some(close) = matching_paren(content, whole.end() - 1) {
                def.params = split_args(&content[whole.end()..close]);
            }
            out.definitions.push(def);
        }

        for m in self.class_decl.captures_iter(content) {
            let whole = m.get(0).unwrap();
            let name = m.get(1).unwrap().as_str().to_string();
            let mut def = Definition::new(name.clone(), DefinitionKind::Class, span_at(content, whole.start()));
            def.exported = !name.starts_with('_');

            if let Some(bases) = m.get(2) {
                let bases: Vec<String> = bases
                    .as_str()
                    .split(',')
                    .map(|b| b.trim().to_string())
                    .filter(|b| !b.is_empty() && b != "object" && !b.contains('='))
                    .collect();
                // Multiple inheritance collapses to the first base.
                def.extends = bases.first().cloned();
                if bases.len() > 1 {
                    def.implements = bases[1..].to_vec();
                }
            }

            let body_end = indented_block_end(content, whole.end());
            let body = &content[whole.end()..body_end];
            for mm in self.method_decl.captures_iter(body) {
                let method_whole = mm.get(0).unwrap();
                let method_name = mm.get(1).unwrap().as_str().to_string();
                let abs_start = whole.end() + method_whole.start();
                let method_span = span_at(content, abs_start);

                let mut params = Vec::new();
                if let Some(close) = matching_paren(content, whole.end() + method_whole.end() - 1) {
                    params = split_args(&content[whole.end() + method_whole.end()..close]);
                }
                params.retain(|p| p != "self" && p != "cls");

                def.methods.push(MethodDef {
                    name: method_name.clone(),
                    params: params.clone(),
                    span: method_span,
                });

                let mut method_def = Definition::new(method_name.clone(), DefinitionKind::Method, method_span);
                method_def.params = params;
                method_def.exported = !method_name.starts_with('_');
                method_def.owner_class = Some(name.clone());
                out.definitions.push(method_def);
            }

            out.definitions.push(def);
        }

        Ok(())
    }

    fn file_extensions(&self) -> &[&str] {
        &["py"]
    }

    fn language(&self) -> Language {
        Language::Python
    }
}

/// End offset of the indented block starting after a `class` header: the
/// block runs until the next non-blank line at column zero.
fn indented_block_end(text: &str, from: usize) -> usize {
    let mut offset = from;
    for line in text[from..].split_inclusive('\n') {
        let trimmed = line.trim();
        if !trimmed.is_empty() && !line.starts_with(' ') && !line.starts_with('\t') && offset > from {
            return offset;
        }
        offset += line.len();
    }
    text.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn scan(source: &str) -> FileStructure {
        let scanner = PythonScanner::new().unwrap();
        let mut out = FileStructure::empty(Path::new("test.py").into(), Language::Python);
        scanner.scan(source, &mut out).unwrap();
        out
    }

    #[test]
    fn test_imports() {
        let out = scan("import os.path\nfrom collections import OrderedDict, defaultdict as dd\n");
        assert_eq!(out.imports.len(), 2);
        assert_eq!(out.imports[0].module, "os.path");
        assert_eq!(out.imports[1].module, "collections");
        assert_eq!(out.imports[1].items, vec!["OrderedDict", "dd"]);
    }

    #[test]
    fn test_class_with_bases_and_methods() {
        let out = scan(
            r#"class Spaniel(Dog, Loggable):
    def __init__(self, name):
        self.name = name

    async def fetch(self, item):
        return item

def stray():
    pass
"#,
        );
        let class = out
            .definitions
            .iter()
            .find(|d| d.kind == DefinitionKind::Class)
            .unwrap();
        assert_eq!(class.name, "Spaniel");
        assert_eq!(class.extends.as_deref(), Some("Dog"));
        assert_eq!(class.implements, vec!["Loggable"]);

        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["__init__", "fetch"]);
        let init = class.methods.iter().find(|m| m.name == "__init__").unwrap();
        assert_eq!(init.params, vec!["name"]);

        let stray = out
            .definitions
            .iter()
            .find(|d| d.name == "stray" && d.kind == DefinitionKind::Function)
            .unwrap();
        assert!(stray.exported);
        assert!(stray.owner_class.is_none());
    }

    #[test]
    fn test_private_names_not_exported() {
        let out = scan("def _internal():\n    pass\n\ndef public():\n    pass\n");
        let internal = out.definitions.iter().find(|d| d.name == "_internal").unwrap();
        let public = out.definitions.iter().find(|d| d.name == "public").unwrap();
        assert!(!internal.exported);
        assert!(public.exported);
    }
}
