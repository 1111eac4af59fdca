//! C# scanner.
//!
//! Shallow extraction: using directives, classes with their base list,
//! interfaces, and methods. The base list is split by the `I`+uppercase
//! naming convention: interface-looking names go to `implements`, the
//! first remaining name becomes `extends`. No call-site extraction.

use regex::Regex;

use super::super::scanner::{
    Definition, DefinitionKind, FileStructure, Import, ImportKind, Language, MethodDef,
};
use super::super::text::{brace_depth, matching_brace, matching_paren, span_at, split_args};
use super::LanguageScanner;
use crate::error::Result;

pub struct CSharpScanner {
    using_decl: Regex,
    class_decl: Regex,
    interface_decl: Regex,
    method_decl: Regex,
}

impl CSharpScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            using_decl: Regex::new(r"(?m)^[ \t]*using\s+(?:static\s+)?([\w.]+)\s*;")?,
            class_decl: Regex::new(
                r"(?m)^[ \t]*((?:(?:public|internal|protected|private|abstract|sealed|static|partial)\s+)*)class\s+(\w+)(?:<[^>{\n]*>)?(?:\s*:\s*([^{]+?))?\s*\{",
            )?,
            interface_decl: Regex::new(
                r"(?m)^[ \t]*((?:(?:public|internal|protected|private|partial)\s+)*)interface\s+(\w+)(?:<[^>{\n]*>)?(?:\s*:\s*([^{]+?))?\s*\{",
            )?,
            method_decl: Regex::new(
                r"(?m)^[ \t]*((?:(?:public|internal|protected|private|static|virtual|override|sealed|async|abstract|partial|extern)\s+)+)(?:[\w<>\[\],.?]+\s+)?(\w+)\s*\(",
            )?,
        })
    }

    fn extract_members(
        &self,
        content: &str,
        open: usize,
        class_name: &str,
        def: &mut Definition,
        out: &mut FileStructure,
    ) {
        let Some(close) = matching_brace(content, open) else {
            return;
        };
        let body = &content[open + 1..close];

        for m in self.method_decl.captures_iter(body) {
            let whole = m.get(0).unwrap();
            if brace_depth(body, whole.start()) != 0 {
                continue;
            }
            let name = m.get(2).unwrap().as_str().to_string();
            let abs = open + 1 + whole.start();
            let method_span = span_at(content, abs);

            let mut params = Vec::new();
            if let Some(close_paren) = matching_paren(content, open + 1 + whole.end() - 1) {
                params = split_args(&content[open + 1 + whole.end()..close_paren]);
            }

            def.methods.push(MethodDef {
                name: name.clone(),
                params: params.clone(),
                span: method_span,
            });

            let mut method_def = Definition::new(name, DefinitionKind::Method, method_span);
            method_def.params = params;
            method_def.exported = m.get(1).unwrap().as_str().contains("public");
            method_def.owner_class = Some(class_name.to_string());
            out.definitions.push(method_def);
        }
    }
}

impl LanguageScanner for CSharpScanner {
    fn scan(&self, content: &str, out: &mut FileStructure) -> Result<()> {
        for m in self.using_decl.captures_iter(content) {
            let whole = m.get(0).unwrap();
            out.imports.push(Import {
                module: m.get(1).unwrap().as_str().to_string(),
                default: None,
                namespace: None,
                items: Vec::new(),
                kind: ImportKind::Using,
                span: span_at(content, whole.start()),
            });
        }

        for m in self.class_decl.captures_iter(content) {
            let whole = m.get(0).unwrap();
            let name = m.get(2).unwrap().as_str().to_string();
            let mut def = Definition::new(name.clone(), DefinitionKind::Class, span_at(content, whole.start()));
            def.exported = m.get(1).unwrap().as_str().contains("public");

            if let Some(bases) = m.get(3) {
                for base in split_type_list(bases.as_str()) {
                    if looks_like_interface(&base) {
                        def.implements.push(base);
                    } else if def.extends.is_none() {
                        def.extends = Some(base);
                    } else {
                        def.implements.push(base);
                    }
                }
            }

            self.extract_members(content, whole.end() - 1, &name, &mut def, out);
            out.definitions.push(def);
        }

        for m in self.interface_decl.captures_iter(content) {
            let whole = m.get(0).unwrap();
            let mut def = Definition::new(
                m.get(2).unwrap().as_str(),
                DefinitionKind::Interface,
                span_at(content, whole.start()),
            );
            def.exported = m.get(1).unwrap().as_str().contains("public");
            if let Some(extends) = m.get(3) {
                def.extends_list = split_type_list(extends.as_str());
            }
            out.definitions.push(def);
        }

        Ok(())
    }

    fn file_extensions(&self) -> &[&str] {
        &["cs"]
    }

    fn language(&self) -> Language {
        Language::CSharp
    }
}

/// `IDisposable`-style names: leading `I` followed by another uppercase.
fn looks_like_interface(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().map(|c| c.is_ascii_uppercase()).unwrap_or(false)
}

fn split_type_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().split('<').next().unwrap_or("").trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn scan(source: &str) -> FileStructure {
        let scanner = CSharpScanner::new().unwrap();
        let mut out = FileStructure::empty(Path::new("Test.cs").into(), Language::CSharp);
        scanner.scan(source, &mut out).unwrap();
        out
    }

    #[test]
    fn test_class_with_base_split() {
        let out = scan(
            r#"
using System;
using System.Collections.Generic;

namespace Example.Services
{
    public class OrderService : ServiceBase, IDisposable, IOrderHandler
    {
        public void Submit(Order order)
        {
        }

        private bool Validate(Order order)
        {
            return true;
        }
    }
}
"#,
        );
        assert_eq!(out.imports.len(), 2);
        assert_eq!(out.imports[1].module, "System.Collections.Generic");
        assert_eq!(out.imports[1].kind, ImportKind::Using);

        let class = out
            .definitions
            .iter()
            .find(|d| d.kind == DefinitionKind::Class)
            .unwrap();
        assert_eq!(class.name, "OrderService");
        assert!(class.exported);
        assert_eq!(class.extends.as_deref(), Some("ServiceBase"));
        assert_eq!(class.implements, vec!["IDisposable", "IOrderHandler"]);

        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"Submit"));
        assert!(names.contains(&"Validate"));
    }

    #[test]
    fn test_interface_only_base_list() {
        let out = scan("public class Widget : IRenderable\n{\n}\n");
        let class = out.definitions.iter().find(|d| d.name == "Widget").unwrap();
        assert!(class.extends.is_none());
        assert_eq!(class.implements, vec!["IRenderable"]);
    }

    #[test]
    fn test_using_alias_skipped() {
        let out = scan("using Maps = System.Collections.Generic.Dictionary;\nusing System.IO;\n");
        assert_eq!(out.imports.len(), 1);
        assert_eq!(out.imports[0].module, "System.IO");
    }
}
