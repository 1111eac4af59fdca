//! Java scanner.
//!
//! Shallow extraction: imports, classes with extends/implements,
//! interfaces, and methods declared with at least one modifier. No
//! call-site extraction.

use regex::Regex;

use super::super::scanner::{
    Definition, DefinitionKind, FileStructure, Import, ImportKind, Language, MethodDef,
};
use super::super::text::{brace_depth, matching_brace, matching_paren, span_at, split_args};
use super::LanguageScanner;
use crate::error::Result;

pub struct JavaScanner {
    import_decl: Regex,
    class_decl: Regex,
    interface_decl: Regex,
    method_decl: Regex,
}

impl JavaScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            import_decl: Regex::new(r"(?m)^[ \t]*import\s+(?:static\s+)?([\w.]+(?:\.\*)?)\s*;")?,
            class_decl: Regex::new(
                r"(?m)^[ \t]*((?:(?:public|protected|private|abstract|final|static|sealed)\s+)*)class\s+(\w+)(?:<[^>{\n]*>)?(?:\s+extends\s+([\w.]+)(?:<[^>{\n]*>)?)?(?:\s+implements\s+([^{]+?))?\s*\{",
            )?,
            interface_decl: Regex::new(
                r"(?m)^[ \t]*((?:(?:public|protected|private|abstract|static|sealed)\s+)*)interface\s+(\w+)(?:<[^>{\n]*>)?(?:\s+extends\s+([^{]+?))?\s*\{",
            )?,
            method_decl: Regex::new(
                r"(?m)^[ \t]*((?:(?:public|protected|private|static|final|abstract|synchronized|native|default)\s+)+)(?:[\w<>\[\],.]+\s+)?(\w+)\s*\(",
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

impl LanguageScanner for JavaScanner {
    fn scan(&self, content: &str, out: &mut FileStructure) -> Result<()> {
        for m in self.import_decl.captures_iter(content) {
            let whole = m.get(0).unwrap();
            out.imports.push(Import {
                module: m.get(1).unwrap().as_str().to_string(),
                default: None,
                namespace: None,
                items: Vec::new(),
                kind: ImportKind::Java,
                span: span_at(content, whole.start()),
            });
        }

        for m in self.class_decl.captures_iter(content) {
            let whole = m.get(0).unwrap();
            let name = m.get(2).unwrap().as_str().to_string();
            let mut def = Definition::new(name.clone(), DefinitionKind::Class, span_at(content, whole.start()));
            def.exported = m.get(1).unwrap().as_str().contains("public");
            def.extends = m.get(3).map(|e| e.as_str().to_string());
            if let Some(implements) = m.get(4) {
                def.implements = split_type_list(implements.as_str());
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
        &["java"]
    }

    fn language(&self) -> Language {
        Language::Java
    }
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
        let scanner = JavaScanner::new().unwrap();
        let mut out = FileStructure::empty(Path::new("Test.java").into(), Language::Java);
        scanner.scan(source, &mut out).unwrap();
        out
    }

    #[test]
    fn test_class_extraction() {
        let out = scan(
            r#"
package com.example.service;

import java.util.List;
import com.example.model.User;

public class UserService extends BaseService implements AutoCloseable, Iterable<User> {
    private final List<User> cache;

    public User findUser(String id) {
        return null;
    }

    private void evict() {
    }
}
"#,
        );
        assert_eq!(out.imports.len(), 2);
        assert_eq!(out.imports[0].module, "java.util.List");
        assert_eq!(out.imports[0].kind, ImportKind::Java);

        let class = out
            .definitions
            .iter()
            .find(|d| d.kind == DefinitionKind::Class)
            .unwrap();
        assert_eq!(class.name, "UserService");
        assert!(class.exported);
        assert_eq!(class.extends.as_deref(), Some("BaseService"));
        assert_eq!(class.implements, vec!["AutoCloseable", "Iterable"]);

        let names: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"findUser"));
        assert!(names.contains(&"evict"));

        let find_user = out
            .definitions
            .iter()
            .find(|d| d.name == "findUser" && d.kind == DefinitionKind::Method)
            .unwrap();
        assert!(find_user.exported);
        assert_eq!(find_user.owner_class.as_deref(), Some("UserService"));
        assert_eq!(find_user.params, vec!["String id"]);
    }

    #[test]
    fn test_interface_extraction() {
        let out = scan("public interface Repository extends Closeable, Flushable {\n}\n");
        let iface = out.definitions.iter().find(|d| d.name == "Repository").unwrap();
        assert_eq!(iface.kind, DefinitionKind::Interface);
        assert_eq!(iface.extends_list, vec!["Closeable", "Flushable"]);
    }
}
