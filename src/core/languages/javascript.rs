//! JavaScript / TypeScript scanner.
//!
//! The deepest of the language scanners: imports in both module systems,
//! function and arrow bindings, classes with members, interfaces, enums,
//! type aliases, component/hook heuristics, type references and
//! body-scoped call sites. All of it regex-driven; brace ranges come from
//! the lexical matcher in `core::text`, with its documented blindness to
//! braces inside strings and comments.

use regex::Regex;

use super::super::scanner::{
    Definition, DefinitionKind, Export, ExportKind, FileStructure, Import, ImportKind, Language,
    MethodCall, MethodDef, TypeReference, ValueShape, Variable,
};
use super::super::text::{brace_depth, matching_brace, matching_paren, span_at, split_args, Span};
use super::LanguageScanner;
use crate::error::Result;

/// Call names that are language keywords, not functions.
const CALL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "typeof", "await", "function", "super",
    "do", "else", "yield",
];

/// Builtins excluded from type-reference extraction.
const BUILTIN_TYPES: &[&str] = &[
    "Array", "Promise", "Record", "Partial", "Required", "Readonly", "Pick", "Omit", "Exclude",
    "Extract", "ReturnType", "Map", "Set", "WeakMap", "WeakSet", "Date", "RegExp", "Error",
    "Object", "String", "Number", "Boolean", "Function", "Symbol", "BigInt", "JSON", "Math",
    "React", "JSX",
];

/// Class bases that mark a React-style class component.
const COMPONENT_BASES: &[&str] = &[
    "Component",
    "PureComponent",
    "React.Component",
    "React.PureComponent",
];

/// Lowercase tags accepted by the JSX heuristic alongside capitalized ones.
const JSX_HTML_TAGS: &[&str] = &[
    "div", "span", "p", "a", "ul", "ol", "li", "button", "input", "form", "img", "section",
    "header", "footer", "nav", "main", "table", "svg",
];

/// A function-shaped definition's body range, used for call scoping.
struct BodyRange {
    caller: String,
    start: usize,
    end: usize,
}

pub struct JavaScriptScanner {
    es_import: Regex,
    side_effect_import: Regex,
    require_import: Regex,
    function_decl: Regex,
    binding_head: Regex,
    class_decl: Regex,
    method_head: Regex,
    property_field: Regex,
    this_property: Regex,
    interface_decl: Regex,
    enum_decl: Regex,
    type_alias: Regex,
    identifier: Regex,
    type_annotation: Regex,
    export_named: Regex,
    export_default: Regex,
    module_exports_object: Regex,
    module_exports_single: Regex,
    module_exports_prop: Regex,
    exports_prop: Regex,
    call_site: Regex,
    jsx_tag: Regex,
    hook_name: Regex,
}

impl JavaScriptScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            es_import: Regex::new(r#"(?m)^[ \t]*import\s+([^;'"\n]+?)\s+from\s+['"]([^'"]+)['"]"#)?,
            side_effect_import: Regex::new(r#"(?m)^[ \t]*import\s+['"]([^'"]+)['"]"#)?,
            require_import: Regex::new(
                r#"(?:const|let|var)\s+(?:([A-Za-z_$][\w$]*)|\{([^}]+)\})\s*=\s*require\s*\(\s*['"]([^'"]+)['"]\s*\)"#,
            )?,
            function_decl: Regex::new(
                r"(?m)^[ \t]*(?:(export)\s+)?(?:(default)\s+)?(?:(async)\s+)?function\s*(\*)?\s*([A-Za-z_$][\w$]*)\s*\(",
            )?,
            binding_head: Regex::new(
                r"(?m)^[ \t]*(?:(export)\s+)?(const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::\s*[^=\n]+?)?\s*=\s*",
            )?,
            class_decl: Regex::new(
                r"(?m)^[ \t]*(?:(export)\s+)?(?:(default)\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)(?:\s+extends\s+([\w$.]+))?(?:\s+implements\s+([\w$,\s.]+?))?\s*\{",
            )?,
            method_head: Regex::new(
                r"(?m)^[ \t]*(?:(?:public|private|protected|static|readonly|override|async)\s+)*(\*)?\s*([A-Za-z_$][\w$]*)\s*\(",
            )?,
            property_field: Regex::new(
                r"(?m)^[ \t]*(?:(?:public|private|protected|static|readonly)\s+)*([A-Za-z_$][\w$]*)\s*(?::[^=;\n]+)?\s*[=;]",
            )?,
            this_property: Regex::new(r"this\.([A-Za-z_$][\w$]*)\s*=")?,
            interface_decl: Regex::new(
                r"(?m)^[ \t]*(?:(export)\s+)?interface\s+([A-Za-z_$][\w$]*)(?:<[^>{\n]*>)?(?:\s+extends\s+([^{]+?))?\s*\{",
            )?,
            enum_decl: Regex::new(
                r"(?m)^[ \t]*(?:(export)\s+)?(?:(const)\s+)?enum\s+([A-Za-z_$][\w$]*)\s*\{",
            )?,
            type_alias: Regex::new(
                r"(?m)^[ \t]*(?:(export)\s+)?type\s+([A-Za-z_$][\w$]*)(?:<[^>=\n]*>)?\s*=",
            )?,
            identifier: Regex::new(r"[A-Za-z_$][\w$]*")?,
            type_annotation: Regex::new(r":\s*([A-Za-z_$][\w$<>.\[\]|& ]*)")?,
            export_named: Regex::new(r"export\s*\{([^}]*)\}")?,
            export_default: Regex::new(r"export\s+default\s+([A-Za-z_$][\w$]*)")?,
            module_exports_object: Regex::new(r"module\.exports\s*=\s*\{([^}]*)\}")?,
            module_exports_single: Regex::new(r"module\.exports\s*=\s*([A-Za-z_$][\w$]*)")?,
            module_exports_prop: Regex::new(r"module\.exports\.([A-Za-z_$][\w$]*)\s*=")?,
            exports_prop: Regex::new(r"(?m)^[ \t]*exports\.([A-Za-z_$][\w$]*)\s*=")?,
            call_site: Regex::new(
                r"(?:([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*\.\s*)?([A-Za-z_$][\w$]*)\s*\(",
            )?,
            jsx_tag: Regex::new(r"<([A-Za-z][\w]*)")?,
            hook_name: Regex::new(r"^use[A-Z]\w*$")?,
        })
    }

    fn extract_imports(&self, text: &str, out: &mut FileStructure) {
        for m in self.es_import.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let clause = m.get(1).unwrap().as_str();
            let module = m.get(2).unwrap().as_str().to_string();
            let mut import = Import {
                module,
                default: None,
                namespace: None,
                items: Vec::new(),
                kind: ImportKind::Es,
                span: span_at(text, whole.start()),
            };
            parse_import_clause(clause, &mut import);
            out.imports.push(import);
        }

        for m in self.side_effect_import.captures_iter(text) {
            let whole = m.get(0).unwrap();
            // The `from`-style regex already consumed binding imports.
            if self.es_import.is_match(whole.as_str()) {
                continue;
            }
            out.imports.push(Import {
                module: m.get(1).unwrap().as_str().to_string(),
                default: None,
                namespace: None,
                items: Vec::new(),
                kind: ImportKind::Es,
                span: span_at(text, whole.start()),
            });
        }

        for m in self.require_import.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let module = m.get(3).unwrap().as_str().to_string();
            let mut import = Import {
                module,
                default: None,
                namespace: None,
                items: Vec::new(),
                kind: ImportKind::CommonJs,
                span: span_at(text, whole.start()),
            };
            if let Some(single) = m.get(1) {
                import.default = Some(single.as_str().to_string());
            } else if let Some(destructured) = m.get(2) {
                import.items = split_binding_list(destructured.as_str());
            }
            out.imports.push(import);
        }
    }

    fn extract_functions(&self, text: &str, out: &mut FileStructure, bodies: &mut Vec<BodyRange>) {
        for m in self.function_decl.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let name = m.get(5).unwrap().as_str().to_string();
            let open_paren = whole.end() - 1;

            let mut def = Definition::new(name.clone(), DefinitionKind::Function, span_at(text, whole.start()));
            def.exported = m.get(1).is_some();
            def.is_async = m.get(3).is_some();
            def.is_generator = m.get(4).is_some();

            let mut after_params = whole.end();
            if let Some(close) = matching_paren(text, open_paren) {
                def.params = split_args(&text[open_paren + 1..close]);
                after_params = close + 1;
            }

            if let Some((start, end)) = brace_body_after(text, after_params) {
                bodies.push(BodyRange {
                    caller: name.clone(),
                    start,
                    end,
                });
            }

            if m.get(2).is_some() {
                out.exports.push(Export {
                    name,
                    kind: ExportKind::Default,
                    span: span_at(text, whole.start()),
                });
            }

            out.definitions.push(def);
        }
    }

    /// Arrow-function and function-expression bindings, plus memo/forwardRef
    /// wrappers. Non-function bindings fall through to variable extraction.
    fn extract_bindings(&self, text: &str, out: &mut FileStructure, bodies: &mut Vec<BodyRange>) {
        for m in self.binding_head.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let name = m.get(3).unwrap().as_str().to_string();
            let rest = &text[whole.end()..];
            let span = span_at(text, whole.start());
            let exported = m.get(1).is_some();

            if let Some(tail) = parse_arrow(text, whole.end()) {
                let mut def = Definition::new(name.clone(), DefinitionKind::ArrowFunction, span);
                def.exported = exported;
                def.is_async = tail.is_async;
                def.params = tail.params;
                def.is_hook = self.hook_name.is_match(&name);
                if let Some((start, end)) = tail.body {
                    bodies.push(BodyRange {
                        caller: name.clone(),
                        start,
                        end,
                    });
                }
                out.definitions.push(def);
            } else if let Some(stripped) = strip_prefixes(rest, &["async ", "async\t"]) {
                // `= async function ...`
                if stripped.trim_start().starts_with("function") {
                    self.push_function_expression(text, whole.end(), name, exported, true, out, bodies);
                }
            } else if rest.trim_start().starts_with("function") {
                self.push_function_expression(text, whole.end(), name, exported, false, out, bodies);
            } else if is_memo_or_forward_ref(rest) {
                let mut def = Definition::new(name.clone(), DefinitionKind::ArrowFunction, span);
                def.exported = exported;
                def.is_component = true;
                out.definitions.push(def);
            }
        }
    }

    fn push_function_expression(
        &self,
        text: &str,
        value_start: usize,
        name: String,
        exported: bool,
        is_async: bool,
        out: &mut FileStructure,
        bodies: &mut Vec<BodyRange>,
    ) {
        let span = span_at(text, value_start);
        let mut def = Definition::new(name.clone(), DefinitionKind::Function, span);
        def.exported = exported;
        def.is_async = is_async;
        def.is_hook = self.hook_name.is_match(&name);

        if let Some(paren) = text[value_start..].find('(') {
            let open = value_start + paren;
            def.is_generator = text[value_start..open].contains('*');
            if let Some(close) = matching_paren(text, open) {
                def.params = split_args(&text[open + 1..close]);
                if let Some((start, end)) = brace_body_after(text, close + 1) {
                    bodies.push(BodyRange {
                        caller: name,
                        start,
                        end,
                    });
                }
            }
        }

        out.definitions.push(def);
    }

    fn extract_classes(&self, text: &str, out: &mut FileStructure, bodies: &mut Vec<BodyRange>) {
        for m in self.class_decl.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let name = m.get(3).unwrap().as_str().to_string();
            let extends = m.get(4).map(|e| e.as_str().to_string());
            let open = whole.end() - 1;

            let mut def = Definition::new(name.clone(), DefinitionKind::Class, span_at(text, whole.start()));
            def.exported = m.get(1).is_some();
            def.extends = extends.clone();
            def.is_component = extends
                .as_deref()
                .map(|e| COMPONENT_BASES.contains(&e))
                .unwrap_or(false);
            if let Some(implements) = m.get(5) {
                def.implements = split_binding_list(implements.as_str());
            }

            if m.get(2).is_some() {
                out.exports.push(Export {
                    name: name.clone(),
                    kind: ExportKind::Default,
                    span: span_at(text, whole.start()),
                });
            }

            let Some(close) = matching_brace(text, open) else {
                // Unbalanced body: keep the class, skip member extraction.
                out.definitions.push(def);
                continue;
            };
            let body = &text[open + 1..close];

            for mm in self.method_head.captures_iter(body) {
                let method_whole = mm.get(0).unwrap();
                if brace_depth(body, method_whole.start()) != 0 {
                    continue;
                }
                let method_name = mm.get(2).unwrap().as_str().to_string();
                if CALL_KEYWORDS.contains(&method_name.as_str()) {
                    continue;
                }

                let abs_open = open + 1 + method_whole.end() - 1;
                let mut params = Vec::new();
                let mut after = open + 1 + method_whole.end();
                if let Some(close_paren) = matching_paren(text, abs_open) {
                    params = split_args(&text[abs_open + 1..close_paren]);
                    after = close_paren + 1;
                }
                let method_span = span_at(text, open + 1 + method_whole.start());

                def.methods.push(MethodDef {
                    name: method_name.clone(),
                    params: params.clone(),
                    span: method_span,
                });

                let mut method_def = Definition::new(method_name.clone(), DefinitionKind::Method, method_span);
                method_def.params = params;
                method_def.is_generator = mm.get(1).is_some();
                method_def.owner_class = Some(name.clone());
                out.definitions.push(method_def);

                if let Some((start, end)) = brace_body_after(text, after) {
                    bodies.push(BodyRange {
                        caller: method_name,
                        start,
                        end,
                    });
                }
            }

            let method_names: Vec<&str> = def.methods.iter().map(|mth| mth.name.as_str()).collect();
            for pm in self.property_field.captures_iter(body) {
                let prop_whole = pm.get(0).unwrap();
                if brace_depth(body, prop_whole.start()) != 0 {
                    continue;
                }
                let prop = pm.get(1).unwrap().as_str();
                if CALL_KEYWORDS.contains(&prop)
                    || method_names.contains(&prop)
                    || def.properties.iter().any(|p| p == prop)
                {
                    continue;
                }
                def.properties.push(prop.to_string());
            }
            for pm in self.this_property.captures_iter(body) {
                let prop = pm.get(1).unwrap().as_str();
                if !def.properties.iter().any(|p| p == prop) {
                    def.properties.push(prop.to_string());
                }
            }

            out.definitions.push(def);
        }
    }

    fn extract_interfaces(&self, text: &str, out: &mut FileStructure) {
        for m in self.interface_decl.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let mut def = Definition::new(
                m.get(2).unwrap().as_str(),
                DefinitionKind::Interface,
                span_at(text, whole.start()),
            );
            def.exported = m.get(1).is_some();
            if let Some(extends) = m.get(3) {
                def.extends_list = extends
                    .as_str()
                    .split(',')
                    .map(strip_generics)
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            out.definitions.push(def);
        }
    }

    fn extract_enums(&self, text: &str, out: &mut FileStructure) {
        for m in self.enum_decl.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let mut def = Definition::new(
                m.get(3).unwrap().as_str(),
                DefinitionKind::Enum,
                span_at(text, whole.start()),
            );
            def.exported = m.get(1).is_some();
            def.is_const = m.get(2).is_some();

            let open = whole.end() - 1;
            if let Some(close) = matching_brace(text, open) {
                for member in text[open + 1..close].split(',') {
                    if let Some(id) = self.identifier.find(member.trim()) {
                        if id.start() == 0 {
                            def.members.push(id.as_str().to_string());
                        }
                    }
                }
            }

            out.definitions.push(def);
        }
    }

    fn extract_type_aliases(&self, text: &str, out: &mut FileStructure) {
        for m in self.type_alias.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let mut def = Definition::new(
                m.get(2).unwrap().as_str(),
                DefinitionKind::TypeAlias,
                span_at(text, whole.start()),
            );
            def.exported = m.get(1).is_some();
            out.definitions.push(def);
        }
    }

    fn extract_variables(&self, text: &str, out: &mut FileStructure) {
        for m in self.binding_head.captures_iter(text) {
            let whole = m.get(0).unwrap();
            let name = m.get(3).unwrap().as_str();
            if out.definitions.iter().any(|d| d.name == name) {
                continue;
            }

            let rest = text[whole.end()..].trim_start();
            if rest.starts_with("require") {
                continue;
            }
            let shape = classify_value(rest);

            out.variables.push(Variable {
                name: name.to_string(),
                binding: m.get(2).unwrap().as_str().to_string(),
                shape,
                exported: m.get(1).is_some(),
                span: span_at(text, whole.start()),
            });
        }
    }

    fn extract_exports(&self, text: &str, out: &mut FileStructure) {
        for m in self.export_named.captures_iter(text) {
            let span = span_at(text, m.get(0).unwrap().start());
            for item in m.get(1).unwrap().as_str().split(',') {
                let item = item.trim();
                if item.is_empty() {
                    continue;
                }
                // `orig as alias` exports the alias.
                let name = item.rsplit(" as ").next().unwrap_or(item).trim();
                if !name.is_empty() && name != "default" {
                    push_export(out, name, ExportKind::Named, span);
                }
            }
        }

        for m in self.export_default.captures_iter(text) {
            let name = m.get(1).unwrap().as_str();
            // `export default class/function/async ...` is handled where the
            // definition itself is extracted.
            if matches!(name, "class" | "function" | "async" | "new") {
                continue;
            }
            let span = span_at(text, m.get(0).unwrap().start());
            push_export(out, name, ExportKind::Default, span);
        }

        for m in self.module_exports_object.captures_iter(text) {
            let span = span_at(text, m.get(0).unwrap().start());
            for item in m.get(1).unwrap().as_str().split(',') {
                let name = item.split(':').next().unwrap_or("").trim();
                if !name.is_empty() && self.identifier.is_match(name) {
                    push_export(out, name, ExportKind::CommonJs, span);
                }
            }
        }

        for m in self.module_exports_single.captures_iter(text) {
            let span = span_at(text, m.get(0).unwrap().start());
            push_export(out, m.get(1).unwrap().as_str(), ExportKind::CommonJs, span);
        }

        for m in self.module_exports_prop.captures_iter(text) {
            let span = span_at(text, m.get(0).unwrap().start());
            push_export(out, m.get(1).unwrap().as_str(), ExportKind::CommonJs, span);
        }

        for m in self.exports_prop.captures_iter(text) {
            let span = span_at(text, m.get(0).unwrap().start());
            push_export(out, m.get(1).unwrap().as_str(), ExportKind::CommonJs, span);
        }
    }

    /// Names scraped from `:` annotation positions, including generic
    /// arguments, filtered to uppercase-initial non-builtins and deduplicated.
    fn extract_type_references(&self, text: &str, out: &mut FileStructure) {
        let mut seen = std::collections::HashSet::new();
        for m in self.type_annotation.captures_iter(text) {
            let annotation = m.get(1).unwrap();
            for token in self.identifier.find_iter(annotation.as_str()) {
                let name = token.as_str();
                let upper = name.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false);
                if !upper || BUILTIN_TYPES.contains(&name) || !seen.insert(name.to_string()) {
                    continue;
                }
                out.type_references.push(TypeReference {
                    name: name.to_string(),
                    span: span_at(text, annotation.start() + token.start()),
                });
            }
        }
    }

    /// Calls are attributed to the smallest enclosing recorded body, so a
    /// call inside a nested arrow is not also credited to the outer function.
    fn extract_calls(&self, text: &str, bodies: &[BodyRange], out: &mut FileStructure) {
        for body in bodies {
            let slice = &text[body.start..body.end];
            for m in self.call_site.captures_iter(slice) {
                let whole = m.get(0).unwrap();
                let abs = body.start + whole.start();

                let inner = bodies.iter().any(|other| {
                    other.start > body.start
                        && other.end <= body.end
                        && other.start <= abs
                        && abs < other.end
                });
                if inner {
                    continue;
                }

                let name = m.get(2).unwrap().as_str();
                if CALL_KEYWORDS.contains(&name) || preceded_by_new(text, abs) {
                    continue;
                }

                let open = body.start + whole.end() - 1;
                let args = match matching_paren(text, open) {
                    Some(close) => split_args(&text[open + 1..close]),
                    None => Vec::new(),
                };

                out.method_calls.push(MethodCall {
                    name: name.to_string(),
                    receiver: m.get(1).map(|r| r.as_str().to_string()),
                    caller: Some(body.caller.clone()),
                    args,
                    span: span_at(text, abs),
                });
            }
        }
    }

    /// Component flag for function-shaped definitions whose body contains a
    /// JSX-like tag, plus the `${Name}Props` association.
    fn detect_components(&self, text: &str, bodies: &[BodyRange], out: &mut FileStructure) {
        let prop_types: Vec<String> = out
            .definitions
            .iter()
            .filter(|d| {
                matches!(
                    d.kind,
                    DefinitionKind::Interface | DefinitionKind::TypeAlias | DefinitionKind::Class
                )
            })
            .map(|d| d.name.clone())
            .collect();

        for def in &mut out.definitions {
            if matches!(def.kind, DefinitionKind::Function | DefinitionKind::ArrowFunction) {
                if !def.is_component {
                    if let Some(body) = bodies.iter().find(|b| b.caller == def.name) {
                        def.is_component = self.body_has_jsx(&text[body.start..body.end]);
                    }
                }
                def.is_hook = self.hook_name.is_match(&def.name);
            }

            if def.is_component {
                let props = format!("{}Props", def.name);
                if prop_types.contains(&props) {
                    def.props_type = Some(props);
                }
            }
        }
    }

    fn body_has_jsx(&self, body: &str) -> bool {
        for m in self.jsx_tag.captures_iter(body) {
            let tag = m.get(1).unwrap().as_str();
            let first_upper = tag.chars().next().map(|c| c.is_ascii_uppercase()).unwrap_or(false);
            if first_upper || JSX_HTML_TAGS.contains(&tag) {
                return true;
            }
        }
        false
    }
}

impl LanguageScanner for JavaScriptScanner {
    fn scan(&self, content: &str, out: &mut FileStructure) -> Result<()> {
        let mut bodies = Vec::new();

        self.extract_imports(content, out);
        self.extract_functions(content, out, &mut bodies);
        self.extract_bindings(content, out, &mut bodies);
        self.extract_classes(content, out, &mut bodies);
        self.extract_interfaces(content, out);
        self.extract_enums(content, out);
        self.extract_type_aliases(content, out);
        self.extract_variables(content, out);
        self.extract_exports(content, out);
        self.extract_type_references(content, out);
        self.detect_components(content, &bodies, out);
        self.extract_calls(content, &bodies, out);

        Ok(())
    }

    fn file_extensions(&self) -> &[&str] {
        &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"]
    }

    fn language(&self) -> Language {
        Language::JavaScript
    }
}

/// Parsed arrow tail: `(a, b) => ...` or `x => ...` at `pos` in `text`.
struct ArrowTail {
    is_async: bool,
    params: Vec<String>,
    /// Brace-delimited or expression body range, when one was found.
    body: Option<(usize, usize)>,
}

fn parse_arrow(text: &str, pos: usize) -> Option<ArrowTail> {
    let mut cursor = pos;
    let mut is_async = false;

    let rest = text[cursor..].trim_start();
    cursor += text[cursor..].len() - rest.len();
    if let Some(after) = rest.strip_prefix("async") {
        if after.starts_with(|c: char| c.is_whitespace() || c == '(') {
            is_async = true;
            cursor += "async".len();
            let rest = text[cursor..].trim_start();
            cursor += text[cursor..].len() - rest.len();
        }
    }

    let params;
    let after_params;
    if text[cursor..].starts_with('(') {
        let close = matching_paren(text, cursor)?;
        params = split_args(&text[cursor + 1..close]);
        after_params = close + 1;
    } else {
        // Single bare parameter.
        let rest = &text[cursor..];
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        params = vec![rest[..end].to_string()];
        after_params = cursor + end;
    }

    // Optional return annotation, then the arrow itself.
    let tail = text[after_params..].trim_start();
    let mut arrow_at = after_params + (text[after_params..].len() - tail.len());
    if tail.starts_with(':') {
        let anno_end = text[arrow_at..]
            .find("=>")
            .map(|i| arrow_at + i)?;
        arrow_at = anno_end;
    }
    if !text[arrow_at..].starts_with("=>") {
        return None;
    }

    let body_start = arrow_at + 2;
    let body_text = text[body_start..].trim_start();
    let body_at = body_start + (text[body_start..].len() - body_text.len());
    let body = if body_text.starts_with('{') {
        matching_brace(text, body_at).map(|close| (body_at + 1, close))
    } else {
        let end = text[body_at..]
            .find(|c| c == ';' || c == '\n')
            .map(|i| body_at + i)
            .unwrap_or(text.len());
        Some((body_at, end))
    };

    Some(ArrowTail {
        is_async,
        params,
        body,
    })
}

/// `{ start, end }` of the `{`-delimited body following `from`, skipping an
/// optional return-type annotation. Gives up at the first `;`.
fn brace_body_after(text: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                let close = matching_brace(text, i)?;
                return Some((i + 1, close));
            }
            b';' => return None,
            _ => i += 1,
        }
    }
    None
}

fn parse_import_clause(clause: &str, import: &mut Import) {
    let clause = clause.trim();

    if let Some(ns) = clause.strip_prefix("* as ") {
        import.namespace = Some(ns.trim().to_string());
        return;
    }

    match clause.find('{') {
        Some(brace) => {
            let before = clause[..brace].trim().trim_end_matches(',').trim();
            if !before.is_empty() {
                import.default = Some(before.to_string());
            }
            let inner = clause[brace + 1..].trim_end_matches('}');
            import.items = split_binding_list(inner);
        }
        None => {
            if !clause.is_empty() {
                import.default = Some(clause.to_string());
            }
        }
    }
}

/// Split `a, b as c, d` into binding names (`as` aliases win).
fn split_binding_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| {
            let item = item.trim();
            item.rsplit(" as ").next().unwrap_or(item).trim().to_string()
        })
        .filter(|s| !s.is_empty())
        .map(|s| strip_generics(&s))
        .filter(|s| !s.is_empty())
        .collect()
}

fn strip_generics(name: &str) -> String {
    name.split('<').next().unwrap_or("").trim().to_string()
}

fn strip_prefixes<'a>(text: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    let trimmed = text.trim_start();
    prefixes.iter().find_map(|p| trimmed.strip_prefix(p))
}

fn is_memo_or_forward_ref(rest: &str) -> bool {
    let rest = rest.trim_start();
    let rest = rest.strip_prefix("React.").unwrap_or(rest);
    for wrapper in ["memo", "forwardRef"] {
        if let Some(after) = rest.strip_prefix(wrapper) {
            if after.trim_start().starts_with('(') {
                return true;
            }
        }
    }
    false
}

fn classify_value(rest: &str) -> ValueShape {
    let rest = rest.trim_start();
    if rest.starts_with('{') {
        ValueShape::Object
    } else if rest.starts_with('[') {
        ValueShape::Array
    } else if rest.starts_with("function") || rest.starts_with("async") {
        ValueShape::Function
    } else if rest.starts_with("class") {
        ValueShape::Class
    } else if rest.starts_with('\'')
        || rest.starts_with('"')
        || rest.starts_with('`')
        || rest.starts_with(|c: char| c.is_ascii_digit())
        || rest.starts_with("true")
        || rest.starts_with("false")
        || rest.starts_with("null")
    {
        ValueShape::Literal
    } else {
        ValueShape::Other
    }
}

/// True when the word immediately before `offset` is `new`.
fn preceded_by_new(text: &str, offset: usize) -> bool {
    let before = text[..offset].trim_end();
    before.ends_with("new")
        && before[..before.len() - 3]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric() && c != '_' && c != '$')
            .unwrap_or(true)
}

fn push_export(out: &mut FileStructure, name: &str, kind: ExportKind, span: Span) {
    if !out.exports.iter().any(|e| e.name == name) {
        out.exports.push(Export {
            name: name.to_string(),
            kind,
            span,
        });
    }
}
