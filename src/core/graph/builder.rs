use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use super::super::scanner::{Definition, DefinitionKind, FileStructure, ValueShape};
use super::types::{
    file_id, symbol_id, CallConfidence, Edge, EdgeKind, FunctionVariant, Graph, Node, NodeKind,
};

/// Builds a `Graph` from scanned file structures in two strict passes:
/// node creation over every file, then relationship resolution (extends,
/// imports, calls). Resolution never starts before all nodes exist, because
/// it looks up arbitrary other files' nodes.
///
/// The builder holds no state between calls; every `build` returns a fresh,
/// caller-owned graph.
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, files: &[FileStructure]) -> Graph {
        let mut graph = Graph::new();

        for structure in files {
            self.add_file_nodes(&mut graph, structure);
        }

        self.resolve_extends(&mut graph, files);
        let imports_by_file = self.resolve_imports(&mut graph, files);
        self.resolve_calls(&mut graph, files, &imports_by_file);

        graph
    }

    // ---- pass 1: nodes ----

    fn add_file_nodes(&self, graph: &mut Graph, structure: &FileStructure) {
        let file_node_id = file_id(&structure.path);
        graph.add_node(Node::file(&structure.path));

        for def in &structure.definitions {
            match def.kind {
                DefinitionKind::Function | DefinitionKind::ArrowFunction | DefinitionKind::Method => {
                    self.add_function_node(graph, structure, def, &file_node_id);
                }
                DefinitionKind::Class => {
                    self.add_class_node(graph, structure, def, &file_node_id);
                }
                // Interfaces, enums and type aliases live in the code map
                // only; the graph's node kinds are a closed set.
                DefinitionKind::Interface | DefinitionKind::Enum | DefinitionKind::TypeAlias => {}
            }
        }

        for var in &structure.variables {
            let complex = matches!(
                var.shape,
                ValueShape::Object | ValueShape::Array | ValueShape::Function | ValueShape::Class
            );
            if !complex {
                continue;
            }
            let id = symbol_id(&structure.path, &var.name);
            let mut node = Node::new(id.clone(), NodeKind::Variable, var.name.clone(), structure.path.clone());
            node.shape = Some(var.shape);
            graph.add_node(node);

            let mut edge = Edge::new(id, file_node_id.clone(), EdgeKind::DefinedIn);
            edge.line = Some(var.span.line);
            edge.column = Some(var.span.column);
            graph.add_edge(edge);
        }
    }

    fn add_function_node(
        &self,
        graph: &mut Graph,
        structure: &FileStructure,
        def: &Definition,
        file_node_id: &str,
    ) {
        let id = symbol_id(&structure.path, &def.name);
        let mut node = Node::new(id.clone(), NodeKind::Function, def.name.clone(), structure.path.clone());
        node.variant = Some(match def.kind {
            DefinitionKind::ArrowFunction => FunctionVariant::Arrow,
            DefinitionKind::Method => FunctionVariant::Method,
            _ => FunctionVariant::Function,
        });
        node.params = def.params.clone();
        node.is_generator = def.is_generator;
        node.class_name = def.owner_class.clone();
        graph.add_node(node);

        let mut edge = Edge::new(id.clone(), file_node_id.to_string(), EdgeKind::DefinedIn);
        edge.line = Some(def.span.line);
        edge.column = Some(def.span.column);
        graph.add_edge(edge);

        if let Some(owner) = &def.owner_class {
            graph.add_edge(Edge::new(id, symbol_id(&structure.path, owner), EdgeKind::MemberOf));
        }
    }

    fn add_class_node(
        &self,
        graph: &mut Graph,
        structure: &FileStructure,
        def: &Definition,
        file_node_id: &str,
    ) {
        let id = symbol_id(&structure.path, &def.name);
        let mut node = Node::new(id.clone(), NodeKind::Class, def.name.clone(), structure.path.clone());
        node.extends = def.extends.clone();
        node.methods = def.methods.iter().map(|m| m.name.clone()).collect();
        node.properties = def.properties.clone();
        graph.add_node(node);

        let mut edge = Edge::new(id, file_node_id.to_string(), EdgeKind::DefinedIn);
        edge.line = Some(def.span.line);
        edge.column = Some(def.span.column);
        graph.add_edge(edge);
    }

    // ---- pass 2: relationships ----

    /// Resolve `extends` names against class nodes by label, in node
    /// insertion order. Unresolved parents get a virtual edge to a
    /// synthesized id in the owning file.
    fn resolve_extends(&self, graph: &mut Graph, files: &[FileStructure]) {
        for structure in files {
            for def in &structure.definitions {
                if def.kind != DefinitionKind::Class {
                    continue;
                }
                let Some(parent) = &def.extends else {
                    continue;
                };
                let source = symbol_id(&structure.path, &def.name);
                if !graph.has_node(&source) {
                    continue;
                }

                let resolved = graph
                    .nodes
                    .iter()
                    .find(|n| n.kind == NodeKind::Class && n.label == *parent && n.id != source)
                    .map(|n| n.id.clone());

                let edge = match resolved {
                    Some(target) => Edge::new(source, target, EdgeKind::Extends),
                    None => {
                        let mut edge =
                            Edge::new(source, symbol_id(&structure.path, parent), EdgeKind::Extends);
                        edge.is_virtual = true;
                        edge
                    }
                };
                graph.add_edge(edge);
            }
        }
    }

    /// Resolve import specifiers to file nodes and add `imports` /
    /// `imports_symbol` edges. Returns which file ids each file imports,
    /// for call resolution. Unresolved imports are silently omitted.
    fn resolve_imports(
        &self,
        graph: &mut Graph,
        files: &[FileStructure],
    ) -> HashMap<String, HashSet<String>> {
        let mut imports_by_file: HashMap<String, HashSet<String>> = HashMap::new();

        for structure in files {
            let source = file_id(&structure.path);
            for import in &structure.imports {
                let Some(target) = self.resolve_import(graph, &structure.path, &import.module) else {
                    continue;
                };

                let mut edge = Edge::new(source.clone(), target.clone(), EdgeKind::Imports);
                edge.line = Some(import.span.line);
                edge.column = Some(import.span.column);
                graph.add_edge(edge);

                imports_by_file
                    .entry(source.clone())
                    .or_default()
                    .insert(target.clone());

                for item in &import.items {
                    let symbol = format!("{}#{}", target, item);
                    if graph.has_node(&symbol) {
                        let mut edge = Edge::new(source.clone(), symbol, EdgeKind::ImportsSymbol);
                        edge.import_name = Some(item.clone());
                        graph.add_edge(edge);
                    }
                }
            }
        }

        imports_by_file
    }

    /// Relative specifiers resolve against the importing file's directory
    /// with the exact path, `.js` and `/index.js` candidates tried in that
    /// order; a candidate resolves when it names a known file node.
    /// Non-relative specifiers match by basename equality only.
    fn resolve_import(&self, graph: &Graph, from: &Path, specifier: &str) -> Option<String> {
        if specifier.starts_with("./") || specifier.starts_with("../") {
            let dir = from.parent().unwrap_or_else(|| Path::new(""));
            let candidates = [
                specifier.to_string(),
                format!("{}.js", specifier),
                format!("{}/index.js", specifier),
            ];
            for candidate in candidates {
                let id = file_id(&dir.join(&candidate));
                if graph.has_node(&id) {
                    return Some(id);
                }
            }
            return None;
        }

        let segment = specifier.rsplit('/').next().unwrap_or(specifier);
        let basename = segment.rsplit('.').next().unwrap_or(segment);
        graph
            .nodes
            .iter()
            .find(|n| {
                n.kind == NodeKind::File
                    && n.path.file_stem().and_then(|s| s.to_str()) == Some(basename)
            })
            .map(|n| n.id.clone())
    }

    /// Attach `calls` edges. Source is always the enclosing definition's
    /// symbol node. Target precedence follows the documented best-effort
    /// rules; unresolved calls are dropped.
    fn resolve_calls(
        &self,
        graph: &mut Graph,
        files: &[FileStructure],
        imports_by_file: &HashMap<String, HashSet<String>>,
    ) {
        struct ClassEntry {
            path: PathBuf,
            methods: Vec<String>,
        }
        struct FunctionEntry {
            label: String,
            id: String,
            file: String,
        }

        let classes: Vec<ClassEntry> = graph
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Class)
            .map(|n| ClassEntry {
                path: n.path.clone(),
                methods: n.methods.clone(),
            })
            .collect();
        let functions: Vec<FunctionEntry> = graph
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Function)
            .map(|n| FunctionEntry {
                label: n.label.clone(),
                id: n.id.clone(),
                file: file_id(&n.path),
            })
            .collect();

        for structure in files {
            let source_file = file_id(&structure.path);
            let imported = imports_by_file.get(&source_file);

            for call in &structure.method_calls {
                let Some(caller) = &call.caller else {
                    continue;
                };
                let source = symbol_id(&structure.path, caller);
                if !graph.has_node(&source) {
                    continue;
                }

                let imported_function = || {
                    functions
                        .iter()
                        .find(|f| {
                            f.label == call.name
                                && f.file != source_file
                                && imported.map(|set| set.contains(&f.file)).unwrap_or(false)
                        })
                        .map(|f| (f.id.clone(), CallConfidence::ImportResolved))
                };

                let resolved = if call.receiver.is_some() {
                    // First class whose method list contains the name; the
                    // receiver's actual type is not verified.
                    classes
                        .iter()
                        .find(|c| c.methods.iter().any(|m| m == &call.name))
                        .map(|c| (symbol_id(&c.path, &call.name), CallConfidence::Heuristic))
                        .filter(|(id, _)| graph.has_node(id))
                        .or_else(imported_function)
                } else {
                    let same_file = symbol_id(&structure.path, &call.name);
                    if graph
                        .node(&same_file)
                        .map(|n| n.kind == NodeKind::Function)
                        .unwrap_or(false)
                    {
                        Some((same_file, CallConfidence::SameFile))
                    } else {
                        imported_function()
                    }
                };

                let Some((target, confidence)) = resolved else {
                    continue;
                };

                let mut edge = Edge::new(source, target, EdgeKind::Calls);
                edge.args = Some(call.args.clone());
                edge.line = Some(call.span.line);
                edge.column = Some(call.span.column);
                edge.confidence = Some(confidence);
                graph.add_edge(edge);
            }
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::SourceScanner;

    fn build(sources: &[(&str, &str)]) -> Graph {
        let scanner = SourceScanner::new().unwrap();
        let files: Vec<FileStructure> = sources
            .iter()
            .map(|(path, content)| scanner.scan_source(Path::new(path), content))
            .collect();
        GraphBuilder::new().build(&files)
    }

    #[test]
    fn test_round_trip_scenario() {
        let graph = build(&[
            ("a.js", "function foo() { bar(); }\nconst b = require('./b');\n"),
            ("b.js", "function bar() {}\nmodule.exports = { bar };\n"),
        ]);

        let mut node_ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        node_ids.sort();
        assert_eq!(node_ids, vec!["a.js", "a.js#foo", "b.js", "b.js#bar"]);

        let edge_ids: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert!(edge_ids.contains(&"a.js#foo=>a.js:defined_in"));
        assert!(edge_ids.contains(&"b.js#bar=>b.js:defined_in"));
        assert!(edge_ids.contains(&"a.js=>b.js:imports"));
        assert!(edge_ids.contains(&"a.js#foo=>b.js#bar:calls"));
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn test_import_resolution_with_js_fallback() {
        let graph = build(&[
            ("src/a.js", "const helper = require('./util');\n"),
            ("src/util.js", "module.exports = {};\n"),
        ]);
        let imports: Vec<&Edge> = graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Imports)
            .collect();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].source, "src/a.js");
        assert_eq!(imports[0].target, "src/util.js");
    }

    #[test]
    fn test_import_index_fallback() {
        let graph = build(&[
            ("src/a.js", "import widget from './widgets';\n"),
            ("src/widgets/index.js", "export default function widget() {}\n"),
        ]);
        assert!(graph
            .edges
            .iter()
            .any(|e| e.kind == EdgeKind::Imports && e.target == "src/widgets/index.js"));
    }

    #[test]
    fn test_nonrelative_import_by_basename() {
        let graph = build(&[
            ("app/main.py", "import helpers\n"),
            ("lib/helpers.py", "def assist():\n    pass\n"),
        ]);
        assert!(graph
            .edges
            .iter()
            .any(|e| e.kind == EdgeKind::Imports && e.target == "lib/helpers.py"));
    }

    #[test]
    fn test_imports_symbol_edge() {
        let graph = build(&[
            ("a.js", "import { bar } from './b';\n"),
            ("b.js", "export function bar() {}\n"),
        ]);
        let symbol_edges: Vec<&Edge> = graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::ImportsSymbol)
            .collect();
        assert_eq!(symbol_edges.len(), 1);
        assert_eq!(symbol_edges[0].target, "b.js#bar");
        assert_eq!(symbol_edges[0].import_name.as_deref(), Some("bar"));
    }

    #[test]
    fn test_extends_resolves_to_real_node() {
        let graph = build(&[
            ("dog.js", "class Dog extends Animal {}\n"),
            ("animal.js", "class Animal {}\n"),
        ]);
        let extends: Vec<&Edge> = graph
            .edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Extends)
            .collect();
        assert_eq!(extends.len(), 1);
        assert_eq!(extends[0].target, "animal.js#Animal");
        assert!(!extends[0].is_virtual);
    }

    #[test]
    fn test_extends_virtual_when_parent_missing() {
        let graph = build(&[("dog.js", "class Dog extends Animal {}\n")]);
        let extends = graph
            .edges
            .iter()
            .find(|e| e.kind == EdgeKind::Extends)
            .unwrap();
        assert_eq!(extends.target, "dog.js#Animal");
        assert!(extends.is_virtual);
    }

    #[test]
    fn test_call_prefers_same_file_over_import() {
        let graph = build(&[
            (
                "a.js",
                "import { foo } from './b';\nfunction foo() {}\nfunction main() { foo(); }\n",
            ),
            ("b.js", "export function foo() {}\n"),
        ]);
        let call = graph
            .edges
            .iter()
            .find(|e| e.kind == EdgeKind::Calls && e.source == "a.js#main")
            .unwrap();
        assert_eq!(call.target, "a.js#foo");
        assert_eq!(call.confidence, Some(CallConfidence::SameFile));
    }

    #[test]
    fn test_cross_file_call_requires_import() {
        let graph = build(&[
            ("a.js", "function main() { helper(); }\n"),
            ("b.js", "export function helper() {}\n"),
        ]);
        // b.js is never imported by a.js, so the call is dropped.
        assert!(!graph.edges.iter().any(|e| e.kind == EdgeKind::Calls));
    }

    #[test]
    fn test_receiver_call_uses_method_owner_heuristic() {
        let graph = build(&[
            (
                "service.js",
                "class UserService { fetchUser(id) { return id; } }\n",
            ),
            (
                "app.js",
                "function run(service) { service.fetchUser(1); }\n",
            ),
        ]);
        let call = graph
            .edges
            .iter()
            .find(|e| e.kind == EdgeKind::Calls)
            .unwrap();
        assert_eq!(call.source, "app.js#run");
        assert_eq!(call.target, "service.js#fetchUser");
        assert_eq!(call.confidence, Some(CallConfidence::Heuristic));
    }

    #[test]
    fn test_method_nodes_and_member_of() {
        let graph = build(&[(
            "svc.js",
            "class Api { get(url) { return url; } }\n",
        )]);
        let method = graph.node("svc.js#get").unwrap();
        assert_eq!(method.kind, NodeKind::Function);
        assert_eq!(method.variant, Some(FunctionVariant::Method));
        assert_eq!(method.class_name.as_deref(), Some("Api"));

        assert!(graph
            .edges
            .iter()
            .any(|e| e.kind == EdgeKind::MemberOf
                && e.source == "svc.js#get"
                && e.target == "svc.js#Api"));

        let class = graph.node("svc.js#Api").unwrap();
        assert_eq!(class.kind, NodeKind::Class);
        assert_eq!(class.methods, vec!["get"]);
    }

    #[test]
    fn test_complex_variables_get_nodes() {
        let graph = build(&[(
            "cfg.js",
            "const settings = { retries: 3 };\nlet counter = 0;\n",
        )]);
        assert!(graph.has_node("cfg.js#settings"));
        assert!(!graph.has_node("cfg.js#counter"));
    }

    #[test]
    fn test_degraded_file_still_gets_file_node() {
        let scanner = SourceScanner::new().unwrap();
        let good = scanner.scan_source(Path::new("a.js"), "function f() {}");
        let bad = FileStructure::degraded("broken.js".into(), "unreadable".into());
        let graph = GraphBuilder::new().build(&[good, bad]);
        assert!(graph.has_node("a.js"));
        assert!(graph.has_node("broken.js"));
    }
}
