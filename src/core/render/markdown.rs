use chrono::Local;

use super::super::code_map::{CodeMap, RelationshipKind};
use super::super::graph::{Graph, NodeKind};
use super::super::scanner::DefinitionKind;

/// Markdown summary of a built code graph.
pub fn render_graph_markdown(graph: &Graph) -> String {
    let mut out = String::new();
    out.push_str("# Code Graph\n\n");
    out.push_str(&format!(
        "_Generated {} — {} nodes, {} edges_\n\n",
        Local::now().format("%Y-%m-%d %H:%M"),
        graph.node_count(),
        graph.edge_count()
    ));

    out.push_str("## Files\n\n");
    for node in graph.nodes.iter().filter(|n| n.kind == NodeKind::File) {
        let deps = graph.file_dependencies(&node.id).len();
        let dependents = graph.file_dependents(&node.id).len();
        out.push_str(&format!(
            "- `{}` ({} dependencies, {} dependents)\n",
            node.id, deps, dependents
        ));
    }

    out.push_str("\n## Symbols\n\n");
    for node in &graph.nodes {
        match node.kind {
            NodeKind::File => {}
            NodeKind::Function => {
                out.push_str(&format!(
                    "- function `{}` in `{}` ({})\n",
                    node.label,
                    node.path.display(),
                    node.params.join(", ")
                ));
            }
            NodeKind::Class => {
                let base = node
                    .extends
                    .as_deref()
                    .map(|e| format!(" extends {}", e))
                    .unwrap_or_default();
                out.push_str(&format!(
                    "- class `{}`{} in `{}` ({} methods)\n",
                    node.label,
                    base,
                    node.path.display(),
                    node.methods.len()
                ));
            }
            NodeKind::Variable => {
                out.push_str(&format!(
                    "- variable `{}` in `{}`\n",
                    node.label,
                    node.path.display()
                ));
            }
        }
    }

    out.push_str("\n## Relationships\n\n");
    for edge in &graph.edges {
        let marker = if edge.is_virtual { " (virtual)" } else { "" };
        out.push_str(&format!(
            "- `{}` {} `{}`{}\n",
            edge.source, edge.kind, edge.target, marker
        ));
    }

    out
}

/// Markdown summary of a built code map.
pub fn render_code_map_markdown(map: &CodeMap) -> String {
    let mut out = String::new();
    out.push_str("# Code Map\n\n");
    out.push_str(&format!(
        "_Generated {} — {} files, {} relationships_\n\n",
        Local::now().format("%Y-%m-%d %H:%M"),
        map.files.len(),
        map.relationships.len()
    ));

    for file in &map.files {
        out.push_str(&format!("## {}\n\n", file.path.display()));
        out.push_str(&format!("Language: {}\n\n", file.language));

        if let Some(error) = &file.error {
            out.push_str(&format!("**Scan failed:** {}\n\n", error));
            continue;
        }

        if !file.imports.is_empty() {
            out.push_str("Imports:\n");
            for import in &file.imports {
                if import.items.is_empty() {
                    out.push_str(&format!("- `{}`\n", import.module));
                } else {
                    out.push_str(&format!(
                        "- `{}` ({})\n",
                        import.module,
                        import.items.join(", ")
                    ));
                }
            }
            out.push('\n');
        }

        if !file.definitions.is_empty() {
            out.push_str("Definitions:\n");
            for def in &file.definitions {
                out.push_str(&format!("- {} `{}`{}\n", describe_kind(def.kind), def.name, definition_notes(def)));
            }
            out.push('\n');
        }

        if !file.public_api.is_empty() {
            out.push_str(&format!("Public API: {}\n\n", file.public_api.join(", ")));
        }
    }

    if !map.relationships.is_empty() {
        out.push_str("## Relationships\n\n");
        for rel in &map.relationships {
            let detail = match rel.kind {
                RelationshipKind::Imports => {
                    if rel.items.is_empty() {
                        String::new()
                    } else {
                        format!(" [{}]", rel.items.join(", "))
                    }
                }
                RelationshipKind::ReferencesType => rel
                    .type_name
                    .as_deref()
                    .map(|t| format!(" [{}]", t))
                    .unwrap_or_default(),
                RelationshipKind::InheritsFrom | RelationshipKind::ExtendsInterface => {
                    match (&rel.source_type, &rel.target_type) {
                        (Some(s), Some(t)) => format!(" [{} -> {}]", s, t),
                        _ => String::new(),
                    }
                }
            };
            out.push_str(&format!(
                "- `{}` {} `{}`{}\n",
                rel.source,
                describe_relationship(rel.kind),
                rel.target,
                detail
            ));
        }
    }

    out
}

fn describe_kind(kind: DefinitionKind) -> &'static str {
    match kind {
        DefinitionKind::Function => "function",
        DefinitionKind::ArrowFunction => "arrow function",
        DefinitionKind::Method => "method",
        DefinitionKind::Class => "class",
        DefinitionKind::Interface => "interface",
        DefinitionKind::Enum => "enum",
        DefinitionKind::TypeAlias => "type alias",
    }
}

fn describe_relationship(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Imports => "imports",
        RelationshipKind::ReferencesType => "references type in",
        RelationshipKind::InheritsFrom => "inherits from",
        RelationshipKind::ExtendsInterface => "extends interface in",
    }
}

fn definition_notes(def: &crate::core::scanner::Definition) -> String {
    let mut notes = Vec::new();
    if def.is_component {
        notes.push("component".to_string());
    }
    if def.is_hook {
        notes.push("hook".to_string());
    }
    if let Some(owner) = &def.owner_class {
        notes.push(format!("on {}", owner));
    }
    if notes.is_empty() {
        String::new()
    } else {
        format!(" ({})", notes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::code_map::CodeMapBuilder;
    use crate::core::graph::GraphBuilder;
    use crate::core::scanner::SourceScanner;
    use std::path::Path;

    #[test]
    fn test_graph_markdown_mentions_nodes_and_edges() {
        let scanner = SourceScanner::new().unwrap();
        let files = vec![
            scanner.scan_source(Path::new("a.js"), "function foo() { bar(); }\nconst b = require('./b');\n"),
            scanner.scan_source(Path::new("b.js"), "function bar() {}\nmodule.exports = { bar };\n"),
        ];
        let graph = GraphBuilder::new().build(&files);
        let md = render_graph_markdown(&graph);
        assert!(md.contains("# Code Graph"));
        assert!(md.contains("`a.js`"));
        assert!(md.contains("function `foo`"));
        assert!(md.contains("`a.js#foo` calls `b.js#bar`"));
    }

    #[test]
    fn test_code_map_markdown_flags_degraded_files() {
        let scanner = SourceScanner::new().unwrap();
        let files = vec![scanner.scan_file(Path::new("/nonexistent/gone.js"))];
        let map = CodeMapBuilder::new().build(files);
        let md = render_code_map_markdown(&map);
        assert!(md.contains("Scan failed:"));
    }
}
