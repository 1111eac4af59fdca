use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::scanner::{DefinitionKind, FileStructure};

/// The kind of a cross-file relationship in the code map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    Imports,
    ReferencesType,
    InheritsFrom,
    ExtendsInterface,
}

/// A file-granular relationship. `source` is always a file path; `target`
/// is a file path, or the raw module specifier for `imports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
    /// Imported items, for `imports`.
    pub items: Vec<String>,
    /// Referenced type, for `references_type`.
    pub type_name: Option<String>,
    /// Deriving type, for inheritance relationships.
    pub source_type: Option<String>,
    /// Base type, for inheritance relationships.
    pub target_type: Option<String>,
}

impl Relationship {
    fn new(source: String, target: String, kind: RelationshipKind) -> Self {
        Self {
            source,
            target,
            kind,
            items: Vec::new(),
            type_name: None,
            source_type: None,
            target_type: None,
        }
    }
}

/// Per-file structural summaries plus cross-file relationships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeMap {
    pub files: Vec<FileStructure>,
    pub relationships: Vec<Relationship>,
}

/// Builds a `CodeMap` from scanned file structures.
///
/// Consumes the same canonical scanner output as the graph builder. The
/// exported-type index is keyed in sorted path order, so "first match" for
/// ambiguous type names is deterministic and documented rather than an
/// accident of hash iteration.
pub struct CodeMapBuilder;

impl CodeMapBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, files: Vec<FileStructure>) -> CodeMap {
        let exported_types = index_exported_types(&files);
        let mut relationships = Vec::new();

        for structure in &files {
            let path = structure.path.to_string_lossy().to_string();

            for import in &structure.imports {
                let mut rel = Relationship::new(
                    path.clone(),
                    import.module.clone(),
                    RelationshipKind::Imports,
                );
                rel.items = import.items.clone();
                relationships.push(rel);
            }

            for reference in &structure.type_references {
                let Some(exporter) = find_exporter(&exported_types, &path, &reference.name) else {
                    continue;
                };
                let mut rel = Relationship::new(path.clone(), exporter, RelationshipKind::ReferencesType);
                rel.type_name = Some(reference.name.clone());
                relationships.push(rel);
            }

            for def in &structure.definitions {
                match def.kind {
                    DefinitionKind::Class => {
                        let Some(parent) = &def.extends else {
                            continue;
                        };
                        let Some(exporter) = find_exporter(&exported_types, &path, parent) else {
                            continue;
                        };
                        let mut rel =
                            Relationship::new(path.clone(), exporter, RelationshipKind::InheritsFrom);
                        rel.source_type = Some(def.name.clone());
                        rel.target_type = Some(parent.clone());
                        relationships.push(rel);
                    }
                    DefinitionKind::Interface => {
                        for parent in &def.extends_list {
                            let Some(exporter) = find_exporter(&exported_types, &path, parent) else {
                                continue;
                            };
                            let mut rel = Relationship::new(
                                path.clone(),
                                exporter,
                                RelationshipKind::ExtendsInterface,
                            );
                            rel.source_type = Some(def.name.clone());
                            rel.target_type = Some(parent.clone());
                            relationships.push(rel);
                        }
                    }
                    _ => {}
                }
            }
        }

        CodeMap {
            files,
            relationships,
        }
    }
}

impl Default for CodeMapBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `file path -> exported class/interface/enum/type-alias names`, sorted by
/// path.
fn index_exported_types(files: &[FileStructure]) -> BTreeMap<String, BTreeSet<String>> {
    let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for structure in files {
        let path = structure.path.to_string_lossy().to_string();
        for def in &structure.definitions {
            let is_type = matches!(
                def.kind,
                DefinitionKind::Class
                    | DefinitionKind::Interface
                    | DefinitionKind::Enum
                    | DefinitionKind::TypeAlias
            );
            if is_type && def.exported {
                index.entry(path.clone()).or_default().insert(def.name.clone());
            }
        }
    }
    index
}

/// First *other* file, in sorted path order, exporting `name`.
fn find_exporter(
    index: &BTreeMap<String, BTreeSet<String>>,
    own_path: &str,
    name: &str,
) -> Option<String> {
    index
        .iter()
        .find(|(path, types)| path.as_str() != own_path && types.contains(name))
        .map(|(path, _)| path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::SourceScanner;
    use std::path::Path;

    fn build(sources: &[(&str, &str)]) -> CodeMap {
        let scanner = SourceScanner::new().unwrap();
        let files: Vec<FileStructure> = sources
            .iter()
            .map(|(path, content)| scanner.scan_source(Path::new(path), content))
            .collect();
        CodeMapBuilder::new().build(files)
    }

    #[test]
    fn test_import_relationships_keep_module_specifier() {
        let map = build(&[(
            "a.ts",
            "import { helper, format } from './util';\nimport os from 'os';\n",
        )]);
        let imports: Vec<&Relationship> = map
            .relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::Imports)
            .collect();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].target, "./util");
        assert_eq!(imports[0].items, vec!["helper", "format"]);
        assert_eq!(imports[1].target, "os");
    }

    #[test]
    fn test_references_type_resolves_to_exporting_file() {
        let map = build(&[
            ("view.ts", "import { User } from './model';\nfunction show(user: User) {}\n"),
            ("model.ts", "export interface User { name: string; }\n"),
        ]);
        let reference = map
            .relationships
            .iter()
            .find(|r| r.kind == RelationshipKind::ReferencesType)
            .unwrap();
        assert_eq!(reference.source, "view.ts");
        assert_eq!(reference.target, "model.ts");
        assert_eq!(reference.type_name.as_deref(), Some("User"));
    }

    #[test]
    fn test_ambiguous_type_picks_first_in_sorted_path_order() {
        let map = build(&[
            ("view.ts", "function show(user: User) {}\n"),
            ("z_model.ts", "export class User {}\n"),
            ("a_model.ts", "export class User {}\n"),
        ]);
        let reference = map
            .relationships
            .iter()
            .find(|r| r.kind == RelationshipKind::ReferencesType)
            .unwrap();
        assert_eq!(reference.target, "a_model.ts");
    }

    #[test]
    fn test_inherits_from_and_extends_interface() {
        let map = build(&[
            ("dog.ts", "export class Dog extends Animal {}\n"),
            ("animal.ts", "export class Animal {}\n"),
            (
                "shapes.ts",
                "export interface Square extends Drawable, Sizeable {}\n",
            ),
            ("drawable.ts", "export interface Drawable {}\nexport interface Sizeable {}\n"),
        ]);

        let inherits = map
            .relationships
            .iter()
            .find(|r| r.kind == RelationshipKind::InheritsFrom)
            .unwrap();
        assert_eq!(inherits.source, "dog.ts");
        assert_eq!(inherits.target, "animal.ts");
        assert_eq!(inherits.source_type.as_deref(), Some("Dog"));
        assert_eq!(inherits.target_type.as_deref(), Some("Animal"));

        let extended: Vec<&str> = map
            .relationships
            .iter()
            .filter(|r| r.kind == RelationshipKind::ExtendsInterface)
            .filter_map(|r| r.target_type.as_deref())
            .collect();
        assert_eq!(extended, vec!["Drawable", "Sizeable"]);
    }

    #[test]
    fn test_unresolved_inheritance_is_omitted() {
        let map = build(&[("dog.ts", "export class Dog extends Animal {}\n")]);
        assert!(!map
            .relationships
            .iter()
            .any(|r| r.kind == RelationshipKind::InheritsFrom));
    }

    #[test]
    fn test_partial_failure_isolation() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.js");
        let c = dir.path().join("c.js");
        std::fs::write(&a, "function alpha() {}").unwrap();
        std::fs::write(&c, "function gamma() {}").unwrap();
        let missing = dir.path().join("b.js");

        let scanner = SourceScanner::new().unwrap();
        let files = scanner.scan_files(&[a, missing, c]);
        let map = CodeMapBuilder::new().build(files);

        assert_eq!(map.files.len(), 3);
        assert_eq!(map.files[1].language, crate::core::scanner::Language::Unknown);
        assert!(map.files[1].error.is_some());
        assert!(map.files[0].error.is_none());
        assert!(map.files[2].error.is_none());
    }
}
