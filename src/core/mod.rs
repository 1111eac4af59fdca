mod code_map;
mod engine;
mod graph;
mod text;

// Language-specific scanners
mod languages;

// Canonical per-file fact extraction
mod scanner;

// Renderers over the built models
mod render;

pub use code_map::{CodeMap, CodeMapBuilder, Relationship, RelationshipKind};
pub use graph::{
    file_id, symbol_id, CallConfidence, Edge, EdgeKind, FunctionVariant, Graph, GraphBuilder,
    Node, NodeKind,
};
pub use languages::LanguageScanner;
pub use render::{render_code_map_markdown, render_code_map_xml, render_graph_markdown};
pub use scanner::{
    Definition, DefinitionKind, Export, ExportKind, FileStructure, Import, ImportKind, Language,
    MethodCall, MethodDef, SourceScanner, TypeReference, ValueShape, Variable,
};
pub use text::{matching_brace, matching_paren, span_at, split_args, Span};

// Export the main engine
pub use engine::{Engine, GraphQuery};
