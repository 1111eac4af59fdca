use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::super::scanner::ValueShape;

/// The kind of a node in the code graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Function,
    Class,
    Variable,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::File => write!(f, "file"),
            NodeKind::Function => write!(f, "function"),
            NodeKind::Class => write!(f, "class"),
            NodeKind::Variable => write!(f, "variable"),
        }
    }
}

/// The kind of an edge (relationship) in the code graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    DefinedIn,
    MemberOf,
    Extends,
    Imports,
    ImportsSymbol,
    Calls,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::DefinedIn => write!(f, "defined_in"),
            EdgeKind::MemberOf => write!(f, "member_of"),
            EdgeKind::Extends => write!(f, "extends"),
            EdgeKind::Imports => write!(f, "imports"),
            EdgeKind::ImportsSymbol => write!(f, "imports_symbol"),
            EdgeKind::Calls => write!(f, "calls"),
        }
    }
}

/// Which syntactic form a function node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionVariant {
    Function,
    Arrow,
    Method,
}

/// How a `calls` edge target was resolved. The receiver-method lookup is a
/// best-effort guess and is marked as such rather than presented as fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallConfidence {
    SameFile,
    ImportResolved,
    Heuristic,
}

/// A vertex in the code graph: a file or a symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Globally unique: the file path for files, `"path#symbol"` for symbols.
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// Owning file (the file itself for file nodes).
    pub path: PathBuf,
    pub variant: Option<FunctionVariant>,
    pub params: Vec<String>,
    pub is_generator: bool,
    /// Owning class, for method nodes.
    pub class_name: Option<String>,
    /// Base class, for class nodes.
    pub extends: Option<String>,
    /// Method names, for class nodes.
    pub methods: Vec<String>,
    /// Property names, for class nodes.
    pub properties: Vec<String>,
    /// Value shape, for variable nodes.
    pub shape: Option<ValueShape>,
}

impl Node {
    pub fn new(id: String, kind: NodeKind, label: String, path: PathBuf) -> Self {
        Self {
            id,
            kind,
            label,
            path,
            variant: None,
            params: Vec::new(),
            is_generator: false,
            class_name: None,
            extends: None,
            methods: Vec::new(),
            properties: Vec::new(),
            shape: None,
        }
    }

    pub fn file(path: &Path) -> Self {
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self::new(file_id(path), NodeKind::File, label, path.to_path_buf())
    }
}

/// A relationship between two nodes. `id` is deterministic and is the
/// deduplication key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub import_name: Option<String>,
    pub args: Option<Vec<String>>,
    pub line: Option<usize>,
    pub column: Option<usize>,
    /// True when the target's existence could not be confirmed.
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub confidence: Option<CallConfidence>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("{}=>{}:{}", source, target, kind),
            source,
            target,
            kind,
            import_name: None,
            args: None,
            line: None,
            column: None,
            is_virtual: false,
            confidence: None,
        }
    }
}

/// Node id for a file path (lexically normalized).
pub fn file_id(path: &Path) -> String {
    normalize_path(path).to_string_lossy().to_string()
}

/// Node id for a symbol inside a file.
pub fn symbol_id(path: &Path, symbol: &str) -> String {
    format!("{}#{}", file_id(path), symbol)
}

/// Lexical normalization: drops `.` segments and folds `..` into the
/// preceding component. No filesystem access.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// The code graph. Node inserts are first-write-wins by id; edge inserts
/// are deduplicated by the deterministic edge id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip)]
    node_index: HashMap<String, usize>,
    #[serde(skip)]
    edge_ids: HashSet<String>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Returns false (and changes nothing) when a node with
    /// the same id already exists.
    pub fn add_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    /// Insert an edge. Returns false when an edge with the same id already
    /// exists.
    pub fn add_edge(&mut self, edge: Edge) -> bool {
        if !self.edge_ids.insert(edge.id.clone()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_insert_first_write_wins() {
        let mut graph = Graph::new();
        let mut first = Node::new("a.js#foo".into(), NodeKind::Function, "foo".into(), "a.js".into());
        first.params = vec!["x".into()];
        let mut second = Node::new("a.js#foo".into(), NodeKind::Function, "foo".into(), "a.js".into());
        second.params = vec!["y".into(), "z".into()];

        assert!(graph.add_node(first));
        assert!(!graph.add_node(second));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node("a.js#foo").unwrap().params, vec!["x"]);
    }

    #[test]
    fn test_edge_dedup_by_id() {
        let mut graph = Graph::new();
        let mut first = Edge::new("a.js#foo", "b.js#bar", EdgeKind::Calls);
        first.line = Some(3);
        let mut second = Edge::new("a.js#foo", "b.js#bar", EdgeKind::Calls);
        second.line = Some(9);

        assert!(graph.add_edge(first));
        assert!(!graph.add_edge(second));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges[0].line, Some(3));
    }

    #[test]
    fn test_same_endpoints_different_kind_are_distinct() {
        let mut graph = Graph::new();
        assert!(graph.add_edge(Edge::new("a", "b", EdgeKind::Imports)));
        assert!(graph.add_edge(Edge::new("a", "b", EdgeKind::ImportsSymbol)));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_edge_id_format() {
        let edge = Edge::new("a.js", "b.js", EdgeKind::Imports);
        assert_eq!(edge.id, "a.js=>b.js:imports");
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("./src/../lib/util.js")), PathBuf::from("lib/util.js"));
        assert_eq!(normalize_path(Path::new("src/./a.js")), PathBuf::from("src/a.js"));
    }
}
