//! The code graph: nodes and edges over files and symbols, a two-pass
//! builder that populates them, and read-only traversal queries.

mod builder;
mod queries;
mod types;

pub use builder::GraphBuilder;
pub use types::{CallConfidence, Edge, EdgeKind, FunctionVariant, Graph, Node, NodeKind};
pub use types::{file_id, symbol_id};
