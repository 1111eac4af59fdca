//! Language-specific source scanners.
//!
//! One canonical extraction module per language, shared by the graph
//! builder and the code map builder. Each scanner is regex-based: no AST,
//! best-effort extraction of structural facts only.

mod csharp;
mod java;
mod javascript;
mod python;

pub use csharp::CSharpScanner;
pub use java::JavaScanner;
pub use javascript::JavaScriptScanner;
pub use python::PythonScanner;

use super::scanner::{FileStructure, Language};
use crate::error::Result;

/// Trait that all language scanners implement.
pub trait LanguageScanner {
    /// Extract structural facts from source text into `out`.
    fn scan(&self, content: &str, out: &mut FileStructure) -> Result<()>;

    /// File extensions this scanner handles.
    fn file_extensions(&self) -> &[&str];

    /// Primary language of this scanner.
    fn language(&self) -> Language;
}
