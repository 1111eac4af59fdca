use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::languages::{CSharpScanner, JavaScanner, JavaScriptScanner, LanguageScanner, PythonScanner};
use super::text::Span;
use crate::error::Result;

/// Programming language of a scanned file, inferred from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Python,
    Java,
    CSharp,
    Unknown,
}

impl Language {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("") {
            "js" | "jsx" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" | "mts" | "cts" => Language::TypeScript,
            "py" => Language::Python,
            "java" => Language::Java,
            "cs" => Language::CSharp,
            _ => Language::Unknown,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::JavaScript => write!(f, "javascript"),
            Language::TypeScript => write!(f, "typescript"),
            Language::Python => write!(f, "python"),
            Language::Java => write!(f, "java"),
            Language::CSharp => write!(f, "csharp"),
            Language::Unknown => write!(f, "unknown"),
        }
    }
}

/// How an import was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Es,
    CommonJs,
    Python,
    Java,
    Using,
}

/// A single import statement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    /// Module specifier ('./util', 'react', 'java.util.List').
    pub module: String,
    /// Default binding, if any.
    pub default: Option<String>,
    /// Namespace binding (`* as ns`), if any.
    pub namespace: Option<String>,
    /// Named / destructured bindings.
    pub items: Vec<String>,
    pub kind: ImportKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Named,
    Default,
    CommonJs,
}

/// An exported symbol, in any of the observed export forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Export {
    pub name: String,
    pub kind: ExportKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    #[default]
    Function,
    ArrowFunction,
    Method,
    Class,
    Interface,
    Enum,
    TypeAlias,
}

/// A method belonging to a class definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDef {
    pub name: String,
    pub params: Vec<String>,
    pub span: Span,
}

/// A top-level definition extracted from a source file.
///
/// Flat shape with optional fields; which fields are populated depends on
/// `kind`. Methods appear both nested in their class's `methods` list and
/// as standalone definitions carrying `owner_class`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    pub exported: bool,
    pub is_async: bool,
    pub is_generator: bool,
    /// Looks like a UI component (JSX body, Component base, memo/forwardRef).
    pub is_component: bool,
    /// Follows the `use[A-Z]\w*` hook naming convention.
    pub is_hook: bool,
    pub params: Vec<String>,
    /// Base class (classes; single target).
    pub extends: Option<String>,
    /// Extended interfaces (interfaces; multiple targets).
    pub extends_list: Vec<String>,
    /// Implemented interfaces (Java / C#).
    pub implements: Vec<String>,
    pub methods: Vec<MethodDef>,
    pub properties: Vec<String>,
    /// Enum members.
    pub members: Vec<String>,
    /// `const enum` flag.
    pub is_const: bool,
    /// Associated `${Name}Props` type for components.
    pub props_type: Option<String>,
    /// Owning class name, for `Method` definitions.
    pub owner_class: Option<String>,
    pub span: Span,
}

impl Definition {
    pub fn new(name: impl Into<String>, kind: DefinitionKind, span: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            span,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueShape {
    Object,
    Array,
    Function,
    Class,
    Literal,
    Other,
}

/// A variable declaration that is not a function binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    /// Declaration keyword: "const", "let" or "var".
    pub binding: String,
    pub shape: ValueShape,
    pub exported: bool,
    pub span: Span,
}

/// A call site inside a function or method body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodCall {
    pub name: String,
    /// Receiver chain, when the call has one (`service.fetch()` -> "service").
    pub receiver: Option<String>,
    /// Name of the enclosing function or method.
    pub caller: Option<String>,
    pub args: Vec<String>,
    pub span: Span,
}

/// A type name scraped from an annotation position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeReference {
    pub name: String,
    pub span: Span,
}

/// Per-file structural summary produced by the source scanner.
///
/// Immutable once produced. A file that could not be read or scanned still
/// yields a structure, with `language: Unknown` and `error` populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStructure {
    pub path: PathBuf,
    pub language: Language,
    /// SHA-256 of the file content, for change detection.
    pub content_hash: String,
    pub imports: Vec<Import>,
    pub exports: Vec<Export>,
    pub definitions: Vec<Definition>,
    pub variables: Vec<Variable>,
    pub method_calls: Vec<MethodCall>,
    pub type_references: Vec<TypeReference>,
    /// Names of exported symbols, first-seen order.
    pub public_api: Vec<String>,
    pub error: Option<String>,
}

impl FileStructure {
    pub fn empty(path: PathBuf, language: Language) -> Self {
        Self {
            path,
            language,
            content_hash: String::new(),
            imports: Vec::new(),
            exports: Vec::new(),
            definitions: Vec::new(),
            variables: Vec::new(),
            method_calls: Vec::new(),
            type_references: Vec::new(),
            public_api: Vec::new(),
            error: None,
        }
    }

    /// Degraded structure for a file that could not be scanned.
    pub fn degraded(path: PathBuf, error: String) -> Self {
        let mut structure = Self::empty(path, Language::Unknown);
        structure.error = Some(error);
        structure
    }
}

/// Multi-language source scanner delegating to per-language extractors.
///
/// `scan_file` never fails: any error on the way is folded into a degraded
/// `FileStructure`, so a batch of N files always yields exactly N entries.
pub struct SourceScanner {
    javascript: JavaScriptScanner,
    python: PythonScanner,
    java: JavaScanner,
    csharp: CSharpScanner,
}

impl SourceScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            javascript: JavaScriptScanner::new()?,
            python: PythonScanner::new()?,
            java: JavaScanner::new()?,
            csharp: CSharpScanner::new()?,
        })
    }

    /// Scan a file from disk. Read failures produce the degraded path.
    pub fn scan_file(&self, path: &Path) -> FileStructure {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return FileStructure::degraded(path.to_path_buf(), e.to_string()),
        };

        self.scan_source(path, &content)
    }

    /// Scan supplied source text as if it lived at `path`.
    pub fn scan_source(&self, path: &Path, content: &str) -> FileStructure {
        let language = Language::from_path(path);
        let mut structure = FileStructure::empty(path.to_path_buf(), language);
        structure.content_hash = calculate_hash(content);

        if let Some(scanner) = self.scanner_for(language) {
            if let Err(e) = scanner.scan(content, &mut structure) {
                return FileStructure::degraded(path.to_path_buf(), e.to_string());
            }
        }

        structure.public_api = collect_public_api(&structure);
        structure
    }

    /// Scan an ordered list of files; the result has one entry per input.
    pub fn scan_files(&self, paths: &[PathBuf]) -> Vec<FileStructure> {
        paths.iter().map(|p| self.scan_file(p)).collect()
    }

    /// True when some language scanner handles this file's extension.
    pub fn supports(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .scanners()
                .into_iter()
                .any(|s| s.file_extensions().contains(&ext)),
            None => false,
        }
    }

    fn scanner_for(&self, language: Language) -> Option<&dyn LanguageScanner> {
        // TypeScript shares the JavaScript scanner.
        let effective = match language {
            Language::TypeScript => Language::JavaScript,
            other => other,
        };
        self.scanners().into_iter().find(|s| s.language() == effective)
    }

    fn scanners(&self) -> [&dyn LanguageScanner; 4] {
        [&self.javascript, &self.python, &self.java, &self.csharp]
    }
}

/// Union of explicit exports and inline-exported definitions, deduplicated.
fn collect_public_api(structure: &FileStructure) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut api = Vec::new();

    for export in &structure.exports {
        if seen.insert(export.name.clone()) {
            api.push(export.name.clone());
        }
    }
    for def in &structure.definitions {
        if def.exported && seen.insert(def.name.clone()) {
            api.push(def.name.clone());
        }
    }
    for var in &structure.variables {
        if var.exported && seen.insert(var.name.clone()) {
            api.push(var.name.clone());
        }
    }

    api
}

/// SHA-256 hash of file content.
fn calculate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path(Path::new("a.tsx")), Language::TypeScript);
        assert_eq!(Language::from_path(Path::new("a.cjs")), Language::JavaScript);
        assert_eq!(Language::from_path(Path::new("a.py")), Language::Python);
        assert_eq!(Language::from_path(Path::new("a.txt")), Language::Unknown);
        assert_eq!(Language::from_path(Path::new("Makefile")), Language::Unknown);
    }

    #[test]
    fn test_unreadable_file_degrades() {
        let scanner = SourceScanner::new().unwrap();
        let structure = scanner.scan_file(Path::new("/nonexistent/missing.js"));
        assert_eq!(structure.language, Language::Unknown);
        assert!(structure.error.is_some());
        assert!(structure.definitions.is_empty());
    }

    #[test]
    fn test_batch_keeps_entry_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let good_a = dir.path().join("a.js");
        let good_b = dir.path().join("b.js");
        std::fs::write(&good_a, "function foo() {}").unwrap();
        std::fs::write(&good_b, "function bar() {}").unwrap();
        let missing = dir.path().join("gone.js");

        let scanner = SourceScanner::new().unwrap();
        let results = scanner.scan_files(&[good_a, missing.clone(), good_b]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[1].path, missing);
        assert_eq!(results[1].language, Language::Unknown);
        assert!(results[1].error.is_some());
        assert!(results[0].error.is_none());
        assert!(results[2].error.is_none());
    }

    #[test]
    fn test_unknown_extension_is_empty_not_error() {
        let scanner = SourceScanner::new().unwrap();
        let structure = scanner.scan_source(Path::new("notes.txt"), "just text { }");
        assert_eq!(structure.language, Language::Unknown);
        assert!(structure.error.is_none());
        assert!(structure.definitions.is_empty());
    }

    #[test]
    fn test_public_api_union() {
        let scanner = SourceScanner::new().unwrap();
        let source = r#"
export function alpha() {}
function hidden() {}
export { hidden as beta };
"#;
        let structure = scanner.scan_source(Path::new("api.js"), source);
        assert!(structure.public_api.contains(&"alpha".to_string()));
        assert!(structure.public_api.contains(&"beta".to_string()));
        assert!(!structure.public_api.contains(&"hidden".to_string()));
    }

    #[test]
    fn test_content_hash_stable() {
        let scanner = SourceScanner::new().unwrap();
        let a = scanner.scan_source(Path::new("a.js"), "function f() {}");
        let b = scanner.scan_source(Path::new("b.js"), "function f() {}");
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.content_hash.len(), 64);
    }
}
