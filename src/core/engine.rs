use std::path::{Path, PathBuf};

use anyhow::Result;
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use tracing::{debug, info, warn};

use super::code_map::{CodeMap, CodeMapBuilder};
use super::graph::{Graph, GraphBuilder};
use super::render::{render_code_map_markdown, render_code_map_xml, render_graph_markdown};
use super::scanner::{FileStructure, Language, SourceScanner};
use crate::config::Config;
use crate::error::CartographError;

/// One query against a built graph.
#[derive(Debug, Clone)]
pub enum GraphQuery {
    Subgraph { node: String, depth: usize },
    Callers { node: String },
    Callees { node: String },
    Dependencies { file: String },
    Dependents { file: String },
}

/// Main orchestration engine: collects files, scans them, and drives the
/// two builders and the renderers.
pub struct Engine {
    config: Config,
    scanner: SourceScanner,
    graph_builder: GraphBuilder,
    map_builder: CodeMapBuilder,
}

impl Engine {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        let scanner = SourceScanner::new()?;
        let graph_builder = GraphBuilder::new();
        let map_builder = CodeMapBuilder::new();

        Ok(Self {
            config,
            scanner,
            graph_builder,
            map_builder,
        })
    }

    /// Write a default Cartograph.toml into `path` (or the current directory).
    pub async fn init(&self, path: Option<PathBuf>) -> Result<()> {
        let target = path
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Cartograph.toml");
        if target.exists() {
            warn!("{} already exists, leaving it untouched", target.display());
            return Ok(());
        }
        self.config.save(&target)?;
        info!("Wrote {}", target.display());
        Ok(())
    }

    /// Scan the source tree and log summary statistics.
    pub async fn scan(&self, source: Option<PathBuf>) -> Result<()> {
        let files = self.scan_tree(source)?;

        let definitions: usize = files.iter().map(|f| f.definitions.len()).sum();
        let imports: usize = files.iter().map(|f| f.imports.len()).sum();
        let calls: usize = files.iter().map(|f| f.method_calls.len()).sum();
        let degraded = files.iter().filter(|f| f.error.is_some()).count();

        info!("Scanned {} files", files.len());
        info!("  - {} definitions", definitions);
        info!("  - {} imports", imports);
        info!("  - {} call sites", calls);
        if degraded > 0 {
            warn!("  - {} files could not be scanned", degraded);
        }

        Ok(())
    }

    /// Build the code graph and write it in the requested format.
    pub async fn graph(
        &self,
        source: Option<PathBuf>,
        format: Option<String>,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let graph = self.build_graph(source)?;
        info!(
            "Built graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        let format = format.unwrap_or_else(|| self.config.output.format.clone());
        let rendered = match format.as_str() {
            "json" => self.to_json(&graph)?,
            "markdown" | "md" => render_graph_markdown(&graph),
            other => anyhow::bail!("unsupported graph format: {}", other),
        };

        self.write_output(rendered, output)
    }

    /// Build the code map and write it in the requested format.
    pub async fn map(
        &self,
        source: Option<PathBuf>,
        format: Option<String>,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let map = self.build_map(source)?;
        info!(
            "Built code map: {} files, {} relationships",
            map.files.len(),
            map.relationships.len()
        );

        let format = format.unwrap_or_else(|| self.config.output.format.clone());
        let rendered = match format.as_str() {
            "json" => self.to_json(&map)?,
            "markdown" | "md" => render_code_map_markdown(&map),
            "xml" => render_code_map_xml(&map),
            other => anyhow::bail!("unsupported map format: {}", other),
        };

        self.write_output(rendered, output)
    }

    /// Build the graph, run one query over it, print the result as JSON.
    pub async fn query(&self, source: Option<PathBuf>, query: GraphQuery) -> Result<()> {
        let graph = self.build_graph(source)?;

        let rendered = match query {
            GraphQuery::Subgraph { node, depth } => {
                if !graph.has_node(&node) {
                    return Err(CartographError::UnknownNode(node).into());
                }
                self.to_json(&graph.subgraph(&node, depth))?
            }
            GraphQuery::Callers { node } => self.to_json(&graph.function_callers(&node))?,
            GraphQuery::Callees { node } => self.to_json(&graph.function_calls(&node))?,
            GraphQuery::Dependencies { file } => self.to_json(&graph.file_dependencies(&file))?,
            GraphQuery::Dependents { file } => self.to_json(&graph.file_dependents(&file))?,
        };

        println!("{}", rendered);
        Ok(())
    }

    fn build_graph(&self, source: Option<PathBuf>) -> Result<Graph> {
        let files = self.scan_tree(source)?;
        Ok(self.graph_builder.build(&files))
    }

    fn build_map(&self, source: Option<PathBuf>) -> Result<CodeMap> {
        let files = self.scan_tree(source)?;
        Ok(self.map_builder.build(files))
    }

    fn scan_tree(&self, source: Option<PathBuf>) -> Result<Vec<FileStructure>> {
        let source_dir = source.unwrap_or_else(|| self.config.project.source_dirs[0].clone());
        info!("Scanning {}", source_dir.display());

        let paths = self.collect_files(&source_dir)?;
        debug!("Collected {} candidate files", paths.len());

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(self.scan_path(&path));
        }
        Ok(files)
    }

    /// Scan one file, folding the oversize check into the degraded path.
    fn scan_path(&self, path: &Path) -> FileStructure {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() as usize > self.config.scanning.max_file_size => {
                FileStructure::degraded(
                    path.to_path_buf(),
                    format!(
                        "file exceeds maximum size of {} bytes",
                        self.config.scanning.max_file_size
                    ),
                )
            }
            _ => self.scanner.scan_file(path),
        }
    }

    /// Walk `dir` honoring .gitignore plus configured ignore patterns, and
    /// keep files whose language is enabled. The core itself never walks
    /// directories; it only consumes this list.
    fn collect_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut overrides = OverrideBuilder::new(dir);
        for pattern in &self.config.project.ignore_patterns {
            overrides
                .add(&format!("!{}", pattern))
                .map_err(|e| CartographError::FileSystem(e.to_string()))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| CartographError::FileSystem(e.to_string()))?;

        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .git_ignore(true)
            .overrides(overrides)
            .build();

        let mut paths = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| CartographError::FileSystem(e.to_string()))?;
            let path = entry.path();
            if path.is_file() && self.scanner.supports(path) && self.language_enabled(path) {
                paths.push(path.to_path_buf());
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn language_enabled(&self, path: &Path) -> bool {
        let language = Language::from_path(path);
        if language == Language::Unknown {
            return false;
        }
        self.config
            .scanning
            .languages
            .iter()
            .any(|l| l == &language.to_string())
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.config.output.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        Ok(json.map_err(CartographError::from)?)
    }

    fn write_output(&self, rendered: String, output: Option<PathBuf>) -> Result<()> {
        match output {
            Some(path) => {
                std::fs::write(&path, rendered)?;
                info!("Wrote {}", path.display());
            }
            None => println!("{}", rendered),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn engine() -> Engine {
        Engine::new(Some(Path::new("/nonexistent/Cartograph.toml")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_collect_files_filters_by_language() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.js"), "function a() {}").unwrap();
        std::fs::write(dir.path().join("b.py"), "def b():\n    pass\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not code").unwrap();

        let engine = engine().await;
        let paths = engine.collect_files(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.js", "b.py"]);
    }

    #[tokio::test]
    async fn test_collect_files_applies_ignore_patterns() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("node_modules")).unwrap();
        std::fs::write(dir.path().join("node_modules/dep.js"), "function d() {}").unwrap();
        std::fs::write(dir.path().join("app.js"), "function a() {}").unwrap();

        let engine = engine().await;
        let paths = engine.collect_files(dir.path()).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].ends_with("app.js"));
    }

    #[tokio::test]
    async fn test_oversize_file_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.js");
        std::fs::write(&path, "x".repeat(2 * 1024 * 1024)).unwrap();

        let engine = engine().await;
        let structure = engine.scan_path(&path);
        assert!(structure.error.is_some());
        assert_eq!(structure.language, Language::Unknown);
    }
}
