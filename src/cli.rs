use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::{Engine, GraphQuery};

#[derive(Parser)]
#[command(name = "cartograph")]
#[command(about = "Code graph and code map extraction for multi-language codebases")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default configuration file
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Scan sources and report summary statistics
    Scan {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,
    },

    /// Build the code graph
    Graph {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output format (json, markdown)
        #[arg(short, long)]
        format: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build the code map
    Map {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Output format (json, markdown, xml)
        #[arg(short, long)]
        format: Option<String>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Query a built code graph
    Query {
        /// Source directory to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        #[command(subcommand)]
        query: QueryCommands,
    },
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Neighborhood of a node, bounded by depth
    Subgraph {
        /// Node id (file path or "path#symbol")
        node: String,

        /// Maximum hops from the center node
        #[arg(short, long, default_value_t = 1)]
        depth: usize,
    },

    /// Calls edges into a function
    Callers {
        /// Function node id
        node: String,
    },

    /// Calls edges out of a function
    Callees {
        /// Function node id
        node: String,
    },

    /// Files a file imports
    Dependencies {
        /// File node id
        file: String,
    },

    /// Files importing a file
    Dependents {
        /// File node id
        file: String,
    },
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path } => engine.init(path).await,
            Commands::Scan { source } => engine.scan(source).await,
            Commands::Graph {
                source,
                format,
                output,
            } => engine.graph(source, format, output).await,
            Commands::Map {
                source,
                format,
                output,
            } => engine.map(source, format, output).await,
            Commands::Query { source, query } => {
                let query = match query {
                    QueryCommands::Subgraph { node, depth } => GraphQuery::Subgraph { node, depth },
                    QueryCommands::Callers { node } => GraphQuery::Callers { node },
                    QueryCommands::Callees { node } => GraphQuery::Callees { node },
                    QueryCommands::Dependencies { file } => GraphQuery::Dependencies { file },
                    QueryCommands::Dependents { file } => GraphQuery::Dependents { file },
                };
                engine.query(source, query).await
            }
        }
    }
}
