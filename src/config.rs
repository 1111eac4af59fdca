use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CartographError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Source scanning configuration
    pub scanning: ScanningConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Source directories to analyze
    pub source_dirs: Vec<PathBuf>,

    /// Ignore patterns applied on top of .gitignore
    pub ignore_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanningConfig {
    /// Languages to scan
    pub languages: Vec<String>,

    /// Maximum file size to scan (in bytes)
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format
    pub format: String,

    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: "Unnamed Project".to_string(),
                source_dirs: vec![PathBuf::from("src")],
                ignore_patterns: vec![
                    "target/".to_string(),
                    "node_modules/".to_string(),
                    "dist/".to_string(),
                    ".git/".to_string(),
                ],
            },
            scanning: ScanningConfig {
                languages: vec![
                    "javascript".to_string(),
                    "typescript".to_string(),
                    "python".to_string(),
                    "java".to_string(),
                    "csharp".to_string(),
                ],
                max_file_size: 1024 * 1024, // 1MB
            },
            output: OutputConfig {
                format: "markdown".to_string(),
                pretty: true,
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| CartographError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CartographError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["Cartograph.toml", "cartograph.toml", ".cartograph.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cartograph.toml");

        let config = Config::default();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert_eq!(loaded.project.name, config.project.name);
        assert_eq!(loaded.scanning.languages, config.scanning.languages);
        assert_eq!(loaded.output.format, "markdown");
    }

    #[test]
    fn test_missing_config_falls_back_to_default() {
        let config = Config::load_or_default(Some("/nonexistent/Cartograph.toml")).unwrap();
        assert_eq!(config.project.name, "Unnamed Project");
    }
}
