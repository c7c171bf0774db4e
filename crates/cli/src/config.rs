use ccg_graph::{AssemblerOptions, OutputLayout};
use ccg_parser::Language;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_OUTPUT_DIR: &str = "CCG_OUTPUT_DIR";
pub const ENV_JOBS: &str = "CCG_JOBS";
pub const ENV_SOURCE_SUFFIX: &str = "CCG_SOURCE_SUFFIX";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Source suffix must not be empty")]
    EmptySuffix,
}

/// Analyzer settings: defaults < TOML file < environment < flags
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Grammar to parse with
    pub language: String,

    /// Overrides the language's own suffix
    pub source_suffix: Option<String>,

    /// Base directory for `<repository>/ccg.json`; relative to the working directory
    pub output_dir: Option<PathBuf>,

    /// Worker threads (1 = sequential, 0 = one per core)
    pub jobs: usize,

    pub follow_symlinks: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            language: Language::default().as_str().to_string(),
            source_suffix: None,
            output_dir: None,
            jobs: 1,
            follow_symlinks: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overlay `CCG_*` variables as reported by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.trim().is_empty()) {
            self.output_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup(ENV_JOBS) {
            self.jobs = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidEnv {
                    name: ENV_JOBS,
                    value: value.clone(),
                })?;
        }
        if let Some(suffix) = lookup(ENV_SOURCE_SUFFIX) {
            self.source_suffix = Some(suffix);
        }
        Ok(())
    }

    pub fn language(&self) -> Result<Language, ConfigError> {
        Language::from_name(&self.language)
            .map_err(|_| ConfigError::UnsupportedLanguage(self.language.clone()))
    }

    pub fn assembler_options(&self) -> Result<AssemblerOptions, ConfigError> {
        let language = self.language()?;
        let source_suffix = match &self.source_suffix {
            Some(suffix) if suffix.is_empty() => return Err(ConfigError::EmptySuffix),
            Some(suffix) => suffix.clone(),
            None => language.default_suffix().to_string(),
        };

        Ok(AssemblerOptions {
            language,
            source_suffix,
            jobs: self.jobs,
            follow_symlinks: self.follow_symlinks,
        })
    }

    pub fn output_layout(&self, cwd: &Path) -> OutputLayout {
        match &self.output_dir {
            Some(dir) => OutputLayout::new(cwd.join(dir)),
            None => OutputLayout::under(cwd),
        }
    }
}
