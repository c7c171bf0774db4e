use ccg_indexer::IndexerError;
use ccg_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("File discovery failed")]
    Discovery(#[from] IndexerError),

    #[error("Parser setup failed")]
    Parser(#[from] ParseError),

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(String),

    #[error("Failed to serialize graph")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GraphError {
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
