use thiserror::Error;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors that can occur while turning a file into a syntax tree
#[derive(Error, Debug)]
pub enum ParseError {
    /// The file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The tree contains ERROR or MISSING nodes (1-based line and character column)
    #[error("invalid syntax at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    /// Tree-sitter returned no tree (cancelled or internal failure)
    #[error("parser produced no syntax tree")]
    NoTree,

    /// The grammar could not be loaded into the parser
    #[error("Failed to load {language} grammar: {message}")]
    Grammar {
        language: &'static str,
        message: String,
    },

    /// Unsupported language name
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),
}

impl ParseError {
    /// Create an unsupported language error
    pub fn unsupported_language(lang: impl Into<String>) -> Self {
        Self::UnsupportedLanguage(lang.into())
    }
}
