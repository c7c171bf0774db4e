//! # CCG Parser
//!
//! Turns raw source files into tree-sitter syntax trees for the code context graph.
//!
//! ## Pipeline
//!
//! ```text
//! File bytes
//!     │
//!     ├──> Lenient decoding (invalid UTF-8 replaced, never fatal)
//!     │
//!     ├──> Tree-sitter parsing → syntax tree
//!     │
//!     └──> Syntax check
//!          ├─> clean tree      → ParsedSource
//!          └─> ERROR / MISSING → ParseError::Syntax
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ccg_parser::{Language, SourceParser};
//!
//! let mut parser = SourceParser::new(Language::Python).unwrap();
//! let parsed = parser.parse("def f():\n    g()\n".to_string()).unwrap();
//! assert_eq!(parsed.root().kind(), "module");
//! ```

mod error;
mod language;
mod parser;

pub use error::{ParseError, Result};
pub use language::{Language, NodeKinds, SyntaxKind};
pub use parser::{read_source, ParsedSource, SourceParser};
