//! # CCG Indexer
//!
//! Source file discovery for the code context graph.
//!
//! ## Pipeline
//!
//! ```text
//! Scan root
//!     │
//!     ├──> Existence check (PathNotFound)
//!     │
//!     └──> Recursive walk (symlink-cycle guarded, sorted by file name)
//!            └─> Files whose name ends with the source suffix
//! ```
//!
//! No ignore list is applied here: the tree is expected to be pre-filtered by
//! whatever checked it out.
//!
//! ## Example
//!
//! ```no_run
//! use ccg_indexer::{FileScanner, ScanOptions};
//!
//! fn main() -> ccg_indexer::Result<()> {
//!     let files = FileScanner::new("/path/to/repo", ScanOptions::default()).scan()?;
//!     println!("Found {} source files", files.len());
//!     Ok(())
//! }
//! ```

mod error;
mod scanner;

pub use error::{IndexerError, Result};
pub use scanner::{ensure_root, FileScanner, ScanOptions};
