//! # CCG Graph
//!
//! Code context graph: per-file declarations plus naive call edges.
//!
//! ## Pipeline
//!
//! ```text
//! Scan root
//!     │
//!     ├──> File discovery (ccg-indexer)
//!     │
//!     ├──> Per file (sequential or rayon workers)
//!     │      ├─ Parse (ccg-parser), failures degrade to an empty node
//!     │      └─ Declaration collector (scope stack)
//!     │           ├─ functions / classes
//!     │           └─ (caller, callee) in encounter order
//!     │
//!     ├──> Assembler
//!     │      ├─ Node per visited file, keyed by relative path
//!     │      └─ Edges "<file>::<caller>" -> "<callee>"
//!     │
//!     └──> Writer → <output>/<repository>/ccg.json
//! ```
//!
//! Callees are never resolved: `a.b.c()` is recorded as `c`, and an edge may
//! name something that exists nowhere in the graph.

mod assembler;
mod collector;
mod error;
mod types;
mod writer;

pub use assembler::{node_id, AssemblerOptions, AssemblyStats, GraphAssembler};
pub use collector::{collect_declarations, CallSite, DeclarationCollector, FileDeclarations};
pub use error::{GraphError, Result};
pub use types::{CallEdge, CodeContextGraph, FileNode, MODULE_SCOPE, SCOPE_SEPARATOR};
pub use writer::{
    read_graph, repository_name, write_graph, OutputLayout, DEFAULT_OUTPUT_DIR, OUTPUT_FILE_NAME,
};
