use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Caller name used for calls made outside any declaration
pub const MODULE_SCOPE: &str = "<module>";

/// Separator between a node id and a caller name in `from`
pub const SCOPE_SEPARATOR: &str = "::";

/// Per-file summary of declared functions and classes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNode {
    /// Sorted, deduplicated function names (any nesting depth)
    pub functions: Vec<String>,

    /// Sorted, deduplicated class names (any nesting depth)
    pub classes: Vec<String>,
}

impl FileNode {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty()
    }
}

/// Unresolved call reference from an enclosing declaration to a bare name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    /// `<node-id>::<caller>`
    pub from: String,

    /// Apparent callee; may not exist anywhere in the graph
    pub to: String,
}

impl CallEdge {
    pub fn new(node_id: &str, caller: &str, callee: impl Into<String>) -> Self {
        Self {
            from: format!("{node_id}{SCOPE_SEPARATOR}{caller}"),
            to: callee.into(),
        }
    }

    /// Node id part of `from`
    pub fn source_node(&self) -> &str {
        // Names never contain the separator, paths might
        self.from
            .rsplit_once(SCOPE_SEPARATOR)
            .map_or(self.from.as_str(), |(node, _)| node)
    }
}

/// Code context graph: one node per visited file plus call edges in
/// discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeContextGraph {
    pub nodes: BTreeMap<String, FileNode>,
    pub edges: Vec<CallEdge>,
}

impl CodeContextGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the node for a file
    pub fn add_node(&mut self, node_id: impl Into<String>, node: FileNode) {
        self.nodes.insert(node_id.into(), node);
    }

    pub fn add_edge(&mut self, edge: CallEdge) {
        self.edges.push(edge);
    }

    pub fn node(&self, node_id: &str) -> Option<&FileNode> {
        self.nodes.get(node_id)
    }

    /// Edges whose caller lives in `node_id`, in encounter order
    pub fn edges_from<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a CallEdge> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.source_node() == node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every edge's source node exists in the node map
    pub fn is_consistent(&self) -> bool {
        self.edges
            .iter()
            .all(|edge| self.nodes.contains_key(edge.source_node()))
    }
}
