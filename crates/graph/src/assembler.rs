use crate::collector::{collect_declarations, FileDeclarations};
use crate::error::{GraphError, Result};
use crate::types::{CallEdge, CodeContextGraph, FileNode};
use ccg_indexer::{FileScanner, ScanOptions};
use ccg_parser::{Language, SourceParser};
use rayon::prelude::*;
use std::path::{Component, Path};

/// How files are discovered and analysed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerOptions {
    pub language: Language,

    /// Source file-name suffix; defaults to the language's own
    pub source_suffix: String,

    /// Worker threads for per-file collection. 1 = sequential, 0 = one per core.
    pub jobs: usize,

    pub follow_symlinks: bool,
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        let language = Language::default();
        Self {
            language,
            source_suffix: language.default_suffix().to_string(),
            jobs: 1,
            follow_symlinks: true,
        }
    }
}

/// Totals for one assembly run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub files: usize,
    pub parse_failures: usize,
    pub functions: usize,
    pub classes: usize,
    pub edges: usize,
}

/// One file's contribution before merging
struct FileAnalysis {
    node_id: String,
    declarations: FileDeclarations,
    failed: bool,
}

/// Builds the code context graph for a source tree
pub struct GraphAssembler {
    options: AssemblerOptions,
}

impl GraphAssembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Self { options }
    }

    /// Discover, parse and collect every source file under `root`
    pub fn assemble(&self, root: &Path) -> Result<(CodeContextGraph, AssemblyStats)> {
        let scanner = FileScanner::new(
            root,
            ScanOptions {
                suffix: self.options.source_suffix.clone(),
                follow_symlinks: self.options.follow_symlinks,
            },
        );
        let files = scanner.scan()?;

        let analyses = if self.options.jobs == 1 || files.len() < 2 {
            let mut parser = SourceParser::new(self.options.language)?;
            files
                .iter()
                .map(|path| analyze_file(&mut parser, root, path))
                .collect::<Vec<_>>()
        } else {
            self.analyze_parallel(root, &files)?
        };

        let (graph, stats) = merge(analyses);
        log::info!(
            "Built code context graph: {} nodes, {} edges ({} parse failures)",
            graph.node_count(),
            graph.edge_count(),
            stats.parse_failures
        );

        Ok((graph, stats))
    }

    fn analyze_parallel(
        &self,
        root: &Path,
        files: &[std::path::PathBuf],
    ) -> Result<Vec<FileAnalysis>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs)
            .build()
            .map_err(|e| GraphError::WorkerPool(e.to_string()))?;
        let language = self.options.language;

        log::debug!(
            "Analysing {} files on {} workers",
            files.len(),
            pool.current_num_threads()
        );

        // indexed collect keeps discovery order
        pool.install(|| {
            files
                .par_iter()
                .map_init(
                    || SourceParser::new(language),
                    |parser, path| {
                        let parser = parser.as_mut().map_err(|e| {
                            GraphError::WorkerPool(format!("parser setup failed: {e}"))
                        })?;
                        Ok(analyze_file(parser, root, path))
                    },
                )
                .collect::<Result<Vec<_>>>()
        })
    }
}

fn analyze_file(parser: &mut SourceParser, root: &Path, path: &Path) -> FileAnalysis {
    let node_id = node_id(root, path);

    match parser.parse_file(path) {
        Ok(parsed) => FileAnalysis {
            node_id,
            declarations: collect_declarations(&parsed),
            failed: false,
        },
        Err(e) => {
            log::warn!("Failed to parse {node_id}: {e}");
            FileAnalysis {
                node_id,
                declarations: FileDeclarations::default(),
                failed: true,
            }
        }
    }
}

fn merge(analyses: Vec<FileAnalysis>) -> (CodeContextGraph, AssemblyStats) {
    let mut graph = CodeContextGraph::new();
    let mut stats = AssemblyStats::default();

    for analysis in analyses {
        let FileAnalysis {
            node_id,
            declarations,
            failed,
        } = analysis;

        stats.files += 1;
        stats.parse_failures += usize::from(failed);
        stats.functions += declarations.functions.len();
        stats.classes += declarations.classes.len();
        stats.edges += declarations.calls.len();

        for call in &declarations.calls {
            graph.add_edge(CallEdge::new(&node_id, &call.caller, call.callee.as_str()));
        }
        graph.add_node(
            node_id,
            FileNode {
                functions: declarations.functions.into_iter().collect(),
                classes: declarations.classes.into_iter().collect(),
            },
        );
    }

    (graph, stats)
}

/// Forward-slash path of `path` relative to `root`
pub fn node_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts: Vec<_> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        relative.to_string_lossy().replace('\\', "/")
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn node_id_is_relative_and_slash_separated() {
        let root = Path::new("/repo");
        assert_eq!(node_id(root, Path::new("/repo/pkg/mod.py")), "pkg/mod.py");
        assert_eq!(node_id(root, Path::new("/repo/top.py")), "top.py");

        let nested: PathBuf = ["/repo", "a", "b", "c.py"].iter().collect();
        assert_eq!(node_id(root, &nested), "a/b/c.py");
    }

    #[test]
    fn node_id_with_relative_root() {
        assert_eq!(node_id(Path::new("."), Path::new("./src/app.py")), "src/app.py");
        assert_eq!(node_id(Path::new("repo"), Path::new("repo/x.py")), "x.py");
    }

    #[test]
    fn merge_keeps_empty_nodes_and_edge_order() {
        let mut first = FileDeclarations::default();
        first.functions.insert("f".to_string());
        first.calls.push(crate::collector::CallSite::new("f", "g"));
        first.calls.push(crate::collector::CallSite::new("f", "g"));

        let analyses = vec![
            FileAnalysis {
                node_id: "b.py".to_string(),
                declarations: first,
                failed: false,
            },
            FileAnalysis {
                node_id: "a.py".to_string(),
                declarations: FileDeclarations::default(),
                failed: true,
            },
        ];

        let (graph, stats) = merge(analyses);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.node("a.py").unwrap().is_empty());
        assert_eq!(graph.edges.len(), 2);
        assert!(graph.edges.iter().all(|e| e.from == "b.py::f" && e.to == "g"));
        assert_eq!(
            stats,
            AssemblyStats {
                files: 2,
                parse_failures: 1,
                functions: 1,
                classes: 0,
                edges: 2,
            }
        );
    }
}
