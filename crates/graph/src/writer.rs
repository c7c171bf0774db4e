use crate::error::{GraphError, Result};
use crate::types::CodeContextGraph;
use std::fs;
use std::path::{Component, Path, PathBuf};

pub const OUTPUT_FILE_NAME: &str = "ccg.json";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Where graph documents are written: `<base_dir>/<repository>/ccg.json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    base_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// `<dir>/outputs`
    pub fn under(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_OUTPUT_DIR))
    }

    pub fn output_path(&self, repository: &str) -> PathBuf {
        self.base_dir.join(repository).join(OUTPUT_FILE_NAME)
    }

    /// Write `graph` for `repository`, replacing any previous document
    pub fn write(&self, repository: &str, graph: &CodeContextGraph) -> Result<PathBuf> {
        let path = self.output_path(repository);
        write_graph(&path, graph)?;
        Ok(path)
    }
}

/// Serialize `graph` as pretty JSON to `path`, creating parent directories
pub fn write_graph(path: &Path, graph: &CodeContextGraph) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| GraphError::write(parent, e))?;
    }

    let document = serde_json::to_string_pretty(graph)?;
    fs::write(path, document).map_err(|e| GraphError::write(path, e))?;

    log::debug!(
        "Wrote {} nodes and {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        path.display()
    );
    Ok(())
}

/// Load a previously written document
pub fn read_graph(path: &Path) -> Result<CodeContextGraph> {
    let text = fs::read_to_string(path).map_err(|e| GraphError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Repository key for the output location: the scan path's final component
pub fn repository_name(scan_path: &Path) -> String {
    if let Some(Component::Normal(name)) = scan_path.components().next_back() {
        return name.to_string_lossy().into_owned();
    }

    // "." and ".." have no usable name of their own
    scan_path
        .canonicalize()
        .ok()
        .and_then(|full| full.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "root".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallEdge, FileNode};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample() -> CodeContextGraph {
        let mut graph = CodeContextGraph::new();
        graph.add_node(
            "m.py",
            FileNode {
                functions: vec!["f".to_string()],
                classes: vec![],
            },
        );
        graph.add_edge(CallEdge::new("m.py", "f", "g"));
        graph
    }

    #[test]
    fn writes_to_repository_subdirectory() {
        let temp = tempdir().unwrap();
        let layout = OutputLayout::under(temp.path());

        let path = layout.write("demo", &sample()).unwrap();

        assert_eq!(path, temp.path().join("outputs").join("demo").join("ccg.json"));
        assert_eq!(read_graph(&path).unwrap(), sample());
    }

    #[test]
    fn overwrites_existing_document() {
        let temp = tempdir().unwrap();
        let layout = OutputLayout::under(temp.path());
        let path = layout.output_path("demo");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "x".repeat(10_000)).unwrap();

        layout.write("demo", &CodeContextGraph::new()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with('{'));
        assert_eq!(read_graph(&path).unwrap(), CodeContextGraph::new());
    }

    #[test]
    fn document_is_pretty_printed_in_schema_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("ccg.json");
        write_graph(&path, &sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let expected = r#"{
  "nodes": {
    "m.py": {
      "functions": [
        "f"
      ],
      "classes": []
    }
  },
  "edges": [
    {
      "from": "m.py::f",
      "to": "g"
    }
  ]
}"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn blocked_parent_is_write_error() {
        let temp = tempdir().unwrap();
        let blocker = temp.path().join("outputs");
        fs::write(&blocker, "not a directory").unwrap();

        let err = OutputLayout::under(temp.path())
            .write("demo", &sample())
            .unwrap_err();

        assert!(matches!(err, GraphError::Write { .. }), "got {err:?}");
    }

    #[test]
    fn repository_name_uses_last_component() {
        assert_eq!(repository_name(Path::new("repos/my-project")), "my-project");
        assert_eq!(repository_name(Path::new("repos/my-project/")), "my-project");
        assert_eq!(repository_name(Path::new("/abs/path/lib")), "lib");
    }

    #[test]
    fn repository_name_resolves_current_dir() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("checkout");
        fs::create_dir_all(dir.join("sub")).unwrap();

        assert_eq!(repository_name(&dir.join(".")), "checkout");
        assert_eq!(repository_name(&dir.join("sub").join("..")), "checkout");
    }
}
