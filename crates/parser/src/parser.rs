use crate::error::{ParseError, Result};
use crate::language::Language;
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Read a file as text, replacing invalid UTF-8 sequences
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Syntax tree together with the text it was parsed from
pub struct ParsedSource {
    language: Language,
    text: String,
    tree: Tree,
}

impl ParsedSource {
    pub fn language(&self) -> Language {
        self.language
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`
    pub fn node_text(&self, node: Node<'_>) -> Option<&str> {
        self.text.get(node.start_byte()..node.end_byte())
    }
}

/// Tree-sitter parser bound to one language
pub struct SourceParser {
    language: Language,
    parser: Parser,
}

impl SourceParser {
    pub fn new(language: Language) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| ParseError::Grammar {
                language: language.as_str(),
                message: e.to_string(),
            })?;

        Ok(Self { language, parser })
    }

    /// Parse text, rejecting trees that contain syntax errors
    pub fn parse(&mut self, text: String) -> Result<ParsedSource> {
        let tree = self.parser.parse(&text, None).ok_or(ParseError::NoTree)?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error(root)
                .map(|node| source_position(&text, node))
                .unwrap_or((1, 1));
            return Err(ParseError::Syntax { line, column });
        }

        Ok(ParsedSource {
            language: self.language,
            text,
            tree,
        })
    }

    /// Read and parse a file
    pub fn parse_file(&mut self, path: &Path) -> Result<ParsedSource> {
        let text = read_source(path)?;
        log::debug!("Parsing {} ({} bytes)", path.display(), text.len());
        self.parse(text)
    }
}

/// First ERROR or MISSING node in document order
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        // only descend into subtrees that contain an error
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

/// 1-based line and character column where `node` starts.
/// tree-sitter columns count bytes, which drift on non-ASCII lines.
fn source_position(text: &str, node: Node<'_>) -> (usize, usize) {
    let point = node.start_position();
    let start = node.start_byte();
    let column = text
        .get(start.saturating_sub(point.column)..start)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(point.column);
    (point.row + 1, column + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn parser() -> SourceParser {
        SourceParser::new(Language::Python).unwrap()
    }

    #[test]
    fn parses_valid_module() {
        let parsed = parser()
            .parse("class A:\n    def m(self):\n        pass\n".to_string())
            .unwrap();
        assert_eq!(parsed.root().kind(), "module");
        assert_eq!(parsed.language(), Language::Python);
        assert!(!parsed.root().has_error());
    }

    #[test]
    fn empty_text_is_a_valid_module() {
        let parsed = parser().parse(String::new()).unwrap();
        assert_eq!(parsed.root().named_child_count(), 0);
    }

    #[test]
    fn rejects_syntax_errors_with_position() {
        let err = parser()
            .parse("def ok():\n    pass\n\ndef broken(:\n    pass\n".to_string())
            .err()
            .expect("syntax error");
        match err {
            ParseError::Syntax { line, column } => {
                assert!(line >= 4, "error reported at line {line}");
                assert!(column >= 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn node_text_slices_source() {
        let parsed = parser().parse("value = compute()\n".to_string()).unwrap();
        let statement = parsed.root().named_child(0).unwrap();
        assert_eq!(parsed.node_text(statement), Some("value = compute()"));
    }

    #[test]
    fn read_source_replaces_invalid_utf8() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("latin.py");
        fs::write(&path, b"# caf\xe9\ndef f():\n    pass\n").unwrap();

        let text = read_source(&path).unwrap();
        assert!(text.contains('\u{FFFD}'));

        let parsed = parser().parse(text).unwrap();
        assert_eq!(parsed.root().kind(), "module");
    }

    #[test]
    fn missing_file_is_io_error() {
        let temp = tempdir().unwrap();
        let err = parser()
            .parse_file(&temp.path().join("absent.py"))
            .err()
            .expect("io error");
        assert!(matches!(err, ParseError::Io(_)));
    }

    #[test]
    fn error_in_deep_tree_is_located() {
        let terms = vec!["a"; 100_000].join(" + ");
        let err = parser()
            .parse(format!("x = {terms}\ndef broken(:\n    pass\n"))
            .err()
            .expect("syntax error");
        assert!(matches!(err, ParseError::Syntax { .. }), "got {err}");
    }

    #[test]
    fn position_counts_characters() {
        let text = "\"\u{e9}\u{e9}\" + b\n";
        let parsed = parser().parse(text.to_string()).unwrap();
        let operator = parsed.root().named_child(0).unwrap().named_child(0).unwrap();
        let right = operator.child_by_field_name("right").unwrap();

        assert_eq!(parsed.node_text(right), Some("b"));
        assert_eq!(right.start_position().column, 9);
        assert_eq!(source_position(text, right), (1, 8));
    }

    #[test]
    fn syntax_error_column_ignores_multibyte_width() {
        let ascii = parser().parse("s = \"eee\" )\n".to_string()).err();
        let accented = parser()
            .parse("s = \"\u{e9}\u{e9}\u{e9}\" )\n".to_string())
            .err();

        match (ascii, accented) {
            (
                Some(ParseError::Syntax { line: l1, column: c1 }),
                Some(ParseError::Syntax { line: l2, column: c2 }),
            ) => assert_eq!((l1, c1), (l2, c2)),
            other => panic!("expected two syntax errors, got {other:?}"),
        }
    }
}
