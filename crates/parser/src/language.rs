use crate::error::{ParseError, Result};

/// Supported source language (one grammar per run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Python,
}

/// Node categories the declaration collector dispatches on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    Function,
    Class,
    Call,
    Other,
}

/// Grammar-specific node kinds and field names
#[derive(Debug, Clone, Copy)]
pub struct NodeKinds {
    pub functions: &'static [&'static str],
    pub classes: &'static [&'static str],
    pub call: &'static str,
    /// Field of a call node holding the call target
    pub call_target_field: &'static str,
    pub identifier: &'static str,
    /// `receiver.member` access
    pub member_access: &'static str,
    /// Field of a member access holding the trailing member name
    pub member_field: &'static str,
    /// Parenthesized expression, unwrapped when naming a call target
    pub grouping: &'static str,
    /// Field holding a declaration's name
    pub name_field: &'static str,
    /// Field holding a function's body
    pub body_field: &'static str,
}

static PYTHON_KINDS: NodeKinds = NodeKinds {
    // `async def` is a function_definition with a leading `async` token
    functions: &["function_definition"],
    classes: &["class_definition"],
    call: "call",
    call_target_field: "function",
    identifier: "identifier",
    member_access: "attribute",
    member_field: "attribute",
    grouping: "parenthesized_expression",
    name_field: "name",
    body_field: "body",
};

impl Language {
    /// Resolve a language from a configuration name
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            _ => Err(ParseError::unsupported_language(name)),
        }
    }

    /// Get language name as string
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
        }
    }

    /// Human-readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
        }
    }

    /// File-name suffix selecting source files for this language
    pub fn default_suffix(self) -> &'static str {
        match self {
            Language::Python => ".py",
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
        }
    }

    pub fn node_kinds(self) -> &'static NodeKinds {
        match self {
            Language::Python => &PYTHON_KINDS,
        }
    }

    /// Map a tree-sitter node kind onto the collector's closed set
    pub fn classify(self, kind: &str) -> SyntaxKind {
        let kinds = self.node_kinds();
        if kinds.functions.contains(&kind) {
            SyntaxKind::Function
        } else if kinds.classes.contains(&kind) {
            SyntaxKind::Class
        } else if kind == kinds.call {
            SyntaxKind::Call
        } else {
            SyntaxKind::Other
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
