use crate::types::MODULE_SCOPE;
use ccg_parser::{NodeKinds, ParsedSource, SyntaxKind};
use std::collections::BTreeSet;
use tree_sitter::Node;

/// A call attributed to its innermost enclosing declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub caller: String,
    pub callee: String,
}

impl CallSite {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}

/// Declarations and calls found in one file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDeclarations {
    pub functions: BTreeSet<String>,
    pub classes: BTreeSet<String>,
    /// Encounter order, duplicates kept
    pub calls: Vec<CallSite>,
}

impl FileDeclarations {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty() && self.calls.is_empty()
    }
}

/// Single-file, pre-order AST walk with an explicit scope stack.
///
/// Function and class names are pushed while their bodies are visited, so
/// every call is attributed to the innermost active declaration (or
/// `<module>` at top level). Callee names are taken syntactically: a bare
/// identifier, or the trailing member of `receiver.member(...)`. No import or
/// variable resolution is attempted.
///
/// The walk keeps its own work stack, so nesting depth is bounded by memory
/// and not by the thread stack.
pub struct DeclarationCollector<'a> {
    source: &'a ParsedSource,
    kinds: &'static NodeKinds,
    scope: Vec<String>,
    result: FileDeclarations,
}

/// Pending work for the pre-order walk
enum Step<'a> {
    Visit(Node<'a>),
    EnterScope(String),
    LeaveScope,
}

impl<'a> DeclarationCollector<'a> {
    pub fn new(source: &'a ParsedSource) -> Self {
        Self {
            source,
            kinds: source.language().node_kinds(),
            scope: Vec::new(),
            result: FileDeclarations::default(),
        }
    }

    /// Walk the whole tree and return what was collected
    pub fn collect(mut self) -> FileDeclarations {
        let mut pending = vec![Step::Visit(self.source.root())];

        while let Some(step) = pending.pop() {
            match step {
                Step::Visit(node) => self.visit(node, &mut pending),
                Step::EnterScope(name) => self.scope.push(name),
                Step::LeaveScope => {
                    self.scope.pop();
                }
            }
        }

        self.result
    }

    fn visit(&mut self, node: Node<'a>, pending: &mut Vec<Step<'a>>) {
        match self.source.language().classify(node.kind()) {
            SyntaxKind::Function => self.visit_function(node, pending),
            SyntaxKind::Class => self.visit_class(node, pending),
            SyntaxKind::Call => {
                self.record_call(node);
                push_children(node, pending);
            }
            SyntaxKind::Other => push_children(node, pending),
        }
    }

    /// Parameters and annotations are evaluated in the enclosing scope; only
    /// the body runs under the function's own name. Decorator and default
    /// value calls therefore belong to the class or `<module>` around it.
    fn visit_function(&mut self, node: Node<'a>, pending: &mut Vec<Step<'a>>) {
        let Some(name) = self.declared_name(node) else {
            push_children(node, pending);
            return;
        };
        self.result.functions.insert(name.clone());

        let body_id = node
            .child_by_field_name(self.kinds.body_field)
            .map(|body| body.id());

        // reversed, so the first child is popped first
        for child in children(node).into_iter().rev() {
            if Some(child.id()) == body_id {
                pending.push(Step::LeaveScope);
                pending.push(Step::Visit(child));
                pending.push(Step::EnterScope(name.clone()));
            } else {
                pending.push(Step::Visit(child));
            }
        }
    }

    fn visit_class(&mut self, node: Node<'a>, pending: &mut Vec<Step<'a>>) {
        let Some(name) = self.declared_name(node) else {
            push_children(node, pending);
            return;
        };
        self.result.classes.insert(name.clone());

        self.scope.push(name);
        pending.push(Step::LeaveScope);
        push_children(node, pending);
    }

    fn record_call(&mut self, node: Node<'a>) {
        let Some(callee) = node
            .child_by_field_name(self.kinds.call_target_field)
            .and_then(|target| self.callee_name(target))
        else {
            return;
        };

        let caller = self
            .scope
            .last()
            .map(String::as_str)
            .unwrap_or(MODULE_SCOPE);
        self.result.calls.push(CallSite::new(caller, callee));
    }

    fn callee_name(&self, target: Node<'a>) -> Option<String> {
        let mut target = target;
        // `(f)()` names `f`
        while target.kind() == self.kinds.grouping {
            if target.named_child_count() != 1 {
                return None;
            }
            target = target.named_child(0)?;
        }

        let kind = target.kind();
        if kind == self.kinds.identifier {
            return self.text(target);
        }
        if kind == self.kinds.member_access {
            return target
                .child_by_field_name(self.kinds.member_field)
                .and_then(|member| self.text(member));
        }
        None
    }

    fn declared_name(&self, node: Node<'a>) -> Option<String> {
        node.child_by_field_name(self.kinds.name_field)
            .and_then(|name| self.text(name))
    }

    fn text(&self, node: Node<'a>) -> Option<String> {
        self.source
            .node_text(node)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }
}

fn children<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn push_children<'a>(node: Node<'a>, pending: &mut Vec<Step<'a>>) {
    pending.extend(children(node).into_iter().rev().map(Step::Visit));
}

/// Collect declarations and calls for one parsed file
pub fn collect_declarations(source: &ParsedSource) -> FileDeclarations {
    DeclarationCollector::new(source).collect()
}
