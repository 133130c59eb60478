//! Arena syntax trees consumed from the language front end.
//!
//! The front end (external to this crate) parses each source file and emits
//! one [`SyntaxTree`] per file: a flat arena of nodes with parent links,
//! pre-order child lists, line spans, and a source-text snippet per node.
//! For declaration nodes (`Class`, `Method`, `Constructor`) the text is the
//! declared name (qualified for classes); for expressions and statements it
//! is the raw source snippet, used as a textual fallback identity when a
//! node does not bind.
//!
//! Navigation mirrors what the analyzer needs: ancestor walks with
//! method/class boundaries, pre-order descendant iteration with kind
//! filters, and try/catch/finally structure accessors.

use serde::{Deserialize, Serialize};

/// Index of a source file within a project model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a node within its [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kinds of syntax nodes the analysis distinguishes.
///
/// Anything the front end cannot map onto a more specific kind arrives as
/// [`SyntaxKind::Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    Class,
    Method,
    Constructor,
    Block,
    Try,
    Catch,
    /// The `(ExceptionType identifier)` part of a catch clause. Text is the
    /// caught type name as written; an optional `Identifier` child names the
    /// exception variable.
    CatchDeclaration,
    Finally,
    Invocation,
    ObjectCreation,
    Throw,
    Return,
    Continue,
    Assign,
    Identifier,
    Comment,
    Statement,
}

impl SyntaxKind {
    /// Declaration kinds that bound ancestor walks (method, constructor,
    /// class).
    pub fn is_declaration_boundary(self) -> bool {
        matches!(
            self,
            SyntaxKind::Method | SyntaxKind::Constructor | SyntaxKind::Class
        )
    }
}

/// 1-indexed line span of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start_line: u32,
    pub end_line: u32,
}

impl Span {
    pub fn new(start_line: u32, end_line: u32) -> Self {
        Self {
            start_line,
            end_line,
        }
    }

    /// Number of source lines covered, inclusive.
    pub fn line_count(&self) -> u32 {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// A single node in the arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeData {
    pub kind: SyntaxKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub text: String,
    pub span: Span,
}

/// One source file's syntax tree.
///
/// Node 0 is the root (conventionally the file's top-level class or a
/// block). Children are stored in source order, so descendant iteration is
/// depth-first pre-order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub file_path: String,
    nodes: Vec<NodeData>,
}

impl SyntaxTree {
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            nodes: Vec::new(),
        }
    }

    /// Append a node. The parent, if given, must already exist.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        kind: SyntaxKind,
        text: impl Into<String>,
        span: Span,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent,
            children: Vec::new(),
            text: text.into(),
            span,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    pub fn root(&self) -> Option<NodeId> {
        if self.nodes.is_empty() {
            None
        } else {
            Some(NodeId(0))
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    pub fn text(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].text
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    /// All ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// Depth-first pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Depth-first pre-order descendants of `id`, including `id` itself.
    pub fn descendants_and_self(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        out.extend(self.descendants(id));
        out
    }

    /// Descendants of the given kind, pre-order.
    pub fn descendants_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.kind(*n) == kind)
            .collect()
    }

    /// Pre-order descendants of `id` with every `Try` subtree skipped.
    ///
    /// Used when classifying the body of a catch clause: statements inside a
    /// nested try/catch/finally are accounted to that inner handler, not to
    /// the one under analysis.
    pub fn descendants_skipping_try(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.kind(node) == SyntaxKind::Try {
                continue;
            }
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    /// Nearest ancestor that is not a block, mirroring how the try
    /// statement's logical parent is reported.
    pub fn parent_skipping_blocks(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(node) = current {
            if self.kind(node) != SyntaxKind::Block {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// Nearest enclosing method, constructor, or class declaration.
    pub fn enclosing_declaration(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|n| self.kind(*n).is_declaration_boundary())
    }

    /// Nearest enclosing class declaration.
    pub fn enclosing_class(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|n| self.kind(*n) == SyntaxKind::Class)
    }

    // Try/catch/finally structure accessors. The front end models a try
    // statement as: Try -> [Block, Catch*, Finally?], a catch clause as
    // Catch -> [CatchDeclaration?, Block], and a finally clause as
    // Finally -> [Block].

    pub fn try_block(&self, try_node: NodeId) -> Option<NodeId> {
        self.children(try_node)
            .iter()
            .copied()
            .find(|n| self.kind(*n) == SyntaxKind::Block)
    }

    pub fn try_catches(&self, try_node: NodeId) -> Vec<NodeId> {
        self.children(try_node)
            .iter()
            .copied()
            .filter(|n| self.kind(*n) == SyntaxKind::Catch)
            .collect()
    }

    pub fn try_finally(&self, try_node: NodeId) -> Option<NodeId> {
        self.children(try_node)
            .iter()
            .copied()
            .find(|n| self.kind(*n) == SyntaxKind::Finally)
    }

    pub fn catch_declaration(&self, catch_node: NodeId) -> Option<NodeId> {
        self.children(catch_node)
            .iter()
            .copied()
            .find(|n| self.kind(*n) == SyntaxKind::CatchDeclaration)
    }

    pub fn catch_block(&self, catch_node: NodeId) -> Option<NodeId> {
        self.children(catch_node)
            .iter()
            .copied()
            .find(|n| self.kind(*n) == SyntaxKind::Block)
    }

    pub fn finally_block(&self, finally_node: NodeId) -> Option<NodeId> {
        self.children(finally_node)
            .iter()
            .copied()
            .find(|n| self.kind(*n) == SyntaxKind::Block)
    }

    /// The exception variable declared by a catch clause, if any.
    pub fn catch_identifier(&self, catch_node: NodeId) -> Option<&str> {
        let decl = self.catch_declaration(catch_node)?;
        self.children(decl)
            .iter()
            .copied()
            .find(|n| self.kind(*n) == SyntaxKind::Identifier)
            .map(|n| self.text(n))
    }
}
