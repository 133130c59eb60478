//! Interprocedural discovery of possible exceptions.
//!
//! A [`DiscoveryVisitor`] walks a region of syntax collecting every
//! exception that may escape it, following invocations into their
//! declarations through the shared [`FlowCache`]. The visitor runs in one
//! of two modes:
//!
//! - **Analysis** mode walks the protected block of the catch clause under
//!   analysis. Every discovered flow is closed against that clause's caught
//!   type and reported; nothing is filtered.
//! - **Declaration** mode walks a method declaration during expansion. A
//!   flow already handled by a try/catch inside the declaration is dropped;
//!   only flows that escape the method survive into its cache entry.
//!
//! Depth is tracked as a level: the analyzed region is level 0, its direct
//! callees level 1, and so on. A method's cache entry remembers the deepest
//! level its expansion reached, so call sites can report how far the search
//! went without re-walking.

use crate::cache::{FlowCache, InvokedMethod};
use crate::classify::is_closeable;
use crate::docs::exception_crefs;
use crate::flow::{ClosedExceptionFlow, Evidence, ExceptionFlow, FlowSet};
use crate::oracle::{TypeHandle, TypeOracle};
use crate::syntax::{FileId, NodeId, SyntaxKind, SyntaxTree};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The catch clause a flow is evaluated against in analysis mode.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub catch_type: Option<TypeHandle>,
    pub catch_file_path: String,
    pub catch_start_line: u32,
}

/// One discovery walk over a syntax region.
pub struct DiscoveryVisitor<'a> {
    trees: &'a [SyntaxTree],
    oracle: &'a dyn TypeOracle,
    cache: &'a FlowCache,
    level: u32,
    analysis: Option<AnalysisContext>,
    flows: FlowSet,
    closed: Vec<ClosedExceptionFlow>,
    /// Distinct invoked method keys seen in this region, with whether each
    /// resolved to a symbol.
    invoked: BTreeMap<String, bool>,
    max_level: u32,
}

impl<'a> DiscoveryVisitor<'a> {
    /// Visitor for the protected region of a catch clause.
    pub fn for_analysis(
        trees: &'a [SyntaxTree],
        oracle: &'a dyn TypeOracle,
        cache: &'a FlowCache,
        context: AnalysisContext,
    ) -> Self {
        Self {
            trees,
            oracle,
            cache,
            level: 0,
            analysis: Some(context),
            flows: FlowSet::default(),
            closed: Vec::new(),
            invoked: BTreeMap::new(),
            max_level: 0,
        }
    }

    /// Visitor for a method declaration expanded at the given depth.
    pub fn for_declaration(
        trees: &'a [SyntaxTree],
        oracle: &'a dyn TypeOracle,
        cache: &'a FlowCache,
        level: u32,
    ) -> Self {
        Self {
            trees,
            oracle,
            cache,
            level,
            analysis: None,
            flows: FlowSet::default(),
            closed: Vec::new(),
            invoked: BTreeMap::new(),
            max_level: level,
        }
    }

    /// Walk `node` and everything under it.
    pub fn visit(&mut self, file: FileId, node: NodeId) {
        let tree = &self.trees[file.index()];
        for n in tree.descendants_and_self(node) {
            match tree.kind(n) {
                SyntaxKind::Invocation | SyntaxKind::ObjectCreation => self.process_call(file, n),
                SyntaxKind::Throw => self.process_throw(file, n),
                _ => {}
            }
        }
    }

    fn process_call(&mut self, file: FileId, node: NodeId) {
        let tree = &self.trees[file.index()];
        let (key, bound) = match self.oracle.resolve(file, node) {
            Some(key) => (key, true),
            None => (tree.text(node).to_owned(), false),
        };
        self.invoked.entry(key.clone()).or_insert(bound);

        let (entry, must_expand) = self.cache.intern(&key, bound);
        if must_expand {
            self.expand(&entry, &key);
        }

        // During a recursive cycle or a concurrent expansion the entry is
        // still `Expanding`; the snapshot taken here is best effort.
        if !entry.is_ready() {
            debug!(method = %key, "reading flows of a method still expanding");
        }
        let snapshot = entry.snapshot_flows();
        self.max_level = self.max_level.max(entry.children_max_level());
        for flow in snapshot.iter() {
            self.absorb(file, node, &key, flow.clone());
        }
    }

    fn expand(&mut self, entry: &InvokedMethod, key: &str) {
        let next_level = self.level + 1;
        if let Some((decl_file, decl_node)) = self.oracle.declaration_of(key) {
            entry.mark_declared();
            let mut nested =
                DiscoveryVisitor::for_declaration(self.trees, self.oracle, self.cache, next_level);
            nested.visit(decl_file, decl_node);
            let DiscoveryVisitor {
                mut flows,
                max_level,
                ..
            } = nested;
            if let Some(xml) = self.oracle.doc_syntax_of(key) {
                self.collect_doc_flows(&mut flows, xml, key, Evidence::DOC_SYNTAX, next_level);
            }
            entry.install_flows(flows, max_level);
        } else if let Some(xml) = self.oracle.doc_semantic_of(key) {
            entry.mark_external_doc();
            let mut flows = FlowSet::default();
            self.collect_doc_flows(&mut flows, xml, key, Evidence::DOC_SEMANTIC, next_level);
            entry.install_flows(flows, next_level);
        } else {
            // Resolved, but neither source nor documentation is available.
            entry.install_flows(FlowSet::default(), self.level);
        }
    }

    fn collect_doc_flows(
        &self,
        flows: &mut FlowSet,
        xml: &str,
        key: &str,
        evidence: Evidence,
        level: u32,
    ) {
        match exception_crefs(xml) {
            Ok(names) => {
                for name in names {
                    let ty = self.oracle.type_named(&name);
                    flows.merge(ExceptionFlow::new(name, ty, evidence, key, level));
                }
            }
            Err(e) => warn!(method = %key, error = %e, "skipping unparseable documentation"),
        }
    }

    fn process_throw(&mut self, file: FileId, node: NodeId) {
        let tree = &self.trees[file.index()];
        let thrown = self.oracle.thrown_type_of(file, node);
        let name = match thrown {
            Some(ty) => self.oracle.type_name(ty).to_owned(),
            // Unresolved throw expressions keep their source text as a
            // textual identity.
            None => tree.text(node).to_owned(),
        };
        let origin = match tree.enclosing_declaration(node) {
            Some(decl) => self
                .oracle
                .resolve(file, decl)
                .unwrap_or_else(|| tree.text(decl).to_owned()),
            None => tree.file_path.clone(),
        };
        self.max_level = self.max_level.max(self.level);
        let flow = ExceptionFlow::new(name, thrown, Evidence::THROW, origin.clone(), self.level);
        self.absorb(file, node, &origin, flow);
    }

    fn absorb(&mut self, file: FileId, node: NodeId, invoked_key: &str, flow: ExceptionFlow) {
        match &self.analysis {
            Some(ctx) => {
                let line = self.trees[file.index()].span(node).start_line;
                let mut closed = ClosedExceptionFlow::open(flow.clone());
                closed.close(
                    self.oracle,
                    ctx.catch_type,
                    &ctx.catch_file_path,
                    ctx.catch_start_line,
                    invoked_key,
                    line,
                );
                self.closed.push(closed);
                self.flows.merge(flow);
            }
            None => {
                if self.escapes_enclosing_try(file, node, flow.thrown_type()) {
                    self.flows.merge(flow);
                }
            }
        }
    }

    /// Whether an exception raised at `node` propagates past every try
    /// statement between the node and the enclosing declaration.
    ///
    /// A try only protects what is under its block child: a throw inside
    /// one of its catch clauses is not covered by that same try.
    fn escapes_enclosing_try(
        &self,
        file: FileId,
        node: NodeId,
        thrown: Option<TypeHandle>,
    ) -> bool {
        let tree = &self.trees[file.index()];
        let mut prev = node;
        let mut current = tree.parent(node);
        while let Some(parent) = current {
            let kind = tree.kind(parent);
            if kind.is_declaration_boundary() {
                break;
            }
            if kind == SyntaxKind::Try && tree.try_block(parent) == Some(prev) {
                for catch in tree.try_catches(parent) {
                    let caught = tree
                        .catch_declaration(catch)
                        .and_then(|decl| self.oracle.caught_type_of(file, decl));
                    if is_closeable(self.oracle, caught, thrown) {
                        return false;
                    }
                }
            }
            prev = parent;
            current = tree.parent(parent);
        }
        true
    }

    /// Flows discovered in this region (post-filtering in declaration mode).
    pub fn flows(&self) -> &FlowSet {
        &self.flows
    }

    /// Per-flow closure results; populated in analysis mode only.
    pub fn closed_flows(&self) -> &[ClosedExceptionFlow] {
        &self.closed
    }

    /// Distinct invoked method identities seen in the region.
    pub fn invoked_count(&self) -> usize {
        self.invoked.len()
    }

    /// Of those, how many never resolved to a symbol.
    pub fn unbound_invoked_count(&self) -> usize {
        self.invoked.values().filter(|bound| !**bound).count()
    }

    /// Deepest call level the walk reached.
    pub fn max_level(&self) -> u32 {
        self.max_level
    }
}
