//! The evidence model: one possible exception occurrence and its closure
//! against a concrete catch clause.
//!
//! An [`ExceptionFlow`] records that some exception type may escape a
//! method, together with how that was established: an explicit throw
//! statement, documentation XML from the semantic model, or the
//! declaration's own doc comment. The same logical exception is often
//! observed through more than one source, so evidence is a flag set and
//! flows merge by thrown type name.

use crate::classify::{classify, HandlerKind};
use crate::oracle::{TypeHandle, TypeOracle};
use bitflags::bitflags;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

bitflags! {
    /// How a possible exception was discovered.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Evidence: u8 {
        /// An explicit `throw` statement was found.
        const THROW = 1;
        /// An `<exception>` entry in the semantic model's documentation XML.
        const DOC_SEMANTIC = 1 << 1;
        /// An `<exception>` entry in the declaration's own doc comment.
        const DOC_SYNTAX = 1 << 2;
    }
}

/// One possible exception escaping a region of code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionFlow {
    thrown_type_name: String,
    thrown_type: Option<TypeHandle>,
    evidence: Evidence,
    originating_method_key: String,
    level_found: u32,
}

impl ExceptionFlow {
    pub fn new(
        thrown_type_name: impl Into<String>,
        thrown_type: Option<TypeHandle>,
        evidence: Evidence,
        originating_method_key: impl Into<String>,
        level_found: u32,
    ) -> Self {
        Self {
            thrown_type_name: thrown_type_name.into(),
            thrown_type,
            evidence,
            originating_method_key: originating_method_key.into(),
            level_found,
        }
    }

    pub fn thrown_type_name(&self) -> &str {
        &self.thrown_type_name
    }

    pub fn thrown_type(&self) -> Option<TypeHandle> {
        self.thrown_type
    }

    pub fn evidence(&self) -> Evidence {
        self.evidence
    }

    pub fn originating_method_key(&self) -> &str {
        &self.originating_method_key
    }

    pub fn level_found(&self) -> u32 {
        self.level_found
    }

    /// Merge `other` into `self`. Both must describe the same thrown type
    /// name.
    ///
    /// Evidence flags are OR-ed; the deepest level wins; the originating
    /// method key follows throw evidence, which outranks documentation; the
    /// first resolved type handle is kept.
    pub fn absorb(&mut self, other: &ExceptionFlow) {
        debug_assert_eq!(self.thrown_type_name, other.thrown_type_name);
        if other.evidence.contains(Evidence::THROW) {
            self.originating_method_key = other.originating_method_key.clone();
        }
        self.evidence |= other.evidence;
        if other.level_found > self.level_found {
            self.level_found = other.level_found;
        }
        if self.thrown_type.is_none() {
            self.thrown_type = other.thrown_type;
        }
    }
}

/// Set of flows deduplicated by thrown type name under the merge law.
#[derive(Debug, Clone, Default)]
pub struct FlowSet {
    by_type: BTreeMap<String, ExceptionFlow>,
}

impl FlowSet {
    pub fn merge(&mut self, flow: ExceptionFlow) {
        match self.by_type.entry(flow.thrown_type_name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(flow);
            }
            Entry::Occupied(mut slot) => slot.get_mut().absorb(&flow),
        }
    }

    pub fn merge_all(&mut self, other: &FlowSet) {
        for flow in other.iter() {
            self.merge(flow.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExceptionFlow> {
        self.by_type.values()
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }

    pub fn contains_type(&self, thrown_type_name: &str) -> bool {
        self.by_type.contains_key(thrown_type_name)
    }

    pub fn get(&self, thrown_type_name: &str) -> Option<&ExceptionFlow> {
        self.by_type.get(thrown_type_name)
    }
}

/// Where and how a flow was closed against a catch clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closure {
    pub caught_type_name: String,
    pub caught_type: Option<TypeHandle>,
    pub handler_kind: HandlerKind,
    pub catch_file_path: String,
    pub catch_start_line: u32,
    pub invoked_method_key: String,
    pub invoked_method_line: u32,
}

/// An [`ExceptionFlow`] evaluated against one concrete catch clause.
///
/// Closing is idempotent: the first `close` wins and later calls are
/// no-ops, so a flow surfaced through several paths keeps the
/// classification of the clause that first observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedExceptionFlow {
    flow: ExceptionFlow,
    closure: Option<Closure>,
}

impl ClosedExceptionFlow {
    pub fn open(flow: ExceptionFlow) -> Self {
        Self {
            flow,
            closure: None,
        }
    }

    pub fn flow(&self) -> &ExceptionFlow {
        &self.flow
    }

    pub fn closure(&self) -> Option<&Closure> {
        self.closure.as_ref()
    }

    pub fn is_closed(&self) -> bool {
        self.closure.is_some()
    }

    pub fn handler_kind(&self) -> Option<HandlerKind> {
        self.closure.as_ref().map(|c| c.handler_kind)
    }

    /// Evaluate this flow against a catch clause. No-op if already closed.
    #[allow(clippy::too_many_arguments)]
    pub fn close(
        &mut self,
        oracle: &dyn TypeOracle,
        caught: Option<TypeHandle>,
        catch_file_path: &str,
        catch_start_line: u32,
        invoked_method_key: &str,
        invoked_method_line: u32,
    ) {
        if self.closure.is_some() {
            return;
        }
        let handler_kind = classify(oracle, caught, self.flow.thrown_type);
        self.closure = Some(Closure {
            caught_type_name: caught
                .map(|t| oracle.type_name(t).to_owned())
                .unwrap_or_default(),
            caught_type: caught,
            handler_kind,
            catch_file_path: catch_file_path.to_owned(),
            catch_start_line,
            invoked_method_key: invoked_method_key.to_owned(),
            invoked_method_line,
        });
    }
}
