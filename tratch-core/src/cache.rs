//! Process-wide memo table of invoked methods and their possible
//! exceptions.
//!
//! Every catch-block analysis in a run shares one [`FlowCache`], so each
//! method declaration is expanded at most once no matter how many call
//! sites reference it. Insertion is atomic per key via the dashmap entry
//! API: under a race, exactly one thread wins the insert and becomes
//! responsible for expansion.
//!
//! Expansion state is an explicit machine, `Expanding` then `Ready`.
//! Readers that observe `Expanding` (recursive call chains, or a concurrent
//! analysis of a shared callee) take the entry's best-effort flow snapshot
//! at that moment instead of re-entering. The resulting set can be
//! incomplete for cycles; that approximation is deliberate.

use crate::flow::FlowSet;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

const STATE_EXPANDING: u8 = 0;
const STATE_READY: u8 = 1;

/// Memo entry for one distinct method identity (resolved symbol key, or the
/// node's source text when unbound).
#[derive(Debug)]
pub struct InvokedMethod {
    key: String,
    bound: bool,
    declared: AtomicBool,
    external_doc: AtomicBool,
    state: AtomicU8,
    flows: RwLock<FlowSet>,
    children_max_level: AtomicU32,
}

impl InvokedMethod {
    fn new(key: &str, bound: bool) -> Self {
        Self {
            key: key.to_owned(),
            bound,
            declared: AtomicBool::new(false),
            external_doc: AtomicBool::new(false),
            // Unbound entries carry no declaration to expand; they are born
            // ready and stay empty.
            state: AtomicU8::new(if bound { STATE_EXPANDING } else { STATE_READY }),
            flows: RwLock::new(FlowSet::default()),
            children_max_level: AtomicU32::new(0),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn is_declared(&self) -> bool {
        self.declared.load(Ordering::Acquire)
    }

    pub fn mark_declared(&self) {
        self.declared.store(true, Ordering::Release);
    }

    pub fn has_external_doc(&self) -> bool {
        self.external_doc.load(Ordering::Acquire)
    }

    pub fn mark_external_doc(&self) {
        self.external_doc.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == STATE_READY
    }

    pub fn children_max_level(&self) -> u32 {
        self.children_max_level.load(Ordering::Acquire)
    }

    /// Current flows, cloned. During expansion this is the best-effort
    /// snapshot recursive readers consume.
    pub fn snapshot_flows(&self) -> FlowSet {
        self.flows
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Install the surviving flows of an expansion and transition to
    /// `Ready`.
    pub fn install_flows(&self, flows: FlowSet, max_level: u32) {
        {
            let mut slot = self
                .flows
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            slot.merge_all(&flows);
        }
        self.children_max_level
            .fetch_max(max_level, Ordering::AcqRel);
        self.state.store(STATE_READY, Ordering::Release);
    }
}

/// Concurrency-safe memo table keyed by method identity.
#[derive(Debug, Default)]
pub struct FlowCache {
    entries: DashMap<String, Arc<InvokedMethod>>,
}

impl FlowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch or create the entry for `key`.
    ///
    /// Returns the entry plus whether the caller must expand it: true only
    /// for the single thread that inserted a bound entry.
    pub fn intern(&self, key: &str, bound: bool) -> (Arc<InvokedMethod>, bool) {
        let mut inserted = false;
        let entry = self
            .entries
            .entry(key.to_owned())
            .or_insert_with(|| {
                inserted = true;
                Arc::new(InvokedMethod::new(key, bound))
            })
            .clone();
        (entry, inserted && bound)
    }

    pub fn get(&self, key: &str) -> Option<Arc<InvokedMethod>> {
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bound_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_bound()).count()
    }

    pub fn declared_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_declared()).count()
    }

    pub fn external_doc_count(&self) -> usize {
        self.entries.iter().filter(|e| e.has_external_doc()).count()
    }
}
