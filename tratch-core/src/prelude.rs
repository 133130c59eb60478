//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use tratch_core::prelude::*;
//! ```
//!
//! This provides the most commonly needed types for catch-block analysis
//! without polluting the namespace with rarely-used items.

// Error handling
pub use crate::error::{TratchError, TratchResult};

// Project model and the resolution surface
pub use crate::model::{load_model, ModelBuilder, ProjectModel};
pub use crate::oracle::{TypeHandle, TypeOracle};

// Syntax trees
pub use crate::syntax::{FileId, NodeId, Span, SyntaxKind, SyntaxTree};

// Handler classification
pub use crate::classify::{classify, is_closeable, is_super_type, HandlerKind};

// The evidence model
pub use crate::flow::{ClosedExceptionFlow, Closure, Evidence, ExceptionFlow, FlowSet};

// Shared memoization
pub use crate::cache::{FlowCache, InvokedMethod};

// Discovery
pub use crate::discover::{AnalysisContext, DiscoveryVisitor};

// Analysis driver and records
pub use crate::analyzer::{
    analyze_model, AnalysisResult, CatchAnalyzer, CatchRecord, PossibleExceptionRecord,
};

// Configuration
pub use crate::config::{load_config, TratchConfig};
