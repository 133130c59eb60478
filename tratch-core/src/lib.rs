//! tratch-core: exception-handling analysis for catch blocks.
//!
//! This library mines try/catch constructs from a front-end-supplied
//! project model: for every catch clause it extracts a feature vector
//! describing how the handler reacts, and discovers interprocedurally
//! which exceptions can actually reach the clause and whether it is typed
//! to receive them.
//!
//! # Features
//!
//! - **Handler classification**: relate caught and thrown types through
//!   the type hierarchy (specific, subsumption, supersumption, unrelated)
//! - **Interprocedural discovery**: follow invocations into their
//!   declarations, collecting throw statements and documented exceptions
//! - **Evidence merging**: the same exception observed through throws and
//!   documentation collapses into one flow with combined evidence
//! - **Shared memoization**: each method declaration is expanded once per
//!   run, safely across rayon workers
//! - **Catch-body features**: logging, abort, rethrow, wrap, recover, and
//!   the other reaction signals of the handler body
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use tratch_core::prelude::*;
//!
//! let model = load_model(Path::new("model.json"))?;
//! let config = load_config(Path::new("."))?;
//! let result = analyze_model(&model, &config);
//!
//! for record in &result.catches {
//!     println!("catch ({}) at {}:{}", record.exception_type,
//!         record.file_path, record.start_line);
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`syntax`]: arena syntax trees and navigation
//! - [`oracle`]: the type/symbol resolution surface
//! - [`model`]: the serde project model and its builder
//! - [`classify`]: caught/thrown type relationship
//! - [`flow`]: exception flows, evidence, and closure
//! - [`cache`]: shared expansion memoization
//! - [`docs`]: documentation XML scanning
//! - [`discover`]: the interprocedural discovery walk
//! - [`features`]: catch-body statement classification
//! - [`analyzer`]: per-catch analysis and the run driver
//! - [`report`]: plaintext and JSON output
//! - [`error`]: typed error handling

pub mod analyzer;
pub mod cache;
pub mod classify;
pub mod config;
pub mod discover;
pub mod docs;
pub mod error;
pub mod features;
pub mod flow;
pub mod logging;
pub mod model;
pub mod oracle;
pub mod prelude;
pub mod report;
pub mod syntax;

// ============================================================================
// Explicit Re-exports (avoiding glob imports for clear API surface)
// ============================================================================

// Error types
pub use error::{IoResultExt, TratchError, TratchResult};

// Analysis driver and records
pub use analyzer::{
    analyze_model, AnalysisResult, CatchAnalyzer, CatchRecord, PossibleExceptionRecord,
    NO_EXCEPTION_DECLARED, NO_NAMED_TYPE,
};

// Project model
pub use model::{load_model, FileBindings, MethodDecl, ModelBuilder, ProjectModel, TypeData};
pub use oracle::{TypeHandle, TypeOracle};

// Syntax trees
pub use syntax::{FileId, NodeData, NodeId, Span, SyntaxKind, SyntaxTree};

// Classification and flows
pub use classify::{classify, is_closeable, is_super_type, HandlerKind};
pub use flow::{ClosedExceptionFlow, Closure, Evidence, ExceptionFlow, FlowSet};

// Shared memoization
pub use cache::{FlowCache, InvokedMethod};

// Discovery
pub use discover::{AnalysisContext, DiscoveryVisitor};

// Configuration
pub use config::{load_config, TratchConfig};

// Logging
pub use logging::{init_structured_logging, log_error, log_info, log_warn};

// Output
pub use report::{print_json, print_plain};

#[cfg(test)]
mod tests;
