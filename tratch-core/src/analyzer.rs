//! Per-catch analysis and the whole-model run driver.
//!
//! For every catch clause in the model this produces one [`CatchRecord`]
//! (the handler's feature vector) and one [`PossibleExceptionRecord`] per
//! exception observation discovered behind the protected block. Files are
//! analyzed in parallel with rayon; all workers share one [`FlowCache`] so
//! each method declaration is expanded once per run.

use crate::cache::FlowCache;
use crate::classify::{classify, HandlerKind};
use crate::config::TratchConfig;
use crate::discover::{AnalysisContext, DiscoveryVisitor};
use crate::features;
use crate::flow::Evidence;
use crate::model::ProjectModel;
use crate::oracle::TypeOracle;
use crate::syntax::{FileId, NodeId, SyntaxKind, SyntaxTree};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::info;

/// Recorded when a catch clause has no declaration at all (`catch { }`).
pub const NO_EXCEPTION_DECLARED: &str = "!NO_EXCEPTION_DECLARED!";
/// Recorded when a declaration exists but names no type.
pub const NO_NAMED_TYPE: &str = "!NO_NAMED_TYPE!";

/// The feature vector of one catch clause.
#[derive(Debug, Clone, Serialize)]
pub struct CatchRecord {
    /// Caught type's full name, or a sentinel.
    pub exception_type: String,
    /// Enclosing class name.
    pub parent_type: String,
    /// Enclosing method or constructor name.
    pub parent_method: String,
    pub file_path: String,
    pub start_line: u32,
    /// Numeric features, keyed by feature name.
    pub features: BTreeMap<String, i64>,
    /// Textual features.
    pub meta: BTreeMap<String, String>,
}

/// One exception observation behind a catch clause's protected region.
#[derive(Debug, Clone, Serialize)]
pub struct PossibleExceptionRecord {
    /// Thrown type's full name (or textual identity when unresolved).
    pub exception_type: String,
    /// The analyzed clause's caught type name, or a sentinel.
    pub caught_type: String,
    /// Method whose body raised or documented the exception.
    pub declaring_method: String,
    /// Call in the protected region the flow surfaced through; for direct
    /// throws this is the enclosing method itself.
    pub invoked_method: String,
    pub invoked_method_line: u32,
    pub file_path: String,
    pub start_line: u32,
    /// Numeric handler classification code.
    pub handler_type_code: i8,
    pub is_throw: i64,
    pub is_doc_semantic: i64,
    pub is_doc_syntax: i64,
    pub level_found: u32,
}

/// Everything a run produces.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub catches: Vec<CatchRecord>,
    pub possible_exceptions: Vec<PossibleExceptionRecord>,
    /// Run-level counters.
    pub stats: BTreeMap<String, i64>,
}

/// Analyzes single catch clauses against a shared cache.
pub struct CatchAnalyzer<'a> {
    trees: &'a [SyntaxTree],
    oracle: &'a dyn TypeOracle,
    cache: &'a FlowCache,
    config: &'a TratchConfig,
}

impl<'a> CatchAnalyzer<'a> {
    pub fn new(
        trees: &'a [SyntaxTree],
        oracle: &'a dyn TypeOracle,
        cache: &'a FlowCache,
        config: &'a TratchConfig,
    ) -> Self {
        Self {
            trees,
            oracle,
            cache,
            config,
        }
    }

    /// Analyze one catch clause.
    pub fn analyze_catch(
        &self,
        file: FileId,
        catch: NodeId,
    ) -> (CatchRecord, Vec<PossibleExceptionRecord>) {
        let tree = &self.trees[file.index()];
        let try_node = tree.parent(catch);
        let decl = tree.catch_declaration(catch);
        let caught_type = decl.and_then(|d| self.oracle.caught_type_of(file, d));
        let caught_name = match (decl, caught_type) {
            (None, _) => NO_EXCEPTION_DECLARED.to_owned(),
            (Some(_), Some(ty)) => self.oracle.type_name(ty).to_owned(),
            (Some(d), None) => {
                let text = tree.text(d);
                if text.is_empty() {
                    NO_NAMED_TYPE.to_owned()
                } else {
                    text.to_owned()
                }
            }
        };

        let mut features_map: BTreeMap<String, i64> = BTreeMap::new();
        let mut meta: BTreeMap<String, String> = BTreeMap::new();
        let mut set = |name: &str, value: i64| {
            features_map.insert(name.to_owned(), value);
        };

        let catch_span = tree.span(catch);
        set("CatchLine", i64::from(catch_span.start_line));
        set("CatchLength", i64::from(catch_span.line_count()));
        let catch_block = tree.catch_block(catch);
        if let Some(block) = catch_block {
            set("CatchStart", i64::from(tree.span(block).start_line));
            set("CatchLOC", i64::from(tree.span(block).line_count()));
        }

        if let Some(try_node) = try_node {
            set("TryLine", i64::from(tree.span(try_node).start_line));
            if let Some(try_block) = tree.try_block(try_node) {
                set("TryLOC", i64::from(tree.span(try_block).line_count()));
            }
            if let Some(logical_parent) = tree.parent_skipping_blocks(try_node) {
                meta.insert(
                    "ParentNodeType".to_owned(),
                    format!("{:?}", tree.kind(logical_parent)),
                );
            }
        }

        let method = tree.enclosing_declaration(catch);
        let parent_method = method
            .map(|m| {
                let extracted = features::method_name_extraction(tree.text(m));
                if extracted.is_empty() {
                    tree.text(m).to_owned()
                } else {
                    extracted
                }
            })
            .unwrap_or_default();
        if let Some(m) = method {
            set("MethodLine", i64::from(tree.span(m).start_line));
            set("MethodLOC", i64::from(tree.span(m).line_count()));
        }
        let parent_type = tree
            .enclosing_class(catch)
            .map(|c| tree.text(c).to_owned())
            .unwrap_or_default();

        let parent_try = features::find_parent_try(tree, catch);
        set("InnerCatch", i64::from(features::is_inner_catch(tree, catch)));
        set(
            "ParentTryStartLine",
            parent_try.map_or(0, |t| i64::from(tree.span(t).start_line)),
        );

        set(
            "RecoverFlag",
            i64::from(features::find_recover_in(
                tree,
                file,
                catch,
                self.oracle,
                self.config,
            )),
        );

        if let Some(block) = catch_block {
            let log_count = features::count_logging_in(tree, block, self.config);
            set("Logged", i64::from(log_count > 0));
            set("MultiLog", i64::from(log_count > 1));
            set(
                "Abort",
                i64::from(features::find_abort_in(tree, block, self.config)),
            );
            set(
                "GetCause",
                i64::from(features::find_get_cause_in(tree, block, self.config)),
            );
            set(
                "OtherInvocation",
                i64::from(features::find_other_invocation_in(tree, block, self.config)),
            );
            set("NumThrown", features::count_throw_in(tree, block) as i64);
            set("NumThrowNew", features::count_throw_new_in(tree, block) as i64);
            set(
                "NumThrowWrapCurrentException",
                features::count_throw_wrap_in(tree, block, tree.catch_identifier(catch)) as i64,
            );
            set("Return", i64::from(features::find_return_in(tree, block)));
            set("Continue", i64::from(features::find_continue_in(tree, block)));
            set("EmptyBlock", i64::from(features::is_empty_block(tree, block)));
            set("ToDo", i64::from(features::has_todo_comment(tree, block)));

            if let Some(stmt) = tree
                .descendants_skipping_try(block)
                .into_iter()
                .find(|n| features::is_logging(tree, *n, self.config))
            {
                meta.insert("LoggingStatement".to_owned(), tree.text(stmt).to_owned());
            }
        }
        if let Some(var) = tree.catch_identifier(catch) {
            meta.insert("ExceptionVariable".to_owned(), var.to_owned());
        }

        set(
            "CatchException",
            i64::from(
                caught_type.is_some() && caught_type == self.oracle.type_named("System.Exception"),
            ),
        );

        // Interprocedural discovery over the protected block.
        let context = AnalysisContext {
            catch_type: caught_type,
            catch_file_path: tree.file_path.clone(),
            catch_start_line: catch_span.start_line,
        };
        let mut try_visitor =
            DiscoveryVisitor::for_analysis(self.trees, self.oracle, self.cache, context.clone());
        if let Some(try_block) = try_node.and_then(|t| tree.try_block(t)) {
            try_visitor.visit(file, try_block);
        }

        set("NumDistinctMethods", try_visitor.invoked_count() as i64);
        set(
            "NumDistinctMethodsNotBinded",
            try_visitor.unbound_invoked_count() as i64,
        );
        set("NumDistinctExceptions", try_visitor.flows().len() as i64);
        set("MaxLevel", i64::from(try_visitor.max_level()));

        let mut specific = 0i64;
        let mut subsumption = 0i64;
        let mut supersumption = 0i64;
        let mut other = 0i64;
        let mut n_throw = 0i64;
        let mut n_doc_semantic = 0i64;
        let mut n_doc_syntax = 0i64;
        for flow in try_visitor.flows().iter() {
            match classify(self.oracle, caught_type, flow.thrown_type()) {
                HandlerKind::Specific => specific += 1,
                HandlerKind::Subsumption => subsumption += 1,
                HandlerKind::Supersumption => supersumption += 1,
                _ => other += 1,
            }
            if flow.evidence().contains(Evidence::THROW) {
                n_throw += 1;
            }
            if flow.evidence().contains(Evidence::DOC_SEMANTIC) {
                n_doc_semantic += 1;
            }
            if flow.evidence().contains(Evidence::DOC_SYNTAX) {
                n_doc_syntax += 1;
            }
        }
        set("NumSpecificHandler", specific);
        set("NumSubsumptionHandler", subsumption);
        set("NumSupersumptionHandler", supersumption);
        set("NumOtherHandler", other);
        set("NumIsThrow", n_throw);
        set("NumIsDocSemantic", n_doc_semantic);
        set("NumIsDocSyntax", n_doc_syntax);

        // The finally clause of the same try statement, if any, contributes
        // its own observations plus the FinallyThrowing feature.
        let mut records: Vec<PossibleExceptionRecord> = Vec::new();
        let mut push_records = |visitor: &DiscoveryVisitor<'_>| {
            for closed in visitor.closed_flows() {
                let Some(closure) = closed.closure() else {
                    continue;
                };
                records.push(PossibleExceptionRecord {
                    exception_type: closed.flow().thrown_type_name().to_owned(),
                    caught_type: caught_name.clone(),
                    declaring_method: closed.flow().originating_method_key().to_owned(),
                    invoked_method: closure.invoked_method_key.clone(),
                    invoked_method_line: closure.invoked_method_line,
                    file_path: tree.file_path.clone(),
                    start_line: catch_span.start_line,
                    handler_type_code: closure.handler_kind.code(),
                    is_throw: i64::from(closed.flow().evidence().contains(Evidence::THROW)),
                    is_doc_semantic: i64::from(
                        closed.flow().evidence().contains(Evidence::DOC_SEMANTIC),
                    ),
                    is_doc_syntax: i64::from(
                        closed.flow().evidence().contains(Evidence::DOC_SYNTAX),
                    ),
                    level_found: closed.flow().level_found(),
                });
            }
        };
        push_records(&try_visitor);

        let mut finally_throwing = false;
        if let Some(finally_block) = try_node
            .and_then(|t| tree.try_finally(t))
            .and_then(|f| tree.finally_block(f))
        {
            let mut finally_visitor =
                DiscoveryVisitor::for_analysis(self.trees, self.oracle, self.cache, context);
            finally_visitor.visit(file, finally_block);
            finally_throwing = !finally_visitor.flows().is_empty();
            push_records(&finally_visitor);
        }
        set("FinallyThrowing", i64::from(finally_throwing));

        let record = CatchRecord {
            exception_type: caught_name,
            parent_type,
            parent_method,
            file_path: tree.file_path.clone(),
            start_line: catch_span.start_line,
            features: features_map,
            meta,
        };
        (record, records)
    }
}

/// Analyze every catch clause in the model.
pub fn analyze_model(model: &ProjectModel, config: &TratchConfig) -> AnalysisResult {
    let cache = FlowCache::new();
    let trees = model.trees();

    let per_file: Vec<Vec<(CatchRecord, Vec<PossibleExceptionRecord>)>> = (0..trees.len())
        .into_par_iter()
        .map(|index| {
            let file = FileId(index as u32);
            let tree = &trees[index];
            let analyzer = CatchAnalyzer::new(trees, model, &cache, config);
            let Some(root) = tree.root() else {
                return Vec::new();
            };
            tree.descendants_of_kind(root, SyntaxKind::Catch)
                .into_iter()
                .map(|catch| analyzer.analyze_catch(file, catch))
                .collect()
        })
        .collect();

    let mut catches = Vec::new();
    let mut possible_exceptions = Vec::new();
    for file_results in per_file {
        for (record, records) in file_results {
            catches.push(record);
            possible_exceptions.extend(records);
        }
    }

    let mut stats: BTreeMap<String, i64> = BTreeMap::new();
    stats.insert("NumFiles".to_owned(), trees.len() as i64);
    stats.insert(
        "NumLOC".to_owned(),
        trees
            .iter()
            .filter_map(|t| t.root().map(|r| i64::from(t.span(r).line_count())))
            .sum(),
    );
    stats.insert("NumCatchBlock".to_owned(), catches.len() as i64);
    stats.insert(
        "NumPossibleExceptionBlock".to_owned(),
        possible_exceptions.len() as i64,
    );
    stats.insert("NumDeclaredMethods".to_owned(), model.method_count() as i64);
    stats.insert("NumInvokedMethods".to_owned(), cache.len() as i64);
    stats.insert(
        "NumInvokedMethodsBinded".to_owned(),
        cache.bound_count() as i64,
    );
    stats.insert(
        "NumInvokedMethodsDeclared".to_owned(),
        cache.declared_count() as i64,
    );
    stats.insert(
        "NumInvokedMethodsExtDocPresent".to_owned(),
        cache.external_doc_count() as i64,
    );

    info!(
        files = trees.len(),
        catches = catches.len(),
        possible_exceptions = possible_exceptions.len(),
        invoked_methods = cache.len(),
        "analysis complete"
    );

    AnalysisResult {
        catches,
        possible_exceptions,
        stats,
    }
}
