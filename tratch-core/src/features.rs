//! Statement classification inside catch blocks.
//!
//! These predicates answer how a handler reacts to the exception it
//! receives: does it log, abort, rethrow, inspect the cause, fall through
//! to other work, or genuinely recover. Classification is name-driven and
//! configured through [`TratchConfig`]'s method-name fragment lists.
//!
//! All scans over a catch body skip nested `Try` subtrees: statements under
//! an inner try/catch are accounted to that inner handler.

use crate::config::TratchConfig;
use crate::oracle::TypeOracle;
use crate::syntax::{FileId, NodeId, SyntaxKind, SyntaxTree};
use regex::Regex;
use std::sync::OnceLock;

fn generic_args_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new("<.*>").unwrap())
}

fn body_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{.*\}").unwrap())
}

fn args_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(.*\)").unwrap())
}

fn throw_stmt_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Throw.*Exception").unwrap())
}

/// Reduce an invocation's source text to a comparable method name: generic
/// arguments, argument lists, braces, and whitespace are stripped.
pub fn method_name_extraction(text: &str) -> String {
    let s = generic_args_re().replace_all(text, "");
    let s = body_re().replace_all(&s, "");
    let s = args_re().replace_all(&s, "");
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn matches_any(name: &str, fragments: &[String]) -> bool {
    fragments.iter().any(|f| name.contains(f.as_str()))
}

/// Whether an invocation node is a logging call: its extracted name
/// contains a configured logging fragment and no veto fragment.
pub fn is_logging(tree: &SyntaxTree, node: NodeId, config: &TratchConfig) -> bool {
    if tree.kind(node) != SyntaxKind::Invocation {
        return false;
    }
    let name = method_name_extraction(tree.text(node));
    !name.is_empty()
        && matches_any(&name, &config.log_methods)
        && !matches_any(&name, &config.not_log_methods)
}

pub fn is_abort(tree: &SyntaxTree, node: NodeId, config: &TratchConfig) -> bool {
    tree.kind(node) == SyntaxKind::Invocation
        && matches_any(
            &method_name_extraction(tree.text(node)),
            &config.abort_methods,
        )
}

/// Whether a node inspects the exception's cause (e.g. reads
/// `InnerException`). Applies to invocations and member-access identifiers.
pub fn is_get_cause(tree: &SyntaxTree, node: NodeId, config: &TratchConfig) -> bool {
    matches!(
        tree.kind(node),
        SyntaxKind::Invocation | SyntaxKind::Identifier
    ) && matches_any(tree.text(node), &config.get_cause_methods)
}

pub fn count_logging_in(tree: &SyntaxTree, scope: NodeId, config: &TratchConfig) -> usize {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .filter(|n| is_logging(tree, *n, config))
        .count()
}

pub fn find_abort_in(tree: &SyntaxTree, scope: NodeId, config: &TratchConfig) -> bool {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .any(|n| is_abort(tree, n, config))
}

pub fn find_get_cause_in(tree: &SyntaxTree, scope: NodeId, config: &TratchConfig) -> bool {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .any(|n| is_get_cause(tree, n, config))
}

/// Whether the scope performs any invocation that is not logging, abort, or
/// cause inspection.
pub fn find_other_invocation_in(tree: &SyntaxTree, scope: NodeId, config: &TratchConfig) -> bool {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .filter(|n| tree.kind(*n) == SyntaxKind::Invocation)
        .any(|n| {
            !is_logging(tree, n, config)
                && !is_abort(tree, n, config)
                && !is_get_cause(tree, n, config)
        })
}

pub fn count_throw_in(tree: &SyntaxTree, scope: NodeId) -> usize {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .filter(|n| tree.kind(*n) == SyntaxKind::Throw)
        .count()
}

/// Throws that construct a new exception object.
pub fn count_throw_new_in(tree: &SyntaxTree, scope: NodeId) -> usize {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .filter(|n| tree.kind(*n) == SyntaxKind::Throw)
        .filter(|n| {
            tree.descendants(*n)
                .into_iter()
                .any(|d| tree.kind(d) == SyntaxKind::ObjectCreation)
        })
        .count()
}

/// Throws that reference the caught exception variable, wrapping or
/// rethrowing the current exception.
pub fn count_throw_wrap_in(tree: &SyntaxTree, scope: NodeId, catch_var: Option<&str>) -> usize {
    let Some(var) = catch_var else {
        return 0;
    };
    tree.descendants_skipping_try(scope)
        .into_iter()
        .filter(|n| tree.kind(*n) == SyntaxKind::Throw)
        .filter(|n| {
            tree.descendants(*n)
                .into_iter()
                .any(|d| tree.kind(d) == SyntaxKind::Identifier && tree.text(d) == var)
        })
        .count()
}

pub fn find_return_in(tree: &SyntaxTree, scope: NodeId) -> bool {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .any(|n| tree.kind(n) == SyntaxKind::Return)
}

pub fn find_continue_in(tree: &SyntaxTree, scope: NodeId) -> bool {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .any(|n| tree.kind(n) == SyntaxKind::Continue)
}

/// A block with no content other than comments, nested try statements
/// excluded like every other body scan.
pub fn is_empty_block(tree: &SyntaxTree, block: NodeId) -> bool {
    tree.descendants_skipping_try(block)
        .into_iter()
        .all(|n| tree.kind(n) == SyntaxKind::Comment)
}

pub fn has_todo_comment(tree: &SyntaxTree, scope: NodeId) -> bool {
    tree.descendants_and_self(scope)
        .into_iter()
        .filter(|n| tree.kind(*n) == SyntaxKind::Comment)
        .any(|n| {
            let upper = tree.text(n).to_uppercase();
            upper.contains("TODO") || upper.contains("FIXME")
        })
}

/// An assignment, treated as setting a logic flag in reaction to the
/// exception.
pub fn is_set_logic_flag(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.kind(node) == SyntaxKind::Assign
}

/// A throw statement proper, or an invocation whose name reads like a
/// throw helper (`ThrowXxxException`).
pub fn is_throw_stmt(tree: &SyntaxTree, node: NodeId) -> bool {
    match tree.kind(node) {
        SyntaxKind::Throw => true,
        SyntaxKind::Invocation => throw_stmt_re().is_match(&method_name_extraction(tree.text(node))),
        _ => false,
    }
}

fn is_statement_like(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::Invocation
            | SyntaxKind::ObjectCreation
            | SyntaxKind::Throw
            | SyntaxKind::Return
            | SyntaxKind::Continue
            | SyntaxKind::Assign
            | SyntaxKind::Statement
    )
}

/// Statement nodes in the scope that contain no further statements, with
/// nested try subtrees excluded.
pub fn leaf_statements(tree: &SyntaxTree, scope: NodeId) -> Vec<NodeId> {
    tree.descendants_skipping_try(scope)
        .into_iter()
        .filter(|n| is_statement_like(tree.kind(*n)))
        .filter(|n| {
            !tree
                .descendants(*n)
                .into_iter()
                .any(|d| is_statement_like(tree.kind(d)))
        })
        .collect()
}

/// A leaf statement that works with the exception value itself without
/// logging, flag setting, or rethrowing: the handler is doing real
/// recovery.
pub fn is_recover_statement(
    tree: &SyntaxTree,
    file: FileId,
    node: NodeId,
    oracle: &dyn TypeOracle,
    config: &TratchConfig,
) -> bool {
    if is_logging(tree, node, config) || is_set_logic_flag(tree, node) || is_throw_stmt(tree, node)
    {
        return false;
    }
    tree.descendants_and_self(node)
        .into_iter()
        .filter(|n| tree.kind(*n) == SyntaxKind::Identifier)
        .any(|n| {
            oracle
                .local_type_name_of(file, n)
                .is_some_and(|ty| ty.contains("Exception"))
        })
}

/// Whether a catch body contains recovery logic. A nested try statement
/// counts as recovery by itself; otherwise any recover leaf statement does.
pub fn find_recover_in(
    tree: &SyntaxTree,
    file: FileId,
    catch_node: NodeId,
    oracle: &dyn TypeOracle,
    config: &TratchConfig,
) -> bool {
    let Some(block) = tree.catch_block(catch_node) else {
        return false;
    };
    if !tree.descendants_of_kind(block, SyntaxKind::Try).is_empty() {
        return true;
    }
    leaf_statements(tree, block)
        .into_iter()
        .any(|n| is_recover_statement(tree, file, n, oracle, config))
}

/// The catch clause this one is nested inside, if any. Only a clause
/// sitting in another handler's body counts; a clause whose try merely
/// lives in an outer try's protected block does not. Stops at
/// method/constructor/class boundaries.
pub fn find_parent_catch(tree: &SyntaxTree, catch_node: NodeId) -> Option<NodeId> {
    let mut current = tree.parent(catch_node);
    while let Some(node) = current {
        match tree.kind(node) {
            SyntaxKind::Catch => return Some(node),
            kind if kind.is_declaration_boundary() => return None,
            _ => current = tree.parent(node),
        }
    }
    None
}

/// The try statement owning the enclosing catch clause.
pub fn find_parent_try(tree: &SyntaxTree, catch_node: NodeId) -> Option<NodeId> {
    let parent_catch = find_parent_catch(tree, catch_node)?;
    tree.parent(parent_catch)
        .filter(|n| tree.kind(*n) == SyntaxKind::Try)
}

pub fn is_inner_catch(tree: &SyntaxTree, catch_node: NodeId) -> bool {
    find_parent_catch(tree, catch_node).is_some()
}
