//! Whole-model test suite for tratch-core.
//!
//! The main fixture mirrors a real-world shape: a catch clause protecting a
//! call chain three methods deep, where one branch throws an exception the
//! clause is not typed for, and another branch throws and catches its own
//! exception internally. The clause must see the former and never the
//! latter.

use crate::prelude::*;

// Person.cs:
//   class Sample.Person
//     Main: try { m1(); } catch (System.IO.PathTooLongException e) { log }
//     m1:   m2(); m20();
//     m2:   throw new AggregateException();   (doc comment declares it too)
//     m20:  try { throw new InternalBufferOverflowException(); }
//           catch (InternalBufferOverflowException) { }
fn person_model() -> ProjectModel {
    let mut builder = ModelBuilder::new();
    builder.set_object_type("System.Object");
    builder.add_exception_type("System.Exception", "System.Object");
    builder.add_exception_type("System.AggregateException", "System.Exception");
    builder.add_exception_type("System.SystemException", "System.Exception");
    builder.add_exception_type("System.IO.IOException", "System.SystemException");
    builder.add_exception_type("System.IO.PathTooLongException", "System.IO.IOException");
    builder.add_exception_type(
        "System.IO.InternalBufferOverflowException",
        "System.SystemException",
    );

    let mut tree = SyntaxTree::new("Person.cs");
    let class = tree.add_node(None, SyntaxKind::Class, "Sample.Person", Span::new(1, 60));

    let main = tree.add_node(Some(class), SyntaxKind::Method, "Main", Span::new(2, 12));
    let main_body = tree.add_node(Some(main), SyntaxKind::Block, "", Span::new(2, 12));
    let try_node = tree.add_node(Some(main_body), SyntaxKind::Try, "", Span::new(3, 10));
    let try_block = tree.add_node(Some(try_node), SyntaxKind::Block, "", Span::new(3, 5));
    let call_m1 = tree.add_node(
        Some(try_block),
        SyntaxKind::Invocation,
        "m1()",
        Span::new(4, 4),
    );
    let catch = tree.add_node(Some(try_node), SyntaxKind::Catch, "", Span::new(6, 10));
    let catch_decl = tree.add_node(
        Some(catch),
        SyntaxKind::CatchDeclaration,
        "System.IO.PathTooLongException",
        Span::new(6, 6),
    );
    tree.add_node(
        Some(catch_decl),
        SyntaxKind::Identifier,
        "e",
        Span::new(6, 6),
    );
    let catch_block = tree.add_node(Some(catch), SyntaxKind::Block, "", Span::new(6, 10));
    tree.add_node(
        Some(catch_block),
        SyntaxKind::Invocation,
        "Console.WriteLine(e)",
        Span::new(7, 7),
    );

    let m1 = tree.add_node(Some(class), SyntaxKind::Method, "m1", Span::new(14, 20));
    let m1_body = tree.add_node(Some(m1), SyntaxKind::Block, "", Span::new(14, 20));
    let call_m2 = tree.add_node(
        Some(m1_body),
        SyntaxKind::Invocation,
        "m2()",
        Span::new(15, 15),
    );
    let call_m20 = tree.add_node(
        Some(m1_body),
        SyntaxKind::Invocation,
        "m20()",
        Span::new(16, 16),
    );

    let m2 = tree.add_node(Some(class), SyntaxKind::Method, "m2", Span::new(22, 26));
    let m2_body = tree.add_node(Some(m2), SyntaxKind::Block, "", Span::new(22, 26));
    let m2_throw = tree.add_node(
        Some(m2_body),
        SyntaxKind::Throw,
        "throw new AggregateException()",
        Span::new(23, 23),
    );

    let m20 = tree.add_node(Some(class), SyntaxKind::Method, "m20", Span::new(28, 40));
    let m20_body = tree.add_node(Some(m20), SyntaxKind::Block, "", Span::new(28, 40));
    let inner_try = tree.add_node(Some(m20_body), SyntaxKind::Try, "", Span::new(29, 38));
    let inner_try_block = tree.add_node(Some(inner_try), SyntaxKind::Block, "", Span::new(29, 31));
    let m20_throw = tree.add_node(
        Some(inner_try_block),
        SyntaxKind::Throw,
        "throw new InternalBufferOverflowException()",
        Span::new(30, 30),
    );
    let inner_catch = tree.add_node(Some(inner_try), SyntaxKind::Catch, "", Span::new(32, 35));
    let inner_decl = tree.add_node(
        Some(inner_catch),
        SyntaxKind::CatchDeclaration,
        "System.IO.InternalBufferOverflowException",
        Span::new(32, 32),
    );
    tree.add_node(Some(inner_catch), SyntaxKind::Block, "", Span::new(32, 35));

    let file = builder.add_tree(tree);
    builder.bind_symbol(file, main, "Sample.Person.Main()");
    builder.bind_symbol(file, m1, "Sample.Person.m1()");
    builder.bind_symbol(file, m2, "Sample.Person.m2()");
    builder.bind_symbol(file, m20, "Sample.Person.m20()");
    builder.bind_symbol(file, call_m1, "Sample.Person.m1()");
    builder.bind_symbol(file, call_m2, "Sample.Person.m2()");
    builder.bind_symbol(file, call_m20, "Sample.Person.m20()");
    builder.bind_thrown(file, m2_throw, "System.AggregateException");
    builder.bind_thrown(file, m20_throw, "System.IO.InternalBufferOverflowException");
    builder.bind_caught(file, catch_decl, "System.IO.PathTooLongException");
    builder.bind_caught(file, inner_decl, "System.IO.InternalBufferOverflowException");
    builder.declare_method("Sample.Person.Main()", file, main);
    builder.declare_method_with_doc(
        "Sample.Person.m2()",
        file,
        m2,
        r#"<exception cref="T:System.AggregateException">Always throw & have a invalid xml char.</exception>"#,
    );
    builder.declare_method("Sample.Person.m1()", file, m1);
    builder.declare_method("Sample.Person.m20()", file, m20);
    builder.build()
}

#[test]
fn deep_chain_reports_escaping_exception_only() {
    let model = person_model();
    let config = TratchConfig::default();
    let result = analyze_model(&model, &config);

    // Main's catch and m20's internal catch.
    assert_eq!(result.catches.len(), 2);
    let main_catch = result
        .catches
        .iter()
        .find(|c| c.exception_type == "System.IO.PathTooLongException")
        .unwrap();
    assert_eq!(main_catch.parent_type, "Sample.Person");
    assert_eq!(main_catch.parent_method, "Main");
    assert_eq!(main_catch.features["Logged"], 1);
    assert_eq!(main_catch.features["NumDistinctMethods"], 1);
    assert_eq!(main_catch.features["NumDistinctExceptions"], 1);
    assert_eq!(main_catch.features["NumOtherHandler"], 1);
    assert_eq!(main_catch.features["NumSpecificHandler"], 0);
    assert_eq!(main_catch.features["MaxLevel"], 2);
    assert_eq!(main_catch.features["NumIsThrow"], 1);
    assert_eq!(main_catch.features["NumIsDocSyntax"], 1);

    let main_records: Vec<_> = result
        .possible_exceptions
        .iter()
        .filter(|r| r.caught_type == "System.IO.PathTooLongException")
        .collect();
    assert_eq!(main_records.len(), 1);
    let record = main_records[0];
    assert_eq!(record.exception_type, "System.AggregateException");
    assert_eq!(record.handler_type_code, 3);
    assert_eq!(record.is_throw, 1);
    assert_eq!(record.is_doc_syntax, 1);
    assert_eq!(record.is_doc_semantic, 0);
    assert_eq!(record.level_found, 2);
    assert_eq!(record.invoked_method, "Sample.Person.m1()");
    assert_eq!(record.declaring_method, "Sample.Person.m2()");
    assert_eq!(record.invoked_method_line, 4);
}

#[test]
fn internally_handled_exception_never_reaches_outer_catch() {
    let model = person_model();
    let config = TratchConfig::default();
    let result = analyze_model(&model, &config);

    // m20 closes InternalBufferOverflowException itself; the outer clause
    // never sees it.
    assert!(!result.possible_exceptions.iter().any(|r| {
        r.exception_type == "System.IO.InternalBufferOverflowException"
            && r.caught_type == "System.IO.PathTooLongException"
    }));

    // m20's own catch observes it as a specific handler at level 0.
    let inner = result
        .possible_exceptions
        .iter()
        .find(|r| r.caught_type == "System.IO.InternalBufferOverflowException")
        .unwrap();
    assert_eq!(
        inner.exception_type,
        "System.IO.InternalBufferOverflowException"
    );
    assert_eq!(inner.handler_type_code, 0);
    assert_eq!(inner.level_found, 0);
}

#[test]
fn run_stats_reflect_the_shared_cache() {
    let model = person_model();
    let config = TratchConfig::default();
    let result = analyze_model(&model, &config);

    assert_eq!(result.stats["NumFiles"], 1);
    assert_eq!(result.stats["NumCatchBlock"], 2);
    assert_eq!(result.stats["NumDeclaredMethods"], 4);
    // m1, m2, m20 were invoked; Main never is.
    assert_eq!(result.stats["NumInvokedMethods"], 3);
    assert_eq!(result.stats["NumInvokedMethodsBinded"], 3);
    assert_eq!(result.stats["NumInvokedMethodsDeclared"], 3);
    assert_eq!(result.stats["NumInvokedMethodsExtDocPresent"], 0);
}

// try { Open(path); } catch (System.IO.IOException) { }
// where Open throws PathTooLongException: an ancestor clause closes the
// descendant exception.
#[test]
fn ancestor_clause_subsumes_descendant_exception() {
    let mut builder = ModelBuilder::new();
    builder.set_object_type("System.Object");
    builder.add_exception_type("System.Exception", "System.Object");
    builder.add_exception_type("System.IO.IOException", "System.Exception");
    builder.add_exception_type("System.IO.PathTooLongException", "System.IO.IOException");

    let mut tree = SyntaxTree::new("Files.cs");
    let class = tree.add_node(None, SyntaxKind::Class, "Sample.Files", Span::new(1, 30));
    let open = tree.add_node(Some(class), SyntaxKind::Method, "Open", Span::new(2, 5));
    let open_body = tree.add_node(Some(open), SyntaxKind::Block, "", Span::new(2, 5));
    let throw = tree.add_node(
        Some(open_body),
        SyntaxKind::Throw,
        "throw new PathTooLongException()",
        Span::new(3, 3),
    );
    let caller = tree.add_node(Some(class), SyntaxKind::Method, "Load", Span::new(7, 20));
    let caller_body = tree.add_node(Some(caller), SyntaxKind::Block, "", Span::new(7, 20));
    let try_node = tree.add_node(Some(caller_body), SyntaxKind::Try, "", Span::new(8, 15));
    let try_block = tree.add_node(Some(try_node), SyntaxKind::Block, "", Span::new(8, 10));
    let call = tree.add_node(
        Some(try_block),
        SyntaxKind::Invocation,
        "Open(path)",
        Span::new(9, 9),
    );
    let catch = tree.add_node(Some(try_node), SyntaxKind::Catch, "", Span::new(11, 15));
    let decl = tree.add_node(
        Some(catch),
        SyntaxKind::CatchDeclaration,
        "System.IO.IOException",
        Span::new(11, 11),
    );
    tree.add_node(Some(catch), SyntaxKind::Block, "", Span::new(11, 15));

    let file = builder.add_tree(tree);
    builder.bind_symbol(file, open, "Sample.Files.Open(string)");
    builder.bind_symbol(file, call, "Sample.Files.Open(string)");
    builder.bind_thrown(file, throw, "System.IO.PathTooLongException");
    builder.bind_caught(file, decl, "System.IO.IOException");
    builder.declare_method("Sample.Files.Open(string)", file, open);
    let model = builder.build();

    let result = analyze_model(&model, &TratchConfig::default());
    assert_eq!(result.possible_exceptions.len(), 1);
    assert_eq!(result.possible_exceptions[0].handler_type_code, 1);
    assert_eq!(result.catches[0].features["NumSubsumptionHandler"], 1);
    // A descendant-typed clause would not close the reverse case; here the
    // ancestor does, so nothing lands in the other bucket.
    assert_eq!(result.catches[0].features["NumOtherHandler"], 0);
}

// The mirror case: catch (PathTooLongException) around a method throwing
// IOException. The clause is typed too narrowly.
#[test]
fn descendant_clause_cannot_close_ancestor_exception() {
    let mut builder = ModelBuilder::new();
    builder.set_object_type("System.Object");
    builder.add_exception_type("System.Exception", "System.Object");
    builder.add_exception_type("System.IO.IOException", "System.Exception");
    builder.add_exception_type("System.IO.PathTooLongException", "System.IO.IOException");

    let mut tree = SyntaxTree::new("Files.cs");
    let class = tree.add_node(None, SyntaxKind::Class, "Sample.Files", Span::new(1, 30));
    let method = tree.add_node(Some(class), SyntaxKind::Method, "Load", Span::new(2, 15));
    let body = tree.add_node(Some(method), SyntaxKind::Block, "", Span::new(2, 15));
    let try_node = tree.add_node(Some(body), SyntaxKind::Try, "", Span::new(3, 12));
    let try_block = tree.add_node(Some(try_node), SyntaxKind::Block, "", Span::new(3, 6));
    let throw = tree.add_node(
        Some(try_block),
        SyntaxKind::Throw,
        "throw new IOException()",
        Span::new(4, 4),
    );
    let catch = tree.add_node(Some(try_node), SyntaxKind::Catch, "", Span::new(7, 12));
    let decl = tree.add_node(
        Some(catch),
        SyntaxKind::CatchDeclaration,
        "System.IO.PathTooLongException",
        Span::new(7, 7),
    );
    tree.add_node(Some(catch), SyntaxKind::Block, "", Span::new(7, 12));

    let file = builder.add_tree(tree);
    builder.bind_thrown(file, throw, "System.IO.IOException");
    builder.bind_caught(file, decl, "System.IO.PathTooLongException");
    let model = builder.build();

    let result = analyze_model(&model, &TratchConfig::default());
    assert_eq!(result.possible_exceptions.len(), 1);
    assert_eq!(result.possible_exceptions[0].handler_type_code, 2);
    assert_eq!(result.catches[0].features["NumSupersumptionHandler"], 1);
}

// Protected call into a binary dependency: only documentation evidence is
// available.
#[test]
fn external_method_contributes_doc_semantic_evidence() {
    let mut builder = ModelBuilder::new();
    builder.set_object_type("System.Object");
    builder.add_exception_type("System.Exception", "System.Object");
    builder.add_exception_type("System.IO.IOException", "System.Exception");

    let mut tree = SyntaxTree::new("Reader.cs");
    let class = tree.add_node(None, SyntaxKind::Class, "Sample.Reader", Span::new(1, 20));
    let method = tree.add_node(Some(class), SyntaxKind::Method, "ReadAll", Span::new(2, 15));
    let body = tree.add_node(Some(method), SyntaxKind::Block, "", Span::new(2, 15));
    let try_node = tree.add_node(Some(body), SyntaxKind::Try, "", Span::new(3, 12));
    let try_block = tree.add_node(Some(try_node), SyntaxKind::Block, "", Span::new(3, 6));
    let call = tree.add_node(
        Some(try_block),
        SyntaxKind::Invocation,
        "File.ReadAllText(path)",
        Span::new(4, 4),
    );
    let catch = tree.add_node(Some(try_node), SyntaxKind::Catch, "", Span::new(7, 12));
    let decl = tree.add_node(
        Some(catch),
        SyntaxKind::CatchDeclaration,
        "System.IO.IOException",
        Span::new(7, 7),
    );
    tree.add_node(Some(catch), SyntaxKind::Block, "", Span::new(7, 12));

    let file = builder.add_tree(tree);
    builder.bind_symbol(file, call, "System.IO.File.ReadAllText(string)");
    builder.bind_caught(file, decl, "System.IO.IOException");
    builder.add_semantic_doc(
        "System.IO.File.ReadAllText(string)",
        r#"<exception cref="T:System.IO.IOException">An I/O error occurred.</exception>"#,
    );
    let model = builder.build();

    let result = analyze_model(&model, &TratchConfig::default());
    assert_eq!(result.possible_exceptions.len(), 1);
    let record = &result.possible_exceptions[0];
    assert_eq!(record.exception_type, "System.IO.IOException");
    assert_eq!(record.handler_type_code, 0);
    assert_eq!(record.is_doc_semantic, 1);
    assert_eq!(record.is_throw, 0);
    assert_eq!(record.level_found, 1);
    assert_eq!(result.stats["NumInvokedMethodsExtDocPresent"], 1);
}

#[test]
fn logging_wrappers_emit_without_a_subscriber() {
    use crate::logging::{log_error, log_info, log_warn};
    // No collector is installed under test; the macros must still be
    // callable.
    log_info("test info");
    log_warn("test warn");
    log_error("test error");
}

// A handler that wraps and rethrows: throw new Wrapped(e).
#[test]
fn wrap_and_rethrow_features() {
    let mut builder = ModelBuilder::new();
    builder.set_object_type("System.Object");
    builder.add_exception_type("System.Exception", "System.Object");

    let mut tree = SyntaxTree::new("Wrap.cs");
    let class = tree.add_node(None, SyntaxKind::Class, "Sample.Wrap", Span::new(1, 20));
    let method = tree.add_node(Some(class), SyntaxKind::Method, "Run", Span::new(2, 15));
    let body = tree.add_node(Some(method), SyntaxKind::Block, "", Span::new(2, 15));
    let try_node = tree.add_node(Some(body), SyntaxKind::Try, "", Span::new(3, 12));
    tree.add_node(Some(try_node), SyntaxKind::Block, "", Span::new(3, 5));
    let catch = tree.add_node(Some(try_node), SyntaxKind::Catch, "", Span::new(6, 12));
    let decl = tree.add_node(
        Some(catch),
        SyntaxKind::CatchDeclaration,
        "System.Exception",
        Span::new(6, 6),
    );
    tree.add_node(Some(decl), SyntaxKind::Identifier, "e", Span::new(6, 6));
    let catch_block = tree.add_node(Some(catch), SyntaxKind::Block, "", Span::new(6, 12));
    let wrap_throw = tree.add_node(
        Some(catch_block),
        SyntaxKind::Throw,
        "throw new AppException(e)",
        Span::new(7, 7),
    );
    let creation = tree.add_node(
        Some(wrap_throw),
        SyntaxKind::ObjectCreation,
        "new AppException(e)",
        Span::new(7, 7),
    );
    tree.add_node(Some(creation), SyntaxKind::Identifier, "e", Span::new(7, 7));

    let file = builder.add_tree(tree);
    builder.bind_caught(file, decl, "System.Exception");
    let model = builder.build();

    let result = analyze_model(&model, &TratchConfig::default());
    let record = &result.catches[0];
    assert_eq!(record.features["NumThrown"], 1);
    assert_eq!(record.features["NumThrowNew"], 1);
    assert_eq!(record.features["NumThrowWrapCurrentException"], 1);
    assert_eq!(record.features["CatchException"], 1);
    assert_eq!(record.features["EmptyBlock"], 0);
}
