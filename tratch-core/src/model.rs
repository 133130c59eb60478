//! The project model: everything the language front end hands over for one
//! analysis run.
//!
//! A model bundles the per-file syntax trees with the semantic facts the
//! discovery engine needs: an interned type table with base links, per-node
//! symbol and type bindings, the declaration table for methods whose source
//! is in the project, and documentation XML for symbols resolved against
//! binary dependencies. The whole bundle is one serde document, loaded from
//! JSON, and implements [`TypeOracle`] directly.
//!
//! [`ModelBuilder`] constructs models in-process; tests use it to assemble
//! fixtures without a front end.

use crate::error::{IoResultExt, TratchError, TratchResult};
use crate::oracle::{TypeHandle, TypeOracle};
use crate::syntax::{FileId, NodeId, SyntaxTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// One entry of the interned type table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeData {
    /// Full name, e.g. `System.IO.IOException`.
    pub name: String,
    /// Short name without namespace, e.g. `IOException`.
    pub metadata_name: String,
    /// Index of the direct base type, if known.
    pub base: Option<u32>,
}

/// Per-file node bindings, parallel to the model's tree list.
///
/// Keys are node indices within that file's arena. A node absent from a map
/// simply did not bind; that is data, not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileBindings {
    /// Invocation/creation/declaration node to resolved symbol key.
    #[serde(default)]
    pub symbols: HashMap<u32, String>,
    /// Throw node to the full name of the thrown exception type.
    #[serde(default)]
    pub thrown: HashMap<u32, String>,
    /// Catch declaration node to the full name of the caught type.
    #[serde(default)]
    pub caught: HashMap<u32, String>,
    /// Identifier node to the declared type name of the local it references.
    #[serde(default)]
    pub locals: HashMap<u32, String>,
}

/// An in-project method declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub file: u32,
    pub node: u32,
    /// Documentation XML from the declaration's leading doc comment.
    #[serde(default)]
    pub doc_syntax: Option<String>,
}

/// The front end's complete hand-over for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectModel {
    trees: Vec<SyntaxTree>,
    types: Vec<TypeData>,
    object_type: Option<u32>,
    bindings: Vec<FileBindings>,
    /// Symbol key to in-project declaration.
    methods: HashMap<String, MethodDecl>,
    /// Symbol key to documentation XML for symbols without in-project source.
    #[serde(default)]
    semantic_docs: HashMap<String, String>,
    /// Full type name to table index. Rebuilt after deserialization.
    #[serde(skip)]
    type_index: HashMap<String, u32>,
}

impl ProjectModel {
    pub fn trees(&self) -> &[SyntaxTree] {
        &self.trees
    }

    pub fn tree(&self, file: FileId) -> &SyntaxTree {
        &self.trees[file.index()]
    }

    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    fn reindex(&mut self) {
        self.type_index = self
            .types
            .iter()
            .enumerate()
            .map(|(i, t)| (t.name.clone(), i as u32))
            .collect();
    }

    fn bindings_for(&self, file: FileId) -> Option<&FileBindings> {
        self.bindings.get(file.index())
    }
}

impl TypeOracle for ProjectModel {
    fn resolve(&self, file: FileId, node: NodeId) -> Option<String> {
        self.bindings_for(file)?.symbols.get(&node.0).cloned()
    }

    fn declaration_of(&self, key: &str) -> Option<(FileId, NodeId)> {
        self.methods
            .get(key)
            .map(|decl| (FileId(decl.file), NodeId(decl.node)))
    }

    fn doc_semantic_of(&self, key: &str) -> Option<&str> {
        self.semantic_docs.get(key).map(String::as_str)
    }

    fn doc_syntax_of(&self, key: &str) -> Option<&str> {
        self.methods.get(key)?.doc_syntax.as_deref()
    }

    fn thrown_type_of(&self, file: FileId, throw_node: NodeId) -> Option<TypeHandle> {
        let name = self.bindings_for(file)?.thrown.get(&throw_node.0)?;
        self.type_named(name)
    }

    fn caught_type_of(&self, file: FileId, catch_decl: NodeId) -> Option<TypeHandle> {
        let name = self.bindings_for(file)?.caught.get(&catch_decl.0)?;
        self.type_named(name)
    }

    fn local_type_name_of(&self, file: FileId, ident: NodeId) -> Option<&str> {
        self.bindings_for(file)?
            .locals
            .get(&ident.0)
            .map(String::as_str)
    }

    fn type_named(&self, name: &str) -> Option<TypeHandle> {
        self.type_index.get(name).copied().map(TypeHandle)
    }

    fn base_type_of(&self, ty: TypeHandle) -> Option<TypeHandle> {
        self.types[ty.index()].base.map(TypeHandle)
    }

    fn object_type(&self) -> Option<TypeHandle> {
        self.object_type.map(TypeHandle)
    }

    fn type_name(&self, ty: TypeHandle) -> &str {
        &self.types[ty.index()].name
    }

    fn metadata_name(&self, ty: TypeHandle) -> &str {
        &self.types[ty.index()].metadata_name
    }
}

/// Assembles a [`ProjectModel`] in process.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: ProjectModel,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern_type(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.model.type_index.get(name) {
            return index;
        }
        let index = self.model.types.len() as u32;
        self.model.types.push(TypeData {
            name: name.to_owned(),
            metadata_name: name.rsplit('.').next().unwrap_or(name).to_owned(),
            base: None,
        });
        self.model.type_index.insert(name.to_owned(), index);
        index
    }

    /// Intern `name` as the root object type.
    pub fn set_object_type(&mut self, name: &str) -> TypeHandle {
        let index = self.intern_type(name);
        self.model.object_type = Some(index);
        TypeHandle(index)
    }

    /// Intern an exception type with a base link. The base is interned too
    /// if it was not seen yet.
    pub fn add_exception_type(&mut self, name: &str, base_name: &str) -> TypeHandle {
        let base = self.intern_type(base_name);
        let index = self.intern_type(name);
        self.model.types[index as usize].base = Some(base);
        TypeHandle(index)
    }

    /// Add a file's syntax tree together with an empty binding table.
    pub fn add_tree(&mut self, tree: SyntaxTree) -> FileId {
        let id = FileId(self.model.trees.len() as u32);
        self.model.trees.push(tree);
        self.model.bindings.push(FileBindings::default());
        id
    }

    pub fn bind_symbol(&mut self, file: FileId, node: NodeId, key: impl Into<String>) {
        self.model.bindings[file.index()]
            .symbols
            .insert(node.0, key.into());
    }

    pub fn bind_thrown(&mut self, file: FileId, node: NodeId, type_name: impl Into<String>) {
        self.model.bindings[file.index()]
            .thrown
            .insert(node.0, type_name.into());
    }

    pub fn bind_caught(&mut self, file: FileId, node: NodeId, type_name: impl Into<String>) {
        self.model.bindings[file.index()]
            .caught
            .insert(node.0, type_name.into());
    }

    pub fn bind_local(&mut self, file: FileId, node: NodeId, type_name: impl Into<String>) {
        self.model.bindings[file.index()]
            .locals
            .insert(node.0, type_name.into());
    }

    pub fn declare_method(&mut self, key: impl Into<String>, file: FileId, node: NodeId) {
        self.model.methods.insert(
            key.into(),
            MethodDecl {
                file: file.0,
                node: node.0,
                doc_syntax: None,
            },
        );
    }

    pub fn declare_method_with_doc(
        &mut self,
        key: impl Into<String>,
        file: FileId,
        node: NodeId,
        doc_syntax: impl Into<String>,
    ) {
        self.model.methods.insert(
            key.into(),
            MethodDecl {
                file: file.0,
                node: node.0,
                doc_syntax: Some(doc_syntax.into()),
            },
        );
    }

    /// Attach documentation XML to a symbol resolved against a binary
    /// dependency.
    pub fn add_semantic_doc(&mut self, key: impl Into<String>, xml: impl Into<String>) {
        self.model.semantic_docs.insert(key.into(), xml.into());
    }

    pub fn build(self) -> ProjectModel {
        self.model
    }
}

/// Load a model from a front-end JSON file.
pub fn load_model(path: &Path) -> TratchResult<ProjectModel> {
    let content = fs::read_to_string(path).with_path(path)?;
    let mut model: ProjectModel = serde_json::from_str(&content)
        .map_err(|e| TratchError::model(path, format!("invalid model JSON: {e}")))?;
    if model.bindings.len() != model.trees.len() {
        return Err(TratchError::model(
            path,
            format!(
                "binding table count {} does not match tree count {}",
                model.bindings.len(),
                model.trees.len()
            ),
        ));
    }
    for ty in &model.types {
        if let Some(base) = ty.base {
            if base as usize >= model.types.len() {
                return Err(TratchError::model(
                    path,
                    format!("type {} has out-of-range base index {base}", ty.name),
                ));
            }
        }
    }
    model.reindex();
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{Span, SyntaxKind};

    #[test]
    fn builder_interns_types_once() {
        let mut builder = ModelBuilder::new();
        builder.set_object_type("System.Object");
        let a = builder.add_exception_type("NS.E", "System.Object");
        let b = builder.add_exception_type("NS.E", "System.Object");
        assert_eq!(a, b);
        let model = builder.build();
        assert_eq!(model.type_named("NS.E"), Some(a));
        assert_eq!(model.metadata_name(a), "E");
    }

    #[test]
    fn bindings_answer_oracle_queries() {
        let mut builder = ModelBuilder::new();
        builder.set_object_type("System.Object");
        builder.add_exception_type("System.Exception", "System.Object");
        builder.add_exception_type("NS.E", "System.Exception");

        let mut tree = SyntaxTree::new("A.cs");
        let class = tree.add_node(None, SyntaxKind::Class, "NS.A", Span::new(1, 10));
        let method = tree.add_node(Some(class), SyntaxKind::Method, "m", Span::new(2, 9));
        let body = tree.add_node(Some(method), SyntaxKind::Block, "", Span::new(2, 9));
        let call = tree.add_node(Some(body), SyntaxKind::Invocation, "b.Run()", Span::new(3, 3));
        let throw = tree.add_node(Some(body), SyntaxKind::Throw, "throw new E()", Span::new(4, 4));

        let file = builder.add_tree(tree);
        builder.bind_symbol(file, method, "NS.A.m()");
        builder.bind_symbol(file, call, "NS.B.Run()");
        builder.bind_thrown(file, throw, "NS.E");
        builder.declare_method("NS.A.m()", file, method);
        builder.add_semantic_doc("NS.B.Run()", "<exception cref=\"T:NS.E\"/>");

        let model = builder.build();
        assert_eq!(model.resolve(file, call).as_deref(), Some("NS.B.Run()"));
        assert_eq!(model.declaration_of("NS.A.m()"), Some((file, method)));
        assert!(model.declaration_of("NS.B.Run()").is_none());
        assert!(model.doc_semantic_of("NS.B.Run()").is_some());
        let thrown = model.thrown_type_of(file, throw).unwrap();
        assert_eq!(model.type_name(thrown), "NS.E");
        assert!(model.resolve(file, body).is_none());
    }

    #[test]
    fn model_round_trips_through_json() {
        let mut builder = ModelBuilder::new();
        builder.set_object_type("System.Object");
        builder.add_exception_type("NS.E", "System.Object");
        let mut tree = SyntaxTree::new("A.cs");
        tree.add_node(None, SyntaxKind::Class, "NS.A", Span::new(1, 5));
        builder.add_tree(tree);
        let model = builder.build();

        let json = serde_json::to_string(&model).unwrap();
        let dir = std::env::temp_dir().join(format!("tratch_model_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");
        std::fs::write(&path, json).unwrap();

        let loaded = load_model(&path).unwrap();
        assert_eq!(loaded.trees().len(), 1);
        // The name index is rebuilt on load, not serialized.
        assert!(loaded.type_named("NS.E").is_some());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn mismatched_binding_tables_are_rejected() {
        let dir = std::env::temp_dir().join(format!("tratch_model_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("model.json");
        std::fs::write(
            &path,
            r#"{"trees":[],"types":[],"object_type":null,"bindings":[{}],"methods":{}}"#,
        )
        .unwrap();
        let err = load_model(&path).unwrap_err();
        assert!(matches!(err, TratchError::Model { .. }));
        std::fs::remove_dir_all(&dir).ok();
    }
}
