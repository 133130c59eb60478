//! The type oracle: the symbol/type resolution surface consumed from the
//! language front end.
//!
//! Every lookup returns an `Option`: a node that does not bind, a type
//! without a known base, or a method without a declaration are all normal
//! data values, never errors. The discovery engine degrades to textual
//! identities and documentation evidence when resolution fails.

use crate::syntax::{FileId, NodeId};
use serde::{Deserialize, Serialize};

/// Interned handle to a named type. Handle equality is type equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeHandle(pub u32);

impl TypeHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Symbol and type resolution provided by the front end.
///
/// Implementations must be cheap to query and shareable across rayon
/// workers; all methods take `&self`.
pub trait TypeOracle: Sync {
    /// Resolve an invocation, object creation, or declaration node to its
    /// stable, overload-disambiguated symbol key.
    fn resolve(&self, file: FileId, node: NodeId) -> Option<String>;

    /// Locate the in-source declaration of a resolved method.
    fn declaration_of(&self, key: &str) -> Option<(FileId, NodeId)>;

    /// Documentation XML attached to the resolved symbol (covers binary
    /// dependencies whose source is unavailable).
    fn doc_semantic_of(&self, key: &str) -> Option<&str>;

    /// Documentation XML from the declaration's own leading doc comment.
    fn doc_syntax_of(&self, key: &str) -> Option<&str>;

    /// The exception type produced by a throw statement's expression.
    fn thrown_type_of(&self, file: FileId, throw_node: NodeId) -> Option<TypeHandle>;

    /// The type declared by a catch clause's declaration node.
    fn caught_type_of(&self, file: FileId, catch_decl: NodeId) -> Option<TypeHandle>;

    /// The declared type name of a local referenced by an identifier node.
    fn local_type_name_of(&self, file: FileId, ident: NodeId) -> Option<&str>;

    /// Look a type up by its full name.
    fn type_named(&self, name: &str) -> Option<TypeHandle>;

    /// Direct base type, if known.
    fn base_type_of(&self, ty: TypeHandle) -> Option<TypeHandle>;

    /// The root object type, where base-chain walks stop.
    fn object_type(&self) -> Option<TypeHandle>;

    /// Full name of a type.
    fn type_name(&self, ty: TypeHandle) -> &str;

    /// Short (metadata) name of a type, without namespace.
    fn metadata_name(&self, ty: TypeHandle) -> &str;
}
