//! Handler classification: how a caught type relates to a thrown type.
//!
//! The classification drives closure semantics: only `Specific` and
//! `Subsumption` mean the catch clause actually receives the exception and
//! stops its propagation.

use crate::oracle::{TypeHandle, TypeOracle};

/// Relationship between a caught type and a possibly-thrown type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Caught and thrown are the same type.
    Specific,
    /// Caught type is a strict ancestor of the thrown type: the clause
    /// catches it.
    Subsumption,
    /// Thrown type is a strict ancestor of the caught type: the clause does
    /// not catch it.
    Supersumption,
    /// Unrelated branches of the type tree.
    Unrelated,
    /// The thrown type could not be resolved.
    NoType,
    /// The catch clause declares no resolvable type.
    NoCaught,
}

impl HandlerKind {
    /// Numeric code used in emitted records.
    pub fn code(self) -> i8 {
        match self {
            HandlerKind::Specific => 0,
            HandlerKind::Subsumption => 1,
            HandlerKind::Supersumption => 2,
            HandlerKind::Unrelated => 3,
            HandlerKind::NoType => -8,
            HandlerKind::NoCaught => -9,
        }
    }
}

/// Whether `candidate` is a strict ancestor of `reference`.
///
/// Walks `reference`'s base-type chain looking for `candidate`, stopping at
/// the root object type: `catch (object)` never subsumes an exception this
/// way, but the chain walk itself may pass through intermediate bases.
pub fn is_super_type(
    oracle: &dyn TypeOracle,
    candidate: TypeHandle,
    reference: TypeHandle,
) -> bool {
    let object = oracle.object_type();
    if Some(candidate) == object {
        return false;
    }
    let mut current = reference;
    loop {
        if Some(current) == object {
            return false;
        }
        match oracle.base_type_of(current) {
            Some(base) if base == candidate => return true,
            Some(base) => current = base,
            None => return false,
        }
    }
}

/// Classify a (caught, thrown) pair.
pub fn classify(
    oracle: &dyn TypeOracle,
    caught: Option<TypeHandle>,
    thrown: Option<TypeHandle>,
) -> HandlerKind {
    let Some(caught) = caught else {
        return HandlerKind::NoCaught;
    };
    let Some(thrown) = thrown else {
        return HandlerKind::NoType;
    };

    if caught == thrown || same_type_by_shape(oracle, caught, thrown) {
        HandlerKind::Specific
    } else if is_super_type(oracle, caught, thrown) {
        HandlerKind::Subsumption
    } else if is_super_type(oracle, thrown, caught) {
        HandlerKind::Supersumption
    } else {
        HandlerKind::Unrelated
    }
}

/// Fallback identity test: same base type and same metadata name. Covers
/// the front end handing out distinct handles for one type observed through
/// different compilations.
fn same_type_by_shape(oracle: &dyn TypeOracle, a: TypeHandle, b: TypeHandle) -> bool {
    match (oracle.base_type_of(a), oracle.base_type_of(b)) {
        (Some(base_a), Some(base_b)) => {
            base_a == base_b && oracle.metadata_name(a) == oracle.metadata_name(b)
        }
        _ => false,
    }
}

/// Whether a catch clause with `caught` actually catches `thrown`, closing
/// the flow so it does not propagate further.
pub fn is_closeable(
    oracle: &dyn TypeOracle,
    caught: Option<TypeHandle>,
    thrown: Option<TypeHandle>,
) -> bool {
    matches!(
        classify(oracle, caught, thrown),
        HandlerKind::Specific | HandlerKind::Subsumption
    )
}
