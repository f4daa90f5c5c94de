//! C1 — type tags and dispatch.
//!
//! Base types, span types and temporal types form three small closed
//! enumerations. Everything here is a pure table lookup on the tag; no
//! runtime polymorphism is involved, matching the source library's design
//! (dispatch is by `match`, not by trait objects).

use std::fmt;

/// Tag for the codomain of a temporal value at a single timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Bool,
    Int,
    Float,
    Text,
    /// Native 2-D point, standing in for geometry/geography base types
    /// (see SPEC_FULL.md — the real geometry/projection stack is an
    /// external collaborator this crate does not implement).
    Geom2,
    /// Tag only: geography has no local implementation, it is named here
    /// so `is_spatial_basetype` and the catalog-facing dispatch stay total.
    Geog,
    /// Tag only: network point, no local implementation.
    NPoint,
}

/// Tag for a span's base type. Only ordered scalar types admit a span type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanType {
    Int,
    Float,
    Date,
    Timestamp,
}

/// Tag for a temporal value's subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempSubtype {
    Instant,
    Sequence,
    SequenceSet,
}

/// Tag for the named temporal type a base type is carried under (`TBOOL`,
/// `TINT`, ... in the source catalog). Orthogonal to [`TempSubtype`]: this
/// tag tracks *what varies over time*, the subtype tracks *how* (instant,
/// sequence, sequence-set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempType {
    TBool,
    TInt,
    TFloat,
    TText,
    TGeomPoint,
    TGeogPoint,
    TNPoint,
}

/// Interpolation mode of a sequence or sequence-set (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interpolation {
    Discrete,
    Step,
    Linear,
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Interpolation::Discrete => "Discrete",
            Interpolation::Step => "Step",
            Interpolation::Linear => "Linear",
        };
        f.write_str(s)
    }
}

impl BaseType {
    pub fn is_number_basetype(self) -> bool {
        matches!(self, BaseType::Int | BaseType::Float)
    }

    pub fn is_spatial_basetype(self) -> bool {
        matches!(self, BaseType::Geom2 | BaseType::Geog | BaseType::NPoint)
    }

    /// Whether linear interpolation between two samples of this base type
    /// is meaningful (I4).
    pub fn is_continuous_basetype(self) -> bool {
        matches!(
            self,
            BaseType::Int | BaseType::Float | BaseType::Geom2 | BaseType::Geog | BaseType::NPoint
        )
    }

    pub fn spantype_of_basetype(self) -> Option<SpanType> {
        match self {
            BaseType::Int => Some(SpanType::Int),
            BaseType::Float => Some(SpanType::Float),
            _ => None,
        }
    }

    /// Whether values of this base type are stored "by value" (fixed-size,
    /// copyable) as opposed to "by reference" (heap-allocated, variable
    /// size). Kept for parity with the source catalog even though this
    /// crate's `Value` enum does not need the distinction to allocate.
    pub fn basetype_byvalue(self) -> bool {
        matches!(self, BaseType::Bool | BaseType::Int | BaseType::Float)
    }

    /// Fixed storage width in bytes, or `None` for variable-length types.
    pub fn basetype_length(self) -> Option<usize> {
        match self {
            BaseType::Bool => Some(1),
            BaseType::Int => Some(8),
            BaseType::Float => Some(8),
            BaseType::Geom2 => Some(16),
            BaseType::Text | BaseType::Geog | BaseType::NPoint => None,
        }
    }

    /// The named temporal type a value of this base type is carried under.
    pub fn temptype_of_basetype(self) -> TempType {
        match self {
            BaseType::Bool => TempType::TBool,
            BaseType::Int => TempType::TInt,
            BaseType::Float => TempType::TFloat,
            BaseType::Text => TempType::TText,
            BaseType::Geom2 => TempType::TGeomPoint,
            BaseType::Geog => TempType::TGeogPoint,
            BaseType::NPoint => TempType::TNPoint,
        }
    }
}

impl TempType {
    /// The base type carried by this temporal type. Inverse of
    /// [`BaseType::temptype_of_basetype`].
    pub fn basetype_of_temptype(self) -> BaseType {
        match self {
            TempType::TBool => BaseType::Bool,
            TempType::TInt => BaseType::Int,
            TempType::TFloat => BaseType::Float,
            TempType::TText => BaseType::Text,
            TempType::TGeomPoint => BaseType::Geom2,
            TempType::TGeogPoint => BaseType::Geog,
            TempType::TNPoint => BaseType::NPoint,
        }
    }
}

impl SpanType {
    pub fn basetype_of_spantype(self) -> BaseType {
        match self {
            SpanType::Int => BaseType::Int,
            SpanType::Float => BaseType::Float,
            SpanType::Date | SpanType::Timestamp => BaseType::Int, // dates/timestamps have no scalar basetype of their own
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_and_spatial_are_disjoint() {
        for bt in [
            BaseType::Bool,
            BaseType::Int,
            BaseType::Float,
            BaseType::Text,
            BaseType::Geom2,
            BaseType::Geog,
            BaseType::NPoint,
        ] {
            assert!(!(bt.is_number_basetype() && bt.is_spatial_basetype()));
        }
    }

    #[test]
    fn continuous_basetypes_match_i4() {
        assert!(BaseType::Int.is_continuous_basetype());
        assert!(BaseType::Float.is_continuous_basetype());
        assert!(BaseType::Geom2.is_continuous_basetype());
        assert!(!BaseType::Bool.is_continuous_basetype());
        assert!(!BaseType::Text.is_continuous_basetype());
    }

    #[test]
    fn only_ordered_scalars_have_a_spantype() {
        assert_eq!(BaseType::Int.spantype_of_basetype(), Some(SpanType::Int));
        assert_eq!(BaseType::Float.spantype_of_basetype(), Some(SpanType::Float));
        assert_eq!(BaseType::Bool.spantype_of_basetype(), None);
        assert_eq!(BaseType::Geom2.spantype_of_basetype(), None);
    }

    #[test]
    fn temptype_and_basetype_round_trip() {
        for bt in [
            BaseType::Bool,
            BaseType::Int,
            BaseType::Float,
            BaseType::Text,
            BaseType::Geom2,
            BaseType::Geog,
            BaseType::NPoint,
        ] {
            let tt = bt.temptype_of_basetype();
            assert_eq!(tt.basetype_of_temptype(), bt);
        }
    }
}
