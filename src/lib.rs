//! A piecewise-temporal algebra engine: values that vary over time,
//! represented as instants, discrete/step/linear sequences and
//! sequence-sets, with lifting, restriction, modification, tiling and
//! aggregation built on top (spec §§2-4).

pub mod errors;
pub mod point;
pub mod span;
pub mod span_set;
pub mod temporal;
pub mod types;
pub mod value;

pub use errors::{Result, TemporalError};
pub use point::Point2;
pub use span::{Date, DateSpan, FloatSpan, IntSpan, Span, SpanBound, TstzSpan};
pub use span_set::{FloatSpanSet, IntSpanSet, SpanSet, TstzSpanSet};
pub use temporal::{TBox, TInstant, TSequence, TSequenceSet, Temporal};
pub use types::{BaseType, Interpolation, SpanType, TempSubtype, TempType};
pub use value::Value;
