//! C2 — span algebra: half-open spans `[l, u)` over any ordered base type.
//!
//! Canonicalization at construction (for integer and date bounds) lets every
//! downstream component test membership and compute intersections by plain
//! comparisons, without case-splitting on bound inclusivity (spec §4.C2
//! rationale).

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, Utc};

use crate::errors::{Result, TemporalError};

/// A day-granularity date, kept distinct from `DateTime<Utc>` so that date
/// spans (canonicalized, like integers) and timestamptz spans (not
/// canonicalized) can both be exercised, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date(pub i32);

/// A bound type usable in a [`Span`].
pub trait SpanBound: Copy + PartialOrd + fmt::Debug {
    /// Integer and date bounds are canonicalized to half-open `[l, u)`
    /// form at construction; float and timestamptz bounds keep whatever
    /// inclusivity the caller supplied on both ends.
    const CANONICAL: bool;

    /// Successor value, used only for canonicalization.
    fn step(self) -> Self;

    /// Used for distance/width computations, which are always reported as
    /// `f64` regardless of the underlying bound type.
    fn as_f64(self) -> f64;
}

impl SpanBound for i64 {
    const CANONICAL: bool = true;
    fn step(self) -> Self {
        self + 1
    }
    fn as_f64(self) -> f64 {
        self as f64
    }
}

impl SpanBound for Date {
    const CANONICAL: bool = true;
    fn step(self) -> Self {
        Date(self.0 + 1)
    }
    fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl SpanBound for f64 {
    const CANONICAL: bool = false;
    fn step(self) -> Self {
        self
    }
    fn as_f64(self) -> f64 {
        self
    }
}

impl SpanBound for DateTime<Utc> {
    const CANONICAL: bool = false;
    fn step(self) -> Self {
        self
    }
    fn as_f64(self) -> f64 {
        self.timestamp_micros() as f64
    }
}

/// Half-open span `⟨lower, upper, lower_inc, upper_inc⟩` over an ordered
/// base type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span<T: SpanBound> {
    lower: T,
    upper: T,
    lower_inc: bool,
    upper_inc: bool,
}

impl<T: SpanBound> Span<T> {
    /// Constructs a span, canonicalizing integer/date bounds to `[l, u)`.
    /// Rejects empty spans (equal bounds with at least one exclusive).
    pub fn new(mut lower: T, mut upper: T, mut lower_inc: bool, mut upper_inc: bool) -> Result<Self> {
        if T::CANONICAL {
            if !lower_inc {
                lower = lower.step();
                lower_inc = true;
            }
            if upper_inc {
                upper = upper.step();
                upper_inc = false;
            }
        }
        let empty = match lower.partial_cmp(&upper) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => !(lower_inc && upper_inc),
            Some(Ordering::Less) => false,
            None => return Err(TemporalError::InvalidInput("unordered span bounds".into())),
        };
        if empty {
            return Err(TemporalError::InvalidInput(
                "span lower/upper bounds describe an empty interval".into(),
            ));
        }
        Ok(Self {
            lower,
            upper,
            lower_inc,
            upper_inc,
        })
    }

    pub fn lower(&self) -> T {
        self.lower
    }

    pub fn upper(&self) -> T {
        self.upper
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn contains(&self, v: T) -> bool {
        let above_lower = match v.partial_cmp(&self.lower) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => self.lower_inc,
            _ => false,
        };
        let below_upper = match v.partial_cmp(&self.upper) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.upper_inc,
            _ => false,
        };
        above_lower && below_upper
    }

    pub fn contains_span(&self, other: &Self) -> bool {
        let lower_ok = match self.lower.partial_cmp(&other.lower) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.lower_inc || !other.lower_inc,
            _ => false,
        };
        let upper_ok = match self.upper.partial_cmp(&other.upper) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => self.upper_inc || !other.upper_inc,
            _ => false,
        };
        lower_ok && upper_ok
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        let left_ok = match self.lower.partial_cmp(&other.upper) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => self.lower_inc && other.upper_inc,
            _ => false,
        };
        let right_ok = match other.lower.partial_cmp(&self.upper) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => other.lower_inc && self.upper_inc,
            _ => false,
        };
        left_ok && right_ok
    }

    /// Whether the two spans touch with no gap and no overlap.
    pub fn adjacent(&self, other: &Self) -> bool {
        (self.upper == other.lower && self.upper_inc != other.lower_inc)
            || (other.upper == self.lower && other.upper_inc != self.lower_inc)
    }

    pub fn is_left(&self, other: &Self) -> bool {
        match self.upper.partial_cmp(&other.lower) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => !(self.upper_inc && other.lower_inc),
            _ => false,
        }
    }

    pub fn is_right(&self, other: &Self) -> bool {
        other.is_left(self)
    }

    /// `Ordering::Equal` only for bit-identical bounds; spans otherwise
    /// order by `(lower, lower_inc, upper, upper_inc)` per spec §4.C2.
    pub fn compare(&self, other: &Self) -> Ordering {
        match self.lower.partial_cmp(&other.lower) {
            Some(Ordering::Equal) | None => {}
            Some(o) => return o,
        }
        // An inclusive lower bound sorts before an exclusive one at the
        // same point (it starts "earlier").
        match other.lower_inc.cmp(&self.lower_inc) {
            Ordering::Equal => {}
            o => return o,
        }
        match self.upper.partial_cmp(&other.upper) {
            Some(Ordering::Equal) | None => {}
            Some(o) => return o,
        }
        self.upper_inc.cmp(&other.upper_inc)
    }

    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.overlaps(other) {
            return None;
        }
        let (lower, lower_inc) = match self.lower.partial_cmp(&other.lower) {
            Some(Ordering::Greater) => (self.lower, self.lower_inc),
            Some(Ordering::Less) => (other.lower, other.lower_inc),
            _ => (self.lower, self.lower_inc && other.lower_inc),
        };
        let (upper, upper_inc) = match self.upper.partial_cmp(&other.upper) {
            Some(Ordering::Less) => (self.upper, self.upper_inc),
            Some(Ordering::Greater) => (other.upper, other.upper_inc),
            _ => (self.upper, self.upper_inc && other.upper_inc),
        };
        Span::new(lower, upper, lower_inc, upper_inc).ok()
    }

    /// Hull of `self` and `other` (smallest span containing both), used by
    /// `span_expand`.
    pub fn hull(&self, other: &Self) -> Self {
        let (lower, lower_inc) = match self.lower.partial_cmp(&other.lower) {
            Some(Ordering::Less) => (self.lower, self.lower_inc),
            Some(Ordering::Greater) => (other.lower, other.lower_inc),
            _ => (self.lower, self.lower_inc || other.lower_inc),
        };
        let (upper, upper_inc) = match self.upper.partial_cmp(&other.upper) {
            Some(Ordering::Greater) => (self.upper, self.upper_inc),
            Some(Ordering::Less) => (other.upper, other.upper_inc),
            _ => (self.upper, self.upper_inc || other.upper_inc),
        };
        Span::new(lower, upper, lower_inc, upper_inc)
            .expect("hull of two valid spans is always non-empty")
    }

    pub fn expand_with_value(&self, v: T) -> Self {
        let singleton = Span::new(v, v, true, true);
        match singleton {
            Ok(s) => self.hull(&s),
            // Canonical bound types cannot build a singleton via `new`
            // (canonicalization would make it empty); widen bounds by hand.
            Err(_) => {
                let (lower, lower_inc) = match v.partial_cmp(&self.lower) {
                    Some(Ordering::Less) => (v, true),
                    _ => (self.lower, self.lower_inc),
                };
                let (upper, upper_inc) = match v.partial_cmp(&self.upper) {
                    Some(Ordering::Greater) => (v, true),
                    _ => (self.upper, self.upper_inc),
                };
                Span::new(lower, upper, lower_inc, upper_inc)
                    .expect("expanding a valid span by a value is always non-empty")
            }
        }
    }

    pub fn width(&self) -> f64 {
        self.upper.as_f64() - self.lower.as_f64()
    }
}

impl Span<f64> {
    pub fn distance_to_value(&self, v: f64) -> f64 {
        if self.contains(v) {
            0.0
        } else if v < self.lower {
            self.lower - v
        } else {
            v - self.upper
        }
    }

    pub fn distance_to_span(&self, other: &Self) -> f64 {
        if self.overlaps(other) {
            0.0
        } else if self.is_left(other) {
            other.lower - self.upper
        } else {
            self.lower - other.upper
        }
    }
}

impl Span<i64> {
    pub fn distance_to_value(&self, v: i64) -> i64 {
        if self.contains(v) {
            0
        } else if v < self.lower {
            self.lower - v
        } else {
            v - self.upper - 1
        }
    }

    pub fn distance_to_span(&self, other: &Self) -> i64 {
        if self.overlaps(other) {
            0
        } else if self.is_left(other) {
            other.lower - self.upper
        } else {
            self.lower - other.upper
        }
    }
}

impl Span<DateTime<Utc>> {
    pub fn duration(&self) -> Duration {
        self.upper - self.lower
    }
}

pub type IntSpan = Span<i64>;
pub type FloatSpan = Span<f64>;
pub type DateSpan = Span<Date>;
pub type TstzSpan = Span<DateTime<Utc>>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn p2_span_canonicalization() {
        // "(12, 67]" canonicalizes to "[13, 68)"
        let s = IntSpan::new(12, 67, false, true).unwrap();
        assert_eq!(s.lower(), 13);
        assert_eq!(s.upper(), 68);
        assert!(s.lower_inc());
        assert!(!s.upper_inc());
        for v in 13..68 {
            assert!(s.contains(v), "{v} should be contained");
        }
        assert!(!s.contains(12));
        assert!(!s.contains(68));
    }

    #[test]
    fn empty_span_rejected() {
        assert!(FloatSpan::new(1.0, 1.0, true, false).is_err());
        assert!(FloatSpan::new(1.0, 1.0, false, true).is_err());
        assert!(FloatSpan::new(1.0, 1.0, true, true).is_ok());
        // canonicalizes to [5, 6), which is non-empty
        assert!(IntSpan::new(5, 5, true, true).is_ok());
        // canonicalizes to [5, 5), which is empty
        assert!(IntSpan::new(5, 5, false, true).is_err());
    }

    #[test]
    fn float_spans_keep_explicit_bounds() {
        let s = FloatSpan::new(1.0, 2.0, false, true).unwrap();
        assert!(!s.lower_inc());
        assert!(s.upper_inc());
        assert!(s.contains(2.0));
        assert!(!s.contains(1.0));
    }

    #[test]
    fn intersection_and_adjacency() {
        let a = IntSpan::new(0, 10, true, false).unwrap();
        let b = IntSpan::new(5, 15, true, false).unwrap();
        let i = a.intersection(&b).unwrap();
        assert_eq!((i.lower(), i.upper()), (5, 10));

        let c = IntSpan::new(10, 20, true, false).unwrap();
        assert!(a.adjacent(&c));
        assert!(a.is_left(&c));
    }

    #[test]
    fn tstz_span_not_canonicalized() {
        let t0 = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();
        let s = TstzSpan::new(t0, t1, true, true).unwrap();
        assert!(s.lower_inc() && s.upper_inc());
    }
}
