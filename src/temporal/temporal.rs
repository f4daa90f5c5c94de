//! C3 — the top-level temporal value: one of the four subtypes of spec §3.

use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::span::TstzSpan;
use crate::span_set::TstzSpanSet;
use crate::types::{Interpolation, TempSubtype};
use crate::value::Value;

use super::instant::TInstant;
use super::sequence::TSequence;
use super::sequence_set::TSequenceSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Temporal {
    Instant(TInstant),
    Sequence(TSequence),
    SequenceSet(TSequenceSet),
}

impl Temporal {
    pub fn subtype(&self) -> TempSubtype {
        match self {
            Temporal::Instant(_) => TempSubtype::Instant,
            Temporal::Sequence(_) => TempSubtype::Sequence,
            Temporal::SequenceSet(_) => TempSubtype::SequenceSet,
        }
    }

    pub fn interpolation(&self) -> Interpolation {
        match self {
            Temporal::Instant(_) => Interpolation::Discrete,
            Temporal::Sequence(s) => s.interpolation(),
            Temporal::SequenceSet(s) => s.interpolation(),
        }
    }

    pub fn lower(&self) -> DateTime<Utc> {
        match self {
            Temporal::Instant(i) => i.t(),
            Temporal::Sequence(s) => s.lower(),
            Temporal::SequenceSet(s) => s.lower(),
        }
    }

    pub fn upper(&self) -> DateTime<Utc> {
        match self {
            Temporal::Instant(i) => i.t(),
            Temporal::Sequence(s) => s.upper(),
            Temporal::SequenceSet(s) => s.upper(),
        }
    }

    pub fn lower_inc(&self) -> bool {
        match self {
            Temporal::Instant(_) => true,
            Temporal::Sequence(s) => s.lower_inc(),
            Temporal::SequenceSet(s) => s.sequences().first().unwrap().lower_inc(),
        }
    }

    pub fn upper_inc(&self) -> bool {
        match self {
            Temporal::Instant(_) => true,
            Temporal::Sequence(s) => s.upper_inc(),
            Temporal::SequenceSet(s) => s.sequences().last().unwrap().upper_inc(),
        }
    }

    /// The span of time on which this value is defined, as a span-set
    /// (always a single span for instant/sequence, possibly many for a
    /// sequence-set).
    pub fn time(&self) -> Result<TstzSpanSet> {
        let spans = match self {
            Temporal::Instant(i) => vec![TstzSpan::new(i.t(), i.t(), true, true)?],
            Temporal::Sequence(s) => {
                vec![TstzSpan::new(s.lower(), s.upper(), s.lower_inc(), s.upper_inc())?]
            }
            Temporal::SequenceSet(ss) => ss
                .sequences()
                .iter()
                .map(|s| TstzSpan::new(s.lower(), s.upper(), s.lower_inc(), s.upper_inc()))
                .collect::<Result<Vec<_>>>()?,
        };
        TstzSpanSet::new(spans)
    }

    pub fn value_at(&self, t: DateTime<Utc>) -> Result<Option<Value>> {
        match self {
            Temporal::Instant(i) => Ok((i.t() == t).then(|| i.value().clone())),
            Temporal::Sequence(s) => s.value_at(t),
            Temporal::SequenceSet(s) => s.value_at(t),
        }
    }

    pub fn instants(&self) -> Vec<&TInstant> {
        match self {
            Temporal::Instant(i) => vec![i],
            Temporal::Sequence(s) => s.instants().iter().collect(),
            Temporal::SequenceSet(s) => s.sequences().iter().flat_map(|seq| seq.instants()).collect(),
        }
    }

    pub fn num_instants(&self) -> usize {
        self.instants().len()
    }

    pub fn start_value(&self) -> &Value {
        self.instants().first().unwrap().value()
    }

    pub fn end_value(&self) -> &Value {
        self.instants().last().unwrap().value()
    }

    /// All distinct values taken by this temporal value, in first-seen
    /// order.
    pub fn values(&self) -> Vec<Value> {
        let mut out: Vec<Value> = Vec::new();
        for i in self.instants() {
            if !out.contains(i.value()) {
                out.push(i.value().clone());
            }
        }
        out
    }

    /// Whether `self` and `other`'s time spans overlap, required by every
    /// binary lift/restriction operation (spec §4.C5: "the bounding-periods
    /// must overlap; otherwise return empty").
    pub fn bounding_period_overlaps(&self, other: &Temporal) -> bool {
        self.lower() <= other.upper() && other.lower() <= self.upper()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(h)
    }

    #[test]
    fn instant_time_is_a_singleton_span() {
        let temp = Temporal::Instant(TInstant::new(Value::Int(1), t(0)));
        let ts = temp.time().unwrap();
        assert_eq!(ts.count(), 1);
        assert_eq!(ts.span().lower(), t(0));
        assert_eq!(ts.span().upper(), t(0));
    }
}
