//! C3 — a disjoint-in-time union of sequences sharing one interpolation.

use chrono::{DateTime, Utc};

use crate::errors::{Result, TemporalError};
use crate::types::Interpolation;
use crate::value::Value;

use super::sequence::TSequence;

#[derive(Debug, Clone, PartialEq)]
pub struct TSequenceSet {
    sequences: Vec<TSequence>,
}

impl TSequenceSet {
    pub fn new(sequences: Vec<TSequence>, normalize: bool) -> Result<Self> {
        if sequences.is_empty() {
            return Err(TemporalError::InvalidInput(
                "a sequence-set needs at least one sequence".into(),
            ));
        }
        let interp = sequences[0].interpolation();
        for s in &sequences {
            // I8
            if s.num_instants() == 1 && !(s.lower_inc() && s.upper_inc()) {
                return Err(TemporalError::InvalidInput(
                    "a singleton sequence in a sequence-set must have inclusive bounds".into(),
                ));
            }
            // I10
            if s.interpolation() != interp {
                return Err(TemporalError::InterpolationMismatch(
                    "all sequences in a sequence-set must share the same interpolation".into(),
                ));
            }
        }
        let mut sorted = sequences;
        sorted.sort_by_key(|s| s.lower());
        // I9
        for w in sorted.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            let separated = a.upper() < b.lower()
                || (a.upper() == b.lower() && !(a.upper_inc() && b.lower_inc()));
            if !separated {
                return Err(TemporalError::OrderingViolation {
                    t: b.lower(),
                    message: "sequences in a sequence-set must be separated in time".into(),
                });
            }
        }
        let set = Self { sequences: sorted };
        if normalize {
            set.normalized()
        } else {
            Ok(set)
        }
    }

    pub fn sequences(&self) -> &[TSequence] {
        &self.sequences
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.sequences[0].interpolation()
    }

    pub fn lower(&self) -> DateTime<Utc> {
        self.sequences.first().unwrap().lower()
    }

    pub fn upper(&self) -> DateTime<Utc> {
        self.sequences.last().unwrap().upper()
    }

    pub fn value_at(&self, t: DateTime<Utc>) -> Result<Option<Value>> {
        for s in &self.sequences {
            if let Some(v) = s.value_at(t)? {
                return Ok(Some(v));
            }
        }
        Ok(None)
    }

    /// I11: merge every joinable adjacent pair (§4.C3 join test).
    pub fn normalized(&self) -> Result<Self> {
        let mut out: Vec<TSequence> = Vec::new();
        for s in &self.sequences {
            if let Some(last) = out.last() {
                if let Some(joined) = try_join(last, s)? {
                    *out.last_mut().unwrap() = joined;
                    continue;
                }
            }
            out.push(s.normalized()?);
        }
        Ok(Self { sequences: out })
    }
}

/// Two adjacent sequences are joinable iff their shared endpoint has
/// matching value and the join does not change continuity — i.e. the
/// shared instant is `(a.upper]`/`[b.lower)` with opposite-but-complementary
/// inclusivity (`(x, x]` meeting `[x, y)`), per spec §4.C3.
pub(crate) fn try_join(a: &TSequence, b: &TSequence) -> Result<Option<TSequence>> {
    if a.upper() != b.lower() {
        return Ok(None);
    }
    if a.upper_inc() == b.lower_inc() {
        // both inclusive (duplicate instant) or both exclusive (a gap) —
        // neither shape is the joinable "touch" case.
        return Ok(None);
    }
    let shared_a = a.instants().last().unwrap();
    let shared_b = b.instants().first().unwrap();
    if shared_a.value() != shared_b.value() {
        return Ok(None);
    }
    let mut instants: Vec<_> = a.instants().to_vec();
    // the shared instant appears once
    instants.extend_from_slice(&b.instants()[1..]);
    TSequence::new(instants, a.lower_inc(), b.upper_inc(), a.interpolation(), true).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::instant::TInstant;
    use chrono::TimeZone;

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(h)
    }

    #[test]
    fn rejects_overlapping_sequences() {
        let s1 = TSequence::new(
            vec![
                TInstant::new(Value::Int(1), t(0)),
                TInstant::new(Value::Int(2), t(5)),
            ],
            true,
            true,
            Interpolation::Step,
            false,
        )
        .unwrap();
        let s2 = TSequence::new(
            vec![
                TInstant::new(Value::Int(3), t(3)),
                TInstant::new(Value::Int(4), t(8)),
            ],
            true,
            true,
            Interpolation::Step,
            false,
        )
        .unwrap();
        assert!(TSequenceSet::new(vec![s1, s2], false).is_err());
    }

    #[test]
    fn joins_touching_sequences_with_matching_endpoint() {
        let s1 = TSequence::new(
            vec![
                TInstant::new(Value::Float(0.0), t(0)),
                TInstant::new(Value::Float(5.0), t(5)),
            ],
            true,
            true,
            Interpolation::Linear,
            false,
        )
        .unwrap();
        let s2 = TSequence::new(
            vec![
                TInstant::new(Value::Float(5.0), t(5)),
                TInstant::new(Value::Float(2.0), t(10)),
            ],
            false,
            true,
            Interpolation::Linear,
            false,
        )
        .unwrap();
        let set = TSequenceSet::new(vec![s1, s2], true).unwrap();
        assert_eq!(set.num_sequences(), 1);
        assert_eq!(set.sequences()[0].num_instants(), 3);
    }
}
