//! C3 — a contiguous temporal fragment with a single interpolation mode.
//!
//! Invariants I1–I7 of spec §3 are enforced at construction; normalization
//! (collapsing redundant colinear/constant samples, I7) runs on request via
//! an explicit `normalize` flag, so callers that already know a value is
//! normalized can skip the pass (spec §4.C3).

use chrono::{DateTime, Utc};

use crate::errors::{Result, TemporalError};
use crate::types::Interpolation;
use crate::value::Value;

use super::instant::TInstant;
use super::segment::value_at;

#[derive(Debug, Clone, PartialEq)]
pub struct TSequence {
    instants: Vec<TInstant>,
    lower_inc: bool,
    upper_inc: bool,
    interp: Interpolation,
}

impl TSequence {
    pub fn new(
        instants: Vec<TInstant>,
        lower_inc: bool,
        upper_inc: bool,
        interp: Interpolation,
        normalize: bool,
    ) -> Result<Self> {
        let instants = if normalize && interp == Interpolation::Discrete {
            dedup_consecutive_timestamps(instants)
        } else {
            instants
        };
        let mut seq = Self::new_unchecked(instants, lower_inc, upper_inc, interp)?;
        if normalize {
            seq = seq.normalized()?;
        } else {
            seq.enforce_trailing_step_repeat()?;
        }
        Ok(seq)
    }

    /// Builds a sequence without re-running normalization, for internal
    /// callers that construct already-normalized pieces (e.g. the
    /// restriction engine). Still validates I1–I6.
    pub(crate) fn new_unchecked(
        instants: Vec<TInstant>,
        lower_inc: bool,
        upper_inc: bool,
        interp: Interpolation,
    ) -> Result<Self> {
        // I1
        if instants.is_empty() {
            return Err(TemporalError::InvalidInput(
                "a sequence needs at least one instant".into(),
            ));
        }
        // I2
        for w in instants.windows(2) {
            if w[0].t() >= w[1].t() {
                return Err(TemporalError::OrderingViolation {
                    t: w[1].t(),
                    message: "sequence instants must be strictly increasing in time".into(),
                });
            }
        }
        // I3
        if instants.len() == 1 && !(lower_inc && upper_inc) {
            return Err(TemporalError::InvalidInput(
                "a single-instant sequence must have inclusive bounds on both ends".into(),
            ));
        }
        // I4
        if interp == Interpolation::Linear {
            for i in &instants {
                if !i.value().is_continuous() {
                    return Err(TemporalError::InterpolationMismatch(format!(
                        "linear interpolation requires a continuous base type, found {:?}",
                        i.value().base_type()
                    )));
                }
            }
        }
        // I6
        if interp == Interpolation::Discrete && !(lower_inc && upper_inc) {
            return Err(TemporalError::InvalidInput(
                "discrete sequences always have inclusive bounds on both ends".into(),
            ));
        }
        Ok(Self {
            instants,
            lower_inc,
            upper_inc,
            interp,
        })
    }

    /// I5: under step with an exclusive upper bound, the trailing sample
    /// must re-state the still-held value.
    fn enforce_trailing_step_repeat(&self) -> Result<()> {
        if self.interp == Interpolation::Step && !self.upper_inc && self.instants.len() >= 2 {
            let last = &self.instants[self.instants.len() - 1];
            let prev = &self.instants[self.instants.len() - 2];
            if last.value() != prev.value() {
                return Err(TemporalError::InvalidInput(
                    "a step sequence with an exclusive upper bound must repeat its last value \
                     (I5)"
                        .into(),
                ));
            }
        }
        Ok(())
    }

    pub fn instants(&self) -> &[TInstant] {
        &self.instants
    }

    pub fn lower_inc(&self) -> bool {
        self.lower_inc
    }

    pub fn upper_inc(&self) -> bool {
        self.upper_inc
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interp
    }

    pub fn lower(&self) -> DateTime<Utc> {
        self.instants.first().unwrap().t()
    }

    pub fn upper(&self) -> DateTime<Utc> {
        self.instants.last().unwrap().t()
    }

    pub fn num_instants(&self) -> usize {
        self.instants.len()
    }

    pub fn start_value(&self) -> &Value {
        self.instants.first().unwrap().value()
    }

    pub fn end_value(&self) -> &Value {
        self.instants.last().unwrap().value()
    }

    /// Value at `t`, or `None` if `t` is outside the sequence's time span
    /// (respecting bound inclusivity).
    pub fn value_at(&self, t: DateTime<Utc>) -> Result<Option<Value>> {
        if t < self.lower() || t > self.upper() {
            return Ok(None);
        }
        if t == self.lower() && !self.lower_inc {
            return Ok(None);
        }
        if t == self.upper() && !self.upper_inc {
            return Ok(None);
        }
        if self.instants.len() == 1 {
            return Ok(Some(self.instants[0].value().clone()));
        }
        if self.interp == Interpolation::Discrete {
            return Ok(self
                .instants
                .iter()
                .find(|i| i.t() == t)
                .map(|i| i.value().clone()));
        }
        let idx = match self.instants.binary_search_by(|i| i.t().cmp(&t)) {
            Ok(i) => return Ok(Some(self.instants[i].value().clone())),
            Err(i) => i,
        };
        let (a, b) = (&self.instants[idx - 1], &self.instants[idx]);
        Ok(Some(value_at(a, b, self.interp, t, true)?))
    }

    /// I7: eliminate redundant colinear/constant samples and duplicate
    /// timestamps, producing the canonical form.
    pub fn normalized(&self) -> Result<Self> {
        if self.instants.len() < 2 {
            return Ok(self.clone());
        }
        let mut out: Vec<TInstant> = Vec::with_capacity(self.instants.len());
        out.push(self.instants[0].clone());
        for i in 1..self.instants.len() {
            let cur = &self.instants[i];
            let redundant = out.len() >= 2 && {
                let a = &out[out.len() - 2];
                let b = &out[out.len() - 1];
                match self.interp {
                    Interpolation::Linear => colinear(a, b, cur),
                    Interpolation::Step => b.value() == a.value(),
                    Interpolation::Discrete => false,
                }
            };
            if redundant {
                out.pop();
            }
            out.push(cur.clone());
        }
        let seq = Self::new_unchecked(out, self.lower_inc, self.upper_inc, self.interp)?;
        seq.enforce_trailing_step_repeat()?;
        Ok(seq)
    }
}

/// Discrete normalization rule: drop consecutive duplicates at identical
/// timestamps, keeping the later sample.
fn dedup_consecutive_timestamps(instants: Vec<TInstant>) -> Vec<TInstant> {
    let mut out: Vec<TInstant> = Vec::with_capacity(instants.len());
    for i in instants {
        if out.last().is_some_and(|last: &TInstant| last.t() == i.t()) {
            out.pop();
        }
        out.push(i);
    }
    out
}

/// Whether the rate of change across `(a, b)` equals the rate across
/// `(b, c)`, compared via cross-multiplication (`dy1*dt2 == dy2*dt1`)
/// rather than by dividing out the (often huge, microsecond-scale) `dt`s
/// first — dividing before comparing collapses genuinely different slopes
/// into the same tiny magnitude and makes a fixed absolute epsilon useless.
fn rates_equal(dy1: f64, dt1: f64, dy2: f64, dt2: f64) -> bool {
    let lhs = dy1 * dt2;
    let rhs = dy2 * dt1;
    let scale = lhs.abs().max(rhs.abs()).max(1.0);
    (lhs - rhs).abs() < scale * 1e-9
}

fn colinear(a: &TInstant, b: &TInstant, c: &TInstant) -> bool {
    let dt1 = (b.t() - a.t()).num_microseconds().unwrap_or(1) as f64;
    let dt2 = (c.t() - b.t()).num_microseconds().unwrap_or(1) as f64;
    let (Some(va), Some(vb), Some(vc)) = (a.value().as_f64(), b.value().as_f64(), c.value().as_f64())
    else {
        // Point2 colinearity: compare direction vectors instead of slopes.
        return match (a.value(), b.value(), c.value()) {
            (crate::value::Value::Point(pa), crate::value::Value::Point(pb), crate::value::Value::Point(pc)) => {
                rates_equal(pb.x - pa.x, dt1, pc.x - pb.x, dt2)
                    && rates_equal(pb.y - pa.y, dt1, pc.y - pb.y, dt2)
            }
            _ => false,
        };
    };
    rates_equal(vb - va, dt1, vc - vb, dt2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(h)
    }

    #[test]
    fn rejects_non_increasing_timestamps() {
        let instants = vec![
            TInstant::new(Value::Int(1), t(1)),
            TInstant::new(Value::Int(2), t(0)),
        ];
        assert!(TSequence::new(instants, true, true, Interpolation::Step, false).is_err());
    }

    #[test]
    fn linear_requires_continuous_basetype() {
        let instants = vec![
            TInstant::new(Value::Text("a".into()), t(0)),
            TInstant::new(Value::Text("b".into()), t(1)),
        ];
        assert!(TSequence::new(instants, true, true, Interpolation::Linear, false).is_err());
    }

    #[test]
    fn normalization_drops_colinear_midpoint() {
        let instants = vec![
            TInstant::new(Value::Float(0.0), t(0)),
            TInstant::new(Value::Float(1.0), t(1)),
            TInstant::new(Value::Float(2.0), t(2)),
        ];
        let seq = TSequence::new(instants, true, true, Interpolation::Linear, true).unwrap();
        assert_eq!(seq.num_instants(), 2);
    }

    #[test]
    fn step_trailing_repeat_required() {
        let instants = vec![
            TInstant::new(Value::Int(1), t(0)),
            TInstant::new(Value::Int(2), t(1)),
        ];
        assert!(TSequence::new(instants, true, false, Interpolation::Step, false).is_err());

        let instants = vec![
            TInstant::new(Value::Int(1), t(0)),
            TInstant::new(Value::Int(2), t(1)),
            TInstant::new(Value::Int(2), t(2)),
        ];
        assert!(TSequence::new(instants, true, false, Interpolation::Step, false).is_ok());
    }

    #[test]
    fn step_normalization_drops_redundant_middle_sample_regardless_of_next_value() {
        // a=1@t0, b=1@t1, c=2@t2: b restates a's value, so it is redundant
        // whether or not the following value (c) agrees (spec §4.C3: the
        // Step rule only conditions on value(a)=value(b)).
        let instants = vec![
            TInstant::new(Value::Int(1), t(0)),
            TInstant::new(Value::Int(1), t(1)),
            TInstant::new(Value::Int(2), t(2)),
        ];
        let seq = TSequence::new(instants, true, true, Interpolation::Step, true).unwrap();
        assert_eq!(seq.num_instants(), 2);
        assert_eq!(seq.instants()[0].value(), &Value::Int(1));
        assert_eq!(seq.instants()[1].value(), &Value::Int(2));
    }

    #[test]
    fn discrete_normalization_drops_duplicate_timestamps() {
        let instants = vec![
            TInstant::new(Value::Int(1), t(0)),
            TInstant::new(Value::Int(2), t(0)),
            TInstant::new(Value::Int(3), t(1)),
        ];
        let seq = TSequence::new(instants, true, true, Interpolation::Discrete, true).unwrap();
        assert_eq!(seq.num_instants(), 2);
        assert_eq!(seq.instants()[0].value(), &Value::Int(2));
    }

    #[test]
    fn value_at_linear_midpoint() {
        let instants = vec![
            TInstant::new(Value::Float(0.0), t(0)),
            TInstant::new(Value::Float(10.0), t(10)),
        ];
        let seq = TSequence::new(instants, true, true, Interpolation::Linear, false).unwrap();
        assert_eq!(seq.value_at(t(5)).unwrap(), Some(Value::Float(5.0)));
    }
}
