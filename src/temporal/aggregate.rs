//! C9 — aggregation: a skiplist-ordered accumulator of temporal pieces,
//! spliced together through C5 synchronization (spec §4.C9: "C9 composes
//! C5 through a skiplist").
//!
//! The source library exposes one transition function per aggregate kind
//! (`tint_min_transfn`, `tfloat_sum_transfn`, ...); here that whole family
//! collapses to a single `TAggState` parameterized by [`AggKind`], matching
//! how `UnOp`/`BinOp` already replace per-function dispatch elsewhere in
//! this engine.

use log::{debug, trace};

use crate::errors::{Result, TemporalError};
use crate::span::TstzSpan;
use crate::types::Interpolation;
use crate::value::Value;

use super::instant::TInstant;
use super::lift::{self, BinOp};
use super::modify::{self, finalize, to_piece_sequences};
use super::restrict::{self, TBox};
use super::sequence::TSequence;
use super::sequence_set::TSequenceSet;
use super::temporal::Temporal;
use super::tile;

/// Which aggregate kind drives the skiplist's merge function and
/// pre-transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggKind {
    And,
    Or,
    Min,
    Max,
    Sum,
    Count,
    Avg,
    Extent,
}

impl AggKind {
    /// The merge function `f` passed to `skiplist_splice`; `None` only for
    /// `Extent`, which tracks a running bounding box instead of merging
    /// temporal pieces.
    fn op(self) -> Option<BinOp> {
        match self {
            AggKind::And => Some(BinOp::And),
            AggKind::Or => Some(BinOp::Or),
            AggKind::Min => Some(BinOp::Min),
            AggKind::Max => Some(BinOp::Max),
            AggKind::Sum | AggKind::Count | AggKind::Avg => Some(BinOp::Add),
            AggKind::Extent => None,
        }
    }
}

fn map_instants(temp: &Temporal, f: impl Fn(&Value) -> Value + Copy) -> Result<Temporal> {
    match temp {
        Temporal::Instant(i) => Ok(Temporal::Instant(TInstant::new(f(i.value()), i.t()))),
        Temporal::Sequence(s) => {
            let instants = s.instants().iter().map(|i| TInstant::new(f(i.value()), i.t())).collect();
            Ok(Temporal::Sequence(TSequence::new(
                instants,
                s.lower_inc(),
                s.upper_inc(),
                s.interpolation(),
                true,
            )?))
        }
        Temporal::SequenceSet(ss) => {
            let seqs = ss
                .sequences()
                .iter()
                .map(|s| match map_instants(&Temporal::Sequence(s.clone()), f)? {
                    Temporal::Sequence(r) => Ok(r),
                    _ => unreachable!(),
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Temporal::SequenceSet(TSequenceSet::new(seqs, true)?))
        }
    }
}

/// `count`'s pre-transform: every instant becomes the constant `1`.
fn map_to_one(temp: &Temporal) -> Result<Temporal> {
    map_instants(temp, |_| Value::Int(1))
}

fn bounding_span(temp: &Temporal) -> Result<TstzSpan> {
    TstzSpan::new(temp.lower(), temp.upper(), temp.lower_inc(), temp.upper_inc())
}

fn pieces_overlap(a: &Temporal, b: &Temporal) -> Result<bool> {
    Ok(bounding_span(a)?.overlaps(&bounding_span(b)?))
}

/// Merges two time-overlapping pieces: the shared time domain is combined
/// pointwise with `op` (via C5 synchronization); whatever of either piece
/// falls outside the overlap survives unchanged (via C6 restriction), since
/// an aggregate is only asked to combine values where more than one input
/// is actually defined.
fn overlap_merge(existing: &Temporal, incoming: &Temporal, op: BinOp) -> Result<Vec<Temporal>> {
    let es = bounding_span(existing)?;
    let is = bounding_span(incoming)?;
    let Some(overlap) = es.intersection(&is) else {
        return Ok(vec![existing.clone(), incoming.clone()]);
    };
    let mut out = Vec::new();
    let e_overlap = restrict::at_timestamp_span(existing, &overlap)?;
    let i_overlap = restrict::at_timestamp_span(incoming, &overlap)?;
    if let (Some(eo), Some(io)) = (&e_overlap, &i_overlap) {
        if let Some(combined) = lift::lift_temporal(eo, io, op)? {
            out.push(combined);
        }
    }
    if let Some(rest) = restrict::minus_timestamp_span(existing, &overlap)? {
        out.push(rest);
    }
    if let Some(rest) = restrict::minus_timestamp_span(incoming, &overlap)? {
        out.push(rest);
    }
    Ok(out)
}

/// `skiplist_splice(state, values, f)`: find the list nodes whose periods
/// overlap the incoming piece, merge them all in with `f`, and splice the
/// result back in sorted order. Each merge strictly shrinks the list (the
/// matched node is consumed and never directly reinserted), so the fixed
/// point below always terminates.
fn skiplist_splice(list: &mut Vec<Temporal>, incoming: Temporal, op: BinOp) -> Result<()> {
    debug!("splicing into a {}-node skiplist with op {op:?}", list.len());
    let mut pending = vec![incoming];
    loop {
        let mut merged_one = false;
        'search: for p_idx in 0..pending.len() {
            for l_idx in 0..list.len() {
                if pieces_overlap(&list[l_idx], &pending[p_idx])? {
                    trace!("merging overlapping pieces at list index {l_idx}");
                    let existing = list.remove(l_idx);
                    let p = pending.remove(p_idx);
                    pending.extend(overlap_merge(&existing, &p, op)?);
                    merged_one = true;
                    break 'search;
                }
            }
        }
        if !merged_one {
            break;
        }
    }
    list.extend(pending);
    list.sort_by_key(|t| t.lower());
    debug!("splice done, skiplist now has {} nodes", list.len());
    Ok(())
}

fn flatten_to_sequences(list: &[Temporal]) -> Result<Vec<TSequence>> {
    let mut out = Vec::new();
    for t in list {
        out.extend(to_piece_sequences(t, Interpolation::Discrete)?);
    }
    Ok(out)
}

fn divide_values(a: &Value, b: &Value) -> Result<Value> {
    let (a, b) = (
        a.as_f64().ok_or_else(|| TemporalError::InvalidInput("avg requires numeric values".into()))?,
        b.as_f64().ok_or_else(|| TemporalError::InvalidInput("avg requires numeric values".into()))?,
    );
    Ok(Value::Float(a / b))
}

/// Pointwise `a / b`, assuming `a` and `b` share the same instant/sequence
/// shape — true for a sum accumulator and its paired count accumulator,
/// since both are built by the same sequence of `Add` merges over
/// structurally identical timestamps.
fn divide_pointwise(a: &Temporal, b: &Temporal) -> Result<Temporal> {
    match (a, b) {
        (Temporal::Instant(ai), Temporal::Instant(bi)) => Ok(Temporal::Instant(TInstant::new(
            divide_values(ai.value(), bi.value())?,
            ai.t(),
        ))),
        (Temporal::Sequence(sa), Temporal::Sequence(sb)) => {
            let instants = sa
                .instants()
                .iter()
                .zip(sb.instants().iter())
                .map(|(ia, ib)| Ok(TInstant::new(divide_values(ia.value(), ib.value())?, ia.t())))
                .collect::<Result<Vec<_>>>()?;
            Ok(Temporal::Sequence(TSequence::new(
                instants,
                sa.lower_inc(),
                sa.upper_inc(),
                sa.interpolation(),
                true,
            )?))
        }
        (Temporal::SequenceSet(ssa), Temporal::SequenceSet(ssb)) => {
            let seqs = ssa
                .sequences()
                .iter()
                .zip(ssb.sequences().iter())
                .map(|(sa, sb)| {
                    match divide_pointwise(&Temporal::Sequence(sa.clone()), &Temporal::Sequence(sb.clone()))? {
                        Temporal::Sequence(r) => Ok(r),
                        _ => unreachable!(),
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Temporal::SequenceSet(TSequenceSet::new(seqs, true)?))
        }
        _ => Err(TemporalError::Internal(
            "avg sum/count accumulators diverged in shape".into(),
        )),
    }
}

/// The final function's result: a temporal value for every aggregate kind
/// except `extent`, whose accumulated bounding box has no natural temporal
/// representation.
#[derive(Debug, Clone, PartialEq)]
pub enum AggOutput {
    Temporal(Temporal),
    Extent(TBox),
}

/// A running aggregate (spec's skiplist accumulator).
#[derive(Debug, Clone)]
pub struct TAggState {
    kind: AggKind,
    pieces: Vec<Temporal>,
    count_pieces: Vec<Temporal>,
    extent: Option<TBox>,
}

impl TAggState {
    pub fn new(kind: AggKind) -> Self {
        Self {
            kind,
            pieces: Vec::new(),
            count_pieces: Vec::new(),
            extent: None,
        }
    }

    pub fn kind(&self) -> AggKind {
        self.kind
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty() && self.extent.is_none()
    }

    /// One call to the transition function for this aggregate's kind.
    pub fn transition(&mut self, value: &Temporal) -> Result<()> {
        if self.kind == AggKind::Extent {
            let value_span = tile::value_extent(value)
                .map(|(lo, hi)| crate::span::FloatSpan::new(lo, hi, true, true))
                .transpose()?;
            let time_span = Some(value.time()?.span());
            let incoming = TBox { value_span, time_span };
            self.extent = Some(match self.extent.take() {
                Some(acc) => hull_box(&acc, &incoming),
                None => incoming,
            });
            return Ok(());
        }

        let op = self.kind.op().expect("non-extent kinds always select a merge op");
        if self.kind == AggKind::Count {
            skiplist_splice(&mut self.pieces, map_to_one(value)?, op)?;
        } else if self.kind == AggKind::Avg {
            skiplist_splice(&mut self.pieces, value.clone(), op)?;
            skiplist_splice(&mut self.count_pieces, map_to_one(value)?, BinOp::Add)?;
        } else {
            skiplist_splice(&mut self.pieces, value.clone(), op)?;
        }
        Ok(())
    }

    /// `app_tinst_transfn`/`app_tseq_transfn`: extend the last accumulated
    /// piece via the expandable-buffer append path of §4.C7 instead of a
    /// full synchronized merge, for streaming aggregation over an
    /// already-ordered input.
    pub fn append_instant(&mut self, inst: TInstant, maxdist: Option<f64>, maxt: Option<chrono::Duration>) -> Result<()> {
        match self.pieces.pop() {
            Some(last) => self.pieces.push(modify::append_instant(&last, inst, maxdist, maxt, true)?),
            None => self.pieces.push(Temporal::Instant(inst)),
        }
        Ok(())
    }

    pub fn append_sequence(&mut self, seq: TSequence) -> Result<()> {
        match self.pieces.pop() {
            Some(last) => self.pieces.push(modify::append_sequence(&last, seq, true)?),
            None => self.pieces.push(Temporal::Sequence(seq)),
        }
        Ok(())
    }

    /// Combine function: splice `other`'s accumulated values into `self`
    /// under the same `f`; an empty state passes through unchanged.
    pub fn combine(mut self, other: Self) -> Result<Self> {
        if other.is_empty() {
            return Ok(self);
        }
        if self.is_empty() {
            return Ok(other);
        }
        if self.kind != other.kind {
            return Err(TemporalError::InterpolationMismatch(
                "cannot combine aggregate states of different kinds".into(),
            ));
        }
        if self.kind == AggKind::Extent {
            self.extent = Some(match (self.extent, other.extent) {
                (Some(a), Some(b)) => hull_box(&a, &b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => unreachable!("is_empty checked above"),
            });
            return Ok(self);
        }
        let op = self.kind.op().unwrap();
        for p in other.pieces {
            skiplist_splice(&mut self.pieces, p, op)?;
        }
        for p in other.count_pieces {
            skiplist_splice(&mut self.count_pieces, p, BinOp::Add)?;
        }
        Ok(self)
    }

    /// Final function: collapse the skiplist to one temporal value (`avg`
    /// additionally divides its paired sum/count accumulators; `extent`
    /// returns the accumulated bounding box instead).
    pub fn finish(&self) -> Result<AggOutput> {
        if self.kind == AggKind::Extent {
            let tbox = self
                .extent
                .clone()
                .ok_or_else(|| TemporalError::InvalidInput("extent of an empty aggregate".into()))?;
            return Ok(AggOutput::Extent(tbox));
        }
        if self.pieces.is_empty() {
            return Err(TemporalError::InvalidInput("aggregate of an empty input set".into()));
        }
        let sum = finalize(flatten_to_sequences(&self.pieces)?)?;
        if self.kind != AggKind::Avg {
            return Ok(AggOutput::Temporal(sum));
        }
        let count = finalize(flatten_to_sequences(&self.count_pieces)?)?;
        Ok(AggOutput::Temporal(divide_pointwise(&sum, &count)?))
    }
}

fn hull_box(a: &TBox, b: &TBox) -> TBox {
    TBox {
        value_span: match (&a.value_span, &b.value_span) {
            (Some(x), Some(y)) => Some(x.hull(y)),
            (Some(x), None) => Some(*x),
            (None, Some(y)) => Some(*y),
            (None, None) => None,
        },
        time_span: match (&a.time_span, &b.time_span) {
            (Some(x), Some(y)) => Some(x.hull(y)),
            (Some(x), None) => Some(*x),
            (None, Some(y)) => Some(*y),
            (None, None) => None,
        },
    }
}

/// Convenience one-shot aggregation over a full slice of inputs, mirroring
/// how the entry points of §4.C9 are always reached through a completed
/// accumulator rather than a half-built one.
pub fn aggregate(kind: AggKind, values: &[Temporal]) -> Result<AggOutput> {
    let mut state = TAggState::new(kind);
    for v in values {
        state.transition(v)?;
    }
    state.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(h)
    }

    fn inst(v: f64, h: i64) -> Temporal {
        Temporal::Instant(TInstant::new(Value::Float(v), t(h)))
    }

    fn seq(vals: &[(f64, i64)], interp: Interpolation) -> Temporal {
        let instants = vals.iter().map(|(v, h)| TInstant::new(Value::Float(*v), t(*h))).collect();
        Temporal::Sequence(TSequence::new(instants, true, true, interp, false).unwrap())
    }

    #[test]
    fn sum_over_non_overlapping_instants_concatenates() {
        let values = vec![inst(1.0, 0), inst(2.0, 1), inst(3.0, 2)];
        let AggOutput::Temporal(result) = aggregate(AggKind::Sum, &values).unwrap() else {
            panic!("expected a temporal result")
        };
        assert_eq!(result.num_instants(), 3);
        assert_eq!(result.value_at(t(1)).unwrap(), Some(Value::Float(2.0)));
    }

    #[test]
    fn sum_over_overlapping_sequences_adds_pointwise() {
        let a = seq(&[(0.0, 0), (10.0, 10)], Interpolation::Linear);
        let b = seq(&[(0.0, 0), (10.0, 10)], Interpolation::Linear);
        let AggOutput::Temporal(result) = aggregate(AggKind::Sum, &[a, b]).unwrap() else {
            panic!("expected a temporal result")
        };
        assert_eq!(result.value_at(t(5)).unwrap(), Some(Value::Float(10.0)));
    }

    #[test]
    fn count_counts_overlapping_contributions() {
        let a = seq(&[(0.0, 0), (10.0, 10)], Interpolation::Linear);
        let b = seq(&[(0.0, 5), (10.0, 8)], Interpolation::Linear);
        let AggOutput::Temporal(result) = aggregate(AggKind::Count, &[a, b]).unwrap() else {
            panic!("expected a temporal result")
        };
        assert_eq!(result.value_at(t(0)).unwrap(), Some(Value::Int(1)));
        assert_eq!(result.value_at(t(6)).unwrap(), Some(Value::Int(2)));
    }

    #[test]
    fn min_of_crossing_linear_sequences_inserts_a_turning_point() {
        let a = seq(&[(0.0, 0), (10.0, 10)], Interpolation::Linear);
        let b = seq(&[(10.0, 0), (0.0, 10)], Interpolation::Linear);
        let AggOutput::Temporal(result) = aggregate(AggKind::Min, &[a, b]).unwrap() else {
            panic!("expected a temporal result")
        };
        assert_eq!(result.value_at(t(0)).unwrap(), Some(Value::Float(0.0)));
        assert_eq!(result.value_at(t(10)).unwrap(), Some(Value::Float(0.0)));
        assert_eq!(result.value_at(t(5)).unwrap(), Some(Value::Float(5.0)));
        assert!(result.num_instants() > 2, "expects an inserted crossing instant");
    }

    #[test]
    fn avg_divides_sum_by_count() {
        let a = seq(&[(0.0, 0), (10.0, 10)], Interpolation::Linear);
        let b = seq(&[(0.0, 0), (20.0, 10)], Interpolation::Linear);
        let AggOutput::Temporal(result) = aggregate(AggKind::Avg, &[a, b]).unwrap() else {
            panic!("expected a temporal result")
        };
        assert_eq!(result.value_at(t(0)).unwrap(), Some(Value::Float(0.0)));
        assert_eq!(result.value_at(t(10)).unwrap(), Some(Value::Float(15.0)));
    }

    #[test]
    fn extent_accumulates_value_and_time_bounds() {
        let a = seq(&[(2.0, 0), (5.0, 3)], Interpolation::Linear);
        let b = seq(&[(-1.0, 4), (8.0, 9)], Interpolation::Linear);
        let AggOutput::Extent(tbox) = aggregate(AggKind::Extent, &[a, b]).unwrap() else {
            panic!("expected an extent result")
        };
        let vspan = tbox.value_span.unwrap();
        assert_eq!(vspan.lower(), -1.0);
        assert_eq!(vspan.upper(), 8.0);
        let tspan = tbox.time_span.unwrap();
        assert_eq!(tspan.lower(), t(0));
        assert_eq!(tspan.upper(), t(9));
    }

    #[test]
    fn combine_merges_two_states() {
        let mut s1 = TAggState::new(AggKind::Sum);
        s1.transition(&inst(1.0, 0)).unwrap();
        let mut s2 = TAggState::new(AggKind::Sum);
        s2.transition(&inst(2.0, 0)).unwrap();
        let combined = s1.combine(s2).unwrap();
        let AggOutput::Temporal(result) = combined.finish().unwrap() else {
            panic!("expected a temporal result")
        };
        assert_eq!(result.value_at(t(0)).unwrap(), Some(Value::Float(3.0)));
    }
}
