//! C6 — the restriction engine: `at`/`minus` against every target kind of
//! spec §4.C6.
//!
//! Rather than re-deriving crossing detection from scratch, value/value-set
//! restriction is built on top of C5: the predicate "is the value equal to
//! `v`?" is exactly the `Eq` lift against a base value, so the crossing
//! points a continuous segment needs are the ones `lift_base` already
//! computes. Restriction then crops the *original* sequence to the time
//! periods where that boolean mask holds, rather than keeping the mask
//! itself.

use chrono::{DateTime, Utc};

use crate::errors::{Result, TemporalError};
use crate::span::{FloatSpan, TstzSpan};
use crate::span_set::{FloatSpanSet, TstzSpanSet};
use crate::types::Interpolation;
use crate::value::Value;

use super::instant::TInstant;
use super::lift::{self, BinOp};
use super::sequence::TSequence;
use super::temporal::Temporal;

/// A temporal-number bounding box: an optional value-span and an optional
/// time-span. `None` on either axis means "unconstrained on that axis".
#[derive(Debug, Clone, PartialEq)]
pub struct TBox {
    pub value_span: Option<FloatSpan>,
    pub time_span: Option<TstzSpan>,
}

fn dispatch<F>(temp: &Temporal, instant_ok: impl Fn(&TInstant) -> bool, seq_at: F) -> Result<Option<Temporal>>
where
    F: Fn(&TSequence) -> Result<Option<Temporal>>,
{
    match temp {
        Temporal::Instant(i) => Ok(instant_ok(i).then(|| Temporal::Instant(i.clone()))),
        Temporal::Sequence(s) => seq_at(s),
        Temporal::SequenceSet(ss) => {
            let mut pieces = Vec::new();
            for s in ss.sequences() {
                if let Some(r) = seq_at(s)? {
                    pieces.push(r);
                }
            }
            if pieces.is_empty() {
                Ok(None)
            } else {
                lift::concat_sequence_pieces(pieces).map(Some)
            }
        }
    }
}

/// Crops `seq` to `[lower, upper]` (per the given inclusivity), resampling
/// the boundary values. Spec §4.C6: "crop endpoints by evaluating the
/// sequence at the span boundaries."
fn crop_to_span(
    seq: &TSequence,
    lower: DateTime<Utc>,
    lower_inc: bool,
    upper: DateTime<Utc>,
    upper_inc: bool,
) -> Result<Option<TSequence>> {
    let dom_lower = seq.lower();
    let dom_upper = seq.upper();
    let new_lower = lower.max(dom_lower);
    let new_upper = upper.min(dom_upper);
    if new_lower > new_upper {
        return Ok(None);
    }
    let new_lower_inc = if new_lower == dom_lower && new_lower == lower {
        lower_inc && seq.lower_inc()
    } else if new_lower == dom_lower {
        seq.lower_inc()
    } else {
        lower_inc
    };
    let new_upper_inc = if new_upper == dom_upper && new_upper == upper {
        upper_inc && seq.upper_inc()
    } else if new_upper == dom_upper {
        seq.upper_inc()
    } else {
        upper_inc
    };
    if new_lower == new_upper && !(new_lower_inc && new_upper_inc) {
        return Ok(None);
    }

    if seq.interpolation() == Interpolation::Discrete {
        let instants: Vec<TInstant> = seq
            .instants()
            .iter()
            .filter(|i| i.t() >= new_lower && i.t() <= new_upper)
            .cloned()
            .collect();
        return if instants.is_empty() {
            Ok(None)
        } else {
            TSequence::new(instants, true, true, Interpolation::Discrete, true).map(Some)
        };
    }

    let mut instants: Vec<TInstant> = seq
        .instants()
        .iter()
        .filter(|i| i.t() > new_lower && i.t() < new_upper)
        .cloned()
        .collect();
    let start = TInstant::new(
        seq.value_at(new_lower)?
            .ok_or_else(|| TemporalError::Internal("crop lower bound outside sequence domain".into()))?,
        new_lower,
    );
    instants.insert(0, start);
    if new_upper != new_lower {
        let end = TInstant::new(
            seq.value_at(new_upper)?
                .ok_or_else(|| TemporalError::Internal("crop upper bound outside sequence domain".into()))?,
            new_upper,
        );
        instants.push(end);
    }
    TSequence::new(instants, new_lower_inc, new_upper_inc, seq.interpolation(), true).map(Some)
}

/// Maximal `true` sub-intervals of a boolean-valued mask produced by
/// [`lift::lift_base_sequence`] with [`BinOp::Eq`]/similar.
fn true_time_pieces(mask: &Temporal) -> Vec<(DateTime<Utc>, bool, DateTime<Utc>, bool)> {
    match mask {
        Temporal::Instant(i) => {
            if matches!(i.value(), Value::Bool(true)) {
                vec![(i.t(), true, i.t(), true)]
            } else {
                vec![]
            }
        }
        Temporal::SequenceSet(ss) => ss
            .sequences()
            .iter()
            .filter(|s| matches!(s.start_value(), Value::Bool(true)))
            .map(|s| (s.lower(), s.lower_inc(), s.upper(), s.upper_inc()))
            .collect(),
        Temporal::Sequence(s) => {
            let instants = s.instants();
            let mut pieces = Vec::new();
            let mut run_start: Option<usize> = None;
            for (idx, inst) in instants.iter().enumerate() {
                let is_true = matches!(inst.value(), Value::Bool(true));
                if is_true {
                    run_start.get_or_insert(idx);
                } else if let Some(rs) = run_start.take() {
                    let lower_inc = if rs == 0 { s.lower_inc() } else { true };
                    pieces.push((instants[rs].t(), lower_inc, inst.t(), false));
                }
            }
            if let Some(rs) = run_start {
                let lower_inc = if rs == 0 { s.lower_inc() } else { true };
                pieces.push((instants[rs].t(), lower_inc, s.upper(), s.upper_inc()));
            }
            pieces
        }
    }
}

fn crop_pieces(seq: &TSequence, pieces: &[(DateTime<Utc>, bool, DateTime<Utc>, bool)]) -> Result<Option<Temporal>> {
    let mut out = Vec::new();
    for &(l, linc, u, uinc) in pieces {
        if let Some(s) = crop_to_span(seq, l, linc, u, uinc)? {
            out.push(Temporal::Sequence(s));
        }
    }
    if out.is_empty() {
        Ok(None)
    } else {
        lift::concat_sequence_pieces(out).map(Some)
    }
}

fn at_value_seq(seq: &TSequence, v: &Value) -> Result<Option<Temporal>> {
    if seq.interpolation() == Interpolation::Discrete {
        let instants: Vec<TInstant> = seq
            .instants()
            .iter()
            .filter(|i| i.value() == v)
            .cloned()
            .collect();
        return if instants.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Temporal::Sequence(TSequence::new(
                instants,
                true,
                true,
                Interpolation::Discrete,
                true,
            )?)))
        };
    }
    let mask = lift::lift_base_sequence(seq, v, BinOp::Eq)?;
    crop_pieces(seq, &true_time_pieces(&mask))
}

fn minus_value_seq(seq: &TSequence, v: &Value) -> Result<Option<Temporal>> {
    if seq.interpolation() == Interpolation::Discrete {
        let instants: Vec<TInstant> = seq
            .instants()
            .iter()
            .filter(|i| i.value() != v)
            .cloned()
            .collect();
        return if instants.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Temporal::Sequence(TSequence::new(
                instants,
                true,
                true,
                Interpolation::Discrete,
                true,
            )?)))
        };
    }
    let mask = lift::lift_base_sequence(seq, v, BinOp::Ne)?;
    crop_pieces(seq, &true_time_pieces(&mask))
}

pub fn at_value(temp: &Temporal, v: &Value) -> Result<Option<Temporal>> {
    dispatch(temp, |i| i.value() == v, |s| at_value_seq(s, v))
}

pub fn minus_value(temp: &Temporal, v: &Value) -> Result<Option<Temporal>> {
    dispatch(temp, |i| i.value() != v, |s| minus_value_seq(s, v))
}

pub fn at_values(temp: &Temporal, vs: &[Value]) -> Result<Option<Temporal>> {
    let mut pieces = Vec::new();
    for v in vs {
        if let Some(r) = at_value(temp, v)? {
            pieces.push(r);
        }
    }
    if pieces.is_empty() {
        Ok(None)
    } else {
        lift::concat_sequence_pieces(pieces).map(Some)
    }
}

pub fn minus_values(temp: &Temporal, vs: &[Value]) -> Result<Option<Temporal>> {
    match at_values(temp, vs)? {
        None => Ok(Some(temp.clone())),
        Some(retained) => time_complement(temp, &retained),
    }
}

/// Value-span restriction for number sequences (spec §4.C6 "number
/// sequence vs value-span").
fn at_span_seq(seq: &TSequence, span: &FloatSpan) -> Result<Option<Temporal>> {
    match seq.interpolation() {
        Interpolation::Discrete => {
            let instants: Vec<TInstant> = seq
                .instants()
                .iter()
                .filter(|i| i.value().as_f64().is_some_and(|v| span.contains(v)))
                .cloned()
                .collect();
            if instants.is_empty() {
                Ok(None)
            } else {
                Ok(Some(Temporal::Sequence(TSequence::new(
                    instants,
                    true,
                    true,
                    Interpolation::Discrete,
                    true,
                )?)))
            }
        }
        Interpolation::Step => {
            let instants = seq.instants();
            let mut pieces = Vec::new();
            let mut run_start: Option<usize> = None;
            for (idx, inst) in instants.iter().enumerate() {
                let inside = inst.value().as_f64().is_some_and(|v| span.contains(v));
                if inside {
                    run_start.get_or_insert(idx);
                } else if let Some(rs) = run_start.take() {
                    let lower_inc = if rs == 0 { seq.lower_inc() } else { true };
                    pieces.push((instants[rs].t(), lower_inc, inst.t(), false));
                }
            }
            if let Some(rs) = run_start {
                let lower_inc = if rs == 0 { seq.lower_inc() } else { true };
                pieces.push((instants[rs].t(), lower_inc, seq.upper(), seq.upper_inc()));
            }
            crop_pieces(seq, &pieces)
        }
        Interpolation::Linear => {
            let mut pieces = Vec::new();
            for w in seq.instants().windows(2) {
                let (a, b) = (&w[0], &w[1]);
                let (Some(v0), Some(v1)) = (a.value().as_f64(), b.value().as_f64()) else {
                    continue;
                };
                for (alpha_lo, lo_inc, alpha_hi, hi_inc) in value_range_on_segment(v0, v1, span) {
                    let total = (b.t() - a.t()).num_microseconds().unwrap_or(1) as f64;
                    let t_lo = a.t() + chrono::Duration::microseconds((total * alpha_lo).round() as i64);
                    let t_hi = a.t() + chrono::Duration::microseconds((total * alpha_hi).round() as i64);
                    pieces.push((t_lo, lo_inc, t_hi, hi_inc));
                }
            }
            if seq.num_instants() == 1 {
                if let Some(v) = seq.start_value().as_f64() {
                    if span.contains(v) {
                        pieces.push((seq.lower(), true, seq.upper(), true));
                    }
                }
            }
            crop_pieces(seq, &pieces)
        }
    }
}

/// Sub-intervals of `[0, 1]` (as `alpha`) where the affine function from
/// `v0` to `v1` lies within `span`.
fn value_range_on_segment(v0: f64, v1: f64, span: &FloatSpan) -> Vec<(f64, bool, f64, bool)> {
    if (v1 - v0).abs() < f64::EPSILON {
        return if span.contains(v0) {
            vec![(0.0, true, 1.0, true)]
        } else {
            vec![]
        };
    }
    let t_for = |target: f64| (target - v0) / (v1 - v0);
    let (lo, hi) = (v0.min(v1), v0.max(v1));
    let mut candidates = vec![(0.0, true), (1.0, true)];
    if span.lower() > lo && span.lower() < hi {
        candidates.push((t_for(span.lower()), span.lower_inc()));
    }
    if span.upper() > lo && span.upper() < hi {
        candidates.push((t_for(span.upper()), !span.upper_inc()));
    }
    candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());
    let mut out = Vec::new();
    for w in candidates.windows(2) {
        let (a_alpha, a_open) = w[0];
        let (b_alpha, _) = w[1];
        let mid = (a_alpha + b_alpha) / 2.0;
        let mid_val = v0 + (v1 - v0) * mid;
        if span.contains(mid_val) {
            out.push((a_alpha, !a_open || a_alpha == 0.0, b_alpha, true));
        }
    }
    out
}

fn minus_span_seq(seq: &TSequence, span: &FloatSpan) -> Result<Option<Temporal>> {
    match at_span_seq(seq, span)? {
        None => Ok(Some(Temporal::Sequence(seq.clone()))),
        Some(retained) => time_complement(&Temporal::Sequence(seq.clone()), &retained),
    }
}

pub fn at_span(temp: &Temporal, span: &FloatSpan) -> Result<Option<Temporal>> {
    dispatch(
        temp,
        |i| i.value().as_f64().is_some_and(|v| span.contains(v)),
        |s| at_span_seq(s, span),
    )
}

pub fn minus_span(temp: &Temporal, span: &FloatSpan) -> Result<Option<Temporal>> {
    dispatch(
        temp,
        |i| i.value().as_f64().is_some_and(|v| !span.contains(v)),
        |s| minus_span_seq(s, span),
    )
}

pub fn at_span_set(temp: &Temporal, spans: &FloatSpanSet) -> Result<Option<Temporal>> {
    let mut pieces = Vec::new();
    for span in spans.spans() {
        if let Some(r) = at_span(temp, span)? {
            pieces.push(r);
        }
    }
    if pieces.is_empty() {
        Ok(None)
    } else {
        lift::concat_sequence_pieces(pieces).map(Some)
    }
}

pub fn minus_span_set(temp: &Temporal, spans: &FloatSpanSet) -> Result<Option<Temporal>> {
    match at_span_set(temp, spans)? {
        None => Ok(Some(temp.clone())),
        Some(retained) => time_complement(temp, &retained),
    }
}

pub fn at_timestamp(temp: &Temporal, t: DateTime<Utc>) -> Result<Option<Temporal>> {
    Ok(temp.value_at(t)?.map(|v| Temporal::Instant(TInstant::new(v, t))))
}

pub fn minus_timestamp(temp: &Temporal, t: DateTime<Utc>) -> Result<Option<Temporal>> {
    minus_timestamp_set(temp, &[t])
}

pub fn at_timestamp_set(temp: &Temporal, ts: &[DateTime<Utc>]) -> Result<Option<Temporal>> {
    let mut sorted = ts.to_vec();
    sorted.sort();
    sorted.dedup();
    let mut instants = Vec::new();
    for t in sorted {
        if let Some(v) = temp.value_at(t)? {
            instants.push(TInstant::new(v, t));
        }
    }
    if instants.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Temporal::Sequence(TSequence::new(
            instants,
            true,
            true,
            Interpolation::Discrete,
            true,
        )?)))
    }
}

pub fn minus_timestamp_set(temp: &Temporal, ts: &[DateTime<Utc>]) -> Result<Option<Temporal>> {
    let domain = temp.time()?;
    let in_domain: Vec<DateTime<Utc>> = ts.iter().copied().filter(|t| domain.contains(*t)).collect();
    if in_domain.is_empty() {
        return Ok(Some(temp.clone()));
    }
    let holes: Vec<TstzSpan> = in_domain
        .iter()
        .map(|t| TstzSpan::new(*t, *t, true, true))
        .collect::<Result<Vec<_>>>()?;
    let holes_ss = TstzSpanSet::new(holes)?;
    match domain.difference(&holes_ss) {
        None => Ok(None),
        Some(complement) => at_timestamp_span_set(temp, &complement),
    }
}

pub fn at_timestamp_span(temp: &Temporal, span: &TstzSpan) -> Result<Option<Temporal>> {
    dispatch(
        temp,
        |i| span.contains(i.t()),
        |s| crop_to_span(s, span.lower(), span.lower_inc(), span.upper(), span.upper_inc()).map(|o| o.map(Temporal::Sequence)),
    )
}

pub fn minus_timestamp_span(temp: &Temporal, span: &TstzSpan) -> Result<Option<Temporal>> {
    let domain = temp.time()?;
    let target_ss = TstzSpanSet::new(vec![*span])?;
    match domain.difference(&target_ss) {
        None => Ok(None),
        Some(complement) => at_timestamp_span_set(temp, &complement),
    }
}

pub fn at_timestamp_span_set(temp: &Temporal, spans: &TstzSpanSet) -> Result<Option<Temporal>> {
    let mut pieces = Vec::new();
    for span in spans.spans() {
        if let Some(r) = at_timestamp_span(temp, span)? {
            pieces.push(r);
        }
    }
    if pieces.is_empty() {
        Ok(None)
    } else {
        lift::concat_sequence_pieces(pieces).map(Some)
    }
}

pub fn minus_timestamp_span_set(temp: &Temporal, spans: &TstzSpanSet) -> Result<Option<Temporal>> {
    let domain = temp.time()?;
    match domain.difference(spans) {
        None => Ok(None),
        Some(complement) => at_timestamp_span_set(temp, &complement),
    }
}

/// `temp`'s time domain minus the time domain of `retained` (spec's
/// recurring "minus is the time-complement of at" pattern).
fn time_complement(temp: &Temporal, retained: &Temporal) -> Result<Option<Temporal>> {
    let domain = temp.time()?;
    let retained_time = retained.time()?;
    match domain.difference(&retained_time) {
        None => Ok(None),
        Some(complement) => at_timestamp_span_set(temp, &complement),
    }
}

/// **Temporal-number vs temporal-box**: combine `at(value-span)` with
/// `at(time-span)`; `minus` is the time-complement of `at`, not a
/// distributive combination (spec §4.C6).
pub fn at_box(temp: &Temporal, tbox: &TBox) -> Result<Option<Temporal>> {
    let mut cur = Some(temp.clone());
    if let Some(vs) = &tbox.value_span {
        cur = match cur {
            Some(t) => at_span(&t, vs)?,
            None => None,
        };
    }
    if let Some(ts) = &tbox.time_span {
        cur = match cur {
            Some(t) => at_timestamp_span(&t, ts)?,
            None => None,
        };
    }
    Ok(cur)
}

pub fn minus_box(temp: &Temporal, tbox: &TBox) -> Result<Option<Temporal>> {
    match at_box(temp, tbox)? {
        None => Ok(Some(temp.clone())),
        Some(retained) => time_complement(temp, &retained),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::IntSpan;
    use chrono::TimeZone;

    fn t(days: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::days(days)
    }

    fn linear_seq(vals: &[(f64, i64)]) -> TSequence {
        let instants = vals
            .iter()
            .map(|(v, d)| TInstant::new(Value::Float(*v), t(*d)))
            .collect();
        TSequence::new(instants, true, true, Interpolation::Linear, false).unwrap()
    }

    #[test]
    fn s4_restrict_to_timestamp_set() {
        let seq = linear_seq(&[(0.0, 0), (10.0, 10)]);
        let temp = Temporal::Sequence(seq);
        let at = at_timestamp_set(&temp, &[t(2), t(5), t(12)]).unwrap().unwrap();
        assert_eq!(at.num_instants(), 2);
        assert_eq!(at.value_at(t(2)).unwrap(), Some(Value::Float(2.0)));
        assert_eq!(at.value_at(t(5)).unwrap(), Some(Value::Float(5.0)));

        let minus = minus_timestamp_set(&temp, &[t(2), t(5), t(12)]).unwrap().unwrap();
        let Temporal::SequenceSet(ss) = minus else {
            panic!("expected a sequence-set")
        };
        assert_eq!(ss.num_sequences(), 3);
        assert_eq!(ss.sequences()[0].upper(), t(2));
        assert!(!ss.sequences()[0].upper_inc());
        assert_eq!(ss.sequences()[2].lower(), t(5));
        assert!(!ss.sequences()[2].lower_inc());
    }

    #[test]
    fn restrict_to_value_crossing() {
        // tfloat [1@t0, 3@t2], at value 2 => singleton at the crossing t1.
        let seq = linear_seq(&[(1.0, 0), (3.0, 2)]);
        let temp = Temporal::Sequence(seq);
        let at = at_value(&temp, &Value::Float(2.0)).unwrap().unwrap();
        assert_eq!(at.num_instants(), 1);
        assert_eq!(*at.start_value(), Value::Float(2.0));
        assert_eq!(at.lower(), t(1));

        let minus = minus_value(&temp, &Value::Float(2.0)).unwrap().unwrap();
        let Temporal::SequenceSet(ss) = minus else {
            panic!("expected a sequence-set")
        };
        assert_eq!(ss.num_sequences(), 2);
    }

    #[test]
    fn p3_at_minus_partition() {
        let seq = linear_seq(&[(0.0, 0), (10.0, 10)]);
        let temp = Temporal::Sequence(seq);
        let at = at_value(&temp, &Value::Float(5.0)).unwrap().unwrap();
        let minus = minus_value(&temp, &Value::Float(5.0)).unwrap().unwrap();
        let union_time = at.time().unwrap().union(&minus.time().unwrap());
        assert_eq!(union_time.span().lower(), temp.lower());
        assert_eq!(union_time.span().upper(), temp.upper());
    }

    #[test]
    fn value_span_restriction_clips_linear_segment() {
        let seq = linear_seq(&[(0.0, 0), (10.0, 10)]);
        let temp = Temporal::Sequence(seq);
        let span = FloatSpan::new(2.0, 8.0, true, true).unwrap();
        let at = at_span(&temp, &span).unwrap().unwrap();
        assert_eq!(at.lower(), t(2));
        assert_eq!(at.upper(), t(8));
    }

    #[test]
    fn discrete_value_restriction_filters_instants() {
        let instants = vec![
            TInstant::new(Value::Int(1), t(0)),
            TInstant::new(Value::Int(2), t(1)),
            TInstant::new(Value::Int(1), t(2)),
        ];
        let seq = TSequence::new(instants, true, true, Interpolation::Discrete, false).unwrap();
        let temp = Temporal::Sequence(seq);
        let at = at_value(&temp, &Value::Int(1)).unwrap().unwrap();
        assert_eq!(at.num_instants(), 2);
        let _ = IntSpan::new(0, 1, true, false);
    }
}
