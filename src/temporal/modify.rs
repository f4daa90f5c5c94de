//! C7 — the modification engine: insert, update, delete, append and merge,
//! expressed in terms of C6 restriction and the C3 join test (spec §4.C7).

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::errors::{Result, TemporalError};
use crate::span_set::TstzSpanSet;
use crate::types::Interpolation;
use crate::value::Value;

use super::instant::TInstant;
use super::restrict;
use super::sequence::TSequence;
use super::sequence_set::{try_join, TSequenceSet};
use super::temporal::Temporal;

/// The interpolation a bare instant should adopt when woven in among the
/// pieces of `other` — an instant alone carries no interpolation of its own.
fn common_interpolation(a: &Temporal, b: &Temporal) -> Interpolation {
    match a {
        Temporal::Instant(_) => b.interpolation(),
        _ => a.interpolation(),
    }
}

pub(crate) fn to_piece_sequences(temp: &Temporal, interp_hint: Interpolation) -> Result<Vec<TSequence>> {
    match temp {
        Temporal::Instant(i) => Ok(vec![TSequence::new(vec![i.clone()], true, true, interp_hint, false)?]),
        Temporal::Sequence(s) => Ok(vec![s.clone()]),
        Temporal::SequenceSet(ss) => Ok(ss.sequences().to_vec()),
    }
}

/// Collapses a list of disjoint-or-joinable sequences back down to the
/// lowest subtype that represents it (spec's subtype-promotion hierarchy
/// run in reverse once the pieces are settled).
pub(crate) fn finalize(pieces: Vec<TSequence>) -> Result<Temporal> {
    if pieces.is_empty() {
        return Err(TemporalError::Internal("modification produced no pieces".into()));
    }
    let set = TSequenceSet::new(pieces, true)?;
    if set.num_sequences() == 1 {
        let s = set.sequences()[0].clone();
        if s.num_instants() == 1 {
            Ok(Temporal::Instant(s.instants()[0].clone()))
        } else {
            Ok(Temporal::Sequence(s))
        }
    } else {
        Ok(Temporal::SequenceSet(set))
    }
}

/// `insert(A, B, connect)`: promote both to a common subtype, concatenate in
/// time order, bridging gaps with a synthetic connecting segment when
/// `connect` is set.
pub fn insert(a: &Temporal, b: &Temporal, connect: bool) -> Result<Temporal> {
    let interp = common_interpolation(a, b);
    let mut pieces = to_piece_sequences(a, interp)?;
    pieces.extend(to_piece_sequences(b, interp)?);
    pieces.sort_by_key(|s| s.lower());
    let reconciled = reconcile_insert(pieces, connect)?;
    finalize(reconciled)
}

fn reconcile_insert(pieces: Vec<TSequence>, connect: bool) -> Result<Vec<TSequence>> {
    let mut out: Vec<TSequence> = Vec::new();
    for mut cur in pieces {
        if let Some(prev) = out.last() {
            if cur.lower() < prev.upper() {
                return Err(TemporalError::ValueDisagreement {
                    t: cur.lower(),
                    message: "insert requires disjoint time domains; use merge for overlapping values".into(),
                });
            }
            if cur.lower() == prev.upper() {
                if prev.upper_inc() && cur.lower_inc() {
                    if prev.end_value() != cur.start_value() {
                        return Err(TemporalError::ValueDisagreement {
                            t: cur.lower(),
                            message: "insert requires equal value at a shared boundary instant".into(),
                        });
                    }
                    let rest = cur.instants()[1..].to_vec();
                    if rest.is_empty() {
                        continue;
                    }
                    cur = TSequence::new(rest, false, cur.upper_inc(), cur.interpolation(), false)?;
                }
                // else: complementary inclusivity — already touching cleanly,
                // left for normalization's join test to merge.
            } else if connect && prev.interpolation() == Interpolation::Linear && cur.interpolation() == Interpolation::Linear {
                let connecting = TSequence::new(
                    vec![
                        TInstant::new(prev.end_value().clone(), prev.upper()),
                        TInstant::new(cur.start_value().clone(), cur.lower()),
                    ],
                    false,
                    false,
                    Interpolation::Linear,
                    false,
                )?;
                out.push(connecting);
            }
        }
        out.push(cur);
    }
    Ok(out)
}

/// `update(A, B, connect) = insert(minus(A, time(B)), B, connect)`.
pub fn update(a: &Temporal, b: &Temporal, connect: bool) -> Result<Temporal> {
    let b_time = b.time()?;
    match restrict::minus_timestamp_span_set(a, &b_time)? {
        Some(trimmed) => insert(&trimmed, b, connect),
        None => Ok(b.clone()),
    }
}

/// `delete(A, X, connect)`: remove the time domain `X`, and when `connect`
/// is set, glue the surviving pieces into a single sequence.
pub fn delete(a: &Temporal, x: &TstzSpanSet, connect: bool) -> Result<Option<Temporal>> {
    let Some(result) = restrict::minus_timestamp_span_set(a, x)? else {
        return Ok(None);
    };
    if !connect {
        return Ok(Some(result));
    }
    match result {
        Temporal::SequenceSet(ss) => {
            let interp = ss.interpolation();
            let mut instants = Vec::new();
            for s in ss.sequences() {
                instants.extend(s.instants().iter().cloned());
            }
            Ok(Some(Temporal::Sequence(TSequence::new(
                instants, true, true, interp, true,
            )?)))
        }
        other => Ok(Some(other)),
    }
}

/// `append_instant(A, inst, maxdist, maxt, expand)`. `expand` names the
/// source's in-place-reallocation hint; an owned `Vec`-backed sequence has
/// no distinct buffer path, so it is accepted but has no observable effect.
pub fn append_instant(
    a: &Temporal,
    inst: TInstant,
    maxdist: Option<f64>,
    maxt: Option<Duration>,
    _expand: bool,
) -> Result<Temporal> {
    let interp = a.interpolation();
    let mut pieces = to_piece_sequences(a, interp)?;
    let last = pieces.last().expect("a temporal value always has at least one piece");

    if inst.t() < last.upper() {
        return Err(TemporalError::OrderingViolation {
            t: inst.t(),
            message: "append_instant requires strictly increasing timestamps".into(),
        });
    }
    if inst.t() == last.upper() {
        if last.end_value() != inst.value() {
            return Err(TemporalError::ValueDisagreement {
                t: inst.t(),
                message: "append_instant at an existing timestamp must agree on value".into(),
            });
        }
        return Ok(a.clone());
    }

    let dist = last.end_value().distance(inst.value());
    let dt = inst.t() - last.upper();
    let split = maxdist.is_some_and(|m| dist.is_some_and(|d| d > m)) || maxt.is_some_and(|m| dt > m);

    if split {
        pieces.push(TSequence::new(vec![inst], true, true, interp, false)?);
    } else {
        let idx = pieces.len() - 1;
        let mut instants = pieces[idx].instants().to_vec();
        instants.push(inst);
        pieces[idx] = TSequence::new(instants, pieces[idx].lower_inc(), true, interp, true)?;
    }
    finalize(pieces)
}

/// `append_sequence(A, seq, expand)`.
pub fn append_sequence(a: &Temporal, seq: TSequence, _expand: bool) -> Result<Temporal> {
    let interp = common_interpolation(a, &Temporal::Sequence(seq.clone()));
    let mut pieces = to_piece_sequences(a, interp)?;
    let last = pieces.pop().expect("a temporal value always has at least one piece");
    match try_join(&last, &seq)? {
        Some(joined) => pieces.push(joined),
        None => {
            pieces.push(last);
            pieces.push(seq);
        }
    }
    finalize(pieces)
}

pub fn merge(a: &Temporal, b: &Temporal) -> Result<Temporal> {
    merge_array(&[a.clone(), b.clone()])
}

/// `merge_array(As)`: promote to the highest common subtype, sort by time,
/// and demand value agreement at any shared timestamp.
pub fn merge_array(items: &[Temporal]) -> Result<Temporal> {
    if items.is_empty() {
        return Err(TemporalError::InvalidInput(
            "merge_array requires at least one input".into(),
        ));
    }
    let interp = items
        .iter()
        .find_map(|t| match t {
            Temporal::Instant(_) => None,
            other => Some(other.interpolation()),
        })
        .unwrap_or(Interpolation::Discrete);

    let mut pieces = Vec::new();
    for item in items {
        pieces.extend(to_piece_sequences(item, interp)?);
    }
    pieces.sort_by_key(|s| s.lower());
    let merged = merge_overlapping(pieces)?;
    finalize(merged)
}

/// Mirrors I9's "separated" test (`sequence_set.rs`): two pieces only
/// genuinely overlap in time — and so need the value-agreement check of
/// [`merge_two`] — when they share more than a touching, non-inclusive
/// boundary instant (spec P5: agreement is only required "with inclusive
/// bounds on both sides").
fn overlaps_for_merge(prev: &TSequence, cur: &TSequence) -> bool {
    cur.lower() < prev.upper() || (cur.lower() == prev.upper() && prev.upper_inc() && cur.lower_inc())
}

fn merge_overlapping(pieces: Vec<TSequence>) -> Result<Vec<TSequence>> {
    let mut out: Vec<TSequence> = Vec::new();
    for cur in pieces {
        if let Some(prev) = out.last() {
            if overlaps_for_merge(prev, &cur) {
                let combined = merge_two(prev, &cur)?;
                out.pop();
                out.push(combined);
                continue;
            }
        }
        out.push(cur);
    }
    Ok(out)
}

fn merge_two(a: &TSequence, b: &TSequence) -> Result<TSequence> {
    if a.interpolation() != b.interpolation() {
        return Err(TemporalError::InterpolationMismatch(
            "merge requires matching interpolation on overlapping pieces".into(),
        ));
    }
    let mut by_time: BTreeMap<DateTime<Utc>, Value> = BTreeMap::new();
    for i in a.instants().iter().chain(b.instants().iter()) {
        match by_time.get(&i.t()) {
            Some(existing) if existing != i.value() => {
                return Err(TemporalError::ValueDisagreement {
                    t: i.t(),
                    message: "merge requires equal value at a shared timestamp".into(),
                })
            }
            Some(_) => {}
            None => {
                by_time.insert(i.t(), i.value().clone());
            }
        }
    }
    let instants: Vec<TInstant> = by_time.into_iter().map(|(t, v)| TInstant::new(v, t)).collect();
    let lower_inc = match a.lower().cmp(&b.lower()) {
        std::cmp::Ordering::Less => a.lower_inc(),
        std::cmp::Ordering::Greater => b.lower_inc(),
        std::cmp::Ordering::Equal => a.lower_inc() || b.lower_inc(),
    };
    let upper_inc = match a.upper().cmp(&b.upper()) {
        std::cmp::Ordering::Greater => a.upper_inc(),
        std::cmp::Ordering::Less => b.upper_inc(),
        std::cmp::Ordering::Equal => a.upper_inc() || b.upper_inc(),
    };
    TSequence::new(instants, lower_inc, upper_inc, a.interpolation(), true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    fn seq(vals: &[(f64, i64)], interp: Interpolation) -> TSequence {
        let instants = vals.iter().map(|(v, h)| TInstant::new(Value::Float(*v), t(*h))).collect();
        TSequence::new(instants, true, true, interp, false).unwrap()
    }

    #[test]
    fn insert_concatenates_disjoint_sequences() {
        let a = Temporal::Sequence(seq(&[(0.0, 0), (1.0, 1)], Interpolation::Linear));
        let b = Temporal::Sequence(seq(&[(5.0, 5), (6.0, 6)], Interpolation::Linear));
        let result = insert(&a, &b, false).unwrap();
        let Temporal::SequenceSet(ss) = result else {
            panic!("expected a sequence-set")
        };
        assert_eq!(ss.num_sequences(), 2);
    }

    #[test]
    fn insert_with_connect_bridges_the_gap() {
        // A connecting segment whose value happens to match at both ends is
        // joinable with its neighbors regardless of its slope, so a linear
        // connect collapses the whole insert into a single sequence.
        let a = Temporal::Sequence(seq(&[(0.0, 0), (1.0, 1)], Interpolation::Linear));
        let b = Temporal::Sequence(seq(&[(9.0, 5), (10.0, 6)], Interpolation::Linear));
        let result = insert(&a, &b, true).unwrap();
        let Temporal::Sequence(s) = result else {
            panic!("expected a single joined sequence")
        };
        assert_eq!(s.lower(), t(0));
        assert_eq!(s.upper(), t(6));
        assert_eq!(s.value_at(t(1)).unwrap(), Some(Value::Float(1.0)));
        assert_eq!(s.value_at(t(5)).unwrap(), Some(Value::Float(9.0)));
    }

    #[test]
    fn insert_rejects_disagreeing_shared_boundary() {
        let a = Temporal::Sequence(seq(&[(0.0, 0), (1.0, 1)], Interpolation::Linear));
        let b = Temporal::Sequence(seq(&[(9.0, 1), (2.0, 2)], Interpolation::Linear));
        assert!(insert(&a, &b, false).is_err());
    }

    #[test]
    fn append_instant_extends_in_place_within_threshold() {
        let a = Temporal::Sequence(seq(&[(0.0, 0), (1.0, 1)], Interpolation::Linear));
        let inst = TInstant::new(Value::Float(5.0), t(2));
        let result = append_instant(&a, inst, None, None, false).unwrap();
        assert_eq!(result.num_instants(), 3);
    }

    #[test]
    fn append_instant_splits_past_maxt() {
        let a = Temporal::Sequence(seq(&[(0.0, 0), (1.0, 1)], Interpolation::Linear));
        let inst = TInstant::new(Value::Float(2.0), t(10));
        let result = append_instant(&a, inst, None, Some(Duration::hours(2)), false).unwrap();
        let Temporal::SequenceSet(ss) = result else {
            panic!("expected a sequence-set")
        };
        assert_eq!(ss.num_sequences(), 2);
    }

    #[test]
    fn merge_agrees_at_shared_timestamp() {
        let a = Temporal::Sequence(seq(&[(0.0, 0), (1.0, 1)], Interpolation::Linear));
        let b = Temporal::Sequence(seq(&[(1.0, 1), (9.0, 2)], Interpolation::Linear));
        let result = merge(&a, &b).unwrap();
        assert_eq!(result.num_instants(), 3);
    }

    #[test]
    fn merge_rejects_disagreement_at_shared_timestamp() {
        let a = Temporal::Sequence(seq(&[(0.0, 0), (1.0, 1)], Interpolation::Linear));
        let b = Temporal::Sequence(seq(&[(9.0, 1), (2.0, 2)], Interpolation::Linear));
        assert!(merge(&a, &b).is_err());
    }

    #[test]
    fn merge_allows_disagreement_at_an_exclusive_touching_boundary() {
        // a ends "...,5)@t1" (exclusive upper), b starts "(3,...@t1" (exclusive
        // lower): the boundary instant is excluded on both sides, so it is
        // not a genuinely shared timestamp (I9) and P5's agreement
        // requirement does not apply.
        let a_instants = vec![TInstant::new(Value::Float(0.0), t(0)), TInstant::new(Value::Float(5.0), t(1))];
        let a = Temporal::Sequence(TSequence::new(a_instants, true, false, Interpolation::Linear, false).unwrap());
        let b_instants = vec![TInstant::new(Value::Float(3.0), t(1)), TInstant::new(Value::Float(9.0), t(2))];
        let b = Temporal::Sequence(TSequence::new(b_instants, false, true, Interpolation::Linear, false).unwrap());
        let result = merge(&a, &b).unwrap();
        let Temporal::SequenceSet(ss) = result else {
            panic!("expected a sequence-set, boundary values disagree so the pieces do not join")
        };
        assert_eq!(ss.num_sequences(), 2);
    }
}
