//! C4 — segment arithmetic: evaluating, and finding crossings within, a
//! single pair of adjacent samples.

use chrono::{DateTime, Utc};

use crate::errors::{Result, TemporalError};
use crate::point::Point2;
use crate::types::Interpolation;
use crate::value::Value;

use super::instant::TInstant;

fn fraction(t1: DateTime<Utc>, t2: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    let total = (t2 - t1).num_microseconds().unwrap_or(1).max(1) as f64;
    let elapsed = (t - t1).num_microseconds().unwrap_or(0) as f64;
    elapsed / total
}

/// Value of the segment `(s1, s2)` at timestamp `t ∈ [t1, t2]` under
/// `interp`. `inclusive_upper` controls whether `t == t2` is answered with
/// `s2`'s value (the caller is asking "at the closed upper bound") versus
/// held at `s1`'s value (the open-upper step convention, I5).
pub fn value_at(
    s1: &TInstant,
    s2: &TInstant,
    interp: Interpolation,
    t: DateTime<Utc>,
    inclusive_upper: bool,
) -> Result<Value> {
    if t < s1.t() || t > s2.t() {
        return Err(TemporalError::Internal(
            "value_at called outside the segment's domain".into(),
        ));
    }
    if t == s1.t() {
        return Ok(s1.value().clone());
    }
    if t == s2.t() && inclusive_upper {
        return Ok(s2.value().clone());
    }
    match interp {
        Interpolation::Discrete => Err(TemporalError::InterpolationMismatch(
            "discrete sequences have no value between instants".into(),
        )),
        Interpolation::Step => Ok(s1.value().clone()),
        Interpolation::Linear => {
            let alpha = fraction(s1.t(), s2.t(), t);
            lerp_value(s1.value(), s2.value(), alpha)
        }
    }
}

pub fn lerp_value(a: &Value, b: &Value, alpha: f64) -> Result<Value> {
    match (a, b) {
        (Value::Point(p1), Value::Point(p2)) => Ok(Value::Point(p1.lerp(*p2, alpha))),
        _ => {
            let (av, bv) = (
                a.as_f64().ok_or_else(|| non_continuous(a))?,
                b.as_f64().ok_or_else(|| non_continuous(b))?,
            );
            let v = av + (bv - av) * alpha;
            Ok(match (a, b) {
                (Value::Int(_), Value::Int(_)) => Value::Int(v.round() as i64),
                _ => Value::Float(v),
            })
        }
    }
}

fn non_continuous(v: &Value) -> TemporalError {
    TemporalError::InterpolationMismatch(format!(
        "base type {:?} does not support linear interpolation",
        v.base_type()
    ))
}

/// Timestamp (and value) at which a strictly monotonic linear segment
/// reaches `value`. Returns `None` for a constant segment or a value not
/// strictly between the endpoints.
pub fn linear_segment_meets_value(
    s1: &TInstant,
    s2: &TInstant,
    value: &Value,
) -> Option<(DateTime<Utc>, Value)> {
    let v1 = s1.value().as_f64()?;
    let v2 = s2.value().as_f64()?;
    let target = value.as_f64()?;
    if v1 == v2 {
        return None;
    }
    let alpha = (target - v1) / (v2 - v1);
    if !(alpha > 0.0 && alpha < 1.0) {
        return None;
    }
    let total = (s2.t() - s1.t()).num_microseconds()?;
    let micros = (total as f64 * alpha).round() as i64;
    let t = s1.t() + chrono::Duration::microseconds(micros);
    Some((t, value.clone()))
}

/// Intersection of two linear (or mixed linear/step) segments sharing the
/// same time domain `[t1, t2]`: the timestamp (expressed as a fraction
/// `alpha ∈ [0, 1]`) at which the two one-dimensional functions of time
/// agree, plus their common value there. `None` if parallel (including the
/// degenerate case of two constant step segments).
pub fn two_segments_intersection(
    a1: &Value,
    a2: &Value,
    a_interp: Interpolation,
    b1: &Value,
    b2: &Value,
    b_interp: Interpolation,
) -> Option<(f64, f64, f64)> {
    let (av1, av2) = (a1.as_f64()?, slope_end(a1, a2, a_interp)?);
    let (bv1, bv2) = (b1.as_f64()?, slope_end(b1, b2, b_interp)?);
    let denom = (av2 - av1) - (bv2 - bv1);
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let alpha = (bv1 - av1) / denom;
    if !(0.0..=1.0).contains(&alpha) {
        return None;
    }
    let va = av1 + (av2 - av1) * alpha;
    let vb = bv1 + (bv2 - bv1) * alpha;
    Some((alpha, va, vb))
}

fn slope_end(v1: &Value, v2: &Value, interp: Interpolation) -> Option<f64> {
    match interp {
        Interpolation::Step | Interpolation::Discrete => v1.as_f64(),
        Interpolation::Linear => v2.as_f64(),
    }
}

/// Minimum-distance instant between two moving `Point2`s over `[0, 1]`,
/// closed form (spec §9 Open Question, generalized from the `tfloat*tfloat`
/// zero-derivative formula to a 2-D difference vector).
pub fn point_turning_point(a1: Point2, a2: Point2, b1: Point2, b2: Point2) -> Option<f64> {
    let dx0 = a1.x - b1.x;
    let dy0 = a1.y - b1.y;
    let ddx = (a2.x - a1.x) - (b2.x - b1.x);
    let ddy = (a2.y - a1.y) - (b2.y - b1.y);
    let denom = ddx * ddx + ddy * ddy;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let alpha = -(dx0 * ddx + dy0 * ddy) / denom;
    if alpha > 0.0 && alpha < 1.0 {
        Some(alpha)
    } else {
        None
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
    fn linear_midpoint() {
        let s1 = TInstant::new(Value::Float(0.0), t(0));
        let s2 = TInstant::new(Value::Float(10.0), t(10));
        let v = value_at(&s1, &s2, Interpolation::Linear, t(5), false).unwrap();
        assert_eq!(v, Value::Float(5.0));
    }

    #[test]
    fn step_holds_last_value_until_closed_upper() {
        let s1 = TInstant::new(Value::Int(1), t(0));
        let s2 = TInstant::new(Value::Int(2), t(10));
        assert_eq!(
            value_at(&s1, &s2, Interpolation::Step, t(5), false).unwrap(),
            Value::Int(1)
        );
        assert_eq!(
            value_at(&s1, &s2, Interpolation::Step, t(10), true).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn meets_value_strictly_between() {
        let s1 = TInstant::new(Value::Float(0.0), t(0));
        let s2 = TInstant::new(Value::Float(10.0), t(10));
        let (ts, v) = linear_segment_meets_value(&s1, &s2, &Value::Float(4.0)).unwrap();
        assert_eq!(ts, t(4));
        assert_eq!(v, Value::Float(4.0));
        assert!(linear_segment_meets_value(&s1, &s2, &Value::Float(0.0)).is_none());
        assert!(linear_segment_meets_value(&s1, &s2, &Value::Float(10.0)).is_none());
    }

    #[test]
    fn segment_crossing_scenario_s1() {
        // tfloat [1@t0, 3@t2] compared `< 2`: crossing is at alpha=0.5
        let crossing = linear_segment_meets_value(
            &TInstant::new(Value::Float(1.0), t(0)),
            &TInstant::new(Value::Float(3.0), t(2)),
            &Value::Float(2.0),
        )
        .unwrap();
        assert_eq!(crossing.0, t(1));
    }
}
