//! C8 — the tiling engine: aligned bins over a span, a span-set or a
//! temporal value's value/time domain (spec §4.C8). Built on top of C2 span
//! algebra and C6 restriction: a value-bin or time-bin fragment of a
//! temporal value is computed by simply restricting to that bin's span.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{Result, TemporalError};
use crate::span::{Date, DateSpan, FloatSpan, IntSpan, TstzSpan};
use crate::span_set::{FloatSpanSet, TstzSpanSet};

use super::restrict::{self, TBox};
use super::temporal::Temporal;

fn overflow() -> TemporalError {
    TemporalError::OutOfRange("bin alignment overflow".into())
}

fn align_down_i64(v: i64, size: i64, origin: i64) -> Result<i64> {
    let d = v.checked_sub(origin).ok_or_else(overflow)?;
    let rem = d.rem_euclid(size);
    origin.checked_add(d - rem).ok_or_else(overflow)
}

fn align_up_i64(v: i64, size: i64, origin: i64) -> Result<i64> {
    let d = v.checked_sub(origin).ok_or_else(overflow)?;
    let rem = d.rem_euclid(size);
    let base = if rem == 0 { d } else { d + (size - rem) };
    origin.checked_add(base).ok_or_else(overflow)
}

/// `span_num_bins` for an integer span: count plus the aligned `[start, end)`.
pub fn int_span_num_bins(span: &IntSpan, size: i64, origin: i64) -> Result<(i64, i64, i64)> {
    if size <= 0 {
        return Err(TemporalError::InvalidInput("bin size must be a positive integer".into()));
    }
    let start = align_down_i64(span.lower(), size, origin)?;
    let end = align_up_i64(span.upper(), size, origin)?;
    let count = (end - start) / size;
    Ok((count, start, end))
}

pub fn int_span_bins(span: &IntSpan, size: i64, origin: i64) -> Result<Vec<IntSpan>> {
    let (count, start, _end) = int_span_num_bins(span, size, origin)?;
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let lo = start.checked_add(i.checked_mul(size).ok_or_else(overflow)?).ok_or_else(overflow)?;
        let hi = lo.checked_add(size).ok_or_else(overflow)?;
        let bin = IntSpan::new(lo, hi, true, false)?;
        if let Some(clip) = bin.intersection(span) {
            out.push(clip);
        }
    }
    Ok(out)
}

/// `span_num_bins` for a date span — dates tile in whole-day counts; a
/// calendar-month period has no fixed day count, so it is out of scope here
/// (spec's "the `months` component is rejected for day-aligned date bins").
pub fn date_span_num_bins(span: &DateSpan, size: i32, origin: Date) -> Result<(i64, Date, Date)> {
    if size <= 0 {
        return Err(TemporalError::InvalidInput("bin size must be a positive day count".into()));
    }
    let start = align_down_i64(span.lower().0 as i64, size as i64, origin.0 as i64)?;
    let end = align_up_i64(span.upper().0 as i64, size as i64, origin.0 as i64)?;
    let count = (end - start) / size as i64;
    Ok((count, Date(start as i32), Date(end as i32)))
}

pub fn date_span_bins(span: &DateSpan, size: i32, origin: Date) -> Result<Vec<DateSpan>> {
    let (count, start, _end) = date_span_num_bins(span, size, origin)?;
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let lo = Date(start.0 + (i as i32) * size);
        let hi = Date(lo.0 + size);
        let bin = DateSpan::new(lo, hi, true, false)?;
        if let Some(clip) = bin.intersection(span) {
            out.push(clip);
        }
    }
    Ok(out)
}

pub fn float_span_num_bins(span: &FloatSpan, size: f64, origin: f64) -> Result<(i64, f64, f64)> {
    if size.is_nan() || size <= 0.0 {
        return Err(TemporalError::InvalidInput("bin size must be > 0".into()));
    }
    let start = ((span.lower() - origin) / size).floor() * size + origin;
    let raw_end = ((span.upper() - origin) / size).ceil() * size + origin;
    let end = if raw_end <= start { start + size } else { raw_end };
    let count = ((end - start) / size).round() as i64;
    Ok((count, start, end))
}

pub fn float_span_bins(span: &FloatSpan, size: f64, origin: f64) -> Result<Vec<FloatSpan>> {
    let (count, start, _end) = float_span_num_bins(span, size, origin)?;
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let lo = start + (i as f64) * size;
        let hi = lo + size;
        let bin = FloatSpan::new(lo, hi, true, false)?;
        if let Some(clip) = bin.intersection(span) {
            out.push(clip);
        }
    }
    Ok(out)
}

/// `spanset_bins` for a float span-set: per bin, the bounding span of the
/// span-set's intersection with that bin.
pub fn float_spanset_bins(ss: &FloatSpanSet, size: f64, origin: f64) -> Result<Vec<FloatSpan>> {
    let bins = float_span_bins(&ss.span(), size, origin)?;
    let mut out = Vec::new();
    for bin in bins {
        let mut acc: Option<FloatSpan> = None;
        for s in ss.spans() {
            if let Some(i) = s.intersection(&bin) {
                acc = Some(match acc {
                    Some(a) => a.hull(&i),
                    None => i,
                });
            }
        }
        if let Some(a) = acc {
            out.push(a);
        }
    }
    Ok(out)
}

pub fn tstz_span_num_bins(span: &TstzSpan, size: Duration, origin: DateTime<Utc>) -> Result<(i64, DateTime<Utc>, DateTime<Utc>)> {
    let size_us = size.num_microseconds().ok_or_else(overflow)?;
    if size_us <= 0 {
        return Err(TemporalError::InvalidInput("bin size must be a positive duration".into()));
    }
    let lower_us = (span.lower() - origin).num_microseconds().ok_or_else(overflow)?;
    let upper_us = (span.upper() - origin).num_microseconds().ok_or_else(overflow)?;
    let start_us = align_down_i64(lower_us, size_us, 0)?;
    let end_us = align_up_i64(upper_us, size_us, 0)?;
    let count = (end_us - start_us) / size_us;
    let start = origin + Duration::microseconds(start_us);
    let end = origin + Duration::microseconds(end_us);
    Ok((count, start, end))
}

pub fn tstz_span_bins(span: &TstzSpan, size: Duration, origin: DateTime<Utc>) -> Result<Vec<TstzSpan>> {
    let (count, start, _end) = tstz_span_num_bins(span, size, origin)?;
    let mut out = Vec::with_capacity(count as usize);
    for i in 0..count {
        let lo = start + size * (i as i32);
        let hi = lo + size;
        let bin = TstzSpan::new(lo, hi, true, false)?;
        if let Some(clip) = bin.intersection(span) {
            out.push(clip);
        }
    }
    Ok(out)
}

pub fn tstz_spanset_bins(ss: &TstzSpanSet, size: Duration, origin: DateTime<Utc>) -> Result<Vec<TstzSpan>> {
    let bins = tstz_span_bins(&ss.span(), size, origin)?;
    let mut out = Vec::new();
    for bin in bins {
        let mut acc: Option<TstzSpan> = None;
        for s in ss.spans() {
            if let Some(i) = s.intersection(&bin) {
                acc = Some(match acc {
                    Some(a) => a.hull(&i),
                    None => i,
                });
            }
        }
        if let Some(a) = acc {
            out.push(a);
        }
    }
    Ok(out)
}

pub(crate) fn value_extent(temp: &Temporal) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for i in temp.instants() {
        if let Some(v) = i.value().as_f64() {
            lo = lo.min(v);
            hi = hi.max(v);
        }
    }
    (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
}

/// `tnumber_value_bins`: per value-bin, the bounding value-span of
/// `at(temp, bin)`.
pub fn tnumber_value_bins(temp: &Temporal, vsize: f64, vorigin: f64) -> Result<Vec<FloatSpan>> {
    let Some((vmin, vmax)) = value_extent(temp) else {
        return Ok(vec![]);
    };
    let span = FloatSpan::new(vmin, vmax, true, true)?;
    let mut out = Vec::new();
    for bin in float_span_bins(&span, vsize, vorigin)? {
        if let Some(at) = restrict::at_span(temp, &bin)? {
            if let Some((lo, hi)) = value_extent(&at) {
                out.push(FloatSpan::new(lo, hi, true, true)?);
            }
        }
    }
    Ok(out)
}

/// `temporal_time_bins`: the time-axis analog of [`tnumber_value_bins`].
pub fn temporal_time_bins(temp: &Temporal, duration: Duration, torigin: DateTime<Utc>) -> Result<Vec<TstzSpan>> {
    let domain = temp.time()?.span();
    let mut out = Vec::new();
    for bin in tstz_span_bins(&domain, duration, torigin)? {
        if let Some(at) = restrict::at_timestamp_span(temp, &bin)? {
            out.push(at.time()?.span());
        }
    }
    Ok(out)
}

/// `tnumber_value_time_bins`: temporal boxes on the 2-D value/time grid,
/// row-major by value then by time; a cell is emitted only when
/// `at(temp, box)` is non-empty.
pub fn tnumber_value_time_bins(
    temp: &Temporal,
    vsize: f64,
    duration: Duration,
    vorigin: f64,
    torigin: DateTime<Utc>,
) -> Result<Vec<(TBox, Temporal)>> {
    let Some((vmin, vmax)) = value_extent(temp) else {
        return Ok(vec![]);
    };
    let vspan = FloatSpan::new(vmin, vmax, true, true)?;
    let value_bins = float_span_bins(&vspan, vsize, vorigin)?;
    let tspan = temp.time()?.span();
    let time_bins = tstz_span_bins(&tspan, duration, torigin)?;

    let mut out = Vec::new();
    for vb in &value_bins {
        for tb in &time_bins {
            let tbox = TBox {
                value_span: Some(*vb),
                time_span: Some(*tb),
            };
            if let Some(cell) = restrict::at_box(temp, &tbox)? {
                out.push((tbox, cell));
            }
        }
    }
    Ok(out)
}

/// `temporal_time_split`: for each non-empty time bin, the fragment
/// `at(temp, bin)` and the bin's lower bound.
pub fn temporal_time_split(temp: &Temporal, duration: Duration, torigin: DateTime<Utc>) -> Result<Vec<(DateTime<Utc>, Temporal)>> {
    let domain = temp.time()?.span();
    let mut out = Vec::new();
    for bin in tstz_span_bins(&domain, duration, torigin)? {
        if let Some(at) = restrict::at_timestamp_span(temp, &bin)? {
            out.push((bin.lower(), at));
        }
    }
    Ok(out)
}

/// `tnumber_value_split`: per value-bin, the sequence-set of segments whose
/// value lies in `[lb, ub)` — delegated straight to [`restrict::at_span`],
/// which already introduces the synthetic crossing instant for segments
/// straddling a bin boundary.
pub fn tnumber_value_split(temp: &Temporal, vsize: f64, vorigin: f64) -> Result<Vec<(f64, Temporal)>> {
    let Some((vmin, vmax)) = value_extent(temp) else {
        return Ok(vec![]);
    };
    let span = FloatSpan::new(vmin, vmax, true, true)?;
    let mut out = Vec::new();
    for bin in float_span_bins(&span, vsize, vorigin)? {
        if let Some(at) = restrict::at_span(temp, &bin)? {
            out.push((bin.lower(), at));
        }
    }
    Ok(out)
}

/// `tnumber_value_time_split`: composes [`tnumber_value_split`] with
/// [`temporal_time_split`] over each value-bin fragment.
pub fn tnumber_value_time_split(
    temp: &Temporal,
    vsize: f64,
    duration: Duration,
    vorigin: f64,
    torigin: DateTime<Utc>,
) -> Result<Vec<(f64, DateTime<Utc>, Temporal)>> {
    let mut out = Vec::new();
    for (vlow, fragment) in tnumber_value_split(temp, vsize, vorigin)? {
        for (tlow, piece) in temporal_time_split(&fragment, duration, torigin)? {
            out.push((vlow, tlow, piece));
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::instant::TInstant;
    use crate::temporal::sequence::TSequence;
    use crate::types::Interpolation;
    use crate::value::Value;
    use chrono::TimeZone;

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    #[test]
    fn p9_span_bins_cover_and_tile() {
        let span = IntSpan::new(3, 17, true, false).unwrap();
        let bins = int_span_bins(&span, 5, 0).unwrap();
        assert!(!bins.is_empty());
        for w in bins.windows(2) {
            assert!(w[0].upper() <= w[1].lower());
        }
        assert_eq!(bins.first().unwrap().lower(), 3);
        assert_eq!(bins.last().unwrap().upper(), 17);
    }

    #[test]
    fn float_bins_align_to_origin() {
        let span = FloatSpan::new(2.0, 11.0, true, true).unwrap();
        let bins = float_span_bins(&span, 5.0, 0.0).unwrap();
        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].lower(), 2.0);
        assert_eq!(bins[1].lower(), 5.0);
        assert_eq!(bins[2].upper(), 11.0);
    }

    #[test]
    fn tnumber_value_split_covers_linear_sequence() {
        let instants = vec![
            TInstant::new(Value::Float(0.0), t(0)),
            TInstant::new(Value::Float(10.0), t(10)),
        ];
        let seq = TSequence::new(instants, true, true, Interpolation::Linear, false).unwrap();
        let temp = Temporal::Sequence(seq);
        let split = tnumber_value_split(&temp, 5.0, 0.0).unwrap();
        assert_eq!(split.len(), 2);
        assert_eq!(split[0].0, 0.0);
        assert_eq!(split[1].0, 5.0);
    }

    #[test]
    fn temporal_time_split_partitions_the_domain() {
        let instants = vec![
            TInstant::new(Value::Float(0.0), t(0)),
            TInstant::new(Value::Float(10.0), t(10)),
        ];
        let seq = TSequence::new(instants, true, true, Interpolation::Linear, false).unwrap();
        let temp = Temporal::Sequence(seq);
        let split = temporal_time_split(&temp, Duration::hours(4), t(0)).unwrap();
        assert_eq!(split.len(), 3);
    }
}
