//! Minute-granularity index over chronologically sorted QSO sequences.

use std::borrow::Borrow;
use std::ops::Range;

use crate::qso::Qso;

/// For a chronological QSO slice, maps each contest minute to the position
/// of the first QSO at or after that minute.
///
/// The backing array has `max_rel_mins + 2` entries; the final entry is the
/// slice length, so minute `k` always owns the half-open range
/// `starts[k]..starts[k + 1]`.
#[derive(Debug)]
pub struct MinuteIndex {
    starts: Vec<usize>,
    max_rel_mins: u32,
}

impl MinuteIndex {
    /// Builds the index. `qsos` must be sorted chronologically and every
    /// `rel_mins` must lie in `0..=max_rel_mins`.
    pub fn build(qsos: &[Qso], max_rel_mins: u32) -> Self {
        let mut starts = Vec::with_capacity(max_rel_mins as usize + 2);
        let mut next = 0usize;

        for minute in 0..=max_rel_mins {
            while next < qsos.len() && qsos[next].rel_mins < minute {
                next += 1;
            }
            starts.push(next);
        }
        starts.push(qsos.len());

        MinuteIndex {
            starts,
            max_rel_mins,
        }
    }

    /// The index range of QSOs logged during exactly minute `m`.
    pub fn minute(&self, m: u32) -> Range<usize> {
        let m = m as usize;
        self.starts[m]..self.starts[m + 1]
    }

    /// The index range of QSOs within `skew` minutes of `m`, clamped to the
    /// contest period.
    pub fn window(&self, m: u32, skew: u32) -> Range<usize> {
        let lo = m.saturating_sub(skew) as usize;
        let hi = m.saturating_add(skew).min(self.max_rel_mins) as usize;
        self.starts[lo]..self.starts[hi + 1]
    }
}

/// The index range of QSOs in `qsos` whose relative minute lies within
/// `skew` of `target`, clamped to `0..=max_rel_mins`. `qsos` must be sorted
/// chronologically.
///
/// Works over both owned and borrowed QSO slices, so combined pseudo-logs
/// can reuse it.
pub fn window_bounds<Q: Borrow<Qso>>(
    qsos: &[Q],
    target: u32,
    skew: u32,
    max_rel_mins: u32,
) -> Range<usize> {
    let lo_min = target.saturating_sub(skew);
    let hi_min = target.saturating_add(skew).min(max_rel_mins);

    let lo = qsos.partition_point(|q| q.borrow().rel_mins < lo_min);
    let hi = qsos.partition_point(|q| q.borrow().rel_mins <= hi_min);

    lo..hi
}
