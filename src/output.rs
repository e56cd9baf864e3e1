//! The call→count output accumulator and dictionary emission.

use std::io::{self, Write};

use hashbrown::HashMap;

use crate::call;

/// Counts how often each callsign was heard across the corpus.
///
/// Emission walks the calls in the dictionary's domain order
/// ([`call::scp_order`]), so runs over the same corpus produce identical
/// output.
#[derive(Debug, Default)]
pub struct CallCounts {
    counts: HashMap<String, u64>,
}

impl CallCounts {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more appearance of `call`.
    pub fn bump(&mut self, call: &str) {
        *self.counts.entry_ref(call).or_insert(0) += 1;
    }

    /// Folds another accumulator in, summing counts per call.
    pub fn merge(&mut self, other: CallCounts) {
        for (call, n) in other.counts {
            *self.counts.entry(call).or_insert(0) += n;
        }
    }

    /// The recorded count for `call`, zero when absent.
    pub fn count(&self, call: &str) -> u64 {
        self.counts.get(call).copied().unwrap_or(0)
    }

    /// Number of distinct calls.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no call has been recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Keeps only the most-heard calls covering at least `percent` of the
    /// total count mass.
    ///
    /// The threshold always falls on a whole count level, so ties are never
    /// split: if a call with count *k* is kept, every call with count ≥ *k*
    /// is kept. `percent >= 100` keeps everything.
    pub fn retain_top_percent(&mut self, percent: u32) {
        if percent >= 100 || self.counts.is_empty() {
            return;
        }

        let total = self.total();

        // mass contributed by each distinct count level
        let mut level_mass: HashMap<u64, u64> = HashMap::new();
        for &n in self.counts.values() {
            *level_mass.entry(n).or_insert(0) += n;
        }

        let mut levels: Vec<u64> = level_mass.keys().copied().collect();
        levels.sort_unstable_by(|a, b| b.cmp(a));

        let mut threshold = *levels.last().unwrap_or(&0);
        let mut cumulative = 0u64;

        for level in levels {
            cumulative += level_mass[&level];

            // cumulative/total >= percent/100, in integers
            if cumulative * 100 >= u64::from(percent) * total {
                threshold = level;
                break;
            }
        }

        self.counts.retain(|_, n| *n >= threshold);
    }

    /// Calls and counts in emission order.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(call, &n)| (call.as_str(), n))
            .collect();

        entries.sort_unstable_by(|(a, _), (b, _)| call::scp_order(a, b));
        entries
    }

    /// Writes the dictionary: one call per line, or `CALL count` when
    /// `extended` is set.
    pub fn write_to<W: Write>(&self, out: &mut W, extended: bool) -> io::Result<()> {
        for (call, n) in self.sorted() {
            if extended {
                writeln!(out, "{call} {n}")?;
            } else {
                writeln!(out, "{call}")?;
            }
        }

        Ok(())
    }
}
