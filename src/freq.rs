//! Frequency-information quality classification.
//!
//! Senders fall into three classes: those whose logs carry usable
//! frequencies, those that only ever log the band-edge defaults, and those
//! whose frequencies disagree too often with the stations they worked.

use hashbrown::{HashMap, HashSet};
use tracing::debug;

use crate::{
    qso::Qso,
    types::{Band, FREQ_SKEW, RUN_TIME_RANGE},
};

/// The frequency-information classes for one contest's senders.
#[derive(Debug, Default)]
pub struct FreqQuality {
    /// Senders whose every logged frequency is a band-edge default.
    pub no_info: HashSet<String>,
    /// Senders whose cross-checked frequency agreement is below 90%.
    pub poor_info: HashSet<String>,
}

impl FreqQuality {
    /// Whether `call`'s logged frequencies can be trusted.
    pub fn has_good_info(&self, call: &str) -> bool {
        !self.no_info.contains(call) && !self.poor_info.contains(call)
    }

    /// Whether `call` belongs to either degraded class.
    pub fn is_degraded(&self, call: &str) -> bool {
        self.no_info.contains(call) || self.poor_info.contains(call)
    }

    /// Classifies every sender in `all_qsos`.
    pub fn classify(all_qsos: &HashMap<String, Vec<Qso>>) -> FreqQuality {
        let no_info: HashSet<String> = all_qsos
            .iter()
            .filter(|(_, qsos)| qsos.iter().all(|q| q.qrg == q.band.edge_qrg()))
            .map(|(tcall, _)| tcall.clone())
            .collect();

        let poor_info = unreliable_senders(all_qsos, &no_info);

        debug!(
            n_no_info = no_info.len(),
            n_poor_info = poor_info.len(),
            "classified frequency quality"
        );

        FreqQuality { no_info, poor_info }
    }
}

/// The reciprocal cross-check. For each pair of log authors that worked
/// each other, every same-band pairing within [`RUN_TIME_RANGE`] minutes
/// counts toward the sender's total, and counts as good when the two logged
/// frequencies agree to within [`FREQ_SKEW`] kHz. Senders whose good/total
/// ratio falls below 0.9 are unreliable.
fn unreliable_senders(
    all_qsos: &HashMap<String, Vec<Qso>>,
    no_info: &HashSet<String>,
) -> HashSet<String> {
    type BandTimeFreq = (Band, u32, u32);

    // cross-index every logged QSO between two log authors
    let mut worked: HashMap<&str, HashMap<&str, Vec<BandTimeFreq>>> = HashMap::new();

    for (tcall, qsos) in all_qsos {
        if no_info.contains(tcall) {
            continue;
        }

        let mut worked_by_this_tcall: HashMap<&str, Vec<BandTimeFreq>> = HashMap::new();

        for qso in qsos {
            if !no_info.contains(&qso.rcall) && all_qsos.contains_key(&qso.rcall) {
                worked_by_this_tcall
                    .entry(qso.rcall.as_str())
                    .or_default()
                    .push((qso.band, qso.rel_mins, qso.qrg));
            }
        }

        worked.insert(tcall.as_str(), worked_by_this_tcall);
    }

    let mut rv = HashSet::new();

    for (tcall, worked_calls) in &worked {
        let mut total = 0u64;
        let mut good = 0u64;

        for (rcall, forward) in worked_calls {
            let Some(reverse) = worked.get(rcall).and_then(|m| m.get(tcall)) else {
                continue;
            };

            for &(band, time, qrg) in forward {
                for &(r_band, r_time, r_qrg) in reverse {
                    if band == r_band && time.abs_diff(r_time) < RUN_TIME_RANGE {
                        total += 1;

                        if qrg.abs_diff(r_qrg) < FREQ_SKEW {
                            good += 1;
                        }
                    }
                }
            }
        }

        // good/total < 0.9, kept exact by staying in integers
        if total != 0 && good * 10 < total * 9 {
            rv.insert((*tcall).to_string());
        }
    }

    rv
}
