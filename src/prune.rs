//! Per-band bust detection: winnows the received calls on one band down to
//! the set that appears to belong to real, active stations.
//!
//! Four passes run in order over a working copy of the band's QSOs:
//!
//! A. remove QSOs whose received call is a bust corroborated by another
//!    entrant's log at the same time and frequency;
//! B. remove QSOs whose received call is a bust of an entrant that was
//!    running a frequency at that moment;
//! C. remove QSOs whose received call sits inside the run of a non-entrant
//!    it is a bust of;
//! D. drop the calls heard too few times to trust.

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info};

use crate::{
    call::{self, is_bust},
    config::RunConfig,
    freq::FreqQuality,
    qso::Qso,
    timeline::{self, MinuteIndex},
    types::{Band, QsoId, CLOCK_SKEW, FREQ_SKEW, RUN_TIME_RANGE},
};

/// Runs the four pruning passes for one band and returns the received calls
/// that survive.
///
/// `pruned_by_sender` is the working copy; `all_by_sender` is the untouched
/// ingest view of the same band. Both must hold chronologically sorted
/// per-sender sequences, and every QSO must already carry its relative
/// minutes.
pub fn prune_band(
    band: Band,
    pruned_by_sender: HashMap<String, Vec<Qso>>,
    all_by_sender: HashMap<String, Vec<Qso>>,
    quality: &FreqQuality,
    max_rel_mins: u32,
    config: &RunConfig,
) -> HashSet<String> {
    let mut pruned_vec = flatten(&pruned_by_sender);
    let all_vec = flatten(&all_by_sender);

    if pruned_vec.is_empty() || all_vec.is_empty() {
        return HashSet::new();
    }

    let all_tcalls: HashSet<&str> = all_by_sender.keys().map(String::as_str).collect();

    let freq_match = |q1: &Qso, q2: &Qso, lenient: bool| -> bool {
        if lenient {
            quality.is_degraded(&q1.tcall)
                || quality.is_degraded(&q2.tcall)
                || q1.qrg.abs_diff(q2.qrg) <= FREQ_SKEW
        } else {
            // a station with merely poor info still contributes here; only
            // stations with no frequency info at all are excluded, which may
            // mischaracterise QSOs near a band edge but errs the right way
            !quality.no_info.contains(&q1.tcall)
                && !quality.no_info.contains(&q2.tcall)
                && q1.qrg.abs_diff(q2.qrg) <= FREQ_SKEW
        }
    };

    let all_index = MinuteIndex::build(&all_vec, max_rel_mins);
    let pruned_index = MinuteIndex::build(&pruned_vec, max_rel_mins);

    let mut remove: HashSet<QsoId> = HashSet::new();

    // pass A: busts corroborated minute-by-minute against other logs
    for minute in 0..=max_rel_mins {
        for rq in &pruned_vec[pruned_index.minute(minute)] {
            let candidates = &all_vec[all_index.window(minute, CLOCK_SKEW)];

            let matched = candidates.iter().find(|&tq| {
                freq_match(tq, rq, true)
                    && ((is_bust(&tq.tcall, &rq.rcall) && tq.rcall == rq.tcall)
                        || (is_bust(&rq.tcall, &tq.rcall) && is_bust(&tq.tcall, &rq.rcall)))
            });

            if let Some(tq) = matched {
                remove.insert(rq.id);

                if config.is_traced(&rq.rcall) {
                    info!(band = band.label(), qso = ?rq, matched = ?tq, "traced call marked for removal as corroborated bust");
                }
            }
        }
    }

    debug!(band = band.label(), removed = remove.len(), remaining = pruned_vec.len() - remove.len(), "pass A complete");
    pruned_vec.retain(|q| !remove.contains(&q.id));
    remove.clear();

    // pass B: busts of an entrant that was running
    for rq in &pruned_vec {
        for &tcall in &all_tcalls {
            if is_bust(tcall, &rq.rcall)
                && is_stn_running(
                    tcall,
                    rq.rel_mins,
                    rq.qrg,
                    &rq.tcall,
                    &all_tcalls,
                    quality,
                    &all_by_sender,
                    &all_vec,
                    &all_index,
                    max_rel_mins,
                )
            {
                remove.insert(rq.id);

                if config.is_traced(&rq.rcall) {
                    info!(band = band.label(), qso = ?rq, running = tcall, "traced call marked for removal as bust of a running entrant");
                }

                break;
            }
        }
    }

    debug!(band = band.label(), removed = remove.len(), remaining = pruned_vec.len() - remove.len(), "pass B complete");
    pruned_vec.retain(|q| !remove.contains(&q.id));
    remove.clear();

    // pass C: busts of a non-entrant runner, via rcall pseudo-logs
    {
        let mut rcall_logs: HashMap<String, Vec<&Qso>> = HashMap::new();
        for qso in &pruned_vec {
            rcall_logs.entry(qso.rcall.clone()).or_default().push(qso);
        }

        let rcalls: HashSet<String> = rcall_logs.keys().cloned().collect();
        let busts_of = call::possible_busts(&rcalls);

        // most-heard calls first; lexicographic within a count
        let mut order: Vec<&String> = rcall_logs.keys().collect();
        order.sort_unstable_by(|a, b| {
            rcall_logs[b.as_str()]
                .len()
                .cmp(&rcall_logs[a.as_str()].len())
                .then_with(|| a.cmp(b))
        });

        for rcall in order {
            let own_log = &rcall_logs[rcall.as_str()];

            let mut combined: Vec<&Qso> = own_log.clone();
            if let Some(bust_set) = busts_of.get(rcall.as_str()) {
                for bust in bust_set {
                    if let Some(log) = rcall_logs.get(bust.as_str()) {
                        combined.extend_from_slice(log);
                    }
                }
            }
            combined.sort_unstable();

            for &rq in own_log {
                let bounds =
                    timeline::window_bounds(&combined, rq.rel_mins, RUN_TIME_RANGE, max_rel_mins);

                let run_qso = combined[bounds]
                    .iter()
                    .any(|&qso| qso.rcall != *rcall && freq_match(qso, rq, false));

                if run_qso {
                    remove.insert(rq.id);

                    if config.is_traced(rcall) {
                        info!(band = band.label(), qso = ?rq, "traced call marked for removal inside another call's run");
                    }
                }
            }
        }
    }

    debug!(band = band.label(), removed = remove.len(), remaining = pruned_vec.len() - remove.len(), "pass C complete");
    pruned_vec.retain(|q| !remove.contains(&q.id));

    // pass D: drop calls heard too few times
    let mut histogram: HashMap<String, u32> = HashMap::new();
    for qso in &pruned_vec {
        *histogram.entry(qso.rcall.clone()).or_insert(0) += 1;
    }
    pruned_vec.retain(|q| histogram[q.rcall.as_str()] > config.cutoff);

    let surviving: HashSet<String> = pruned_vec.into_iter().map(|q| q.rcall).collect();

    debug!(band = band.label(), n_calls = surviving.len(), "band pruning complete");
    if let Some(traced) = &config.traced_call {
        info!(
            band = band.label(),
            traced = %traced,
            included = surviving.contains(traced),
            "traced call band result"
        );
    }

    surviving
}

/// Whether `call` appears to have been running on `qrg` around minute
/// `target_mins`.
///
/// A station with trustworthy frequencies is running if its own log shows
/// activity there; otherwise some other entrant (not `ignore_call`) must
/// have logged working it there.
#[allow(clippy::too_many_arguments)]
fn is_stn_running(
    call: &str,
    target_mins: u32,
    qrg: u32,
    ignore_call: &str,
    all_tcalls: &HashSet<&str>,
    quality: &FreqQuality,
    all_by_sender: &HashMap<String, Vec<Qso>>,
    all_vec: &[Qso],
    all_index: &MinuteIndex,
    max_rel_mins: u32,
) -> bool {
    if !all_tcalls.contains(call) {
        return false;
    }

    if quality.has_good_info(call) {
        let Some(own_log) = all_by_sender.get(call) else {
            return false;
        };
        let bounds = timeline::window_bounds(own_log, target_mins, CLOCK_SKEW, max_rel_mins);

        return own_log[bounds]
            .iter()
            .any(|qso| qso.qrg.abs_diff(qrg) <= FREQ_SKEW);
    }

    // the station's own frequencies cannot be trusted; does someone else say
    // they worked it here?
    all_vec[all_index.window(target_mins, CLOCK_SKEW)]
        .iter()
        .any(|qso| qso.tcall != ignore_call && qso.rcall == call && qso.qrg.abs_diff(qrg) <= FREQ_SKEW)
}

/// All QSOs of a per-sender map as one chronological vector.
fn flatten(by_sender: &HashMap<String, Vec<Qso>>) -> Vec<Qso> {
    let mut rv: Vec<Qso> = Vec::with_capacity(by_sender.values().map(Vec::len).sum());

    for qsos in by_sender.values() {
        rv.extend_from_slice(qsos);
    }

    rv.sort_unstable();
    rv
}
