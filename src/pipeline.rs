//! One contest, end to end: ingest, classify, per-band pruning fan-out,
//! and the resulting call→count map.

use std::fmt;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info};

use crate::{
    config::{ContestSpec, RunConfig},
    freq::FreqQuality,
    ingest::{self, IngestError},
    output::CallCounts,
    prune,
    qso::Qso,
    types::Band,
};

/// Error raised while processing one contest directory.
#[derive(Debug)]
pub enum PipelineError {
    /// The directory yielded no usable logs.
    Ingest(IngestError),
    /// A worker task died before returning.
    Join(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Ingest(err) => write!(f, "{err}"),
            PipelineError::Join(msg) => write!(f, "worker task failed: {msg}"),
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        Self::Ingest(value)
    }
}

/// Processes one contest directory and returns its call→count map.
///
/// Band pruners run concurrently on the blocking pool; the per-band result
/// sets are unioned after all bands complete.
pub async fn process_directory(
    contest: ContestSpec,
    config: Arc<RunConfig>,
) -> Result<CallCounts, PipelineError> {
    let ingested = {
        let contest = contest.clone();
        let config = Arc::clone(&config);

        tokio::task::spawn_blocking(move || ingest::ingest_directory(&contest, &config))
            .await
            .map_err(|err| PipelineError::Join(err.to_string()))??
    };

    let mut all_qsos = ingested.qsos_by_sender;
    let entrants = ingested.entrants;

    for qsos in all_qsos.values_mut() {
        qsos.sort_unstable();
    }

    // the working copy starts identical to the ingest view
    let mut pruned_qsos = all_qsos.clone();

    // received calls that are already entrants need no further evidence;
    // count them and take their QSOs out of the working copy
    let mut counts = CallCounts::new();

    for qsos in pruned_qsos.values_mut() {
        for qso in qsos.iter() {
            if entrants.contains(&qso.rcall) {
                counts.bump(&qso.rcall);
            }
        }

        qsos.retain(|qso| !entrants.contains(&qso.rcall));
    }

    pruned_qsos.retain(|_, qsos| !qsos.is_empty());

    debug!(
        dir = %contest.dir.display(),
        n_senders = all_qsos.len(),
        n_pruned_senders = pruned_qsos.len(),
        "seeded working copy"
    );

    let quality = Arc::new(FreqQuality::classify(&all_qsos));
    let max_rel_mins = contest.max_rel_mins();

    let mut all_by_band = split_by_band(all_qsos.clone());
    let mut pruned_by_band = split_by_band(pruned_qsos);

    let mut handles = Vec::new();

    for band in Band::ALL {
        let (Some(pruned_band), Some(all_band)) =
            (pruned_by_band.remove(&band), all_by_band.remove(&band))
        else {
            continue;
        };

        let quality = Arc::clone(&quality);
        let config = Arc::clone(&config);

        handles.push(tokio::task::spawn_blocking(move || {
            prune::prune_band(band, pruned_band, all_band, &quality, max_rel_mins, &config)
        }));
    }

    let mut returned_calls: HashSet<String> = HashSet::new();
    for handle in handles {
        let band_calls = handle
            .await
            .map_err(|err| PipelineError::Join(err.to_string()))?;
        returned_calls.extend(band_calls);
    }

    debug!(
        dir = %contest.dir.display(),
        n_calls = returned_calls.len(),
        "unioned band results"
    );

    if let Some(traced) = &config.traced_call {
        info!(
            dir = %contest.dir.display(),
            traced = %traced,
            included = returned_calls.contains(traced),
            "traced call directory result"
        );
    }

    // every appearance of a validated call counts, across all bands
    for qsos in all_qsos.values() {
        for qso in qsos {
            if returned_calls.contains(&qso.rcall) {
                counts.bump(&qso.rcall);
            }
        }
    }

    Ok(counts)
}

/// Splits a per-sender map into per-band projections, preserving the
/// chronological order within each sender.
fn split_by_band(by_sender: HashMap<String, Vec<Qso>>) -> HashMap<Band, HashMap<String, Vec<Qso>>> {
    let mut rv: HashMap<Band, HashMap<String, Vec<Qso>>> = HashMap::new();

    for (tcall, qsos) in by_sender {
        for qso in qsos {
            rv.entry(qso.band)
                .or_default()
                .entry(tcall.clone())
                .or_default()
                .push(qso);
        }
    }

    rv
}
