//! Turns one directory of Cabrillo logs into per-sender QSO sequences,
//! filtered to the contest window.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use hashbrown::{HashMap, HashSet};
use tracing::{debug, info};

use crate::{
    config::{ContestSpec, RunConfig},
    qso::Qso,
};

/// Error raised while reading a log directory.
#[derive(Debug)]
pub enum IngestError {
    /// The directory could not be listed or a log could not be read.
    Io(PathBuf, io::Error),
    /// No file in the directory yielded a single accepted QSO.
    NoValidLogs(PathBuf),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Io(path, err) => write!(f, "cannot read {}: {err}", path.display()),
            IngestError::NoValidLogs(dir) => {
                write!(f, "no valid received logs in {}", dir.display())
            }
        }
    }
}

/// The result of ingesting one directory.
#[derive(Debug, Default)]
pub struct IngestedLogs {
    /// Every accepted QSO, keyed by the sender's call, in file order.
    pub qsos_by_sender: HashMap<String, Vec<Qso>>,
    /// Senders claiming at least `-tl` QSOs; automatically included in the
    /// output if anyone else logged them.
    pub entrants: HashSet<String>,
    /// Number of files that produced at least one accepted QSO.
    pub n_valid_logs: usize,
}

/// Reads every log file in `contest.dir` (following symlinks, in name
/// order), keeping the `QSO:` lines that parse and fall inside the contest
/// period. Relative minutes are assigned on acceptance.
pub fn ingest_directory(
    contest: &ContestSpec,
    config: &RunConfig,
) -> Result<IngestedLogs, IngestError> {
    let mut ingested = IngestedLogs::default();

    for path in log_files(&contest.dir)? {
        let bytes = fs::read(&path).map_err(|err| IngestError::Io(path.clone(), err))?;
        let content = String::from_utf8_lossy(&bytes).to_ascii_uppercase();

        // do not assume the tcall is constant within one file
        let mut file_qsos: HashMap<String, Vec<Qso>> = HashMap::new();

        for line in content.lines() {
            let line = line.trim_start();
            if !line.starts_with("QSO:") {
                continue;
            }

            let mut qso = match Qso::parse(line) {
                Ok(qso) => qso,
                Err(err) => {
                    if config.show_bad_qsos {
                        eprintln!("{line}");
                    }
                    debug!(file = %path.display(), ?err, "rejected QSO line");
                    continue;
                }
            };

            if !contest.contains(qso.time) {
                continue;
            }

            qso.rel_mins = contest.rel_mins(qso.time);

            if config.is_traced(&qso.rcall) {
                info!(file = %path.display(), ?qso, "read traced call from log");
            }

            file_qsos.entry(qso.tcall.clone()).or_default().push(qso);
        }

        if file_qsos.is_empty() {
            continue;
        }
        ingested.n_valid_logs += 1;

        for (tcall, qsos) in file_qsos {
            if qsos.len() >= config.tl_limit {
                ingested.entrants.insert(tcall.clone());
            } else {
                debug!(file = %path.display(), %tcall, claimed = qsos.len(), "log too small for automatic inclusion");
            }

            ingested
                .qsos_by_sender
                .entry(tcall)
                .or_default()
                .extend(qsos);
        }
    }

    if ingested.n_valid_logs == 0 {
        return Err(IngestError::NoValidLogs(contest.dir.clone()));
    }

    debug!(
        dir = %contest.dir.display(),
        n_valid_logs = ingested.n_valid_logs,
        n_senders = ingested.qsos_by_sender.len(),
        n_entrants = ingested.entrants.len(),
        "ingested directory"
    );

    Ok(ingested)
}

/// Regular files in `dir`, following symlinks, sorted by name so QSO id
/// assignment is reproducible.
fn log_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let entries = fs::read_dir(dir).map_err(|err| IngestError::Io(dir.to_path_buf(), err))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| IngestError::Io(dir.to_path_buf(), err))?;
        let path = entry.path();

        if fs::metadata(&path).map(|m| m.is_file()).unwrap_or(false) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
