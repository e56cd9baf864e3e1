//! Run configuration and contest-window handling.
//!
//! All per-run knobs live in one immutable [`RunConfig`] value threaded
//! through the pipeline; nothing here is process-global.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};

/// Error raised while interpreting the command line or a contest-list file.
#[derive(Debug)]
pub enum ConfigError {
    /// `-dir` names a plain directory (or a one-token list line exists) but
    /// no contest start time was given.
    MissingStart,
    /// No contest duration was given.
    MissingHours,
    /// A start timestamp did not parse.
    BadTimestamp(String),
    /// A contest duration was zero or did not parse.
    BadHours(String),
    /// A contest-list line had the wrong number of fields.
    BadListLine {
        /// The list file.
        file: PathBuf,
        /// 1-based line number.
        line: usize,
    },
    /// A named log directory does not exist.
    MissingDirectory(PathBuf),
    /// The contest-list file could not be read.
    Io(PathBuf, io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingStart => write!(f, "no contest start time (-start) given"),
            ConfigError::MissingHours => write!(f, "no contest duration (-hrs) given"),
            ConfigError::BadTimestamp(s) => write!(f, "bad start timestamp: {s}"),
            ConfigError::BadHours(s) => write!(f, "bad contest duration: {s}"),
            ConfigError::BadListLine { file, line } => {
                write!(f, "bad contest-list line {line} in {}", file.display())
            }
            ConfigError::MissingDirectory(dir) => {
                write!(f, "log directory {} does not exist", dir.display())
            }
            ConfigError::Io(path, err) => write!(f, "cannot read {}: {err}", path.display()),
        }
    }
}

/// Immutable per-run options, shared read-only by every pipeline.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Emit progress diagnostics.
    pub verbose: bool,
    /// Calls appearing this many times or fewer on a band are dropped.
    pub cutoff: u32,
    /// Maximum number of contests processed concurrently.
    pub parallel: usize,
    /// Callsign to report on in detail, already normalized.
    pub traced_call: Option<String>,
    /// Minimum claimed QSOs before an entrant's call is auto-included.
    pub tl_limit: usize,
    /// Emit `CALL count` lines instead of bare calls.
    pub xscp: bool,
    /// Retain only the calls covering this percentage of the count mass.
    pub top_percent: u32,
    /// Echo rejected `QSO:` lines to the diagnostics stream.
    pub show_bad_qsos: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            cutoff: 1,
            parallel: 1,
            traced_call: None,
            tl_limit: 1,
            xscp: false,
            top_percent: 100,
            show_bad_qsos: false,
        }
    }
}

impl RunConfig {
    /// Whether `call` is the traced call.
    pub fn is_traced(&self, call: &str) -> bool {
        self.traced_call.as_deref() == Some(call)
    }
}

/// One contest to process: a directory of logs plus its time window.
#[derive(Debug, Clone)]
pub struct ContestSpec {
    /// Directory holding the submitted logs.
    pub dir: PathBuf,
    /// Contest start, UTC seconds.
    pub start: i64,
    /// Contest duration in hours (at least 1).
    pub hours: u32,
}

impl ContestSpec {
    /// Whether an absolute UTC time falls inside the contest period
    /// `[start, start + hours * 3600)`.
    pub fn contains(&self, time: i64) -> bool {
        time >= self.start && time < self.start + i64::from(self.hours) * 3600
    }

    /// Minutes from the contest start for an in-period time.
    pub fn rel_mins(&self, time: i64) -> u32 {
        ((time - self.start) / 60) as u32
    }

    /// The largest valid relative minute, `hours * 60 - 1`.
    pub fn max_rel_mins(&self) -> u32 {
        self.hours * 60 - 1
    }
}

/// Parses a contest start time of the form `YYYY-MM-DD[THH[:MM[:SS]]]` into
/// UTC seconds.
pub fn parse_start_time(value: &str) -> Result<i64, ConfigError> {
    let bad = || ConfigError::BadTimestamp(value.to_string());

    let (date_part, time_part) = match value.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (value, None),
    };

    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| bad())?;

    let time = match time_part {
        None => NaiveTime::from_hms_opt(0, 0, 0).ok_or_else(bad)?,
        Some(t) => {
            let mut parts = t.split(':');
            let hour: u32 = parts.next().ok_or_else(bad)?.parse().map_err(|_| bad())?;
            let minute: u32 = match parts.next() {
                Some(m) => m.parse().map_err(|_| bad())?,
                None => 0,
            };
            let second: u32 = match parts.next() {
                Some(s) => s.parse().map_err(|_| bad())?,
                None => 0,
            };
            if parts.next().is_some() {
                return Err(bad());
            }
            NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(bad)?
        }
    };

    Ok(date.and_time(time).and_utc().timestamp())
}

fn parse_hours(value: &str) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(h) if h >= 1 => Ok(h),
        _ => Err(ConfigError::BadHours(value.to_string())),
    }
}

/// Resolves the `-dir` argument (plus optional global `-start`/`-hrs`) into
/// the list of contests to run.
///
/// A value beginning with `@` names a contest-list file: each non-blank,
/// non-`#` line is either a bare directory (requiring the global window) or
/// `directory start hours`. A plain value names a single log directory and
/// requires the global window. Every directory is checked for existence,
/// following symlinks.
pub fn resolve_contests(
    dir_arg: &str,
    start: Option<&str>,
    hours: Option<&str>,
) -> Result<Vec<ContestSpec>, ConfigError> {
    let global_start = start.map(parse_start_time).transpose()?;
    let global_hours = hours.map(parse_hours).transpose()?;

    let contests = match dir_arg.strip_prefix('@') {
        Some(list_file) => {
            contest_list_from_file(Path::new(list_file), global_start, global_hours)?
        }
        None => vec![ContestSpec {
            dir: PathBuf::from(dir_arg),
            start: global_start.ok_or(ConfigError::MissingStart)?,
            hours: global_hours.ok_or(ConfigError::MissingHours)?,
        }],
    };

    for contest in &contests {
        if !fs::metadata(&contest.dir).map(|m| m.is_dir()).unwrap_or(false) {
            return Err(ConfigError::MissingDirectory(contest.dir.clone()));
        }
    }

    Ok(contests)
}

fn contest_list_from_file(
    path: &Path,
    global_start: Option<i64>,
    global_hours: Option<u32>,
) -> Result<Vec<ContestSpec>, ConfigError> {
    let content =
        fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

    let mut contests = Vec::new();

    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields.as_slice() {
            [dir] => contests.push(ContestSpec {
                dir: PathBuf::from(dir),
                start: global_start.ok_or(ConfigError::MissingStart)?,
                hours: global_hours.ok_or(ConfigError::MissingHours)?,
            }),
            [dir, start, hours] => contests.push(ContestSpec {
                dir: PathBuf::from(dir),
                start: parse_start_time(start)?,
                hours: parse_hours(hours)?,
            }),
            _ => {
                return Err(ConfigError::BadListLine {
                    file: path.to_path_buf(),
                    line: n + 1,
                })
            }
        }
    }

    Ok(contests)
}
