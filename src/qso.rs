//! The immutable logged-contact record and its Cabrillo-line parser.

use std::cmp::Ordering;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use chrono::NaiveDate;

use crate::{
    call,
    types::{Band, QsoId},
};

/// Process-wide QSO id source. The only genuinely global mutable state in
/// the crate.
static NEXT_QSO_ID: AtomicU64 = AtomicU64::new(1);

fn next_qso_id() -> QsoId {
    NEXT_QSO_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// Why a `QSO:` line was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseQsoError {
    /// Fewer than nine whitespace-separated fields.
    ShortLine,
    /// The frequency field was not an integer in a contest band.
    BadFrequency,
    /// The date or UTC field did not parse.
    BadTimestamp,
    /// A callsign failed the plausibility checks.
    BadCallsign,
    /// Transmitted and received calls are identical.
    SelfQso,
}

/// Minimal data about one logged contact.
///
/// Immutable once accepted into a contest, apart from the one-time
/// assignment of [`Qso::rel_mins`] by the ingestor. Sorts chronologically,
/// with the id as tie-break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qso {
    /// Unique id, used as the identity handle for set-based removal.
    pub id: QsoId,
    /// Transmitted (log author's) call.
    pub tcall: String,
    /// Received call.
    pub rcall: String,
    /// Band derived from the logged frequency.
    pub band: Band,
    /// Logged frequency, in kHz.
    pub qrg: u32,
    /// Absolute UTC time, in seconds.
    pub time: i64,
    /// Minutes from the contest start; assigned on acceptance.
    pub rel_mins: u32,
}

impl Qso {
    /// Parses one `QSO:` line.
    ///
    /// The line is split on whitespace; field 1 is the frequency in kHz,
    /// field 3 the date (`YYYY-MM-DD`), field 4 the UTC time (`HHMM`),
    /// field 5 the sender's call and field 8 the received call. Calls are
    /// normalized with [`call::normalize`] before validation.
    pub fn parse(line: &str) -> Result<Qso, ParseQsoError> {
        let fields: Vec<&str> = line.split_whitespace().collect();

        if fields.len() < 9 {
            return Err(ParseQsoError::ShortLine);
        }

        let qrg: u32 = fields[1].parse().map_err(|_| ParseQsoError::BadFrequency)?;
        let band = Band::from_qrg(qrg).ok_or(ParseQsoError::BadFrequency)?;
        let time = parse_timestamp(fields[3], fields[4])?;

        let tcall = call::normalize(fields[5]);
        let rcall = call::normalize(fields[8]);

        if !call::is_plausible(&tcall) || !call::is_plausible(&rcall) {
            return Err(ParseQsoError::BadCallsign);
        }

        // some stations "work themselves" to burn a bad serial number
        if tcall == rcall {
            return Err(ParseQsoError::SelfQso);
        }

        Ok(Qso {
            id: next_qso_id(),
            tcall,
            rcall,
            band,
            qrg,
            time,
            rel_mins: 0,
        })
    }
}

impl Ord for Qso {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for Qso {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn parse_timestamp(date: &str, utc: &str) -> Result<i64, ParseQsoError> {
    let date =
        NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| ParseQsoError::BadTimestamp)?;

    if utc.len() != 4 || !utc.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseQsoError::BadTimestamp);
    }

    let hhmm: u32 = utc.parse().map_err(|_| ParseQsoError::BadTimestamp)?;
    let (hour, minute) = (hhmm / 100, hhmm % 100);

    let dt = date
        .and_hms_opt(hour, minute, 0)
        .ok_or(ParseQsoError::BadTimestamp)?;

    Ok(dt.and_utc().timestamp())
}
