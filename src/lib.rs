//! Super Check Partial (SCP) dictionary generation from contest logs, with
//! bust detection.
//!
//! Given directories of Cabrillo contest submissions, the pipeline decides
//! for every received callsign whether it belongs to a real, active station
//! or is a mis-copy ("bust") of another call, by combining edit-distance
//! reasoning, cross-log corroboration on time and frequency, run detection
//! and per-band occurrence counts. The surviving calls form the SCP
//! dictionary; the extended (XSCP) form also carries how often each call was
//! heard.
//!
//! # Examples
//!
//! Bust analysis on its own:
//! ```
//! use scpgen::call;
//!
//! assert!(call::is_bust("N7DR", "N7RD"));   // adjacent swap
//! assert!(call::is_bust("W1AW", "W1AWW"));  // inserted character
//! assert!(!call::is_bust("K1ABC", "K1ABCDE"));
//! ```
//!
//! Running one contest:
//! ```no_run
//! use std::sync::Arc;
//!
//! use scpgen::{
//!     config::{ContestSpec, RunConfig},
//!     sched,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let contests = vec![ContestSpec {
//!     dir: "logs/cqww-2022".into(),
//!     start: 1_666_980_000,
//!     hours: 48,
//! }];
//!
//! let counts = sched::run_contests(contests, Arc::new(RunConfig::default()))
//!     .await
//!     .expect("run contests");
//! counts
//!     .write_to(&mut std::io::stdout().lock(), false)
//!     .expect("write dictionary");
//! # }
//! ```

/// Callsign normalization, validation, bust analysis and output ordering.
pub mod call;
/// Run options, contest windows and contest-list parsing.
pub mod config;
/// Frequency-information quality classification.
pub mod freq;
/// Directory ingestion into per-sender QSO logs.
pub mod ingest;
/// The call→count accumulator and dictionary emission.
pub mod output;
/// Per-contest orchestration: ingest, classify, band fan-out.
pub mod pipeline;
/// Per-band bust-detection passes.
pub mod prune;
/// The logged-contact record and its parser.
pub mod qso;
/// Contest pool scheduling and result merging.
pub mod sched;
/// Minute-granularity indexing over sorted QSO sequences.
pub mod timeline;
/// Shared primitive types, bands and pruning constants.
pub mod types;
