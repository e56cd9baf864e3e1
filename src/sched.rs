//! Contest scheduling: runs directory pipelines under a parallelism bound
//! and merges their results.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::{
    config::{ContestSpec, RunConfig},
    output::CallCounts,
    pipeline::{self, PipelineError},
};

/// Error raised while running the contest pool.
#[derive(Debug)]
pub enum SchedError {
    /// A pipeline failed; fatal for the whole run.
    Pipeline(PipelineError),
    /// A pipeline task died before returning.
    Join(String),
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::Pipeline(err) => write!(f, "{err}"),
            SchedError::Join(msg) => write!(f, "pipeline task failed: {msg}"),
        }
    }
}

impl From<PipelineError> for SchedError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

/// Runs every contest, at most `config.parallel` at a time, and returns the
/// merged call→count map with any `-xpc` truncation applied.
pub async fn run_contests(
    contests: Vec<ContestSpec>,
    config: Arc<RunConfig>,
) -> Result<CallCounts, SchedError> {
    let permits = Arc::new(Semaphore::new(config.parallel.max(1)));
    let mut handles = Vec::with_capacity(contests.len());

    for contest in contests {
        let permits = Arc::clone(&permits);
        let config = Arc::clone(&config);

        debug!(dir = %contest.dir.display(), "queued contest");

        handles.push(tokio::spawn(async move {
            // closing the semaphore is not part of this design, so acquire
            // can only fail if the runtime is tearing down
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|err| PipelineError::Join(err.to_string()))?;

            debug!(dir = %contest.dir.display(), "started contest");
            pipeline::process_directory(contest, config).await
        }));
    }

    let mut merged = CallCounts::new();

    for handle in handles {
        let counts = handle
            .await
            .map_err(|err| SchedError::Join(err.to_string()))??;
        merged.merge(counts);
    }

    if config.top_percent < 100 {
        let before = merged.len();
        merged.retain_top_percent(config.top_percent);
        debug!(
            kept = merged.len(),
            dropped = before - merged.len(),
            percent = config.top_percent,
            "applied top-percent truncation"
        );
    }

    Ok(merged)
}
