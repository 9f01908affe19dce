use std::{
    fmt,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::summary::{Result, SummaryError};

pub const DEFAULT_TRIALS: u32 = 100;

/// Wall-clock timing collected over repeated summarization runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfReport {
    pub trials: u32,
    pub total: Duration,
    /// Records produced by the last trial.
    pub records: usize,
}

impl PerfReport {
    pub fn average(&self) -> Duration {
        self.total / self.trials.max(1)
    }
}

impl fmt::Display for PerfReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trials: {}", self.trials)?;
        writeln!(f, "Records per trial: {}", self.records)?;
        write!(
            f,
            "Average elapsed: {}",
            humantime::format_duration(self.average())
        )
    }
}

/// Invoke `run` `trials` times back to back, timing the whole batch.
///
/// `run` returns the number of records it produced; the first failing trial aborts
/// the measurement.
pub fn measure<F>(trials: u32, mut run: F) -> Result<PerfReport>
where
    F: FnMut() -> Result<usize>,
{
    if trials == 0 {
        return Err(SummaryError::NoTrials);
    }
    let mut records = 0;
    let start = Instant::now();
    for trial in 0..trials {
        records = run()?;
        debug!(trial, records, "trial finished");
    }
    Ok(PerfReport {
        trials,
        total: start.elapsed(),
        records,
    })
}
