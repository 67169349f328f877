use radar_types::{Availability, CompareResult, Job, JobSummary, Snapshot};

use crate::diff::{CompareSide, compare};
use crate::metrics::report;

/// Build one comparison side from a job and its (possibly missing) snapshot.
pub fn side(job: &Job, snapshot: Availability<Snapshot>) -> Availability<CompareSide> {
    let summary = JobSummary::from(job);
    snapshot.map(|snapshot| CompareSide::new(summary, report(snapshot)))
}

/// Comparison whose two sides load independently.
///
/// Nothing is diffed until both sides are ready; a side that can never
/// load makes the whole comparison unavailable.
#[derive(Debug, Clone, Default)]
pub struct PendingComparison {
    a: Availability<CompareSide>,
    b: Availability<CompareSide>,
}

impl PendingComparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_a(&mut self, side: Availability<CompareSide>) {
        self.a = side;
    }

    pub fn set_b(&mut self, side: Availability<CompareSide>) {
        self.b = side;
    }

    pub fn result(&self) -> Availability<CompareResult> {
        self.a
            .as_ref()
            .zip(self.b.as_ref())
            .map(|(a, b)| compare(a, b))
    }
}

/// Compare two sides that were fetched independently.
pub fn resolve(
    a: Availability<CompareSide>,
    b: Availability<CompareSide>,
) -> Availability<CompareResult> {
    a.zip(b).map(|(a, b)| compare(&a, &b))
}
