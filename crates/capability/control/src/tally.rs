use domain::{BatchClassification, BatchTally, Outcome, Target};

/// 逐条累计目标结果。
#[derive(Debug, Clone, Default)]
pub struct ResultTally {
    success_count: usize,
    failed_targets: Vec<Target>,
}

impl ResultTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Self {
        let mut tally = Self::new();
        tally.extend(outcomes);
        tally
    }

    pub fn record(&mut self, outcome: &Outcome) {
        if outcome.ok {
            self.success_count += 1;
        } else {
            self.failed_targets.push(outcome.target.clone());
        }
    }

    pub fn tally(&self) -> BatchTally {
        BatchTally {
            total: self.success_count + self.failed_targets.len(),
            success_count: self.success_count,
            failure_count: self.failed_targets.len(),
        }
    }

    pub fn classification(&self) -> BatchClassification {
        self.tally().classification()
    }

    /// 失败目标（按记录顺序）。
    pub fn failed_targets(&self) -> &[Target] {
        &self.failed_targets
    }
}

impl<'a> Extend<&'a Outcome> for ResultTally {
    fn extend<I: IntoIterator<Item = &'a Outcome>>(&mut self, outcomes: I) {
        for outcome in outcomes {
            self.record(outcome);
        }
    }
}
