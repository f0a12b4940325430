use std::collections::HashSet;

use crate::models::MatchedRecord;

/// How the notified set moves from one cycle to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Policy {
    /// The set becomes exactly this cycle's identities, so an asset that
    /// drops out for one cycle is reported again when it comes back.
    #[default]
    Replace,
    /// Identities are never forgotten while the process runs.
    Accumulate,
}

/// Lowercased identities already alerted on. Lives only in memory.
#[derive(Debug, Clone, Default)]
pub struct NotifiedSet {
    ids: HashSet<String>,
    policy: Policy,
}

impl NotifiedSet {
    pub fn new(policy: Policy) -> Self {
        Self {
            ids: HashSet::new(),
            policy,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(&id.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Records whose identity is not in the set yet, in input order.
    pub fn fresh<'a>(&self, records: &'a [MatchedRecord]) -> Vec<&'a MatchedRecord> {
        records
            .iter()
            .filter(|r| !self.contains(&r.id))
            .collect()
    }

    /// End-of-cycle update with the identities seen this cycle.
    pub fn advance(&mut self, records: &[MatchedRecord]) {
        let current = records.iter().map(MatchedRecord::key);
        match self.policy {
            Policy::Replace => self.ids = current.collect(),
            Policy::Accumulate => self.ids.extend(current),
        }
    }
}
