//! Per-domain staleness tracking.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::{DataDomain, UtcDateTime};

/// Liveness of one data domain as seen by the health surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomainState {
    pub last_success: Option<UtcDateTime>,
    pub consecutive_errors: u32,
    pub total_errors: u64,
}

/// Process-wide last-success and error counters, one entry per domain.
///
/// Each update is a single synchronous critical section. Never persisted.
#[derive(Debug)]
pub struct DataState {
    inner: Mutex<BTreeMap<DataDomain, DomainState>>,
}

impl Default for DataState {
    fn default() -> Self {
        Self::new()
    }
}

impl DataState {
    pub fn new() -> Self {
        let domains = DataDomain::ALL
            .into_iter()
            .map(|domain| (domain, DomainState::default()))
            .collect();
        Self {
            inner: Mutex::new(domains),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<DataDomain, DomainState>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stamps the success time and resets the consecutive error counter.
    pub fn record_success(&self, domain: DataDomain) {
        let mut inner = self.lock();
        let state = inner.entry(domain).or_default();
        state.last_success = Some(UtcDateTime::now());
        state.consecutive_errors = 0;
    }

    pub fn record_failure(&self, domain: DataDomain) {
        let mut inner = self.lock();
        let state = inner.entry(domain).or_default();
        state.consecutive_errors = state.consecutive_errors.saturating_add(1);
        state.total_errors = state.total_errors.saturating_add(1);
    }

    pub fn get(&self, domain: DataDomain) -> DomainState {
        self.lock().get(&domain).copied().unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<DataDomain, DomainState> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_every_domain_unseen() {
        let state = DataState::new();
        let snapshot = state.snapshot();

        assert_eq!(snapshot.len(), 4);
        assert!(snapshot.values().all(|domain| domain.last_success.is_none()));
    }

    #[test]
    fn success_resets_consecutive_errors_only() {
        let state = DataState::new();

        state.record_failure(DataDomain::WaitTimes);
        state.record_failure(DataDomain::WaitTimes);
        assert_eq!(state.get(DataDomain::WaitTimes).consecutive_errors, 2);

        state.record_success(DataDomain::WaitTimes);
        let wait_times = state.get(DataDomain::WaitTimes);
        assert_eq!(wait_times.consecutive_errors, 0);
        assert_eq!(wait_times.total_errors, 2);
        assert!(wait_times.last_success.is_some());

        assert_eq!(state.get(DataDomain::ParkHours), DomainState::default());
    }

    #[test]
    fn snapshot_serializes_by_domain_name() {
        let state = DataState::new();
        state.record_failure(DataDomain::Characters);

        let value = serde_json::to_value(state.snapshot()).expect("serializable");
        assert_eq!(value["characters"]["consecutive_errors"], 1);
        assert!(value["park_hours"]["last_success"].is_null());
    }
}
