//! Facility Service
//!
//! The query interface exposed to clients. Each operation pins one snapshot and answers
//! from it alone; refreshes go through the shared `RefreshCoordinator`.

use super::types::{HealthStatus, ServiceError};
use crate::cache::{RefreshCoordinator, Snapshot, TriggerResult};
use crate::query::{self, PagedResult, QueryEngine, QueryParams, Stats};
use crate::record::Record;

use std::sync::Arc;

pub struct FacilityService {
    engine: QueryEngine,
    coordinator: Arc<RefreshCoordinator>,
}

impl FacilityService {
    pub fn new(coordinator: Arc<RefreshCoordinator>) -> Arc<Self> {
        Arc::new(Self {
            engine: QueryEngine::new(coordinator.store().clone()),
            coordinator,
        })
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn search(&self, params: &QueryParams) -> Result<PagedResult, ServiceError> {
        let snapshot = self.available_snapshot()?;
        Ok(query::execute(&snapshot, params))
    }

    pub fn get_by_name(&self, name: &str) -> Result<Record, ServiceError> {
        let snapshot = self.available_snapshot()?;
        snapshot
            .get_by_name(name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(name.to_string()))
    }

    pub fn list_regions(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.available_snapshot()?.regions().to_vec())
    }

    pub fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
        Ok(self.available_snapshot()?.categories().to_vec())
    }

    pub fn get_stats(&self) -> Result<Stats, ServiceError> {
        let snapshot = self.available_snapshot()?;
        Ok(query::aggregate(&snapshot))
    }

    pub fn trigger_refresh(&self) -> TriggerResult {
        let result = self.coordinator.trigger();
        tracing::info!(
            "Refresh requested: accepted={}, already_in_progress={}",
            result.accepted,
            result.already_in_progress
        );
        result
    }

    pub fn health_status(&self) -> HealthStatus {
        let snapshot = self.engine.snapshot();
        HealthStatus {
            loaded: snapshot.version() > 0,
            count: snapshot.len(),
            last_updated: snapshot.last_updated(),
            refreshing: self.coordinator.store().is_refreshing(),
            version: snapshot.version(),
            source: snapshot.source(),
        }
    }

    /// An empty result is only honest once something has been loaded; before that, a
    /// failed refresh is reported instead.
    fn available_snapshot(&self) -> Result<Arc<Snapshot>, ServiceError> {
        let snapshot = self.engine.snapshot();
        if snapshot.version() == 0
            && let Some(reason) = self.coordinator.last_error()
        {
            return Err(ServiceError::Unavailable(reason));
        }
        Ok(snapshot)
    }
}
