//! Applies reconciliation plans for one department at a time

use std::sync::Arc;
use std::time::Duration;

use planner_sync_common::resilience::BackoffRetrier;
use planner_sync_common::time::{Clock, SystemClock};
use planner_sync_domain::constants::DEFAULT_PLANNER_TIMEOUT_SECS;
use planner_sync_domain::Result;
use tracing::{info, instrument, warn};

use super::ports::ResourceRepository;
use super::reconciler::plan_reconciliation;
use crate::planner_ports::{retry_error_to_domain, with_call_timeout, PlannerClient};

/// Counts of what a reconciliation run changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub department: String,
    pub added: usize,
    pub soft_deleted: usize,
    pub ambiguous_mail_addresses: Vec<String>,
}

/// Resource reconciliation service
pub struct ResourceReconciler {
    client: Arc<dyn PlannerClient>,
    repository: Arc<dyn ResourceRepository>,
    retrier: BackoffRetrier,
    clock: Arc<dyn Clock>,
    call_timeout: Duration,
}

impl ResourceReconciler {
    pub fn new(
        client: Arc<dyn PlannerClient>,
        repository: Arc<dyn ResourceRepository>,
        retrier: BackoffRetrier,
    ) -> Self {
        Self {
            client,
            repository,
            retrier,
            clock: Arc::new(SystemClock),
            call_timeout: Duration::from_secs(DEFAULT_PLANNER_TIMEOUT_SECS),
        }
    }

    /// Replace the wall clock used for `created_date`/`deleted_date`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Fetch the Planner list for `department` and apply the resulting plan.
    ///
    /// Running it twice against an unchanged Planner list changes nothing the
    /// second time.
    #[instrument(skip(self))]
    pub async fn reconcile_department(&self, department: &str) -> Result<ReconciliationReport> {
        let client = &self.client;
        let limit = self.call_timeout;
        let external = self
            .retrier
            .retry("get_resources", || async move {
                with_call_timeout(limit, client.get_resources(department)).await
            })
            .await
            .map_err(|err| retry_error_to_domain("get_resources", err))?;

        let local = self.repository.resources_for_department(department).await?;
        let now = self.clock.now();
        let plan = plan_reconciliation(&external, &local, department, now);

        for mail_address in &plan.ambiguous_mail_addresses {
            warn!(department, mail_address = %mail_address, "Mail address listed more than once by Planner, excluded from reconciliation");
        }

        if !plan.to_add.is_empty() {
            self.repository.insert_resources(&plan.to_add).await?;
        }
        if !plan.to_soft_delete.is_empty() {
            self.repository.soft_delete_resources(&plan.to_soft_delete, now).await?;
        }

        let report = ReconciliationReport {
            department: department.to_string(),
            added: plan.to_add.len(),
            soft_deleted: plan.to_soft_delete.len(),
            ambiguous_mail_addresses: plan.ambiguous_mail_addresses,
        };

        info!(
            department,
            external = external.len(),
            added = report.added,
            soft_deleted = report.soft_deleted,
            ambiguous = report.ambiguous_mail_addresses.len(),
            "Resources reconciled"
        );

        Ok(report)
    }
}
