//! Top-level batch loop: resume, identity rotation, and the retry budget.
//!
//! Pending work is the input list minus the prefix already covered by the
//! durable count, then minus everything appended as sessions run. Each loop
//! iteration hands the full pending list to one session; a non-clean session
//! spends one unit of the global retry budget and rotates to the next
//! identity with a discarded storage scope.

use super::Harvester;
use crate::error::Result;
use crate::types::{Event, RunSummary, WorkItem};
use std::collections::HashSet;

impl Harvester {
    /// Run the harvest to completion or budget exhaustion.
    ///
    /// Always terminates, and always leaves the durable outputs behind:
    /// budget exhaustion is reported through `pending_remaining`, not as an
    /// error.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let input_count = self.items.len();
        let done = self.sink.durable_count().min(input_count);
        if done > 0 {
            tracing::info!(resume_at = done, "resuming from durable output");
        }
        let mut pending: Vec<WorkItem> = self.items[done..].to_vec();
        let mut rotations: u32 = 0;

        while !pending.is_empty() && rotations < self.config.max_global_retries {
            let identity = self.pool.next();
            let _ = self.event_tx.send(Event::SessionStarted {
                proxy: identity.proxy.as_ref().map(|u| u.to_string()),
                pending: pending.len(),
            });
            tracing::info!(
                pending = pending.len(),
                proxy = identity
                    .proxy
                    .as_ref()
                    .map(url::Url::as_str)
                    .unwrap_or("direct"),
                "starting session"
            );

            let report = self.run_session(&identity, &pending).await;

            let finished: HashSet<&WorkItem> = report.appended.iter().collect();
            pending.retain(|item| !finished.contains(item));

            let clean = report.completed_cleanly();
            let _ = self.event_tx.send(Event::SessionEnded {
                appended: report.appended.len(),
                clean,
            });

            if pending.is_empty() {
                break;
            }

            if !clean {
                rotations += 1;
                tracing::warn!(
                    rotations,
                    budget = self.config.max_global_retries,
                    pending = pending.len(),
                    "session did not complete cleanly, rotating identity"
                );
                let _ = self.event_tx.send(Event::IdentityRotated { rotations });

                // A compromised profile must not taint the next identity.
                if let Err(e) = self.provider.discard_storage(&identity.storage_scope).await {
                    tracing::warn!(
                        scope = %identity.storage_scope,
                        error = %e,
                        "failed to discard storage scope"
                    );
                }

                if self.pool.has_cycled() {
                    tracing::info!("identity pool cycled, extended cooldown before next session");
                    self.governor.cooldown().await;
                }
            } else if report.appended.is_empty() {
                // A clean session that made no progress (persistence in
                // degraded mode) must still drain the budget or the loop
                // would never terminate.
                rotations += 1;
                tracing::warn!(rotations, "clean session made no progress");
            }
        }

        self.sink.finalize()?;

        let summary = RunSummary {
            input_count,
            harvested: self.sink.appended_this_run(),
            pending_remaining: pending.len(),
            rotations_spent: rotations,
        };
        let _ = self.event_tx.send(Event::RunCompleted {
            harvested: summary.harvested,
            pending: summary.pending_remaining,
        });

        if summary.pending_remaining == 0 {
            tracing::info!(harvested = summary.harvested, "harvest complete");
        } else {
            tracing::warn!(
                harvested = summary.harvested,
                pending = summary.pending_remaining,
                "retry budget exhausted, run ends with partial coverage"
            );
        }

        Ok(summary)
    }
}
