//! Per-session loop: one render session bound to one identity.
//!
//! The session iterates its assigned work in input order. Navigation gets an
//! in-place retry loop; exhausting it faults the whole session. The block
//! heuristic is evaluated only after an item's outcome has been recorded, so
//! navigation exhaustion always wins when both conditions arise on the same
//! item.

use super::Harvester;
use crate::detector::BlockDetector;
use crate::identity::SessionIdentity;
use crate::retry::retry_with_backoff;
use crate::types::{Event, RecordStatus, SessionEnd, SessionFault, SessionReport, WorkItem};

impl Harvester {
    /// Run one session over the pending work list.
    ///
    /// Returns what was durably appended plus how the session ended; a
    /// non-clean end is the signal for identity rotation upstream. Items not
    /// appended here stay pending for the next session.
    pub(crate) async fn run_session(
        &mut self,
        identity: &SessionIdentity,
        pending: &[WorkItem],
    ) -> SessionReport {
        let session = match self.provider.open(identity).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    scope = %identity.storage_scope,
                    "failed to acquire render session"
                );
                return SessionReport {
                    appended: Vec::new(),
                    end: SessionEnd::Faulted(SessionFault::Acquisition),
                };
            }
        };

        let page = session.as_ref();
        let mut detector = BlockDetector::new(self.config.block_threshold);
        let mut appended: Vec<WorkItem> = Vec::new();
        let rotate_every = self.config.session_rotate_every;

        for (index, item) in pending.iter().enumerate() {
            if rotate_every > 0 && index >= rotate_every {
                tracing::info!(processed = index, "session rotation interval reached");
                break;
            }

            tracing::info!(
                url = %item,
                position = index + 1,
                total = pending.len(),
                "processing work item"
            );

            let timeout = self.config.navigation_timeout;
            let navigation =
                retry_with_backoff(&self.config.navigation_retry, || page.navigate(item, timeout))
                    .await;

            if let Err(e) = navigation {
                tracing::error!(url = %item, error = %e, "navigation failed, tearing session down");
                return SessionReport {
                    appended,
                    end: SessionEnd::Faulted(SessionFault::Navigation { url: item.clone() }),
                };
            }

            self.governor.settle().await;

            let record = self.extractor.extract(page, item).await;
            let succeeded = record.status == RecordStatus::Success;

            match self.sink.append(&record) {
                Ok(()) => {
                    appended.push(item.clone());
                    let _ = self.event_tx.send(Event::RecordHarvested {
                        url: item.clone(),
                        status: record.status,
                    });
                }
                // Degraded mode: the item stays pending and will be retried
                // by a later session.
                Err(e) => {
                    tracing::error!(url = %item, error = %e, "failed to persist record")
                }
            }

            detector.record(succeeded);
            if detector.is_blocked() {
                tracing::warn!(
                    attempted = detector.attempted(),
                    "no successes past threshold, suspecting block"
                );
                let _ = self.event_tx.send(Event::BlockSuspected {
                    attempted: detector.attempted(),
                });
                return SessionReport {
                    appended,
                    end: SessionEnd::Faulted(SessionFault::SuspectedBlock),
                };
            }

            self.governor.rest_between_items(index + 1).await;
        }

        SessionReport {
            appended,
            end: SessionEnd::Clean,
        }
    }
}
