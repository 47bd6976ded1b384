use thiserror::Error;

use paisa_core::Category;
use paisa_storage::{self as storage, DbPool};

use crate::client::{ClientError, LedgerClient, SyncRequest, SyncTransaction};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
    #[error("ledger client error: {0}")]
    Client(#[from] ClientError),
    #[error("remote rejected push: {}", errors.join("; "))]
    Rejected { errors: Vec<String> },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub pushed: usize,
    pub corrections_applied: usize,
}

/// Drains locally pending transactions to the remote ledger and absorbs its
/// authoritative category corrections.
///
/// One reconciler exists per client id; `reconcile` takes `&mut self` so two
/// reconciliations for the same client cannot overlap. A failed attempt makes
/// no local state change, and re-pushing records the remote has already seen
/// is harmless — it deduplicates by fingerprint — so every attempt is
/// safely retriable.
pub struct Reconciler<C: LedgerClient> {
    pool: DbPool,
    client: C,
    client_id: String,
}

impl<C: LedgerClient> Reconciler<C> {
    pub fn new(pool: DbPool, client: C, client_id: impl Into<String>) -> Self {
        Self {
            pool,
            client,
            client_id: client_id.into(),
        }
    }

    pub async fn reconcile(&mut self, force_resync: bool) -> Result<SyncOutcome, SyncError> {
        if force_resync {
            storage::reset_all_to_pending(&self.pool).await?;
        }

        let pending = storage::list_unsynced(&self.pool).await?;
        if pending.is_empty() {
            tracing::debug!("nothing to reconcile");
            return Ok(SyncOutcome::default());
        }

        let request = SyncRequest {
            client_id: self.client_id.clone(),
            transactions: pending.iter().map(SyncTransaction::from_transaction).collect(),
        };

        let response = self.client.push(&request).await?;
        if !response.success {
            return Err(SyncError::Rejected {
                errors: response.errors,
            });
        }

        // Local mutation happens only after a successful acknowledgment.
        let ids: Vec<i64> = pending.iter().filter_map(|t| t.id).collect();
        storage::mark_synced(&self.pool, &ids).await?;

        let mut corrections_applied = 0;
        for correction in &response.corrections {
            let category = Category::from_label(&correction.category);
            if storage::update_category(&self.pool, &correction.fingerprint, category).await? {
                corrections_applied += 1;
            }
        }

        tracing::info!(
            pushed = pending.len(),
            created = response.created_count,
            skipped = response.skipped_count,
            corrections = corrections_applied,
            "reconciliation complete"
        );

        Ok(SyncOutcome {
            pushed: pending.len(),
            corrections_applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{CategoryCorrection, MockLedger, SyncResponse};
    use chrono::Utc;
    use paisa_core::{Channel, Direction, Money, SyncState, Transaction};
    use std::sync::Arc;

    async fn test_db() -> (tempfile::TempDir, DbPool) {
        let dir = tempfile::tempdir().unwrap();
        let pool = storage::create_db(&dir.path().join("paisa.db")).await.unwrap();
        (dir, pool)
    }

    fn pending_tx(fingerprint: &str) -> Transaction {
        Transaction {
            id: None,
            amount: Money::from_paise(12300),
            direction: Direction::Debit,
            counterparty: "Zomato Limited".to_string(),
            channel: Channel::Bank,
            occurred_at: Utc::now(),
            balance_after: None,
            fingerprint: fingerprint.to_string(),
            category: None,
            sync_state: SyncState::Pending,
        }
    }

    fn ack(created: i64, corrections: Vec<CategoryCorrection>) -> SyncResponse {
        SyncResponse {
            success: true,
            created_count: created,
            skipped_count: 0,
            errors: vec![],
            corrections,
        }
    }

    #[tokio::test]
    async fn empty_store_succeeds_without_network_call() {
        let (_dir, pool) = test_db().await;
        let mock = Arc::new(MockLedger::acknowledging(ack(0, vec![])));
        let mut reconciler = Reconciler::new(pool, mock.clone(), "client-1");

        let outcome = reconciler.reconcile(false).await.unwrap();

        assert_eq!(outcome, SyncOutcome::default());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn successful_push_marks_records_synced() {
        let (_dir, pool) = test_db().await;
        storage::insert_transaction(&pool, &pending_tx("fp-1")).await.unwrap();
        storage::insert_transaction(&pool, &pending_tx("fp-2")).await.unwrap();

        let mock = Arc::new(MockLedger::acknowledging(ack(2, vec![])));
        let mut reconciler = Reconciler::new(pool.clone(), mock.clone(), "client-1");

        let outcome = reconciler.reconcile(false).await.unwrap();

        assert_eq!(outcome.pushed, 2);
        assert!(storage::list_unsynced(&pool).await.unwrap().is_empty());

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].client_id, "client-1");
        assert_eq!(requests[0].transactions.len(), 2);
    }

    #[tokio::test]
    async fn transport_failure_leaves_records_pending() {
        let (_dir, pool) = test_db().await;
        storage::insert_transaction(&pool, &pending_tx("fp-1")).await.unwrap();
        storage::insert_transaction(&pool, &pending_tx("fp-2")).await.unwrap();

        let mut failing = Reconciler::new(pool.clone(), MockLedger::failing(), "client-1");
        assert!(matches!(failing.reconcile(false).await, Err(SyncError::Client(_))));
        assert_eq!(storage::list_unsynced(&pool).await.unwrap().len(), 2);

        // The attempt is retriable: a later reconciler drains the same records.
        let mut retry =
            Reconciler::new(pool.clone(), MockLedger::acknowledging(ack(2, vec![])), "client-1");
        assert_eq!(retry.reconcile(false).await.unwrap().pushed, 2);
        assert!(storage::list_unsynced(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejected_response_leaves_records_pending() {
        let (_dir, pool) = test_db().await;
        storage::insert_transaction(&pool, &pending_tx("fp-1")).await.unwrap();

        let response = SyncResponse {
            success: false,
            created_count: 0,
            skipped_count: 0,
            errors: vec!["quota exceeded".to_string()],
            corrections: vec![],
        };
        let mut reconciler =
            Reconciler::new(pool.clone(), MockLedger::acknowledging(response), "client-1");

        match reconciler.reconcile(false).await {
            Err(SyncError::Rejected { errors }) => assert_eq!(errors, ["quota exceeded"]),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(storage::list_unsynced(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrections_overwrite_local_categories() {
        let (_dir, pool) = test_db().await;
        storage::insert_transaction(&pool, &pending_tx("fp-1")).await.unwrap();

        let corrections = vec![
            CategoryCorrection { fingerprint: "fp-1".to_string(), category: "Food".to_string() },
            CategoryCorrection { fingerprint: "fp-ghost".to_string(), category: "Travel".to_string() },
        ];
        let mut reconciler =
            Reconciler::new(pool.clone(), MockLedger::acknowledging(ack(1, corrections)), "client-1");

        let outcome = reconciler.reconcile(false).await.unwrap();

        // The unknown fingerprint is a silent no-op.
        assert_eq!(outcome.corrections_applied, 1);
        let stored = storage::list_recent(&pool, 10).await.unwrap().remove(0);
        assert_eq!(stored.category, Some(paisa_core::Category::Food));
        assert_eq!(stored.sync_state, SyncState::Synced);
    }

    #[tokio::test]
    async fn unrecognized_correction_label_collapses_to_general() {
        let (_dir, pool) = test_db().await;
        storage::insert_transaction(&pool, &pending_tx("fp-1")).await.unwrap();

        let corrections =
            vec![CategoryCorrection { fingerprint: "fp-1".to_string(), category: "Crypto".to_string() }];
        let mut reconciler =
            Reconciler::new(pool.clone(), MockLedger::acknowledging(ack(1, corrections)), "client-1");
        reconciler.reconcile(false).await.unwrap();

        let stored = storage::list_recent(&pool, 10).await.unwrap().remove(0);
        assert_eq!(stored.category, Some(paisa_core::Category::General));
    }

    #[tokio::test]
    async fn force_resync_re_pushes_synced_records() {
        let (_dir, pool) = test_db().await;
        storage::insert_transaction(&pool, &pending_tx("fp-1")).await.unwrap();

        let mock = Arc::new(MockLedger::acknowledging(ack(1, vec![])));
        let mut reconciler = Reconciler::new(pool.clone(), mock.clone(), "client-1");

        assert_eq!(reconciler.reconcile(false).await.unwrap().pushed, 1);
        // Without forcing, there is nothing left to push.
        assert_eq!(reconciler.reconcile(false).await.unwrap().pushed, 0);
        // Forcing resets every record and pushes the full set again.
        assert_eq!(reconciler.reconcile(true).await.unwrap().pushed, 1);
        assert_eq!(mock.requests().len(), 2);
    }
}
