pub mod client;
pub mod reconciler;

pub use client::{
    CategoryCorrection, ClientError, DailySummary, HttpLedgerClient, LedgerClient, MockLedger,
    SpendingItem, SpendingSummary, SyncRequest, SyncResponse, SyncTransaction,
};
pub use reconciler::{Reconciler, SyncError, SyncOutcome};
