// ============================
// crates/backend-lib/src/auth/reaper.rs
// ============================
//! Background purge of expired ledger rows.
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::metrics::LEDGER_PURGED;
use crate::storage::TokenLedger;

/// Delete every expired ledger row once; returns how many were removed.
///
/// Failures are logged and reported as zero so the reaper keeps running.
pub async fn sweep_expired(ledger: &dyn TokenLedger) -> u64 {
    match ledger.purge_expired(Utc::now()).await {
        Ok(removed) => {
            if removed > 0 {
                tracing::info!(removed, "purged expired sessions");
                counter!(LEDGER_PURGED).increment(removed);
            }
            removed
        },
        Err(e) => {
            tracing::warn!(error = %e, "ledger sweep failed");
            0
        },
    }
}

/// Sweep the ledger every `every`, starting immediately
pub fn spawn_ledger_reaper(ledger: Arc<dyn TokenLedger>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_expired(ledger.as_ref()).await;
        }
    })
}
