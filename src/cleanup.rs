//! Periodic pruning of revocation records for tokens past their expiry.

use sqlx::PgPool;
use std::time::Duration;
use tracing::{error, info};

use crate::auth::prune_expired;

/// Run one sweep over the revocation table.
pub async fn run_revocation_sweep(pool: &PgPool) {
    match prune_expired(pool).await {
        Ok(count) if count > 0 => info!("Pruned {} expired revocation records", count),
        Ok(_) => {}
        Err(e) => error!("Failed to prune revocation records: {}", e),
    }
}

/// Spawn a background task that sweeps on a fixed interval.
/// The first sweep runs immediately.
pub fn spawn_revocation_sweeper(pool: PgPool, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);

        loop {
            interval.tick().await;
            run_revocation_sweep(&pool).await;
        }
    })
}
