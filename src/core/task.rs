//! Detached execution for lookups that populate shared caches

use crate::utils::error::{CoreError, Result};
use std::future::Future;

/// Run `fut` on its own task and await its result.
///
/// Dropping the returned future does not cancel the task, so a caller that
/// goes away mid-lookup still leaves the caches populated for the next one.
pub async fn run_detached<F, T>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(fut)
        .await
        .map_err(|e| CoreError::Internal(format!("Detached lookup failed: {}", e)))?
}
