//! Shared async helpers.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::{Error, Result};

/// Run a fallible future with a deadline, mapping expiry to `Error::Timeout`.
pub async fn with_timeout<F, T>(duration: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(duration, fut).await {
        Ok(inner) => inner,
        Err(_) => Err(Error::Timeout(duration)),
    }
}

/// Await a spawned task, flattening join failures into `Error::TaskJoin`.
pub async fn join<T>(handle: JoinHandle<Result<T>>) -> Result<T> {
    handle.await.map_err(|e| Error::TaskJoin(e.to_string()))?
}
