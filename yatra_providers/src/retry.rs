use std::fmt::Display;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Retry an async operation with the given backoff schedule.
///
/// The operation runs once per entry in `delays` plus one final
/// attempt; after a failed attempt the corresponding delay is slept
/// before trying again.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, delays: &[Duration]) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = delays.len() + 1;

    for (i, delay) in delays.iter().enumerate() {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                warn!(
                    "Request failed (attempt {}/{}): {e}. Retrying in {:?}...",
                    i + 1,
                    attempts,
                    delay
                );
                sleep(*delay).await;
            }
        }
    }

    operation().await
}
