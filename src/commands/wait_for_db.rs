use std::{fmt::Display, future::Future, time::Duration};

use crate::{constants::DB_RETRY_INTERVAL, database::error::QueryError, postgres};

#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub interval: Duration,
    /// `None` keeps trying forever.
    pub max_attempts: Option<u32>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: DB_RETRY_INTERVAL,
            max_attempts: None,
        }
    }
}

/// Calls `check` until it succeeds, sleeping `interval` between failures.
/// Returns the number of attempts made, or the last error once
/// `max_attempts` is used up.
pub async fn wait_until_ready<F, Fut, E>(mut check: F, options: WaitOptions) -> Result<u32, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    log::info!("Waiting for database connection ...");
    let mut attempts = 0;

    loop {
        attempts += 1;
        match check().await {
            Ok(()) => {
                log::info!("Database available");
                return Ok(attempts);
            }
            Err(e) => {
                if options.max_attempts.is_some_and(|max| attempts >= max) {
                    log::error!("Database unavailable after {attempts} attempts: {e}");
                    return Err(e);
                }
                log::warn!("Database unavailable, waiting ... ({e})");
                tokio::time::sleep(options.interval).await;
            }
        }
    }
}

/// Blocks until a connection to `url` can be opened and answers a query.
pub async fn wait_for_db(url: &str, options: WaitOptions) -> Result<u32, QueryError> {
    wait_until_ready(
        move || async move {
            let pool = postgres::connect(url, 1).await?;
            sqlx::query("SELECT 1").execute(&pool).await?;
            pool.close().await;
            Ok::<(), QueryError>(())
        },
        options,
    )
    .await
}
