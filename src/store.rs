//! Data loader for the forecast table.
//!
//! `RecordStore` reads the full record set from PostgreSQL and memoizes it
//! for a configurable window, so repeated requests in quick succession do
//! not reread the table. Derived tables are never cached.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::{Config, ForecastRecord, RawForecastRow};

// ---

/// Load every forecast record, ordered by issue then horizon.
pub async fn load_records(pool: &PgPool, quoted_table: &str) -> Result<Vec<ForecastRecord>> {
    // ---
    let query = format!(
        r#"
        SELECT
            date::text          AS date,
            forecast::int4      AS forecast,
            temp_max::float8    AS temp_max,
            issue::text         AS issue,
            extended_text::text AS extended_text
        FROM {quoted_table}
        ORDER BY issue, forecast
        "#
    );

    let rows: Vec<RawForecastRow> = sqlx::query_as(&query)
        .fetch_all(pool)
        .await
        .with_context(|| format!("Failed to load forecast records from {quoted_table}"))?;

    tracing::debug!("Loaded {} rows from {}", rows.len(), quoted_table);

    let records = rows
        .iter()
        .map(RawForecastRow::to_record)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Last loaded value and when it was loaded.
#[derive(Debug)]
pub struct RecordCache<T> {
    ttl: Duration,
    slot: Mutex<Option<(Instant, Arc<T>)>>,
}

impl<T> RecordCache<T> {
    // ---
    pub fn new(ttl: Duration) -> Self {
        RecordCache {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if it is younger than the TTL, otherwise run
    /// `load` and keep its result. Failed loads are not cached.
    pub async fn get_or_load<F, Fut, E>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        // ---
        let mut slot = self.slot.lock().await;

        if let Some((loaded_at, value)) = slot.as_ref() {
            if loaded_at.elapsed() < self.ttl {
                tracing::debug!("Using cached records loaded {:?} ago", loaded_at.elapsed());
                return Ok(Arc::clone(value));
            }
        }

        let value = Arc::new(load().await?);
        *slot = Some((Instant::now(), Arc::clone(&value)));
        Ok(value)
    }

    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

/// Pool plus memoized records, shared by all request handlers.
#[derive(Clone)]
pub struct RecordStore {
    pool: PgPool,
    quoted_table: String,
    cache: Arc<RecordCache<Vec<ForecastRecord>>>,
}

impl RecordStore {
    // ---
    pub fn new(pool: PgPool, config: &Config) -> Self {
        RecordStore {
            pool,
            quoted_table: config.quoted_table(),
            cache: Arc::new(RecordCache::new(Duration::from_secs(
                config.record_cache_secs.into(),
            ))),
        }
    }

    pub async fn records(&self) -> Result<Arc<Vec<ForecastRecord>>> {
        // ---
        self.cache
            .get_or_load(|| load_records(&self.pool, &self.quoted_table))
            .await
    }

    pub async fn reload(&self) -> Result<Arc<Vec<ForecastRecord>>> {
        self.cache.invalidate().await;
        self.records().await
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counting_load(calls: &AtomicUsize) -> Result<Vec<u32>, String> {
        let n = calls.fetch_add(1, Ordering::SeqCst) as u32;
        Ok(vec![n])
    }

    #[test]
    fn test_cache_reuses_value_within_ttl() {
        // ---
        let calls = AtomicUsize::new(0);
        let cache = RecordCache::new(Duration::from_secs(600));

        tokio_test::block_on(async {
            let first = cache.get_or_load(|| counting_load(&calls)).await.unwrap();
            let second = cache.get_or_load(|| counting_load(&calls)).await.unwrap();

            assert_eq!(*first, vec![0]);
            assert!(Arc::ptr_eq(&first, &second));
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_ttl_always_reloads() {
        // ---
        let calls = AtomicUsize::new(0);
        let cache = RecordCache::new(Duration::ZERO);

        tokio_test::block_on(async {
            cache.get_or_load(|| counting_load(&calls)).await.unwrap();
            let second = cache.get_or_load(|| counting_load(&calls)).await.unwrap();
            assert_eq!(*second, vec![1]);
        });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_load_not_cached() {
        // ---
        let cache: RecordCache<Vec<u32>> = RecordCache::new(Duration::from_secs(600));

        tokio_test::block_on(async {
            let err = cache
                .get_or_load(|| async { Err::<Vec<u32>, _>("store offline".to_string()) })
                .await
                .unwrap_err();
            assert_eq!(err, "store offline");

            let value = cache
                .get_or_load(|| async { Ok::<_, String>(vec![7]) })
                .await
                .unwrap();
            assert_eq!(*value, vec![7]);
        });
    }

    #[test]
    fn test_invalidate_forces_reload() {
        // ---
        let calls = AtomicUsize::new(0);
        let cache = RecordCache::new(Duration::from_secs(600));

        tokio_test::block_on(async {
            cache.get_or_load(|| counting_load(&calls)).await.unwrap();
            cache.invalidate().await;
            cache.get_or_load(|| counting_load(&calls)).await.unwrap();
        });
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
