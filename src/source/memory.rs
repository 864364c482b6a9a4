//! In-memory price dataset.
//!
//! Provides [`InMemoryPriceSource`], a thread-safe implementation of the
//! price source traits that evaluates [`ReadRequest`]s locally with the
//! same filter semantics as the remote dataset. Ideal for unit tests and
//! offline demos.

use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(feature = "async")]
use core::future::{self, Future};

use crate::error::{PriceCompareError, Result};
use crate::models::PriceRecord;
use crate::query::ReadRequest;

/// Thread-safe in-memory price dataset.
///
/// Rows are grouped by table name. A failure can be armed with
/// [`InMemoryPriceSource::fail_with`] to exercise error paths; while armed,
/// every query fails without returning rows.
///
/// # Example
///
/// ```rust
/// use price_compare::models::{MerchantId, PriceRecord};
/// use price_compare::source::InMemoryPriceSource;
///
/// let source = InMemoryPriceSource::new();
/// source.insert("food_prices", vec![PriceRecord {
///     product_name: Some("Volle melk".to_owned()),
///     merchant: Some(MerchantId::from("dirk")),
///     ..PriceRecord::default()
/// }]);
/// assert_eq!(source.query_count(), 0);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryPriceSource {
    /// All state behind a single mutex for thread-safe interior mutability.
    inner: Mutex<Inner>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Inner {
    /// Rows per table.
    tables: HashMap<String, Vec<PriceRecord>>,
    /// Armed failure message.
    failure: Option<String>,
    /// Number of queries answered or failed so far.
    queries: usize,
}

impl InMemoryPriceSource {
    /// Creates a new empty dataset.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends rows to a table, creating it if needed.
    #[inline]
    pub fn insert<T: Into<String>>(&self, table: T, rows: Vec<PriceRecord>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.tables.entry(table.into()).or_default().extend(rows);
        }
    }

    /// Arms (`Some`) or disarms (`None`) a failure for subsequent queries.
    #[inline]
    pub fn fail_with<T: Into<String>>(&self, message: Option<T>) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failure = message.map(Into::into);
        }
    }

    /// Returns how many queries have been issued against this source.
    #[inline]
    #[must_use]
    pub fn query_count(&self) -> usize {
        self.inner.lock().map_or(0, |inner| inner.queries)
    }

    /// Evaluates a read request against the stored rows.
    fn run(&self, request: &ReadRequest) -> Result<Vec<PriceRecord>> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        inner.queries = inner.queries.saturating_add(1);
        if let Some(message) = inner.failure.clone() {
            tracing::debug!(table = request.table, "in-memory source failing query");
            return Err(PriceCompareError::Source(message));
        }
        let limit = usize::try_from(request.limit).unwrap_or(usize::MAX);
        let rows: Vec<PriceRecord> = inner
            .tables
            .get(request.table)
            .map(|rows| {
                rows.iter()
                    .filter(|record| request.matches(record))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        tracing::debug!(table = request.table, rows = rows.len(), "in-memory query");
        Ok(rows)
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> PriceCompareError {
    PriceCompareError::Source(err.to_string())
}

// ── BlockingPriceSource implementation ──────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingPriceSource for InMemoryPriceSource {
    #[inline]
    fn query(&self, request: &ReadRequest) -> Result<Vec<PriceRecord>> {
        self.run(request)
    }
}

// ── PriceSource (async) implementation ──────────────────────────────────

#[cfg(feature = "async")]
impl super::PriceSource for InMemoryPriceSource {
    #[inline]
    fn query(
        &self,
        request: &ReadRequest,
    ) -> impl Future<Output = Result<Vec<PriceRecord>>> + Send {
        future::ready(self.run(request))
    }
}
