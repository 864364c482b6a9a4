//! Search backend request/response models.

use alloc::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{SearchLang, SortBy, Supermarket};
use crate::error::{PriceCompareError, Result};

/// One batch submission to the search backend's `/search` endpoint.
///
/// Built fresh per submission and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Non-empty, trimmed product descriptions in input order.
    pub queries: Vec<String>,
    /// Language the queries are written in.
    pub search_lang: SearchLang,
    /// Supermarkets to search.
    pub supermarkets: BTreeSet<Supermarket>,
    /// Sort key for each query's results.
    pub sort_by: SortBy,
}

impl SearchRequest {
    /// Builds a request from raw multi-line input, one product per line.
    ///
    /// The sort key is always [`SortBy::UnitPrice`].
    ///
    /// # Errors
    ///
    /// Returns [`PriceCompareError::NoQueries`] if no line has any
    /// non-whitespace content.
    #[inline]
    pub fn from_text(
        text: &str,
        search_lang: SearchLang,
        supermarkets: BTreeSet<Supermarket>,
    ) -> Result<Self> {
        let queries = parse_queries(text);
        if queries.is_empty() {
            return Err(PriceCompareError::NoQueries);
        }
        Ok(Self {
            queries,
            search_lang,
            supermarkets,
            sort_by: SortBy::UnitPrice,
        })
    }
}

/// Splits raw input on newlines, trims each line and drops empty lines.
#[inline]
#[must_use]
pub fn parse_queries(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Response of the search backend's health probe (`GET /`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Status keyword, `"ok"` when the backend is up.
    pub status: String,
    /// Optional human-readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    /// Returns `true` if the backend reports itself healthy.
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}
