//! Result-list view state for browse and promotion listings.
//!
//! One [`ListingView`] serves both listings; only the listing kind and
//! the merchant differ. The view owns its records, loading flag and error
//! message exclusively. Requests are split into [`ListingView::begin`]
//! and [`ListingView::finish`] so that a newer request supersedes an older
//! one: responses carrying a stale ticket are dropped.

use crate::error::Result;
use crate::models::{MerchantId, PriceRecord};
use crate::query::{Listing, PriceQuery, ReadRequest};
use crate::render::{PriceTable, render_table};
use crate::sequence::{RequestSequence, RequestTicket};

#[cfg(feature = "async")]
use crate::source::PriceSource;
#[cfg(feature = "blocking")]
use crate::source::BlockingPriceSource;

/// State of one result-list view.
#[derive(Debug, Clone)]
pub struct ListingView {
    /// Listing kind (table and row cap).
    listing: Listing,
    /// Fixed merchant filter.
    merchant: MerchantId,
    /// Rows of the latest successful response.
    records: Vec<PriceRecord>,
    /// Whether the latest request is still in flight.
    loading: bool,
    /// Message of the latest failed request.
    error: Option<String>,
    /// Issued request tickets.
    sequence: RequestSequence,
}

impl ListingView {
    /// Creates an idle, empty view.
    #[inline]
    #[must_use]
    pub fn new<M: Into<MerchantId>>(listing: Listing, merchant: M) -> Self {
        Self {
            listing,
            merchant: merchant.into(),
            records: Vec::new(),
            loading: false,
            error: None,
            sequence: RequestSequence::new(),
        }
    }

    /// Returns the listing kind.
    #[inline]
    #[must_use]
    pub const fn listing(&self) -> Listing {
        self.listing
    }

    /// Returns the merchant filter.
    #[inline]
    #[must_use]
    pub const fn merchant(&self) -> &MerchantId {
        &self.merchant
    }

    /// Returns the records of the latest successful request.
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Returns `true` while the latest request is in flight.
    #[inline]
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Returns the message of the latest failed request, if any.
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Starts a request for `search` and returns its ticket and the read
    /// request to run.
    ///
    /// Marks the view as loading, clears the previous error and
    /// supersedes every earlier ticket.
    #[inline]
    pub fn begin(&mut self, search: &str) -> (RequestTicket, ReadRequest) {
        let ticket = self.sequence.issue();
        self.loading = true;
        self.error = None;
        let request = PriceQuery::new(self.listing, self.merchant.clone())
            .search(search)
            .build();
        tracing::debug!(
            listing = %self.listing,
            ticket = ticket.number(),
            filters = request.filters.len(),
            "listing request started"
        );
        (ticket, request)
    }

    /// Applies the outcome of a request.
    ///
    /// Returns `false` and leaves the view untouched if `ticket` has been
    /// superseded. Otherwise the loading flag is cleared; on success the
    /// records are replaced, on failure they are cleared and the error
    /// message is kept for display.
    #[inline]
    pub fn finish(&mut self, ticket: RequestTicket, outcome: Result<Vec<PriceRecord>>) -> bool {
        if !self.sequence.is_latest(ticket) {
            tracing::debug!(ticket = ticket.number(), "dropping stale listing response");
            return false;
        }
        self.loading = false;
        match outcome {
            Ok(records) => {
                tracing::debug!(rows = records.len(), "listing updated");
                self.records = records;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, listing = %self.listing, "listing request failed");
                self.records.clear();
                self.error = Some(err.into_message());
            }
        }
        true
    }

    /// Renders the current state as a price table.
    #[inline]
    #[must_use]
    pub fn table(&self) -> PriceTable {
        render_table(&self.records, self.loading, self.listing.empty_message())
    }

    /// Runs a complete request against an async source.
    ///
    /// Returns `true` if the response was applied.
    #[cfg(feature = "async")]
    #[inline]
    pub async fn refresh<S: PriceSource>(&mut self, source: &S, search: &str) -> bool {
        let (ticket, request) = self.begin(search);
        let outcome = source.query(&request).await;
        self.finish(ticket, outcome)
    }

    /// Runs a complete request against a blocking source.
    ///
    /// Returns `true` if the response was applied.
    #[cfg(feature = "blocking")]
    #[inline]
    pub fn refresh_blocking<S: BlockingPriceSource>(&mut self, source: &S, search: &str) -> bool {
        let (ticket, request) = self.begin(search);
        let outcome = source.query(&request);
        self.finish(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PriceCompareError;
    use crate::models::Supermarket;
    use crate::render::Placeholder;

    fn product(name: &str) -> PriceRecord {
        PriceRecord {
            product_name: Some(name.to_owned()),
            merchant: Some(MerchantId::from("dirk")),
            current_price: Some(2.5),
            ..PriceRecord::default()
        }
    }

    #[test]
    fn new_view_is_idle_and_empty() {
        let view = ListingView::new(Listing::Promotions, Supermarket::Dirk);
        assert!(!view.is_loading());
        assert!(view.records().is_empty());
        assert!(view.error().is_none());
        assert_eq!(view.merchant().as_inner(), "dirk");
        assert_eq!(
            view.table().placeholder,
            Some(Placeholder {
                message: "No promotions found.".to_owned(),
                span: 6,
            })
        );
    }

    #[test]
    fn begin_builds_request_and_sets_loading() {
        let mut view = ListingView::new(Listing::Browse, "dirk");
        let (_ticket, request) = view.begin("  melk ");
        assert!(view.is_loading());
        assert_eq!(request.table, "food_prices");
        assert_eq!(request.name_pattern(), Some("%melk%"));
        let table = view.table();
        assert!(table.rows.is_empty());
        assert_eq!(table.placeholder, None);
    }

    #[test]
    fn finish_success_replaces_records() {
        let mut view = ListingView::new(Listing::Browse, "dirk");
        let (ticket, _) = view.begin("");
        assert!(view.finish(ticket, Ok(vec![product("Melk"), product("Kaas")])));
        assert!(!view.is_loading());
        assert_eq!(view.records().len(), 2);
        assert_eq!(view.table().row_count(), 2);
    }

    #[test]
    fn failure_clears_previous_records() {
        let mut view = ListingView::new(Listing::Browse, "dirk");
        let (first, _) = view.begin("");
        assert!(view.finish(first, Ok(vec![product("Melk")])));

        let (second, _) = view.begin("kaas");
        let applied = view.finish(
            second,
            Err(PriceCompareError::Source("connection refused".to_owned())),
        );
        assert!(applied);
        assert!(!view.is_loading());
        assert!(view.records().is_empty());
        assert!(view.error().unwrap().contains("connection refused"));
    }

    #[test]
    fn api_failure_shows_server_message() {
        let mut view = ListingView::new(Listing::Promotions, "dirk");
        let (ticket, _) = view.begin("");
        let outcome = Err(PriceCompareError::Api {
            status: 401,
            message: "JWT expired".to_owned(),
        });
        assert!(view.finish(ticket, outcome));
        assert_eq!(view.error(), Some("JWT expired"));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut view = ListingView::new(Listing::Browse, "dirk");
        let (old, _) = view.begin("melk");
        let (latest, _) = view.begin("kaas");

        assert!(view.finish(latest, Ok(vec![product("Kaas")])));
        assert!(!view.finish(old, Ok(vec![product("Melk"), product("Melk 2")])));
        assert_eq!(view.records().len(), 1);
        assert_eq!(view.records()[0].product_name.as_deref(), Some("Kaas"));
    }

    #[test]
    fn stale_response_keeps_loading_until_latest_arrives() {
        let mut view = ListingView::new(Listing::Browse, "dirk");
        let (old, _) = view.begin("melk");
        let (latest, _) = view.begin("kaas");
        assert!(!view.finish(old, Err(PriceCompareError::Source("boom".to_owned()))));
        assert!(view.is_loading());
        assert!(view.error().is_none());
        assert!(view.finish(latest, Ok(Vec::new())));
        assert!(!view.is_loading());
    }

    #[test]
    fn new_request_clears_error() {
        let mut view = ListingView::new(Listing::Browse, "dirk");
        let (ticket, _) = view.begin("");
        let _applied = view.finish(ticket, Err(PriceCompareError::Source("x".to_owned())));
        let _next = view.begin("");
        assert!(view.error().is_none());
    }

    #[cfg(feature = "blocking")]
    mod blocking {
        use super::*;
        use crate::source::InMemoryPriceSource;

        #[test]
        fn refresh_blocking_queries_source() {
            let source = InMemoryPriceSource::new();
            source.insert("food_prices", vec![product("Volle melk"), product("Kipfilet")]);
            let mut view = ListingView::new(Listing::Browse, "dirk");

            assert!(view.refresh_blocking(&source, "MELK"));
            assert_eq!(view.records().len(), 1);
            assert_eq!(source.query_count(), 1);
        }

        #[test]
        fn refresh_blocking_failure_resets_loading() {
            let source = InMemoryPriceSource::new();
            source.fail_with(Some("JWT expired"));
            let mut view = ListingView::new(Listing::Promotions, "dirk");

            assert!(view.refresh_blocking(&source, ""));
            assert!(!view.is_loading());
            assert!(view.error().unwrap().contains("JWT expired"));
            assert_eq!(view.table().row_count(), 1);
        }
    }

    #[cfg(feature = "async")]
    mod async_driver {
        use super::*;
        use crate::source::InMemoryPriceSource;

        #[tokio::test]
        async fn refresh_queries_source() {
            let source = InMemoryPriceSource::new();
            source.insert("v_promotions", vec![product("Volle melk")]);
            let mut view = ListingView::new(Listing::Promotions, "dirk");

            assert!(view.refresh(&source, "").await);
            assert_eq!(view.records().len(), 1);
            assert!(!view.is_loading());
        }

        #[tokio::test]
        async fn refresh_failure_resets_loading() {
            let source = InMemoryPriceSource::new();
            source.fail_with(Some("timeout"));
            let mut view = ListingView::new(Listing::Browse, "dirk");

            assert!(view.refresh(&source, "melk").await);
            assert!(!view.is_loading());
            assert!(view.records().is_empty());
        }
    }
}
