//! Multi-query search form state machine.
//!
//! The form collects free-text product lines, a search language and a
//! supermarket selection, and submits them as one [`SearchRequest`] to the
//! search backend:
//!
//! ```text
//! Idle ──begin──▶ Searching ──finish──▶ Success | Failed ──edit──▶ Idle
//! ```
//!
//! While searching, [`SearchForm::begin`] refuses to start another
//! request. Every completion path clears the busy state.

use alloc::collections::BTreeSet;

use crate::error::{PriceCompareError, Result};
use crate::models::{SearchLang, SearchRequest, Supermarket};
use crate::sequence::{RequestSequence, RequestTicket};

#[cfg(feature = "async")]
use crate::source::SearchBackend;
#[cfg(feature = "blocking")]
use crate::source::BlockingSearchBackend;

/// Status text before the first search.
pub const IDLE_MESSAGE: &str = "No results yet.";

/// Status text while a search is in flight.
pub const SEARCHING_MESSAGE: &str = "Searching...";

/// Where the form is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormStatus {
    /// Nothing submitted since the last edit.
    Idle,
    /// A search is in flight; resubmission is disabled.
    Searching,
    /// The last search succeeded; the output is the pretty-printed
    /// response.
    Success,
    /// The last submission failed; the output is the user-facing message.
    Failed,
}

/// A search ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSearch {
    /// Ticket to hand back to [`SearchForm::finish`].
    pub ticket: RequestTicket,
    /// Payload for the search backend.
    pub request: SearchRequest,
}

/// State of the multi-query search form.
#[derive(Debug, Clone)]
pub struct SearchForm {
    /// Raw multi-line input.
    text: String,
    /// Selected query language.
    lang: SearchLang,
    /// Selected supermarkets.
    supermarkets: BTreeSet<Supermarket>,
    /// Submit cycle status.
    status: FormStatus,
    /// Response or failure text of the last terminal status.
    output: String,
    /// Issued request tickets.
    sequence: RequestSequence,
}

impl Default for SearchForm {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl SearchForm {
    /// Creates an idle form with every supermarket selected and Dutch as
    /// the query language.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: String::new(),
            lang: SearchLang::default(),
            supermarkets: Supermarket::ALL.into_iter().collect(),
            status: FormStatus::Idle,
            output: String::new(),
            sequence: RequestSequence::new(),
        }
    }

    /// Returns the raw input text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the raw input text.
    #[inline]
    pub fn set_text<T: Into<String>>(&mut self, text: T) {
        self.text = text.into();
        self.touch();
    }

    /// Returns the selected query language.
    #[inline]
    #[must_use]
    pub const fn language(&self) -> SearchLang {
        self.lang
    }

    /// Selects the query language.
    #[inline]
    pub fn set_language(&mut self, lang: SearchLang) {
        self.lang = lang;
        self.touch();
    }

    /// Returns the selected supermarkets.
    #[inline]
    #[must_use]
    pub const fn supermarkets(&self) -> &BTreeSet<Supermarket> {
        &self.supermarkets
    }

    /// Returns `true` if `market` is selected.
    #[inline]
    #[must_use]
    pub fn is_selected(&self, market: Supermarket) -> bool {
        self.supermarkets.contains(&market)
    }

    /// Flips the selection of `market` and returns whether it is now
    /// selected.
    #[inline]
    pub fn toggle_supermarket(&mut self, market: Supermarket) -> bool {
        let selected = if self.supermarkets.remove(&market) {
            false
        } else {
            self.supermarkets.insert(market)
        };
        self.touch();
        selected
    }

    /// Replaces the whole selection.
    #[inline]
    pub fn select_only<I: IntoIterator<Item = Supermarket>>(&mut self, markets: I) {
        self.supermarkets = markets.into_iter().collect();
        self.touch();
    }

    /// Returns the submit cycle status.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> FormStatus {
        self.status
    }

    /// Returns `true` while a search is in flight.
    #[inline]
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        matches!(self.status, FormStatus::Searching)
    }

    /// Returns the text to show in the result area.
    #[inline]
    #[must_use]
    pub fn status_text(&self) -> &str {
        match self.status {
            FormStatus::Idle => IDLE_MESSAGE,
            FormStatus::Searching => SEARCHING_MESSAGE,
            FormStatus::Success | FormStatus::Failed => &self.output,
        }
    }

    /// Starts a submission.
    ///
    /// Returns `Ok(None)` without side effects while another search is in
    /// flight. Otherwise builds the request from the current input, moves
    /// to [`FormStatus::Searching`] and returns the pending search.
    ///
    /// # Errors
    ///
    /// Returns [`PriceCompareError::NoQueries`] if the input has no
    /// non-empty line; the status then shows the validation message and
    /// no request must be sent.
    #[inline]
    pub fn begin(&mut self) -> Result<Option<PendingSearch>> {
        if self.is_busy() {
            tracing::debug!("search already in flight, ignoring submit");
            return Ok(None);
        }
        let request =
            match SearchRequest::from_text(&self.text, self.lang, self.supermarkets.clone()) {
                Ok(request) => request,
                Err(err) => {
                    self.settle(FormStatus::Failed, err.to_string());
                    return Err(err);
                }
            };
        let ticket = self.sequence.issue();
        self.status = FormStatus::Searching;
        tracing::debug!(
            ticket = ticket.number(),
            queries = request.queries.len(),
            lang = %request.search_lang,
            "search submitted"
        );
        Ok(Some(PendingSearch { ticket, request }))
    }

    /// Applies the outcome of a search.
    ///
    /// Returns `false` and leaves the form untouched if `ticket` is not the
    /// latest. Otherwise the busy state always ends: a response is shown
    /// pretty-printed, a failure as `Error: <message>`.
    #[inline]
    pub fn finish(&mut self, ticket: RequestTicket, outcome: Result<serde_json::Value>) -> bool {
        if !self.sequence.is_latest(ticket) || !self.is_busy() {
            tracing::debug!(ticket = ticket.number(), "dropping stale search response");
            return false;
        }
        match outcome.and_then(|value| {
            serde_json::to_string_pretty(&value).map_err(PriceCompareError::from)
        }) {
            Ok(pretty) => self.settle(FormStatus::Success, pretty),
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                self.settle(FormStatus::Failed, format!("Error: {err}"));
            }
        }
        true
    }

    /// Runs a complete submission against an async backend.
    ///
    /// No request is sent if validation fails or a search is in flight.
    #[cfg(feature = "async")]
    #[inline]
    pub async fn submit<B: SearchBackend>(&mut self, backend: &B) -> FormStatus {
        if let Ok(Some(pending)) = self.begin() {
            let outcome = backend.submit(&pending.request).await;
            let _applied = self.finish(pending.ticket, outcome);
        }
        self.status
    }

    /// Runs a complete submission against a blocking backend.
    ///
    /// No request is sent if validation fails or a search is in flight.
    #[cfg(feature = "blocking")]
    #[inline]
    pub fn submit_blocking<B: BlockingSearchBackend>(&mut self, backend: &B) -> FormStatus {
        if let Ok(Some(pending)) = self.begin() {
            let outcome = backend.submit(&pending.request);
            let _applied = self.finish(pending.ticket, outcome);
        }
        self.status
    }

    /// Enters a terminal status with its output text.
    fn settle(&mut self, status: FormStatus, output: String) {
        self.status = status;
        self.output = output;
    }

    /// Returns a terminal status to idle after an edit.
    fn touch(&mut self) {
        if matches!(self.status, FormStatus::Success | FormStatus::Failed) {
            self.status = FormStatus::Idle;
            self.output.clear();
        }
    }
}
