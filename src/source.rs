//! Pluggable collaborators: the price dataset and the search backend.
//!
//! This module defines the [`PriceSource`] / [`SearchBackend`] (async) and
//! [`BlockingPriceSource`] / [`BlockingSearchBackend`] (blocking) traits via
//! a shared macro, mirroring the client generation pattern in
//! [`crate::client`]. The HTTP clients implement them; so does
//! [`InMemoryPriceSource`] for tests and offline use.

mod memory;

pub use memory::InMemoryPriceSource;

/// Generates the collaborator traits (async or blocking).
///
/// Uses `@method` to render each method in async (`impl Future + Send`)
/// or blocking (`fn`) style.
macro_rules! define_sources {
    // ── Entry point ─────────────────────────────────────────────────
    (
        price_trait: $price_trait:ident,
        price_doc: $price_doc:expr,
        search_trait: $search_trait:ident,
        search_doc: $search_doc:expr,
        mode: $mode:ident,
    ) => {
        #[doc = $price_doc]
        pub trait $price_trait: core::fmt::Debug + Send + Sync {
            define_sources!(@method $mode, query,
                "Runs a read request and returns the matching rows.\n\nAny error means the whole request failed; no partial rows are returned.\n\n# Errors\n\nReturns an error if the data source cannot answer the request.",
                request: &ReadRequest, -> Result<Vec<PriceRecord>>);
        }

        #[doc = $search_doc]
        pub trait $search_trait: core::fmt::Debug + Send + Sync {
            define_sources!(@method $mode, submit,
                "Submits a batch search and returns the raw JSON response.\n\n# Errors\n\nReturns an error on transport failure, a non-success status, or an unparseable body.",
                request: &SearchRequest, -> Result<serde_json::Value>);
        }
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_source {
    //! Async collaborator traits.

    use crate::error::Result;
    use crate::models::{PriceRecord, SearchRequest};
    use crate::query::ReadRequest;

    define_sources! {
        price_trait: PriceSource,
        price_doc: "Async queryable dataset of product price records.",
        search_trait: SearchBackend,
        search_doc: "Async batch search backend.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_source {
    //! Blocking collaborator traits.

    use crate::error::Result;
    use crate::models::{PriceRecord, SearchRequest};
    use crate::query::ReadRequest;

    define_sources! {
        price_trait: BlockingPriceSource,
        price_doc: "Blocking queryable dataset of product price records.",
        search_trait: BlockingSearchBackend,
        search_doc: "Blocking batch search backend.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_source::{PriceSource, SearchBackend};
#[cfg(feature = "blocking")]
pub use blocking_source::{BlockingPriceSource, BlockingSearchBackend};
