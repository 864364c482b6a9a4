//! Typed front end for comparing supermarket product prices.
//!
//! This crate reads product price records from a hosted `PostgREST`
//! dataset, renders them as price tables, and submits multi-query batch
//! searches to a separate search backend. View state for the listings
//! ([`listing::ListingView`]) and the search form ([`form::SearchForm`])
//! is kept free of I/O, so it can be driven by the async or blocking
//! clients in [`client`] or by the in-memory source in [`source`].

extern crate alloc;

#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod listing;
pub mod models;
pub mod query;
pub mod render;
pub mod sequence;
pub mod source;
