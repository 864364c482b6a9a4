//! Data models for price records and search backend payloads.
//!
//! This module contains the price snapshot type returned by the dataset,
//! the batch request sent to the search backend, newtype ID wrappers, and
//! enumeration types for constrained values.

mod enums;
mod ids;
mod price_record;
mod search;

pub use chrono::NaiveDate;
pub use enums::{SearchLang, SortBy, Supermarket};
pub use ids::MerchantId;
pub use price_record::PriceRecord;
pub use search::{HealthStatus, SearchRequest, parse_queries};
