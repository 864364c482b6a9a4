//! Product price snapshot model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::MerchantId;

/// A read-only snapshot of a product's price at a merchant.
///
/// Every field is independently nullable; consumers must never assume a
/// value is present. Field names on the wire follow the dataset columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Link to the product page, doubling as the record identifier.
    #[serde(rename = "url", default)]
    pub source_url: Option<String>,
    /// Product display name (Dutch).
    #[serde(rename = "product_name_du", default)]
    pub product_name: Option<String>,
    /// Raw unit-of-sale string, e.g. `"1 liter"`.
    #[serde(rename = "unit_du", default)]
    pub unit_label: Option<String>,
    /// Current shelf price in euros.
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Pre-discount price in euros.
    #[serde(default)]
    pub regular_price: Option<f64>,
    /// First day of the promotional validity window.
    #[serde(default)]
    pub valid_from: Option<String>,
    /// Last day of the promotional validity window.
    #[serde(default)]
    pub valid_to: Option<String>,
    /// Selling merchant.
    #[serde(rename = "supermarket", default)]
    pub merchant: Option<MerchantId>,
}

impl PriceRecord {
    /// Dataset columns projected by every price read, in wire order.
    pub const COLUMNS: [&'static str; 8] = [
        "url",
        "product_name_du",
        "unit_du",
        "current_price",
        "regular_price",
        "valid_from",
        "valid_to",
        "supermarket",
    ];

    /// Returns the textual value of a dataset column, if the column is a
    /// text column and the value is present.
    #[inline]
    #[must_use]
    pub fn text_column(&self, column: &str) -> Option<&str> {
        match column {
            "url" => self.source_url.as_deref(),
            "product_name_du" => self.product_name.as_deref(),
            "unit_du" => self.unit_label.as_deref(),
            "valid_from" => self.valid_from.as_deref(),
            "valid_to" => self.valid_to.as_deref(),
            "supermarket" => self.merchant.as_ref().map(MerchantId::as_inner),
            _ => None,
        }
    }

    /// Parses the validity window boundaries.
    ///
    /// Accepts plain `YYYY-MM-DD` dates as well as timestamps carrying a
    /// `T…` time suffix. Unparseable boundaries are treated as absent.
    #[inline]
    #[must_use]
    pub fn validity_window(&self) -> (Option<NaiveDate>, Option<NaiveDate>) {
        (
            self.valid_from.as_deref().and_then(parse_day),
            self.valid_to.as_deref().and_then(parse_day),
        )
    }

    /// Returns `true` if `date` falls inside the inclusive validity window.
    ///
    /// A missing boundary leaves that side of the window open.
    #[inline]
    #[must_use]
    pub fn is_valid_on(&self, date: NaiveDate) -> bool {
        let (from, to) = self.validity_window();
        from.is_none_or(|start| date >= start) && to.is_none_or(|end| date <= end)
    }

    /// Returns the price reduction against the regular price, when both
    /// prices are known and the current one is lower.
    #[inline]
    #[must_use]
    pub fn discount(&self) -> Option<f64> {
        let current = self.current_price?;
        let regular = self.regular_price?;
        (regular > current).then(|| regular - current)
    }
}

/// Parses the date part of a `YYYY-MM-DD[T…]` string.
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day = raw.trim().split(['T', ' ']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
