//! Enumeration types for constrained request values.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::MerchantId;
use crate::error::PriceCompareError;

/// Language the free-text search queries are written in.
///
/// The search backend uses it to pick the matching product-name column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchLang {
    /// Dutch (`du`).
    #[default]
    #[serde(rename = "du")]
    Dutch,
    /// English (`en`).
    #[serde(rename = "en")]
    English,
}

impl SearchLang {
    /// Returns the wire tag for this language.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dutch => "du",
            Self::English => "en",
        }
    }
}

impl fmt::Display for SearchLang {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchLang {
    type Err = PriceCompareError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "du" | "nl" => Ok(Self::Dutch),
            "en" => Ok(Self::English),
            _ => Err(PriceCompareError::UnknownValue {
                kind: "search language",
                value: s.to_owned(),
            }),
        }
    }
}

/// Sort key applied by the search backend to each query's candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Price normalized per unit of measure.
    #[default]
    UnitPrice,
    /// Current shelf price.
    CurrentPrice,
}

/// A supermarket chain covered by the price dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Supermarket {
    /// Albert Heijn.
    Ah,
    /// Dirk van den Broek.
    Dirk,
    /// Hoogvliet.
    Hoogvliet,
}

impl Supermarket {
    /// Every supported supermarket, in display order.
    pub const ALL: [Self; 3] = [Self::Ah, Self::Dirk, Self::Hoogvliet];

    /// Returns the identifier used in the dataset and on the wire.
    #[inline]
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Ah => "ah",
            Self::Dirk => "dirk",
            Self::Hoogvliet => "hoogvliet",
        }
    }

    /// Returns the short label shown next to a selection toggle.
    #[inline]
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ah => "AH",
            Self::Dirk => "Dirk",
            Self::Hoogvliet => "Hoog",
        }
    }
}

impl fmt::Display for Supermarket {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Supermarket {
    type Err = PriceCompareError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|market| market.id() == wanted)
            .ok_or_else(|| PriceCompareError::UnknownValue {
                kind: "supermarket",
                value: s.to_owned(),
            })
    }
}

impl From<Supermarket> for MerchantId {
    #[inline]
    fn from(value: Supermarket) -> Self {
        Self::from(value.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_lang_serializes_short_tags() {
        assert_eq!(serde_json::to_string(&SearchLang::Dutch).unwrap(), r#""du""#);
        assert_eq!(
            serde_json::to_string(&SearchLang::English).unwrap(),
            r#""en""#
        );
    }

    #[test]
    fn search_lang_default_is_dutch() {
        assert_eq!(SearchLang::default(), SearchLang::Dutch);
    }

    #[test]
    fn search_lang_from_str() {
        assert_eq!("EN".parse::<SearchLang>().unwrap(), SearchLang::English);
        assert_eq!("du".parse::<SearchLang>().unwrap(), SearchLang::Dutch);
        assert!("fr".parse::<SearchLang>().is_err());
    }

    #[test]
    fn sort_by_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&SortBy::UnitPrice).unwrap(),
            r#""unit_price""#
        );
        assert_eq!(
            serde_json::to_string(&SortBy::CurrentPrice).unwrap(),
            r#""current_price""#
        );
    }

    #[test]
    fn supermarket_serde_roundtrip() {
        for market in Supermarket::ALL {
            let json = serde_json::to_string(&market).unwrap();
            assert_eq!(json, format!("\"{}\"", market.id()));
            let back: Supermarket = serde_json::from_str(&json).unwrap();
            assert_eq!(back, market);
        }
    }

    #[test]
    fn supermarket_from_str_is_case_insensitive() {
        assert_eq!(" Dirk ".parse::<Supermarket>().unwrap(), Supermarket::Dirk);
        let err = "jumbo".parse::<Supermarket>().unwrap_err();
        assert!(err.to_string().contains("jumbo"));
    }

    #[test]
    fn supermarket_into_merchant_id() {
        let id = MerchantId::from(Supermarket::Hoogvliet);
        assert_eq!(id.as_inner(), "hoogvliet");
    }
}
