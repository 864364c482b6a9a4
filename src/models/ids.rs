//! Merchant identifier newtype.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Supermarket;

/// Identifier of a selling merchant (supermarket chain), as stored in the
/// `supermarket` column of the price dataset.
///
/// Kept as free text: the dataset may carry merchants this crate has no
/// [`Supermarket`] variant for.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantId(String);

impl MerchantId {
    /// Creates an identifier from the raw column value.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self(value.into())
    }

    /// Returns the raw column value.
    #[inline]
    #[must_use]
    pub fn as_inner(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns the raw column value.
    #[inline]
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the matching supermarket, if this merchant is a known one.
    #[inline]
    #[must_use]
    pub fn supermarket(&self) -> Option<Supermarket> {
        self.0.parse().ok()
    }
}

impl fmt::Display for MerchantId {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for MerchantId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MerchantId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
