//! Declarative read requests against the price dataset.
//!
//! [`PriceQuery`] turns a free-text search term plus fixed filters into a
//! [`ReadRequest`]: a field projection, a conjunctive list of [`Filter`]s
//! and a row cap. The request renders itself to `PostgREST` query
//! parameters for the HTTP source and can also be evaluated locally
//! against a [`PriceRecord`].

use core::fmt;
use core::str::FromStr;

use crate::error::PriceCompareError;
use crate::models::{MerchantId, PriceRecord};

/// Row cap for general browsing.
pub const BROWSE_LIMIT: u32 = 50;

/// Row cap for promotion listings.
pub const PROMOTIONS_LIMIT: u32 = 100;

/// Column holding the merchant identifier.
const MERCHANT_COLUMN: &str = "supermarket";

/// Column searched by free-text terms.
const NAME_COLUMN: &str = "product_name_du";

/// Which result list a query feeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Listing {
    /// All products of a merchant.
    #[default]
    Browse,
    /// Products currently on promotion.
    Promotions,
}

impl Listing {
    /// Returns the table or view the listing reads from.
    #[inline]
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Browse => "food_prices",
            Self::Promotions => "v_promotions",
        }
    }

    /// Returns the maximum number of rows fetched for this listing.
    #[inline]
    #[must_use]
    pub const fn limit(self) -> u32 {
        match self {
            Self::Browse => BROWSE_LIMIT,
            Self::Promotions => PROMOTIONS_LIMIT,
        }
    }

    /// Returns the message shown when the listing has no rows.
    #[inline]
    #[must_use]
    pub const fn empty_message(self) -> &'static str {
        match self {
            Self::Browse => "No products found.",
            Self::Promotions => "No promotions found.",
        }
    }
}

impl fmt::Display for Listing {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::Browse => "browse",
            Self::Promotions => "promotions",
        })
    }
}

impl FromStr for Listing {
    type Err = PriceCompareError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browse" => Ok(Self::Browse),
            "promotions" => Ok(Self::Promotions),
            _ => Err(PriceCompareError::UnknownValue {
                kind: "listing",
                value: s.to_owned(),
            }),
        }
    }
}

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Column equals the operand exactly.
    Eq,
    /// Column matches the operand as a case-insensitive LIKE pattern
    /// (`%` and `_` wildcards).
    ILike,
}

impl Operator {
    /// Returns the `PostgREST` operator keyword.
    #[inline]
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::ILike => "ilike",
        }
    }
}

/// A single row predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Dataset column.
    pub column: &'static str,
    /// Comparison operator.
    pub operator: Operator,
    /// Value or pattern compared against.
    pub operand: String,
}

impl Filter {
    /// Creates an exact-match filter.
    #[inline]
    #[must_use]
    pub fn equals<T: Into<String>>(column: &'static str, value: T) -> Self {
        Self {
            column,
            operator: Operator::Eq,
            operand: value.into(),
        }
    }

    /// Creates a case-insensitive LIKE filter.
    #[inline]
    #[must_use]
    pub fn ilike<T: Into<String>>(column: &'static str, pattern: T) -> Self {
        Self {
            column,
            operator: Operator::ILike,
            operand: pattern.into(),
        }
    }

    /// Renders the filter as a `PostgREST` `operator.value` expression.
    #[inline]
    #[must_use]
    pub fn expression(&self) -> String {
        format!("{}.{}", self.operator.keyword(), self.operand)
    }

    /// Returns `true` if the record satisfies this filter.
    ///
    /// A missing column value never matches.
    #[inline]
    #[must_use]
    pub fn matches(&self, record: &PriceRecord) -> bool {
        let Some(actual) = record.text_column(self.column) else {
            return false;
        };
        match self.operator {
            Operator::Eq => actual == self.operand,
            Operator::ILike => like_matches(&self.operand, actual),
        }
    }
}

/// A declarative read against one table of the price dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    /// Table or view name.
    pub table: &'static str,
    /// Projected columns.
    pub projection: &'static [&'static str],
    /// Conjunctive filters.
    pub filters: Vec<Filter>,
    /// Maximum number of rows.
    pub limit: u32,
}

impl ReadRequest {
    /// Renders the request as `PostgREST` query parameters.
    #[inline]
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.filters.len() + 2);
        pairs.push(("select".to_owned(), self.projection.join(",")));
        pairs.extend(
            self.filters
                .iter()
                .map(|filter| (filter.column.to_owned(), filter.expression())),
        );
        pairs.push(("limit".to_owned(), self.limit.to_string()));
        pairs
    }

    /// Returns `true` if the record satisfies every filter.
    #[inline]
    #[must_use]
    pub fn matches(&self, record: &PriceRecord) -> bool {
        self.filters.iter().all(|filter| filter.matches(record))
    }

    /// Returns the name pattern filter, if the request carries one.
    #[inline]
    #[must_use]
    pub fn name_pattern(&self) -> Option<&str> {
        self.filters
            .iter()
            .find(|filter| filter.operator == Operator::ILike && filter.column == NAME_COLUMN)
            .map(|filter| filter.operand.as_str())
    }
}

/// Builder for price dataset reads.
///
/// # Examples
///
/// ```
/// use price_compare::models::Supermarket;
/// use price_compare::query::{Listing, PriceQuery};
///
/// let request = PriceQuery::new(Listing::Browse, Supermarket::Dirk)
///     .search("  melk ")
///     .build();
/// assert_eq!(request.limit, 50);
/// assert_eq!(request.name_pattern(), Some("%melk%"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    /// Target listing.
    listing: Listing,
    /// Merchant equality filter.
    merchant: MerchantId,
    /// Trimmed, non-empty search term.
    search: Option<String>,
}

impl PriceQuery {
    /// Starts a query for one merchant within a listing.
    #[inline]
    #[must_use]
    pub fn new<M: Into<MerchantId>>(listing: Listing, merchant: M) -> Self {
        Self {
            listing,
            merchant: merchant.into(),
            search: None,
        }
    }

    /// Restricts to products whose name contains `term`
    /// (case-insensitive). A term that is empty after trimming clears the
    /// restriction.
    #[inline]
    #[must_use]
    pub fn search(mut self, term: &str) -> Self {
        let trimmed = term.trim();
        self.search = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Builds the read request.
    #[inline]
    #[must_use]
    pub fn build(&self) -> ReadRequest {
        let mut filters = vec![Filter::equals(MERCHANT_COLUMN, self.merchant.as_inner())];
        if let Some(term) = self.search.as_deref() {
            filters.push(Filter::ilike(NAME_COLUMN, format!("%{term}%")));
        }
        ReadRequest {
            table: self.listing.table(),
            projection: &PriceRecord::COLUMNS,
            filters,
            limit: self.listing.limit(),
        }
    }
}

/// Case-insensitive SQL `LIKE` matching: `%` matches any run of
/// characters, `_` matches exactly one.
fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().flat_map(char::to_lowercase).collect();
    let text_chars: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();

    let (mut p, mut t) = (0_usize, 0_usize);
    // Position after the last `%` seen, and the text position it resumed at.
    let mut backtrack: Option<(usize, usize)> = None;

    while let Some(current) = text_chars.get(t).copied() {
        let wanted = pattern_chars.get(p).copied();
        if wanted == Some('%') {
            p += 1;
            backtrack = Some((p, t));
        } else if wanted.is_some_and(|ch| ch == '_' || ch == current) {
            p += 1;
            t += 1;
        } else if let Some((resume_p, resume_t)) = backtrack {
            p = resume_p;
            t = resume_t + 1;
            backtrack = Some((resume_p, t));
        } else {
            return false;
        }
    }
    pattern_chars.get(p..).is_some_and(|rest| rest.iter().all(|&ch| ch == '%'))
}
