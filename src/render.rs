//! Table rendering for price record lists.
//!
//! Rendering is a pure function of the record list, the loading flag and
//! the listing's empty message: the same input always yields the same
//! [`PriceTable`].

use crate::models::PriceRecord;

/// Placeholder shown for a missing price.
pub const MISSING_PRICE: &str = "-";

/// Number of columns in every price table.
pub const COLUMN_COUNT: usize = 6;

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    /// Left-aligned text.
    Left,
    /// Right-aligned (numeric) text.
    Right,
}

/// A table column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Header title.
    pub title: &'static str,
    /// Cell alignment.
    pub align: Align,
}

/// The fixed price table columns, in display order.
pub const COLUMNS: [Column; COLUMN_COUNT] = [
    Column {
        title: "Product (DU)",
        align: Align::Left,
    },
    Column {
        title: "Unit (raw)",
        align: Align::Left,
    },
    Column {
        title: "Current price",
        align: Align::Right,
    },
    Column {
        title: "Regular price",
        align: Align::Right,
    },
    Column {
        title: "Valid from",
        align: Align::Left,
    },
    Column {
        title: "Valid to",
        align: Align::Left,
    },
];

/// Stable identity of a rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// Keyed by the record's source URL.
    SourceUrl(String),
    /// Keyed by the product name (no URL available).
    ProductName(String),
    /// Keyed by position in the list (neither URL nor name available).
    Index(usize),
}

/// One rendered data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// Row identity.
    pub key: RowKey,
    /// Cell texts, one per column.
    pub cells: [String; COLUMN_COUNT],
}

/// A single full-width row carrying a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Message text.
    pub message: String,
    /// Number of columns spanned.
    pub span: usize,
}

/// A fully rendered price table.
///
/// Either `rows` holds the data rows (possibly none while loading) or
/// `placeholder` is set and `rows` is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTable {
    /// Column headers.
    pub columns: [Column; COLUMN_COUNT],
    /// Data rows.
    pub rows: Vec<Row>,
    /// Message row shown instead of data.
    pub placeholder: Option<Placeholder>,
}

impl PriceTable {
    /// Returns the number of body rows, counting a placeholder as one.
    #[inline]
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.placeholder.as_ref().map_or(self.rows.len(), |_| 1)
    }
}

/// Formats a price as euros with two fraction digits, or
/// [`MISSING_PRICE`] when absent.
///
/// ```
/// use price_compare::render::format_price;
///
/// assert_eq!(format_price(Some(1.0)), "€1.00");
/// assert_eq!(format_price(None), "-");
/// ```
#[inline]
#[must_use]
pub fn format_price(price: Option<f64>) -> String {
    price.map_or_else(|| MISSING_PRICE.to_owned(), |value| format!("€{value:.2}"))
}

/// Picks the row key: source URL, then product name, then row index.
/// Empty strings count as absent.
#[inline]
#[must_use]
pub fn row_key(record: &PriceRecord, index: usize) -> RowKey {
    let present = |value: Option<&String>| value.filter(|text| !text.is_empty()).cloned();
    present(record.source_url.as_ref())
        .map(RowKey::SourceUrl)
        .or_else(|| present(record.product_name.as_ref()).map(RowKey::ProductName))
        .unwrap_or(RowKey::Index(index))
}

/// Renders one record into a row.
#[inline]
#[must_use]
pub fn render_row(record: &PriceRecord, index: usize) -> Row {
    let text = |value: Option<&String>| value.cloned().unwrap_or_default();
    Row {
        key: row_key(record, index),
        cells: [
            text(record.product_name.as_ref()),
            text(record.unit_label.as_ref()),
            format_price(record.current_price),
            format_price(record.regular_price),
            text(record.valid_from.as_ref()),
            text(record.valid_to.as_ref()),
        ],
    }
}

/// Renders a record list into a table.
///
/// An empty list that is not loading renders as a single placeholder row
/// spanning all columns; while loading it renders no rows at all.
#[inline]
#[must_use]
pub fn render_table(records: &[PriceRecord], loading: bool, empty_message: &str) -> PriceTable {
    let placeholder = (records.is_empty() && !loading).then(|| Placeholder {
        message: empty_message.to_owned(),
        span: COLUMN_COUNT,
    });
    PriceTable {
        columns: COLUMNS,
        rows: records
            .iter()
            .enumerate()
            .map(|(index, record)| render_row(record, index))
            .collect(),
        placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: Option<&str>, name: Option<&str>, price: Option<f64>) -> PriceRecord {
        PriceRecord {
            source_url: url.map(str::to_owned),
            product_name: name.map(str::to_owned),
            current_price: price,
            ..PriceRecord::default()
        }
    }

    #[test]
    fn format_price_two_decimals() {
        assert_eq!(format_price(Some(1.0)), "€1.00");
        assert_eq!(format_price(Some(0.5)), "€0.50");
        assert_eq!(format_price(Some(12.345)), "€12.35");
        assert_eq!(format_price(None), "-");
    }

    #[test]
    fn columns_are_in_fixed_order() {
        let titles: Vec<&str> = COLUMNS.iter().map(|col| col.title).collect();
        assert_eq!(
            titles,
            [
                "Product (DU)",
                "Unit (raw)",
                "Current price",
                "Regular price",
                "Valid from",
                "Valid to"
            ]
        );
        assert_eq!(COLUMNS[2].align, Align::Right);
        assert_eq!(COLUMNS[3].align, Align::Right);
    }

    #[test]
    fn missing_text_fields_render_empty() {
        let row = render_row(&PriceRecord::default(), 3);
        assert_eq!(row.cells, ["", "", "-", "-", "", ""].map(str::to_owned));
        assert_eq!(row.key, RowKey::Index(3));
    }

    #[test]
    fn full_record_renders_all_cells() {
        let rec = PriceRecord {
            source_url: Some("https://example.test/p/1".to_owned()),
            product_name: Some("Volle melk".to_owned()),
            unit_label: Some("1 liter".to_owned()),
            current_price: Some(1.0),
            regular_price: Some(1.39),
            valid_from: Some("2024-05-01".to_owned()),
            valid_to: Some("2024-05-07".to_owned()),
            merchant: None,
        };
        let row = render_row(&rec, 0);
        assert_eq!(
            row.cells,
            [
                "Volle melk",
                "1 liter",
                "€1.00",
                "€1.39",
                "2024-05-01",
                "2024-05-07"
            ]
            .map(str::to_owned)
        );
    }

    #[test]
    fn row_key_fallbacks() {
        assert_eq!(
            row_key(&record(Some("u"), Some("n"), None), 0),
            RowKey::SourceUrl("u".to_owned())
        );
        assert_eq!(
            row_key(&record(Some(""), Some("n"), None), 0),
            RowKey::ProductName("n".to_owned())
        );
        assert_eq!(row_key(&record(None, None, None), 7), RowKey::Index(7));
    }

    #[test]
    fn empty_not_loading_renders_single_placeholder() {
        let table = render_table(&[], false, "No products found.");
        assert_eq!(table.row_count(), 1);
        assert!(table.rows.is_empty());
        assert_eq!(
            table.placeholder,
            Some(Placeholder {
                message: "No products found.".to_owned(),
                span: COLUMN_COUNT,
            })
        );
    }

    #[test]
    fn empty_while_loading_renders_no_rows() {
        let table = render_table(&[], true, "No products found.");
        assert!(table.rows.is_empty());
        assert_eq!(table.placeholder, None);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn rendering_is_idempotent() {
        let records = vec![
            record(Some("a"), Some("Melk"), Some(1.0)),
            record(None, None, None),
            record(None, Some("Kaas"), Some(5.25)),
        ];
        let first = render_table(&records, false, "none");
        let second = render_table(&records, false, "none");
        assert_eq!(first, second);
        assert_eq!(first.row_count(), 3);
        assert_eq!(first.placeholder, None);
    }
}
