use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::FeedError;
use crate::snapshot::ListingRow;

static TABLE: Lazy<Selector> = Lazy::new(|| Selector::parse("table").expect("static selector"));
static HEADER_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead th").expect("static selector"));
static BODY_ROW: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tbody tr").expect("static selector"));
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td").expect("static selector"));

struct Columns {
    symbol: usize,
    price: usize,
    change: usize,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self, FeedError> {
        let symbol = find_column(headers, &["symbol"])
            .ok_or_else(|| FeedError::Listing("listing header has no symbol column".into()))?;
        let price = find_column(headers, &["last price", "price"])
            .ok_or_else(|| FeedError::Listing("listing header has no price column".into()))?;
        let change = find_column(headers, &["change %", "% change", "change"])
            .ok_or_else(|| FeedError::Listing("listing header has no change column".into()))?;
        Ok(Self {
            symbol,
            price,
            change,
        })
    }
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
}

/// Extracts the ordered listing rows from a category page.
///
/// The first table of the document is the listing. Rows whose symbol or
/// numeric cells are unusable are skipped without disturbing the order of
/// the rest; a document without a usable table is an error.
pub fn parse_listing(html: &str) -> Result<Vec<ListingRow>, FeedError> {
    let document = Html::parse_document(html);
    let table = document
        .select(&TABLE)
        .next()
        .ok_or_else(|| FeedError::Listing("no table in listing page".into()))?;

    let headers: Vec<String> = table.select(&HEADER_CELL).map(cell_text).collect();
    if headers.is_empty() {
        return Err(FeedError::Listing("listing table has no header row".into()));
    }
    let columns = Columns::locate(&headers)?;

    let mut rows = Vec::new();
    for tr in table.select(&BODY_ROW) {
        let cells: Vec<String> = tr.select(&CELL).map(cell_text).collect();
        match row_from_cells(&cells, &columns) {
            Some(row) => rows.push(row),
            None => {
                tracing::warn!(cells = cells.len(), "skipping unusable listing row");
            }
        }
    }
    Ok(rows)
}

fn row_from_cells(cells: &[String], columns: &Columns) -> Option<ListingRow> {
    // Symbol cells carry the ticker plus decoration (name, sparkline alt
    // text); the ticker is always the first token.
    let symbol = cells
        .get(columns.symbol)?
        .split_whitespace()
        .next()?
        .to_string();
    let last_price = parse_numeric(cells.get(columns.price)?)?;
    let change_percent = parse_numeric(cells.get(columns.change)?)?;
    Some(ListingRow {
        symbol,
        last_price,
        change_percent,
    })
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a listing cell as a float, tolerating thousands separators, an
/// explicit plus sign and a percent suffix.
fn parse_numeric(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .chars()
        .filter(|c| !matches!(c, ',' | '+' | '%'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse::<f64>().ok()
}
