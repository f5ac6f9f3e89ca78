use std::fs;
use std::mem;
use std::path::Path;
use std::time::Duration;
use log::{info, warn};
use reqwest::header::CONTENT_TYPE;

use crate::error::CatalogError;
use crate::models::{Column, ItemRecord, ITEM_HEADER, SLOT_HEADER, SPELL_HEADER, TYPE_HEADER};
use crate::services::catalog::Catalog;

/// Time allowed for a catalog download, headers and body included
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(25);

/// Load the reference catalog. `.json` files hold an array of flat objects;
/// anything else is read as a spreadsheet CSV export.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let bytes = fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes).replace('\0', "");

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let catalog = if is_json {
        parse_json_catalog(&text)?
    } else {
        catalog_from_csv_text(&text, &path.display().to_string())?
    };

    info!("Loaded {} catalog rows from {}", catalog.len(), path.display());
    Ok(catalog)
}

/// Download a CSV export (e.g. a published spreadsheet) and build the catalog
/// from it. Error statuses and HTML pages such as sign-in redirects are
/// rejected.
pub async fn fetch_catalog(url: &str, timeout: Duration) -> Result<Catalog, CatalogError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?.error_for_status()?;
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_lowercase();
    let body = response.bytes().await?;

    let catalog = catalog_from_download(&content_type, &body, url)?;
    info!("Downloaded {} catalog rows from {}", catalog.len(), url);
    Ok(catalog)
}

fn catalog_from_download(
    content_type: &str,
    body: &[u8],
    source: &str,
) -> Result<Catalog, CatalogError> {
    if content_type.contains("text/html") {
        return Err(CatalogError::UnexpectedHtml(source.to_string()));
    }
    let text = String::from_utf8_lossy(body).replace('\0', "");
    catalog_from_csv_text(&text, source)
}

fn catalog_from_csv_text(text: &str, source: &str) -> Result<Catalog, CatalogError> {
    if looks_like_html(text) {
        return Err(CatalogError::UnexpectedHtml(source.to_string()));
    }
    let rows = parse_csv(text)?;
    if rows.is_empty() {
        return Err(CatalogError::Empty(source.to_string()));
    }
    Ok(catalog_from_rows(rows))
}

fn looks_like_html(text: &str) -> bool {
    let head: String = text.trim_start().chars().take(15).collect::<String>().to_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Split CSV text into rows of fields. Quoted fields may hold commas,
/// newlines and doubled quotes.
pub fn parse_csv(text: &str) -> Result<Vec<Vec<String>>, CatalogError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut quote_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quote_line = line;
            }
            ',' => row.push(mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                line += 1;
                row.push(mem::take(&mut field));
                rows.push(mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(CatalogError::UnterminatedQuote(quote_line));
    }
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

/// Build a catalog from CSV rows, the first of which holds the headers.
/// Short rows are padded, long rows truncated, blank rows skipped.
pub fn catalog_from_rows(rows: Vec<Vec<String>>) -> Catalog {
    let mut rows = rows.into_iter();
    let raw_headers = match rows.next() {
        Some(headers) => headers,
        None => return Catalog::default(),
    };

    if !raw_headers.iter().any(|h| Column::of(h) == Column::Item) {
        warn!("Catalog has no item/name column; lookups will find nothing");
    }

    let records = rows
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|mut row| {
            row.resize(raw_headers.len(), String::new());
            ItemRecord::from_fields(raw_headers.iter().zip(row))
        })
        .collect();

    Catalog::new(display_headers(&raw_headers), records)
}

fn display_headers(raw_headers: &[String]) -> Vec<String> {
    let mut seen = Vec::new();
    raw_headers
        .iter()
        .map(|header| {
            let column = Column::of(header);
            if column == Column::Other || seen.contains(&column) {
                header.trim().to_string()
            } else {
                seen.push(column);
                Column::display_header(header)
            }
        })
        .collect()
}

/// Build a catalog from a JSON array of flat objects
pub fn parse_json_catalog(text: &str) -> Result<Catalog, CatalogError> {
    let records: Vec<ItemRecord> = serde_json::from_str(text)?;

    let mut headers: Vec<String> = [ITEM_HEADER, SLOT_HEADER, SPELL_HEADER, TYPE_HEADER]
        .iter()
        .map(|h| h.to_string())
        .collect();
    for record in &records {
        for (header, _) in &record.extra {
            if !headers.contains(header) {
                headers.push(header.clone());
            }
        }
    }

    Ok(Catalog::new(headers, records))
}
