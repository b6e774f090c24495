use chrono::{Local, NaiveDate};
use http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const ZIP_MIME: &str = "application/zip";
pub const JSON_MIME: &str = "application/json";

/// Hex color without surrounding blanks or the leading `#`.
pub fn bare_hex(value: &str) -> &str {
    let value = value.trim();
    value.strip_prefix('#').unwrap_or(value)
}

/// Local calendar date used for the delivery status.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Headers for a file download.
///
/// Supplier names are free text, so the name is sent twice: an ASCII fallback
/// and the RFC 5987 `filename*` form.
pub fn attachment_headers(file_name: &str, mime: &'static str) -> HeaderMap {
    let fallback = file_name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect::<String>();
    let disposition = format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    );
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(mime));
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        headers.insert(CONTENT_DISPOSITION, value);
    }
    headers
}
