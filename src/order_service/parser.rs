use std::collections::HashSet;
use std::io::Cursor;

use bytes::Bytes;
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use tracing::info;

use crate::models::{CellValue, Dataset};
use crate::{AppError, Result};

/// Reads the first worksheet of an uploaded workbook; the first row holds the headers.
pub fn read_first_sheet(file: Bytes) -> Result<Dataset> {
    let cursor = Cursor::new(file);
    let mut workbook = open_workbook_auto_from_rs(cursor)?;
    let table = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Spreadsheet("a planilha não tem abas".to_string()))??;
    let dataset = parse(&table);
    info!(
        "Planilha lida: {} linhas, {} colunas",
        dataset.len(),
        dataset.width()
    );
    Ok(dataset)
}

fn parse(table: &Range<Data>) -> Dataset {
    let mut rows = table.rows();
    let Some(header) = rows.next() else {
        return Dataset::default();
    };
    let columns = header_names(header);
    let body = rows
        .map(|row| row.iter().map(convert).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|c| !c.is_empty()))
        .collect();
    Dataset::new(columns, body)
}

/// Blank headers become `Unnamed: <i>`; repeated ones get `.1`, `.2`, ...
fn header_names(header: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let raw = match convert(cell) {
                CellValue::Empty => format!("Unnamed: {i}"),
                other => other.to_string().trim().to_string(),
            };
            let mut name = raw.clone();
            let mut suffix = 1;
            while !seen.insert(name.clone()) {
                name = format!("{raw}.{suffix}");
                suffix += 1;
            }
            name
        })
        .collect()
}

fn convert(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .map(CellValue::Date)
            .unwrap_or(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
