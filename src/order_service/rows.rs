use chrono::{Days, NaiveDate, NaiveDateTime};
use tracing::debug;

use super::columns::{ColumnMapping, LogicalColumn};
use crate::models::{CellValue, Dataset};

pub const STATUS_COLUMN: &str = "Status";
pub const NEW_DATE_COLUMN: &str = "Nova Data";
pub const LATE: &str = "Atrasado";
pub const ON_TIME: &str = "Dentro do prazo";
pub const DATE_FORMAT: &str = "%d/%m/%Y";

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Largest serial number Excel accepts (31/12/9999).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;
const LEAP_BUG_SERIAL: u64 = 60;

/// Adds the empty `Status` and `Nova Data` columns.
pub fn add_derived_columns(dataset: &mut Dataset) {
    dataset.fill_column(STATUS_COLUMN, CellValue::Empty);
    dataset.fill_column(NEW_DATE_COLUMN, CellValue::Empty);
}

/// Best-effort date reading; anything that is not recognisably a date is `None`.
pub fn parse_date(cell: &CellValue) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(d.date()),
        CellValue::Number(n) => from_excel_serial(*n),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    if text.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
        .map(|d| d.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
        })
}

fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    // Excel counts a 29/02/1900 that never existed: serial 60 is that day and
    // everything before it is one day behind the 1899-12-30 epoch.
    let days = match serial.trunc() as u64 {
        LEAP_BUG_SERIAL => return None,
        d if d < LEAP_BUG_SERIAL => d + 1,
        d => d,
    };
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days))
}

/// Rewrites the issue and delivery date columns as `DD/MM/YYYY` text.
///
/// Cells that cannot be read as dates become empty.
pub fn format_date_columns(dataset: &mut Dataset, mapping: &ColumnMapping) {
    for column in [LogicalColumn::IssueDate, LogicalColumn::DeliveryDate] {
        let Some(index) = mapping.resolve(dataset, column) else {
            debug!("Coluna '{}' ausente, datas não formatadas", mapping.current_name(column));
            continue;
        };
        dataset.map_column(index, |cell| match parse_date(cell) {
            Some(date) => CellValue::Text(date.format(DATE_FORMAT).to_string()),
            None => CellValue::Empty,
        });
    }
}

/// Status of a delivery cell already formatted by [`format_date_columns`].
pub fn status_for(delivery: &CellValue, today: NaiveDate) -> Option<&'static str> {
    let text = delivery.as_text()?;
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;
    Some(if date < today { LATE } else { ON_TIME })
}

/// Fills `Status` from the delivery date. Without a delivery column every
/// status stays empty, and so does the status of a row whose date is unreadable.
pub fn derive_status(dataset: &mut Dataset, mapping: &ColumnMapping, today: NaiveDate) {
    let Some(delivery) = mapping.resolve(dataset, LogicalColumn::DeliveryDate) else {
        return;
    };
    let Some(status) = dataset.column_index(STATUS_COLUMN) else {
        return;
    };
    let statuses = dataset
        .column(delivery)
        .map(|cell| status_for(cell, today))
        .collect::<Vec<_>>();
    let mut statuses = statuses.into_iter();
    dataset.map_column(status, |current| match statuses.next().flatten() {
        Some(s) => CellValue::Text(s.to_string()),
        None => current.clone(),
    });
}

/// Drops the user-selected columns; unknown names are ignored.
pub fn remove_columns(dataset: &mut Dataset, names: &[String]) {
    let dropped = dataset.drop_columns(names);
    debug!("Removidas {dropped} colunas");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn dataset(deliveries: Vec<CellValue>) -> Dataset {
        let rows = deliveries
            .into_iter()
            .map(|d| vec![CellValue::from("Acme"), d])
            .collect();
        let mut ds = Dataset::new(
            vec!["Fornecedor/centro fornecedor".into(), "Data de remessa".into()],
            rows,
        );
        add_derived_columns(&mut ds);
        ds
    }

    #[test]
    fn tolerant_parser_reads_common_shapes() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 7);
        assert_eq!(parse_date(&"2026-03-07".into()), expected);
        assert_eq!(parse_date(&"07/03/2026".into()), expected);
        assert_eq!(parse_date(&"2026-03-07 14:30:00".into()), expected);
        assert_eq!(parse_date(&"2026-03-07T14:30:00".into()), expected);
        assert_eq!(parse_date(&"07.03.2026".into()), expected);
        assert_eq!(parse_date(&CellValue::Number(46088.0)), expected);
        let native = expected.and_then(|d| d.and_hms_opt(8, 0, 0)).unwrap();
        assert_eq!(parse_date(&CellValue::Date(native)), expected);
    }

    #[test]
    fn iso_timestamps_without_seconds_are_dates() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 7);
        assert_eq!(parse_date(&"2026-03-07 14:30".into()), expected);
        assert_eq!(parse_date(&"2026-03-07T14:30".into()), expected);
    }

    #[test]
    fn early_1900_serials_skip_the_phantom_leap_day() {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d);
        assert_eq!(parse_date(&CellValue::Number(1.0)), date(1900, 1, 1));
        assert_eq!(parse_date(&CellValue::Number(59.0)), date(1900, 2, 28));
        assert_eq!(parse_date(&CellValue::Number(60.0)), None);
        assert_eq!(parse_date(&CellValue::Number(61.0)), date(1900, 3, 1));
    }

    #[test]
    fn garbage_is_not_a_date() {
        assert_eq!(parse_date(&"amanhã".into()), None);
        assert_eq!(parse_date(&"31/02/2026".into()), None);
        assert_eq!(parse_date(&CellValue::Number(-3.0)), None);
        assert_eq!(parse_date(&CellValue::Empty), None);
        assert_eq!(parse_date(&CellValue::Bool(true)), None);
    }

    #[test]
    fn status_compares_with_today() {
        let mapping = ColumnMapping::default();
        let mut ds = dataset(vec![
            "2026-10-18".into(),
            "2026-10-19".into(),
            "2026-10-26".into(),
            "sem data".into(),
            CellValue::Empty,
        ]);
        format_date_columns(&mut ds, &mapping);
        derive_status(&mut ds, &mapping, today());
        let status = ds.column_index(STATUS_COLUMN).unwrap();
        let statuses = ds.column(status).map(|c| c.to_string()).collect::<Vec<_>>();
        assert_eq!(statuses, [LATE, ON_TIME, ON_TIME, "", ""]);
        let dates = ds.column(1).map(|c| c.to_string()).collect::<Vec<_>>();
        assert_eq!(dates, ["18/10/2026", "19/10/2026", "26/10/2026", "", ""]);
    }

    #[test]
    fn status_stays_empty_without_delivery_column() {
        let mapping = ColumnMapping::default();
        let mut ds = dataset(vec!["2020-01-01".into()]);
        ds.drop_columns(&["Data de remessa".to_string()]);
        derive_status(&mut ds, &mapping, today());
        let status = ds.column_index(STATUS_COLUMN).unwrap();
        assert!(ds.column(status).all(CellValue::is_empty));
    }

    #[test]
    fn renamed_delivery_column_is_still_found() -> crate::Result<()> {
        let mut ds = dataset(vec!["2020-01-01".into()]);
        let renames = HashMap::from([("Data de remessa".to_string(), "Entrega".to_string())]);
        let mapping = ColumnMapping::new(&renames);
        mapping.apply(&mut ds)?;
        format_date_columns(&mut ds, &mapping);
        derive_status(&mut ds, &mapping, today());
        let status = ds.column_index(STATUS_COLUMN).unwrap();
        assert_eq!(ds.rows()[0][status], CellValue::from(LATE));
        Ok(())
    }

    #[test]
    fn derived_columns_are_appended_empty() {
        let ds = dataset(vec!["2026-01-01".into()]);
        assert_eq!(ds.columns()[2..], [STATUS_COLUMN, NEW_DATE_COLUMN]);
        assert!(ds.rows()[0][2..].iter().all(CellValue::is_empty));
    }

    #[test]
    fn removal_ignores_unknown_columns() {
        let mut ds = dataset(vec!["2026-01-01".into()]);
        remove_columns(&mut ds, &["Nova Data".to_string(), "Inexistente".to_string()]);
        assert_eq!(ds.width(), 3);
    }
}
