use std::fmt::{Display, Formatter};

use chrono::{NaiveDateTime, Timelike};

/// A single cell of the uploaded sheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
    /// Numeric view of the cell; text is accepted when it reads as a number
    /// (a decimal comma is tolerated).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            _ => None,
        }
    }
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}
impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}
impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Text(s) => write!(f, "{s}"),
            Self::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Self::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            Self::Date(d) => {
                if d.num_seconds_from_midnight() == 0 {
                    write!(f, "{}", d.format("%d/%m/%Y"))
                } else {
                    write!(f, "{}", d.format("%d/%m/%Y %H:%M:%S"))
                }
            }
        }
    }
}

/// Ordered columns with unique names and rows stored column-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Rows shorter than the header are padded with empty cells, longer ones truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self { columns, rows }
    }
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    pub fn width(&self) -> usize {
        self.columns.len()
    }
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
    /// Sets every cell of `name` to `value`, appending the column when it is new.
    pub fn fill_column(&mut self, name: &str, value: CellValue) {
        match self.column_index(name) {
            Some(index) => {
                for row in self.rows.iter_mut() {
                    row[index] = value.clone();
                }
            }
            None => {
                self.columns.push(name.to_string());
                for row in self.rows.iter_mut() {
                    row.push(value.clone());
                }
            }
        }
    }
    pub fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(&CellValue) -> CellValue,
    {
        for row in self.rows.iter_mut() {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
    }
    pub(crate) fn set_columns(&mut self, columns: Vec<String>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
    }
    /// Drops the named columns; names that are not present are ignored.
    pub fn drop_columns(&mut self, names: &[String]) -> usize {
        let keep = self
            .columns
            .iter()
            .map(|c| !names.contains(c))
            .collect::<Vec<_>>();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped == 0 {
            return 0;
        }
        self.columns = retain_by_mask(std::mem::take(&mut self.columns), &keep);
        self.rows = std::mem::take(&mut self.rows)
            .into_iter()
            .map(|row| retain_by_mask(row, &keep))
            .collect();
        dropped
    }
    /// New dataset with the same columns and the rows at `indices`, in that order.
    pub fn select_rows(&self, indices: &[usize]) -> Dataset {
        let rows = indices
            .iter()
            .filter_map(|i| self.rows.get(*i).cloned())
            .collect();
        Dataset {
            columns: self.columns.clone(),
            rows,
        }
    }
}

fn retain_by_mask<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep.iter())
        .filter_map(|(item, k)| k.then_some(item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec![
                vec!["1".into(), "2".into(), "3".into()],
                vec!["4".into()],
            ],
        )
    }

    #[test]
    fn short_rows_are_padded() {
        let ds = dataset();
        assert_eq!(ds.rows()[1], vec!["4".into(), CellValue::Empty, CellValue::Empty]);
    }

    #[test]
    fn drop_columns_ignores_unknown_names() {
        let mut ds = dataset();
        let dropped = ds.drop_columns(&["b".to_string(), "zzz".to_string()]);
        assert_eq!(dropped, 1);
        assert_eq!(ds.columns(), ["a".to_string(), "c".to_string()]);
        assert_eq!(ds.rows()[0], vec![CellValue::from("1"), CellValue::from("3")]);
    }

    #[test]
    fn fill_column_overwrites_existing_values() {
        let mut ds = dataset();
        ds.fill_column("a", CellValue::Empty);
        ds.fill_column("d", CellValue::Empty);
        assert_eq!(ds.width(), 4);
        assert!(ds.column(0).all(CellValue::is_empty));
    }

    #[test]
    fn display_is_spreadsheet_friendly() {
        assert_eq!(CellValue::Number(4500123.0).to_string(), "4500123");
        assert_eq!(CellValue::Number(2.5).to_string(), "2.5");
        let date = NaiveDate::from_ymd_opt(2026, 3, 7)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "07/03/2026");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn numbers_accept_decimal_comma() {
        assert_eq!(CellValue::from("12,5").as_number(), Some(12.5));
        assert_eq!(CellValue::from("abc").as_number(), None);
    }
}
