use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use crate::models::{CellValue, Dataset, HorizontalAlign, StyleConfig, VerticalAlign};
use crate::utils::bare_hex;
use crate::{AppError, Result};

pub const SHEET_NAME: &str = "Planilha";
pub const TITLE_PREFIX: &str = "Pedidos Pendentes - Fornecedor: ";
pub const TITLE_ROW_HEIGHT: f64 = 30.0;
pub const TITLE_FONT_SIZE: f64 = 16.0;
pub const WIDTH_PADDING: usize = 10;
/// Excel refuses wider columns.
const MAX_COLUMN_WIDTH: usize = 255;

const TITLE_ROW: u32 = 0;
const HEADER_ROW: u32 = 1;
const FIRST_BODY_ROW: usize = 2;

/// Renders one supplier's rows as a styled xlsx document.
///
/// Layout: a merged title row, the header row, then one row per data row.
pub fn render(supplier: &str, rows: &Dataset, style: &StyleConfig) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    write_title(worksheet, supplier, rows.width())?;

    let header_format = header_format(style);
    for (col, name) in rows.columns().iter().enumerate() {
        worksheet.write_string_with_format(HEADER_ROW, cast_col_num(col)?, name, &header_format)?;
    }
    worksheet.set_row_height(HEADER_ROW, style.header_row_height)?;

    let body_format = body_format(style);
    for (i, row) in rows.rows().iter().enumerate() {
        let row_num = cast_row_num(FIRST_BODY_ROW + i)?;
        for (col, cell) in row.iter().enumerate() {
            write_cell(worksheet, row_num, cast_col_num(col)?, cell, &body_format)?;
        }
        worksheet.set_row_height(row_num, style.body_row_height)?;
    }

    for (col, width) in column_widths(rows).into_iter().enumerate() {
        worksheet.set_column_width(cast_col_num(col)?, width.min(MAX_COLUMN_WIDTH) as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}

pub fn title(supplier: &str) -> String {
    format!("{TITLE_PREFIX}{supplier}")
}

/// Longest non-empty value or header text per column, plus padding.
pub fn column_widths(rows: &Dataset) -> Vec<usize> {
    rows.columns()
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let longest_value = rows
                .column(index)
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string().chars().count())
                .max()
                .unwrap_or_default();
            longest_value.max(name.chars().count()) + WIDTH_PADDING
        })
        .collect()
}

fn write_title(worksheet: &mut Worksheet, supplier: &str, width: usize) -> Result<()> {
    let format = Format::new()
        .set_bold()
        .set_font_size(TITLE_FONT_SIZE)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let text = title(supplier);
    // a one-cell range cannot be merged
    if width > 1 {
        worksheet.merge_range(TITLE_ROW, 0, TITLE_ROW, cast_col_num(width - 1)?, &text, &format)?;
    } else {
        worksheet.write_string_with_format(TITLE_ROW, 0, &text, &format)?;
    }
    worksheet.set_row_height(TITLE_ROW, TITLE_ROW_HEIGHT)?;
    Ok(())
}

fn header_format(style: &StyleConfig) -> Format {
    let defaults = StyleConfig::default();
    Format::new()
        .set_bold()
        .set_background_color(color(&style.header_fill, &defaults.header_fill))
        .set_font_color(color(&style.header_font_color, &defaults.header_font_color))
        .set_font_size(style.header_font_size)
        .set_align(horizontal(style.header_horizontal))
        .set_align(vertical(style.header_vertical))
}

fn body_format(style: &StyleConfig) -> Format {
    let defaults = StyleConfig::default();
    Format::new()
        .set_background_color(color(&style.body_fill, &defaults.body_fill))
        .set_font_color(color(&style.body_font_color, &defaults.body_font_color))
        .set_font_size(style.body_font_size)
        .set_align(horizontal(style.body_horizontal))
        .set_align(vertical(style.body_vertical))
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    format: &Format,
) -> Result<()> {
    match cell {
        CellValue::Empty => {
            worksheet.write_blank(row, col, format)?;
        }
        CellValue::Text(s) => {
            worksheet.write_string_with_format(row, col, s, format)?;
        }
        CellValue::Number(n) => {
            worksheet.write_number_with_format(row, col, *n, format)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean_with_format(row, col, *b, format)?;
        }
        CellValue::Date(_) => {
            worksheet.write_string_with_format(row, col, cell.to_string(), format)?;
        }
    }
    Ok(())
}

/// Bare-hex color; an unreadable value falls back to the default for that slot.
fn color(value: &str, fallback: &str) -> Color {
    parse_rgb(value)
        .or_else(|| parse_rgb(fallback))
        .map(Color::RGB)
        .unwrap_or(Color::Black)
}

fn parse_rgb(value: &str) -> Option<u32> {
    let hex = bare_hex(value);
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

fn horizontal(align: HorizontalAlign) -> FormatAlign {
    match align {
        HorizontalAlign::Left => FormatAlign::Left,
        HorizontalAlign::Center => FormatAlign::Center,
        HorizontalAlign::Right => FormatAlign::Right,
    }
}

fn vertical(align: VerticalAlign) -> FormatAlign {
    match align.normalized() {
        VerticalAlign::Top => FormatAlign::Top,
        VerticalAlign::Bottom => FormatAlign::Bottom,
        VerticalAlign::Middle | VerticalAlign::Center => FormatAlign::VerticalCenter,
    }
}

fn cast_row_num(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| AppError::Xlsx(format!("row index overflow: {value}")))
}

fn cast_col_num(value: usize) -> Result<u16> {
    u16::try_from(value).map_err(|_| AppError::Xlsx(format!("column index overflow: {value}")))
}
