use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Read one cell of the first sheet as text.
pub fn read_cell_string(path: &Path, row: u32, column: u32) -> AppResult<String> {
    let sheet = first_sheet(path)?;
    Ok(sheet
        .get_value((row, column))
        .map(cell_string)
        .unwrap_or_default())
}

/// Read the activity log block: one description/duration pair per row,
/// starting at the given row and stopping at the first empty description.
pub fn read_log_rows(
    path: &Path,
    first_row: u32,
    description_column: u32,
    duration_column: u32,
) -> AppResult<Vec<(String, f64)>> {
    let sheet = first_sheet(path)?;
    let mut rows = Vec::new();
    for row in first_row.. {
        let description = match sheet.get_value((row, description_column)) {
            Some(cell) => cell_string(cell),
            None => break,
        };
        if description.is_empty() {
            break;
        }
        let duration = sheet
            .get_value((row, duration_column))
            .map(cell_number)
            .transpose()?
            .unwrap_or(0.0);
        rows.push((description, duration));
    }
    debug!(file = %path.display(), rows = rows.len(), "read log rows");
    Ok(rows)
}

fn first_sheet(path: &Path) -> AppResult<Range<Data>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|err| AppError::Spreadsheet(format!("cannot open {}: {err}", path.display())))?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::Spreadsheet(format!("{} has no sheets", path.display())))?
        .map_err(|err| {
            AppError::Spreadsheet(format!("cannot read first sheet of {}: {err}", path.display()))
        })
}

fn cell_string(cell: &Data) -> String {
    match cell {
        Data::String(text) => text.trim().to_string(),
        Data::Float(value) => {
            if value.fract() == 0.0 {
                format!("{}", *value as i64)
            } else {
                value.to_string()
            }
        }
        Data::Int(value) => value.to_string(),
        Data::Bool(value) => value.to_string(),
        _ => String::new(),
    }
}

fn cell_number(cell: &Data) -> AppResult<f64> {
    match cell {
        Data::Float(value) => Ok(*value),
        Data::Int(value) => Ok(*value as f64),
        Data::String(text) => text
            .trim()
            .replace(',', ".")
            .parse()
            .map_err(|_| AppError::Spreadsheet(format!("'{text}' is not a duration"))),
        Data::Empty => Ok(0.0),
        other => Err(AppError::Spreadsheet(format!("'{other}' is not a duration"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_come_back_trimmed() {
        assert_eq!(cell_string(&Data::String(" TICKET-1 review ".into())), "TICKET-1 review");
        assert_eq!(cell_string(&Data::Float(8.0)), "8");
        assert_eq!(cell_string(&Data::Empty), "");
    }

    #[test]
    fn durations_accept_numbers_and_comma_decimals() {
        assert_eq!(cell_number(&Data::Float(1.5)).unwrap(), 1.5);
        assert_eq!(cell_number(&Data::String("2,5".into())).unwrap(), 2.5);
        assert_eq!(cell_number(&Data::Empty).unwrap(), 0.0);
        assert!(cell_number(&Data::String("soon".into())).is_err());
    }
}
