use std::io::Cursor;

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::ingest::invalid_input_error;
use crate::ingest::parse::{InputFormat, ParsedTable};
use crate::routing::FieldValue;
use crate::{ClientError, ClientResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Reads the first worksheet. Its first row is the header row.
pub(crate) fn parse_workbook(bytes: &[u8]) -> ClientResult<ParsedTable> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|error| unreadable(&error))?;
    let Some(first_sheet) = workbook.sheet_names().first().cloned() else {
        return Err(invalid_input_error("The workbook has no worksheets."));
    };
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|error| unreadable(&error))?;

    let mut sheet_rows = range.rows();
    let Some(header_row) = sheet_rows.next() else {
        return Err(invalid_input_error(&format!(
            "Worksheet `{first_sheet}` is empty. Put the header row on the first line."
        )));
    };
    let headers = header_row
        .iter()
        .map(header_text)
        .collect::<Vec<String>>();

    let rows = sheet_rows
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(index, name)| {
                    let value = cells.get(index).map(cell_field).unwrap_or(FieldValue::Empty);
                    (name.clone(), value)
                })
                .collect::<Vec<(String, FieldValue)>>()
        })
        .collect();

    Ok(ParsedTable {
        format: InputFormat::Xlsx,
        headers,
        rows,
    })
}

fn unreadable(error: &dyn std::fmt::Display) -> ClientError {
    ClientError::invalid_input_format(
        &format!("Could not read the xlsx workbook: {error}"),
        "xlsx",
    )
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_field(cell: &Data) -> FieldValue {
    match cell {
        Data::Empty | Data::Error(_) => FieldValue::Empty,
        Data::String(text) if text.trim().is_empty() => FieldValue::Empty,
        Data::String(text) => FieldValue::Text(text.clone()),
        Data::Float(value) => FieldValue::Number(*value),
        Data::Int(value) => FieldValue::Number(*value as f64),
        Data::DateTime(_) => match cell.as_f64().and_then(serial_date_text) {
            Some(text) => FieldValue::Text(text),
            None => FieldValue::Text(cell.to_string()),
        },
        other => FieldValue::Text(other.to_string()),
    }
}

/// Renders an Excel serial date (1900 system) as `YYYY-MM-DD`, with the time
/// appended only when it is not midnight.
fn serial_date_text(serial: f64) -> Option<String> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * SECONDS_PER_DAY).round() as i64;
    let moment = epoch.checked_add_signed(TimeDelta::try_seconds(seconds)?)?;
    if moment.time() == NaiveTime::MIN {
        return Some(moment.format("%Y-%m-%d").to_string());
    }
    Some(moment.format("%Y-%m-%d %H:%M:%S").to_string())
}
