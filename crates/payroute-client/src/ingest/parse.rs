use serde_json::{Map, Value};

use crate::ingest::input::SourceBody;
use crate::ingest::{invalid_input_error, workbook};
use crate::routing::FieldValue;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum InputFormat {
    Csv,
    JsonArray,
    Xlsx,
}

impl InputFormat {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::JsonArray => "json_array",
            Self::Xlsx => "xlsx",
        }
    }
}

/// Rows as read, before any column projection.
#[derive(Debug, Clone)]
pub(crate) struct ParsedTable {
    pub(crate) format: InputFormat,
    pub(crate) headers: Vec<String>,
    pub(crate) rows: Vec<Vec<(String, FieldValue)>>,
}

pub(crate) fn parse_body(body: &SourceBody) -> ClientResult<ParsedTable> {
    match body {
        SourceBody::Text(content) => parse_source(content),
        SourceBody::Workbook(bytes) => workbook::parse_workbook(bytes),
    }
}

pub(crate) fn parse_source(content: &str) -> ClientResult<ParsedTable> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Payments source is empty."));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if looks_like_csv(trimmed) {
        return parse_csv(trimmed);
    }

    if serde_json::from_str::<Value>(trimmed).is_ok() {
        return Err(ClientError::invalid_input_format(
            "JSON input must be a top-level array of row objects.",
            "json_non_array",
        ));
    }

    Err(ClientError::invalid_input_format(
        "Unsupported payments format. Provide an xlsx workbook, CSV with a header row or a JSON array.",
        "unknown",
    ))
}

fn parse_json_array(content: &str) -> ClientResult<ParsedTable> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| invalid_input_error("Invalid JSON input. Provide a valid JSON array."))?;

    let Some(items) = parsed.as_array() else {
        return Err(invalid_input_error(
            "JSON input must be a top-level array of row objects.",
        ));
    };

    let mut headers: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let Some(object) = item.as_object() else {
            return Err(invalid_input_error(
                "JSON array entries must all be objects keyed by column name.",
            ));
        };

        for key in object.keys() {
            let key = key.trim();
            if !headers.iter().any(|existing| existing == key) {
                headers.push(key.to_string());
            }
        }
        rows.push(json_row(object));
    }

    Ok(ParsedTable {
        format: InputFormat::JsonArray,
        headers,
        rows,
    })
}

fn json_row(object: &Map<String, Value>) -> Vec<(String, FieldValue)> {
    object
        .iter()
        .map(|(key, value)| (key.trim().to_string(), json_field(value)))
        .collect()
}

fn json_field(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Empty,
        Value::String(text) if text.trim().is_empty() => FieldValue::Empty,
        Value::String(text) => FieldValue::Text(text.clone()),
        Value::Number(number) => number
            .as_f64()
            .map(FieldValue::Number)
            .unwrap_or_else(|| FieldValue::Text(number.to_string())),
        other => FieldValue::Text(other.to_string()),
    }
}

fn parse_csv(content: &str) -> ClientResult<ParsedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    let mut rows = Vec::new();
    for result_row in reader.records() {
        let record =
            result_row.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;

        let row = headers
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), csv_field(record.get(index))))
            .collect::<Vec<(String, FieldValue)>>();
        rows.push(row);
    }

    Ok(ParsedTable {
        format: InputFormat::Csv,
        headers,
        rows,
    })
}

fn csv_field(value: Option<&str>) -> FieldValue {
    match value {
        Some(text) if !text.trim().is_empty() => FieldValue::Text(text.to_string()),
        _ => FieldValue::Empty,
    }
}

fn looks_like_csv(content: &str) -> bool {
    let Some(first_line) = content.lines().find(|line| !line.trim().is_empty()) else {
        return false;
    };
    first_line.contains(',')
}
