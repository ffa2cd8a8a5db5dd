pub(crate) mod input;
pub(crate) mod parse;
pub(crate) mod validate;
pub(crate) mod workbook;

use log::info;

use crate::config::RoutingConfig;
use crate::routing::Record;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub(crate) struct IngestedBatch {
    pub(crate) source_kind: &'static str,
    pub(crate) source_ref: Option<String>,
    pub(crate) format: &'static str,
    pub(crate) records: Vec<Record>,
    pub(crate) row_numbers: Vec<usize>,
    pub(crate) rows_read: usize,
    pub(crate) rows_skipped: usize,
}

pub(crate) fn ingest(
    path: Option<String>,
    stdin_override: Option<String>,
    config: &RoutingConfig,
) -> ClientResult<IngestedBatch> {
    let resolved = input::resolve_source(path, stdin_override)?;
    let table = parse::parse_body(&resolved.body)?;
    let format = table.format.as_str();
    let rows_read = table.rows.len();
    let validated = validate::validate_rows(table, config)?;
    info!(
        "read {rows_read} {format} rows from {}; skipped {} without a payment description",
        resolved.source_kind.as_str(),
        validated.rows_skipped
    );

    Ok(IngestedBatch {
        source_kind: resolved.source_kind.as_str(),
        source_ref: resolved.source_ref,
        format,
        records: validated.records,
        row_numbers: validated.row_numbers,
        rows_read,
        rows_skipped: validated.rows_skipped,
    })
}

pub(crate) fn invalid_input_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide an xlsx workbook, a CSV export or a JSON array of rows via path or stdin.".to_string(),
            "Run `payroute route --help` to confirm the required columns.".to_string(),
        ],
    )
    .with_route_help()
}
