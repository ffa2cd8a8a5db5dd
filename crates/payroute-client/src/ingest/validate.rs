use crate::config::RoutingConfig;
use crate::ingest::parse::ParsedTable;
use crate::routing::{FieldValue, Record};
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub(crate) struct ValidatedRows {
    pub(crate) records: Vec<Record>,
    /// 1-based input row number of each kept record.
    pub(crate) row_numbers: Vec<usize>,
    pub(crate) rows_skipped: usize,
}

pub(crate) fn validate_rows(
    table: ParsedTable,
    config: &RoutingConfig,
) -> ClientResult<ValidatedRows> {
    let missing = config
        .required_columns
        .iter()
        .filter(|required| !table.headers.iter().any(|header| header == *required))
        .cloned()
        .collect::<Vec<String>>();

    // An empty JSON array has no headers to check.
    if !missing.is_empty() && !(table.rows.is_empty() && table.headers.is_empty()) {
        return Err(ClientError::routing_schema_mismatch(
            config.required_columns.clone(),
            missing,
            table.headers,
        ));
    }

    let description_column = config.columns.payment_description.as_str();
    let mut records = Vec::with_capacity(table.rows.len());
    let mut row_numbers = Vec::with_capacity(table.rows.len());
    let mut rows_skipped = 0;
    for (position, row) in table.rows.into_iter().enumerate() {
        let record = project(row, &config.required_columns);
        let blank = record
            .get(description_column)
            .map(FieldValue::is_blank)
            .unwrap_or(true);
        if blank {
            rows_skipped += 1;
            continue;
        }
        records.push(record);
        row_numbers.push(position + 1);
    }

    Ok(ValidatedRows {
        records,
        row_numbers,
        rows_skipped,
    })
}

fn project(mut row: Vec<(String, FieldValue)>, columns: &[String]) -> Record {
    let fields = columns
        .iter()
        .map(|column| {
            let value = row
                .iter_mut()
                .find(|(name, _)| name == column)
                .map(|(_, value)| std::mem::replace(value, FieldValue::Empty))
                .unwrap_or(FieldValue::Empty);
            (column.clone(), value)
        })
        .collect();
    Record::new(fields)
}
