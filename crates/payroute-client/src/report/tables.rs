use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::config::RoutingConfig;
use crate::report::sanitize::FileNamer;
use crate::routing::types::format_number;
use crate::routing::{Record, RouteSource, RoutedRecord, RoutingOutcome};

pub const SUMMARY_FILE_NAME: &str = "mapping_summary_by_accountant.csv";
pub const MANUAL_PEOPLE_FILE_NAME: &str = "mapping_people_manual.csv";
pub const EXCLUDED_FILE_NAME: &str = "excluded_businesses.csv";
pub const TOTALS_LABEL: &str = "סה\"כ";
const EXCLUSION_REASON_HEADER: &str = "סיבת אי הכללה";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Bucket,
    Summary,
    ManualPeople,
    Excluded,
}

impl ReportKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bucket => "bucket",
            Self::Summary => "summary",
            Self::ManualPeople => "manual_people",
            Self::Excluded => "excluded",
        }
    }
}

/// One CSV file, fully rendered to cells.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub file_name: String,
    pub kind: ReportKind,
    pub bucket: Option<String>,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Rows that came from input records; excludes any totals row.
    pub data_rows: usize,
}

pub fn build_reports(
    records: &[Record],
    outcome: &RoutingOutcome,
    config: &RoutingConfig,
) -> Vec<ReportTable> {
    let mut namer = FileNamer::default();
    for reserved in [SUMMARY_FILE_NAME, MANUAL_PEOPLE_FILE_NAME, EXCLUDED_FILE_NAME] {
        namer.reserve(reserved);
    }

    let mut tables = bucket_tables(records, outcome, config, &mut namer);
    tables.push(summary_table(records, outcome, config));
    tables.push(manual_people_table(outcome));
    if !outcome.excluded.is_empty() {
        tables.push(excluded_table(outcome, config));
    }
    tables
}

fn bucket_tables(
    records: &[Record],
    outcome: &RoutingOutcome,
    config: &RoutingConfig,
    namer: &mut FileNamer,
) -> Vec<ReportTable> {
    let mut by_bucket: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for routed in &outcome.routed {
        if let Some(record) = records.get(routed.index) {
            by_bucket.entry(routed.bucket.as_str()).or_default().push(record);
        }
    }

    by_bucket
        .into_iter()
        .map(|(bucket, members)| {
            let mut rows = members
                .iter()
                .map(|record| {
                    config
                        .required_columns
                        .iter()
                        .map(|column| cell(record, column))
                        .collect::<Vec<String>>()
                })
                .collect::<Vec<Vec<String>>>();
            rows.push(totals_row(&members, config));

            ReportTable {
                file_name: namer.csv_name(bucket),
                kind: ReportKind::Bucket,
                bucket: Some(bucket.to_string()),
                headers: config.required_columns.clone(),
                data_rows: members.len(),
                rows,
            }
        })
        .collect()
}

fn totals_row(members: &[&Record], config: &RoutingConfig) -> Vec<String> {
    let columns = &config.required_columns;
    let label_column = config
        .label_candidates
        .iter()
        .find(|candidate| columns.contains(*candidate))
        .or_else(|| columns.first());

    columns
        .iter()
        .map(|column| {
            if config.sum_columns.contains(column) {
                format_number(column_sum(members.iter().copied(), column))
            } else if Some(column) == label_column {
                TOTALS_LABEL.to_string()
            } else {
                String::new()
            }
        })
        .collect()
}

fn summary_table(
    records: &[Record],
    outcome: &RoutingOutcome,
    config: &RoutingConfig,
) -> ReportTable {
    let sum_columns = present_sum_columns(config);
    let mut groups: BTreeMap<(&str, RouteSource), Vec<&Record>> = BTreeMap::new();
    for routed in &outcome.routed {
        if let Some(record) = records.get(routed.index) {
            groups
                .entry((routed.bucket.as_str(), routed.source))
                .or_default()
                .push(record);
        }
    }

    let mut headers = vec![
        "accountant_final".to_string(),
        "source".to_string(),
        "rows".to_string(),
    ];
    headers.extend(sum_columns.iter().map(|column| format!("{column}_sum")));

    let rows = groups
        .into_iter()
        .map(|((bucket, source), members)| {
            let mut row = vec![
                bucket.to_string(),
                source.as_str().to_string(),
                members.len().to_string(),
            ];
            row.extend(
                sum_columns
                    .iter()
                    .map(|column| format_number(column_sum(members.iter().copied(), column))),
            );
            row
        })
        .collect::<Vec<Vec<String>>>();

    ReportTable {
        file_name: SUMMARY_FILE_NAME.to_string(),
        kind: ReportKind::Summary,
        bucket: None,
        headers,
        data_rows: rows.len(),
        rows,
    }
}

fn manual_people_table(outcome: &RoutingOutcome) -> ReportTable {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let rows = outcome
        .routed
        .iter()
        .filter(|routed| routed.source == RouteSource::Manual)
        .filter(|routed| seen.insert((routed.person_raw.as_str(), routed.bucket.as_str())))
        .map(|routed: &RoutedRecord| vec![routed.person_raw.clone(), routed.bucket.clone()])
        .collect::<Vec<Vec<String>>>();

    ReportTable {
        file_name: MANUAL_PEOPLE_FILE_NAME.to_string(),
        kind: ReportKind::ManualPeople,
        bucket: None,
        headers: vec!["person".to_string(), "target_accountant".to_string()],
        data_rows: rows.len(),
        rows,
    }
}

fn excluded_table(outcome: &RoutingOutcome, config: &RoutingConfig) -> ReportTable {
    let columns = [
        config.columns.business_name.as_str(),
        config.columns.first_name.as_str(),
        config.columns.last_name.as_str(),
        config.columns.payment_description.as_str(),
    ];
    let mut headers = columns
        .iter()
        .map(|column| column.to_string())
        .collect::<Vec<String>>();
    headers.push(EXCLUSION_REASON_HEADER.to_string());

    let rows = outcome
        .excluded
        .iter()
        .map(|excluded| {
            let mut row = columns
                .iter()
                .map(|column| cell(&excluded.record, column))
                .collect::<Vec<String>>();
            row.push(config.exclusion_reason.clone());
            row
        })
        .collect::<Vec<Vec<String>>>();

    ReportTable {
        file_name: EXCLUDED_FILE_NAME.to_string(),
        kind: ReportKind::Excluded,
        bucket: None,
        headers,
        data_rows: rows.len(),
        rows,
    }
}

fn present_sum_columns(config: &RoutingConfig) -> Vec<&String> {
    config
        .sum_columns
        .iter()
        .filter(|column| config.required_columns.contains(*column))
        .collect()
}

fn column_sum<'a>(records: impl Iterator<Item = &'a Record>, column: &str) -> f64 {
    records
        .filter_map(|record| record.get(column).and_then(|value| value.as_number()))
        .sum()
}

fn cell(record: &Record, column: &str) -> String {
    record
        .get(column)
        .map(|value| value.display_text())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::{ReportKind, TOTALS_LABEL, build_reports};
    use crate::config::RoutingConfig;
    use crate::routing::{FieldValue, Record, route_batch};

    fn config() -> RoutingConfig {
        RoutingConfig {
            required_columns: ["שם העסק", "שם", "משפחה", "סכום", "תיאור התשלום"]
                .iter()
                .map(|value| value.to_string())
                .collect(),
            ..RoutingConfig::default()
        }
    }

    fn row(business: &str, first: &str, last: &str, amount: FieldValue, description: &str) -> Record {
        Record::from_pairs([
            ("שם העסק", FieldValue::from(business)),
            ("שם", FieldValue::from(first)),
            ("משפחה", FieldValue::from(last)),
            ("סכום", amount),
            ("תיאור התשלום", FieldValue::from(description)),
        ])
    }

    fn sample() -> Vec<Record> {
        vec![
            row("עסק", "דנה", "כהן", FieldValue::Number(100.0), "ליווי - רו\"ח דורון פלק"),
            row("עסק", "שיר", "אקרמן", FieldValue::from("50.5"), "ליווי"),
            row("עסק", "שיר", "אקרמן", FieldValue::from("n/a"), "ליווי"),
            row("I.D Cyber Solutions", "רון", "לוי", FieldValue::Number(900.0), "ליווי"),
        ]
    }

    #[test]
    fn bucket_file_ends_with_totals_row() {
        let records = sample();
        let config = config();
        let outcome = route_batch(&records, &config);
        let tables = build_reports(&records, &outcome, &config);

        let bucket = tables.iter().find(|table| table.kind == ReportKind::Bucket);
        assert!(bucket.is_some());
        if let Some(table) = bucket {
            assert_eq!(table.file_name, "דורון פלק.csv");
            assert_eq!(table.data_rows, 3);
            assert_eq!(table.rows.len(), 4);
            let totals = &table.rows[3];
            // Label goes into the first label candidate present: the description.
            assert_eq!(totals[4], TOTALS_LABEL);
            assert_eq!(totals[3], "150.5");
            assert_eq!(totals[0], "");
        }
    }

    #[test]
    fn summary_groups_by_bucket_and_source() {
        let records = sample();
        let config = config();
        let outcome = route_batch(&records, &config);
        let tables = build_reports(&records, &outcome, &config);

        let summary = tables.iter().find(|table| table.kind == ReportKind::Summary);
        assert!(summary.is_some());
        if let Some(table) = summary {
            assert_eq!(table.headers, vec!["accountant_final", "source", "rows", "סכום_sum"]);
            assert_eq!(table.rows[0], vec!["דורון פלק", "auto", "1", "100"]);
            assert_eq!(table.rows[1], vec!["דורון פלק", "manual", "2", "50.5"]);
        }
    }

    #[test]
    fn manual_people_are_distinct() {
        let records = sample();
        let config = config();
        let outcome = route_batch(&records, &config);
        let tables = build_reports(&records, &outcome, &config);

        let people = tables
            .iter()
            .find(|table| table.kind == ReportKind::ManualPeople);
        assert!(people.is_some());
        if let Some(table) = people {
            assert_eq!(table.rows, vec![vec!["שיר אקרמן".to_string(), "דורון פלק".to_string()]]);
        }
    }

    #[test]
    fn excluded_report_carries_reason() {
        let records = sample();
        let config = config();
        let outcome = route_batch(&records, &config);
        let tables = build_reports(&records, &outcome, &config);

        let excluded = tables.iter().find(|table| table.kind == ReportKind::Excluded);
        assert!(excluded.is_some());
        if let Some(table) = excluded {
            assert_eq!(table.rows.len(), 1);
            assert_eq!(table.rows[0][0], "I.D Cyber Solutions");
            assert_eq!(table.rows[0][4], config.exclusion_reason);
        }
    }

    #[test]
    fn no_excluded_report_without_exclusions() {
        let records = sample().into_iter().take(2).collect::<Vec<Record>>();
        let config = config();
        let outcome = route_batch(&records, &config);
        let tables = build_reports(&records, &outcome, &config);
        assert!(tables.iter().all(|table| table.kind != ReportKind::Excluded));
    }
}
