use std::path::Path;

use log::info;

use crate::ClientResult;
use crate::config::{ColumnNames, load_config};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{
    ExcludedRow, ManualMapping, ReportFile, RouteData, RouteInput, RouteSummary,
};
use crate::ingest::{self, IngestedBatch};
use crate::report::{
    ReportKind, ReportRun, ReportTable, build_reports, generated_now, write_reports,
};
use crate::routing::{RouteSource, Router, RoutingOutcome, UNRESOLVED};
use crate::state::resolve_output_root;

#[derive(Debug, Default)]
pub struct RouteRunOptions<'a> {
    pub path: Option<String>,
    pub dry_run: bool,
    pub output_dir: Option<&'a Path>,
    pub config_override: Option<&'a Path>,
    pub home_override: Option<&'a Path>,
    pub stdin_override: Option<String>,
}

pub fn run(
    path: Option<String>,
    dry_run: bool,
    output_dir: Option<&Path>,
    config_override: Option<&Path>,
) -> ClientResult<SuccessEnvelope> {
    run_with_options(RouteRunOptions {
        path,
        dry_run,
        output_dir,
        config_override,
        home_override: None,
        stdin_override: None,
    })
}

#[doc(hidden)]
pub fn run_with_options(options: RouteRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let (config, config_source) = load_config(options.config_override, options.home_override)?;
    let batch = ingest::ingest(options.path, options.stdin_override, &config)?;
    let outcome = Router::new(&config).route(&batch.records);
    let tables = build_reports(&batch.records, &outcome, &config);
    let summary = build_summary(&batch, &outcome);

    let (run, written) = if options.dry_run {
        (None, Vec::new())
    } else {
        let output_root = resolve_output_root(options.output_dir, options.home_override)?;
        let run = ReportRun::new(&output_root);
        let written = write_reports(&run, &tables)?;
        (Some(run), written)
    };

    let message = match &run {
        Some(run) => format!(
            "Routed {} rows into {} buckets; wrote {} files to {}.",
            summary.rows_routed,
            summary.buckets,
            written.len(),
            run.directory.display()
        ),
        None => format!(
            "Dry run: routed {} rows into {} buckets. No files were written.",
            summary.rows_routed, summary.buckets
        ),
    };
    info!("{message}");

    let files = tables
        .iter()
        .enumerate()
        .map(|(position, table)| {
            let path = written.get(position).map(|path| path.display().to_string());
            report_file(table, path)
        })
        .collect();

    let data = RouteData {
        dry_run: options.dry_run,
        message,
        run_id: run.as_ref().map(|run| run.run_id.clone()),
        output_dir: run.as_ref().map(|run| run.directory.display().to_string()),
        generated_at: run
            .as_ref()
            .map(|run| run.generated_at.clone())
            .unwrap_or_else(generated_now),
        config_source: config_source.describe(),
        input: RouteInput {
            source: batch.source_kind.to_string(),
            path: batch.source_ref.clone(),
            format: batch.format.to_string(),
        },
        buckets: outcome.bucket_counts(),
        manual_people: manual_people(&tables),
        excluded: excluded_rows(&batch, &outcome, &config.columns),
        files,
        summary,
    };
    success("route", data)
}

fn build_summary(batch: &IngestedBatch, outcome: &RoutingOutcome) -> RouteSummary {
    let manual_rows = outcome
        .routed
        .iter()
        .filter(|routed| routed.source == RouteSource::Manual)
        .count();
    RouteSummary {
        rows_read: batch.rows_read,
        rows_skipped: batch.rows_skipped,
        rows_excluded: outcome.excluded.len(),
        rows_routed: outcome.routed.len(),
        auto_rows: outcome.routed.len() - manual_rows,
        manual_rows,
        unresolved_rows: outcome
            .routed
            .iter()
            .filter(|routed| routed.bucket == UNRESOLVED)
            .count(),
        buckets: outcome.bucket_counts().len(),
    }
}

fn manual_people(tables: &[ReportTable]) -> Vec<ManualMapping> {
    tables
        .iter()
        .filter(|table| table.kind == ReportKind::ManualPeople)
        .flat_map(|table| table.rows.iter())
        .filter_map(|row| match row.as_slice() {
            [person, target] => Some(ManualMapping {
                person: person.clone(),
                target_accountant: target.clone(),
            }),
            _ => None,
        })
        .collect()
}

fn excluded_rows(
    batch: &IngestedBatch,
    outcome: &RoutingOutcome,
    columns: &ColumnNames,
) -> Vec<ExcludedRow> {
    outcome
        .excluded
        .iter()
        .map(|excluded| {
            let record = &excluded.record;
            let person = format!(
                "{} {}",
                record.text(&columns.first_name),
                record.text(&columns.last_name)
            );
            ExcludedRow {
                row: batch
                    .row_numbers
                    .get(excluded.index)
                    .copied()
                    .unwrap_or(excluded.index + 1),
                business: record.text(&columns.business_name),
                person: person.trim().to_string(),
                description: record.text(&columns.payment_description),
            }
        })
        .collect()
}

fn report_file(table: &ReportTable, path: Option<String>) -> ReportFile {
    ReportFile {
        file_name: table.file_name.clone(),
        kind: table.kind,
        bucket: table.bucket.clone(),
        rows: table.data_rows,
        path,
    }
}
