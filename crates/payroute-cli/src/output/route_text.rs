use std::io;

use chrono::{DateTime, Local};
use serde_json::{Map, Value};

use super::format::{self, Column};

pub fn render_route_run(data: &Value) -> io::Result<String> {
    let dry_run = data
        .get("dry_run")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let summary = data
        .get("summary")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("route output requires summary"))?;

    let mut lines = Vec::new();
    if dry_run {
        lines.push("Dry run completed. No files were written.".to_string());
    } else {
        lines.push("Routing completed.".to_string());
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    let mut entries = Vec::new();
    if let Some(run_id) = data.get("run_id").and_then(Value::as_str) {
        entries.push(("Run ID:", run_id.to_string()));
    }
    entries.push(("Generated:", local_time(data)));
    entries.push(("Config:", value_text(data, "config_source")));
    entries.push(("Input:", input_label(data)));
    entries.push(("Rows read:", count(summary, "rows_read")));
    entries.push(("Rows skipped:", count(summary, "rows_skipped")));
    entries.push(("Rows excluded:", count(summary, "rows_excluded")));
    entries.push(("Rows routed:", count(summary, "rows_routed")));
    entries.push(("  auto:", count(summary, "auto_rows")));
    entries.push(("  manual:", count(summary, "manual_rows")));
    entries.push(("Unresolved:", count(summary, "unresolved_rows")));
    lines.extend(format::key_value_rows(&entries, 2));

    lines.push(String::new());
    lines.extend(render_buckets(data));

    let manual = render_manual_people(data);
    if !manual.is_empty() {
        lines.push(String::new());
        lines.extend(manual);
    }

    let excluded = render_excluded(data);
    if !excluded.is_empty() {
        lines.push(String::new());
        lines.extend(excluded);
    }

    lines.push(String::new());
    if dry_run {
        lines.push("What to do next:".to_string());
        lines.push(
            "  1. Check a row in an unexpected bucket with `payroute explain \"<description>\"`."
                .to_string(),
        );
        lines.push(
            "  2. Run the same command without --dry-run to write the reports.".to_string(),
        );
    } else {
        lines.extend(render_files(data));
    }

    Ok(lines.join("\n"))
}

fn render_buckets(data: &Value) -> Vec<String> {
    let buckets = array(data, "buckets");
    if buckets.is_empty() {
        return vec!["No rows were routed.".to_string()];
    }

    let columns = [
        Column::left("Accountant"),
        Column::right("Rows"),
        Column::right("Auto"),
        Column::right("Manual"),
    ];
    let rows = buckets
        .iter()
        .map(|bucket| {
            vec![
                value_text(bucket, "bucket"),
                value_text(bucket, "rows"),
                value_text(bucket, "auto_rows"),
                value_text(bucket, "manual_rows"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![format!("Buckets ({}):", rows.len())];
    lines.extend(format::render_table_or_blocks(
        &columns,
        &rows,
        format::terminal_width(),
        "Bucket",
    ));
    lines
}

fn render_manual_people(data: &Value) -> Vec<String> {
    let people = array(data, "manual_people");
    if people.is_empty() {
        return Vec::new();
    }

    let columns = [Column::left("Person"), Column::left("Accountant")];
    let rows = people
        .iter()
        .map(|entry| {
            vec![
                value_text(entry, "person"),
                value_text(entry, "target_accountant"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec!["Manual mappings:".to_string()];
    lines.extend(format::render_table_or_blocks(
        &columns,
        &rows,
        format::terminal_width(),
        "Mapping",
    ));
    lines
}

fn render_excluded(data: &Value) -> Vec<String> {
    let excluded = array(data, "excluded");
    if excluded.is_empty() {
        return Vec::new();
    }

    let columns = [
        Column::right("Row"),
        Column::left("Business"),
        Column::left("Person"),
        Column::left("Description"),
    ];
    let rows = excluded
        .iter()
        .map(|entry| {
            vec![
                value_text(entry, "row"),
                value_text(entry, "business"),
                value_text(entry, "person"),
                value_text(entry, "description"),
            ]
        })
        .collect::<Vec<Vec<String>>>();

    let mut lines = vec![format!("Excluded rows ({}):", rows.len())];
    lines.extend(format::render_table_or_blocks(
        &columns,
        &rows,
        format::terminal_width(),
        "Excluded",
    ));
    lines
}

fn render_files(data: &Value) -> Vec<String> {
    let files = array(data, "files");
    let mut lines = vec![format!(
        "Files written to {}:",
        value_text(data, "output_dir")
    )];
    for file in files {
        lines.push(format!(
            "  {}  ({} rows)",
            value_text(file, "file_name"),
            value_text(file, "rows")
        ));
    }
    lines
}

fn input_label(data: &Value) -> String {
    let input = data.get("input").unwrap_or(&Value::Null);
    let format = value_text(input, "format");
    match input.get("path").and_then(Value::as_str) {
        Some(path) => format!("{path} ({format})"),
        None => format!("stdin ({format})"),
    }
}

fn local_time(data: &Value) -> String {
    let raw = value_text(data, "generated_at");
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => parsed
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw,
    }
}

fn array<'a>(data: &'a Value, key: &str) -> &'a [Value] {
    data.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn count(summary: &Map<String, Value>, key: &str) -> String {
    summary
        .get(key)
        .and_then(Value::as_u64)
        .unwrap_or(0)
        .to_string()
}

fn value_text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
