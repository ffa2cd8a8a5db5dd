use std::io;

use serde_json::Value;

use super::format::{self, Column};

pub fn render_config_show(data: &Value) -> io::Result<String> {
    let config = data
        .get("config")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("config show output requires config"))?;

    let source = match data.get("path").and_then(Value::as_str) {
        Some(path) => format!("file {path}"),
        None => "built-in tables".to_string(),
    };
    let columns = config.get("columns").unwrap_or(&Value::Null);

    let mut lines = vec!["Routing config:".to_string()];
    lines.extend(format::key_value_rows(
        &[
            ("Source:", source),
            ("Fuzzy threshold:", scalar(config.get("fuzzy_threshold"))),
            ("Description column:", field(columns, "payment_description")),
            ("Business column:", field(columns, "business_name")),
            ("First name column:", field(columns, "first_name")),
            ("Last name column:", field(columns, "last_name")),
        ],
        2,
    ));

    lines.push(String::new());
    lines.push("Required columns:".to_string());
    lines.push(format!("  {}", strings(config.get("required_columns")).join(", ")));
    lines.push("Summed columns:".to_string());
    lines.push(format!("  {}", strings(config.get("sum_columns")).join(", ")));

    let overrides = config
        .get("overrides")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    lines.push(String::new());
    lines.push(format!("Manual overrides ({}):", overrides.len()));
    let rows = overrides
        .iter()
        .map(|entry| {
            vec![
                field(entry, "person_pattern"),
                field(entry, "core_target"),
            ]
        })
        .collect::<Vec<Vec<String>>>();
    lines.extend(format::render_table_or_blocks(
        &[Column::left("Person"), Column::left("Accountant")],
        &rows,
        format::terminal_width(),
        "Override",
    ));

    lines.push(String::new());
    lines.push("Excluded businesses:".to_string());
    for business in strings(config.get("excluded_businesses")) {
        lines.push(format!("  {business}"));
    }

    lines.push(String::new());
    lines.push("Consolidation:".to_string());
    for set in config
        .get("alias_sets")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
    {
        lines.push(format!("  {}", field(set, "canonical")));
        for variant in strings(set.get("variants")) {
            lines.push(format!("    = {variant}"));
        }
    }
    for rule in config
        .get("fragment_rules")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
    {
        let all_of = strings(rule.get("all_of"));
        let any_of = strings(rule.get("any_of"));
        let mut condition = all_of.join(" and ");
        if !any_of.is_empty() {
            if !condition.is_empty() {
                condition.push_str(" and ");
            }
            condition.push_str(&format!("({})", any_of.join(" or ")));
        }
        lines.push(format!("  {}", field(rule, "canonical")));
        lines.push(format!("    contains {condition}"));
    }

    Ok(lines.join("\n"))
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(std::string::ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

fn scalar(value: Option<&Value>) -> String {
    value.map(Value::to_string).unwrap_or_default()
}
