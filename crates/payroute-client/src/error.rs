use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

pub(crate) const ROUTE_HELP_COMMAND: &str = "payroute route --help";
pub(crate) const ROUTE_HELP_SECTION_TITLE: &str = "Routing Input";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_route_help(self) -> Self {
        self.with_route_help_data(json!({}))
    }

    pub fn with_route_help_data(self, data: Value) -> Self {
        self.with_data(merge_route_help_data(data))
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `payroute {cmd} --help` for usage."),
            None => "Run `payroute --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_input_format(message: &str, received_format: &str) -> Self {
        Self::new(
            "invalid_input_format",
            message,
            vec![
                "Pass the payments workbook (.xlsx), a UTF-8 CSV export or a JSON array of row objects."
                    .to_string(),
                "Run `payroute route --help` to confirm the accepted formats.".to_string(),
            ],
        )
        .with_route_help_data(json!({
            "received_format": received_format,
            "supported_formats": ["xlsx", "csv", "json_array"],
        }))
    }

    pub fn routing_schema_mismatch(
        required_columns: Vec<String>,
        missing_columns: Vec<String>,
        actual_columns: Vec<String>,
    ) -> Self {
        Self::new(
            "routing_schema_mismatch",
            &format!("Missing required columns: {}", missing_columns.join(", ")),
            vec![
                "Include every required column header exactly as configured.".to_string(),
                "Extra columns are allowed and are dropped from the reports.".to_string(),
                "Run `payroute config show` to list the required columns.".to_string(),
            ],
        )
        .with_route_help_data(json!({
            "required_columns": required_columns,
            "missing_columns": missing_columns,
            "actual_columns": actual_columns,
        }))
    }

    pub fn config_unreadable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "config_unreadable",
            &format!("Could not load routing config `{location}`: {detail}"),
            vec![
                format!("Verify `{location}` exists and contains a JSON object."),
                "Unset `PAYROUTE_CONFIG` to fall back to the built-in tables.".to_string(),
            ],
        )
    }

    pub fn config_invalid(problems: Vec<String>) -> Self {
        Self::new(
            "config_invalid",
            &format!(
                "Routing config failed validation with {} problem(s).",
                problems.len()
            ),
            vec![
                "Fix the listed problems in the routing config file.".to_string(),
                "Run `payroute config show --json` to see a valid baseline.".to_string(),
            ],
        )
        .with_data(json!({
            "problems": problems,
        }))
    }

    pub fn output_unavailable(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "output_unavailable",
            &format!("Cannot resolve report output at `{location}`: {detail}"),
            vec!["Pass `--out <dir>` or set `PAYROUTE_HOME` to a writable directory.".to_string()],
        )
    }

    pub fn output_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "output_permission_denied",
            &format!("Cannot write reports to `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or pass `--out` with a writable directory."
            )],
        )
    }

    pub fn report_write_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "report_write_failed",
            &format!("Writing report `{location}` failed: {detail}"),
            vec!["Check free disk space and rerun `payroute route <path>`.".to_string()],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }
}

fn merge_route_help_data(mut data: Value) -> Value {
    if !data.is_object() {
        data = json!({});
    }

    if let Some(object) = data.as_object_mut() {
        object.insert(
            "help_command".to_string(),
            Value::String(ROUTE_HELP_COMMAND.to_string()),
        );
        object.insert(
            "help_section_title".to_string(),
            Value::String(ROUTE_HELP_SECTION_TITLE.to_string()),
        );
    }

    data
}

pub type ClientResult<T> = Result<T, ClientError>;
