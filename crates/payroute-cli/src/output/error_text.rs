use payroute_client::ClientError;
use serde_json::Value;

pub fn render_error(error: &ClientError) -> String {
    let mut lines = vec![
        "payroute could not finish this command.".to_string(),
        String::new(),
        format!("  Error:    {}", error.code),
        format!("  Details:  {}", error.message),
    ];

    let listed = listed_details(error);
    if !listed.is_empty() {
        lines.push(String::new());
        lines.extend(listed);
    }

    lines.push(String::new());
    lines.push("What to do next:".to_string());
    if error.recovery_steps.is_empty() {
        lines.push("  1. Retry the command.".to_string());
    } else {
        for (index, step) in error.recovery_steps.iter().enumerate() {
            lines.push(format!("  {}. {step}", index + 1));
        }
    }

    lines.join("\n")
}

// Missing columns and config problems are easier to fix one per line.
fn listed_details(error: &ClientError) -> Vec<String> {
    let Some(data) = &error.data else {
        return Vec::new();
    };
    let (title, key) = match error.code.as_str() {
        "routing_schema_mismatch" => ("Missing columns:", "missing_columns"),
        "config_invalid" => ("Problems:", "problems"),
        _ => return Vec::new(),
    };

    let items = data
        .get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(|value| format!("  - {value}"))
                .collect::<Vec<String>>()
        })
        .unwrap_or_default();
    if items.is_empty() {
        return items;
    }

    let mut lines = vec![title.to_string()];
    lines.extend(items);
    lines
}

#[cfg(test)]
mod tests {
    use payroute_client::ClientError;

    use super::render_error;

    #[test]
    fn renders_standard_error_layout() {
        let error = ClientError::invalid_argument_with_recovery(
            "bad input",
            vec!["run payroute --help".to_string()],
        );

        let rendered = render_error(&error);
        assert!(rendered.starts_with("payroute could not finish this command."));
        assert!(rendered.contains("  Error:    invalid_argument"));
        assert!(rendered.contains("  Details:  bad input"));
        assert!(rendered.contains("What to do next:"));
        assert!(rendered.contains("  1. run payroute --help"));
    }

    #[test]
    fn lists_missing_columns() {
        let error = ClientError::routing_schema_mismatch(
            vec!["שם".to_string(), "משפחה".to_string()],
            vec!["משפחה".to_string()],
            vec!["שם".to_string()],
        );

        let rendered = render_error(&error);
        assert!(rendered.contains("Missing columns:\n  - משפחה"));
    }
}
