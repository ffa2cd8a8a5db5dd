use std::io;

use serde_json::Value;

use super::format;

pub fn render_explain(data: &Value) -> io::Result<String> {
    let bucket = data
        .get("bucket")
        .and_then(Value::as_str)
        .ok_or_else(|| io::Error::other("explain output requires bucket"))?;

    let text = |key: &str| {
        data.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };
    let flag = |key: &str| data.get(key).and_then(Value::as_bool).unwrap_or(false);

    let mut lines = vec!["Description trace:".to_string()];
    lines.extend(format::key_value_rows(
        &[
            ("Input:", text("description")),
            ("Normalized:", text("normalized")),
            ("Matching form:", text("matching_form")),
            ("Extracted name:", text("accountant_raw")),
            ("Bucket:", bucket.to_string()),
            ("Config:", text("config_source")),
        ],
        2,
    ));

    lines.push(String::new());
    if flag("unresolved") {
        lines.push("No accountant name could be recovered from this description.".to_string());
    } else if flag("consolidated") {
        lines.push(
            "The extracted name is a known variant and was folded into its canonical name."
                .to_string(),
        );
    }
    lines.push(
        "In a full batch, near-identical names are merged first, so the bucket may use a \
         longer spelling seen in other rows."
            .to_string(),
    );

    Ok(lines.join("\n"))
}
