use std::fs;
use std::io::{IsTerminal, Read};
use std::path::Path;

use crate::ingest::invalid_input_error;
use crate::{ClientError, ClientResult};

const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum SourceKind {
    File,
    Stdin,
}

impl SourceKind {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Stdin => "stdin",
        }
    }
}

/// Raw payload: delimited or JSON text, or the bytes of an xlsx workbook.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) enum SourceBody {
    Text(String),
    Workbook(Vec<u8>),
}

impl SourceBody {
    fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Workbook(bytes) => bytes.is_empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ResolvedSource {
    pub(crate) source_kind: SourceKind,
    pub(crate) source_ref: Option<String>,
    pub(crate) body: SourceBody,
}

pub(crate) fn resolve_source(
    path: Option<String>,
    stdin_override: Option<String>,
) -> ClientResult<ResolvedSource> {
    let stdin_body = read_stdin(stdin_override)?.filter(|body| !body.is_blank());

    if let Some(path_value) = path {
        if path_value == "-" {
            if let Some(body) = stdin_body {
                return Ok(stdin_source(body));
            }

            return Err(invalid_input_error(
                "Path `-` means stdin input, but stdin was empty. Pipe CSV/JSON/xlsx rows or pass a file path.",
            ));
        }

        let file_bytes = fs::read(&path_value).map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read payments file `{path_value}`: {error}"),
                vec![
                    "Verify the path exists and is readable.".to_string(),
                    "Rerun payroute route <path>.".to_string(),
                ],
            )
        })?;
        let body = if has_xlsx_extension(&path_value) || is_zip(&file_bytes) {
            SourceBody::Workbook(file_bytes)
        } else {
            SourceBody::Text(decode_utf8(file_bytes, &path_value)?)
        };

        if stdin_body.is_some() {
            return Err(invalid_input_error(
                "Both stdin and file input were provided. Pass exactly one source: either a file path or piped stdin.",
            ));
        }

        return Ok(ResolvedSource {
            source_kind: SourceKind::File,
            source_ref: Some(path_value),
            body,
        });
    }

    if let Some(body) = stdin_body {
        return Ok(stdin_source(body));
    }

    Err(invalid_input_error(
        "No payments source provided. Pass a file path or pipe input via stdin.",
    ))
}

fn stdin_source(body: SourceBody) -> ResolvedSource {
    ResolvedSource {
        source_kind: SourceKind::Stdin,
        source_ref: None,
        body,
    }
}

fn has_xlsx_extension(path_value: &str) -> bool {
    Path::new(path_value)
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("xlsx"))
}

fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(&ZIP_MAGIC)
}

// Spreadsheet exports usually carry a BOM and sometimes are not UTF-8 at all.
fn decode_utf8(bytes: Vec<u8>, source_label: &str) -> ClientResult<String> {
    let text = String::from_utf8(bytes).map_err(|_| {
        ClientError::invalid_input_format(
            &format!("Payments input `{source_label}` is neither UTF-8 text nor an xlsx workbook."),
            "binary",
        )
    })?;
    Ok(strip_bom(text))
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix('\u{FEFF}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

fn read_stdin(stdin_override: Option<String>) -> ClientResult<Option<SourceBody>> {
    if let Some(value) = stdin_override {
        return Ok(Some(SourceBody::Text(strip_bom(value))));
    }

    if std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let mut buffer = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buffer)
        .map_err(|error| {
            ClientError::invalid_argument_with_recovery(
                &format!("Could not read stdin: {error}"),
                vec![
                    "Retry with an explicit file path argument.".to_string(),
                    "Or rerun with valid stdin content.".to_string(),
                ],
            )
        })?;

    if buffer.is_empty() {
        return Ok(None);
    }
    if is_zip(&buffer) {
        return Ok(Some(SourceBody::Workbook(buffer)));
    }

    decode_utf8(buffer, "stdin").map(|text| Some(SourceBody::Text(text)))
}
