use once_cell::sync::Lazy;
use regex::Regex;

use crate::routing::normalize::normalize_quotes_and_dashes;
use crate::routing::types::{FieldValue, UNRESOLVED};

// Runs on quote-normalized text, so only ASCII quotes need matching.
static TITLE_MARKER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r#"רו["']?ח"#).ok());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CutPoint {
    start: usize,
    end: usize,
}

/// Derives the raw accountant name from a payment description: everything after
/// whichever of the last hyphen or the last title marker appears later.
pub fn extract_accountant(description: &str) -> String {
    let normalized = normalize_quotes_and_dashes(description);
    let cut = later_cut_point(last_hyphen(&normalized), last_title_marker(&normalized));

    let right = match cut {
        Some(point) => normalized[point.end..].trim(),
        None => normalized.trim(),
    };

    if right.is_empty() {
        return UNRESOLVED.to_string();
    }
    right.to_string()
}

/// Non-text cells (numbers, blanks) cannot carry a name.
pub fn extract_accountant_field(value: Option<&FieldValue>) -> String {
    match value.and_then(FieldValue::as_text) {
        Some(text) => extract_accountant(text),
        None => UNRESOLVED.to_string(),
    }
}

fn last_hyphen(text: &str) -> Option<CutPoint> {
    text.rfind('-').map(|start| CutPoint {
        start,
        end: start + 1,
    })
}

fn last_title_marker(text: &str) -> Option<CutPoint> {
    let marker = TITLE_MARKER.as_ref()?;
    marker.find_iter(text).last().map(|found| CutPoint {
        start: found.start(),
        end: found.end(),
    })
}

fn later_cut_point(hyphen: Option<CutPoint>, marker: Option<CutPoint>) -> Option<CutPoint> {
    match (hyphen, marker) {
        (Some(left), Some(right)) => {
            if right.start > left.start {
                Some(right)
            } else {
                Some(left)
            }
        }
        (left, right) => left.or(right),
    }
}
