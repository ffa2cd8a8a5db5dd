use std::fmt;

use serde::{Deserialize, Serialize};

/// Bucket used whenever no accountant name can be recovered.
pub const UNRESOLVED: &str = "לא מזוהה";

/// Professional-title abbreviation used for synthesized bucket names.
pub const TITLE_PREFIX: &str = "רו\"ח";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Empty,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) if value.is_finite() => Some(*value),
            Self::Text(value) => value.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Renders the value the way a person reads it in a cell.
    pub fn display_text(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::Number(value) => format_number(*value),
            Self::Empty => String::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) => value.trim().is_empty(),
            Self::Number(value) => value.is_nan(),
            Self::Empty => true,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    value.to_string()
}

/// One input row: column names paired with their values, in column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn new(fields: Vec<(String, FieldValue)>) -> Self {
        Self { fields }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<FieldValue>,
    {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Trimmed display text of a column, empty when missing.
    pub fn text(&self, column: &str) -> String {
        self.get(column)
            .map(|value| value.display_text().trim().to_string())
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteSource {
    Auto,
    Manual,
}

impl RouteSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

/// Fields derived for one routed record. The input record itself is never touched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutedRecord {
    pub index: usize,
    pub person_raw: String,
    pub core_target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accountant_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accountant_canonical: Option<String>,
    pub accountant_final: String,
    pub bucket: String,
    pub source: RouteSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExcludedRecord {
    pub index: usize,
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketCount {
    pub bucket: String,
    pub rows: usize,
    pub auto_rows: usize,
    pub manual_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoutingOutcome {
    /// One entry per non-excluded input record, in input order.
    pub routed: Vec<RoutedRecord>,
    pub excluded: Vec<ExcludedRecord>,
    /// Sorted distinct canonical names found in descriptions.
    pub auto_candidates: Vec<String>,
}

impl RoutingOutcome {
    pub fn bucket_counts(&self) -> Vec<BucketCount> {
        let mut counts: Vec<BucketCount> = Vec::new();
        for routed in &self.routed {
            let position = match counts.iter().position(|entry| entry.bucket == routed.bucket) {
                Some(position) => position,
                None => {
                    counts.push(BucketCount {
                        bucket: routed.bucket.clone(),
                        rows: 0,
                        auto_rows: 0,
                        manual_rows: 0,
                    });
                    counts.len() - 1
                }
            };
            let entry = &mut counts[position];
            entry.rows += 1;
            match routed.source {
                RouteSource::Auto => entry.auto_rows += 1,
                RouteSource::Manual => entry.manual_rows += 1,
            }
        }
        counts.sort_by(|left, right| left.bucket.cmp(&right.bucket));
        counts
    }

    pub fn routed_for(&self, index: usize) -> Option<&RoutedRecord> {
        self.routed.iter().find(|routed| routed.index == index)
    }
}
