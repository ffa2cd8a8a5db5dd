use serde::Serialize;

use crate::config::RoutingConfig;
use crate::report::ReportKind;
use crate::routing::BucketCount;

#[derive(Debug, Clone, Serialize)]
pub struct RouteData {
    pub dry_run: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    pub generated_at: String,
    pub config_source: String,
    pub input: RouteInput,
    pub summary: RouteSummary,
    pub buckets: Vec<BucketCount>,
    pub manual_people: Vec<ManualMapping>,
    pub excluded: Vec<ExcludedRow>,
    pub files: Vec<ReportFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteInput {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub format: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub rows_excluded: usize,
    pub rows_routed: usize,
    pub auto_rows: usize,
    pub manual_rows: usize,
    pub unresolved_rows: usize,
    pub buckets: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManualMapping {
    pub person: String,
    pub target_accountant: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExcludedRow {
    pub row: usize,
    pub business: String,
    pub person: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportFile {
    pub file_name: String,
    pub kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigShowData {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub config: RoutingConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainData {
    pub description: String,
    pub normalized: String,
    pub matching_form: String,
    pub accountant_raw: String,
    pub bucket: String,
    pub consolidated: bool,
    pub unresolved: bool,
    pub config_source: String,
}
