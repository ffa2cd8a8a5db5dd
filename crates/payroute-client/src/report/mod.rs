//! CSV reports for one routed batch: a file per bucket plus summary files.

mod sanitize;
mod tables;
mod write;

use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use log::info;
use ulid::Ulid;

use crate::ClientResult;
use crate::state::ensure_output_directory;

pub use sanitize::sanitize_filename;
pub use tables::{
    EXCLUDED_FILE_NAME, MANUAL_PEOPLE_FILE_NAME, ReportKind, ReportTable, SUMMARY_FILE_NAME,
    TOTALS_LABEL, build_reports,
};

#[derive(Debug, Clone)]
pub struct ReportRun {
    pub run_id: String,
    pub generated_at: String,
    pub directory: PathBuf,
}

impl ReportRun {
    pub fn new(output_root: &Path) -> Self {
        let run_id = format!("run_{}", Ulid::new());
        Self {
            directory: output_root.join(&run_id),
            generated_at: generated_now(),
            run_id,
        }
    }
}

pub fn generated_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Writes every table into the run directory, creating it first.
pub fn write_reports(run: &ReportRun, tables: &[ReportTable]) -> ClientResult<Vec<PathBuf>> {
    ensure_output_directory(&run.directory)?;
    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        written.push(write::write_table(&run.directory, table)?);
    }
    info!(
        "wrote {} report files to {}",
        written.len(),
        run.directory.display()
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::ReportRun;

    #[test]
    fn run_directory_is_named_after_run_id() {
        let run = ReportRun::new(Path::new("/tmp/payroute-runs"));
        assert!(run.run_id.starts_with("run_"));
        assert_eq!(run.run_id.len(), "run_".len() + 26);
        assert_eq!(run.directory, Path::new("/tmp/payroute-runs").join(&run.run_id));
        assert!(run.generated_at.ends_with('Z'));
    }
}
