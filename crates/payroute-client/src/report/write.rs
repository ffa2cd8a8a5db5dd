use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::report::tables::ReportTable;
use crate::state::map_io_error;
use crate::{ClientError, ClientResult};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(crate) fn write_table(directory: &Path, table: &ReportTable) -> ClientResult<PathBuf> {
    let path = directory.join(&table.file_name);
    let mut file = File::create(&path).map_err(|error| map_io_error(&path, &error))?;
    // Spreadsheet tools need the BOM to read Hebrew CSV as UTF-8.
    file.write_all(UTF8_BOM)
        .map_err(|error| map_io_error(&path, &error))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(&table.headers)
        .map_err(|error| csv_error(&path, &error))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|error| csv_error(&path, &error))?;
    }
    writer
        .flush()
        .map_err(|error| map_io_error(&path, &error))?;

    debug!("wrote {} ({} rows)", path.display(), table.rows.len());
    Ok(path)
}

fn csv_error(path: &Path, error: &csv::Error) -> ClientError {
    ClientError::report_write_failed(path, &error.to_string())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::write_table;
    use crate::report::tables::{ReportKind, ReportTable};

    #[test]
    fn csv_starts_with_bom_and_quotes_hebrew_abbreviations() {
        let dir = tempdir();
        assert!(dir.is_ok());
        if let Ok(dir) = dir {
            let table = ReportTable {
                file_name: "t.csv".to_string(),
                kind: ReportKind::Bucket,
                bucket: Some("t".to_string()),
                headers: vec!["מע\"מ".to_string(), "שם".to_string()],
                rows: vec![vec!["17".to_string(), "דנה, כהן".to_string()]],
                data_rows: 1,
            };
            let written = write_table(dir.path(), &table);
            assert!(written.is_ok());
            if let Ok(path) = written {
                let bytes = fs::read(&path).unwrap_or_default();
                assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
                let text = String::from_utf8_lossy(&bytes[3..]).to_string();
                assert_eq!(text, "\"מע\"\"מ\",שם\n17,\"דנה, כהן\"\n");
            }
        }
    }
}
