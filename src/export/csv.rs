use super::Tabular;
use crate::error::ExportError;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Marker that makes Excel open the file as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes named tables of [`Tabular`] records somewhere.
pub trait TabularWriter {
    /// Replace the table `target` with `records`; returns where it went.
    fn write_table<T: Tabular>(&self, target: &str, records: &[T]) -> Result<PathBuf, ExportError>;
}

/// Writes each table to `<dir>/<target>.csv`, overwriting.
#[derive(Debug, Clone)]
pub struct CsvDirWriter {
    dir: PathBuf,
}

impl CsvDirWriter {
    #[must_use]
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TabularWriter for CsvDirWriter {
    fn write_table<T: Tabular>(&self, target: &str, records: &[T]) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::FileCreate {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(format!("{target}.csv"));
        export_csv(records, &path)?;
        tracing::info!(path = %path.display(), rows = records.len(), "wrote table");
        Ok(path)
    }
}

/// Write records as CSV with a UTF-8 BOM.
pub fn export_csv<T: Tabular, P: AsRef<Path>>(records: &[T], path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let mut file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    file.write_all(UTF8_BOM).map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    let mut writer = csv::Writer::from_writer(file);

    writer.write_record(T::HEADERS)?;

    for record in records {
        writer.write_record(record.row())?;
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScheduleItem;
    use pretty_assertions::assert_eq;

    fn schedule(name: &str) -> ScheduleItem {
        ScheduleItem {
            complex_name: "테스트단지".to_string(),
            name: name.to_string(),
            start: "2025-03-10".to_string(),
            end: String::new(),
        }
    }

    #[test]
    fn writes_bom_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvDirWriter::new(dir.path().join("out"));

        let path = writer
            .write_table("테스트단지_일정_완료", &[schedule("청약"), schedule("계약")])
            .unwrap();
        let bytes = fs::read(&path).unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec![
                "단지명,일정명,시작일,종료일",
                "테스트단지,청약,2025-03-10,",
                "테스트단지,계약,2025-03-10,",
            ]
        );
    }

    #[test]
    fn rewriting_a_table_replaces_it() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvDirWriter::new(dir.path());

        writer
            .write_table("일정", &[schedule("청약"), schedule("계약")])
            .unwrap();
        let path = writer.write_table("일정", &[schedule("입주")]).unwrap();

        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("입주"));
        assert!(!text.contains("청약"));
    }
}
