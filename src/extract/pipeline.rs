//! Per-document driver: extract every section, resolve prices onto units,
//! write the tables.

use super::{DocumentExtractor, Instructions, Section, SourceDocument};
use crate::error::{ExportError, ExtractError};
use crate::export::{export_json, Tabular, TabularWriter};
use crate::model::{
    BalconyItem, LayoutEntry, LayoutRule, OptionItem, PriceTier, RawPriceTier, ScheduleItem,
    SupplyInfo, Unit,
};
use crate::parser::{
    detect_layout_kind, parse_section, read_layout_rules, read_unit_list, LayoutKind,
};
use crate::resolver::{expand_layout, join_prices, IndexReport, JoinSummary, PriceTierIndex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File-name marker of layout-rule CSVs kept next to the notice.
const LAYOUT_FILE_MARKER: &str = "단지입력";

/// Where the units of a document came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum LayoutSource {
    Rules(PathBuf),
    UnitList(PathBuf),
    Extracted,
}

/// A section that produced nothing usable.
#[derive(Debug, Clone, Serialize)]
pub struct SectionFailure {
    pub section: String,
    pub error: String,
}

/// Outcome of processing one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoticeReport {
    pub name: String,
    pub written: Vec<PathBuf>,
    pub failures: Vec<SectionFailure>,
    pub sections_attempted: usize,
    pub price_tiers: usize,
    pub layout_source: Option<LayoutSource>,
    pub join: Option<JoinSummary>,
    pub index: Option<IndexReport>,
}

impl NoticeReport {
    /// Every section that was attempted failed.
    #[must_use]
    pub fn all_sections_failed(&self) -> bool {
        self.sections_attempted > 0 && self.failures.len() == self.sections_attempted
    }
}

/// Runs the extraction sections for a document and writes the results.
pub struct NoticeProcessor<E, W> {
    extractor: E,
    writer: W,
    instructions: Instructions,
    layout_file: Option<PathBuf>,
    json_dir: Option<PathBuf>,
}

impl<E: DocumentExtractor, W: TabularWriter> NoticeProcessor<E, W> {
    pub fn new(extractor: E, writer: W) -> Self {
        Self {
            extractor,
            writer,
            instructions: Instructions::builtin(),
            layout_file: None,
            json_dir: None,
        }
    }

    #[must_use]
    pub fn with_instructions(mut self, instructions: Instructions) -> Self {
        self.instructions = instructions;
        self
    }

    /// Use this layout file instead of searching next to the document.
    #[must_use]
    pub fn with_layout_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.layout_file = Some(path.into());
        self
    }

    /// Also write the resolved units as JSON into `dir`.
    #[must_use]
    pub fn with_json_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.json_dir = Some(dir.into());
        self
    }

    pub fn process_path<P: AsRef<Path>>(&self, path: P) -> Result<NoticeReport, ExtractError> {
        let document = SourceDocument::load(path)?;
        self.process(&document)
    }

    /// Process one document.
    ///
    /// Section failures are recorded in the report; only a missing layout
    /// input or a failed write aborts the document.
    pub fn process(&self, document: &SourceDocument) -> Result<NoticeReport, ExtractError> {
        let name = document.apartment_name();
        info!(document = %document.path.display(), name = %name, "processing notice");
        let mut report = NoticeReport {
            name: name.clone(),
            ..NoticeReport::default()
        };

        let tiers: Vec<PriceTier> = self
            .section::<RawPriceTier>(document, Section::Pricing, &mut report)
            .into_iter()
            .map(PriceTier::from)
            .collect();
        report.price_tiers = tiers.len();
        self.write(&format!("{name}_분양가표"), &tiers, &mut report)?;

        if tiers.is_empty() {
            info!(name = %name, "no price tiers, skipping price mapping");
        } else if let Some(units) = self.units(document, &mut report)? {
            let index = PriceTierIndex::build(tiers);
            let (resolved, summary) = join_prices(units, &index);
            let target = format!("{name}_분양가_완료");
            self.write(&target, &resolved, &mut report)?;
            if let Some(dir) = &self.json_dir {
                fs::create_dir_all(dir).map_err(|source| ExportError::FileCreate {
                    path: dir.clone(),
                    source,
                })?;
                let path = dir.join(format!("{target}.json"));
                export_json(&resolved, &path)?;
                report.written.push(path);
            }
            report.join = Some(summary);
            report.index = Some(index.report().clone());
        } else {
            warn!(name = %name, "no layout source, price tiers written without unit mapping");
        }

        let mut options: Vec<OptionItem> = self.section(document, Section::Options, &mut report);
        options.iter_mut().for_each(|o| o.complex_name.clone_from(&name));
        self.write(&format!("{name}_옵션"), &options, &mut report)?;

        let mut balcony: Vec<BalconyItem> = self.section(document, Section::Balcony, &mut report);
        balcony.iter_mut().for_each(|b| b.complex_name.clone_from(&name));
        self.write(&format!("{name}_발코니"), &balcony, &mut report)?;

        let mut schedule: Vec<ScheduleItem> = self.section(document, Section::Schedule, &mut report);
        schedule.iter_mut().for_each(|s| s.complex_name.clone_from(&name));
        self.write(&format!("{name}_일정"), &schedule, &mut report)?;

        let supply: Vec<SupplyInfo> = self.section(document, Section::SupplyInfo, &mut report);
        self.write(&format!("{name}_공급정보"), &supply, &mut report)?;

        info!(
            name = %name,
            written = report.written.len(),
            failed_sections = report.failures.len(),
            "finished notice"
        );
        Ok(report)
    }

    /// Run one section; a failure is recorded and yields no records.
    fn section<T: DeserializeOwned>(
        &self,
        document: &SourceDocument,
        section: Section,
        report: &mut NoticeReport,
    ) -> Vec<T> {
        report.sections_attempted += 1;
        let instruction = self.instructions.for_section(section);
        let result = self
            .extractor
            .extract(document, &instruction)
            .and_then(|reply| parse_section(&reply, section.key()));

        match result {
            Ok(records) => {
                info!(section = %section, records = records.len(), "extracted section");
                records
            }
            Err(e) => {
                warn!(section = %section, error = %e, "section failed");
                report.failures.push(SectionFailure {
                    section: section.key().to_string(),
                    error: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Units for the document: explicit file, then a `*단지입력*.csv` next to
    /// the document, then the extracted layout.
    fn units(
        &self,
        document: &SourceDocument,
        report: &mut NoticeReport,
    ) -> Result<Option<Vec<Unit>>, ExtractError> {
        let file = match &self.layout_file {
            Some(path) => Some((detect_layout_kind(path)?, path.clone())),
            None => find_layout_file(&document.path).map(|path| (LayoutKind::Rules, path)),
        };

        match file {
            Some((LayoutKind::Rules, path)) => {
                let units = expand_layout(&read_layout_rules(&path)?.records);
                report.layout_source = Some(LayoutSource::Rules(path));
                Ok(Some(units))
            }
            Some((LayoutKind::UnitList, path)) => {
                let units = read_unit_list(&path)?.records;
                report.layout_source = Some(LayoutSource::UnitList(path));
                Ok(Some(units))
            }
            None => {
                let rules = self.extracted_rules(document, report);
                if rules.is_empty() {
                    return Ok(None);
                }
                report.layout_source = Some(LayoutSource::Extracted);
                Ok(Some(expand_layout(&rules)))
            }
        }
    }

    fn extracted_rules(
        &self,
        document: &SourceDocument,
        report: &mut NoticeReport,
    ) -> Vec<LayoutRule> {
        let entries: Vec<LayoutEntry> = self.section(document, Section::Layout, report);
        entries
            .iter()
            .filter_map(|entry| {
                let rules = entry.to_rules();
                if rules.is_none() {
                    warn!(
                        building = %entry.building_id,
                        "unreadable line spec, skipping layout entry"
                    );
                }
                rules
            })
            .flatten()
            .collect()
    }

    /// Write a table unless it is empty.
    fn write<T: Tabular>(
        &self,
        target: &str,
        records: &[T],
        report: &mut NoticeReport,
    ) -> Result<(), ExtractError> {
        if records.is_empty() {
            return Ok(());
        }
        let path = self.writer.write_table(target, records)?;
        report.written.push(path);
        Ok(())
    }
}

/// First `*단지입력*.csv` in the document's directory, by name.
fn find_layout_file(document: &Path) -> Option<PathBuf> {
    let dir = document
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut matches: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            let is_csv = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
            let marked = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().contains(LAYOUT_FILE_MARKER));
            is_csv && marked
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::export::CsvDirWriter;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// Answers each section with a canned reply keyed by the section's JSON key.
    struct CannedExtractor {
        replies: HashMap<&'static str, &'static str>,
    }

    impl DocumentExtractor for CannedExtractor {
        fn extract(
            &self,
            _document: &SourceDocument,
            instruction: &str,
        ) -> Result<String, ExtractError> {
            Section::ALL
                .iter()
                .find(|s| instruction.contains(&format!("\"{}\":", s.key())))
                .and_then(|s| self.replies.get(s.key()))
                .map(|reply| (*reply).to_string())
                .ok_or(ExtractError::EmptyResponse)
        }
    }

    fn document(dir: &Path) -> SourceDocument {
        SourceDocument {
            path: dir.join("테스트단지 입주자모집공고.pdf"),
            bytes: Vec::new(),
            mime_type: "application/pdf",
        }
    }

    const PRICES: &str = r#"{"분양가": [{"타입": "84A", "층구분": "2~5층", "분양가": "500,000,000", "잔금": 150000000}]}"#;

    #[test]
    fn layout_csv_next_to_document_drives_price_mapping() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("테스트단지_단지입력.csv"),
            "동,호,타입,최하층,최고층\n101,1,84A,2,5\n",
        )
        .unwrap();
        let extractor = CannedExtractor {
            replies: HashMap::from([
                ("분양가", PRICES),
                ("일정", r#"```json
{"일정": [{"일정명": "청약", "시작일": "2025-03-10"}]}
```"#),
            ]),
        };
        let out = dir.path().join("out");
        let processor =
            NoticeProcessor::new(extractor, CsvDirWriter::new(&out)).with_json_dir(&out);

        let report = processor.process(&document(dir.path())).unwrap();

        assert_eq!(report.name, "테스트단지");
        assert_eq!(
            report.layout_source,
            Some(LayoutSource::Rules(dir.path().join("테스트단지_단지입력.csv")))
        );
        assert_eq!(report.join, Some(JoinSummary { priced: 4, unpriced: 0 }));
        // Layout came from disk, so 배치정보 was never requested.
        assert_eq!(report.sections_attempted, 5);
        assert_eq!(report.failures.len(), 3);
        assert!(!report.all_sections_failed());

        let mapped = fs::read_to_string(out.join("테스트단지_분양가_완료.csv")).unwrap();
        assert_eq!(mapped.lines().count(), 5);
        assert!(mapped.contains("101,201,84A,2,"));
        assert!(out.join("테스트단지_분양가_완료.json").is_file());
        assert!(out.join("테스트단지_분양가표.csv").is_file());
        let schedule = fs::read_to_string(out.join("테스트단지_일정.csv")).unwrap();
        assert!(schedule.contains("테스트단지,청약,2025-03-10,"));
        assert!(!out.join("테스트단지_옵션.csv").exists());
    }

    #[test]
    fn extracted_layout_is_used_without_csv() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = CannedExtractor {
            replies: HashMap::from([
                ("분양가", PRICES),
                ("배치정보", r#"{"배치정보": [{"동": "101", "라인": "1~2", "타입": "84A", "최고층": 5, "제외층": [1]}]}"#),
            ]),
        };
        let processor = NoticeProcessor::new(extractor, CsvDirWriter::new(dir.path()));

        let report = processor.process(&document(dir.path())).unwrap();

        assert_eq!(report.layout_source, Some(LayoutSource::Extracted));
        assert_eq!(report.join, Some(JoinSummary { priced: 8, unpriced: 0 }));
        assert_eq!(report.sections_attempted, 6);
    }

    #[test]
    fn unusable_extracted_layout_leaves_units_unmapped() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = CannedExtractor {
            replies: HashMap::from([
                ("분양가", PRICES),
                ("배치정보", r#"{"배치정보": [{"동": "101", "라인": "1~4000000000", "타입": "84A", "최고층": 5}]}"#),
            ]),
        };
        let processor = NoticeProcessor::new(extractor, CsvDirWriter::new(dir.path()));

        let report = processor.process(&document(dir.path())).unwrap();

        assert_eq!(report.layout_source, None);
        assert_eq!(report.join, None);
        assert_eq!(report.sections_attempted, 6);
        assert!(dir.path().join("테스트단지_분양가표.csv").is_file());
        assert!(!dir.path().join("테스트단지_분양가_완료.csv").exists());
    }

    #[test]
    fn explicit_unit_list_is_joined_directly() {
        let dir = tempfile::tempdir().unwrap();
        let units = dir.path().join("세대목록.csv");
        fs::write(&units, "동,호,타입\n101,101,84A\n101,301,84A\n").unwrap();
        let extractor = CannedExtractor {
            replies: HashMap::from([("분양가", PRICES)]),
        };
        let processor =
            NoticeProcessor::new(extractor, CsvDirWriter::new(dir.path())).with_layout_file(&units);

        let report = processor.process(&document(dir.path())).unwrap();

        assert_eq!(report.layout_source, Some(LayoutSource::UnitList(units)));
        assert_eq!(report.join, Some(JoinSummary { priced: 1, unpriced: 1 }));
    }

    #[test]
    fn missing_explicit_layout_aborts_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = CannedExtractor {
            replies: HashMap::from([("분양가", PRICES)]),
        };
        let processor = NoticeProcessor::new(extractor, CsvDirWriter::new(dir.path()))
            .with_layout_file(dir.path().join("없음.csv"));

        let err = processor.process(&document(dir.path())).unwrap_err();
        assert!(matches!(err, ExtractError::Load(LoadError::FileRead { .. })));
    }

    #[test]
    fn nothing_extracted_means_every_section_failed() {
        let dir = tempfile::tempdir().unwrap();
        let extractor = CannedExtractor {
            replies: HashMap::new(),
        };
        let processor = NoticeProcessor::new(extractor, CsvDirWriter::new(dir.path()));

        let report = processor.process(&document(dir.path())).unwrap();

        assert!(report.all_sections_failed());
        assert!(report.written.is_empty());
        assert_eq!(report.layout_source, None);
    }
}
