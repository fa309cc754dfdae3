//! Layout sources on disk: per-line layout rules and pre-enumerated unit lists.

use crate::error::LoadError;
use crate::model::{normalize_unit_type, LayoutRule, Unit, MAX_FLOOR, MAX_LINE_NUMBER};
use csv::StringRecord;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

const BUILDING: &[&str] = &["동"];
const LINE: &[&str] = &["호", "라인"];
const UNIT_NUMBER: &[&str] = &["호"];
const UNIT_TYPE: &[&str] = &["타입", "주택형"];
const FLOOR_MIN: &[&str] = &["최하층"];
const FLOOR_MAX: &[&str] = &["최고층"];
const DIRECTION: &[&str] = &["방향"];
const EXCLUDED: &[&str] = &["제외층", "필로티"];

/// Rows read from a layout file plus the rows that had to be dropped.
#[derive(Debug)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped_rows: usize,
}

impl<T> Default for Loaded<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped_rows: 0,
        }
    }
}

/// What a delimited layout file contains, judged by its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// 동 / 호(라인) / 타입 / 최하층 / 최고층: one row per line.
    Rules,
    /// 동 / 호 / 타입: one row per unit.
    UnitList,
}

struct Columns {
    names: Vec<String>,
}

impl Columns {
    fn new(headers: &StringRecord) -> Self {
        let names = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Self { names }
    }

    fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.names.iter().position(|n| n == alias))
    }

    fn require(&self, aliases: &[&str], path: &Path) -> Result<usize, LoadError> {
        self.find(aliases).ok_or_else(|| LoadError::InvalidLayout {
            path: path.to_path_buf(),
            message: format!("missing column '{}'", aliases[0]),
        })
    }
}

fn open(path: &Path) -> Result<csv::Reader<File>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
}

fn cell<'r>(record: &'r StringRecord, index: Option<usize>) -> &'r str {
    index.and_then(|i| record.get(i)).map_or("", str::trim)
}

fn number(text: &str) -> Option<u32> {
    text.trim().trim_end_matches(['층', '호']).trim().parse().ok()
}

/// Detect whether a file holds layout rules or a unit list.
pub fn detect_layout_kind<P: AsRef<Path>>(path: P) -> Result<LayoutKind, LoadError> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let columns = Columns::new(reader.headers()?);
    if columns.find(FLOOR_MAX).is_some() {
        Ok(LayoutKind::Rules)
    } else if columns.find(UNIT_NUMBER).is_some() {
        Ok(LayoutKind::UnitList)
    } else {
        Err(LoadError::InvalidLayout {
            path: path.to_path_buf(),
            message: "neither '최고층' nor '호' column present".to_string(),
        })
    }
}

/// Read layout rules (`*단지입력*.csv`).
///
/// In these files the `호` column holds the line number, not a unit number.
/// A `최하층` above 1 excludes the floors beneath it. Rows with unreadable
/// numbers are skipped.
pub fn read_layout_rules<P: AsRef<Path>>(path: P) -> Result<Loaded<LayoutRule>, LoadError> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let columns = Columns::new(reader.headers()?);

    let building = columns.require(BUILDING, path)?;
    let line = columns.require(LINE, path)?;
    let unit_type = columns.require(UNIT_TYPE, path)?;
    let floor_max = columns.require(FLOOR_MAX, path)?;
    let floor_min = columns.find(FLOOR_MIN);
    let direction = columns.find(DIRECTION);
    let excluded = columns.find(EXCLUDED);

    let mut loaded = Loaded::default();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line_cell = cell(&record, Some(line));
        let max_cell = cell(&record, Some(floor_max));
        let min_cell = cell(&record, floor_min);

        let parsed = (
            number(line_cell).filter(|line| *line <= MAX_LINE_NUMBER),
            number(max_cell).filter(|max| *max <= MAX_FLOOR),
            if min_cell.is_empty() { Some(1) } else { number(min_cell) },
        );
        let (Some(line_number), Some(max), Some(min)) = parsed else {
            warn!(
                file = %path.display(),
                row = row + 2,
                "unreadable or out-of-range layout row, skipping"
            );
            loaded.skipped_rows += 1;
            continue;
        };

        let excluded_floors = cell(&record, excluded)
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(number);

        let mut rule = LayoutRule::new(
            cell(&record, Some(building)),
            line_number,
            normalize_unit_type(cell(&record, Some(unit_type))),
            max,
        )
        .starting_at(min)
        .excluding(excluded_floors);
        rule.direction = Some(cell(&record, direction))
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        loaded.records.push(rule);
    }

    info!(
        file = %path.display(),
        rules = loaded.records.len(),
        skipped = loaded.skipped_rows,
        "loaded layout rules"
    );
    Ok(loaded)
}

/// Read a unit list (`* 분양가 매핑전*.csv`): one row per 동/호/타입.
pub fn read_unit_list<P: AsRef<Path>>(path: P) -> Result<Loaded<Unit>, LoadError> {
    let path = path.as_ref();
    let mut reader = open(path)?;
    let columns = Columns::new(reader.headers()?);

    let building = columns.require(BUILDING, path)?;
    let unit_number = columns.require(UNIT_NUMBER, path)?;
    let unit_type = columns.require(UNIT_TYPE, path)?;
    let direction = columns.find(DIRECTION);

    let mut loaded = Loaded::default();
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let Some(number) = number(cell(&record, Some(unit_number))) else {
            warn!(file = %path.display(), row = row + 2, "unreadable unit number, skipping");
            loaded.skipped_rows += 1;
            continue;
        };

        let mut unit = Unit::from_unit_number(
            cell(&record, Some(building)),
            number,
            normalize_unit_type(cell(&record, Some(unit_type))),
        );
        unit.direction = Some(cell(&record, direction))
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        loaded.records.push(unit);
    }

    info!(
        file = %path.display(),
        units = loaded.records.len(),
        skipped = loaded.skipped_rows,
        "loaded unit list"
    );
    Ok(loaded)
}
