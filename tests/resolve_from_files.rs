use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

use presale_mapper::export::{CsvDirWriter, TabularWriter};
use presale_mapper::model::{ResolvedUnit, NO_PRICE_INFO};
use presale_mapper::parser::{read_layout_rules, read_price_tiers, read_unit_list};
use presale_mapper::resolver::{expand_layout, join_prices, resolve, PriceTierIndex};

const PRICES: &str = r#"```json
{"분양가": [
  {"타입": "84A", "층구분": "2~5층", "대지비": "100,000,000", "건축비": 350000000,
   "부가가치세": 50000000, "분양가": 500000000, "1차계약금": 10000000,
   "2차계약금": 40000000, "중도금1회": 50000000, "중도금2회": 50000000,
   "잔금": 350000000},
  {"타입": "84A", "층구분": "6층 이상", "분양가": 520000000},
  {"타입": "59", "층구분": "최상층", "분양가": 410000000}
]}
```"#;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn layout_rules_and_price_reply_resolve_to_priced_units() {
    let dir = tempfile::tempdir().unwrap();
    let layout = write(
        dir.path(),
        "테스트_단지입력.csv",
        "\u{feff}동,호,타입,최하층,최고층,방향\n\
         101,1,84A,2,7,남향\n\
         101,2,59,1,3,동향\n",
    );
    let prices = write(dir.path(), "prices.json", PRICES);

    let rules = read_layout_rules(&layout).unwrap().records;
    let tiers = read_price_tiers(&prices).unwrap();
    assert_eq!(tiers.len(), 3);

    let resolution = resolve(&rules, tiers);
    let numbers: Vec<u32> = resolution.units.iter().map(|u| u.unit.unit_number).collect();
    assert_eq!(numbers, vec![201, 301, 401, 501, 601, 701, 102, 202, 302]);

    let prices: Vec<Option<u64>> = resolution.units.iter().map(ResolvedUnit::total_price).collect();
    assert_eq!(
        prices,
        vec![
            Some(500_000_000),
            Some(500_000_000),
            Some(500_000_000),
            Some(500_000_000),
            Some(520_000_000),
            Some(520_000_000),
            None,
            None,
            None,
        ]
    );
    assert_eq!(resolution.summary.priced, 6);
    assert_eq!(resolution.summary.unpriced, 3);
    assert!(resolution.index_report.collisions.is_empty());
}

#[test]
fn resolved_table_is_written_with_bom_and_missing_price_marker() {
    let dir = tempfile::tempdir().unwrap();
    let units = write(
        dir.path(),
        "units.csv",
        "동,호,타입\n101,201,84A\n101,101,84A\n",
    );
    let prices = write(dir.path(), "prices.json", PRICES);

    let index = PriceTierIndex::build(read_price_tiers(&prices).unwrap());
    let (resolved, summary) = join_prices(read_unit_list(&units).unwrap().records, &index);
    assert_eq!(summary.total(), 2);

    let writer = CsvDirWriter::new(dir.path().join("out"));
    let path = writer.write_table("테스트_분양가_완료", &resolved).unwrap();
    assert_eq!(path, dir.path().join("out").join("테스트_분양가_완료.csv"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with('\u{feff}'));
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("101,201,84A,2,,100000000,350000000,50000000,500000000,"));
    assert!(lines[2].contains(NO_PRICE_INFO));
}

#[test]
fn repeated_runs_produce_identical_tables() {
    let dir = tempfile::tempdir().unwrap();
    let layout = write(
        dir.path(),
        "layout.csv",
        "동,라인,타입,최고층,제외층\n102,3,84A,9,\"1\"\n",
    );
    let prices = write(dir.path(), "prices.json", PRICES);

    let run = |out: &str| {
        let rules = read_layout_rules(&layout).unwrap().records;
        let index = PriceTierIndex::build(read_price_tiers(&prices).unwrap());
        let (resolved, _) = join_prices(expand_layout(&rules), &index);
        let path = CsvDirWriter::new(dir.path().join(out))
            .write_table("단지_분양가_완료", &resolved)
            .unwrap();
        fs::read(path).unwrap()
    };

    assert_eq!(run("first"), run("second"));
}
