//! Per-section extraction instructions.
//!
//! Built-in instructions cover every section. A file named
//! `extract_<slug>.md` in the prompts directory replaces the built-in text
//! for that section.

use super::Section;
use std::path::PathBuf;
use tracing::{debug, warn};

const JSON_ONLY: &str = "\
설명 없이 JSON 객체 하나만 출력하세요. 금액은 원 단위 숫자로, 값이 없으면 0으로 적으세요.";

const PRICING: &str = r#"입주자모집공고문의 공급금액(분양가) 표를 추출하세요.
타입별, 층구분별로 한 행씩 작성합니다. 특정 동/라인에만 적용되는 금액이면 "동"과 "라인"을 함께 적고, 그렇지 않으면 생략하세요.
층구분은 공고문 표기 그대로("2층", "5~9층", "10층 이상", "최상층") 적으세요.
{"분양가": [{"타입": "84A", "층구분": "5~9층", "동": "105", "라인": 5, "대지비": 0, "건축비": 0, "부가가치세": 0, "분양가": 0,
 "1차계약금": 0, "2차계약금": 0, "중도금1회": 0, "중도금2회": 0, "중도금3회": 0, "중도금4회": 0, "중도금5회": 0, "중도금6회": 0, "잔금": 0}]}"#;

const LAYOUT: &str = r#"동호수 배치도에서 동별 라인 배치를 추출하세요.
라인은 숫자, 숫자 배열, 또는 "1~4" 형태 문자열로 적습니다. 필로티 등 세대가 없는 층은 "제외층"에 적으세요.
{"배치정보": [{"동": "101", "라인": [1, 2], "타입": "84A", "최하층": 1, "최고층": 25, "제외층": [1]}]}"#;

const OPTIONS: &str = r#"유상 옵션(시스템에어컨, 빌트인 가전, 마감재 등) 공급금액 표를 추출하세요.
{"옵션": [{"옵션구분": "시스템에어컨", "타입": "84A", "품목": "", "품목세부": "", "설치내역": "", "공급금액": 0}]}"#;

const BALCONY: &str = r#"발코니 확장 공급금액 표를 타입별로 추출하세요.
{"발코니": [{"타입": "84A", "확장금액": 0, "계약금": 0, "잔금": 0}]}"#;

const SCHEDULE: &str = r#"청약 접수, 당첨자 발표, 서류 접수, 계약 체결, 입주 예정 등 일정을 추출하세요. 날짜는 YYYY-MM-DD 형식으로, 하루짜리 일정은 종료일을 비워 두세요.
{"일정": [{"일정명": "특별공급 청약", "시작일": "2025-03-10", "종료일": ""}]}"#;

const SUPPLY_INFO: &str = r#"주택형별 공급 개요를 추출하세요.
{"타입정보": [{"주택형": "084.9800A", "약식표기": "84A", "공급세대수": 0, "전용면적": "", "공급면적": "", "대지지분": ""}]}"#;

fn builtin(section: Section) -> &'static str {
    match section {
        Section::Pricing => PRICING,
        Section::Layout => LAYOUT,
        Section::Options => OPTIONS,
        Section::Balcony => BALCONY,
        Section::Schedule => SCHEDULE,
        Section::SupplyInfo => SUPPLY_INFO,
    }
}

/// Source of section instructions.
#[derive(Debug, Clone, Default)]
pub struct Instructions {
    overrides_dir: Option<PathBuf>,
}

impl Instructions {
    /// Built-in instructions only.
    #[must_use]
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Built-ins, overridden by files in `dir` where present.
    #[must_use]
    pub fn with_overrides<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            overrides_dir: Some(dir.into()),
        }
    }

    /// Full instruction text for a section.
    #[must_use]
    pub fn for_section(&self, section: Section) -> String {
        let body = self
            .read_override(section)
            .unwrap_or_else(|| builtin(section).to_string());
        format!("{body}\n\n{JSON_ONLY}")
    }

    fn read_override(&self, section: Section) -> Option<String> {
        let path = self
            .overrides_dir
            .as_ref()?
            .join(format!("extract_{}.md", section.slug()));
        if !path.is_file() {
            return None;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) if !text.trim().is_empty() => {
                debug!(path = %path.display(), "using instruction override");
                Some(text)
            }
            Ok(_) => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable instruction override, using built-in");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_names_its_key() {
        for section in Section::ALL {
            let text = Instructions::builtin().for_section(section);
            assert!(text.contains(&format!("\"{}\"", section.key())), "{section}");
        }
    }

    #[test]
    fn override_file_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("extract_schedule.md"), "일정만 뽑아 주세요").unwrap();
        let instructions = Instructions::with_overrides(dir.path());

        let schedule = instructions.for_section(Section::Schedule);
        assert!(schedule.starts_with("일정만 뽑아 주세요"));
        assert!(schedule.contains(JSON_ONLY));

        let options = instructions.for_section(Section::Options);
        assert!(options.contains("\"옵션\""));
    }
}
