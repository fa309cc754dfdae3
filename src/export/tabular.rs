//! Flat row views of the records we write out.

use crate::model::{
    BalconyItem, OptionItem, PriceTier, ResolvedUnit, ScheduleItem, SupplyInfo, TierScope,
    INTERIM_INSTALLMENTS, NO_PRICE_INFO,
};

/// A record with a fixed column layout.
pub trait Tabular {
    const HEADERS: &'static [&'static str];

    /// One cell per header, in header order.
    fn row(&self) -> Vec<String>;
}

const PAYMENT_HEADERS: [&str; 3 + INTERIM_INSTALLMENTS] = [
    "1차계약금",
    "2차계약금",
    "중도금1회",
    "중도금2회",
    "중도금3회",
    "중도금4회",
    "중도금5회",
    "중도금6회",
    "잔금",
];

/// Money cells shared by unit and tier rows, starting at 대지비.
fn money_cells(tier: &PriceTier) -> Vec<String> {
    let payment = &tier.payment;
    let mut cells = vec![
        tier.land_cost.to_string(),
        tier.building_cost.to_string(),
        tier.vat.to_string(),
        tier.total_price.to_string(),
        payment.contract_first.to_string(),
        payment.contract_second.to_string(),
    ];
    cells.extend(
        (0..INTERIM_INSTALLMENTS)
            .map(|i| payment.interim.get(i).map_or_else(String::new, u64::to_string)),
    );
    cells.push(payment.balance.to_string());
    cells
}

fn unpriced_cells() -> Vec<String> {
    let mut cells = vec![String::new(); 4 + PAYMENT_HEADERS.len()];
    cells[3] = NO_PRICE_INFO.to_string();
    cells
}

impl Tabular for ResolvedUnit {
    const HEADERS: &'static [&'static str] = &[
        "동",
        "호",
        "타입",
        "층",
        "방향",
        "대지비",
        "건축비",
        "부가가치세",
        "분양가",
        PAYMENT_HEADERS[0],
        PAYMENT_HEADERS[1],
        PAYMENT_HEADERS[2],
        PAYMENT_HEADERS[3],
        PAYMENT_HEADERS[4],
        PAYMENT_HEADERS[5],
        PAYMENT_HEADERS[6],
        PAYMENT_HEADERS[7],
        PAYMENT_HEADERS[8],
    ];

    fn row(&self) -> Vec<String> {
        let unit = &self.unit;
        let mut cells = vec![
            unit.building_id.clone(),
            unit.unit_number.to_string(),
            unit.unit_type.clone(),
            unit.floor.to_string(),
            unit.direction.clone().unwrap_or_default(),
        ];
        match &self.price {
            Some(tier) => cells.extend(money_cells(tier)),
            None => cells.extend(unpriced_cells()),
        }
        cells
    }
}

impl Tabular for PriceTier {
    const HEADERS: &'static [&'static str] = &[
        "타입",
        "층구분",
        "동",
        "라인",
        "대지비",
        "건축비",
        "부가가치세",
        "분양가",
        PAYMENT_HEADERS[0],
        PAYMENT_HEADERS[1],
        PAYMENT_HEADERS[2],
        PAYMENT_HEADERS[3],
        PAYMENT_HEADERS[4],
        PAYMENT_HEADERS[5],
        PAYMENT_HEADERS[6],
        PAYMENT_HEADERS[7],
        PAYMENT_HEADERS[8],
    ];

    fn row(&self) -> Vec<String> {
        let (building, line) = match &self.scope {
            TierScope::Default => (String::new(), String::new()),
            TierScope::Line {
                building_id,
                line_number,
            } => (building_id.clone(), line_number.to_string()),
        };
        let mut cells = vec![self.unit_type.clone(), self.floor_text.clone(), building, line];
        cells.extend(money_cells(self));
        cells
    }
}

impl Tabular for OptionItem {
    const HEADERS: &'static [&'static str] = &[
        "단지명", "옵션구분", "타입", "품목", "품목세부", "설치내역", "공급금액",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.complex_name.clone(),
            self.category.clone(),
            self.unit_type.clone(),
            self.item.clone(),
            self.detail.clone(),
            self.installation.clone(),
            self.price.to_string(),
        ]
    }
}

impl Tabular for BalconyItem {
    const HEADERS: &'static [&'static str] = &["단지명", "타입", "확장금액", "계약금", "잔금"];

    fn row(&self) -> Vec<String> {
        vec![
            self.complex_name.clone(),
            self.unit_type.clone(),
            self.price.to_string(),
            self.contract.to_string(),
            self.balance.to_string(),
        ]
    }
}

impl Tabular for ScheduleItem {
    const HEADERS: &'static [&'static str] = &["단지명", "일정명", "시작일", "종료일"];

    fn row(&self) -> Vec<String> {
        vec![
            self.complex_name.clone(),
            self.name.clone(),
            self.start.clone(),
            self.end.clone(),
        ]
    }
}

impl Tabular for SupplyInfo {
    const HEADERS: &'static [&'static str] = &[
        "주택형",
        "약식표기",
        "공급세대수",
        "전용면적",
        "공급면적",
        "대지지분",
    ];

    fn row(&self) -> Vec<String> {
        vec![
            self.housing_type.clone(),
            self.short_name.clone(),
            self.households.map_or_else(String::new, |n| n.to_string()),
            self.exclusive_area.clone(),
            self.supply_area.clone(),
            self.land_share.clone(),
        ]
    }
}
