use crate::model::{ResolvedUnit, NO_PRICE_INFO};
use crate::ui::app::{App, FocusPanel};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table,
    },
    Frame,
};

const BRAND_DARK: Color = Color::Rgb(0x1F, 0x2F, 0x3C);
const BRAND_SELECT_BG: Color = Color::Rgb(0xC3, 0xD3, 0xE0);
const BRAND_GREEN: Color = Color::Rgb(0x82, 0x9A, 0x68);
const BRAND_ORANGE: Color = Color::Rgb(0x9E, 0x68, 0x3C);
const BRAND_MUTED: Color = Color::Rgb(0x71, 0x65, 0x65);

const HEADER_STYLE: Style = Style::new().fg(BRAND_DARK).add_modifier(Modifier::BOLD);
const SELECTED_STYLE: Style = Style::new()
    .bg(BRAND_SELECT_BG)
    .fg(BRAND_DARK)
    .add_modifier(Modifier::BOLD);
const COUNT_COLOR: Color = BRAND_GREEN;
const MISSING_COLOR: Color = BRAND_ORANGE;

/// 500000000 → "500,000,000".
#[must_use]
pub fn format_won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn price_cell(unit: &ResolvedUnit) -> String {
    unit.total_price()
        .map_or_else(|| NO_PRICE_INFO.to_string(), format_won)
}

fn item_style(is_selected: bool, is_focused: bool) -> Style {
    if is_selected && is_focused {
        SELECTED_STYLE
    } else if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn marker(is_selected: bool, is_focused: bool) -> &'static str {
    if is_selected && is_focused {
        " ◄"
    } else {
        ""
    }
}

fn panel_block(title: String, is_focused: bool) -> Block<'static> {
    let border_style = if is_focused {
        Style::default().fg(BRAND_ORANGE)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

pub fn draw_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Main content
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_main_content(frame, chunks[1], app);
    draw_footer(
        frame,
        chunks[2],
        " ←→ Panel | ↑↓ Select | Enter Unit detail | q Quit ",
    );
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        " {} | {} 동 | {} 세대 | 분양가 {} / {} ",
        app.title,
        app.buildings.len(),
        app.total_units(),
        app.priced_units(),
        app.total_units()
    );

    let header = Paragraph::new(title)
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_main_content(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::horizontal([
        Constraint::Percentage(15), // Types
        Constraint::Percentage(25), // Buildings
        Constraint::Percentage(60), // Units
    ])
    .split(area);

    draw_types(frame, chunks[0], app);
    draw_buildings(frame, chunks[1], app);
    draw_units(frame, chunks[2], app);
}

fn draw_types(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Types;

    let names = std::iter::once("All").chain(app.unit_types.iter().map(String::as_str));
    let items: Vec<ListItem> = names
        .enumerate()
        .map(|(i, name)| {
            let is_selected = i == app.selected_type;
            ListItem::new(Line::from(vec![
                Span::styled(name.to_string(), item_style(is_selected, is_focused)),
                Span::styled(marker(is_selected, is_focused), Style::default().fg(BRAND_ORANGE)),
            ]))
        })
        .collect();

    let title = format!(" 타입 ({}) ", app.unit_types.len() + 1); // +1 for "All"
    frame.render_widget(List::new(items).block(panel_block(title, is_focused)), area);
}

fn draw_buildings(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Buildings;

    let items: Vec<ListItem> = app
        .buildings
        .iter()
        .enumerate()
        .map(|(i, building)| {
            let is_selected = i == app.selected_building;
            let (priced, total) = app.filtered_counts(building);
            let count_color = if priced < total {
                MISSING_COLOR
            } else {
                COUNT_COLOR
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("{}동", building.id), item_style(is_selected, is_focused)),
                Span::raw(" "),
                Span::styled(format!("({priced}/{total})"), Style::default().fg(count_color)),
                Span::styled(marker(is_selected, is_focused), Style::default().fg(BRAND_ORANGE)),
            ]))
        })
        .collect();

    let title = format!(" 동 ({}) ", app.buildings.len());
    frame.render_widget(List::new(items).block(panel_block(title, is_focused)), area);
}

fn draw_units(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Units;
    let units = app.filtered_units();

    // Borders plus header row.
    let visible_rows = (area.height as usize).saturating_sub(3);
    let scroll_offset = if app.selected_unit >= visible_rows {
        app.selected_unit - visible_rows + 1
    } else {
        0
    };

    let header = Row::new(vec!["호", "타입", "층", "분양가"])
        .style(HEADER_STYLE)
        .height(1);

    let rows: Vec<Row> = units
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows)
        .map(|(i, unit)| {
            let mut style = item_style(i == app.selected_unit, is_focused);
            if !unit.is_priced() && i != app.selected_unit {
                style = style.fg(MISSING_COLOR);
            }
            Row::new(vec![
                format!("{}호", unit.unit.unit_number),
                unit.unit.unit_type.clone(),
                unit.unit.floor.to_string(),
                price_cell(unit),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(20),
        Constraint::Percentage(20),
        Constraint::Percentage(15),
        Constraint::Percentage(45),
    ];

    let building = app
        .selected_building()
        .map(|b| format!("{}동", b.id))
        .unwrap_or_default();
    let title = format!(" {} ({} 세대) ", building, units.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel_block(title, is_focused));

    frame.render_widget(table, area);

    if units.len() > visible_rows {
        draw_scrollbar(frame, area, units.len(), app.selected_unit);
    }
}

fn draw_scrollbar(frame: &mut Frame, area: Rect, len: usize, position: usize) {
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .begin_symbol(Some("↑"))
        .end_symbol(Some("↓"));
    let mut scrollbar_state = ScrollbarState::new(len).position(position);

    let scrollbar_area = Rect {
        x: area.x + area.width.saturating_sub(1),
        y: area.y + 2,
        width: 1,
        height: area.height.saturating_sub(3),
    };
    frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
}

fn draw_footer(frame: &mut Frame, area: Rect, help: &str) {
    let footer = Paragraph::new(help)
        .style(Style::default().fg(BRAND_MUTED))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

/// Label/amount rows of a unit's price breakdown.
#[must_use]
pub fn breakdown_rows(unit: &ResolvedUnit) -> Vec<(String, String)> {
    let Some(tier) = &unit.price else {
        return vec![("분양가".to_string(), NO_PRICE_INFO.to_string())];
    };
    let payment = &tier.payment;

    let mut rows = vec![
        ("대지비".to_string(), format_won(tier.land_cost)),
        ("건축비".to_string(), format_won(tier.building_cost)),
        ("부가가치세".to_string(), format_won(tier.vat)),
        ("분양가".to_string(), format_won(tier.total_price)),
        ("1차계약금".to_string(), format_won(payment.contract_first)),
        ("2차계약금".to_string(), format_won(payment.contract_second)),
    ];
    rows.extend(
        payment
            .interim
            .iter()
            .enumerate()
            .map(|(i, amount)| (format!("중도금{}회", i + 1), format_won(*amount))),
    );
    rows.push(("잔금".to_string(), format_won(payment.balance)));
    rows.push(("계약금 합계".to_string(), format_won(payment.contract_total())));
    rows.push(("중도금 합계".to_string(), format_won(payment.interim_total())));
    rows
}

pub fn draw_unit_detail(frame: &mut Frame, app: &App) {
    let Some(unit) = app.selected_unit() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Length(3), // Info
        Constraint::Min(6),    // Breakdown
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    let header = Paragraph::new(format!(
        " {}동 {}호 ",
        unit.unit.building_id, unit.unit.unit_number
    ))
    .style(HEADER_STYLE)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let floor_text = unit
        .price
        .as_ref()
        .map_or("-", |tier| tier.floor_text.as_str());
    let info_text = format!(
        "타입: {}  |  {}층 {}라인  |  방향: {}  |  층구분: {}  |  {}/{}",
        unit.unit.unit_type,
        unit.unit.floor,
        unit.unit.line_number,
        unit.unit.direction.as_deref().unwrap_or("-"),
        floor_text,
        app.selected_unit + 1,
        app.filtered_units().len()
    );
    let info_widget = Paragraph::new(info_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(info_widget, chunks[1]);

    let rows: Vec<Row> = breakdown_rows(unit)
        .into_iter()
        .map(|(label, amount)| Row::new(vec![label, amount]))
        .collect();
    let widths = [Constraint::Percentage(40), Constraint::Percentage(60)];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["항목", "금액 (원)"]).style(HEADER_STYLE))
        .block(Block::default().title(" 공급금액 ").borders(Borders::ALL));
    frame.render_widget(table, chunks[2]);

    draw_footer(
        frame,
        chunks[3],
        " Esc Back | ←→ Previous/Next unit | q Quit ",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PaymentBreakdown, PriceTier, TierScope, Unit};
    use pretty_assertions::assert_eq;

    #[test]
    fn won_amounts_get_thousands_separators() {
        assert_eq!(format_won(0), "0");
        assert_eq!(format_won(999), "999");
        assert_eq!(format_won(1000), "1,000");
        assert_eq!(format_won(500_000_000), "500,000,000");
    }

    #[test]
    fn breakdown_lists_each_installment() {
        let unit = ResolvedUnit {
            unit: Unit::from_unit_number("101", 201, "84A"),
            price: Some(PriceTier {
                unit_type: "84A".to_string(),
                floor_text: "2~5층".to_string(),
                scope: TierScope::Default,
                land_cost: 1,
                building_cost: 2,
                vat: 3,
                total_price: 6,
                payment: PaymentBreakdown {
                    contract_first: 1,
                    contract_second: 1,
                    interim: vec![1, 1],
                    balance: 2,
                },
            }),
        };
        let labels: Vec<String> = breakdown_rows(&unit).into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            labels,
            vec![
                "대지비", "건축비", "부가가치세", "분양가", "1차계약금", "2차계약금", "중도금1회",
                "중도금2회", "잔금", "계약금 합계", "중도금 합계"
            ]
        );

        let mut huge = unit.clone();
        if let Some(tier) = huge.price.as_mut() {
            tier.payment.contract_first = u64::MAX;
            tier.payment.interim = vec![u64::MAX, 1];
        }
        let totals: Vec<String> = breakdown_rows(&huge)
            .into_iter()
            .filter(|(label, _)| label.ends_with("합계"))
            .map(|(_, amount)| amount)
            .collect();
        assert_eq!(totals, vec![format_won(u64::MAX), format_won(u64::MAX)]);

        let unpriced = ResolvedUnit {
            price: None,
            ..unit
        };
        assert_eq!(
            breakdown_rows(&unpriced),
            vec![("분양가".to_string(), NO_PRICE_INFO.to_string())]
        );
    }
}
