use crate::model::{group_by_building, Building, ResolvedUnit};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Dashboard,
    UnitDetail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusPanel {
    Types,
    Buildings,
    Units,
}

pub struct App {
    pub title: String,
    pub buildings: Vec<Building>,
    /// Distinct unit types in first-seen order.
    pub unit_types: Vec<String>,
    pub view: View,
    pub focus_panel: FocusPanel,
    pub selected_type: usize, // 0 = "All", 1+ = unit_types index
    pub selected_building: usize,
    pub selected_unit: usize,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(title: impl Into<String>, units: &[ResolvedUnit]) -> Self {
        let mut unit_types: Vec<String> = Vec::new();
        for unit in units {
            if !unit_types.contains(&unit.unit.unit_type) {
                unit_types.push(unit.unit.unit_type.clone());
            }
        }

        Self {
            title: title.into(),
            buildings: group_by_building(units),
            unit_types,
            view: View::Dashboard,
            focus_panel: FocusPanel::Buildings,
            selected_type: 0,
            selected_building: 0,
            selected_unit: 0,
            should_quit: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => super::dashboard::draw_dashboard(frame, self),
            View::UnitDetail => super::dashboard::draw_unit_detail(frame, self),
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                self.handle_key(key.code);
            }
        }
        Ok(())
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        match self.view {
            View::Dashboard => self.handle_dashboard_keys(code),
            View::UnitDetail => self.handle_detail_keys(code),
        }
    }

    fn handle_dashboard_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.navigate_down(),
            KeyCode::Left | KeyCode::Char('h') => self.navigate_left(),
            KeyCode::Right | KeyCode::Char('l') => self.navigate_right(),
            KeyCode::Enter => self.enter_unit_detail(),
            _ => {}
        }
    }

    fn handle_detail_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Enter => self.view = View::Dashboard,
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Up | KeyCode::Char('k') => {
                self.previous_unit_in_detail();
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Down | KeyCode::Char('j') => {
                self.next_unit_in_detail();
            }
            _ => {}
        }
    }

    fn navigate_up(&mut self) {
        match self.focus_panel {
            FocusPanel::Types => {
                if self.selected_type > 0 {
                    self.selected_type -= 1;
                    self.selected_unit = 0;
                }
            }
            FocusPanel::Buildings => {
                if self.selected_building > 0 {
                    self.selected_building -= 1;
                    self.selected_unit = 0;
                }
            }
            FocusPanel::Units => self.selected_unit = self.selected_unit.saturating_sub(1),
        }
    }

    fn navigate_down(&mut self) {
        match self.focus_panel {
            FocusPanel::Types => {
                if self.selected_type < self.unit_types.len() {
                    self.selected_type += 1;
                    self.selected_unit = 0;
                }
            }
            FocusPanel::Buildings => {
                if self.selected_building < self.buildings.len().saturating_sub(1) {
                    self.selected_building += 1;
                    self.selected_unit = 0;
                }
            }
            FocusPanel::Units => {
                if self.selected_unit < self.filtered_units().len().saturating_sub(1) {
                    self.selected_unit += 1;
                }
            }
        }
    }

    fn navigate_left(&mut self) {
        match self.focus_panel {
            FocusPanel::Units => self.focus_panel = FocusPanel::Buildings,
            FocusPanel::Buildings => self.focus_panel = FocusPanel::Types,
            FocusPanel::Types => {}
        }
    }

    fn navigate_right(&mut self) {
        match self.focus_panel {
            FocusPanel::Types => self.focus_panel = FocusPanel::Buildings,
            FocusPanel::Buildings => self.focus_panel = FocusPanel::Units,
            FocusPanel::Units => {}
        }
    }

    fn enter_unit_detail(&mut self) {
        if self.focus_panel == FocusPanel::Units && self.selected_unit().is_some() {
            self.view = View::UnitDetail;
        }
    }

    fn previous_unit_in_detail(&mut self) {
        let count = self.filtered_units().len();
        if count == 0 {
            return;
        }
        self.selected_unit = if self.selected_unit > 0 {
            self.selected_unit - 1
        } else {
            count - 1
        };
    }

    fn next_unit_in_detail(&mut self) {
        let count = self.filtered_units().len();
        if count == 0 {
            return;
        }
        self.selected_unit = if self.selected_unit + 1 < count {
            self.selected_unit + 1
        } else {
            0
        };
    }

    /// Unit type filter, `None` for "All".
    #[must_use]
    pub fn selected_type_name(&self) -> Option<&str> {
        self.selected_type
            .checked_sub(1)
            .and_then(|i| self.unit_types.get(i))
            .map(String::as_str)
    }

    #[must_use]
    pub fn selected_building(&self) -> Option<&Building> {
        self.buildings.get(self.selected_building)
    }

    /// Units of the selected building, narrowed by the type filter.
    #[must_use]
    pub fn filtered_units(&self) -> Vec<&ResolvedUnit> {
        let Some(building) = self.selected_building() else {
            return Vec::new();
        };
        let unit_type = self.selected_type_name();
        building
            .units
            .iter()
            .filter(|u| unit_type.is_none_or(|t| u.unit.unit_type == t))
            .collect()
    }

    #[must_use]
    pub fn selected_unit(&self) -> Option<&ResolvedUnit> {
        self.filtered_units().get(self.selected_unit).copied()
    }

    /// (priced, total) for a building under the current type filter.
    #[must_use]
    pub fn filtered_counts(&self, building: &Building) -> (usize, usize) {
        let unit_type = self.selected_type_name();
        building
            .units
            .iter()
            .filter(|u| unit_type.is_none_or(|t| u.unit.unit_type == t))
            .fold((0, 0), |(priced, total), u| {
                (priced + usize::from(u.is_priced()), total + 1)
            })
    }

    #[must_use]
    pub fn total_units(&self) -> usize {
        self.buildings.iter().map(|b| b.units.len()).sum()
    }

    #[must_use]
    pub fn priced_units(&self) -> usize {
        self.buildings.iter().map(Building::priced_count).sum()
    }
}
