use crate::error::ValidationError;
use crate::ranking::RankedTech;
use crate::ratings::{parse_score, Rating};
use crate::session::Session;
use crate::tui::theme::ThemeColors;
use ratatui::widgets::{ListState, TableState};
use std::time::Instant;

const FLASH_SECS: u64 = 3;
const MAX_SCORE_DIGITS: usize = 2;

/// Labels shown in the form, in field order
pub const FORM_LABELS: [&str; 3] = ["Responsiveness", "Quality of work", "Timeliness"];
const FORM_FIELDS: [&str; 3] = ["responsiveness", "quality_of_work", "timeliness"];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pane {
    Sites,
    Technicians,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    RatingForm,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlashKind {
    Info,
    Success,
    Error,
}

/// The three score inputs being edited
#[derive(Debug, Clone, Default)]
pub struct RatingForm {
    pub values: [String; 3],
    pub focus: usize,
    pub error: Option<String>,
}

impl RatingForm {
    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FORM_LABELS.len();
    }

    pub fn previous_field(&mut self) {
        self.focus = (self.focus + FORM_LABELS.len() - 1) % FORM_LABELS.len();
    }

    /// Digits only; scores never need more than two
    pub fn push_char(&mut self, c: char) {
        let value = &mut self.values[self.focus];
        if c.is_ascii_digit() && value.len() < MAX_SCORE_DIGITS {
            value.push(c);
            self.error = None;
        }
    }

    pub fn backspace(&mut self) {
        self.values[self.focus].pop();
        self.error = None;
    }

    /// Parse all three fields, focusing the first bad one
    pub fn parse(&mut self) -> Result<[i64; 3], ValidationError> {
        let mut scores = [0i64; 3];
        for (i, field) in FORM_FIELDS.iter().enumerate() {
            match parse_score(field, &self.values[i]) {
                Ok(score) => scores[i] = score as i64,
                Err(e) => {
                    self.focus = i;
                    return Err(e);
                }
            }
        }
        Ok(scores)
    }
}

pub struct App {
    pub session: Session,
    pub label_index: usize,
    pub sites: Vec<String>,
    pub site_state: ListState,
    pub ranking: Vec<RankedTech>,
    pub ranking_error: Option<String>,
    pub tech_state: TableState,
    pub focus: Pane,
    pub input_mode: InputMode,
    pub form: RatingForm,
    pub flash_message: Option<(String, Instant, FlashKind)>,
    pub should_quit: bool,
    pub theme: ThemeColors,
}

impl App {
    pub fn new(session: Session, theme: ThemeColors) -> Self {
        let sites = session.sites();
        let mut site_state = ListState::default();
        if !sites.is_empty() {
            site_state.select(Some(0));
        }

        let mut app = Self {
            session,
            label_index: 0,
            sites,
            site_state,
            ranking: Vec::new(),
            ranking_error: None,
            tech_state: TableState::default(),
            focus: Pane::Sites,
            input_mode: InputMode::Normal,
            form: RatingForm::default(),
            flash_message: None,
            should_quit: false,
            theme,
        };
        app.refresh_ranking();
        app
    }

    pub fn current_label(&self) -> &str {
        self.session
            .labels()
            .get(self.label_index)
            .map(String::as_str)
            .unwrap_or_else(|| self.session.config().default_label())
    }

    pub fn selected_site(&self) -> Option<&str> {
        self.site_state
            .selected()
            .and_then(|i| self.sites.get(i))
            .map(String::as_str)
    }

    pub fn selected_tech(&self) -> Option<&RankedTech> {
        self.tech_state.selected().and_then(|i| self.ranking.get(i))
    }

    /// Ratings of the selected technician, oldest first
    pub fn selected_history(&self) -> &[Rating] {
        match (self.selected_site(), self.selected_tech()) {
            (Some(site), Some(tech)) => self
                .session
                .history(self.current_label(), site, &tech.name)
                .unwrap_or(&[]),
            _ => &[],
        }
    }

    /// Recompute the ranking for the selected site, keeping the same
    /// technician selected when they are still listed
    pub fn refresh_ranking(&mut self) {
        let previous = self.selected_tech().map(|t| t.name.clone());

        let Some(site) = self.selected_site().map(str::to_string) else {
            self.ranking.clear();
            self.ranking_error = None;
            self.tech_state.select(None);
            return;
        };

        match self.session.ranking(self.current_label(), &site) {
            Ok(ranking) => {
                self.ranking = ranking;
                self.ranking_error = None;
            }
            Err(e) => {
                self.ranking.clear();
                self.ranking_error = Some(e.to_string());
            }
        }

        let index = previous
            .and_then(|name| self.ranking.iter().position(|t| t.name == name))
            .or(if self.ranking.is_empty() { None } else { Some(0) });
        self.tech_state.select(index);
    }

    pub fn next_row(&mut self) {
        match self.focus {
            Pane::Sites => {
                if let Some(i) = wrap_next(self.site_state.selected(), self.sites.len()) {
                    self.site_state.select(Some(i));
                    self.tech_state.select(None);
                    self.refresh_ranking();
                }
            }
            Pane::Technicians => {
                if let Some(i) = wrap_next(self.tech_state.selected(), self.ranking.len()) {
                    self.tech_state.select(Some(i));
                }
            }
        }
    }

    pub fn previous_row(&mut self) {
        match self.focus {
            Pane::Sites => {
                if let Some(i) = wrap_previous(self.site_state.selected(), self.sites.len()) {
                    self.site_state.select(Some(i));
                    self.tech_state.select(None);
                    self.refresh_ranking();
                }
            }
            Pane::Technicians => {
                if let Some(i) = wrap_previous(self.tech_state.selected(), self.ranking.len()) {
                    self.tech_state.select(Some(i));
                }
            }
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Sites => Pane::Technicians,
            Pane::Technicians => Pane::Sites,
        };
    }

    pub fn cycle_label(&mut self) {
        let count = self.session.labels().len();
        if count > 1 {
            self.label_index = (self.label_index + 1) % count;
            self.refresh_ranking();
            self.show_flash(format!("Label: {}", self.current_label()), FlashKind::Info);
        }
    }

    /// Open the rating form for the selected technician
    pub fn start_rating(&mut self) {
        if self.selected_tech().is_none() {
            return;
        }
        if self.session.store().is_read_only() {
            self.show_flash(
                "Ratings are read-only: the store could not be loaded".to_string(),
                FlashKind::Error,
            );
            return;
        }
        self.form = RatingForm::default();
        self.input_mode = InputMode::RatingForm;
    }

    /// Validate and submit the form. Validation problems keep the form open.
    pub fn confirm_rating(&mut self) {
        let scores = match self.form.parse() {
            Ok(scores) => scores,
            Err(e) => {
                self.form.error = Some(e.to_string());
                return;
            }
        };

        let (site, name) = match (self.selected_site(), self.selected_tech()) {
            (Some(site), Some(tech)) => (site.to_string(), tech.name.clone()),
            _ => {
                self.input_mode = InputMode::Normal;
                return;
            }
        };
        let label = self.current_label().to_string();

        let result = self
            .session
            .submit(&label, &site, &name, scores[0], scores[1], scores[2]);
        self.input_mode = InputMode::Normal;
        match result {
            Ok(rating) => {
                self.refresh_ranking();
                self.show_flash(
                    format!("Rated {}: {:.2}", name, rating.average),
                    FlashKind::Success,
                );
            }
            Err(e) => self.show_flash(format!("Rating not saved: {}", e), FlashKind::Error),
        }
    }

    pub fn cancel_rating(&mut self) {
        self.input_mode = InputMode::Normal;
        self.form = RatingForm::default();
    }

    /// Re-read the store, picking up ratings written by other processes
    pub fn reload(&mut self) {
        match self.session.reload() {
            Ok(()) => {
                self.refresh_ranking();
                self.show_flash("Reloaded ratings".to_string(), FlashKind::Success);
            }
            Err(e) => self.show_flash(format!("Reload failed: {}", e), FlashKind::Error),
        }
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_flash(&mut self, msg: String, kind: FlashKind) {
        self.flash_message = Some((msg, Instant::now(), kind));
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp, _)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= FLASH_SECS {
                self.flash_message = None;
            }
        }
    }
}

fn wrap_next(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(i) if i + 1 < len => i + 1,
        _ => 0,
    })
}

fn wrap_previous(selected: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match selected {
        Some(0) | None => len - 1,
        Some(i) => i - 1,
    })
}
