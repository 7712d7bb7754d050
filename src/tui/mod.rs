/// Ratatui-based TUI for CityPlan.
///
/// Architecture:
///   main thread:   event loop — crossterm keyboard events + mpsc UiEvent drain
///   request tasks: tokio::spawn — POST to the plan service, send the outcome
///                  back tagged with its dispatch seq
///
/// Layout:
///   ┌────────────────────────────────────────────────┐
///   │  header (1 line)                               │
///   ├────────────────────────────────────────────────┤
///   │  form fields or plan text (Min(0))             │
///   ├────────────────────────────────────────────────┤
///   │  status bar (1 line)                           │
///   ├────────────────────────────────────────────────┤
///   │  key hints (1 line)                            │
///   └────────────────────────────────────────────────┘
pub mod render;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;

use crate::client::{GeneratedPlan, PlanClient, RequestError};
use crate::config::ResolvedConfig;
use crate::controller::{Controller, Dispatch, Navigator, Phase, ResponseDisposition, Route};
use crate::export::{self, SystemClipboard};
use crate::form::{GOAL_CATALOG, SustainabilityGoal};
use crate::notify::Toasts;

// ── UiEvent — typed events from request tasks → TUI ──────────────────────────

#[derive(Debug)]
pub enum UiEvent {
    /// A plan request finished, success or not. The seq routes it to the
    /// dispatch that started it.
    PlanResponse {
        seq: u64,
        outcome: Result<GeneratedPlan, RequestError>,
    },
}

// ── FormField — focus targets in the form view ────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    LandArea,
    Population,
    Zoning,
    Infrastructure,
    Goals,
    Budget,
}

/// Top-to-bottom traversal order of the form.
pub const FIELD_ORDER: [FormField; 6] = [
    FormField::LandArea,
    FormField::Population,
    FormField::Zoning,
    FormField::Infrastructure,
    FormField::Goals,
    FormField::Budget,
];

impl FormField {
    /// All scenario fields are required except the infrastructure list.
    pub fn required(self) -> bool {
        self != Self::Infrastructure
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LandArea => "Land area (acres)",
            Self::Population => "Current population",
            Self::Zoning => "Zoning type",
            Self::Infrastructure => "Existing infrastructure (comma-separated)",
            Self::Goals => "Sustainability goals",
            Self::Budget => "Budget (millions)",
        }
    }

    pub fn next(self) -> Self {
        let idx = FIELD_ORDER.iter().position(|f| *f == self).unwrap_or(0);
        FIELD_ORDER[(idx + 1) % FIELD_ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let idx = FIELD_ORDER.iter().position(|f| *f == self).unwrap_or(0);
        FIELD_ORDER[(idx + FIELD_ORDER.len() - 1) % FIELD_ORDER.len()]
    }
}

// ── AppState ──────────────────────────────────────────────────────────────────

pub struct AppState {
    pub controller: Controller,
    pub toasts: Toasts,
    pub focus: FormField,
    /// Byte offset of the edit cursor within the focused text field
    pub cursor: usize,
    /// Highlighted catalog index when the goals row is focused
    pub goal_cursor: usize,
    /// Lines scrolled down in the plan text
    pub result_scroll: usize,
    /// When the displayed plan was last successfully generated
    pub generated_at: Option<chrono::DateTime<chrono::Local>>,
    /// Incremented every 120ms while a request is in flight
    pub spinner_tick: u32,
    pub profile: String,
    pub endpoint: String,
}

impl AppState {
    pub fn new(resolved: &ResolvedConfig) -> Self {
        Self {
            controller: Controller::new(),
            toasts: Toasts::new(),
            focus: FormField::LandArea,
            cursor: 0,
            goal_cursor: 0,
            result_scroll: 0,
            generated_at: None,
            spinner_tick: 0,
            profile: resolved.profile_name.clone(),
            endpoint: resolved.endpoint.clone(),
        }
    }

    fn apply_event(&mut self, ev: UiEvent) {
        match ev {
            UiEvent::PlanResponse { seq, outcome } => {
                let succeeded = outcome.is_ok();
                let disposition = self.controller.apply_response(seq, outcome, &mut self.toasts);
                if disposition == ResponseDisposition::Applied {
                    self.result_scroll = 0;
                    if succeeded {
                        self.generated_at = Some(chrono::Local::now());
                    }
                }
            }
        }
    }

    fn field_value(&self) -> &str {
        let form = self.controller.form();
        match self.focus {
            FormField::LandArea => form.land_area(),
            FormField::Population => form.population(),
            FormField::Zoning => form.zoning(),
            FormField::Infrastructure => form.infrastructure(),
            FormField::Budget => form.budget(),
            FormField::Goals => "",
        }
    }

    fn set_field_value(&mut self, value: String) {
        let form = self.controller.form_mut();
        match self.focus {
            FormField::LandArea => form.set_land_area(value),
            FormField::Population => form.set_population(value),
            FormField::Zoning => form.set_zoning(value),
            FormField::Infrastructure => form.set_infrastructure(value),
            FormField::Budget => form.set_budget(value),
            FormField::Goals => {}
        }
    }

    fn focus_field(&mut self, field: FormField) {
        self.focus = field;
        self.cursor = self.field_value().len();
    }

    fn insert_char(&mut self, c: char) {
        if self.focus == FormField::Goals {
            return;
        }
        let mut value = self.field_value().to_string();
        let at = self.cursor.min(value.len());
        value.insert(at, c);
        self.cursor = at + c.len_utf8();
        self.set_field_value(value);
    }

    fn delete_char_before_cursor(&mut self) {
        if self.focus == FormField::Goals || self.cursor == 0 {
            return;
        }
        let mut value = self.field_value().to_string();
        let at = self.cursor.min(value.len());
        if let Some((prev, _)) = value[..at].char_indices().next_back() {
            value.remove(prev);
            self.cursor = prev;
            self.set_field_value(value);
        }
    }

    fn move_cursor_left(&mut self) {
        let value = self.field_value();
        if let Some((i, _)) = value[..self.cursor.min(value.len())].char_indices().next_back() {
            self.cursor = i;
        }
    }

    fn move_cursor_right(&mut self) {
        let value = self.field_value();
        let at = self.cursor.min(value.len());
        if let Some(c) = value[at..].chars().next() {
            self.cursor = at + c.len_utf8();
        }
    }

    fn highlighted_goal(&self) -> SustainabilityGoal {
        GOAL_CATALOG[self.goal_cursor % GOAL_CATALOG.len()]
    }

    /// Scroll the result view down, stopping at the last plan line.
    fn scroll_result_down(&mut self, by: usize) {
        let max = self
            .controller
            .plan_text()
            .lines()
            .count()
            .saturating_sub(1);
        self.result_scroll = (self.result_scroll + by).min(max);
    }
}

// ── Navigation ────────────────────────────────────────────────────────────────

/// The TUI's only other route is "not here" — cancel quits the app.
#[derive(Default)]
struct ExitNavigator {
    left: bool,
}

impl Navigator for ExitNavigator {
    fn go_to(&mut self, _route: Route) {
        self.left = true;
    }
}

// ── Terminal setup / teardown ─────────────────────────────────────────────────

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) {
    let _ = disable_raw_mode();
    let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let _ = terminal.show_cursor();
}

// ── Main TUI run loop ─────────────────────────────────────────────────────────

pub async fn run(resolved: ResolvedConfig) -> Result<()> {
    let mut terminal = setup_terminal()?;

    // Panic hook — restore terminal before printing panic
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        orig_hook(info);
    }));

    let result = event_loop(&mut terminal, resolved).await;

    restore_terminal(&mut terminal);
    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    resolved: ResolvedConfig,
) -> Result<()> {
    let client = Arc::new(PlanClient::new(resolved.endpoint.clone(), resolved.timeout)?);
    let mut state = AppState::new(&resolved);

    // Channel: request tasks → TUI
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel::<UiEvent>();

    let mut crossterm_events = EventStream::new();
    let mut ticker = tokio::time::interval(tokio::time::Duration::from_millis(120));

    terminal.draw(|f| render::draw(f, &state))?;

    loop {
        tokio::select! {
            // ── Animation tick ────────────────────────────────────────────────
            _ = ticker.tick() => {
                state.toasts.prune();
                if state.controller.request_in_flight() {
                    state.spinner_tick = state.spinner_tick.wrapping_add(1);
                }
                terminal.draw(|f| render::draw(f, &state))?;
            }

            // ── Drain request outcomes ────────────────────────────────────────
            Some(ev) = ui_rx.recv() => {
                state.apply_event(ev);
                terminal.draw(|f| render::draw(f, &state))?;
            }

            // ── Keyboard/resize events ────────────────────────────────────────
            Some(Ok(ev)) = crossterm_events.next() => {
                match ev {
                    Event::Key(key) => {
                        let keep = handle_key(key, &mut state, &client, &ui_tx);
                        if !keep { break; }
                    }
                    Event::Resize(_, _) => {}
                    _ => {}
                }
                terminal.draw(|f| render::draw(f, &state))?;
            }
        }
    }

    Ok(())
}

/// Spawn the HTTP call for a dispatch; the outcome comes back through the
/// channel tagged with the dispatch seq.
fn launch_request(
    client: &Arc<PlanClient>,
    dispatch: Dispatch,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) {
    let client = Arc::clone(client);
    let tx = ui_tx.clone();
    tokio::spawn(async move {
        let outcome = client.submit(&dispatch.request).await;
        let _ = tx.send(UiEvent::PlanResponse {
            seq: dispatch.seq,
            outcome,
        });
    });
}

// ── Key handler ───────────────────────────────────────────────────────────────

fn handle_key(
    key: KeyEvent,
    state: &mut AppState,
    client: &Arc<PlanClient>,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) -> bool {
    // Ctrl+C / Ctrl+Q quit from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        return false;
    }

    match state.controller.phase() {
        Phase::AwaitingInput => handle_form_key(key, state, client, ui_tx),
        // A submit is pending — the form is frozen until the response lands
        Phase::Submitting => true,
        Phase::ShowingResult => handle_result_key(key, state, client, ui_tx),
    }
}

fn handle_form_key(
    key: KeyEvent,
    state: &mut AppState,
    client: &Arc<PlanClient>,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) -> bool {
    match key.code {
        KeyCode::Tab | KeyCode::Down => {
            state.focus_field(state.focus.next());
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.focus_field(state.focus.prev());
        }
        KeyCode::Enter => {
            if let Some(dispatch) = state.controller.submit(&mut state.toasts) {
                state.spinner_tick = 0;
                launch_request(client, dispatch, ui_tx);
            }
        }
        KeyCode::Esc => {
            let mut nav = ExitNavigator::default();
            if state.controller.cancel(&mut nav) && nav.left {
                return false;
            }
        }
        KeyCode::Left if state.focus == FormField::Goals => {
            state.goal_cursor =
                (state.goal_cursor + GOAL_CATALOG.len() - 1) % GOAL_CATALOG.len();
        }
        KeyCode::Right if state.focus == FormField::Goals => {
            state.goal_cursor = (state.goal_cursor + 1) % GOAL_CATALOG.len();
        }
        KeyCode::Char(' ') if state.focus == FormField::Goals => {
            let goal = state.highlighted_goal();
            state.controller.form_mut().toggle_goal(goal);
        }
        KeyCode::Left => state.move_cursor_left(),
        KeyCode::Right => state.move_cursor_right(),
        KeyCode::Backspace => state.delete_char_before_cursor(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.insert_char(c);
        }
        _ => {}
    }
    true
}

fn handle_result_key(
    key: KeyEvent,
    state: &mut AppState,
    client: &Arc<PlanClient>,
    ui_tx: &mpsc::UnboundedSender<UiEvent>,
) -> bool {
    match key.code {
        KeyCode::Char('r') => {
            if let Some(dispatch) = state.controller.regenerate(&mut state.toasts) {
                state.spinner_tick = 0;
                launch_request(client, dispatch, ui_tx);
            }
        }
        KeyCode::Char('c') => {
            let plan_text = state.controller.plan_text().to_string();
            match SystemClipboard::new() {
                Ok(mut clipboard) => {
                    export::copy_plan(&plan_text, &mut clipboard, &mut state.toasts);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "clipboard unavailable");
                    export::copy_plan(&plan_text, &mut FailedClipboard, &mut state.toasts);
                }
            }
        }
        KeyCode::Char('n') => {
            state.controller.new_form();
            state.focus_field(FormField::LandArea);
            state.goal_cursor = 0;
            state.result_scroll = 0;
            state.generated_at = None;
        }
        KeyCode::Up => {
            state.result_scroll = state.result_scroll.saturating_sub(1);
        }
        KeyCode::Down => {
            state.scroll_result_down(1);
        }
        KeyCode::PageUp => {
            state.result_scroll = state.result_scroll.saturating_sub(10);
        }
        KeyCode::PageDown => {
            state.scroll_result_down(10);
        }
        _ => {}
    }
    true
}

/// Sink used when the OS clipboard cannot even be opened, so the failed
/// copy is reported through the same path as a failed write.
struct FailedClipboard;

impl export::ClipboardSink for FailedClipboard {
    fn set_text(&mut self, _text: &str) -> anyhow::Result<()> {
        anyhow::bail!("clipboard unavailable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, ResolvedConfig};

    fn state() -> AppState {
        let resolved = ResolvedConfig::resolve(&ConfigFile::default(), None, None, None);
        AppState::new(&resolved)
    }

    #[test]
    fn test_field_order_cycles_both_ways() {
        assert_eq!(FormField::LandArea.next(), FormField::Population);
        assert_eq!(FormField::Budget.next(), FormField::LandArea);
        assert_eq!(FormField::LandArea.prev(), FormField::Budget);
        assert_eq!(FormField::Goals.prev(), FormField::Infrastructure);
    }

    #[test]
    fn test_insert_and_delete_edit_the_focused_field() {
        let mut s = state();
        s.focus_field(FormField::Zoning);
        for c in "mixed".chars() {
            s.insert_char(c);
        }
        assert_eq!(s.controller.form().zoning(), "mixed");

        s.delete_char_before_cursor();
        assert_eq!(s.controller.form().zoning(), "mixe");
        assert_eq!(s.cursor, 4);
    }

    #[test]
    fn test_cursor_moves_by_char_not_byte() {
        let mut s = state();
        s.focus_field(FormField::Zoning);
        s.insert_char('é');
        s.insert_char('x');
        s.move_cursor_left();
        s.move_cursor_left();
        assert_eq!(s.cursor, 0);
        s.move_cursor_right();
        assert_eq!(s.cursor, 'é'.len_utf8());
    }

    #[test]
    fn test_focus_change_snaps_cursor_to_field_end() {
        let mut s = state();
        s.controller.form_mut().set_land_area("1200");
        s.focus_field(FormField::LandArea);
        assert_eq!(s.cursor, 4);
        s.focus_field(FormField::Zoning);
        assert_eq!(s.cursor, 0);
    }

    #[test]
    fn test_result_scroll_stops_at_last_plan_line() {
        let mut s = state();
        let form = s.controller.form_mut();
        form.set_land_area("12");
        form.set_population("5000");
        form.set_zoning("residential");
        form.toggle_goal(SustainabilityGoal::PromoteGreenSpaces);
        form.set_budget("10");

        let dispatch = s.controller.submit(&mut s.toasts).unwrap();
        s.apply_event(UiEvent::PlanResponse {
            seq: dispatch.seq,
            outcome: Ok(GeneratedPlan {
                text: "one\ntwo\nthree".to_string(),
                sustainability_score: None,
            }),
        });

        s.scroll_result_down(1);
        s.scroll_result_down(10);
        assert_eq!(s.result_scroll, 2);

        // An empty plan never scrolls
        s.controller.new_form();
        s.result_scroll = 0;
        s.scroll_result_down(5);
        assert_eq!(s.result_scroll, 0);
    }

    #[test]
    fn test_goals_row_ignores_text_editing() {
        let mut s = state();
        s.focus_field(FormField::Goals);
        s.insert_char('x');
        s.delete_char_before_cursor();
        assert!(s.controller.form().goals().is_empty());
    }
}
