// TUI application state
//
// Holds the current route and its screen state, the request runner, and the
// overlay state (modal, toast). Screens decide what to fetch and where to go;
// the app carries those effects out.

use super::components::toast::Toast;
use super::input::{is_editing_key, KeyDebouncer};
use super::modal::{ConfirmAction, Modal};
use super::tasks::{Tagged, TaskRunner};
use crate::api::models::{Car, Event, Part, PartType};
use crate::logging::LogBuffer;
use crate::screens::assignment::Assignment;
use crate::screens::car_detail::CarDetail;
use crate::screens::catalog::Catalog;
use crate::screens::forms::{EditScreen, EntityKind};
use crate::screens::history::{HistorySubject, HistoryView};
use crate::screens::mileage::MileageForm;
use crate::screens::{Effect, NoticeLevel, Outcome, Request, Screen};
use crate::theme::Theme;
use std::time::Instant;

/// State of whichever screen is mounted
#[derive(Debug, Clone)]
pub enum ScreenState {
    Cars(Catalog<Car>),
    Parts(Catalog<Part>),
    PartTypes(Catalog<PartType>),
    Events(Catalog<Event>),
    Mileage(MileageForm),
    Edit(EditScreen),
    History(HistoryView),
    CarDetail(CarDetail),
    Assignment(Assignment),
}

impl ScreenState {
    /// Fresh, unloaded state for a route
    pub fn for_route(route: Screen) -> Self {
        match route {
            Screen::Home => Self::Cars(Catalog::new()),
            Screen::Parts => Self::Parts(Catalog::new()),
            Screen::PartTypes => Self::PartTypes(Catalog::new()),
            Screen::Events => Self::Events(Catalog::new()),
            Screen::Mileage => Self::Mileage(MileageForm::new()),
            Screen::CarDetail(id) => Self::CarDetail(CarDetail::new(id)),
            Screen::CarForm(id) => Self::Edit(EditScreen::new(EntityKind::Car, id)),
            Screen::PartForm(id) => Self::Edit(EditScreen::new(EntityKind::Part, id)),
            Screen::PartTypeForm(id) => Self::Edit(EditScreen::new(EntityKind::PartType, id)),
            Screen::EventForm(id) => Self::Edit(EditScreen::new(EntityKind::Event, id)),
            Screen::EventAssign(id) => Self::Assignment(Assignment::new(id)),
            Screen::PartHistory(id) => Self::History(HistoryView::new(HistorySubject::Part(id))),
            Screen::CarHistory(id) => Self::History(HistoryView::new(HistorySubject::Car(id))),
        }
    }

    pub fn mount(&self) -> Vec<Request> {
        match self {
            Self::Cars(c) => c.mount(),
            Self::Parts(c) => c.mount(),
            Self::PartTypes(c) => c.mount(),
            Self::Events(c) => c.mount(),
            Self::Mileage(m) => m.mount(),
            Self::Edit(e) => e.mount(),
            Self::History(h) => h.mount(),
            Self::CarDetail(d) => d.mount(),
            Self::Assignment(a) => a.mount(),
        }
    }

    pub fn apply(&mut self, outcome: Outcome) -> Vec<Effect> {
        match self {
            Self::Cars(c) => c.apply(outcome),
            Self::Parts(c) => c.apply(outcome),
            Self::PartTypes(c) => c.apply(outcome),
            Self::Events(c) => c.apply(outcome),
            Self::Mileage(m) => m.apply(outcome),
            Self::Edit(e) => e.apply(outcome),
            Self::History(h) => h.apply(outcome),
            Self::CarDetail(d) => {
                d.apply(outcome);
                Vec::new()
            }
            Self::Assignment(a) => a.apply(outcome),
        }
    }

    /// Screens where letters are typed into fields rather than used as shortcuts
    pub fn takes_text(&self) -> bool {
        matches!(self, Self::Edit(_) | Self::Mileage(_))
    }
}

/// Main application state for the TUI
pub struct App {
    pub route: Screen,
    pub screen: ScreenState,
    pub runner: TaskRunner,

    /// Active modal overlay, captures all input
    pub modal: Option<Modal>,
    pub toast: Option<Toast>,

    pub log_buffer: LogBuffer,
    pub theme: Theme,

    /// `/` was pressed on a catalog; typed characters go to the filter
    pub filter_editing: bool,

    pub should_quit: bool,

    keys: KeyDebouncer,
    started: Instant,
}

impl App {
    pub fn new(runner: TaskRunner, log_buffer: LogBuffer, theme: Theme) -> Self {
        Self {
            route: Screen::Home,
            screen: ScreenState::for_route(Screen::Home),
            runner,
            modal: None,
            toast: None,
            log_buffer,
            theme,
            filter_editing: false,
            should_quit: false,
            keys: KeyDebouncer::new(),
            started: Instant::now(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation and effects
    // ─────────────────────────────────────────────────────────────────────────

    /// Mount a screen: drop the old one's requests and fetch for the new one
    pub fn navigate(&mut self, route: Screen) {
        tracing::info!(screen = %route.title(), "Navigate");
        self.runner.begin_screen();
        self.route = route;
        self.screen = ScreenState::for_route(route);
        self.filter_editing = false;
        self.modal = None;
        for request in self.screen.mount() {
            self.runner.spawn(request);
        }
    }

    /// Esc: leave for the parent screen
    pub fn go_back(&mut self) {
        if self.route != Screen::Home {
            self.navigate(self.route.parent());
        }
    }

    /// A request finished; hand it to the screen if it is still current
    pub fn receive(&mut self, tagged: Tagged) {
        let stale_failure = match &tagged.outcome {
            Outcome::Done(_, Err(err)) if tagged.generation != self.runner.generation() => {
                Some(err.user_message())
            }
            _ => None,
        };
        if let Some(outcome) = self.runner.accept(tagged) {
            let effects = self.screen.apply(outcome);
            self.apply_effects(effects);
        } else if let Some(message) = stale_failure {
            // The screen that asked is gone; the operator still needs to know
            self.apply_effects(vec![Effect::warn(format!("Earlier change failed: {}", message))]);
        }
    }

    pub fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Fetch(request) => self.runner.spawn(request),
                Effect::Navigate(route) => self.navigate(route),
                Effect::Notify(level, text) => {
                    match level {
                        NoticeLevel::Info => tracing::info!("{}", text),
                        NoticeLevel::Warn => tracing::warn!("{}", text),
                    }
                    self.toast = Some(Toast::new(text, level));
                }
            }
        }
    }

    /// Carry out a confirmed modal action
    pub fn confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::Fetch(request) => self.runner.spawn(request),
            ConfirmAction::ClearHistory => {
                if let ScreenState::History(history) = &mut self.screen {
                    let effects = history.clear();
                    self.apply_effects(effects);
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input state
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether letters should be typed rather than treated as shortcuts
    pub fn text_entry(&self) -> bool {
        self.filter_editing || self.screen.takes_text()
    }

    /// Whether a key press should act; typing into a field always does
    pub fn handle_key_press(&mut self, key: crossterm::event::KeyCode) -> bool {
        if self.text_entry() && is_editing_key(key) {
            return true;
        }
        self.keys.press(key, Instant::now())
    }

    pub fn handle_key_release(&mut self, key: crossterm::event::KeyCode) {
        self.keys.release(key);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Overlays
    // ─────────────────────────────────────────────────────────────────────────

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message, NoticeLevel::Info));
    }

    pub fn clear_expired_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.started.elapsed().as_millis()
    }

    /// Keys worth showing in the status bar for the current screen
    pub fn key_hints(&self) -> &'static str {
        if self.filter_editing {
            return "type to filter · Enter/Esc done";
        }
        match &self.screen {
            ScreenState::Events(_) => "/ filter · n new · a vehicles · d delete · ? help",
            ScreenState::Cars(_) | ScreenState::Parts(_) => {
                "/ filter · 1-3 sort · n new · H history · d delete · ? help"
            }
            ScreenState::PartTypes(_) => "/ filter · 1-3 sort · n new · d delete · ? help",
            ScreenState::Mileage(_) => "Tab field · Space flag · Enter submit · Esc back",
            ScreenState::Edit(_) => "Tab field · ←/→ choose · Enter save · Esc back",
            ScreenState::History(_) => "c clear · y copy · Esc back",
            ScreenState::CarDetail(_) => "Enter edit part · E edit · H history · Esc back",
            ScreenState::Assignment(_) => "Space select · a attach · x detach · Esc back",
        }
    }

    /// Time since startup, for the status bar
    pub fn uptime(&self) -> String {
        let secs = self.started.elapsed().as_secs();
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if h > 0 {
            format!("{}h{:02}m", h, m)
        } else {
            format!("{}m{:02}s", m, s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FleetClient;
    use crate::screens::Mutation;
    use tokio::sync::mpsc;

    fn app() -> (App, mpsc::Receiver<Tagged>) {
        let (tx, rx) = mpsc::channel(16);
        // Nothing listens here; requests fail fast as network errors
        let client = FleetClient::new("http://127.0.0.1:9", None).unwrap();
        let runner = TaskRunner::new(client, tx);
        (App::new(runner, LogBuffer::new(), Theme::default()), rx)
    }

    #[tokio::test]
    async fn navigating_drops_results_of_the_old_screen() {
        let (mut app, mut rx) = app();
        app.navigate(Screen::Parts);
        let late = rx.recv().await.unwrap();

        app.navigate(Screen::PartTypes);
        app.receive(late);

        // The parts failure never reached the part-types catalog
        match &app.screen {
            ScreenState::PartTypes(catalog) => assert!(catalog.rows.is_loading()),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_load_is_applied_to_current_screen() {
        let (mut app, mut rx) = app();
        app.navigate(Screen::Events);
        let tagged = rx.recv().await.unwrap();
        app.receive(tagged);

        match &app.screen {
            ScreenState::Events(catalog) => assert!(catalog.rows.error().is_some()),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[tokio::test]
    async fn effects_navigate_and_notify() {
        let (mut app, _rx) = app();
        app.navigate(Screen::CarForm(None));
        assert!(app.text_entry());

        app.apply_effects(vec![Effect::info("Vehicle added"), Effect::Navigate(Screen::Home)]);
        assert_eq!(app.route, Screen::Home);
        assert!(!app.text_entry());
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some("Vehicle added"));
    }

    #[tokio::test]
    async fn esc_returns_to_parent() {
        let (mut app, _rx) = app();
        app.navigate(Screen::PartHistory(3));
        app.go_back();
        assert_eq!(app.route, Screen::Parts);

        // Home has no parent to go to
        app.navigate(Screen::Home);
        let generation = app.runner.generation();
        app.go_back();
        assert_eq!(app.runner.generation(), generation);
    }

    #[tokio::test]
    async fn confirmed_history_clear_goes_through_screen() {
        let (mut app, _rx) = app();
        app.navigate(Screen::CarHistory(2));
        app.confirm(ConfirmAction::ClearHistory);

        // A second confirm while the first is pending does nothing
        let in_flight = app.runner.in_flight();
        app.confirm(ConfirmAction::ClearHistory);
        assert!(app.runner.in_flight() <= in_flight);

        app.receive(Tagged {
            generation: app.runner.generation(),
            outcome: Outcome::Done(Mutation::HistoryCleared, Ok(())),
        });
        match &app.screen {
            ScreenState::History(view) => assert_eq!(view.records.ready().map(Vec::len), Some(0)),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[tokio::test]
    async fn confirmed_delete_survives_navigation_and_reports_failure() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/delete-car/1"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({"error": "locked"}))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (tx, mut rx) = mpsc::channel(16);
        let client = FleetClient::new(&server.uri(), None).unwrap();
        let mut app = App::new(TaskRunner::new(client, tx), LogBuffer::new(), Theme::default());

        app.navigate(Screen::Home);
        app.confirm(ConfirmAction::Fetch(Request::DeleteCar(1)));
        app.navigate(Screen::Parts);

        let deadline = std::time::Duration::from_secs(5);
        loop {
            let tagged = tokio::time::timeout(deadline, rx.recv()).await.unwrap().unwrap();
            let done = matches!(tagged.outcome, Outcome::Done(..));
            app.receive(tagged);
            if done {
                break;
            }
        }

        let deletes = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .filter(|r| r.method.as_str() == "DELETE")
            .count();
        assert_eq!(deletes, 1);
        assert_eq!(app.route, Screen::Parts);
        let toast = app.toast.as_ref().map(|t| t.message.as_str()).unwrap_or_default();
        assert!(toast.starts_with("Earlier change failed"), "toast was {:?}", toast);
    }
}
