use crate::config::Config;
use crate::models::{Day, InputMode, Phase, Task, TaskId};
use crate::storage::{LiveQuery, StoreError, TaskStore};
use chrono::{DateTime, Duration, Local};
use ratatui::layout::{Position, Rect};
use ratatui::widgets::ListState;
use tracing::{debug, error};
use tui_textarea::TextArea;

pub const PLACEHOLDER_COMPOSE: &str = "New task...";
const PLACEHOLDER_NAVIGATE: &str = "New task... (press i to type, ? for help)";

pub const STORE_OFFLINE_MESSAGE: &str = "Storage unavailable: changes cannot be saved.";

/// One rendered task row and its two tap targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRowHit {
    pub task_id: TaskId,
    pub row: Rect,
    pub toggle: Rect,
    pub duplicate: Rect,
}

/// Screen regions recorded by the last draw, used for mouse hit-testing.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    pub tabs: Vec<(Rect, Day)>,
    pub rows: Vec<TaskRowHit>,
    pub theme_button: Option<Rect>,
    pub composer: Option<Rect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Tab(Day),
    ThemeButton,
    Composer,
    Toggle(TaskId),
    Duplicate(TaskId),
    Row(TaskId),
}

impl HitMap {
    pub fn clear(&mut self) {
        self.tabs.clear();
        self.rows.clear();
        self.theme_button = None;
        self.composer = None;
    }

    pub fn target_at(&self, column: u16, row: u16) -> Option<HitTarget> {
        let pos = Position::new(column, row);
        if let Some((_, day)) = self.tabs.iter().find(|(area, _)| area.contains(pos)) {
            return Some(HitTarget::Tab(*day));
        }
        if self.theme_button.is_some_and(|area| area.contains(pos)) {
            return Some(HitTarget::ThemeButton);
        }
        if self.composer.is_some_and(|area| area.contains(pos)) {
            return Some(HitTarget::Composer);
        }
        let hit = self.rows.iter().find(|hit| hit.row.contains(pos))?;
        if hit.toggle.contains(pos) {
            Some(HitTarget::Toggle(hit.task_id))
        } else if hit.duplicate.contains(pos) {
            Some(HitTarget::Duplicate(hit.task_id))
        } else {
            Some(HitTarget::Row(hit.task_id))
        }
    }

    pub fn row_at(&self, column: u16, row: u16) -> Option<TaskId> {
        let pos = Position::new(column, row);
        self.rows
            .iter()
            .find(|hit| hit.row.contains(pos))
            .map(|hit| hit.task_id)
    }
}

/// Pointer drag in progress over a task row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    pub task_id: Option<TaskId>,
    pub start_column: u16,
    pub start_row: u16,
    pub current_column: u16,
}

impl DragState {
    pub fn leftward_distance(&self) -> u16 {
        self.start_column.saturating_sub(self.current_column)
    }
}

pub struct App<'a> {
    pub config: Config,
    pub phase: Phase,
    pub splash_until: DateTime<Local>,
    pub input_mode: InputMode,
    pub selected_day: Day,
    pub textarea: TextArea<'a>,
    pub is_dark: bool,

    pub store: Option<TaskStore>,
    /// Set when the store could not be opened; rendered as a banner.
    pub store_error: Option<String>,
    live_query: Option<LiveQuery>,
    pub tasks: Vec<Task>,
    pub tasks_state: ListState,

    pub show_help_popup: bool,
    pub delete_target: Option<Task>,
    pub toast_message: Option<String>,
    pub toast_expiry: Option<DateTime<Local>>,

    pub hit_map: HitMap,
    pub drag: Option<DragState>,
    pub should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(
        config: Config,
        store: Result<TaskStore, StoreError>,
        host_prefers_dark: Option<bool>,
    ) -> App<'a> {
        let (store, store_error) = match store {
            Ok(store) => (Some(store), None),
            Err(err) => {
                error!(error = %err, "task store unavailable");
                (None, Some(err.to_string()))
            }
        };

        let is_dark = config.theme.initial_dark(host_prefers_dark);
        let splash_until = Local::now() + config.splash.duration();

        let mut textarea = TextArea::default();
        textarea.set_placeholder_text(PLACEHOLDER_NAVIGATE);

        let mut app = App {
            config,
            phase: Phase::Loading,
            splash_until,
            input_mode: InputMode::Navigate,
            selected_day: Day::Mon,
            textarea,
            is_dark,
            store,
            store_error,
            live_query: None,
            tasks: Vec::new(),
            tasks_state: ListState::default(),
            show_help_popup: false,
            delete_target: None,
            toast_message: None,
            toast_expiry: None,
            hit_map: HitMap::default(),
            drag: None,
            should_quit: false,
        };
        app.subscribe_selected_day();
        app
    }

    /// Loading -> Ready. There is no way back.
    pub fn finish_splash(&mut self) {
        if self.phase == Phase::Loading {
            debug!("splash finished");
            self.phase = Phase::Ready;
        }
    }

    pub fn draft(&self) -> String {
        self.textarea.lines().join(" ")
    }

    pub fn clear_draft(&mut self) {
        self.textarea = TextArea::default();
        self.apply_placeholder();
    }

    pub fn transition_to(&mut self, mode: InputMode) {
        self.input_mode = mode;
        self.apply_placeholder();
    }

    fn apply_placeholder(&mut self) {
        let placeholder = match self.input_mode {
            InputMode::Editing => PLACEHOLDER_COMPOSE,
            InputMode::Navigate => PLACEHOLDER_NAVIGATE,
        };
        self.textarea.set_placeholder_text(placeholder);
    }

    /// Switches the active tab. Reads only; the draft is kept as typed.
    pub fn select_day(&mut self, day: Day) {
        if self.live_query.as_ref().map(LiveQuery::day) == Some(day) {
            return;
        }
        debug!(from = %self.selected_day, to = %day, "switching day");
        self.selected_day = day;
        self.tasks_state = ListState::default();
        self.subscribe_selected_day();
    }

    pub fn next_day_tab(&mut self) {
        self.select_day(self.selected_day.next());
    }

    pub fn prev_day_tab(&mut self) {
        self.select_day(self.selected_day.prev());
    }

    fn subscribe_selected_day(&mut self) {
        self.tasks.clear();
        // Dropping the old query unregisters it on the store's next notify.
        self.live_query = self
            .store
            .as_mut()
            .map(|store| store.subscribe(self.selected_day));
        self.refresh_tasks();
    }

    /// Applies the newest live-query delivery, if one arrived.
    pub fn refresh_tasks(&mut self) {
        let Some(latest) = self.live_query.as_ref().and_then(LiveQuery::latest) else {
            return;
        };
        self.set_tasks(latest);
    }

    /// Re-reads the active day directly; used when the view may be stale
    /// without any mutation having fired the live query.
    pub fn reload_tasks(&mut self) {
        if let Some(store) = self.store.as_ref() {
            let tasks = store.list_by_day(self.selected_day);
            self.set_tasks(tasks);
        }
    }

    fn set_tasks(&mut self, tasks: Vec<Task>) {
        let previous = self.selected_task().map(|task| task.id);
        self.tasks = tasks;

        if self.tasks.is_empty() {
            self.tasks_state.select(None);
            return;
        }
        let index = previous
            .and_then(|id| self.tasks.iter().position(|task| task.id == id))
            .or_else(|| {
                self.tasks_state
                    .selected()
                    .map(|i| i.min(self.tasks.len() - 1))
            })
            .unwrap_or(0);
        self.tasks_state.select(Some(index));
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks_state.selected().and_then(|i| self.tasks.get(i))
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn select_task(&mut self, id: TaskId) {
        if let Some(index) = self.tasks.iter().position(|task| task.id == id) {
            self.tasks_state.select(Some(index));
        }
    }

    pub fn tasks_up(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let i = match self.tasks_state.selected() {
            Some(0) | None => 0,
            Some(i) => i - 1,
        };
        self.tasks_state.select(Some(i));
    }

    pub fn tasks_down(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let last = self.tasks.len() - 1;
        let i = match self.tasks_state.selected() {
            Some(i) => (i + 1).min(last),
            None => 0,
        };
        self.tasks_state.select(Some(i));
    }

    /// Session-only; the stored data and config are untouched.
    pub fn toggle_theme(&mut self) {
        self.is_dark = !self.is_dark;
    }

    pub fn toast(&mut self, message: impl Into<String>) {
        self.toast_message = Some(message.into());
        self.toast_expiry = Some(Local::now() + Duration::seconds(2));
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskPatch;
    use tempfile::TempDir;

    fn make_test_app() -> (TempDir, App<'static>) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = TaskStore::open(dir.path());
        let app = App::new(Config::default(), store, Some(true));
        (dir, app)
    }

    fn store<'s>(app: &'s mut App<'_>) -> &'s mut TaskStore {
        app.store.as_mut().expect("store open")
    }

    #[test]
    fn starts_loading_on_monday_with_empty_draft() {
        let (_dir, app) = make_test_app();
        assert_eq!(app.phase, Phase::Loading);
        assert_eq!(app.selected_day, Day::Mon);
        assert_eq!(app.input_mode, InputMode::Navigate);
        assert!(app.draft().is_empty());
        assert!(app.tasks.is_empty());
        assert!(app.is_dark);
    }

    #[test]
    fn huge_splash_duration_does_not_overflow() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut config = Config::default();
        config.splash.duration_ms = 10_000_000_000_000_000;

        let before = Local::now();
        let app = App::new(config, TaskStore::open(dir.path()), None);
        assert_eq!(app.phase, Phase::Loading);
        assert!(app.splash_until <= before + Duration::seconds(61));
    }

    #[test]
    fn splash_only_moves_forward() {
        let (_dir, mut app) = make_test_app();
        app.finish_splash();
        assert_eq!(app.phase, Phase::Ready);
        app.finish_splash();
        assert_eq!(app.phase, Phase::Ready);
    }

    #[test]
    fn live_query_refreshes_view_after_mutation() {
        let (_dir, mut app) = make_test_app();
        let task = store(&mut app).add("Feed frog", Day::Mon).expect("add");
        app.refresh_tasks();
        assert_eq!(app.tasks, vec![task.clone()]);
        assert_eq!(app.tasks_state.selected(), Some(0));

        store(&mut app)
            .update(task.id, TaskPatch::completed(true))
            .expect("update");
        app.refresh_tasks();
        assert!(app.tasks[0].is_completed);
    }

    #[test]
    fn switching_days_changes_view_without_mutations() {
        let (_dir, mut app) = make_test_app();
        store(&mut app).add("Monday task", Day::Mon).expect("add mon");
        store(&mut app).add("Tuesday task", Day::Tue).expect("add tue");
        app.refresh_tasks();
        let revision = store(&mut app).revision();

        app.select_day(Day::Tue);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].description, "Tuesday task");

        app.prev_day_tab();
        assert_eq!(app.selected_day, Day::Mon);
        assert_eq!(app.tasks[0].description, "Monday task");

        assert_eq!(store(&mut app).revision(), revision);
    }

    #[test]
    fn switching_days_keeps_the_draft() {
        let (_dir, mut app) = make_test_app();
        app.textarea.insert_str("half typed");
        app.next_day_tab();
        assert_eq!(app.selected_day, Day::Tue);
        assert_eq!(app.draft(), "half typed");
    }

    #[test]
    fn tabs_wrap_around_the_week() {
        let (_dir, mut app) = make_test_app();
        app.prev_day_tab();
        assert_eq!(app.selected_day, Day::Sun);
        app.next_day_tab();
        assert_eq!(app.selected_day, Day::Mon);
    }

    #[test]
    fn selection_follows_task_across_refresh() {
        let (_dir, mut app) = make_test_app();
        let first = store(&mut app).add("first", Day::Mon).expect("add");
        let second = store(&mut app).add("second", Day::Mon).expect("add");
        app.refresh_tasks();
        app.select_task(second.id);

        store(&mut app).delete(first.id).expect("delete");
        app.refresh_tasks();
        assert_eq!(app.selected_task().map(|t| t.id), Some(second.id));
    }

    #[test]
    fn theme_toggle_flips_flag_only() {
        let (_dir, mut app) = make_test_app();
        app.toggle_theme();
        assert!(!app.is_dark);
        app.toggle_theme();
        assert!(app.is_dark);
        assert_eq!(store(&mut app).revision(), 0);
    }

    #[test]
    fn unavailable_store_is_reported_not_fatal() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").expect("write");
        let store = TaskStore::open(&blocker.join("db"));

        let mut app = App::new(Config::default(), store, None);
        assert!(app.store.is_none());
        assert!(app.store_error.is_some());
        app.select_day(Day::Wed);
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn hit_map_resolves_row_controls() {
        let mut hits = HitMap::default();
        hits.rows.push(TaskRowHit {
            task_id: 9,
            row: Rect::new(0, 5, 40, 1),
            toggle: Rect::new(0, 5, 4, 1),
            duplicate: Rect::new(36, 5, 4, 1),
        });
        hits.tabs.push((Rect::new(0, 1, 5, 1), Day::Fri));

        assert_eq!(hits.target_at(1, 5), Some(HitTarget::Toggle(9)));
        assert_eq!(hits.target_at(37, 5), Some(HitTarget::Duplicate(9)));
        assert_eq!(hits.target_at(20, 5), Some(HitTarget::Row(9)));
        assert_eq!(hits.target_at(2, 1), Some(HitTarget::Tab(Day::Fri)));
        assert_eq!(hits.target_at(2, 9), None);
    }
}
