use crate::{
    app::{App, STORE_OFFLINE_MESSAGE},
    models::{InputMode, TaskId, TaskPatch},
    storage::{self, StoreError},
};
use tracing::{debug, info, warn};

/// Adds the trimmed draft to the active day. Blank drafts are ignored
/// without touching the store; the draft is cleared only on success.
pub fn submit_draft(app: &mut App) {
    let draft = app.draft();
    let description = draft.trim();
    if description.is_empty() {
        return;
    }

    let day = app.selected_day;
    let Some(store) = app.store.as_mut() else {
        app.toast(STORE_OFFLINE_MESSAGE);
        return;
    };

    match store.add(description, day) {
        Ok(task) => {
            info!(id = task.id, %day, "task added");
            app.clear_draft();
            app.refresh_tasks();
            app.select_task(task.id);
        }
        Err(err) => report(app, "Could not add task", err),
    }
}

/// Flips completion based on the stored record, not the rendered copy.
pub fn toggle_task(app: &mut App, id: TaskId) {
    let Some(store) = app.store.as_mut() else {
        app.toast(STORE_OFFLINE_MESSAGE);
        return;
    };
    let Some(current) = store.get(id) else {
        report(app, "Could not update task", StoreError::NotFound(id));
        return;
    };

    match store.update(id, TaskPatch::completed(!current.is_completed)) {
        Ok(_) => app.refresh_tasks(),
        Err(err) => report(app, "Could not update task", err),
    }
}

pub fn toggle_selected(app: &mut App) {
    if let Some(id) = app.selected_task().map(|task| task.id) {
        toggle_task(app, id);
    }
}

/// Deletes immediately, or asks first when `tasks.confirm_delete` is set.
pub fn request_delete(app: &mut App, id: TaskId) {
    let Some(task) = app.task(id).cloned() else {
        return;
    };
    if app.config.tasks.confirm_delete {
        app.delete_target = Some(task);
    } else {
        delete_task(app, id);
    }
}

pub fn request_delete_selected(app: &mut App) {
    if let Some(id) = app.selected_task().map(|task| task.id) {
        request_delete(app, id);
    }
}

pub fn confirm_delete(app: &mut App) {
    if let Some(task) = app.delete_target.take() {
        delete_task(app, task.id);
    }
}

pub fn cancel_delete(app: &mut App) {
    app.delete_target = None;
}

pub fn delete_task(app: &mut App, id: TaskId) {
    let Some(store) = app.store.as_mut() else {
        app.toast(STORE_OFFLINE_MESSAGE);
        return;
    };

    match store.delete(id) {
        Ok(task) => {
            info!(id = task.id, day = %task.day, "task deleted");
            app.refresh_tasks();
        }
        Err(err) => report(app, "Could not delete task", err),
    }
}

pub fn duplicate_task(app: &mut App, id: TaskId) {
    let Some(source) = app.task(id).cloned() else {
        return;
    };
    let Some(store) = app.store.as_mut() else {
        app.toast(STORE_OFFLINE_MESSAGE);
        return;
    };

    match storage::duplicate_to_next_day(store, &source) {
        Ok(copy) => {
            info!(source = source.id, copy = copy.id, day = %copy.day, "task duplicated");
            app.refresh_tasks();
            app.toast(format!("Hopped to {}", copy.day));
        }
        Err(err) => report(app, "Could not duplicate task", err),
    }
}

pub fn duplicate_selected(app: &mut App) {
    if let Some(id) = app.selected_task().map(|task| task.id) {
        duplicate_task(app, id);
    }
}

pub fn focus_composer(app: &mut App) {
    app.transition_to(InputMode::Editing);
}

fn report(app: &mut App, context: &str, err: StoreError) {
    match err {
        // The record vanished under us: drop it from the view quietly.
        StoreError::NotFound(id) => {
            debug!(id, "{context}: task already gone");
            app.reload_tasks();
        }
        StoreError::Validation => {}
        err => {
            warn!(error = %err, "{context}");
            app.toast(format!("{context}: {err}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Day;
    use crate::storage::TaskStore;
    use tempfile::TempDir;

    fn make_test_app() -> (TempDir, App<'static>) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = TaskStore::open(dir.path());
        let mut app = App::new(Config::default(), store, None);
        app.finish_splash();
        (dir, app)
    }

    fn revision(app: &App) -> u64 {
        app.store.as_ref().map(TaskStore::revision).unwrap_or_default()
    }

    #[test]
    fn blank_draft_is_not_submitted() {
        let (_dir, mut app) = make_test_app();
        app.textarea.insert_str("   ");
        submit_draft(&mut app);
        assert_eq!(revision(&app), 0);
        assert!(app.tasks.is_empty());
        assert_eq!(app.draft(), "   ");
    }

    #[test]
    fn submit_adds_trimmed_task_and_clears_draft() {
        let (_dir, mut app) = make_test_app();
        app.select_day(Day::Wed);
        app.textarea.insert_str("  Buy milk ");
        submit_draft(&mut app);

        assert!(app.draft().is_empty());
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].description, "Buy milk");
        assert_eq!(app.tasks[0].day, Day::Wed);
        assert!(!app.tasks[0].is_completed);
    }

    #[test]
    fn toggle_flips_completion_in_view() {
        let (_dir, mut app) = make_test_app();
        app.textarea.insert_str("Read");
        submit_draft(&mut app);
        let id = app.tasks[0].id;

        toggle_task(&mut app, id);
        assert!(app.tasks[0].is_completed);
        toggle_selected(&mut app);
        assert!(!app.tasks[0].is_completed);
    }

    #[test]
    fn delete_is_immediate_by_default() {
        let (_dir, mut app) = make_test_app();
        app.textarea.insert_str("Trash me");
        submit_draft(&mut app);
        let id = app.tasks[0].id;

        request_delete(&mut app, id);
        assert!(app.tasks.is_empty());
        assert!(app.delete_target.is_none());
    }

    #[test]
    fn confirm_delete_asks_first() {
        let (_dir, mut app) = make_test_app();
        app.config.tasks.confirm_delete = true;
        app.textarea.insert_str("Keep?");
        submit_draft(&mut app);
        let id = app.tasks[0].id;

        request_delete(&mut app, id);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.delete_target.as_ref().map(|t| t.id), Some(id));

        cancel_delete(&mut app);
        assert_eq!(app.tasks.len(), 1);

        request_delete(&mut app, id);
        confirm_delete(&mut app);
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn vanished_task_disappears_without_error() {
        let (_dir, mut app) = make_test_app();
        app.textarea.insert_str("Ghost");
        submit_draft(&mut app);
        let id = app.tasks[0].id;

        // Another path removes it; the view keeps the stale row for now.
        let old_view = app.tasks.clone();
        app.store.as_mut().expect("store").delete(id).expect("delete");
        app.tasks = old_view;

        delete_task(&mut app, id);
        assert!(app.tasks.is_empty());
        assert!(app.toast_message.is_none());

        app.tasks = vec![crate::models::Task {
            id,
            description: "Ghost".to_string(),
            day: Day::Mon,
            is_completed: false,
        }];
        toggle_task(&mut app, id);
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn duplicate_copies_to_next_day_uncompleted() {
        let (_dir, mut app) = make_test_app();
        app.select_day(Day::Sun);
        app.textarea.insert_str("Meal prep");
        submit_draft(&mut app);
        let source = app.tasks[0].id;
        toggle_task(&mut app, source);

        duplicate_task(&mut app, source);

        assert_eq!(app.tasks.len(), 1);
        assert!(app.tasks[0].is_completed);
        assert_eq!(app.toast_message.as_deref(), Some("Hopped to Mon"));

        app.select_day(Day::Mon);
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].description, "Meal prep");
        assert!(!app.tasks[0].is_completed);
        assert_ne!(app.tasks[0].id, source);
    }

    #[test]
    fn offline_store_keeps_draft_and_warns() {
        let dir = tempfile::tempdir().expect("temp dir");
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").expect("write");
        let mut app = App::new(Config::default(), TaskStore::open(&blocker), None);

        app.textarea.insert_str("Don't lose me");
        submit_draft(&mut app);
        assert_eq!(app.draft(), "Don't lose me");
        assert_eq!(app.toast_message.as_deref(), Some(STORE_OFFLINE_MESSAGE));
    }
}
