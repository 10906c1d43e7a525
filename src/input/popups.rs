use crate::{actions, app::App, config::key_match};
use crossterm::event::{KeyCode, KeyEvent};

/// Returns true when an open popup consumed the key.
pub fn handle_popup_events(app: &mut App, key: KeyEvent) -> bool {
    if app.show_help_popup {
        if key.code == KeyCode::Esc || key_match(&key, &app.config.keybindings.global.help) {
            app.show_help_popup = false;
        }
        return true;
    }

    if app.delete_target.is_some() {
        handle_delete_popup(app, key);
        return true;
    }

    false
}

fn handle_delete_popup(app: &mut App, key: KeyEvent) {
    if key_match(&key, &app.config.keybindings.popup.confirm) {
        actions::confirm_delete(app);
    } else if key_match(&key, &app.config.keybindings.popup.cancel) || key.code == KeyCode::Esc {
        actions::cancel_delete(app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Day, Task};
    use crate::storage::TaskStore;
    use crossterm::event::KeyModifiers;

    #[test]
    fn delete_popup_cancel_keeps_task() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut app = App::new(Config::default(), TaskStore::open(dir.path()), None);
        let task = Task {
            id: 1,
            description: "x".to_string(),
            day: Day::Mon,
            is_completed: false,
        };
        app.delete_target = Some(task);

        assert!(handle_popup_events(
            &mut app,
            KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)
        ));
        assert!(app.delete_target.is_none());
        assert!(!handle_popup_events(
            &mut app,
            KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE)
        ));
    }
}
