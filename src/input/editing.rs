use crate::{actions, app::App, config::key_match, models::InputMode};
use crossterm::event::KeyEvent;
use tui_textarea::{Input, Key};

pub fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key_match(&key, &app.config.keybindings.composer.submit) {
        actions::submit_draft(app);
        return;
    }

    if key_match(&key, &app.config.keybindings.composer.cancel) {
        // The draft stays; only focus moves.
        app.transition_to(InputMode::Navigate);
        return;
    }

    if key_match(&key, &app.config.keybindings.composer.clear) {
        app.clear_draft();
        return;
    }

    let input = Input::from(key);
    if is_newline(&input) {
        return;
    }
    app.textarea.input(input);
}

/// Task descriptions are single-line; the textarea would otherwise split
/// on these.
fn is_newline(input: &Input) -> bool {
    matches!(
        input,
        Input {
            key: Key::Enter,
            ..
        } | Input {
            key: Key::Char('m' | 'j'),
            ctrl: true,
            ..
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::TaskStore;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_editing_mode(app, KeyEvent::new(code, modifiers));
    }

    #[test]
    fn newline_keystrokes_never_split_the_draft() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut app = App::new(Config::default(), TaskStore::open(dir.path()), None);
        app.finish_splash();
        app.transition_to(InputMode::Editing);

        press(&mut app, KeyCode::Char('a'), KeyModifiers::NONE);
        press(&mut app, KeyCode::Char('m'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Char('j'), KeyModifiers::CONTROL);
        press(&mut app, KeyCode::Char('b'), KeyModifiers::NONE);

        assert_eq!(app.textarea.lines().len(), 1);
        assert_eq!(app.draft(), "ab");
        assert!(app.tasks.is_empty());
    }
}
