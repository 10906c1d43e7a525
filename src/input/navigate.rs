use crate::{actions, app::App, config::key_match, models::Day};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    let bindings = &app.config.keybindings;

    if key_match(&key, &bindings.global.help) {
        app.show_help_popup = true;
    } else if key_match(&key, &bindings.global.quit) {
        app.quit();
    } else if key_match(&key, &bindings.global.toggle_theme) {
        app.toggle_theme();
    } else if key_match(&key, &bindings.global.focus_composer) {
        actions::focus_composer(app);
    } else if key_match(&key, &bindings.tabs.next) {
        app.next_day_tab();
    } else if key_match(&key, &bindings.tabs.prev) {
        app.prev_day_tab();
    } else if key_match(&key, &bindings.tasks.up) {
        app.tasks_up();
    } else if key_match(&key, &bindings.tasks.down) {
        app.tasks_down();
    } else if key_match(&key, &bindings.tasks.toggle) {
        actions::toggle_selected(app);
    } else if key_match(&key, &bindings.tasks.delete) {
        actions::request_delete_selected(app);
    } else if key_match(&key, &bindings.tasks.duplicate) {
        actions::duplicate_selected(app);
    } else if let Some(day) = digit_day(&key) {
        app.select_day(day);
    }
}

/// `1`..`7` jump straight to Mon..Sun.
fn digit_day(key: &KeyEvent) -> Option<Day> {
    if !key.modifiers.difference(KeyModifiers::SHIFT).is_empty() {
        return None;
    }
    match key.code {
        KeyCode::Char(c @ '1'..='7') => c.to_digit(10).map(|d| Day::from_index(d as usize - 1)),
        _ => None,
    }
}
