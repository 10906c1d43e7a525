pub(crate) mod editing;
pub(crate) mod gesture;
pub(crate) mod mouse;
pub(crate) mod navigate;
pub(crate) mod popups;

use crate::{
    app::App,
    models::{InputMode, Phase},
};
use crossterm::event::{Event, KeyEventKind, MouseButton, MouseEventKind};

pub fn handle_event(app: &mut App, event: Event) {
    if app.phase == Phase::Loading {
        // Any key or click skips the splash; nothing else is handled yet.
        let skip = match &event {
            Event::Key(key) => key.kind == KeyEventKind::Press,
            Event::Mouse(mouse) => matches!(mouse.kind, MouseEventKind::Down(MouseButton::Left)),
            _ => false,
        };
        if skip {
            app.finish_splash();
        }
        return;
    }

    match event {
        Event::Mouse(mouse_event) => mouse::handle_mouse(app, mouse_event),
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if popups::handle_popup_events(app, key) {
                return;
            }
            match app.input_mode {
                InputMode::Navigate => navigate::handle_normal_mode(app, key),
                InputMode::Editing => editing::handle_editing_mode(app, key),
            }
        }
        _ => {}
    }
}
