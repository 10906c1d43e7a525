use crate::{
    actions,
    app::{App, DragState, HitTarget},
    input::gesture::{self, Gesture},
    models::InputMode,
};
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

pub fn handle_mouse(app: &mut App, event: MouseEvent) {
    if app.show_help_popup || app.delete_target.is_some() {
        return;
    }

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.drag = Some(DragState {
                task_id: app.hit_map.row_at(event.column, event.row),
                start_column: event.column,
                start_row: event.row,
                current_column: event.column,
            });
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if let Some(drag) = app.drag.as_mut() {
                drag.current_column = event.column;
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if let Some(drag) = app.drag.take() {
                release(app, drag, event.column);
            }
        }
        MouseEventKind::ScrollUp => app.tasks_up(),
        MouseEventKind::ScrollDown => app.tasks_down(),
        _ => {}
    }
}

fn release(app: &mut App, drag: DragState, column: u16) {
    let threshold = app.config.gestures.swipe_threshold;
    if let Some(task_id) = drag.task_id
        && gesture::classify(drag.start_column, column, threshold) == Gesture::SwipeLeft
    {
        actions::request_delete(app, task_id);
        return;
    }

    // Taps resolve against where the press started so a jittery release
    // still lands on the intended control.
    match app.hit_map.target_at(drag.start_column, drag.start_row) {
        Some(HitTarget::Tab(day)) => app.select_day(day),
        Some(HitTarget::ThemeButton) => app.toggle_theme(),
        Some(HitTarget::Composer) => app.transition_to(InputMode::Editing),
        Some(HitTarget::Toggle(id)) => {
            app.select_task(id);
            actions::toggle_task(app, id);
        }
        Some(HitTarget::Duplicate(id)) => {
            app.select_task(id);
            actions::duplicate_task(app, id);
        }
        Some(HitTarget::Row(id)) => {
            app.transition_to(InputMode::Navigate);
            app.select_task(id);
        }
        None => {}
    }
}
