use crate::{app::App, models::Phase};
use chrono::{DateTime, Local};

pub fn tick(app: &mut App) {
    tick_at(app, Local::now());
}

pub(crate) fn tick_at(app: &mut App, now: DateTime<Local>) {
    if app.phase == Phase::Loading && now >= app.splash_until {
        app.finish_splash();
    }

    if let Some(expiry) = app.toast_expiry
        && now >= expiry
    {
        app.toast_expiry = None;
        app.toast_message = None;
    }

    app.refresh_tasks();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::Day;
    use crate::storage::TaskStore;
    use chrono::Duration;

    #[test]
    fn splash_times_out_into_ready() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut app = App::new(Config::default(), TaskStore::open(dir.path()), None);
        let until = app.splash_until;

        tick_at(&mut app, until - Duration::milliseconds(1));
        assert_eq!(app.phase, Phase::Loading);

        tick_at(&mut app, until);
        assert_eq!(app.phase, Phase::Ready);
    }

    #[test]
    fn toast_expires_and_live_query_drains() {
        let dir = tempfile::tempdir().expect("temp dir");
        let mut app = App::new(Config::default(), TaskStore::open(dir.path()), None);
        app.toast("hello");
        app.store
            .as_mut()
            .expect("store")
            .add("outside", Day::Mon)
            .expect("add");

        tick_at(&mut app, Local::now() + Duration::seconds(5));
        assert!(app.toast_message.is_none());
        assert_eq!(app.tasks.len(), 1);
    }
}
