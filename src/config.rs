use chrono::Duration;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub fn key_match(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings.iter().any(|binding| is_match(key, binding))
}

fn is_match(key: &KeyEvent, binding: &str) -> bool {
    let binding = binding.to_lowercase();
    let parts: Vec<&str> = binding.split('+').collect();

    let mut target_modifiers = KeyModifiers::NONE;
    let mut target_code = KeyCode::Null;

    for part in parts {
        match part {
            "ctrl" => target_modifiers.insert(KeyModifiers::CONTROL),
            "opt" | "alt" => target_modifiers.insert(KeyModifiers::ALT),
            "shift" => target_modifiers.insert(KeyModifiers::SHIFT),
            "enter" => target_code = KeyCode::Enter,
            "esc" => target_code = KeyCode::Esc,
            "backspace" => target_code = KeyCode::Backspace,
            "tab" => target_code = KeyCode::Tab,
            "backtab" => target_code = KeyCode::BackTab,
            "space" => target_code = KeyCode::Char(' '),
            "up" => target_code = KeyCode::Up,
            "down" => target_code = KeyCode::Down,
            "left" => target_code = KeyCode::Left,
            "right" => target_code = KeyCode::Right,
            "home" => target_code = KeyCode::Home,
            "end" => target_code = KeyCode::End,
            "delete" => target_code = KeyCode::Delete,
            c if c.chars().count() == 1 => {
                if let Some(ch) = c.chars().next() {
                    target_code = KeyCode::Char(ch);
                }
            }
            _ => {}
        }
    }

    // Char codes compare case-insensitively.
    let code_matches = if key.code == target_code {
        true
    } else if let (KeyCode::Char(c), KeyCode::Char(tc)) = (key.code, target_code) {
        c.to_lowercase().next() == Some(tc)
    } else {
        false
    };
    if !code_matches {
        return false;
    }

    // Shift is ignored unless the binding asks for it ('?' arrives as shift+/).
    let mut key_mods = key.modifiers;
    if !target_modifiers.contains(KeyModifiers::SHIFT) {
        key_mods.remove(KeyModifiers::SHIFT);
    }

    key_mods == target_modifiers
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "meghendra", "froghop")
}

pub const DATA_DIR_ENV: &str = "FROGHOP_DATA_DIR";
pub const CONFIG_ENV: &str = "FROGHOP_CONFIG";

/// Root that relative `data` paths hang off. Always absolute.
fn data_root(env_dir: Option<PathBuf>) -> PathBuf {
    let dir = env_dir
        .or_else(|| project_dirs().map(|dirs| dirs.data_dir().to_path_buf()))
        .unwrap_or_else(|| PathBuf::from(".froghop"));
    std::path::absolute(&dir).unwrap_or(dir)
}

pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    if let Some(dirs) = project_dirs() {
        return dirs.config_dir().join("config.toml");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".froghop-config.toml")
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub keybindings: KeyBindings,
    pub theme: ThemeConfig,
    pub data: DataConfig,
    pub splash: SplashConfig,
    pub gestures: GestureConfig,
    pub tasks: TaskConfig,
    pub logging: LoggingConfig,
}

/// Directory overrides. Unset entries are resolved at startup and never
/// written back, so `FROGHOP_DATA_DIR` keeps working after the first run.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub store_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl DataConfig {
    pub fn paths(&self) -> DataPaths {
        self.resolve(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    /// `env_dir` wins for the store; configured paths come next and are
    /// taken relative to the data root; the platform data dir is last.
    pub fn resolve(&self, env_dir: Option<PathBuf>) -> DataPaths {
        let env_set = env_dir.is_some();
        let root = data_root(env_dir);
        let configured = |path: &Option<PathBuf>| {
            path.as_ref()
                .filter(|path| !path.as_os_str().is_empty())
                .map(|path| root.join(path))
        };

        let store_dir = if env_set {
            root.clone()
        } else {
            configured(&self.store_dir).unwrap_or_else(|| root.clone())
        };
        let log_dir = configured(&self.log_dir).unwrap_or_else(|| root.join("logs"));
        DataPaths { store_dir, log_dir }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct KeyBindings {
    pub global: GlobalBindings,
    pub tabs: TabBindings,
    pub tasks: TasksBindings,
    pub composer: ComposerBindings,
    pub popup: PopupBindings,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GlobalBindings {
    pub quit: Vec<String>,
    pub help: Vec<String>,
    pub toggle_theme: Vec<String>,
    pub focus_composer: Vec<String>,
}

impl Default for GlobalBindings {
    fn default() -> Self {
        Self {
            quit: vec!["ctrl+q".to_string(), "q".to_string()],
            help: vec!["?".to_string()],
            toggle_theme: vec!["t".to_string()],
            focus_composer: vec!["i".to_string(), "a".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TabBindings {
    pub next: Vec<String>,
    pub prev: Vec<String>,
}

impl Default for TabBindings {
    fn default() -> Self {
        Self {
            next: vec!["l".to_string(), "right".to_string(), "tab".to_string()],
            prev: vec!["h".to_string(), "left".to_string(), "backtab".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct TasksBindings {
    pub up: Vec<String>,
    pub down: Vec<String>,
    pub toggle: Vec<String>,
    pub delete: Vec<String>,
    pub duplicate: Vec<String>,
}

impl Default for TasksBindings {
    fn default() -> Self {
        Self {
            up: vec!["k".to_string(), "up".to_string()],
            down: vec!["j".to_string(), "down".to_string()],
            toggle: vec!["space".to_string(), "enter".to_string()],
            delete: vec!["d".to_string(), "delete".to_string()],
            duplicate: vec!["n".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ComposerBindings {
    pub submit: Vec<String>,
    pub cancel: Vec<String>,
    pub clear: Vec<String>,
}

impl Default for ComposerBindings {
    fn default() -> Self {
        Self {
            submit: vec!["enter".to_string()],
            cancel: vec!["esc".to_string()],
            clear: vec!["ctrl+l".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct PopupBindings {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for PopupBindings {
    fn default() -> Self {
        Self {
            confirm: vec!["enter".to_string(), "y".to_string()],
            cancel: vec!["esc".to_string(), "n".to_string()],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    /// Follow the terminal's color-scheme signal at startup.
    #[default]
    Auto,
    Dark,
    Light,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Palette {
    pub fg: String,
    pub bg: String,
    pub muted: String,
    pub accent: String,
    pub border: String,
    pub tab_active_fg: String,
    pub tab_active_bg: String,
    pub done: String,
    pub danger: String,
    pub toast: String,
}

impl Palette {
    pub fn dark() -> Self {
        Self {
            fg: "White".to_string(),
            bg: "#111827".to_string(),
            muted: "#9CA3AF".to_string(),
            accent: "#4CAF50".to_string(),
            border: "#374151".to_string(),
            tab_active_fg: "White".to_string(),
            tab_active_bg: "#81C784".to_string(),
            done: "#81C784".to_string(),
            danger: "#EF4444".to_string(),
            toast: "Cyan".to_string(),
        }
    }

    pub fn light() -> Self {
        Self {
            fg: "#111827".to_string(),
            bg: "White".to_string(),
            muted: "#6B7280".to_string(),
            accent: "#4CAF50".to_string(),
            border: "#E5E7EB".to_string(),
            tab_active_fg: "White".to_string(),
            tab_active_bg: "#81C784".to_string(),
            done: "#66BB6A".to_string(),
            danger: "#DC2626".to_string(),
            toast: "Blue".to_string(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::dark()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ThemeConfig {
    pub mode: ThemeMode,
    pub dark: Palette,
    pub light: Palette,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            mode: ThemeMode::Auto,
            dark: Palette::dark(),
            light: Palette::light(),
        }
    }
}

impl ThemeConfig {
    /// Initial dark flag: explicit mode wins, otherwise the host signal,
    /// otherwise dark.
    pub fn initial_dark(&self, host: Option<bool>) -> bool {
        match self.mode {
            ThemeMode::Dark => true,
            ThemeMode::Light => false,
            ThemeMode::Auto => host.unwrap_or(true),
        }
    }
}

/// Reads the terminal color-scheme hint from `COLORFGBG` ("fg;bg" or
/// "fg;extra;bg"). Returns `Some(true)` for a dark background.
pub fn host_prefers_dark() -> Option<bool> {
    let value = std::env::var("COLORFGBG").ok()?;
    parse_colorfgbg(&value)
}

pub fn parse_colorfgbg(value: &str) -> Option<bool> {
    let bg = value.rsplit(';').next()?.trim();
    let index: u8 = bg.parse().ok()?;
    match index {
        0..=6 | 8 => Some(true),
        7 | 9..=15 => Some(false),
        _ => None,
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SplashConfig {
    pub duration_ms: u64,
}

impl SplashConfig {
    pub const MAX_DURATION_MS: u64 = 60_000;

    pub fn duration(&self) -> Duration {
        let ms = self.duration_ms.min(Self::MAX_DURATION_MS);
        Duration::milliseconds(ms as i64)
    }
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self { duration_ms: 2000 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GestureConfig {
    /// Columns a leftward drag must travel before it counts as a swipe.
    pub swipe_threshold: u16,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { swipe_threshold: 8 }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TaskConfig {
    pub confirm_delete: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse {path}, using defaults: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Config {
    /// Loads from the config path. Problems are returned rather than
    /// logged, since this runs before the log subscriber exists.
    pub fn load() -> (Self, Vec<ConfigError>) {
        Self::load_from(&config_path())
    }

    pub fn load_from(config_path: &Path) -> (Self, Vec<ConfigError>) {
        let mut problems = Vec::new();

        let mut config = match fs::read_to_string(config_path) {
            Ok(content) => match toml::from_str::<Config>(&content) {
                Ok(config) => config,
                Err(source) => {
                    problems.push(ConfigError::Parse {
                        path: config_path.to_path_buf(),
                        source,
                    });
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        };

        let changed = config.normalize();

        if (changed || !config_path.exists())
            && let Err(source) = config.save_to_path(config_path)
        {
            problems.push(ConfigError::Write {
                path: config_path.to_path_buf(),
                source,
            });
        }

        (config, problems)
    }

    pub fn save_to_path(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, content)
    }

    fn normalize(&mut self) -> bool {
        let mut changed = false;

        if self.gestures.swipe_threshold == 0 {
            self.gestures.swipe_threshold = GestureConfig::default().swipe_threshold;
            changed = true;
        }
        if self.splash.duration_ms > SplashConfig::MAX_DURATION_MS {
            self.splash.duration_ms = SplashConfig::MAX_DURATION_MS;
            changed = true;
        }

        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn matches_plain_and_modified_bindings() {
        let quit = GlobalBindings::default().quit;
        assert!(key_match(&key(KeyCode::Char('q'), KeyModifiers::NONE), &quit));
        assert!(key_match(&key(KeyCode::Char('q'), KeyModifiers::CONTROL), &quit));
        assert!(!key_match(&key(KeyCode::Char('w'), KeyModifiers::NONE), &quit));
    }

    #[test]
    fn ctrl_binding_does_not_match_bare_key() {
        let clear = vec!["ctrl+l".to_string()];
        assert!(!key_match(&key(KeyCode::Char('l'), KeyModifiers::NONE), &clear));
        assert!(key_match(&key(KeyCode::Char('l'), KeyModifiers::CONTROL), &clear));
    }

    #[test]
    fn shift_is_ignored_unless_requested() {
        let help = vec!["?".to_string()];
        assert!(key_match(&key(KeyCode::Char('?'), KeyModifiers::SHIFT), &help));
        let shifted = vec!["shift+enter".to_string()];
        assert!(!key_match(&key(KeyCode::Enter, KeyModifiers::NONE), &shifted));
        assert!(key_match(&key(KeyCode::Enter, KeyModifiers::SHIFT), &shifted));
    }

    #[test]
    fn reads_colorfgbg_background() {
        assert_eq!(parse_colorfgbg("15;0"), Some(true));
        assert_eq!(parse_colorfgbg("0;15"), Some(false));
        assert_eq!(parse_colorfgbg("0;default;7"), Some(false));
        assert_eq!(parse_colorfgbg("garbage"), None);
        assert_eq!(parse_colorfgbg("0;200"), None);
    }

    #[test]
    fn explicit_mode_overrides_host_signal() {
        let mut theme = ThemeConfig::default();
        assert!(!theme.initial_dark(Some(false)));
        assert!(theme.initial_dark(None));

        theme.mode = ThemeMode::Dark;
        assert!(theme.initial_dark(Some(false)));
        theme.mode = ThemeMode::Light;
        assert!(!theme.initial_dark(Some(true)));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [theme]
            mode = "light"

            [gestures]
            swipe_threshold = 12
            "#,
        )
        .expect("parse config");
        assert_eq!(config.theme.mode, ThemeMode::Light);
        assert_eq!(config.gestures.swipe_threshold, 12);
        assert_eq!(config.splash.duration_ms, 2000);
        assert_eq!(config.theme.dark, Palette::dark());
        assert!(!config.tasks.confirm_delete);
    }

    #[test]
    fn normalize_repairs_threshold_and_clamps_splash() {
        let mut config = Config::default();
        config.gestures.swipe_threshold = 0;
        config.splash.duration_ms = 10_000_000_000_000_000;
        assert!(config.normalize());
        assert_eq!(config.gestures.swipe_threshold, 8);
        assert_eq!(config.splash.duration_ms, SplashConfig::MAX_DURATION_MS);
        assert!(!config.normalize());
    }

    #[test]
    fn splash_duration_is_bounded_even_unnormalized() {
        let splash = SplashConfig {
            duration_ms: u64::MAX,
        };
        assert_eq!(
            splash.duration(),
            Duration::milliseconds(SplashConfig::MAX_DURATION_MS as i64)
        );
    }

    #[test]
    fn data_dir_env_applies_on_every_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");

        let (first, problems) = Config::load_from(&path);
        assert!(problems.is_empty());
        let content = fs::read_to_string(&path).expect("config written");
        assert!(!content.contains("store_dir"));

        let (second, _) = Config::load_from(&path);
        let a = first.data.resolve(Some(dir.path().join("A")));
        let b = second.data.resolve(Some(dir.path().join("B")));
        assert_eq!(a.store_dir, dir.path().join("A"));
        assert_eq!(b.store_dir, dir.path().join("B"));
        assert_eq!(b.log_dir, dir.path().join("B").join("logs"));
    }

    #[test]
    fn configured_dirs_resolve_against_data_root() {
        let dir = tempfile::tempdir().expect("temp dir");
        let data = DataConfig {
            store_dir: Some(PathBuf::from("db")),
            log_dir: Some(dir.path().join("elsewhere")),
        };
        let paths = data.resolve(None);
        assert!(paths.store_dir.is_absolute());
        assert!(paths.store_dir.ends_with("db"));
        assert_eq!(paths.log_dir, dir.path().join("elsewhere"));

        // The store override from the environment beats the configured dir.
        let paths = data.resolve(Some(dir.path().join("env")));
        assert_eq!(paths.store_dir, dir.path().join("env"));
    }

    #[test]
    fn relative_env_dir_resolves_to_a_stable_absolute_path() {
        let data = DataConfig::default();
        let first = data.resolve(Some(PathBuf::from("rel-data")));
        let second = data.resolve(Some(PathBuf::from("rel-data")));
        assert!(first.store_dir.is_absolute());
        assert!(first.store_dir.ends_with("rel-data"));
        assert_eq!(first, second);
    }

    #[test]
    fn broken_config_is_reported_and_left_alone() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "[theme\nmode = ").expect("write");

        let (config, problems) = Config::load_from(&path);
        assert_eq!(config.splash.duration_ms, 2000);
        assert_eq!(problems.len(), 1);
        assert!(matches!(problems[0], ConfigError::Parse { .. }));
        assert_eq!(fs::read_to_string(&path).expect("read"), "[theme\nmode = ");
    }

    #[test]
    fn saved_config_round_trips_through_disk() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.tasks.confirm_delete = true;
        config.save_to_path(&path).expect("save");

        let content = fs::read_to_string(&path).expect("read");
        let loaded: Config = toml::from_str(&content).expect("parse");
        assert!(loaded.tasks.confirm_delete);
    }
}
