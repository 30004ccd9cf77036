use super::load::{default_config_path, default_state_path, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_cadenza_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", "/tmp/cadenza-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/cadenza-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("cadenza")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("cadenza")
            .join("config.toml")
    );
}

#[test]
fn default_state_path_uses_xdg_data_home_then_local_share() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");
    assert_eq!(
        default_state_path().unwrap(),
        std::path::PathBuf::from("/tmp/xdg-data/cadenza/library.json")
    );

    let _g2 = EnvGuard::remove("XDG_DATA_HOME");
    let _g3 = EnvGuard::set("HOME", "/tmp/home-dir");
    assert_eq!(
        default_state_path().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/share/cadenza/library.json")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
volume = 0.8

[playback]
shuffle = true
poll_interval_ms = 250
restart_threshold_secs = 5
history_limit = 7
preview_settle_ms = 40
preview_end_margin_ms = 300

[search]
enabled = false
endpoint = "https://example.test/search"
limit = 3

[controls]
scrub_seconds = 9

[ui]
header_text = "hello"
next_up_count = 2

[library]
extensions = ["mp3"]
recursive = false

[storage]
path = "/tmp/cadenza-state.json"

[logging]
level = "warning"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("CADENZA__PLAYBACK__POLL_INTERVAL_MS");

    let s = Settings::load().unwrap();
    assert!((s.audio.volume - 0.8).abs() < f32::EPSILON);
    assert!(s.playback.shuffle);
    assert!(!s.playback.repeat);
    assert_eq!(s.playback.poll_interval(), std::time::Duration::from_millis(250));
    assert_eq!(s.playback.restart_threshold(), std::time::Duration::from_secs(5));
    assert_eq!(s.playback.history_limit, 7);
    assert_eq!(s.playback.preview_settle_ms, 40);
    assert_eq!(s.playback.preview_end_margin_ms, 300);
    assert!(!s.search.enabled);
    assert_eq!(s.search.endpoint, "https://example.test/search");
    assert_eq!(s.search.limit, 3);
    assert_eq!(s.search.timeout_ms, SearchSettings::default().timeout_ms);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.next_up_count, 2);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert_eq!(
        s.storage.path,
        Some(std::path::PathBuf::from("/tmp/cadenza-state.json"))
    );
    assert_eq!(s.logging.level, LogLevel::Warn);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
poll_interval_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("CADENZA__PLAYBACK__POLL_INTERVAL_MS", "50");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.poll_interval_ms, 50);
}

#[test]
fn load_or_default_falls_back_on_invalid_or_broken_config() {
    let _lock = env_lock();
    let _g2 = EnvGuard::remove("CADENZA__PLAYBACK__POLL_INTERVAL_MS");

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "[playback]\npoll_interval_ms = 0\nhistory_limit = 4\n").unwrap();
    let _g1 = EnvGuard::set("CADENZA_CONFIG_PATH", cfg_path.to_str().unwrap());

    let s = Settings::load_or_default();
    assert_eq!(s.playback.poll_interval_ms, PlaybackSettings::default().poll_interval_ms);
    assert_eq!(s.playback.history_limit, PlaybackSettings::default().history_limit);

    std::fs::write(&cfg_path, "[playback\nnot toml").unwrap();
    let s = Settings::load_or_default();
    assert_eq!(s.playback.history_limit, PlaybackSettings::default().history_limit);

    std::fs::write(&cfg_path, "[playback]\nhistory_limit = 4\n").unwrap();
    assert_eq!(Settings::load_or_default().playback.history_limit, 4);
}

#[test]
fn validate_rejects_zero_poll_interval_and_loud_volume() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.playback.poll_interval_ms = 0;
    assert!(s.validate().is_err());

    s.playback.poll_interval_ms = 100;
    s.audio.volume = 1.5;
    assert!(s.validate().is_err());
}
