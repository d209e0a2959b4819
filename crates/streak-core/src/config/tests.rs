use super::*;

#[test]
fn test_defaults_from_empty_toml() {
    let cfg: Config = toml::from_str("").unwrap();
    assert_eq!(cfg.schedule.timezone, "UTC");
    assert_eq!(cfg.schedule.day_start, "00:01");
    assert_eq!(cfg.schedule.day_end, "23:59");
    assert_eq!(cfg.glyphs.active, "\u{1f525}");
    assert_eq!(cfg.sync.rename_concurrency, 4);
    assert_eq!(cfg.streak.language, "ru");
    assert!(cfg.telegram.enabled);
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_partial_sections_keep_defaults() {
    let toml_str = r#"
        [schedule]
        timezone = "Europe/Kyiv"

        [glyphs]
        waiting = "~"
    "#;
    let cfg: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(cfg.schedule.timezone, "Europe/Kyiv");
    assert_eq!(cfg.schedule.day_start, "00:01");
    assert_eq!(cfg.glyphs.waiting, "~");
    assert_eq!(cfg.glyphs.inactive, "\u{1f9ca}");
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_validate_rejects_bad_timezone() {
    let mut cfg = Config::default();
    cfg.schedule.timezone = "Mars/Olympus".into();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("timezone"), "got: {err}");
}

#[test]
fn test_validate_rejects_end_before_start() {
    let mut cfg = Config::default();
    cfg.schedule.day_start = "12:00".into();
    cfg.schedule.day_end = "08:00".into();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_concurrency() {
    let mut cfg = Config::default();
    cfg.sync.rename_concurrency = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_validate_rejects_zero_rename_timeout() {
    let cfg: Config = toml::from_str("[sync]\nrename_timeout_secs = 0").unwrap();
    assert!(cfg.validate().is_err());

    let cfg: Config = toml::from_str("[sync]\nrename_timeout_secs = 1").unwrap();
    assert!(cfg.validate().is_ok());
}

#[test]
fn test_validate_rejects_unknown_language() {
    let mut cfg = Config::default();
    cfg.streak.language = "de".into();
    assert!(cfg.validate().is_err());
}

#[test]
fn test_store_path_relative_and_absolute() {
    let mut cfg = StreakConfig {
        data_dir: "/var/lib/streak".into(),
        ..Default::default()
    };
    assert_eq!(
        cfg.store_path(),
        PathBuf::from("/var/lib/streak/state.json")
    );

    cfg.store_file = "/tmp/elsewhere.json".into();
    assert_eq!(cfg.store_path(), PathBuf::from("/tmp/elsewhere.json"));
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let cfg = load("/nonexistent/__streak_config__.toml").unwrap();
    assert_eq!(cfg.schedule.timezone, "UTC");
}

#[test]
fn test_load_reads_file_token() {
    let dir = std::env::temp_dir().join(format!("__streak_cfg_{}__", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    let path = dir.join("config.toml");
    std::fs::write(
        &path,
        "[telegram]\nbot_token = \"123:abc\"\n\n[sync]\nrename_timeout_secs = 3\n",
    )
    .unwrap();

    let cfg = load(path.to_str().unwrap()).unwrap();
    assert_eq!(cfg.telegram.bot_token, "123:abc");
    assert_eq!(cfg.sync.rename_timeout_secs, 3);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_load_rejects_malformed_toml() {
    let dir = std::env::temp_dir().join(format!("__streak_cfg_bad_{}__", std::process::id()));
    let _ = std::fs::create_dir_all(&dir);
    let path = dir.join("config.toml");
    std::fs::write(&path, "[schedule\ntimezone = ").unwrap();

    let err = load(path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, StreakError::Config(_)));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_shellexpand_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let expanded = shellexpand("~/.streak");
        assert_eq!(expanded, format!("{}/.streak", home.to_string_lossy()));
    }
    assert_eq!(shellexpand("/abs/path"), "/abs/path");
}
