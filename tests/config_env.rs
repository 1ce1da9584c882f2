// tests/config_env.rs
use feed_table_export::config::{
    ENV_CONFIG_PATH, ENV_LABELS, ENV_ON_MISSING, ENV_OUTPUT, ENV_TIMEOUT_SECS, ENV_URL,
};
use feed_table_export::{ExportConfig, LabelSet, MissingFieldPolicy};
use std::path::PathBuf;
use std::{env, fs};

fn clear_env() {
    for key in [
        ENV_CONFIG_PATH,
        ENV_URL,
        ENV_OUTPUT,
        ENV_LABELS,
        ENV_ON_MISSING,
        ENV_TIMEOUT_SECS,
    ] {
        env::remove_var(key);
    }
}

#[test]
fn load_from_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("feed_export.toml");
    fs::write(
        &p_toml,
        r#"
feed_url = "https://example.test/rss"
output_path = "out/feed.csv"
labels = "pt-br"
"#,
    )
    .unwrap();
    let cfg = ExportConfig::load_from(&p_toml).unwrap();
    assert_eq!(cfg.feed_url, "https://example.test/rss");
    assert_eq!(cfg.output_path, PathBuf::from("out/feed.csv"));
    assert_eq!(cfg.labels, LabelSet::Portuguese);

    let p_json = dir.path().join("feed_export.json");
    fs::write(&p_json, r#"{"on_missing": "skip", "timeout_secs": 10}"#).unwrap();
    let cfg = ExportConfig::load_from(&p_json).unwrap();
    assert_eq!(cfg.on_missing, MissingFieldPolicy::Skip);
    assert_eq!(cfg.timeout_secs, Some(10));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Run inside a temp CWD so the repo's own config/ is not picked up
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    // 1) Nothing on disk, no env → built-in defaults
    let cfg = ExportConfig::load_default().unwrap();
    assert_eq!(cfg, ExportConfig::default());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("feed_export.toml"),
        r#"output_path = "exports/stj.csv""#,
    )
    .unwrap();
    let cfg = ExportConfig::load_default().unwrap();
    assert_eq!(cfg.output_path, PathBuf::from("exports/stj.csv"));

    // 3) Explicit path wins over the fallback
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"output_path": "elsewhere.csv"}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    let cfg = ExportConfig::load_default().unwrap();
    assert_eq!(cfg.output_path, PathBuf::from("elsewhere.csv"));

    // 4) Single-value overrides win over any file
    env::set_var(ENV_OUTPUT, "override.csv");
    env::set_var(ENV_ON_MISSING, "skip");
    let cfg = ExportConfig::load_default().unwrap();
    assert_eq!(cfg.output_path, PathBuf::from("override.csv"));
    assert_eq!(cfg.on_missing, MissingFieldPolicy::Skip);

    // 5) Dangling explicit path is an error
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(ExportConfig::load_default().is_err());

    clear_env();
    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn invalid_override_is_reported() {
    // Temp CWD: a local config/feed_export.toml must not decide the outcome
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    clear_env();

    env::set_var(ENV_URL, "https://example.test/rss");
    env::set_var(ENV_LABELS, "klingon");
    let err = ExportConfig::load_default().unwrap_err();
    assert!(format!("{err:#}").contains(ENV_LABELS));

    clear_env();
    env::set_current_dir(&old).unwrap();
}
