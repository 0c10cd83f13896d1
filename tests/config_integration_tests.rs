use bangumi_rank::config::Config;
use bangumi_rank::constants::env_vars;
use bangumi_rank::data_fetcher::{RankingApi, RetryPolicy};
use bangumi_rank::error::AppError;
use serial_test::serial;
use std::time::Duration;
use tempfile::tempdir;

fn clear_env() {
    unsafe {
        std::env::remove_var(env_vars::API_BASE_URL);
        std::env::remove_var(env_vars::LOG_FILE);
        std::env::remove_var(env_vars::HTTP_TIMEOUT);
    }
}

#[tokio::test]
#[serial]
async fn test_config_file_drives_api_and_retry_policy() {
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    tokio::fs::write(
        &config_path,
        r#"
api_base_url = "localhost:9000/"
http_timeout_seconds = 3
retry_base_delay_ms = 250
retry_max_delay_ms = 1000
"#,
    )
    .await
    .unwrap();

    let config = Config::load_with_overrides(&config_path.to_string_lossy())
        .await
        .unwrap();
    assert_eq!(config.api_base_url, "https://localhost:9000");
    assert_eq!(config.http_timeout(), Duration::from_secs(3));

    let policy = RetryPolicy::from_config(&config);
    assert_eq!(policy.delay_for(0), Duration::from_millis(250));
    assert_eq!(policy.delay_for(1), Duration::from_millis(500));
    assert_eq!(policy.delay_for(5), Duration::from_millis(1000));

    let api = RankingApi::from_config(&config).unwrap();
    assert_eq!(api.base_url(), "https://localhost:9000");
}

#[tokio::test]
#[serial]
async fn test_invalid_retry_bounds_are_rejected() {
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    tokio::fs::write(
        &config_path,
        "retry_base_delay_ms = 9000\nretry_max_delay_ms = 1000\n",
    )
    .await
    .unwrap();

    let result = Config::load_with_overrides(&config_path.to_string_lossy()).await;
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[tokio::test]
#[serial]
async fn test_log_file_env_overrides_file() {
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    let env_log = temp_dir.path().join("env").join("app.log");
    tokio::fs::write(&config_path, "log_file_path = \"/tmp/from-file.log\"\n")
        .await
        .unwrap();

    unsafe {
        std::env::set_var(env_vars::LOG_FILE, env_log.to_string_lossy().as_ref());
    }
    let config = Config::load_with_overrides(&config_path.to_string_lossy()).await;
    clear_env();

    let config = config.unwrap();
    assert_eq!(
        config.log_file_path.as_deref(),
        Some(env_log.to_string_lossy().as_ref())
    );
}

#[tokio::test]
#[serial]
async fn test_saved_config_loads_back_with_overrides() {
    clear_env();
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");
    let config = Config {
        api_base_url: "http://127.0.0.1:8080".to_string(),
        retry_jitter: true,
        ..Config::default()
    };
    config
        .save_to_path(&config_path.to_string_lossy())
        .await
        .unwrap();

    let loaded = Config::load_with_overrides(&config_path.to_string_lossy())
        .await
        .unwrap();
    assert_eq!(loaded, config);
    assert!(RetryPolicy::from_config(&loaded).jitter);
}
