use crate::cli::Args;
use bangumi_rank::config::{Config, normalize_base_url};
use bangumi_rank::constants::ui::TERMINAL_TITLE;
use bangumi_rank::data_fetcher::models::{SeasonId, group_seasons_by_year, season_for_month};
use bangumi_rank::data_fetcher::{
    DataStream, ErrorClassification, ErrorKind, RankingApi, RetryPolicy,
};
use bangumi_rank::error::AppError;
use bangumi_rank::teletext_ui::{TeletextPage, build_error_page, build_ranking_page};
use chrono::{Datelike, Local};
use crossterm::{execute, terminal::SetTitle};
use std::io::stdout;

/// Validates command line argument combinations.
///
/// Returns an error if incompatible arguments are used together.
pub fn validate_args(args: &Args) -> Result<(), AppError> {
    if args.new_log_file_path.is_some() && args.clear_log_file_path {
        return Err(AppError::config_error(
            "Cannot use --set-log-file and --clear-log-file together",
        ));
    }
    if let Some(url) = &args.new_api_base_url
        && url.trim().is_empty()
    {
        return Err(AppError::config_error("API base URL cannot be empty"));
    }
    Ok(())
}

/// Handles the --version command.
pub fn handle_version_command() -> Result<(), AppError> {
    execute!(stdout(), SetTitle(TERMINAL_TITLE))?;
    println!("{} {}", bangumi_rank::NAME, bangumi_rank::VERSION);
    Ok(())
}

/// Handles the --list-config command.
pub async fn handle_list_config_command() -> Result<(), AppError> {
    execute!(stdout(), SetTitle(TERMINAL_TITLE))?;
    Config::display().await?;
    Ok(())
}

/// Handles configuration update commands (--config, --set-log-file, --clear-log-file).
///
/// Updates configuration based on the provided arguments and saves changes.
pub async fn handle_config_update_command(args: &Args) -> Result<(), AppError> {
    let mut config = Config::load().await.unwrap_or_default();

    if let Some(new_url) = &args.new_api_base_url {
        config.api_base_url = normalize_base_url(new_url);
    }

    if let Some(new_log_path) = &args.new_log_file_path {
        config.log_file_path = Some(new_log_path.clone());
    } else if args.clear_log_file_path {
        config.log_file_path = None;
        println!("Custom log file path cleared. Using default location.");
    }

    config.validate()?;
    config.save().await?;
    println!("Config updated successfully!");

    Ok(())
}

/// Season shown when none was requested: the API's current season, or the
/// calendar season when the list could not be loaded.
async fn resolve_season(
    api: &RankingApi,
    policy: RetryPolicy,
    retries: u32,
) -> Result<SeasonId, ErrorClassification> {
    let seasons = DataStream::season_list(api.clone(), policy);
    let list_result = seasons.load_with_retries(retries).await;

    if let Some(id) = seasons.data().and_then(|list| list.current_season_id()) {
        return Ok(id);
    }
    let now = Local::now();
    match (season_for_month(now.year(), now.month()), list_result) {
        (Some(id), _) => {
            tracing::warn!("Season list unavailable; using calendar season {id}");
            Ok(id)
        }
        (None, Err(error)) => Err(error),
        (None, Ok(())) => Err(ErrorClassification {
            kind: ErrorKind::Unknown,
            retryable: false,
            status: None,
            message: "No season available".to_string(),
        }),
    }
}

/// Builds the page --once prints.
pub async fn build_once_page(
    api: &RankingApi,
    policy: RetryPolicy,
    args: &Args,
) -> TeletextPage {
    let sort = args.sort_state();

    let season_id = match args.season {
        Some(id) => id,
        None => match resolve_season(api, policy, args.retries).await {
            Ok(id) => id,
            Err(error) => return build_error_page(None, &sort, &error, false),
        },
    };

    let detail = DataStream::season_detail(api.clone(), policy, season_id);
    match detail.load_with_retries(args.retries).await {
        Ok(()) => match detail.data() {
            Some(data) => build_ranking_page(&data, &sort, false, None),
            None => build_error_page(
                Some(season_id),
                &sort,
                &ErrorClassification {
                    kind: ErrorKind::Unknown,
                    retryable: false,
                    status: None,
                    message: "No data".to_string(),
                },
                false,
            ),
        },
        Err(error) => build_error_page(Some(season_id), &sort, &error, false),
    }
}

/// Handles the --once command (quick view mode).
///
/// Fetches and prints the rankings once, then exits. Retryable failures
/// are retried `--retries` times; a final failure is printed as a page.
pub async fn handle_once_command(args: &Args, config: &Config) -> Result<(), AppError> {
    let api = RankingApi::from_config(config)?;
    let policy = RetryPolicy::from_config(config);

    let page = build_once_page(&api, policy, args).await;

    // Set terminal title for non-interactive mode
    execute!(stdout(), SetTitle(TERMINAL_TITLE))?;

    page.render_buffered(&mut stdout())?;
    println!(); // Add a newline at the end

    Ok(())
}

/// Handles the --list-seasons command.
///
/// Prints the available seasons grouped by year, newest first, marking the
/// current one.
pub async fn handle_list_seasons_command(args: &Args, config: &Config) -> Result<(), AppError> {
    let api = RankingApi::from_config(config)?;
    let policy = RetryPolicy::from_config(config);

    let stream = DataStream::season_list(api, policy);
    if let Err(error) = stream.load_with_retries(args.retries).await {
        eprintln!("无法获取季度列表: {error}");
        return Ok(());
    }
    let Some(list) = stream.data() else {
        return Ok(());
    };

    let current = list.current_season_id();
    println!("可用季度 (共 {} 个)", list.seasons.len());
    for (year, seasons) in group_seasons_by_year(&list.seasons).iter().rev() {
        let months = seasons
            .iter()
            .map(|season| {
                if Some(season.season_id) == current {
                    format!("{}月*", season.month)
                } else {
                    format!("{}月", season.month)
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("{year}年  {months}");
    }
    if let Some(id) = current {
        println!("* 当前季度: {} ({id})", id.display_name());
    }

    Ok(())
}

/// Handles the --check-api command.
///
/// Returns the failure so the process exits with a non-zero status.
pub async fn handle_check_api_command(config: &Config) -> Result<(), AppError> {
    let api = RankingApi::from_config(config)?;

    match api.check_health().await {
        Ok(report) => {
            println!("API OK: {}", report.url);
            println!("Status: {}", report.status);
            println!("Latency: {} ms", report.latency.as_millis());
            if let Some(count) = report.season_count {
                println!("Seasons: {count}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("API check failed: {e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bangumi_rank::data_fetcher::api::create_http_client_with_timeout;
    use bangumi_rank::teletext_ui::TeletextRow;
    use clap::Parser;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn api_for(server: &MockServer) -> RankingApi {
        let client = create_http_client_with_timeout(Duration::from_secs(5)).unwrap();
        RankingApi::new(client, server.uri())
    }

    #[test]
    fn test_validate_args_conflicts() {
        let args =
            Args::try_parse_from(["bangumi_rank", "--set-log-file", "a.log", "--clear-log-file"])
                .unwrap();
        assert!(validate_args(&args).is_err());

        let args = Args::try_parse_from(["bangumi_rank", "--config", " "]).unwrap();
        assert!(validate_args(&args).is_err());

        let args = Args::try_parse_from(["bangumi_rank", "--once"]).unwrap();
        assert!(validate_args(&args).is_ok());
    }

    #[tokio::test]
    async fn test_once_page_uses_current_season() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/season/available"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "current_season_id": 202501,
                "available_seasons": [202501]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v0/season/202501"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "season_id": "202501",
                "updated_at": "2025-02-01T00:00:00Z",
                "subjects": [{"id": 7, "name": "X", "name_cn": "某作品", "rank": 1, "score": 8.1}]
            })))
            .mount(&server)
            .await;

        let args = Args::try_parse_from(["bangumi_rank", "--once"]).unwrap();
        let page = build_once_page(&api_for(&server), RetryPolicy::immediate(), &args).await;
        assert_eq!(page.subject_count(), 1);
    }

    #[tokio::test]
    async fn test_once_page_retries_then_shows_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/season/202504"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let args =
            Args::try_parse_from(["bangumi_rank", "--once", "--season", "202504"]).unwrap();
        let page = build_once_page(&api_for(&server), RetryPolicy::immediate(), &args).await;
        assert_eq!(page.subject_count(), 0);
        assert!(
            page.rows()
                .iter()
                .any(|row| matches!(row, TeletextRow::ErrorMessage(text) if text.contains("503")))
        );
    }

    #[tokio::test]
    async fn test_once_page_does_not_retry_missing_season() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v0/season/201001"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let args =
            Args::try_parse_from(["bangumi_rank", "--once", "--season", "201001"]).unwrap();
        let page = build_once_page(&api_for(&server), RetryPolicy::immediate(), &args).await;
        assert_eq!(page.subject_count(), 0);
    }
}
