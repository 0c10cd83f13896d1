use crate::error::AppError;
use std::path::Path;

/// Validates the configuration settings
///
/// # Validation Rules
/// - API base URL cannot be empty and must look like a URL or domain name
/// - HTTP timeout must be at least one second
/// - Retry base delay must be positive and not exceed the maximum delay
/// - If log file path is provided, it cannot be empty and its parent
///   directory must exist or be creatable
pub fn validate_config(
    api_base_url: &str,
    log_file_path: &Option<String>,
    http_timeout_seconds: u64,
    retry_base_delay_ms: u64,
    retry_max_delay_ms: u64,
) -> Result<(), AppError> {
    if api_base_url.is_empty() {
        return Err(AppError::config_error("API base URL cannot be empty"));
    }

    if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
        // Without a scheme it should at least look like a domain
        if !api_base_url.contains('.') && !api_base_url.starts_with("localhost") {
            return Err(AppError::config_error(
                "API base URL must be a valid URL or domain name",
            ));
        }
    }

    if http_timeout_seconds == 0 {
        return Err(AppError::config_error(
            "HTTP timeout must be at least 1 second",
        ));
    }

    if retry_base_delay_ms == 0 {
        return Err(AppError::config_error("Retry base delay must be positive"));
    }

    if retry_base_delay_ms > retry_max_delay_ms {
        return Err(AppError::config_error(format!(
            "Retry base delay ({retry_base_delay_ms} ms) exceeds maximum delay ({retry_max_delay_ms} ms)"
        )));
    }

    if let Some(log_path) = log_file_path {
        if log_path.is_empty() {
            return Err(AppError::config_error("Log file path cannot be empty"));
        }

        if let Some(parent) = Path::new(log_path).parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::config_error(format!(
                    "Cannot create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    Ok(())
}
