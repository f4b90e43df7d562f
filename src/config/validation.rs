use crate::error::AppError;
use reqwest::Url;
use std::path::Path;

use super::Config;

/// Validates a domain setting.
///
/// A domain must parse as an absolute http(s) URL with a host.
fn validate_domain(name: &str, domain: &str) -> Result<(), AppError> {
    if domain.trim().is_empty() {
        return Err(AppError::config_error(format!("{name} cannot be empty")));
    }

    let url = Url::parse(domain.trim()).map_err(|e| {
        AppError::config_error(format!("{name} '{domain}' is not a valid URL: {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AppError::config_error(format!(
            "{name} '{domain}' must be an http(s) URL with a host"
        )));
    }

    Ok(())
}

/// Validates the configuration settings
///
/// # Validation Rules
/// - Both API domains must be absolute http(s) URLs
/// - At least one default competition must be configured
/// - HTTP timeout must be positive
/// - Rounds per page must be positive
/// - If a log file path is provided, it cannot be empty and its parent
///   directory must exist or be creatable
pub fn validate_config(config: &Config) -> Result<(), AppError> {
    validate_domain("API domain", &config.api_domain)?;
    validate_domain("OpenLigaDB domain", &config.openliga_domain)?;

    if config
        .default_competitions
        .iter()
        .all(|code| code.trim().is_empty())
    {
        return Err(AppError::config_error(
            "At least one default competition is required",
        ));
    }

    if config.http_timeout_seconds == 0 {
        return Err(AppError::config_error("HTTP timeout must be positive"));
    }

    if config.rounds_per_page == 0 {
        return Err(AppError::config_error("rounds_per_page must be positive"));
    }

    if let Some(log_path) = &config.log_file_path {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_empty_domain() {
        let config = Config {
            api_domain: String::new(),
            ..Config::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("API domain cannot be empty"));
    }

    #[test]
    fn test_rejects_bare_word_domain() {
        let config = Config {
            openliga_domain: "openliga".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_domain_without_scheme() {
        let config = Config {
            api_domain: "api.example.com".to_string(),
            ..Config::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("API domain 'api.example.com'"));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let config = Config {
            openliga_domain: "ftp://api.openligadb.de".to_string(),
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rejects_blank_competitions() {
        let config = Config {
            default_competitions: vec!["  ".to_string()],
            ..Config::default()
        };
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("competition"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = Config {
            http_timeout_seconds: 0,
            ..Config::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_creates_log_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("nested").join("board.log");
        let config = Config {
            log_file_path: Some(log_path.to_string_lossy().to_string()),
            ..Config::default()
        };
        assert!(validate_config(&config).is_ok());
        assert!(dir.path().join("nested").exists());
    }
}
