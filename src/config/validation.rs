use crate::config::types::{
    CheckpointConfig, Config, PolitenessConfig, RetryConfig, RetryPolicy, SiteEntry,
    StorageBackend, StorageConfig,
};
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_politeness_config(&config.politeness)?;
    validate_retry_config(&config.retry)?;
    validate_storage_config(&config.storage)?;
    validate_checkpoint_config(&config.checkpoint)?;
    validate_site_entries(&config.site)?;
    Ok(())
}

/// Validates politeness configuration
fn validate_politeness_config(config: &PolitenessConfig) -> Result<(), ConfigError> {
    if !config.delay_factor.is_finite() || config.delay_factor < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay_factor must be a finite number >= 0, got {}",
            config.delay_factor
        )));
    }

    if config.min_delay_ms > config.max_delay_ms {
        return Err(ConfigError::Validation(format!(
            "min_delay_ms ({}) must not exceed max_delay_ms ({})",
            config.min_delay_ms, config.max_delay_ms
        )));
    }

    Ok(())
}

/// Validates retry configuration
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be >= 1, got {}",
            config.max_retries
        )));
    }

    if config.policy == RetryPolicy::Backoff {
        if config.backoff_base_ms == 0 {
            return Err(ConfigError::Validation(
                "backoff_base_ms must be > 0 when the backoff policy is used".to_string(),
            ));
        }

        if config.backoff_base_ms > config.backoff_max_ms {
            return Err(ConfigError::Validation(format!(
                "backoff_base_ms ({}) must not exceed backoff_max_ms ({})",
                config.backoff_base_ms, config.backoff_max_ms
            )));
        }
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.backend == StorageBackend::Sqlite && config.path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "storage path cannot be empty for the sqlite backend".to_string(),
        ));
    }

    Ok(())
}

/// Validates checkpoint configuration
fn validate_checkpoint_config(config: &CheckpointConfig) -> Result<(), ConfigError> {
    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "checkpoint directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates per-site override entries
fn validate_site_entries(entries: &[SiteEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        validate_domain_pattern(&entry.domain)?;

        if let Some(key) = &entry.queue_key {
            if key.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "queue_key for site '{}' cannot be empty",
                    entry.domain
                )));
            }
        }
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    if let Some(domain) = pattern.strip_prefix("*.") {
        validate_domain_string(domain)?;
    } else {
        validate_domain_string(pattern)?;
    }

    Ok(())
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_domain_pattern() {
        assert!(validate_domain_pattern("example.com").is_ok());
        assert!(validate_domain_pattern("*.example.com").is_ok());
        assert!(validate_domain_pattern("sub.example.com").is_ok());

        assert!(validate_domain_pattern("").is_err());
        assert!(validate_domain_pattern("*.").is_err());
        assert!(validate_domain_pattern("example").is_err());
        assert!(validate_domain_pattern(".example.com").is_err());
        assert!(validate_domain_pattern("example.com.").is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_negative_delay_factor_rejected() {
        let mut config = Config::default();
        config.politeness.delay_factor = -1.0;
        assert!(validate(&config).is_err());

        config.politeness.delay_factor = f64::NAN;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_delays_allowed() {
        let mut config = Config::default();
        config.politeness.delay_factor = 0.0;
        config.politeness.min_delay_ms = 0;
        config.politeness.max_delay_ms = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_max_retries_rejected() {
        let mut config = Config::default();
        config.retry.max_retries = 0;
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::Validation(_)
        ));
    }

    #[test]
    fn test_backoff_bounds_checked_only_for_backoff_policy() {
        let mut config = Config::default();
        config.retry.backoff_base_ms = 10_000;
        config.retry.backoff_max_ms = 10;
        assert!(validate(&config).is_ok());

        config.retry.policy = RetryPolicy::Backoff;
        assert!(validate(&config).is_err());

        config.retry.backoff_base_ms = 0;
        config.retry.backoff_max_ms = 10;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_sqlite_requires_path() {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Sqlite;
        config.storage.path = Default::default();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_site_entries_validated() {
        let mut config = Config::default();
        config.site.push(SiteEntry {
            domain: "bad pattern".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidPattern(_)
        ));

        config.site[0].domain = "*.example.com".to_string();
        config.site[0].queue_key = Some("  ".to_string());
        assert!(validate(&config).is_err());
    }
}
