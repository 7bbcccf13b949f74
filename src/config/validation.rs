//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts, timeouts and pool widths > 0)
//! - Reject credential and suppression rules that would match everything
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::MonitorConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be at least 1")]
    ZeroValue { field: &'static str },

    #[error("{field} must not be empty")]
    EmptyPath { field: &'static str },

    #[error("credentials[{index}] has no usable pattern")]
    EmptyCredentialPattern { index: usize },

    #[error("credentials[{index}] has an empty username")]
    EmptyUsername { index: usize },

    #[error("suppress[{index}] is empty and would match every failure")]
    EmptySuppressPattern { index: usize },
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.retry.max_attempts == 0 {
        errors.push(ValidationError::ZeroValue { field: "retry.max_attempts" });
    }
    if config.probe.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue { field: "probe.timeout_secs" });
    }
    if config.concurrency.thread_workers == 0 {
        errors.push(ValidationError::ZeroValue { field: "concurrency.thread_workers" });
    }
    if config.concurrency.process_workers == Some(0) {
        errors.push(ValidationError::ZeroValue { field: "concurrency.process_workers" });
    }
    if config.targets.path.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyPath { field: "targets.path" });
    }
    if config.report.path.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyPath { field: "report.path" });
    }

    for (index, rule) in config.credentials.iter().enumerate() {
        if rule.patterns.is_empty() || rule.patterns.iter().any(|p| p.is_empty()) {
            errors.push(ValidationError::EmptyCredentialPattern { index });
        }
        if rule.username.is_empty() {
            errors.push(ValidationError::EmptyUsername { index });
        }
    }

    for (index, pattern) in config.suppress.iter().enumerate() {
        if pattern.is_empty() {
            errors.push(ValidationError::EmptySuppressPattern { index });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::CredentialRule;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&MonitorConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = MonitorConfig::default();
        config.retry.max_attempts = 0;
        config.concurrency.thread_workers = 0;
        config.suppress.push(String::new());
        config.credentials.push(CredentialRule {
            patterns: vec![],
            realm: None,
            username: String::new(),
            password: "x".into(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroValue { field: "retry.max_attempts" }));
        assert!(errors.contains(&ValidationError::EmptyCredentialPattern { index: 0 }));
        assert!(errors.contains(&ValidationError::EmptyUsername { index: 0 }));
        assert!(errors.contains(&ValidationError::EmptySuppressPattern { index: 0 }));
    }

    #[test]
    fn test_error_messages() {
        let err = ValidationError::ZeroValue { field: "probe.timeout_secs" };
        assert_eq!(err.to_string(), "probe.timeout_secs must be at least 1");
    }
}
