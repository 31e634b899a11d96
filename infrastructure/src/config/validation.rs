//! Configuration validation results.
//!
//! Validation never stops at the first problem: [`FileConfig::validate`]
//! returns every issue with a severity, and the caller decides whether to
//! abort (any [`Severity::Error`]) or just print warnings.
//!
//! [`FileConfig::validate`]: super::FileConfig::validate

use std::fmt;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// `default_role` names no known role.
    UnknownDefaultRole { role: String },
    /// The default role exists but cannot be called.
    DefaultRoleUnavailable { role: String },
    /// A role lacks credential, endpoint or model.
    RoleUnavailable {
        role: String,
        missing: Vec<&'static str>,
    },
    /// A `[roles.<id>]` key is not a valid role name.
    InvalidRoleId { role: String },
    /// `provider` is not one the backend client speaks.
    UnknownProvider { role: String, provider: String },
    /// `collaboration.max_transitions` is zero.
    ZeroMaxTransitions,
    /// `collaboration.context_window` is zero: roles would see no history.
    ZeroContextWindow,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {}", level, self.message)
    }
}
