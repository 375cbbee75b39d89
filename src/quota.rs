// src/quota.rs

use crate::error::{Result, UsageLimitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Window length used when the caller does not supply one
pub const DEFAULT_DURATION_SECONDS: u64 = 3600;

/// Which windowing algorithm governs a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowStrategy {
    /// Counter that resets once the window anchored at its first event elapses
    Fixed,
    /// Log of event timestamps inside a trailing window
    #[default]
    Sliding,
}

impl WindowStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowStrategy::Fixed => "fixed",
            WindowStrategy::Sliding => "sliding",
        }
    }
}

impl FromStr for WindowStrategy {
    type Err = UsageLimitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "fixed" => Ok(WindowStrategy::Fixed),
            "sliding" => Ok(WindowStrategy::Sliding),
            other => Err(UsageLimitError::InvalidWindowStrategy(other.to_string())),
        }
    }
}

impl fmt::Display for WindowStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The (limit, duration, strategy) tuple governing one check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDescriptor {
    /// Maximum accepted events per window
    pub limit: u64,

    /// Window length in seconds
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u64,

    #[serde(default)]
    pub strategy: WindowStrategy,
}

fn default_duration_seconds() -> u64 {
    DEFAULT_DURATION_SECONDS
}

impl QuotaDescriptor {
    pub fn new(limit: u64, duration_seconds: u64, strategy: WindowStrategy) -> Self {
        Self {
            limit,
            duration_seconds,
            strategy,
        }
    }

    /// Builds a descriptor from caller-supplied literals.
    ///
    /// Only base-10 integer literals are accepted; `"5.0"` is rejected rather
    /// than truncated.
    pub fn parse(limit: &str, duration_seconds: Option<&str>, strategy: Option<&str>) -> Result<Self> {
        let limit = parse_positive("limit", limit)?;
        let duration_seconds = match duration_seconds {
            Some(literal) => parse_positive("duration_seconds", literal)?,
            None => DEFAULT_DURATION_SECONDS,
        };
        let strategy = match strategy {
            Some(token) => token.parse()?,
            None => WindowStrategy::default(),
        };

        Ok(Self::new(limit, duration_seconds, strategy))
    }
}

fn parse_positive(field: &'static str, literal: &str) -> Result<u64> {
    let invalid = || UsageLimitError::InvalidQuotaLiteral {
        field,
        value: literal.to_string(),
    };

    let trimmed = literal.trim();
    // u64::from_str tolerates a leading '+', integer literals here do not
    if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    match trimmed.parse::<u64>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(value) => Ok(value),
    }
}
