//! Deployment platform

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error type for parsing a platform name
#[derive(Debug, Clone)]
pub struct ParsePlatformError(String);

impl fmt::Display for ParsePlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid platform: {} (expected dev or production)", self.0)
    }
}

impl std::error::Error for ParsePlatformError {}

/// Where the server runs; destructive admin endpoints only open on `Dev`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    #[default]
    Production,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Dev => "dev",
            Platform::Production => "production",
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Platform::Dev)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ParsePlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Platform::Dev),
            "production" | "prod" => Ok(Platform::Production),
            _ => Err(ParsePlatformError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_parse() {
        assert_eq!("dev".parse::<Platform>().unwrap(), Platform::Dev);
        assert_eq!("DEV".parse::<Platform>().unwrap(), Platform::Dev);
        assert_eq!("production".parse::<Platform>().unwrap(), Platform::Production);
        assert!("staging".parse::<Platform>().is_err());
    }

    #[test]
    fn test_default_is_locked_down() {
        assert!(!Platform::default().is_dev());
    }
}
