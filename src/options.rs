//! Provider options, read once when the provider is built.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PostgresVersion {
    pub major: u32,
    pub minor: u32,
}

impl PostgresVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl FromStr for PostgresVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidPostgresVersion(s.to_string());
        let mut parts = s.trim().splitn(2, '.');
        let major = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(invalid)?;
        let minor = match parts.next() {
            Some(p) => p.parse().map_err(|_| invalid())?,
            None => 0,
        };
        Ok(Self { major, minor })
    }
}

impl fmt::Display for PostgresVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// ```toml
/// use_redshift = false
/// postgres_version = "12.4"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderOptions {
    /// Redshift lacks several PostgreSQL functions (`array_position`).
    pub use_redshift: bool,
    /// The targeted server version; unset means the latest.
    pub postgres_version: Option<String>,
}

impl ProviderOptions {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let options: ProviderOptions = toml::from_str(text)?;
        options.version()?;
        Ok(options)
    }

    pub fn with_postgres_version(mut self, version: impl Into<String>) -> Self {
        self.postgres_version = Some(version.into());
        self
    }

    pub fn version(&self) -> Result<Option<PostgresVersion>> {
        self.postgres_version.as_deref().map(str::parse).transpose()
    }

    /// True when no version is configured or the configured one is at least
    ///  `major.minor`.
    pub fn is_version_at_least(&self, major: u32, minor: u32) -> bool {
        match self.version() {
            Ok(Some(v)) => v >= PostgresVersion::new(major, minor),
            _ => true,
        }
    }
}
