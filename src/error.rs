use thiserror::Error;

/// Provider configuration errors.
///
/// A query shape that cannot be translated is not an error: translation
///  returns `None` for it. These variants are raised while a provider is
///  being put together and mean it was misconfigured.
#[derive(Debug, Error)]
pub enum Error {
    #[error("the SQL expression factory must be the {expected} implementation")]
    InvalidSqlExpressionFactory { expected: &'static str },

    #[error("no type mapping for store type '{0}'")]
    MissingTypeMapping(String),

    #[error("invalid provider options: {0}")]
    InvalidOptions(#[from] toml::de::Error),

    #[error("invalid PostgreSQL version '{0}', expected major[.minor]")]
    InvalidPostgresVersion(String),
}

pub type Result<T> = std::result::Result<T, Error>;
