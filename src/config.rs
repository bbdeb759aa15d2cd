//! Runtime configuration loaded from environment variables.

use crate::error::ConfigError;
use std::str::FromStr;

/// Pagination defaults and limits applied at the HTTP boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_page_size: i64,
    /// Larger requested page sizes are clamped to this value.
    pub max_page_size: i64,
    pub default_sort_column: String,
    pub default_sort_order: String,
}

impl Default for PagingConfig {
    fn default() -> Self {
        PagingConfig {
            default_page_size: 10,
            max_page_size: 1000,
            default_sort_column: "id".into(),
            default_sort_order: "asc".into(),
        }
    }
}

/// Server configuration.
///
/// | Env Var              | Default                        |
/// |----------------------|--------------------------------|
/// | `DATABASE_URL`       | `postgres://localhost/crud`    |
/// | `HOST`               | `0.0.0.0`                      |
/// | `PORT`               | `3000`                         |
/// | `DB_MAX_CONNECTIONS` | `5`                            |
/// | `MAX_BODY_BYTES`     | `1048576`                      |
/// | `DEFAULT_PAGE_SIZE`  | `10`                           |
/// | `MAX_PAGE_SIZE`      | `1000`                         |
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub max_connections: u32,
    pub max_body_bytes: usize,
    pub paging: PagingConfig,
}

impl ServerConfig {
    /// Load `.env` when present, then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::Other(format!(".env: {}", e)));
            }
        }
        Self::from_env()
    }

    /// Read from the process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = PagingConfig::default();
        let paging = PagingConfig {
            default_page_size: parse_or(&lookup, "DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_or(&lookup, "MAX_PAGE_SIZE", defaults.max_page_size)?,
            ..defaults
        };
        if paging.default_page_size < 1 || paging.max_page_size < paging.default_page_size {
            return Err(ConfigError::Other(format!(
                "page sizes must satisfy 1 <= DEFAULT_PAGE_SIZE ({}) <= MAX_PAGE_SIZE ({})",
                paging.default_page_size, paging.max_page_size
            )));
        }
        Ok(ServerConfig {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/crud".into()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 3000)?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", 1024 * 1024)?,
            paging,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert_eq!(config.paging, PagingConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("DEFAULT_PAGE_SIZE", "25"),
            ("MAX_PAGE_SIZE", "50"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.paging.default_page_size, 25);
        assert_eq!(config.paging.max_page_size, 50);
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn inconsistent_page_sizes_are_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("DEFAULT_PAGE_SIZE", "100"), ("MAX_PAGE_SIZE", "10")]));
        assert!(matches!(err, Err(ConfigError::Other(_))));
    }
}
