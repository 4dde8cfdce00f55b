use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_ORIGINS: &[&str] = &["http://localhost:3000", "http://localhost:5173"];

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub run_migrations: bool,
}

impl AppConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid HOST '{}'", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

pub fn load_config() -> Result<AppConfig> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .map(|value| value.trim().parse::<u32>())
        .transpose()
        .context("Failed to parse DATABASE_MAX_CONNECTIONS")?
        .unwrap_or(5);

    let jwt_secret = env::var("JWT_SECRET")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .ok_or_else(|| anyhow!("JWT_SECRET must be set to a non-empty value"))?;

    let jwt_issuer = env::var("JWT_ISSUER")
        .ok()
        .and_then(|value| normalize_optional(&value))
        .unwrap_or_else(|| "store-rating".to_string());

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT")
        .ok()
        .map(|value| value.trim().parse::<u16>())
        .transpose()
        .context("Failed to parse PORT")?
        .unwrap_or(3000);

    let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|value| parse_list(&value))
        .filter(|origins| !origins.is_empty())
        .unwrap_or_else(|| DEFAULT_ORIGINS.iter().map(|origin| origin.to_string()).collect());

    let run_migrations = bool_from_env("RUN_MIGRATIONS").unwrap_or(true);

    Ok(AppConfig {
        database_url,
        database_max_connections,
        jwt_secret,
        jwt_issuer,
        host,
        port,
        cors_allowed_origins,
        run_migrations,
    })
}

fn bool_from_env(key: &str) -> Option<bool> {
    env::var(key).ok().map(|value| {
        matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';' || c == ' ')
        .filter_map(normalize_optional)
        .collect()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_from_env_parses() {
        std::env::set_var("RATING_TEST_BOOL_TRUE", "true");
        std::env::set_var("RATING_TEST_BOOL_ONE", "1");
        std::env::set_var("RATING_TEST_BOOL_FALSE", "no");
        assert_eq!(bool_from_env("RATING_TEST_BOOL_TRUE"), Some(true));
        assert_eq!(bool_from_env("RATING_TEST_BOOL_ONE"), Some(true));
        assert_eq!(bool_from_env("RATING_TEST_BOOL_FALSE"), Some(false));
        assert_eq!(bool_from_env("RATING_TEST_BOOL_UNSET"), None);
    }

    #[test]
    fn parse_list_splits_and_trims() {
        let origins = parse_list("http://a.test, http://b.test;;http://c.test ");
        assert_eq!(origins, vec!["http://a.test", "http://b.test", "http://c.test"]);
    }

    #[test]
    fn socket_addr_rejects_bad_host() {
        let config = AppConfig {
            database_url: "postgres://localhost/ratings".into(),
            database_max_connections: 5,
            jwt_secret: "secret".into(),
            jwt_issuer: "store-rating".into(),
            host: "not-an-ip".into(),
            port: 3000,
            cors_allowed_origins: Vec::new(),
            run_migrations: false,
        };
        assert!(config.socket_addr().is_err());
        let config = AppConfig { host: "127.0.0.1".into(), ..config };
        assert_eq!(config.socket_addr().expect("addr").port(), 3000);
    }
}
