use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, str::FromStr, time::Duration};

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub request_timeout: Duration,
    pub cors_origins: Vec<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Qubes Air management console API")]
pub struct Args {
    /// Host to bind to (overrides QUBES_AIR_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides QUBES_AIR_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides QUBES_AIR_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum pooled SQLite connections (overrides QUBES_AIR_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Per-request deadline in seconds (overrides QUBES_AIR_REQUEST_TIMEOUT_SECS)
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Comma-separated CORS origins, `*` for any (overrides QUBES_AIR_CORS_ORIGINS)
    #[arg(long)]
    pub cors_origins: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::from_sources(args, |key: &str| env::var(key).ok())?;
        Ok((cfg, migrate))
    }

    /// Merge CLI args over values looked up with `env`, then validate.
    pub fn from_sources(args: Args, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // --- Environment fallback ---
        let env_host = env("QUBES_AIR_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let env_port = parse_env(&env, "QUBES_AIR_PORT")?.unwrap_or(8080);
        let env_db = env("QUBES_AIR_DATABASE_URL")
            .unwrap_or_else(|| "sqlite://./qubes-air.db".into());
        let env_max_conns = parse_env(&env, "QUBES_AIR_MAX_CONNECTIONS")?.unwrap_or(5);
        let env_timeout = parse_env(&env, "QUBES_AIR_REQUEST_TIMEOUT_SECS")?.unwrap_or(30);
        let env_origins = env("QUBES_AIR_CORS_ORIGINS").unwrap_or_else(|| "*".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max_conns),
            request_timeout: Duration::from_secs(
                args.request_timeout_secs.unwrap_or(env_timeout),
            ),
            cors_origins: split_origins(&args.cors_origins.unwrap_or(env_origins)),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("invalid port: 0");
        }
        if self.max_connections == 0 {
            bail!("max connections must be at least 1");
        }
        if self.request_timeout.is_zero() {
            bail!("request timeout must be at least one second");
        }
        if self.database_url.trim().is_empty() {
            bail!("database URL is required");
        }
        Ok(())
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// True when any origin is allowed.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_env<T>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .with_context(|| format!("parsing {} value `{}`", key, value))
        })
        .transpose()
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_without_env_or_args() {
        let cfg = AppConfig::from_sources(Args::default(), env_of(&[])).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:8080");
        assert_eq!(cfg.database_url, "sqlite://./qubes-air.db");
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert!(cfg.cors_allows_any());
    }

    #[test]
    fn args_override_env() {
        let args = Args {
            port: Some(9000),
            ..Default::default()
        };
        let env = env_of(&[
            ("QUBES_AIR_PORT", "7000"),
            ("QUBES_AIR_HOST", "127.0.0.1"),
            ("QUBES_AIR_CORS_ORIGINS", "http://a.test, http://b.test"),
        ]);
        let cfg = AppConfig::from_sources(args, env).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:9000");
        assert_eq!(cfg.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert!(!cfg.cors_allows_any());
    }

    #[test]
    fn invalid_env_values_are_reported() {
        let err = AppConfig::from_sources(Args::default(), env_of(&[("QUBES_AIR_PORT", "abc")]))
            .unwrap_err();
        assert!(err.to_string().contains("QUBES_AIR_PORT"));

        let err = AppConfig::from_sources(Args::default(), env_of(&[("QUBES_AIR_PORT", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("invalid port"));
    }
}
