use std::{str::FromStr, time::Duration};

use anyhow::Context;

use crate::storage::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Env {
    Local,
    Dev,
    Prod,
}

impl FromStr for Env {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Env::Local),
            "dev" => Ok(Env::Dev),
            "prod" => Ok(Env::Prod),
            other => anyhow::bail!("unknown APP_ENV {other:?}, expected local|dev|prod"),
        }
    }
}

/// Argon2 cost parameters.
#[derive(Debug, Clone)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Env,
    pub host: String,
    pub port: u16,
    /// `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub token_ttl: Duration,
    pub request_timeout: Duration,
    pub hashing: HashingConfig,
    /// Applications provisioned into the in-memory store at startup.
    pub seed_apps: Vec<App>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = HashingConfig::default();
        Ok(Self {
            env: parse_var("APP_ENV", Env::Local)?,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("APP_PORT", 44044)?,
            database_url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            token_ttl: ttl_from_minutes(parse_var("TOKEN_TTL_MINUTES", 60)?)
                .context("invalid value for TOKEN_TTL_MINUTES")?,
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 10)?),
            hashing: HashingConfig {
                memory_kib: parse_var("HASH_MEMORY_KIB", defaults.memory_kib)?,
                iterations: parse_var("HASH_ITERATIONS", defaults.iterations)?,
                parallelism: parse_var("HASH_PARALLELISM", defaults.parallelism)?,
            },
            seed_apps: match std::env::var("SEED_APPS") {
                Ok(raw) => parse_apps(&raw).context("invalid value for SEED_APPS")?,
                Err(_) => Vec::new(),
            },
        })
    }
}

/// Unset means `default`; set but unparsable is an error.
fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

/// Token lifetimes are added to a signed unix timestamp, so the seconds must fit in `i64`.
fn ttl_from_minutes(minutes: u64) -> anyhow::Result<Duration> {
    let secs = minutes
        .checked_mul(60)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .with_context(|| format!("{minutes} minutes is out of range"))?;
    Ok(Duration::from_secs(secs))
}

/// Parses `id:name:secret` entries separated by commas.
fn parse_apps(raw: &str) -> anyhow::Result<Vec<App>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(name), Some(secret)) if !secret.is_empty() => Ok(App {
                    id: id.parse().with_context(|| format!("bad app id in {entry:?}"))?,
                    name: name.to_string(),
                    secret: secret.to_string(),
                }),
                _ => anyhow::bail!("expected id:name:secret, got {entry:?}"),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_parses_known_names() {
        assert_eq!("local".parse::<Env>().unwrap(), Env::Local);
        assert_eq!("dev".parse::<Env>().unwrap(), Env::Dev);
        assert_eq!("prod".parse::<Env>().unwrap(), Env::Prod);
        assert!("staging".parse::<Env>().is_err());
    }

    #[test]
    fn parse_var_defaults_when_unset() {
        let v: u64 = parse_var("SSO_TEST_SURELY_UNSET_VAR", 42).unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn parse_var_rejects_garbage() {
        std::env::set_var("SSO_TEST_GARBAGE_PORT", "eighty");
        let err = parse_var::<u16>("SSO_TEST_GARBAGE_PORT", 80).unwrap_err();
        assert!(format!("{err:#}").contains("SSO_TEST_GARBAGE_PORT"));
        std::env::remove_var("SSO_TEST_GARBAGE_PORT");
    }

    #[test]
    fn ttl_is_bounded() {
        assert_eq!(ttl_from_minutes(60).unwrap(), Duration::from_secs(3600));
        assert!(ttl_from_minutes(u64::MAX).is_err());
        assert!(ttl_from_minutes(u64::MAX / 60).is_err());
    }

    #[test]
    fn seed_apps_parse() {
        let apps = parse_apps("1:test:test-secret, 2:admin:s3:cr3t").unwrap();
        assert_eq!(apps.len(), 2);
        assert_eq!(apps[0].id, 1);
        assert_eq!(apps[0].secret, "test-secret");
        // secrets may contain colons
        assert_eq!(apps[1].secret, "s3:cr3t");

        assert!(parse_apps("").unwrap().is_empty());
        assert!(parse_apps("x:test:secret").is_err());
        assert!(parse_apps("1:test").is_err());
        assert!(parse_apps("1:test:").is_err());
    }

    #[test]
    fn hashing_defaults_match_argon2() {
        let d = HashingConfig::default();
        assert_eq!(d.memory_kib, argon2::Params::DEFAULT_M_COST);
        assert_eq!(d.iterations, argon2::Params::DEFAULT_T_COST);
        assert_eq!(d.parallelism, argon2::Params::DEFAULT_P_COST);
    }
}
