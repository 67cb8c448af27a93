use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

// Admin service configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct AdmindConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
    pub session_ttl_secs: u64,
    pub max_page_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
struct AdmindConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<String>,
    postgres_url: Option<String>,
    session_ttl_secs: Option<u64>,
    max_page_size: Option<u32>,
}

fn parse_storage(value: &str) -> Result<StorageBackend> {
    match value {
        "memory" => Ok(StorageBackend::Memory),
        "postgres" => Ok(StorageBackend::Postgres),
        other => bail!("unknown storage backend: {other}"),
    }
}

impl AdmindConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("ATRIUM_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse ATRIUM_BIND")?;
        let metrics_bind = std::env::var("ATRIUM_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse ATRIUM_METRICS_BIND")?;
        let storage = parse_storage(
            &std::env::var("ATRIUM_STORAGE").unwrap_or_else(|_| "memory".to_string()),
        )?;
        let postgres = std::env::var("ATRIUM_PG_URL").ok().map(|url| {
            let max_connections = std::env::var("ATRIUM_PG_MAX_CONNECTIONS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(10);
            let acquire_timeout_ms = std::env::var("ATRIUM_PG_ACQUIRE_TIMEOUT_MS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(5_000);
            PostgresConfig {
                url,
                max_connections,
                acquire_timeout_ms,
            }
        });
        let session_ttl_secs = std::env::var("ATRIUM_SESSION_TTL_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        let max_page_size = std::env::var("ATRIUM_MAX_PAGE_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_PAGE_SIZE);
        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            postgres,
            session_ttl_secs,
            max_page_size,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("ATRIUM_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read ATRIUM_CONFIG: {path}"))?;
            let override_cfg: AdmindConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse admind config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.storage {
                config.storage = parse_storage(&value)?;
            }
            if let Some(url) = override_cfg.postgres_url {
                let mut postgres = config.postgres.take().unwrap_or(PostgresConfig {
                    url: String::new(),
                    max_connections: 10,
                    acquire_timeout_ms: 5_000,
                });
                postgres.url = url;
                config.postgres = Some(postgres);
            }
            if let Some(value) = override_cfg.session_ttl_secs {
                config.session_ttl_secs = value;
            }
            if let Some(value) = override_cfg.max_page_size {
                config.max_page_size = value;
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    struct EnvGuard {
        key: &'static str,
        prev: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::set_var(key, value);
            }
            Self { key, prev }
        }

        fn unset(key: &'static str) -> Self {
            let prev = std::env::var(key).ok();
            unsafe {
                std::env::remove_var(key);
            }
            Self { key, prev }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.prev {
                Some(value) => unsafe {
                    std::env::set_var(self.key, value);
                },
                None => unsafe {
                    std::env::remove_var(self.key);
                },
            }
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_without_env() {
        let _g1 = EnvGuard::unset("ATRIUM_BIND");
        let _g2 = EnvGuard::unset("ATRIUM_METRICS_BIND");
        let _g3 = EnvGuard::unset("ATRIUM_STORAGE");
        let _g4 = EnvGuard::unset("ATRIUM_PG_URL");
        let _g5 = EnvGuard::unset("ATRIUM_SESSION_TTL_SECS");
        let _g6 = EnvGuard::unset("ATRIUM_MAX_PAGE_SIZE");
        let _g7 = EnvGuard::unset("ATRIUM_CONFIG");

        let config = AdmindConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.metrics_bind.port(), 9090);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.postgres.is_none());
        assert_eq!(config.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
        assert_eq!(config.max_page_size, DEFAULT_MAX_PAGE_SIZE);
    }

    #[test]
    #[serial]
    fn env_overrides_apply() {
        let _g1 = EnvGuard::set("ATRIUM_BIND", "127.0.0.1:9000");
        let _g2 = EnvGuard::set("ATRIUM_STORAGE", "postgres");
        let _g3 = EnvGuard::set("ATRIUM_PG_URL", "postgres://localhost/atrium");
        let _g4 = EnvGuard::set("ATRIUM_PG_MAX_CONNECTIONS", "3");
        let _g5 = EnvGuard::unset("ATRIUM_CONFIG");

        let config = AdmindConfig::from_env().expect("config");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.storage, StorageBackend::Postgres);
        let pg = config.postgres.expect("postgres");
        assert_eq!(pg.url, "postgres://localhost/atrium");
        assert_eq!(pg.max_connections, 3);
    }

    #[test]
    #[serial]
    fn unknown_storage_backend_is_rejected() {
        let _g1 = EnvGuard::set("ATRIUM_STORAGE", "sled");
        let err = AdmindConfig::from_env().expect_err("reject");
        assert!(err.to_string().contains("unknown storage backend"));
    }

    #[test]
    #[serial]
    fn yaml_file_overrides_env() {
        let path = std::env::temp_dir().join(format!("admind-config-{}.yaml", std::process::id()));
        fs::write(
            &path,
            "bind_addr: 127.0.0.1:7000\nstorage: memory\nmax_page_size: 25\n",
        )
        .expect("write yaml");
        let _g1 = EnvGuard::set("ATRIUM_CONFIG", path.to_str().expect("path"));
        let _g2 = EnvGuard::set("ATRIUM_BIND", "127.0.0.1:9000");
        let _g3 = EnvGuard::unset("ATRIUM_STORAGE");
        let _g4 = EnvGuard::unset("ATRIUM_PG_URL");

        let config = AdmindConfig::from_env_or_yaml().expect("config");
        assert_eq!(config.bind_addr.port(), 7000);
        assert_eq!(config.max_page_size, 25);
        let _ = fs::remove_file(&path);
    }
}
