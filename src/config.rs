use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub public_url: Option<String>,
    pub upload_dir: Option<String>,
    pub session_ttl_hours: Option<i64>,
    pub bcrypt_cost: Option<u32>,
    pub google_userinfo_url: Option<String>,
    pub max_body_bytes: Option<usize>,
    pub auto_migrate: Option<bool>,
    pub cors_origin: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            public_url: None,
            upload_dir: None,
            session_ttl_hours: None,
            bcrypt_cost: None,
            google_userinfo_url: None,
            max_body_bytes: None,
            auto_migrate: None,
            cors_origin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let config: Config = cfg.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if !self
            .host
            .chars()
            .all(|c| c.is_alphanumeric() || ".:-_".contains(c))
        {
            return Err(config::ConfigError::Message(
                "Invalid host format".to_string(),
            ));
        }

        if self.port < 1024 {
            return Err(config::ConfigError::Message(
                "Port must be 1024 or higher".to_string(),
            ));
        }

        if let Some(public_url) = &self.public_url {
            if url::Url::parse(public_url).is_err() {
                return Err(config::ConfigError::Message(format!(
                    "Invalid public_url: {}",
                    public_url
                )));
            }
        }

        if let Some(cost) = self.bcrypt_cost {
            if !(4..=31).contains(&cost) {
                return Err(config::ConfigError::Message(
                    "bcrypt_cost must be between 4 and 31".to_string(),
                ));
            }
        }

        if let Some(ttl) = self.session_ttl_hours {
            if ttl <= 0 {
                return Err(config::ConfigError::Message(
                    "session_ttl_hours must be positive".to_string(),
                ));
            }
        }

        // 1MB..500MB
        if let Some(limit) = self.max_body_bytes {
            let min = 1024 * 1024;
            let max = 500 * 1024 * 1024;
            if limit < min || limit > max {
                return Err(config::ConfigError::Message(format!(
                    "max_body_bytes must be between {} and {} bytes",
                    min, max
                )));
            }
        }

        Ok(())
    }
}

impl Config {
    pub fn effective_max_body_bytes(&self) -> usize {
        self.max_body_bytes.unwrap_or(20 * 1024 * 1024)
    }

    pub fn effective_public_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }

    pub fn effective_upload_dir(&self) -> String {
        self.upload_dir.clone().unwrap_or_else(|| "./uploads".to_string())
    }

    pub fn effective_session_ttl_hours(&self) -> i64 {
        self.session_ttl_hours.unwrap_or(24 * 7)
    }

    pub fn effective_bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST)
    }

    pub fn effective_google_userinfo_url(&self) -> String {
        self.google_userinfo_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GOOGLE_USERINFO_URL.to_string())
    }

    pub fn auto_migrate_enabled(&self) -> bool {
        self.auto_migrate.unwrap_or(false)
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_secs: Option<u64>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
    pub sql_log: Option<bool>,
}

impl DatabaseSettings {
    pub fn default_from_url(url: String) -> Self {
        Self {
            url,
            max_connections: parse_env_var("DATABASE_MAX_CONNECTIONS"),
            min_connections: parse_env_var("DATABASE_MIN_CONNECTIONS"),
            connect_timeout_secs: parse_env_var("DATABASE_CONNECT_TIMEOUT_SECS"),
            acquire_timeout_secs: parse_env_var("DATABASE_ACQUIRE_TIMEOUT_SECS"),
            idle_timeout_secs: parse_env_var("DATABASE_IDLE_TIMEOUT_SECS"),
            sql_log: parse_env_var("DATABASE_SQL_LOG"),
        }
    }
}

fn parse_env_var<T>(key: &str) -> Option<T>
where
    T: FromStr,
{
    env::var(key).ok().and_then(|value| value.parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_privileged_port() {
        let config = Config {
            port: 80,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_bcrypt_cost() {
        let config = Config {
            bcrypt_cost: Some(3),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            bcrypt_cost: Some(10),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_tiny_body_limit_and_bad_host() {
        let config = Config {
            max_body_bytes: Some(1024),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            host: "local host;".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn public_url_falls_back_to_bind_address() {
        let config = Config::default();
        assert_eq!(config.effective_public_url(), "http://127.0.0.1:8080");
        assert_eq!(config.effective_session_ttl_hours(), 168);
    }
}
