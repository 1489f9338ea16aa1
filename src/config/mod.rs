use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Unset only when running against the in-memory store
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    /// Drop, recreate and seed the drink table at startup
    pub reset_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `my-tenant.us.auth0.com`
    pub domain: Option<String>,
    /// Expected `aud` claim
    pub audience: Option<String>,
    /// Overrides the key set URL derived from the domain
    pub jwks_url: Option<String>,
    pub jwks_timeout_secs: u64,
    pub leeway_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl AuthConfig {
    /// Token issuer, as the provider writes it in the `iss` claim
    pub fn issuer(&self) -> Result<String, ConfigError> {
        let domain = self.domain.as_deref().ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?;
        Ok(format!("https://{}/", domain.trim_end_matches('/')))
    }

    /// Location of the provider's published key set
    pub fn jwks_url(&self) -> Result<url::Url, ConfigError> {
        let raw = match &self.jwks_url {
            Some(explicit) => explicit.clone(),
            None => format!("{}.well-known/jwks.json", self.issuer()?),
        };
        url::Url::parse(&raw).map_err(|e| ConfigError::Invalid {
            name: "AUTH_JWKS_URL",
            reason: e.to_string(),
        })
    }

    pub fn audience(&self) -> Result<&str, ConfigError> {
        self.audience.as_deref().ok_or(ConfigError::Missing("API_AUDIENCE"))
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout =
                v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RESET_ON_START") {
            self.database.reset_on_start = v.parse().unwrap_or(self.database.reset_on_start);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH0_DOMAIN") {
            self.auth.domain = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("API_AUDIENCE") {
            self.auth.audience = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("AUTH_JWKS_URL") {
            self.auth.jwks_url = Some(v).filter(|s| !s.is_empty());
        }
        if let Ok(v) = env::var("AUTH_JWKS_TIMEOUT_SECS") {
            self.auth.jwks_timeout_secs = v.parse().unwrap_or(self.auth.jwks_timeout_secs);
        }
        if let Ok(v) = env::var("AUTH_LEEWAY_SECS") {
            self.auth.leeway_secs = v.parse().unwrap_or(self.auth.leeway_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        self
    }

    /// Check the settings every run needs.
    /// The database URL is checked by the caller since in-memory runs skip it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.issuer()?;
        self.auth.audience()?;
        self.auth.jwks_url()?;
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    fn base(environment: Environment) -> Self {
        Self {
            environment,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                reset_on_start: false,
            },
            auth: AuthConfig {
                domain: None,
                audience: None,
                jwks_url: None,
                jwks_timeout_secs: 10,
                leeway_secs: 0,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: Vec::new(),
            },
        }
    }

    /// CORS is permissive in development, so no origins are listed
    pub fn development() -> Self {
        Self::base(Environment::Development)
    }

    pub fn staging() -> Self {
        let mut config = Self::base(Environment::Staging);
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.auth.jwks_timeout_secs = 5;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config
    }

    pub fn production() -> Self {
        let mut config = Self::base(Environment::Production);
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.auth.jwks_timeout_secs = 5;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        config
    }

    /// Permissive CORS is only used in development
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
