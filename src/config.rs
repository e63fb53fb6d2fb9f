use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
    /// Issue a fresh refresh token on every `/token/refresh/` call.
    pub rotate_refresh: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordPolicy {
    pub min_length: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self { min_length: 8 }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub password: PasswordPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "agritrekker".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "agritrekker-users".into()),
            ttl_minutes: env_parse("JWT_TTL_MINUTES").unwrap_or(60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES").unwrap_or(60 * 24 * 14),
            rotate_refresh: env_parse("JWT_ROTATE_REFRESH").unwrap_or(false),
        };
        let password = PasswordPolicy {
            min_length: env_parse("PASSWORD_MIN_LENGTH").unwrap_or(8),
            ..PasswordPolicy::default()
        };
        Ok(Self {
            database_url,
            database_max_connections: env_parse("DATABASE_MAX_CONNECTIONS").unwrap_or(10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_parse("APP_PORT").unwrap_or(8080),
            jwt,
            password,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
