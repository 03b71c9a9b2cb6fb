use std::net::SocketAddr;

use anyhow::bail;
use chrono::Duration;
use clap::{Parser, Subcommand, ValueEnum};
use tollgate::{JwtConfig, LockoutPolicy, SessionConfig};
use tollgate_axum::CookieConfig;

#[derive(Debug, Parser)]
#[command(name = "tollgate-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// SQLite connection URL
    #[arg(
        long,
        env = "TOLLGATE_DATABASE_URL",
        default_value = "sqlite://tollgate.db?mode=rwc"
    )]
    pub database_url: String,

    /// Address to listen on
    #[arg(long, env = "TOLLGATE_LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Issue signed JWTs or opaque database sessions
    #[arg(long, env = "TOLLGATE_AUTH_MODE", value_enum, default_value_t = AuthMode::Session)]
    pub auth_mode: AuthMode,

    /// HS256 signing secret, required with `--auth-mode jwt`
    #[arg(long, env = "TOLLGATE_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    #[arg(long, env = "TOLLGATE_JWT_ISSUER")]
    pub jwt_issuer: Option<String>,

    #[arg(long, env = "TOLLGATE_TOKEN_TTL_MINUTES", default_value_t = 180)]
    pub token_ttl_minutes: i64,

    /// Consecutive failures that lock an account; 0 disables lockout
    #[arg(long, env = "TOLLGATE_MAX_FAILED_ATTEMPTS", default_value_t = 5)]
    pub max_failed_attempts: u32,

    #[arg(long, env = "TOLLGATE_LOCKOUT_MINUTES", default_value_t = 15)]
    pub lockout_minutes: i64,

    /// Mark the auth cookie `Secure`
    #[arg(long, env = "TOLLGATE_SECURE_COOKIES")]
    pub secure_cookies: bool,

    /// Take the client address from `X-Forwarded-For`
    #[arg(long, env = "TOLLGATE_TRUST_PROXY_HEADERS")]
    pub trust_proxy_headers: bool,

    /// Interval between purges of expired opaque sessions
    #[arg(long, env = "TOLLGATE_SESSION_CLEANUP_MINUTES", default_value_t = 60)]
    pub session_cleanup_minutes: u64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending database migrations and exit
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthMode {
    Jwt,
    Session,
}

impl Cli {
    pub fn session_config(&self) -> anyhow::Result<SessionConfig> {
        let config = SessionConfig::default()
            .expires_in(minutes("--token-ttl-minutes", self.token_ttl_minutes)?);

        match self.auth_mode {
            AuthMode::Session => Ok(config),
            AuthMode::Jwt => {
                let Some(secret) = self.jwt_secret.as_deref().filter(|s| !s.is_empty()) else {
                    bail!("--jwt-secret is required when --auth-mode is jwt");
                };
                let mut jwt = JwtConfig::new_hs256(secret.as_bytes().to_vec());
                if let Some(issuer) = &self.jwt_issuer {
                    jwt = jwt.with_issuer(issuer.clone());
                }
                Ok(config.with_jwt(jwt))
            }
        }
    }

    pub fn lockout_policy(&self) -> anyhow::Result<LockoutPolicy> {
        if self.max_failed_attempts == 0 {
            return Ok(LockoutPolicy::disabled());
        }
        Ok(LockoutPolicy::new(
            self.max_failed_attempts,
            minutes("--lockout-minutes", self.lockout_minutes)?,
        ))
    }

    pub fn cookie_config(&self) -> CookieConfig {
        CookieConfig::default().with_secure(self.secure_cookies)
    }
}

fn minutes(flag: &str, value: i64) -> anyhow::Result<Duration> {
    match Duration::try_minutes(value) {
        Some(duration) if value > 0 => Ok(duration),
        _ => bail!("{flag} must be a positive number of minutes, got {value}"),
    }
}
