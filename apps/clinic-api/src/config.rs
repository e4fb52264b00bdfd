//! Configuração do serviço a partir de variáveis de ambiente

use anyhow::{bail, Context, Result};
use common_db::DbConfig;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Formato dos logs emitidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => bail!("Formato de log desconhecido: {}", other),
        }
    }
}

/// Configuração completa do serviço
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Endereço de escuta HTTP
    pub bind_addr: SocketAddr,
    /// Conexão com o banco
    pub db: DbConfig,
    /// Segredo HMAC dos tokens de sessão
    pub jwt_secret: String,
    /// Validade dos tokens emitidos no cadastro e no login
    pub token_ttl: Duration,
    /// Tempo máximo de atendimento de uma requisição
    pub request_timeout: Duration,
    /// Requisições atendidas simultaneamente
    pub max_concurrent_requests: usize,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            db: DbConfig::default(),
            jwt_secret: String::new(),
            token_ttl: Duration::from_secs(24 * 60 * 60),
            request_timeout: Duration::from_secs(30),
            max_concurrent_requests: 256,
            log_format: LogFormat::Text,
        }
    }
}

impl AppConfig {
    /// Carrega a configuração do ambiente do processo
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Carrega a configuração a partir de uma função de consulta
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() {
            bail!("JWT_SECRET deve ser definido");
        }

        let key_phrase = lookup("CLINIC_KEY_PHRASE").unwrap_or_default();
        if key_phrase.is_empty() {
            bail!("CLINIC_KEY_PHRASE deve ser definido");
        }

        let db = DbConfig {
            db_path: lookup("CLINIC_DB_PATH").unwrap_or(defaults.db.db_path),
            key_phrase,
            max_connections: parse_or(
                &lookup,
                "CLINIC_DB_MAX_CONNECTIONS",
                defaults.db.max_connections,
            )?,
            busy_timeout: defaults.db.busy_timeout,
        };

        let ttl_hours: u64 = parse_or(&lookup, "TOKEN_TTL_HOURS", 24)?;
        if ttl_hours == 0 {
            bail!("TOKEN_TTL_HOURS deve ser maior que zero");
        }

        Ok(Self {
            bind_addr: parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            db,
            jwt_secret,
            token_ttl: Duration::from_secs(ttl_hours * 60 * 60),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )?),
            max_concurrent_requests: parse_or(
                &lookup,
                "MAX_CONCURRENT_REQUESTS",
                defaults.max_concurrent_requests,
            )?,
            log_format: parse_or(&lookup, "LOG_FORMAT", defaults.log_format)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Valor inválido para {}: {}", name, raw)),
        _ => Ok(default),
    }
}
