//! Common DB - Biblioteca compartilhada para acesso ao banco de dados da clínica
//!
//! Esta biblioteca fornece:
//! - Modelos de dados compartilhados (credenciais, perfis, agenda, livros e financeiro)
//! - Migrações automáticas do banco de dados
//! - Criptografia de campos sensíveis dos pacientes
//! - Funções de acesso por agregado (`store`)
//! - Transações de escrita `IMMEDIATE` (`WriteTransaction`)
//! - Pool de conexão e funções de utilidades para SQLite

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod crypto;
pub mod error;
pub mod migrations;
pub mod models;
pub mod store;
pub mod transaction;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use error::DbError;
pub use transaction::WriteTransaction;

/// Configuração da conexão com o banco de dados
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Caminho para o arquivo SQLite
    pub db_path: String,
    /// Frase-chave usada para derivar a chave de dados (Argon2id)
    pub key_phrase: String,
    /// Número máximo de conexões no pool
    pub max_connections: u32,
    /// Tempo máximo de espera por um lock de escrita
    pub busy_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            db_path: "data/clinic.db".to_string(),
            key_phrase: "".to_string(), // Vazio por segurança, deve ser definido explicitamente
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Inicializa uma conexão com o banco de dados SQLite e aplica as migrações
pub async fn init_db_pool(config: &DbConfig) -> Result<SqlitePool> {
    let db_path = Path::new(&config.db_path);

    // Verifica se o diretório pai existe
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .context("Falha ao criar diretório para banco de dados")?;
        }
    }

    let connection_options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout)
        .pragma("synchronous", "NORMAL");

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(connection_options)
        .await
        .context("Falha ao conectar ao banco de dados SQLite")?;

    migrations::run_migrations(&pool)
        .await
        .context("Falha ao aplicar migrações")?;

    info!("Banco de dados inicializado com sucesso: {}", config.db_path);
    Ok(pool)
}
