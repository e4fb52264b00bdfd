//! Clinic API - serviço HTTP da clínica
//!
//! Cadastro e login de médicos, pacientes e administradores, gestão das
//! contas, agenda de consultas, catálogo de livros e carteira dos médicos.
//! O armazenamento fica em `common-db`.

use common_db::crypto::EncryptionKey;
use sqlx::SqlitePool;
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

use auth::TokenService;

/// Informações de compilação geradas pelo `built`
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Estado compartilhado pelos handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    /// Chave de dados dos campos criptografados
    pub data_key: Arc<EncryptionKey>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(pool: SqlitePool, data_key: EncryptionKey, tokens: TokenService) -> Self {
        Self {
            pool,
            data_key: Arc::new(data_key),
            tokens,
        }
    }
}
