//! Handlers HTTP, um módulo por recurso

pub mod appointments;
pub mod auth;
pub mod books;
pub mod health;
pub mod ledger;
pub mod users;

use crate::error::ApiError;

/// Rota desconhecida
pub async fn not_found() -> ApiError {
    ApiError::not_found("Rota não encontrada")
}
