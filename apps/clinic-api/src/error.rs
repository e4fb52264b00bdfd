//! Erros da API e sua conversão em respostas HTTP

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common_db::DbError;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

/// Mensagem única para identificador ou senha incorretos
pub const INVALID_CREDENTIALS: &str = "Credenciais inválidas";

/// Erros retornados pelos handlers
#[derive(Error, Debug)]
pub enum ApiError {
    /// Entrada ausente ou malformada (400)
    #[error("{0}")]
    Validation(String),

    /// Credenciais ou token inválidos (401)
    #[error("{0}")]
    Unauthorized(String),

    /// Conta inativa ou suspensa (403)
    #[error("{0}")]
    Forbidden(String),

    /// Violação de unicidade (409)
    #[error("{0}")]
    Conflict(String),

    /// Recurso inexistente (404)
    #[error("{0}")]
    NotFound(String),

    /// Falha inesperada; o detalhe fica apenas no log (500)
    #[error("Erro interno: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized(INVALID_CREDENTIALS.to_string())
    }

    pub fn internal(error: impl std::fmt::Display) -> Self {
        ApiError::Internal(error.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(detail) => {
                error!("Erro interno: {}", detail);
                "Erro interno do servidor".to_string()
            }
            other => other.to_string(),
        };

        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

/// Mensagem pública para cada restrição de unicidade conhecida
fn conflict_message(column: Option<&str>) -> &'static str {
    match column {
        Some("credentials.handle") => "Nome de usuário já cadastrado",
        Some("credentials.phone") => "Telefone já cadastrado",
        Some("credentials.email") => "E-mail já cadastrado",
        Some("doctors.license_number") => "Já existe um médico com este número de licença",
        Some("appointments.transaction_id") | Some("transactions.transaction_id") => {
            "Identificador de transação já utilizado"
        }
        Some("doctor_wallets.doctor_id") => "Médico já possui carteira",
        _ => "Registro duplicado",
    }
}

impl From<DbError> for ApiError {
    fn from(error: DbError) -> Self {
        match error {
            DbError::NotFound(message) => ApiError::NotFound(message),
            DbError::ConstraintViolation(_) => {
                ApiError::Conflict(conflict_message(error.violated_column()).to_string())
            }
            DbError::ForeignKeyViolation(_) => {
                ApiError::Validation("Referência a registro inexistente".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        DbError::from(error).into()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<&str> = errors.field_errors().keys().copied().collect();
        fields.sort_unstable();
        ApiError::Validation(format!("Campos inválidos: {}", fields.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_classified() {
        let conflict: ApiError =
            DbError::ConstraintViolation("UNIQUE constraint failed: credentials.phone".into())
                .into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);
        assert_eq!(conflict.to_string(), "Telefone já cadastrado");

        let missing: ApiError =
            DbError::ForeignKeyViolation("FOREIGN KEY constraint failed".into()).into();
        assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

        let internal: ApiError = DbError::QueryError("no such table: credentials".into()).into();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_internal_detail_is_redacted() {
        let response = ApiError::internal("disk I/O error at /var/lib/clinic.db").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("Erro interno do servidor"));
        assert!(!text.contains("clinic.db"));
    }
}
