//! Definições de erro para a biblioteca common-db
//!
//! Este módulo define os tipos de erro usados pela biblioteca

use thiserror::Error;

use crate::crypto::CryptoError;

/// Erros específicos para operações de banco de dados
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Erro de conexão com banco de dados: {0}")]
    ConnectionError(String),

    #[error("Erro de consulta: {0}")]
    QueryError(String),

    #[error("Entidade não encontrada: {0}")]
    NotFound(String),

    #[error("Violação de restrição: {0}")]
    ConstraintViolation(String),

    #[error("Referência inexistente: {0}")]
    ForeignKeyViolation(String),

    #[error("Erro de criptografia: {0}")]
    CryptoError(String),

    #[error("Erro interno: {0}")]
    InternalError(String),
}

impl DbError {
    /// Coluna (`tabela.coluna`) cuja restrição de unicidade foi violada.
    ///
    /// O SQLite reporta `UNIQUE constraint failed: credentials.handle`; com
    /// índices compostos apenas a primeira coluna é devolvida.
    pub fn violated_column(&self) -> Option<&str> {
        match self {
            DbError::ConstraintViolation(message) => message
                .rsplit_once(':')
                .map(|(_, columns)| columns.split(',').next().unwrap_or(columns).trim()),
            _ => None,
        }
    }
}

/// Conversão de erros específicos do SQLx para nossos tipos de erro
impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => DbError::NotFound("Registro não encontrado".to_string()),
            sqlx::Error::Database(dbe) => {
                if dbe.is_unique_violation() {
                    return DbError::ConstraintViolation(dbe.message().to_string());
                }
                if dbe.is_foreign_key_violation() {
                    return DbError::ForeignKeyViolation(dbe.message().to_string());
                }
                if let Some(code) = dbe.code() {
                    // 2067 = SQLITE_CONSTRAINT_UNIQUE, 1555 = SQLITE_CONSTRAINT_PRIMARYKEY
                    if code.as_ref() == "2067" || code.as_ref() == "1555" {
                        return DbError::ConstraintViolation(dbe.message().to_string());
                    }
                    if code.as_ref() == "787" {
                        return DbError::ForeignKeyViolation(dbe.message().to_string());
                    }
                }
                DbError::QueryError(dbe.message().to_string())
            }
            sqlx::Error::ColumnNotFound(col) => {
                DbError::QueryError(format!("Coluna não encontrada: {}", col))
            }
            sqlx::Error::TypeNotFound { type_name } => {
                DbError::QueryError(format!("Tipo não encontrado: {}", type_name))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::QueryError(format!("Erro ao decodificar coluna {}: {}", index, source))
            }
            sqlx::Error::Io(io_err) => DbError::ConnectionError(io_err.to_string()),
            sqlx::Error::Configuration(conf_err) => DbError::ConnectionError(conf_err.to_string()),
            sqlx::Error::PoolClosed => {
                DbError::ConnectionError("Pool de conexões fechado".to_string())
            }
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionError("Timeout no pool de conexões".to_string())
            }
            sqlx::Error::WorkerCrashed => {
                DbError::InternalError("Worker do banco de dados falhou".to_string())
            }
            _ => DbError::InternalError(format!("Erro inesperado: {:?}", error)),
        }
    }
}

impl From<CryptoError> for DbError {
    fn from(error: CryptoError) -> Self {
        DbError::CryptoError(error.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(error: serde_json::Error) -> Self {
        DbError::InternalError(format!("Falha de serialização: {}", error))
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violated_column_from_sqlite_message() {
        let error = DbError::ConstraintViolation(
            "UNIQUE constraint failed: credentials.handle".to_string(),
        );
        assert_eq!(error.violated_column(), Some("credentials.handle"));

        let composite = DbError::ConstraintViolation(
            "UNIQUE constraint failed: doctors.license_number, doctors.id".to_string(),
        );
        assert_eq!(composite.violated_column(), Some("doctors.license_number"));

        assert_eq!(DbError::NotFound("x".into()).violated_column(), None);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, DbError::NotFound(_)));
    }
}
