//! Hash de senhas com Argon2id
//!
//! O cálculo é caro de propósito, então roda no pool de tarefas bloqueantes.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use tokio::sync::OnceCell;

use crate::error::{ApiError, ApiResult};

fn hash_blocking(secret: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::internal(format!("Falha ao gerar hash de senha: {}", e)))
}

fn verify_blocking(secret: &str, stored_hash: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::internal(format!("Hash de senha armazenado inválido: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}

/// Gera o hash PHC (salt aleatório embutido) de uma senha
pub async fn hash_secret(secret: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || hash_blocking(&secret))
        .await
        .map_err(ApiError::internal)?
}

/// Compara a senha com o hash armazenado
pub async fn verify_secret(secret: String, stored_hash: String) -> ApiResult<bool> {
    tokio::task::spawn_blocking(move || verify_blocking(&secret, &stored_hash))
        .await
        .map_err(ApiError::internal)?
}

/// Hash sem dono, verificado quando o identificador não existe para que a
/// resposta leve o mesmo tempo de uma senha errada
static DUMMY_HASH: OnceCell<String> = OnceCell::const_new();

async fn dummy_hash() -> ApiResult<&'static str> {
    DUMMY_HASH
        .get_or_try_init(|| hash_secret("clinic-dummy-secret".to_string()))
        .await
        .map(String::as_str)
}

/// Executa uma verificação Argon2 completa cujo resultado é descartado
pub async fn verify_against_dummy(secret: String) -> ApiResult<()> {
    let hash = dummy_hash().await?;
    verify_secret(secret, hash.to_string()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let hash = hash_secret("s3nha-forte".to_string()).await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("s3nha-forte"));
        assert!(verify_secret("s3nha-forte".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_secret("outra".to_string(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_same_secret_gets_different_salts() {
        let a = hash_secret("repetida".to_string()).await.unwrap();
        let b = hash_secret("repetida".to_string()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_dummy_hash_is_argon2id_and_never_matches() {
        let hash = dummy_hash().await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(std::ptr::eq(hash, dummy_hash().await.unwrap()));

        assert!(!verify_secret("senha-forte".to_string(), hash.to_string()).await.unwrap());
        verify_against_dummy("senha-forte".to_string()).await.unwrap();
    }
}
