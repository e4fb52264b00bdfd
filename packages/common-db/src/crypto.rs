//! Módulo de criptografia para dados sensíveis
//!
//! Implementa a criptografia de campos (AES-256-GCM) usada para proteger o
//! histórico médico dos pacientes, e a derivação da chave de dados a partir da
//! frase-chave configurada (Argon2id com salt persistido em `master_keys`).

use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use anyhow::{Context, Result};
use argon2::Argon2;
use rand::{rngs::OsRng as RandOsRng, RngCore};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Erros específicos para operações de criptografia
#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Falha na criptografia: {0}")]
    EncryptionFailed(String),

    #[error("Falha na descriptografia: {0}")]
    DecryptionFailed(String),

    #[error("Dados inválidos: {0}")]
    InvalidData(String),

    #[error("Configuração de criptografia inválida: {0}")]
    InvalidConfiguration(String),
}

/// Tamanho do nonce em bytes para AES-GCM
const AES_GCM_NONCE_SIZE: usize = 12;

/// Tamanho do salt usado na derivação da chave
const KEY_SALT_SIZE: usize = 16;

/// Texto conhecido cifrado junto ao salt para detectar frase-chave incorreta
const KEY_CHECK_PLAINTEXT: &[u8] = b"clinic-data-key-check-v1";

/// Chave AES-256 para criptografia (com zeroização automática)
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKey([u8; 32]);

impl EncryptionKey {
    /// Cria uma nova chave aleatória
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        RandOsRng.fill_bytes(&mut key);
        Self(key)
    }

    /// Converte para bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Estrutura que armazena dados criptografados e seu nonce
#[derive(Debug, Clone)]
pub struct EncryptedData {
    /// Dados criptografados
    pub ciphertext: Vec<u8>,
    /// Nonce usado na criptografia
    pub nonce: Vec<u8>,
}

/// Criptografa dados usando AES-256-GCM
pub fn encrypt(data: &[u8], key: &EncryptionKey) -> Result<EncryptedData, CryptoError> {
    let aes_key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
    let cipher = Aes256Gcm::new(aes_key);

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, data)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    Ok(EncryptedData {
        ciphertext,
        nonce: nonce.to_vec(),
    })
}

/// Descriptografa dados usando AES-256-GCM
pub fn decrypt(encrypted: &EncryptedData, key: &EncryptionKey) -> Result<Vec<u8>, CryptoError> {
    let aes_key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
    let cipher = Aes256Gcm::new(aes_key);

    if encrypted.nonce.len() != AES_GCM_NONCE_SIZE {
        return Err(CryptoError::InvalidData(format!(
            "Nonce inválido: esperado {} bytes, recebido {}",
            AES_GCM_NONCE_SIZE,
            encrypted.nonce.len()
        )));
    }

    let nonce = Nonce::from_slice(&encrypted.nonce);

    cipher
        .decrypt(nonce, encrypted.ciphertext.as_ref())
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}

/// Deriva a chave de dados a partir da frase-chave usando Argon2id
pub fn derive_key(key_phrase: &str, salt: &[u8]) -> Result<EncryptionKey, CryptoError> {
    if key_phrase.is_empty() {
        return Err(CryptoError::InvalidConfiguration(
            "A frase-chave não pode ser vazia".to_string(),
        ));
    }

    let mut derived = [0u8; 32];
    Argon2::default()
        .hash_password_into(key_phrase.as_bytes(), salt, &mut derived)
        .map_err(|e| CryptoError::InvalidConfiguration(e.to_string()))?;

    let key = EncryptionKey(derived);
    derived.zeroize();
    Ok(key)
}

/// Carrega (ou cria na primeira execução) a chave de dados do banco.
///
/// O salt e um valor de verificação ficam em `master_keys`; uma frase-chave
/// diferente da usada na criação é rejeitada.
pub async fn load_data_key(pool: &SqlitePool, key_phrase: &str) -> Result<EncryptionKey> {
    let existing: Option<(Vec<u8>, Vec<u8>, Vec<u8>)> = sqlx::query_as(
        "SELECT salt, check_ciphertext, check_nonce FROM master_keys WHERE id = 1",
    )
    .fetch_optional(pool)
    .await
    .context("Falha ao ler chave mestra")?;

    match existing {
        Some((salt, check_ciphertext, check_nonce)) => {
            let key = derive_key(key_phrase, &salt)?;
            let check = EncryptedData {
                ciphertext: check_ciphertext,
                nonce: check_nonce,
            };
            let plaintext = decrypt(&check, &key).map_err(|_| {
                CryptoError::InvalidConfiguration(
                    "Frase-chave não corresponde à chave mestra registrada".to_string(),
                )
            })?;
            if plaintext != KEY_CHECK_PLAINTEXT {
                return Err(CryptoError::InvalidConfiguration(
                    "Valor de verificação da chave mestra corrompido".to_string(),
                )
                .into());
            }
            Ok(key)
        }
        None => {
            let mut salt = [0u8; KEY_SALT_SIZE];
            RandOsRng.fill_bytes(&mut salt);

            let key = derive_key(key_phrase, &salt)?;
            let check = encrypt(KEY_CHECK_PLAINTEXT, &key)?;

            sqlx::query(
                "INSERT INTO master_keys (id, salt, check_ciphertext, check_nonce)
                 VALUES (1, ?, ?, ?)",
            )
            .bind(salt.as_slice())
            .bind(&check.ciphertext)
            .bind(&check.nonce)
            .execute(pool)
            .await
            .context("Falha ao registrar chave mestra")?;

            info!("Chave mestra criada");
            Ok(key)
        }
    }
}
