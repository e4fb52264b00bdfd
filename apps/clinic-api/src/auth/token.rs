//! Tokens de sessão (JWT HS256)

use chrono::Utc;
use common_db::models::{Credential, Role};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Declarações embutidas no token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Id da credencial
    pub sub: Uuid,
    pub handle: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Emite e valida tokens de sessão com um segredo compartilhado
#[derive(Clone)]
pub struct TokenService {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            ttl,
        }
    }

    pub fn issue(&self, credential: &Credential) -> ApiResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: credential.id,
            handle: credential.handle.clone(),
            role: credential.role(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Falha ao assinar token: {}", e)))
    }

    /// Valida assinatura e expiração
    pub fn verify(&self, token: &str) -> ApiResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::Unauthorized("Token inválido ou expirado".to_string()))
    }
}
