//! Login por nome de usuário, telefone ou e-mail

use common_db::models::{AccountStatus, Credential, Role, RoleProfile};
use common_db::store::{credentials, profiles};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

use crate::auth::password::{verify_against_dummy, verify_secret};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Corpo de `POST /auth/login`
#[derive(Debug, Default, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub identifier: Option<String>,
    #[serde(alias = "password")]
    pub secret: Option<String>,
}

/// Sessão aberta com sucesso
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub credential: Credential,
    pub role: Role,
    pub role_profile: Option<RoleProfile>,
}

pub async fn login(state: &AppState, request: LoginRequest) -> ApiResult<Session> {
    let identifier = request
        .identifier
        .as_deref()
        .map(str::trim)
        .filter(|identifier| !identifier.is_empty());
    let secret = request.secret.filter(|secret| !secret.is_empty());

    let (identifier, secret) = match (identifier, secret) {
        // Nome de usuário e e-mail são gravados em minúsculas
        (Some(identifier), Some(secret)) => (identifier.to_lowercase(), secret),
        _ => {
            return Err(ApiError::validation(
                "Campos obrigatórios ausentes: identifier, secret",
            ))
        }
    };

    let mut conn = state.pool.acquire().await?;

    let credential = match credentials::find_by_identifier(&mut conn, &identifier).await? {
        Some(credential) => credential,
        None => {
            warn!("Login recusado: identificador desconhecido");
            verify_against_dummy(secret).await?;
            return Err(ApiError::invalid_credentials());
        }
    };

    if !credential.is_active() {
        warn!("Login recusado: conta {} está {}", credential.handle, credential.status);
        let situation = match credential.status {
            AccountStatus::Suspended => "suspensa",
            AccountStatus::Deleted => "removida",
            _ => "inativa",
        };
        return Err(ApiError::Forbidden(format!("Conta {}", situation)));
    }

    if !verify_secret(secret, credential.password_hash.clone()).await? {
        warn!("Login recusado: senha incorreta para {}", credential.handle);
        return Err(ApiError::invalid_credentials());
    }

    let role_profile = profiles::find(&mut conn, &state.data_key, credential.profile).await?;
    if role_profile.is_none() {
        warn!("Credencial {} sem perfil vinculado", credential.id);
    }

    let token = state.tokens.issue(&credential)?;
    info!("Login de {} ({})", credential.handle, credential.role());

    Ok(Session {
        token,
        role: credential.role(),
        credential,
        role_profile,
    })
}
