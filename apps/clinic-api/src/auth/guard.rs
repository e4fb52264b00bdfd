//! Guarda de acesso das rotas protegidas
//!
//! Exige `Authorization: Bearer <token>`, valida o token e anexa as
//! [`Claims`] às extensões da requisição. Não há sessão no servidor.

use axum::extract::State;
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use super::Claims;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Extrai o token do cabeçalho `Authorization`
pub fn extract_bearer_token(headers: &HeaderMap) -> ApiResult<&str> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Cabeçalho Authorization ausente".to_string()))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Cabeçalho Authorization inválido".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Esperado esquema Bearer".to_string()))
}

pub async fn require_bearer<B>(
    State(state): State<AppState>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, ApiError> {
    let claims: Claims = {
        let token = extract_bearer_token(request.headers())?;
        state.tokens.verify(token)?
    };

    debug!("Acesso autorizado para {} em {}", claims.handle, request.uri().path());
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(extract_bearer_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }
}
