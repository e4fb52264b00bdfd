//! Cenários HTTP completos sobre um banco temporário

mod accounts;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common_db::crypto::load_data_key;
use common_db::testing::temp_database;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::routes::router;
use crate::AppState;

pub(crate) const TEST_JWT_SECRET: &str = "segredo-de-teste";

pub(crate) struct TestApp {
    _dir: TempDir,
    pub pool: SqlitePool,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let (dir, pool) = temp_database().await.unwrap();
        let data_key = load_data_key(&pool, "frase-de-teste").await.unwrap();
        let tokens = TokenService::new(TEST_JWT_SECRET, Duration::from_secs(3600));
        let state = AppState::new(pool.clone(), data_key, tokens);

        Self {
            _dir: dir,
            pool,
            router: router(state, &AppConfig::default()),
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        call(self.router.clone(), method, uri, token, body).await
    }

    /// Cadastra e devolve o corpo da resposta, exigindo 201
    pub async fn register(&self, payload: Value) -> Value {
        let (status, body) = self
            .send(Method::POST, "/auth/register", None, Some(payload))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

/// Envia uma requisição a um clone do roteador; pode rodar em tarefas paralelas
pub(crate) async fn call(
    router: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = router.oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

pub(crate) fn doctor_payload(first: &str, last: &str, license: &str, phone: &str) -> Value {
    json!({
        "role": "Doctor",
        "firstName": first,
        "lastName": last,
        "phone": phone,
        "secret": "senha-forte",
        "dateOfBirth": "1975-02-10",
        "gender": "Male",
        "specialization": "Cardiologia",
        "licenseNumber": license,
        "experience": 12,
        "availability": "Seg-Qua 08:00-12:00",
    })
}

pub(crate) fn patient_payload(first: &str, last: &str, phone: &str) -> Value {
    json!({
        "role": "Patient",
        "firstName": first,
        "lastName": last,
        "phone": phone,
        "password": "senha-paciente",
        "dateOfBirth": "1992-11-30",
        "gender": "Female",
        "address": "Av. Central, 100",
    })
}

pub(crate) fn admin_payload(first: &str, last: &str, phone: &str) -> Value {
    json!({
        "role": "Admin",
        "firstName": first,
        "lastName": last,
        "phone": phone,
        "secret": "senha-admin",
        "dateOfBirth": "1988-07-04",
        "gender": "Other",
    })
}

pub(crate) fn token_of(registration: &Value) -> String {
    registration["token"].as_str().unwrap().to_string()
}

pub(crate) fn credential_id_of(registration: &Value) -> String {
    registration["credential"]["id"].as_str().unwrap().to_string()
}

pub(crate) fn profile_id_of(registration: &Value) -> String {
    registration["roleProfile"]["id"].as_str().unwrap().to_string()
}
