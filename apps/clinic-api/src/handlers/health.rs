use axum::Json;
use serde_json::{json, Value};

use crate::built_info;

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": built_info::PKG_NAME,
        "version": built_info::PKG_VERSION,
        "profile": built_info::PROFILE,
    }))
}
