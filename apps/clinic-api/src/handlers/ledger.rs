use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use common_db::models::Transaction;

use crate::error::ApiResult;
use crate::extract::{ResourceId, ValidatedJson};
use crate::services::ledger::{self, RecordTransactionRequest, WalletStatement};
use crate::AppState;

/// POST /transactions
pub async fn record(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RecordTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let transaction = ledger::record_transaction(&state, request).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// GET /transactions/:id
pub async fn get(
    State(state): State<AppState>,
    ResourceId(id): ResourceId,
) -> ApiResult<Json<Transaction>> {
    Ok(Json(ledger::get_transaction(&state, id).await?))
}

/// GET /doctors/:id/wallet
pub async fn wallet(
    State(state): State<AppState>,
    ResourceId(doctor_id): ResourceId,
) -> ApiResult<Json<WalletStatement>> {
    Ok(Json(ledger::wallet_statement(&state, doctor_id).await?))
}
